use std::path::PathBuf;

use serde_json::{Value, json};
use thiserror::Error;

/// Failure classes the launcher knows how to explain to a user.
///
/// Any variant reporting a template through [`LaunchError::message_template`]
/// is rendered from `messages/<template>.txt` by the failure reporter; the
/// rest fall back to their raw trace.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("linting engine not found: {}", program.display())]
    EngineNotFound { program: PathBuf },

    #[error("linting engine {} terminated without an exit status", program.display())]
    EngineTerminated {
        program: PathBuf,
        signal: Option<i32>,
    },

    #[error("cannot locate launcher installation: {0}")]
    InstallLocation(#[source] std::io::Error),
}

impl LaunchError {
    pub fn message_template(&self) -> Option<&'static str> {
        match self {
            LaunchError::EngineNotFound { .. } => Some("engine-not-found"),
            LaunchError::EngineTerminated { .. } => Some("engine-terminated"),
            LaunchError::InstallLocation(_) => None,
        }
    }

    pub fn message_data(&self) -> Option<Value> {
        match self {
            LaunchError::EngineNotFound { program } => {
                Some(json!({ "program": program.display().to_string() }))
            }
            LaunchError::EngineTerminated { program, signal } => Some(json!({
                "program": program.display().to_string(),
                "signal": signal,
            })),
            LaunchError::InstallLocation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_carry_templates() {
        let err = LaunchError::EngineNotFound {
            program: PathBuf::from("/opt/lintel/lintel-engine"),
        };
        assert_eq!(err.message_template(), Some("engine-not-found"));
        assert_eq!(
            err.message_data().unwrap()["program"],
            "/opt/lintel/lintel-engine"
        );

        let err = LaunchError::EngineTerminated {
            program: PathBuf::from("lintel-engine"),
            signal: None,
        };
        assert_eq!(err.message_template(), Some("engine-terminated"));
        assert!(err.message_data().unwrap()["signal"].is_null());
    }

    #[test]
    fn install_location_is_untemplated() {
        let err = LaunchError::InstallLocation(std::io::Error::other("gone"));
        assert!(err.message_template().is_none());
        assert!(err.to_string().contains("gone"));
    }
}
