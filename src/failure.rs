//! Process-wide failure boundary.
//!
//! [`guard`] wraps everything the launcher does after start-up. Whatever
//! escapes it, an error or a panic, is classified once into a
//! [`FailureDescriptor`], printed, and turns the exit status into
//! [`UNCAUGHT_STATUS`] no matter what had been assigned before.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

use anyhow::Result;
use once_cell::sync::OnceCell;
use serde_json::{Map, Value};

use crate::config;
use crate::error::LaunchError;
use crate::template::TemplateRenderer;

pub const APOLOGY: &str = "Oops! Something went wrong! :(";
pub const UNCAUGHT_STATUS: i32 = 2;

/// The single exit status of this run. Unassigned means success.
#[derive(Debug, Default)]
pub struct StatusSlot {
    code: Option<i32>,
}

impl StatusSlot {
    pub fn set(&mut self, code: i32) {
        tracing::debug!(target: "lintel::failure", code, "exit status assigned");
        self.code = Some(code);
    }

    pub fn code(&self) -> i32 {
        self.code.unwrap_or(0)
    }

    /// Voids any earlier assignment.
    pub fn fail(&mut self) -> i32 {
        self.code = Some(UNCAUGHT_STATUS);
        UNCAUGHT_STATUS
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FailureDescriptor {
    Templated {
        template: String,
        data: Value,
        trace: String,
    },
    Generic {
        trace: String,
    },
}

impl FailureDescriptor {
    /// Templated only when the error is a [`LaunchError`] naming a
    /// non-empty template.
    pub fn from_error(err: &anyhow::Error) -> Self {
        let trace = format!("{err:?}");
        let templated = err
            .downcast_ref::<LaunchError>()
            .and_then(|e| e.message_template().map(|t| (t, e.message_data())))
            .filter(|(t, _)| !t.is_empty());
        match templated {
            Some((template, data)) => FailureDescriptor::Templated {
                template: template.to_string(),
                data: data.unwrap_or_else(|| Value::Object(Map::new())),
                trace,
            },
            None => FailureDescriptor::Generic { trace },
        }
    }

    pub fn trace(&self) -> &str {
        match self {
            FailureDescriptor::Templated { trace, .. } | FailureDescriptor::Generic { trace } => {
                trace
            }
        }
    }
}

pub struct FailureReporter {
    messages_dir: PathBuf,
    version: &'static str,
}

impl FailureReporter {
    pub fn new(messages_dir: PathBuf, version: &'static str) -> Self {
        FailureReporter {
            messages_dir,
            version,
        }
    }

    /// Reporter reading templates from the launcher's installation.
    pub fn installed() -> Self {
        let install_dir = config::install_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(config::messages_dir(&install_dir), env!("CARGO_PKG_VERSION"))
    }

    /// Writes the user-facing report for `failure`.
    ///
    /// # Errors
    /// Returns an error only if writing to `out` fails.
    pub fn report<W: Write>(&self, failure: &FailureDescriptor, out: &mut W) -> io::Result<()> {
        match failure {
            FailureDescriptor::Templated {
                template,
                data,
                trace,
            } => {
                let renderer = TemplateRenderer::new();
                match renderer.render_file(&self.messages_dir, template, data) {
                    Ok(text) => {
                        writeln!(out, "\n{APOLOGY}")?;
                        writeln!(out, "\nLintel: {}.\n\n{text}", self.version)
                    }
                    Err(e) => {
                        writeln!(out, "{trace}")?;
                        writeln!(out, "(could not render message: {e})")
                    }
                }
            }
            FailureDescriptor::Generic { trace } => writeln!(out, "{trace}"),
        }
    }
}

static ARMED: OnceCell<()> = OnceCell::new();

thread_local! {
    static GUARDED: Cell<bool> = const { Cell::new(false) };
    static PANIC_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Installs the panic hook once per process. Inside a guard a panic is
/// recorded for the reporter instead of printed; elsewhere the previous
/// hook still runs.
fn arm() {
    ARMED.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if GUARDED.with(Cell::get) {
                let trace = format!("{info}\n{}", Backtrace::force_capture());
                PANIC_TRACE.with(|t| *t.borrow_mut() = Some(trace));
            } else {
                previous(info);
            }
        }));
    });
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

/// Runs `body` inside the failure boundary and returns the exit status.
pub fn guard<F>(reporter: &FailureReporter, body: F) -> i32
where
    F: FnOnce(&mut StatusSlot) -> Result<()>,
{
    arm();
    let mut slot = StatusSlot::default();
    let was_guarded = GUARDED.with(|g| g.replace(true));
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(&mut slot)));
    GUARDED.with(|g| g.set(was_guarded));

    let failure = match outcome {
        Ok(Ok(())) => return slot.code(),
        Ok(Err(err)) => FailureDescriptor::from_error(&err),
        Err(payload) => FailureDescriptor::Generic {
            trace: PANIC_TRACE
                .with(|t| t.borrow_mut().take())
                .unwrap_or_else(|| panic_message(payload.as_ref())),
        },
    };
    tracing::debug!(target: "lintel::failure", templated = matches!(failure, FailureDescriptor::Templated { .. }), "uncaught failure");
    // Nothing left to report to if stderr is gone.
    let _ = reporter.report(&failure, &mut io::stderr().lock());
    slot.fail()
}
