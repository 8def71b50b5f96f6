//! Message-template rendering for templated failures.
//!
//! Templates are plain text with `<%= path %>` placeholders (`<%- path %>`
//! HTML-escapes the value). `path` is a dotted key into a JSON payload.

use std::fs;
use std::path::{Path, PathBuf};

use regex::{Captures, Regex};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("cannot read message template {}: {source}", path.display())]
    Missing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("message template {template} has no value for `{key}`")]
    MissingValue { template: String, key: String },
}

/// Built fresh for each use; it only exists on the failure path.
pub struct TemplateRenderer {
    placeholder: Regex,
}

impl TemplateRenderer {
    pub fn new() -> Self {
        // literal pattern, cannot fail
        let placeholder =
            Regex::new(r"<%([=-])\s*([A-Za-z_$][\w$]*(?:\.[\w$]+)*)\s*%>").unwrap();
        TemplateRenderer { placeholder }
    }

    /// Loads `<dir>/<id>.txt` and renders it against `data`.
    ///
    /// # Errors
    /// Returns an error if the template file cannot be read or references a
    /// key the payload does not have.
    pub fn render_file(&self, dir: &Path, id: &str, data: &Value) -> Result<String, TemplateError> {
        let path = dir.join(format!("{id}.txt"));
        let source = fs::read_to_string(&path).map_err(|source| TemplateError::Missing {
            path: path.clone(),
            source,
        })?;
        self.render(id, &source, data)
    }

    /// # Errors
    /// Returns an error if a placeholder names a key missing from `data`.
    pub fn render(&self, id: &str, source: &str, data: &Value) -> Result<String, TemplateError> {
        let mut missing = None;
        let out = self.placeholder.replace_all(source, |caps: &Captures<'_>| {
            let key = &caps[2];
            tracing::trace!(target: "lintel::template", template = id, key, "substitute");
            match lookup(data, key) {
                Some(v) => {
                    let text = stringify(v);
                    if &caps[1] == "-" { escape_html(&text) } else { text }
                }
                None => {
                    missing.get_or_insert_with(|| key.to_string());
                    String::new()
                }
            }
        });
        match missing {
            Some(key) => Err(TemplateError::MissingValue {
                template: id.to_string(),
                key,
            }),
            None => Ok(out.into_owned()),
        }
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn lookup<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(data, |v, key| v.get(key))
}

fn stringify(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
