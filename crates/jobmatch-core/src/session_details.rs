use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{error, info};

use crate::error::{Error, Result};

/// Upcoming sessions/events keyed by name, in file order. Read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionDetails {
    entries: Map<String, Value>,
}

impl SessionDetails {
    pub fn from_map(entries: Map<String, Value>) -> Self { Self { entries } }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn len(&self) -> usize { self.entries.len() }

    /// `(key, display text)` pairs; strings are shown verbatim, anything else as compact JSON.
    pub fn entries(&self) -> impl Iterator<Item = (&str, String)> + '_ {
        self.entries.iter().map(|(k, v)| {
            let shown = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.as_str(), shown)
        })
    }
}

impl<const N: usize> From<[(&str, &str); N]> for SessionDetails {
    fn from(pairs: [(&str, &str); N]) -> Self {
        let entries = pairs.into_iter().map(|(k, v)| (k.to_string(), Value::String(v.to_string()))).collect();
        Self { entries }
    }
}

pub fn load_session_details(path: &Path) -> Result<SessionDetails> {
    let raw = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound { Error::NotFound(path.display().to_string()) } else { Error::Io(e) }
    })?;
    let value: Value = serde_json::from_str(&raw).map_err(|source| Error::SessionDetails { path: path.to_path_buf(), source })?;
    match value {
        Value::Object(entries) => {
            info!(count = entries.len(), path = %path.display(), "loaded session details");
            Ok(SessionDetails { entries })
        }
        other => Err(Error::Operation(format!(
            "session details {} must be a JSON object, found {}",
            path.display(),
            json_kind(&other)
        ))),
    }
}

/// Never fails: a missing file is optionally created as `{}`, and any other
/// problem is logged and yields an empty mapping.
pub fn load_session_details_or_empty(path: &Path, create_if_missing: bool) -> SessionDetails {
    if create_if_missing && !path.exists() {
        let created = path.parent().map_or(Ok(()), |dir| if dir.as_os_str().is_empty() { Ok(()) } else { fs::create_dir_all(dir) })
            .and_then(|()| fs::write(path, "{}"));
        match created {
            Ok(()) => info!(path = %path.display(), "created empty session details file"),
            Err(e) => error!(path = %path.display(), error = %e, "could not create session details file"),
        }
    }
    match load_session_details(path) {
        Ok(details) => details,
        Err(e) => {
            error!(path = %path.display(), error = %e, "session details unavailable, continuing without them");
            SessionDetails::default()
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
