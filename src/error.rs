//! Error type shared by every construction stage.
//!
//! Configuration and input problems are returned to the caller instead of
//! aborting, so a test harness (or the driver binary) decides what to do.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{source_name}: cannot parse '{token}' as {field}")]
    Parse {
        source_name: String,
        field: &'static str,
        token: String,
    },

    #[error("{source_name}: unexpected end of input while reading {field}")]
    UnexpectedEof {
        source_name: String,
        field: &'static str,
    },

    #[error("invalid parameter '{key}'; valid parameters are: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ModelError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        ModelError::Config(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_names_path() {
        let err = ModelError::Io {
            path: PathBuf::from("runs/a/lattice.in"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("runs/a/lattice.in"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_unknown_key_lists_valid_keys() {
        let err = ModelError::UnknownKey {
            key: "frobnicate".into(),
            valid: "model, energy_max".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid parameter 'frobnicate'; valid parameters are: model, energy_max"
        );
    }

    #[test]
    fn test_config_helper() {
        let err = ModelError::config("transport axis must be periodic");
        assert!(matches!(err, ModelError::Config(ref m) if m.contains("periodic")));
    }
}
