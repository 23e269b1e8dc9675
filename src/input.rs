//! Whitespace-tokenized positional readers for the run-directory files.
//!
//! Every format is strict: values are consumed in order, nothing has a
//! default, and a missing or malformed token is reported with the file name
//! and the field that was expected.

use std::fs;
use std::path::Path;
use std::str::{FromStr, SplitWhitespace};

use log::debug;

use crate::error::{ModelError, Result};
use crate::Real;

/// Read a whole input file, mapping failures to an error naming the path.
pub fn read_file(path: &Path) -> Result<String> {
    debug!("reading {}", path.display());
    fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Like [`read_file`], but a missing file is `Ok(None)`.
pub fn read_optional_file(path: &Path) -> Result<Option<String>> {
    if path.exists() {
        read_file(path).map(Some)
    } else {
        debug!("{} not present", path.display());
        Ok(None)
    }
}

/// Sequential token cursor over one input file.
pub struct Tokens<'a> {
    source_name: String,
    iter: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    pub fn new(source_name: impl Into<String>, text: &'a str) -> Self {
        Self {
            source_name: source_name.into(),
            iter: text.split_whitespace(),
        }
    }

    fn next_parsed<T: FromStr>(&mut self, field: &'static str) -> Result<T> {
        let token = self.iter.next().ok_or_else(|| ModelError::UnexpectedEof {
            source_name: self.source_name.clone(),
            field,
        })?;
        token.parse().map_err(|_| ModelError::Parse {
            source_name: self.source_name.clone(),
            field,
            token: token.to_string(),
        })
    }

    pub fn next_usize(&mut self, field: &'static str) -> Result<usize> {
        self.next_parsed(field)
    }

    pub fn next_i64(&mut self, field: &'static str) -> Result<i64> {
        self.next_parsed(field)
    }

    pub fn next_real(&mut self, field: &'static str) -> Result<Real> {
        self.next_parsed(field)
    }
}

/// Parse a count-prefixed list of reals (energy and time-step files).
pub fn parse_grid(source_name: &str, text: &str, what: &'static str) -> Result<Vec<Real>> {
    let mut tokens = Tokens::new(source_name, text);
    let count = tokens.next_usize(what)?;
    if count == 0 {
        return Err(ModelError::config(format!(
            "{source_name}: number of {what} must be positive"
        )));
    }
    (0..count).map(|_| tokens.next_real(what)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grid() {
        let grid = parse_grid("energy.in", "3\n-1.0 0.0\n2.5\n", "energies").unwrap();
        assert_eq!(grid, vec![-1.0, 0.0, 2.5]);
    }

    #[test]
    fn test_parse_grid_ignores_trailing_tokens() {
        let grid = parse_grid("energy.in", "1 0.5 junk", "energies").unwrap();
        assert_eq!(grid, vec![0.5]);
    }

    #[test]
    fn test_parse_grid_too_short() {
        let err = parse_grid("energy.in", "4 1.0 2.0", "energies").unwrap_err();
        assert!(matches!(err, ModelError::UnexpectedEof { field: "energies", .. }));
    }

    #[test]
    fn test_parse_grid_zero_count() {
        let err = parse_grid("time_step.in", "0", "time steps").unwrap_err();
        assert!(matches!(err, ModelError::Config(_)));
    }

    #[test]
    fn test_bad_token_is_reported() {
        let mut tokens = Tokens::new("lattice.in", "4 x");
        assert_eq!(tokens.next_usize("cells").unwrap(), 4);
        let err = tokens.next_usize("cells").unwrap_err();
        assert_eq!(err.to_string(), "lattice.in: cannot parse 'x' as cells");
    }

    #[test]
    fn test_negative_is_not_a_usize() {
        let mut tokens = Tokens::new("neighbor.in", "-1");
        assert!(tokens.next_usize("neighbor index").is_err());
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = read_file(Path::new("/nonexistent/run/para.in")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/run/para.in"));
    }

    #[test]
    fn test_optional_missing_file() {
        assert!(read_optional_file(Path::new("/nonexistent/hopping.in"))
            .unwrap()
            .is_none());
    }
}
