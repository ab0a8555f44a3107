use std::str::{FromStr, SplitWhitespace};

use crate::error::{GpError, Result};

/// Whitespace separated token reader used by the textual load functions.
pub struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            inner: text.split_whitespace(),
        }
    }

    /// Parses the next token as `T`; `what` names the field in the error.
    pub fn next<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let token = self
            .inner
            .next()
            .ok_or_else(|| GpError::Load(format!("unexpected end of input reading {}", what)))?;

        token
            .parse()
            .map_err(|_| GpError::Load(format!("malformed {}: '{}'", what, token)))
    }
}
