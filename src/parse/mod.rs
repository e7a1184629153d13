//! Readers for crown mesh descriptions and local-maxima tables.

pub mod maxima;
pub mod off;

use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

use crate::geom::MeshError;

/// Result type for parsing input files.
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors raised while reading an input file.
///
/// Every variant is fatal to the file being read. Callers that process many
/// files report the error and continue with the next one.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The header is not one of the accepted format tags.
    #[error("unrecognized format header `{found}` (expected {expected})")]
    Format { found: String, expected: &'static str },
    /// A line has fewer tokens than its role requires.
    #[error("line {line}: {role} needs {expected} tokens, found {found}")]
    MissingTokens {
        line: usize,
        role: &'static str,
        expected: usize,
        found: usize,
    },
    /// The input ended before all declared rows were read.
    #[error("input ended after {found} of {expected} {role} rows")]
    Truncated {
        role: &'static str,
        expected: usize,
        found: usize,
    },
    /// A coordinate could not be read as a number.
    #[error("line {line}: invalid number `{token}`: {source}")]
    Number {
        line: usize,
        token: String,
        source: ParseFloatError,
    },
    /// A count or vertex index could not be read as an unsigned integer.
    #[error("line {line}: invalid integer `{token}`: {source}")]
    Integer {
        line: usize,
        token: String,
        source: ParseIntError,
    },
    /// The faces reference vertices outside the vertex block.
    #[error("invalid mesh: {0}")]
    Mesh(#[from] MeshError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    /// True for errors about the layout or content of tokens, as opposed to
    /// missing data (short lines, truncated files, dangling indices) or IO.
    #[must_use]
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::Format { .. } | Self::Number { .. } | Self::Integer { .. }
        )
    }

    /// True for missing-data errors: short lines, truncated input and face
    /// indices that point past the vertex block.
    #[must_use]
    pub fn is_index_error(&self) -> bool {
        matches!(
            self,
            Self::MissingTokens { .. } | Self::Truncated { .. } | Self::Mesh(_)
        )
    }
}

/// Non-empty lines with their 1-based line numbers.
fn content_lines(input: &str) -> impl Iterator<Item = (usize, &str)> {
    input
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

fn parse_f64(line: usize, token: &str) -> ParseResult<f64> {
    token.parse::<f64>().map_err(|source| ParseError::Number {
        line,
        token: token.to_owned(),
        source,
    })
}

fn parse_usize(line: usize, token: &str) -> ParseResult<usize> {
    token.parse::<usize>().map_err(|source| ParseError::Integer {
        line,
        token: token.to_owned(),
        source,
    })
}
