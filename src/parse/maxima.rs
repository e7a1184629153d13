//! Reader for local-maxima tables.
//!
//! A table starts with the exact header `X Y Z`, followed by one point per
//! line. Rows that do not have exactly three tokens are skipped.

use std::path::Path;

use super::{ParseError, ParseResult, content_lines, parse_f64};
use crate::geom::Point3;

pub const MAXIMA_HEADER: [&str; 3] = ["X", "Y", "Z"];

pub fn load_local_maxima(path: impl AsRef<Path>) -> ParseResult<Vec<Point3>> {
    let text = std::fs::read_to_string(path.as_ref())?;
    parse_local_maxima(&text)
}

pub fn parse_local_maxima(input: &str) -> ParseResult<Vec<Point3>> {
    let mut lines = content_lines(input);

    let header = lines.next().map(|(_, line)| line).unwrap_or_default();
    if !header.split_whitespace().eq(MAXIMA_HEADER) {
        return Err(ParseError::Format {
            found: header.to_owned(),
            expected: "X Y Z",
        });
    }

    let mut points = Vec::new();
    for (line, text) in lines {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let [x, y, z] = tokens.as_slice() else {
            log::debug!("line {line}: skipping row with {} tokens", tokens.len());
            continue;
        };
        points.push(Point3::new(
            parse_f64(line, x)?,
            parse_f64(line, y)?,
            parse_f64(line, z)?,
        ));
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_points_and_skips_malformed_rows() {
        let points = parse_local_maxima("X Y Z\n1 2 3\n4 5\n-1.5 0 2.25\n7 8 9 10\n").unwrap();
        assert_eq!(points, vec![Point3::new(1.0, 2.0, 3.0), Point3::new(-1.5, 0.0, 2.25)]);
    }

    #[test]
    fn header_must_match_exactly() {
        assert!(parse_local_maxima("x y z\n1 2 3\n").unwrap_err().is_format_error());
        assert!(parse_local_maxima("X Y Z W\n1 2 3\n").unwrap_err().is_format_error());
        assert!(parse_local_maxima("").unwrap_err().is_format_error());
    }

    #[test]
    fn header_only_yields_no_points() {
        assert!(parse_local_maxima("X Y Z\n").unwrap().is_empty());
    }

    #[test]
    fn non_numeric_row_is_rejected() {
        assert!(parse_local_maxima("X Y Z\n1 two 3\n").unwrap_err().is_format_error());
    }
}
