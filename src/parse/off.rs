//! Loader for OFF / COFF crown meshes.
//!
//! Layout:
//!
//! ```text
//! OFF                 <- or COFF
//! V F N               <- vertex count, face count, unused edge count
//! x y z [r g b a]     <- V vertex rows; extra tokens are ignored
//! n i0 i1 ... in-1    <- F face rows; the leading size token is ignored
//! ```
//!
//! Blank lines are skipped. Coordinates are rounded to six decimals so that
//! noise from upstream exporters does not create spurious height differences.

use std::path::Path;

use super::{ParseError, ParseResult, content_lines, parse_f64, parse_usize};
use crate::geom::{CrownMesh, Face, Point3, round_to};

/// Header tags accepted on the first line.
pub const FORMAT_TAGS: [&str; 2] = ["OFF", "COFF"];

/// Decimal digits kept for every loaded coordinate.
pub const COORDINATE_DECIMALS: i32 = 6;

/// Reads an OFF/COFF file from disk.
pub fn load_off(path: impl AsRef<Path>) -> ParseResult<CrownMesh> {
    let path = path.as_ref();
    log::debug!("loading mesh {}", path.display());
    let text = std::fs::read_to_string(path)?;
    parse_off(&text)
}

/// Parses an OFF/COFF description into a [`CrownMesh`].
pub fn parse_off(input: &str) -> ParseResult<CrownMesh> {
    let mut lines = content_lines(input);

    let header = lines.next().map(|(_, line)| line).unwrap_or_default();
    if !FORMAT_TAGS.contains(&header) {
        return Err(ParseError::Format {
            found: header.to_owned(),
            expected: "OFF or COFF",
        });
    }

    let (counts_line, counts) = lines.next().ok_or(ParseError::Truncated {
        role: "counts",
        expected: 1,
        found: 0,
    })?;
    let counts: Vec<&str> = counts.split_whitespace().collect();
    if counts.len() < 2 {
        return Err(ParseError::MissingTokens {
            line: counts_line,
            role: "counts line",
            expected: 2,
            found: counts.len(),
        });
    }
    let vertex_count = parse_usize(counts_line, counts[0])?;
    let face_count = parse_usize(counts_line, counts[1])?;

    // Declared counts are untrusted until the rows are actually read.
    let mut vertices = Vec::new();
    for found in 0..vertex_count {
        let (line, text) = lines.next().ok_or(ParseError::Truncated {
            role: "vertex",
            expected: vertex_count,
            found,
        })?;
        vertices.push(parse_vertex(line, text)?);
    }

    let mut faces = Vec::new();
    for found in 0..face_count {
        let (line, text) = lines.next().ok_or(ParseError::Truncated {
            role: "face",
            expected: face_count,
            found,
        })?;
        faces.push(parse_face(line, text)?);
    }

    log::debug!("parsed {} vertices and {} faces", vertices.len(), faces.len());
    Ok(CrownMesh::new(vertices, faces)?)
}

fn parse_vertex(line: usize, text: &str) -> ParseResult<Point3> {
    let tokens: Vec<&str> = text.split_whitespace().take(3).collect();
    if tokens.len() < 3 {
        return Err(ParseError::MissingTokens {
            line,
            role: "vertex",
            expected: 3,
            found: tokens.len(),
        });
    }
    let mut coords = [0.0; 3];
    for (slot, token) in coords.iter_mut().zip(tokens) {
        *slot = round_to(parse_f64(line, token)?, COORDINATE_DECIMALS);
    }
    Ok(Point3::from(coords))
}

fn parse_face(line: usize, text: &str) -> ParseResult<Face> {
    let indices = text
        .split_whitespace()
        .skip(1)
        .map(|token| parse_usize(line, token))
        .collect::<ParseResult<Vec<usize>>>()?;
    Ok(Face::new(indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    const COFF_TRIANGLES: &str = "COFF
4 2 0
0.0 0.0 0.0 255 0 0 255
1.0 0.0 -0.5 255 0 0 255
0.0 1.0 0.0 255 0 0 255
1.0 1.0 0.25 255 0 0 255
3 0 1 2
3 1 3 2
";

    #[test]
    fn parses_colored_vertices_and_faces() {
        let mesh = parse_off(COFF_TRIANGLES).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.vertices()[1], Point3::new(1.0, 0.0, -0.5));
        assert_eq!(mesh.faces()[1].indices(), &[1, 3, 2]);
    }

    #[test]
    fn rounds_coordinates_to_six_decimals() {
        let mesh = parse_off("OFF\n1 0 0\n0.12345678 -1.0000004 2.9999996\n").unwrap();
        assert_eq!(mesh.vertices()[0], Point3::new(0.123_457, -1.0, 3.0));
    }

    #[test]
    fn rejects_unknown_header() {
        let err = parse_off("PLY\n0 0 0\n").unwrap_err();
        assert!(err.is_format_error());
        assert!(matches!(err, ParseError::Format { ref found, .. } if found == "PLY"));
    }

    #[test]
    fn short_vertex_row_is_an_index_error() {
        let err = parse_off("OFF\n1 0 0\n1.0 2.0\n").unwrap_err();
        assert!(err.is_index_error());
        assert!(matches!(
            err,
            ParseError::MissingTokens { line: 3, expected: 3, found: 2, .. }
        ));
    }

    #[test]
    fn short_counts_line_is_an_index_error() {
        let err = parse_off("OFF\n3\n").unwrap_err();
        assert!(err.is_index_error());
    }

    #[test]
    fn truncated_input_is_an_index_error() {
        let err = parse_off("OFF\n3 1 0\n0 0 0\n1 0 0\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::Truncated { role: "vertex", expected: 3, found: 2 }
        ));
    }

    #[test]
    fn oversized_declared_counts_are_truncated_input() {
        let err = parse_off("OFF\n100000000000 0 0\n0 0 0\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::Truncated { role: "vertex", expected: 100_000_000_000, found: 1 }
        ));

        let err = parse_off(&format!("OFF\n{} 0 0\n0 0 0\n", usize::MAX)).unwrap_err();
        assert!(err.is_index_error());

        let err = parse_off(&format!("OFF\n1 {} 0\n0 0 0\n", usize::MAX)).unwrap_err();
        assert!(matches!(err, ParseError::Truncated { role: "face", found: 0, .. }));
    }

    #[test]
    fn dangling_face_index_is_fatal() {
        let err = parse_off("OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 7\n").unwrap_err();
        assert!(matches!(err, ParseError::Mesh(_)));
        assert!(err.is_index_error());
    }

    #[test]
    fn non_numeric_coordinate_is_a_format_error() {
        let err = parse_off("OFF\n1 0 0\n0 zero 0\n").unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn blank_lines_are_skipped() {
        let mesh = parse_off("\nOFF\n\n3 1 0\n0 0 0\n\n1 0 0\n0 1 0\n3 0 1 2\n\n").unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
    }
}
