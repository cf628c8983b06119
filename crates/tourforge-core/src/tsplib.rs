//! Reading point sets from TSPLIB-style files.
//!
//! Only the parts needed for 2-D Euclidean instances are understood: header
//! lines (`NAME : wi29`, `DIMENSION : 29`, ...) are skipped, coordinates are
//! read from `id x y` rows and parsing stops at `EOF`.
//!
//! ```
//! use tourforge_core::tsplib::parse_points;
//!
//! let text = "NAME : tiny\nTYPE : TSP\nNODE_COORD_SECTION\n1 0.0 0.0\n2 3.0 4.0\nEOF\n";
//! let points = parse_points(text).unwrap();
//! assert_eq!(points.len(), 2);
//! assert_eq!(points[1].y, 4.0);
//! ```

use std::fs;
use std::path::Path;

use crate::{Point, Result, TourForgeError};

const SECTION_HEADER: &str = "NODE_COORD_SECTION";
const EOF_MARKER: &str = "EOF";

/// Parses a TSPLIB-style document into points.
///
/// When a `NODE_COORD_SECTION` header is present only rows after it are read.
/// Otherwise header lines are skipped until the first row that starts with a
/// number.
pub fn parse_points(text: &str) -> Result<Vec<Point>> {
    let has_section = text.lines().any(|l| l.trim() == SECTION_HEADER);
    let mut in_section = !has_section;
    let mut points = Vec::new();

    for (line_no, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if line == EOF_MARKER {
            break;
        }
        if !in_section {
            in_section = line == SECTION_HEADER;
            continue;
        }
        if points.is_empty() && !starts_numeric(line) {
            // Header lines of section-less files
            continue;
        }
        points.push(parse_row(line, line_no + 1)?);
    }

    Ok(points)
}

/// Reads and parses a point file.
pub fn read_points(path: impl AsRef<Path>) -> Result<Vec<Point>> {
    let contents = fs::read_to_string(path)?;
    parse_points(&contents)
}

fn starts_numeric(line: &str) -> bool {
    line.chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '+' || c == '.')
}

fn parse_row(line: &str, line_no: usize) -> Result<Point> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 3 {
        return Err(TourForgeError::invalid_data(format!(
            "line {line_no}: expected `id x y`, got `{line}`"
        )));
    }

    let parse = |field: &str| {
        field.parse::<f64>().map_err(|_| {
            TourForgeError::invalid_data(format!("line {line_no}: invalid coordinate `{field}`"))
        })
    };

    let point = Point::new(parse(fields[1])?, parse(fields[2])?);
    if !point.is_finite() {
        return Err(TourForgeError::invalid_data(format!(
            "line {line_no}: coordinates must be finite"
        )));
    }
    Ok(point)
}
