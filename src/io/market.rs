//! Matrix Market coordinate-format reader.
//!
//! Parses the banner, size line and entry lines of a `.mtx` file into a
//! [`CooMatrix`]. Only real-valued coordinate matrices are accepted, and
//! only square ones. A `symmetric` banner means the file stores one
//! triangle; the reader mirrors every off-diagonal entry so the triplet
//! matrix holds full unsymmetric storage.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use num_traits::Float;
use tracing::debug;

use crate::error::CgError;
use crate::matrix::CooMatrix;

const BANNER: &str = "%%matrixmarket";

pub fn read_file<T: Float>(path: &Path) -> Result<CooMatrix<T>, CgError> {
    read(BufReader::new(File::open(path)?))
}

pub fn read<T: Float, R: BufRead>(reader: R) -> Result<CooMatrix<T>, CgError> {
    let mut lines = reader.lines().enumerate();

    let (line_no, banner) = match lines.next() {
        Some((i, line)) => (i + 1, line?),
        None => return Err(parse_error(1, "empty file")),
    };
    let symmetric = parse_banner(line_no, &banner)?;

    // Comment lines may follow the banner before the size line.
    let (line_no, size_line) = loop {
        match lines.next() {
            Some((i, line)) => {
                let line = line?;
                let trimmed = line.trim();
                if !trimmed.is_empty() && !trimmed.starts_with('%') {
                    break (i + 1, line);
                }
            }
            None => return Err(parse_error(line_no, "missing size line")),
        }
    };
    let (rows, cols, declared_nz) = parse_size(line_no, &size_line)?;
    if rows != cols {
        return Err(CgError::NonSquare { rows, cols });
    }

    let mut coo = CooMatrix::with_capacity(rows, if symmetric { 2 * declared_nz } else { declared_nz });
    let mut seen = 0usize;
    for (i, line) in lines {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }
        let (row, col, value) = parse_entry::<T>(i + 1, trimmed, rows)?;
        coo.push(row, col, value);
        if symmetric && row != col {
            coo.push(col, row, value);
        }
        seen += 1;
    }
    if seen != declared_nz {
        return Err(parse_error(
            line_no,
            &format!("expected {declared_nz} entries, found {seen}"),
        ));
    }

    debug!(n = coo.n, nz = coo.nz, symmetric, "matrix loaded");
    Ok(coo)
}

/// Returns whether the banner declares symmetric storage.
fn parse_banner(line_no: usize, line: &str) -> Result<bool, CgError> {
    let lower = line.to_ascii_lowercase();
    let fields: Vec<&str> = lower.split_whitespace().collect();
    if fields.len() != 5 || fields[0] != BANNER {
        return Err(parse_error(line_no, "not a Matrix Market banner"));
    }
    if fields[1] != "matrix" || fields[2] != "coordinate" {
        return Err(CgError::UnsupportedMatrixType(format!(
            "{} {}, need a coordinate matrix",
            fields[1], fields[2]
        )));
    }
    if fields[3] != "real" {
        return Err(CgError::UnsupportedMatrixType(format!(
            "field {}, only real is supported",
            fields[3]
        )));
    }
    match fields[4] {
        "general" => Ok(false),
        "symmetric" => Ok(true),
        other => Err(CgError::UnsupportedMatrixType(format!(
            "symmetry {other}, only general and symmetric are supported"
        ))),
    }
}

fn parse_size(line_no: usize, line: &str) -> Result<(usize, usize, usize), CgError> {
    let mut fields = line.split_whitespace();
    let mut next = |name| {
        fields
            .next()
            .and_then(|f| f.parse::<usize>().ok())
            .ok_or_else(|| parse_error(line_no, &format!("bad size line: missing {name}")))
    };
    Ok((next("rows")?, next("columns")?, next("nonzeros")?))
}

fn parse_entry<T: Float>(
    line_no: usize,
    line: &str,
    n: usize,
) -> Result<(usize, usize, T), CgError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 3 {
        return Err(parse_error(line_no, "entry needs row, column and value"));
    }
    let row: usize = fields[0]
        .parse()
        .map_err(|_| parse_error(line_no, "bad row index"))?;
    let col: usize = fields[1]
        .parse()
        .map_err(|_| parse_error(line_no, "bad column index"))?;
    if row == 0 || row > n || col == 0 || col > n {
        return Err(parse_error(line_no, "index out of range"));
    }
    let value = fields[2]
        .parse::<f64>()
        .ok()
        .and_then(T::from)
        .ok_or_else(|| parse_error(line_no, "bad value"))?;
    // Adjust from 1-based to 0-based.
    Ok((row - 1, col - 1, value))
}

fn parse_error(line: usize, msg: &str) -> CgError {
    CgError::Parse { line, msg: msg.to_string() }
}
