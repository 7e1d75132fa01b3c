//! Reader for packed tensor dumps.
//!
//! A packed dump looks like
//!
//! ```text
//! BEGIN TENSOR PRINT: V
//! dims: 3 3 2
//!     1     1     1   0.4500000000E+00
//!     2     1     1  -0.1250000000E-01
//!   ...
//! END TENSOR PRINT
//! ```
//!
//! where each record gives the one-based coordinates `x y z` followed by the value.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log;
use ndarray::Array3;

use crate::dump::{checked_element_count, parse_float, DumpLines};
use crate::error::TensorGrabError;

#[cfg(test)]
#[path = "packed_tests.rs"]
mod packed_tests;

const BEGIN_MARKER: &str = "BEGIN TENSOR PRINT:";
const END_MARKER: &str = "END TENSOR PRINT";
const DIMS_PREFIX: &str = "dims:";

/// Reads a packed tensor from a dump stream.
///
/// # Arguments
///
/// * `reader` - The dump stream.
/// * `name` - The name of the tensor as given after `BEGIN TENSOR PRINT:`.
///
/// # Returns
///
/// The packed tensor of shape `(nz, ny, nx)` indexed as `[z, y, x]`, with all unlisted elements
/// set to zero.
///
/// # Errors
///
/// * [`TensorGrabError::NotFound`] if no begin-marker with this name exists.
/// * [`TensorGrabError::MalformedHeader`] if the `dims:` line cannot be parsed or declares
/// dimensions too large to allocate.
/// * [`TensorGrabError::MalformedRecord`] if a data line cannot be parsed.
/// * [`TensorGrabError::ShapeMismatch`] if a coordinate lies outside the declared dimensions.
/// * [`TensorGrabError::TruncatedStream`] if the stream ends, or another packed tensor begins,
/// before the end-marker.
pub fn read_packed<R: BufRead>(reader: R, name: &str) -> Result<Array3<f64>, TensorGrabError> {
    let mut lines = DumpLines::new(reader);
    loop {
        match lines.next_line()? {
            Some(line) if is_begin_marker(&line, name) => break,
            Some(_) => continue,
            None => return Err(TensorGrabError::NotFound(name.to_string())),
        }
    }
    log::debug!("Found packed tensor `{name}` at line {}.", lines.line_number());

    let header = lines.next_line()?.ok_or_else(|| {
        TensorGrabError::TruncatedStream(format!(
            "the stream ends directly after the begin-marker of packed tensor `{name}`"
        ))
    })?;
    let (nx, ny, nz) = parse_dims(&header).ok_or_else(|| {
        TensorGrabError::MalformedHeader(format!(
            "expected `{DIMS_PREFIX} nx ny nz` at line {} for packed tensor `{name}`, found `{}`",
            lines.line_number(),
            header.trim()
        ))
    })?;
    if checked_element_count(&[nz, ny, nx]).is_none() {
        return Err(TensorGrabError::MalformedHeader(format!(
            "declared dimensions ({nx}, {ny}, {nz}) of packed tensor `{name}` are too large"
        )));
    }
    log::debug!("Packed tensor `{name}` has dimensions (nx, ny, nz) = ({nx}, {ny}, {nz}).");

    let mut tensor = Array3::<f64>::zeros((nz, ny, nx));
    let mut n_records = 0_usize;
    loop {
        let line = lines.next_line()?.ok_or_else(|| {
            TensorGrabError::TruncatedStream(format!(
                "no `{END_MARKER}` found for packed tensor `{name}` after {n_records} record(s)"
            ))
        })?;
        if line.contains(END_MARKER) {
            break;
        }
        if line.contains(BEGIN_MARKER) {
            return Err(TensorGrabError::TruncatedStream(format!(
                "another packed tensor begins at line {} before `{END_MARKER}` of packed tensor \
                `{name}` after {n_records} record(s)",
                lines.line_number()
            )));
        }
        if line.trim().is_empty() {
            continue;
        }
        let line_number = lines.line_number();
        let ([x, y, z], value) = parse_record(&line).ok_or_else(|| {
            TensorGrabError::MalformedRecord(format!(
                "expected `x y z value` at line {line_number} for packed tensor `{name}`, found `{}`",
                line.trim()
            ))
        })?;
        let index = match (
            to_packed_index(x, nx),
            to_packed_index(y, ny),
            to_packed_index(z, nz),
        ) {
            (Some(ix), Some(iy), Some(iz)) => [iz, iy, ix],
            _ => {
                return Err(TensorGrabError::ShapeMismatch(format!(
                    "one-based coordinates ({x}, {y}, {z}) at line {line_number} lie outside \
                    the declared dimensions ({nx}, {ny}, {nz}) of packed tensor `{name}`"
                )))
            }
        };
        tensor[index] = value;
        n_records += 1;
    }
    log::debug!("Read {n_records} record(s) for packed tensor `{name}`.");

    Ok(tensor)
}

/// Reads a packed tensor from a dump file.
///
/// The file is held open only for the duration of the scan.
///
/// # Arguments
///
/// * `path` - The path to the dump file.
/// * `name` - The name of the tensor as given after `BEGIN TENSOR PRINT:`.
pub fn read_packed_from_file<P: AsRef<Path>>(
    path: P,
    name: &str,
) -> Result<Array3<f64>, TensorGrabError> {
    let f = File::open(path)?;
    read_packed(BufReader::new(f), name)
}

fn is_begin_marker(line: &str, name: &str) -> bool {
    line.find(BEGIN_MARKER)
        .map(|pos| line[pos + BEGIN_MARKER.len()..].trim() == name)
        .unwrap_or(false)
}

fn parse_dims(line: &str) -> Option<(usize, usize, usize)> {
    let dims = line
        .trim()
        .strip_prefix(DIMS_PREFIX)?
        .split_whitespace()
        .map(|d| d.parse::<usize>().ok())
        .collect::<Option<Vec<_>>>()?;
    match dims.as_slice() {
        &[nx, ny, nz] => Some((nx, ny, nz)),
        _ => None,
    }
}

fn parse_record(line: &str) -> Option<([usize; 3], f64)> {
    let words = line.split_whitespace().collect::<Vec<_>>();
    match words.as_slice() {
        &[x, y, z, value] => Some((
            [x.parse().ok()?, y.parse().ok()?, z.parse().ok()?],
            parse_float(value)?,
        )),
        _ => None,
    }
}

/// Converts a one-based coordinate into a zero-based index below `dim`.
fn to_packed_index(coordinate: usize, dim: usize) -> Option<usize> {
    coordinate.checked_sub(1).filter(|&i| i < dim)
}
