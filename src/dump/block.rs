//! Reader for block tensor dumps.
//!
//! A block dump of a rank-4 tensor looks like
//!
//! ```text
//!  Dump of tensor Ctx::VF[mnij] (id 7)
//!  dim: (2 x 2 x 2 x 2) sym: [ 0 0 0 0 ]
//!
//!  Block [ m n 0 0 ]:
//!            0            1
//!     0   0.450000   0.000000
//!     1   0.000000   0.125000
//!
//!  Block [ m n 1 0 ]:
//!  ...
//! ```
//!
//! Each block fixes every index beyond the first two; its rows are indexed by the first axis and
//! its columns run over the second axis.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use lazy_static::lazy_static;
use log;
use ndarray::{ArrayD, IxDyn};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dump::{checked_element_count, parse_float, DumpLines, IndexBase};
use crate::error::TensorGrabError;

#[cfg(test)]
#[path = "block_tests.rs"]
mod block_tests;

const DUMP_PHRASE: &str = "Dump of tensor";
const BLOCK_KEYWORD: &str = "Block";

lazy_static! {
    static ref DIM_RE: Regex =
        Regex::new(r"dim:\s*\(([^)]*)\)").expect("Invalid dimension descriptor pattern.");
    static ref SYM_RE: Regex = Regex::new(r"sym:\s*(.*)$").expect("Invalid symmetry pattern.");
    static ref BRACKET_RE: Regex =
        Regex::new(r"\[([^\]]*)\]").expect("Invalid block index list pattern.");
}

// ==================
// Struct definitions
// ==================

/// A structure containing the index conventions of a block dump.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockReaderOptions {
    /// The base of the row index leading each data row.
    pub leading_index_base: IndexBase,

    /// The base of the fixed trailing indices in the bracketed list of each `Block` line.
    pub trailing_index_base: IndexBase,
}

impl fmt::Display for BlockReaderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "leading index base: {}, trailing index base: {}",
            base_str(self.leading_index_base),
            base_str(self.trailing_index_base),
        )
    }
}

/// The state of the block reader while working through the blocks of one tensor.
enum BlockState {
    /// Looking for the next `Block` line.
    Scanning,

    /// A `Block` line with the given zero-based fixed trailing indices has been read; its column
    /// header is next.
    AwaitingHeader(Vec<usize>),

    /// Reading data rows for the block with the given zero-based fixed trailing indices.
    ReadingRows(Vec<usize>),

    /// The rows of a block have been exhausted.
    BlockComplete,
}

// =========
// Functions
// =========

/// Reads a block tensor from a dump stream using zero-based indices throughout.
///
/// # Arguments
///
/// * `reader` - The dump stream.
/// * `name` - The name of the tensor, *e.g.* `VF[mnij]`.
///
/// # Returns
///
/// The dense tensor of the declared shape.
pub fn read_block<R: BufRead>(reader: R, name: &str) -> Result<ArrayD<f64>, TensorGrabError> {
    read_block_with_options(reader, name, &BlockReaderOptions::default())
}

/// Reads a block tensor from a dump file.
///
/// The file is held open only for the duration of the scan.
pub fn read_block_from_file<P: AsRef<Path>>(
    path: P,
    name: &str,
    options: &BlockReaderOptions,
) -> Result<ArrayD<f64>, TensorGrabError> {
    let f = File::open(path)?;
    read_block_with_options(BufReader::new(f), name, options)
}

/// Reads a block tensor from a dump stream.
///
/// # Arguments
///
/// * `reader` - The dump stream.
/// * `name` - The name of the tensor, *e.g.* `VF[mnij]`. Context-qualified names such as
/// `Ctx::VF[mnij]` in the dump also match.
/// * `options` - The index conventions of the dump.
///
/// # Returns
///
/// The dense tensor of the declared shape.
///
/// # Errors
///
/// * [`TensorGrabError::NotFound`] if no dump of this tensor exists.
/// * [`TensorGrabError::MalformedHeader`] if the `dim:` descriptor or a `Block` index list
/// cannot be parsed, or if the declared dimensions are too large to allocate.
/// * [`TensorGrabError::ShapeMismatch`] if a block or row index, or a row width, exceeds the
/// declared shape.
/// * [`TensorGrabError::TruncatedStream`] if the stream ends, or another tensor dump begins,
/// before all blocks of the declared shape have been read.
pub fn read_block_with_options<R: BufRead>(
    reader: R,
    name: &str,
    options: &BlockReaderOptions,
) -> Result<ArrayD<f64>, TensorGrabError> {
    let mut lines = DumpLines::new(reader);
    loop {
        match lines.next_line()? {
            Some(line) if is_dump_introduction(&line, name) => break,
            Some(_) => continue,
            None => return Err(TensorGrabError::NotFound(name.to_string())),
        }
    }
    log::debug!("Found block tensor `{name}` at line {}.", lines.line_number());

    let descriptor = lines.next_line()?.ok_or_else(|| {
        TensorGrabError::TruncatedStream(format!(
            "the stream ends directly after the dump introduction of block tensor `{name}`"
        ))
    })?;
    let dims = parse_dims(&descriptor).ok_or_else(|| {
        TensorGrabError::MalformedHeader(format!(
            "expected `dim: (d1 x ... x dn) sym: ...` at line {} for block tensor `{name}`, found `{}`",
            lines.line_number(),
            descriptor.trim()
        ))
    })?;
    if let Some(sym) = SYM_RE.captures(&descriptor).and_then(|caps| caps.get(1)) {
        log::debug!(
            "Block tensor `{name}` has dimensions {dims:?} and symmetry `{}`.",
            sym.as_str().trim()
        );
    } else {
        log::debug!("Block tensor `{name}` has dimensions {dims:?}.");
    }

    if checked_element_count(&dims).is_none() {
        return Err(TensorGrabError::MalformedHeader(format!(
            "declared dimensions {dims:?} of block tensor `{name}` are too large"
        )));
    }

    let mut tensor = ArrayD::<f64>::zeros(IxDyn(&dims));
    let n_blocks_expected = dims.iter().skip(2).product::<usize>();
    let mut n_blocks_read = 0_usize;
    let mut state = BlockState::Scanning;
    while n_blocks_read < n_blocks_expected {
        state = match state {
            BlockState::Scanning => {
                let line = lines.next_line()?.ok_or_else(|| {
                    TensorGrabError::TruncatedStream(format!(
                        "the stream ends after {n_blocks_read} of {n_blocks_expected} block(s) \
                        of block tensor `{name}`"
                    ))
                })?;
                if line.contains(DUMP_PHRASE) {
                    return Err(TensorGrabError::TruncatedStream(format!(
                        "another tensor dump begins at line {} after {n_blocks_read} of \
                        {n_blocks_expected} block(s) of block tensor `{name}`",
                        lines.line_number()
                    )));
                }
                if is_block_introduction(&line) {
                    let fixed = parse_block_indices(&line, &dims, options.trailing_index_base)
                        .map_err(|msg| {
                            TensorGrabError::MalformedHeader(format!(
                                "{msg} at line {} for block tensor `{name}`",
                                lines.line_number()
                            ))
                        })?;
                    check_block_indices(&fixed, &dims).map_err(|msg| {
                        TensorGrabError::ShapeMismatch(format!(
                            "{msg} at line {} for block tensor `{name}`",
                            lines.line_number()
                        ))
                    })?;
                    log::trace!("Reading block {fixed:?} of block tensor `{name}`.");
                    BlockState::AwaitingHeader(fixed)
                } else {
                    BlockState::Scanning
                }
            }
            BlockState::AwaitingHeader(fixed) => {
                lines.next_line()?.ok_or_else(|| {
                    TensorGrabError::TruncatedStream(format!(
                        "the stream ends before the column header of block {fixed:?} of block \
                        tensor `{name}`"
                    ))
                })?;
                BlockState::ReadingRows(fixed)
            }
            BlockState::ReadingRows(fixed) => {
                let row = lines.peek_line()?.and_then(parse_row);
                match row {
                    Some((row_index, values)) => {
                        lines.next_line()?;
                        fill_row(
                            &mut tensor,
                            &fixed,
                            row_index,
                            &values,
                            options.leading_index_base,
                        )
                        .map_err(|msg| {
                            TensorGrabError::ShapeMismatch(format!(
                                "{msg} at line {} for block tensor `{name}`",
                                lines.line_number()
                            ))
                        })?;
                        BlockState::ReadingRows(fixed)
                    }
                    None => BlockState::BlockComplete,
                }
            }
            BlockState::BlockComplete => {
                n_blocks_read += 1;
                BlockState::Scanning
            }
        };
    }
    log::debug!("Read {n_blocks_read} block(s) for block tensor `{name}`.");

    Ok(tensor)
}

fn base_str(base: IndexBase) -> &'static str {
    match base {
        IndexBase::Zero => "0",
        IndexBase::One => "1",
    }
}

fn is_dump_introduction(line: &str, name: &str) -> bool {
    let Some(pos) = line.find(DUMP_PHRASE) else {
        return false;
    };
    let rest = &line[pos + DUMP_PHRASE.len()..];
    if name.contains(char::is_whitespace) {
        return rest.contains(name);
    }
    rest.split_whitespace()
        .map(|token| token.trim_end_matches([':', ',', ';']))
        .any(|token| {
            token == name
                || token
                    .strip_suffix(name)
                    .map(|prefix| prefix.ends_with("::"))
                    .unwrap_or(false)
        })
}

fn is_block_introduction(line: &str) -> bool {
    line.split_whitespace()
        .next()
        .map(|first| first == BLOCK_KEYWORD || first.starts_with("Block["))
        .unwrap_or(false)
}

fn parse_dims(line: &str) -> Option<Vec<usize>> {
    let caps = DIM_RE.captures(line)?;
    let dims = caps
        .get(1)?
        .as_str()
        .split('x')
        .map(|d| d.trim().parse::<usize>().ok())
        .collect::<Option<Vec<_>>>()?;
    if dims.is_empty() {
        None
    } else {
        Some(dims)
    }
}

/// Parses the fixed trailing indices of a `Block` line into zero-based indices.
///
/// The first two entries of the bracketed list label the ranging axes and are ignored; every
/// later entry must be an integer.
fn parse_block_indices(line: &str, dims: &[usize], base: IndexBase) -> Result<Vec<usize>, String> {
    let tokens = BRACKET_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|list| list.as_str().split_whitespace().collect::<Vec<_>>())
        .unwrap_or_default();
    let n_fixed = dims.len().saturating_sub(2);
    let fixed_tokens = tokens.iter().skip(2).collect::<Vec<_>>();
    if fixed_tokens.len() != n_fixed {
        return Err(format!(
            "expected {n_fixed} fixed index(es) in the block index list `{}`, found {}",
            line.trim(),
            fixed_tokens.len()
        ));
    }
    fixed_tokens
        .into_iter()
        .map(|token| {
            let printed = token
                .parse::<usize>()
                .map_err(|_| format!("non-integer fixed block index `{token}`"))?;
            base.to_zero_based(printed)
                .ok_or_else(|| format!("fixed block index `{token}` lies below the index base"))
        })
        .collect()
}

fn check_block_indices(fixed: &[usize], dims: &[usize]) -> Result<(), String> {
    fixed
        .iter()
        .zip(dims.iter().skip(2))
        .enumerate()
        .try_for_each(|(axis, (&index, &dim))| {
            if index < dim {
                Ok(())
            } else {
                Err(format!(
                    "fixed block index {index} exceeds dimension {dim} of axis {}",
                    axis + 2
                ))
            }
        })
}

/// Parses a data row of the form `i v1 v2 ...`.
fn parse_row(line: &str) -> Option<(usize, Vec<f64>)> {
    let mut words = line.split_whitespace();
    let row_index = words.next()?.parse::<usize>().ok()?;
    let values = words.map(parse_float).collect::<Option<Vec<_>>>()?;
    if values.is_empty() {
        None
    } else {
        Some((row_index, values))
    }
}

fn fill_row(
    tensor: &mut ArrayD<f64>,
    fixed: &[usize],
    row_index: usize,
    values: &[f64],
    base: IndexBase,
) -> Result<(), String> {
    let shape = tensor.shape().to_vec();
    let row = base
        .to_zero_based(row_index)
        .filter(|&row| row < shape[0])
        .ok_or_else(|| {
            format!(
                "row index {row_index} lies outside the first dimension {}",
                shape[0]
            )
        })?;
    let width = shape.get(1).copied().unwrap_or(1);
    if values.len() > width {
        return Err(format!(
            "row {row_index} holds {} value(s) but the second dimension is {width}",
            values.len()
        ));
    }
    let mut index = Vec::with_capacity(shape.len());
    for (col, &value) in values.iter().enumerate() {
        index.clear();
        index.push(row);
        if shape.len() > 1 {
            index.push(col);
        }
        index.extend_from_slice(fixed);
        tensor[IxDyn(&index)] = value;
    }
    Ok(())
}
