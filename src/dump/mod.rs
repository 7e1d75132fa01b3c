//! Readers for the textual tensor dumps written by quantum-chemistry programs.
//!
//! Two dump conventions are supported:
//! - the *packed* format (see [`packed`]) in which a four-index quantity is printed as a reduced
//!   three-dimensional array with the `ij` and `kl` index pairs collapsed, one element per line,
//!   between `BEGIN TENSOR PRINT` and `END TENSOR PRINT` markers, and
//! - the *block* format (see [`block`]) in which an arbitrary-rank dense tensor is printed as a
//!   sequence of rectangular blocks, each block fixing all but the first two indices.

use std::io::{self, BufRead};
use std::mem;

use serde::{Deserialize, Serialize};

use crate::error::TensorGrabError;

pub mod block;
pub mod packed;

pub use block::{read_block, read_block_from_file, read_block_with_options, BlockReaderOptions};
pub use packed::{read_packed, read_packed_from_file};

#[cfg(test)]
#[path = "dump_tests.rs"]
mod dump_tests;

// ================
// Enum definitions
// ================

/// An enumerated type for the base of integer indices printed in a dump.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexBase {
    /// Variant for indices starting at zero.
    #[default]
    Zero,

    /// Variant for indices starting at one.
    One,
}

impl IndexBase {
    /// Converts an index printed in this base into a zero-based index.
    ///
    /// # Returns
    ///
    /// `None` if the printed index lies below the base.
    pub fn to_zero_based(&self, index: usize) -> Option<usize> {
        match self {
            IndexBase::Zero => Some(index),
            IndexBase::One => index.checked_sub(1),
        }
    }
}

// ==================
// Struct definitions
// ==================

/// Forward-only line source over a dump stream with one line of lookahead.
pub(crate) struct DumpLines<R: BufRead> {
    /// The underlying line iterator.
    lines: io::Lines<R>,

    /// A line that has been peeked at but not yet consumed.
    lookahead: Option<String>,

    /// The one-based number of the most recently consumed line.
    line_number: usize,
}

impl<R: BufRead> DumpLines<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            lookahead: None,
            line_number: 0,
        }
    }

    /// The one-based number of the most recently consumed line, or zero if nothing has been
    /// consumed yet.
    pub(crate) fn line_number(&self) -> usize {
        self.line_number
    }

    /// Consumes and returns the next line, or `None` at the end of the stream.
    pub(crate) fn next_line(&mut self) -> Result<Option<String>, TensorGrabError> {
        let line = match self.lookahead.take() {
            Some(line) => Some(line),
            None => self.lines.next().transpose()?,
        };
        if line.is_some() {
            self.line_number += 1;
        }
        Ok(line)
    }

    /// Returns the next line without consuming it.
    pub(crate) fn peek_line(&mut self) -> Result<Option<&str>, TensorGrabError> {
        if self.lookahead.is_none() {
            self.lookahead = self.lines.next().transpose()?;
        }
        Ok(self.lookahead.as_deref())
    }
}

// =========
// Functions
// =========

/// Parses a floating-point token, also accepting Fortran `D` exponents such as `1.5D-03`.
pub(crate) fn parse_float(token: &str) -> Option<f64> {
    token
        .parse::<f64>()
        .ok()
        .or_else(|| token.replace(['D', 'd'], "E").parse::<f64>().ok())
}

/// Computes the number of elements of an `f64` array with dimensions `dims`.
///
/// # Returns
///
/// `None` if the product of the non-zero dimensions overflows, or if an array of that many
/// `f64` elements could not be addressed.
pub(crate) fn checked_element_count(dims: &[usize]) -> Option<usize> {
    let non_zero_product = dims
        .iter()
        .filter(|&&d| d != 0)
        .try_fold(1_usize, |acc, &d| acc.checked_mul(d))?;
    if non_zero_product > isize::MAX as usize / mem::size_of::<f64>() {
        None
    } else if dims.contains(&0) {
        Some(0)
    } else {
        Some(non_zero_product)
    }
}
