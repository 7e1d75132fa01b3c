//! Driver for comparing a packed tensor against a block tensor of the same quantity.
//!
//! The packed tensor is expanded into a full four-index tensor of the shape declared by the
//! block dump, and the two are then compared element by element.

use std::fmt;
use std::path::PathBuf;

use anyhow::{self, format_err, Context};
use approx::AbsDiffEq;
use derive_builder::Builder;
use ndarray::{Array4, Ix4};
use serde::{Deserialize, Serialize};

use crate::drivers::TensorGrabDriver;
use crate::dump::{read_block_from_file, read_packed_from_file, BlockReaderOptions};
use crate::error::TensorGrabError;
use crate::expansion::{expand, populated_mask};
use crate::io::format::{
    log_subtitle, log_title, nice_bool, tensorgrab_output, tensorgrab_warn, TensorGrabOutput,
};
use crate::io::{expanded_tensor_path, write_expanded_tensor};

#[cfg(test)]
#[path = "tensor_comparison_tests.rs"]
mod tensor_comparison_tests;

// ================
// Enum definitions
// ================

/// An enumerated type for the set of full-tensor elements taking part in a comparison.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonScope {
    /// Variant for comparing only the elements assigned by the symmetry expansion.
    #[default]
    Populated,

    /// Variant for comparing every element of the full tensor.
    All,
}

impl fmt::Display for ComparisonScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonScope::Populated => write!(f, "elements populated by the expansion"),
            ComparisonScope::All => write!(f, "all elements"),
        }
    }
}

// ==================
// Struct definitions
// ==================

// ----------
// Parameters
// ----------

fn default_threshold() -> f64 {
    1e-10
}

/// A structure containing control parameters for packed/block tensor comparison.
#[derive(Clone, Builder, Debug, Serialize, Deserialize)]
pub struct TensorComparisonParams {
    /// Path to the dump file containing the packed tensor.
    #[builder(setter(into))]
    pub packed_file: PathBuf,

    /// Name of the packed tensor as given after `BEGIN TENSOR PRINT:`.
    #[builder(setter(into))]
    pub packed_name: String,

    /// Path to the dump file containing the block tensor.
    #[builder(setter(into))]
    pub block_file: PathBuf,

    /// Name of the block tensor, *e.g.* `VF[mnij]`.
    #[builder(setter(into))]
    pub block_name: String,

    /// Index conventions of the block dump.
    #[builder(default = "BlockReaderOptions::default()")]
    #[serde(default)]
    pub block_options: BlockReaderOptions,

    /// Absolute threshold below which two elements are considered equal.
    #[builder(default = "default_threshold()")]
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// The set of full-tensor elements to be compared.
    #[builder(default = "ComparisonScope::default()")]
    #[serde(default)]
    pub scope: ComparisonScope,

    /// Optional name for saving the expanded tensor as a binary file, to which the
    /// [`crate::io::EXPANDED_TENSOR_EXT`] extension is appended. If `None`, the expanded tensor
    /// will not be saved.
    #[builder(default = "None")]
    #[serde(default)]
    pub expanded_save_name: Option<String>,
}

impl TensorComparisonParams {
    /// Returns a builder to construct a [`TensorComparisonParams`] structure.
    pub fn builder() -> TensorComparisonParamsBuilder {
        TensorComparisonParamsBuilder::default()
    }
}

impl Default for TensorComparisonParams {
    fn default() -> Self {
        TensorComparisonParams::builder()
            .packed_file("path/to/packed/dump")
            .packed_name("V")
            .block_file("path/to/block/dump")
            .block_name("VF[mnij]")
            .build()
            .expect("Unable to build a default `TensorComparisonParams`.")
    }
}

impl fmt::Display for TensorComparisonParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Packed tensor: `{}` in {}",
            self.packed_name,
            self.packed_file.display()
        )?;
        writeln!(
            f,
            "Block tensor: `{}` in {}",
            self.block_name,
            self.block_file.display()
        )?;
        writeln!(f, "Block dump conventions: {}", self.block_options)?;
        writeln!(f)?;
        writeln!(f, "Comparison scope: {}", self.scope)?;
        writeln!(f, "Comparison threshold: {:.3e}", self.threshold)?;
        writeln!(
            f,
            "Save expanded tensor to file: {}",
            if let Some(name) = self.expanded_save_name.as_ref() {
                expanded_tensor_path(name).display().to_string()
            } else {
                nice_bool(false)
            }
        )?;
        writeln!(f)?;

        Ok(())
    }
}

// ------
// Result
// ------

/// A structure to contain packed/block tensor comparison results.
#[derive(Clone, Builder, Debug)]
pub struct TensorComparisonResult<'a> {
    /// The control parameters used to obtain this set of comparison results.
    parameters: &'a TensorComparisonParams,

    /// The full tensor expanded from the packed tensor.
    pub expanded: Array4<f64>,

    /// The number of elements compared.
    pub n_compared: usize,

    /// The number of compared elements differing by more than the threshold.
    pub n_mismatches: usize,

    /// The largest absolute deviation amongst the compared elements.
    pub max_deviation: f64,

    /// The index of the element with the largest absolute deviation, or `None` if no elements
    /// were compared.
    pub max_deviation_index: Option<[usize; 4]>,
}

impl<'a> TensorComparisonResult<'a> {
    fn builder() -> TensorComparisonResultBuilder<'a> {
        TensorComparisonResultBuilder::default()
    }

    /// Returns the control parameters used to obtain this set of comparison results.
    pub fn parameters(&self) -> &TensorComparisonParams {
        self.parameters
    }

    /// Returns `true` if no compared elements differ by more than the threshold.
    pub fn agrees(&self) -> bool {
        self.n_mismatches == 0
    }
}

impl<'a> fmt::Display for TensorComparisonResult<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = self.expanded.shape();
        writeln!(
            f,
            "Full tensor shape: ({})",
            shape
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(" x ")
        )?;
        writeln!(f, "Compared elements: {}", self.n_compared)?;
        writeln!(f, "Mismatching elements: {}", self.n_mismatches)?;
        if let Some([i, j, k, l]) = self.max_deviation_index {
            writeln!(
                f,
                "Largest absolute deviation: {:.3e} at ({i}, {j}, {k}, {l})",
                self.max_deviation
            )?;
        }
        writeln!(f, "Tensors agree: {}", nice_bool(self.agrees()))?;

        Ok(())
    }
}

// ------
// Driver
// ------

/// A driver for comparing a packed tensor against a block tensor.
#[derive(Clone, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct TensorComparisonDriver<'a> {
    /// The control parameters for the comparison.
    parameters: &'a TensorComparisonParams,

    /// The result of the comparison.
    #[builder(setter(skip), default = "None")]
    result: Option<TensorComparisonResult<'a>>,
}

impl<'a> TensorComparisonDriverBuilder<'a> {
    fn validate(&self) -> Result<(), String> {
        let params = self
            .parameters
            .ok_or("No tensor comparison parameters found.".to_string())?;
        if params.threshold.is_finite() && params.threshold > 0.0 {
            Ok(())
        } else {
            Err(format!(
                "The comparison threshold must be positive and finite, but {} was given.",
                params.threshold
            ))
        }
    }
}

impl<'a> TensorComparisonDriver<'a> {
    /// Returns a builder to construct a [`TensorComparisonDriver`] structure.
    pub fn builder() -> TensorComparisonDriverBuilder<'a> {
        TensorComparisonDriverBuilder::default()
    }

    fn compare_tensors(&mut self) -> Result<(), anyhow::Error> {
        let params = self.parameters;
        log_title(&format!(
            "Tensor Comparison: {} vs {}",
            params.packed_name, params.block_name
        ));
        tensorgrab_output!("");
        params.log_output_display();

        let block = read_block_from_file(
            &params.block_file,
            &params.block_name,
            &params.block_options,
        )
        .with_context(|| {
            format!(
                "Unable to read block tensor `{}` from {}",
                params.block_name,
                params.block_file.display()
            )
        })?;
        let block_shape = block.shape().to_vec();
        let block = block.into_dimensionality::<Ix4>().map_err(|_| {
            TensorGrabError::ShapeMismatch(format!(
                "block tensor `{}` has shape {block_shape:?}, but a four-index tensor is required",
                params.block_name
            ))
        })?;
        let (n0, n1, n2, n3) = block.dim();
        let shape = [n0, n1, n2, n3];

        let packed =
            read_packed_from_file(&params.packed_file, &params.packed_name).with_context(|| {
                format!(
                    "Unable to read packed tensor `{}` from {}",
                    params.packed_name,
                    params.packed_file.display()
                )
            })?;
        let expanded = expand(&packed, shape).with_context(|| {
            format!(
                "Unable to expand packed tensor `{}` into the shape {shape:?} of block tensor `{}`",
                params.packed_name, params.block_name
            )
        })?;
        let mask = match params.scope {
            ComparisonScope::Populated => Some(populated_mask(&packed, shape)?),
            ComparisonScope::All => None,
        };

        let mut n_compared = 0;
        let mut n_mismatches = 0;
        let mut max_deviation = 0.0;
        let mut max_deviation_index = None;
        for ((i, j, k, l), expanded_value) in expanded.indexed_iter() {
            if mask.as_ref().map(|m| !m[[i, j, k, l]]).unwrap_or(false) {
                continue;
            }
            let block_value = block[[i, j, k, l]];
            n_compared += 1;
            if !expanded_value.abs_diff_eq(&block_value, params.threshold) {
                n_mismatches += 1;
                log::debug!(
                    "Element ({i}, {j}, {k}, {l}): expanded {expanded_value:+.10e}, block {block_value:+.10e}"
                );
            }
            let deviation = (expanded_value - block_value).abs();
            if max_deviation_index.is_none() || deviation > max_deviation {
                max_deviation = deviation;
                max_deviation_index = Some([i, j, k, l]);
            }
        }

        if let Some(name) = params.expanded_save_name.as_ref() {
            let path = write_expanded_tensor(name, &expanded)?;
            tensorgrab_output!("Expanded tensor saved to {}.", path.display());
            tensorgrab_output!("");
        }

        let result = TensorComparisonResult::builder()
            .parameters(params)
            .expanded(expanded)
            .n_compared(n_compared)
            .n_mismatches(n_mismatches)
            .max_deviation(max_deviation)
            .max_deviation_index(max_deviation_index)
            .build()
            .map_err(|err| format_err!(err))?;

        log_subtitle("Comparison result");
        tensorgrab_output!("");
        result.log_output_display();
        tensorgrab_output!("");
        if !result.agrees() {
            tensorgrab_warn!(
                "{n_mismatches} of {n_compared} compared element(s) differ by more than {:.3e}.",
                params.threshold
            );
        }

        self.result = Some(result);
        Ok(())
    }
}

impl<'a> TensorGrabDriver for TensorComparisonDriver<'a> {
    type Params = TensorComparisonParams;

    type Outcome = TensorComparisonResult<'a>;

    fn result(&self) -> Result<&Self::Outcome, anyhow::Error> {
        self.result
            .as_ref()
            .ok_or_else(|| format_err!("No tensor comparison results found."))
    }

    fn run(&mut self) -> Result<(), anyhow::Error> {
        self.compare_tensors()
    }
}
