//! YAML input files for tensorgrab.

use anyhow::{self, ensure, Context};
use serde::{Deserialize, Serialize};

use crate::drivers::tensor_comparison::{TensorComparisonDriver, TensorComparisonParams};
use crate::drivers::TensorGrabDriver;
use crate::interfaces::InputHandle;
use crate::io::format::{log_subtitle, tensorgrab_output};

#[cfg(test)]
#[path = "input_tests.rs"]
mod input_tests;

/// A structure containing tensorgrab input parameters which can be serialised into and
/// deserialised from a YAML input file.
#[derive(Clone, Serialize, Deserialize)]
pub struct Input {
    /// Packed/block tensor comparisons to be carried out, in order.
    ///
    /// # Default
    ///
    /// If not specified, this will be taken to be empty.
    #[serde(default)]
    pub comparisons: Vec<TensorComparisonParams>,
}

impl Default for Input {
    fn default() -> Self {
        Input {
            comparisons: vec![TensorComparisonParams::default()],
        }
    }
}

impl InputHandle for Input {
    /// Runs every comparison in turn and summarises the outcomes.
    ///
    /// # Errors
    ///
    /// Errors if any comparison cannot be carried out, or if any pair of compared tensors does
    /// not agree.
    fn handle(&self) -> Result<(), anyhow::Error> {
        let outcomes = self
            .comparisons
            .iter()
            .enumerate()
            .map(|(i, tc_params)| {
                let mut tc_driver = TensorComparisonDriver::builder()
                    .parameters(tc_params)
                    .build()
                    .with_context(|| format!("Unable to construct tensor comparison driver #{i}"))?;
                tc_driver
                    .run()
                    .with_context(|| format!("Unable to run tensor comparison driver #{i}"))?;
                tc_driver.result().map(|res| {
                    (
                        format!("{} vs {}", tc_params.packed_name, tc_params.block_name),
                        res.agrees(),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if !outcomes.is_empty() {
            log_subtitle("Summary of tensor comparisons");
            tensorgrab_output!("");
            let width = outcomes
                .iter()
                .map(|(label, _)| label.chars().count())
                .max()
                .unwrap_or(0)
                .max(10);
            tensorgrab_output!("{}", "┈".repeat(width + 15));
            tensorgrab_output!(" {:<width$}  {:>10}", "Comparison", "Agreement");
            tensorgrab_output!("{}", "┈".repeat(width + 15));
            outcomes.iter().for_each(|(label, agrees)| {
                tensorgrab_output!(
                    " {:<width$}  {:>10}",
                    label,
                    if *agrees { "yes" } else { "no" }
                );
            });
            tensorgrab_output!("{}", "┈".repeat(width + 15));
            tensorgrab_output!("");
        }

        let n_disagreements = outcomes.iter().filter(|(_, agrees)| !agrees).count();
        ensure!(
            n_disagreements == 0,
            "{n_disagreements} of {} tensor comparison(s) found disagreements.",
            outcomes.len()
        );
        Ok(())
    }
}
