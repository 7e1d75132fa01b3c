//! File input and output for tensorgrab.
//!
//! Two kinds of files are handled: YAML input files describing the comparisons to be carried
//! out, and `bincode` files holding full tensors expanded from packed dumps so that they can be
//! inspected without re-reading the dumps.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{self, Context};
use bincode;
use ndarray::Array4;
use serde::{de::DeserializeOwned, Serialize};
use serde_yaml;

pub(crate) mod format;

#[cfg(test)]
#[path = "io_tests.rs"]
mod io_tests;

/// Extension appended to the names of expanded tensor files.
pub const EXPANDED_TENSOR_EXT: &str = "tgrab.full";

/// Returns the path of the expanded tensor file with the given name.
///
/// The extension is appended rather than substituted, so that names containing dots are kept
/// whole.
pub fn expanded_tensor_path<P: AsRef<Path>>(name: P) -> PathBuf {
    let mut path = name.as_ref().as_os_str().to_owned();
    path.push(".");
    path.push(EXPANDED_TENSOR_EXT);
    PathBuf::from(path)
}

/// Writes a full tensor expanded from a packed tensor into a binary file.
///
/// # Arguments
///
/// * `name` - The name of the file to be written. The file will have the
/// [`EXPANDED_TENSOR_EXT`] extension appended.
/// * `full` - The full tensor.
///
/// # Returns
///
/// The path of the written file.
pub fn write_expanded_tensor<P: AsRef<Path>>(
    name: P,
    full: &Array4<f64>,
) -> Result<PathBuf, anyhow::Error> {
    let path = expanded_tensor_path(name);
    let f = File::create(&path)
        .with_context(|| format!("Unable to create expanded tensor file {}", path.display()))?;
    let mut writer = BufWriter::new(f);
    bincode::serialize_into(&mut writer, full)
        .with_context(|| format!("Unable to write expanded tensor to {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Unable to write expanded tensor to {}", path.display()))?;
    log::debug!(
        "Expanded tensor of shape {:?} written to {}.",
        full.shape(),
        path.display()
    );
    Ok(path)
}

/// Reads a full tensor written by [`write_expanded_tensor`].
///
/// # Arguments
///
/// * `name` - The name of the file without the [`EXPANDED_TENSOR_EXT`] extension.
pub fn read_expanded_tensor<P: AsRef<Path>>(name: P) -> Result<Array4<f64>, anyhow::Error> {
    let path = expanded_tensor_path(name);
    let f = File::open(&path)
        .with_context(|| format!("Unable to open expanded tensor file {}", path.display()))?;
    bincode::deserialize_from(BufReader::new(f))
        .with_context(|| format!("Unable to read expanded tensor from {}", path.display()))
}

/// Reads a tensorgrab YAML input file and deserialises it into an appropriate structure.
///
/// # Arguments
///
/// * `path` - The path to the file, including its `.yml` or `.yaml` extension.
pub fn read_tensorgrab_yaml<T, P>(path: P) -> Result<T, anyhow::Error>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let f = File::open(path)
        .with_context(|| format!("Unable to open YAML file {}", path.display()))?;
    serde_yaml::from_reader(BufReader::new(f))
        .with_context(|| format!("Unable to parse YAML file {}", path.display()))
}

/// Serialises a structure into a tensorgrab YAML file.
///
/// # Arguments
///
/// * `name` - The name of the file. Any existing extension is replaced by `.yml`.
/// * `value` - The structure to be written.
///
/// # Returns
///
/// The path of the written file.
pub fn write_tensorgrab_yaml<T, P>(name: P, value: &T) -> Result<PathBuf, anyhow::Error>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = name.as_ref().with_extension("yml");
    let f = File::create(&path)
        .with_context(|| format!("Unable to create YAML file {}", path.display()))?;
    let mut writer = BufWriter::new(f);
    serde_yaml::to_writer(&mut writer, value)
        .with_context(|| format!("Unable to write YAML file {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Unable to write YAML file {}", path.display()))?;
    Ok(path)
}
