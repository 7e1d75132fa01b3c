//! # tensorgrab: reading and expanding tensors dumped by quantum-chemistry programs
//!
//! tensorgrab recovers computed multi-index quantities from the textual dumps of two
//! quantum-chemistry programs and brings them into a common, fully indexed form so that they
//! can be compared element by element:
//! - *packed* dumps (see [`dump::packed`]) print a four-index quantity as a reduced
//!   three-dimensional array in which the `ij` and `kl` index pairs have been collapsed;
//! - *block* dumps (see [`dump::block`]) print a dense tensor of any rank as a sequence of
//!   rectangular blocks;
//! - the symmetry expansion (see [`expansion`]) rebuilds the full four-index tensor from a
//!   packed one, applying the exchange symmetry of its symmetric and antisymmetric components.
//!
//! The core operations are [`read_packed`], [`read_block`] and [`expand`]. All of them report
//! failures as [`TensorGrabError`] and never return a silently empty tensor.
//!
//! ## Examples and usage
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! use ndarray::Ix4;
//! use tensorgrab::{expand, read_block, read_packed};
//!
//! let packed = read_packed(BufReader::new(File::open("packed.out")?), "V")?;
//! let block = read_block(BufReader::new(File::open("block.out")?), "VF[mnij]")?
//!     .into_dimensionality::<Ix4>()?;
//! let (n0, n1, n2, n3) = block.dim();
//! let full = expand(&packed, [n0, n1, n2, n3])?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The `tensorgrab` binary runs the comparisons listed in a YAML input file (see
//! [`interfaces::input::Input`]); `tensorgrab --template input` writes a template of such a
//! file.

pub mod drivers;
pub mod dump;
pub mod error;
pub mod expansion;
pub mod interfaces;
pub mod io;

pub use dump::{read_block, read_packed};
pub use error::TensorGrabError;
pub use expansion::expand;
