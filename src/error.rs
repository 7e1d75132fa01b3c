//! Errors raised while reading tensor dumps and expanding packed tensors.

use std::error::Error;
use std::fmt;
use std::io;

/// An enumerated type for the failures of the tensor readers and of the symmetry expansion.
///
/// None of the readers ever returns a zero-filled or partially filled tensor in place of one of
/// these failures.
#[derive(Debug)]
pub enum TensorGrabError {
    /// The requested tensor name is absent from the dump stream. The associated string is the
    /// requested name.
    NotFound(String),

    /// A header or descriptor line (dimensions, block index list) cannot be parsed.
    MalformedHeader(String),

    /// A data line inside a tensor cannot be parsed.
    MalformedRecord(String),

    /// Dimensions, coordinates or target shapes are mutually inconsistent.
    ShapeMismatch(String),

    /// The stream ended (or the next tensor began) before the current tensor was complete.
    TruncatedStream(String),

    /// The underlying stream could not be read.
    Io(io::Error),
}

impl fmt::Display for TensorGrabError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TensorGrabError::NotFound(name) => {
                write!(f, "Tensor `{name}` not found in the dump stream.")
            }
            TensorGrabError::MalformedHeader(msg) => write!(f, "Malformed tensor header: {msg}"),
            TensorGrabError::MalformedRecord(msg) => write!(f, "Malformed tensor record: {msg}"),
            TensorGrabError::ShapeMismatch(msg) => write!(f, "Shape mismatch: {msg}"),
            TensorGrabError::TruncatedStream(msg) => write!(f, "Truncated dump stream: {msg}"),
            TensorGrabError::Io(err) => write!(f, "Unable to read dump stream: {err}"),
        }
    }
}

impl Error for TensorGrabError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TensorGrabError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for TensorGrabError {
    fn from(err: io::Error) -> Self {
        TensorGrabError::Io(err)
    }
}
