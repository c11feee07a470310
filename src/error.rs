use crate::{CanonicalAxis, ElementEncoding};
use ndarray::ShapeError;
use std::io;
use thiserror::Error;

/// An error reading a sub-array.
///
/// An empty selection is not an error; see
/// [`Extraction::Empty`](crate::Extraction::Empty).
#[derive(Debug, Error)]
pub enum ReadSubsetError {
    /// A requested index lies outside `1..=extent` for its axis.
    ///
    /// `axis` is the storage position. `canonical` names the axis when the
    /// selection was made through a layout.
    #[error("index {index} is out of range for axis {axis} (valid range is 1..={extent})")]
    SelectionOutOfRange {
        axis: usize,
        canonical: Option<CanonicalAxis>,
        index: i64,
        extent: usize,
    },
    /// A selection could not be interpreted for its axis.
    #[error("invalid selection for axis {axis}: {reason}")]
    InvalidSelection {
        axis: usize,
        canonical: Option<CanonicalAxis>,
        reason: String,
    },
    /// The number of axes in a selection or ordering does not match the
    /// array.
    #[error("expected {expected} axes, found {found}")]
    InconsistentShape { expected: usize, found: usize },
    /// An axis permutation is not a permutation of the array's axes.
    #[error("{0:?} is not a permutation of the array axes")]
    InvalidPermutation(Vec<usize>),
    /// An array shape with no axes, with a zero-length axis, or too large to
    /// address in bytes.
    #[error("invalid array shape {0:?}")]
    InvalidShape(Vec<usize>),
    /// The data offset plus the size of the array overflows `u64`.
    #[error("{data_len} bytes of data at offset {data_offset} overflow the byte range")]
    DataRangeOverflow { data_offset: u64, data_len: u64 },
    /// An element encoding with no known decode rule.
    #[error("unsupported element encoding: {0}")]
    UnsupportedEncoding(String),
    /// The declared encoding cannot be decoded as the requested element type.
    #[error("declared encoding {declared} cannot be read as {requested}")]
    EncodingMismatch {
        requested: &'static str,
        declared: ElementEncoding,
    },
    /// An axis name that is not one of the canonical axes.
    #[error("unknown axis name: {0:?}")]
    UnknownAxis(String),
    /// The same canonical axis appears twice in a layout.
    #[error("axis {0} appears more than once")]
    DuplicateAxis(CanonicalAxis),
    /// A selection or ordering names an axis the layout does not have.
    #[error("axis {0} is not present in the array layout")]
    AxisNotInLayout(CanonicalAxis),
    /// The number of labels for an axis does not match its extent.
    #[error("axis {axis} has extent {extent} but {labels} labels were given")]
    LabelCount {
        axis: CanonicalAxis,
        labels: usize,
        extent: usize,
    },
    /// An error caused by I/O, including a source shorter than the layout
    /// requires.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The decoded data did not match the planned shape.
    #[error("data did not match the planned shape: {0}")]
    Shape(#[from] ShapeError),
}

impl ReadSubsetError {
    /// Fills in the canonical axis of selection errors, given the canonical
    /// axis of each storage position.
    pub(crate) fn with_canonical_axes(self, axes: &[CanonicalAxis]) -> Self {
        match self {
            ReadSubsetError::SelectionOutOfRange {
                axis,
                canonical: None,
                index,
                extent,
            } => ReadSubsetError::SelectionOutOfRange {
                axis,
                canonical: axes.get(axis).copied(),
                index,
                extent,
            },
            ReadSubsetError::InvalidSelection {
                axis,
                canonical: None,
                reason,
            } => ReadSubsetError::InvalidSelection {
                axis,
                canonical: axes.get(axis).copied(),
                reason,
            },
            other => other,
        }
    }
}
