//! Array shapes, canonical axes and the layout of an array in its source.

use crate::{ElementEncoding, ReadSubsetError};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::str::FromStr;

/// Axis extents in storage order, fastest-varying axis first.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArrayShape(Vec<usize>);

/// Widest supported element, in bytes.
const MAX_ELEMENT_SIZE: u64 = 8;

impl ArrayShape {
    /// Returns `ReadSubsetError::InvalidShape` if `extents` is empty,
    /// contains a zero, or describes more elements than fit in `usize` or
    /// more bytes of the widest element than fit in `u64`.
    pub fn new(extents: Vec<usize>) -> Result<Self, ReadSubsetError> {
        let elements = extents
            .iter()
            .try_fold(1usize, |acc, &extent| acc.checked_mul(extent));
        let fits = elements
            .and_then(|n| (n as u64).checked_mul(MAX_ELEMENT_SIZE))
            .is_some();
        if extents.is_empty() || extents.contains(&0) || !fits {
            Err(ReadSubsetError::InvalidShape(extents))
        } else {
            Ok(ArrayShape(extents))
        }
    }

    pub fn ndim(&self) -> usize {
        self.0.len()
    }

    pub fn extents(&self) -> &[usize] {
        &self.0
    }

    /// Total number of elements. Cannot overflow, see [`ArrayShape::new`].
    pub fn len(&self) -> usize {
        self.0.iter().product()
    }

    /// Always `false`, since every extent is at least 1.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl TryFrom<Vec<usize>> for ArrayShape {
    type Error = ReadSubsetError;

    fn try_from(extents: Vec<usize>) -> Result<Self, Self::Error> {
        ArrayShape::new(extents)
    }
}

impl TryFrom<&[usize]> for ArrayShape {
    type Error = ReadSubsetError;

    fn try_from(extents: &[usize]) -> Result<Self, Self::Error> {
        ArrayShape::new(extents.to_vec())
    }
}

/// The recognized semantic axes.
///
/// The declaration order is the canonical logical order: sensor ×
/// frequency × time × trial.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanonicalAxis {
    Sensor,
    Frequency,
    Time,
    Trial,
}

impl CanonicalAxis {
    pub fn name(&self) -> &'static str {
        match self {
            CanonicalAxis::Sensor => "sensor",
            CanonicalAxis::Frequency => "frequency",
            CanonicalAxis::Time => "time",
            CanonicalAxis::Trial => "trial",
        }
    }
}

impl fmt::Display for CanonicalAxis {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CanonicalAxis {
    type Err = ReadSubsetError;

    /// Case-insensitive, with the usual header aliases (`chan`, `freq`,
    /// `sample`, `rpt`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sensor" | "sensors" | "chan" | "channel" | "channels" => Ok(CanonicalAxis::Sensor),
            "freq" | "frequency" | "frequencies" => Ok(CanonicalAxis::Frequency),
            "time" | "sample" | "samples" => Ok(CanonicalAxis::Time),
            "trial" | "trials" | "rpt" | "epoch" | "segment" => Ok(CanonicalAxis::Trial),
            _ => Err(ReadSubsetError::UnknownAxis(s.to_owned())),
        }
    }
}

/// Where and how an array is stored in its source.
///
/// This is what a header parser hands to the reader: the storage-order
/// shape, which canonical axis each storage axis is, the element encoding,
/// and the byte offset at which the data starts.
///
/// # Example
///
/// ```
/// use ndarray_subread::{ArrayLayout, ElementEncoding};
///
/// let layout = ArrayLayout::from_axis_names(
///     vec![4, 10, 2],
///     &["chan", "time", "rpt"],
///     "float32".parse::<ElementEncoding>()?,
/// )?
/// .with_data_offset(512);
/// assert_eq!(layout.data_len(), 4 * 10 * 2 * 4);
/// # Ok::<_, ndarray_subread::ReadSubsetError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayLayout {
    shape: ArrayShape,
    axes: Vec<CanonicalAxis>,
    encoding: ElementEncoding,
    data_offset: u64,
    labels: BTreeMap<CanonicalAxis, Vec<String>>,
}

impl ArrayLayout {
    /// `axes[i]` names storage axis `i`.
    pub fn new(
        shape: ArrayShape,
        axes: Vec<CanonicalAxis>,
        encoding: ElementEncoding,
    ) -> Result<Self, ReadSubsetError> {
        if axes.len() != shape.ndim() {
            return Err(ReadSubsetError::InconsistentShape {
                expected: shape.ndim(),
                found: axes.len(),
            });
        }
        for (i, axis) in axes.iter().enumerate() {
            if axes[..i].contains(axis) {
                return Err(ReadSubsetError::DuplicateAxis(*axis));
            }
        }
        Ok(ArrayLayout {
            shape,
            axes,
            encoding,
            data_offset: 0,
            labels: BTreeMap::new(),
        })
    }

    /// Builds a layout from axis names as found in a header. Unknown names
    /// fail with `ReadSubsetError::UnknownAxis`.
    pub fn from_axis_names<S: AsRef<str>>(
        extents: Vec<usize>,
        names: &[S],
        encoding: ElementEncoding,
    ) -> Result<Self, ReadSubsetError> {
        let axes = names
            .iter()
            .map(|name| name.as_ref().parse())
            .collect::<Result<Vec<CanonicalAxis>, _>>()?;
        ArrayLayout::new(ArrayShape::new(extents)?, axes, encoding)
    }

    #[must_use]
    pub fn with_data_offset(mut self, data_offset: u64) -> Self {
        self.data_offset = data_offset;
        self
    }

    /// Attaches labels (e.g. channel names) to `axis`, enabling
    /// [`AxisSelection::Labels`](crate::AxisSelection::Labels).
    pub fn with_labels<S: Into<String>>(
        mut self,
        axis: CanonicalAxis,
        labels: Vec<S>,
    ) -> Result<Self, ReadSubsetError> {
        let position = self.position(axis)?;
        let extent = self.shape.extents()[position];
        if labels.len() != extent {
            return Err(ReadSubsetError::LabelCount {
                axis,
                labels: labels.len(),
                extent,
            });
        }
        self.labels
            .insert(axis, labels.into_iter().map(Into::into).collect());
        Ok(self)
    }

    pub fn shape(&self) -> &ArrayShape {
        &self.shape
    }

    /// Canonical axis of each storage axis.
    pub fn axes(&self) -> &[CanonicalAxis] {
        &self.axes
    }

    pub fn encoding(&self) -> &ElementEncoding {
        &self.encoding
    }

    pub fn data_offset(&self) -> u64 {
        self.data_offset
    }

    pub fn labels(&self, axis: CanonicalAxis) -> Option<&[String]> {
        self.labels.get(&axis).map(|labels| &labels[..])
    }

    /// Storage position of `axis`.
    pub fn position(&self, axis: CanonicalAxis) -> Result<usize, ReadSubsetError> {
        self.axes
            .iter()
            .position(|&a| a == axis)
            .ok_or(ReadSubsetError::AxisNotInLayout(axis))
    }

    /// Number of bytes occupied by the array data.
    pub fn data_len(&self) -> u64 {
        self.shape.len() as u64 * self.encoding.size()
    }

    /// Byte offset just past the end of the array data.
    ///
    /// Fails with `ReadSubsetError::DataRangeOverflow` if that overflows
    /// `u64`.
    pub fn data_end(&self) -> Result<u64, ReadSubsetError> {
        self.data_offset
            .checked_add(self.data_len())
            .ok_or(ReadSubsetError::DataRangeOverflow {
                data_offset: self.data_offset,
                data_len: self.data_len(),
            })
    }

    /// The layout's axes sorted into canonical logical order.
    pub fn canonical_order(&self) -> Vec<CanonicalAxis> {
        let mut order = self.axes.clone();
        order.sort();
        order
    }

    /// Checks that a source of `source_len` bytes holds the whole array.
    ///
    /// Returns `ReadSubsetError::Io` with kind `UnexpectedEof` otherwise.
    pub fn check_source_len(&self, source_len: u64) -> Result<(), ReadSubsetError> {
        let needed = self.data_end()?;
        if source_len < needed {
            Err(ReadSubsetError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "source holds {} bytes but the array ends at byte {}",
                    source_len, needed
                ),
            )))
        } else {
            Ok(())
        }
    }
}
