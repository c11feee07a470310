//! Reading sub-arrays by canonical axis.

use crate::{
    extract, normalize, ArrayLayout, AxisSelection, CanonicalAxis, DimensionSelection,
    ReadPlan, ReadSubsetError, ReadableElement,
};
use ndarray::ArrayD;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::debug;

/// Options for one read.
///
/// | option     | default                  | effect                                        |
/// |------------|--------------------------|-----------------------------------------------|
/// | `select`   | every axis `All`         | indices kept along the named axis             |
/// | `order`    | canonical order          | axis order of the result                      |
/// | `optimize` | `true`                   | read only the box containing the selection    |
///
/// Turning `optimize` off reads the whole array and applies every selection
/// in memory. The result is identical either way; only the number of bytes
/// read differs.
///
/// # Example
///
/// ```
/// use ndarray_subread::{AxisSelection, CanonicalAxis, ReadOptions};
///
/// let options = ReadOptions::new()
///     .select(CanonicalAxis::Sensor, AxisSelection::Indices(vec![1, 2]))
///     .select(CanonicalAxis::Trial, AxisSelection::Indices(vec![2]))
///     .order(vec![CanonicalAxis::Trial, CanonicalAxis::Sensor, CanonicalAxis::Time]);
/// assert!(options.is_optimized());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadOptions {
    selections: BTreeMap<CanonicalAxis, AxisSelection>,
    order: Option<Vec<CanonicalAxis>>,
    optimize: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions {
            selections: BTreeMap::new(),
            order: None,
            optimize: true,
        }
    }
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the selection for `axis`, replacing any earlier one.
    #[must_use]
    pub fn select<S: Into<AxisSelection>>(mut self, axis: CanonicalAxis, selection: S) -> Self {
        self.selections.insert(axis, selection.into());
        self
    }

    /// Sets the axis order of the result. It must name every axis of the
    /// layout exactly once.
    #[must_use]
    pub fn order(mut self, order: Vec<CanonicalAxis>) -> Self {
        self.order = Some(order);
        self
    }

    #[must_use]
    pub fn optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    pub fn selection(&self, axis: CanonicalAxis) -> Option<&AxisSelection> {
        self.selections.get(&axis)
    }

    pub fn is_optimized(&self) -> bool {
        self.optimize
    }

    /// The result axis order for `layout`, checked against its axes.
    fn logical_order(&self, layout: &ArrayLayout) -> Result<Vec<CanonicalAxis>, ReadSubsetError> {
        match &self.order {
            None => Ok(layout.canonical_order()),
            Some(order) => {
                if order.len() != layout.axes().len() {
                    return Err(ReadSubsetError::InconsistentShape {
                        expected: layout.axes().len(),
                        found: order.len(),
                    });
                }
                for (i, axis) in order.iter().enumerate() {
                    layout.position(*axis)?;
                    if order[..i].contains(axis) {
                        return Err(ReadSubsetError::DuplicateAxis(*axis));
                    }
                }
                Ok(order.clone())
            }
        }
    }

    /// Selections in storage order with labels resolved.
    fn storage_selections(
        &self,
        layout: &ArrayLayout,
    ) -> Result<Vec<AxisSelection>, ReadSubsetError> {
        for &axis in self.selections.keys() {
            layout.position(axis)?;
        }
        layout
            .axes()
            .iter()
            .enumerate()
            .map(|(position, &axis)| {
                self.selections
                    .get(&axis)
                    .cloned()
                    .unwrap_or_default()
                    .resolve_labels(position, layout.labels(axis))
            })
            .collect()
    }
}

/// A non-empty sub-array together with the selection that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractedArray<A> {
    data: ArrayD<A>,
    axes: Vec<CanonicalAxis>,
    selection: Vec<DimensionSelection>,
    bytes_read: u64,
}

impl<A> ExtractedArray<A> {
    /// The data, with axes in the order given by [`axes`](Self::axes).
    pub fn data(&self) -> &ArrayD<A> {
        &self.data
    }

    pub fn into_data(self) -> ArrayD<A> {
        self.data
    }

    /// Canonical axis of each axis of the data.
    pub fn axes(&self) -> &[CanonicalAxis] {
        &self.axes
    }

    /// The resolved 1-based indices along each axis of the data.
    pub fn selection(&self) -> &[DimensionSelection] {
        &self.selection
    }

    /// Number of bytes read from the source.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

/// A selection that contains no elements. Nothing was read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmptySelection {
    axes: Vec<CanonicalAxis>,
    selection: Vec<DimensionSelection>,
}

impl EmptySelection {
    pub fn axes(&self) -> &[CanonicalAxis] {
        &self.axes
    }

    /// The resolved indices along each axis; at least one is empty.
    pub fn selection(&self) -> &[DimensionSelection] {
        &self.selection
    }

    /// Shape the result would have, with at least one zero.
    pub fn shape(&self) -> Vec<usize> {
        self.selection.iter().map(DimensionSelection::len).collect()
    }
}

/// Outcome of a read.
#[derive(Clone, Debug, PartialEq)]
pub enum Extraction<A> {
    Array(ExtractedArray<A>),
    /// The selection reduced to nothing along some axis.
    Empty(EmptySelection),
}

impl<A> Extraction<A> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Extraction::Empty(_))
    }

    /// Returns the extracted array, or `None` for an empty selection.
    pub fn into_array(self) -> Option<ExtractedArray<A>> {
        match self {
            Extraction::Array(array) => Some(array),
            Extraction::Empty(_) => None,
        }
    }

    /// Canonical axis of each axis of the result.
    pub fn axes(&self) -> &[CanonicalAxis] {
        match self {
            Extraction::Array(array) => array.axes(),
            Extraction::Empty(empty) => empty.axes(),
        }
    }

    /// The resolved 1-based indices along each axis of the result.
    pub fn selection(&self) -> &[DimensionSelection] {
        match self {
            Extraction::Array(array) => array.selection(),
            Extraction::Empty(empty) => empty.selection(),
        }
    }
}

/// Extension trait for reading sub-arrays from seekable sources.
///
/// # Example
///
/// ```
/// use ndarray_subread::{
///     ArrayLayout, AxisSelection, CanonicalAxis, ReadOptions, ReadSubsetExt,
/// };
/// use std::io::Cursor;
///
/// // 3 sensors x 2 samples of little-endian i16, sensor varying fastest.
/// let bytes: Vec<u8> = [10i16, 11, 12, 20, 21, 22]
///     .iter()
///     .flat_map(|v| v.to_le_bytes())
///     .collect();
/// let layout = ArrayLayout::from_axis_names(vec![3, 2], &["sensor", "time"], "<i2".parse()?)?;
/// let options = ReadOptions::new()
///     .select(CanonicalAxis::Sensor, AxisSelection::Indices(vec![3, 1]));
///
/// let out = Cursor::new(bytes).read_subset::<i16>(&layout, &options)?;
/// let out = out.into_array().unwrap();
/// assert_eq!(out.data().shape(), &[2, 2]);
/// assert_eq!(out.data()[[0, 1]], 22);
/// assert_eq!(out.data()[[1, 0]], 10);
/// # Ok::<_, ndarray_subread::ReadSubsetError>(())
/// ```
pub trait ReadSubsetExt: Read + Seek {
    /// Reads the sub-array selected by `options` from the array described by
    /// `layout`.
    ///
    /// The element type `A` must match the layout's encoding. An empty
    /// selection returns [`Extraction::Empty`] without touching the source.
    ///
    /// Selection errors carry the canonical axis they refer to. A source
    /// shorter than the layout fails with `ReadSubsetError::Io`.
    fn read_subset<A: ReadableElement>(
        &mut self,
        layout: &ArrayLayout,
        options: &ReadOptions,
    ) -> Result<Extraction<A>, ReadSubsetError>;
}

impl<R: Read + Seek> ReadSubsetExt for R {
    fn read_subset<A: ReadableElement>(
        &mut self,
        layout: &ArrayLayout,
        options: &ReadOptions,
    ) -> Result<Extraction<A>, ReadSubsetError> {
        let order = options.logical_order(layout)?;
        let permutation = order
            .iter()
            .map(|&axis| layout.position(axis))
            .collect::<Result<Vec<_>, _>>()?;
        let normalized = options
            .storage_selections(layout)
            .and_then(|selections| normalize(layout.shape(), &selections))
            .map_err(|err| err.with_canonical_axes(layout.axes()))?;

        if normalized.is_empty() {
            debug!(shape = ?normalized.shape(), "selection is empty, nothing to read");
            return Ok(Extraction::Empty(EmptySelection {
                selection: permute(normalized.axes(), &permutation),
                axes: order,
            }));
        }

        layout.data_end()?;
        let plan = ReadPlan::new(
            layout.shape(),
            &normalized,
            layout.encoding(),
            layout.data_offset(),
            options.optimize,
        )?;
        let data = extract(self, &plan, layout.encoding(), &permutation)?;
        Ok(Extraction::Array(ExtractedArray {
            data,
            selection: permute(normalized.axes(), &permutation),
            axes: order,
            bytes_read: plan.byte_count(),
        }))
    }
}

/// Reorders per-storage-axis selections into result order.
fn permute(selection: &[DimensionSelection], permutation: &[usize]) -> Vec<DimensionSelection> {
    permutation.iter().map(|&p| selection[p].clone()).collect()
}

/// Opens the file at `path` read-only and reads a sub-array from it.
///
/// Fails with `ReadSubsetError::Io` if the file is shorter than the layout
/// requires.
pub fn read_subset_from_path<A, P>(
    path: P,
    layout: &ArrayLayout,
    options: &ReadOptions,
) -> Result<Extraction<A>, ReadSubsetError>
where
    A: ReadableElement,
    P: AsRef<Path>,
{
    let mut file = File::open(path)?;
    layout.check_source_len(file.metadata()?.len())?;
    file.read_subset(layout, options)
}
