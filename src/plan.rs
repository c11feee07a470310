//! Planning of the byte range to read for a selection.
//!
//! Data is stored with the first storage axis varying fastest. A plan reads
//! a single contiguous box of the array: some leading (fast) axes in full,
//! one *pivot* axis over a bounded run, and the remaining (slow) axes pinned
//! to a single index each. Whatever the box over-reads is removed afterwards
//! by per-axis residual filters.

use crate::{ArrayShape, DimensionSelection, ElementEncoding, NormalizedSelection, ReadSubsetError};
use itertools::izip;
use tracing::debug;

/// How one storage axis is read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AxisPlan {
    start: usize,
    count: usize,
    stride: u64,
    skip: u64,
    filter: Option<Vec<usize>>,
}

impl AxisPlan {
    /// 0-based index of the first element read along the axis.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Number of indices read along the axis.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Bytes between consecutive indices of the axis in the source.
    pub fn stride(&self) -> u64 {
        self.stride
    }

    /// Length in bytes of one contiguous run along this axis.
    ///
    /// Together with [`skip`](Self::skip) this describes where the box lies
    /// in the source. The read itself is a single contiguous range.
    pub fn run_bytes(&self) -> u64 {
        self.count as u64 * self.stride
    }

    /// Bytes between the end of one run along this axis and the start of
    /// the next one (the next index of the following, slower axis).
    ///
    /// Describes the source layout only; skipped bytes inside the box are
    /// still read and then dropped by the residual filters.
    pub fn skip(&self) -> u64 {
        self.skip
    }

    /// Indices to keep after decoding, relative to `start`, or `None` if
    /// everything read along the axis is wanted as is.
    pub fn filter(&self) -> Option<&[usize]> {
        self.filter.as_deref()
    }
}

/// A byte range to read and how to turn it into the selected sub-array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadPlan {
    offset: u64,
    byte_count: u64,
    axes: Vec<AxisPlan>,
}

impl ReadPlan {
    /// Plans a read of `selection` from an array of `shape` starting at byte
    /// `data_offset`, using [`ReadPlan::optimized`] if `optimize` is `true`
    /// and [`ReadPlan::full`] otherwise.
    pub fn new(
        shape: &ArrayShape,
        selection: &NormalizedSelection,
        encoding: &ElementEncoding,
        data_offset: u64,
        optimize: bool,
    ) -> Result<Self, ReadSubsetError> {
        let plan = if optimize {
            ReadPlan::optimized(shape, selection, encoding, data_offset)?
        } else {
            ReadPlan::full(shape, selection, encoding, data_offset)?
        };
        debug!(
            optimize,
            offset = plan.offset,
            byte_count = plan.byte_count,
            array_bytes = shape.len() as u64 * encoding.size(),
            "planned read"
        );
        Ok(plan)
    }

    /// Reads the whole array and applies every selection after decoding.
    ///
    /// `selection` must have been normalized against `shape`, else this
    /// fails with `InconsistentShape` or `SelectionOutOfRange`.
    pub fn full(
        shape: &ArrayShape,
        selection: &NormalizedSelection,
        encoding: &ElementEncoding,
        data_offset: u64,
    ) -> Result<Self, ReadSubsetError> {
        check_selection(shape, selection)?;
        let windows = shape.extents().iter().map(|&extent| (0, extent)).collect();
        Ok(ReadPlan::from_windows(
            shape,
            selection,
            encoding,
            data_offset,
            windows,
        ))
    }

    /// Reads the smallest contiguous box that contains the selection.
    ///
    /// Walking from the slowest axis, every axis selecting a single distinct
    /// index is pinned to it. The first axis selecting more (the pivot) is
    /// read from its smallest to its largest selected index, and all faster
    /// axes are read in full.
    pub fn optimized(
        shape: &ArrayShape,
        selection: &NormalizedSelection,
        encoding: &ElementEncoding,
        data_offset: u64,
    ) -> Result<Self, ReadSubsetError> {
        check_selection(shape, selection)?;
        let sel = selection.axes();
        let mut pivot = shape.ndim() - 1;
        while pivot > 0 && is_single(&sel[pivot]) {
            pivot -= 1;
        }
        let windows = izip!(shape.extents(), sel)
            .enumerate()
            .map(|(axis, (&extent, sel))| {
                if axis < pivot {
                    (0, extent)
                } else {
                    match sel.offset_bounds() {
                        Some((min, max)) => (min, max - min + 1),
                        None => (0, 0),
                    }
                }
            })
            .collect();
        Ok(ReadPlan::from_windows(
            shape,
            selection,
            encoding,
            data_offset,
            windows,
        ))
    }

    /// Builds the plan reading `windows[i] = (start, count)` along each axis.
    fn from_windows(
        shape: &ArrayShape,
        selection: &NormalizedSelection,
        encoding: &ElementEncoding,
        data_offset: u64,
        windows: Vec<(usize, usize)>,
    ) -> Self {
        let extents = shape.extents();
        let mut strides = Vec::with_capacity(extents.len() + 1);
        strides.push(encoding.size());
        for &extent in extents {
            let last = strides[strides.len() - 1];
            strides.push(last * extent as u64);
        }

        let mut offset = data_offset;
        let mut byte_count = encoding.size();
        let axes = izip!(windows, selection.axes(), strides.windows(2))
            .map(|((start, count), sel, stride)| {
                offset += start as u64 * stride[0];
                byte_count *= count as u64;
                let filter = if sel.is_run(start, count) {
                    None
                } else {
                    Some(sel.offsets().map(|i| i - start).collect())
                };
                AxisPlan {
                    start,
                    count,
                    stride: stride[0],
                    skip: stride[1] - count as u64 * stride[0],
                    filter,
                }
            })
            .collect();
        ReadPlan {
            offset,
            byte_count,
            axes,
        }
    }

    /// Absolute byte offset of the first byte to read.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Number of bytes to read.
    pub fn byte_count(&self) -> u64 {
        self.byte_count
    }

    pub fn axes(&self) -> &[AxisPlan] {
        &self.axes
    }

    /// Shape of the block read from the source, in storage order.
    pub fn read_shape(&self) -> Vec<usize> {
        self.axes.iter().map(AxisPlan::count).collect()
    }

    /// Number of elements read from the source.
    pub fn read_len(&self) -> usize {
        self.axes.iter().map(AxisPlan::count).product()
    }
}

/// Checks that `selection` has one in-range entry list per axis of `shape`.
fn check_selection(
    shape: &ArrayShape,
    selection: &NormalizedSelection,
) -> Result<(), ReadSubsetError> {
    if selection.axes().len() != shape.ndim() {
        return Err(ReadSubsetError::InconsistentShape {
            expected: shape.ndim(),
            found: selection.axes().len(),
        });
    }
    for (axis, (sel, &extent)) in selection.axes().iter().zip(shape.extents()).enumerate() {
        match sel.offset_bounds() {
            Some((_, max)) if max >= extent => {
                return Err(ReadSubsetError::SelectionOutOfRange {
                    axis,
                    canonical: None,
                    index: max as i64 + 1,
                    extent,
                })
            }
            Some(_) => {}
            None => {
                return Err(ReadSubsetError::InvalidSelection {
                    axis,
                    canonical: None,
                    reason: "cannot plan a read for an empty selection".to_owned(),
                })
            }
        }
    }
    Ok(())
}

fn is_single(sel: &DimensionSelection) -> bool {
    matches!(sel.offset_bounds(), Some((min, max)) if min == max)
}
