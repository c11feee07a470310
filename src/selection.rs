//! Normalization of per-axis selections into validated index lists.
//!
//! Indices are 1-based throughout the public API: index `1` is the first
//! element along an axis and index `extent` is the last.

use crate::{ArrayShape, ReadSubsetError};
use num_traits::ToPrimitive;
use tracing::trace;

/// A caller-supplied selection for one axis.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum AxisSelection {
    /// Every index along the axis.
    #[default]
    All,
    /// One flag per index; the selected indices are those set to `true`.
    Mask(Vec<bool>),
    /// Explicit 1-based indices, kept in the given order with repeats.
    ///
    /// A list of only negative values instead excludes the named indices
    /// from the full range, so `[-2]` on an axis of extent 4 selects
    /// `[1, 3, 4]`. Lists mixing positive and negative values are rejected.
    Indices(Vec<i64>),
    /// A named selection. Only `"all"` is recognized.
    Keyword(String),
    /// Labels resolved against the labels of the axis in the layout.
    Labels(Vec<String>),
}

impl From<Vec<i64>> for AxisSelection {
    fn from(indices: Vec<i64>) -> AxisSelection {
        AxisSelection::Indices(indices)
    }
}

impl From<Vec<bool>> for AxisSelection {
    fn from(mask: Vec<bool>) -> AxisSelection {
        AxisSelection::Mask(mask)
    }
}

impl From<&str> for AxisSelection {
    fn from(keyword: &str) -> AxisSelection {
        AxisSelection::Keyword(keyword.to_owned())
    }
}

impl AxisSelection {
    /// Replaces `Labels` by the matching 1-based `Indices`; other
    /// selections are returned unchanged.
    pub(crate) fn resolve_labels(
        self,
        axis: usize,
        labels: Option<&[String]>,
    ) -> Result<AxisSelection, ReadSubsetError> {
        let wanted = match self {
            AxisSelection::Labels(wanted) => wanted,
            other => return Ok(other),
        };
        let labels = labels.ok_or_else(|| {
            invalid(axis, "selection by label on an axis without labels".to_owned())
        })?;
        wanted
            .iter()
            .map(|name| {
                labels
                    .iter()
                    .position(|label| label == name)
                    .map(|pos| pos as i64 + 1)
                    .ok_or_else(|| invalid(axis, format!("unknown label {:?}", name)))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(AxisSelection::Indices)
    }
}

/// Validated 1-based indices for one axis, in the requested order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DimensionSelection(Vec<usize>);

impl DimensionSelection {
    /// `1..=extent`.
    pub fn full(extent: usize) -> Self {
        DimensionSelection((1..=extent).collect())
    }

    /// The 1-based indices.
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The indices converted to 0-based offsets.
    pub fn offsets(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().map(|&index| index - 1)
    }

    /// Smallest and largest 0-based offset, or `None` if empty.
    pub(crate) fn offset_bounds(&self) -> Option<(usize, usize)> {
        let min = self.offsets().min()?;
        let max = self.offsets().max()?;
        Some((min, max))
    }

    /// Returns `true` iff the selection is exactly `start..start + count`
    /// (0-based) in ascending order.
    pub(crate) fn is_run(&self, start: usize, count: usize) -> bool {
        self.0.len() == count && self.offsets().zip(start..).all(|(a, b)| a == b)
    }
}

/// One [`DimensionSelection`] per storage axis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedSelection(Vec<DimensionSelection>);

impl NormalizedSelection {
    pub fn axes(&self) -> &[DimensionSelection] {
        &self.0
    }

    pub fn into_axes(self) -> Vec<DimensionSelection> {
        self.0
    }

    /// Returns `true` if any axis selects nothing, in which case the result
    /// has no elements and no data needs to be read.
    pub fn is_empty(&self) -> bool {
        self.0.iter().any(DimensionSelection::is_empty)
    }

    /// Number of selected indices per axis.
    pub fn shape(&self) -> Vec<usize> {
        self.0.iter().map(DimensionSelection::len).collect()
    }
}

fn out_of_range(axis: usize, index: i64, extent: usize) -> ReadSubsetError {
    ReadSubsetError::SelectionOutOfRange {
        axis,
        canonical: None,
        index,
        extent,
    }
}

fn invalid(axis: usize, reason: String) -> ReadSubsetError {
    ReadSubsetError::InvalidSelection {
        axis,
        canonical: None,
        reason,
    }
}

/// Converts a 1-based index to `usize`, checking it lies in `1..=extent`.
fn checked_index(axis: usize, index: i64, extent: usize) -> Result<usize, ReadSubsetError> {
    match index.to_usize() {
        Some(i) if (1..=extent).contains(&i) => Ok(i),
        _ => Err(out_of_range(axis, index, extent)),
    }
}

fn normalize_indices(
    axis: usize,
    indices: &[i64],
    extent: usize,
) -> Result<DimensionSelection, ReadSubsetError> {
    let negative = indices.iter().filter(|&&i| i < 0).count();
    if negative == 0 {
        return indices
            .iter()
            .map(|&i| checked_index(axis, i, extent))
            .collect::<Result<Vec<_>, _>>()
            .map(DimensionSelection);
    }
    if negative != indices.len() {
        return Err(invalid(
            axis,
            "cannot mix included (positive) and excluded (negative) indices".to_owned(),
        ));
    }
    let mut keep = vec![true; extent];
    for &i in indices {
        // Report the excluded index as the caller wrote it.
        let excluded = match i.checked_neg() {
            Some(neg) => {
                checked_index(axis, neg, extent).map_err(|_| out_of_range(axis, i, extent))?
            }
            None => return Err(out_of_range(axis, i, extent)),
        };
        keep[excluded - 1] = false;
    }
    Ok(DimensionSelection((1..=extent).filter(|&i| keep[i - 1]).collect()))
}

fn normalize_axis(
    axis: usize,
    selection: &AxisSelection,
    extent: usize,
) -> Result<DimensionSelection, ReadSubsetError> {
    match selection {
        AxisSelection::All => Ok(DimensionSelection::full(extent)),
        AxisSelection::Keyword(keyword) if keyword.eq_ignore_ascii_case("all") => {
            Ok(DimensionSelection::full(extent))
        }
        AxisSelection::Keyword(keyword) => {
            Err(invalid(axis, format!("unrecognized keyword {:?}", keyword)))
        }
        AxisSelection::Mask(mask) => {
            if mask.len() != extent {
                return Err(invalid(
                    axis,
                    format!(
                        "mask has length {} but the axis has extent {}",
                        mask.len(),
                        extent
                    ),
                ));
            }
            Ok(DimensionSelection(
                mask.iter()
                    .enumerate()
                    .filter(|&(_, &selected)| selected)
                    .map(|(i, _)| i + 1)
                    .collect(),
            ))
        }
        AxisSelection::Indices(indices) => normalize_indices(axis, indices, extent),
        AxisSelection::Labels(_) => Err(invalid(
            axis,
            "labels must be resolved against the array layout".to_owned(),
        )),
    }
}

/// Resolves one selection per storage axis into validated index lists.
///
/// Missing trailing selections mean [`AxisSelection::All`]. Supplying more
/// selections than `shape` has axes fails with
/// `ReadSubsetError::InconsistentShape`.
///
/// An axis that resolves to no indices is not an error; check
/// [`NormalizedSelection::is_empty`].
///
/// # Example
///
/// ```
/// use ndarray_subread::{normalize, ArrayShape, AxisSelection};
///
/// let shape = ArrayShape::new(vec![4, 3])?;
/// let sel = normalize(&shape, &[AxisSelection::Indices(vec![3, 1, 3])])?;
/// assert_eq!(sel.axes()[0].indices(), &[3, 1, 3]);
/// assert_eq!(sel.axes()[1].indices(), &[1, 2, 3]);
/// # Ok::<_, ndarray_subread::ReadSubsetError>(())
/// ```
pub fn normalize(
    shape: &ArrayShape,
    selections: &[AxisSelection],
) -> Result<NormalizedSelection, ReadSubsetError> {
    if selections.len() > shape.ndim() {
        return Err(ReadSubsetError::InconsistentShape {
            expected: shape.ndim(),
            found: selections.len(),
        });
    }
    let all = AxisSelection::All;
    shape
        .extents()
        .iter()
        .enumerate()
        .map(|(axis, &extent)| {
            let selection = selections.get(axis).unwrap_or(&all);
            let resolved = normalize_axis(axis, selection, extent)?;
            trace!(axis, extent, selected = resolved.len(), "normalized axis selection");
            Ok(resolved)
        })
        .collect::<Result<Vec<_>, _>>()
        .map(NormalizedSelection)
}
