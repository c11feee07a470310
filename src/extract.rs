//! Execution of a [`ReadPlan`].

use crate::{ElementEncoding, ReadPlan, ReadSubsetError, ReadableElement};
use ndarray::prelude::*;
use ndarray::ShapeBuilder;
use std::io::{self, Read, Seek, SeekFrom};
use tracing::debug;

/// Returns `true` iff `permutation` contains each of `0..ndim` once.
fn is_permutation(permutation: &[usize], ndim: usize) -> bool {
    let mut seen = vec![false; ndim];
    permutation.len() == ndim
        && permutation
            .iter()
            .all(|&axis| axis < ndim && !std::mem::replace(&mut seen[axis], true))
}

/// Reads the block described by `plan` from `reader` and returns the
/// selected elements with axes rearranged by `permutation`.
///
/// `permutation[k]` is the storage axis that becomes axis `k` of the
/// result. The result is in standard layout.
///
/// Performs one seek and one sequential read of `plan.byte_count()` bytes.
/// A source that ends early fails with `ReadSubsetError::Io`. Memory grows
/// with the bytes actually read, not with the size claimed by the plan.
pub fn extract<A, R>(
    reader: &mut R,
    plan: &ReadPlan,
    encoding: &ElementEncoding,
    permutation: &[usize],
) -> Result<ArrayD<A>, ReadSubsetError>
where
    A: ReadableElement,
    R: Read + Seek,
{
    let ndim = plan.axes().len();
    if !is_permutation(permutation, ndim) {
        return Err(ReadSubsetError::InvalidPermutation(permutation.to_vec()));
    }
    if !A::matches(encoding) {
        return Err(ReadSubsetError::EncodingMismatch {
            requested: A::NAME,
            declared: *encoding,
        });
    }

    reader.seek(SeekFrom::Start(plan.offset()))?;
    let mut bytes = Vec::new();
    reader
        .by_ref()
        .take(plan.byte_count())
        .read_to_end(&mut bytes)?;
    if (bytes.len() as u64) < plan.byte_count() {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "expected {} bytes at offset {}, source ended after {}",
                plan.byte_count(),
                plan.offset(),
                bytes.len()
            ),
        )
        .into());
    }
    let data = A::read_exact_vec(&bytes[..], encoding, plan.read_len())?;
    debug!(
        offset = plan.offset(),
        bytes = plan.byte_count(),
        elements = data.len(),
        "read block"
    );

    let mut block = ArrayD::from_shape_vec(IxDyn(&plan.read_shape()).f(), data)?;
    for (axis, axis_plan) in plan.axes().iter().enumerate() {
        if let Some(filter) = axis_plan.filter() {
            block = block.select(Axis(axis), filter);
        }
    }
    let permuted = block.permuted_axes(IxDyn(permutation));
    Ok(permuted.as_standard_layout().into_owned())
}
