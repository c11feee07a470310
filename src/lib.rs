//! This crate reads selected parts of N-dimensional arrays stored as raw
//! binary data into [`ndarray`]'s `ArrayD` type.
//!
//! [`ndarray`]: https://github.com/rust-ndarray/ndarray
//!
//! A read has three stages:
//!
//! 1. [`normalize`] turns per-axis [`AxisSelection`]s into validated,
//!    1-based [`DimensionSelection`]s.
//! 2. [`ReadPlan`] works out the smallest contiguous byte range holding the
//!    selection, and which indices to drop after decoding.
//! 3. [`extract`] performs one seek and one read, decodes the elements,
//!    applies the remaining selection and rearranges the axes.
//!
//! Most callers use [`ReadSubsetExt`] (or [`read_subset_from_path`]), which
//! runs all three stages for an [`ArrayLayout`] and [`ReadOptions`].
//!
//! Arrays are stored with the first storage axis varying fastest. The axes
//! of the result follow the canonical order sensor × frequency × time ×
//! trial unless [`ReadOptions::order`] says otherwise.
//!
//! # Limitations
//!
//! * Only fixed-width integers (1, 2, 4 or 8 bytes, signed or unsigned) and
//!   floats (4 or 8 bytes) are supported.
//!
//! * The requested element type must match the stored encoding; values are
//!   not converted while reading.

mod elements;
mod error;
mod extract;
mod layout;
mod plan;
mod reader;
mod selection;

pub use crate::elements::{
    ElementEncoding, ElementKind, Endianness, ReadDataError, ReadableElement,
};
pub use crate::error::ReadSubsetError;
pub use crate::extract::extract;
pub use crate::layout::{ArrayLayout, ArrayShape, CanonicalAxis};
pub use crate::plan::{AxisPlan, ReadPlan};
pub use crate::reader::{
    read_subset_from_path, EmptySelection, ExtractedArray, Extraction, ReadOptions, ReadSubsetExt,
};
pub use crate::selection::{normalize, AxisSelection, DimensionSelection, NormalizedSelection};
