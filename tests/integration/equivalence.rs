//! The optimized plan reads less but extracts exactly what the full plan
//! extracts.

use crate::{expected_selection, le_bytes};
use itertools::Itertools;
use ndarray_subread::{extract, normalize, ArrayShape, AxisSelection, ElementEncoding, ReadPlan};
use std::io::Cursor;

/// A spread of valid selections for an axis of `extent`.
fn candidates(extent: usize) -> Vec<AxisSelection> {
    let e = extent as i64;
    let mut out = vec![
        AxisSelection::All,
        AxisSelection::Indices(vec![1]),
        AxisSelection::Indices(vec![e]),
        AxisSelection::Indices(vec![e, e]),
    ];
    if extent >= 2 {
        out.push(AxisSelection::Indices(vec![2, 1]));
        out.push(AxisSelection::Indices(vec![e, 1]));
        out.push(AxisSelection::Indices((1..e).collect()));
        out.push(AxisSelection::Indices((2..=e).collect()));
        out.push(AxisSelection::Indices(vec![-1]));
        out.push(AxisSelection::Mask((0..extent).map(|i| i % 2 == 1).collect()));
    }
    if extent >= 3 {
        out.push(AxisSelection::Indices(vec![1, 3]));
        out.push(AxisSelection::Indices(vec![3, 2, 2]));
        out.push(AxisSelection::Indices(vec![-2]));
    }
    out
}

fn check_shape(extents: &[usize]) {
    let shape = ArrayShape::new(extents.to_vec()).unwrap();
    let encoding: ElementEncoding = "<u2".parse().unwrap();
    let values: Vec<u16> = (0..shape.len()).map(|i| (i * 7 + 3) as u16).collect();
    let bytes = le_bytes!(values);
    let identity: Vec<usize> = (0..extents.len()).collect();
    let reversed: Vec<usize> = identity.iter().rev().cloned().collect();

    let mut checked = 0;
    for combo in extents
        .iter()
        .map(|&extent| candidates(extent))
        .multi_cartesian_product()
    {
        let sel = normalize(&shape, &combo).unwrap();
        if sel.is_empty() {
            continue;
        }
        let offsets: Vec<Vec<usize>> = sel.axes().iter().map(|s| s.offsets().collect()).collect();
        let expected = expected_selection(&values, extents, &offsets);

        let fast = ReadPlan::optimized(&shape, &sel, &encoding, 0).unwrap();
        let full = ReadPlan::full(&shape, &sel, &encoding, 0).unwrap();
        assert!(fast.byte_count() <= full.byte_count());
        assert_eq!(full.byte_count(), bytes.len() as u64);

        let from_fast =
            extract::<u16, _>(&mut Cursor::new(&bytes[..]), &fast, &encoding, &identity).unwrap();
        let from_full =
            extract::<u16, _>(&mut Cursor::new(&bytes[..]), &full, &encoding, &identity).unwrap();
        assert_eq!(from_fast, expected, "{:?} {:?}", extents, combo);
        assert_eq!(from_full, expected, "{:?} {:?}", extents, combo);

        let fast_reversed =
            extract::<u16, _>(&mut Cursor::new(&bytes[..]), &fast, &encoding, &reversed).unwrap();
        let full_reversed =
            extract::<u16, _>(&mut Cursor::new(&bytes[..]), &full, &encoding, &reversed).unwrap();
        assert_eq!(fast_reversed, full_reversed, "{:?} {:?}", extents, combo);
        assert_eq!(fast_reversed, expected.clone().reversed_axes());
        checked += 1;
    }
    assert!(checked > 0);
}

#[test]
fn equivalent_on_three_axes() {
    check_shape(&[3, 4, 2]);
}

#[test]
fn equivalent_on_one_axis() {
    check_shape(&[5]);
}

#[test]
fn equivalent_with_unit_axes() {
    check_shape(&[2, 1, 3]);
    check_shape(&[1, 1, 4]);
}

#[test]
fn equivalent_on_four_axes() {
    check_shape(&[2, 3, 2, 2]);
}

#[test]
fn optimized_reads_less_for_pinned_trials() {
    let shape = ArrayShape::new(vec![64, 100, 20]).unwrap();
    let encoding: ElementEncoding = "<f4".parse().unwrap();
    let sel = normalize(
        &shape,
        &[
            AxisSelection::All,
            AxisSelection::Indices((11..=20).collect()),
            AxisSelection::Indices(vec![7]),
        ],
    )
    .unwrap();
    let fast = ReadPlan::optimized(&shape, &sel, &encoding, 0).unwrap();
    assert_eq!(fast.byte_count(), 64 * 10 * 4);
    assert_eq!(fast.offset(), (6 * 64 * 100 + 10 * 64) * 4);
    assert!(fast.axes().iter().all(|axis| axis.filter().is_none()));
}
