//! Decoding of every supported encoding.

use crate::le_bytes;
use ndarray::prelude::*;
use ndarray_subread::{
    ArrayLayout, ElementEncoding, Endianness, ReadOptions, ReadSubsetError, ReadSubsetExt,
    ReadableElement,
};
use std::fmt::Debug;
use std::io::Cursor;

fn decode<A: ReadableElement>(desc: &str, bytes: &[u8]) -> Vec<A> {
    let encoding: ElementEncoding = desc.parse().unwrap();
    let len = bytes.len() / usize::from(encoding.width());
    A::read_exact_vec(bytes, &encoding, len).unwrap()
}

#[test]
fn one_byte() {
    let bytes = [0x00, 0x7f, 0x80, 0xff];
    assert_eq!(decode::<u8>("|u1", &bytes), vec![0, 127, 128, 255]);
    assert_eq!(decode::<i8>("|i1", &bytes), vec![0, 127, -128, -1]);
}

#[test]
fn two_bytes() {
    assert_eq!(decode::<u16>("<u2", &[0x01, 0x00, 0xff, 0xff]), vec![1, 65535]);
    assert_eq!(decode::<u16>(">u2", &[0x01, 0x00]), vec![256]);
    assert_eq!(decode::<i16>("<i2", &[0xfe, 0xff, 0x00, 0x80]), vec![-2, i16::MIN]);
}

#[test]
fn four_bytes() {
    assert_eq!(decode::<u32>("<u4", &[0x78, 0x56, 0x34, 0x12]), vec![0x1234_5678]);
    assert_eq!(
        decode::<i32>("<i4", &[0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x80]),
        vec![-1, i32::MIN]
    );
    assert_eq!(
        decode::<f32>("<f4", &[0x00, 0x00, 0x80, 0x3f, 0x00, 0x00, 0x20, 0xc1]),
        vec![1.0, -10.0]
    );
    assert_eq!(decode::<f32>(">f4", &[0x3f, 0x80, 0x00, 0x00]), vec![1.0]);
}

#[test]
fn eight_bytes() {
    assert_eq!(
        decode::<u64>("<u8", &[0x01, 0, 0, 0, 0, 0, 0, 0x80]),
        vec![0x8000_0000_0000_0001]
    );
    assert_eq!(
        decode::<i64>("<i8", &[0xfe, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]),
        vec![-2]
    );
    assert_eq!(
        decode::<f64>("<f8", &[0, 0, 0, 0, 0, 0, 0xf0, 0x3f, 0, 0, 0, 0, 0, 0, 0x04, 0x40]),
        vec![1.0, 2.5]
    );
    assert_eq!(
        decode::<f64>(">f8", &[0x40, 0x04, 0, 0, 0, 0, 0, 0]),
        vec![2.5]
    );
}

/// Reading every index of every axis, ordered as stored, gives the same
/// values as decoding the whole buffer and reshaping it.
fn check_full_read<A>(desc: &str, values: Vec<A>, bytes: Vec<u8>)
where
    A: ReadableElement + Debug + PartialEq,
{
    let extents = vec![3, 2, 2];
    let layout = ArrayLayout::from_axis_names(
        extents.clone(),
        &["time", "sensor", "trial"],
        desc.parse().unwrap(),
    )
    .unwrap();
    let options = ReadOptions::new().order(layout.axes().to_vec());
    let naive = ArrayD::from_shape_vec(IxDyn(&extents).f(), values).unwrap();
    for &optimize in &[true, false] {
        let out = Cursor::new(&bytes[..])
            .read_subset::<A>(&layout, &options.clone().optimize(optimize))
            .unwrap()
            .into_array()
            .unwrap();
        assert_eq!(out.data(), &naive, "{}", desc);
        assert_eq!(out.bytes_read(), bytes.len() as u64);
    }
}

#[test]
fn full_read_matches_naive_for_all_encodings() {
    let ints: Vec<i64> = (0..12).map(|i| i * 11 - 40).collect();

    let v: Vec<u8> = ints.iter().map(|&i| (i + 40) as u8).collect();
    check_full_read("|u1", v.clone(), v);
    let v: Vec<i8> = ints.iter().map(|&i| i as i8).collect();
    check_full_read("|i1", v.clone(), le_bytes!(v));
    let v: Vec<u16> = ints.iter().map(|&i| (i + 40) as u16 * 300).collect();
    check_full_read("<u2", v.clone(), le_bytes!(v));
    let v: Vec<i16> = ints.iter().map(|&i| i as i16 * 300).collect();
    check_full_read("<i2", v.clone(), le_bytes!(v));
    let v: Vec<u32> = ints.iter().map(|&i| (i + 40) as u32 * 70_000).collect();
    check_full_read("<u4", v.clone(), le_bytes!(v));
    let v: Vec<i32> = ints.iter().map(|&i| i as i32 * 70_000).collect();
    check_full_read("<i4", v.clone(), le_bytes!(v));
    let v: Vec<u64> = ints.iter().map(|&i| (i + 40) as u64 * 5_000_000_000).collect();
    check_full_read("<u8", v.clone(), le_bytes!(v));
    let v: Vec<i64> = ints.iter().map(|&i| i * 5_000_000_000).collect();
    check_full_read("<i8", v.clone(), le_bytes!(v));
    let v: Vec<f32> = ints.iter().map(|&i| i as f32 * 0.25).collect();
    check_full_read("<f4", v.clone(), le_bytes!(v));
    let v: Vec<f64> = ints.iter().map(|&i| i as f64 * 1e-3).collect();
    check_full_read("<f8", v.clone(), le_bytes!(v));

    let v: Vec<f64> = ints.iter().map(|&i| i as f64 * 1e-3).collect();
    let be: Vec<u8> = v.iter().flat_map(|x| x.to_be_bytes()).collect();
    check_full_read(">f8", v, be);
}

#[test]
fn with_endianness_changes_descriptor() {
    let encoding = "<i4"
        .parse::<ElementEncoding>()
        .unwrap()
        .with_endianness(Endianness::Big);
    assert_eq!(encoding.to_string(), ">i4");
}

#[test]
fn element_type_must_match_encoding() {
    let (layout, bytes) = crate::sensor_time_trial();
    let res = Cursor::new(bytes).read_subset::<f64>(&layout, &ReadOptions::new());
    match res {
        Err(ReadSubsetError::EncodingMismatch {
            requested,
            declared,
        }) => {
            assert_eq!(requested, "f64");
            assert_eq!(declared.to_string(), "<f4");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn unsupported_encodings() {
    for desc in &["<f2", "<c16", "|b1", "float16"] {
        assert!(matches!(
            desc.parse::<ElementEncoding>(),
            Err(ReadSubsetError::UnsupportedEncoding(_))
        ));
    }
}
