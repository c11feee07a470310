//! `ReadableElement` implementations for primitive element types.

use super::{ElementEncoding, ElementKind, Endianness, ReadDataError, ReadableElement};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::io;

macro_rules! impl_readable_primitive_one_byte {
    ($elem:ty, $kind:expr, $zero:expr, $read_into:ident) => {
        impl ReadableElement for $elem {
            const NAME: &'static str = stringify!($elem);

            fn matches(encoding: &ElementEncoding) -> bool {
                encoding.kind() == $kind && encoding.width() == 1
            }

            fn read_exact_vec<R: io::Read>(
                mut reader: R,
                encoding: &ElementEncoding,
                len: usize,
            ) -> Result<Vec<Self>, ReadDataError> {
                if !Self::matches(encoding) {
                    return Err(ReadDataError::WrongEncoding {
                        requested: Self::NAME,
                        declared: *encoding,
                    });
                }
                let mut out = vec![$zero; len];
                reader.$read_into(&mut out)?;
                Ok(out)
            }
        }
    };
}

impl_readable_primitive_one_byte!(i8, ElementKind::Signed, 0, read_i8_into);
impl_readable_primitive_one_byte!(u8, ElementKind::Unsigned, 0, read_exact);

macro_rules! impl_readable_primitive_multi_byte {
    ($elem:ty, $kind:expr, $width:expr, $zero:expr, $read_into:ident) => {
        impl ReadableElement for $elem {
            const NAME: &'static str = stringify!($elem);

            fn matches(encoding: &ElementEncoding) -> bool {
                encoding.kind() == $kind && encoding.width() == $width
            }

            fn read_exact_vec<R: io::Read>(
                mut reader: R,
                encoding: &ElementEncoding,
                len: usize,
            ) -> Result<Vec<Self>, ReadDataError> {
                if !Self::matches(encoding) {
                    return Err(ReadDataError::WrongEncoding {
                        requested: Self::NAME,
                        declared: *encoding,
                    });
                }
                let mut out = vec![$zero; len];
                match encoding.endianness() {
                    Endianness::Little => reader.$read_into::<LittleEndian>(&mut out)?,
                    Endianness::Big => reader.$read_into::<BigEndian>(&mut out)?,
                }
                Ok(out)
            }
        }
    };
}

impl_readable_primitive_multi_byte!(i16, ElementKind::Signed, 2, 0, read_i16_into);
impl_readable_primitive_multi_byte!(i32, ElementKind::Signed, 4, 0, read_i32_into);
impl_readable_primitive_multi_byte!(i64, ElementKind::Signed, 8, 0, read_i64_into);

impl_readable_primitive_multi_byte!(u16, ElementKind::Unsigned, 2, 0, read_u16_into);
impl_readable_primitive_multi_byte!(u32, ElementKind::Unsigned, 4, 0, read_u32_into);
impl_readable_primitive_multi_byte!(u64, ElementKind::Unsigned, 8, 0, read_u64_into);

impl_readable_primitive_multi_byte!(f32, ElementKind::Float, 4, 0., read_f32_into);
impl_readable_primitive_multi_byte!(f64, ElementKind::Float, 8, 0., read_f64_into);
