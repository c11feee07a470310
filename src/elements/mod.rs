//! Element encodings and the `ReadableElement` trait.

use std::fmt;
use std::io;
use std::str::FromStr;
use thiserror::Error;

use crate::ReadSubsetError;

/// The numeric family of an encoded element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Unsigned,
    Signed,
    Float,
}

/// Byte order of multi-byte elements in the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

/// A fixed-width numeric element encoding.
///
/// Only encodings with a known decode rule can be constructed:
///
/// | kind       | widths (bytes) |
/// |------------|----------------|
/// | `Unsigned` | 1, 2, 4, 8     |
/// | `Signed`   | 1, 2, 4, 8     |
/// | `Float`    | 4, 8           |
///
/// # Example
///
/// ```
/// use ndarray_subread::{ElementEncoding, ElementKind, Endianness};
///
/// let enc: ElementEncoding = ">i2".parse()?;
/// assert_eq!(enc.kind(), ElementKind::Signed);
/// assert_eq!(enc.width(), 2);
/// assert_eq!(enc.endianness(), Endianness::Big);
///
/// let enc: ElementEncoding = "float32".parse()?;
/// assert_eq!(enc, ElementEncoding::new(ElementKind::Float, 4)?);
/// # Ok::<_, ndarray_subread::ReadSubsetError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementEncoding {
    kind: ElementKind,
    width: u8,
    endianness: Endianness,
}

impl ElementEncoding {
    /// Creates a little-endian encoding.
    ///
    /// Returns `ReadSubsetError::UnsupportedEncoding` if there is no decode
    /// rule for `kind` with `width` bytes.
    pub fn new(kind: ElementKind, width: u8) -> Result<Self, ReadSubsetError> {
        let supported = match kind {
            ElementKind::Unsigned | ElementKind::Signed => matches!(width, 1 | 2 | 4 | 8),
            ElementKind::Float => matches!(width, 4 | 8),
        };
        if supported {
            Ok(ElementEncoding {
                kind,
                width,
                endianness: Endianness::Little,
            })
        } else {
            Err(ReadSubsetError::UnsupportedEncoding(format!(
                "{:?} with width {}",
                kind, width
            )))
        }
    }

    /// Returns the encoding with the given byte order.
    #[must_use]
    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Bytes per element.
    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Bytes per element as a `u64`, for offset arithmetic.
    pub(crate) fn size(&self) -> u64 {
        u64::from(self.width)
    }
}

impl fmt::Display for ElementEncoding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let order = match (self.width, self.endianness) {
            (1, _) => '|',
            (_, Endianness::Little) => '<',
            (_, Endianness::Big) => '>',
        };
        let kind = match self.kind {
            ElementKind::Unsigned => 'u',
            ElementKind::Signed => 'i',
            ElementKind::Float => 'f',
        };
        write!(f, "{}{}{}", order, kind, self.width)
    }
}

impl FromStr for ElementEncoding {
    type Err = ReadSubsetError;

    /// Parses a numpy-style type descriptor (`"<f4"`, `">u2"`, `"|i1"`,
    /// `"f8"`) or a type name (`"uint16"`, `"int32"`, `"float32"`,
    /// `"single"`, `"double"`, ...). Type names are little endian.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unsupported = || ReadSubsetError::UnsupportedEncoding(s.to_owned());
        let lower = s.trim().to_ascii_lowercase();
        let named = match lower.as_str() {
            "uint8" | "uchar" => Some((ElementKind::Unsigned, 1)),
            "uint16" => Some((ElementKind::Unsigned, 2)),
            "uint32" => Some((ElementKind::Unsigned, 4)),
            "uint64" => Some((ElementKind::Unsigned, 8)),
            "int8" | "char" => Some((ElementKind::Signed, 1)),
            "int16" | "short" => Some((ElementKind::Signed, 2)),
            "int32" | "int" => Some((ElementKind::Signed, 4)),
            "int64" | "long" => Some((ElementKind::Signed, 8)),
            "float32" | "single" | "float" => Some((ElementKind::Float, 4)),
            "float64" | "double" => Some((ElementKind::Float, 8)),
            _ => None,
        };
        if let Some((kind, width)) = named {
            return ElementEncoding::new(kind, width);
        }

        let (endianness, rest) = match lower.as_bytes().first() {
            Some(b'<') | Some(b'|') | Some(b'=') => (Endianness::Little, &lower[1..]),
            Some(b'>') => (Endianness::Big, &lower[1..]),
            _ => (Endianness::Little, lower.as_str()),
        };
        let mut chars = rest.chars();
        let kind = match chars.next() {
            Some('u') => ElementKind::Unsigned,
            Some('i') => ElementKind::Signed,
            Some('f') => ElementKind::Float,
            _ => return Err(unsupported()),
        };
        let width: u8 = chars.as_str().parse().map_err(|_| unsupported())?;
        ElementEncoding::new(kind, width)
            .map(|enc| enc.with_endianness(endianness))
            .map_err(|_| unsupported())
    }
}

/// An error decoding elements from a byte source.
#[derive(Debug, Error)]
pub enum ReadDataError {
    /// An error caused by I/O, including a source that ends early.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The declared encoding does not match the requested element type.
    #[error("declared encoding {declared} cannot be read as {requested}")]
    WrongEncoding {
        requested: &'static str,
        declared: ElementEncoding,
    },
}

impl From<ReadDataError> for ReadSubsetError {
    fn from(err: ReadDataError) -> ReadSubsetError {
        match err {
            ReadDataError::Io(err) => ReadSubsetError::Io(err),
            ReadDataError::WrongEncoding {
                requested,
                declared,
            } => ReadSubsetError::EncodingMismatch {
                requested,
                declared,
            },
        }
    }
}

/// An array element type that can be decoded from a raw binary source.
pub trait ReadableElement: Sized + Clone {
    /// Name of the element type, used in error messages.
    const NAME: &'static str;

    /// Returns `true` iff `encoding` decodes to exactly this type.
    fn matches(encoding: &ElementEncoding) -> bool;

    /// Reads exactly `len` elements encoded as `encoding` from `reader`.
    ///
    /// Returns `ReadDataError::Io` with kind `UnexpectedEof` if `reader` ends
    /// before `len` elements have been read.
    fn read_exact_vec<R: io::Read>(
        reader: R,
        encoding: &ElementEncoding,
        len: usize,
    ) -> Result<Vec<Self>, ReadDataError>;
}

mod primitive;
