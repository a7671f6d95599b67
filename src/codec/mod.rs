mod vecs;

pub use vecs::{
    bvecs_read, bvecs_write, fvecs_read, fvecs_write, ivecs_read, ivecs_write, read_vecs,
    read_vecs_limited, stat_vecs, write_vecs,
};

use std::{error::Error, fmt, io};

/// Caller-chosen interpretation of the raw payload cells. The byte layout of
/// an `.ivecs` and an `.fvecs` file is identical, so the kind can never be
/// recovered from the file itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Int32,
    Float32,
    Uint8,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ElementKind::Int32 => write!(f, "int32"),
            ElementKind::Float32 => write!(f, "float32"),
            ElementKind::Uint8 => write!(f, "uint8"),
        }
    }
}

/// Fixed-width scalar that can live in a vecs payload.
pub trait VecsScalar: Copy {
    /// Encoded size of one element in bytes.
    const SIZE: usize;

    fn read_le(buf: &[u8]) -> Self;
    fn write_le(&self, buf: &mut [u8]);
}

impl VecsScalar for i32 {
    const SIZE: usize = 4;

    fn read_le(buf: &[u8]) -> Self {
        i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])
    }

    fn write_le(&self, buf: &mut [u8]) {
        buf.copy_from_slice(&self.to_le_bytes());
    }
}

impl VecsScalar for f32 {
    const SIZE: usize = 4;

    fn read_le(buf: &[u8]) -> Self {
        f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])
    }

    fn write_le(&self, buf: &mut [u8]) {
        buf.copy_from_slice(&self.to_le_bytes());
    }
}

impl VecsScalar for u8 {
    const SIZE: usize = 1;

    fn read_le(buf: &[u8]) -> Self {
        buf[0]
    }

    fn write_le(&self, buf: &mut [u8]) {
        buf[0] = *self;
    }
}

#[derive(Debug)]
pub enum CodecError {
    Io(io::Error),
    /// Zero-length file: there is no first record to take the dimension from.
    EmptyFile,
    /// The first record declares a dimension of zero.
    ZeroDimension,
    /// File length is not a whole number of records.
    Truncated { file_len: u64, record_size: usize },
    /// A record's dimension prefix disagrees with the first record's.
    DimensionMismatch {
        record: usize,
        expected: usize,
        found: usize,
    },
    /// Refusing to write an array with no rows or no columns.
    EmptyInput,
    /// A capped read asked for more records than the file holds.
    NotEnoughRecords { requested: usize, available: usize },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CodecError::Io(e) => write!(f, "I/O error: {}", e),
            CodecError::EmptyFile => write!(f, "file is empty"),
            CodecError::ZeroDimension => write!(f, "first record declares dimension 0"),
            CodecError::Truncated {
                file_len,
                record_size,
            } => write!(
                f,
                "file length {} is not a multiple of the {}-byte record size",
                file_len, record_size
            ),
            CodecError::DimensionMismatch {
                record,
                expected,
                found,
            } => write!(
                f,
                "record {} declares dimension {} but the file dimension is {}",
                record, found, expected
            ),
            CodecError::EmptyInput => write!(f, "refusing to write an empty vector array"),
            CodecError::NotEnoughRecords {
                requested,
                available,
            } => write!(
                f,
                "requested {} records but the file holds only {}",
                requested, available
            ),
        }
    }
}

impl Error for CodecError {}

impl From<io::Error> for CodecError {
    fn from(error: io::Error) -> Self {
        CodecError::Io(error)
    }
}
