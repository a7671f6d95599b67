use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use ndarray::Array2;

use super::{CodecError, VecsScalar};

/// Every record starts with its dimension as a little-endian u32.
const DIM_PREFIX_SIZE: usize = 4;

/// Reads a whole vecs file into an `(N, D)` array.
///
/// The dimension is taken from the first record; the file length must be an
/// exact multiple of `4 + D * size_of(T)`, and every record's own dimension
/// prefix must agree with the first one.
pub fn read_vecs<T: VecsScalar, P: AsRef<Path>>(path: P) -> Result<Array2<T>, CodecError> {
    let (mut reader, dim, count) = open_vecs::<T>(path.as_ref())?;
    read_records(&mut reader, dim, count)
}

/// Reads only the first `limit` records of a vecs file.
///
/// Asking for more records than the file holds is an error, not a short read.
pub fn read_vecs_limited<T: VecsScalar, P: AsRef<Path>>(
    path: P,
    limit: usize,
) -> Result<Array2<T>, CodecError> {
    let (mut reader, dim, count) = open_vecs::<T>(path.as_ref())?;
    if limit > count {
        return Err(CodecError::NotEnoughRecords {
            requested: limit,
            available: count,
        });
    }
    read_records(&mut reader, dim, limit)
}

/// Returns the `(N, D)` shape of a vecs file without loading its payload.
pub fn stat_vecs<T: VecsScalar, P: AsRef<Path>>(path: P) -> Result<(usize, usize), CodecError> {
    let (_, dim, count) = open_vecs::<T>(path.as_ref())?;
    Ok((count, dim))
}

/// Writes an `(N, D)` array as N records, each a u32 dimension prefix
/// followed by D little-endian elements. Creates or truncates the target
/// file; a mid-write failure leaves a partial file behind.
pub fn write_vecs<T: VecsScalar, P: AsRef<Path>>(
    path: P,
    data: &Array2<T>,
) -> Result<(), CodecError> {
    if data.nrows() == 0 || data.ncols() == 0 {
        return Err(CodecError::EmptyInput);
    }

    let dim_prefix = (data.ncols() as u32).to_le_bytes();
    let mut cell = vec![0u8; T::SIZE];
    let mut writer = BufWriter::new(File::create(path)?);

    for row in data.outer_iter() {
        writer.write_all(&dim_prefix)?;
        for value in row.iter() {
            value.write_le(&mut cell);
            writer.write_all(&cell)?;
        }
    }

    writer.flush()?;
    Ok(())
}

pub fn ivecs_read<P: AsRef<Path>>(path: P) -> Result<Array2<i32>, CodecError> {
    read_vecs(path)
}

pub fn fvecs_read<P: AsRef<Path>>(path: P) -> Result<Array2<f32>, CodecError> {
    read_vecs(path)
}

pub fn bvecs_read<P: AsRef<Path>>(path: P) -> Result<Array2<u8>, CodecError> {
    read_vecs(path)
}

pub fn ivecs_write<P: AsRef<Path>>(path: P, data: &Array2<i32>) -> Result<(), CodecError> {
    write_vecs(path, data)
}

pub fn fvecs_write<P: AsRef<Path>>(path: P, data: &Array2<f32>) -> Result<(), CodecError> {
    write_vecs(path, data)
}

pub fn bvecs_write<P: AsRef<Path>>(path: P, data: &Array2<u8>) -> Result<(), CodecError> {
    write_vecs(path, data)
}

/// Opens a vecs file, validates its length against the first record's
/// dimension, and returns a reader rewound to the start of the file.
fn open_vecs<T: VecsScalar>(path: &Path) -> Result<(BufReader<File>, usize, usize), CodecError> {
    let file = File::open(path)?;
    let file_len = file.metadata()?.len();

    if file_len == 0 {
        return Err(CodecError::EmptyFile);
    }
    if file_len < DIM_PREFIX_SIZE as u64 {
        return Err(CodecError::Truncated {
            file_len,
            record_size: DIM_PREFIX_SIZE,
        });
    }

    let mut reader = BufReader::new(file);
    let dim = read_dim(&mut reader)?;
    if dim == 0 {
        return Err(CodecError::ZeroDimension);
    }

    let record_size = DIM_PREFIX_SIZE + dim * T::SIZE;
    if file_len % record_size as u64 != 0 {
        return Err(CodecError::Truncated {
            file_len,
            record_size,
        });
    }
    let count = (file_len / record_size as u64) as usize;

    reader.seek(SeekFrom::Start(0))?;
    Ok((reader, dim, count))
}

fn read_dim<R: Read>(reader: &mut R) -> Result<usize, CodecError> {
    let mut buf = [0u8; DIM_PREFIX_SIZE];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf) as usize)
}

fn read_records<T: VecsScalar, R: Read>(
    reader: &mut R,
    dim: usize,
    count: usize,
) -> Result<Array2<T>, CodecError> {
    let mut data = Vec::with_capacity(count * dim);
    let mut payload = vec![0u8; dim * T::SIZE];

    for record in 0..count {
        let found = read_dim(reader)?;
        if found != dim {
            return Err(CodecError::DimensionMismatch {
                record,
                expected: dim,
                found,
            });
        }

        reader.read_exact(&mut payload)?;
        for chunk in payload.chunks_exact(T::SIZE) {
            data.push(T::read_le(chunk));
        }
    }

    Ok(Array2::from_shape_vec((count, dim), data)
        .expect("payload length matches record count and dimension"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::tests::{random_float_vectors, random_int_vectors};
    use ndarray::array;
    use std::fs::{self, OpenOptions};
    use tempfile::tempdir;

    #[test]
    fn test_ivecs_byte_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("base.ivecs");

        let data = array![[1, 2, 3], [4, 5, 6]];
        ivecs_write(&path, &data).unwrap();

        let bytes = fs::read(&path).unwrap();
        let expected: Vec<u8> = vec![
            3, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, // record 0
            3, 0, 0, 0, 4, 0, 0, 0, 5, 0, 0, 0, 6, 0, 0, 0, // record 1
        ];
        assert_eq!(bytes, expected);

        let reread = ivecs_read(&path).unwrap();
        assert_eq!(reread, data);
    }

    #[test]
    fn test_int_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ids.ivecs");

        let data = random_int_vectors(20, 8);
        ivecs_write(&path, &data).unwrap();

        let reread = ivecs_read(&path).unwrap();
        assert_eq!(reread, data, "int round trip must be exact");
    }

    #[test]
    fn test_float_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("base.fvecs");

        let data = random_float_vectors(16, 12);
        fvecs_write(&path, &data).unwrap();

        let reread = fvecs_read(&path).unwrap();
        // No re-encoding happens, so the bits must match exactly.
        assert_eq!(reread, data, "float round trip must be bit-exact");
    }

    #[test]
    fn test_bvecs_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("base.bvecs");

        let data = Array2::from_shape_fn((5, 4), |(i, j)| (i * 4 + j) as u8);
        bvecs_write(&path, &data).unwrap();

        assert_eq!(stat_vecs::<u8, _>(&path).unwrap(), (5, 4));
        assert_eq!(bvecs_read(&path).unwrap(), data);
    }

    #[test]
    fn test_float_read_is_bit_reinterpretation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bits.ivecs");

        let data = array![[1, 2, 1_065_353_216]];
        ivecs_write(&path, &data).unwrap();

        let floats = fvecs_read(&path).unwrap();
        // Not a numeric cast: int 1 becomes a subnormal, not 1.0, while the
        // bit pattern of 1.0f32 comes back as exactly 1.0.
        assert_eq!(floats[[0, 0]], f32::from_bits(1));
        assert_eq!(floats[[0, 1]], f32::from_bits(2));
        assert_eq!(floats[[0, 2]], 1.0);
    }

    #[test]
    fn test_write_empty_array_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.fvecs");

        let no_rows = Array2::<f32>::zeros((0, 4));
        assert!(matches!(
            fvecs_write(&path, &no_rows),
            Err(CodecError::EmptyInput)
        ));

        let no_cols = Array2::<f32>::zeros((3, 0));
        assert!(matches!(
            fvecs_write(&path, &no_cols),
            Err(CodecError::EmptyInput)
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_read_empty_file_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("zero.fvecs");
        fs::write(&path, []).unwrap();

        assert!(matches!(fvecs_read(&path), Err(CodecError::EmptyFile)));
    }

    #[test]
    fn test_read_zero_dimension_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("zerodim.ivecs");
        fs::write(&path, [0u8, 0, 0, 0]).unwrap();

        assert!(matches!(ivecs_read(&path), Err(CodecError::ZeroDimension)));
    }

    #[test]
    fn test_read_truncated_file_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cut.ivecs");

        ivecs_write(&path, &array![[7, 8], [9, 10]]).unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&[0xff, 0xff, 0xff]).unwrap();

        match ivecs_read(&path) {
            Err(CodecError::Truncated {
                file_len,
                record_size,
            }) => {
                assert_eq!(file_len, 27);
                assert_eq!(record_size, 12);
            }
            other => panic!("expected Truncated, got {:?}", other),
        }
    }

    #[test]
    fn test_read_mismatched_record_dimension_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mixed.ivecs");

        // Two D=2 records, but the second prefix claims D=3. Total length is
        // still a clean multiple of the 12-byte record size.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&1i32.to_le_bytes());
        bytes.extend_from_slice(&2i32.to_le_bytes());
        bytes.extend_from_slice(&3u32.to_le_bytes());
        bytes.extend_from_slice(&3i32.to_le_bytes());
        bytes.extend_from_slice(&4i32.to_le_bytes());
        fs::write(&path, &bytes).unwrap();

        match ivecs_read(&path) {
            Err(CodecError::DimensionMismatch {
                record,
                expected,
                found,
            }) => {
                assert_eq!(record, 1);
                assert_eq!(expected, 2);
                assert_eq!(found, 3);
            }
            other => panic!("expected DimensionMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_limited_read_returns_prefix() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("base.fvecs");

        let data = random_float_vectors(10, 6);
        fvecs_write(&path, &data).unwrap();

        let head = read_vecs_limited::<f32, _>(&path, 4).unwrap();
        assert_eq!(head.shape(), &[4, 6]);
        assert_eq!(head, data.slice(ndarray::s![0..4, ..]));
    }

    #[test]
    fn test_limited_read_past_end_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("base.fvecs");

        fvecs_write(&path, &random_float_vectors(3, 6)).unwrap();

        match read_vecs_limited::<f32, _>(&path, 5) {
            Err(CodecError::NotEnoughRecords {
                requested,
                available,
            }) => {
                assert_eq!(requested, 5);
                assert_eq!(available, 3);
            }
            other => panic!("expected NotEnoughRecords, got {:?}", other),
        }
    }

    #[test]
    fn test_stat_without_loading() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("base.fvecs");

        fvecs_write(&path, &random_float_vectors(7, 32)).unwrap();
        assert_eq!(stat_vecs::<f32, _>(&path).unwrap(), (7, 32));
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("does_not_exist.fvecs");

        assert!(matches!(fvecs_read(&path), Err(CodecError::Io(_))));
    }
}
