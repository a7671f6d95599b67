use std::{
    error::Error,
    fmt, fs, io,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

use crate::codec::{self, CodecError, ElementKind, VecsScalar};

/// Extensions a vector dataset file can carry. Purely a naming convention;
/// the codec never looks at them.
pub const VECS_EXTENSIONS: [&str; 3] = ["ivecs", "fvecs", "bvecs"];

#[derive(Debug)]
pub enum DatasetError {
    Codec(CodecError),
    /// Trim would overwrite its own input.
    SamePath(PathBuf),
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DatasetError::Codec(e) => write!(f, "{}", e),
            DatasetError::SamePath(path) => write!(
                f,
                "output {} is the input file; refusing to overwrite it",
                path.display()
            ),
        }
    }
}

impl Error for DatasetError {}

impl From<CodecError> for DatasetError {
    fn from(error: CodecError) -> Self {
        DatasetError::Codec(error)
    }
}

impl From<io::Error> for DatasetError {
    fn from(error: io::Error) -> Self {
        DatasetError::Codec(CodecError::Io(error))
    }
}

/// Recursively collects the vector files under `dir`.
pub fn find_vecs_files<P: AsRef<Path>>(dir: P) -> Vec<PathBuf> {
    WalkDir::new(dir.as_ref())
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_type().is_file()
                && e.path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map_or(false, |ext| VECS_EXTENSIONS.contains(&ext))
        })
        .map(|entry| entry.path().to_path_buf())
        .collect()
}

/// Maps a file extension to the element kind it conventionally carries.
/// Only a convenience for callers like the CLI; pass the kind explicitly
/// when the extension is not trustworthy.
pub fn kind_for_extension<P: AsRef<Path>>(path: P) -> Option<ElementKind> {
    match path.as_ref().extension().and_then(|ext| ext.to_str()) {
        Some("ivecs") => Some(ElementKind::Int32),
        Some("fvecs") => Some(ElementKind::Float32),
        Some("bvecs") => Some(ElementKind::Uint8),
        _ => None,
    }
}

/// Returns the `(N, D)` shape of a dataset file for the given element kind.
pub fn shape<P: AsRef<Path>>(path: P, kind: ElementKind) -> Result<(usize, usize), CodecError> {
    match kind {
        ElementKind::Int32 => codec::stat_vecs::<i32, _>(path),
        ElementKind::Float32 => codec::stat_vecs::<f32, _>(path),
        ElementKind::Uint8 => codec::stat_vecs::<u8, _>(path),
    }
}

/// Copies the first `count` records of `input` into `output`.
///
/// Never writes the input file in place: a trimmed dataset replacing the
/// full one is unrecoverable.
pub fn trim<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    count: usize,
    kind: ElementKind,
) -> Result<(), DatasetError> {
    let input = input.as_ref();
    let output = output.as_ref();

    if same_file(input, output)? {
        return Err(DatasetError::SamePath(output.to_path_buf()));
    }

    match kind {
        ElementKind::Int32 => trim_as::<i32>(input, output, count),
        ElementKind::Float32 => trim_as::<f32>(input, output, count),
        ElementKind::Uint8 => trim_as::<u8>(input, output, count),
    }
}

fn trim_as<T: VecsScalar>(input: &Path, output: &Path, count: usize) -> Result<(), DatasetError> {
    let data = codec::read_vecs_limited::<T, _>(input, count)?;
    codec::write_vecs(output, &data)?;
    Ok(())
}

fn same_file(input: &Path, output: &Path) -> Result<bool, DatasetError> {
    if input == output {
        return Ok(true);
    }
    // Canonical comparison only works once both paths exist.
    if !output.exists() {
        return Ok(false);
    }
    Ok(fs::canonicalize(input)? == fs::canonicalize(output)?)
}
