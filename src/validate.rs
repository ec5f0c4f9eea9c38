use std::path::Path;
use thiserror::Error;

/// A configured input path does not point to an existing file
#[derive(Debug, Error)]
#[error("{label} file not found at {path}")]
pub struct MissingFileError {
    /// Which input failed (e.g. "model", "audio")
    pub label: &'static str,
    /// The offending path value
    pub path: String,
}

/// Checks each (label, path) pair in order and fails on the first one that
/// is not an existing file.
///
/// Read-only filesystem query; must run before any dependent operation
/// (model load, audio decode).
///
/// # Errors
/// Returns [`MissingFileError`] naming the first missing input.
pub fn ensure_files_exist<'a, I>(inputs: I) -> Result<(), MissingFileError>
where
    I: IntoIterator<Item = (&'static str, &'a Path)>,
{
    for (label, path) in inputs {
        if !path.is_file() {
            return Err(MissingFileError {
                label,
                path: path.display().to_string(),
            });
        }
    }
    Ok(())
}
