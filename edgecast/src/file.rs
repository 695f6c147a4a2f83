//! Loading and saving of JSON documents, such as fixtures and analyses.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("cannot access {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("malformed JSON in {}: {source}", .path.display())]
    Json { path: PathBuf, source: serde_json::Error },
}
impl FileError {
    fn io(path: &Path, source: io::Error) -> Self {
        FileError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        FileError::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Reads a JSON-encoded type from a given file `path`.
pub fn read_json<D: DeserializeOwned>(path: impl AsRef<Path>) -> Result<D, FileError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| FileError::io(path, err))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|err| FileError::json(path, err))
}

/// Writes `value` to `path` as pretty-printed JSON, replacing any existing file.
pub fn write_json(path: impl AsRef<Path>, value: &impl Serialize) -> Result<(), FileError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|err| FileError::io(path, err))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value).map_err(|err| FileError::json(path, err))
}

pub trait ReadJsonFile: Sized {
    fn read_json_file(path: impl AsRef<Path>) -> Result<Self, FileError>;
}

impl<D: DeserializeOwned> ReadJsonFile for D {
    fn read_json_file(path: impl AsRef<Path>) -> Result<D, FileError> {
        read_json(path)
    }
}

pub trait WriteJsonFile {
    fn write_json_file(&self, path: impl AsRef<Path>) -> Result<(), FileError>;
}

impl<S: Serialize> WriteJsonFile for S {
    fn write_json_file(&self, path: impl AsRef<Path>) -> Result<(), FileError> {
        write_json(path, self)
    }
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::process;

    use crate::fixture::Fixture;

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(format!("edgecast-{name}-{}.json", process::id()))
    }

    #[test]
    fn fixture_survives_file() {
        let path = temp_path("fixture");
        let fixture = Fixture::vip_sample();
        fixture.write_json_file(&path).unwrap();
        let read = Fixture::read_json_file(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(fixture, read);
    }

    #[test]
    fn missing_file() {
        let path = temp_path("missing");
        assert!(matches!(Fixture::read_json_file(&path), Err(FileError::Io { .. })));
    }

    #[test]
    fn malformed_file() {
        let path = temp_path("malformed");
        fs::write(&path, "{ \"request\": ").unwrap();
        let result = Fixture::read_json_file(&path);
        fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(FileError::Json { .. })));
    }
}
