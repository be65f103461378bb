use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine::write_atomic;
use thiserror::Error;

use super::pet::{Pet, PetRecord};

#[derive(Debug, Error)]
pub(crate) enum SaveError {
    #[error("failed to read pet save {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse pet save {path} at {field_path}: {source}")]
    Parse {
        path: PathBuf,
        field_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode pet save: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write pet save {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reads the pet saved at `path`. A missing file is not an error.
pub(crate) fn load_pet(path: &Path) -> Result<Option<Pet>, SaveError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SaveError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let mut deserializer = serde_json::Deserializer::from_str(&raw);
    let record: PetRecord =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            let field_path = error.path().to_string();
            SaveError::Parse {
                path: path.to_path_buf(),
                field_path,
                source: error.into_inner(),
            }
        })?;
    Ok(Some(Pet::from_record(record)))
}

pub(crate) fn save_pet(path: &Path, pet: &Pet) -> Result<(), SaveError> {
    let json = serde_json::to_string_pretty(&pet.to_record()).map_err(SaveError::Encode)?;
    write_atomic(path, json.as_bytes()).map_err(|source| SaveError::Write {
        path: path.to_path_buf(),
        source,
    })
}
