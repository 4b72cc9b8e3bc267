//! Mission file writer.
//!
//! Serializes a finished mission collection to `<input-base>_mission.json`
//! beside its source file. The output handle is only created once the whole
//! collection has been assembled, so a failed file never leaves partial
//! output behind.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::types::FlowControlMission;

/// Suffix appended to the source file's stem.
const MISSION_FILE_SUFFIX: &str = "_mission.json";

#[derive(Debug, Error)]
pub enum WriterError {
    #[error("failed to create {path}: {source}")]
    Create {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Serialize {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to flush {path}: {source}")]
    Flush {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Output path for a source file: same directory, `<stem>_mission.json`.
pub fn mission_output_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("missions");
    source.with_file_name(format!("{stem}{MISSION_FILE_SUFFIX}"))
}

/// Write the mission collection as a JSON array, flushed before the handle
/// drops.
pub fn write_missions(
    path: &Path,
    missions: &[FlowControlMission],
) -> Result<(), WriterError> {
    let path_str = path.display().to_string();

    let file = File::create(path).map_err(|source| WriterError::Create {
        path: path_str.clone(),
        source,
    })?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer(&mut writer, missions).map_err(|source| WriterError::Serialize {
        path: path_str.clone(),
        source,
    })?;

    writer.flush().map_err(|source| WriterError::Flush {
        path: path_str,
        source,
    })
}
