use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::audio_models::StreamFormat;

/// Result returned when a capture has been written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingResult {
    pub file_path: PathBuf,
    pub duration_secs: f64,
    /// Length of the WAV data chunk in bytes.
    pub data_bytes: u64,
    pub metadata: RecordingMetadata,
    pub checksum: String,
}

/// Metadata describing a written recording.
///
/// Serializable for the optional JSON sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub created_at: String,
    pub file_path: String,
    pub device_name: Option<String>,
    pub format: StreamFormat,
    pub data_bytes: u64,
    pub duration_secs: f64,
    pub checksum: String,
}

impl RecordingMetadata {
    pub fn new(
        file_path: &str,
        device_name: Option<String>,
        format: StreamFormat,
        data_bytes: u64,
        checksum: &str,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            file_path: file_path.to_string(),
            device_name,
            format,
            data_bytes,
            duration_secs: format.duration_secs(data_bytes),
            checksum: checksum.to_string(),
        }
    }
}
