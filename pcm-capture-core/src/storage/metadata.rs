use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::CaptureError;
use crate::models::recording_result::RecordingMetadata;

/// Sidecar location for a recording: `take.wav` → `take.metadata.json`.
pub fn metadata_path(recording_path: &Path) -> PathBuf {
    recording_path.with_extension("metadata.json")
}

/// Write recording metadata as a JSON sidecar file.
pub fn write_metadata(metadata: &RecordingMetadata, recording_path: &Path) -> Result<PathBuf, CaptureError> {
    let path = metadata_path(recording_path);
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| CaptureError::Storage(format!("failed to serialize metadata: {}", e)))?;
    fs::write(&path, json)
        .map_err(|e| CaptureError::Storage(format!("failed to write metadata: {}", e)))?;
    Ok(path)
}

/// Read recording metadata from a JSON sidecar file.
pub fn read_metadata(recording_path: &Path) -> Result<RecordingMetadata, CaptureError> {
    let json = fs::read_to_string(metadata_path(recording_path))
        .map_err(|e| CaptureError::Storage(format!("failed to read metadata: {}", e)))?;
    serde_json::from_str(&json)
        .map_err(|e| CaptureError::Storage(format!("failed to parse metadata: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::audio_models::StreamFormat;

    #[test]
    fn sidecar_round_trip() {
        let recording = std::env::temp_dir().join("pcm_capture_test_sidecar.wav");
        let metadata = RecordingMetadata::new(
            &recording.to_string_lossy(),
            Some("Line In".into()),
            StreamFormat::new(48_000, 2, 16),
            192_000,
            "abc123",
        );
        assert!((metadata.duration_secs - 1.0).abs() < 1e-9);

        let written = write_metadata(&metadata, &recording).unwrap();
        assert!(written.to_string_lossy().ends_with("pcm_capture_test_sidecar.metadata.json"));

        let loaded = read_metadata(&recording).unwrap();
        assert_eq!(loaded, metadata);

        fs::remove_file(written).ok();
    }

    #[test]
    fn missing_sidecar_is_a_storage_error() {
        let recording = std::env::temp_dir().join("pcm_capture_test_no_sidecar.wav");
        assert!(matches!(read_metadata(&recording), Err(CaptureError::Storage(_))));
    }
}
