use std::fs::{self, File, OpenOptions, Permissions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::audio_models::StreamFormat;
use crate::models::error::CaptureError;
use crate::models::recording_result::{RecordingMetadata, RecordingResult};
use crate::processing::sample_buffer::SampleBuffer;
use crate::processing::wav_format;

/// Encode a snapshot of `buffer` as a PCM WAV file at `path`.
///
/// The snapshot is taken under the buffer's lock, so capture may keep
/// running while the file is written.
pub fn encode(
    buffer: &SampleBuffer,
    format: &StreamFormat,
    path: &Path,
) -> Result<RecordingResult, CaptureError> {
    let data = buffer.snapshot();
    write_wav_file(path, format, &data, None)
}

/// Write `data` verbatim behind a canonical 44-byte header.
///
/// ## File Format
/// ```text
/// [44-byte WAV header]
/// [raw interleaved PCM data, exactly as captured]
/// ```
///
/// `path` must be openable for writing; a read-only file or a directory is
/// an `Encode` error. The file is assembled next to the destination and
/// renamed into place once it has been flushed, so a failed write never
/// leaves a truncated file behind. A symlink at `path` is written through
/// and an existing file keeps its permissions.
pub fn write_wav_file(
    path: &Path,
    format: &StreamFormat,
    data: &[u8],
    device_name: Option<String>,
) -> Result<RecordingResult, CaptureError> {
    format.validate()?;

    let data_size = data.len() as u64;
    if data_size > wav_format::MAX_DATA_SIZE {
        return Err(CaptureError::Encode(format!(
            "{} bytes of audio exceed the 4 GiB RIFF limit",
            data_size
        )));
    }

    let header = wav_format::generate_wav_header(format, data_size as u32);
    let target = resolve_destination(path)?;
    let created = !target.exists();
    let permissions = open_destination(&target)?;
    let part_path = partial_path(&target)?;

    let written = write_parts(&part_path, &[&header, data], permissions).and_then(|()| {
        fs::rename(&part_path, &target).map_err(|e| {
            CaptureError::Encode(format!(
                "failed to move recording into {}: {}",
                target.display(),
                e
            ))
        })
    });
    if let Err(e) = written {
        fs::remove_file(&part_path).ok();
        if created {
            fs::remove_file(&target).ok();
        }
        return Err(e);
    }

    let mut hasher = Sha256::new();
    hasher.update(header);
    hasher.update(data);
    let checksum = hex_encode(&hasher.finalize());

    log::info!(
        "Wrote {} ({} data bytes, {})",
        path.display(),
        data_size,
        format
    );

    let metadata = RecordingMetadata::new(
        &path.to_string_lossy(),
        device_name,
        *format,
        data_size,
        &checksum,
    );

    Ok(RecordingResult {
        file_path: path.to_path_buf(),
        duration_secs: format.duration_secs(data_size),
        data_bytes: data_size,
        metadata,
        checksum,
    })
}

/// Follow a symlink at `path` to the file it names.
fn resolve_destination(path: &Path) -> Result<PathBuf, CaptureError> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => fs::canonicalize(path).map_err(|e| {
            CaptureError::Encode(format!("cannot resolve {}: {}", path.display(), e))
        }),
        _ => Ok(path.to_path_buf()),
    }
}

/// Open the destination for writing without truncating it and return the
/// permissions the finished file should carry.
fn open_destination(path: &Path) -> Result<Permissions, CaptureError> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| {
            CaptureError::Encode(format!("cannot open {} for writing: {}", path.display(), e))
        })?;
    let meta = file
        .metadata()
        .map_err(|e| CaptureError::Encode(format!("cannot stat {}: {}", path.display(), e)))?;
    Ok(meta.permissions())
}

fn write_parts(path: &Path, parts: &[&[u8]], permissions: Permissions) -> Result<(), CaptureError> {
    let file = File::create(path).map_err(|e| {
        CaptureError::Encode(format!("failed to create {}: {}", path.display(), e))
    })?;
    file.set_permissions(permissions)
        .map_err(|e| CaptureError::Encode(format!("failed to set permissions: {}", e)))?;
    let mut writer = BufWriter::new(file);
    for part in parts {
        writer
            .write_all(part)
            .map_err(|e| CaptureError::Encode(format!("write failed: {}", e)))?;
    }
    let file = writer
        .into_inner()
        .map_err(|e| CaptureError::Encode(format!("flush failed: {}", e.error())))?;
    file.sync_all()
        .map_err(|e| CaptureError::Encode(format!("sync failed: {}", e)))?;
    Ok(())
}

/// Hidden sibling of `path` used while the file is being written.
fn partial_path(path: &Path) -> Result<PathBuf, CaptureError> {
    let file_name = path.file_name().ok_or_else(|| {
        CaptureError::Encode(format!("{} does not name a file", path.display()))
    })?;
    let mut part_name = std::ffi::OsString::from(".");
    part_name.push(file_name);
    part_name.push(".part");
    Ok(path.with_file_name(part_name))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
