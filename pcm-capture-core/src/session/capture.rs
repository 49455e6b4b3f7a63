use std::path::Path;
use std::sync::Arc;

use crate::models::audio_models::{AudioDeviceDescriptor, SessionDiagnostics, StreamFormat};
use crate::models::config::CaptureConfiguration;
use crate::models::error::CaptureError;
use crate::models::recording_result::RecordingResult;
use crate::processing::sample_buffer::SampleBuffer;
use crate::storage::wav_writer;
use crate::traits::audio_host::{AudioHost, CaptureStream};

/// One open, exclusively owned hardware capture stream and the bytes it has
/// delivered so far.
///
/// Data flow:
/// ```text
/// [host audio thread] → DeliveryCallback → SampleBuffer::append
///                                               ↓ (same lock)
/// [control thread]  save() / snapshot() → SampleBuffer::snapshot → WAV file
/// ```
///
/// The stream is released exactly once, by [`close`](Self::close) or on
/// drop. The buffer outlives the stream, so a session can be saved both
/// while capturing and after it has been closed.
pub struct CaptureSession {
    device: AudioDeviceDescriptor,
    requested_format: StreamFormat,
    format: StreamFormat,
    buffer: Arc<SampleBuffer>,
    stream: Option<Box<dyn CaptureStream>>,
}

impl CaptureSession {
    /// Open `device` for capture and start delivery immediately.
    ///
    /// On failure no session exists and any stream the host handed out has
    /// already been closed.
    pub fn open<H: AudioHost + ?Sized>(
        host: &H,
        device: &AudioDeviceDescriptor,
        config: &CaptureConfiguration,
    ) -> Result<Self, CaptureError> {
        config.validate()?;

        if !device.is_capture_device() {
            return Err(CaptureError::Open(format!(
                "{} is not a capture device",
                device.display_label()
            )));
        }

        let buffer = Arc::new(SampleBuffer::with_capacity(config.initial_buffer_capacity));
        let callback = {
            let buffer = Arc::clone(&buffer);
            Box::new(move |data: &[u8]| buffer.append(data))
        };

        let (stream, granted) = host.open_capture(
            &device.name,
            &config.requested_format,
            config.buffer_frames,
            callback,
        )?;

        // From here on, dropping `session` releases the stream.
        let mut session = Self {
            device: device.clone(),
            requested_format: config.requested_format,
            format: granted,
            buffer,
            stream: Some(stream),
        };

        if granted != config.requested_format {
            log::warn!(
                "{}: requested {}, host granted {}",
                device.name,
                config.requested_format,
                granted
            );
        }
        session.format.validate()?;

        if let Some(stream) = session.stream.as_mut() {
            stream.resume()?;
        }

        log::info!("Capture started on {} ({})", device.name, granted);
        Ok(session)
    }

    /// Stop the stream and release the device. Calling it again does nothing.
    pub fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.close();
            log::info!(
                "Capture closed on {} ({} bytes captured)",
                self.device.name,
                self.buffer.len()
            );
        }
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    pub fn device(&self) -> &AudioDeviceDescriptor {
        &self.device
    }

    /// The format the host granted; used for all encoding.
    pub fn format(&self) -> StreamFormat {
        self.format
    }

    /// The format that was asked for at open time.
    pub fn requested_format(&self) -> StreamFormat {
        self.requested_format
    }

    /// Shared handle to the session's sample buffer.
    pub fn buffer(&self) -> Arc<SampleBuffer> {
        Arc::clone(&self.buffer)
    }

    pub fn captured_bytes(&self) -> usize {
        self.buffer.len()
    }

    /// Seconds of audio captured so far, in the granted format.
    pub fn captured_secs(&self) -> f64 {
        self.format.duration_secs(self.buffer.len() as u64)
    }

    pub fn diagnostics(&self) -> SessionDiagnostics {
        self.buffer.diagnostics()
    }

    /// Consistent copy of everything delivered so far.
    pub fn snapshot(&self) -> Vec<u8> {
        self.buffer.snapshot()
    }

    /// Write the capture so far to `path` without stopping the stream.
    pub fn save(&self, path: &Path) -> Result<RecordingResult, CaptureError> {
        let data = self.buffer.snapshot();
        wav_writer::write_wav_file(path, &self.format, &data, Some(self.device.name.clone()))
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("device", &self.device)
            .field("format", &self.format)
            .field("open", &self.is_open())
            .field("captured_bytes", &self.buffer.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryHost;
    use crate::models::audio_models::DeviceKind;

    fn mic() -> AudioDeviceDescriptor {
        AudioDeviceDescriptor::new("Mic", DeviceKind::Capture)
    }

    #[test]
    fn open_requests_configured_format_and_resumes() {
        let host = MemoryHost::new().with_capture_device("Mic");
        let session = CaptureSession::open(&host, &mic(), &CaptureConfiguration::default()).unwrap();

        let stream = host.last_stream().unwrap();
        assert_eq!(stream.requested_format(), StreamFormat::REQUESTED);
        assert_eq!(stream.buffer_frames(), 4096);
        assert!(stream.is_running());
        assert!(session.is_open());
        assert_eq!(session.format(), StreamFormat::REQUESTED);
    }

    #[test]
    fn playback_device_is_rejected() {
        let host = MemoryHost::new().with_playback_device("Speakers");
        let speakers = AudioDeviceDescriptor::new("Speakers", DeviceKind::Playback);

        let result = CaptureSession::open(&host, &speakers, &CaptureConfiguration::default());
        assert!(matches!(result, Err(CaptureError::Open(_))));
        assert!(host.streams().is_empty());
    }

    #[test]
    fn refused_grant_carries_host_diagnostic() {
        let host = MemoryHost::new().with_capture_device("Mic");
        host.refuse_open("device busy");

        let err = CaptureSession::open(&host, &mic(), &CaptureConfiguration::default()).unwrap_err();
        assert_eq!(err, CaptureError::Open("device busy".into()));
    }

    #[test]
    fn invalid_granted_format_releases_stream() {
        let host = MemoryHost::new().with_capture_device("Mic");
        host.grant_format(StreamFormat::new(44_100, 2, 12));

        let result = CaptureSession::open(&host, &mic(), &CaptureConfiguration::default());
        assert!(matches!(result, Err(CaptureError::Format(_))));

        let stream = host.last_stream().unwrap();
        assert_eq!(stream.releases(), 1);
        assert!(!stream.is_running());
    }

    #[test]
    fn close_is_idempotent() {
        let host = MemoryHost::new().with_capture_device("Mic");
        let mut session = CaptureSession::open(&host, &mic(), &CaptureConfiguration::default()).unwrap();
        let stream = host.last_stream().unwrap();

        assert!(stream.deliver(&[1, 2, 3, 4]));
        session.close();
        session.close();

        assert!(!session.is_open());
        assert_eq!(stream.releases(), 1);
        assert!(!stream.deliver(&[5, 6, 7, 8]));
        assert_eq!(session.snapshot(), vec![1, 2, 3, 4]);

        drop(session);
        assert_eq!(stream.releases(), 1);
    }

    #[test]
    fn drop_releases_stream() {
        let host = MemoryHost::new().with_capture_device("Mic");
        let session = CaptureSession::open(&host, &mic(), &CaptureConfiguration::default()).unwrap();
        let stream = host.last_stream().unwrap();

        drop(session);
        assert_eq!(stream.releases(), 1);
    }

    #[test]
    fn diagnostics_track_deliveries() {
        let host = MemoryHost::new().with_capture_device("Mic");
        let session = CaptureSession::open(&host, &mic(), &CaptureConfiguration::default()).unwrap();
        let stream = host.last_stream().unwrap();

        stream.deliver(&[0; 32]);
        stream.deliver(&[0; 32]);

        let diag = session.diagnostics();
        assert_eq!(diag.callback_count, 2);
        assert_eq!(diag.bytes_captured, 64);
        assert_eq!(session.captured_bytes(), 64);
        // 64 bytes = 8 frames of stereo s32 at 44.1 kHz
        assert!((session.captured_secs() - 8.0 / 44_100.0).abs() < 1e-12);
    }
}
