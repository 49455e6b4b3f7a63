use std::path::Path;

use crate::devices::enumerator::DeviceEnumerator;
use crate::models::audio_models::{AudioDeviceDescriptor, StreamFormat};
use crate::models::config::CaptureConfiguration;
use crate::models::error::CaptureError;
use crate::models::recording_result::RecordingResult;
use crate::session::capture::CaptureSession;
use crate::traits::audio_host::AudioHost;

/// Control surface for a UI shell: pick a device, start capturing, save.
///
/// Holds the process-wide host, the most recent device list, and at most
/// one capture session. All methods run on the control thread.
pub struct CaptureController<H: AudioHost> {
    host: H,
    config: CaptureConfiguration,
    devices: Vec<AudioDeviceDescriptor>,
    session: Option<CaptureSession>,
}

impl<H: AudioHost> CaptureController<H> {
    pub fn new(host: H, config: CaptureConfiguration) -> Self {
        Self {
            host,
            config,
            devices: Vec::new(),
            session: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &CaptureConfiguration {
        &self.config
    }

    /// Re-enumerate host devices, replacing the cached list.
    ///
    /// Indices from a previous enumeration are no longer meaningful. On
    /// failure the previous list is kept.
    pub fn list_devices(&mut self) -> Result<&[AudioDeviceDescriptor], CaptureError> {
        self.devices = DeviceEnumerator::new(&self.host).list_devices()?;
        Ok(&self.devices)
    }

    /// The device list from the last successful enumeration.
    pub fn devices(&self) -> &[AudioDeviceDescriptor] {
        &self.devices
    }

    /// Start capturing from the device at `index` in [`devices`](Self::devices).
    ///
    /// Any current session is closed and discarded first, unsaved. Returns
    /// the format the host granted.
    pub fn start_capture(&mut self, index: usize) -> Result<StreamFormat, CaptureError> {
        let device = self
            .devices
            .get(index)
            .cloned()
            .ok_or(CaptureError::InvalidDeviceIndex {
                index,
                count: self.devices.len(),
            })?;

        if let Some(mut previous) = self.session.take() {
            log::info!("Discarding unsaved capture from {}", previous.device().name);
            previous.close();
        }

        let session = CaptureSession::open(&self.host, &device, &self.config)?;
        let format = session.format();
        self.session = Some(session);
        Ok(format)
    }

    /// Stop the current capture, write it to `path`, and discard the session.
    ///
    /// If writing fails the closed session is kept, so the caller can retry
    /// with another path.
    pub fn save_capture(&mut self, path: &Path) -> Result<RecordingResult, CaptureError> {
        let session = self.session.as_mut().ok_or(CaptureError::NoActiveSession)?;
        session.close();
        let result = session.save(path)?;
        self.session = None;
        Ok(result)
    }

    /// Write the capture so far to `path` while it keeps running.
    pub fn snapshot_capture(&self, path: &Path) -> Result<RecordingResult, CaptureError> {
        self.session
            .as_ref()
            .ok_or(CaptureError::NoActiveSession)?
            .save(path)
    }

    /// Close and drop the current session without saving.
    /// Returns whether there was one.
    pub fn discard_capture(&mut self) -> bool {
        self.session.take().is_some()
    }

    pub fn session(&self) -> Option<&CaptureSession> {
        self.session.as_ref()
    }

    pub fn is_capturing(&self) -> bool {
        self.session.as_ref().is_some_and(CaptureSession::is_open)
    }
}
