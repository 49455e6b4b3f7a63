//! In-process audio host.
//!
//! `MemoryHost` reports a fixed device list and hands out streams whose
//! deliveries are driven by the caller through [`MemoryStream::deliver`].
//! Useful for headless shells and for exercising sessions without hardware.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::audio_models::{DeviceKind, StreamFormat};
use crate::models::error::CaptureError;
use crate::traits::audio_host::{AudioHost, CaptureStream, DeliveryCallback};

#[derive(Default)]
pub struct MemoryHost {
    playback: Vec<String>,
    capture: Vec<String>,
    uninitialized: bool,
    granted_format: Mutex<Option<StreamFormat>>,
    refusal: Mutex<Option<String>>,
    streams: Mutex<Vec<MemoryStream>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_playback_device(mut self, name: impl Into<String>) -> Self {
        self.playback.push(name.into());
        self
    }

    pub fn with_capture_device(mut self, name: impl Into<String>) -> Self {
        self.capture.push(name.into());
        self
    }

    /// Every query fails as if the host audio stack was never started.
    pub fn uninitialized(mut self) -> Self {
        self.uninitialized = true;
        self
    }

    /// Grant `format` to subsequent opens instead of the requested one.
    pub fn grant_format(&self, format: StreamFormat) {
        *self.granted_format.lock() = Some(format);
    }

    /// Refuse subsequent opens with `diagnostic`.
    pub fn refuse_open(&self, diagnostic: impl Into<String>) {
        *self.refusal.lock() = Some(diagnostic.into());
    }

    /// Streams handed out so far, oldest first.
    pub fn streams(&self) -> Vec<MemoryStream> {
        self.streams.lock().clone()
    }

    pub fn last_stream(&self) -> Option<MemoryStream> {
        self.streams.lock().last().cloned()
    }

    fn names(&self, kind: DeviceKind) -> Result<&[String], CaptureError> {
        if self.uninitialized {
            return Err(CaptureError::Enumeration("audio subsystem not initialized".into()));
        }
        Ok(match kind {
            DeviceKind::Playback => self.playback.as_slice(),
            DeviceKind::Capture => self.capture.as_slice(),
        })
    }
}

impl AudioHost for MemoryHost {
    fn device_count(&self, kind: DeviceKind) -> Result<usize, CaptureError> {
        Ok(self.names(kind)?.len())
    }

    fn device_name(&self, kind: DeviceKind, index: usize) -> Result<String, CaptureError> {
        self.names(kind)?.get(index).cloned().ok_or_else(|| {
            CaptureError::Enumeration(format!("no {:?} device at index {}", kind, index))
        })
    }

    fn open_capture(
        &self,
        device_name: &str,
        requested: &StreamFormat,
        buffer_frames: u32,
        callback: DeliveryCallback,
    ) -> Result<(Box<dyn CaptureStream>, StreamFormat), CaptureError> {
        if self.uninitialized {
            return Err(CaptureError::Open("audio subsystem not initialized".into()));
        }
        if let Some(diagnostic) = self.refusal.lock().clone() {
            return Err(CaptureError::Open(diagnostic));
        }
        if !self.capture.iter().any(|name| name == device_name) {
            return Err(CaptureError::Open(format!("no capture device named {:?}", device_name)));
        }

        let granted = self.granted_format.lock().unwrap_or(*requested);
        let stream = MemoryStream {
            inner: Arc::new(StreamInner {
                device_name: device_name.to_string(),
                requested: *requested,
                granted,
                buffer_frames,
                callback: Mutex::new(Some(callback)),
                running: AtomicBool::new(false),
                releases: AtomicUsize::new(0),
            }),
        };
        self.streams.lock().push(stream.clone());
        Ok((Box::new(stream), granted))
    }
}

struct StreamInner {
    device_name: String,
    requested: StreamFormat,
    granted: StreamFormat,
    buffer_frames: u32,
    callback: Mutex<Option<DeliveryCallback>>,
    running: AtomicBool,
    releases: AtomicUsize,
}

/// Shared handle to a stream opened on a [`MemoryHost`].
#[derive(Clone)]
pub struct MemoryStream {
    inner: Arc<StreamInner>,
}

impl MemoryStream {
    /// Invoke the delivery callback with `data`, as the host audio thread
    /// would. Returns `false` if the stream is paused or closed.
    pub fn deliver(&self, data: &[u8]) -> bool {
        if !self.inner.running.load(Ordering::SeqCst) {
            return false;
        }
        match self.inner.callback.lock().as_mut() {
            Some(callback) => {
                callback(data);
                true
            }
            None => false,
        }
    }

    pub fn device_name(&self) -> &str {
        &self.inner.device_name
    }

    pub fn requested_format(&self) -> StreamFormat {
        self.inner.requested
    }

    pub fn granted_format(&self) -> StreamFormat {
        self.inner.granted
    }

    pub fn buffer_frames(&self) -> u32 {
        self.inner.buffer_frames
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// How many times the device has been released.
    pub fn releases(&self) -> usize {
        self.inner.releases.load(Ordering::SeqCst)
    }
}

impl CaptureStream for MemoryStream {
    fn resume(&mut self) -> Result<(), CaptureError> {
        if self.inner.callback.lock().is_none() {
            return Err(CaptureError::Open("stream already closed".into()));
        }
        self.inner.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn close(&mut self) {
        self.inner.running.store(false, Ordering::SeqCst);
        if self.inner.callback.lock().take().is_some() {
            self.inner.releases.fetch_add(1, Ordering::SeqCst);
        }
    }
}
