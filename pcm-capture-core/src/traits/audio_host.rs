use crate::models::audio_models::{DeviceKind, StreamFormat};
use crate::models::error::CaptureError;

/// Callback invoked by the host with newly captured audio.
///
/// Receives interleaved little-endian PCM bytes in the granted format.
/// Runs on the host's audio thread, once per buffer quantum; invocations for
/// one stream are serialized by the host.
pub type DeliveryCallback = Box<dyn FnMut(&[u8]) + Send + 'static>;

/// The process-wide host audio subsystem.
///
/// Constructed once at startup and passed by reference to the enumerator
/// and to every capture session. Implemented by:
/// - `CpalHost` (pcm-capture-cpal)
pub trait AudioHost {
    /// Number of endpoints of `kind` the host currently reports.
    fn device_count(&self, kind: DeviceKind) -> Result<usize, CaptureError>;

    /// Raw host name of the endpoint at `index` in `[0, device_count(kind))`.
    fn device_name(&self, kind: DeviceKind, index: usize) -> Result<String, CaptureError>;

    /// Open a capture stream on the named input device.
    ///
    /// `requested` is a request only: the returned format is the one the
    /// host actually granted. The stream is returned paused; the callback
    /// may not fire until [`CaptureStream::resume`] is called.
    fn open_capture(
        &self,
        device_name: &str,
        requested: &StreamFormat,
        buffer_frames: u32,
        callback: DeliveryCallback,
    ) -> Result<(Box<dyn CaptureStream>, StreamFormat), CaptureError>;
}

/// An open hardware capture stream.
pub trait CaptureStream {
    /// Unpause the stream so the delivery callback begins firing.
    fn resume(&mut self) -> Result<(), CaptureError>;

    /// Stop the stream and release the device.
    ///
    /// Once this returns no further callbacks are delivered. Calling it
    /// again is a no-op.
    fn close(&mut self);
}
