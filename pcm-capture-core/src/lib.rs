//! # pcm-capture-core
//!
//! Platform-agnostic PCM capture core.
//!
//! Enumerates host audio endpoints, captures raw interleaved PCM from one
//! input device into a shared buffer, and writes canonical WAV files.
//! Host audio backends (cpal, in-memory) implement the `AudioHost` trait and
//! are injected into the enumerator and capture sessions.
//!
//! ## Architecture
//!
//! ```text
//! pcm-capture-core (this crate)
//! ├── traits/       ← AudioHost, CaptureStream, DeliveryCallback
//! ├── models/       ← CaptureError, StreamFormat, AudioDeviceDescriptor, config
//! ├── devices/      ← DeviceEnumerator
//! ├── processing/   ← SampleBuffer, WAV header generation/parsing
//! ├── session/      ← CaptureSession, CaptureController
//! ├── storage/      ← WAV file writer, metadata sidecar
//! └── host/         ← MemoryHost
//! ```

pub mod devices;
pub mod host;
pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use devices::enumerator::{list_devices, DeviceEnumerator};
pub use host::memory::{MemoryHost, MemoryStream};
pub use models::audio_models::{AudioDeviceDescriptor, DeviceKind, SessionDiagnostics, StreamFormat};
pub use models::config::CaptureConfiguration;
pub use models::error::CaptureError;
pub use models::recording_result::{RecordingMetadata, RecordingResult};
pub use processing::sample_buffer::SampleBuffer;
pub use processing::wav_format::{generate_wav_header, parse_wav_header, WavHeaderInfo, WAV_HEADER_SIZE};
pub use session::capture::CaptureSession;
pub use session::controller::CaptureController;
pub use storage::wav_writer::{encode, write_wav_file};
pub use traits::audio_host::{AudioHost, CaptureStream, DeliveryCallback};
