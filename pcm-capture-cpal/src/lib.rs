//! # pcm-capture-cpal
//!
//! cpal backend for pcm-capture.
//!
//! Provides:
//! - `CpalHost` — `AudioHost` over a cpal host (ALSA, CoreAudio, WASAPI, ...)
//! - `CpalCaptureStream` — an open cpal input stream delivering PCM bytes
//! - format negotiation between the requested format and what a device supports
//!
//! ## Usage
//! ```ignore
//! use pcm_capture_core::{CaptureConfiguration, CaptureController};
//! use pcm_capture_cpal::CpalHost;
//!
//! let mut controller = CaptureController::new(CpalHost::new(), CaptureConfiguration::default());
//! controller.list_devices()?;
//! controller.start_capture(0)?;
//! ```

pub mod cpal_host;
pub mod cpal_stream;
pub mod negotiation;

pub use cpal_host::CpalHost;
pub use cpal_stream::CpalCaptureStream;
