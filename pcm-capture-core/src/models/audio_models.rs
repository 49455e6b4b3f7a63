use serde::{Deserialize, Serialize};

use super::error::CaptureError;

/// Direction of a host audio endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Playback,
    Capture,
}

/// One host-visible audio endpoint, as reported by a single enumeration pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioDeviceDescriptor {
    /// Host-reported identifier, passed back to the host to reopen the device.
    pub name: String,
    pub kind: DeviceKind,
}

impl AudioDeviceDescriptor {
    pub fn new(name: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn is_capture_device(&self) -> bool {
        self.kind == DeviceKind::Capture
    }

    /// Human-readable label for selection lists.
    pub fn display_label(&self) -> String {
        match self.kind {
            DeviceKind::Capture => format!("Capture Device: {}", self.name),
            DeviceKind::Playback => format!("Playback Device: {}", self.name),
        }
    }
}

/// Parameters of an open capture stream.
///
/// A session always stores the format the host granted, which may differ
/// from the one it requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamFormat {
    pub sample_rate_hz: u32,
    pub channel_count: u16,
    pub bits_per_sample: u16,
}

impl StreamFormat {
    /// 44.1 kHz, stereo, 32-bit signed samples.
    pub const REQUESTED: StreamFormat = StreamFormat {
        sample_rate_hz: 44_100,
        channel_count: 2,
        bits_per_sample: 32,
    };

    pub const fn new(sample_rate_hz: u32, channel_count: u16, bits_per_sample: u16) -> Self {
        Self {
            sample_rate_hz,
            channel_count,
            bits_per_sample,
        }
    }

    pub fn validate(&self) -> Result<(), CaptureError> {
        if self.sample_rate_hz == 0 {
            return Err(CaptureError::Format("sample rate must be positive".into()));
        }
        if self.channel_count == 0 {
            return Err(CaptureError::Format("channel count must be positive".into()));
        }
        if self.bits_per_sample == 0 || self.bits_per_sample % 8 != 0 {
            return Err(CaptureError::Format(format!(
                "bits per sample must be a positive multiple of 8, got {}",
                self.bits_per_sample
            )));
        }
        let frame_bytes = self.bits_per_sample as u64 * self.channel_count as u64 / 8;
        if frame_bytes > u16::MAX as u64 || frame_bytes * self.sample_rate_hz as u64 > u32::MAX as u64 {
            return Err(CaptureError::Format(format!("{} exceeds WAV header field widths", self)));
        }
        Ok(())
    }

    pub fn bytes_per_sample(&self) -> u16 {
        self.bits_per_sample / 8
    }

    /// Bytes per frame: `bits_per_sample * channel_count / 8`.
    pub fn block_align(&self) -> u16 {
        (self.bits_per_sample as u32 * self.channel_count as u32 / 8) as u16
    }

    /// Bytes per second: `sample_rate * bits_per_sample * channel_count / 8`.
    pub fn byte_rate(&self) -> u32 {
        (self.sample_rate_hz as u64 * self.bits_per_sample as u64 * self.channel_count as u64 / 8) as u32
    }

    /// Playback duration of `data_len` bytes in this format.
    pub fn duration_secs(&self, data_len: u64) -> f64 {
        match self.byte_rate() {
            0 => 0.0,
            rate => data_len as f64 / rate as f64,
        }
    }
}

impl std::fmt::Display for StreamFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} Hz, {} ch, {}-bit",
            self.sample_rate_hz, self.channel_count, self.bits_per_sample
        )
    }
}

/// Point-in-time counters from a capture session's delivery path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionDiagnostics {
    pub callback_count: u64,
    pub bytes_captured: u64,
    /// Deliveries that found the buffer lock held and had to wait for it.
    pub contended_appends: u64,
}
