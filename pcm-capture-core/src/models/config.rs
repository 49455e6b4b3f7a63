use super::audio_models::StreamFormat;
use super::error::CaptureError;

/// Configuration for opening capture sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConfiguration {
    /// Format asked of the host (default: 44.1 kHz, stereo, 32-bit).
    /// The host may grant something else.
    pub requested_format: StreamFormat,

    /// Frames per delivery callback (default: 4096).
    pub buffer_frames: u32,

    /// Bytes reserved up front in the sample buffer (default: one second
    /// of the requested format).
    pub initial_buffer_capacity: usize,
}

impl CaptureConfiguration {
    pub fn validate(&self) -> Result<(), CaptureError> {
        self.requested_format.validate()?;
        if self.buffer_frames == 0 {
            return Err(CaptureError::Format("buffer quantum must be positive".into()));
        }
        Ok(())
    }
}

impl Default for CaptureConfiguration {
    fn default() -> Self {
        let requested_format = StreamFormat::REQUESTED;
        Self {
            requested_format,
            buffer_frames: 4096,
            initial_buffer_capacity: requested_format.byte_rate() as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_requests_cd_rate_stereo_s32() {
        let config = CaptureConfiguration::default();
        assert_eq!(config.requested_format, StreamFormat::new(44_100, 2, 32));
        assert_eq!(config.buffer_frames, 4096);
        assert_eq!(config.initial_buffer_capacity, 352_800);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_quantum_is_rejected() {
        let config = CaptureConfiguration {
            buffer_frames: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CaptureError::Format(_))));
    }
}
