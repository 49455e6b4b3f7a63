//! cpal input stream wrapper and the sample → byte conversion that runs on
//! the audio thread.

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample, StreamConfig};

use pcm_capture_core::{CaptureError, CaptureStream, DeliveryCallback};

/// Samples written to WAV unchanged, as little-endian bytes.
pub trait PcmSample: SizedSample {
    fn put_le(self, out: &mut Vec<u8>);
}

macro_rules! impl_pcm_sample {
    ($($t:ty),*) => {
        $(impl PcmSample for $t {
            fn put_le(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }
        })*
    };
}

impl_pcm_sample!(u8, i16, i32);

/// Replace `out` with the little-endian bytes of `samples`.
pub fn encode_verbatim<T: PcmSample>(samples: &[T], out: &mut Vec<u8>) {
    out.clear();
    for &sample in samples {
        sample.put_le(out);
    }
}

/// Replace `out` with `samples` converted to little-endian `i32`.
pub fn encode_as_i32<T>(samples: &[T], out: &mut Vec<u8>)
where
    T: Sample,
    i32: FromSample<T>,
{
    out.clear();
    for &sample in samples {
        out.extend_from_slice(&i32::from_sample(sample).to_le_bytes());
    }
}

/// An open cpal input stream.
///
/// Dropping or closing it stops delivery and releases the device.
pub struct CpalCaptureStream {
    device_name: String,
    stream: Option<cpal::Stream>,
}

impl CpalCaptureStream {
    /// Build an input stream on `device` delivering bytes to `callback`.
    ///
    /// The stream is paused before it is returned.
    pub fn build(
        device: &cpal::Device,
        device_name: &str,
        config: &StreamConfig,
        sample_format: SampleFormat,
        callback: DeliveryCallback,
    ) -> Result<Self, CaptureError> {
        let stream = match sample_format {
            SampleFormat::U8 => build_verbatim::<u8>(device, device_name, config, callback),
            SampleFormat::I16 => build_verbatim::<i16>(device, device_name, config, callback),
            SampleFormat::I32 => build_verbatim::<i32>(device, device_name, config, callback),
            SampleFormat::I8 => build_converted::<i8>(device, device_name, config, callback),
            SampleFormat::U16 => build_converted::<u16>(device, device_name, config, callback),
            SampleFormat::U32 => build_converted::<u32>(device, device_name, config, callback),
            SampleFormat::I64 => build_converted::<i64>(device, device_name, config, callback),
            SampleFormat::U64 => build_converted::<u64>(device, device_name, config, callback),
            SampleFormat::F32 => build_converted::<f32>(device, device_name, config, callback),
            SampleFormat::F64 => build_converted::<f64>(device, device_name, config, callback),
            other => {
                return Err(CaptureError::Open(format!(
                    "unsupported sample format {} on {}",
                    other, device_name
                )))
            }
        }?;

        // Some backends start streams on creation.
        if let Err(e) = stream.pause() {
            log::debug!("{}: pause after build not supported: {}", device_name, e);
        }

        Ok(Self {
            device_name: device_name.to_string(),
            stream: Some(stream),
        })
    }
}

impl CaptureStream for CpalCaptureStream {
    fn resume(&mut self) -> Result<(), CaptureError> {
        let stream = self
            .stream
            .as_ref()
            .ok_or_else(|| CaptureError::Open(format!("{}: stream already closed", self.device_name)))?;
        stream
            .play()
            .map_err(|e| CaptureError::Open(format!("{}: failed to start stream: {}", self.device_name, e)))
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                log::debug!("{}: pause on close failed: {}", self.device_name, e);
            }
            drop(stream);
        }
    }
}

impl Drop for CpalCaptureStream {
    fn drop(&mut self) {
        self.close();
    }
}

fn build_verbatim<T: PcmSample>(
    device: &cpal::Device,
    device_name: &str,
    config: &StreamConfig,
    mut callback: DeliveryCallback,
) -> Result<cpal::Stream, CaptureError> {
    let mut scratch = Vec::new();
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                encode_verbatim(data, &mut scratch);
                callback(&scratch);
            },
            stream_error_logger(device_name),
            None,
        )
        .map_err(|e| CaptureError::Open(format!("{}: {}", device_name, e)))
}

fn build_converted<T>(
    device: &cpal::Device,
    device_name: &str,
    config: &StreamConfig,
    mut callback: DeliveryCallback,
) -> Result<cpal::Stream, CaptureError>
where
    T: SizedSample,
    i32: FromSample<T>,
{
    let mut scratch = Vec::new();
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                encode_as_i32(data, &mut scratch);
                callback(&scratch);
            },
            stream_error_logger(device_name),
            None,
        )
        .map_err(|e| CaptureError::Open(format!("{}: {}", device_name, e)))
}

fn stream_error_logger(device_name: &str) -> impl FnMut(cpal::StreamError) + Send + 'static {
    let device_name = device_name.to_string();
    move |err| log::warn!("Capture stream error on {}: {}", device_name, err)
}
