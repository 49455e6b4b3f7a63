//! Host audio subsystem backed by cpal.

use std::fmt::Display;

use cpal::traits::{DeviceTrait, HostTrait};
use parking_lot::Mutex;

use pcm_capture_core::{AudioHost, CaptureError, CaptureStream, DeliveryCallback, DeviceKind, StreamFormat};

use crate::cpal_stream::CpalCaptureStream;
use crate::negotiation;

/// `AudioHost` over one cpal host.
///
/// Construct once at startup and hand it to the enumerator / controller.
///
/// `device_count` takes one snapshot of the host's devices and
/// `device_name` answers from it, so a listing pass sees a stable set of
/// names even if devices come and go meanwhile.
pub struct CpalHost {
    host: cpal::Host,
    names: NameCache,
}

impl CpalHost {
    /// The platform's default host (ALSA on Linux, CoreAudio on macOS,
    /// WASAPI on Windows).
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
            names: NameCache::default(),
        }
    }

    /// A specific host, e.g. JACK or ASIO when cpal was built with them.
    pub fn with_host_id(id: cpal::HostId) -> Result<Self, CaptureError> {
        let host = cpal::host_from_id(id)
            .map_err(|e| CaptureError::Enumeration(format!("host {} unavailable: {}", id.name(), e)))?;
        Ok(Self {
            host,
            names: NameCache::default(),
        })
    }

    /// Names of the hosts available on this platform.
    pub fn available_host_names() -> Vec<&'static str> {
        cpal::available_hosts().into_iter().map(|id| id.name()).collect()
    }

    /// Name of the audio driver in use.
    pub fn host_name(&self) -> &'static str {
        self.host.id().name()
    }

    fn device_names(&self, kind: DeviceKind) -> Result<Vec<String>, CaptureError> {
        let devices: Result<Vec<cpal::Device>, _> = match kind {
            DeviceKind::Playback => self.host.output_devices().map(|d| d.collect()),
            DeviceKind::Capture => self.host.input_devices().map(|d| d.collect()),
        };
        let devices =
            devices.map_err(|e| CaptureError::Enumeration(format!("{:?} devices: {}", kind, e)))?;
        collect_names(kind, devices.iter().map(|d| d.name()))
    }

    fn refresh(&self, kind: DeviceKind) -> Result<usize, CaptureError> {
        let names = self.device_names(kind)?;
        let count = names.len();
        log::debug!("{:?} devices on {}: {:?}", kind, self.host_name(), names);
        self.names.store(kind, names);
        Ok(count)
    }

    fn find_input_device(&self, device_name: &str) -> Result<cpal::Device, CaptureError> {
        let mut devices = self
            .host
            .input_devices()
            .map_err(|e| CaptureError::Open(format!("failed to list input devices: {}", e)))?;
        devices
            .find(|d| d.name().map(|n| n == device_name).unwrap_or(false))
            .ok_or_else(|| CaptureError::Open(format!("no input device named {:?}", device_name)))
    }
}

impl Default for CpalHost {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioHost for CpalHost {
    fn device_count(&self, kind: DeviceKind) -> Result<usize, CaptureError> {
        self.refresh(kind)
    }

    fn device_name(&self, kind: DeviceKind, index: usize) -> Result<String, CaptureError> {
        if !self.names.is_loaded(kind) {
            self.refresh(kind)?;
        }
        self.names.get(kind, index)
    }

    fn open_capture(
        &self,
        device_name: &str,
        requested: &StreamFormat,
        buffer_frames: u32,
        callback: DeliveryCallback,
    ) -> Result<(Box<dyn CaptureStream>, StreamFormat), CaptureError> {
        let device = self.find_input_device(device_name)?;

        let ranges: Vec<_> = match device.supported_input_configs() {
            Ok(configs) => configs.collect(),
            Err(e) => {
                log::warn!("{}: supported configs unavailable: {}", device_name, e);
                Vec::new()
            }
        };

        let supported = match negotiation::choose_config(&ranges, requested) {
            Some(config) => config,
            None => device.default_input_config().map_err(|e| {
                CaptureError::Open(format!("{}: no usable input config: {}", device_name, e))
            })?,
        };

        let (config, granted) = negotiation::granted(&supported, buffer_frames);
        log::info!(
            "Opening {} on {}: requested {}, granted {} ({}, {:?})",
            device_name,
            self.host_name(),
            requested,
            granted,
            supported.sample_format(),
            config.buffer_size
        );

        let stream = CpalCaptureStream::build(
            &device,
            device_name,
            &config,
            supported.sample_format(),
            callback,
        )?;
        Ok((Box::new(stream), granted))
    }
}

/// Device names from the last `device_count` of each kind.
#[derive(Debug, Default)]
struct NameCache {
    playback: Mutex<Option<Vec<String>>>,
    capture: Mutex<Option<Vec<String>>>,
}

impl NameCache {
    fn slot(&self, kind: DeviceKind) -> &Mutex<Option<Vec<String>>> {
        match kind {
            DeviceKind::Playback => &self.playback,
            DeviceKind::Capture => &self.capture,
        }
    }

    fn store(&self, kind: DeviceKind, names: Vec<String>) {
        *self.slot(kind).lock() = Some(names);
    }

    fn is_loaded(&self, kind: DeviceKind) -> bool {
        self.slot(kind).lock().is_some()
    }

    fn get(&self, kind: DeviceKind, index: usize) -> Result<String, CaptureError> {
        self.slot(kind)
            .lock()
            .as_ref()
            .and_then(|names| names.get(index).cloned())
            .ok_or_else(|| {
                CaptureError::Enumeration(format!("no {:?} device at index {}", kind, index))
            })
    }
}

/// Names in host order; the first name the host fails to report is an error.
fn collect_names<I, E>(kind: DeviceKind, names: I) -> Result<Vec<String>, CaptureError>
where
    I: IntoIterator<Item = Result<String, E>>,
    E: Display,
{
    names
        .into_iter()
        .enumerate()
        .map(|(index, name)| {
            name.map_err(|e| {
                CaptureError::Enumeration(format!("{:?} device {} has no name: {}", kind, index, e))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_come_from_the_last_snapshot() {
        let cache = NameCache::default();
        assert!(!cache.is_loaded(DeviceKind::Capture));

        cache.store(DeviceKind::Capture, vec!["Mic".into(), "Line In".into()]);
        cache.store(DeviceKind::Playback, vec!["Speakers".into()]);

        assert_eq!(cache.get(DeviceKind::Capture, 1).unwrap(), "Line In");
        assert_eq!(cache.get(DeviceKind::Playback, 0).unwrap(), "Speakers");

        cache.store(DeviceKind::Capture, vec!["Headset".into()]);
        assert_eq!(cache.get(DeviceKind::Capture, 0).unwrap(), "Headset");
        assert!(matches!(
            cache.get(DeviceKind::Capture, 1),
            Err(CaptureError::Enumeration(_))
        ));
    }

    #[test]
    fn unloaded_kind_has_no_names() {
        let cache = NameCache::default();
        cache.store(DeviceKind::Playback, vec!["Speakers".into()]);
        assert!(matches!(
            cache.get(DeviceKind::Capture, 0),
            Err(CaptureError::Enumeration(_))
        ));
    }

    #[test]
    fn unnamed_device_is_an_enumeration_error() {
        let names: Vec<Result<String, &str>> = vec![Ok("Mic".into()), Err("backend gone")];
        let err = collect_names(DeviceKind::Capture, names).unwrap_err();

        match err {
            CaptureError::Enumeration(msg) => {
                assert!(msg.contains("device 1"));
                assert!(msg.contains("backend gone"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn names_keep_host_order() {
        let names: Vec<Result<String, &str>> = vec![Ok("B".into()), Ok("A".into())];
        assert_eq!(
            collect_names(DeviceKind::Playback, names).unwrap(),
            vec!["B".to_string(), "A".to_string()]
        );
    }
}
