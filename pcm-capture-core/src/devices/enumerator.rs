//! Batch enumeration of host playback and capture endpoints.

use crate::models::audio_models::{AudioDeviceDescriptor, DeviceKind};
use crate::models::error::CaptureError;
use crate::traits::audio_host::AudioHost;

/// Lists host audio endpoints through an injected [`AudioHost`].
pub struct DeviceEnumerator<'h, H: AudioHost + ?Sized> {
    host: &'h H,
}

impl<'h, H: AudioHost + ?Sized> DeviceEnumerator<'h, H> {
    pub fn new(host: &'h H) -> Self {
        Self { host }
    }

    /// All playback endpoints followed by all capture endpoints, each group
    /// in host order.
    ///
    /// An index into the returned list identifies a device until the next
    /// enumeration.
    pub fn list_devices(&self) -> Result<Vec<AudioDeviceDescriptor>, CaptureError> {
        let mut devices = self.list_kind(DeviceKind::Playback)?;
        devices.extend(self.list_kind(DeviceKind::Capture)?);
        log::info!("Enumerated {} audio devices", devices.len());
        Ok(devices)
    }

    /// Endpoints of a single kind, in host order.
    pub fn list_kind(&self, kind: DeviceKind) -> Result<Vec<AudioDeviceDescriptor>, CaptureError> {
        let count = self.host.device_count(kind)?;
        let mut devices = Vec::with_capacity(count);
        for index in 0..count {
            let name = self.host.device_name(kind, index)?;
            log::debug!("{:?} device {}: {}", kind, index, name);
            devices.push(AudioDeviceDescriptor::new(name, kind));
        }
        Ok(devices)
    }
}

/// Convenience wrapper for [`DeviceEnumerator::list_devices`].
pub fn list_devices<H: AudioHost + ?Sized>(host: &H) -> Result<Vec<AudioDeviceDescriptor>, CaptureError> {
    DeviceEnumerator::new(host).list_devices()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryHost;

    #[test]
    fn playback_devices_come_first() {
        let host = MemoryHost::new()
            .with_capture_device("Mic A")
            .with_playback_device("Speakers")
            .with_capture_device("Mic B")
            .with_playback_device("HDMI");

        let devices = list_devices(&host).unwrap();
        let labels: Vec<String> = devices.iter().map(|d| d.display_label()).collect();

        assert_eq!(
            labels,
            vec![
                "Playback Device: Speakers",
                "Playback Device: HDMI",
                "Capture Device: Mic A",
                "Capture Device: Mic B",
            ]
        );
    }

    #[test]
    fn empty_host_lists_nothing() {
        let host = MemoryHost::new();
        assert!(list_devices(&host).unwrap().is_empty());
    }

    #[test]
    fn uninitialized_host_propagates_error() {
        let host = MemoryHost::new().with_capture_device("Mic").uninitialized();
        assert!(matches!(list_devices(&host), Err(CaptureError::Enumeration(_))));
    }

    #[test]
    fn list_kind_filters() {
        let host = MemoryHost::new()
            .with_capture_device("Mic")
            .with_playback_device("Speakers");

        let capture = DeviceEnumerator::new(&host).list_kind(DeviceKind::Capture).unwrap();
        assert_eq!(capture, vec![AudioDeviceDescriptor::new("Mic", DeviceKind::Capture)]);
    }
}
