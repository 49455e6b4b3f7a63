use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::models::audio_models::SessionDiagnostics;

/// Append-only byte buffer shared between the host delivery thread and the
/// control thread.
///
/// Wrap in `Arc<SampleBuffer>` for cross-thread access. Appends and
/// snapshots take the same lock, so a snapshot always ends on the boundary
/// of a whole append and bytes keep their delivery order.
#[derive(Debug, Default)]
pub struct SampleBuffer {
    bytes: Mutex<Vec<u8>>,
    callback_count: AtomicU64,
    contended_appends: AtomicU64,
}

impl SampleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Mutex::new(Vec::with_capacity(capacity)),
            ..Self::default()
        }
    }

    /// Append one delivered quantum.
    ///
    /// Only ever waits on the buffer lock, which the control thread holds
    /// for the duration of a copy at most.
    pub fn append(&self, data: &[u8]) {
        self.callback_count.fetch_add(1, Ordering::Relaxed);
        let mut bytes = match self.bytes.try_lock() {
            Some(guard) => guard,
            None => {
                self.contended_appends.fetch_add(1, Ordering::Relaxed);
                self.bytes.lock()
            }
        };
        bytes.extend_from_slice(data);
    }

    /// Consistent point-in-time copy of everything appended so far.
    pub fn snapshot(&self) -> Vec<u8> {
        self.bytes.lock().clone()
    }

    /// Number of bytes appended so far.
    pub fn len(&self) -> usize {
        self.bytes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn diagnostics(&self) -> SessionDiagnostics {
        SessionDiagnostics {
            callback_count: self.callback_count.load(Ordering::Relaxed),
            bytes_captured: self.len() as u64,
            contended_appends: self.contended_appends.load(Ordering::Relaxed),
        }
    }
}
