use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Append-only buffer for raw PCM bytes.
///
/// Single writer (the capture task) appends while the session controller
/// reads the length for live progress display. The length is kept in an
/// atomic so progress reads never contend with the writer's lock; the value
/// may trail the writer by one chunk, which is fine for display. The full
/// contents are only taken after the capture task has stopped.
#[derive(Debug, Default)]
pub struct CaptureBuffer {
    data: Mutex<Vec<u8>>,
    len: AtomicUsize,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of captured bytes.
    pub fn append(&self, chunk: &[u8]) {
        let mut data = self.data.lock().expect("capture buffer poisoned");
        data.extend_from_slice(chunk);
        self.len.store(data.len(), Ordering::Release);
    }

    /// Current byte count, weakly consistent with in-flight appends.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain the buffer, returning everything captured so far.
    ///
    /// Only meaningful once the writer has stopped appending.
    pub fn take(&self) -> Vec<u8> {
        let mut data = self.data.lock().expect("capture buffer poisoned");
        self.len.store(0, Ordering::Release);
        std::mem::take(&mut *data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_tracks_length() {
        let buffer = CaptureBuffer::new();
        assert!(buffer.is_empty());

        buffer.append(&[1, 2, 3]);
        buffer.append(&[4, 5]);

        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer.take(), vec![1, 2, 3, 4, 5]);
        assert!(buffer.is_empty());
    }
}
