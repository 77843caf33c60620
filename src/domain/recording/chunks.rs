//! Audio chunk buffer shared with the capture callback

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

/// One binary audio fragment as delivered by the capture device
/// (PCM 16-bit little-endian, mono).
pub type AudioFragment = Vec<u8>;

/// Append-only buffer of audio fragments for one recording take.
///
/// The buffer side stays with the session controller; the capture
/// callback holds a cloned [`FragmentSink`]. The sink only accepts
/// fragments while the gate is open, so chunks can never accumulate
/// outside the recording state. Arrival order is preserved.
#[derive(Debug, Default)]
pub struct ChunkBuffer {
    fragments: Arc<StdMutex<Vec<AudioFragment>>>,
    accepting: Arc<AtomicBool>,
}

impl ChunkBuffer {
    /// Create an empty, gated buffer
    pub fn new() -> Self {
        Self {
            fragments: Arc::new(StdMutex::new(Vec::new())),
            accepting: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a push handle for the capture callback
    pub fn sink(&self) -> FragmentSink {
        FragmentSink {
            fragments: Arc::clone(&self.fragments),
            accepting: Arc::clone(&self.accepting),
        }
    }

    /// Open or close the gate for incoming fragments
    pub fn set_accepting(&self, accepting: bool) {
        self.accepting.store(accepting, Ordering::SeqCst);
    }

    /// Whether the gate is currently open
    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::SeqCst)
    }

    /// Drop all buffered fragments
    pub fn clear(&self) {
        if let Ok(mut fragments) = self.fragments.lock() {
            fragments.clear();
        }
    }

    /// Number of fragments buffered so far
    pub fn fragment_count(&self) -> usize {
        self.fragments.lock().map(|f| f.len()).unwrap_or(0)
    }

    /// Total buffered size in bytes
    pub fn total_bytes(&self) -> usize {
        self.fragments
            .lock()
            .map(|f| f.iter().map(Vec::len).sum())
            .unwrap_or(0)
    }

    /// Take every buffered fragment, leaving the buffer empty.
    /// Fragments come out in arrival order.
    pub fn take_all(&self) -> Vec<AudioFragment> {
        self.fragments
            .lock()
            .map(|mut f| std::mem::take(&mut *f))
            .unwrap_or_default()
    }
}

/// Cloneable push handle handed to the capture callback.
#[derive(Debug, Clone)]
pub struct FragmentSink {
    fragments: Arc<StdMutex<Vec<AudioFragment>>>,
    accepting: Arc<AtomicBool>,
}

impl FragmentSink {
    /// Append a fragment if the gate is open.
    /// Returns whether the fragment was accepted.
    pub fn push(&self, fragment: AudioFragment) -> bool {
        if !self.accepting.load(Ordering::SeqCst) {
            return false;
        }
        match self.fragments.lock() {
            Ok(mut fragments) => {
                fragments.push(fragment);
                true
            }
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_empty_and_gated() {
        let buffer = ChunkBuffer::new();
        assert!(!buffer.is_accepting());
        assert_eq!(buffer.fragment_count(), 0);
        assert_eq!(buffer.total_bytes(), 0);
    }

    #[test]
    fn sink_rejects_while_gated() {
        let buffer = ChunkBuffer::new();
        let sink = buffer.sink();

        assert!(!sink.push(vec![1, 2, 3]));
        assert_eq!(buffer.fragment_count(), 0);
    }

    #[test]
    fn sink_accepts_when_open() {
        let buffer = ChunkBuffer::new();
        let sink = buffer.sink();
        buffer.set_accepting(true);

        assert!(sink.push(vec![1, 2, 3]));
        assert_eq!(buffer.fragment_count(), 1);
        assert_eq!(buffer.total_bytes(), 3);
    }

    #[test]
    fn closing_gate_stops_accepting() {
        let buffer = ChunkBuffer::new();
        let sink = buffer.sink();

        buffer.set_accepting(true);
        assert!(sink.push(vec![1]));

        buffer.set_accepting(false);
        assert!(!sink.push(vec![2]));
        assert_eq!(buffer.fragment_count(), 1);
    }

    #[test]
    fn fragments_keep_arrival_order() {
        let buffer = ChunkBuffer::new();
        let sink = buffer.sink();
        buffer.set_accepting(true);

        sink.push(vec![1]);
        sink.push(vec![2, 2]);
        sink.push(vec![3]);

        let fragments = buffer.take_all();
        assert_eq!(fragments, vec![vec![1], vec![2, 2], vec![3]]);
    }

    #[test]
    fn take_all_drains_buffer() {
        let buffer = ChunkBuffer::new();
        let sink = buffer.sink();
        buffer.set_accepting(true);
        sink.push(vec![1]);

        assert_eq!(buffer.take_all().len(), 1);
        assert_eq!(buffer.fragment_count(), 0);
        assert!(buffer.take_all().is_empty());
    }

    #[test]
    fn clear_discards_fragments() {
        let buffer = ChunkBuffer::new();
        let sink = buffer.sink();
        buffer.set_accepting(true);
        sink.push(vec![1]);
        sink.push(vec![2]);

        buffer.clear();
        assert_eq!(buffer.fragment_count(), 0);
    }

    #[test]
    fn sinks_share_one_buffer() {
        let buffer = ChunkBuffer::new();
        buffer.set_accepting(true);
        let a = buffer.sink();
        let b = a.clone();

        a.push(vec![1]);
        b.push(vec![2]);
        assert_eq!(buffer.fragment_count(), 2);
    }
}
