//! Audio capture port interfaces

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recording::FragmentSink;

/// Device access errors
#[derive(Debug, Clone, Error)]
pub enum DeviceAccessError {
    #[error("Microphone access denied: {0}")]
    PermissionDenied(String),

    #[error("No audio input device available")]
    NoDevice,

    #[error("Failed to start audio stream: {0}")]
    StreamFailed(String),
}

/// Handle to a live capture stream.
///
/// Pausing stops the device from producing fragments without tearing
/// the stream down; resuming continues into the same take. Dropping
/// the handle releases the device. Implementations must release
/// exactly once no matter how the handle goes out of scope.
pub trait CaptureHandle: Send {
    /// Suspend fragment production
    fn pause(&self);

    /// Continue fragment production after a pause
    fn resume(&self);

    /// Sample rate of the stream in Hz
    fn sample_rate(&self) -> u32;
}

/// Port for acquiring the audio input device
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Open the default input device and start streaming fragments
    /// into the given sink.
    ///
    /// # Arguments
    /// * `sink` - Destination for captured PCM fragments
    ///
    /// # Returns
    /// A handle controlling the live stream, or an access error
    async fn acquire(&self, sink: FragmentSink)
        -> Result<Box<dyn CaptureHandle>, DeviceAccessError>;
}
