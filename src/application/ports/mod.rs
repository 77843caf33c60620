//! Traits the use cases depend on; infrastructure implements them

pub mod capture;
pub mod config;
pub mod service;

pub use capture::{CaptureDevice, CaptureHandle, DeviceAccessError};
pub use config::ConfigStore;
pub use service::{JobReport, ServiceError, TranscriptionService};
