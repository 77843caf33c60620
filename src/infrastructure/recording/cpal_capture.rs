//! Cross-platform audio capture using cpal
//!
//! cpal streams are not Send, so a dedicated thread owns the stream
//! for the whole take. The returned handle talks to that thread
//! through atomics: `open` keeps the stream alive and `paused`
//! silences the callback. Dropping the handle clears `open`, which
//! makes the thread drop the stream and release the device.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::application::ports::{CaptureDevice, CaptureHandle, DeviceAccessError};
use crate::domain::recording::FragmentSink;

/// Preferred sample rate for speech capture
const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Capture device backed by the system default input
pub struct CpalCaptureDevice;

impl CpalCaptureDevice {
    pub fn new() -> Self {
        Self
    }

    /// Get the default input device
    fn get_input_device() -> Result<cpal::Device, DeviceAccessError> {
        let host = cpal::default_host();
        host.default_input_device()
            .ok_or(DeviceAccessError::NoDevice)
    }

    /// Get a suitable input configuration.
    /// Prefers mono and the speech target rate; accepts what the
    /// device offers otherwise.
    fn get_input_config(
        device: &cpal::Device,
    ) -> Result<(StreamConfig, SampleFormat), DeviceAccessError> {
        let supported_configs = device.supported_input_configs().map_err(|e| {
            DeviceAccessError::StreamFailed(format!("Failed to get configs: {}", e))
        })?;

        let mut best_config: Option<cpal::SupportedStreamConfigRange> = None;

        for config in supported_configs {
            if config.sample_format() != SampleFormat::I16
                && config.sample_format() != SampleFormat::F32
            {
                continue;
            }

            let includes_target = config.min_sample_rate().0 <= TARGET_SAMPLE_RATE
                && config.max_sample_rate().0 >= TARGET_SAMPLE_RATE;

            let is_better = match &best_config {
                None => true,
                Some(current) => {
                    let fewer_channels = config.channels() < current.channels();
                    let better_rate =
                        includes_target && current.min_sample_rate().0 > TARGET_SAMPLE_RATE;
                    fewer_channels || better_rate
                }
            };
            if is_better {
                best_config = Some(config);
            }
        }

        let config_range = best_config.ok_or(DeviceAccessError::StreamFailed(
            "No suitable config found".into(),
        ))?;

        let sample_rate = if config_range.min_sample_rate().0 <= TARGET_SAMPLE_RATE
            && config_range.max_sample_rate().0 >= TARGET_SAMPLE_RATE
        {
            SampleRate(TARGET_SAMPLE_RATE)
        } else {
            config_range.min_sample_rate()
        };

        let sample_format = config_range.sample_format();
        let config = StreamConfig {
            channels: config_range.channels(),
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        Ok((config, sample_format))
    }

    /// Mix interleaved channels down to mono
    fn mix_to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
        if channels == 1 {
            return samples.to_vec();
        }

        samples
            .chunks(channels as usize)
            .map(|chunk| {
                let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
                (sum / channels as i32) as i16
            })
            .collect()
    }

    /// Encode mono samples as 16-bit little-endian PCM bytes
    fn to_pcm_bytes(samples: &[i16]) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(samples.len() * 2);
        for sample in samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        bytes
    }

    fn classify_build_error(err: cpal::BuildStreamError) -> DeviceAccessError {
        match err {
            cpal::BuildStreamError::DeviceNotAvailable => DeviceAccessError::NoDevice,
            other => {
                let message = other.to_string();
                if message.to_lowercase().contains("permission") {
                    DeviceAccessError::PermissionDenied(message)
                } else {
                    DeviceAccessError::StreamFailed(message)
                }
            }
        }
    }
}

impl Default for CpalCaptureDevice {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a live cpal stream owned by its capture thread
struct CpalCaptureHandle {
    open: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    sample_rate: u32,
}

impl CaptureHandle for CpalCaptureHandle {
    fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl Drop for CpalCaptureHandle {
    fn drop(&mut self) {
        self.open.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl CaptureDevice for CpalCaptureDevice {
    async fn acquire(
        &self,
        sink: FragmentSink,
    ) -> Result<Box<dyn CaptureHandle>, DeviceAccessError> {
        let open = Arc::new(AtomicBool::new(true));
        let paused = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = oneshot::channel();

        let thread_open = Arc::clone(&open);
        let thread_paused = Arc::clone(&paused);

        std::thread::spawn(move || {
            let startup = (|| {
                let device = CpalCaptureDevice::get_input_device()?;
                let (config, sample_format) = CpalCaptureDevice::get_input_config(&device)?;
                let sample_rate = config.sample_rate.0;
                let channels = config.channels;

                let sink_clone = sink.clone();
                let paused_clone = Arc::clone(&thread_paused);

                let stream = match sample_format {
                    SampleFormat::I16 => device
                        .build_input_stream(
                            &config,
                            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                                if paused_clone.load(Ordering::SeqCst) {
                                    return;
                                }
                                let mono = CpalCaptureDevice::mix_to_mono(data, channels);
                                sink_clone.push(CpalCaptureDevice::to_pcm_bytes(&mono));
                            },
                            |err| warn!(error = %err, "audio stream error"),
                            None,
                        )
                        .map_err(CpalCaptureDevice::classify_build_error)?,

                    SampleFormat::F32 => {
                        let sink_clone = sink.clone();
                        let paused_clone = Arc::clone(&thread_paused);

                        device
                            .build_input_stream(
                                &config,
                                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                                    if paused_clone.load(Ordering::SeqCst) {
                                        return;
                                    }
                                    let i16_data: Vec<i16> =
                                        data.iter().map(|&s| (s * 32767.0) as i16).collect();
                                    let mono =
                                        CpalCaptureDevice::mix_to_mono(&i16_data, channels);
                                    sink_clone.push(CpalCaptureDevice::to_pcm_bytes(&mono));
                                },
                                |err| warn!(error = %err, "audio stream error"),
                                None,
                            )
                            .map_err(CpalCaptureDevice::classify_build_error)?
                    }

                    _ => {
                        return Err(DeviceAccessError::StreamFailed(
                            "Unsupported sample format".into(),
                        ))
                    }
                };

                stream
                    .play()
                    .map_err(|e| DeviceAccessError::StreamFailed(e.to_string()))?;

                Ok((stream, sample_rate))
            })();

            match startup {
                Ok((stream, sample_rate)) => {
                    if ready_tx.send(Ok(sample_rate)).is_err() {
                        // Caller went away before startup finished
                        return;
                    }
                    while thread_open.load(Ordering::SeqCst) {
                        std::thread::sleep(std::time::Duration::from_millis(50));
                    }
                    drop(stream);
                }
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                }
            }
        });

        let sample_rate = ready_rx.await.map_err(|_| {
            DeviceAccessError::StreamFailed("Capture thread exited before startup".to_string())
        })??;

        debug!(sample_rate, "audio capture started");

        Ok(Box::new(CpalCaptureHandle {
            open,
            paused,
            sample_rate,
        }))
    }
}
