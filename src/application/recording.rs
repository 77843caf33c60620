//! Recording control use case
//!
//! Drives one dictation take: acquires the microphone, gates the
//! fragment buffer, keeps the elapsed clock ticking, and correlates
//! the take with a transcription job on the remote service. The job
//! is started in the background so a slow or failing service never
//! blocks the microphone.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::recording::{
    ChunkBuffer, InvalidStateTransition, RecordingSession, RecordingStatus,
};
use crate::domain::transcription::{CapturedAudio, JobStatus, Specialty};

use super::job::TranscriptionJobClient;
use super::ports::{CaptureDevice, CaptureHandle, DeviceAccessError, TranscriptionService};

/// Errors from recording control
#[derive(Debug, Error)]
pub enum RecordingControlError {
    #[error(transparent)]
    InvalidState(#[from] InvalidStateTransition),

    #[error("Device access failed: {0}")]
    Device(#[from] DeviceAccessError),
}

/// Live capture state for the take in progress
struct ActiveCapture {
    handle: Box<dyn CaptureHandle>,
    ticker: JoinHandle<()>,
}

/// Orchestrates the recording side of a dictation take
pub struct RecordingController<D, S>
where
    D: CaptureDevice,
    S: TranscriptionService,
{
    device: D,
    jobs: Arc<TranscriptionJobClient<S>>,
    session: Arc<Mutex<RecordingSession>>,
    buffer: ChunkBuffer,
    active: StdMutex<Option<ActiveCapture>>,
    tick_interval: Duration,
}

impl<D, S> RecordingController<D, S>
where
    D: CaptureDevice,
    S: TranscriptionService,
{
    /// Create a controller with the standard one-second clock
    pub fn new(device: D, jobs: Arc<TranscriptionJobClient<S>>) -> Self {
        Self::with_tick_interval(device, jobs, Duration::from_secs(1))
    }

    /// Create a controller with a custom clock interval
    pub fn with_tick_interval(
        device: D,
        jobs: Arc<TranscriptionJobClient<S>>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            device,
            jobs,
            session: Arc::new(Mutex::new(RecordingSession::new())),
            buffer: ChunkBuffer::new(),
            active: StdMutex::new(None),
            tick_interval,
        }
    }

    /// Get the current session status
    pub async fn status(&self) -> RecordingStatus {
        self.session.lock().await.status()
    }

    /// Get the elapsed recording time in whole seconds
    pub async fn elapsed_seconds(&self) -> u64 {
        self.session.lock().await.elapsed_seconds()
    }

    /// Toggle between recording and paused. Outside a take the call
    /// changes nothing and returns the current status.
    ///
    /// Pausing silences the device before closing the buffer gate;
    /// resuming opens the gate before waking the device, so fragments
    /// produced around the edge are never lost into a closed gate.
    pub async fn toggle_pause(&self) -> Result<RecordingStatus, RecordingControlError> {
        let mut session = self.session.lock().await;
        match session.status() {
            RecordingStatus::Paused => {
                session.resume()?;
                self.buffer.set_accepting(true);
                self.with_handle(|handle| handle.resume());
                Ok(RecordingStatus::Recording)
            }
            RecordingStatus::Recording => {
                session.pause()?;
                self.with_handle(|handle| handle.pause());
                self.buffer.set_accepting(false);
                Ok(RecordingStatus::Paused)
            }
            status => Ok(status),
        }
    }

    /// Stop the take and return the captured audio.
    ///
    /// Releases the device, then runs a single immediate status check
    /// on the transcription job (if one was started) so a job that
    /// finished during recording resolves without waiting out the
    /// poll interval.
    pub async fn stop(&self) -> Result<CapturedAudio, RecordingControlError> {
        let mut session = self.session.lock().await;
        session.stop()?;
        self.buffer.set_accepting(false);
        drop(session);

        let sample_rate = self.teardown();
        let audio = CapturedAudio::from_fragments(self.buffer.take_all(), sample_rate);

        if self.jobs.status().await != JobStatus::Unstarted {
            self.jobs.check_now().await;
        }

        Ok(audio)
    }

    fn with_handle(&self, f: impl FnOnce(&dyn CaptureHandle)) {
        if let Ok(slot) = self.active.lock() {
            if let Some(active) = slot.as_ref() {
                f(active.handle.as_ref());
            }
        }
    }

    /// Tear down the live capture, releasing the device exactly once.
    /// Returns the stream sample rate, or 0 if no capture was active.
    fn teardown(&self) -> u32 {
        let active = self.active.lock().ok().and_then(|mut slot| slot.take());
        match active {
            Some(capture) => {
                capture.ticker.abort();
                let sample_rate = capture.handle.sample_rate();
                drop(capture.handle);
                sample_rate
            }
            None => 0,
        }
    }
}

impl<D, S> RecordingController<D, S>
where
    D: CaptureDevice,
    S: TranscriptionService + 'static,
{
    /// Start a new take.
    ///
    /// The device is acquired before the session transitions, so a
    /// denied microphone leaves the session untouched. The matching
    /// transcription job is started in the background; if it cannot
    /// be started the recording continues without one.
    pub async fn start(&self, specialty: Specialty) -> Result<(), RecordingControlError> {
        let mut session = self.session.lock().await;
        if !session.can_start() {
            return Err(InvalidStateTransition {
                current_status: session.status(),
                action: "start recording".to_string(),
            }
            .into());
        }

        let handle = self.device.acquire(self.buffer.sink()).await?;

        self.buffer.clear();
        session.start()?;
        drop(session);

        self.buffer.set_accepting(true);
        let ticker = self.spawn_ticker();
        if let Ok(mut slot) = self.active.lock() {
            if let Some(old) = slot.replace(ActiveCapture { handle, ticker }) {
                old.ticker.abort();
            }
        }

        let jobs = Arc::clone(&self.jobs);
        tokio::spawn(async move {
            match jobs.start(specialty).await {
                Ok(job_id) => {
                    debug!(job_id = %job_id, "transcription job correlated with recording")
                }
                Err(err) => {
                    warn!(error = %err, "could not start transcription job; recording continues")
                }
            }
        });

        Ok(())
    }

    /// Spawn the elapsed-time clock for the take
    fn spawn_ticker(&self) -> JoinHandle<()> {
        let session = Arc::clone(&self.session);
        let interval = self.tick_interval;

        tokio::spawn(async move {
            let mut clock = tokio::time::interval(interval);
            // interval fires immediately; consume that first tick
            clock.tick().await;
            loop {
                clock.tick().await;
                let mut session = session.lock().await;
                if session.status() == RecordingStatus::Stopped {
                    break;
                }
                session.tick();
            }
        })
    }
}

impl<D, S> Drop for RecordingController<D, S>
where
    D: CaptureDevice,
    S: TranscriptionService,
{
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use crate::application::ports::{JobReport, ServiceError};
    use crate::domain::note::NoteId;
    use crate::domain::recording::FragmentSink;
    use crate::domain::transcription::{AudioArtifact, JobId};

    const NEVER: Duration = Duration::from_secs(3600);

    #[derive(Default)]
    struct DeviceStats {
        acquire_calls: AtomicUsize,
        released: AtomicUsize,
        paused: AtomicBool,
    }

    struct MockCaptureDevice {
        stats: Arc<DeviceStats>,
        sink_slot: Arc<StdMutex<Option<FragmentSink>>>,
        deny: bool,
    }

    impl MockCaptureDevice {
        fn new() -> (Self, Arc<DeviceStats>, Arc<StdMutex<Option<FragmentSink>>>) {
            let stats = Arc::new(DeviceStats::default());
            let sink_slot = Arc::new(StdMutex::new(None));
            let device = Self {
                stats: Arc::clone(&stats),
                sink_slot: Arc::clone(&sink_slot),
                deny: false,
            };
            (device, stats, sink_slot)
        }

        fn denied() -> (Self, Arc<DeviceStats>) {
            let (mut device, stats, _) = Self::new();
            device.deny = true;
            (device, stats)
        }
    }

    struct MockHandle {
        stats: Arc<DeviceStats>,
    }

    impl CaptureHandle for MockHandle {
        fn pause(&self) {
            self.stats.paused.store(true, Ordering::SeqCst);
        }

        fn resume(&self) {
            self.stats.paused.store(false, Ordering::SeqCst);
        }

        fn sample_rate(&self) -> u32 {
            16000
        }
    }

    impl Drop for MockHandle {
        fn drop(&mut self) {
            self.stats.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl CaptureDevice for MockCaptureDevice {
        async fn acquire(
            &self,
            sink: FragmentSink,
        ) -> Result<Box<dyn CaptureHandle>, DeviceAccessError> {
            self.stats.acquire_calls.fetch_add(1, Ordering::SeqCst);
            if self.deny {
                return Err(DeviceAccessError::PermissionDenied(
                    "denied by test".to_string(),
                ));
            }
            if let Ok(mut slot) = self.sink_slot.lock() {
                *slot = Some(sink);
            }
            Ok(Box::new(MockHandle {
                stats: Arc::clone(&self.stats),
            }))
        }
    }

    struct ScriptedService {
        start_calls: AtomicUsize,
        status_calls: AtomicUsize,
        fail_start: bool,
        reports: StdMutex<VecDeque<Result<JobReport, ServiceError>>>,
    }

    impl ScriptedService {
        fn new() -> Self {
            Self {
                start_calls: AtomicUsize::new(0),
                status_calls: AtomicUsize::new(0),
                fail_start: false,
                reports: StdMutex::new(VecDeque::new()),
            }
        }

        fn with_reports(reports: Vec<Result<JobReport, ServiceError>>) -> Self {
            let service = Self::new();
            *service.reports.lock().unwrap() = reports.into();
            service
        }

        fn failing_start() -> Self {
            let mut service = Self::new();
            service.fail_start = true;
            service
        }
    }

    #[async_trait]
    impl TranscriptionService for ScriptedService {
        async fn start_job(&self, _specialty: Specialty) -> Result<JobId, ServiceError> {
            self.start_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_start {
                return Err(ServiceError::RequestFailed("unavailable".to_string()));
            }
            Ok(JobId::new("job-1"))
        }

        async fn upload_audio(
            &self,
            _audio: &AudioArtifact,
            _specialty: Specialty,
        ) -> Result<JobId, ServiceError> {
            Ok(JobId::new("job-2"))
        }

        async fn job_status(&self, _job_id: &JobId) -> Result<JobReport, ServiceError> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            self.reports
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(JobReport::InProgress))
        }

        async fn generate_note(
            &self,
            _job_id: &JobId,
            _specialty: Specialty,
        ) -> Result<NoteId, ServiceError> {
            Ok(NoteId::new("note-1"))
        }
    }

    fn controller_with(
        device: MockCaptureDevice,
        service: Arc<ScriptedService>,
        tick_interval: Duration,
    ) -> (
        RecordingController<MockCaptureDevice, ScriptedService>,
        Arc<TranscriptionJobClient<ScriptedService>>,
    ) {
        let jobs = Arc::new(TranscriptionJobClient::with_poll_interval(service, NEVER));
        let controller =
            RecordingController::with_tick_interval(device, Arc::clone(&jobs), tick_interval);
        (controller, jobs)
    }

    fn push(sink_slot: &StdMutex<Option<FragmentSink>>, fragment: Vec<u8>) -> bool {
        sink_slot
            .lock()
            .unwrap()
            .as_ref()
            .expect("device not acquired")
            .push(fragment)
    }

    #[tokio::test]
    async fn start_enters_recording_and_starts_job() {
        let (device, stats, _) = MockCaptureDevice::new();
        let service = Arc::new(ScriptedService::new());
        let (controller, jobs) = controller_with(device, Arc::clone(&service), NEVER);

        controller.start(Specialty::Cardiology).await.unwrap();
        assert_eq!(controller.status().await, RecordingStatus::Recording);
        assert_eq!(stats.acquire_calls.load(Ordering::SeqCst), 1);

        // Job start runs on a background task
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(service.start_calls.load(Ordering::SeqCst), 1);
        assert_eq!(jobs.status().await, JobStatus::Processing);
    }

    #[tokio::test]
    async fn start_while_recording_is_rejected() {
        let (device, stats, _) = MockCaptureDevice::new();
        let service = Arc::new(ScriptedService::new());
        let (controller, _jobs) = controller_with(device, service, NEVER);

        controller.start(Specialty::default()).await.unwrap();
        let err = controller.start(Specialty::default()).await.unwrap_err();

        assert!(matches!(err, RecordingControlError::InvalidState(_)));
        assert_eq!(stats.acquire_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn denied_device_leaves_session_idle() {
        let (device, _stats) = MockCaptureDevice::denied();
        let service = Arc::new(ScriptedService::new());
        let (controller, jobs) = controller_with(device, Arc::clone(&service), NEVER);

        let err = controller.start(Specialty::default()).await.unwrap_err();

        assert!(matches!(err, RecordingControlError::Device(_)));
        assert_eq!(controller.status().await, RecordingStatus::Idle);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(service.start_calls.load(Ordering::SeqCst), 0);
        assert_eq!(jobs.status().await, JobStatus::Unstarted);
    }

    #[tokio::test]
    async fn elapsed_grows_while_recording() {
        let (device, _, _) = MockCaptureDevice::new();
        let service = Arc::new(ScriptedService::new());
        let (controller, _jobs) = controller_with(device, service, Duration::from_millis(10));

        controller.start(Specialty::default()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(controller.elapsed_seconds().await >= 5);
        assert_eq!(controller.status().await, RecordingStatus::Recording);
    }

    #[tokio::test]
    async fn pause_freezes_clock_and_rejects_fragments() {
        let (device, stats, sink_slot) = MockCaptureDevice::new();
        let service = Arc::new(ScriptedService::new());
        let (controller, _jobs) = controller_with(device, service, Duration::from_millis(10));

        controller.start(Specialty::default()).await.unwrap();
        assert!(push(&sink_slot, vec![1, 2]));

        let status = controller.toggle_pause().await.unwrap();
        assert_eq!(status, RecordingStatus::Paused);
        assert!(stats.paused.load(Ordering::SeqCst));
        assert!(!push(&sink_slot, vec![3, 4]));

        let frozen = controller.elapsed_seconds().await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(controller.elapsed_seconds().await, frozen);

        let status = controller.toggle_pause().await.unwrap();
        assert_eq!(status, RecordingStatus::Recording);
        assert!(!stats.paused.load(Ordering::SeqCst));
        assert!(push(&sink_slot, vec![5, 6]));
    }

    #[tokio::test]
    async fn pause_outside_a_take_is_a_no_op() {
        let (device, _, _) = MockCaptureDevice::new();
        let service = Arc::new(ScriptedService::new());
        let (controller, _jobs) = controller_with(device, service, NEVER);

        let status = controller.toggle_pause().await.unwrap();
        assert_eq!(status, RecordingStatus::Idle);
        assert_eq!(controller.status().await, RecordingStatus::Idle);

        controller.start(Specialty::default()).await.unwrap();
        controller.stop().await.unwrap();

        let status = controller.toggle_pause().await.unwrap();
        assert_eq!(status, RecordingStatus::Stopped);
    }

    #[tokio::test]
    async fn stop_returns_fragments_in_order_and_releases_device() {
        let (device, stats, sink_slot) = MockCaptureDevice::new();
        let service = Arc::new(ScriptedService::new());
        let (controller, _jobs) = controller_with(device, service, NEVER);

        controller.start(Specialty::default()).await.unwrap();
        push(&sink_slot, vec![1, 2]);
        push(&sink_slot, vec![3, 4]);

        let audio = controller.stop().await.unwrap();

        assert_eq!(audio.pcm(), &[1, 2, 3, 4]);
        assert_eq!(audio.sample_rate(), 16000);
        assert_eq!(controller.status().await, RecordingStatus::Stopped);
        assert_eq!(stats.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stop_runs_one_immediate_status_check() {
        let (device, _, _) = MockCaptureDevice::new();
        let service = Arc::new(ScriptedService::with_reports(vec![Ok(
            JobReport::Completed {
                transcript: "as dictated".to_string(),
            },
        )]));
        let (controller, jobs) = controller_with(device, Arc::clone(&service), NEVER);

        controller.start(Specialty::default()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        controller.stop().await.unwrap();

        assert_eq!(service.status_calls.load(Ordering::SeqCst), 1);
        assert_eq!(jobs.status().await, JobStatus::Completed);
    }

    #[tokio::test]
    async fn stop_without_job_skips_status_check() {
        let (device, _, _) = MockCaptureDevice::new();
        let service = Arc::new(ScriptedService::failing_start());
        let (controller, jobs) = controller_with(device, Arc::clone(&service), NEVER);

        controller.start(Specialty::default()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        controller.stop().await.unwrap();

        assert_eq!(service.status_calls.load(Ordering::SeqCst), 0);
        assert_eq!(jobs.status().await, JobStatus::Unstarted);
    }

    #[tokio::test]
    async fn job_start_failure_keeps_recording() {
        let (device, _, _) = MockCaptureDevice::new();
        let service = Arc::new(ScriptedService::failing_start());
        let (controller, _jobs) = controller_with(device, Arc::clone(&service), NEVER);

        controller.start(Specialty::default()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(service.start_calls.load(Ordering::SeqCst), 1);
        assert_eq!(controller.status().await, RecordingStatus::Recording);
    }

    #[tokio::test]
    async fn drop_mid_recording_releases_device() {
        let (device, stats, _) = MockCaptureDevice::new();
        let service = Arc::new(ScriptedService::new());
        {
            let (controller, _jobs) = controller_with(device, service, NEVER);
            controller.start(Specialty::default()).await.unwrap();
        }
        assert_eq!(stats.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn new_take_can_start_after_stop() {
        let (device, stats, sink_slot) = MockCaptureDevice::new();
        let service = Arc::new(ScriptedService::new());
        let (controller, _jobs) = controller_with(device, service, NEVER);

        controller.start(Specialty::default()).await.unwrap();
        push(&sink_slot, vec![1, 2]);
        controller.stop().await.unwrap();

        controller.start(Specialty::default()).await.unwrap();
        assert_eq!(controller.status().await, RecordingStatus::Recording);
        assert_eq!(controller.elapsed_seconds().await, 0);
        assert_eq!(stats.acquire_calls.load(Ordering::SeqCst), 2);

        // The earlier take's fragments were drained on stop
        push(&sink_slot, vec![9, 9]);
        let audio = controller.stop().await.unwrap();
        assert_eq!(audio.pcm(), &[9, 9]);
    }
}
