//! The mounted form: one task owning form state, the ambient driver and the
//! in-flight submission, reacting to its own events in order.
//!
//! `mount` spawns the task and hands back a `FormHandle`. Every mutation is
//! followed by a fresh `ViewSnapshot` on a watch channel. Unmounting (or
//! dropping the handle) stops the task; the ambient timer and any in-flight
//! submission go with it.

pub mod events;
pub mod snapshot;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::ambient::{AmbientDriver, AmbientEvent, AmbientSettings};
use crate::errors::{SubmitError, ViewError};
use crate::models::SelectedFile;
use crate::state::FormState;
use crate::submission::{SubmissionCoordinator, SubmissionPhase, SubmitReceipt, Submitter};

pub use events::FormEvent;
use events::ViewMessage;
pub use snapshot::ViewSnapshot;

#[derive(Debug, Clone)]
pub struct ViewSettings {
    pub ambient: AmbientSettings,
    /// Upper bound on a single submission, whatever the backend.
    pub submit_timeout: Duration,
    pub clear_on_success: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            ambient: AmbientSettings::default(),
            submit_timeout: Duration::from_secs(60),
            clear_on_success: false,
        }
    }
}

type Settlement = Pin<Box<dyn Future<Output = Result<SubmitReceipt, SubmitError>> + Send>>;

/// Mounts the form and starts its event loop.
pub fn mount(settings: ViewSettings, submitter: Arc<dyn Submitter>) -> FormHandle {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();

    let form = FormState::new();
    let coordinator = SubmissionCoordinator::new(settings.clear_on_success);
    let (snapshots_tx, snapshots_rx) =
        watch::channel(ViewSnapshot::render(&form, &coordinator, &[]));

    let view = FormView {
        form,
        coordinator,
        ambient: AmbientDriver::start(settings.ambient),
        submitter,
        submit_timeout: settings.submit_timeout,
        in_flight: None,
        idle_waiters: Vec::new(),
        snapshots: snapshots_tx,
    };
    let task = tokio::spawn(view.run(events_rx, cancel.clone()));

    FormHandle {
        events: events_tx,
        snapshots: snapshots_rx,
        cancel,
        task: Some(task),
    }
}

/// Handle to a mounted form. Dropping it unmounts the form.
pub struct FormHandle {
    events: mpsc::UnboundedSender<ViewMessage>,
    snapshots: watch::Receiver<ViewSnapshot>,
    cancel: CancellationToken,
    task: Option<JoinHandle<FormState>>,
}

impl FormHandle {
    pub fn dispatch(&self, event: FormEvent) -> Result<(), ViewError> {
        self.events
            .send(ViewMessage::Event(event))
            .map_err(|_| ViewError::Unmounted)
    }

    pub fn set_job_description(&self, text: impl Into<String>) -> Result<(), ViewError> {
        self.dispatch(FormEvent::JobDescriptionChanged(text.into()))
    }

    pub fn select_file(&self, file: Option<SelectedFile>) -> Result<(), ViewError> {
        self.dispatch(FormEvent::FileChanged(file))
    }

    pub fn clear_file(&self) -> Result<(), ViewError> {
        self.dispatch(FormEvent::FileCleared)
    }

    pub fn submit(&self) -> Result<(), ViewError> {
        self.dispatch(FormEvent::Submit)
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.snapshots.clone()
    }

    /// Resolves once every event dispatched so far has been applied and no
    /// submission is in flight.
    pub async fn when_idle(&self) -> Result<ViewSnapshot, ViewError> {
        let (tx, rx) = oneshot::channel();
        self.events
            .send(ViewMessage::WhenIdle(tx))
            .map_err(|_| ViewError::Unmounted)?;
        rx.await.map_err(|_| ViewError::Unmounted)
    }

    /// Tears the form down and returns its final state. An in-flight
    /// submission is dropped and its result never applied.
    pub async fn unmount(mut self) -> Result<FormState, ViewError> {
        self.cancel.cancel();
        let task = self.task.take().ok_or(ViewError::Unmounted)?;
        task.await.map_err(|e| ViewError::TaskFailed(e.to_string()))
    }
}

impl Drop for FormHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct FormView {
    form: FormState,
    coordinator: SubmissionCoordinator,
    ambient: AmbientDriver,
    submitter: Arc<dyn Submitter>,
    submit_timeout: Duration,
    in_flight: Option<Settlement>,
    idle_waiters: Vec<oneshot::Sender<ViewSnapshot>>,
    snapshots: watch::Sender<ViewSnapshot>,
}

impl FormView {
    async fn run(
        mut self,
        mut messages: mpsc::UnboundedReceiver<ViewMessage>,
        cancel: CancellationToken,
    ) -> FormState {
        info!(backend = self.submitter.backend(), "Form view mounted");

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                message = messages.recv() => match message {
                    Some(ViewMessage::Event(event)) => self.apply(event),
                    Some(ViewMessage::WhenIdle(reply)) => self.when_idle(reply),
                    None => break,
                },
                result = settle(&mut self.in_flight), if self.in_flight.is_some() => {
                    self.in_flight = None;
                    self.coordinator.settle(&mut self.form, result);
                    self.publish();
                    self.wake_idle_waiters();
                }
                event = self.ambient.next_event() => {
                    let live = self.ambient.bubbles().len();
                    match event {
                        AmbientEvent::Spawned(id) => debug!(%id, live, "Bubble spawned"),
                        AmbientEvent::Expired(id) => debug!(%id, live, "Bubble expired"),
                    }
                    self.publish();
                }
            }
        }

        if self.in_flight.take().is_some() {
            warn!("Form view unmounted with a submission in flight; its result will be ignored");
            self.form.set_submitting(false);
        }
        info!(
            submissions = self.coordinator.accepted(),
            "Form view unmounted"
        );
        self.form
    }

    fn apply(&mut self, event: FormEvent) {
        match event {
            FormEvent::JobDescriptionChanged(text) => self.form.set_job_description(text),
            FormEvent::FileChanged(file) => {
                debug!(
                    file = file.as_ref().map(|f| f.name.as_str()).unwrap_or("<none>"),
                    "File selection changed"
                );
                self.form.set_file(file);
            }
            FormEvent::FileCleared => self.form.clear_file(),
            FormEvent::Submit => self.start_submission(),
        }
        self.publish();
    }

    fn start_submission(&mut self) {
        let Some(request) = self.coordinator.begin(&mut self.form) else {
            return;
        };

        let submitter = Arc::clone(&self.submitter);
        let limit = self.submit_timeout;
        self.in_flight = Some(Box::pin(async move {
            match tokio::time::timeout(limit, submitter.submit(request)).await {
                Ok(result) => result,
                Err(_) => Err(SubmitError::TimedOut(limit)),
            }
        }));
    }

    fn when_idle(&mut self, reply: oneshot::Sender<ViewSnapshot>) {
        if SubmissionPhase::of(&self.form) == SubmissionPhase::Submitting {
            self.idle_waiters.push(reply);
        } else {
            let _ = reply.send(self.render());
        }
    }

    fn wake_idle_waiters(&mut self) {
        let snapshot = self.render();
        for waiter in self.idle_waiters.drain(..) {
            let _ = waiter.send(snapshot.clone());
        }
    }

    fn render(&self) -> ViewSnapshot {
        ViewSnapshot::render(&self.form, &self.coordinator, self.ambient.bubbles())
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.render());
    }
}

async fn settle(in_flight: &mut Option<Settlement>) -> Result<SubmitReceipt, SubmitError> {
    match in_flight {
        Some(settlement) => settlement.await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::time::Instant;

    use super::*;
    use crate::submission::{SubmissionOutcome, SubmissionRequest};

    /// Settles after `delay`, succeeding or failing as configured, and records what it saw.
    struct ScriptedSubmitter {
        delay: Duration,
        fail_with: Option<&'static str>,
        calls: AtomicUsize,
        completed: AtomicUsize,
        seen: Mutex<Vec<SubmissionRequest>>,
    }

    impl ScriptedSubmitter {
        fn new(delay: Duration, fail_with: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                delay,
                fail_with,
                calls: AtomicUsize::new(0),
                completed: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn succeeding(delay: Duration) -> Arc<Self> {
            Self::new(delay, None)
        }

        fn failing(delay: Duration, message: &'static str) -> Arc<Self> {
            Self::new(delay, Some(message))
        }
    }

    #[async_trait]
    impl Submitter for ScriptedSubmitter {
        async fn submit(&self, request: SubmissionRequest) -> Result<SubmitReceipt, SubmitError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(request);
            tokio::time::sleep(self.delay).await;
            self.completed.fetch_add(1, Ordering::SeqCst);
            match self.fail_with {
                Some(message) => Err(SubmitError::Rejected {
                    status: 500,
                    message: message.to_string(),
                }),
                None => Ok(SubmitReceipt {
                    submitted_at: Utc::now(),
                    document: None,
                }),
            }
        }

        fn backend(&self) -> &'static str {
            "scripted"
        }
    }

    /// Bubbles far enough apart that they stay out of the way.
    fn quiet_settings() -> ViewSettings {
        ViewSettings {
            ambient: AmbientSettings {
                interval: Duration::from_secs(3600),
                lifetime: Duration::from_secs(3600),
                seed: Some(1),
                ..AmbientSettings::default()
            },
            ..ViewSettings::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_scenario() {
        let submitter = ScriptedSubmitter::succeeding(Duration::from_secs(2));
        let handle = mount(quiet_settings(), submitter.clone());
        let mut frames = handle.subscribe();
        let start = Instant::now();

        handle.set_job_description("Senior Engineer role").unwrap();
        handle
            .select_file(Some(SelectedFile::new("resume.tex", "\\begin{document}")))
            .unwrap();
        handle.submit().unwrap();

        let frame = frames
            .wait_for(|s| s.submit_button.disabled)
            .await
            .unwrap()
            .clone();
        assert_eq!(frame.submit_button.label, "Submitting...");
        assert_eq!(frame.job_description, "Senior Engineer role");
        assert_eq!(frame.file_chip.as_ref().unwrap().name, "resume.tex");

        let frame = handle.when_idle().await.unwrap();
        assert!(!frame.submit_button.disabled);
        assert_eq!(frame.submit_button.label, "Submit");
        assert_eq!(
            frame.status,
            Some(SubmissionOutcome::Succeeded { document: None })
        );
        assert!(start.elapsed() >= Duration::from_secs(2));

        let seen = submitter.seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].job_description, "Senior Engineer role");
        assert_eq!(seen[0].file.as_ref().unwrap().name, "resume.tex");

        let form = handle.unmount().await.unwrap();
        assert!(!form.is_submitting());
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_submits_are_ignored() {
        let submitter = ScriptedSubmitter::succeeding(Duration::from_secs(2));
        let handle = mount(quiet_settings(), submitter.clone());

        handle.submit().unwrap();
        handle.submit().unwrap();
        handle.submit().unwrap();
        handle.when_idle().await.unwrap();
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);

        // a new submit after settling is accepted again
        handle.submit().unwrap();
        handle.when_idle().await.unwrap();
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_resets_flag_and_keeps_inputs() {
        let submitter = ScriptedSubmitter::failing(Duration::from_secs(1), "Error generating PDF");
        let handle = mount(quiet_settings(), submitter.clone());

        handle.set_job_description("role").unwrap();
        handle
            .select_file(Some(SelectedFile::new("resume.tex", "x")))
            .unwrap();
        handle.submit().unwrap();

        let frame = handle.when_idle().await.unwrap();
        assert!(!frame.submit_button.disabled);
        assert_eq!(
            frame.status,
            Some(SubmissionOutcome::Failed {
                code: "REJECTED".to_string(),
                message: "Error generating PDF".to_string(),
            })
        );
        assert_eq!(frame.job_description, "role");
        assert!(frame.file_chip.is_some());

        // resubmitting clears the old banner
        handle.submit().unwrap();
        let mut frames = handle.subscribe();
        let frame = frames.wait_for(|s| s.submit_button.disabled).await.unwrap().clone();
        assert!(frame.status.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_submission_times_out() {
        let submitter = ScriptedSubmitter::succeeding(Duration::from_secs(600));
        let settings = ViewSettings {
            submit_timeout: Duration::from_secs(5),
            ..quiet_settings()
        };
        let handle = mount(settings, submitter.clone());
        let start = Instant::now();

        handle.submit().unwrap();
        let frame = handle.when_idle().await.unwrap();

        assert!(start.elapsed() >= Duration::from_secs(5));
        assert!(start.elapsed() < Duration::from_secs(600));
        assert!(matches!(
            frame.status,
            Some(SubmissionOutcome::Failed { ref code, .. }) if code == "TIMEOUT"
        ));
        assert_eq!(submitter.completed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_stays_live_while_submitting() {
        let submitter = ScriptedSubmitter::succeeding(Duration::from_secs(5));
        let handle = mount(quiet_settings(), submitter.clone());
        let mut frames = handle.subscribe();

        handle.set_job_description("first draft").unwrap();
        handle.submit().unwrap();
        handle.set_job_description("second draft").unwrap();
        handle.clear_file().unwrap();

        let frame = frames
            .wait_for(|s| s.job_description == "second draft")
            .await
            .unwrap()
            .clone();
        assert!(frame.submit_button.disabled);

        handle.when_idle().await.unwrap();
        let seen = submitter.seen.lock().unwrap().clone();
        assert_eq!(seen[0].job_description, "first draft");
    }

    #[tokio::test(start_paused = true)]
    async fn test_file_selection_and_clear() {
        let handle = mount(quiet_settings(), ScriptedSubmitter::succeeding(Duration::ZERO));

        handle
            .select_file(Some(SelectedFile::new("first.tex", "a")))
            .unwrap();
        handle
            .select_file(Some(SelectedFile::new("second.tex", "b")))
            .unwrap();
        let frame = handle.when_idle().await.unwrap();
        assert_eq!(frame.file_chip.unwrap().name, "second.tex");
        assert!(frame.drop_hint.is_none());

        handle.clear_file().unwrap();
        let frame = handle.when_idle().await.unwrap();
        assert!(frame.file_chip.is_none());
        assert!(frame.drop_hint.is_some());

        let form = handle.unmount().await.unwrap();
        assert!(form.file().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_bubbles_render_and_stop_after_unmount() {
        let settings = ViewSettings {
            ambient: AmbientSettings {
                interval: Duration::from_secs(2),
                lifetime: Duration::from_secs(7),
                seed: Some(9),
                ..AmbientSettings::default()
            },
            ..ViewSettings::default()
        };
        let handle = mount(settings, ScriptedSubmitter::succeeding(Duration::ZERO));
        let mut frames = handle.subscribe();
        let start = Instant::now();

        frames.wait_for(|s| s.bubbles.len() == 4).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(8));
        let frame = frames.wait_for(|s| s.bubbles.len() == 3).await.unwrap().clone();
        assert!(start.elapsed() >= Duration::from_secs(9));
        assert!(frame
            .bubbles
            .iter()
            .all(|b| (0.0..100.0).contains(&b.left_pct) && (10.0..60.0).contains(&b.size_px)));

        handle.unmount().await.unwrap();
        // the sender went away with the view; no frame arrives after teardown
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(frames.changed().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_drops_in_flight_submission() {
        let submitter = ScriptedSubmitter::succeeding(Duration::from_secs(10));
        let handle = mount(quiet_settings(), submitter.clone());

        handle.submit().unwrap();
        let mut frames = handle.subscribe();
        frames.wait_for(|s| s.submit_button.disabled).await.unwrap();

        let form = handle.unmount().await.unwrap();
        assert!(!form.is_submitting());

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);
        assert_eq!(submitter.completed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_unmounts() {
        let handle = mount(quiet_settings(), ScriptedSubmitter::succeeding(Duration::ZERO));
        let mut frames = handle.subscribe();
        drop(handle);
        assert!(frames.changed().await.is_err());
    }
}
