// crates/client/src/session.rs
//! One submission end to end behind a single state machine: file selection,
//! the three-step upload handoff, the poll loop, and the terminal result.
//!
//! The session owns at most one job and at most one live poll loop. Every
//! mutation happens under one lock, never held across an await, and every
//! completion path re-checks a generation counter so work superseded by a
//! reset (or a newer submission) discards its result instead of mutating
//! state that no longer belongs to it.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use podsum_types::{JobRegistration, JobStatus, PresignedUrlRequest, SummaryData};

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::{ApiError, SubmitError};
use crate::media::SourceFile;
use crate::poller::{self, PollHandle, PollOutcome, PollUpdate};

/// What the client itself is doing, as opposed to what the backend reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No file, no job.
    #[default]
    Idle,
    /// A file passed the type check; no network activity yet.
    FileSelected,
    /// The three-step handoff is in flight.
    Uploading,
    /// A job is registered and the poll loop is live.
    Polling,
    /// Terminal: the job finished and any summary was decoded.
    Completed,
    /// Terminal: a client-side step failed, the backend reported failure,
    /// or the poll loop hit a fatal transport error.
    Failed,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Completed | Phase::Failed)
    }
}

/// One backend-tracked unit of work.
#[derive(Debug, Clone)]
pub struct Job {
    /// Identifier assigned at registration; never mutated afterwards.
    pub id: String,
    /// Normalized object key the artifact lives under. `None` for jobs
    /// adopted via [`Session::attach`], where only the id is known.
    pub object_key: Option<String>,
    /// Last backend-reported status.
    pub status: JobStatus,
}

/// Returned by a successful submission.
#[derive(Debug, Clone)]
pub struct JobHandle {
    pub id: String,
    /// Initial backend-reported status, normally `Pending`.
    pub status: JobStatus,
}

/// Point-in-time view of the session. Exactly one of `summary` / `error` is
/// set once a job ends; both are absent while it is still moving.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub selected_file: Option<String>,
    pub job_id: Option<String>,
    pub object_key: Option<String>,
    pub job_status: Option<JobStatus>,
    pub summary: Option<SummaryData>,
    pub error: Option<String>,
}

struct SessionState {
    phase: Phase,
    source: Option<SourceFile>,
    job: Option<Job>,
    summary: Option<SummaryData>,
    error: Option<String>,
    poll: Option<PollHandle>,
    /// Bumped by reset/select/submit. Completion paths compare against it
    /// and discard anything stale.
    generation: u64,
}

impl SessionState {
    fn new() -> Self {
        Self {
            phase: Phase::Idle,
            source: None,
            job: None,
            summary: None,
            error: None,
            poll: None,
            generation: 0,
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            selected_file: self.source.as_ref().map(|s| s.file_name().to_string()),
            job_id: self.job.as_ref().map(|j| j.id.clone()),
            object_key: self.job.as_ref().and_then(|j| j.object_key.clone()),
            job_status: self.job.as_ref().map(|j| j.status),
            summary: self.summary.clone(),
            error: self.error.clone(),
        }
    }

    /// Stops any live poll loop and invalidates in-flight completions.
    fn invalidate(&mut self) {
        self.generation += 1;
        if let Some(poll) = self.poll.take() {
            poll.stop();
        }
    }
}

struct SessionInner {
    api: ApiClient,
    poll_interval: Duration,
    state: Mutex<SessionState>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl SessionInner {
    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("session state lock poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn publish(&self, state: &SessionState) {
        self.snapshot_tx.send_replace(state.snapshot());
    }
}

/// The session state machine. Clones share one underlying session.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config)?;
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::default());
        Ok(Self {
            inner: Arc::new(SessionInner {
                api,
                poll_interval: config.poll_interval,
                state: Mutex::new(SessionState::new()),
                snapshot_tx,
            }),
        })
    }

    /// Current view of the session.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.snapshot_tx.borrow().clone()
    }

    /// Receiver that sees every snapshot change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    /// Validates `path` and makes it the selected source, entering
    /// `FileSelected`. Selecting while a job is active performs an implicit
    /// reset first; the previous error and result are always cleared.
    pub fn select(&self, path: impl Into<PathBuf>) -> Result<SourceFile, SubmitError> {
        let source = SourceFile::open(path)?;
        let mut state = self.inner.lock_state();
        state.invalidate();
        state.phase = Phase::FileSelected;
        state.source = Some(source.clone());
        state.job = None;
        state.summary = None;
        state.error = None;
        self.inner.publish(&state);
        debug!(file = %source.file_name(), "source selected");
        Ok(source)
    }

    /// Returns the session to `Idle` from any phase. Safe to call while an
    /// upload or poll is in flight; their eventual completions are
    /// discarded.
    pub fn reset(&self) {
        let mut state = self.inner.lock_state();
        state.invalidate();
        state.phase = Phase::Idle;
        state.source = None;
        state.job = None;
        state.summary = None;
        state.error = None;
        self.inner.publish(&state);
        debug!("session reset");
    }

    /// Runs the three-step handoff for the selected file, then starts the
    /// poll loop. Steps run strictly in order; the first failure aborts the
    /// rest and moves the session to `Failed`.
    pub async fn submit(&self) -> Result<JobHandle, SubmitError> {
        let (source, generation) = {
            let mut state = self.inner.lock_state();
            if state.phase != Phase::FileSelected {
                return Err(SubmitError::NoFileSelected);
            }
            let source = match state.source.clone() {
                Some(source) => source,
                None => return Err(SubmitError::NoFileSelected),
            };
            state.invalidate();
            state.phase = Phase::Uploading;
            state.job = None;
            state.summary = None;
            state.error = None;
            self.inner.publish(&state);
            (source, state.generation)
        };

        info!(file = %source.file_name(), size = source.size_bytes(), "starting submission");

        match self.run_handoff(&source).await {
            Ok((registration, object_key)) => {
                let mut state = self.inner.lock_state();
                if state.generation != generation {
                    debug!(job_id = %registration.job_id, "submission superseded, discarding");
                    return Err(SubmitError::Superseded);
                }
                let handle = JobHandle {
                    id: registration.job_id.clone(),
                    status: registration.status,
                };
                state.job = Some(Job {
                    id: registration.job_id.clone(),
                    object_key: Some(object_key),
                    status: registration.status,
                });
                state.phase = Phase::Polling;
                // One live loop per session: anything older stops first.
                if let Some(old) = state.poll.take() {
                    old.stop();
                }
                let (poll, updates) = poller::start_polling(
                    self.inner.api.clone(),
                    registration.job_id,
                    self.inner.poll_interval,
                );
                state.poll = Some(poll);
                self.inner.publish(&state);
                drop(state);
                self.spawn_update_consumer(generation, updates);
                Ok(handle)
            }
            Err(err) => {
                let mut state = self.inner.lock_state();
                if state.generation != generation {
                    debug!("failed submission superseded, discarding");
                    return Err(SubmitError::Superseded);
                }
                state.phase = Phase::Failed;
                state.error = Some(err.to_string());
                self.inner.publish(&state);
                Err(err)
            }
        }
    }

    /// Adopts an already-registered job (for example an id saved from an
    /// earlier run) and begins polling it. The reported status starts at
    /// `Pending` until the immediate first check answers.
    pub fn attach(&self, job_id: impl Into<String>) {
        let job_id = job_id.into();
        let mut state = self.inner.lock_state();
        state.invalidate();
        state.source = None;
        state.summary = None;
        state.error = None;
        state.job = Some(Job {
            id: job_id.clone(),
            object_key: None,
            status: JobStatus::Pending,
        });
        state.phase = Phase::Polling;
        let (poll, updates) =
            poller::start_polling(self.inner.api.clone(), job_id.clone(), self.inner.poll_interval);
        state.poll = Some(poll);
        let generation = state.generation;
        self.inner.publish(&state);
        drop(state);
        self.spawn_update_consumer(generation, updates);
        info!(job_id = %job_id, "attached to job");
    }

    /// Waits until the session is no longer actively working: `Completed`,
    /// `Failed`, or back to `Idle` via a concurrent reset.
    pub async fn wait_terminal(&self) -> SessionSnapshot {
        let mut rx = self.subscribe();
        loop {
            {
                let snap = rx.borrow_and_update();
                if snap.phase.is_terminal() || snap.phase == Phase::Idle {
                    return snap.clone();
                }
            }
            if rx.changed().await.is_err() {
                return self.snapshot();
            }
        }
    }

    async fn run_handoff(
        &self,
        source: &SourceFile,
    ) -> Result<(JobRegistration, String), SubmitError> {
        let api = &self.inner.api;

        // Step 1: credential plus the authoritative object key.
        let request = PresignedUrlRequest::new(source.file_name());
        let credential = api
            .presigned_url(&request)
            .await
            .map_err(|err| SubmitError::CredentialRequestFailed { source: err })?;
        debug!(key = %credential.key_name, "credential acquired");

        // Step 2: move the bytes.
        let bytes = source.read_bytes().await?;
        api.upload_bytes(&credential.url, source.content_type(), bytes)
            .await
            .map_err(|err| SubmitError::TransferFailed { source: err })?;

        // Step 3: register under the normalized key from step 1.
        let registration = api
            .register_job(&credential.key_name)
            .await
            .map_err(|err| SubmitError::RegistrationFailed { source: err })?;

        if let Some(message) = &registration.message {
            debug!(message = %message, "registration message");
        }
        info!(job_id = %registration.job_id, status = %registration.status, "job registered");
        Ok((registration, credential.key_name))
    }

    fn spawn_update_consumer(
        &self,
        generation: u64,
        mut updates: mpsc::UnboundedReceiver<PollUpdate>,
    ) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            while let Some(update) = updates.recv().await {
                let mut state = inner.lock_state();
                if state.generation != generation {
                    debug!("discarding stale poll update");
                    return;
                }
                match update {
                    PollUpdate::Status(status) => {
                        if let Some(job) = state.job.as_mut() {
                            job.status = status;
                        }
                        inner.publish(&state);
                    }
                    PollUpdate::Done(outcome) => {
                        state.poll = None;
                        match outcome {
                            PollOutcome::Summary(summary) => {
                                state.phase = Phase::Completed;
                                state.summary = Some(summary);
                                state.error = None;
                            }
                            PollOutcome::CompletedEmpty => {
                                state.phase = Phase::Completed;
                                state.summary = None;
                                state.error = None;
                            }
                            PollOutcome::DecodeFailed(err) => {
                                // The backend finished, but the payload is
                                // unusable: a client-side failure.
                                state.phase = Phase::Failed;
                                state.error = Some(err.to_string());
                            }
                            PollOutcome::Failed { message } => {
                                state.phase = Phase::Failed;
                                state.error = Some(message);
                            }
                            PollOutcome::Transport(err) => {
                                state.phase = Phase::Failed;
                                state.error = Some(err.to_string());
                            }
                        }
                        inner.publish(&state);
                        return;
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(ClientConfig::default()).unwrap()
    }

    fn temp_mp3() -> tempfile::NamedTempFile {
        use std::io::Write;
        let mut file = tempfile::Builder::new()
            .suffix(".mp3")
            .tempfile()
            .expect("create temp file");
        file.write_all(b"ID3fakeaudio").expect("write temp file");
        file
    }

    #[test]
    fn initial_snapshot_is_idle_and_empty() {
        let session = session();
        let snap = session.snapshot();
        assert_eq!(snap.phase, Phase::Idle);
        assert!(snap.selected_file.is_none());
        assert!(snap.job_id.is_none());
        assert!(snap.job_status.is_none());
        assert!(snap.summary.is_none());
        assert!(snap.error.is_none());
    }

    #[test]
    fn select_moves_to_file_selected() {
        let session = session();
        let file = temp_mp3();
        let source = session.select(file.path()).unwrap();
        assert!(source.file_name().ends_with(".mp3"));

        let snap = session.snapshot();
        assert_eq!(snap.phase, Phase::FileSelected);
        assert_eq!(snap.selected_file.as_deref(), Some(source.file_name()));
        assert!(snap.error.is_none());
    }

    #[test]
    fn select_rejects_wrong_type_and_stays_put() {
        let session = session();
        let err = session.select("/nonexistent/notes.txt").unwrap_err();
        assert!(matches!(err, SubmitError::InvalidFileType { .. }));
        assert_eq!(session.snapshot().phase, Phase::Idle);
    }

    #[test]
    fn reset_returns_to_idle_from_file_selected() {
        let session = session();
        let file = temp_mp3();
        session.select(file.path()).unwrap();
        session.reset();

        let snap = session.snapshot();
        assert_eq!(snap.phase, Phase::Idle);
        assert!(snap.selected_file.is_none());
    }

    #[test]
    fn reset_is_idempotent() {
        let session = session();
        session.reset();
        session.reset();
        assert_eq!(session.snapshot().phase, Phase::Idle);
    }

    #[tokio::test]
    async fn submit_without_selection_fails() {
        let session = session();
        let err = session.submit().await.unwrap_err();
        assert!(matches!(err, SubmitError::NoFileSelected));
        assert_eq!(session.snapshot().phase, Phase::Idle);
    }

    #[tokio::test]
    async fn wait_terminal_returns_immediately_when_idle() {
        let session = session();
        let snap = session.wait_terminal().await;
        assert_eq!(snap.phase, Phase::Idle);
    }

    #[test]
    fn phase_terminal_predicate() {
        assert!(Phase::Completed.is_terminal());
        assert!(Phase::Failed.is_terminal());
        assert!(!Phase::Idle.is_terminal());
        assert!(!Phase::FileSelected.is_terminal());
        assert!(!Phase::Uploading.is_terminal());
        assert!(!Phase::Polling.is_terminal());
    }

    #[test]
    fn subscribers_see_select_transition() {
        let session = session();
        let rx = session.subscribe();
        let file = temp_mp3();
        session.select(file.path()).unwrap();
        assert_eq!(rx.borrow().phase, Phase::FileSelected);
    }
}
