//! Upload controller: the single writer of transfer state.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};

use crate::error::ApiError;

use super::transfer::{
    progress_percent, ProcessedDocument, ProgressEvent, SelectedFile, TransferProgress,
    TransferState, UploadResponse, UploadTransfer,
};
use super::validate::{validate_file, UploadLimits};

/// Something that can move a file to the upload endpoint.
///
/// Implementations report byte counters on `progress` while sending and
/// return the decoded response body (or a classified failure).
#[async_trait]
pub trait UploadTransport: Send + Sync + 'static {
    async fn upload(
        &self,
        file: SelectedFile,
        progress: mpsc::UnboundedSender<TransferProgress>,
    ) -> Result<UploadResponse, ApiError>;
}

/// An event tagged with the attempt that produced it.
#[derive(Debug)]
pub struct TransferEvent {
    pub attempt: u64,
    pub kind: TransferEventKind,
}

#[derive(Debug)]
pub enum TransferEventKind {
    Progress(TransferProgress),
    Finished(Result<UploadResponse, ApiError>),
}

/// Receiving end of one running attempt.
pub struct AttemptHandle {
    attempt: u64,
    progress: mpsc::UnboundedReceiver<TransferProgress>,
    task: Option<JoinHandle<Result<UploadResponse, ApiError>>>,
}

enum Next {
    Progress(TransferProgress),
    Done(Result<Result<UploadResponse, ApiError>, tokio::task::JoinError>),
}

impl AttemptHandle {
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Next event in transport order; `None` after the finish event.
    ///
    /// Buffered progress is always delivered before the finish event.
    pub async fn next_event(&mut self) -> Option<TransferEvent> {
        let task = self.task.as_mut()?;
        let next = tokio::select! {
            biased;
            Some(progress) = self.progress.recv() => Next::Progress(progress),
            joined = task => Next::Done(joined),
        };

        let kind = match next {
            Next::Progress(progress) => TransferEventKind::Progress(progress),
            Next::Done(joined) => {
                self.task = None;
                let outcome = match joined {
                    Ok(outcome) => outcome,
                    Err(e) if e.is_cancelled() => {
                        Err(ApiError::Unreachable("upload cancelled".to_string()))
                    }
                    Err(e) => Err(ApiError::Unreachable(format!("upload task failed: {}", e))),
                };
                TransferEventKind::Finished(outcome)
            }
        };

        Some(TransferEvent {
            attempt: self.attempt,
            kind,
        })
    }
}

/// Drives upload attempts and owns the current transfer record.
pub struct UploadController<T: UploadTransport> {
    transport: Arc<T>,
    limits: UploadLimits,
    current: Option<UploadTransfer>,
    next_attempt: u64,
    running: Option<AbortHandle>,
}

impl<T: UploadTransport> UploadController<T> {
    pub fn new(transport: Arc<T>, limits: UploadLimits) -> Self {
        Self {
            transport,
            limits,
            current: None,
            next_attempt: 1,
            running: None,
        }
    }

    pub fn transfer(&self) -> Option<&UploadTransfer> {
        self.current.as_ref()
    }

    pub fn state(&self) -> TransferState {
        self.current
            .as_ref()
            .map(|t| t.state)
            .unwrap_or(TransferState::Idle)
    }

    pub fn progress_percent(&self) -> u8 {
        self.current.as_ref().map_or(0, |t| t.progress_percent)
    }

    pub fn last_error(&self) -> Option<&ApiError> {
        self.current.as_ref().and_then(|t| t.error.as_ref())
    }

    /// Start a new attempt for `file`, superseding any running attempt.
    ///
    /// Validation failures return immediately and never reach the transport.
    pub fn submit(&mut self, file: SelectedFile) -> Result<AttemptHandle, ApiError> {
        if let Some(running) = self.running.take() {
            debug!("Superseding running upload attempt");
            running.abort();
        }

        let attempt = self.next_attempt;
        self.next_attempt += 1;

        let mut transfer = UploadTransfer::new(attempt, file.clone());
        transfer.state = TransferState::Validating;

        if let Err(e) = validate_file(&file, &self.limits) {
            debug!("Upload of {} rejected: {}", file.name(), e);
            let err = ApiError::from(e);
            transfer.fail(err.clone());
            self.current = Some(transfer);
            return Err(err);
        }

        transfer.state = TransferState::InFlight;
        self.current = Some(transfer);

        info!(
            "Uploading {} ({} bytes, attempt {})",
            file.name(),
            file.size_bytes(),
            attempt
        );

        let (tx, rx) = mpsc::unbounded_channel();
        let transport = Arc::clone(&self.transport);
        let task = tokio::spawn(async move { transport.upload(file, tx).await });
        self.running = Some(task.abort_handle());

        Ok(AttemptHandle {
            attempt,
            progress: rx,
            task: Some(task),
        })
    }

    /// Resubmit the last selected file as a fresh attempt.
    pub fn retry(&mut self) -> Result<AttemptHandle, ApiError> {
        let file = self
            .current
            .as_ref()
            .filter(|t| t.state == TransferState::Failed)
            .map(|t| t.file.clone())
            .ok_or(ApiError::NothingToRetry)?;
        warn!("Retrying upload of {}", file.name());
        self.submit(file)
    }

    /// Fold one event into the transfer state.
    ///
    /// Returns `None` for events that change nothing: stale attempts, events
    /// after a terminal state, or progress that would not move forward.
    pub fn apply(&mut self, event: TransferEvent) -> Option<Result<ProgressEvent, ApiError>> {
        let transfer = match self.current.as_mut() {
            Some(t) if t.attempt == event.attempt => t,
            _ => {
                debug!("Ignoring event from stale attempt {}", event.attempt);
                return None;
            }
        };
        if transfer.state != TransferState::InFlight {
            debug!(
                "Ignoring event for attempt {} in state {}",
                event.attempt,
                transfer.state.as_str()
            );
            return None;
        }

        match event.kind {
            TransferEventKind::Progress(progress) => {
                let percent = progress_percent(progress.loaded, progress.total);
                transfer
                    .advance(percent)
                    .then(|| Ok(ProgressEvent::Progress { percent }))
            }
            TransferEventKind::Finished(outcome) => {
                self.running = None;
                match outcome.and_then(UploadResponse::into_document) {
                    Ok(document) => {
                        transfer.progress_percent = 100;
                        transfer.state = TransferState::Succeeded;
                        info!(
                            "Upload complete: collection {} ({} chars extracted)",
                            document.collection_id,
                            document.content.len()
                        );
                        Some(Ok(ProgressEvent::Completed(document)))
                    }
                    Err(err) => {
                        warn!("Upload failed: {}", err);
                        transfer.fail(err.clone());
                        Some(Err(err))
                    }
                }
            }
        }
    }

    /// Drive an attempt to its end, reporting each accepted percentage.
    pub async fn run<F>(
        &mut self,
        mut handle: AttemptHandle,
        mut on_progress: F,
    ) -> Result<ProcessedDocument, ApiError>
    where
        F: FnMut(u8),
    {
        while let Some(event) = handle.next_event().await {
            match self.apply(event) {
                Some(Ok(ProgressEvent::Progress { percent })) => on_progress(percent),
                Some(Ok(ProgressEvent::Completed(document))) => {
                    on_progress(100);
                    return Ok(document);
                }
                Some(Err(err)) => return Err(err),
                None => {}
            }
        }

        // Only reachable if this attempt was superseded mid-run.
        Err(self
            .last_error()
            .cloned()
            .unwrap_or_else(|| ApiError::Unreachable("upload superseded".to_string())))
    }

    /// Validate, upload, and retry up to `retries` times on retryable errors.
    pub async fn upload_with_retries<F>(
        &mut self,
        file: SelectedFile,
        retries: u32,
        mut on_progress: F,
    ) -> Result<ProcessedDocument, ApiError>
    where
        F: FnMut(u8),
    {
        let mut handle = self.submit(file)?;
        let mut remaining = retries;
        loop {
            match self.run(handle, &mut on_progress).await {
                Ok(document) => return Ok(document),
                Err(err) if err.is_retryable() && remaining > 0 => {
                    remaining -= 1;
                    on_progress(0);
                    handle = self.retry()?;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl<T: UploadTransport> Drop for UploadController<T> {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted transport: emits fixed byte counters, then a fixed outcome.
    struct ScriptedTransport {
        steps: Vec<TransferProgress>,
        outcomes: Mutex<Vec<Result<UploadResponse, ApiError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedTransport {
        fn new(
            steps: Vec<(u64, Option<u64>)>,
            outcomes: Vec<Result<UploadResponse, ApiError>>,
        ) -> Self {
            Self {
                steps: steps
                    .into_iter()
                    .map(|(loaded, total)| TransferProgress { loaded, total })
                    .collect(),
                outcomes: Mutex::new(outcomes),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl UploadTransport for ScriptedTransport {
        async fn upload(
            &self,
            _file: SelectedFile,
            progress: mpsc::UnboundedSender<TransferProgress>,
        ) -> Result<UploadResponse, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            for step in &self.steps {
                let _ = progress.send(*step);
            }
            let mut outcomes = self.outcomes.lock().unwrap();
            if outcomes.is_empty() {
                Ok(ok_response())
            } else {
                outcomes.remove(0)
            }
        }
    }

    fn ok_response() -> UploadResponse {
        UploadResponse {
            content: Some("This lease is made between...".into()),
            collection_name: Some("lease_2024".into()),
        }
    }

    fn pdf(size: usize) -> SelectedFile {
        SelectedFile::from_bytes("lease.pdf", vec![b'%'; size])
    }

    fn controller(
        transport: ScriptedTransport,
    ) -> (UploadController<ScriptedTransport>, Arc<ScriptedTransport>) {
        let transport = Arc::new(transport);
        (
            UploadController::new(Arc::clone(&transport), UploadLimits::default()),
            transport,
        )
    }

    #[tokio::test]
    async fn test_successful_upload_reports_monotonic_progress() {
        let (mut ctrl, _) = controller(ScriptedTransport::new(
            vec![(10, Some(100)), (50, Some(100)), (30, Some(100)), (100, Some(100))],
            vec![],
        ));

        let handle = ctrl.submit(pdf(100)).unwrap();
        assert_eq!(ctrl.state(), TransferState::InFlight);

        let mut seen = Vec::new();
        let doc = ctrl.run(handle, |p| seen.push(p)).await.unwrap();

        assert_eq!(doc.collection_id, "lease_2024");
        assert_eq!(seen, vec![10, 50, 100, 100]);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(ctrl.state(), TransferState::Succeeded);
        assert_eq!(ctrl.progress_percent(), 100);
    }

    #[tokio::test]
    async fn test_unknown_total_reports_zero_until_done() {
        let (mut ctrl, _) =
            controller(ScriptedTransport::new(vec![(10, None), (90, None)], vec![]));
        let handle = ctrl.submit(pdf(100)).unwrap();
        let mut seen = Vec::new();
        ctrl.run(handle, |p| seen.push(p)).await.unwrap();
        assert_eq!(seen, vec![100]);
    }

    #[tokio::test]
    async fn test_validation_failure_never_calls_transport() {
        let (mut ctrl, transport) = controller(ScriptedTransport::new(vec![], vec![]));

        let err = ctrl.submit(pdf(10 * 1024 * 1024 + 1)).err().unwrap();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(ctrl.state(), TransferState::Failed);

        let err = ctrl
            .submit(SelectedFile::from_bytes("photo.PNG", vec![1, 2, 3]))
            .err()
            .unwrap();
        assert_eq!(
            err.to_string(),
            "Invalid file type. Allowed types: txt, pdf, doc, docx"
        );

        tokio::task::yield_now().await;
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_collection_is_protocol_error() {
        let (mut ctrl, _) = controller(ScriptedTransport::new(
            vec![(100, Some(100))],
            vec![Ok(UploadResponse {
                content: Some("text".into()),
                collection_name: None,
            })],
        ));
        let handle = ctrl.submit(pdf(100)).unwrap();
        let err = ctrl.run(handle, |_| {}).await.unwrap_err();
        assert!(matches!(err, ApiError::Protocol(_)));
        assert_eq!(ctrl.state(), TransferState::Failed);
        assert_eq!(ctrl.progress_percent(), 0);
    }

    #[tokio::test]
    async fn test_failure_resets_progress_and_retry_resubmits() {
        let (mut ctrl, transport) = controller(ScriptedTransport::new(
            vec![(60, Some(100))],
            vec![Err(ApiError::PayloadTooLarge)],
        ));

        let handle = ctrl.submit(pdf(100)).unwrap();
        let err = ctrl.run(handle, |_| {}).await.unwrap_err();
        assert_eq!(err.to_string(), "File size is too large. Maximum size is 10MB.");
        assert_eq!(ctrl.state(), TransferState::Failed);
        assert_eq!(ctrl.progress_percent(), 0);
        assert_eq!(ctrl.transfer().unwrap().file.name(), "lease.pdf");

        let handle = ctrl.retry().unwrap();
        assert_eq!(handle.attempt(), 2);
        assert_eq!(ctrl.progress_percent(), 0);
        let doc = ctrl.run(handle, |_| {}).await.unwrap();
        assert_eq!(doc.content, "This lease is made between...");
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_retry_without_failure_is_rejected() {
        let (mut ctrl, _) = controller(ScriptedTransport::new(vec![], vec![]));
        assert_eq!(ctrl.retry().err(), Some(ApiError::NothingToRetry));
    }

    #[tokio::test]
    async fn test_stale_attempt_events_are_ignored() {
        let (mut ctrl, _) = controller(ScriptedTransport::new(vec![(50, Some(100))], vec![]));

        let _first = ctrl.submit(pdf(100)).unwrap();
        let second = ctrl.submit(pdf(100)).unwrap();
        assert_eq!(second.attempt(), 2);

        let stale = TransferEvent {
            attempt: 1,
            kind: TransferEventKind::Progress(TransferProgress {
                loaded: 99,
                total: Some(100),
            }),
        };
        assert!(ctrl.apply(stale).is_none());
        assert_eq!(ctrl.progress_percent(), 0);

        let stale_done = TransferEvent {
            attempt: 1,
            kind: TransferEventKind::Finished(Err(ApiError::Server { detail: None })),
        };
        assert!(ctrl.apply(stale_done).is_none());
        assert_eq!(ctrl.state(), TransferState::InFlight);

        ctrl.run(second, |_| {}).await.unwrap();
        assert_eq!(ctrl.state(), TransferState::Succeeded);
    }

    #[tokio::test]
    async fn test_upload_with_retries_recovers_from_transport_error() {
        let (mut ctrl, transport) = controller(ScriptedTransport::new(
            vec![(100, Some(100))],
            vec![
                Err(ApiError::Unreachable("connection refused".into())),
                Err(ApiError::Server { detail: None }),
            ],
        ));

        let mut resets = 0;
        let doc = ctrl
            .upload_with_retries(pdf(100), 2, |p| {
                if p == 0 {
                    resets += 1;
                }
            })
            .await
            .unwrap();
        assert_eq!(doc.collection_id, "lease_2024");
        assert_eq!(transport.calls(), 3);
        assert_eq!(resets, 2);
    }

    #[tokio::test]
    async fn test_upload_with_retries_does_not_retry_client_errors() {
        let (mut ctrl, transport) = controller(ScriptedTransport::new(
            vec![],
            vec![Err(ApiError::UnsupportedMediaType)],
        ));
        let err = ctrl.upload_with_retries(pdf(10), 3, |_| {}).await.unwrap_err();
        assert_eq!(err, ApiError::UnsupportedMediaType);
        assert_eq!(transport.calls(), 1);
    }
}
