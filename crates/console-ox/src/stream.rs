use std::sync::{
    Arc, RwLock,
    atomic::{AtomicBool, Ordering},
};

use console_ox_common::{BoxStream, error::CommonRequestError};
use futures_util::StreamExt;
use tokio::sync::Notify;

use crate::{
    event::StreamEvent,
    transcript::{Transcript, TranscriptSnapshot},
};

/// Lifecycle of one streaming request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    /// Handle created, connection not yet established.
    Pending,
    /// Connected; events are arriving.
    Streaming,
    /// The backend sent its terminal completion event.
    Completed,
    /// The transport failed or the backend reported an error.
    Failed,
    /// The caller cancelled the request.
    Cancelled,
}

impl StreamStatus {
    /// Whether the request is over, for any reason.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// State shared between the read loop (sole writer) and handle readers.
#[derive(Debug)]
struct Shared {
    transcript: RwLock<Transcript>,
    status: RwLock<StreamStatus>,
    cancel_requested: AtomicBool,
    cancel_notify: Notify,
}

impl Shared {
    fn status(&self) -> StreamStatus {
        *self.status.read().expect("status lock poisoned")
    }

    /// Move to `next` unless a terminal status already won.
    fn transition(&self, next: StreamStatus) {
        let mut status = self.status.write().expect("status lock poisoned");
        if !status.is_terminal() {
            *status = next;
        }
    }

    fn append(&self, event: StreamEvent) {
        self.transcript
            .write()
            .expect("transcript lock poisoned")
            .append(event);
    }
}

/// One in-flight or finished streaming request.
///
/// The handle owns nothing the read loop mutates except through [`Shared`]:
/// each request gets its own transcript, decoder buffer, and cancellation
/// flag, so any number of handles can be live at once.
#[derive(Debug)]
pub struct StreamHandle {
    shared: Arc<Shared>,
    task: tokio::task::JoinHandle<()>,
}

impl StreamHandle {
    /// Start the read loop over an already-built payload stream.
    pub(crate) fn spawn(payloads: BoxStream<'static, Result<String, CommonRequestError>>) -> Self {
        let shared = Arc::new(Shared {
            transcript: RwLock::new(Transcript::new()),
            status: RwLock::new(StreamStatus::Pending),
            cancel_requested: AtomicBool::new(false),
            cancel_notify: Notify::new(),
        });
        let task = tokio::spawn(drive(Arc::clone(&shared), payloads));
        Self { shared, task }
    }

    pub fn status(&self) -> StreamStatus {
        self.shared.status()
    }

    pub fn is_finished(&self) -> bool {
        self.status().is_terminal()
    }

    /// Point-in-time copy of the transcript; safe to call mid-stream from
    /// any thread, never blocks the read loop for longer than the clone.
    pub fn snapshot(&self) -> TranscriptSnapshot {
        self.shared
            .transcript
            .read()
            .expect("transcript lock poisoned")
            .snapshot()
    }

    /// The in-progress answer text accumulated so far.
    pub fn current_text(&self) -> String {
        self.shared
            .transcript
            .read()
            .expect("transcript lock poisoned")
            .current_text()
            .to_string()
    }

    /// Request cooperative cancellation.
    ///
    /// Idempotent; a no-op once any terminal status is reached. Events
    /// already appended stay visible, and no synthetic terminal event is
    /// added: the `Cancelled` status itself is the terminal signal.
    pub fn cancel(&self) {
        if self.status().is_terminal() {
            return;
        }
        if !self.shared.cancel_requested.swap(true, Ordering::SeqCst) {
            self.shared.cancel_notify.notify_one();
        }
    }

    /// Wait for the read loop to finish and return the final status.
    pub async fn join(self) -> StreamStatus {
        let Self { shared, task } = self;
        if let Err(err) = task.await {
            tracing::debug!(%err, "stream task did not run to completion");
        }
        shared.status()
    }
}

/// The read loop: payloads in, interpreted events out, one terminal status.
///
/// Cancellation is checked at every item boundary, so a cancel lands within
/// one chunk of work even on a fully buffered response, and immediately on an
/// idle connection. Dropping the payload stream aborts the transport read.
async fn drive(shared: Arc<Shared>, mut payloads: BoxStream<'static, Result<String, CommonRequestError>>) {
    shared.transition(StreamStatus::Streaming);

    loop {
        let item = tokio::select! {
            biased;
            () = shared.cancel_notify.notified() => {
                shared.transition(StreamStatus::Cancelled);
                return;
            }
            item = payloads.next() => item,
        };

        if shared.cancel_requested.load(Ordering::SeqCst) {
            shared.transition(StreamStatus::Cancelled);
            return;
        }

        match item {
            Some(Ok(payload)) => {
                let Some(event) = StreamEvent::from_payload(&payload) else {
                    continue;
                };
                let terminal_status = match &event {
                    StreamEvent::Completion { .. } => Some(StreamStatus::Completed),
                    StreamEvent::StreamError { .. } => Some(StreamStatus::Failed),
                    _ => None,
                };
                shared.append(event);
                if let Some(status) = terminal_status {
                    shared.transition(status);
                    return;
                }
            }
            Some(Err(err)) => {
                shared.append(StreamEvent::StreamError {
                    message: err.to_string(),
                });
                shared.transition(StreamStatus::Failed);
                return;
            }
            None => {
                // The transport closed without a terminal frame; callers must
                // be able to tell this apart from completion.
                shared.append(StreamEvent::StreamError {
                    message: "stream ended before completion".to_string(),
                });
                shared.transition(StreamStatus::Failed);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn ok_payloads(payloads: &[&str]) -> BoxStream<'static, Result<String, CommonRequestError>> {
        stream::iter(
            payloads
                .iter()
                .map(|p| Ok((*p).to_string()))
                .collect::<Vec<_>>(),
        )
        .boxed()
    }

    #[tokio::test]
    async fn completes_with_accumulated_text() {
        let handle = StreamHandle::spawn(ok_payloads(&[
            r#"{"type":"token","data":"Hel"}"#,
            r#"{"type":"token","data":"lo"}"#,
            r#"{"type":"done","tools_used":[],"latency_ms":42}"#,
        ]));

        let status = handle.join().await;
        assert_eq!(status, StreamStatus::Completed);
    }

    #[tokio::test]
    async fn transcript_matches_delivered_events() {
        let handle = StreamHandle::spawn(ok_payloads(&[
            r#"{"type":"token","data":"Hel"}"#,
            r#"{"type":"token","data":"lo"}"#,
            r#"{"type":"done","tools_used":[],"latency_ms":42}"#,
        ]));
        while !handle.is_finished() {
            tokio::task::yield_now().await;
        }

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.events.len(), 3);
        assert_eq!(snapshot.current_text, "Hello");
        assert_eq!(
            snapshot.events[2],
            StreamEvent::Completion {
                final_text: String::new(),
                tools_used: vec![],
                elapsed_ms: 42,
            }
        );
        assert_eq!(handle.join().await, StreamStatus::Completed);
    }

    #[tokio::test]
    async fn garbage_payloads_do_not_produce_events() {
        let handle = StreamHandle::spawn(ok_payloads(&[
            r#"{"type":"token","data":"ok"}"#,
            "not json",
            r#"{"type":"mystery"}"#,
            r#"{"type":"done","tools_used":[],"latency_ms":1}"#,
        ]));
        assert_eq!(handle.join().await, StreamStatus::Completed);
    }

    #[tokio::test]
    async fn backend_error_frame_fails_the_stream() {
        let handle = StreamHandle::spawn(ok_payloads(&[
            r#"{"type":"token","data":"par"}"#,
            r#"{"type":"error","data":"model overloaded"}"#,
        ]));
        while !handle.is_finished() {
            tokio::task::yield_now().await;
        }

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.current_text, "par");
        assert_eq!(
            snapshot.events.last(),
            Some(&StreamEvent::StreamError {
                message: "model overloaded".to_string()
            })
        );
        assert_eq!(handle.join().await, StreamStatus::Failed);
    }

    #[tokio::test]
    async fn transport_error_becomes_synthetic_terminal_event() {
        let payloads = stream::iter(vec![
            Ok(r#"{"type":"token","data":"par"}"#.to_string()),
            Err(CommonRequestError::Api {
                status: 502,
                message: "bad gateway".to_string(),
            }),
        ])
        .boxed();

        let handle = StreamHandle::spawn(payloads);
        let status = handle.join().await;
        assert_eq!(status, StreamStatus::Failed);
    }

    #[tokio::test]
    async fn eos_without_terminal_frame_fails() {
        let handle = StreamHandle::spawn(ok_payloads(&[r#"{"type":"token","data":"half"}"#]));
        while !handle.is_finished() {
            tokio::task::yield_now().await;
        }

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.current_text, "half");
        assert!(matches!(
            snapshot.events.last(),
            Some(StreamEvent::StreamError { .. })
        ));
        assert_eq!(handle.join().await, StreamStatus::Failed);
    }

    #[tokio::test]
    async fn cancel_on_idle_stream_is_prompt_and_appends_nothing() {
        let handle = StreamHandle::spawn(stream::pending().boxed());
        handle.cancel();
        handle.cancel();

        let snapshot = handle.snapshot();
        assert!(snapshot.events.is_empty());
        assert_eq!(handle.join().await, StreamStatus::Cancelled);
    }

    #[tokio::test]
    async fn cancel_after_completion_is_a_no_op() {
        let handle = StreamHandle::spawn(ok_payloads(&[
            r#"{"type":"token","data":"x"}"#,
            r#"{"type":"done","tools_used":[],"latency_ms":1}"#,
        ]));
        while !handle.is_finished() {
            tokio::task::yield_now().await;
        }
        let before = handle.snapshot();

        handle.cancel();

        assert_eq!(handle.status(), StreamStatus::Completed);
        assert_eq!(handle.snapshot(), before);
        assert_eq!(handle.join().await, StreamStatus::Completed);
    }
}
