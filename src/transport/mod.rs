//! Asynchronous operation primitive and the transport seam.
//!
//! The wire protocol itself lives behind the [`Transport`] trait: `start`
//! hands back an [`Operation`] whose event stream carries data, progress
//! and error events and exactly one terminal `Finished` event. Event
//! propagation is channel-based fan-out; whoever holds the [`Operation`]
//! owns the consumer half, while the transport drives the
//! [`OperationController`] producer half.
//!
//! Aborting is cooperative. [`AbortHandle`] is a latch the transport
//! observes; once aborted, the transport reports through its normal
//! error/finished path so dependent bookkeeping sees exactly one
//! completion. [`CompletionFlag`] is the matching latch set on finish or
//! when the operation handle is dropped, which is what deadline tracking
//! keys its entry removal on.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use url::Url;

use crate::error::HttpError;
use crate::http::{HttpRequest, ResponseMeta};

static NEXT_OPERATION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an in-flight operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId(u64);

impl OperationId {
    fn next() -> Self {
        Self(NEXT_OPERATION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op-{}", self.0)
    }
}

/// Events emitted by an in-flight operation.
#[derive(Debug, Clone)]
pub enum OperationEvent {
    /// A chunk of response body data is available.
    Data(Bytes),
    /// Transfer progress. `total` is `None` when the size is unknown.
    Progress {
        /// Bytes transferred so far.
        sent: u64,
        /// Expected total, when known.
        total: Option<u64>,
    },
    /// A transport error. Not terminal on its own; a `Finished` event
    /// still follows under the transport contract.
    Error(HttpError),
    /// Terminal completion, delivered exactly once per operation.
    Finished(ResponseMeta),
}

/// One-shot latch built on a watch channel.
///
/// `set` is idempotent and `wait` returns immediately once the latch has
/// been set, regardless of when the waiter subscribed.
#[derive(Debug)]
struct Latch {
    tx: watch::Sender<bool>,
}

impl Latch {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    fn set(&self) {
        self.tx.send_replace(true);
    }

    fn is_set(&self) -> bool {
        *self.tx.borrow()
    }

    async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as the latch, so this cannot fail.
        let _ = rx.wait_for(|set| *set).await;
    }
}

/// Clonable handle used to request cancellation of an operation.
#[derive(Debug, Clone)]
pub struct AbortHandle {
    latch: Arc<Latch>,
}

impl AbortHandle {
    fn new() -> Self {
        Self {
            latch: Arc::new(Latch::new()),
        }
    }

    /// Request cancellation. Idempotent.
    pub fn abort(&self) {
        self.latch.set();
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.latch.is_set()
    }

    /// Wait until cancellation is requested.
    pub async fn aborted(&self) {
        self.latch.wait().await;
    }
}

/// Clonable completion notification for an operation.
///
/// Set when the transport delivers the terminal event, and again (a no-op)
/// when the operation handle is dropped, so watchers observe completion on
/// both the finished and the destroyed path.
#[derive(Debug, Clone)]
pub struct CompletionFlag {
    latch: Arc<Latch>,
}

impl CompletionFlag {
    fn new() -> Self {
        Self {
            latch: Arc::new(Latch::new()),
        }
    }

    /// Mark the operation complete. Idempotent.
    pub fn set(&self) {
        self.latch.set();
    }

    /// Whether the operation has completed.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.latch.is_set()
    }

    /// Wait for the operation to complete.
    pub async fn wait(&self) {
        self.latch.wait().await;
    }
}

/// The asynchronous request/response collaborator this layer sits above.
pub trait Transport: Send + Sync + 'static {
    /// Begin an asynchronous operation for `request`.
    fn start(&self, request: HttpRequest) -> Operation;
}

/// Consumer half of an in-flight operation: the originating request plus
/// its event stream and cancellation handle.
pub struct Operation {
    id: OperationId,
    request: HttpRequest,
    events: UnboundedReceiver<OperationEvent>,
    abort: AbortHandle,
    done: CompletionFlag,
}

impl Operation {
    /// Create a linked controller/operation pair for `request`.
    ///
    /// Transport implementations (and anything republishing an event
    /// stream) keep the [`OperationController`] and hand the
    /// [`Operation`] to the caller.
    pub fn channel(request: HttpRequest) -> (OperationController, Operation) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = OperationId::next();
        let abort = AbortHandle::new();
        let done = CompletionFlag::new();

        let controller = OperationController {
            id,
            events: tx,
            abort: abort.clone(),
            done: done.clone(),
        };
        let operation = Operation {
            id,
            request,
            events: rx,
            abort,
            done,
        };
        (controller, operation)
    }

    /// The unique identity of this operation.
    pub fn id(&self) -> OperationId {
        self.id
    }

    /// The request that originated this operation.
    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    /// The URL this operation was issued against.
    pub fn url(&self) -> &Url {
        self.request.url()
    }

    /// Request cancellation of this operation.
    pub fn abort(&self) {
        self.abort.abort();
    }

    /// A clonable cancellation handle for this operation.
    #[must_use]
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// A clonable completion notification for this operation.
    #[must_use]
    pub fn completion(&self) -> CompletionFlag {
        self.done.clone()
    }

    /// Receive the next event, or `None` if the producer went away
    /// without delivering a terminal event.
    pub async fn next_event(&mut self) -> Option<OperationEvent> {
        self.events.recv().await
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("id", &self.id)
            .field("url", &self.request.url().as_str())
            .field("done", &self.done.is_set())
            .finish()
    }
}

impl Drop for Operation {
    fn drop(&mut self) {
        // Destroyed-before-finishing counts as completion for watchers.
        self.done.set();
    }
}

/// Producer half of an in-flight operation.
#[derive(Debug, Clone)]
pub struct OperationController {
    id: OperationId,
    events: UnboundedSender<OperationEvent>,
    abort: AbortHandle,
    done: CompletionFlag,
}

impl OperationController {
    /// The identity of the operation this controller feeds.
    pub fn id(&self) -> OperationId {
        self.id
    }

    /// Emit an event. Delivery failures mean the operation handle was
    /// dropped, which is not the producer's concern.
    pub fn send(&self, event: OperationEvent) {
        let _ = self.events.send(event);
    }

    /// Emit a data-available event.
    pub fn send_data(&self, data: Bytes) {
        self.send(OperationEvent::Data(data));
    }

    /// Emit a progress event.
    pub fn send_progress(&self, sent: u64, total: Option<u64>) {
        self.send(OperationEvent::Progress { sent, total });
    }

    /// Emit an error event.
    pub fn send_error(&self, error: HttpError) {
        self.send(OperationEvent::Error(error));
    }

    /// Emit the terminal event and mark the operation complete.
    pub fn finish(&self, meta: ResponseMeta) {
        self.send(OperationEvent::Finished(meta));
        self.done.set();
    }

    /// Whether cancellation has been requested for this operation.
    #[must_use]
    pub fn abort_requested(&self) -> bool {
        self.abort.is_aborted()
    }

    /// Wait until cancellation is requested.
    pub async fn aborted(&self) {
        self.abort.aborted().await;
    }
}
