//! Operation workers and the collaborators they call
//!
//! A worker turns one candidate into one classified outcome. Two workers ship
//! with the crate:
//! - `ImportWorker`: creates a bookmark through a `BookmarkStore`
//! - `ValidationWorker`: probes link health through a `LinkProbe`
//!
//! Callers can plug in their own operation with [`operation_fn`].

mod bookmarks;
mod import;
mod probe;
mod validation;

pub use bookmarks::{
    candidates_from_bookmarks, BookmarkRecord, BookmarkStore, CreateError, CreatedBookmark,
    HttpBookmarkStore, NewBookmark,
};
pub use import::ImportWorker;
pub use probe::{build_http_client, HttpProbe, LinkProbe, ProbeResult};
pub use validation::ValidationWorker;

use crate::pipeline::Outcome;
use crate::state::PipelineStatus;
use crate::url::LinkCandidate;
use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;

/// A per-item operation run by the batch scheduler
///
/// Implementations must not panic for ordinary failures: every failure is
/// expressed as an [`Outcome`] carrying the pipeline's failure status. A panic
/// is still contained to its item by the scheduler.
#[async_trait]
pub trait Operation: Send + Sync + 'static {
    type Status: PipelineStatus;

    async fn execute(&self, candidate: &LinkCandidate) -> Outcome<Self::Status>;
}

/// Operation backed by an async closure
pub struct FnOperation<S, F> {
    f: F,
    _status: PhantomData<fn() -> S>,
}

/// Wraps an async closure as an [`Operation`]
///
/// # Examples
///
/// ```
/// use linktide::pipeline::Outcome;
/// use linktide::workers::operation_fn;
/// use linktide::ImportStatus;
///
/// let always_ok = operation_fn(|_candidate| async { Outcome::new(ImportStatus::Success) });
/// # let _ = always_ok;
/// ```
pub fn operation_fn<S, F, Fut>(f: F) -> FnOperation<S, F>
where
    S: PipelineStatus,
    F: Fn(LinkCandidate) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome<S>> + Send + 'static,
{
    FnOperation {
        f,
        _status: PhantomData,
    }
}

#[async_trait]
impl<S, F, Fut> Operation for FnOperation<S, F>
where
    S: PipelineStatus,
    F: Fn(LinkCandidate) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome<S>> + Send + 'static,
{
    type Status = S;

    async fn execute(&self, candidate: &LinkCandidate) -> Outcome<S> {
        (self.f)(candidate.clone()).await
    }
}
