use crate::state::PipelineStatus;
use crate::url::LinkCandidate;
use serde::Serialize;
use std::fmt;

/// Identifier of an item, stable for the whole run
///
/// The value is the item's position in the original candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(pub usize);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Metadata written together with a status change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusDetails {
    pub error: Option<String>,
    pub title: Option<String>,
    pub redirect_target: Option<String>,
    pub status_code: Option<u16>,
    pub latency_ms: Option<u64>,
}

impl StatusDetails {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    pub fn with_redirect_target(mut self, target: Option<String>) -> Self {
        self.redirect_target = target;
        self
    }

    pub fn with_status_code(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = Some(latency_ms);
        self
    }
}

/// A candidate plus its mutable processing status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkItem<S> {
    pub id: ItemId,
    pub candidate: LinkCandidate,
    pub status: S,

    /// Number of times the item was re-queued by a retry
    pub attempts: u32,

    pub last_error: Option<String>,
    pub result_title: Option<String>,
    pub redirect_target: Option<String>,
    pub status_code: Option<u16>,
    pub latency_ms: Option<u64>,
}

impl<S: PipelineStatus> LinkItem<S> {
    /// Creates an item in the pipeline's initial status
    pub fn new(id: ItemId, candidate: LinkCandidate) -> Self {
        Self {
            id,
            candidate,
            status: S::initial(),
            attempts: 0,
            last_error: None,
            result_title: None,
            redirect_target: None,
            status_code: None,
            latency_ms: None,
        }
    }

    /// Applies a status change
    ///
    /// A terminal status replaces every detail field, so a success after a
    /// failed attempt carries no stale error. A non-terminal status only
    /// overwrites the fields that are set.
    pub(crate) fn apply(&mut self, status: S, details: StatusDetails) {
        self.status = status;

        if status.is_terminal() {
            self.last_error = details.error;
            self.result_title = details.title;
            self.redirect_target = details.redirect_target;
            self.status_code = details.status_code;
            self.latency_ms = details.latency_ms;
            return;
        }

        if details.error.is_some() {
            self.last_error = details.error;
        }
        if details.title.is_some() {
            self.result_title = details.title;
        }
        if details.redirect_target.is_some() {
            self.redirect_target = details.redirect_target;
        }
        if details.status_code.is_some() {
            self.status_code = details.status_code;
        }
        if details.latency_ms.is_some() {
            self.latency_ms = details.latency_ms;
        }
    }
}
