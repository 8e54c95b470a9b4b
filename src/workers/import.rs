use crate::config::ImportConfig;
use crate::pipeline::{classify_import, Outcome};
use crate::state::{ImportStatus, StatusDetails};
use crate::url::{parse_absolute, LinkCandidate};
use crate::workers::{BookmarkStore, NewBookmark, Operation};
use async_trait::async_trait;
use std::sync::Arc;

/// Creates one bookmark per candidate
///
/// Candidates that are not absolute http(s) URLs with a host are `Skipped`
/// without calling storage. The per-request timeout is the bookmark store's
/// own; a timed-out request surfaces as `Failed`.
pub struct ImportWorker {
    store: Arc<dyn BookmarkStore>,
    defaults: ImportConfig,
}

impl ImportWorker {
    /// # Arguments
    ///
    /// * `store` - Bookmark storage collaborator
    /// * `defaults` - Priority, categories and tags applied to every bookmark
    pub fn new(store: Arc<dyn BookmarkStore>, defaults: ImportConfig) -> Self {
        Self { store, defaults }
    }

    fn bookmark_for(&self, candidate: &LinkCandidate) -> NewBookmark {
        NewBookmark {
            url: candidate.normalized_url.clone(),
            title: None,
            priority: self.defaults.priority.clone(),
            category_ids: self.defaults.category_ids.clone(),
            tags: self.defaults.tags.clone(),
        }
    }
}

#[async_trait]
impl Operation for ImportWorker {
    type Status = ImportStatus;

    async fn execute(&self, candidate: &LinkCandidate) -> Outcome<ImportStatus> {
        if let Err(e) = parse_absolute(&candidate.normalized_url) {
            tracing::debug!("Skipping {}: {}", candidate.raw_input, e);
            return Outcome::new(ImportStatus::Skipped)
                .with_details(StatusDetails::error(e.to_string()));
        }

        let outcome = classify_import(self.store.create(&self.bookmark_for(candidate)).await);
        tracing::debug!("Imported {}: {}", candidate.normalized_url, outcome.status);
        outcome
    }
}
