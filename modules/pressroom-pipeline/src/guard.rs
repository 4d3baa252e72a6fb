use std::sync::Arc;

use tracing::warn;

use crate::traits::DraftStore;

/// Idempotency check against historical topics: exact match, skip-level.
///
/// The batch avoid-list is the advisory counterpart — it steers the Analyst
/// at the prompt level, while this guard authoritatively skips the draft.
pub struct DuplicateGuard {
    store: Arc<dyn DraftStore>,
}

impl DuplicateGuard {
    pub fn new(store: Arc<dyn DraftStore>) -> Self {
        Self { store }
    }

    /// A store lookup failure reads as "not a duplicate" — a flaky store must
    /// not silently suppress content generation.
    pub async fn is_duplicate(&self, topic: &str) -> bool {
        match self.store.topic_exists(topic).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!(topic, error = %e, "Duplicate check failed, treating as new topic");
                false
            }
        }
    }
}
