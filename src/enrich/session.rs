//! Enrichment sessions: the snapshot value and the caller's live handle.

use std::collections::BTreeMap;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::error;

use super::field::ContentField;
use super::state::FieldState;
use crate::measurements::parse_measurements;
use crate::model::Subject;

/// Field → state, ordered by field tag.
pub type FieldMap = BTreeMap<ContentField, FieldState>;

/// A point-in-time view of one enrichment session.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentSession {
    pub subject: Subject,
    pub fields: FieldMap,
}

impl EnrichmentSession {
    pub fn state(&self, field: ContentField) -> Option<&FieldState> {
        self.fields.get(&field)
    }

    /// `true` once every requested field is `Ready` or `Failed`.
    pub fn is_complete(&self) -> bool {
        self.fields.values().all(FieldState::is_terminal)
    }

    /// Number of fields still `Idle` or `Loading`.
    pub fn pending(&self) -> usize {
        self.fields.values().filter(|s| !s.is_terminal()).count()
    }

    /// The subject with attributes filled from a ready measurements field.
    pub fn enriched_subject(&self) -> Subject {
        let mut subject = self.subject.clone();
        if let Some(FieldState::Ready(text)) = self.fields.get(&ContentField::StructuredMeasurements) {
            subject.apply_measurements(&parse_measurements(text));
        }
        subject
    }
}

/// Live view of a running session.
///
/// Dropping the handle abandons the session: field tasks stop and no further
/// results are recorded. Other sessions are unaffected.
pub struct SessionHandle {
    subject: Subject,
    state: watch::Receiver<FieldMap>,
    group: JoinHandle<()>,
    token: CancellationToken,
    _abandon: DropGuard,
}

impl SessionHandle {
    pub(super) fn new(
        subject: Subject,
        state: watch::Receiver<FieldMap>,
        group: JoinHandle<()>,
        token: CancellationToken,
    ) -> Self {
        let _abandon = token.clone().drop_guard();
        Self { subject, state, group, token, _abandon }
    }

    /// Current state of every requested field. Never blocks.
    pub fn snapshot(&self) -> EnrichmentSession {
        EnrichmentSession { subject: self.subject.clone(), fields: self.state.borrow().clone() }
    }

    /// Wait for the next field transition. Returns `false` once the session
    /// can no longer change (finished or cancelled).
    pub async fn changed(&mut self) -> bool {
        self.state.changed().await.is_ok()
    }

    /// Stop recording results for this session.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait for every field to settle and return the final snapshot.
    pub async fn wait(mut self) -> EnrichmentSession {
        if let Err(e) = (&mut self.group).await {
            error!(subject = %self.subject.display_name, "enrichment group task failed: {e}");
        }
        self.snapshot()
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("subject", &self.subject.display_name)
            .field("fields", &*self.state.borrow())
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}
