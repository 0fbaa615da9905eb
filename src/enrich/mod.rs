//! Field enrichment: concurrent per-field fetches for one subject.
//!
//! [`EnrichmentCoordinator::enrich`] starts a session: one group task that
//! spawns a sibling task per requested [`ContentField`] into a `JoinSet`.
//! Each field task builds its prompt, calls the [`TextGenerator`] and returns
//! a typed `FieldOutcome`; transport errors become `Failed` inside the task and
//! never reach a sibling. The group task is the only writer of the session's
//! field map and publishes every transition through a `watch` channel, which
//! is what [`SessionHandle::snapshot`] reads.
//!
//! Sessions are independent: starting a new one for the same subject does not
//! touch an earlier one. Cancellation (explicit or by dropping the handle)
//! is cooperative via a `CancellationToken`.

mod field;
mod session;
mod state;

pub use field::ContentField;
pub use session::{EnrichmentSession, FieldMap, SessionHandle};
pub use state::{FailureReason, FieldState, UNAVAILABLE_PLACEHOLDER, UNREADABLE_PLACEHOLDER};

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::model::Subject;
use crate::transport::TextGenerator;

/// Result of one field task, merged into the session map by the group task.
#[derive(Debug)]
struct FieldOutcome {
    field: ContentField,
    state: FieldState,
}

/// Fans enrichment out over a shared text generator.
#[derive(Debug)]
pub struct EnrichmentCoordinator<G> {
    generator: Arc<G>,
}

impl<G> Clone for EnrichmentCoordinator<G> {
    fn clone(&self) -> Self {
        Self { generator: Arc::clone(&self.generator) }
    }
}

impl<G: TextGenerator> EnrichmentCoordinator<G> {
    pub fn new(generator: G) -> Self {
        Self { generator: Arc::new(generator) }
    }

    pub fn from_shared(generator: Arc<G>) -> Self {
        Self { generator }
    }

    /// Start an enrichment session for `subject`.
    ///
    /// Returns immediately; every field starts `Idle` and is fetched
    /// concurrently. Duplicate fields are fetched once. Must be called from
    /// within a Tokio runtime.
    pub fn enrich(&self, subject: Subject, fields: impl IntoIterator<Item = ContentField>) -> SessionHandle {
        let fields: BTreeSet<ContentField> = fields.into_iter().collect();
        let initial: FieldMap = fields.iter().map(|f| (*f, FieldState::Idle)).collect();
        let (state_tx, state_rx) = watch::channel(initial);
        let token = CancellationToken::new();

        info!(subject = %subject.display_name, fields = fields.len(), "starting enrichment session");
        let group = tokio::spawn(run_group(
            Arc::clone(&self.generator),
            subject.display_name.clone(),
            fields,
            state_tx,
            token.clone(),
        ));

        SessionHandle::new(subject, state_rx, group, token)
    }
}

/// Spawn one task per field, then merge outcomes as they settle.
async fn run_group<G: TextGenerator>(
    generator: Arc<G>,
    subject_name: String,
    fields: BTreeSet<ContentField>,
    state: watch::Sender<FieldMap>,
    token: CancellationToken,
) {
    let mut set: JoinSet<Option<FieldOutcome>> = JoinSet::new();

    for field in fields {
        state.send_modify(|m| {
            m.insert(field, FieldState::Loading);
        });
        let generator = Arc::clone(&generator);
        let prompt = field.prompt(&subject_name);
        let token = token.clone();
        debug!(subject = %subject_name, %field, "spawning field fetch");
        set.spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => return None,
                r = generator.generate(&prompt) => r,
            };
            if let Err(e) = &result {
                warn!(%field, error = %e, "field fetch failed");
            }
            Some(FieldOutcome { field, state: FieldState::settle(result) })
        });
    }

    loop {
        let joined = tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!(subject = %subject_name, "session abandoned; dropping in-flight fetches");
                return;
            }
            joined = set.join_next() => joined,
        };
        match joined {
            None => break,
            Some(Ok(Some(FieldOutcome { field, state: settled }))) => {
                debug!(%field, ready = matches!(settled, FieldState::Ready(_)), "field settled");
                state.send_modify(|m| {
                    m.insert(field, settled);
                });
            }
            Some(Ok(None)) => {}
            Some(Err(e)) => error!(subject = %subject_name, "field task panicked: {e}"),
        }
    }

    // A task that panicked never reported; its field is still Loading.
    state.send_if_modified(|m| {
        let mut modified = false;
        for (field, s) in m.iter_mut().filter(|(_, s)| !s.is_terminal()) {
            warn!(%field, "field task ended without an outcome");
            *s = FieldState::Failed(FailureReason::Internal);
            modified = true;
        }
        modified
    });
    info!(subject = %subject_name, "enrichment session complete");
}
