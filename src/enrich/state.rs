//! Per-field state machine: `Idle → Loading → Ready | Failed`.

use crate::transport::TransportError;

/// Shown in place of the text when the service could not be reached or refused.
pub const UNAVAILABLE_PLACEHOLDER: &str = "Information unavailable right now.";
/// Shown when the service answered but with nothing usable.
pub const UNREADABLE_PLACEHOLDER: &str = "No information available.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldState {
    Idle,
    Loading,
    Ready(String),
    Failed(FailureReason),
}

impl FieldState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FieldState::Ready(_) | FieldState::Failed(_))
    }

    /// Text for the field's display slot: the content when ready, a fixed
    /// placeholder when failed, nothing while pending.
    pub fn display_text(&self) -> Option<&str> {
        match self {
            FieldState::Ready(text) => Some(text.as_str()),
            FieldState::Failed(reason) => Some(reason.placeholder()),
            FieldState::Idle | FieldState::Loading => None,
        }
    }

    /// Terminal state for a settled fetch.
    pub fn settle(result: Result<String, TransportError>) -> Self {
        match result {
            Ok(text) => FieldState::Ready(text),
            Err(e) => FieldState::Failed(FailureReason::from(&e)),
        }
    }
}

/// Why a field failed, without the raw transport detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Network failure or non-success status.
    Unavailable,
    /// 200 with an empty or malformed body.
    Unreadable,
    /// The request could not be built.
    Rejected,
    /// The fetch task died before settling.
    Internal,
}

impl FailureReason {
    pub fn placeholder(self) -> &'static str {
        match self {
            FailureReason::Unreadable => UNREADABLE_PLACEHOLDER,
            FailureReason::Unavailable | FailureReason::Rejected | FailureReason::Internal => {
                UNAVAILABLE_PLACEHOLDER
            }
        }
    }
}

impl From<&TransportError> for FailureReason {
    fn from(e: &TransportError) -> Self {
        match e {
            TransportError::InvalidResponse(_) | TransportError::Network(_) => FailureReason::Unavailable,
            TransportError::NoData | TransportError::ParseFailure(_) => FailureReason::Unreadable,
            TransportError::InvalidRequest(_) => FailureReason::Rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settle_maps_every_transport_error() {
        assert_eq!(
            FieldState::settle(Err(TransportError::InvalidResponse(500))),
            FieldState::Failed(FailureReason::Unavailable)
        );
        assert_eq!(
            FieldState::settle(Err(TransportError::ParseFailure("eof".into()))),
            FieldState::Failed(FailureReason::Unreadable)
        );
        assert_eq!(FieldState::settle(Err(TransportError::NoData)), FieldState::Failed(FailureReason::Unreadable));
        assert_eq!(
            FieldState::settle(Err(TransportError::InvalidRequest("bad".into()))),
            FieldState::Failed(FailureReason::Rejected)
        );
        assert_eq!(FieldState::settle(Ok("hi".into())), FieldState::Ready("hi".into()));
    }

    #[test]
    fn display_never_leaks_error_text() {
        let state = FieldState::settle(Err(TransportError::ParseFailure("expected value at line 1".into())));
        let shown = state.display_text().unwrap();
        assert_eq!(shown, UNREADABLE_PLACEHOLDER);
        assert!(!shown.contains("line 1"));
    }

    #[test]
    fn pending_states_have_no_text() {
        assert!(FieldState::Idle.display_text().is_none());
        assert!(FieldState::Loading.display_text().is_none());
        assert!(!FieldState::Loading.is_terminal());
        assert!(FieldState::Failed(FailureReason::Internal).is_terminal());
    }
}
