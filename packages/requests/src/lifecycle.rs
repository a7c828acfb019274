// ABOUTME: Request lifecycle state machine
// ABOUTME: Legal edges: requested <-> in_progress -> completed -> confirmed, cancel from the first two

use crate::error::{RequestError, RequestResult};
use crate::types::RequestStatus;

/// Check whether `from -> to` is a legal lifecycle edge.
///
/// `in_progress -> requested` is the reversion edge taken when the last
/// active developer leaves. `completed -> confirmed` is only ever taken by
/// the confirmation flow, never by a direct status set.
pub fn is_legal_transition(from: RequestStatus, to: RequestStatus) -> bool {
    use RequestStatus::*;
    matches!(
        (from, to),
        (Requested, InProgress)
            | (Requested, Cancelled)
            | (InProgress, Requested)
            | (InProgress, Completed)
            | (InProgress, Cancelled)
            | (Completed, Confirmed)
    )
}

/// Validate a transition, producing the error surfaced to callers.
pub fn validate_transition(from: RequestStatus, to: RequestStatus) -> RequestResult<()> {
    if from == to {
        return Ok(());
    }
    if is_legal_transition(from, to) {
        Ok(())
    } else {
        Err(RequestError::Validation(format!(
            "cannot transition request from {:?} to {:?}",
            from, to
        )))
    }
}

/// Statuses a developer may set directly. `confirmed` is reserved for the
/// confirmation quorum flow.
pub fn is_settable_by_developer(status: RequestStatus) -> bool {
    !matches!(status, RequestStatus::Confirmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use RequestStatus::*;

    #[test]
    fn test_forward_edges() {
        assert!(is_legal_transition(Requested, InProgress));
        assert!(is_legal_transition(InProgress, Completed));
        assert!(is_legal_transition(Completed, Confirmed));
    }

    #[test]
    fn test_reversion_edge() {
        assert!(is_legal_transition(InProgress, Requested));
        assert!(!is_legal_transition(Completed, Requested));
        assert!(!is_legal_transition(Completed, InProgress));
    }

    #[test]
    fn test_cancellation() {
        assert!(is_legal_transition(Requested, Cancelled));
        assert!(is_legal_transition(InProgress, Cancelled));
        assert!(!is_legal_transition(Completed, Cancelled));
        assert!(!is_legal_transition(Confirmed, Cancelled));
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for to in [Requested, InProgress, Completed, Confirmed] {
            assert!(!is_legal_transition(Cancelled, to));
            assert!(!is_legal_transition(Confirmed, to));
        }
    }

    #[test]
    fn test_skipping_states_is_illegal() {
        assert!(!is_legal_transition(Requested, Completed));
        assert!(!is_legal_transition(Requested, Confirmed));
        assert!(!is_legal_transition(InProgress, Confirmed));
    }

    #[test]
    fn test_same_status_is_a_no_op() {
        assert!(validate_transition(InProgress, InProgress).is_ok());
    }

    #[test]
    fn test_confirmed_is_not_developer_settable() {
        assert!(!is_settable_by_developer(Confirmed));
        assert!(is_settable_by_developer(Completed));
    }
}
