//! Test assertions for health and transitions.

use crate::core::{PipelineHealth, Stage};
use crate::errors::TransitionErrorKind;
use crate::graph;
use crate::health::{AttentionItem, HealthReport};

/// Asserts that the report has the expected health.
pub fn assert_health(report: &HealthReport, expected: PipelineHealth) {
    assert_eq!(
        report.health, expected,
        "Expected health {:?}, got {:?} ({})",
        expected, report.health, report.reason
    );
}

/// Asserts that `from -> to` validates.
pub fn assert_transition_allowed(from: Stage, to: Stage) {
    if let Err(e) = graph::validate_transition(from, to) {
        panic!("Expected {from} -> {to} to be allowed, got: {e}");
    }
}

/// Asserts that `from -> to` is rejected with `kind`.
pub fn assert_transition_rejected(from: Stage, to: Stage, kind: TransitionErrorKind) {
    match graph::validate_transition(from, to) {
        Ok(()) => panic!("Expected {from} -> {to} to be rejected, but it was allowed"),
        Err(e) => assert_eq!(
            e.kind, kind,
            "Expected rejection kind {kind:?} for {from} -> {to}, got {:?}",
            e.kind
        ),
    }
}

/// Asserts that the attention list flags `company` with `reason`.
pub fn assert_attention_reason(items: &[AttentionItem], company: &str, reason: &str) {
    let item = items.iter().find(|i| i.company == company);
    assert!(
        item.is_some(),
        "Expected '{}' in attention list. Companies: {:?}",
        company,
        items.iter().map(|i| i.company.as_str()).collect::<Vec<_>>()
    );
    if let Some(item) = item {
        assert_eq!(item.reason, reason, "Unexpected reason for '{company}'");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HealthSignal;

    #[test]
    fn test_assert_health() {
        let report = HealthReport::new(PipelineHealth::Stale, HealthSignal::SinceUpdate { days: 11 }, "x");
        assert_health(&report, PipelineHealth::Stale);
    }

    #[test]
    #[should_panic(expected = "Expected health")]
    fn test_assert_health_fails() {
        let report = HealthReport::new(PipelineHealth::Active, HealthSignal::NoSignal, "x");
        assert_health(&report, PipelineHealth::Stale);
    }

    #[test]
    fn test_transition_assertions() {
        assert_transition_allowed(Stage::Applied, Stage::TechRound1);
        assert_transition_rejected(Stage::Offer, Stage::Offer, TransitionErrorKind::SameStage);
        assert_transition_rejected(Stage::Rejected, Stage::Applied, TransitionErrorKind::FromTerminal);
        assert_transition_rejected(Stage::Offer, Stage::Rejected, TransitionErrorKind::IllegalTransition);
    }

    #[test]
    #[should_panic(expected = "to be rejected")]
    fn test_assert_rejected_fails_on_legal_move() {
        assert_transition_rejected(Stage::Applied, Stage::Dropped, TransitionErrorKind::IllegalTransition);
    }
}
