//! The pipeline stage graph.
//!
//! Legal transitions and stage ordinals are hand-written lookup tables rather
//! than rules: companies skip recruiter screens, run AI rounds before or after
//! system design, and so on, so the table itself is the business rule.
//! Changing what is allowed is a one-line edit to [`transitions`].
//!
//! Every query is a constant-time table lookup over immutable data and is
//! safe to call from any thread.

use tracing::trace;

use crate::core::Stage;
use crate::errors::TransitionError;

/// Ordinal returned for stages outside forward progression.
pub const NO_PROGRESS_ORDINAL: i32 = -1;

/// Legal next stages from `stage`.
///
/// Rejected and Dropped have no exits. Offer can only move to Dropped,
/// which models declining an offer.
#[must_use]
pub const fn transitions(stage: Stage) -> &'static [Stage] {
    use Stage::{
        AiRound, Applied, Dropped, FinalCulture, HmRound, Offer, RecruiterScreen, Rejected,
        SystemDesign, TechRound1, TechRound2,
    };

    match stage {
        Applied => &[RecruiterScreen, TechRound1, Rejected, Dropped],
        RecruiterScreen => &[TechRound1, Rejected, Dropped],
        TechRound1 => &[TechRound2, SystemDesign, AiRound, HmRound, Rejected, Dropped],
        TechRound2 => &[SystemDesign, AiRound, HmRound, FinalCulture, Rejected, Dropped],
        SystemDesign => &[AiRound, HmRound, FinalCulture, Offer, Rejected, Dropped],
        AiRound => &[HmRound, FinalCulture, Offer, Rejected, Dropped],
        HmRound => &[FinalCulture, Offer, Rejected, Dropped],
        FinalCulture => &[Offer, Rejected, Dropped],
        Offer => &[Dropped],
        Rejected | Dropped => &[],
    }
}

/// Progression depth of a stage.
///
/// SystemDesign and AiRound share depth 4: they are parallel rounds reached
/// by different paths. Rejected and Dropped are [`NO_PROGRESS_ORDINAL`].
#[must_use]
pub const fn ordinal(stage: Stage) -> i32 {
    match stage {
        Stage::Applied => 0,
        Stage::RecruiterScreen => 1,
        Stage::TechRound1 => 2,
        Stage::TechRound2 => 3,
        Stage::SystemDesign | Stage::AiRound => 4,
        Stage::HmRound => 5,
        Stage::FinalCulture => 6,
        Stage::Offer => 7,
        Stage::Rejected | Stage::Dropped => NO_PROGRESS_ORDINAL,
    }
}

/// Human-readable label for a stage.
#[must_use]
pub const fn label(stage: Stage) -> &'static str {
    match stage {
        Stage::Applied => "Applied",
        Stage::RecruiterScreen => "Recruiter Screen",
        Stage::TechRound1 => "Technical Round 1",
        Stage::TechRound2 => "Technical Round 2",
        Stage::SystemDesign => "System Design",
        Stage::AiRound => "AI / GenAI Round",
        Stage::HmRound => "Hiring Manager",
        Stage::FinalCulture => "Final / Culture",
        Stage::Offer => "Offer",
        Stage::Rejected => "Rejected",
        Stage::Dropped => "Dropped",
    }
}

/// Returns true if `to` is reachable from `from` in one step.
#[must_use]
pub fn can_transition(from: Stage, to: Stage) -> bool {
    transitions(from).contains(&to)
}

/// Offer, Rejected and Dropped.
#[must_use]
pub const fn is_terminal(stage: Stage) -> bool {
    matches!(stage, Stage::Offer | Stage::Rejected | Stage::Dropped)
}

/// Only Offer.
#[must_use]
pub const fn is_positive_terminal(stage: Stage) -> bool {
    matches!(stage, Stage::Offer)
}

/// Rejected and Dropped.
#[must_use]
pub const fn is_negative_terminal(stage: Stage) -> bool {
    matches!(stage, Stage::Rejected | Stage::Dropped)
}

/// Returns true if moving from `from` to `to` is forward progress.
///
/// Moves into Rejected or Dropped are legal but never progress. Lateral moves
/// between stages of equal depth (SystemDesign to AiRound) are not progress
/// either.
#[must_use]
pub const fn is_progressing(from: Stage, to: Stage) -> bool {
    if is_negative_terminal(to) {
        return false;
    }
    ordinal(to) > ordinal(from)
}

/// Progress through the pipeline as a percentage in `0..=100`.
#[must_use]
pub fn progress_percentage(stage: Stage) -> u8 {
    if is_negative_terminal(stage) {
        return 0;
    }
    if is_positive_terminal(stage) {
        return 100;
    }

    let max = ordinal(Stage::Offer);
    if max <= 0 {
        return 0;
    }

    let pct = (ordinal(stage) * 100).div_euclid(max).clamp(0, 100);
    u8::try_from(pct).unwrap_or(0)
}

/// Legal next stages excluding the give-up options, for stage pickers.
#[must_use]
pub fn next_logical_stages(stage: Stage) -> Vec<Stage> {
    transitions(stage)
        .iter()
        .copied()
        .filter(|s| !is_negative_terminal(*s))
        .collect()
}

/// Gate for every stage write.
///
/// Checks, in order: same stage, leaving a terminal stage other than Offer,
/// and membership in [`transitions`].
///
/// # Errors
///
/// Returns a [`TransitionError`] describing why the move is not allowed.
pub fn validate_transition(from: Stage, to: Stage) -> Result<(), TransitionError> {
    if from == to {
        return Err(TransitionError::same_stage(from));
    }

    if is_terminal(from) && !is_positive_terminal(from) {
        return Err(TransitionError::from_terminal(from, to));
    }

    let allowed = transitions(from);
    if !allowed.contains(&to) {
        return Err(TransitionError::illegal(from, to, allowed));
    }

    trace!(from = %from, to = %to, "Stage transition validated");
    Ok(())
}
