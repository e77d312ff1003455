//! Testing utilities for interview pipelines.
//!
//! This module provides:
//! - Pipeline fixtures anchored to a fixed clock
//! - Assertions for health reports and stage transitions

mod assertions;
mod fixtures;

pub use assertions::{
    assert_attention_reason, assert_health, assert_transition_allowed,
    assert_transition_rejected,
};
pub use fixtures::{fixed_now, PipelineFixture};
