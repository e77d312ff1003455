//! Core domain model types.
//!
//! This module contains the plain data the state machine works over:
//! - The closed stage enum
//! - Interview and pipeline status enums
//! - Pipeline and interview records

mod records;
mod stage;
mod status;

pub use records::{Interview, Pipeline};
pub use stage::Stage;
pub use status::{InterviewMode, InterviewOutcome, PipelineHealth, PrepStatus, Priority};
