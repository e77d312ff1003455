//! Utility functions for timestamp handling.

pub mod timestamps;

pub use timestamps::{
    format_iso8601, now_utc, parse_timestamp, whole_days_between, Timestamp, TimestampError,
};
