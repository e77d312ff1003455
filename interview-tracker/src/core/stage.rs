//! Pipeline stage enum.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::TrackerError;

/// One discrete step in a job-application pipeline.
///
/// The enum is a plain tag. Labels, ordinals and transition rules live in
/// [`crate::graph`] as lookup tables keyed by this type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Application submitted.
    #[default]
    Applied,
    /// Initial call with a recruiter.
    RecruiterScreen,
    /// First technical interview.
    #[serde(rename = "tech_round_1")]
    TechRound1,
    /// Second technical interview.
    #[serde(rename = "tech_round_2")]
    TechRound2,
    /// System design interview.
    SystemDesign,
    /// AI / GenAI focused interview.
    AiRound,
    /// Hiring manager interview.
    HmRound,
    /// Final or culture-fit round.
    FinalCulture,
    /// Offer received.
    Offer,
    /// Rejected by the company.
    Rejected,
    /// Withdrawn by the candidate.
    Dropped,
}

impl Stage {
    /// Every stage, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Applied,
        Self::RecruiterScreen,
        Self::TechRound1,
        Self::TechRound2,
        Self::SystemDesign,
        Self::AiRound,
        Self::HmRound,
        Self::FinalCulture,
        Self::Offer,
        Self::Rejected,
        Self::Dropped,
    ];

    /// Returns the persisted snake_case value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::RecruiterScreen => "recruiter_screen",
            Self::TechRound1 => "tech_round_1",
            Self::TechRound2 => "tech_round_2",
            Self::SystemDesign => "system_design",
            Self::AiRound => "ai_round",
            Self::HmRound => "hm_round",
            Self::FinalCulture => "final_culture",
            Self::Offer => "offer",
            Self::Rejected => "rejected",
            Self::Dropped => "dropped",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == needle)
            .ok_or_else(|| TrackerError::UnknownStage(needle.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display_matches_serde() {
        for stage in Stage::ALL {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{stage}\""));
        }
    }

    #[test]
    fn test_stage_numbered_rounds_serialize() {
        assert_eq!(
            serde_json::to_string(&Stage::TechRound1).unwrap(),
            r#""tech_round_1""#
        );
        let parsed: Stage = serde_json::from_str(r#""tech_round_2""#).unwrap();
        assert_eq!(parsed, Stage::TechRound2);
    }

    #[test]
    fn test_stage_from_str() {
        assert_eq!("hm_round".parse::<Stage>().unwrap(), Stage::HmRound);
        assert_eq!(" offer ".parse::<Stage>().unwrap(), Stage::Offer);
    }

    #[test]
    fn test_stage_from_str_unknown() {
        let err = "phone_screen".parse::<Stage>().unwrap_err();
        assert!(matches!(err, TrackerError::UnknownStage(ref s) if s == "phone_screen"));
    }

    #[test]
    fn test_stage_default_is_applied() {
        assert_eq!(Stage::default(), Stage::Applied);
    }
}
