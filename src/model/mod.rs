//! Analysis result types.
//!
//! A [`ReportModel`] is produced by an external analysis step and is
//! read-only here: it is validated, scored and handed to the layout engine.

mod report;
mod score;

pub use report::{parse_analysis_response, validate_analysis, ExperienceYears, ReportModel};
pub use score::{
    format_percent, overall_score, CalloutColor, Competency, RecommendationTier,
    DEFAULT_EDUCATION_SCORE, DEFAULT_EXPERIENCE_SCORE, DEFAULT_MATCH_SCORE, DEFAULT_SKILLS_SCORE,
};
