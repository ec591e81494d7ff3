//! Score defaults, the overall score and recommendation tiers.

use serde::{Deserialize, Serialize};

use super::ReportModel;

pub const DEFAULT_MATCH_SCORE: f64 = 0.0;
pub const DEFAULT_SKILLS_SCORE: f64 = 70.0;
pub const DEFAULT_EXPERIENCE_SCORE: f64 = 75.0;
pub const DEFAULT_EDUCATION_SCORE: f64 = 80.0;

/// Soft and technical competencies shown in the metrics table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Competency {
    Technical,
    Communication,
    Leadership,
    ProblemSolving,
    Teamwork,
    Adaptability,
}

impl Competency {
    /// All competencies in table order.
    pub const ALL: [Competency; 6] = [
        Competency::Technical,
        Competency::Communication,
        Competency::Leadership,
        Competency::ProblemSolving,
        Competency::Teamwork,
        Competency::Adaptability,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Competency::Technical => "Technical Skills",
            Competency::Communication => "Communication",
            Competency::Leadership => "Leadership",
            Competency::ProblemSolving => "Problem Solving",
            Competency::Teamwork => "Teamwork",
            Competency::Adaptability => "Adaptability",
        }
    }

    /// Value displayed when the analysis omits this score.
    pub fn default_score(&self) -> f64 {
        match self {
            Competency::Technical => 75.0,
            Competency::Communication => 80.0,
            Competency::Leadership => 70.0,
            Competency::ProblemSolving => 85.0,
            Competency::Teamwork => 78.0,
            Competency::Adaptability => 82.0,
        }
    }
}

/// Overall score: the rounded mean of match, skills, experience and
/// education scores, each defaulted on its own when absent.
pub fn overall_score(model: &ReportModel) -> u8 {
    let inputs = [
        model.match_score.unwrap_or(DEFAULT_MATCH_SCORE),
        model.skills_score.unwrap_or(DEFAULT_SKILLS_SCORE),
        model.experience_score.unwrap_or(DEFAULT_EXPERIENCE_SCORE),
        model.education_score.unwrap_or(DEFAULT_EDUCATION_SCORE),
    ];
    let mean = inputs.iter().sum::<f64>() / inputs.len() as f64;
    mean.round().clamp(0.0, 100.0) as u8
}

/// Render a score as an integer percentage.
pub fn format_percent(score: f64) -> String {
    format!("{}%", score.round() as i64)
}

/// Recommendation band derived from the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationTier {
    HighlyRecommended,
    Recommended,
    ConsiderWithCaution,
    NotRecommended,
}

impl RecommendationTier {
    /// Lower bounds are inclusive.
    pub fn from_score(score: u8) -> Self {
        match score {
            85.. => RecommendationTier::HighlyRecommended,
            70..=84 => RecommendationTier::Recommended,
            55..=69 => RecommendationTier::ConsiderWithCaution,
            _ => RecommendationTier::NotRecommended,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RecommendationTier::HighlyRecommended => "Highly Recommended",
            RecommendationTier::Recommended => "Recommended",
            RecommendationTier::ConsiderWithCaution => "Consider with Caution",
            RecommendationTier::NotRecommended => "Not Recommended",
        }
    }
}

impl std::fmt::Display for RecommendationTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Color of the final recommendation callout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalloutColor {
    Red,
    Amber,
    Green,
}

impl CalloutColor {
    /// Map a hiring recommendation: "No Hire" is red, "Caution" amber, anything else green.
    pub fn from_recommendation(recommendation: &str) -> Self {
        if recommendation.contains("No Hire") {
            CalloutColor::Red
        } else if recommendation.contains("Caution") {
            CalloutColor::Amber
        } else {
            CalloutColor::Green
        }
    }

    pub fn from_tier(tier: RecommendationTier) -> Self {
        match tier {
            RecommendationTier::HighlyRecommended | RecommendationTier::Recommended => {
                CalloutColor::Green
            }
            RecommendationTier::ConsiderWithCaution => CalloutColor::Amber,
            RecommendationTier::NotRecommended => CalloutColor::Red,
        }
    }
}
