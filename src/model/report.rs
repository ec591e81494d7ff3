//! The analysis result consumed by the layout engine.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

use super::score::{Competency, DEFAULT_MATCH_SCORE};

static JSON_OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

const REQUIRED_FIELDS: &[&str] = &[
    "summary",
    "match_score",
    "strengths",
    "weaknesses",
    "skills",
    "suggestions",
    "experience_years",
    "education_level",
    "salary_range",
    "technical_score",
    "communication_score",
    "leadership_score",
    "problem_solving_score",
    "teamwork_score",
    "adaptability_score",
    "interview_readiness",
    "cultural_fit_indicators",
    "red_flags",
    "hiring_recommendation",
    "next_steps",
];

const LIST_FIELDS: &[&str] = &[
    "strengths",
    "weaknesses",
    "skills",
    "suggestions",
    "cultural_fit_indicators",
    "red_flags",
    "next_steps",
];

const SCORE_FIELDS: &[&str] = &[
    "match_score",
    "technical_score",
    "communication_score",
    "leadership_score",
    "problem_solving_score",
    "teamwork_score",
    "adaptability_score",
];

const TEXT_FIELDS: &[&str] = &[
    "summary",
    "education_level",
    "salary_range",
    "interview_readiness",
    "hiring_recommendation",
];

/// Estimated years of experience, as a number or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExperienceYears {
    Years(f64),
    Text(String),
}

impl std::fmt::Display for ExperienceYears {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExperienceYears::Years(y) if y.fract() == 0.0 => write!(f, "{}", *y as i64),
            ExperienceYears::Years(y) => write!(f, "{:.1}", y),
            ExperienceYears::Text(s) => f.write_str(s.trim()),
        }
    }
}

/// Analysis of one candidate.
///
/// Every field is optional on input; missing lists are empty and missing
/// scores fall back to documented defaults at layout time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportModel {
    /// Executive summary
    pub summary: String,

    /// Job match score (0-100)
    pub match_score: Option<f64>,
    /// Inputs of the overall score besides `match_score`
    pub skills_score: Option<f64>,
    pub experience_score: Option<f64>,
    pub education_score: Option<f64>,

    pub technical_score: Option<f64>,
    pub communication_score: Option<f64>,
    pub leadership_score: Option<f64>,
    pub problem_solving_score: Option<f64>,
    pub teamwork_score: Option<f64>,
    pub adaptability_score: Option<f64>,

    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub skills: Vec<String>,
    pub suggestions: Vec<String>,
    pub cultural_fit_indicators: Vec<String>,
    pub red_flags: Vec<String>,
    pub next_steps: Vec<String>,

    pub experience_years: Option<ExperienceYears>,
    pub education_level: String,
    pub salary_range: String,
    /// High / Medium / Low
    pub interview_readiness: String,
    /// e.g. "Strong Hire", "Hire", "No Hire", "Needs More Info"
    pub hiring_recommendation: String,
}

impl ReportModel {
    /// Deserialize a model without the strict shape check.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check the score invariant: every present score is a number in `[0, 100]`.
    pub fn validate(&self) -> Result<()> {
        let scores = [
            ("match_score", self.match_score),
            ("skills_score", self.skills_score),
            ("experience_score", self.experience_score),
            ("education_score", self.education_score),
            ("technical_score", self.technical_score),
            ("communication_score", self.communication_score),
            ("leadership_score", self.leadership_score),
            ("problem_solving_score", self.problem_solving_score),
            ("teamwork_score", self.teamwork_score),
            ("adaptability_score", self.adaptability_score),
        ];

        for (name, score) in scores {
            if let Some(value) = score {
                if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                    return Err(Error::InvalidModel(format!(
                        "{} is not a valid number 0-100",
                        name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Match score, or 0 when absent.
    pub fn match_score_or_default(&self) -> f64 {
        self.match_score.unwrap_or(DEFAULT_MATCH_SCORE)
    }

    /// Raw competency score as supplied.
    pub fn competency(&self, competency: Competency) -> Option<f64> {
        match competency {
            Competency::Technical => self.technical_score,
            Competency::Communication => self.communication_score,
            Competency::Leadership => self.leadership_score,
            Competency::ProblemSolving => self.problem_solving_score,
            Competency::Teamwork => self.teamwork_score,
            Competency::Adaptability => self.adaptability_score,
        }
    }

    /// Competency score with its display default applied.
    pub fn competency_or_default(&self, competency: Competency) -> f64 {
        self.competency(competency)
            .unwrap_or_else(|| competency.default_score())
    }

    /// Red flags that contain more than whitespace.
    pub fn visible_red_flags(&self) -> Vec<&str> {
        self.red_flags
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Parse a model's raw answer into a validated [`ReportModel`].
///
/// The first `{` through the last `}` is taken as the JSON object, so prose
/// or code fences around it are ignored.
pub fn parse_analysis_response(text: &str) -> Result<ReportModel> {
    let text = text.trim();
    let candidate = JSON_OBJECT.find(text).map(|m| m.as_str()).unwrap_or(text);

    let value: Value = serde_json::from_str(candidate)
        .map_err(|e| Error::InvalidModel(format!("AI returned invalid JSON: {}", e)))?;
    validate_analysis(&value)?;

    let model: ReportModel =
        serde_json::from_value(value).map_err(|e| Error::InvalidModel(e.to_string()))?;
    model.validate()?;
    Ok(model)
}

/// Strict shape check of an analysis result.
pub fn validate_analysis(value: &Value) -> Result<()> {
    let object = value
        .as_object()
        .ok_or_else(|| Error::InvalidModel("analysis result is not an object".to_string()))?;

    if let Some(missing) = REQUIRED_FIELDS.iter().find(|f| !object.contains_key(**f)) {
        return Err(Error::InvalidModel(format!("Missing field: {}", missing)));
    }

    for field in LIST_FIELDS {
        match object.get(*field) {
            Some(Value::Array(items)) if items.iter().all(Value::is_string) => {}
            Some(Value::Array(_)) => {
                return Err(Error::InvalidModel(format!(
                    "Field {} must contain only strings",
                    field
                )))
            }
            _ => {
                return Err(Error::InvalidModel(format!(
                    "Field {} is not an array",
                    field
                )))
            }
        }
    }

    for field in SCORE_FIELDS {
        let valid = object
            .get(*field)
            .and_then(Value::as_f64)
            .map(|n| (0.0..=100.0).contains(&n))
            .unwrap_or(false);
        if !valid {
            return Err(Error::InvalidModel(format!(
                "Field {} is not a valid number 0-100",
                field
            )));
        }
    }

    for field in TEXT_FIELDS {
        let valid = object
            .get(*field)
            .and_then(Value::as_str)
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false);
        if !valid {
            return Err(Error::InvalidModel(format!(
                "Field {} is not a valid string",
                field
            )));
        }
    }

    Ok(())
}
