use crate::error::ScreenError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SIMILARITY_WEIGHT: f64 = 0.7;
pub const DEFAULT_SKILLS_WEIGHT: f64 = 0.3;

/// Scores for one resume. The only thing that changes after creation is its
/// position in the ranked list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeResult {
    pub resume_path: String,
    pub similarity_score: f64,
    pub skills_score: f64,
    pub final_score: f64,
    pub skills_matched: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreeningOptions {
    pub similarity_weight: f64,
    pub skills_weight: f64,
}

impl Default for ScreeningOptions {
    fn default() -> Self {
        Self {
            similarity_weight: DEFAULT_SIMILARITY_WEIGHT,
            skills_weight: DEFAULT_SKILLS_WEIGHT,
        }
    }
}

impl ScreeningOptions {
    pub fn validate(&self) -> Result<(), ScreenError> {
        for (name, weight) in [
            ("similarity_weight", self.similarity_weight),
            ("skills_weight", self.skills_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ScreenError::InvalidArgument(format!(
                    "{name} must be a non-negative number, got {weight}"
                )));
            }
        }
        Ok(())
    }

    pub fn blend(&self, similarity: f64, skills: f64) -> f64 {
        self.similarity_weight * similarity + self.skills_weight * skills
    }
}
