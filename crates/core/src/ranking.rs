use crate::error::ScreenError;
use crate::models::{ResumeResult, ScreeningOptions};
use crate::skills::SkillMatch;

/// Blends per-resume scores and sorts by final score, highest first.
///
/// All three inputs are aligned by index. The sort is stable, so resumes with
/// equal final scores keep their input order.
pub fn rank(
    resume_paths: &[String],
    similarities: &[f64],
    skill_matches: Vec<SkillMatch>,
    options: &ScreeningOptions,
) -> Result<Vec<ResumeResult>, ScreenError> {
    if similarities.len() != resume_paths.len() || skill_matches.len() != resume_paths.len() {
        return Err(ScreenError::InvalidArgument(format!(
            "score count mismatch: {} paths, {} similarities, {} skill matches",
            resume_paths.len(),
            similarities.len(),
            skill_matches.len()
        )));
    }

    let mut results = resume_paths
        .iter()
        .zip(similarities)
        .zip(skill_matches)
        .map(|((path, &similarity), skills)| ResumeResult {
            resume_path: path.clone(),
            similarity_score: similarity,
            skills_score: skills.score,
            final_score: options.blend(similarity, skills.score),
            skills_matched: skills.matched,
        })
        .collect::<Vec<_>>();

    results.sort_by(|left, right| right.final_score.total_cmp(&left.final_score));
    Ok(results)
}
