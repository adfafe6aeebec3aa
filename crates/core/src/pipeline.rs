use crate::error::ScreenError;
use crate::extractor::load_document_text;
use crate::ingest::discover_resume_files;
use crate::models::{ResumeResult, ScreeningOptions};
use crate::normalize::{NormalizedDocument, TextNormalizer};
use crate::ranking::rank;
use crate::similarity::compute_similarity;
use crate::skills::{match_skills, SkillsDictionary};
use std::path::{Path, PathBuf};
use tracing::info;

/// One screening configuration: a skills dictionary and blend weights.
///
/// Holds no per-run state, so a single screener can serve independent runs
/// from several threads as long as each run gets its own files.
pub struct ResumeScreener {
    dictionary: SkillsDictionary,
    options: ScreeningOptions,
    normalizer: TextNormalizer,
}

impl ResumeScreener {
    pub fn new(dictionary: SkillsDictionary, options: ScreeningOptions) -> Result<Self, ScreenError> {
        options.validate()?;
        Ok(Self {
            dictionary,
            options,
            normalizer: TextNormalizer::new()?,
        })
    }

    pub fn dictionary(&self) -> &SkillsDictionary {
        &self.dictionary
    }

    pub fn options(&self) -> &ScreeningOptions {
        &self.options
    }

    /// Ranks every supported file under `resumes_folder` against the job
    /// description at `job_description_path`.
    pub fn rank_folder(
        &self,
        job_description_path: &Path,
        resumes_folder: &Path,
    ) -> Result<Vec<ResumeResult>, ScreenError> {
        let files = discover_resume_files(resumes_folder);
        info!(
            folder = %resumes_folder.display(),
            resumes = files.len(),
            "discovered resumes"
        );
        self.rank_files(job_description_path, &files)
    }

    /// Loads and ranks the given files. The first load failure aborts the run.
    pub fn rank_files(
        &self,
        job_description_path: &Path,
        resume_paths: &[PathBuf],
    ) -> Result<Vec<ResumeResult>, ScreenError> {
        let job_description = load_document_text(job_description_path)?;

        let mut resumes = Vec::with_capacity(resume_paths.len());
        for path in resume_paths {
            resumes.push((path.display().to_string(), load_document_text(path)?));
        }

        self.rank_texts(&job_description, resumes)
    }

    /// Ranks already-extracted texts, given as `(label, raw text)` pairs in
    /// their tie-breaking order.
    pub fn rank_texts(
        &self,
        job_description: &str,
        resumes: Vec<(String, String)>,
    ) -> Result<Vec<ResumeResult>, ScreenError> {
        let job_description = self.normalizer.normalize(job_description);

        let (labels, texts): (Vec<String>, Vec<String>) = resumes.into_iter().unzip();
        let normalized = texts
            .iter()
            .map(|text| self.normalizer.normalize(text))
            .collect::<Vec<NormalizedDocument>>();

        let similarities = compute_similarity(&job_description, &normalized)?;
        let skill_matches = normalized
            .iter()
            .map(|document| match_skills(document.as_str(), &self.dictionary))
            .collect::<Vec<_>>();

        let results = rank(&labels, &similarities, skill_matches, &self.options)?;

        info!(
            resumes = results.len(),
            top_score = ?results.first().map(|result| result.final_score),
            "ranking complete"
        );

        Ok(results)
    }
}

/// One-shot convenience: loads the dictionary (or the built-in one) and ranks
/// a folder with default weights.
pub fn rank_resumes(
    job_description_path: &Path,
    resumes_folder: &Path,
    skills_path: Option<&Path>,
) -> Result<Vec<ResumeResult>, ScreenError> {
    let dictionary = match skills_path {
        Some(path) => SkillsDictionary::from_path(path)?,
        None => SkillsDictionary::builtin()?,
    };

    ResumeScreener::new(dictionary, ScreeningOptions::default())?
        .rank_folder(job_description_path, resumes_folder)
}
