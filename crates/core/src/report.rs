use crate::error::ScreenError;
use crate::models::ResumeResult;
use serde::Deserialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

pub const REPORT_HEADER: [&str; 5] = [
    "resume_path",
    "similarity_score",
    "skills_score",
    "final_score",
    "skills_matched",
];

const SKILL_SEPARATOR: &str = ", ";

/// A report line read back from disk. Scores carry the four decimals they
/// were written with.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportRow {
    pub resume_path: String,
    pub similarity_score: f64,
    pub skills_score: f64,
    pub final_score: f64,
    #[serde(deserialize_with = "split_skills")]
    pub skills_matched: Vec<String>,
}

fn split_skills<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let joined = String::deserialize(deserializer)?;
    Ok(joined
        .split(SKILL_SEPARATOR)
        .map(str::trim)
        .filter(|skill| !skill.is_empty())
        .map(str::to_string)
        .collect())
}

pub fn format_score(score: f64) -> String {
    format!("{score:.4}")
}

pub fn join_skills(skills: &[String]) -> String {
    skills.join(SKILL_SEPARATOR)
}

pub fn write_report<W: Write>(writer: W, results: &[ResumeResult]) -> Result<(), ScreenError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(REPORT_HEADER)?;

    for result in results {
        csv.write_record([
            result.resume_path.clone(),
            format_score(result.similarity_score),
            format_score(result.skills_score),
            format_score(result.final_score),
            join_skills(&result.skills_matched),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

pub fn write_report_file(path: &Path, results: &[ResumeResult]) -> Result<(), ScreenError> {
    write_report(File::create(path)?, results)
}

pub fn read_report<R: Read>(reader: R) -> Result<Vec<ReportRow>, ScreenError> {
    let mut csv = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for row in csv.deserialize::<ReportRow>() {
        rows.push(row?);
    }
    Ok(rows)
}

pub fn read_report_file(path: &Path) -> Result<Vec<ReportRow>, ScreenError> {
    read_report(File::open(path)?)
}
