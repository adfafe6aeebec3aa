pub mod error;
pub mod extractor;
pub mod ingest;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod ranking;
pub mod report;
pub mod similarity;
pub mod skills;

pub use error::{Result, ScreenError};
pub use extractor::{
    load_document_text, DocumentFormat, DocxExtractor, LopdfExtractor, PlainTextExtractor,
    TextExtractor, SUPPORTED_EXTENSIONS,
};
pub use ingest::discover_resume_files;
pub use models::{ResumeResult, ScreeningOptions, DEFAULT_SIMILARITY_WEIGHT, DEFAULT_SKILLS_WEIGHT};
pub use normalize::{jaccard, normalize_whitespace, tokenize, NormalizedDocument, TextNormalizer};
pub use pipeline::{rank_resumes, ResumeScreener};
pub use ranking::rank;
pub use report::{
    format_score, join_skills, read_report, read_report_file, write_report, write_report_file,
    ReportRow,
};
pub use similarity::{compute_similarity, cosine_similarity, NgramRange, TfidfVectorizer};
pub use skills::{match_skills, SkillMatch, SkillsDictionary};
