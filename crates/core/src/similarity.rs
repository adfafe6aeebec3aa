use crate::error::ScreenError;
use crate::normalize::NormalizedDocument;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::{debug, warn};

/// Runs of two or more word characters.
const TOKEN_PATTERN: &str = r"\b\w\w+\b";

/// Inclusive n-gram bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NgramRange {
    pub min: usize,
    pub max: usize,
}

impl NgramRange {
    pub const UNIGRAMS: NgramRange = NgramRange { min: 1, max: 1 };
    pub const UNIGRAMS_AND_BIGRAMS: NgramRange = NgramRange { min: 1, max: 2 };
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VectorizeError {
    #[error("empty vocabulary; the corpus contains no usable terms")]
    EmptyVocabulary,
}

/// Sparse, L2-normalized term weights keyed by vocabulary index.
pub type SparseVector = BTreeMap<usize, f64>;

/// TF-IDF over a single corpus. Nothing is retained between calls: the
/// vocabulary and idf weights are rebuilt by every `fit_transform`.
pub struct TfidfVectorizer {
    ngram_range: NgramRange,
    token_re: Regex,
}

impl TfidfVectorizer {
    pub fn new(ngram_range: NgramRange) -> Result<Self, ScreenError> {
        if ngram_range.min == 0 || ngram_range.min > ngram_range.max {
            return Err(ScreenError::InvalidArgument(format!(
                "invalid ngram range ({}, {})",
                ngram_range.min, ngram_range.max
            )));
        }

        Ok(Self {
            ngram_range,
            token_re: Regex::new(TOKEN_PATTERN)?,
        })
    }

    pub fn analyze(&self, text: &str) -> Vec<String> {
        let tokens = self
            .token_re
            .find_iter(text)
            .map(|found| found.as_str())
            .collect::<Vec<_>>();

        let mut terms = Vec::new();
        for n in self.ngram_range.min..=self.ngram_range.max {
            if n == 1 {
                terms.extend(tokens.iter().map(|token| token.to_string()));
            } else {
                terms.extend(tokens.windows(n).map(|window| window.join(" ")));
            }
        }
        terms
    }

    /// Builds the vocabulary over `corpus` and returns one row per document.
    /// Weights are raw counts times smoothed idf, `ln((1 + n) / (1 + df)) + 1`.
    pub fn fit_transform<S: AsRef<str>>(
        &self,
        corpus: &[S],
    ) -> Result<Vec<SparseVector>, VectorizeError> {
        let analyzed = corpus
            .iter()
            .map(|document| self.analyze(document.as_ref()))
            .collect::<Vec<_>>();

        let mut document_frequency = BTreeMap::<&str, usize>::new();
        let mut counts = Vec::with_capacity(analyzed.len());
        for terms in &analyzed {
            let mut term_counts = HashMap::<&str, usize>::new();
            for term in terms {
                *term_counts.entry(term.as_str()).or_default() += 1;
            }
            for term in term_counts.keys() {
                *document_frequency.entry(*term).or_default() += 1;
            }
            counts.push(term_counts);
        }

        if document_frequency.is_empty() {
            return Err(VectorizeError::EmptyVocabulary);
        }

        let documents = corpus.len() as f64;
        let vocabulary = document_frequency
            .iter()
            .enumerate()
            .map(|(index, (term, df))| {
                let idf = ((1.0 + documents) / (1.0 + *df as f64)).ln() + 1.0;
                (*term, (index, idf))
            })
            .collect::<HashMap<_, _>>();

        let rows = counts
            .into_iter()
            .map(|term_counts| {
                let mut row = term_counts
                    .into_iter()
                    .filter_map(|(term, count)| {
                        vocabulary
                            .get(term)
                            .map(|(index, idf)| (*index, count as f64 * idf))
                    })
                    .collect::<SparseVector>();
                l2_normalize(&mut row);
                row
            })
            .collect();

        debug!(
            documents = corpus.len(),
            vocabulary = vocabulary.len(),
            ngram_max = self.ngram_range.max,
            "fitted tf-idf"
        );

        Ok(rows)
    }
}

fn l2_normalize(row: &mut SparseVector) {
    let magnitude = row.values().map(|value| value * value).sum::<f64>().sqrt();
    if magnitude > 0.0 {
        for value in row.values_mut() {
            *value /= magnitude;
        }
    }
}

/// Cosine similarity of two sparse vectors, clamped to [0, 1].
pub fn cosine_similarity(left: &SparseVector, right: &SparseVector) -> f64 {
    let (small, large) = if left.len() <= right.len() {
        (left, right)
    } else {
        (right, left)
    };

    let mut dot = 0.0;
    for (index, value) in small {
        if let Some(other) = large.get(index) {
            dot += value * other;
        }
    }

    let left_norm = left.values().map(|value| value * value).sum::<f64>().sqrt();
    let right_norm = right.values().map(|value| value * value).sum::<f64>().sqrt();
    if left_norm == 0.0 || right_norm == 0.0 {
        return 0.0;
    }

    (dot / (left_norm * right_norm)).clamp(0.0, 1.0)
}

/// Scores every resume against the job description, aligned by index.
///
/// The job description and all resumes are vectorized together with unigrams
/// and bigrams. A degenerate corpus retries with unigrams only, and if that
/// also has no vocabulary every resume scores 0.0.
pub fn compute_similarity(
    job_description: &NormalizedDocument,
    resumes: &[NormalizedDocument],
) -> Result<Vec<f64>, ScreenError> {
    if resumes.is_empty() {
        return Ok(Vec::new());
    }

    let corpus = std::iter::once(job_description)
        .chain(resumes)
        .map(NormalizedDocument::as_str)
        .collect::<Vec<_>>();

    let rows = match TfidfVectorizer::new(NgramRange::UNIGRAMS_AND_BIGRAMS)?.fit_transform(&corpus) {
        Ok(rows) => rows,
        Err(error) => {
            warn!(%error, "bigram vectorization failed; retrying with unigrams");
            match TfidfVectorizer::new(NgramRange::UNIGRAMS)?.fit_transform(&corpus) {
                Ok(rows) => rows,
                Err(error) => {
                    warn!(%error, "corpus has no vocabulary; all similarities are zero");
                    return Ok(vec![0.0; resumes.len()]);
                }
            }
        }
    };

    let (anchor, candidates) = rows
        .split_first()
        .ok_or_else(|| ScreenError::InvalidArgument("vectorizer returned no rows".to_string()))?;

    Ok(candidates
        .iter()
        .map(|candidate| cosine_similarity(anchor, candidate))
        .collect())
}
