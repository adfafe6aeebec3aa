use crate::error::ScreenError;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;

pub const EMAIL_SENTINEL: &str = " _email_ ";
pub const URL_SENTINEL: &str = " _url_ ";
pub const PHONE_SENTINEL: &str = " _phone_ ";

const EMAIL_PATTERN: &str = r"[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}";
const URL_PATTERN: &str = r"http[s]?://\S+";
const PHONE_PATTERN: &str = r"\+?\d[\d\-()\s]{6,}\d";

/// Standard English stop-word list.
pub const STOP_WORDS: [&str; 179] = [
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan",
    "shan't", "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't",
    "wouldn", "wouldn't",
];

/// Lower-cased, punctuation-free, whitespace-collapsed document text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedDocument(String);

impl NormalizedDocument {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for NormalizedDocument {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub struct TextNormalizer {
    email: Regex,
    url: Regex,
    phone: Regex,
}

impl TextNormalizer {
    pub fn new() -> Result<Self, ScreenError> {
        Ok(Self {
            email: Regex::new(EMAIL_PATTERN)?,
            url: Regex::new(URL_PATTERN)?,
            phone: Regex::new(PHONE_PATTERN)?,
        })
    }

    /// Contact details are masked before punctuation is stripped, so the
    /// patterns still see `@`, `:` and `+`.
    pub fn normalize(&self, raw: &str) -> NormalizedDocument {
        let lowered = raw.to_lowercase();
        let masked = self.email.replace_all(&lowered, EMAIL_SENTINEL);
        let masked = self.url.replace_all(&masked, URL_SENTINEL);
        let masked = self.phone.replace_all(&masked, PHONE_SENTINEL);

        let stripped = masked
            .chars()
            .filter(|c| !c.is_ascii_punctuation())
            .collect::<String>();

        NormalizedDocument(normalize_whitespace(&stripped))
    }
}

pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace split with stop words removed. The skills matcher does not use
/// this; it matches padded substrings instead.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|word| !STOP_WORDS.contains(word))
        .map(str::to_string)
        .collect()
}

pub fn jaccard<S: AsRef<str>>(left: &[S], right: &[S]) -> f64 {
    let left = left.iter().map(|item| item.as_ref()).collect::<HashSet<&str>>();
    let right = right.iter().map(|item| item.as_ref()).collect::<HashSet<&str>>();

    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let shared = left.intersection(&right).count();
    let union = left.union(&right).count();
    shared as f64 / union as f64
}
