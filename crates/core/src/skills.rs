use crate::error::ScreenError;
use serde_yaml::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const BUILTIN_SKILLS: &str = include_str!("../assets/skills.yaml");

/// Category name to skill phrases, all lower-cased at load time.
/// Categories keep their file order; a phrase may appear in several.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillsDictionary {
    categories: Vec<(String, Vec<String>)>,
}

impl SkillsDictionary {
    pub fn new<I, C, P>(categories: I) -> Self
    where
        I: IntoIterator<Item = (C, Vec<P>)>,
        C: Into<String>,
        P: AsRef<str>,
    {
        let categories = categories
            .into_iter()
            .map(|(name, phrases)| {
                let name = name.into();
                let phrases = clean_phrases(&name, phrases.iter().map(|phrase| phrase.as_ref()));
                (name, phrases)
            })
            .collect();

        Self { categories }
    }

    /// The dictionary shipped with the crate.
    pub fn builtin() -> Result<Self, ScreenError> {
        Self::from_yaml_str(BUILTIN_SKILLS)
    }

    pub fn from_path(path: &Path) -> Result<Self, ScreenError> {
        let raw = fs::read_to_string(path)?;
        let dictionary = Self::from_yaml_str(&raw)?;
        debug!(
            path = %path.display(),
            categories = dictionary.categories.len(),
            phrases = dictionary.distinct_phrase_count(),
            "loaded skills dictionary"
        );
        Ok(dictionary)
    }

    /// Parses a YAML mapping of category to phrase list. A null or empty
    /// document is an empty dictionary; entries of the wrong shape are
    /// skipped rather than rejected.
    pub fn from_yaml_str(raw: &str) -> Result<Self, ScreenError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        let document: Value = serde_yaml::from_str(raw)
            .map_err(|error| ScreenError::SkillsDictionary(error.to_string()))?;

        let mapping = match document {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(mapping) => mapping,
            other => {
                warn!(kind = value_kind(&other), "skills dictionary is not a mapping; ignoring it");
                return Ok(Self::default());
            }
        };

        let mut categories = Vec::with_capacity(mapping.len());
        for (key, value) in mapping {
            let Some(name) = scalar_text(&key) else {
                warn!(kind = value_kind(&key), "skipping skills category with non-scalar name");
                continue;
            };

            let phrases = match value {
                Value::Sequence(items) => items
                    .iter()
                    .filter_map(|item| {
                        let phrase = scalar_text(item);
                        if phrase.is_none() {
                            warn!(category = %name, "skipping non-scalar skill entry");
                        }
                        phrase
                    })
                    .collect::<Vec<_>>(),
                Value::Null => Vec::new(),
                other => {
                    warn!(category = %name, kind = value_kind(&other), "skills category is not a list; skipping");
                    continue;
                }
            };

            let phrases = clean_phrases(&name, phrases.iter().map(String::as_str));
            categories.push((name, phrases));
        }

        Ok(Self { categories })
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.categories
            .iter()
            .map(|(name, phrases)| (name.as_str(), phrases.as_slice()))
    }

    pub fn phrases(&self) -> impl Iterator<Item = &str> {
        self.categories
            .iter()
            .flat_map(|(_, phrases)| phrases.iter().map(String::as_str))
    }

    pub fn distinct_phrase_count(&self) -> usize {
        self.phrases().collect::<BTreeSet<_>>().len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases().next().is_none()
    }
}

fn clean_phrases<'a>(category: &str, phrases: impl Iterator<Item = &'a str>) -> Vec<String> {
    phrases
        .filter_map(|phrase| {
            let lowered = phrase.to_lowercase();
            if lowered.trim().is_empty() {
                debug!(category, "dropping blank skill phrase");
                None
            } else {
                Some(lowered)
            }
        })
        .collect()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillMatch {
    /// Distinct matched phrases, sorted alphabetically.
    pub matched: Vec<String>,
    /// sqrt(distinct matched / distinct phrases in the dictionary), in [0, 1].
    pub score: f64,
}

/// Tests every dictionary phrase for containment as `" phrase "` inside the
/// space-padded text. Deliberately coarse: no tokenization, no stemming.
pub fn match_skills(text: &str, dictionary: &SkillsDictionary) -> SkillMatch {
    let padded_text = format!(" {} ", text.to_lowercase());

    let matched = dictionary
        .phrases()
        .filter(|phrase| padded_text.contains(&format!(" {phrase} ")))
        .collect::<BTreeSet<_>>();

    let total = dictionary.distinct_phrase_count().max(1);
    let score = (matched.len() as f64 / total as f64).sqrt();

    SkillMatch {
        matched: matched.into_iter().map(str::to_string).collect(),
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn languages() -> SkillsDictionary {
        SkillsDictionary::new([("languages", vec!["Python", "SQL"])])
    }

    #[test]
    fn phrases_are_lowered_on_load() -> Result<(), ScreenError> {
        let dictionary = SkillsDictionary::from_yaml_str("tools:\n  - Docker\n  - Machine Learning\n")?;
        assert_eq!(
            dictionary.phrases().collect::<Vec<_>>(),
            vec!["docker", "machine learning"]
        );
        Ok(())
    }

    #[test]
    fn matches_are_sorted_and_deduplicated_across_categories() {
        let dictionary = SkillsDictionary::new([
            ("data", vec!["sql", "pandas"]),
            ("backend", vec!["sql", "django", "rest api"]),
        ]);

        let found = match_skills("built a rest api in django backed by sql", &dictionary);
        assert_eq!(found.matched, vec!["django", "rest api", "sql"]);
        assert_eq!(dictionary.distinct_phrase_count(), 4);
        assert!((found.score - (3.0f64 / 4.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn phrases_only_match_on_word_boundaries() {
        let dictionary = SkillsDictionary::new([("languages", vec!["go", "r"])]);
        let found = match_skills("google cloud and rust", &dictionary);
        assert!(found.matched.is_empty());
        assert_eq!(found.score, 0.0);
    }

    #[test]
    fn score_uses_square_root_of_coverage() {
        let dictionary = SkillsDictionary::new([("all", vec!["a1", "b2", "c3", "d4"])]);
        let found = match_skills("a1 only", &dictionary);
        assert_eq!(found.score, 0.5);
    }

    #[test]
    fn score_is_zero_iff_nothing_matches() {
        let dictionary = languages();
        let none = match_skills("experienced woodworking carpenter", &dictionary);
        let some = match_skills("experienced python and sql developer", &dictionary);

        assert_eq!(none.score, 0.0);
        assert!(none.matched.is_empty());
        assert!(some.score > 0.0 && some.score <= 1.0);
        assert_eq!(some.score, 1.0);
    }

    #[test]
    fn empty_dictionary_scores_zero() -> Result<(), ScreenError> {
        for raw in ["", "~", "{}", "languages: []", "- python\n- sql\n"] {
            let dictionary = SkillsDictionary::from_yaml_str(raw)?;
            assert!(dictionary.is_empty(), "{raw:?} should load empty");
            let found = match_skills("python sql", &dictionary);
            assert_eq!(found.score, 0.0);
            assert!(found.matched.is_empty());
        }
        Ok(())
    }

    #[test]
    fn malformed_entries_are_skipped() -> Result<(), ScreenError> {
        let raw = "languages:\n  - python\n  - {nested: true}\n  - ''\nbroken: 42\ndata:\n  - 3\n";
        let dictionary = SkillsDictionary::from_yaml_str(raw)?;
        assert_eq!(dictionary.phrases().collect::<Vec<_>>(), vec!["python", "3"]);
        assert_eq!(dictionary.categories().count(), 2);
        Ok(())
    }

    #[test]
    fn yaml_syntax_errors_are_reported() {
        let error = SkillsDictionary::from_yaml_str("languages: [python").unwrap_err();
        assert!(matches!(error, ScreenError::SkillsDictionary(_)));
    }

    #[test]
    fn builtin_dictionary_loads() -> Result<(), ScreenError> {
        let dictionary = SkillsDictionary::builtin()?;
        assert!(dictionary.distinct_phrase_count() > 50);
        assert!(dictionary.phrases().any(|phrase| phrase == "machine learning"));
        Ok(())
    }
}
