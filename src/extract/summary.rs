//! Extractive summaries of article text.
//!
//! The summary is the handful of sentences whose words occur most often
//! in the article, kept in their original order.

use std::collections::HashMap;
use thiserror::Error;

/// Default number of sentences kept in a summary.
pub const DEFAULT_SUMMARY_SENTENCES: usize = 5;

/// Why no summary could be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummaryError {
    #[error("text contains no sentences")]
    NoSentences,

    #[error("text contains no scorable words")]
    NoKeywords,
}

/// Produces a short summary from an article's title and text.
pub trait Summarizer: Send + Sync {
    fn summarize(&self, title: Option<&str>, text: &str) -> Result<String, SummaryError>;
}

/// Keyword-frequency sentence ranking.
#[derive(Debug, Clone)]
pub struct FrequencySummarizer {
    max_sentences: usize,
}

impl FrequencySummarizer {
    pub fn new(max_sentences: usize) -> Self {
        Self {
            max_sentences: max_sentences.max(1),
        }
    }
}

impl Default for FrequencySummarizer {
    fn default() -> Self {
        Self::new(DEFAULT_SUMMARY_SENTENCES)
    }
}

impl Summarizer for FrequencySummarizer {
    fn summarize(&self, title: Option<&str>, text: &str) -> Result<String, SummaryError> {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return Err(SummaryError::NoSentences);
        }

        let mut frequencies: HashMap<String, usize> = HashMap::new();
        for word in sentences.iter().flat_map(|s| keywords(s)) {
            *frequencies.entry(word).or_insert(0) += 1;
        }
        if frequencies.is_empty() {
            return Err(SummaryError::NoKeywords);
        }

        let title_words: Vec<String> = title.map(keywords).unwrap_or_default();

        let mut scored: Vec<(usize, f64)> = sentences
            .iter()
            .enumerate()
            .map(|(idx, sentence)| (idx, score_sentence(sentence, &frequencies, &title_words)))
            .collect();

        // Highest score first; earlier sentences win ties.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        scored.truncate(self.max_sentences);
        scored.sort_by_key(|(idx, _)| *idx);

        Ok(scored
            .into_iter()
            .map(|(idx, _)| sentences[idx].as_str())
            .collect::<Vec<_>>()
            .join(" "))
    }
}

fn score_sentence(sentence: &str, frequencies: &HashMap<String, usize>, title: &[String]) -> f64 {
    let words = keywords(sentence);
    if words.is_empty() {
        return 0.0;
    }

    let total: usize = words
        .iter()
        .map(|w| frequencies.get(w).copied().unwrap_or(0))
        .sum();
    let title_hits = words.iter().filter(|w| title.contains(w)).count();

    (total as f64 + 2.0 * title_hits as f64) / words.len() as f64
}

/// Split text on `.`, `!` or `?` followed by whitespace or end of input.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let at_boundary = matches!(c, '.' | '!' | '?')
            && chars.peek().map_or(true, |next| next.is_whitespace());
        if at_boundary {
            push_sentence(&mut sentences, &current);
            current.clear();
        }
    }
    push_sentence(&mut sentences, &current);

    sentences
}

fn push_sentence(sentences: &mut Vec<String>, raw: &str) {
    let sentence = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if sentence.split_whitespace().count() >= 3 {
        sentences.push(sentence);
    }
}

fn keywords(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 2)
        .map(str::to_lowercase)
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect()
}

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her", "was",
    "one", "our", "out", "has", "have", "this", "that", "with", "from", "they", "will", "would",
    "there", "their", "what", "about", "which", "when", "were", "been", "also", "into", "than",
    "then", "them", "these", "those", "such", "its", "more", "most", "other", "some",
    "over", "only", "very", "may", "between", "each", "where", "while", "here", "how", "who",
];
