//! Cheap topic screen run before any completion call.
//!
//! A query is redirected only when it names a clearly non-medical topic and
//! carries no medical vocabulary at all, so "I hurt my knee playing sports"
//! still reaches the model. Borderline cases are left to the system prompt.

use std::sync::LazyLock;

use regex::Regex;

pub const OFF_TOPIC_REPLY: &str = "I'm a medical assistant designed to help with health-related questions only. \
     Please ask me about medical conditions, symptoms, treatments, or general health advice.";

const OFF_TOPIC_TERMS: &[&str] = &[
    "politics",
    "entertainment",
    "sports",
    "finance",
    "investment",
    "stock market",
    "celebrity",
    "movie",
    "game",
    "music",
    "art",
];

// Matched as word prefixes: "symptom" covers "symptoms", "injur" covers
// "injury" and "injured".
const MEDICAL_STEMS: &[&str] = &[
    "health",
    "doctor",
    "symptom",
    "disease",
    "condition",
    "treatment",
    "medic",
    "drug",
    "prescription",
    "diagnos",
    "therap",
    "pain",
    "hurt",
    "headache",
    "fever",
    "cough",
    "sick",
    "hospital",
    "clinic",
    "patient",
    "physician",
    "nurse",
    "surgery",
    "exam",
    "test",
    "blood",
    "heart",
    "lung",
    "brain",
    "cancer",
    "diabetes",
    "infect",
    "virus",
    "bacteri",
    "injur",
    "anxiety",
    "depression",
    "dose",
];

fn alternation(terms: &[&str]) -> String {
    terms
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|")
}

// Whole words only, so "art" does not match "heart" or "arthritis".
static OFF_TOPIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternation(OFF_TOPIC_TERMS))).unwrap()
});

static MEDICAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b(?:{})", alternation(MEDICAL_STEMS))).unwrap()
});

pub fn is_off_topic(query: &str) -> bool {
    OFF_TOPIC_RE.is_match(query) && !MEDICAL_RE.is_match(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn medical_queries_pass() {
        assert!(!is_off_topic("I have chest pain near my heart"));
        assert!(!is_off_topic("Is arthritis hereditary?"));
        assert!(!is_off_topic("Please analyze this medical image: x-ray of chest"));
    }

    #[test]
    fn medical_vocabulary_outweighs_off_topic_words() {
        assert!(!is_off_topic("I hurt my knee playing sports"));
        assert!(!is_off_topic("Does music therapy help anxiety?"));
        assert!(!is_off_topic(
            "Please analyze this medical image: a child playing a game"
        ));
        assert!(!is_off_topic("My symptoms got worse after the movie"));
    }

    #[test]
    fn off_topic_queries_are_caught() {
        assert!(is_off_topic("Who won the sports final?"));
        assert!(is_off_topic("Should I buy on the Stock Market today"));
        assert!(is_off_topic("recommend a movie"));
    }
}
