//! Cross-output contradiction detection.
//!
//! Claims are compared pairwise: a pair on the same topic with opposite
//! polarity is a contradiction, which surfaces as Imaginary — the detector
//! flags inconsistency, it does not decide which side is right. Topic
//! similarity is lexical overlap of content words; polarity is the parity
//! of negation markers.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use tern_types::{Claim, Form, LlmResponse};

use crate::extractor::{ClaimExtractor, SimpleClaimExtractor};

/// Words that flip a statement's polarity.
const NEGATION_MARKERS: &[&str] = &["not", "never", "no", "cannot", "none"];

/// Words carrying no topical signal.
const STOPWORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "it", "its", "this",
    "that", "these", "those", "of", "to", "in", "on", "and", "or", "as", "at", "by", "for",
    "with", "will", "would", "can", "could", "do", "does", "did", "have", "has", "had", "there",
];

// ── Report ──────────────────────────────────────────────────────────────

/// Outcome of a coherence analysis.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoherenceReport {
    /// Mark: claims agree. Imaginary: at least one contradictory pair.
    /// Void: nothing to compare (fewer than two reliable, related claims).
    pub verdict: Form,
    /// The claims that were compared.
    pub claims: Vec<Claim>,
    /// Every contradictory pair found.
    pub contradictions: Vec<(Claim, Claim)>,
    /// One-line human summary.
    pub summary: String,
}

// ── Detector ────────────────────────────────────────────────────────────

/// Pairwise contradiction detector over one output or an ensemble.
pub struct ContradictionDetector {
    extractor: Box<dyn ClaimExtractor>,
    /// Claims below this confidence carry no signal.
    reliability_floor: f64,
    /// Jaccard overlap at or above this counts as "same topic".
    similarity_threshold: f64,
}

impl ContradictionDetector {
    /// Detector with the default sentence extractor and thresholds.
    pub fn new() -> Self {
        Self {
            extractor: Box::new(SimpleClaimExtractor::default()),
            reliability_floor: 0.5,
            similarity_threshold: 0.5,
        }
    }

    /// Swap in a custom extractor.
    pub fn with_extractor(mut self, extractor: Box<dyn ClaimExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Analyze a single response for internal contradictions.
    pub fn analyze(&self, response: &LlmResponse) -> CoherenceReport {
        let source = response.model_name.as_deref().unwrap_or("response");
        let claims = self.extractor.extract(&response.text, source);
        self.analyze_claims(claims)
    }

    /// Analyze an ensemble: claims are pooled across all responses and the
    /// identical pairwise rule applies, so disagreement between sources
    /// surfaces the same way as self-contradiction.
    pub fn analyze_multiple(&self, responses: &[LlmResponse]) -> CoherenceReport {
        let mut claims = Vec::new();
        for (index, response) in responses.iter().enumerate() {
            let fallback = format!("response-{}", index);
            let source = response.model_name.as_deref().unwrap_or(&fallback);
            claims.extend(self.extractor.extract(&response.text, source));
        }
        self.analyze_claims(claims)
    }

    /// Compare one pair of claims.
    ///
    /// Void: no signal (unreliable or unrelated). Imaginary: same topic,
    /// opposite polarity. Mark: same topic, same polarity.
    pub fn check_pair(&self, a: &Claim, b: &Claim) -> Form {
        if a.confidence < self.reliability_floor || b.confidence < self.reliability_floor {
            return Form::Void;
        }
        let words_a = content_words(&a.statement);
        let words_b = content_words(&b.statement);
        if jaccard(&words_a, &words_b) < self.similarity_threshold {
            return Form::Void;
        }
        if polarity(&a.statement) == polarity(&b.statement) {
            Form::Mark
        } else {
            Form::Imaginary
        }
    }

    fn analyze_claims(&self, claims: Vec<Claim>) -> CoherenceReport {
        if claims.len() < 2 {
            return CoherenceReport {
                verdict: Form::Void,
                claims,
                contradictions: Vec::new(),
                summary: "nothing to compare".into(),
            };
        }

        let mut contradictions = Vec::new();
        for i in 0..claims.len() {
            for j in (i + 1)..claims.len() {
                if self.check_pair(&claims[i], &claims[j]).is_imaginary() {
                    debug!(
                        a = %claims[i].statement,
                        b = %claims[j].statement,
                        "Contradictory pair",
                    );
                    contradictions.push((claims[i].clone(), claims[j].clone()));
                }
            }
        }

        let (verdict, summary) = if !contradictions.is_empty() {
            (
                Form::Imaginary,
                format!("{} contradictory pair(s) found", contradictions.len()),
            )
        } else {
            (
                Form::Mark,
                format!("no contradictions across {} claim(s)", claims.len()),
            )
        };

        CoherenceReport {
            verdict,
            claims,
            contradictions,
            summary,
        }
    }
}

impl Default for ContradictionDetector {
    fn default() -> Self {
        Self::new()
    }
}

// ── Text helpers ────────────────────────────────────────────────────────

/// Lowercased content words: punctuation stripped, stopwords and negation
/// markers removed (polarity is judged separately).
pub(crate) fn content_words(statement: &str) -> BTreeSet<String> {
    statement
        .split_whitespace()
        .map(|token| {
            token
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .map(|token| token.strip_suffix("n't").map(str::to_string).unwrap_or(token))
        .filter(|token| !token.is_empty())
        .filter(|token| !STOPWORDS.contains(&token.as_str()))
        .filter(|token| !NEGATION_MARKERS.contains(&token.as_str()))
        .collect()
}

/// Polarity as parity of negation markers: even (including zero) is
/// affirmative, odd is negated.
pub(crate) fn polarity(statement: &str) -> bool {
    let mut negations = 0usize;
    for token in statement.split_whitespace() {
        let token = token
            .trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
            .to_lowercase();
        if NEGATION_MARKERS.contains(&token.as_str()) || token.ends_with("n't") {
            negations += 1;
        }
    }
    negations % 2 == 0
}

fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    intersection / union
}
