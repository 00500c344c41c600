//! Claim extraction from free text.

use tern_types::Claim;

/// Turns free text into atomic claims.
pub trait ClaimExtractor: Send + Sync {
    /// Extract claims from `text`, tagging each with `source`.
    fn extract(&self, text: &str, source: &str) -> Vec<Claim>;
}

/// Sentence-splitting extractor.
///
/// Splits on sentence terminators, trims, discards fragments below a
/// length floor, and tags every claim with a fixed high confidence. Crude,
/// but the pairwise check downstream only needs sentence-sized units.
pub struct SimpleClaimExtractor {
    /// Minimum fragment length, in characters, to count as a claim.
    min_length: usize,
    /// Confidence assigned to every extracted claim.
    confidence: f64,
}

impl SimpleClaimExtractor {
    pub fn new(min_length: usize, confidence: f64) -> Self {
        Self {
            min_length,
            confidence,
        }
    }
}

impl Default for SimpleClaimExtractor {
    fn default() -> Self {
        Self::new(12, 0.9)
    }
}

impl ClaimExtractor for SimpleClaimExtractor {
    fn extract(&self, text: &str, source: &str) -> Vec<Claim> {
        text.split(['.', '!', '?'])
            .map(str::trim)
            .filter(|fragment| fragment.len() >= self.min_length)
            .map(|fragment| Claim::new(fragment, self.confidence, source))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_sentence_terminators() {
        let extractor = SimpleClaimExtractor::default();
        let claims = extractor.extract(
            "The reactor is stable. Coolant pressure is nominal! Is the pump running?",
            "model-a",
        );
        assert_eq!(claims.len(), 3);
        assert_eq!(claims[0].statement, "The reactor is stable");
        assert!(claims.iter().all(|c| c.source == "model-a"));
        assert!(claims.iter().all(|c| (c.confidence - 0.9).abs() < 1e-9));
    }

    #[test]
    fn discards_short_fragments() {
        let extractor = SimpleClaimExtractor::default();
        let claims = extractor.extract("Ok. Yes. The deployment completed without errors.", "m");
        assert_eq!(claims.len(), 1);
        assert!(claims[0].statement.contains("deployment"));
    }

    #[test]
    fn empty_text_yields_no_claims() {
        let extractor = SimpleClaimExtractor::default();
        assert!(extractor.extract("", "m").is_empty());
        assert!(extractor.extract("   ", "m").is_empty());
    }
}
