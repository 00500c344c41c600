//! Confidence-gated response pipeline.
//!
//! Buckets, routes, filters, and aggregates confidence-scored responses
//! using the same Form algebra as the gate: a low-confidence or uncertain
//! response is never silently outvoted.

use tracing::debug;

use tern_types::{Form, LlmResponse};

use crate::contradiction::polarity;
use crate::error::{CoherenceError, CoherenceResult};

/// Stateless confidence-pipeline operations.
pub struct ConfidencePipeline;

impl ConfidencePipeline {
    /// Pass the response through only if its confidence clears the
    /// threshold.
    pub fn gate_by_confidence(response: LlmResponse, threshold: f64) -> Option<LlmResponse> {
        if response.confidence >= threshold {
            Some(response)
        } else {
            None
        }
    }

    /// Three-way dispatch by confidence bucket.
    pub fn route_by_confidence<T>(
        response: &LlmResponse,
        on_high: impl FnOnce(&LlmResponse) -> T,
        on_low: impl FnOnce(&LlmResponse) -> T,
        on_uncertain: impl FnOnce(&LlmResponse) -> T,
        high: f64,
        low: f64,
    ) -> T {
        match Form::from_confidence(response.confidence, high, low) {
            Form::Mark => on_high(response),
            Form::Void => on_low(response),
            Form::Imaginary => on_uncertain(response),
        }
    }

    /// Keep only responses at or above the threshold, order preserved.
    pub fn filter_by_confidence(responses: Vec<LlmResponse>, threshold: f64) -> Vec<LlmResponse> {
        responses
            .into_iter()
            .filter(|response| response.confidence >= threshold)
            .collect()
    }

    /// Pick the best response if the ensemble clearly agrees it is safe
    /// to pick one.
    ///
    /// Every response's confidence is bucketed through the two-threshold
    /// conversion and the buckets are combined with `Form::all`: a single
    /// denial or open uncertainty blocks consensus rather than being
    /// outvoted. On Mark, the highest-confidence response wins.
    pub fn aggregate_responses(
        responses: &[LlmResponse],
        high: f64,
        low: f64,
    ) -> CoherenceResult<LlmResponse> {
        if responses.is_empty() {
            return Err(CoherenceError::NoResponses);
        }

        let combined = Form::all(
            responses
                .iter()
                .map(|response| Form::from_confidence(response.confidence, high, low)),
        );
        debug!(responses = responses.len(), verdict = %combined, "Aggregation verdict");
        if !combined.is_mark() {
            return Err(CoherenceError::NoClearConsensus(combined));
        }

        let best = responses
            .iter()
            .max_by(|a, b| {
                a.confidence
                    .partial_cmp(&b.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .expect("responses is non-empty");
        Ok(best.clone())
    }

    /// Resolve an ensemble of opinions into one Form via weighted
    /// superposition.
    ///
    /// A response below the low threshold votes Imaginary; otherwise its
    /// textual polarity picks the side and its confidence is the weight.
    pub fn combine_opinions(responses: &[LlmResponse], low: f64) -> Form {
        let opinions: Vec<(Form, f64)> = responses
            .iter()
            .map(|response| {
                let form = if response.confidence < low {
                    Form::Imaginary
                } else if polarity(&response.text) {
                    Form::Mark
                } else {
                    Form::Void
                };
                (form, response.confidence)
            })
            .collect();
        Form::superposition(&opinions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_responses(confidences: &[f64]) -> Vec<LlmResponse> {
        confidences
            .iter()
            .enumerate()
            .map(|(i, c)| LlmResponse::new(format!("response {}", i), *c))
            .collect()
    }

    #[test]
    fn gate_passes_and_blocks() {
        let response = LlmResponse::new("ok", 0.9);
        assert!(ConfidencePipeline::gate_by_confidence(response, 0.8).is_some());
        let response = LlmResponse::new("ok", 0.7);
        assert!(ConfidencePipeline::gate_by_confidence(response, 0.8).is_none());
    }

    #[test]
    fn route_dispatches_by_bucket() {
        let high = LlmResponse::new("x", 0.95);
        let low = LlmResponse::new("x", 0.1);
        let mid = LlmResponse::new("x", 0.5);
        let route = |r: &LlmResponse| {
            ConfidencePipeline::route_by_confidence(
                r,
                |_| "high",
                |_| "low",
                |_| "uncertain",
                0.8,
                0.3,
            )
        };
        assert_eq!(route(&high), "high");
        assert_eq!(route(&low), "low");
        assert_eq!(route(&mid), "uncertain");
    }

    #[test]
    fn filter_preserves_order() {
        let responses = make_responses(&[0.9, 0.5, 0.85]);
        let kept = ConfidencePipeline::filter_by_confidence(responses, 0.8);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].confidence, 0.9);
        assert_eq!(kept[1].confidence, 0.85);
    }

    #[test]
    fn aggregate_empty_is_no_responses() {
        let result = ConfidencePipeline::aggregate_responses(&[], 0.8, 0.3);
        assert!(matches!(result, Err(CoherenceError::NoResponses)));
    }

    #[test]
    fn aggregate_split_ensemble_has_no_consensus() {
        let responses = make_responses(&[0.9, 0.2]);
        let result = ConfidencePipeline::aggregate_responses(&responses, 0.8, 0.3);
        match result {
            Err(CoherenceError::NoClearConsensus(_)) => {}
            other => panic!("expected NoClearConsensus, got {:?}", other.map(|r| r.confidence)),
        }
    }

    #[test]
    fn aggregate_agreeing_ensemble_picks_best() {
        let responses = make_responses(&[0.85, 0.95, 0.9]);
        let best = ConfidencePipeline::aggregate_responses(&responses, 0.8, 0.3).unwrap();
        assert_eq!(best.confidence, 0.95);
    }

    #[test]
    fn aggregate_uncertain_member_blocks_consensus() {
        let responses = make_responses(&[0.9, 0.6]);
        let result = ConfidencePipeline::aggregate_responses(&responses, 0.8, 0.3);
        assert!(matches!(result, Err(CoherenceError::NoClearConsensus(Form::Imaginary))));
    }

    #[test]
    fn combine_opinions_weighted_majority() {
        let responses = vec![
            LlmResponse::new("the rollout is safe to proceed", 0.9),
            LlmResponse::new("the rollout is not safe to proceed", 0.2),
        ];
        assert_eq!(ConfidencePipeline::combine_opinions(&responses, 0.1), Form::Mark);
    }

    #[test]
    fn combine_opinions_low_confidence_votes_imaginary() {
        let responses = vec![
            LlmResponse::new("the rollout is safe to proceed", 0.9),
            LlmResponse::new("unsure", 0.05),
        ];
        assert_eq!(
            ConfidencePipeline::combine_opinions(&responses, 0.1),
            Form::Imaginary,
        );
    }

    #[test]
    fn combine_opinions_empty_is_imaginary() {
        assert_eq!(ConfidencePipeline::combine_opinions(&[], 0.1), Form::Imaginary);
    }
}
