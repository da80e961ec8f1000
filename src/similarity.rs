/// Pluggable scoring strategy, chosen once at weight construction.
///
/// `field_weight` produces the weighted term frequency for one field of one
/// document; `combine` folds the summed field evidence into the final
/// saturating score. `explain_field` must reproduce `field_weight`'s
/// arithmetic exactly, node by node.
use crate::explain::Explain;
use crate::stats::FieldStats;

pub trait Similarity: Send + Sync {
    /// Weighted term frequency for one field:
    /// `freq * boost / ((1 - lb) + lb * decoded_len / avg_len)`.
    fn field_weight(&self, freq: f32, decoded_len: f32, stats: &FieldStats) -> f32;

    /// Combine summed field evidence into the document score:
    /// `term_idf * s / (k1 + s)`, 0 when there is no evidence.
    fn combine(&self, term_idf: f32, k1: f32, field_sum: f32) -> f32;

    /// Explanation tree for one field's contribution, numerically identical
    /// to `field_weight`.
    fn explain_field(&self, freq: f32, decoded_len: f32, stats: &FieldStats) -> Explain;

    /// Name for logging and diagnostics.
    fn name(&self) -> &str;
}

/// The BM25F strategy: per-field boosted term frequency with soft length
/// normalization, saturating combination across fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bm25fSimilarity;

impl Similarity for Bm25fSimilarity {
    fn field_weight(&self, freq: f32, decoded_len: f32, stats: &FieldStats) -> f32 {
        let numerator = freq * stats.boost;
        let denominator = (1.0 - stats.length_boost)
            + stats.length_boost * (decoded_len / stats.avg_field_length);
        numerator / denominator
    }

    fn combine(&self, term_idf: f32, k1: f32, field_sum: f32) -> f32 {
        if field_sum == 0.0 {
            return 0.0;
        }
        term_idf * field_sum / (k1 + field_sum)
    }

    fn explain_field(&self, freq: f32, decoded_len: f32, stats: &FieldStats) -> Explain {
        let field = &stats.field;
        let freq_expl = Explain::leaf(freq, format!("tf in {}", field));
        let boost_expl = Explain::leaf(stats.boost, format!("field boost: {}", field));
        let numerator = Explain::node(
            freq * stats.boost,
            "product of:",
            vec![freq_expl, boost_expl],
        );

        let one_minus_lb = Explain::leaf(
            1.0 - stats.length_boost,
            format!("1 - length boost [{}]", field),
        );
        let length_ratio = Explain::node(
            decoded_len / stats.avg_field_length,
            "length ratio, division of:",
            vec![
                Explain::leaf(decoded_len, "field length"),
                Explain::leaf(stats.avg_field_length, "average field length"),
            ],
        );
        let boosted_ratio = Explain::node(
            stats.length_boost * length_ratio.value(),
            "product of:",
            vec![
                Explain::leaf(stats.length_boost, "length boost"),
                length_ratio,
            ],
        );
        let denominator = Explain::node(
            one_minus_lb.value() + boosted_ratio.value(),
            "sum of:",
            vec![one_minus_lb, boosted_ratio],
        );

        Explain::node(
            numerator.value() / denominator.value(),
            format!("weight({}), division of:", field),
            vec![numerator, denominator],
        )
    }

    fn name(&self) -> &str {
        "bm25f"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(boost: f32, length_boost: f32, avg: f32) -> FieldStats {
        FieldStats {
            field: "title".to_string(),
            idf: 1.0,
            boost,
            length_boost,
            avg_field_length: avg,
            k1: 1.0,
        }
    }

    #[test]
    fn test_field_weight_at_average_length() {
        // freq 1, boost 1, lb 1, len == avg: w = 1 / ((1-1) + 1*1) = 1.
        let sim = Bm25fSimilarity;
        let w = sim.field_weight(1.0, 3.0, &stats(1.0, 1.0, 3.0));
        assert_eq!(w, 1.0);
    }

    #[test]
    fn test_length_boost_zero_ignores_length() {
        // lb = 0 reduces to freq * boost no matter the stored length.
        let sim = Bm25fSimilarity;
        let s = stats(2.0, 0.0, 10.0);
        let short = sim.field_weight(3.0, 1.0, &s);
        let long = sim.field_weight(3.0, 1000.0, &s);
        assert_eq!(short, 6.0);
        assert_eq!(long, 6.0);
    }

    #[test]
    fn test_longer_than_average_scores_lower() {
        let sim = Bm25fSimilarity;
        let s = stats(1.0, 0.75, 10.0);
        assert!(sim.field_weight(2.0, 5.0, &s) > sim.field_weight(2.0, 20.0, &s));
    }

    #[test]
    fn test_combine_saturates_below_idf() {
        let sim = Bm25fSimilarity;
        let idf = 2.5;
        assert_eq!(sim.combine(idf, 1.0, 0.0), 0.0);
        assert_eq!(sim.combine(idf, 1.0, 1.0), idf / 2.0);

        let mut prev = 0.0;
        for s in [0.5f32, 1.0, 4.0, 100.0, 1e6] {
            let score = sim.combine(idf, 1.0, s);
            assert!(score > prev);
            assert!(score < idf);
            prev = score;
        }
    }

    #[test]
    fn test_combine_k1_zero_is_degenerate() {
        // k1 = 0: any evidence at all yields the full term idf.
        let sim = Bm25fSimilarity;
        assert_eq!(sim.combine(2.0, 0.0, 0.25), 2.0);
        assert_eq!(sim.combine(2.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_explain_field_matches_field_weight() {
        let sim = Bm25fSimilarity;
        for (freq, len, s) in [
            (1.0, 3.0, stats(1.0, 1.0, 3.0)),
            (4.0, 12.0, stats(2.5, 0.75, 7.0)),
            (2.0, 100.0, stats(0.5, 0.0, 9.0)),
        ] {
            let expl = sim.explain_field(freq, len, &s);
            let w = sim.field_weight(freq, len, &s);
            assert!(
                (expl.value() - w).abs() <= f32::EPSILON * w.abs().max(1.0),
                "explain {} != weight {}",
                expl.value(),
                w
            );
            // Leaves carry the raw inputs.
            assert_eq!(expl.details()[0].details()[0].value(), freq);
        }
    }
}
