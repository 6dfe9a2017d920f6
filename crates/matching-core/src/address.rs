use aegistry_core::{Address, PieceType, ScorePiece, SimilarityConfig};

use crate::name::jaro_winkler;

/// Compares one query/index address pair: country is an exact-equality
/// gate (weight 0 when both present and differ); street/city/state/
/// postal are Jaro-Winkler similarities. The pair score is a weighted
/// average over fields present on both sides; fields missing on either
/// side do not count toward the average.
pub fn compare_address_pair(query: &Address, index: &Address, config: &SimilarityConfig) -> (f64, u32) {
    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;
    let mut fields_compared = 0u32;

    if let (Some(qc), Some(ic)) = (&query.country, &index.country) {
        fields_compared += 1;
        let gate = if qc.eq_ignore_ascii_case(ic) { 1.0 } else { 0.0 };
        weighted_sum += gate * 2.0;
        weight_sum += 2.0;
    }

    let text_fields: [(Option<&String>, Option<&String>); 4] = [
        (query.line1.as_ref(), index.line1.as_ref()),
        (query.city.as_ref(), index.city.as_ref()),
        (query.state.as_ref(), index.state.as_ref()),
        (query.postal_code.as_ref(), index.postal_code.as_ref()),
    ];

    for (q, i) in text_fields {
        if let (Some(q), Some(i)) = (q, i) {
            fields_compared += 1;
            let sim = jaro_winkler(q, i, config);
            weighted_sum += sim;
            weight_sum += 1.0;
        }
    }

    if weight_sum == 0.0 {
        return (0.0, 0);
    }

    (weighted_sum / weight_sum, fields_compared)
}

/// Address component for the aggregator: max score over the
/// cross-product of query/index addresses, returned as
/// `pieceType = "address"`.
pub fn compare_addresses(
    query: &[Address],
    index: &[Address],
    weight: f64,
    config: &SimilarityConfig,
) -> ScorePiece {
    if query.is_empty() || index.is_empty() {
        return ScorePiece::empty(PieceType::Address, weight);
    }

    let mut best_score = 0.0f64;
    let mut best_fields = 0u32;

    for q in query {
        for i in index {
            let (score, fields) = compare_address_pair(q, i, config);
            if fields > 0 && score > best_score {
                best_score = score;
                best_fields = fields;
            }
        }
    }

    if best_fields == 0 {
        return ScorePiece::empty(PieceType::Address, weight);
    }

    ScorePiece::new(best_score, weight, best_fields, PieceType::Address)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(country: &str, city: &str) -> Address {
        Address {
            line1: None,
            line2: None,
            city: Some(city.to_string()),
            state: None,
            postal_code: None,
            country: Some(country.to_string()),
        }
    }

    #[test]
    fn same_country_and_city_scores_high() {
        let cfg = SimilarityConfig::default();
        let piece = compare_addresses(&[addr("VE", "Caracas")], &[addr("VE", "Caracas")], 25.0, &cfg);
        assert!(piece.score > 0.9);
    }

    #[test]
    fn differing_countries_gate_to_zero_contribution() {
        let cfg = SimilarityConfig::default();
        let (score, fields) = compare_address_pair(&addr("VE", "Caracas"), &addr("US", "Caracas"), &cfg);
        assert_eq!(fields, 2);
        assert!(score < 0.6);
    }

    #[test]
    fn no_addresses_yields_empty_piece() {
        let cfg = SimilarityConfig::default();
        let piece = compare_addresses(&[], &[], 25.0, &cfg);
        assert_eq!(piece.fields_compared, 0);
    }
}
