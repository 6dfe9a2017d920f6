use std::collections::HashSet;

use aegistry_core::{ContactInfo, CryptoAddress, GovernmentId, PieceType, ScorePiece};

/// Case-folds and strips whitespace/hyphens, e.g. `"AB 12-34 C"` →
/// `"ab1234c"`.
pub fn normalize_identifier(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

fn government_id_key(id: &GovernmentId) -> (String, String, String) {
    (
        id.country.to_lowercase(),
        format!("{:?}", id.id_type).to_lowercase(),
        normalize_identifier(&id.identifier),
    )
}

/// At-least-one exact match across the cross-product of `(country,
/// type, identifier)` triples; `score = matches / max(|query|, |index|)`.
pub fn compare_government_ids(query: &[GovernmentId], index: &[GovernmentId], weight: f64) -> ScorePiece {
    if query.is_empty() || index.is_empty() {
        return ScorePiece::empty(PieceType::GovernmentId, weight);
    }

    let index_keys: HashSet<(String, String, String)> = index.iter().map(government_id_key).collect();
    let matches = query
        .iter()
        .map(government_id_key)
        .filter(|k| index_keys.contains(k))
        .count();

    let denom = query.len().max(index.len()) as f64;
    let score = matches as f64 / denom;
    ScorePiece::new_exact_match(score, weight, 1, PieceType::GovernmentId)
}

fn crypto_key(c: &CryptoAddress) -> (String, String) {
    (c.currency.to_lowercase(), c.address.clone())
}

/// Same shape as [`compare_government_ids`]; natural key is
/// `(currency, address)`, case-insensitive on currency only.
pub fn compare_crypto_addresses(query: &[CryptoAddress], index: &[CryptoAddress], weight: f64) -> ScorePiece {
    if query.is_empty() || index.is_empty() {
        return ScorePiece::empty(PieceType::Crypto, weight);
    }

    let index_keys: HashSet<(String, String)> = index.iter().map(crypto_key).collect();
    let matches = query
        .iter()
        .map(crypto_key)
        .filter(|k| index_keys.contains(k))
        .count();

    let denom = query.len().max(index.len()) as f64;
    let score = matches as f64 / denom;
    ScorePiece::new_exact_match(score, weight, 1, PieceType::Crypto)
}

fn field_overlap_score(query: &[String], index: &[String]) -> Option<f64> {
    if query.is_empty() || index.is_empty() {
        return None;
    }
    let index_set: HashSet<String> = index.iter().map(|s| s.to_lowercase()).collect();
    let matches = query.iter().filter(|q| index_set.contains(&q.to_lowercase())).count();
    Some(matches as f64 / query.len().max(index.len()) as f64)
}

/// Case-folded exact match across each contact field set, averaged over
/// only the fields present (non-empty) on both sides.
pub fn compare_contact_info(query: &ContactInfo, index: &ContactInfo, weight: f64) -> ScorePiece {
    let field_scores: Vec<f64> = [
        field_overlap_score(&query.email_addresses, &index.email_addresses),
        field_overlap_score(&query.phone_numbers, &index.phone_numbers),
        field_overlap_score(&query.fax_numbers, &index.fax_numbers),
        field_overlap_score(&query.websites, &index.websites),
    ]
    .into_iter()
    .flatten()
    .collect();

    if field_scores.is_empty() {
        return ScorePiece::empty(PieceType::Contact, weight);
    }

    let score = field_scores.iter().sum::<f64>() / field_scores.len() as f64;
    ScorePiece::new(score, weight, field_scores.len() as u32, PieceType::Contact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegistry_core::GovernmentIdType;

    #[test]
    fn s7_separator_stripping_makes_ids_equal() {
        assert_eq!(normalize_identifier("AB 12-34 C"), normalize_identifier("AB1234C"));
    }

    #[test]
    fn government_id_exact_match_is_flagged_exact() {
        let id = GovernmentId {
            id_type: GovernmentIdType::Cedula,
            country: "VE".to_string(),
            identifier: "5892464".to_string(),
        };
        let piece = compare_government_ids(&[id.clone()], &[id], 50.0);
        assert!(piece.exact);
        assert_eq!(piece.score, 1.0);
    }

    #[test]
    fn government_id_no_overlap_scores_zero() {
        let a = GovernmentId {
            id_type: GovernmentIdType::Passport,
            country: "US".to_string(),
            identifier: "111".to_string(),
        };
        let b = GovernmentId {
            id_type: GovernmentIdType::Passport,
            country: "US".to_string(),
            identifier: "222".to_string(),
        };
        let piece = compare_government_ids(&[a], &[b], 50.0);
        assert_eq!(piece.score, 0.0);
        assert!(!piece.exact);
    }

    #[test]
    fn partial_government_id_overlap_still_reports_matched() {
        let shared = GovernmentId {
            id_type: GovernmentIdType::Passport,
            country: "US".to_string(),
            identifier: "111".to_string(),
        };
        let query_only = GovernmentId {
            id_type: GovernmentIdType::TaxId,
            country: "US".to_string(),
            identifier: "999".to_string(),
        };
        let piece = compare_government_ids(&[shared.clone(), query_only], &[shared], 50.0);
        assert_eq!(piece.score, 0.5);
        assert!(piece.matched);
        assert!(!piece.exact);
    }

    #[test]
    fn missing_ids_on_either_side_yields_empty_piece() {
        let piece = compare_government_ids(&[], &[], 50.0);
        assert_eq!(piece.fields_compared, 0);
    }

    #[test]
    fn contact_info_averages_only_present_fields() {
        let query = ContactInfo {
            email_addresses: vec!["a@example.com".to_string()],
            phone_numbers: vec![],
            fax_numbers: vec![],
            websites: vec![],
        };
        let index = ContactInfo {
            email_addresses: vec!["A@EXAMPLE.COM".to_string()],
            phone_numbers: vec!["555-1234".to_string()],
            fax_numbers: vec![],
            websites: vec![],
        };
        let piece = compare_contact_info(&query, &index, 50.0);
        assert_eq!(piece.fields_compared, 1);
        assert_eq!(piece.score, 1.0);
    }
}
