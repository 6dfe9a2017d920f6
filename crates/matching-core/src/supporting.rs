use std::collections::HashSet;

use aegistry_core::{HistoricalInfo, PieceType, SanctionsInfo, ScorePiece};

/// `None` when there is nothing to compare (both sides empty) *or* when
/// the computed overlap is zero — per §4.7 a zero contribution is
/// excluded from the average entirely, not folded in as a `0.0`.
fn jaccard<T: std::hash::Hash + Eq>(a: &HashSet<T>, b: &HashSet<T>) -> Option<f64> {
    if a.is_empty() && b.is_empty() {
        return None;
    }
    let intersection = a.intersection(b).count();
    if intersection == 0 {
        return None;
    }
    let union = a.union(b).count();
    Some(intersection as f64 / union as f64)
}

fn programs_jaccard(query: &SanctionsInfo, index: &SanctionsInfo) -> Option<f64> {
    let a: HashSet<String> = query.programs.iter().map(|p| p.to_lowercase()).collect();
    let b: HashSet<String> = index.programs.iter().map(|p| p.to_lowercase()).collect();
    jaccard(&a, &b)
}

fn historical_jaccard(query: &[HistoricalInfo], index: &[HistoricalInfo]) -> Option<f64> {
    let a: HashSet<(String, String)> = query
        .iter()
        .map(|h| (h.info_type.to_lowercase(), h.value.to_lowercase()))
        .collect();
    let b: HashSet<(String, String)> = index
        .iter()
        .map(|h| (h.info_type.to_lowercase(), h.value.to_lowercase()))
        .collect();
    jaccard(&a, &b)
}

/// Combines sanctions-program overlap and historical-info overlap into
/// one `pieceType = "supporting"` contribution. Averages only the
/// non-zero contributions — a side with nothing to compare, or a
/// component whose overlap computed to zero, is excluded rather than
/// counted as a zero.
pub fn compare_supporting_info(
    query_sanctions: &SanctionsInfo,
    index_sanctions: &SanctionsInfo,
    query_historical: &[HistoricalInfo],
    index_historical: &[HistoricalInfo],
    weight: f64,
) -> ScorePiece {
    let contributions: Vec<f64> = [
        programs_jaccard(query_sanctions, index_sanctions),
        historical_jaccard(query_historical, index_historical),
    ]
    .into_iter()
    .flatten()
    .collect();

    if contributions.is_empty() {
        return ScorePiece::empty(PieceType::Supporting, weight);
    }

    let avg = contributions.iter().sum::<f64>() / contributions.len() as f64;
    ScorePiece::new(avg, weight, contributions.len() as u32, PieceType::Supporting)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanctions(programs: &[&str]) -> SanctionsInfo {
        SanctionsInfo {
            programs: programs.iter().map(|s| s.to_string()).collect(),
            secondary: false,
            description: None,
        }
    }

    #[test]
    fn identical_programs_score_one() {
        let s = sanctions(&["SDGT", "SDNTK"]);
        let piece = compare_supporting_info(&s, &s.clone(), &[], &[], 15.0);
        assert_eq!(piece.score, 1.0);
        assert!(piece.exact);
    }

    #[test]
    fn disjoint_programs_with_nothing_else_to_compare_yields_empty_piece() {
        let a = sanctions(&["SDGT"]);
        let b = sanctions(&["CAATSA"]);
        let piece = compare_supporting_info(&a, &b, &[], &[], 15.0);
        assert_eq!(piece.fields_compared, 0);
        assert_eq!(piece.score, 0.0);
    }

    #[test]
    fn disjoint_programs_do_not_drag_down_a_matching_historical_contribution() {
        let a = sanctions(&["SDGT"]);
        let b = sanctions(&["CAATSA"]);
        let hist = vec![HistoricalInfo {
            info_type: "AKA".to_string(),
            value: "shell corp".to_string(),
            date: None,
        }];
        let piece = compare_supporting_info(&a, &b, &hist, &hist.clone(), 15.0);
        assert_eq!(piece.fields_compared, 1);
        assert_eq!(piece.score, 1.0);
    }

    #[test]
    fn both_empty_yields_empty_piece() {
        let a = sanctions(&[]);
        let piece = compare_supporting_info(&a, &a.clone(), &[], &[], 15.0);
        assert_eq!(piece.fields_compared, 0);
    }

    #[test]
    fn historical_info_jaccard_contributes_independently() {
        let a = sanctions(&[]);
        let hist = vec![HistoricalInfo {
            info_type: "AKA".to_string(),
            value: "shell corp".to_string(),
            date: None,
        }];
        let piece = compare_supporting_info(&a, &a.clone(), &hist, &hist.clone(), 15.0);
        assert_eq!(piece.score, 1.0);
    }
}
