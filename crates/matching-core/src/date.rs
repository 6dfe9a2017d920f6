use aegistry_core::{DateValue, PieceType, ScorePiece};

/// Proximity score for one date pair: exact match = 1.0 (including two
/// equal year-only dates — that is an exact match, not a precision
/// mismatch); same year within a month = 0.8; within two years = 0.5;
/// otherwise 0. Full/year-only precision mismatches fall back to
/// year-only comparison at a reduced confidence, since that is the only
/// information both sides actually share.
pub fn date_similarity(a: &DateValue, b: &DateValue) -> f64 {
    if a == b {
        return 1.0;
    }
    match (a, b) {
        (DateValue::Full(da), DateValue::Full(db)) => {
            let day_diff = (*da - *db).num_days().abs();
            if da.year() == db.year() && day_diff <= 31 {
                return 0.8;
            }
            if (da.year() - db.year()).abs() <= 2 {
                return 0.5;
            }
            0.0
        }
        _ => {
            let year_diff = (a.year() - b.year()).abs();
            if year_diff == 0 {
                0.8
            } else if year_diff <= 2 {
                0.5
            } else {
                0.0
            }
        }
    }
}

/// One labeled date-pair comparison: `fieldsCompared = 0` when either
/// side is missing.
fn compare_optional_dates(a: Option<&DateValue>, b: Option<&DateValue>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(date_similarity(a, b)),
        _ => None,
    }
}

/// Aggregates every applicable date pair on an entity (dob/deceased for
/// persons, built/destroyed for aircraft, incorporated/dissolved for
/// companies) into a single `pieceType = "date"` contribution, averaged
/// over the pairs where both sides had a value.
pub fn compare_date_pairs(pairs: &[(Option<&DateValue>, Option<&DateValue>)], weight: f64) -> ScorePiece {
    let scores: Vec<f64> = pairs
        .iter()
        .filter_map(|(a, b)| compare_optional_dates(*a, *b))
        .collect();

    if scores.is_empty() {
        return ScorePiece::empty(PieceType::Date, weight);
    }

    let avg = scores.iter().sum::<f64>() / scores.len() as f64;
    ScorePiece::new(avg, weight, scores.len() as u32, PieceType::Date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn exact_full_dates_score_one() {
        let d = DateValue::Full(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
        assert_eq!(date_similarity(&d, &d), 1.0);
    }

    #[test]
    fn same_year_within_month_scores_point_eight() {
        let a = DateValue::Full(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
        let b = DateValue::Full(NaiveDate::from_ymd_opt(1970, 1, 20).unwrap());
        assert_eq!(date_similarity(&a, &b), 0.8);
    }

    #[test]
    fn equal_year_only_dates_score_one() {
        let a = DateValue::YearOnly(1970);
        let b = DateValue::YearOnly(1970);
        assert_eq!(date_similarity(&a, &b), 1.0);
    }

    #[test]
    fn full_vs_year_only_same_year_is_a_precision_mismatch_not_exact() {
        let a = DateValue::Full(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
        let b = DateValue::YearOnly(1970);
        assert_eq!(date_similarity(&a, &b), 0.8);
    }

    #[test]
    fn within_two_years_scores_point_five() {
        let a = DateValue::YearOnly(1970);
        let b = DateValue::YearOnly(1972);
        assert_eq!(date_similarity(&a, &b), 0.5);
    }

    #[test]
    fn far_apart_scores_zero() {
        let a = DateValue::YearOnly(1970);
        let b = DateValue::YearOnly(1990);
        assert_eq!(date_similarity(&a, &b), 0.0);
    }

    #[test]
    fn missing_side_yields_empty_piece() {
        let piece = compare_date_pairs(&[(None, None)], 15.0);
        assert_eq!(piece.fields_compared, 0);
    }
}
