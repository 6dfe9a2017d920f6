use serde::{Deserialize, Serialize};

/// Tag identifying which comparator produced a [`ScorePiece`].
///
/// The distilled spec calls this a "String tag"; a closed enum expresses
/// the same contract (serializes to a string, via `rename_all`) while
/// keeping every call site exhaustively checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PieceType {
    Name,
    AltName,
    GovernmentId,
    Crypto,
    Contact,
    Address,
    Date,
    Supporting,
}

/// One component's contribution to a match: a score, the weight it was
/// computed under, and enough metadata for the aggregator (and a
/// reviewer reading the breakdown) to judge how much to trust it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScorePiece {
    pub score: f64,
    pub weight: f64,
    pub matched: bool,
    pub exact: bool,
    pub fields_compared: u32,
    pub piece_type: PieceType,
}

impl ScorePiece {
    /// A piece representing "nothing to compare" for the given
    /// component: zero score, zero fields, but the weight it *would*
    /// have carried is preserved for callers that want to report it —
    /// the aggregator only ever sums pieces with `fields_compared > 0`,
    /// so this piece never contributes either way.
    pub fn empty(piece_type: PieceType, weight: f64) -> Self {
        Self {
            score: 0.0,
            weight,
            matched: false,
            exact: false,
            fields_compared: 0,
            piece_type,
        }
    }

    pub fn new(score: f64, weight: f64, fields_compared: u32, piece_type: PieceType) -> Self {
        let score = score.clamp(0.0, 1.0);
        Self {
            score,
            weight,
            matched: score > 0.5,
            exact: score > 0.99,
            fields_compared,
            piece_type,
        }
    }

    /// Variant for `ExactMatcher` components (government IDs, crypto
    /// addresses): §4.4 defines `matched = score > 0` and `exact = score
    /// == 1` for these, unlike the generic `> 0.5` threshold — a partial
    /// match across a cross-product of identifiers (e.g. 1 of 3 triples)
    /// is still a match worth surfacing, not a miss.
    pub fn new_exact_match(score: f64, weight: f64, fields_compared: u32, piece_type: PieceType) -> Self {
        let score = score.clamp(0.0, 1.0);
        Self {
            score,
            weight,
            matched: score > 0.0,
            exact: score >= 1.0,
            fields_compared,
            piece_type,
        }
    }
}

/// Named per-component scores plus the final combined score, returned by
/// a single `score(query, candidate, ...)` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub name_score: f64,
    pub alt_name_score: f64,
    pub government_id_score: f64,
    pub crypto_score: f64,
    pub contact_score: f64,
    pub address_score: f64,
    pub date_score: f64,
    pub supporting_score: f64,
    pub total_weighted_score: f64,
    pub pieces: Vec<ScorePiece>,
}

impl ScoreBreakdown {
    /// The zero breakdown returned for `InvalidInput`: every
    /// component contributes nothing and the total is `0.0`.
    pub fn zero() -> Self {
        Self {
            name_score: 0.0,
            alt_name_score: 0.0,
            government_id_score: 0.0,
            crypto_score: 0.0,
            contact_score: 0.0,
            address_score: 0.0,
            date_score: 0.0,
            supporting_score: 0.0,
            total_weighted_score: 0.0,
            pieces: Vec::new(),
        }
    }
}
