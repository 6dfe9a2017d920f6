use aegistry_core::{PieceType, ScorePiece, SimilarityConfig};

use crate::normalize::normalize;
use crate::phonetic::phonetically_compatible;

fn common_prefix_len(a: &[char], b: &[char], max_len: usize) -> usize {
    a.iter()
        .zip(b.iter())
        .take(max_len)
        .take_while(|(x, y)| x == y)
        .count()
}

/// Multiset difference of letters between two strings: sum over letters
/// of `|count_in_a - count_in_b|`, used for the different-letter
/// penalty.
fn letter_multiset_diff(a: &[char], b: &[char]) -> usize {
    let mut counts = std::collections::HashMap::new();
    for &c in a {
        *counts.entry(c).or_insert(0i64) += 1;
    }
    for &c in b {
        *counts.entry(c).or_insert(0i64) -= 1;
    }
    counts.values().map(|v| v.unsigned_abs() as usize).sum()
}

/// True when every token of `smaller` appears in `larger` — the
/// "differs only by removing matched tokens" relationship from
/// step 7, expressed as a token-set subset test.
fn is_token_subset(smaller: &str, larger: &str) -> bool {
    let larger_tokens: std::collections::HashSet<&str> = larger.split_whitespace().collect();
    smaller
        .split_whitespace()
        .all(|t| larger_tokens.contains(t))
}

/// Jaro-Winkler similarity on two already-normalized strings, with the
/// length-difference and different-letter penalties and exact-match
/// favoritism layered on top of the base Jaro score. This is the full
/// single-string comparison contract; callers pass pre-normalized text.
pub fn jaro_winkler_similarity(norm_a: &str, norm_b: &str, config: &SimilarityConfig) -> f64 {
    if norm_a == norm_b {
        return 1.0;
    }
    if norm_a.is_empty() || norm_b.is_empty() {
        return 0.0;
    }

    let a: Vec<char> = norm_a.chars().collect();
    let b: Vec<char> = norm_b.chars().collect();

    // Base Jaro score comes from `strsim`, already an `aegistry` workspace
    // dependency; the Winkler bonus and the length/letter penalties and
    // favoritism below are layered on top since `strsim::jaro_winkler`
    // hard-codes a prefix size and boost threshold this comparator needs
    // to keep configurable.
    let jaro_score = strsim::jaro(norm_a, norm_b);

    let mut score = jaro_score;
    if jaro_score >= config.jaro_winkler_boost_threshold {
        let prefix = common_prefix_len(&a, &b, config.jaro_winkler_prefix_size as usize);
        score += prefix as f64 * 0.1 * (1.0 - jaro_score);
    }

    let (shorter, longer) = if a.len() <= b.len() { (a.len(), b.len()) } else { (b.len(), a.len()) };
    let r = shorter as f64 / longer as f64;
    score *= 1.0 - (1.0 - r) * config.length_difference_penalty_weight;
    if longer as f64 / shorter as f64 > config.length_difference_cutoff_factor {
        score = score.min(0.5);
    }

    let diff = letter_multiset_diff(&a, &b);
    score *= 1.0 - (diff as f64 / longer as f64) * config.different_letter_penalty_weight;

    if is_token_subset(norm_a, norm_b) || is_token_subset(norm_b, norm_a) {
        score = (score + config.exact_match_favoritism).min(1.0);
    }

    score.clamp(0.0, 1.0)
}

/// Public single-string comparator: normalizes both sides, applies the
/// phonetic pre-filter, then [`jaro_winkler_similarity`].
pub fn jaro_winkler(a: &str, b: &str, config: &SimilarityConfig) -> f64 {
    let norm_a = normalize(a, config);
    let norm_b = normalize(b, config);

    if !phonetically_compatible(&norm_a, &norm_b, config.phonetic_filtering_disabled) {
        return 0.0;
    }

    jaro_winkler_similarity(&norm_a, &norm_b, config)
}

/// Order-independent bag-of-tokens matcher: assigns each query token to
/// its best-remaining index token by descending pair score (greedy,
/// sorted by content rather than position so permuting either input's
/// token order never changes the result), averages matched pair scores,
/// and subtracts a penalty for unmatched index tokens.
pub fn tokenized_similarity(a: &str, b: &str, config: &SimilarityConfig) -> f64 {
    let norm_a = normalize(a, config);
    let norm_b = normalize(b, config);

    let tokens_a: Vec<&str> = norm_a.split_whitespace().collect();
    let tokens_b: Vec<&str> = norm_b.split_whitespace().collect();

    if tokens_a.is_empty() && tokens_b.is_empty() {
        return 1.0;
    }
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    // All pairs, sorted by (score desc, then content) so the greedy
    // assignment below is a pure function of the token multisets, not
    // of their original positions.
    let mut pairs: Vec<(usize, usize, f64)> = Vec::with_capacity(tokens_a.len() * tokens_b.len());
    for (i, ta) in tokens_a.iter().enumerate() {
        for (j, tb) in tokens_b.iter().enumerate() {
            let s = jaro_winkler_similarity(ta, tb, config);
            pairs.push((i, j, s));
        }
    }
    pairs.sort_by(|x, y| {
        y.2.partial_cmp(&x.2)
            .unwrap()
            .then_with(|| tokens_a[x.0].cmp(tokens_a[y.0]))
            .then_with(|| tokens_b[x.1].cmp(tokens_b[y.1]))
    });

    let mut used_a = vec![false; tokens_a.len()];
    let mut used_b = vec![false; tokens_b.len()];
    let mut matched_scores = Vec::new();

    for (i, j, s) in pairs {
        if used_a[i] || used_b[j] {
            continue;
        }
        used_a[i] = true;
        used_b[j] = true;
        matched_scores.push(s);
    }

    let mean: f64 = matched_scores.iter().sum::<f64>() / matched_scores.len() as f64;
    let unmatched_b = used_b.iter().filter(|u| !**u).count();
    let penalty = if !tokens_b.is_empty() {
        (unmatched_b as f64 / tokens_b.len() as f64) * config.unmatched_index_token_weight
    } else {
        0.0
    };

    (mean - penalty).clamp(0.0, 1.0)
}

/// Name-score contribution for one comparator direction: max over the
/// query's primary+alts against the index's primary+alts, via the
/// tokenized matcher (which subsumes a plain `jaro_winkler` call for
/// single-token names).
fn best_cross_product_score(query_names: &[&str], index_names: &[&str], config: &SimilarityConfig) -> f64 {
    let mut best = 0.0f64;
    for q in query_names {
        for i in index_names {
            let s = tokenized_similarity(q, i, config);
            if s > best {
                best = s;
            }
        }
    }
    best
}

/// Primary-name-only comparison, returned as `pieceType = "name"`.
pub fn compare_primary_names(query_name: &str, index_name: &str, weight: f64, config: &SimilarityConfig) -> ScorePiece {
    if query_name.is_empty() || index_name.is_empty() {
        return ScorePiece::empty(PieceType::Name, weight);
    }
    let score = tokenized_similarity(query_name, index_name, config);
    ScorePiece::new(score, weight, 1, PieceType::Name)
}

/// Alt-name comparison: best score over the full cross-product of
/// (query primary + query alts) against (index primary + index alts),
/// returned as `pieceType = "alt-name"`. When neither side has alt
/// names this naturally degenerates to the primary/primary pair, but
/// `fieldsCompared = 0` so it drops out of aggregation — callers are
/// not meant to double-count it against the primary comparison.
pub fn compare_alt_names(
    query_name: &str,
    query_alts: &[String],
    index_name: &str,
    index_alts: &[String],
    weight: f64,
    config: &SimilarityConfig,
) -> ScorePiece {
    if query_alts.is_empty() && index_alts.is_empty() {
        return ScorePiece::empty(PieceType::AltName, weight);
    }

    let mut query_all: Vec<&str> = vec![query_name];
    query_all.extend(query_alts.iter().map(String::as_str));
    let mut index_all: Vec<&str> = vec![index_name];
    index_all.extend(index_alts.iter().map(String::as_str));

    let score = best_cross_product_score(&query_all, &index_all, config);
    ScorePiece::new(score, weight, 1, PieceType::AltName)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> SimilarityConfig {
        SimilarityConfig::default()
    }

    #[test]
    fn s1_exact_match_scores_one() {
        let score = jaro_winkler("WEI, Zhao", "WEI, Zhao", &cfg());
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn s2_elvin_elvis_is_approximately_point_nine_two() {
        let score = jaro_winkler("elvin", "elvis", &cfg());
        assert!((score - 0.92).abs() < 0.03, "got {score}");
    }

    #[test]
    fn s3_phonetic_filter_rejects_incompatible_pair() {
        let norm_a = normalize("ian mckinley", &cfg());
        let norm_b = normalize("tian xiang 7", &cfg());
        assert!(!phonetically_compatible(&norm_a, &norm_b, false));
        assert_eq!(jaro_winkler("ian mckinley", "tian xiang 7", &cfg()), 0.0);
    }

    #[test]
    fn s4_tokenized_similarity_is_order_independent() {
        let score = tokenized_similarity("john smith", "smith john", &cfg());
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn tokenized_similarity_permutation_invariant_three_tokens() {
        let c = cfg();
        let a1 = tokenized_similarity("maria de la cruz", "cruz maria de la", &c);
        let a2 = tokenized_similarity("de la cruz maria", "la cruz de maria", &c);
        assert!((a1 - a2).abs() < 1e-9);
    }

    #[test]
    fn empty_names_yield_empty_piece() {
        let piece = compare_primary_names("", "anything", 35.0, &cfg());
        assert_eq!(piece.fields_compared, 0);
        assert_eq!(piece.score, 0.0);
    }

    #[test]
    fn alt_names_absent_on_both_sides_has_zero_fields_compared() {
        let piece = compare_alt_names("John Doe", &[], "John Doe", &[], 35.0, &cfg());
        assert_eq!(piece.fields_compared, 0);
    }

    #[test]
    fn alt_names_cross_product_finds_best_pair() {
        let piece = compare_alt_names(
            "John Doe",
            &["Johnny Doe".to_string()],
            "Jon Doe",
            &[],
            35.0,
            &cfg(),
        );
        assert!(piece.score > 0.9);
    }

    proptest::proptest! {
        #[test]
        fn jaro_winkler_is_bounded_and_deterministic(
            a in "[a-z ]{0,20}",
            b in "[a-z ]{0,20}",
        ) {
            let c = cfg();
            let score_once = jaro_winkler(&a, &b, &c);
            let score_twice = jaro_winkler(&a, &b, &c);
            proptest::prop_assert!((0.0..=1.0).contains(&score_once));
            proptest::prop_assert_eq!(score_once, score_twice);
        }

        #[test]
        fn tokenized_similarity_ignores_token_order(
            tokens in proptest::collection::vec("[a-z]{2,8}", 1..4),
            other in "[a-z ]{0,20}",
            rotate_seed in 0u32..24,
        ) {
            let c = cfg();
            let original_order = tokens.join(" ");
            let mut permuted = tokens.clone();
            // deterministic pseudo-shuffle: rotate by the seed, no RNG needed.
            let rotate_by = (rotate_seed as usize) % permuted.len().max(1);
            permuted.rotate_left(rotate_by);
            let permuted_order = permuted.join(" ");

            let baseline = tokenized_similarity(&original_order, &other, &c);
            let permuted_score = tokenized_similarity(&permuted_order, &other, &c);
            proptest::prop_assert!((baseline - permuted_score).abs() < 1e-9);
        }
    }
}
