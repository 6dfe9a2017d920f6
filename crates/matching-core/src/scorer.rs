use aegistry_core::{
    Entity, Phase, PieceType, ResolvedConfig, ScoreBreakdown, ScorePiece, ScoringContext,
};
use serde_json::json;

use crate::address::compare_addresses;
use crate::date::compare_date_pairs;
use crate::exact::{compare_contact_info, compare_crypto_addresses, compare_government_ids};
use crate::name::{compare_alt_names, compare_primary_names};
use crate::supporting::compare_supporting_info;

/// Zeroes out a piece's score/matched/exact while preserving its weight,
/// field count, and tag — used when the aggregator's max-of-two rule
/// picks the other piece instead.
fn zeroed(piece: ScorePiece) -> ScorePiece {
    ScorePiece {
        score: 0.0,
        matched: false,
        exact: false,
        ..piece
    }
}

fn weight_if(enabled: bool, weight: f64) -> f64 {
    if enabled {
        weight
    } else {
        0.0
    }
}

fn dates_for(entity: &Entity) -> Vec<Option<&aegistry_core::DateValue>> {
    use aegistry_core::SubRecord;
    match &entity.sub_record {
        SubRecord::Person(p) => vec![p.dob.as_ref(), p.deceased.as_ref()],
        SubRecord::Business(c) | SubRecord::Organization(c) => {
            vec![c.incorporated.as_ref(), c.dissolved.as_ref()]
        }
        SubRecord::Aircraft(a) => vec![a.built.as_ref(), a.destroyed.as_ref()],
        SubRecord::Vessel(_) | SubRecord::Unknown => vec![],
    }
}

fn date_pairs<'a>(
    query: &'a Entity,
    candidate: &'a Entity,
) -> Vec<(Option<&'a aegistry_core::DateValue>, Option<&'a aegistry_core::DateValue>)> {
    let q_dates = dates_for(query);
    let c_dates = dates_for(candidate);
    q_dates.into_iter().zip(c_dates).collect()
}

/// Runs the fixed 9-phase comparator pipeline for one (query,
/// candidate) pair and combines the resulting pieces into a weighted
/// total. `InvalidInput` (a `sub_record` that doesn't match the
/// declared `entity_type`) is scored as zero without running the
/// pipeline at all.
pub fn score(query: &Entity, candidate: &Entity, config: &ResolvedConfig, ctx: &mut ScoringContext) -> ScoreBreakdown {
    if !query.is_type_consistent() || !candidate.is_type_consistent() {
        ctx.record(
            Phase::Normalization,
            "invalid input: sub_record does not match entity_type",
            serde_json::Map::new(),
        );
        return ScoreBreakdown::zero();
    }

    ctx.traced(Phase::Normalization, "normalize query/candidate names", || {
        // Normalization happens lazily inside each comparator; this phase
        // exists to preserve pipeline-order tracing even though there is
        // no separate eager normalization step to run here.
    });

    let name_weight = weight_if(config.scoring.name_enabled, config.scoring.name_weight);
    let p_name = ctx.traced(Phase::NameComparison, "compare primary names", || {
        compare_primary_names(&query.name, &candidate.name, name_weight, &config.similarity)
    });

    let alt_weight = weight_if(config.scoring.alt_names_enabled, config.scoring.name_weight);
    let p_alt = ctx.traced(Phase::AltNameComparison, "compare alt names", || {
        compare_alt_names(
            &query.name,
            query.alt_names(),
            &candidate.name,
            candidate.alt_names(),
            alt_weight,
            &config.similarity,
        )
    });

    // Effective name contribution is the max of p_name/p_alt at a single
    // weight: zero out whichever scored lower so aggregation
    // below sums each component at most once.
    let (p_name, p_alt) = if p_name.score >= p_alt.score {
        (p_name, zeroed(p_alt))
    } else {
        (zeroed(p_name), p_alt)
    };

    let gid_weight = weight_if(config.scoring.government_id_enabled, config.scoring.critical_id_weight);
    let p_gid = ctx.traced(Phase::GovIdComparison, "compare government ids", || {
        compare_government_ids(query.government_ids(), candidate.government_ids(), gid_weight)
    });

    let crypto_weight = weight_if(config.scoring.crypto_enabled, config.scoring.critical_id_weight);
    let p_crypto = ctx.traced(Phase::CryptoComparison, "compare crypto addresses", || {
        compare_crypto_addresses(&query.crypto_addresses, &candidate.crypto_addresses, crypto_weight)
    });

    let contact_weight = weight_if(config.scoring.contact_enabled, config.scoring.critical_id_weight);
    let p_contact = ctx.traced(Phase::ContactComparison, "compare contact info", || {
        compare_contact_info(&query.contact, &candidate.contact, contact_weight)
    });

    let addr_weight = weight_if(config.scoring.address_enabled, config.scoring.address_weight);
    let p_addr = ctx.traced(Phase::AddressComparison, "compare addresses", || {
        compare_addresses(&query.addresses, &candidate.addresses, addr_weight, &config.similarity)
    });

    let date_weight = weight_if(config.scoring.date_enabled, config.scoring.supporting_info_weight);
    let p_date = ctx.traced(Phase::DateComparison, "compare dates", || {
        let pairs = date_pairs(query, candidate);
        compare_date_pairs(&pairs, date_weight)
    });

    let p_sup = ctx.traced(Phase::SupportingInfo, "compare supporting info", || {
        compare_supporting_info(
            &query.sanctions_info,
            &candidate.sanctions_info,
            &query.historical_info,
            &candidate.historical_info,
            config.scoring.supporting_info_weight,
        )
    });

    let pieces = vec![p_name, p_alt, p_gid, p_crypto, p_contact, p_addr, p_date, p_sup];

    let mut total = ctx.traced(Phase::Aggregation, "combine weighted pieces", || {
        aggregate(&pieces)
    });

    let exact_id_fires = (pieces[2].exact && pieces[2].piece_type == PieceType::GovernmentId)
        || (pieces[3].exact && pieces[3].piece_type == PieceType::Crypto)
        || (pieces[4].exact && pieces[4].piece_type == PieceType::Contact);

    let effective_name_score = pieces[0].score.max(pieces[1].score);
    if config.scoring.exact_id_short_circuit_enabled && exact_id_fires && effective_name_score >= 0.5 {
        total = total.max(0.9);
        ctx.record(
            Phase::Aggregation,
            "exact id short circuit applied",
            json_object(&[("clamped_to", json!(0.9))]),
        );
    }

    debug_assert!(
        (0.0..=1.0).contains(&total),
        "aggregated score {total} outside [0,1] before clamping"
    );
    if !(0.0..=1.0).contains(&total) {
        tracing::warn!(raw_score = total, "clamping total weighted score into [0,1]");
        ctx.record(
            Phase::Aggregation,
            "total weighted score clamped into [0,1]",
            json_object(&[("raw", json!(total))]),
        );
    }
    let total = total.clamp(0.0, 1.0);

    ScoreBreakdown {
        name_score: pieces[0].score,
        alt_name_score: pieces[1].score,
        government_id_score: pieces[2].score,
        crypto_score: pieces[3].score,
        contact_score: pieces[4].score,
        address_score: pieces[5].score,
        date_score: pieces[6].score,
        supporting_score: pieces[7].score,
        total_weighted_score: total,
        pieces,
    }
}

fn json_object(entries: &[(&str, serde_json::Value)]) -> serde_json::Map<String, serde_json::Value> {
    entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

/// Weighted average over pieces with `weight > 0 && fieldsCompared > 0`.
/// A piece with nothing to compare contributes neither to the
/// numerator nor the denominator.
fn aggregate(pieces: &[ScorePiece]) -> f64 {
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for piece in pieces {
        if piece.weight > 0.0 && piece.fields_compared > 0 {
            numerator += piece.score * piece.weight;
            denominator += piece.weight;
        }
    }
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegistry_core::{
        Address, ContactInfo, DateValue, EntityType, GovernmentId, GovernmentIdType, Person,
        SanctionsInfo, Source, SubRecord,
    };

    fn empty_entity(name: &str) -> Entity {
        Entity {
            id: "e1".to_string(),
            name: name.to_string(),
            entity_type: EntityType::Person,
            source: Source::UsOfac,
            source_id: "1".to_string(),
            sub_record: SubRecord::Person(Person::default()),
            addresses: Vec::new(),
            sanctions_info: SanctionsInfo::default(),
            historical_info: Vec::new(),
            contact: ContactInfo::default(),
            crypto_addresses: Vec::new(),
            affiliations: Vec::new(),
        }
    }

    #[test]
    fn s1_self_match_scores_at_least_point_nine_nine() {
        let e = empty_entity("WEI, Zhao");
        let config = ResolvedConfig::default();
        let mut ctx = ScoringContext::disabled();
        let breakdown = score(&e, &e, &config, &mut ctx);
        assert!(breakdown.total_weighted_score >= 0.99, "{}", breakdown.total_weighted_score);
        assert_eq!(breakdown.name_score, 1.0);
    }

    #[test]
    fn invalid_input_scores_zero() {
        let mut e = empty_entity("John Doe");
        e.entity_type = EntityType::Business;
        let candidate = empty_entity("John Doe");
        let config = ResolvedConfig::default();
        let mut ctx = ScoringContext::disabled();
        let breakdown = score(&e, &candidate, &config, &mut ctx);
        assert_eq!(breakdown.total_weighted_score, 0.0);
    }

    #[test]
    fn s5_exact_gov_id_short_circuits_total() {
        let id = GovernmentId {
            id_type: GovernmentIdType::Cedula,
            country: "VE".to_string(),
            identifier: "5892464".to_string(),
        };
        let mut query = empty_entity("Nicolas Maduro");
        query.sub_record = SubRecord::Person(Person {
            government_ids: vec![id.clone()],
            ..Person::default()
        });
        let mut candidate = empty_entity("Nicolas Maduro");
        candidate.sub_record = SubRecord::Person(Person {
            government_ids: vec![id],
            ..Person::default()
        });

        let config = ResolvedConfig::default();
        let mut ctx = ScoringContext::disabled();
        let breakdown = score(&query, &candidate, &config, &mut ctx);
        assert!(breakdown.total_weighted_score >= 0.99);
        assert!(breakdown.pieces[2].exact);
    }

    #[test]
    fn s8_disabling_address_zeroes_its_weight() {
        let mut query = empty_entity("John Doe");
        query.addresses = vec![Address {
            line1: Some("1 Main St".to_string()),
            line2: None,
            city: Some("Havana".to_string()),
            state: None,
            postal_code: None,
            country: Some("CU".to_string()),
        }];
        let candidate = Entity {
            addresses: query.addresses.clone(),
            ..empty_entity("John Doe")
        };

        let mut config = ResolvedConfig::default();
        config.scoring.address_enabled = false;
        let mut ctx = ScoringContext::disabled();
        let breakdown = score(&query, &candidate, &config, &mut ctx);
        assert_eq!(breakdown.pieces[5].weight, 0.0);
    }

    #[test]
    fn trace_enabled_and_disabled_produce_identical_breakdowns() {
        let query = empty_entity("John Smith");
        let candidate = empty_entity("Jon Smyth");
        let config = ResolvedConfig::default();

        let mut disabled_ctx = ScoringContext::disabled();
        let disabled = score(&query, &candidate, &config, &mut disabled_ctx);

        let mut enabled_ctx = ScoringContext::enabled();
        let enabled = score(&query, &candidate, &config, &mut enabled_ctx);

        assert_eq!(disabled.total_weighted_score, enabled.total_weighted_score);
        assert_eq!(disabled.name_score, enabled.name_score);
    }

    #[test]
    fn date_comparison_considers_dob_and_deceased() {
        let mut query = empty_entity("John Doe");
        query.sub_record = SubRecord::Person(Person {
            dob: Some(DateValue::YearOnly(1970)),
            ..Person::default()
        });
        let mut candidate = empty_entity("John Doe");
        candidate.sub_record = SubRecord::Person(Person {
            dob: Some(DateValue::YearOnly(1970)),
            ..Person::default()
        });

        let config = ResolvedConfig::default();
        let mut ctx = ScoringContext::disabled();
        let breakdown = score(&query, &candidate, &config, &mut ctx);
        assert!(breakdown.date_score > 0.0);
    }

    proptest::proptest! {
        #[test]
        fn total_score_is_bounded_and_deterministic(
            query_name in "[a-z ]{0,20}",
            candidate_name in "[a-z ]{0,20}",
        ) {
            let query = empty_entity(&query_name);
            let candidate = empty_entity(&candidate_name);
            let config = ResolvedConfig::default();

            let mut ctx1 = ScoringContext::disabled();
            let first = score(&query, &candidate, &config, &mut ctx1);
            let mut ctx2 = ScoringContext::disabled();
            let second = score(&query, &candidate, &config, &mut ctx2);

            proptest::prop_assert!((0.0..=1.0).contains(&first.total_weighted_score));
            proptest::prop_assert_eq!(first.total_weighted_score, second.total_weighted_score);
        }
    }
}
