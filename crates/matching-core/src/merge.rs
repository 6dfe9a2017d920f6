use std::collections::HashMap;

use aegistry_core::{
    Address, Affiliation, Aircraft, CompanyRecord, ContactInfo, CryptoAddress, Entity, GovernmentId,
    HistoricalInfo, Person, SanctionsInfo, SubRecord, Vessel,
};

use crate::normalize::normalize;

/// Deduplicates `items` by `key_fn`, preserving the insertion order of
/// each key's first occurrence, and folding later items into earlier
/// ones with `merge_fn` when the key repeats.
///
/// This is the one generic library routine the merge process needs:
/// every sequence field on `Entity` — addresses, government IDs,
/// crypto addresses, affiliations,
/// historical info, and plain string lists — dedupes through this same
/// function with a field-specific key and merge closure.
pub fn dedupe_by_key_and_merge<T, K, F>(items: Vec<T>, key_fn: impl Fn(&T) -> K, merge_fn: F) -> Vec<T>
where
    K: std::hash::Hash + Eq + Clone,
    F: Fn(T, T) -> T,
{
    let mut order: Vec<K> = Vec::new();
    let mut slots: HashMap<K, T> = HashMap::new();

    for item in items {
        let key = key_fn(&item);
        match slots.remove(&key) {
            Some(existing) => {
                slots.insert(key, merge_fn(existing, item));
            }
            None => {
                order.push(key.clone());
                slots.insert(key, item);
            }
        }
    }

    order.into_iter().filter_map(|k| slots.remove(&k)).collect()
}

fn first_non_empty(a: Option<String>, b: Option<String>) -> Option<String> {
    a.filter(|s| !s.is_empty()).or_else(|| b.filter(|s| !s.is_empty()))
}

fn dedupe_strings(a: Vec<String>, b: Vec<String>) -> Vec<String> {
    let mut combined = a;
    combined.extend(b);
    dedupe_by_key_and_merge(combined, |s| s.to_lowercase(), |first, _second| first)
}

fn merge_addresses(a: Vec<Address>, b: Vec<Address>) -> Vec<Address> {
    let mut combined = a;
    combined.extend(b);
    dedupe_by_key_and_merge(
        combined,
        |addr| {
            (
                addr.line1.clone().unwrap_or_default().to_lowercase(),
                addr.line2.clone().unwrap_or_default().to_lowercase(),
            )
        },
        |first, second| Address {
            line1: first_non_empty(first.line1, second.line1),
            line2: first_non_empty(first.line2, second.line2),
            city: first_non_empty(first.city, second.city),
            state: first_non_empty(first.state, second.state),
            postal_code: first_non_empty(first.postal_code, second.postal_code),
            country: first_non_empty(first.country, second.country),
        },
    )
}

fn merge_government_ids(a: Vec<GovernmentId>, b: Vec<GovernmentId>) -> Vec<GovernmentId> {
    let mut combined = a;
    combined.extend(b);
    dedupe_by_key_and_merge(
        combined,
        |id| {
            (
                id.country.to_lowercase(),
                format!("{:?}", id.id_type).to_lowercase(),
                id.identifier.to_lowercase(),
            )
        },
        |first, _second| first,
    )
}

fn merge_crypto_addresses(a: Vec<CryptoAddress>, b: Vec<CryptoAddress>) -> Vec<CryptoAddress> {
    let mut combined = a;
    combined.extend(b);
    dedupe_by_key_and_merge(
        combined,
        |c| (c.currency.to_lowercase(), c.address.clone()),
        |first, _second| first,
    )
}

fn merge_affiliations(a: Vec<Affiliation>, b: Vec<Affiliation>) -> Vec<Affiliation> {
    let mut combined = a;
    combined.extend(b);
    dedupe_by_key_and_merge(
        combined,
        |aff| (aff.entity_name.to_lowercase(), aff.affiliation_type.to_lowercase()),
        |first, second| Affiliation {
            entity_id: first.entity_id.clone().or(second.entity_id),
            ..first
        },
    )
}

fn merge_historical_info(a: Vec<HistoricalInfo>, b: Vec<HistoricalInfo>) -> Vec<HistoricalInfo> {
    let mut combined = a;
    combined.extend(b);
    dedupe_by_key_and_merge(
        combined,
        |h| (h.info_type.to_lowercase(), h.value.to_lowercase()),
        |first, _second| first,
    )
}

fn merge_contact_info(a: ContactInfo, b: ContactInfo) -> ContactInfo {
    ContactInfo {
        email_addresses: dedupe_strings(a.email_addresses, b.email_addresses),
        phone_numbers: dedupe_strings(a.phone_numbers, b.phone_numbers),
        fax_numbers: dedupe_strings(a.fax_numbers, b.fax_numbers),
        websites: dedupe_strings(a.websites, b.websites),
    }
}

fn merge_sanctions_info(a: SanctionsInfo, b: SanctionsInfo) -> SanctionsInfo {
    SanctionsInfo {
        programs: dedupe_strings(a.programs, b.programs),
        secondary: a.secondary || b.secondary,
        description: first_non_empty(a.description, b.description),
    }
}

fn merge_person(a: Person, b: Person) -> Person {
    Person {
        alt_names: dedupe_strings(a.alt_names, b.alt_names),
        gender: a.gender.or(b.gender),
        dob: a.dob.or(b.dob),
        deceased: a.deceased.or(b.deceased),
        birth_place: first_non_empty(a.birth_place, b.birth_place),
        titles: dedupe_strings(a.titles, b.titles),
        remarks: dedupe_strings(a.remarks, b.remarks),
        government_ids: merge_government_ids(a.government_ids, b.government_ids),
    }
}

fn merge_company(a: CompanyRecord, b: CompanyRecord) -> CompanyRecord {
    CompanyRecord {
        alt_names: dedupe_strings(a.alt_names, b.alt_names),
        incorporated: a.incorporated.or(b.incorporated),
        dissolved: a.dissolved.or(b.dissolved),
        government_ids: merge_government_ids(a.government_ids, b.government_ids),
    }
}

fn merge_aircraft(a: Aircraft, b: Aircraft) -> Aircraft {
    Aircraft {
        alt_names: dedupe_strings(a.alt_names, b.alt_names),
        tail_number: first_non_empty(a.tail_number, b.tail_number),
        model: first_non_empty(a.model, b.model),
        manufacturer: first_non_empty(a.manufacturer, b.manufacturer),
        operator: first_non_empty(a.operator, b.operator),
        built: a.built.or(b.built),
        destroyed: a.destroyed.or(b.destroyed),
    }
}

fn merge_vessel(a: Vessel, b: Vessel) -> Vessel {
    Vessel {
        alt_names: dedupe_strings(a.alt_names, b.alt_names),
        imo_number: first_non_empty(a.imo_number, b.imo_number),
        mmsi: first_non_empty(a.mmsi, b.mmsi),
        call_sign: first_non_empty(a.call_sign, b.call_sign),
        flag: first_non_empty(a.flag, b.flag),
        tonnage: first_non_empty(a.tonnage, b.tonnage),
        owner: first_non_empty(a.owner, b.owner),
    }
}

/// Merges two typed sub-records. When both sides carry the same
/// variant the fields fold pairwise; when only one side is populated
/// (the other is `Unknown`), that side wins outright.
fn merge_sub_record(winner_name: &str, loser_name: &str, a: SubRecord, b: SubRecord) -> (SubRecord, Option<String>) {
    let demoted_name = if !winner_name.eq_ignore_ascii_case(loser_name) && !loser_name.is_empty() {
        Some(loser_name.to_string())
    } else {
        None
    };

    let merged = match (a, b) {
        (SubRecord::Person(a), SubRecord::Person(b)) => SubRecord::Person(merge_person(a, b)),
        (SubRecord::Business(a), SubRecord::Business(b)) => SubRecord::Business(merge_company(a, b)),
        (SubRecord::Organization(a), SubRecord::Organization(b)) => SubRecord::Organization(merge_company(a, b)),
        (SubRecord::Aircraft(a), SubRecord::Aircraft(b)) => SubRecord::Aircraft(merge_aircraft(a, b)),
        (SubRecord::Vessel(a), SubRecord::Vessel(b)) => SubRecord::Vessel(merge_vessel(a, b)),
        (SubRecord::Unknown, other) | (other, SubRecord::Unknown) => other,
        (a, _b) => a,
    };

    (merged, demoted_name)
}

/// Lowercased `(source, sourceId, type)` merge key.
fn natural_group_key(e: &Entity) -> (String, String, String) {
    (
        format!("{:?}", e.source).to_lowercase(),
        e.source_id.to_lowercase(),
        format!("{:?}", e.entity_type).to_lowercase(),
    )
}

/// Pairwise-folds two partial entities with the same merge key: scalar
/// fields take the first non-empty value in iteration order, typed
/// sub-records merge field-wise, and sequences dedupe via
/// [`dedupe_by_key_and_merge`]. A differing `name` demotes the loser
/// into the winner's `altNames`.
pub fn merge_pair(a: Entity, b: Entity) -> Entity {
    let a_name_is_winner = !a.name.is_empty() || b.name.is_empty();
    let (winner_name, loser_name) = if a_name_is_winner {
        (a.name.clone(), b.name.clone())
    } else {
        (b.name.clone(), a.name.clone())
    };

    let (sub_record, demoted_name) = merge_sub_record(&winner_name, &loser_name, a.sub_record, b.sub_record);

    let mut alt_names = sub_record.alt_names().to_vec();
    if let Some(demoted) = demoted_name {
        alt_names.push(demoted);
    }

    let mut sub_record = sub_record;
    if let Some(slot) = sub_record.alt_names_mut() {
        *slot = dedupe_strings(std::mem::take(slot), alt_names.clone());
    }

    Entity {
        id: if !a.id.is_empty() { a.id } else { b.id },
        name: winner_name,
        entity_type: a.entity_type,
        source: a.source,
        source_id: if !a.source_id.is_empty() { a.source_id } else { b.source_id },
        sub_record,
        addresses: merge_addresses(a.addresses, b.addresses),
        sanctions_info: merge_sanctions_info(a.sanctions_info, b.sanctions_info),
        historical_info: merge_historical_info(a.historical_info, b.historical_info),
        contact: merge_contact_info(a.contact, b.contact),
        crypto_addresses: merge_crypto_addresses(a.crypto_addresses, b.crypto_addresses),
        affiliations: merge_affiliations(a.affiliations, b.affiliations),
    }
}

/// Re-normalizes an entity's string-bearing fields after a merge. Only
/// whitespace/case bookkeeping — the underlying values are assumed
/// already NFC per the data-model invariant; this does not call the
/// comparator normalizer, which would be lossy for display fields.
pub fn normalize_entity(mut e: Entity) -> Entity {
    e.name = e.name.split_whitespace().collect::<Vec<_>>().join(" ");
    if let Some(alts) = e.sub_record.alt_names_mut() {
        for alt in alts.iter_mut() {
            *alt = alt.split_whitespace().collect::<Vec<_>>().join(" ");
        }
    }
    e
}

/// Groups entities by `(source, sourceId, type)` and folds each group
/// pairwise in iteration order, then re-normalizes. Total: any input
/// sequence, including empty, produces a sequence no longer than the
/// input.
pub fn merge_entities(entities: Vec<Entity>) -> Vec<Entity> {
    dedupe_by_key_and_merge(entities, natural_group_key, |a, b| merge_pair(a, b))
        .into_iter()
        .map(normalize_entity)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegistry_core::{EntityType, Source};

    fn base_entity(name: &str) -> Entity {
        Entity {
            id: format!("id-{name}"),
            name: name.to_string(),
            entity_type: EntityType::Person,
            source: Source::UsOfac,
            source_id: "12345".to_string(),
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
    fn merge_of_single_entity_is_just_normalized() {
        let e = base_entity("John   Doe");
        let merged = merge_entities(vec![e.clone()]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "John Doe");
    }

    #[test]
    fn merge_never_grows_the_sequence() {
        let e1 = base_entity("John Doe");
        let e2 = base_entity("John Doe");
        let merged = merge_entities(vec![e1, e2]);
        assert!(merged.len() <= 2);
    }

    #[test]
    fn s6_differing_names_demote_into_alt_names_and_dedupe_phones() {
        let mut e1 = base_entity("John Doe");
        e1.contact.phone_numbers = vec!["555-1111".to_string()];

        let mut e2 = base_entity("Johnny Doe");
        e2.contact.phone_numbers = vec!["555-1111".to_string(), "555-2222".to_string()];

        let merged = merge_entities(vec![e1, e2]);
        assert_eq!(merged.len(), 1);
        assert!(merged[0].alt_names().iter().any(|n| n == "Johnny Doe"));
        assert_eq!(merged[0].contact.phone_numbers.len(), 2);
    }

    #[test]
    fn different_groups_stay_separate() {
        let e1 = base_entity("John Doe");
        let mut e2 = base_entity("Jane Doe");
        e2.source_id = "99999".to_string();
        let merged = merge_entities(vec![e1, e2]);
        assert_eq!(merged.len(), 2);
    }
}
