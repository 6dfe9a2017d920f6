use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A date known either to the day or only to the year.
///
/// Several source lists (OFAC in particular) only ever record a year of
/// birth; forcing every date field to a full `NaiveDate` would make that
/// the common case instead of the exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "precision", rename_all = "snake_case")]
pub enum DateValue {
    Full(NaiveDate),
    YearOnly(i32),
}

impl DateValue {
    pub fn year(&self) -> i32 {
        match self {
            DateValue::Full(d) => d.year(),
            DateValue::YearOnly(y) => *y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Person,
    Business,
    Organization,
    Aircraft,
    Vessel,
    Unknown,
}

/// Source list an entity was published under.
///
/// The catch-all `Other` variant exists because source-file parsing is
/// out of scope here: a host ingesting a list this crate has never seen
/// still needs somewhere to put its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Source {
    UsOfac,
    UsConsolidated,
    EuConsolidated,
    UkHmt,
    UnSc,
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Unspecified,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GovernmentIdType {
    Passport,
    NationalId,
    TaxId,
    Ssn,
    Cedula,
    DriversLicense,
    RegistrationNumber,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernmentId {
    pub id_type: GovernmentIdType,
    pub country: String,
    pub identifier: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email_addresses: Vec<String>,
    pub phone_numbers: Vec<String>,
    pub fax_numbers: Vec<String>,
    pub websites: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoAddress {
    pub currency: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanctionsInfo {
    pub programs: Vec<String>,
    pub secondary: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalInfo {
    pub info_type: String,
    pub value: String,
    pub date: Option<DateValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affiliation {
    pub entity_name: String,
    pub affiliation_type: String,
    pub entity_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub alt_names: Vec<String>,
    pub gender: Option<Gender>,
    pub dob: Option<DateValue>,
    pub deceased: Option<DateValue>,
    pub birth_place: Option<String>,
    pub titles: Vec<String>,
    pub remarks: Vec<String>,
    pub government_ids: Vec<GovernmentId>,
}

/// Shared shape for `Business` and `Organization` sub-records — the
/// distilled spec lists identical fields for both; `EntityType` already
/// carries the discriminant, so one struct covers both variants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub alt_names: Vec<String>,
    pub incorporated: Option<DateValue>,
    pub dissolved: Option<DateValue>,
    pub government_ids: Vec<GovernmentId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aircraft {
    pub alt_names: Vec<String>,
    pub tail_number: Option<String>,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub operator: Option<String>,
    pub built: Option<DateValue>,
    pub destroyed: Option<DateValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vessel {
    pub alt_names: Vec<String>,
    pub imo_number: Option<String>,
    pub mmsi: Option<String>,
    pub call_sign: Option<String>,
    pub flag: Option<String>,
    pub tonnage: Option<String>,
    pub owner: Option<String>,
}

/// Exactly one of these is meaningful at a time; `Entity::entity_type`
/// names which. An enum is the natural expression of that "exactly one
/// of" invariant — no assembly of five `Option<T>` fields to keep in
/// sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SubRecord {
    Person(Person),
    Business(CompanyRecord),
    Organization(CompanyRecord),
    Aircraft(Aircraft),
    Vessel(Vessel),
    Unknown,
}

impl SubRecord {
    pub fn entity_type(&self) -> EntityType {
        match self {
            SubRecord::Person(_) => EntityType::Person,
            SubRecord::Business(_) => EntityType::Business,
            SubRecord::Organization(_) => EntityType::Organization,
            SubRecord::Aircraft(_) => EntityType::Aircraft,
            SubRecord::Vessel(_) => EntityType::Vessel,
            SubRecord::Unknown => EntityType::Unknown,
        }
    }

    pub fn alt_names(&self) -> &[String] {
        match self {
            SubRecord::Person(p) => &p.alt_names,
            SubRecord::Business(c) | SubRecord::Organization(c) => &c.alt_names,
            SubRecord::Aircraft(a) => &a.alt_names,
            SubRecord::Vessel(v) => &v.alt_names,
            SubRecord::Unknown => &[],
        }
    }

    pub fn alt_names_mut(&mut self) -> Option<&mut Vec<String>> {
        match self {
            SubRecord::Person(p) => Some(&mut p.alt_names),
            SubRecord::Business(c) | SubRecord::Organization(c) => Some(&mut c.alt_names),
            SubRecord::Aircraft(a) => Some(&mut a.alt_names),
            SubRecord::Vessel(v) => Some(&mut v.alt_names),
            SubRecord::Unknown => None,
        }
    }

    pub fn government_ids(&self) -> &[GovernmentId] {
        match self {
            SubRecord::Person(p) => &p.government_ids,
            SubRecord::Business(c) | SubRecord::Organization(c) => &c.government_ids,
            SubRecord::Aircraft(_) | SubRecord::Vessel(_) | SubRecord::Unknown => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub name: String,
    pub entity_type: EntityType,
    pub source: Source,
    pub source_id: String,
    pub sub_record: SubRecord,
    pub addresses: Vec<Address>,
    pub sanctions_info: SanctionsInfo,
    pub historical_info: Vec<HistoricalInfo>,
    pub contact: ContactInfo,
    pub crypto_addresses: Vec<CryptoAddress>,
    pub affiliations: Vec<Affiliation>,
}

impl Entity {
    /// True when `sub_record` matches the declared `entity_type`. A
    /// mismatch is not an error the scorer raises — it is scored as
    /// `UNKNOWN`.
    pub fn is_type_consistent(&self) -> bool {
        self.sub_record.entity_type() == self.entity_type
    }

    pub fn alt_names(&self) -> &[String] {
        self.sub_record.alt_names()
    }

    pub fn government_ids(&self) -> &[GovernmentId] {
        self.sub_record.government_ids()
    }
}
