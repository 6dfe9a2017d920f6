use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

/// Structured failure from [`ResolvedConfig::resolve`]. The resolver
/// fails fast on the first out-of-range field it finds — scoring is
/// never attempted against an invalid config.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} = {value} is out of range ({min}..={max})")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    fn from_validation(field_prefix: &str, errors: ValidationErrors) -> Self {
        for (field, field_errors) in errors.field_errors() {
            if let Some(err) = field_errors.first() {
                let value = err
                    .params
                    .get("value")
                    .and_then(|v| v.as_f64())
                    .unwrap_or(f64::NAN);
                let min = err.params.get("min").and_then(|v| v.as_f64());
                let max = err.params.get("max").and_then(|v| v.as_f64());
                let error = ConfigError::OutOfRange {
                    field: format!("{field_prefix}.{field}"),
                    value,
                    min: min.unwrap_or(f64::NEG_INFINITY),
                    max: max.unwrap_or(f64::INFINITY),
                };
                tracing::warn!(%error, "rejecting out-of-range config override");
                return error;
            }
        }
        let error = ConfigError::Invalid(format!("{field_prefix}: unknown validation failure"));
        tracing::warn!(%error, "rejecting config override");
        error
    }
}

/// Tunable knobs for the name comparator. All fields are
/// optional on the wire via [`SimilarityOverrides`]; this type is the
/// fully-resolved, non-optional form the comparators actually consume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityConfig {
    pub jaro_winkler_boost_threshold: f64,
    pub jaro_winkler_prefix_size: u32,
    pub phonetic_filtering_disabled: bool,
    pub length_difference_cutoff_factor: f64,
    pub length_difference_penalty_weight: f64,
    pub different_letter_penalty_weight: f64,
    pub unmatched_index_token_weight: f64,
    pub exact_match_favoritism: f64,
    pub keep_stopwords: bool,
    pub log_stopword_debugging: bool,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            jaro_winkler_boost_threshold: 0.7,
            jaro_winkler_prefix_size: 4,
            phonetic_filtering_disabled: false,
            length_difference_cutoff_factor: 3.0,
            length_difference_penalty_weight: 0.3,
            different_letter_penalty_weight: 0.1,
            unmatched_index_token_weight: 1.0,
            exact_match_favoritism: 0.05,
            keep_stopwords: false,
            log_stopword_debugging: false,
        }
    }
}

/// Per-request overrides for [`SimilarityConfig`]. `None` means "use the
/// default"; every `Some` is range-validated before it can replace a
/// default value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct SimilarityOverrides {
    #[validate(range(min = 0.0, max = 1.0))]
    pub jaro_winkler_boost_threshold: Option<f64>,
    #[validate(range(min = 0.0, max = 10.0))]
    pub jaro_winkler_prefix_size: Option<u32>,
    pub phonetic_filtering_disabled: Option<bool>,
    #[validate(range(min = 1.0))]
    pub length_difference_cutoff_factor: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub length_difference_penalty_weight: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub different_letter_penalty_weight: Option<f64>,
    #[validate(range(min = 0.0))]
    pub unmatched_index_token_weight: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub exact_match_favoritism: Option<f64>,
    pub keep_stopwords: Option<bool>,
    pub log_stopword_debugging: Option<bool>,
}

impl SimilarityConfig {
    pub fn resolve(overrides: SimilarityOverrides) -> Result<Self, ConfigError> {
        overrides
            .validate()
            .map_err(|e| ConfigError::from_validation("similarity", e))?;
        let default = SimilarityConfig::default();
        Ok(SimilarityConfig {
            jaro_winkler_boost_threshold: overrides
                .jaro_winkler_boost_threshold
                .unwrap_or(default.jaro_winkler_boost_threshold),
            jaro_winkler_prefix_size: overrides
                .jaro_winkler_prefix_size
                .unwrap_or(default.jaro_winkler_prefix_size),
            phonetic_filtering_disabled: overrides
                .phonetic_filtering_disabled
                .unwrap_or(default.phonetic_filtering_disabled),
            length_difference_cutoff_factor: overrides
                .length_difference_cutoff_factor
                .unwrap_or(default.length_difference_cutoff_factor),
            length_difference_penalty_weight: overrides
                .length_difference_penalty_weight
                .unwrap_or(default.length_difference_penalty_weight),
            different_letter_penalty_weight: overrides
                .different_letter_penalty_weight
                .unwrap_or(default.different_letter_penalty_weight),
            unmatched_index_token_weight: overrides
                .unmatched_index_token_weight
                .unwrap_or(default.unmatched_index_token_weight),
            exact_match_favoritism: overrides
                .exact_match_favoritism
                .unwrap_or(default.exact_match_favoritism),
            keep_stopwords: overrides.keep_stopwords.unwrap_or(default.keep_stopwords),
            log_stopword_debugging: overrides
                .log_stopword_debugging
                .unwrap_or(default.log_stopword_debugging),
        })
    }
}

/// Component weights and enable flags for the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub name_weight: f64,
    pub address_weight: f64,
    pub critical_id_weight: f64,
    pub supporting_info_weight: f64,
    pub name_enabled: bool,
    pub alt_names_enabled: bool,
    pub government_id_enabled: bool,
    pub crypto_enabled: bool,
    pub contact_enabled: bool,
    pub address_enabled: bool,
    pub date_enabled: bool,
    /// Whether an exact identifier match clamps the total score to at
    /// least 0.9 when the name score is also plausible. The
    /// distilled spec flags this short circuit as possibly revision-
    /// specific; it is implemented here as a configurable, default-on
    /// behavior rather than guessed at as always-on.
    pub exact_id_short_circuit_enabled: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            name_weight: 35.0,
            address_weight: 25.0,
            critical_id_weight: 50.0,
            supporting_info_weight: 15.0,
            name_enabled: true,
            alt_names_enabled: true,
            government_id_enabled: true,
            crypto_enabled: true,
            contact_enabled: true,
            address_enabled: true,
            date_enabled: true,
            exact_id_short_circuit_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct ScoringOverrides {
    #[validate(range(min = 0.0))]
    pub name_weight: Option<f64>,
    #[validate(range(min = 0.0))]
    pub address_weight: Option<f64>,
    #[validate(range(min = 0.0))]
    pub critical_id_weight: Option<f64>,
    #[validate(range(min = 0.0))]
    pub supporting_info_weight: Option<f64>,
    pub name_enabled: Option<bool>,
    pub alt_names_enabled: Option<bool>,
    pub government_id_enabled: Option<bool>,
    pub crypto_enabled: Option<bool>,
    pub contact_enabled: Option<bool>,
    pub address_enabled: Option<bool>,
    pub date_enabled: Option<bool>,
    pub exact_id_short_circuit_enabled: Option<bool>,
}

impl ScoringConfig {
    pub fn resolve(overrides: ScoringOverrides) -> Result<Self, ConfigError> {
        overrides
            .validate()
            .map_err(|e| ConfigError::from_validation("scoring", e))?;
        let default = ScoringConfig::default();
        Ok(ScoringConfig {
            name_weight: overrides.name_weight.unwrap_or(default.name_weight),
            address_weight: overrides.address_weight.unwrap_or(default.address_weight),
            critical_id_weight: overrides
                .critical_id_weight
                .unwrap_or(default.critical_id_weight),
            supporting_info_weight: overrides
                .supporting_info_weight
                .unwrap_or(default.supporting_info_weight),
            name_enabled: overrides.name_enabled.unwrap_or(default.name_enabled),
            alt_names_enabled: overrides
                .alt_names_enabled
                .unwrap_or(default.alt_names_enabled),
            government_id_enabled: overrides
                .government_id_enabled
                .unwrap_or(default.government_id_enabled),
            crypto_enabled: overrides.crypto_enabled.unwrap_or(default.crypto_enabled),
            contact_enabled: overrides.contact_enabled.unwrap_or(default.contact_enabled),
            address_enabled: overrides.address_enabled.unwrap_or(default.address_enabled),
            date_enabled: overrides.date_enabled.unwrap_or(default.date_enabled),
            exact_id_short_circuit_enabled: overrides
                .exact_id_short_circuit_enabled
                .unwrap_or(default.exact_id_short_circuit_enabled),
        })
    }
}

/// Host-facing search parameters. Not consumed by `score()` itself
/// — documented and resolved here for completeness, since a host still
/// needs `minMatch`/`limit` validated the same way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub min_match: f64,
    pub limit: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            min_match: 0.88,
            limit: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct SearchParamsOverrides {
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_match: Option<f64>,
    #[validate(range(min = 1.0, max = 100.0))]
    pub limit: Option<u32>,
}

impl SearchParams {
    pub fn resolve(overrides: SearchParamsOverrides) -> Result<Self, ConfigError> {
        overrides
            .validate()
            .map_err(|e| ConfigError::from_validation("search_params", e))?;
        let default = SearchParams::default();
        Ok(SearchParams {
            min_match: overrides.min_match.unwrap_or(default.min_match),
            limit: overrides.limit.unwrap_or(default.limit),
        })
    }
}

/// The config actually handed to a single scoring call: both
/// [`SimilarityConfig`] and [`ScoringConfig`], already resolved and
/// immutable for the lifetime of the request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    pub similarity: SimilarityConfig,
    pub scoring: ScoringConfig,
}

impl ResolvedConfig {
    pub fn resolve(
        similarity: SimilarityOverrides,
        scoring: ScoringOverrides,
    ) -> Result<Self, ConfigError> {
        Ok(ResolvedConfig {
            similarity: SimilarityConfig::resolve(similarity)?,
            scoring: ScoringConfig::resolve(scoring)?,
        })
    }

    pub fn default() -> Self {
        ResolvedConfig {
            similarity: SimilarityConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}
