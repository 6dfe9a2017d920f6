pub mod config;
pub mod entity;
pub mod score;
pub mod trace;

pub use config::{
    ConfigError, ResolvedConfig, ScoringConfig, ScoringOverrides, SearchParams,
    SearchParamsOverrides, SimilarityConfig, SimilarityOverrides,
};
pub use entity::{
    Address, Affiliation, Aircraft, CompanyRecord, ContactInfo, CryptoAddress, DateValue, Entity,
    EntityType, Gender, GovernmentId, GovernmentIdType, HistoricalInfo, Person, SanctionsInfo,
    Source, SubRecord, Vessel,
};
pub use score::{PieceType, ScoreBreakdown, ScorePiece};
pub use trace::{Phase, ScoringContext, ScoringEvent, ScoringTrace};

pub const PROJECT_NAME: &str = "aegistry";
pub const PROJECT_VERSION: &str = env!("CARGO_PKG_VERSION");
