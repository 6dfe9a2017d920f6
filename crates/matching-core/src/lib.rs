pub mod address;
pub mod date;
pub mod exact;
pub mod merge;
pub mod name;
pub mod normalize;
pub mod phonetic;
pub mod scorer;
pub mod supporting;

pub use merge::{dedupe_by_key_and_merge, merge_entities};
pub use name::{jaro_winkler, tokenized_similarity};
pub use normalize::normalize;
pub use phonetic::{phonetically_compatible, soundex};
pub use scorer::score;
