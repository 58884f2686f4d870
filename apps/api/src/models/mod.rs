pub mod institution;
pub mod score;

pub use institution::InstitutionRecord;
pub use score::ScoreCountRecord;
