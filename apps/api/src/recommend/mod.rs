// Reach / match / safety recommendations from a candidate's narrow-population rank.

pub mod handlers;
pub mod partition;
pub mod service;
pub mod table;

pub use table::InstitutionTable;
