pub mod probability;
pub mod scores;
