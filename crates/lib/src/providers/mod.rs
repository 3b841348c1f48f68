pub mod ai;
pub mod language;
