pub mod crowdin;
pub mod entry;
