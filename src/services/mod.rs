pub mod crowdin;
pub mod encoding;
