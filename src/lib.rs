//! Headless core of a translation editor: sidebar content selection for
//! catalog entries and a client for the Crowdin platform.

pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod protocol;
pub mod services;
pub mod sidebar;
