//! Client for the Crowdin translation-management platform: OAuth sign-in,
//! user and project queries, and file download.

pub mod client;
pub mod credentials;
pub mod download;
pub mod http;
pub mod login;
pub mod oauth;
pub mod task;

pub use client::{AuthFlow, CrowdinClient};
pub use credentials::CredentialStore;
pub use login::{LoginPanel, LoginState};
pub use task::Task;
