use serde::{Deserialize, Serialize};

/// Information about the signed-in user.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct UserInfo {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub login: String,
}

/// One project the user has access to.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ProjectListing {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub identifier: String,

    #[serde(default)]
    pub downloadable: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Language {
    pub code: String,

    #[serde(default)]
    pub name: String,
}

/// A gettext file inside a project; `id` is what downloads are keyed by.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ProjectFile {
    pub id: u64,
    pub path: String,
}

/// Project detail: target languages and the translatable PO files.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ProjectInfo {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub identifier: String,

    #[serde(default)]
    pub languages: Vec<Language>,

    #[serde(default)]
    pub po_files: Vec<ProjectFile>,
}
