use serde::{Deserialize, Serialize};

/// One translatable unit of a catalog, as the editor hands it to the sidebar.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct CatalogItem {
    #[serde(default)]
    pub msgid: String,

    #[serde(default)]
    pub translation: String,

    #[serde(default)]
    pub fuzzy: bool,

    #[serde(default)]
    pub comment: Option<String>,

    #[serde(default)]
    pub auto_comments: Vec<String>,

    #[serde(default, alias = "previous_msgid")]
    pub old_msgid: Vec<String>,
}

impl CatalogItem {
    pub fn has_comment(&self) -> bool {
        self.comment.as_deref().is_some_and(|c| !c.is_empty())
    }

    pub fn has_auto_comments(&self) -> bool {
        !self.auto_comments.is_empty()
    }

    pub fn has_old_msgid(&self) -> bool {
        !self.old_msgid.is_empty()
    }
}
