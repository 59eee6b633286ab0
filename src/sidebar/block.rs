use serde::Serialize;

use crate::model::entry::CatalogItem;
use crate::sidebar::text;

/// What a block needs from the UI toolkit to display itself.
pub trait RenderablePanel {
    fn set_visible(&mut self, visible: bool);
    fn set_text(&mut self, text: &str);
}

/// In-memory panel; its state is what the core reports to the shell.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct TextPanel {
    pub visible: bool,
    pub text: String,
}

impl RenderablePanel for TextPanel {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    OldMsgid,
    AutoComment,
    Comment,
}

impl BlockKind {
    pub const ALL: [BlockKind; 3] = [BlockKind::OldMsgid, BlockKind::AutoComment, BlockKind::Comment];

    pub fn label(self) -> &'static str {
        match self {
            // "Previous" as in used in the past, now replaced with newer.
            BlockKind::OldMsgid => "Previous source text:",
            BlockKind::AutoComment => "Notes for translators:",
            BlockKind::Comment => "Comment:",
        }
    }

    pub fn explanation(self) -> Option<&'static str> {
        match self {
            BlockKind::OldMsgid => Some(
                "The old source text (before it changed during an update) that the fuzzy translation corresponds to.",
            ),
            _ => None,
        }
    }

    pub fn should_show_for_item(self, item: &CatalogItem) -> bool {
        match self {
            BlockKind::OldMsgid => item.has_old_msgid(),
            BlockKind::AutoComment => item.has_auto_comments(),
            BlockKind::Comment => item.has_comment(),
        }
    }

    /// Only meaningful when `should_show_for_item` holds.
    pub fn text_for_item(self, item: &CatalogItem) -> String {
        match self {
            BlockKind::OldMsgid => text::old_msgid_text(&item.old_msgid),
            BlockKind::AutoComment => text::auto_comment_text(&item.auto_comments),
            BlockKind::Comment => text::comment_text(item.comment.as_deref().unwrap_or("")),
        }
    }
}

pub struct SidebarBlock<P> {
    kind: BlockKind,
    panel: P,
}

impl<P: RenderablePanel> SidebarBlock<P> {
    pub fn new(kind: BlockKind, panel: P) -> Self {
        Self { kind, panel }
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn set_item(&mut self, item: Option<&CatalogItem>) {
        let Some(item) = item else {
            self.panel.set_visible(false);
            return;
        };

        let show = self.kind.should_show_for_item(item);
        if show {
            self.panel.set_text(&self.kind.text_for_item(item));
        }
        self.panel.set_visible(show);
    }
}
