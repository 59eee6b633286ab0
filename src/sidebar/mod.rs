//! Sidebar content selection: which metadata blocks are shown for the
//! selected catalog entry and what they say.
//!
//! The sidebar never owns entries. Callers pass the current one (or `None`)
//! on every selection change and the blocks reset themselves from it.

pub mod block;
pub mod text;

use serde::Serialize;

use crate::model::entry::CatalogItem;
use block::{BlockKind, RenderablePanel, SidebarBlock, TextPanel};

#[cfg(target_os = "macos")]
const BOTTOM_ALIGN_OFFSET: i32 = 4;
#[cfg(not(target_os = "macos"))]
const BOTTOM_ALIGN_OFFSET: i32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    #[default]
    None,
    Single,
    Multiple,
}

pub struct Sidebar<P = TextPanel> {
    blocks: Vec<SidebarBlock<P>>,
    selection: Selection,
    layout_generation: u64,
    bottom_min_height: i32,
}

impl<P: RenderablePanel> Sidebar<P> {
    /// Builds the fixed set of blocks, asking `make_panel` for each one's view.
    pub fn new(mut make_panel: impl FnMut(BlockKind) -> P) -> Self {
        let blocks = BlockKind::ALL
            .iter()
            .map(|&kind| SidebarBlock::new(kind, make_panel(kind)))
            .collect();

        let mut sidebar = Self {
            blocks,
            selection: Selection::None,
            layout_generation: 0,
            bottom_min_height: 0,
        };
        sidebar.set_selected_item(None);
        sidebar
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn blocks(&self) -> &[SidebarBlock<P>] {
        &self.blocks
    }

    pub fn layout_generation(&self) -> u64 {
        self.layout_generation
    }

    pub fn set_selected_item(&mut self, item: Option<&CatalogItem>) {
        self.selection = if item.is_some() {
            Selection::Single
        } else {
            Selection::None
        };
        self.refresh_content(item);
    }

    /// Several rows selected: nothing sensible to show.
    pub fn set_multiple_selection(&mut self) {
        self.refresh_content(None);
        self.selection = Selection::Multiple;
    }

    pub fn refresh_content(&mut self, item: Option<&CatalogItem>) {
        for block in &mut self.blocks {
            block.set_item(item);
        }
        self.layout();
    }

    /// Aligns the bottom blocks with the top of the editing area, which sits
    /// `upper_height` pixels above the panel's bottom edge.
    pub fn set_upper_height(&mut self, panel_height: i32, upper_height: i32) {
        self.bottom_min_height = (panel_height - upper_height + BOTTOM_ALIGN_OFFSET).max(0);
        self.layout();
    }

    pub fn bottom_min_height(&self) -> i32 {
        self.bottom_min_height
    }

    fn layout(&mut self) {
        self.layout_generation += 1;
        log::debug!(
            "sidebar layout #{} ({:?})",
            self.layout_generation,
            self.selection
        );
    }
}

impl Default for Sidebar<TextPanel> {
    fn default() -> Self {
        Sidebar::new(|_| TextPanel::default())
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct BlockSnapshot {
    pub kind: BlockKind,
    pub label: &'static str,
    pub explanation: Option<&'static str>,
    pub visible: bool,
    pub text: String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct SidebarSnapshot {
    pub selection: Selection,
    pub layout_generation: u64,
    pub bottom_min_height: i32,
    pub blocks: Vec<BlockSnapshot>,
}

impl Sidebar<TextPanel> {
    pub fn snapshot(&self) -> SidebarSnapshot {
        SidebarSnapshot {
            selection: self.selection,
            layout_generation: self.layout_generation,
            bottom_min_height: self.bottom_min_height,
            blocks: self
                .blocks
                .iter()
                .map(|b| {
                    let panel = b.panel();
                    BlockSnapshot {
                        kind: b.kind(),
                        label: b.kind().label(),
                        explanation: b.kind().explanation(),
                        visible: panel.visible,
                        // a hidden panel may still hold the previous entry's text
                        text: if panel.visible {
                            panel.text.clone()
                        } else {
                            String::new()
                        },
                    }
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_item() -> CatalogItem {
        CatalogItem {
            msgid: "Save all".into(),
            fuzzy: true,
            comment: Some("# ask the docs team".into()),
            auto_comments: vec!["translators: toolbar".into(), "button".into()],
            old_msgid: vec!["Save".into(), "everything".into()],
            ..Default::default()
        }
    }

    fn visible(sidebar: &Sidebar) -> Vec<bool> {
        sidebar.blocks().iter().map(|b| b.panel().visible).collect()
    }

    #[test]
    fn starts_with_everything_hidden() {
        let sidebar: Sidebar = Sidebar::default();
        assert_eq!(sidebar.selection(), Selection::None);
        assert_eq!(visible(&sidebar), vec![false, false, false]);
    }

    #[test]
    fn single_selection_populates_applicable_blocks() {
        let mut sidebar: Sidebar = Sidebar::default();
        sidebar.set_selected_item(Some(&full_item()));

        let snap = sidebar.snapshot();
        assert_eq!(snap.selection, Selection::Single);
        let texts: Vec<_> = snap.blocks.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["Save everything", "toolbar button", "ask the docs team"]);
        assert!(snap.blocks.iter().all(|b| b.visible));
    }

    #[test]
    fn blocks_toggle_independently() {
        let mut sidebar: Sidebar = Sidebar::default();
        let item = CatalogItem {
            comment: Some("only a comment".into()),
            ..Default::default()
        };
        sidebar.set_selected_item(Some(&item));
        assert_eq!(visible(&sidebar), vec![false, false, true]);
    }

    #[test]
    fn multiple_selection_hides_all_blocks() {
        let mut sidebar: Sidebar = Sidebar::default();
        sidebar.set_selected_item(Some(&full_item()));
        sidebar.set_multiple_selection();

        assert_eq!(sidebar.selection(), Selection::Multiple);
        assert_eq!(visible(&sidebar), vec![false, false, false]);
    }

    #[test]
    fn clearing_selection_hides_all_blocks() {
        let mut sidebar: Sidebar = Sidebar::default();
        sidebar.set_selected_item(Some(&full_item()));
        sidebar.set_selected_item(None);
        assert_eq!(sidebar.selection(), Selection::None);
        assert_eq!(visible(&sidebar), vec![false, false, false]);
    }

    #[test]
    fn hidden_blocks_report_no_text() {
        let mut sidebar: Sidebar = Sidebar::default();
        sidebar.set_selected_item(Some(&full_item()));
        sidebar.set_selected_item(None);

        let snap = sidebar.snapshot();
        assert!(snap.blocks.iter().all(|b| !b.visible && b.text.is_empty()));

        sidebar.set_selected_item(Some(&full_item()));
        sidebar.set_selected_item(Some(&CatalogItem {
            comment: Some("new".into()),
            ..Default::default()
        }));
        let texts: Vec<_> = sidebar.snapshot().blocks.into_iter().map(|b| b.text).collect();
        assert_eq!(texts, vec!["", "", "new"]);
    }

    #[test]
    fn every_refresh_relayouts() {
        let mut sidebar: Sidebar = Sidebar::default();
        let before = sidebar.layout_generation();
        sidebar.set_selected_item(Some(&full_item()));
        sidebar.set_multiple_selection();
        assert_eq!(sidebar.layout_generation(), before + 2);
    }

    #[test]
    fn upper_height_sets_bottom_alignment() {
        let mut sidebar: Sidebar = Sidebar::default();
        sidebar.set_upper_height(600, 200);
        assert_eq!(sidebar.bottom_min_height(), 400 + BOTTOM_ALIGN_OFFSET);

        sidebar.set_upper_height(100, 500);
        assert_eq!(sidebar.bottom_min_height(), 0);
    }
}
