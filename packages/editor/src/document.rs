//! # Document Composer
//!
//! Owns the pages of one design, the active page, the selection, and the
//! snapshot history.
//!
//! ## Lifecycle
//!
//! ```text
//! load ──▶ mutate ──▶ commit ──▶ undo/redo
//!   │         │          │           │
//! baseline  revision   snapshot   restore pages
//!           (+1)       (history)  + selection
//! ```
//!
//! Live updates ([`Composer::update_element`]) change state immediately and
//! are folded into one history entry by the next [`Composer::commit`], or
//! automatically before any other committed mutation and before undo/redo.

use crate::assets::{linked_patch, unlinked_patch, AssetLibrary};
use crate::mutations::{ElementPatch, Mutation, MutationResult, ReorderDirection};
use crate::undo_stack::{Snapshot, UndoStack, DEFAULT_MAX_LEVELS};
use customfly_model::{default_pages, CanvasElement, PageData};

/// Maximum number of pages in a design
pub const MAX_PAGES: usize = 20;

/// Offset applied to both axes of a duplicated element
pub const DUPLICATE_OFFSET: f64 = 20.0;

/// Editable design document
#[derive(Debug)]
pub struct Composer {
    pages: Vec<PageData>,
    active_page_id: String,
    selected_element_id: Option<String>,
    history: UndoStack,

    /// Increments on every change to `pages`
    revision: u64,

    /// Live updates applied since the last history entry
    uncommitted: bool,
}

impl Composer {
    pub fn new(pages: Vec<PageData>) -> Self {
        Self::with_history_limit(pages, DEFAULT_MAX_LEVELS)
    }

    /// An empty page list is replaced by the default single page
    pub fn with_history_limit(pages: Vec<PageData>, history_limit: usize) -> Self {
        let pages = if pages.is_empty() { default_pages() } else { pages };
        let active_page_id = pages[0].id.clone();
        let history = UndoStack::with_max_levels(Snapshot::new(pages.clone(), None), history_limit);

        Self {
            pages,
            active_page_id,
            selected_element_id: None,
            history,
            revision: 0,
            uncommitted: false,
        }
    }

    pub fn pages(&self) -> &[PageData] {
        &self.pages
    }

    pub fn page(&self, id: &str) -> Option<&PageData> {
        self.pages.iter().find(|p| p.id == id)
    }

    pub fn active_page_id(&self) -> &str {
        &self.active_page_id
    }

    pub fn active_page(&self) -> &PageData {
        self.page(&self.active_page_id).unwrap_or(&self.pages[0])
    }

    pub fn selected_element_id(&self) -> Option<&str> {
        self.selected_element_id.as_deref()
    }

    pub fn selected_element(&self) -> Option<&CanvasElement> {
        self.selected_element_id
            .as_deref()
            .and_then(|id| self.active_page().element(id))
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.uncommitted || self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        !self.uncommitted && self.history.can_redo()
    }

    /// Whether live updates are waiting for a history entry
    pub fn has_uncommitted(&self) -> bool {
        self.uncommitted
    }

    /// Apply a serialized mutation
    pub fn apply(&mut self, mutation: Mutation) -> MutationResult {
        match mutation {
            Mutation::AddElement { element } => self.add_element(element),
            Mutation::UpdateElement { id, patch } => self.update_element(&id, &patch),
            Mutation::CommitUpdate { id, patch } => self.commit_update(&id, &patch),
            Mutation::DeleteElement { id } => self.delete_element(&id),
            Mutation::DuplicateElement { id } => self.duplicate_element(&id),
            Mutation::ReorderElement { id, direction } => self.reorder_element(&id, direction),
            Mutation::SelectElement { id } => self.select_element(id.as_deref()),
            Mutation::SetActivePage { id } => self.set_active_page(&id),
            Mutation::AddPage { name } => self.add_page(name),
            Mutation::DeletePage { id } => self.delete_page(&id),
            Mutation::RenamePage { id, name } => self.rename_page(&id, name),
            Mutation::Commit => self.commit(),
        }
    }

    /// Append an element to the active page and select it
    pub fn add_element(&mut self, mut element: CanvasElement) -> MutationResult {
        if element.is_draft() {
            return MutationResult::noop("the draft id is reserved");
        }
        if self.active_page().contains(element.id()) {
            return MutationResult::noop(format!("element {} already exists", element.id()));
        }

        self.flush();
        if element.base.z_index.is_none() {
            element.base.z_index = Some(self.next_z_index());
        }
        self.selected_element_id = Some(element.id().to_string());
        self.active_page_mut().elements.push(element);
        self.record()
    }

    /// Merge `patch` into an element without a history entry
    pub fn update_element(&mut self, id: &str, patch: &ElementPatch) -> MutationResult {
        let Some(current) = self.active_page().element(id) else {
            return MutationResult::noop(format!("element {} not found", id));
        };

        let updated = match patch.apply_to(current) {
            Ok(updated) => updated,
            Err(e) => {
                tracing::warn!(element = id, error = %e, "rejected element update");
                return MutationResult::noop(e.to_string());
            }
        };
        if &updated == current {
            return MutationResult::noop("update changes nothing");
        }

        if let Some(slot) = self.active_page_mut().element_mut(id) {
            *slot = updated;
        }
        self.revision += 1;
        self.uncommitted = true;
        MutationResult::Applied {
            revision: self.revision,
        }
    }

    /// Merge `patch` into an element and record it as its own entry
    pub fn commit_update(&mut self, id: &str, patch: &ElementPatch) -> MutationResult {
        self.flush();
        let result = self.update_element(id, patch);
        if result.is_applied() {
            self.flush();
        }
        result
    }

    /// Record pending live updates as one history entry
    pub fn commit(&mut self) -> MutationResult {
        if !self.uncommitted {
            return MutationResult::noop("nothing to commit");
        }
        self.flush();
        MutationResult::Applied {
            revision: self.revision,
        }
    }

    pub fn delete_element(&mut self, id: &str) -> MutationResult {
        let Some(index) = self.active_page().position(id) else {
            return MutationResult::noop(format!("element {} not found", id));
        };

        self.flush();
        self.active_page_mut().elements.remove(index);
        if self.selected_element_id.as_deref() == Some(id) {
            self.selected_element_id = None;
        }
        self.record()
    }

    /// Copy an element under a fresh id, offset and painted on top
    pub fn duplicate_element(&mut self, id: &str) -> MutationResult {
        let Some(original) = self.active_page().element(id) else {
            return MutationResult::noop(format!("element {} not found", id));
        };

        let mut copy = original.clone();
        copy.base.id = self.fresh_element_id();
        copy.base.x += DUPLICATE_OFFSET;
        copy.base.y += DUPLICATE_OFFSET;
        copy.base.z_index = Some(self.active_page().max_z_index().unwrap_or(0) + 1);

        self.flush();
        self.selected_element_id = Some(copy.id().to_string());
        self.active_page_mut().elements.push(copy);
        self.record()
    }

    pub fn reorder_element(&mut self, id: &str, direction: ReorderDirection) -> MutationResult {
        let page = self.active_page();
        let order: Vec<(String, i64)> = page
            .paint_order()
            .iter()
            .map(|e| (e.id().to_string(), e.base.z_index.unwrap_or(0)))
            .collect();
        let Some(rank) = order.iter().position(|(eid, _)| eid == id) else {
            return MutationResult::noop(format!("element {} not found", id));
        };
        let z = order[rank].1;
        let top = rank + 1 == order.len();

        match direction {
            ReorderDirection::BringToFront if top => MutationResult::noop("already in front"),
            ReorderDirection::SendToBack if rank == 0 => MutationResult::noop("already at the back"),
            ReorderDirection::BringForward if top => MutationResult::noop("already in front"),
            ReorderDirection::SendBackward if rank == 0 => MutationResult::noop("already at the back"),

            ReorderDirection::BringToFront => {
                let front = order[order.len() - 1].1 + 1;
                self.flush();
                self.set_z_index(id, front);
                self.record()
            }
            ReorderDirection::SendToBack => {
                let back = order[0].1 - 1;
                self.flush();
                self.set_z_index(id, back);
                self.record()
            }
            ReorderDirection::BringForward => {
                let (neighbour, neighbour_z) = order[rank + 1].clone();
                self.flush();
                self.swap_paint_order(id, z, &neighbour, neighbour_z);
                self.record()
            }
            ReorderDirection::SendBackward => {
                let (neighbour, neighbour_z) = order[rank - 1].clone();
                self.flush();
                self.swap_paint_order(id, z, &neighbour, neighbour_z);
                self.record()
            }
        }
    }

    /// Select an element on the active page. Unknown ids clear the selection.
    pub fn select_element(&mut self, id: Option<&str>) -> MutationResult {
        let next = id.filter(|id| self.active_page().contains(id)).map(String::from);
        if next.is_none() && id.is_some() {
            tracing::debug!(element = ?id, "selecting unknown element clears selection");
        }
        if next == self.selected_element_id {
            return MutationResult::noop("selection unchanged");
        }
        self.selected_element_id = next;
        MutationResult::Applied {
            revision: self.revision,
        }
    }

    /// Switch pages; clears the selection
    pub fn set_active_page(&mut self, id: &str) -> MutationResult {
        if self.page(id).is_none() {
            return MutationResult::noop(format!("page {} not found", id));
        }
        if self.active_page_id == id {
            return MutationResult::noop("page already active");
        }
        self.active_page_id = id.to_string();
        self.selected_element_id = None;
        MutationResult::Applied {
            revision: self.revision,
        }
    }

    /// Append a page (named `Side N` by default) and make it active
    pub fn add_page(&mut self, name: Option<String>) -> MutationResult {
        if self.pages.len() >= MAX_PAGES {
            return MutationResult::noop(format!("a design holds at most {} pages", MAX_PAGES));
        }

        let name = name.unwrap_or_else(|| format!("Side {}", self.pages.len() + 1));
        let page = PageData::new(self.fresh_page_id(), name);

        self.flush();
        self.active_page_id = page.id.clone();
        self.selected_element_id = None;
        self.pages.push(page);
        self.record()
    }

    /// Remove a page; the last remaining page is never deleted
    pub fn delete_page(&mut self, id: &str) -> MutationResult {
        let Some(index) = self.pages.iter().position(|p| p.id == id) else {
            return MutationResult::noop(format!("page {} not found", id));
        };
        if self.pages.len() == 1 {
            return MutationResult::noop("cannot delete the last page");
        }

        self.flush();
        self.pages.remove(index);
        if self.active_page_id == id {
            self.active_page_id = self.pages[0].id.clone();
            self.selected_element_id = None;
        }
        self.record()
    }

    pub fn rename_page(&mut self, id: &str, name: String) -> MutationResult {
        match self.page(id) {
            None => return MutationResult::noop(format!("page {} not found", id)),
            Some(page) if page.name == name => return MutationResult::noop("name unchanged"),
            Some(_) => {}
        }

        self.flush();
        if let Some(page) = self.pages.iter_mut().find(|p| p.id == id) {
            page.name = name;
        }
        self.record()
    }

    /// Link an option element to an option set from `library`
    pub fn link_options(&mut self, id: &str, asset_id: &str, library: &AssetLibrary) -> MutationResult {
        let Some(set) = library.option_set(asset_id) else {
            return MutationResult::noop(format!("option set {} not found", asset_id));
        };
        let Some(element) = self.active_page().element(id) else {
            return MutationResult::noop(format!("element {} not found", id));
        };
        let element_type = element.element_type();
        match linked_patch(element, set) {
            Some(patch) => self.commit_update(id, &patch),
            None => MutationResult::noop(format!("{} elements cannot link options", element_type)),
        }
    }

    pub fn unlink_options(&mut self, id: &str) -> MutationResult {
        let Some(element) = self.active_page().element(id) else {
            return MutationResult::noop(format!("element {} not found", id));
        };
        match unlinked_patch(element) {
            Some(patch) => self.commit_update(id, &patch),
            None => MutationResult::noop("element is not linked"),
        }
    }

    /// Step back one history entry; pending live updates are committed first
    pub fn undo(&mut self) -> bool {
        self.flush();
        let Some(snapshot) = self.history.undo().cloned() else {
            tracing::debug!("nothing to undo");
            return false;
        };
        self.restore(snapshot);
        true
    }

    pub fn redo(&mut self) -> bool {
        self.flush();
        let Some(snapshot) = self.history.redo().cloned() else {
            tracing::debug!("nothing to redo");
            return false;
        };
        self.restore(snapshot);
        true
    }

    /// Replace the whole document and start a new history baseline
    pub fn load(&mut self, pages: Vec<PageData>) {
        self.pages = if pages.is_empty() { default_pages() } else { pages };
        if self.page(&self.active_page_id).is_none() {
            self.active_page_id = self.pages[0].id.clone();
        }
        self.selected_element_id = None;
        self.uncommitted = false;
        self.revision += 1;
        self.history.reset(self.snapshot());
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.pages.clone(), self.selected_element_id.clone())
    }

    /// Commit pending live updates, if any
    fn flush(&mut self) {
        if self.uncommitted {
            self.history.commit(self.snapshot());
            self.uncommitted = false;
        }
    }

    /// Finish a committed mutation
    fn record(&mut self) -> MutationResult {
        self.revision += 1;
        self.history.commit(self.snapshot());
        MutationResult::Applied {
            revision: self.revision,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.pages = snapshot.pages;
        if self.page(&self.active_page_id).is_none() {
            self.active_page_id = self.pages[0].id.clone();
        }
        self.selected_element_id = snapshot
            .selected_element_id
            .filter(|id| self.active_page().contains(id));
        self.revision += 1;
        tracing::debug!(
            undo_levels = self.history.undo_levels(),
            redo_levels = self.history.redo_levels(),
            "history restored"
        );
    }

    fn active_page_mut(&mut self) -> &mut PageData {
        let index = self
            .pages
            .iter()
            .position(|p| p.id == self.active_page_id)
            .unwrap_or(0);
        &mut self.pages[index]
    }

    /// Wall-clock milliseconds, kept above every zIndex on the page
    fn next_z_index(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        match self.active_page().max_z_index() {
            Some(max) if max >= now => max + 1,
            _ => now,
        }
    }

    fn set_z_index(&mut self, id: &str, z_index: i64) {
        if let Some(element) = self.active_page_mut().element_mut(id) {
            element.base.z_index = Some(z_index);
        }
    }

    /// Swap two paint-order neighbours. Equal zIndex values are ordered by
    /// array position, so those swap places in the array instead.
    fn swap_paint_order(&mut self, id: &str, z: i64, other: &str, other_z: i64) {
        if z != other_z {
            self.set_z_index(id, other_z);
            self.set_z_index(other, z);
            return;
        }
        let page = self.active_page_mut();
        if let (Some(a), Some(b)) = (page.position(id), page.position(other)) {
            page.elements.swap(a, b);
        }
    }

    fn fresh_element_id(&self) -> String {
        let page = self.active_page();
        let mut stamp = chrono::Utc::now().timestamp_millis();
        loop {
            let id = format!("el-{}", stamp);
            if !page.contains(&id) {
                return id;
            }
            stamp += 1;
        }
    }

    fn fresh_page_id(&self) -> String {
        let mut stamp = chrono::Utc::now().timestamp_millis();
        loop {
            let id = format!("page-{}", stamp);
            if self.page(&id).is_none() {
                return id;
            }
            stamp += 1;
        }
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(default_pages())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composer_with(ids: &[&str]) -> Composer {
        let elements = ids
            .iter()
            .enumerate()
            .map(|(i, id)| CanvasElement::text(*id, "x").with_z_index(i as i64 + 1))
            .collect();
        Composer::new(vec![PageData::new("p1", "Side 1").with_elements(elements)])
    }

    fn paint_ids(composer: &Composer) -> Vec<String> {
        composer
            .active_page()
            .paint_order()
            .iter()
            .map(|e| e.id().to_string())
            .collect()
    }

    #[test]
    fn test_add_selects_and_assigns_z_index() {
        let mut composer = composer_with(&["a"]);
        let result = composer.add_element(CanvasElement::text("b", "B"));

        assert_eq!(result, MutationResult::Applied { revision: 1 });
        assert_eq!(composer.selected_element_id(), Some("b"));
        let z = composer.active_page().element("b").unwrap().base.z_index.unwrap();
        assert!(z > 1);
        assert_eq!(composer.history().undo_levels(), 1);
    }

    #[test]
    fn test_add_refuses_draft_and_duplicate_ids() {
        let mut composer = composer_with(&["a"]);
        assert!(!composer.add_element(CanvasElement::text("draft", "x")).is_applied());
        assert!(!composer.add_element(CanvasElement::text("a", "again")).is_applied());
        assert_eq!(composer.revision(), 0);
        assert!(!composer.can_undo());
    }

    #[test]
    fn test_missing_element_mutations_are_noops() {
        let mut composer = composer_with(&["a"]);
        let patch = ElementPatch::new().position(1.0, 1.0);

        assert!(!composer.update_element("zzz", &patch).is_applied());
        assert!(!composer.delete_element("zzz").is_applied());
        assert!(!composer.duplicate_element("zzz").is_applied());
        assert!(!composer.reorder_element("zzz", ReorderDirection::BringToFront).is_applied());
        assert_eq!(composer.revision(), 0);
    }

    #[test]
    fn test_live_updates_coalesce_into_one_entry() {
        let mut composer = composer_with(&["a"]);
        for x in 1..=10 {
            composer.update_element("a", &ElementPatch::new().set("x", x));
        }
        assert!(composer.has_uncommitted());
        assert_eq!(composer.revision(), 10);
        assert_eq!(composer.history().undo_levels(), 0);

        assert!(composer.commit().is_applied());
        assert_eq!(composer.history().undo_levels(), 1);
        assert!(!composer.commit().is_applied());

        composer.undo();
        assert_eq!(composer.active_page().element("a").unwrap().base.x, 0.0);
    }

    #[test]
    fn test_undo_flushes_pending_live_updates() {
        let mut composer = composer_with(&["a"]);
        composer.update_element("a", &ElementPatch::new().set("x", 50));

        assert!(composer.can_undo());
        assert!(composer.undo());
        assert_eq!(composer.active_page().element("a").unwrap().base.x, 0.0);

        assert!(composer.redo());
        assert_eq!(composer.active_page().element("a").unwrap().base.x, 50.0);
    }

    #[test]
    fn test_committed_mutation_flushes_live_updates_first() {
        let mut composer = composer_with(&["a"]);
        composer.update_element("a", &ElementPatch::new().set("x", 50));
        composer.add_element(CanvasElement::text("b", "B"));

        assert_eq!(composer.history().undo_levels(), 2);
        composer.undo();
        assert!(!composer.active_page().contains("b"));
        assert_eq!(composer.active_page().element("a").unwrap().base.x, 50.0);
    }

    #[test]
    fn test_commit_update_is_one_entry() {
        let mut composer = composer_with(&["a"]);
        let result = composer.commit_update("a", &ElementPatch::new().set("text", "B"));

        assert!(result.is_applied());
        assert!(!composer.has_uncommitted());
        assert_eq!(composer.history().undo_levels(), 1);
    }

    #[test]
    fn test_rejected_patch_is_noop() {
        let mut composer = composer_with(&["a"]);
        let result = composer.update_element("a", &ElementPatch::new().set("type", "image"));

        assert!(matches!(result, MutationResult::Noop { .. }));
        assert_eq!(composer.active_page().element("a").unwrap().element_type().as_str(), "text");
    }

    #[test]
    fn test_delete_clears_selection() {
        let mut composer = composer_with(&["a", "b"]);
        composer.select_element(Some("a"));
        composer.delete_element("a");

        assert_eq!(composer.selected_element_id(), None);
        assert!(!composer.active_page().contains("a"));
    }

    #[test]
    fn test_select_unknown_clears() {
        let mut composer = composer_with(&["a"]);
        composer.select_element(Some("a"));
        composer.select_element(Some("ghost"));
        assert_eq!(composer.selected_element_id(), None);
    }

    #[test]
    fn test_duplicate_offsets_and_selects() {
        let mut composer = composer_with(&["a", "b"]);
        composer.duplicate_element("a");

        let copy = composer.selected_element().unwrap();
        assert_ne!(copy.id(), "a");
        assert_eq!(copy.base.x, 20.0);
        assert_eq!(copy.base.y, 20.0);
        assert_eq!(copy.base.z_index, Some(3));
        assert_eq!(composer.active_page().elements.len(), 3);
    }

    #[test]
    fn test_reorder() {
        let mut composer = composer_with(&["a", "b", "c"]);

        composer.reorder_element("a", ReorderDirection::BringToFront);
        assert_eq!(paint_ids(&composer), vec!["b", "c", "a"]);

        composer.reorder_element("a", ReorderDirection::SendBackward);
        assert_eq!(paint_ids(&composer), vec!["b", "a", "c"]);

        composer.reorder_element("c", ReorderDirection::SendToBack);
        assert_eq!(paint_ids(&composer), vec!["c", "b", "a"]);

        composer.reorder_element("c", ReorderDirection::BringForward);
        assert_eq!(paint_ids(&composer), vec!["b", "c", "a"]);

        assert!(!composer.reorder_element("a", ReorderDirection::BringForward).is_applied());
        assert!(!composer.reorder_element("b", ReorderDirection::SendToBack).is_applied());
    }

    #[test]
    fn test_reorder_with_tied_z_index() {
        let page = PageData::new("p1", "Side 1").with_elements(vec![
            CanvasElement::text("a", "A").with_z_index(5),
            CanvasElement::text("b", "B").with_z_index(5),
        ]);
        let mut composer = Composer::new(vec![page]);

        assert!(composer.reorder_element("a", ReorderDirection::BringForward).is_applied());
        assert_eq!(paint_ids(&composer), vec!["b", "a"]);
    }

    #[test]
    fn test_pages() {
        let mut composer = Composer::default();
        composer.add_page(None);
        assert_eq!(composer.pages().len(), 2);
        assert_eq!(composer.active_page().name, "Side 2");

        let second = composer.active_page_id().to_string();
        composer.rename_page(&second, "Back".to_string());
        assert_eq!(composer.active_page().name, "Back");

        composer.delete_page(&second);
        assert_eq!(composer.pages().len(), 1);
        assert_eq!(composer.active_page_id(), "default");

        assert!(!composer.delete_page("default").is_applied());
    }

    #[test]
    fn test_page_limit() {
        let mut composer = Composer::default();
        for _ in 1..MAX_PAGES {
            assert!(composer.add_page(None).is_applied());
        }
        assert!(!composer.add_page(None).is_applied());
        assert_eq!(composer.pages().len(), MAX_PAGES);
    }

    #[test]
    fn test_set_active_page_has_no_history() {
        let mut composer = Composer::default();
        composer.add_page(Some("Back".to_string()));
        let levels = composer.history().undo_levels();
        let revision = composer.revision();

        assert!(composer.set_active_page("default").is_applied());
        assert_eq!(composer.history().undo_levels(), levels);
        assert_eq!(composer.revision(), revision);
        assert!(!composer.set_active_page("nope").is_applied());
    }

    #[test]
    fn test_undo_restores_active_page_when_removed() {
        let mut composer = Composer::default();
        composer.add_page(None);
        composer.add_element(CanvasElement::text("a", "A"));

        // Undo twice: the element, then the page we're standing on
        composer.undo();
        composer.undo();
        assert_eq!(composer.active_page_id(), "default");
        assert_eq!(composer.selected_element_id(), None);
    }

    #[test]
    fn test_load_starts_new_baseline() {
        let mut composer = composer_with(&["a"]);
        composer.add_element(CanvasElement::text("b", "B"));
        composer.load(vec![PageData::new("server", "Side 1")]);

        assert!(!composer.can_undo());
        assert_eq!(composer.active_page_id(), "server");
        assert_eq!(composer.revision(), 2);
    }
}
