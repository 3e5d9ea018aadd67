use crate::error::Result;
use crate::store::{Store, normalize_sub};
use serde::Serialize;

/// Whether a pending entry adds or removes a name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Change {
    Add,
    Remove,
}

/// Edits to the ignored list that have not been saved yet
#[derive(Debug, Clone, Default)]
pub struct StagedChanges {
    adds: Vec<String>,
    removes: Vec<String>,
}

fn sort_names(names: &mut [String]) {
    names.sort_by_key(|name| name.to_lowercase());
}

impl StagedChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `raw` for addition. A name staged for removal is unstaged instead; names
    /// already ignored are left alone. Returns the normalized name, if any.
    pub fn stage_add(&mut self, store: &Store, raw: &str) -> Option<String> {
        let name = normalize_sub(raw);
        if name.is_empty() {
            return None;
        }

        if let Some(index) = self.removes.iter().position(|n| *n == name) {
            self.removes.remove(index);
        } else if !store.is_ignored(&name) && !self.adds.contains(&name) {
            self.adds.push(name.clone());
        }
        Some(name)
    }

    /// Click on a listed name: undo a staged add, else flip its staged removal
    pub fn toggle_remove(&mut self, name: &str) {
        if let Some(index) = self.adds.iter().position(|n| n == name) {
            self.adds.remove(index);
        } else if let Some(index) = self.removes.iter().position(|n| n == name) {
            self.removes.remove(index);
        } else {
            self.removes.push(name.to_string());
        }
    }

    /// Drop any staging of `name`
    pub fn unstage(&mut self, name: &str) {
        self.adds.retain(|n| n != name);
        self.removes.retain(|n| n != name);
    }

    pub fn is_staged_for_removal(&self, name: &str) -> bool {
        self.removes.iter().any(|n| n == name)
    }

    pub fn is_empty(&self) -> bool {
        self.adds.is_empty() && self.removes.is_empty()
    }

    /// Pending entries: removals first, then additions, each sorted case-insensitively
    pub fn pending(&self) -> Vec<(Change, String)> {
        let mut removes = self.removes.clone();
        let mut adds = self.adds.clone();
        sort_names(&mut removes);
        sort_names(&mut adds);

        removes
            .into_iter()
            .map(|name| (Change::Remove, name))
            .chain(adds.into_iter().map(|name| (Change::Add, name)))
            .collect()
    }

    /// The list that saving would write
    pub fn preview(&self, store: &Store) -> Vec<String> {
        let mut names: Vec<String> = store
            .ignored_names()
            .into_iter()
            .filter(|name| !self.removes.contains(name))
            .collect();
        for name in &self.adds {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        sort_names(&mut names);
        names
    }

    /// Write the staged edits and clear them; on failure the staging is kept
    pub fn commit(&mut self, store: &mut Store) -> Result<Vec<String>> {
        let names = self.preview(store);
        store.set_ignored_names(names.iter().cloned())?;
        log::info!(
            "saved ignored list: {} added, {} removed",
            self.adds.len(),
            self.removes.len()
        );
        self.discard();
        Ok(names)
    }

    pub fn discard(&mut self) {
        self.adds.clear();
        self.removes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        let mut store = Store::in_memory();
        store.set_ignored_names(["news", "Pics"]).unwrap();
        store
    }

    #[test]
    fn test_stage_add_normalizes_and_dedups() {
        let store = store();
        let mut staged = StagedChanges::new();

        assert_eq!(staged.stage_add(&store, " /r/rust/ "), Some("rust".to_string()));
        staged.stage_add(&store, "rust");
        staged.stage_add(&store, "news");
        assert_eq!(staged.stage_add(&store, "/r/"), None);

        assert_eq!(staged.pending(), vec![(Change::Add, "rust".to_string())]);
    }

    #[test]
    fn test_toggle_remove_cycles() {
        let mut staged = StagedChanges::new();

        staged.toggle_remove("news");
        assert!(staged.is_staged_for_removal("news"));
        staged.toggle_remove("news");
        assert!(staged.is_empty());
    }

    #[test]
    fn test_add_cancels_removal_and_removal_cancels_add() {
        let store = store();
        let mut staged = StagedChanges::new();

        staged.toggle_remove("news");
        staged.stage_add(&store, "news");
        assert!(staged.is_empty());

        staged.stage_add(&store, "rust");
        staged.toggle_remove("rust");
        assert!(staged.is_empty());
    }

    #[test]
    fn test_pending_order() {
        let store = store();
        let mut staged = StagedChanges::new();
        staged.stage_add(&store, "zig");
        staged.stage_add(&store, "Apple");
        staged.toggle_remove("Pics");
        staged.toggle_remove("news");

        assert_eq!(
            staged.pending(),
            vec![
                (Change::Remove, "news".to_string()),
                (Change::Remove, "Pics".to_string()),
                (Change::Add, "Apple".to_string()),
                (Change::Add, "zig".to_string()),
            ]
        );

        staged.unstage("zig");
        staged.unstage("news");
        assert_eq!(staged.pending().len(), 2);
    }

    #[test]
    fn test_commit_and_discard() {
        let mut store = store();
        let mut staged = StagedChanges::new();
        staged.stage_add(&store, "rust");
        staged.toggle_remove("news");

        assert_eq!(staged.preview(&store), vec!["Pics", "rust"]);
        assert_eq!(staged.commit(&mut store).unwrap(), vec!["Pics", "rust"]);
        assert!(staged.is_empty());
        assert!(store.is_ignored("rust"));
        assert!(!store.is_ignored("news"));

        staged.stage_add(&store, "golang");
        staged.discard();
        assert!(staged.is_empty());
        assert!(!store.is_ignored("golang"));
    }
}
