//! Bounded, insertion-ordered store of live view instances.
//!
//! Eviction removes the oldest inserted entry that is not the active view.
//! When the active view is the only candidate the cache is allowed to sit
//! one entry above its limit rather than destroy the view on screen.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::view::instance::destroy_now;
use crate::view::{SharedView, ViewId};

struct CacheEntry {
    id: ViewId,
    view: SharedView,
}

pub struct ViewCache {
    limit: usize,
    entries: VecDeque<CacheEntry>,
    /// View that must survive eviction
    active: Option<ViewId>,
}

impl ViewCache {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            entries: VecDeque::new(),
            active: None,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mark the view that eviction must skip
    pub fn set_active(&mut self, id: Option<ViewId>) {
        self.active = id;
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == *id)
    }

    pub fn get(&self, id: &str) -> Option<SharedView> {
        self.position(id).map(|slot| self.entries[slot].view.clone())
    }

    pub fn has(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Cached ids, oldest insertion first
    pub fn ids(&self) -> Vec<ViewId> {
        self.entries.iter().map(|entry| entry.id.clone()).collect()
    }

    /// Insert an instance, then evict until the cache fits its limit.
    ///
    /// Putting an id that is already cached keeps its position; a different
    /// instance replaces (and destroys) the old one. Returns the evicted ids.
    pub fn put(&mut self, id: ViewId, view: SharedView) -> Vec<ViewId> {
        if let Some(slot) = self.position(id.as_str()) {
            let entry = &mut self.entries[slot];
            if !Arc::ptr_eq(&entry.view, &view) {
                log::warn!("Replacing cached instance of '{}'", id);
                let old = std::mem::replace(&mut entry.view, view);
                Self::destroy_entry(&id, &old);
            }
            return Vec::new();
        }

        log::debug!("Caching view '{}' ({}/{})", id, self.entries.len() + 1, self.limit);
        self.entries.push_back(CacheEntry { id, view });

        let mut evicted = Vec::new();
        while self.entries.len() > self.limit {
            match self.eviction_candidate() {
                Some(slot) => {
                    Self::destroy_entry(&self.entries[slot].id, &self.entries[slot].view);
                    if let Some(entry) = self.entries.remove(slot) {
                        log::info!("Evicted view '{}' from cache", entry.id);
                        evicted.push(entry.id);
                    }
                }
                None => {
                    log::debug!(
                        "Cache holds {} entries over a limit of {}, only the active view is left to evict",
                        self.entries.len(),
                        self.limit
                    );
                    break;
                }
            }
        }
        evicted
    }

    /// Eviction policy: oldest inserted entry that is not the active view
    fn eviction_candidate(&self) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| self.active.as_ref() != Some(&entry.id))
    }

    /// Destroy and drop a cached view. Returns whether it was cached.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(slot) => {
                Self::destroy_entry(&self.entries[slot].id, &self.entries[slot].view);
                self.entries.remove(slot);
                log::debug!("Removed view '{}' from cache", id);
                true
            }
            None => false,
        }
    }

    /// Destroy every cached instance. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        for entry in self.entries.drain(..) {
            Self::destroy_entry(&entry.id, &entry.view);
        }
        self.active = None;
        count
    }

    fn destroy_entry(id: &ViewId, view: &SharedView) {
        if !destroy_now(view) {
            log::warn!("View '{}' is busy in a lifecycle hook, dropping it without destroy", id);
        }
    }
}

impl std::fmt::Debug for ViewCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewCache")
            .field("limit", &self.limit)
            .field("ids", &self.ids())
            .field("active", &self.active)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::testing::Blank;

    fn ids(cache: &ViewCache) -> Vec<String> {
        cache.ids().iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_put_and_get() {
        let mut cache = ViewCache::new(3);
        let blank = Blank::default();
        cache.put(ViewId::from("home"), blank.shared("home"));

        assert!(cache.has("home"));
        assert!(cache.get("home").is_some());
        assert!(cache.get("settings").is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evicts_oldest_and_destroys_it() {
        let mut cache = ViewCache::new(2);
        let home = Blank::default();
        let settings = Blank::default();
        let about = Blank::default();

        cache.put(ViewId::from("home"), home.shared("home"));
        cache.put(ViewId::from("settings"), settings.shared("settings"));
        let evicted = cache.put(ViewId::from("about"), about.shared("about"));

        assert_eq!(evicted, vec![ViewId::from("home")]);
        assert_eq!(ids(&cache), vec!["settings", "about"]);
        assert_eq!(home.destroy_count(), 1);
        assert_eq!(settings.destroy_count(), 0);
    }

    #[test]
    fn test_never_evicts_active_view() {
        let mut cache = ViewCache::new(2);
        let home = Blank::default();
        let settings = Blank::default();

        cache.put(ViewId::from("home"), home.shared("home"));
        cache.put(ViewId::from("settings"), settings.shared("settings"));
        cache.set_active(Some(ViewId::from("home")));
        let evicted = cache.put(ViewId::from("about"), Blank::default().shared("about"));

        assert_eq!(evicted, vec![ViewId::from("settings")]);
        assert_eq!(ids(&cache), vec!["home", "about"]);
        assert_eq!(home.destroy_count(), 0);
        assert_eq!(settings.destroy_count(), 1);
    }

    #[test]
    fn test_limit_one_with_active_view_exceeds_by_one() {
        let mut cache = ViewCache::new(1);
        let home = Blank::default();
        cache.put(ViewId::from("home"), home.shared("home"));
        cache.set_active(Some(ViewId::from("home")));

        // Already at the limit: the only entry is active, nothing to evict
        assert!(cache.put(ViewId::from("home"), cache.get("home").unwrap()).is_empty());
        assert_eq!(cache.len(), 1);

        cache.set_active(Some(ViewId::from("detail")));
        let detail = Blank::default();
        let evicted = cache.put(ViewId::from("detail"), detail.shared("detail"));
        assert_eq!(evicted, vec![ViewId::from("home")]);
        assert_eq!(ids(&cache), vec!["detail"]);
    }

    #[test]
    fn test_only_active_left_is_accepted_overflow() {
        let mut cache = ViewCache::new(0);
        let home = Blank::default();
        cache.set_active(Some(ViewId::from("home")));
        let evicted = cache.put(ViewId::from("home"), home.shared("home"));

        assert!(evicted.is_empty());
        assert_eq!(cache.len(), 1);
        assert_eq!(home.destroy_count(), 0);
    }

    #[test]
    fn test_reput_same_id_keeps_position() {
        let mut cache = ViewCache::new(3);
        let first = Blank::default();
        let second = Blank::default();
        cache.put(ViewId::from("home"), first.shared("home"));
        cache.put(ViewId::from("settings"), Blank::default().shared("settings"));
        cache.put(ViewId::from("home"), second.shared("home"));

        assert_eq!(ids(&cache), vec!["home", "settings"]);
        assert_eq!(first.destroy_count(), 1);
        assert_eq!(second.destroy_count(), 0);
    }

    #[test]
    fn test_remove_and_clear_destroy() {
        let mut cache = ViewCache::new(3);
        let home = Blank::default();
        let settings = Blank::default();
        cache.put(ViewId::from("home"), home.shared("home"));
        cache.put(ViewId::from("settings"), settings.shared("settings"));

        assert!(cache.remove("home"));
        assert!(!cache.remove("home"));
        assert_eq!(home.destroy_count(), 1);

        assert_eq!(cache.clear(), 1);
        assert_eq!(settings.destroy_count(), 1);
        assert!(cache.is_empty());
    }
}
