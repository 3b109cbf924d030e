//! Bounded back-navigation history.
//!
//! Writes trim the oldest entry once the bound is reached; reads pop the
//! most recent one.

use std::collections::VecDeque;

use crate::view::ViewId;

#[derive(Debug, Clone)]
pub struct HistoryStack {
    entries: VecDeque<ViewId>,
    max_len: usize,
}

impl HistoryStack {
    pub fn new(max_len: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_len.min(64)),
            max_len,
        }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn push(&mut self, id: ViewId) {
        if self.max_len == 0 {
            return;
        }
        while self.entries.len() >= self.max_len {
            if let Some(dropped) = self.entries.pop_front() {
                log::debug!("History full, dropping oldest entry '{}'", dropped);
            }
        }
        self.entries.push_back(id);
    }

    pub fn pop(&mut self) -> Option<ViewId> {
        self.entries.pop_back()
    }

    pub fn peek(&self) -> Option<&ViewId> {
        self.entries.back()
    }

    /// Oldest first, for breadcrumbs
    pub fn peek_all(&self) -> Vec<ViewId> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
