//! Minimal views shared by unit tests

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::navigation::NavigateOptions;
use crate::view::{MountRoot, SharedView, View, ViewId, ViewInstance};

/// View that does nothing but count how often it was destroyed
#[derive(Default, Clone)]
pub struct Blank {
    pub destroyed: Arc<AtomicUsize>,
}

impl Blank {
    pub fn destroy_count(&self) -> usize {
        self.destroyed.load(Ordering::SeqCst)
    }

    pub fn shared(&self, id: &str) -> SharedView {
        ViewInstance::new(ViewId::from(id), Box::new(self.clone())).into_shared()
    }
}

#[async_trait]
impl View for Blank {
    async fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    fn mount(&mut self, _root: &MountRoot) -> Result<()> {
        Ok(())
    }

    fn unmount(&mut self) -> Result<()> {
        Ok(())
    }

    fn show(&mut self) {}

    fn hide(&mut self) {}

    async fn on_activate(&mut self, _options: &NavigateOptions) -> Result<()> {
        Ok(())
    }

    async fn on_deactivate(&mut self) -> Result<()> {
        Ok(())
    }

    fn destroy(&mut self) -> Result<()> {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
