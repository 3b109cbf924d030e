use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::navigation::{EventSink, NavigateOptions};
use crate::view::ViewId;

/// Reference to the element every view is mounted under (e.g. "#app")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MountRoot(String);

impl MountRoot {
    pub fn new(selector: impl Into<String>) -> Self {
        Self(selector.into())
    }

    pub fn selector(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MountRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything a factory gets when it builds a view
#[derive(Clone)]
pub struct ViewContext {
    pub view_id: ViewId,
    pub root: MountRoot,
    pub events: Arc<dyn EventSink>,
}

impl fmt::Debug for ViewContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewContext")
            .field("view_id", &self.view_id)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

/// The contract every navigable view implements.
///
/// The navigation core calls these hooks in lifecycle order and awaits the
/// async ones before moving on. Errors returned from a hook propagate to the
/// controller and fail the navigation; errors from the view's own rendering
/// work belong in [`View::render`], where the host catches and reports them.
#[async_trait]
pub trait View: Send {
    /// One-time async setup after construction
    async fn initialize(&mut self) -> Result<()>;

    /// Attach to the root; the view stays hidden
    fn mount(&mut self, root: &MountRoot) -> Result<()>;

    /// Detach from the root
    fn unmount(&mut self) -> Result<()>;

    fn show(&mut self);

    fn hide(&mut self);

    /// Called every time the view becomes the current view
    async fn on_activate(&mut self, options: &NavigateOptions) -> Result<()>;

    /// Called every time the view stops being the current view
    async fn on_deactivate(&mut self) -> Result<()>;

    /// Release everything; called exactly once
    fn destroy(&mut self) -> Result<()>;

    /// Draw the view's content
    fn render(&mut self) -> Result<()> {
        Ok(())
    }
}
