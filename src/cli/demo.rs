//! Demo views used by the command line driver

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

use view_navigator::{
    MountRoot, NavigateOptions, View, ViewConfig, ViewContext, ViewId, ViewRegistry,
};

/// A view that "renders" into the log
pub struct DemoView {
    id: ViewId,
    title: String,
    root: Option<MountRoot>,
    visible: bool,
    /// Simulated async setup cost
    load_delay: Duration,
    lines: Vec<String>,
}

impl DemoView {
    pub fn new(context: &ViewContext, title: &str, load_delay: Duration) -> Self {
        Self {
            id: context.view_id.clone(),
            title: title.to_string(),
            root: None,
            visible: false,
            load_delay,
            lines: Vec::new(),
        }
    }
}

#[async_trait]
impl View for DemoView {
    async fn initialize(&mut self) -> Result<()> {
        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }
        self.lines = vec![format!("<h1>{}</h1>", self.title)];
        log::debug!("[{}] loaded", self.id);
        Ok(())
    }

    fn mount(&mut self, root: &MountRoot) -> Result<()> {
        log::debug!("[{}] mounted under {}", self.id, root);
        self.root = Some(root.clone());
        Ok(())
    }

    fn unmount(&mut self) -> Result<()> {
        self.root = None;
        Ok(())
    }

    fn show(&mut self) {
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
    }

    async fn on_activate(&mut self, options: &NavigateOptions) -> Result<()> {
        log::debug!("[{}] activated ({:?})", self.id, options);
        Ok(())
    }

    async fn on_deactivate(&mut self) -> Result<()> {
        log::debug!("[{}] deactivated", self.id);
        Ok(())
    }

    fn destroy(&mut self) -> Result<()> {
        log::debug!("[{}] destroyed", self.id);
        self.lines.clear();
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        if !self.visible {
            anyhow::bail!("render called on hidden view '{}'", self.id);
        }
        for line in &self.lines {
            log::debug!("[{}] {}", self.id, line);
        }
        Ok(())
    }
}

fn demo_view(id: &str, title: &str, icon: &str, load_ms: u64) -> Result<ViewConfig> {
    let owned_title = title.to_string();
    ViewConfig::builder(id)
        .title(title)
        .icon(icon)
        .factory(move |context| {
            Ok(Box::new(DemoView::new(
                &context,
                &owned_title,
                Duration::from_millis(load_ms),
            )))
        })
        .build()
}

/// Registry with the demo views: home, settings, detail (never cached) and
/// about (hidden from navigation)
pub fn demo_registry() -> Result<ViewRegistry> {
    let mut registry = ViewRegistry::new();
    registry.register("home", demo_view("home", "Home", "🏠", 0)?);
    registry.register("settings", demo_view("settings", "Settings", "⚙️", 5)?);

    let mut detail = demo_view("detail", "Detail", "🔍", 10)?;
    detail.cache = false;
    detail.description = "Rebuilt on every visit".to_string();
    registry.register("detail", detail);

    let mut about = demo_view("about", "About", "ℹ️", 0)?;
    about.show_in_nav = false;
    registry.register("about", about);

    Ok(registry)
}
