//! Shared fixtures for the integration tests
#![allow(dead_code)]

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use view_navigator::{
    MountRoot, NavigateOptions, NavigatorSettings, View, ViewConfig, ViewManager,
};

/// Ordered record of every hook call, as "view:hook"
#[derive(Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
    active: Arc<Mutex<HashSet<u64>>>,
}

impl Journal {
    fn record(&self, view: &str, hook: &str) {
        self.entries.lock().unwrap().push(format!("{}:{}", view, hook));
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries.lock().unwrap().iter().filter(|e| *e == entry).count()
    }

    /// Number of view instances currently between a successful
    /// `on_activate` and the matching `on_deactivate`/`destroy`
    pub fn active_count(&self) -> usize {
        self.active.lock().unwrap().len()
    }

    /// Yield to the runtime until `entry` has been recorded, so spawned
    /// transitions get to run up to a known hook
    pub async fn reached(&self, entry: &str) {
        for _ in 0..1000 {
            if self.count(entry) > 0 {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("'{}' was never recorded: {:?}", entry, self.entries());
    }
}

/// Closed until `open` is called; stays open afterwards
#[derive(Clone)]
pub struct Gate {
    permits: Arc<Semaphore>,
}

impl Gate {
    pub fn new() -> Self {
        Self {
            permits: Arc::new(Semaphore::new(0)),
        }
    }

    pub fn open(&self) {
        self.permits.add_permits(1);
    }

    async fn pass(&self) -> Result<()> {
        let _permit = self.permits.acquire().await?;
        Ok(())
    }
}

/// How a recording view should behave
#[derive(Clone, Default)]
pub struct Behavior {
    pub fail_factory: bool,
    pub fail_initialize: bool,
    pub fail_activate: bool,
    pub fail_deactivate: bool,
    pub fail_render: bool,
    /// `on_activate` waits for this gate
    pub gate: Option<Gate>,
}

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

pub struct RecordingView {
    name: String,
    serial: u64,
    journal: Journal,
    behavior: Behavior,
}

#[async_trait]
impl View for RecordingView {
    async fn initialize(&mut self) -> Result<()> {
        self.journal.record(&self.name, "initialize");
        if self.behavior.fail_initialize {
            return Err(anyhow!("{} could not load its data", self.name));
        }
        Ok(())
    }

    fn mount(&mut self, _root: &MountRoot) -> Result<()> {
        self.journal.record(&self.name, "mount");
        Ok(())
    }

    fn unmount(&mut self) -> Result<()> {
        self.journal.record(&self.name, "unmount");
        Ok(())
    }

    fn show(&mut self) {
        self.journal.record(&self.name, "show");
    }

    fn hide(&mut self) {
        self.journal.record(&self.name, "hide");
    }

    async fn on_activate(&mut self, _options: &NavigateOptions) -> Result<()> {
        self.journal.record(&self.name, "on_activate");
        if let Some(gate) = &self.behavior.gate {
            gate.pass().await?;
        }
        if self.behavior.fail_activate {
            return Err(anyhow!("{} refused to activate", self.name));
        }
        self.journal.active.lock().unwrap().insert(self.serial);
        Ok(())
    }

    async fn on_deactivate(&mut self) -> Result<()> {
        self.journal.record(&self.name, "on_deactivate");
        if self.behavior.fail_deactivate {
            return Err(anyhow!("{} has unsaved changes", self.name));
        }
        self.journal.active.lock().unwrap().remove(&self.serial);
        Ok(())
    }

    fn destroy(&mut self) -> Result<()> {
        self.journal.record(&self.name, "destroy");
        self.journal.active.lock().unwrap().remove(&self.serial);
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        if self.behavior.fail_render {
            return Err(anyhow!("{} failed to render", self.name));
        }
        Ok(())
    }
}

pub fn recording_config(id: &str, cache: bool, journal: &Journal, behavior: Behavior) -> ViewConfig {
    let name = id.to_string();
    let journal = journal.clone();
    ViewConfig::builder(id)
        .title(&id.to_uppercase())
        .cache(cache)
        .factory(move |_context| {
            if behavior.fail_factory {
                return Err(anyhow!("no constructor for {}", name));
            }
            journal.record(&name, "construct");
            Ok(Box::new(RecordingView {
                name: name.clone(),
                serial: NEXT_INSTANCE.fetch_add(1, Ordering::SeqCst),
                journal: journal.clone(),
                behavior: behavior.clone(),
            }))
        })
        .build()
        .unwrap()
}

/// Manager with plain cacheable recording views for each id
pub fn manager_with(ids: &[&str], journal: &Journal) -> ViewManager {
    let manager = ViewManager::default();
    for id in ids {
        manager.register_view(*id, recording_config(id, true, journal, Behavior::default()));
    }
    manager
}

pub fn settings(cache_limit: usize, max_history_length: usize) -> NavigatorSettings {
    NavigatorSettings::builder()
        .enable_transitions(false)
        .cache_limit(cache_limit)
        .max_history_length(max_history_length)
        .build()
        .unwrap()
}

pub async fn start(manager: &ViewManager, view: &str, settings: NavigatorSettings) {
    manager
        .initialize(MountRoot::new("#app"), Some(view), settings)
        .await
        .unwrap();
}
