use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::navigation::{LifecycleError, NavigateOptions};
use crate::view::{MountRoot, View, ViewId, ViewState};

/// Handle shared between the view cache and the current-view slot
pub type SharedView = Arc<Mutex<ViewInstance>>;

/// Destroy a shared instance without suspending.
///
/// Returns `false` when the instance is locked by a hook that is still
/// running; it is left untouched in that case.
pub fn destroy_now(view: &SharedView) -> bool {
    match view.try_lock() {
        Ok(mut instance) => {
            if let Err(e) = instance.destroy() {
                log::warn!("{}", e);
            }
            true
        }
        Err(_) => false,
    }
}

/// Host around a single view: enforces the lifecycle order and keeps the
/// bookkeeping (state, timestamps, render and error counters) the view
/// itself should not have to care about.
pub struct ViewInstance {
    id: ViewId,
    instance_id: Uuid,
    view: Box<dyn View>,
    state: ViewState,
    created_at: DateTime<Utc>,
    activations: u64,
    render_count: u64,
    error_count: u64,
}

impl ViewInstance {
    pub fn new(id: ViewId, view: Box<dyn View>) -> Self {
        Self {
            id,
            instance_id: Uuid::new_v4(),
            view,
            state: ViewState::Constructed,
            created_at: Utc::now(),
            activations: 0,
            render_count: 0,
            error_count: 0,
        }
    }

    pub fn into_shared(self) -> SharedView {
        Arc::new(Mutex::new(self))
    }

    pub fn id(&self) -> &ViewId {
        &self.id
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ViewState::Active
    }

    pub fn is_mounted(&self) -> bool {
        self.state.is_mounted()
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn activations(&self) -> u64 {
        self.activations
    }

    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    pub fn error_count(&self) -> u64 {
        self.error_count
    }

    fn transition(&mut self, next: ViewState) -> Result<(), LifecycleError> {
        if !self.state.can_transition_to(next) {
            return Err(self.invalid(next));
        }
        log::debug!("View '{}' {} -> {}", self.id, self.state, next);
        self.state = next;
        Ok(())
    }

    fn invalid(&self, to: ViewState) -> LifecycleError {
        LifecycleError::InvalidTransition {
            view: self.id.clone(),
            from: self.state,
            to,
        }
    }

    fn hook_error(&self, hook: &'static str, source: anyhow::Error) -> LifecycleError {
        LifecycleError::Hook {
            view: self.id.clone(),
            hook,
            source,
        }
    }

    /// Run the async `initialize` hook (Constructed -> Initialized)
    pub async fn initialize(&mut self) -> Result<(), LifecycleError> {
        if self.state != ViewState::Constructed {
            return Err(self.invalid(ViewState::Initialized));
        }
        self.view
            .initialize()
            .await
            .map_err(|e| self.hook_error("initialize", e))?;
        self.transition(ViewState::Initialized)
    }

    /// Attach to the root (Initialized -> Hidden). Mounting twice is a no-op.
    pub fn mount(&mut self, root: &MountRoot) -> Result<(), LifecycleError> {
        if self.state.is_mounted() {
            return Ok(());
        }
        if self.state != ViewState::Initialized {
            return Err(self.invalid(ViewState::Hidden));
        }
        self.view
            .mount(root)
            .map_err(|e| self.hook_error("mount", e))?;
        self.transition(ViewState::Hidden)
    }

    /// Mount if needed, make visible, render and run `on_activate`.
    ///
    /// If `on_activate` fails the view is hidden again and stays mounted.
    pub async fn activate(
        &mut self,
        root: &MountRoot,
        options: &NavigateOptions,
    ) -> Result<(), LifecycleError> {
        match self.state {
            ViewState::Constructed | ViewState::Destroyed => {
                return Err(self.invalid(ViewState::Active));
            }
            ViewState::Initialized => self.mount(root)?,
            ViewState::Hidden | ViewState::Active => {}
        }

        let was_active = self.state == ViewState::Active;
        if !was_active {
            self.view.show();
            self.render_contents();
        }

        if let Err(e) = self.view.on_activate(options).await {
            if !was_active {
                self.view.hide();
            }
            return Err(self.hook_error("on_activate", e));
        }

        if !was_active {
            self.transition(ViewState::Active)?;
        }
        self.activations += 1;
        Ok(())
    }

    /// Run `on_deactivate` and hide (Active -> Hidden).
    ///
    /// Returns `false` without touching the view when it was not active.
    pub async fn deactivate(&mut self) -> Result<bool, LifecycleError> {
        if self.state != ViewState::Active {
            log::debug!("View '{}' is {}, skipping deactivation", self.id, self.state);
            return Ok(false);
        }
        self.view
            .on_deactivate()
            .await
            .map_err(|e| self.hook_error("on_deactivate", e))?;
        self.view.hide();
        self.transition(ViewState::Hidden)?;
        Ok(true)
    }

    /// Terminal teardown. The instance is `Destroyed` afterwards even when a
    /// hook fails; the first hook error is returned.
    pub fn destroy(&mut self) -> Result<(), LifecycleError> {
        if self.state == ViewState::Destroyed {
            return Ok(());
        }

        let mut first_error = None;
        if self.state.is_mounted() {
            if let Err(e) = self.view.unmount() {
                first_error = Some(self.hook_error("unmount", e));
            }
        }
        if let Err(e) = self.view.destroy() {
            let err = self.hook_error("destroy", e);
            first_error.get_or_insert(err);
        }

        log::debug!("View '{}' {} -> destroyed", self.id, self.state);
        self.state = ViewState::Destroyed;

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Re-render an active view (e.g. after its data changed)
    pub fn rerender(&mut self) {
        if self.state == ViewState::Active {
            self.render_contents();
        }
    }

    /// Record an error raised by the view's own work. Never propagated.
    pub fn report_error(&mut self, error: &anyhow::Error) {
        self.error_count += 1;
        log::error!("View '{}' reported an error: {:#}", self.id, error);
    }

    fn render_contents(&mut self) {
        self.render_count += 1;
        if let Err(e) = self.view.render() {
            self.report_error(&e);
        }
    }
}

impl fmt::Debug for ViewInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewInstance")
            .field("id", &self.id)
            .field("instance_id", &self.instance_id)
            .field("state", &self.state)
            .field("created_at", &self.created_at)
            .field("render_count", &self.render_count)
            .field("error_count", &self.error_count)
            .finish()
    }
}
