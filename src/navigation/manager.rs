//! The navigation controller.
//!
//! [`ViewManager`] owns the registry, cache, history, queue and metrics and
//! is the only thing that mutates them. Every navigation runs the same
//! pipeline: validate, deactivate the outgoing view, resolve the target
//! (cache hit or factory), activate it, commit. At most one pipeline runs at
//! a time unless a caller forces its way in; everything else waits in the
//! FIFO queue and is handed the busy flag directly when its turn comes.
//!
//! The state lock is a plain `std::sync::Mutex` that is never held across an
//! `.await`: the only suspension points are the view hooks themselves, which
//! run under the per-instance async lock.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::config::NavigatorSettings;
use crate::navigation::cache::ViewCache;
use crate::navigation::error::NavigationError;
use crate::navigation::events::{EventSink, NavigationEvent, NullSink};
use crate::navigation::history::HistoryStack;
use crate::navigation::metrics::{MetricsSnapshot, TransitionMetrics};
use crate::navigation::queue::{
    NavigateOptions, NavigationRequest, PendingNavigation, TransitionQueue, Turn,
};
use crate::navigation::registry::{ViewConfig, ViewRegistry};
use crate::view::instance::destroy_now;
use crate::view::{MountRoot, SharedView, ViewContext, ViewId, ViewInstance};

/// Where the most recent navigation attempt got to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPhase {
    Idle,
    Validating,
    DeactivatingPrevious,
    ResolvingTarget,
    ActivatingTarget,
    Committed,
    Failed,
}

impl TransitionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, TransitionPhase::Committed | TransitionPhase::Failed)
    }
}

impl fmt::Display for TransitionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransitionPhase::Idle => "idle",
            TransitionPhase::Validating => "validating",
            TransitionPhase::DeactivatingPrevious => "deactivating previous",
            TransitionPhase::ResolvingTarget => "resolving target",
            TransitionPhase::ActivatingTarget => "activating target",
            TransitionPhase::Committed => "committed",
            TransitionPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Outcome of a committed navigation
#[derive(Debug, Clone, PartialEq)]
pub struct Navigation {
    pub view: ViewId,
    /// View that was current when the transition started
    pub previous: Option<ViewId>,
    pub duration: Duration,
    /// The request waited in the queue before it ran
    pub deferred: bool,
}

/// Read-only snapshot for UI and debugging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationState {
    pub current: Option<ViewId>,
    pub previous: Option<ViewId>,
    /// Oldest first
    pub history: Vec<ViewId>,
    pub busy: bool,
    /// Busy with the transition indicator enabled
    pub is_transitioning: bool,
    pub queued: usize,
    /// Targets of the queued requests, in run order
    pub queued_views: Vec<ViewId>,
    /// Where `go_back` would go
    pub back_target: Option<ViewId>,
    pub phase: TransitionPhase,
}

#[derive(Clone)]
struct Current {
    id: ViewId,
    view: SharedView,
}

struct State {
    registry: ViewRegistry,
    settings: NavigatorSettings,
    root: Option<MountRoot>,
    cache: ViewCache,
    history: HistoryStack,
    queue: TransitionQueue<InFlight>,
    metrics: TransitionMetrics,
    current: Option<Current>,
    previous: Option<ViewId>,
    /// Busy depth; more than one only while a forced navigation overlaps
    in_flight: usize,
    phase: TransitionPhase,
    /// Bumped by `destroy` so in-flight work can tell it was torn down
    generation: u64,
}

impl State {
    fn new(registry: ViewRegistry) -> Self {
        let settings = NavigatorSettings::default();
        Self {
            registry,
            cache: ViewCache::new(settings.cache_limit),
            history: HistoryStack::new(settings.max_history_length),
            settings,
            root: None,
            queue: TransitionQueue::new(),
            metrics: TransitionMetrics::new(),
            current: None,
            previous: None,
            in_flight: 0,
            phase: TransitionPhase::Idle,
            generation: 0,
        }
    }

    fn is_cacheable(&self, id: &str) -> bool {
        self.settings.enable_view_caching && self.registry.get(id).is_some_and(|config| config.cache)
    }

    fn current_id(&self) -> Option<ViewId> {
        self.current.as_ref().map(|current| current.id.clone())
    }
}

/// What a validated request needs for the rest of its pipeline
struct Plan {
    root: MountRoot,
    config: Arc<ViewConfig>,
    outgoing: Option<Current>,
    transition_ms: Option<u64>,
}

/// One unit of the busy counter. Dropping it settles the transition and
/// hands the controller to the next queued caller, if any.
struct InFlight {
    manager: ViewManager,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.manager.settle();
    }
}

impl fmt::Debug for InFlight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InFlight")
    }
}

enum Admission {
    Run(Turn<InFlight>),
    Queued(tokio::sync::oneshot::Receiver<Turn<InFlight>>),
}

struct Inner {
    state: Mutex<State>,
    events: Arc<dyn EventSink>,
}

/// Cloneable handle to a navigation controller
#[derive(Clone)]
pub struct ViewManager {
    inner: Arc<Inner>,
}

impl Default for ViewManager {
    fn default() -> Self {
        Self::new(Arc::new(NullSink))
    }
}

impl fmt::Debug for ViewManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewManager")
            .field("state", &self.navigation_state())
            .finish_non_exhaustive()
    }
}

impl ViewManager {
    pub fn new(events: Arc<dyn EventSink>) -> Self {
        Self::with_registry(ViewRegistry::new(), events)
    }

    /// Create a manager around an already populated registry
    pub fn with_registry(registry: ViewRegistry, events: Arc<dyn EventSink>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::new(registry)),
                events,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: NavigationEvent) {
        self.inner.events.emit(&event);
    }

    fn set_phase(&self, phase: TransitionPhase) {
        log::debug!("Navigation phase: {}", phase);
        self.lock().phase = phase;
    }

    pub fn register_view(&self, id: impl Into<ViewId>, config: ViewConfig) -> Arc<ViewConfig> {
        let config = self.lock().registry.register(id, config);
        log::info!("📋 Registered view '{}' ({})", config.id, config.title);
        self.emit(NavigationEvent::ViewRegistered {
            view: config.id.clone(),
            title: config.title.clone(),
        });
        config
    }

    /// Attach to `root`, apply `settings` and navigate to the starting view
    /// (`start`, or the configured default view).
    pub async fn initialize(
        &self,
        root: MountRoot,
        start: Option<&str>,
        settings: NavigatorSettings,
    ) -> Result<Navigation, NavigationError> {
        settings.validate().map_err(NavigationError::InvalidSettings)?;
        let start = {
            let mut state = self.lock();
            if state.root.is_some() {
                return Err(NavigationError::AlreadyInitialized);
            }
            state.cache = ViewCache::new(settings.cache_limit);
            state.history = HistoryStack::new(settings.max_history_length);
            state.root = Some(root.clone());
            let start = start.map_or_else(|| ViewId::from(settings.default_view.as_str()), ViewId::from);
            state.settings = settings;
            start
        };

        log::info!("🚀 View manager attached to '{}', starting at '{}'", root, start);
        self.navigate_to(start.as_str(), NavigateOptions::default()).await
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().root.is_some()
    }

    /// Navigate to `id`.
    ///
    /// While another navigation is running the request waits in the queue
    /// (unless `options.force` is set) and this future resolves once its own
    /// transition has settled.
    ///
    /// Once validated, the transition runs on its own task. Dropping this
    /// future (a caller-side timeout, say) stops the wait, not the lifecycle
    /// hooks: the transition still commits or fails and then hands the
    /// controller on.
    pub async fn navigate_to(
        &self,
        id: &str,
        options: NavigateOptions,
    ) -> Result<Navigation, NavigationError> {
        let request = NavigationRequest::new(id, options);
        let (generation, admission) = self.admit(request);

        let (turn, deferred) = match admission {
            Admission::Run(turn) => (turn, false),
            Admission::Queued(waiter) => match waiter.await {
                Ok(turn) => (turn, true),
                Err(_) => return Err(NavigationError::ManagerDestroyed),
            },
        };

        let Turn { request, permit } = turn;
        // Validation mutates nothing and never suspends
        let plan = self
            .plan(&request, generation)
            .map_err(|e| self.reject(&request.view, e))?;

        let manager = self.clone();
        let transition = tokio::spawn(async move {
            let result = manager.run_transition(request, plan, generation, deferred).await;
            drop(permit);
            result
        });

        match transition.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(NavigationError::ManagerDestroyed),
        }
    }

    /// Take the busy flag or join the queue
    fn admit(&self, request: NavigationRequest) -> (u64, Admission) {
        let mut state = self.lock();
        let generation = state.generation;

        if state.in_flight > 0 && !request.options.force {
            let (pending, waiter) = PendingNavigation::new(request);
            state.queue.enqueue(pending);
            return (generation, Admission::Queued(waiter));
        }

        if state.in_flight > 0 {
            log::warn!(
                "Forcing navigation to '{}' past {} running transition(s)",
                request.view,
                state.in_flight
            );
        }
        state.in_flight += 1;
        let permit = InFlight {
            manager: self.clone(),
        };
        (generation, Admission::Run(Turn { request, permit }))
    }

    /// Release one unit of the busy counter, or pass it to the next waiter
    fn settle(&self) {
        let next = {
            let mut state = self.lock();
            if state.in_flight > 1 || state.queue.is_empty() {
                state.in_flight = state.in_flight.saturating_sub(1);
                return;
            }
            state.queue.dequeue()
        };

        if let Some(pending) = next {
            let sequence = pending.request.sequence;
            let view = pending.request.view.clone();
            let permit = InFlight {
                manager: self.clone(),
            };
            if let Err(turn) = pending.hand_off(permit) {
                log::warn!(
                    "Caller of navigation #{} to '{}' went away, skipping it",
                    sequence,
                    view
                );
                // Settles again and moves on to the next waiter
                drop(turn);
            }
        }
    }

    fn plan(&self, request: &NavigationRequest, generation: u64) -> Result<Plan, NavigationError> {
        let state = self.lock();
        if state.generation != generation {
            return Err(NavigationError::ManagerDestroyed);
        }
        let root = state.root.clone().ok_or(NavigationError::NotInitialized)?;
        let config = state
            .registry
            .get(request.view.as_str())
            .ok_or_else(|| NavigationError::ViewNotFound(request.view.clone()))?;

        Ok(Plan {
            root,
            config,
            outgoing: state.current.clone(),
            transition_ms: state
                .settings
                .enable_transitions
                .then_some(state.settings.transition_duration_ms),
        })
    }

    /// Report a request that failed validation. No metrics, no state change.
    fn reject(&self, target: &ViewId, error: NavigationError) -> NavigationError {
        let from = self.lock().current_id();
        log::error!("❌ Navigation to '{}' rejected: {}", target, error);
        self.emit(NavigationEvent::NavigationError {
            from,
            to: target.clone(),
            error: error.to_string(),
        });
        error
    }

    async fn run_transition(
        &self,
        request: NavigationRequest,
        plan: Plan,
        generation: u64,
        deferred: bool,
    ) -> Result<Navigation, NavigationError> {
        let started = Instant::now();
        let target = request.view.clone();
        let options = request.options;
        self.set_phase(TransitionPhase::Validating);

        let from = plan.outgoing.as_ref().map(|current| current.id.clone());
        log::debug!(
            "Navigation #{}: {} -> {}{}",
            request.sequence,
            from.as_ref().map_or("<none>", ViewId::as_str),
            target,
            if deferred { " (deferred)" } else { "" }
        );
        self.emit(NavigationEvent::NavigationStarted {
            from: from.clone(),
            to: target.clone(),
            deferred,
            transition_ms: plan.transition_ms,
        });

        if let Some(outgoing) = &plan.outgoing {
            self.set_phase(TransitionPhase::DeactivatingPrevious);
            self.deactivate_outgoing(outgoing, &target, options, generation)
                .await
                .map_err(|e| self.fail(from.clone(), &target, e))?;
        }

        self.set_phase(TransitionPhase::ResolvingTarget);
        let cached = self.lock().cache.get(target.as_str());
        let (view, fresh) = match cached {
            Some(view) => {
                log::debug!("Cache hit for '{}'", target);
                (view, false)
            }
            None => {
                let view = self
                    .construct(&plan, &target)
                    .await
                    .map_err(|e| self.fail(from.clone(), &target, e))?;
                (view, true)
            }
        };

        if fresh {
            let mut state = self.lock();
            if state.generation == generation && state.is_cacheable(target.as_str()) {
                // The target is the view on screen once this settles
                state.cache.set_active(Some(target.clone()));
                let evicted = state.cache.put(target.clone(), view.clone());
                if !evicted.is_empty() {
                    log::debug!(
                        "Caching '{}' evicted {:?} (limit {})",
                        target,
                        evicted,
                        state.cache.limit()
                    );
                }
            }
        }

        self.set_phase(TransitionPhase::ActivatingTarget);
        let mut instance = view.lock().await;
        let activated = instance.activate(&plan.root, &options).await;
        drop(instance);
        if let Err(source) = activated {
            if fresh && !self.lock().cache.has(target.as_str()) {
                destroy_now(&view);
            }
            return Err(self.fail(
                from,
                &target,
                NavigationError::Activation {
                    view: target.clone(),
                    source,
                },
            ));
        }

        let duration = started.elapsed();
        {
            let mut state = self.lock();
            if state.generation != generation {
                drop(state);
                destroy_now(&view);
                return Err(self.fail(from, &target, NavigationError::ManagerDestroyed));
            }
            state.previous = from.clone();
            state.current = Some(Current {
                id: target.clone(),
                view,
            });
            state.cache.set_active(Some(target.clone()));
            state.metrics.record(&target, duration);
            state.phase = TransitionPhase::Committed;
        }

        log::info!(
            "🧭 Navigated to '{}' in {:.2}ms",
            target,
            duration.as_secs_f64() * 1000.0
        );
        self.emit(NavigationEvent::NavigationComplete {
            from: from.clone(),
            to: target.clone(),
            duration_ms: duration.as_secs_f64() * 1000.0,
        });

        Ok(Navigation {
            view: target,
            previous: from,
            duration,
            deferred,
        })
    }

    /// Deactivate the outgoing view, record it in history and drop it if it
    /// may not be cached
    async fn deactivate_outgoing(
        &self,
        outgoing: &Current,
        target: &ViewId,
        options: NavigateOptions,
        generation: u64,
    ) -> Result<(), NavigationError> {
        let mut instance = outgoing.view.lock().await;
        let deactivated = instance.deactivate().await;
        drop(instance);
        let was_active = deactivated.map_err(|source| NavigationError::Deactivation {
            view: outgoing.id.clone(),
            source,
        })?;

        let keep = {
            let mut state = self.lock();
            if state.generation != generation {
                return Err(NavigationError::ManagerDestroyed);
            }
            if was_active
                && state.settings.enable_history
                && !options.replace_history
                && outgoing.id != *target
            {
                state.history.push(outgoing.id.clone());
            }
            let keep = state.is_cacheable(outgoing.id.as_str());
            if !keep {
                state.cache.remove(outgoing.id.as_str());
            }
            keep
        };

        if !keep {
            log::debug!("View '{}' is not cacheable, destroying it", outgoing.id);
            destroy_now(&outgoing.view);
        }
        Ok(())
    }

    /// Build and initialize a fresh instance of the target
    async fn construct(&self, plan: &Plan, target: &ViewId) -> Result<SharedView, NavigationError> {
        let context = ViewContext {
            view_id: target.clone(),
            root: plan.root.clone(),
            events: self.inner.events.clone(),
        };
        let view = plan
            .config
            .create(context)
            .map_err(|source| NavigationError::Construction {
                view: target.clone(),
                source,
            })?;

        let mut instance = ViewInstance::new(target.clone(), view);
        if let Err(e) = instance.initialize().await {
            if let Err(teardown) = instance.destroy() {
                log::warn!("{}", teardown);
            }
            return Err(NavigationError::Construction {
                view: target.clone(),
                source: anyhow::Error::new(e),
            });
        }
        log::debug!("Constructed view '{}' ({})", target, instance.instance_id());
        Ok(instance.into_shared())
    }

    /// Record a failed attempt. Nothing is rolled back: the outgoing view
    /// stays deactivated and "current" is not moved to the target.
    fn fail(&self, from: Option<ViewId>, target: &ViewId, error: NavigationError) -> NavigationError {
        {
            let mut state = self.lock();
            state.phase = TransitionPhase::Failed;
            state.metrics.record_failure();
            let destroyed = state
                .current
                .as_ref()
                .is_some_and(|current| current.view.try_lock().is_ok_and(|v| v.is_destroyed()));
            if destroyed {
                state.current = None;
            }
            let current = state.current_id();
            state.cache.set_active(current);
        }

        log::error!("❌ Navigation to '{}' failed: {}", target, error);
        self.emit(NavigationEvent::NavigationError {
            from,
            to: target.clone(),
            error: error.to_string(),
        });
        error
    }

    /// Go back one step: the most recent history entry, else the previous
    /// view. `None` when there is nowhere to go.
    pub async fn go_back(&self) -> Result<Option<Navigation>, NavigationError> {
        let target = {
            let mut state = self.lock();
            if state.root.is_none() {
                return Err(NavigationError::NotInitialized);
            }
            match state.history.pop() {
                Some(id) => Some(id),
                None => state.previous.clone(),
            }
        };

        match target {
            Some(id) => {
                log::debug!("Going back to '{}'", id);
                self.navigate_to(id.as_str(), NavigateOptions::replacing_history())
                    .await
                    .map(Some)
            }
            None => {
                log::debug!("Nothing to go back to");
                Ok(None)
            }
        }
    }

    pub fn can_go_back(&self) -> bool {
        let state = self.lock();
        !state.history.is_empty() || state.previous.is_some()
    }

    pub fn clear_history(&self) {
        self.lock().history.clear();
    }

    /// Re-run the pipeline for the current view
    pub async fn refresh(&self) -> Result<Option<Navigation>, NavigationError> {
        let Some(current) = self.current_view_id() else {
            return Ok(None);
        };
        self.navigate_to(current.as_str(), NavigateOptions::default())
            .await
            .map(Some)
    }

    pub fn current_view(&self) -> Option<SharedView> {
        self.lock().current.as_ref().map(|current| current.view.clone())
    }

    pub fn current_view_id(&self) -> Option<ViewId> {
        self.lock().current_id()
    }

    /// Views flagged to appear in navigation, in registration order
    pub fn available_views(&self) -> Vec<Arc<ViewConfig>> {
        self.lock().registry.list_in_nav().cloned().collect()
    }

    pub fn registered_views(&self) -> Vec<Arc<ViewConfig>> {
        self.lock().registry.list_all().cloned().collect()
    }

    pub fn navigation_state(&self) -> NavigationState {
        let state = self.lock();
        let busy = state.in_flight > 0;
        NavigationState {
            current: state.current_id(),
            previous: state.previous.clone(),
            history: state.history.peek_all(),
            busy,
            is_transitioning: busy && state.settings.enable_transitions,
            queued: state.queue.len(),
            queued_views: state.queue.views(),
            back_target: state.history.peek().cloned().or_else(|| state.previous.clone()),
            phase: state.phase,
        }
    }

    pub fn is_transitioning(&self) -> bool {
        let state = self.lock();
        state.in_flight > 0 && state.settings.enable_transitions
    }

    pub fn history(&self) -> Vec<ViewId> {
        self.lock().history.peek_all()
    }

    pub fn cached_views(&self) -> Vec<ViewId> {
        self.lock().cache.ids()
    }

    pub fn settings(&self) -> NavigatorSettings {
        self.lock().settings.clone()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        let state = self.lock();
        state.metrics.snapshot(state.cache.ids())
    }

    /// Tear everything down: destroy every live view, reject queued
    /// requests and forget registrations, history and metrics. Calling it
    /// again is a no-op. The manager can be initialized again afterwards.
    pub fn destroy(&self) {
        let (mut cache, current, rejected) = {
            let mut state = self.lock();
            let live = state.root.is_some()
                || state.current.is_some()
                || !state.cache.is_empty()
                || !state.queue.is_empty()
                || !state.registry.is_empty();
            if !live {
                log::debug!("View manager already destroyed");
                return;
            }

            state.generation += 1;
            let rejected = state.queue.clear();
            let limit = state.settings.cache_limit;
            let cache = std::mem::replace(&mut state.cache, ViewCache::new(limit));
            let current = state.current.take();
            state.previous = None;
            state.history.clear();
            state.registry = ViewRegistry::new();
            state.metrics = TransitionMetrics::new();
            state.root = None;
            state.phase = TransitionPhase::Idle;
            (cache, current, rejected)
        };

        let destroyed = cache.clear();
        if let Some(current) = current {
            destroy_now(&current.view);
        }
        if rejected > 0 {
            log::warn!("Rejected {} queued navigation(s) on destroy", rejected);
        }
        log::info!("🧹 View manager destroyed ({} cached view(s) released)", destroyed);
    }
}
