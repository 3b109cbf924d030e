//! Navigation core: registry, cache, queue, history, metrics, events and the
//! controller that ties them together.

pub mod cache;
pub mod error;
pub mod events;
pub mod history;
pub mod manager;
pub mod metrics;
pub mod queue;
pub mod registry;

pub use cache::ViewCache;
pub use error::{ErrorCategory, LifecycleError, NavigationError};
pub use events::{EventBus, EventSink, NavigationEvent, NullSink};
pub use history::HistoryStack;
pub use manager::{Navigation, NavigationState, TransitionPhase, ViewManager};
pub use metrics::{MetricsSnapshot, TransitionMetrics, TransitionStats};
pub use queue::{NavigateOptions, NavigationRequest, PendingNavigation, TransitionQueue, Turn};
pub use registry::{ViewConfig, ViewConfigBuilder, ViewFactory, ViewRegistry};
