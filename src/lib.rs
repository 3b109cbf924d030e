//! View navigation and lifecycle management for single-page applications.
//!
//! Register views with a [`ViewManager`], initialize it against a mount
//! root and navigate between them. The manager caches view instances,
//! keeps a bounded back-history, serializes concurrent navigations through
//! a FIFO queue and records transition metrics.

pub mod config;
pub mod navigation;
pub mod view;

pub use config::{NavigatorSettings, NavigatorSettingsBuilder};
pub use navigation::{
    EventBus, EventSink, NavigateOptions, Navigation, NavigationError, NavigationEvent,
    NavigationState, ViewConfig, ViewManager, ViewRegistry,
};
pub use view::{MountRoot, SharedView, View, ViewContext, ViewId, ViewInstance, ViewState};
