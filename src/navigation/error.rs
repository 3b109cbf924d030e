//! Error types for view navigation.
//!
//! - [`NavigationError`]: why a `navigate_to` call was rejected.
//! - [`LifecycleError`]: a view instance refused a transition or one of its
//!   hooks failed.

use std::error::Error as StdError;
use std::fmt;

use crate::view::{ViewId, ViewState};

/// Coarse classification used by callers deciding how to recover
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Unknown view id or manager not set up
    Configuration,
    /// Factory or `initialize` failed
    Construction,
    /// A hook failed while switching views
    Activation,
    /// The manager was torn down underneath the request
    Teardown,
}

#[derive(Debug)]
pub enum LifecycleError {
    /// The host refused a state change (e.g. activating a destroyed view)
    InvalidTransition {
        view: ViewId,
        from: ViewState,
        to: ViewState,
    },
    /// A lifecycle hook returned an error
    Hook {
        view: ViewId,
        hook: &'static str,
        source: anyhow::Error,
    },
}

impl LifecycleError {
    pub fn view(&self) -> &ViewId {
        match self {
            LifecycleError::InvalidTransition { view, .. } => view,
            LifecycleError::Hook { view, .. } => view,
        }
    }
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleError::InvalidTransition { view, from, to } => {
                write!(f, "view '{}' cannot go from {} to {}", view, from, to)
            }
            LifecycleError::Hook { view, hook, source } => {
                write!(f, "view '{}' failed in {}: {}", view, hook, source)
            }
        }
    }
}

impl StdError for LifecycleError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            LifecycleError::InvalidTransition { .. } => None,
            LifecycleError::Hook { source, .. } => Some(&**source),
        }
    }
}

#[derive(Debug)]
pub enum NavigationError {
    /// `initialize` has not been called (or the manager was destroyed)
    NotInitialized,
    AlreadyInitialized,
    /// `initialize` was handed settings that fail validation
    InvalidSettings(anyhow::Error),
    /// No view registered under this id; nothing was touched
    ViewNotFound(ViewId),
    /// The factory or the `initialize` hook failed
    Construction {
        view: ViewId,
        source: anyhow::Error,
    },
    /// The target could not be mounted or activated
    Activation {
        view: ViewId,
        source: LifecycleError,
    },
    /// The outgoing view refused to deactivate
    Deactivation {
        view: ViewId,
        source: LifecycleError,
    },
    /// `destroy` ran while the request was queued or in flight
    ManagerDestroyed,
}

impl NavigationError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            NavigationError::NotInitialized
            | NavigationError::AlreadyInitialized
            | NavigationError::InvalidSettings(_)
            | NavigationError::ViewNotFound(_) => ErrorCategory::Configuration,
            NavigationError::Construction { .. } => ErrorCategory::Construction,
            NavigationError::Activation { .. } | NavigationError::Deactivation { .. } => {
                ErrorCategory::Activation
            }
            NavigationError::ManagerDestroyed => ErrorCategory::Teardown,
        }
    }

    /// The view the failure is about, if any
    pub fn view(&self) -> Option<&ViewId> {
        match self {
            NavigationError::ViewNotFound(view)
            | NavigationError::Construction { view, .. }
            | NavigationError::Activation { view, .. }
            | NavigationError::Deactivation { view, .. } => Some(view),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, NavigationError::ViewNotFound(_))
    }
}

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationError::NotInitialized => f.write_str("view manager is not initialized"),
            NavigationError::AlreadyInitialized => {
                f.write_str("view manager is already initialized")
            }
            NavigationError::InvalidSettings(source) => {
                write!(f, "invalid navigator settings: {:#}", source)
            }
            NavigationError::ViewNotFound(view) => write!(f, "view '{}' not found", view),
            NavigationError::Construction { view, source } => {
                write!(f, "failed to create view '{}': {:#}", view, source)
            }
            NavigationError::Activation { view, source } => {
                write!(f, "failed to activate view '{}': {}", view, source)
            }
            NavigationError::Deactivation { view, source } => {
                write!(f, "failed to deactivate view '{}': {}", view, source)
            }
            NavigationError::ManagerDestroyed => {
                f.write_str("view manager was destroyed before the navigation completed")
            }
        }
    }
}

impl StdError for NavigationError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            NavigationError::Construction { source, .. }
            | NavigationError::InvalidSettings(source) => Some(&**source),
            NavigationError::Activation { source, .. }
            | NavigationError::Deactivation { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_categories() {
        assert_eq!(
            NavigationError::ViewNotFound(ViewId::from("x")).category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            NavigationError::Construction {
                view: ViewId::from("x"),
                source: anyhow!("boom"),
            }
            .category(),
            ErrorCategory::Construction
        );
        assert_eq!(NavigationError::ManagerDestroyed.category(), ErrorCategory::Teardown);
    }

    #[test]
    fn test_source_chain_reaches_hook_error() {
        let err = NavigationError::Activation {
            view: ViewId::from("detail"),
            source: LifecycleError::Hook {
                view: ViewId::from("detail"),
                hook: "on_activate",
                source: anyhow!("backend offline"),
            },
        };

        assert_eq!(err.view().map(|v| v.as_str()), Some("detail"));
        let hook = err.source().unwrap();
        assert!(hook.to_string().contains("on_activate"));
        let root = hook.source().unwrap();
        assert_eq!(root.to_string(), "backend offline");
    }

    #[test]
    fn test_display_not_found() {
        let err = NavigationError::ViewNotFound(ViewId::from("unknown-id"));
        assert_eq!(err.to_string(), "view 'unknown-id' not found");
        assert!(err.is_not_found());
    }
}
