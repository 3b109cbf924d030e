use serde::{Deserialize, Serialize};

/// Lifecycle state of a view instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    /// Factory returned the view, `initialize` has not run yet
    Constructed,

    /// `initialize` completed, nothing attached to the root yet
    Initialized,

    /// Mounted under the root but not visible
    Hidden,

    /// Mounted, visible and activated
    Active,

    /// Terminal, the instance can never be used again
    Destroyed,
}

impl ViewState {
    pub fn is_mounted(self) -> bool {
        matches!(self, ViewState::Hidden | ViewState::Active)
    }

    pub fn is_terminal(self) -> bool {
        self == ViewState::Destroyed
    }

    /// Whether the host may move from `self` to `next`
    pub fn can_transition_to(self, next: ViewState) -> bool {
        use ViewState::*;
        match (self, next) {
            (Destroyed, _) => false,
            (_, Destroyed) => true,
            (Constructed, Initialized) => true,
            (Initialized, Hidden) => true,
            (Hidden, Active) => true,
            (Active, Hidden) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for ViewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ViewState::Constructed => "constructed",
            ViewState::Initialized => "initialized",
            ViewState::Hidden => "hidden",
            ViewState::Active => "active",
            ViewState::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_path() {
        assert!(ViewState::Constructed.can_transition_to(ViewState::Initialized));
        assert!(ViewState::Initialized.can_transition_to(ViewState::Hidden));
        assert!(ViewState::Hidden.can_transition_to(ViewState::Active));
        assert!(ViewState::Active.can_transition_to(ViewState::Hidden));
    }

    #[test]
    fn test_destroyed_is_terminal() {
        for next in [
            ViewState::Constructed,
            ViewState::Initialized,
            ViewState::Hidden,
            ViewState::Active,
            ViewState::Destroyed,
        ] {
            assert!(!ViewState::Destroyed.can_transition_to(next));
        }
        assert!(ViewState::Hidden.can_transition_to(ViewState::Destroyed));
        assert!(ViewState::Constructed.can_transition_to(ViewState::Destroyed));
    }

    #[test]
    fn test_skipping_states_is_rejected() {
        assert!(!ViewState::Constructed.can_transition_to(ViewState::Active));
        assert!(!ViewState::Initialized.can_transition_to(ViewState::Active));
        assert!(!ViewState::Active.can_transition_to(ViewState::Initialized));
    }

    #[test]
    fn test_mounted_states() {
        assert!(ViewState::Hidden.is_mounted());
        assert!(ViewState::Active.is_mounted());
        assert!(!ViewState::Initialized.is_mounted());
        assert!(!ViewState::Destroyed.is_mounted());
    }
}
