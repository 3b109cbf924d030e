//! The per-view side of navigation: the capability trait views implement
//! and the host that drives each instance through its lifecycle.

pub mod id;
pub mod instance;
pub mod lifecycle;
pub mod traits;

pub use id::ViewId;
pub use instance::{SharedView, ViewInstance};
pub use lifecycle::ViewState;
pub use traits::{MountRoot, View, ViewContext};

#[cfg(test)]
pub(crate) mod testing;
