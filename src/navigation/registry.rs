//! Registry of view definitions, keyed by view id

use anyhow::Result;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::view::{View, ViewContext, ViewId};

/// Builds a fresh view for the given context
pub type ViewFactory = Arc<dyn Fn(ViewContext) -> Result<Box<dyn View>> + Send + Sync>;

/// Immutable definition of a navigable view
#[derive(Clone)]
pub struct ViewConfig {
    pub id: ViewId,
    pub title: String,
    pub factory: ViewFactory,

    /// Keep the instance alive after navigating away
    pub cache: bool,

    /// List the view in navigation menus
    pub show_in_nav: bool,

    pub icon: Option<String>,
    pub route: String,
    pub description: String,
}

impl ViewConfig {
    pub fn builder(id: impl Into<ViewId>) -> ViewConfigBuilder {
        ViewConfigBuilder::new(id)
    }

    pub fn create(&self, context: ViewContext) -> Result<Box<dyn View>> {
        (self.factory)(context)
    }
}

impl fmt::Debug for ViewConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewConfig")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("cache", &self.cache)
            .field("show_in_nav", &self.show_in_nav)
            .field("icon", &self.icon)
            .field("route", &self.route)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Fluent builder for [`ViewConfig`]
pub struct ViewConfigBuilder {
    id: ViewId,
    title: Option<String>,
    factory: Option<ViewFactory>,
    cache: bool,
    show_in_nav: bool,
    icon: Option<String>,
    route: Option<String>,
    description: Option<String>,
}

impl ViewConfigBuilder {
    pub fn new(id: impl Into<ViewId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            factory: None,
            cache: true,
            show_in_nav: true,
            icon: None,
            route: None,
            description: None,
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Set the constructor used when the view is not cached
    pub fn factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(ViewContext) -> Result<Box<dyn View>> + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(factory));
        self
    }

    pub fn cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    pub fn show_in_nav(mut self, show: bool) -> Self {
        self.show_in_nav = show;
        self
    }

    pub fn icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }

    pub fn route(mut self, route: &str) -> Self {
        self.route = Some(route.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Build the config
    ///
    /// Returns an error if the title or the factory is missing
    pub fn build(self) -> Result<ViewConfig> {
        let title = self
            .title
            .ok_or_else(|| anyhow::anyhow!("title is required for view '{}'", self.id))?;
        let factory = self
            .factory
            .ok_or_else(|| anyhow::anyhow!("factory is required for view '{}'", self.id))?;
        let route = self.route.unwrap_or_else(|| format!("/{}", self.id));

        Ok(ViewConfig {
            id: self.id,
            title,
            factory,
            cache: self.cache,
            show_in_nav: self.show_in_nav,
            icon: self.icon,
            route,
            description: self.description.unwrap_or_default(),
        })
    }
}

/// Registry of view configs in registration order
#[derive(Default, Clone)]
pub struct ViewRegistry {
    configs: Vec<Arc<ViewConfig>>,
    index: HashMap<ViewId, usize>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a view config under `id`
    ///
    /// Registering an id twice replaces the earlier config in place
    pub fn register(&mut self, id: impl Into<ViewId>, mut config: ViewConfig) -> Arc<ViewConfig> {
        let id = id.into();
        if config.id != id {
            log::warn!(
                "View config for '{}' registered under '{}', using the registration id",
                config.id,
                id
            );
            config.id = id.clone();
        }

        let config = Arc::new(config);
        match self.index.get(&id) {
            Some(&slot) => {
                log::warn!("View '{}' is already registered, replacing it", id);
                self.configs[slot] = config.clone();
            }
            None => {
                log::debug!("Registered view: {} ({})", id, config.title);
                self.index.insert(id, self.configs.len());
                self.configs.push(config.clone());
            }
        }
        config
    }

    pub fn get(&self, id: &str) -> Option<Arc<ViewConfig>> {
        self.index.get(id).map(|&slot| self.configs[slot].clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Configs matching `filter`, in registration order.
    ///
    /// The iterator is lazy and can be cloned to restart it.
    pub fn list<'a, F>(&'a self, filter: F) -> impl Iterator<Item = &'a Arc<ViewConfig>> + Clone + 'a
    where
        F: Fn(&ViewConfig) -> bool + Clone + 'a,
    {
        self.configs.iter().filter(move |config| filter(config))
    }

    pub fn list_all(&self) -> impl Iterator<Item = &Arc<ViewConfig>> + Clone + '_ {
        self.configs.iter()
    }

    /// Configs flagged to appear in navigation menus
    pub fn list_in_nav(&self) -> impl Iterator<Item = &Arc<ViewConfig>> + Clone + '_ {
        self.list(|config| config.show_in_nav)
    }

    pub fn ids(&self) -> Vec<ViewId> {
        self.configs.iter().map(|config| config.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

impl fmt::Debug for ViewRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.configs.iter().map(|c| &c.id)).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::testing::Blank;

    fn config(id: &str, title: &str) -> ViewConfig {
        ViewConfig::builder(id)
            .title(title)
            .factory(|_| Ok(Box::new(Blank::default())))
            .build()
            .unwrap()
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = ViewRegistry::new();
        registry.register("home", config("home", "Home"));

        let home = registry.get("home").unwrap();
        assert_eq!(home.title, "Home");
        assert_eq!(home.route, "/home");
        assert!(home.cache);
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_reregistration_replaces_in_place() {
        let mut registry = ViewRegistry::new();
        registry.register("home", config("home", "Home"));
        registry.register("settings", config("settings", "Settings"));
        registry.register("home", config("home", "Dashboard"));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("home").unwrap().title, "Dashboard");
        assert_eq!(registry.ids(), vec![ViewId::from("home"), ViewId::from("settings")]);
    }

    #[test]
    fn test_registration_id_wins() {
        let mut registry = ViewRegistry::new();
        registry.register("profile", config("account", "Profile"));

        assert!(registry.contains("profile"));
        assert!(!registry.contains("account"));
        assert_eq!(registry.get("profile").unwrap().id, "profile");
    }

    #[test]
    fn test_list_is_filtered_and_restartable() {
        let mut registry = ViewRegistry::new();
        registry.register("home", config("home", "Home"));
        let hidden = ViewConfig::builder("debug")
            .title("Debug")
            .show_in_nav(false)
            .factory(|_| Ok(Box::new(Blank::default())))
            .build()
            .unwrap();
        registry.register("debug", hidden);
        registry.register("about", config("about", "About"));

        let visible = registry.list_in_nav();
        let first: Vec<_> = visible.clone().map(|c| c.id.to_string()).collect();
        let second: Vec<_> = visible.map(|c| c.id.to_string()).collect();
        assert_eq!(first, vec!["home", "about"]);
        assert_eq!(first, second);
        assert_eq!(registry.list_all().count(), 3);
    }

    #[test]
    fn test_builder_requires_factory() {
        let result = ViewConfig::builder("home").title("Home").build();
        assert!(result.is_err());
        let result = ViewConfig::builder("home").factory(|_| Ok(Box::new(Blank::default()))).build();
        assert!(result.is_err());
    }
}
