//! Configurations and the builder that validates them.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};
use crate::executor::{Executor, InlineExecutor};
use crate::extension::{ExtensionLoader, ServiceExtensionLoader};

/// A builder field: left alone, explicitly unset, or given a value.
enum Setting<T> {
    Default,
    Unset,
    Value(T),
}

impl<T> Setting<T> {
    fn from_option(value: Option<T>) -> Self {
        match value {
            Some(value) => Setting::Value(value),
            None => Setting::Unset,
        }
    }

    fn resolve(self, field: &'static str, default: impl FnOnce() -> T) -> Result<T> {
        match self {
            Setting::Default => Ok(default()),
            Setting::Unset => Err(DomainError::InvalidConfiguration(field)),
            Setting::Value(value) => Ok(value),
        }
    }
}

/// Assembles a [`Configuration`].
///
/// A policy that is never set falls back to its default. Passing `None` to
/// a setter is an explicit unset, and makes [`build`](Self::build) fail.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use shrinkfs_domain::{ConfigurationBuilder, DomainError, InlineExecutor};
///
/// let config = ConfigurationBuilder::new()
///     .executor(Some(Arc::new(InlineExecutor)))
///     .build()
///     .unwrap();
///
/// let err = ConfigurationBuilder::new().extension_loader(None).build().unwrap_err();
/// assert!(matches!(err, DomainError::InvalidConfiguration("extension_loader")));
/// ```
#[derive(Default)]
pub struct ConfigurationBuilder {
    extension_loader: Setting<Arc<dyn ExtensionLoader>>,
    executor: Setting<Arc<dyn Executor>>,
}

impl<T> Default for Setting<T> {
    fn default() -> Self {
        Setting::Default
    }
}

impl ConfigurationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extension_loader(mut self, loader: Option<Arc<dyn ExtensionLoader>>) -> Self {
        self.extension_loader = Setting::from_option(loader);
        self
    }

    pub fn executor(mut self, executor: Option<Arc<dyn Executor>>) -> Self {
        self.executor = Setting::from_option(executor);
        self
    }

    pub fn build(self) -> Result<Configuration> {
        let extension_loader = self.extension_loader.resolve("extension_loader", || {
            Arc::new(ServiceExtensionLoader::new()) as Arc<dyn ExtensionLoader>
        })?;
        let executor = self
            .executor
            .resolve("executor", || Arc::new(InlineExecutor) as Arc<dyn Executor>)?;
        Ok(Configuration {
            extension_loader,
            executor,
        })
    }
}

impl fmt::Debug for ConfigurationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn state<T>(setting: &Setting<T>) -> &'static str {
            match setting {
                Setting::Default => "default",
                Setting::Unset => "unset",
                Setting::Value(_) => "set",
            }
        }
        f.debug_struct("ConfigurationBuilder")
            .field("extension_loader", &state(&self.extension_loader))
            .field("executor", &state(&self.executor))
            .finish()
    }
}

/// An immutable pairing of extension-resolution and task-execution policy.
///
/// Cloning shares both policies.
#[derive(Clone)]
pub struct Configuration {
    extension_loader: Arc<dyn ExtensionLoader>,
    executor: Arc<dyn Executor>,
}

impl Configuration {
    pub fn extension_loader(&self) -> &Arc<dyn ExtensionLoader> {
        &self.extension_loader
    }

    pub fn executor(&self) -> &Arc<dyn Executor> {
        &self.executor
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration").finish_non_exhaustive()
    }
}

/// Naming for the process-wide default domain.
///
/// ```json
/// {"name": "default", "worker_name": "shrinkfs-worker"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainSettings {
    /// Domain name; `"default"` when empty.
    pub name: String,
    /// Worker thread name; derived from the resolution context when unset.
    pub worker_name: Option<String>,
}

impl DomainSettings {
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub(crate) fn domain_name(&self) -> &str {
        if self.name.is_empty() {
            "default"
        } else {
            &self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ResolutionContext;
    use crate::extension::{ExtensionConstructor, ExtensionType};
    use crate::JavaArchive;

    struct NothingLoader;

    impl ExtensionLoader for NothingLoader {
        fn resolve(
            &self,
            _: &ResolutionContext,
            _: ExtensionType,
        ) -> Option<ExtensionConstructor> {
            None
        }
    }

    #[test]
    fn omitted_settings_use_defaults() {
        let config = ConfigurationBuilder::new().build().unwrap();
        let ctx = ResolutionContext::new("omitted_settings_use_defaults");
        assert!(config
            .extension_loader()
            .resolve(&ctx, ExtensionType::of::<JavaArchive>())
            .is_some());

        // The default executor runs inline.
        let ran = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        config
            .executor()
            .submit(Box::new(move || flag.store(true, std::sync::atomic::Ordering::SeqCst)))
            .unwrap();
        assert!(ran.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn explicit_none_is_invalid() {
        let err = ConfigurationBuilder::new().executor(None).build().unwrap_err();
        assert!(matches!(err, DomainError::InvalidConfiguration("executor")));

        let err = ConfigurationBuilder::new()
            .extension_loader(None)
            .build()
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidConfiguration("extension_loader")));
    }

    #[test]
    fn later_setter_wins() {
        let config = ConfigurationBuilder::new()
            .extension_loader(None)
            .extension_loader(Some(Arc::new(NothingLoader)))
            .build()
            .unwrap();
        let ctx = ResolutionContext::new("later_setter_wins");
        assert!(config
            .extension_loader()
            .resolve(&ctx, ExtensionType::of::<JavaArchive>())
            .is_none());
    }

    #[test]
    fn builder_debug_reports_state() {
        let builder = ConfigurationBuilder::new().executor(None);
        let rendered = format!("{:?}", builder);
        assert!(rendered.contains("extension_loader: \"default\""));
        assert!(rendered.contains("executor: \"unset\""));
    }

    #[test]
    fn domain_settings_json() {
        let settings = DomainSettings::from_json(r#"{"worker_name": "bg"}"#).unwrap();
        assert_eq!(settings.domain_name(), "default");
        assert_eq!(settings.worker_name.as_deref(), Some("bg"));

        let named = DomainSettings::from_json(r#"{"name": "shared"}"#).unwrap();
        assert_eq!(named.domain_name(), "shared");
    }
}
