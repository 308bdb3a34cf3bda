//! Entry point for embedding components.

use std::path::Path as HostPath;
use std::sync::Arc;

use bytes::Bytes;

use crate::assignable::Assignable;
use crate::config::{Configuration, ConfigurationBuilder, DomainSettings};
use crate::context::ResolutionContext;
use crate::domain::{self, Domain};
use crate::error::Result;

/// Domain operations bound to one component's resolution context.
///
/// Every call resolves under the service's own context, whatever context
/// the caller happens to be working in. There is no per-thread state to
/// save or restore, so calls may nest freely.
///
/// # Example
///
/// ```rust
/// use shrinkfs_archive::{archive_path, Asset};
/// use shrinkfs_domain::{Assignable, DomainService, JavaArchive};
///
/// let service = DomainService::new();
/// let mut jar: JavaArchive = service.create_named("app.jar").unwrap();
/// jar.add_resource("META-INF/test", Asset::from_static(b"x")).unwrap();
/// assert!(jar.archive().contains(&archive_path!("META-INF/test")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DomainService {
    context: ResolutionContext,
    settings: DomainSettings,
}

impl DomainService {
    /// A service bound to the library's own component context.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(context: ResolutionContext) -> Self {
        Self {
            context,
            settings: DomainSettings::default(),
        }
    }

    /// Settings used if this service is the one that builds the default domain.
    pub fn with_settings(mut self, settings: DomainSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn context(&self) -> &ResolutionContext {
        &self.context
    }

    /// A new domain with default policies.
    pub fn create_domain(&self) -> Result<Domain> {
        self.create_domain_with(ConfigurationBuilder::new())
    }

    pub fn create_domain_with(&self, builder: ConfigurationBuilder) -> Result<Domain> {
        Ok(self.create_domain_from(builder.build()?))
    }

    pub fn create_domain_from(&self, configuration: Configuration) -> Domain {
        domain::create_domain(&self.context, configuration)
    }

    /// The process-wide default domain.
    pub fn default_domain(&self) -> Result<Arc<Domain>> {
        domain::default_domain_with(&self.context, &self.settings)
    }

    /// An empty façade from the default domain, with a generated name.
    pub fn create<T: Assignable>(&self) -> Result<T> {
        self.default_domain()?.archive_factory().create()
    }

    pub fn create_named<T: Assignable>(&self, name: &str) -> Result<T> {
        self.default_domain()?.archive_factory().create_named(name)
    }

    pub fn create_from_zip_bytes<T: Assignable>(
        &self,
        source_id: &str,
        bytes: impl Into<Bytes>,
    ) -> Result<T> {
        self.default_domain()?
            .archive_factory()
            .create_from_zip_bytes(source_id, bytes)
    }

    pub fn create_from_zip_file<T: Assignable>(&self, path: impl AsRef<HostPath>) -> Result<T> {
        self.default_domain()?
            .archive_factory()
            .create_from_zip_file(path)
    }
}
