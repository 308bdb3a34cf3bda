//! Domains, their archive factories, and the process-wide default domain.

use std::collections::HashMap;
use std::fmt;
use std::path::Path as HostPath;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use bytes::Bytes;
use lazy_static::lazy_static;
use shrinkfs_archive::Archive;
use uuid::Uuid;

use crate::assignable::Assignable;
use crate::config::{Configuration, ConfigurationBuilder, DomainSettings};
use crate::context::ResolutionContext;
use crate::error::{DomainError, Result};
use crate::executor::{Executor, SingleThreadExecutor};
use crate::extension::{
    ExtensionConstructor, ExtensionLoader, ExtensionType, ServiceExtensionLoader,
};

/// A configuration in use, plus a cache of the extensions it has resolved.
///
/// The cache only grows. Every resolution runs under the context the domain
/// was created with.
pub struct Domain {
    name: String,
    context: ResolutionContext,
    configuration: Configuration,
    resolved: RwLock<HashMap<ExtensionType, ExtensionConstructor>>,
}

impl Domain {
    fn new(
        name: impl Into<String>,
        context: ResolutionContext,
        configuration: Configuration,
    ) -> Self {
        let name = name.into();
        log::debug!("Created domain {} in context {}", name, context);
        Self {
            name,
            context,
            configuration,
            resolved: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn context(&self) -> &ResolutionContext {
        &self.context
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn executor(&self) -> &Arc<dyn Executor> {
        self.configuration.executor()
    }

    pub fn extension_loader(&self) -> &Arc<dyn ExtensionLoader> {
        self.configuration.extension_loader()
    }

    /// Resolve `extension`, consulting the cache first.
    pub fn resolve(&self, extension: ExtensionType) -> Result<ExtensionConstructor> {
        if let Some(ctor) = self
            .resolved
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&extension)
        {
            return Ok(ctor.clone());
        }

        let ctor = self
            .extension_loader()
            .resolve(&self.context, extension)
            .ok_or(DomainError::UnknownExtensionType(extension))?;
        let mut resolved = self.resolved.write().unwrap_or_else(PoisonError::into_inner);
        Ok(resolved.entry(extension).or_insert(ctor).clone())
    }

    /// Number of extension types resolved so far.
    pub fn resolved_count(&self) -> usize {
        self.resolved
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn archive_factory(&self) -> ArchiveFactory<'_> {
        ArchiveFactory { domain: self }
    }
}

impl fmt::Debug for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Domain")
            .field("name", &self.name)
            .field("context", &self.context)
            .field("resolved", &self.resolved_count())
            .finish()
    }
}

/// Wrap `configuration` in a new domain with its own, empty cache.
///
/// Equal configurations still produce independent domains.
pub fn create_domain(ctx: &ResolutionContext, configuration: Configuration) -> Domain {
    let name = format!("domain-{}", Uuid::new_v4());
    Domain::new(name, ctx.clone(), configuration)
}

lazy_static! {
    static ref DEFAULT_DOMAIN: Mutex<Option<Arc<Domain>>> = Mutex::new(None);
}

/// The process-wide default domain, built on first use.
///
/// Construction is serialized: whichever caller arrives first builds the
/// domain with `ctx` and `settings`, and every caller (including later ones
/// with different arguments) receives that same domain. The default domain
/// resolves through [`ServiceExtensionLoader`] and runs tasks on a single
/// worker thread.
pub fn default_domain_with(
    ctx: &ResolutionContext,
    settings: &DomainSettings,
) -> Result<Arc<Domain>> {
    let mut slot = DEFAULT_DOMAIN.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(domain) = slot.as_ref() {
        return Ok(Arc::clone(domain));
    }

    let worker_name = settings
        .worker_name
        .clone()
        .unwrap_or_else(|| format!("{}-worker", ctx.name()));
    let loader: Arc<dyn ExtensionLoader> = Arc::new(ServiceExtensionLoader::new());
    let executor: Arc<dyn Executor> = Arc::new(SingleThreadExecutor::new(worker_name)?);
    let configuration = ConfigurationBuilder::new()
        .extension_loader(Some(loader))
        .executor(Some(executor))
        .build()?;

    let domain = Arc::new(Domain::new(settings.domain_name(), ctx.clone(), configuration));
    *slot = Some(Arc::clone(&domain));
    Ok(domain)
}

/// [`default_domain_with`] using default settings.
pub fn default_domain(ctx: &ResolutionContext) -> Result<Arc<Domain>> {
    default_domain_with(ctx, &DomainSettings::default())
}

/// Builds façades through a domain's extension resolution.
///
/// # Example
///
/// ```rust
/// use shrinkfs_domain::{
///     create_domain, Assignable, ConfigurationBuilder, JavaArchive, ResolutionContext,
/// };
///
/// let ctx = ResolutionContext::new("factory-doc");
/// let domain = create_domain(&ctx, ConfigurationBuilder::new().build().unwrap());
///
/// let jar: JavaArchive = domain.archive_factory().create().unwrap();
/// assert!(jar.name().ends_with(".jar"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ArchiveFactory<'d> {
    domain: &'d Domain,
}

impl<'d> ArchiveFactory<'d> {
    pub fn domain(&self) -> &'d Domain {
        self.domain
    }

    /// An empty façade with a generated name.
    pub fn create<T: Assignable>(&self) -> Result<T> {
        let ctor = self.domain.resolve(ExtensionType::of::<T>())?;
        let name = format!("{}{}", Uuid::new_v4(), ctor.file_extension());
        construct(&ctor, Archive::new(name))
    }

    /// An empty façade named `name`.
    pub fn create_named<T: Assignable>(&self, name: &str) -> Result<T> {
        let ctor = self.domain.resolve(ExtensionType::of::<T>())?;
        construct(&ctor, Archive::new(name))
    }

    /// A façade pre-seeded with the content of an in-memory zip container.
    ///
    /// The archive is named after `source_id`.
    pub fn create_from_zip_bytes<T: Assignable>(
        &self,
        source_id: &str,
        bytes: impl Into<Bytes>,
    ) -> Result<T> {
        let ctor = self.domain.resolve(ExtensionType::of::<T>())?;
        let mut archive = Archive::new(source_id);
        shrinkfs_zip::import_bytes(&mut archive, source_id, bytes)?;
        construct(&ctor, archive)
    }

    /// A façade pre-seeded with the content of a zip file on the host.
    ///
    /// The archive is named after the file.
    pub fn create_from_zip_file<T: Assignable>(&self, path: impl AsRef<HostPath>) -> Result<T> {
        let path = path.as_ref();
        let ctor = self.domain.resolve(ExtensionType::of::<T>())?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mut archive = Archive::new(name);
        shrinkfs_zip::import_file(&mut archive, path)?;
        construct(&ctor, archive)
    }

    /// Wrap an existing archive.
    pub fn wrap<T: Assignable>(&self, archive: Archive) -> Result<T> {
        let ctor = self.domain.resolve(ExtensionType::of::<T>())?;
        construct(&ctor, archive)
    }
}

fn construct<T: Assignable>(ctor: &ExtensionConstructor, archive: Archive) -> Result<T> {
    ctor.construct(archive)
        .ok_or(DomainError::UnknownExtensionType(ExtensionType::of::<T>()))
}
