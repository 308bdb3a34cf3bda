//! Extension resolution: mapping façade types to constructors.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, PoisonError, RwLock};

use lazy_static::lazy_static;
use shrinkfs_archive::Archive;

use crate::assignable::{Assignable, GenericArchive, JavaArchive, ZipExporter};
use crate::context::ResolutionContext;

/// Identity of a requested façade type.
#[derive(Clone, Copy)]
pub struct ExtensionType {
    id: TypeId,
    name: &'static str,
}

impl ExtensionType {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ExtensionType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ExtensionType {}

impl Hash for ExtensionType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ExtensionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ExtensionType").field(&self.name).finish()
    }
}

impl fmt::Display for ExtensionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

type Construct = dyn Fn(Archive) -> Box<dyn Any + Send> + Send + Sync;

/// Builds one façade type around an archive.
#[derive(Clone)]
pub struct ExtensionConstructor {
    extension_type: ExtensionType,
    file_extension: &'static str,
    construct: Arc<Construct>,
}

impl ExtensionConstructor {
    /// The plain constructor for a façade: `T::from_archive`.
    pub fn of<T: Assignable>() -> Self {
        Self::new(T::EXTENSION, T::from_archive)
    }

    /// A custom constructor for `T`, e.g. one that pre-seeds content.
    pub fn new<T, F>(file_extension: &'static str, construct: F) -> Self
    where
        T: Send + 'static,
        F: Fn(Archive) -> T + Send + Sync + 'static,
    {
        Self {
            extension_type: ExtensionType::of::<T>(),
            file_extension,
            construct: Arc::new(move |archive| {
                Box::new(construct(archive)) as Box<dyn Any + Send>
            }),
        }
    }

    pub fn extension_type(&self) -> ExtensionType {
        self.extension_type
    }

    /// Appended to generated archive names.
    pub fn file_extension(&self) -> &'static str {
        self.file_extension
    }

    /// Build the façade. `None` if this constructor does not produce `T`.
    pub fn construct<T: 'static>(&self, archive: Archive) -> Option<T> {
        (self.construct)(archive)
            .downcast::<T>()
            .ok()
            .map(|boxed| *boxed)
    }
}

impl fmt::Debug for ExtensionConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionConstructor")
            .field("extension_type", &self.extension_type)
            .field("file_extension", &self.file_extension)
            .finish_non_exhaustive()
    }
}

/// Strategy for turning a requested type into a constructor.
///
/// The context is always passed in by the caller; implementations must
/// not look for one anywhere else.
pub trait ExtensionLoader: Send + Sync {
    fn resolve(
        &self,
        ctx: &ResolutionContext,
        extension: ExtensionType,
    ) -> Option<ExtensionConstructor>;
}

type Scope = HashMap<ExtensionType, ExtensionConstructor>;

lazy_static! {
    static ref BUILTINS: Scope = [
        ExtensionConstructor::of::<GenericArchive>(),
        ExtensionConstructor::of::<JavaArchive>(),
        ExtensionConstructor::of::<ZipExporter>(),
    ]
    .into_iter()
    .map(|ctor| (ctor.extension_type(), ctor))
    .collect();

    static ref REGISTRY: RwLock<HashMap<String, Scope>> = RwLock::new(HashMap::new());
}

/// The standard lookup: built-in façades plus process-wide registrations
/// scoped by context name.
///
/// A registration in a context shadows the built-in for the same type, and
/// is invisible to every other context.
///
/// # Example
///
/// ```rust
/// use shrinkfs_domain::{
///     ExtensionLoader, ExtensionType, JavaArchive, ResolutionContext, ServiceExtensionLoader,
/// };
///
/// let loader = ServiceExtensionLoader::new();
/// let ctx = ResolutionContext::new("doc-example");
/// let ctor = loader.resolve(&ctx, ExtensionType::of::<JavaArchive>()).unwrap();
/// assert_eq!(ctor.file_extension(), ".jar");
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct ServiceExtensionLoader;

impl ServiceExtensionLoader {
    pub fn new() -> Self {
        Self
    }

    /// Register `T::from_archive` for `T` in `ctx`.
    pub fn register<T: Assignable>(ctx: &ResolutionContext) -> Option<ExtensionConstructor> {
        Self::register_constructor(ctx, ExtensionConstructor::of::<T>())
    }

    /// Register a constructor in `ctx`, returning the one it replaces.
    pub fn register_constructor(
        ctx: &ResolutionContext,
        ctor: ExtensionConstructor,
    ) -> Option<ExtensionConstructor> {
        log::debug!("Registering {} in context {}", ctor.extension_type(), ctx);
        REGISTRY
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(ctx.name().to_string())
            .or_default()
            .insert(ctor.extension_type(), ctor)
    }

    /// Remove a registration from `ctx`. Built-ins cannot be removed.
    pub fn unregister(
        ctx: &ResolutionContext,
        extension: ExtensionType,
    ) -> Option<ExtensionConstructor> {
        let mut registry = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
        let scope = registry.get_mut(ctx.name())?;
        let removed = scope.remove(&extension);
        if scope.is_empty() {
            registry.remove(ctx.name());
        }
        removed
    }
}

impl ExtensionLoader for ServiceExtensionLoader {
    fn resolve(
        &self,
        ctx: &ResolutionContext,
        extension: ExtensionType,
    ) -> Option<ExtensionConstructor> {
        let registered = REGISTRY
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(ctx.name())
            .and_then(|scope| scope.get(&extension))
            .cloned();
        registered.or_else(|| BUILTINS.get(&extension).cloned())
    }
}
