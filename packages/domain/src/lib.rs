//! shrinkfs domain factory.
//!
//! - `ConfigurationBuilder` / `Configuration`: extension loader + executor
//! - `Domain`: a configuration plus a grow-only resolution cache
//! - `ArchiveFactory`: builds typed façades (`JavaArchive`, ...) through a domain
//! - `DomainService`: the entry point, bound to one `ResolutionContext`
//!
//! Resolution contexts are always explicit arguments. The process-wide
//! default domain is built once, on first use, by whichever caller gets
//! there first.
//!
//! # Example
//!
//! ```rust
//! use shrinkfs_domain::{Assignable, ConfigurationBuilder, DomainService, JavaArchive};
//!
//! let service = DomainService::new();
//! let domain = service.create_domain_with(ConfigurationBuilder::new()).unwrap();
//!
//! let jar: JavaArchive = domain.archive_factory().create_named("test.jar").unwrap();
//! assert_eq!(jar.name(), "test.jar");
//! ```

mod assignable;
mod config;
mod context;
mod domain;
mod error;
mod executor;
mod extension;
mod service;

pub use assignable::{Assignable, GenericArchive, JavaArchive, ZipExporter, MANIFEST_PATH};
pub use config::{Configuration, ConfigurationBuilder, DomainSettings};
pub use context::{ResolutionContext, COMPONENT_CONTEXT};
pub use domain::{create_domain, default_domain, default_domain_with, ArchiveFactory, Domain};
pub use error::{DomainError, Result};
pub use executor::{Executor, InlineExecutor, SingleThreadExecutor, Task};
pub use extension::{ExtensionConstructor, ExtensionLoader, ExtensionType, ServiceExtensionLoader};
pub use service::DomainService;
