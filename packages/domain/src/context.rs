//! Resolution scopes.

use std::fmt;
use std::sync::Arc;

/// Name of the context owned by this library's own entry points.
pub const COMPONENT_CONTEXT: &str = "shrinkfs";

/// The scope under which extension lookup runs.
///
/// Contexts are passed explicitly to every resolution step; nothing reads
/// or changes a per-thread "current" context, so nested and re-entrant
/// calls see exactly the context they were handed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolutionContext {
    name: Arc<str>,
}

impl ResolutionContext {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
        }
    }

    /// The context used by [`DomainService`](crate::DomainService) by default.
    pub fn component() -> Self {
        Self::new(COMPONENT_CONTEXT)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for ResolutionContext {
    fn default() -> Self {
        Self::component()
    }
}

impl fmt::Display for ResolutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
