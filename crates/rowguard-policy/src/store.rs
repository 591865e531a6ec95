use std::sync::Arc;

use arc_swap::ArcSwap;
use rowguard_core::ApplicationSchema;
use tracing::info;

use crate::compile::compile_application;
use crate::error::LoadError;
use crate::set::PolicySet;

/// Holder for the live policy set, supporting atomic hot reload.
///
/// Requests take a snapshot once and evaluate against it for their whole
/// lifetime, so an in-flight request sees either the old set or the new
/// one, never a mix. Reload compiles the replacement completely before
/// swapping; a failed compile leaves the old set installed.
#[derive(Debug)]
pub struct PolicyStore {
    inner: ArcSwap<PolicySet>,
}

impl PolicyStore {
    /// Wraps an already-compiled set.
    pub fn new(set: PolicySet) -> Self {
        Self {
            inner: ArcSwap::from_pointee(set),
        }
    }

    /// Compiles an application schema and installs the result.
    pub fn from_application(app: &ApplicationSchema) -> Result<Self, LoadError> {
        Ok(Self::new(compile_application(app)?))
    }

    /// Returns the current policy set snapshot.
    pub fn snapshot(&self) -> Arc<PolicySet> {
        self.inner.load_full()
    }

    /// Recompiles from a (possibly changed) application schema and swaps
    /// the live set atomically.
    ///
    /// # Errors
    ///
    /// Returns the compile failure and leaves the previous set installed.
    pub fn reload(&self, app: &ApplicationSchema) -> Result<(), LoadError> {
        let set = compile_application(app)?;
        let tables = set.len();
        self.inner.store(Arc::new(set));
        info!(tables, "policy set reloaded");
        Ok(())
    }
}
