//! Named variant management.
//!
//! Variants live in the engine. Every check below asks the engine for its
//! current variant list, so nothing can drift out of sync with it.

use gridframe_core::{GridError, GridResult, NetworkEngine, NetworkHandle};
use tracing::info;

/// Variant operations on one network.
pub struct VariantManager<'a, E: NetworkEngine + ?Sized> {
    engine: &'a E,
    handle: &'a NetworkHandle,
}

impl<'a, E: NetworkEngine + ?Sized> VariantManager<'a, E> {
    pub fn new(engine: &'a E, handle: &'a NetworkHandle) -> Self {
        Self { engine, handle }
    }

    /// Variant ids, in creation order.
    pub fn list(&self) -> GridResult<Vec<String>> {
        Ok(self.engine.variant_ids(self.handle)?)
    }

    pub fn current(&self) -> GridResult<String> {
        Ok(self.engine.working_variant(self.handle)?)
    }

    fn exists(&self, id: &str) -> GridResult<bool> {
        Ok(self.list()?.iter().any(|v| v == id))
    }

    /// Copy `src` into `target`. The working variant does not change.
    pub fn clone_variant(&self, src: &str, target: &str, may_overwrite: bool) -> GridResult<()> {
        if !self.exists(src)? {
            return Err(GridError::UnknownVariant(src.to_string()));
        }
        if !may_overwrite && self.exists(target)? {
            return Err(GridError::VariantAlreadyExists(target.to_string()));
        }
        self.engine
            .clone_variant(self.handle, src, target, may_overwrite)?;
        info!(src, target, may_overwrite, "variant cloned");
        Ok(())
    }

    pub fn select(&self, id: &str) -> GridResult<()> {
        if !self.exists(id)? {
            return Err(GridError::UnknownVariant(id.to_string()));
        }
        self.engine.set_working_variant(self.handle, id)?;
        info!(variant = id, "working variant set");
        Ok(())
    }

    pub fn remove(&self, id: &str) -> GridResult<()> {
        if !self.exists(id)? {
            return Err(GridError::UnknownVariant(id.to_string()));
        }
        if self.current()? == id {
            return Err(GridError::CannotRemoveWorkingVariant(id.to_string()));
        }
        self.engine.remove_variant(self.handle, id)?;
        info!(variant = id, "variant removed");
        Ok(())
    }
}
