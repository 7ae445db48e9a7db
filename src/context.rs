//! Application context holding shared singletons
//!
//! Beans are keyed by type. A bean supplied by the embedding application
//! always wins over one the wiring would construct by default.

use parking_lot::RwLock;
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{PromgateError, Result};

/// Where a bean returned by the context came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeanSource {
    /// Constructed by this call
    Created,
    /// Already present in the context
    Existing,
}

struct BeanEntry {
    name: &'static str,
    // Always an `Arc<T>` for the `T` the entry is keyed by
    bean: Box<dyn Any + Send + Sync>,
}

/// Type-keyed singleton store
#[derive(Default)]
pub struct BeanContext {
    beans: RwLock<HashMap<TypeId, BeanEntry>>,
}

impl BeanContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply a singleton. Fails if one of the same type is already present.
    pub fn register<T>(&self, bean: Arc<T>) -> Result<()>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let mut beans = self.beans.write();
        let key = TypeId::of::<T>();
        if beans.contains_key(&key) {
            return Err(PromgateError::bean_already_registered(type_name::<T>()));
        }
        beans.insert(
            key,
            BeanEntry {
                name: type_name::<T>(),
                bean: Box::new(bean),
            },
        );
        tracing::debug!("Registered bean {}", type_name::<T>());
        Ok(())
    }

    pub fn get<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.beans
            .read()
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.bean.downcast_ref::<Arc<T>>())
            .cloned()
    }

    pub fn contains<T>(&self) -> bool
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.beans.read().contains_key(&TypeId::of::<T>())
    }

    /// Return the existing singleton of type `T`, or build and register one.
    ///
    /// `create` runs outside the lock. If another caller registers a bean of
    /// the same type in the meantime, that bean is kept and returned.
    pub fn get_or_register_with<T, F>(&self, create: F) -> Result<(Arc<T>, BeanSource)>
    where
        T: ?Sized + Send + Sync + 'static,
        F: FnOnce() -> Result<Arc<T>>,
    {
        if let Some(existing) = self.get::<T>() {
            return Ok((existing, BeanSource::Existing));
        }

        let created = create()?;

        let mut beans = self.beans.write();
        let key = TypeId::of::<T>();
        if let Some(existing) = beans
            .get(&key)
            .and_then(|entry| entry.bean.downcast_ref::<Arc<T>>())
        {
            return Ok((existing.clone(), BeanSource::Existing));
        }
        beans.insert(
            key,
            BeanEntry {
                name: type_name::<T>(),
                bean: Box::new(created.clone()),
            },
        );
        tracing::debug!("Created default bean {}", type_name::<T>());
        Ok((created, BeanSource::Created))
    }

    pub fn len(&self) -> usize {
        self.beans.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.beans.read().is_empty()
    }

    /// Type names of all registered beans, sorted
    pub fn bean_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.beans.read().values().map(|e| e.name).collect();
        names.sort_unstable();
        names
    }

    pub fn debug_beans(&self) {
        let names = self.bean_names();
        if names.is_empty() {
            tracing::debug!("No beans registered.");
        } else {
            tracing::debug!("Registered beans:");
            for name in names {
                tracing::debug!(" - {}", name);
            }
        }
    }
}
