use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use crate::entity::Entity;
use crate::error::{MapError, Result};
use crate::mapper::Mapper;

type Slot = Arc<dyn Any + Send + Sync>;

/// Registers entity types during bootstrap.
///
/// ```ignore
/// let registry = Registry::builder().register::<Order>()?.register::<ApiKey>()?.build();
/// let orders = registry.mapper::<Order>()?;
/// ```
#[derive(Default)]
pub struct RegistryBuilder {
    mappers: HashMap<TypeId, Slot>,
    names: Vec<&'static str>,
}

impl RegistryBuilder {
    /// Configures a mapper for `E`. Registering a type twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the entity's mapping is invalid.
    pub fn register<E: Entity>(mut self) -> Result<Self> {
        let type_id = TypeId::of::<E>();
        if self.mappers.contains_key(&type_id) {
            return Ok(self);
        }
        let mapper = Mapper::<E>::new()?;
        self.mappers.insert(type_id, Arc::new(Arc::new(mapper)));
        self.names.push(E::entity_name());
        Ok(self)
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> Registry {
        tracing::debug!(entities = ?self.names, "built mapper registry");
        Registry {
            mappers: self.mappers,
        }
    }
}

/// Immutable set of configured mappers keyed by entity type.
#[derive(Clone, Default)]
pub struct Registry {
    mappers: HashMap<TypeId, Slot>,
}

impl Registry {
    /// Starts a new registry.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Returns the shared mapper for `E`.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::NotRegistered`] if `E` was not registered.
    pub fn mapper<E: Entity>(&self) -> Result<Arc<Mapper<E>>> {
        self.mappers
            .get(&TypeId::of::<E>())
            .and_then(|slot| slot.downcast_ref::<Arc<Mapper<E>>>())
            .cloned()
            .ok_or(MapError::NotRegistered {
                entity: E::entity_name(),
            })
    }

    /// Whether `E` is registered.
    #[must_use]
    pub fn contains<E: Entity>(&self) -> bool {
        self.mappers.contains_key(&TypeId::of::<E>())
    }

    /// Number of registered entity types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    /// Whether no entity type is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }
}
