use super::EntityMapper;
use crate::interface::Mapper;
use std::ops::Deref;
use std::sync::Arc;

/// One shared mapper instance, reachable both as the concrete
/// `EntityMapper` and as the `dyn Mapper` capability.
///
/// Both views point at the same allocation, so registrations made through
/// the handle are visible to every holder of the capability.
#[derive(Clone)]
pub struct MapperHandle {
    mapper: Arc<EntityMapper>,
}

impl MapperHandle {
    pub fn new(mapper: EntityMapper) -> Self {
        Self {
            mapper: Arc::new(mapper),
        }
    }

    pub fn concrete(&self) -> Arc<EntityMapper> {
        Arc::clone(&self.mapper)
    }

    pub fn capability(&self) -> Arc<dyn Mapper> {
        self.mapper.clone()
    }

    /// `true` when `capability` resolves to this handle's instance.
    pub fn is_same(&self, capability: &Arc<dyn Mapper>) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.mapper), Arc::as_ptr(capability))
    }
}

impl Default for MapperHandle {
    fn default() -> Self {
        Self::new(EntityMapper::new())
    }
}

impl Deref for MapperHandle {
    type Target = EntityMapper;

    fn deref(&self) -> &EntityMapper {
        &self.mapper
    }
}

impl From<EntityMapper> for MapperHandle {
    fn from(mapper: EntityMapper) -> Self {
        Self::new(mapper)
    }
}
