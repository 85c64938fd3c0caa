use crate::core::value::{erase, restore};
use crate::core::{AnyValue, Result, TypePair};
use async_trait::async_trait;

/// Mapping capability, usable as `dyn Mapper`.
///
/// Consumers that only need to convert values depend on this trait instead
/// of `EntityMapper`. Typed calls come from [`MapperExt`].
#[async_trait]
pub trait Mapper: Send + Sync {
    /// Convert a type-erased value with the mapping registered for `pair`.
    fn map_value(&self, pair: TypePair, value: AnyValue) -> Result<AnyValue>;

    /// Async counterpart of `map_value`; fails with `NotAsyncConfiguration`
    /// when the mapping for `pair` is synchronous.
    async fn map_value_async(&self, pair: TypePair, value: AnyValue) -> Result<AnyValue>;
}

/// Typed `map` / `map_async` for any [`Mapper`], including `dyn Mapper`.
#[async_trait]
pub trait MapperExt: Mapper {
    fn map<S, D>(&self, source: S) -> Result<D>
    where
        S: Send + 'static,
        D: 'static,
    {
        let value = self.map_value(TypePair::of::<S, D>(), erase(source))?;
        restore(value, "destination")
    }

    async fn map_async<S, D>(&self, source: S) -> Result<D>
    where
        S: Send + 'static,
        D: Send + 'static,
    {
        let value = self
            .map_value_async(TypePair::of::<S, D>(), erase(source))
            .await?;
        restore(value, "destination")
    }
}

impl<T: Mapper + ?Sized> MapperExt for T {}
