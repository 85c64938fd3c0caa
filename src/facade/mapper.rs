use super::{MapperConfig, MapperHandle};
use crate::bidirectional::derive_mapping;
use crate::core::value::{erase, restore};
use crate::core::{AnyValue, Result, TypePair};
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::dispatch::Dispatcher;
use crate::expression::MappingDescription;
use crate::interface::Mapper;
use crate::reflect::Mappable;
use crate::registry::{ConversionEntry, MappingRegistry};
use async_trait::async_trait;
use std::future::Future;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Registry of conversions between pairs of types.
///
/// Each instance is independent. Registration and mapping both take `&self`,
/// so one instance can be shared behind an `Arc` (see [`MapperHandle`]).
///
/// # Examples
///
/// ```
/// use entitymapper::EntityMapper;
///
/// struct User { id: i32, name: String }
/// struct UserDto { id: i32, name: String }
///
/// # fn main() -> entitymapper::Result<()> {
/// let mapper = EntityMapper::new();
/// mapper.register(|user: User| UserDto { id: user.id, name: user.name })?;
///
/// let dto: UserDto = mapper.map(User { id: 10, name: "Nikita".into() })?;
/// assert_eq!(dto.id, 10);
/// assert_eq!(dto.name, "Nikita");
/// # Ok(())
/// # }
/// ```
pub struct EntityMapper {
    registry: RwLock<MappingRegistry>,
    sink: Arc<dyn DiagnosticSink>,
    config: MapperConfig,
}

impl Default for EntityMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityMapper {
    pub fn new() -> Self {
        Self::with_config(MapperConfig::default())
    }

    pub fn with_config(config: MapperConfig) -> Self {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    /// Use a custom destination for failure reports.
    pub fn with_sink(config: MapperConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            registry: RwLock::new(MappingRegistry::new()),
            sink,
            config,
        }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Wrap into a shareable handle.
    pub fn into_handle(self) -> MapperHandle {
        MapperHandle::new(self)
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    pub fn register<S, D, F>(&self, convert: F) -> Result<()>
    where
        S: Send + 'static,
        D: Send + 'static,
        F: Fn(S) -> D + Send + Sync + 'static,
    {
        self.register_entry(TypePair::of::<S, D>(), ConversionEntry::sync(convert, false))
    }

    /// Register a mapping that is removed by the first `map` call using it.
    pub fn register_once<S, D, F>(&self, convert: F) -> Result<()>
    where
        S: Send + 'static,
        D: Send + 'static,
        F: Fn(S) -> D + Send + Sync + 'static,
    {
        self.register_entry(TypePair::of::<S, D>(), ConversionEntry::sync(convert, true))
    }

    /// Register a mapping that can fail. The error reaches the `map` caller
    /// as `MapperError::Conversion`.
    pub fn register_fallible<S, D, E, F>(&self, convert: F) -> Result<()>
    where
        S: Send + 'static,
        D: Send + 'static,
        E: Into<anyhow::Error>,
        F: Fn(S) -> std::result::Result<D, E> + Send + Sync + 'static,
    {
        self.register_entry(
            TypePair::of::<S, D>(),
            ConversionEntry::fallible(convert, false),
        )
    }

    pub fn register_async<S, D, F, Fut>(&self, convert: F) -> Result<()>
    where
        S: Send + 'static,
        D: Send + 'static,
        F: Fn(S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = D> + Send + 'static,
    {
        self.register_entry(
            TypePair::of::<S, D>(),
            ConversionEntry::asynchronous(convert, false),
        )
    }

    pub fn register_async_fallible<S, D, E, F, Fut>(&self, convert: F) -> Result<()>
    where
        S: Send + 'static,
        D: Send + 'static,
        E: Into<anyhow::Error>,
        F: Fn(S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<D, E>> + Send + 'static,
    {
        self.register_entry(
            TypePair::of::<S, D>(),
            ConversionEntry::async_fallible(convert, false),
        )
    }

    /// Async one-shot mapping; consumed when `map_async` picks it up, before
    /// the future is awaited.
    pub fn register_async_once<S, D, F, Fut>(&self, convert: F) -> Result<()>
    where
        S: Send + 'static,
        D: Send + 'static,
        F: Fn(S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = D> + Send + 'static,
    {
        self.register_entry(
            TypePair::of::<S, D>(),
            ConversionEntry::asynchronous(convert, true),
        )
    }

    /// Register `S -> D` from a declarative description together with the
    /// derived `D -> S` reverse. Either both mappings are added or neither.
    ///
    /// The reverse only restores members assigned as `m: s.m`. Renamed or
    /// swapped members stay at their `Default` value; register those
    /// directions by hand.
    ///
    /// ```
    /// use entitymapper::{EntityMapper, Mappable};
    ///
    /// #[derive(Default, Mappable)]
    /// struct User { id: i32, name: String }
    ///
    /// #[derive(Default, Mappable)]
    /// struct UserDto { id: i32, name: String }
    ///
    /// # fn main() -> entitymapper::Result<()> {
    /// let mapper = EntityMapper::new();
    /// mapper.register_bidirectional::<User, UserDto>(
    ///     "|user: User| UserDto { id: user.id, name: user.name }",
    /// )?;
    ///
    /// let user: User = mapper.map(UserDto { id: 25, name: "Dto".into() })?;
    /// assert_eq!(user.id, 25);
    /// # Ok(())
    /// # }
    /// ```
    pub fn register_bidirectional<S, D>(&self, description: &str) -> Result<()>
    where
        S: Mappable,
        D: Mappable,
    {
        let description = MappingDescription::parse(description)?;
        self.register_description::<S, D>(&description)
    }

    pub fn register_description<S, D>(&self, description: &MappingDescription) -> Result<()>
    where
        S: Mappable,
        D: Mappable,
    {
        let derived = derive_mapping::<S, D>(description)?;
        if self.config.trace_registrations && !derived.omitted.is_empty() {
            debug!(
                mapper = %self.config.name,
                omitted = ?derived.omitted,
                "reverse mapping leaves members at their default"
            );
        }

        let entries = derived.into_entries::<S, D>();
        self.registry.write()?.register_all(entries)?;
        self.trace("bidirectional mapping registered", TypePair::of::<S, D>());
        Ok(())
    }

    /// Insert a prepared entry under `pair`. Fails with `TypeMismatch` when
    /// `pair` is not the pair the entry was built for.
    pub fn register_entry(&self, pair: TypePair, entry: ConversionEntry) -> Result<()> {
        let one_shot = entry.is_one_shot();
        self.registry.write()?.register(pair, entry)?;
        if self.config.trace_registrations {
            debug!(mapper = %self.config.name, pair = %pair, one_shot, "mapping registered");
        }
        Ok(())
    }

    /// Remove the `S -> D` mapping. Returns `false` when none was registered.
    pub fn unregister<S: 'static, D: 'static>(&self) -> Result<bool> {
        self.unregister_pair(TypePair::of::<S, D>())
    }

    pub fn unregister_pair(&self, pair: TypePair) -> Result<bool> {
        let removed = self.registry.write()?.remove(&pair).is_some();
        if removed {
            self.trace("mapping removed", pair);
        }
        Ok(removed)
    }

    pub fn contains<S: 'static, D: 'static>(&self) -> Result<bool> {
        Ok(self.registry.read()?.contains(&TypePair::of::<S, D>()))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.registry.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.registry.read()?.is_empty())
    }

    pub fn registered_pairs(&self) -> Result<Vec<TypePair>> {
        Ok(self.registry.read()?.pairs())
    }

    pub fn clear(&self) -> Result<()> {
        self.registry.write()?.clear();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Mapping
    // ------------------------------------------------------------------

    /// Convert `source` with the registered synchronous `S -> D` mapping.
    pub fn map<S, D>(&self, source: S) -> Result<D>
    where
        S: Send + 'static,
        D: 'static,
    {
        let value = self.map_value(TypePair::of::<S, D>(), erase(source))?;
        restore(value, "destination")
    }

    /// Convert `source` with the registered asynchronous `S -> D` mapping.
    pub async fn map_async<S, D>(&self, source: S) -> Result<D>
    where
        S: Send + 'static,
        D: 'static,
    {
        let value = self
            .dispatcher()
            .map_value_async(TypePair::of::<S, D>(), erase(source))
            .await?;
        restore(value, "destination")
    }

    fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(&self.registry, self.sink.as_ref(), &self.config)
    }

    fn trace(&self, message: &str, pair: TypePair) {
        if self.config.trace_registrations {
            debug!(mapper = %self.config.name, pair = %pair, "{}", message);
        }
    }
}

#[async_trait]
impl Mapper for EntityMapper {
    fn map_value(&self, pair: TypePair, value: AnyValue) -> Result<AnyValue> {
        self.dispatcher().map_value(pair, value)
    }

    async fn map_value_async(&self, pair: TypePair, value: AnyValue) -> Result<AnyValue> {
        self.dispatcher().map_value_async(pair, value).await
    }
}
