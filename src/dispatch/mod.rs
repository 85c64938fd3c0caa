//! Lookup-and-invoke against a `MappingRegistry`.
//!
//! Per call: lookup, shape check, one-shot consumption, invoke, report.
//! Lookup and one-shot removal happen under the registry write lock, so two
//! callers can never both consume the same one-shot entry. Callables run
//! after the lock is released.

use crate::core::{AnyValue, MapperError, Result, TypePair};
use crate::diagnostics::{DiagnosticSink, FailureKind, MappingFailure, panic_message};
use crate::facade::MapperConfig;
use crate::registry::{Conversion, ConversionEntry, MappingRegistry};
use futures::FutureExt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, RwLock};
use tracing::debug;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Shape {
    Sync,
    Async,
}

pub(crate) struct Dispatcher<'a> {
    registry: &'a RwLock<MappingRegistry>,
    sink: &'a dyn DiagnosticSink,
    config: &'a MapperConfig,
}

impl<'a> Dispatcher<'a> {
    pub(crate) fn new(
        registry: &'a RwLock<MappingRegistry>,
        sink: &'a dyn DiagnosticSink,
        config: &'a MapperConfig,
    ) -> Self {
        Self {
            registry,
            sink,
            config,
        }
    }

    pub(crate) fn map_value(&self, pair: TypePair, value: AnyValue) -> Result<AnyValue> {
        let result = self
            .acquire(pair, Shape::Sync, &value)
            .and_then(|entry| self.invoke(pair, &entry, value));

        if let Err(err) = &result {
            self.report(pair, FailureKind::Error(err));
        }
        result
    }

    pub(crate) async fn map_value_async(&self, pair: TypePair, value: AnyValue) -> Result<AnyValue> {
        let result = match self.acquire(pair, Shape::Async, &value) {
            Ok(entry) => self.invoke_async(pair, entry, value).await,
            Err(err) => Err(err),
        };

        if let Err(err) = &result {
            self.report(pair, FailureKind::Error(err));
        }
        result
    }

    /// Find the entry for `pair` and check its shape and the source value's
    /// type. One-shot entries that pass both checks are removed from the
    /// registry before this returns.
    fn acquire(
        &self,
        pair: TypePair,
        shape: Shape,
        value: &AnyValue,
    ) -> Result<Arc<ConversionEntry>> {
        {
            let registry = self.registry.read()?;
            let entry = registry.lookup(&pair).ok_or_else(|| missing(&pair))?;
            check_entry(entry, shape, value)?;
            if !entry.is_one_shot() {
                return Ok(Arc::clone(entry));
            }
        }

        // Re-check under the write lock: a concurrent caller may have
        // consumed the entry between the two locks.
        let mut registry = self.registry.write()?;
        let (entry, one_shot) = match registry.lookup(&pair) {
            Some(entry) => {
                check_entry(entry, shape, value)?;
                (Arc::clone(entry), entry.is_one_shot())
            }
            None => return Err(missing(&pair)),
        };

        if one_shot {
            registry.remove(&pair);
            if self.config.trace_registrations {
                debug!(mapper = %self.config.name, pair = %pair, "one-shot mapping consumed");
            }
        }
        Ok(entry)
    }

    fn invoke(&self, pair: TypePair, entry: &ConversionEntry, value: AnyValue) -> Result<AnyValue> {
        let Conversion::Sync(convert) = entry.conversion() else {
            return Err(MapperError::NotSyncConfiguration);
        };

        match panic::catch_unwind(AssertUnwindSafe(|| convert(value))) {
            Ok(result) => result,
            Err(payload) => {
                self.report(pair, FailureKind::Panic(panic_message(payload.as_ref())));
                panic::resume_unwind(payload)
            }
        }
    }

    async fn invoke_async(
        &self,
        pair: TypePair,
        entry: Arc<ConversionEntry>,
        value: AnyValue,
    ) -> Result<AnyValue> {
        let Conversion::Async(convert) = entry.conversion() else {
            return Err(MapperError::NotAsyncConfiguration);
        };

        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| convert(value))) {
            Ok(pending) => AssertUnwindSafe(pending).catch_unwind().await,
            Err(payload) => Err(payload),
        };

        match outcome {
            Ok(result) => result,
            Err(payload) => {
                self.report(pair, FailureKind::Panic(panic_message(payload.as_ref())));
                panic::resume_unwind(payload)
            }
        }
    }

    fn report(&self, pair: TypePair, kind: FailureKind<'_>) {
        if !self.config.report_failures {
            return;
        }
        self.sink.mapping_failed(&MappingFailure {
            mapper: &self.config.name,
            pair,
            kind,
        });
    }
}

fn check_entry(entry: &ConversionEntry, shape: Shape, value: &AnyValue) -> Result<()> {
    match (shape, entry.is_async()) {
        (Shape::Async, false) => return Err(MapperError::NotAsyncConfiguration),
        (Shape::Sync, true) => return Err(MapperError::NotSyncConfiguration),
        _ => {}
    }
    if !entry.accepts(value) {
        return Err(MapperError::TypeMismatch(format!(
            "source value is not a {}",
            entry.pair().source().name()
        )));
    }
    Ok(())
}

fn missing(pair: &TypePair) -> MapperError {
    MapperError::MissingConfiguration(pair.source().name(), pair.destination().name())
}
