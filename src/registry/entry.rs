use crate::core::value::{erase, restore};
use crate::core::{AnyValue, MapperError, Result, TypePair};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;

pub(crate) type SyncConversion = dyn Fn(AnyValue) -> Result<AnyValue> + Send + Sync;
pub(crate) type AsyncConversion =
    dyn Fn(AnyValue) -> BoxFuture<'static, Result<AnyValue>> + Send + Sync;

/// Callable shape of a stored conversion.
pub enum Conversion {
    Sync(Box<SyncConversion>),
    Async(Box<AsyncConversion>),
}

impl Conversion {
    pub fn is_async(&self) -> bool {
        matches!(self, Conversion::Async(_))
    }
}

/// One registered conversion plus its one-shot flag.
///
/// The entry remembers the `S -> D` pair its callable was built for, so the
/// registry can refuse it under any other key.
pub struct ConversionEntry {
    pair: TypePair,
    conversion: Conversion,
    one_shot: bool,
}

impl ConversionEntry {
    pub fn sync<S, D, F>(convert: F, one_shot: bool) -> Self
    where
        S: Send + 'static,
        D: Send + 'static,
        F: Fn(S) -> D + Send + Sync + 'static,
    {
        Self::checked(move |source: S| Ok(convert(source)), one_shot)
    }

    /// Failures of `convert` reach the caller as `MapperError::Conversion`.
    pub fn fallible<S, D, E, F>(convert: F, one_shot: bool) -> Self
    where
        S: Send + 'static,
        D: Send + 'static,
        E: Into<anyhow::Error>,
        F: Fn(S) -> std::result::Result<D, E> + Send + Sync + 'static,
    {
        Self::checked(
            move |source: S| convert(source).map_err(|err| MapperError::Conversion(err.into())),
            one_shot,
        )
    }

    pub fn asynchronous<S, D, F, Fut>(convert: F, one_shot: bool) -> Self
    where
        S: Send + 'static,
        D: Send + 'static,
        F: Fn(S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = D> + Send + 'static,
    {
        Self::checked_async(
            move |source: S| {
                let pending = convert(source);
                async move { Ok(pending.await) }
            },
            one_shot,
        )
    }

    pub fn async_fallible<S, D, E, F, Fut>(convert: F, one_shot: bool) -> Self
    where
        S: Send + 'static,
        D: Send + 'static,
        E: Into<anyhow::Error>,
        F: Fn(S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<D, E>> + Send + 'static,
    {
        Self::checked_async(
            move |source: S| {
                let pending = convert(source);
                async move {
                    pending
                        .await
                        .map_err(|err| MapperError::Conversion(err.into()))
                }
            },
            one_shot,
        )
    }

    /// Synchronous conversion reporting `MapperError` directly.
    pub(crate) fn checked<S, D, F>(convert: F, one_shot: bool) -> Self
    where
        S: Send + 'static,
        D: Send + 'static,
        F: Fn(S) -> Result<D> + Send + Sync + 'static,
    {
        let erased = move |value: AnyValue| -> Result<AnyValue> {
            let source = restore::<S>(value, "source")?;
            convert(source).map(erase)
        };
        Self {
            pair: TypePair::of::<S, D>(),
            conversion: Conversion::Sync(Box::new(erased)),
            one_shot,
        }
    }

    pub(crate) fn checked_async<S, D, F, Fut>(convert: F, one_shot: bool) -> Self
    where
        S: Send + 'static,
        D: Send + 'static,
        F: Fn(S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<D>> + Send + 'static,
    {
        let erased = move |value: AnyValue| -> BoxFuture<'static, Result<AnyValue>> {
            match restore::<S>(value, "source") {
                Ok(source) => {
                    let pending = convert(source);
                    async move { pending.await.map(erase) }.boxed()
                }
                Err(err) => async move { Err(err) }.boxed(),
            }
        };
        Self {
            pair: TypePair::of::<S, D>(),
            conversion: Conversion::Async(Box::new(erased)),
            one_shot,
        }
    }

    /// The `S -> D` pair the callable converts.
    pub fn pair(&self) -> TypePair {
        self.pair
    }

    /// Whether `value` holds the source type of this entry.
    pub fn accepts(&self, value: &AnyValue) -> bool {
        (**value).type_id() == self.pair.source().id()
    }

    pub fn conversion(&self) -> &Conversion {
        &self.conversion
    }

    pub fn is_one_shot(&self) -> bool {
        self.one_shot
    }

    pub fn is_async(&self) -> bool {
        self.conversion.is_async()
    }
}

impl fmt::Debug for ConversionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionEntry")
            .field("pair", &self.pair.to_string())
            .field("async", &self.is_async())
            .field("one_shot", &self.one_shot)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call_sync(entry: &ConversionEntry, value: AnyValue) -> Result<AnyValue> {
        match entry.conversion() {
            Conversion::Sync(convert) => convert(value),
            Conversion::Async(_) => panic!("expected sync conversion"),
        }
    }

    #[test]
    fn test_sync_entry_converts() {
        let entry = ConversionEntry::sync(|n: i32| n.to_string(), false);
        assert!(!entry.is_async());
        assert!(!entry.is_one_shot());

        let out = call_sync(&entry, erase(12i32)).unwrap();
        assert_eq!(restore::<String>(out, "destination").unwrap(), "12");
    }

    #[test]
    fn test_sync_entry_rejects_wrong_source() {
        let entry = ConversionEntry::sync(|n: i32| n + 1, true);
        assert!(entry.is_one_shot());
        let err = call_sync(&entry, erase("nope")).unwrap_err();
        assert!(matches!(err, MapperError::TypeMismatch(_)));
    }

    #[test]
    fn test_entry_knows_its_pair() {
        let entry = ConversionEntry::asynchronous(|n: u8| async move { n as u64 }, true);
        assert_eq!(entry.pair(), TypePair::of::<u8, u64>());
        assert!(entry.accepts(&erase(3u8)));
        assert!(!entry.accepts(&erase(3u64)));
    }

    #[test]
    fn test_fallible_entry_wraps_error() {
        let entry = ConversionEntry::fallible(
            |n: i32| {
                if n < 0 {
                    Err(anyhow::anyhow!("negative"))
                } else {
                    Ok(n as u32)
                }
            },
            false,
        );
        let err = call_sync(&entry, erase(-1i32)).unwrap_err();
        assert_eq!(err.to_string(), "negative");
    }

    #[test]
    fn test_async_entry_converts() {
        let entry = ConversionEntry::asynchronous(|n: i32| async move { n * 2 }, false);
        assert!(entry.is_async());

        let Conversion::Async(convert) = entry.conversion() else {
            panic!("expected async conversion");
        };
        let out = tokio_test::block_on(convert(erase(21i32))).unwrap();
        assert_eq!(restore::<i32>(out, "destination").unwrap(), 42);
    }
}
