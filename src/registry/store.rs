use super::ConversionEntry;
use crate::core::{MapperError, Result, TypePair};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

/// Keyed store of conversion entries.
///
/// A plain data structure: it never invokes callables and holds no lock of
/// its own. `EntityMapper` guards it with a `RwLock`.
#[derive(Default)]
pub struct MappingRegistry {
    entries: HashMap<TypePair, Arc<ConversionEntry>>,
}

impl MappingRegistry {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Insert a new entry. Existing keys are never overwritten, and an entry
    /// is only accepted under the pair its callable was built for.
    pub fn register(&mut self, pair: TypePair, entry: ConversionEntry) -> Result<()> {
        check_key(&pair, &entry)?;
        match self.entries.entry(pair) {
            Entry::Occupied(_) => Err(duplicate(&pair)),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(entry));
                Ok(())
            }
        }
    }

    /// Insert several entries, or none of them when any key collides with
    /// the store or with another key of the batch.
    pub fn register_all(&mut self, batch: Vec<(TypePair, ConversionEntry)>) -> Result<()> {
        for (index, (pair, entry)) in batch.iter().enumerate() {
            check_key(pair, entry)?;
            let repeated = batch[..index].iter().any(|(other, _)| other == pair);
            if repeated || self.entries.contains_key(pair) {
                return Err(duplicate(pair));
            }
        }

        for (pair, entry) in batch {
            self.entries.insert(pair, Arc::new(entry));
        }
        Ok(())
    }

    pub fn lookup(&self, pair: &TypePair) -> Option<&Arc<ConversionEntry>> {
        self.entries.get(pair)
    }

    /// Delete the entry if present; absent keys are a no-op.
    pub fn remove(&mut self, pair: &TypePair) -> Option<Arc<ConversionEntry>> {
        self.entries.remove(pair)
    }

    pub fn contains(&self, pair: &TypePair) -> bool {
        self.entries.contains_key(pair)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pairs(&self) -> Vec<TypePair> {
        self.entries.keys().copied().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn check_key(pair: &TypePair, entry: &ConversionEntry) -> Result<()> {
    if entry.pair() == *pair {
        return Ok(());
    }
    Err(MapperError::TypeMismatch(format!(
        "conversion {} cannot be registered under {}",
        entry.pair(),
        pair
    )))
}

fn duplicate(pair: &TypePair) -> MapperError {
    MapperError::DuplicateMapping(pair.source().name(), pair.destination().name())
}
