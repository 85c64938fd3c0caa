//! Derives the reverse of a declared forward mapping.
//!
//! The forward description is reduced to `destination.member <- source.member`
//! copies. The reverse copies a destination member back only when the forward
//! copy read the source member of the same name. Every other source member is
//! left at its `Default` value.

use crate::core::types::short_type_name;
use crate::core::{MapperError, Result, TypeKey, TypePair};
use crate::expression::MappingDescription;
use crate::reflect::Mappable;
use crate::registry::ConversionEntry;
use std::any::type_name;

/// `(from, to)` member names.
type CopyPlan = Vec<(&'static str, &'static str)>;

pub struct DerivedMapping {
    pub forward: ConversionEntry,
    pub reverse: ConversionEntry,
    /// Destination members that the reverse mapping does not restore.
    pub omitted: Vec<&'static str>,
}

impl DerivedMapping {
    /// Both entries keyed for registration, forward first.
    pub fn into_entries<S: 'static, D: 'static>(self) -> Vec<(TypePair, ConversionEntry)> {
        let pair = TypePair::of::<S, D>();
        vec![(pair, self.forward), (pair.reversed(), self.reverse)]
    }
}

pub fn derive_mapping<S: Mappable, D: Mappable>(description: &MappingDescription) -> Result<DerivedMapping> {
    let copies = description.validate()?;
    check_type_name::<D>(description.target(), "destination")?;
    if let Some(declared) = description.declared_param_type() {
        check_type_name::<S>(declared, "source")?;
    }

    let mut forward: CopyPlan = Vec::with_capacity(copies.len());
    let mut reverse: CopyPlan = Vec::new();
    let mut omitted = Vec::new();

    for copy in &copies {
        let to = D::member(&copy.destination).ok_or_else(|| missing_member::<D>(&copy.destination))?;
        let from = S::member(&copy.source).ok_or_else(|| missing_member::<S>(&copy.source))?;

        if !to.accepts(from) {
            return Err(MapperError::unsupported(format!(
                "member '{}' is {} but source member '{}' is {}",
                to.name(),
                to.type_name(),
                from.name(),
                from.type_name()
            )));
        }
        forward.push((from.name(), to.name()));

        // Only `m <- s.m` inverts cleanly; a rename or swap onto another
        // source member would write the wrong value back.
        match S::member(to.name()) {
            Some(back) if from.name() == back.name() && back.accepts(to) => {
                reverse.push((to.name(), back.name()))
            }
            _ => omitted.push(to.name()),
        }
    }

    Ok(DerivedMapping {
        forward: ConversionEntry::checked(move |source: S| copy_members::<S, D>(&source, &forward), false),
        reverse: ConversionEntry::checked(move |source: D| copy_members::<D, S>(&source, &reverse), false),
        omitted,
    })
}

fn copy_members<S: Mappable, D: Mappable>(source: &S, plan: &CopyPlan) -> Result<D> {
    let mut destination = D::default();
    for (from, to) in plan {
        let value = source
            .read_member(from)
            .ok_or_else(|| MapperError::UnknownMember(from.to_string(), type_name::<S>()))?;
        destination.write_member(to, value)?;
    }
    Ok(destination)
}

fn check_type_name<T: 'static>(declared: &str, role: &str) -> Result<()> {
    let actual = TypeKey::of::<T>();
    if short_type_name(declared) == actual.short_name() {
        return Ok(());
    }
    Err(MapperError::unsupported(format!(
        "description names `{}` but the {} type is {}",
        declared,
        role,
        actual.name()
    )))
}

fn missing_member<T: 'static>(name: &str) -> MapperError {
    MapperError::unsupported(format!("{} has no member '{}'", type_name::<T>(), name))
}
