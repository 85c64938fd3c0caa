// ============================================================================
// EntityMapper Library
// ============================================================================

//! Runtime object-mapping registry.
//!
//! Conversions between pairs of types are registered once and applied later
//! through [`EntityMapper::map`] / [`EntityMapper::map_async`]. Mappings can
//! be one-shot, asynchronous, fallible, or declared once and registered in
//! both directions (see [`EntityMapper::register_bidirectional`]).

extern crate self as entitymapper;

pub mod core;
pub mod diagnostics;
pub mod expression;
pub mod facade;
pub mod interface;
pub mod reflect;
pub mod registry;
mod bidirectional;
mod dispatch;

// Re-export main types for convenience
pub use crate::core::{AnyValue, MapperError, MemberValue, Result, TypeKey, TypePair};
pub use diagnostics::{DiagnosticSink, FailureKind, MappingFailure, TracingSink};
pub use entitymapper_derive::Mappable;
pub use expression::{MappingDescription, SourceExpr};
pub use facade::{EntityMapper, MapperConfig, MapperHandle};
pub use interface::{Mapper, MapperExt};
pub use reflect::{Mappable, Member};
pub use registry::{ConversionEntry, MappingRegistry};
