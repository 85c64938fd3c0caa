//! Declarative member-assignment descriptions used by bidirectional mappings.

mod description;
mod lexer;
mod parser;

pub use description::{MappingDescription, MemberAssignment, MemberCopy, SourceExpr};
