//! Best-effort reporting of failed mappings.
//!
//! Reporting never changes the failure returned to the caller.

use crate::core::{MapperError, TypePair};
use std::any::Any;
use tracing::error;

#[derive(Debug)]
pub enum FailureKind<'a> {
    Error(&'a MapperError),
    Panic(String),
}

#[derive(Debug)]
pub struct MappingFailure<'a> {
    /// Label of the mapper instance, from `MapperConfig::name`.
    pub mapper: &'a str,
    pub pair: TypePair,
    pub kind: FailureKind<'a>,
}

impl MappingFailure<'_> {
    pub fn message(&self) -> String {
        format!(
            "Something went wrong with mapping {} and {}",
            self.pair.source(),
            self.pair.destination()
        )
    }

    pub fn detail(&self) -> String {
        match &self.kind {
            FailureKind::Error(err) => err.to_string(),
            FailureKind::Panic(message) => format!("panicked: {}", message),
        }
    }
}

/// Destination for mapping failure reports.
pub trait DiagnosticSink: Send + Sync {
    fn mapping_failed(&self, failure: &MappingFailure<'_>);
}

/// Default sink: one `tracing` error event per failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn mapping_failed(&self, failure: &MappingFailure<'_>) {
        error!(
            mapper = failure.mapper,
            source = failure.pair.source().name(),
            destination = failure.pair.destination().name(),
            detail = %failure.detail(),
            "{}",
            failure.message()
        );
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct User;
    struct UserDto;

    #[test]
    fn test_failure_message_names_both_types() {
        let err = MapperError::NotAsyncConfiguration;
        let failure = MappingFailure {
            mapper: "test",
            pair: TypePair::of::<User, UserDto>(),
            kind: FailureKind::Error(&err),
        };

        let message = failure.message();
        assert!(message.starts_with("Something went wrong with mapping "));
        assert!(message.contains(std::any::type_name::<User>()));
        assert!(message.contains(std::any::type_name::<UserDto>()));
        assert_eq!(failure.detail(), "Is Not Async Configuration");
    }

    #[test]
    fn test_panic_message_extraction() {
        let boxed: Box<dyn Any + Send> = Box::new("static str");
        assert_eq!(panic_message(boxed.as_ref()), "static str");

        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");

        let boxed: Box<dyn Any + Send> = Box::new(5u8);
        assert_eq!(panic_message(boxed.as_ref()), "non-string panic payload");
    }
}
