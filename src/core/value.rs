use super::{MapperError, Result};
use std::any::{Any, type_name};
use std::fmt;

/// Type-erased value travelling through the dispatcher.
pub type AnyValue = Box<dyn Any + Send>;

pub(crate) fn erase<T: Send + 'static>(value: T) -> AnyValue {
    Box::new(value)
}

pub(crate) fn restore<T: 'static>(value: AnyValue, role: &str) -> Result<T> {
    value.downcast::<T>().map(|boxed| *boxed).map_err(|_| {
        MapperError::TypeMismatch(format!("{} value is not a {}", role, type_name::<T>()))
    })
}

/// Copy of a single struct member, as produced by `Mappable::read_member`.
pub struct MemberValue {
    value: AnyValue,
    type_name: &'static str,
}

impl MemberValue {
    pub fn new<T: Send + 'static>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: type_name::<T>(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Unwrap into `T`; `member` only feeds the error message.
    pub fn downcast<T: 'static>(self, member: &str) -> Result<T> {
        let found = self.type_name;
        self.value.downcast::<T>().map(|boxed| *boxed).map_err(|_| {
            MapperError::TypeMismatch(format!(
                "member '{}' expects {} but got {}",
                member,
                type_name::<T>(),
                found
            ))
        })
    }
}

impl fmt::Debug for MemberValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemberValue({})", self.type_name)
    }
}
