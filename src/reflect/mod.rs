//! Member-level reflection used by the bidirectional deriver.
//!
//! Implemented by `#[derive(Mappable)]` for structs with named fields. Every
//! reflected field is read by cloning and written by replacing the whole
//! value, so field types must be `Clone + Send + 'static`.

use crate::core::{MemberValue, Result};
use std::any::TypeId;
use std::fmt;

/// Static description of one reflected member.
#[derive(Clone, Copy)]
pub struct Member {
    name: &'static str,
    type_name: fn() -> &'static str,
    type_id: fn() -> TypeId,
}

impl Member {
    pub const fn new(
        name: &'static str,
        type_name: fn() -> &'static str,
        type_id: fn() -> TypeId,
    ) -> Self {
        Self {
            name,
            type_name,
            type_id,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    pub fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// Values of `other` can be written into this member as-is.
    pub fn accepts(&self, other: &Member) -> bool {
        self.type_id() == other.type_id()
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.type_name())
    }
}

pub trait Mappable: Default + Send + 'static {
    /// Reflected members in declaration order.
    fn members() -> &'static [Member];

    /// Clone of the named member, `None` when the member does not exist.
    fn read_member(&self, name: &str) -> Option<MemberValue>;

    /// Replace the named member.
    ///
    /// Fails with `UnknownMember` for names not in `members()` and with
    /// `TypeMismatch` when the value has the wrong type.
    fn write_member(&mut self, name: &str, value: MemberValue) -> Result<()>;

    fn member(name: &str) -> Option<&'static Member> {
        Self::members().iter().find(|member| member.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mappable;

    #[derive(Default, Mappable)]
    struct Account {
        id: i32,
        #[mapper(rename = "Login")]
        login: String,
        #[mapper(skip)]
        #[allow(dead_code)]
        cache: Vec<u8>,
    }

    #[test]
    fn test_members_follow_declaration_order() {
        let names: Vec<_> = Account::members().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["id", "Login"]);
        assert_eq!(Account::member("id").unwrap().type_name(), "i32");
        assert!(Account::member("cache").is_none());
    }

    #[test]
    fn test_read_and_write_members() {
        let mut account = Account {
            id: 3,
            login: "nikita".into(),
            cache: vec![1],
        };

        let login = account.read_member("Login").unwrap();
        assert_eq!(login.downcast::<String>("Login").unwrap(), "nikita");

        account.write_member("id", MemberValue::new(9i32)).unwrap();
        assert_eq!(account.id, 9);
        assert!(account.read_member("login").is_none());
    }

    #[test]
    fn test_write_rejects_bad_members() {
        let mut account = Account::default();
        assert!(matches!(
            account.write_member("missing", MemberValue::new(1i32)),
            Err(crate::MapperError::UnknownMember(..))
        ));
        assert!(matches!(
            account.write_member("id", MemberValue::new("x")),
            Err(crate::MapperError::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_member_compatibility() {
        let id = Account::member("id").unwrap();
        let login = Account::member("Login").unwrap();
        assert!(id.accepts(id));
        assert!(!id.accepts(login));
    }
}
