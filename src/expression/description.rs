use super::parser;
use crate::core::{MapperError, Result};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Right-hand side of one member assignment, classified by shape.
///
/// Only `Member` with a single-segment path rooted at the source parameter
/// is accepted by `MappingDescription::validate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceExpr {
    Member { root: String, path: Vec<String> },
    Literal(String),
    Call(String),
    MethodCall(String),
    Conditional,
    Projection,
    Construct(String),
    Closure,
    Operation(String),
}

impl SourceExpr {
    /// `root.name`
    pub fn member(root: &str, name: &str) -> Self {
        SourceExpr::Member {
            root: root.to_string(),
            path: vec![name.to_string()],
        }
    }

    fn shape(&self) -> String {
        match self {
            SourceExpr::Member { root, path } if path.is_empty() => {
                format!("whole value `{}`", root)
            }
            SourceExpr::Member { root, path } if path.len() > 1 => {
                format!("nested member access `{}.{}`", root, path.join("."))
            }
            SourceExpr::Member { root, path } => format!("member `{}.{}`", root, path.join(".")),
            SourceExpr::Literal(text) => format!("literal `{}`", text),
            SourceExpr::Call(name) => format!("nested call `{}(..)`", name),
            SourceExpr::MethodCall(name) => format!("method call `.{}(..)`", name),
            SourceExpr::Conditional => "conditional expression".to_string(),
            SourceExpr::Projection => "collection projection".to_string(),
            SourceExpr::Construct(name) => format!("nested construction `{} {{ .. }}`", name),
            SourceExpr::Closure => "closure".to_string(),
            SourceExpr::Operation(text) => format!("computed expression `{}`", text),
        }
    }
}

impl fmt::Display for SourceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.shape())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberAssignment {
    pub member: String,
    pub expr: SourceExpr,
}

/// Validated `destination.member <- source.member` copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberCopy {
    pub destination: String,
    pub source: String,
}

/// Declarative forward mapping: build `target` and assign each member from
/// an expression over the single source parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingDescription {
    param: String,
    param_type: Option<String>,
    target: String,
    assignments: Vec<MemberAssignment>,
}

impl MappingDescription {
    pub fn new(param: &str, target: &str) -> Self {
        Self {
            param: param.to_string(),
            param_type: None,
            target: target.to_string(),
            assignments: Vec::new(),
        }
    }

    /// Parse `|param: Source| Target { member: param.member, .. }`.
    pub fn parse(text: &str) -> Result<Self> {
        parser::parse_description(text)
    }

    pub fn param_type(mut self, type_name: &str) -> Self {
        self.param_type = Some(type_name.to_string());
        self
    }

    pub fn assign(mut self, member: &str, expr: SourceExpr) -> Self {
        self.assignments.push(MemberAssignment {
            member: member.to_string(),
            expr,
        });
        self
    }

    pub fn param(&self) -> &str {
        &self.param
    }

    pub fn declared_param_type(&self) -> Option<&str> {
        self.param_type.as_deref()
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn assignments(&self) -> &[MemberAssignment] {
        &self.assignments
    }

    /// Check the flat member-assignment shape and reduce it to member copies.
    pub fn validate(&self) -> Result<Vec<MemberCopy>> {
        if self.assignments.is_empty() {
            return Err(MapperError::unsupported(format!(
                "`{}` has no member assignments",
                self.target
            )));
        }

        let mut seen = HashSet::new();
        let mut copies = Vec::with_capacity(self.assignments.len());

        for assignment in &self.assignments {
            if !seen.insert(assignment.member.as_str()) {
                return Err(MapperError::unsupported(format!(
                    "member '{}' is assigned more than once",
                    assignment.member
                )));
            }

            let source = match &assignment.expr {
                SourceExpr::Member { root, path } if root == &self.param && path.len() == 1 => {
                    path[0].clone()
                }
                SourceExpr::Member { root, path } if root != &self.param && !path.is_empty() => {
                    return Err(MapperError::unsupported(format!(
                        "member '{}' reads `{}` which is not the source parameter `{}`",
                        assignment.member, root, self.param
                    )));
                }
                other => {
                    return Err(MapperError::unsupported(format!(
                        "member '{}' is assigned from a {}",
                        assignment.member, other
                    )));
                }
            };

            copies.push(MemberCopy {
                destination: assignment.member.clone(),
                source,
            });
        }

        Ok(copies)
    }
}

impl FromStr for MappingDescription {
    type Err = MapperError;

    fn from_str(text: &str) -> Result<Self> {
        Self::parse(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_flat_description() {
        let description = MappingDescription::new("user", "UserDto")
            .assign("Id", SourceExpr::member("user", "Id"))
            .assign("Name", SourceExpr::member("user", "Name"));

        let copies = description.validate().unwrap();
        assert_eq!(
            copies,
            vec![
                MemberCopy {
                    destination: "Id".into(),
                    source: "Id".into()
                },
                MemberCopy {
                    destination: "Name".into(),
                    source: "Name".into()
                },
            ]
        );
    }

    #[test]
    fn test_validate_rejects_foreign_root() {
        let description =
            MappingDescription::new("user", "UserDto").assign("Id", SourceExpr::member("other", "Id"));
        let err = description.validate().unwrap_err();
        assert!(err.to_string().contains("not the source parameter `user`"));
    }

    #[test]
    fn test_validate_rejects_computed_shapes() {
        let shapes = vec![
            SourceExpr::Call("format".into()),
            SourceExpr::Conditional,
            SourceExpr::Projection,
            SourceExpr::Literal("1".into()),
            SourceExpr::Member {
                root: "user".into(),
                path: vec!["Address".into(), "City".into()],
            },
        ];

        for shape in shapes {
            let description = MappingDescription::new("user", "UserDto").assign("Id", shape);
            assert!(matches!(
                description.validate(),
                Err(MapperError::UnsupportedMappingShape(_))
            ));
        }
    }

    #[test]
    fn test_validate_rejects_duplicates_and_empty() {
        let empty = MappingDescription::new("user", "UserDto");
        assert!(empty.validate().is_err());

        let duplicate = MappingDescription::new("user", "UserDto")
            .assign("Id", SourceExpr::member("user", "Id"))
            .assign("Id", SourceExpr::member("user", "Id"));
        assert!(
            duplicate
                .validate()
                .unwrap_err()
                .to_string()
                .contains("more than once")
        );
    }
}
