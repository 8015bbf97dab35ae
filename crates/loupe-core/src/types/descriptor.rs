//! Type descriptors handed out by the host.

use serde::{Deserialize, Serialize};

/// Broad shape of a type as far as the printers care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind
{
    /// Struct, class or union with named fields.
    Struct,
    /// Indirect reference; `target` names the pointee type.
    Pointer,
    /// Fixed-size array; `target` names the element type.
    Array
    {
        /// Number of elements the array can hold.
        length: u64,
    },
    /// Integer, floating point, character or enumeration.
    Scalar,
    /// Declared alias (`typedef` / `using`); `target` names the aliased type.
    Alias,
}

/// A declared field of a struct type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor
{
    /// Field name as declared.
    pub name: String,
    /// Statically declared type of the field.
    #[serde(rename = "type")]
    pub type_name: String,
}

impl FieldDescriptor
{
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self
    {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Description of a type in the inspected binary.
///
/// Immutable per inspected value. Fields keep their declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor
{
    pub name: String,
    pub kind: TypeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor
{
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self
    {
        Self {
            name: name.into(),
            kind,
            size_bytes: None,
            target: None,
            fields: Vec::new(),
        }
    }

    /// Struct descriptor with the given fields in declaration order.
    pub fn structure<N, T>(name: impl Into<String>, fields: impl IntoIterator<Item = (N, T)>) -> Self
    where
        N: Into<String>,
        T: Into<String>,
    {
        let mut descriptor = Self::new(name, TypeKind::Struct);
        descriptor.fields = fields
            .into_iter()
            .map(|(field, ty)| FieldDescriptor::new(field, ty))
            .collect();
        descriptor
    }

    #[must_use]
    pub fn with_size(mut self, size_bytes: u64) -> Self
    {
        self.size_bytes = Some(size_bytes);
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self
    {
        self.target = Some(target.into());
        self
    }

    /// Look up a declared field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor>
    {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn is_pointer(&self) -> bool
    {
        matches!(self.kind, TypeKind::Pointer)
    }

    /// Capacity of a fixed-size array type.
    pub fn array_length(&self) -> Option<u64>
    {
        match self.kind {
            TypeKind::Array { length } => Some(length),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_field_lookup_preserves_declaration_order()
    {
        let ty = TypeDescriptor::structure("pair", [("second", "int"), ("first", "long")]);
        let names: Vec<_> = ty.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["second", "first"]);
        assert_eq!(ty.field("first").map(|f| f.type_name.as_str()), Some("long"));
        assert!(ty.field("third").is_none());
    }

    #[test]
    fn test_kind_deserializes_from_snake_case()
    {
        let ty: TypeDescriptor =
            serde_json::from_str(r#"{"name":"int[8]","kind":{"array":{"length":8}},"target":"int"}"#).unwrap();
        assert_eq!(ty.array_length(), Some(8));
        assert_eq!(ty.target.as_deref(), Some("int"));
        assert!(ty.fields.is_empty());
    }
}
