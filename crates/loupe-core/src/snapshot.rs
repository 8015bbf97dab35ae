//! # Snapshot Host
//!
//! An [`Inspector`] over a captured image of a stopped process.
//!
//! A snapshot holds three things:
//!
//! - `types`: struct, pointer, array, scalar and alias definitions. Common
//!   scalar types (`int`, `unsigned long`, `double`, ...) and pointer types
//!   spelled `T*` do not need to be listed.
//! - `allocations`: contiguous blocks of homogeneous elements at a base
//!   address. Pointers resolve into these blocks.
//! - `variables`: named, typed values to start from.
//!
//! ```json
//! {
//!   "types": [
//!     { "name": "soro::unixtime", "kind": "struct", "size_bytes": 8,
//!       "fields": [{ "name": "t_", "type": "long" }] }
//!   ],
//!   "allocations": [
//!     { "address": 4096, "type": "unsigned int", "elements": [0, 2, 2, 5] }
//!   ],
//!   "variables": {
//!     "departure": { "type": "soro::unixtime", "value": { "t_": 0 } }
//!   }
//! }
//! ```
//!
//! Reads outside an allocation fail with `InvalidAddress` rather than
//! producing made-up data.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LoupeError, LoupeResult};
use crate::inspector::Inspector;
use crate::matcher::{strip_qualifiers, MAX_ALIAS_DEPTH};
use crate::types::{Address, TypeDescriptor, TypeKind};

const POINTER_SIZE: u64 = 8;
const SPAN_PREFIX: &str = "std::span<";

/// Raw contents of a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Datum
{
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Elements(Vec<Datum>),
    Fields(BTreeMap<String, Datum>),
}

impl Datum
{
    /// Struct contents from `(field, datum)` pairs.
    pub fn fields<K: Into<String>>(fields: impl IntoIterator<Item = (K, Datum)>) -> Self
    {
        Self::Fields(fields.into_iter().map(|(name, datum)| (name.into(), datum)).collect())
    }

    fn as_integer(&self) -> Option<i128>
    {
        match self {
            Self::Int(value) => Some(i128::from(*value)),
            Self::UInt(value) => Some(i128::from(*value)),
            _ => None,
        }
    }
}

impl From<i64> for Datum
{
    fn from(value: i64) -> Self
    {
        Self::Int(value)
    }
}

impl From<u64> for Datum
{
    fn from(value: u64) -> Self
    {
        Self::UInt(value)
    }
}

impl From<Address> for Datum
{
    fn from(address: Address) -> Self
    {
        Self::UInt(address.value())
    }
}

/// Contiguous block of elements in the captured process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation
{
    pub address: Address,
    #[serde(rename = "type")]
    pub element_type: String,
    pub elements: Vec<Datum>,
}

/// A named starting point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable
{
    #[serde(rename = "type")]
    pub type_name: String,
    pub value: Datum,
}

/// Typed handle to a value inside a [`Snapshot`].
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotValue
{
    pub type_name: String,
    pub datum: Datum,
}

impl SnapshotValue
{
    pub fn new(type_name: impl Into<String>, datum: impl Into<Datum>) -> Self
    {
        Self {
            type_name: type_name.into(),
            datum: datum.into(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotFile
{
    #[serde(default)]
    types: Vec<TypeDescriptor>,
    #[serde(default)]
    allocations: Vec<Allocation>,
    #[serde(default)]
    variables: BTreeMap<String, Variable>,
}

/// Captured image of a stopped process.
#[derive(Debug, Clone, Default)]
pub struct Snapshot
{
    types: BTreeMap<String, TypeDescriptor>,
    allocations: Vec<Allocation>,
    variables: BTreeMap<String, Variable>,
}

impl Snapshot
{
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Parse a snapshot from JSON text.
    ///
    /// ## Errors
    ///
    /// `Snapshot` if the text is not a valid snapshot.
    pub fn from_json(json: &str) -> LoupeResult<Self>
    {
        let file: SnapshotFile = serde_json::from_str(json)?;
        let mut snapshot = Self {
            types: BTreeMap::new(),
            allocations: file.allocations,
            variables: file.variables,
        };
        for ty in file.types {
            snapshot.types.insert(ty.name.clone(), ty);
        }
        Ok(snapshot)
    }

    /// Read and parse a snapshot file.
    ///
    /// ## Errors
    ///
    /// `Io` if the file cannot be read, `Snapshot` if it is not a valid snapshot.
    pub fn from_path(path: impl AsRef<Path>) -> LoupeResult<Self>
    {
        Self::from_json(&fs::read_to_string(path)?)
    }

    #[must_use]
    pub fn with_type(mut self, ty: TypeDescriptor) -> Self
    {
        self.types.insert(ty.name.clone(), ty);
        self
    }

    /// Declare `alias` as another name for `target`.
    #[must_use]
    pub fn with_alias(self, alias: impl Into<String>, target: impl Into<String>) -> Self
    {
        self.with_type(TypeDescriptor::new(alias, TypeKind::Alias).with_target(target))
    }

    #[must_use]
    pub fn with_allocation(
        mut self,
        address: impl Into<Address>,
        element_type: impl Into<String>,
        elements: impl IntoIterator<Item = Datum>,
    ) -> Self
    {
        self.allocations.push(Allocation {
            address: address.into(),
            element_type: element_type.into(),
            elements: elements.into_iter().collect(),
        });
        self
    }

    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, type_name: impl Into<String>, value: impl Into<Datum>) -> Self
    {
        self.variables.insert(
            name.into(),
            Variable {
                type_name: type_name.into(),
                value: value.into(),
            },
        );
        self
    }

    /// Names of all variables, sorted.
    pub fn variable_names(&self) -> impl Iterator<Item = &str>
    {
        self.variables.keys().map(String::as_str)
    }

    /// A variable by name.
    ///
    /// ## Errors
    ///
    /// `InvalidExpression` if there is no such variable.
    pub fn variable(&self, name: &str) -> LoupeResult<SnapshotValue>
    {
        self.variables
            .get(name)
            .map(|variable| SnapshotValue::new(variable.type_name.clone(), variable.value.clone()))
            .ok_or_else(|| LoupeError::InvalidExpression(format!("no variable named `{name}`")))
    }

    /// Definition behind `name` with aliases resolved.
    fn resolve(&self, name: &str) -> LoupeResult<TypeDescriptor>
    {
        let mut current = strip_qualifiers(name).to_string();
        for _ in 0..MAX_ALIAS_DEPTH {
            let ty = self.lookup_type(&current)?;
            match (ty.kind, ty.target) {
                (TypeKind::Alias, Some(target)) => current = strip_qualifiers(&target).to_string(),
                _ => return self.lookup_type(&current),
            }
        }
        Err(LoupeError::UnknownType(format!("alias cycle at {name}")))
    }

    fn stride(&self, type_name: &str) -> LoupeResult<u64>
    {
        match self.resolve(type_name)?.size_bytes {
            Some(0) | None => Err(LoupeError::UnknownType(format!("size of {type_name}"))),
            Some(size) => Ok(size),
        }
    }

    /// Allocation containing `address` on an element boundary, and the
    /// element index there.
    fn locate(&self, address: Address) -> LoupeResult<(&Allocation, u64)>
    {
        for allocation in &self.allocations {
            let Some(offset) = address.value().checked_sub(allocation.address.value()) else {
                continue;
            };
            let stride = self.stride(&allocation.element_type)?;
            let index = offset / stride;
            if offset % stride == 0 && index < allocation.elements.len() as u64 {
                return Ok((allocation, index));
            }
        }
        Err(LoupeError::InvalidAddress(address.value()))
    }

    fn read(&self, type_name: &str, address: Address) -> LoupeResult<SnapshotValue>
    {
        let (allocation, index) = self.locate(address)?;
        let datum = element_at(&allocation.elements, index)?;
        Ok(SnapshotValue::new(type_name, datum.clone()))
    }

    fn pointer_parts(&self, value: &SnapshotValue) -> LoupeResult<(Address, String)>
    {
        let ty = self.describe(value)?;
        let target = match (ty.kind, ty.target) {
            (TypeKind::Pointer, Some(target)) => target,
            _ => return Err(LoupeError::NotAPointer(value.type_name.clone())),
        };
        let raw = value
            .datum
            .as_integer()
            .and_then(|raw| u64::try_from(raw).ok())
            .ok_or_else(|| LoupeError::NotAPointer(value.type_name.clone()))?;
        Ok((Address::from(raw), target))
    }

    fn apply(&self, value: SnapshotValue, step: PathStep<'_>) -> LoupeResult<SnapshotValue>
    {
        match step {
            PathStep::Field(name) => self.field(&value, name),
            PathStep::Arrow(name) => self.field(&self.dereference(&value)?, name),
            PathStep::Index(index) => match self.describe(&value)?.kind {
                TypeKind::Array { .. } | TypeKind::Pointer => self.element(&value, index),
                _ => Err(LoupeError::InvalidExpression(format!(
                    "{} has no built-in subscript",
                    value.type_name
                ))),
            },
        }
    }
}

fn element_at(elements: &[Datum], index: u64) -> LoupeResult<&Datum>
{
    usize::try_from(index)
        .ok()
        .and_then(|i| elements.get(i))
        .ok_or(LoupeError::IndexOutOfBounds {
            index,
            len: elements.len() as u64,
        })
}

fn builtin_scalar(name: &str) -> Option<TypeDescriptor>
{
    let size = match name {
        "bool" | "char" | "signed char" | "unsigned char" | "int8_t" | "uint8_t" => 1,
        "short" | "unsigned short" | "int16_t" | "uint16_t" => 2,
        "int" | "unsigned int" | "float" | "int32_t" | "uint32_t" => 4,
        "long" | "unsigned long" | "long int" | "unsigned long int" | "long long" | "unsigned long long" | "double"
        | "int64_t" | "uint64_t" | "std::size_t" | "size_t" => 8,
        _ => return None,
    };
    Some(TypeDescriptor::new(name, TypeKind::Scalar).with_size(size))
}

/// Element type of a `std::span<T>` name.
fn span_element(name: &str) -> Option<&str>
{
    name.strip_prefix(SPAN_PREFIX)?.strip_suffix('>').map(str::trim)
}

/// One step of an evaluated path expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathStep<'a>
{
    Field(&'a str),
    Arrow(&'a str),
    Index(u64),
}

/// Split `root.a->b[3].c` into `root` and its steps.
fn parse_path(expression: &str) -> LoupeResult<(&str, Vec<PathStep<'_>>)>
{
    let invalid = || LoupeError::InvalidExpression(expression.to_string());
    let is_ident = |c: char| c.is_alphanumeric() || c == '_' || c == ':';

    let expression = expression.trim();
    let root_end = expression.find(|c: char| !is_ident(c)).unwrap_or(expression.len());
    let (root, mut rest) = expression.split_at(root_end);
    if root.is_empty() {
        return Err(invalid());
    }

    let mut steps = Vec::new();
    while !rest.is_empty() {
        let (step, remaining) = if let Some(after) = rest.strip_prefix("->") {
            let end = after.find(|c: char| !is_ident(c)).unwrap_or(after.len());
            (PathStep::Arrow(&after[..end]), &after[end..])
        } else if let Some(after) = rest.strip_prefix('.') {
            let end = after.find(|c: char| !is_ident(c)).unwrap_or(after.len());
            (PathStep::Field(&after[..end]), &after[end..])
        } else if let Some(after) = rest.strip_prefix('[') {
            let end = after.find(']').ok_or_else(invalid)?;
            let index = after[..end].trim().parse().map_err(|_| invalid())?;
            (PathStep::Index(index), &after[end + 1..])
        } else {
            return Err(invalid());
        };
        if matches!(step, PathStep::Field("") | PathStep::Arrow("")) {
            return Err(invalid());
        }
        steps.push(step);
        rest = remaining;
    }
    Ok((root, steps))
}

impl Inspector for Snapshot
{
    type Value = SnapshotValue;

    fn describe(&self, value: &SnapshotValue) -> LoupeResult<TypeDescriptor>
    {
        let declared = strip_qualifiers(&value.type_name);
        let mut ty = match (span_element(declared), &value.datum) {
            (Some(element), Datum::Elements(elements)) => TypeDescriptor::new(
                declared,
                TypeKind::Array {
                    length: elements.len() as u64,
                },
            )
            .with_target(element),
            _ => self.resolve(declared)?,
        };
        ty.name = value.type_name.clone();
        Ok(ty)
    }

    fn lookup_type(&self, name: &str) -> LoupeResult<TypeDescriptor>
    {
        let name = strip_qualifiers(name);
        if let Some(ty) = self.types.get(name) {
            return Ok(ty.clone());
        }
        if let Some(ty) = builtin_scalar(name) {
            return Ok(ty);
        }
        if let Some(pointee) = name.strip_suffix('*') {
            return Ok(TypeDescriptor::new(name, TypeKind::Pointer)
                .with_size(POINTER_SIZE)
                .with_target(pointee.trim_end()));
        }
        Err(LoupeError::UnknownType(name.to_string()))
    }

    fn resolve_alias(&self, name: &str) -> Option<String>
    {
        self.types
            .get(name)
            .filter(|ty| ty.kind == TypeKind::Alias)
            .and_then(|ty| ty.target.clone())
    }

    fn field(&self, value: &SnapshotValue, name: &str) -> LoupeResult<SnapshotValue>
    {
        let ty = self.describe(value)?;
        let missing = || LoupeError::missing_field(ty.name.clone(), name);
        let field = ty.field(name).ok_or_else(missing)?;
        let Datum::Fields(fields) = &value.datum else {
            return Err(missing());
        };
        let datum = fields.get(name).ok_or_else(missing)?;
        Ok(SnapshotValue::new(field.type_name.clone(), datum.clone()))
    }

    fn cast(&self, value: &SnapshotValue, type_name: &str) -> LoupeResult<SnapshotValue>
    {
        if span_element(type_name).is_none() {
            self.resolve(type_name)?;
        }
        Ok(SnapshotValue::new(type_name, value.datum.clone()))
    }

    fn dereference(&self, value: &SnapshotValue) -> LoupeResult<SnapshotValue>
    {
        let (address, target) = self.pointer_parts(value)?;
        self.read(&target, address)
    }

    fn element(&self, value: &SnapshotValue, index: u64) -> LoupeResult<SnapshotValue>
    {
        let ty = self.describe(value)?;
        match (ty.kind, &value.datum) {
            (TypeKind::Array { .. }, Datum::Elements(elements)) => {
                let element_type = ty
                    .target
                    .ok_or_else(|| LoupeError::UnknownType(format!("element type of {}", ty.name)))?;
                Ok(SnapshotValue::new(element_type, element_at(elements, index)?.clone()))
            }
            (TypeKind::Pointer, _) => {
                let (base, target) = self.pointer_parts(value)?;
                let address = base
                    .element(index, self.stride(&target)?)
                    .ok_or(LoupeError::InvalidAddress(base.value()))?;
                self.read(&target, address)
            }
            _ => Err(LoupeError::InvalidArgument(format!("{} is not indexable", ty.name))),
        }
    }

    fn to_integer(&self, value: &SnapshotValue) -> LoupeResult<i128>
    {
        value
            .datum
            .as_integer()
            .ok_or_else(|| LoupeError::NotAnInteger(value.type_name.clone()))
    }

    fn to_display(&self, value: &SnapshotValue) -> LoupeResult<String>
    {
        let is_pointer = self.describe(value)?.is_pointer();
        Ok(match &value.datum {
            Datum::Int(v) if is_pointer => format!("0x{v:x}"),
            Datum::UInt(v) if is_pointer => format!("0x{v:x}"),
            Datum::Int(v) => v.to_string(),
            Datum::UInt(v) => v.to_string(),
            Datum::Float(v) => v.to_string(),
            Datum::Text(text) => text.clone(),
            Datum::Elements(elements) => format!("{{length = {}}}", elements.len()),
            Datum::Fields(_) => "{...}".to_string(),
        })
    }

    fn span(&self, element_type: &str, start: Address, len: u64) -> LoupeResult<SnapshotValue>
    {
        let span_type = format!("{SPAN_PREFIX}{element_type}>");
        if len == 0 {
            return Ok(SnapshotValue::new(span_type, Datum::Elements(Vec::new())));
        }

        let (allocation, first) = self.locate(start)?;
        let range = usize::try_from(first)
            .ok()
            .zip(usize::try_from(first + len).ok())
            .filter(|(_, end)| *end <= allocation.elements.len())
            .ok_or(LoupeError::InvalidAddress(start.value()))?;
        let elements = allocation.elements[range.0..range.1].to_vec();
        Ok(SnapshotValue::new(span_type, Datum::Elements(elements)))
    }

    fn evaluate(&self, expression: &str) -> LoupeResult<SnapshotValue>
    {
        let (root, steps) = parse_path(expression)?;
        steps
            .into_iter()
            .try_fold(self.variable(root)?, |value, step| self.apply(value, step))
    }
}
