//! # Value Trees
//!
//! Host-side formatting: walk a value through the registry and produce a
//! tree of summaries and named children, falling back to a plain structural
//! view for types no printer claims.
//!
//! This is what a debugger front end does with the printers: ask for a
//! summary, ask for children, recurse. Pass-through summaries (strong
//! aliases, optionals, fractions) are resolved here by formatting the wrapped
//! value in turn.

use std::fmt;

use serde::Serialize;
use tracing::trace;

use crate::error::LoupeResult;
use crate::inspector::Inspector;
use crate::matcher::canonicalize;
use crate::printers::{limit_to_u64, Child, DisplayHint, Summary};
use crate::registry::Registry;
use crate::types::{FieldDescriptor, TypeKind};

/// Limits on how much of a value is expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions
{
    /// Levels of children below the root that are expanded.
    pub max_depth: usize,
    /// Children shown per value; the rest is marked as truncated.
    pub max_children: usize,
}

impl Default for RenderOptions
{
    fn default() -> Self
    {
        Self {
            max_depth: 8,
            max_children: 200,
        }
    }
}

/// Formatted value with its expanded children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueTree
{
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<DisplayHint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ValueTree>,
    /// Children exist past the depth or count limit.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

/// Format `value` under `name`.
///
/// ## Errors
///
/// Host and printer errors are propagated; nothing is fabricated for a value
/// that cannot be read.
pub fn render<I: Inspector>(
    registry: &Registry<I>,
    inspector: &I,
    name: &str,
    value: &I::Value,
    options: RenderOptions,
) -> LoupeResult<ValueTree>
{
    Walker {
        registry,
        inspector,
        options,
    }
    .walk(name, value, 0)
}

struct Walker<'a, I: Inspector>
{
    registry: &'a Registry<I>,
    inspector: &'a I,
    options: RenderOptions,
}

impl<I: Inspector> Walker<'_, I>
{
    fn walk(&self, name: &str, value: &I::Value, depth: usize) -> LoupeResult<ValueTree>
    {
        let descriptor = self.inspector.describe(value)?;
        let mut tree = ValueTree {
            name: name.to_string(),
            type_name: canonicalize(self.inspector, &descriptor.name),
            summary: None,
            hint: None,
            children: Vec::new(),
            truncated: false,
        };

        // One past the limit is fetched so truncation can be reported; at the
        // depth limit only whether children exist matters.
        let at_depth_limit = depth >= self.options.max_depth;
        let limit = if at_depth_limit {
            1
        } else {
            self.options.max_children.saturating_add(1)
        };

        let children = if let Some(printer) = self.registry.printer_for(self.inspector, value)? {
            tree.hint = printer.display_hint();
            match printer.summary(self.inspector)? {
                Some(Summary::Text(text)) => tree.summary = Some(text),
                Some(Summary::Value(inner)) => {
                    let inner = self.walk(name, &inner, depth)?;
                    tree.summary = inner.summary;
                    tree.hint = tree.hint.or(inner.hint);
                    tree.children = inner.children;
                    tree.truncated = inner.truncated;
                }
                None => {}
            }
            printer.children_up_to(self.inspector, limit)?
        } else {
            trace!(type_name = %tree.type_name, "default formatter");
            match descriptor.kind {
                TypeKind::Struct => self.fields(value, &descriptor.fields, limit)?,
                TypeKind::Array { length } => {
                    tree.hint = Some(DisplayHint::Array);
                    self.elements(value, length, limit)?
                }
                TypeKind::Pointer | TypeKind::Scalar | TypeKind::Alias => {
                    tree.summary = Some(self.inspector.to_display(value)?);
                    Vec::new()
                }
            }
        };

        if at_depth_limit {
            tree.truncated |= !children.is_empty();
            return Ok(tree);
        }
        tree.truncated |= children.len() > self.options.max_children;
        for child in children.into_iter().take(self.options.max_children) {
            tree.children.push(self.walk(&child.name, &child.value, depth + 1)?);
        }
        Ok(tree)
    }

    fn fields(&self, value: &I::Value, fields: &[FieldDescriptor], limit: usize) -> LoupeResult<Vec<Child<I::Value>>>
    {
        fields
            .iter()
            .take(limit)
            .map(|field| Ok(Child::new(field.name.clone(), self.inspector.field(value, &field.name)?)))
            .collect()
    }

    fn elements(&self, value: &I::Value, length: u64, limit: usize) -> LoupeResult<Vec<Child<I::Value>>>
    {
        let shown = length.min(limit_to_u64(limit));
        (0..shown)
            .map(|index| Ok(Child::indexed(index, self.inspector.element(value, index)?)))
            .collect()
    }
}

impl ValueTree
{
    fn write_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result
    {
        write!(f, "{:indent$}{} ({})", "", self.name, self.type_name)?;
        if let Some(summary) = &self.summary {
            write!(f, " = {summary}")?;
        }
        writeln!(f)?;
        for child in &self.children {
            child.write_indented(f, indent + 2)?;
        }
        if self.truncated {
            writeln!(f, "{:width$}...", "", width = indent + 2)?;
        }
        Ok(())
    }
}

impl fmt::Display for ValueTree
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        self.write_indented(f, 0)
    }
}
