//! # Type Matching
//!
//! Canonicalization of type names and the patterns printers are registered
//! under.
//!
//! Matching is textual: compiled templates are only visible to a debugger as
//! instantiation names like `cista::basic_vecvec<unsigned int, ...>`. A
//! pattern is either an exact name or a case-sensitive prefix, optionally
//! rejecting names that contain a given substring. No other partial matching
//! is performed.

use std::borrow::Cow;
use std::fmt;

use crate::inspector::Inspector;

/// Alias chains longer than this are treated as cyclic.
pub(crate) const MAX_ALIAS_DEPTH: usize = 32;

const LEADING_QUALIFIERS: [&str; 4] = ["const ", "volatile ", "struct ", "class "];
const TRAILING_QUALIFIERS: [&str; 4] = [" const", " volatile", "&&", "&"];

/// Strip top-level cv-qualifiers, elaborated type keywords and references.
///
/// Qualifiers nested inside template arguments are part of the instantiation
/// and are left alone.
///
/// ```rust
/// use loupe_core::matcher::strip_qualifiers;
///
/// assert_eq!(strip_qualifiers("const soro::unixtime &"), "soro::unixtime");
/// assert_eq!(strip_qualifiers("cista::strong<int const, tag>"), "cista::strong<int const, tag>");
/// ```
pub fn strip_qualifiers(name: &str) -> &str
{
    let mut name = name.trim();
    loop {
        let before = name;
        for qualifier in LEADING_QUALIFIERS {
            if let Some(rest) = name.strip_prefix(qualifier) {
                name = rest.trim_start();
            }
        }
        for qualifier in TRAILING_QUALIFIERS {
            if let Some(rest) = name.strip_suffix(qualifier) {
                name = rest.trim_end();
            }
        }
        if name == before {
            return name;
        }
    }
}

/// Canonical form of a declared type name: qualifiers stripped and aliases
/// resolved through the host, repeated until nothing changes.
pub fn canonicalize<I: Inspector>(inspector: &I, declared: &str) -> String
{
    let mut name = strip_qualifiers(declared).to_string();
    for _ in 0..MAX_ALIAS_DEPTH {
        match inspector.resolve_alias(&name) {
            Some(target) if target != name => name = strip_qualifiers(&target).to_string(),
            _ => break,
        }
    }
    name
}

/// Pattern a printer or synthetic method is registered under.
///
/// Exact names may be owned, so types named at startup (for example on the
/// command line) can be registered without a `'static` borrow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeMatcher
{
    /// The canonical name must equal the pattern.
    Exact(Cow<'static, str>),
    /// The canonical name must start with `prefix` and, if `excluding` is
    /// set, must not contain it anywhere.
    Prefix
    {
        prefix: &'static str,
        excluding: Option<&'static str>,
    },
}

impl TypeMatcher
{
    pub const fn exact(name: &'static str) -> Self
    {
        Self::Exact(Cow::Borrowed(name))
    }

    /// Exact pattern over a name only known at runtime.
    pub fn exact_owned(name: impl Into<Cow<'static, str>>) -> Self
    {
        Self::Exact(name.into())
    }

    pub const fn prefix(prefix: &'static str) -> Self
    {
        Self::Prefix {
            prefix,
            excluding: None,
        }
    }

    /// Prefix pattern that rejects names of a sibling family.
    pub const fn prefix_excluding(prefix: &'static str, excluding: &'static str) -> Self
    {
        Self::Prefix {
            prefix,
            excluding: Some(excluding),
        }
    }

    /// Test a canonical type name against this pattern.
    pub fn accepts(&self, canonical: &str) -> bool
    {
        match self {
            Self::Exact(name) => canonical == name.as_ref(),
            &Self::Prefix { prefix, excluding } => {
                canonical.starts_with(prefix) && excluding.is_none_or(|excluded| !canonical.contains(excluded))
            }
        }
    }

    /// Whether some name could be accepted by both patterns.
    ///
    /// Conservative for two prefix patterns: they are only considered disjoint
    /// when the longer prefix is rejected by the shorter one's exclusion.
    pub fn overlaps(&self, other: &TypeMatcher) -> bool
    {
        match (self, other) {
            (Self::Exact(a), Self::Exact(b)) => a == b,
            (Self::Exact(name), prefix @ Self::Prefix { .. }) | (prefix @ Self::Prefix { .. }, Self::Exact(name)) => {
                prefix.accepts(name)
            }
            (Self::Prefix { prefix: a, .. }, Self::Prefix { prefix: b, .. }) => {
                if a.starts_with(b) {
                    other.accepts(a)
                } else if b.starts_with(a) {
                    self.accepts(b)
                } else {
                    false
                }
            }
        }
    }
}

impl fmt::Display for TypeMatcher
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Self::Exact(name) => write!(f, "{name}"),
            Self::Prefix {
                prefix,
                excluding: None,
            } => write!(f, "{prefix}*"),
            Self::Prefix {
                prefix,
                excluding: Some(excluded),
            } => write!(f, "{prefix}* (not *{excluded}*)"),
        }
    }
}
