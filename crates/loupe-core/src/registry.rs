//! # Printer Registry
//!
//! Ordered bindings from type patterns to printer factories and synthetic
//! methods.
//!
//! The registry is assembled once by a [`RegistryBuilder`] during startup and
//! is immutable afterwards; dispatch takes it by shared reference. Bindings
//! are consulted front to back and the first accepting pattern wins. Since
//! the builder refuses overlapping patterns, registration order never decides
//! between two candidates.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use loupe_core::registry::Registry;
//! use loupe_core::snapshot::Snapshot;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>>
//! {
//!     let snapshot = Snapshot::from_path("capture.json")?;
//!     let registry = Registry::<Snapshot>::with_defaults()?;
//!
//!     let value = snapshot.variable("departure")?;
//!     if let Some(printer) = registry.printer_for(&snapshot, &value)? {
//!         println!("{:?}", printer.summary(&snapshot)?);
//!     }
//!     Ok(())
//! }
//! ```

use std::borrow::Cow;

use tracing::{debug, trace};

use crate::error::{LoupeError, LoupeResult};
use crate::inspector::Inspector;
use crate::matcher::{canonicalize, TypeMatcher};
use crate::printers::{
    reflect, scalar, static_vector, vecvec, Inspected, MethodFactory, PrinterFactory, SyntheticMethod, ValuePrinter,
};

/// Types expanded through their reflective-access member by default.
pub const DEFAULT_REFLECTED_TYPES: [&str; 2] = ["soro::infra::infrastructure", "soro::tt::timetable"];

/// A pattern bound to a printer factory.
pub struct PrinterBinding<I: Inspector>
{
    pub name: &'static str,
    pub matcher: TypeMatcher,
    factory: PrinterFactory<I>,
}

/// A pattern and method name bound to a synthetic method.
pub struct MethodBinding<I: Inspector>
{
    pub matcher: TypeMatcher,
    pub method: &'static str,
    factory: MethodFactory<I>,
}

/// Append-only list of bindings, frozen by [`RegistryBuilder::build`].
pub struct RegistryBuilder<I: Inspector>
{
    printers: Vec<PrinterBinding<I>>,
    methods: Vec<MethodBinding<I>>,
}

impl<I: Inspector> Default for RegistryBuilder<I>
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl<I: Inspector> RegistryBuilder<I>
{
    #[must_use]
    pub fn new() -> Self
    {
        Self {
            printers: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Append a printer binding.
    #[must_use]
    pub fn printer(mut self, name: &'static str, matcher: TypeMatcher, factory: PrinterFactory<I>) -> Self
    {
        self.printers.push(PrinterBinding { name, matcher, factory });
        self
    }

    /// Append a synthetic method binding.
    #[must_use]
    pub fn method(mut self, matcher: TypeMatcher, method: &'static str, factory: MethodFactory<I>) -> Self
    {
        self.methods.push(MethodBinding {
            matcher,
            method,
            factory,
        });
        self
    }

    /// Expand `type_name` (matched exactly) through its reflective-access member.
    #[must_use]
    pub fn reflected(self, type_name: impl Into<Cow<'static, str>>) -> Self
    {
        self.printer(
            "reflected-fields",
            TypeMatcher::exact_owned(type_name),
            reflect::reflected_fields::<I>,
        )
    }

    /// The printers and synthetic methods for the soro/cista type families.
    #[must_use]
    pub fn with_defaults(self) -> Self
    {
        let builder = self
            .printer("unixtime", TypeMatcher::exact("soro::unixtime"), scalar::unixtime::<I>)
            .printer("unixtime", TypeMatcher::exact("rapid::unixtime"), scalar::unixtime::<I>)
            .printer(
                "sys-seconds",
                TypeMatcher::exact("std::chrono::time_point<std::chrono::system_clock, std::chrono::duration<long, std::ratio<1, 1> > >"),
                scalar::sys_seconds::<I>,
            )
            .printer(
                "seconds",
                TypeMatcher::exact("std::chrono::duration<unsigned int, std::ratio<1, 1> >"),
                scalar::seconds::<I>,
            )
            .printer("fraction", TypeMatcher::prefix("soro::utls::fraction<"), scalar::fraction::<I>)
            .printer("strong", TypeMatcher::prefix("cista::strong<"), scalar::strong::<I>)
            .printer("optional", TypeMatcher::prefix("soro::utls::optional<"), scalar::optional::<I>)
            .printer(
                "static-vector",
                TypeMatcher::prefix("soro::utls::static_vector<"),
                static_vector::static_vector::<I>,
            )
            .printer("vecvec", vecvec::VECVEC, vecvec::vecvec::<I>)
            .method(vecvec::VECVEC, vecvec::INDEX_OPERATOR, vecvec::index_operator::<I>);

        DEFAULT_REFLECTED_TYPES
            .into_iter()
            .fold(builder, |builder, type_name| builder.reflected(type_name))
    }

    /// Freeze the bindings.
    ///
    /// ## Errors
    ///
    /// `OverlappingPatterns` if two printers, or two synthetic methods of the
    /// same name, could claim the same type.
    pub fn build(self) -> LoupeResult<Registry<I>>
    {
        for (i, later) in self.printers.iter().enumerate() {
            if let Some(earlier) = self.printers[..i].iter().find(|earlier| earlier.matcher.overlaps(&later.matcher)) {
                return Err(LoupeError::OverlappingPatterns(later.matcher.to_string(), earlier.matcher.to_string()));
            }
        }
        for (i, later) in self.methods.iter().enumerate() {
            if let Some(earlier) = self.methods[..i]
                .iter()
                .find(|earlier| earlier.method == later.method && earlier.matcher.overlaps(&later.matcher))
            {
                return Err(LoupeError::OverlappingPatterns(
                    format!("{}::{}", later.matcher, later.method),
                    format!("{}::{}", earlier.matcher, earlier.method),
                ));
            }
        }

        debug!(
            printers = self.printers.len(),
            methods = self.methods.len(),
            "printer registry built"
        );
        Ok(Registry {
            printers: self.printers,
            methods: self.methods,
        })
    }
}

/// Immutable dispatch table consulted by the host on every request.
pub struct Registry<I: Inspector>
{
    printers: Vec<PrinterBinding<I>>,
    methods: Vec<MethodBinding<I>>,
}

impl<I: Inspector> Registry<I>
{
    /// Registry with the default bindings.
    ///
    /// ## Errors
    ///
    /// See [`RegistryBuilder::build`].
    pub fn with_defaults() -> LoupeResult<Self>
    {
        RegistryBuilder::new().with_defaults().build()
    }

    pub fn builder() -> RegistryBuilder<I>
    {
        RegistryBuilder::new()
    }

    /// Printer bindings in consultation order.
    pub fn printers(&self) -> &[PrinterBinding<I>]
    {
        &self.printers
    }

    /// Synthetic method bindings in consultation order.
    pub fn methods(&self) -> &[MethodBinding<I>]
    {
        &self.methods
    }

    /// The first printer binding accepting a canonical type name.
    pub fn binding_for(&self, canonical: &str) -> Option<&PrinterBinding<I>>
    {
        self.printers.iter().find(|binding| binding.matcher.accepts(canonical))
    }

    /// Instantiate the printer for a value.
    ///
    /// Returns `Ok(None)` when no pattern accepts the value's type, or when
    /// the matched type lacks a field its printer depends on. Either way the
    /// host uses its default formatter, so one misfitting member does not
    /// spoil the rest of the request.
    ///
    /// ## Errors
    ///
    /// Whatever else the host or the printer factory reports, e.g. corrupt
    /// lengths or unreadable memory.
    pub fn printer_for(&self, inspector: &I, value: &I::Value) -> LoupeResult<Option<Box<dyn ValuePrinter<I>>>>
    {
        let descriptor = inspector.describe(value)?;
        let type_name = canonicalize(inspector, &descriptor.name);
        let Some(binding) = self.binding_for(&type_name) else {
            trace!(%type_name, "no printer");
            return Ok(None);
        };

        debug!(%type_name, printer = binding.name, "printer matched");
        let inspected = Inspected {
            value: value.clone(),
            type_name: type_name.clone(),
            descriptor,
        };
        match (binding.factory)(inspector, inspected) {
            Ok(printer) => Ok(Some(printer)),
            Err(LoupeError::MissingField { field, .. }) => {
                debug!(%type_name, printer = binding.name, %field, "layout mismatch, default formatter");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// The synthetic method `method` of a class type, if one is registered.
    pub fn method_for(&self, inspector: &I, class_type: &str, method: &str) -> Option<Box<dyn SyntheticMethod<I>>>
    {
        let canonical = canonicalize(inspector, class_type);
        self.methods
            .iter()
            .find(|binding| binding.method == method && binding.matcher.accepts(&canonical))
            .map(|binding| (binding.factory)())
    }

    /// Call a synthetic method on `this` (an object or a pointer to one).
    ///
    /// Returns `Ok(None)` when no synthetic method is registered for the
    /// receiver's type under that name.
    ///
    /// ## Errors
    ///
    /// Whatever the method reports, e.g. `IndexOutOfBounds`.
    pub fn invoke(&self, inspector: &I, this: &I::Value, method: &str, args: &[I::Value]) -> LoupeResult<Option<I::Value>>
    {
        let descriptor = inspector.describe(this)?;
        let class_type = match (&descriptor.target, descriptor.is_pointer()) {
            (Some(pointee), true) => pointee.clone(),
            _ => descriptor.name,
        };
        let Some(worker) = self.method_for(inspector, &class_type, method) else {
            return Ok(None);
        };

        debug!(%class_type, method, "synthetic method matched");
        worker.invoke(inspector, this, args).map(Some)
    }
}
