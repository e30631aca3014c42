//! Typed wrappers over type descriptors.
//!
//! A descriptor may still contain unresolved generic parameters, and using
//! such a descriptor where a concrete type is required is a runtime error. The
//! three wrappers here make the distinction visible in signatures:
//!
//! - [`TypeSketch`] carries no guarantee. It can hold `Seq<int>`, `Seq<T>`,
//!   and also `Seq<Seq<T>>`, which is neither closed nor a definition.
//! - [`ClosedType`] holds a descriptor without any free parameter. It can only
//!   be obtained by applying arguments.
//! - [`OpenType`] holds a generic definition. It can only be obtained by
//!   unapplying arguments.

use core::fmt;
use std::{
    fmt::Debug,
    hash::{Hash, Hasher},
};

use crate::catalog::{NestedFilter, TypeCatalog};
use crate::error::SketchError;
use crate::name::Name;
use crate::render::source_qualified_name;
use crate::schema::RawType;
use crate::subst::apply_arguments;

/// Read-only facade shared by every wrapper.
pub trait TypeLike<'c> {
    fn catalog(&self) -> &'c dyn TypeCatalog;

    /// The wrapped descriptor.
    fn raw(&self) -> &RawType;

    fn name(&self) -> Name<'c> {
        Name::of(self.catalog(), self.raw().clone())
    }

    fn all_nested_types(&self) -> Vec<TypeSketch<'c>> {
        nested(self.catalog(), self.raw(), NestedFilter::All)
    }

    fn public_nested_types(&self) -> Vec<TypeSketch<'c>> {
        nested(self.catalog(), self.raw(), NestedFilter::Public)
    }
}

fn nested<'c>(
    catalog: &'c dyn TypeCatalog,
    raw: &RawType,
    filter: NestedFilter,
) -> Vec<TypeSketch<'c>> {
    catalog
        .nested_types(raw, filter)
        .into_iter()
        .map(|raw| TypeSketch::new(catalog, raw))
        .collect()
}

macro_rules! type_like {
    ($wrapper:ident) => {
        impl<'c> TypeLike<'c> for $wrapper<'c> {
            fn catalog(&self) -> &'c dyn TypeCatalog {
                self.catalog
            }

            fn raw(&self) -> &RawType {
                &self.raw
            }
        }

        impl PartialEq for $wrapper<'_> {
            fn eq(&self, other: &Self) -> bool {
                self.name() == other.name()
            }
        }

        impl Eq for $wrapper<'_> {}

        impl Hash for $wrapper<'_> {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.name().hash(state);
            }
        }

        impl fmt::Display for $wrapper<'_> {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", source_qualified_name(self.catalog, &self.raw))
            }
        }

        impl Debug for $wrapper<'_> {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}({})", stringify!($wrapper), self)
            }
        }
    };
}

/// A descriptor that may or may not be closed.
#[derive(Clone)]
pub struct TypeSketch<'c> {
    catalog: &'c dyn TypeCatalog,
    raw: RawType,
}

/// A descriptor without free parameters.
#[derive(Clone)]
pub struct ClosedType<'c> {
    catalog: &'c dyn TypeCatalog,
    raw: RawType,
}

/// A generic definition: every immediate argument is a free parameter.
#[derive(Clone)]
pub struct OpenType<'c> {
    catalog: &'c dyn TypeCatalog,
    raw: RawType,
}

type_like!(TypeSketch);
type_like!(ClosedType);
type_like!(OpenType);

fn raws<'c, T: TypeLike<'c>>(args: &[T]) -> Vec<RawType> {
    args.iter().map(|arg| arg.raw().clone()).collect()
}

fn apply_closed<'c>(
    catalog: &'c dyn TypeCatalog,
    raw: &RawType,
    args: &[ClosedType<'c>],
) -> Result<ClosedType<'c>, SketchError> {
    let applied = apply_arguments(catalog, raw, &raws(args))?;
    debug_assert!(!catalog.contains_free_parameters(&applied));
    Ok(ClosedType {
        catalog,
        raw: applied,
    })
}

fn apply_sketches<'c>(
    catalog: &'c dyn TypeCatalog,
    raw: &RawType,
    args: &[TypeSketch<'c>],
) -> Result<TypeSketch<'c>, SketchError> {
    if !catalog.contains_free_parameters(raw) {
        return Err(SketchError::NotGeneric {
            name: source_qualified_name(catalog, raw),
        });
    }
    let applied = apply_arguments(catalog, raw, &raws(args))?;
    Ok(TypeSketch::new(catalog, applied))
}

// Discards the applied arguments, whatever they are.
fn unapply<'c>(catalog: &'c dyn TypeCatalog, raw: &RawType) -> Option<OpenType<'c>> {
    if catalog.generic_arguments(raw).is_empty() {
        return None;
    }
    let definition = catalog.generic_definition(raw)?;
    debug_assert!(catalog.is_generic_definition(&definition));
    Some(OpenType {
        catalog,
        raw: definition,
    })
}

impl<'c> TypeSketch<'c> {
    pub(crate) fn new(catalog: &'c dyn TypeCatalog, raw: RawType) -> Self {
        TypeSketch { catalog, raw }
    }

    /// Applies closed arguments to every free slot. With no free slots and no
    /// arguments the descriptor is returned as is.
    pub fn apply(&self, args: &[ClosedType<'c>]) -> Result<ClosedType<'c>, SketchError> {
        apply_closed(self.catalog, &self.raw, args)
    }

    /// Applies arguments that may themselves be open. The result may need a
    /// further [`apply`](Self::apply) before it is closed.
    pub fn apply_partial(&self, args: &[TypeSketch<'c>]) -> Result<TypeSketch<'c>, SketchError> {
        apply_sketches(self.catalog, &self.raw, args)
    }

    /// The generic definition, or `None` for a type without arguments.
    pub fn unapply(&self) -> Option<OpenType<'c>> {
        unapply(self.catalog, &self.raw)
    }

    pub fn base_type(&self) -> Option<TypeSketch<'c>> {
        self.catalog
            .base_type(&self.raw)
            .map(|raw| TypeSketch::new(self.catalog, raw))
    }

    pub fn into_raw(self) -> RawType {
        self.raw
    }
}

impl<'c> ClosedType<'c> {
    /// The generic definition, or `None` for a type without arguments.
    pub fn unapply(&self) -> Option<OpenType<'c>> {
        unapply(self.catalog, &self.raw)
    }

    /// The base of a closed type is closed. A base that would still carry
    /// free parameters is reported as absent.
    pub fn base_type(&self) -> Option<ClosedType<'c>> {
        let raw = self.catalog.base_type(&self.raw)?;
        if self.catalog.contains_free_parameters(&raw) {
            let base = source_qualified_name(self.catalog, &raw);
            log::debug!("base {} of {} is not closed", base, self);
            return None;
        }
        Some(ClosedType {
            catalog: self.catalog,
            raw,
        })
    }

    pub fn into_raw(self) -> RawType {
        self.raw
    }
}

impl<'c> OpenType<'c> {
    pub fn apply(&self, args: &[ClosedType<'c>]) -> Result<ClosedType<'c>, SketchError> {
        apply_closed(self.catalog, &self.raw, args)
    }

    pub fn apply_partial(&self, args: &[TypeSketch<'c>]) -> Result<TypeSketch<'c>, SketchError> {
        apply_sketches(self.catalog, &self.raw, args)
    }

    /// Forgets the openness guarantee.
    pub fn to_sketch(&self) -> TypeSketch<'c> {
        TypeSketch::new(self.catalog, self.raw.clone())
    }

    pub fn into_raw(self) -> RawType {
        self.raw
    }
}

impl<'c> From<OpenType<'c>> for TypeSketch<'c> {
    fn from(open: OpenType<'c>) -> Self {
        TypeSketch::new(open.catalog, open.raw)
    }
}

/// Any of the three wrapper states.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum AnyType<'c> {
    Sketch(TypeSketch<'c>),
    Closed(ClosedType<'c>),
    Open(OpenType<'c>),
}

impl<'c> AnyType<'c> {
    pub fn kind(&self) -> &'static str {
        match self {
            AnyType::Sketch(_) => "sketch",
            AnyType::Closed(_) => "closed",
            AnyType::Open(_) => "open",
        }
    }

    /// Unapply, from whichever state.
    pub fn unapply(&self) -> Option<OpenType<'c>> {
        match self {
            AnyType::Sketch(sketch) => sketch.unapply(),
            AnyType::Closed(closed) => closed.unapply(),
            AnyType::Open(open) => Some(open.clone()),
        }
    }

    /// Apply closed arguments, from whichever state.
    pub fn apply(&self, args: &[ClosedType<'c>]) -> Result<ClosedType<'c>, SketchError> {
        match self {
            AnyType::Sketch(sketch) => sketch.apply(args),
            AnyType::Closed(closed) => apply_closed(closed.catalog, &closed.raw, args),
            AnyType::Open(open) => open.apply(args),
        }
    }

    /// Base type. A closed base stays closed; everything else is a sketch.
    pub fn base_type(&self) -> Option<AnyType<'c>> {
        match self {
            AnyType::Closed(closed) => closed.base_type().map(AnyType::Closed),
            AnyType::Sketch(sketch) => sketch.base_type().map(AnyType::Sketch),
            AnyType::Open(open) => open.to_sketch().base_type().map(AnyType::Sketch),
        }
    }
}

impl<'c> TypeLike<'c> for AnyType<'c> {
    fn catalog(&self) -> &'c dyn TypeCatalog {
        match self {
            AnyType::Sketch(t) => t.catalog(),
            AnyType::Closed(t) => t.catalog(),
            AnyType::Open(t) => t.catalog(),
        }
    }

    fn raw(&self) -> &RawType {
        match self {
            AnyType::Sketch(t) => t.raw(),
            AnyType::Closed(t) => t.raw(),
            AnyType::Open(t) => t.raw(),
        }
    }
}

impl fmt::Display for AnyType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AnyType::Sketch(t) => write!(f, "{}", t),
            AnyType::Closed(t) => write!(f, "{}", t),
            AnyType::Open(t) => write!(f, "{}", t),
        }
    }
}

impl<'c> From<TypeSketch<'c>> for AnyType<'c> {
    fn from(sketch: TypeSketch<'c>) -> Self {
        AnyType::Sketch(sketch)
    }
}

impl<'c> From<ClosedType<'c>> for AnyType<'c> {
    fn from(closed: ClosedType<'c>) -> Self {
        AnyType::Closed(closed)
    }
}

impl<'c> From<OpenType<'c>> for AnyType<'c> {
    fn from(open: OpenType<'c>) -> Self {
        AnyType::Open(open)
    }
}
