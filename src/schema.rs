use core::fmt;
use std::{fmt::Debug, str::FromStr, sync::Arc};

use petgraph::graph::NodeIndex;

/// Handle of a type definition inside a catalog.
#[derive(PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub struct DefId(pub(crate) NodeIndex);

impl DefId {
    pub fn index(self) -> usize {
        self.0.index()
    }
}

impl Debug for DefId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.index())
    }
}

/// Builtin types the renderer spells with their language keyword.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum Builtin {
    Boolean,
    Byte,
    SByte,
    Int16,
    UInt16,
    Char,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    Decimal,
    String,
    Object,
}

impl Builtin {
    pub const ALL: [Builtin; 15] = [
        Builtin::Boolean,
        Builtin::Byte,
        Builtin::SByte,
        Builtin::Int16,
        Builtin::UInt16,
        Builtin::Char,
        Builtin::Int32,
        Builtin::UInt32,
        Builtin::Int64,
        Builtin::UInt64,
        Builtin::Single,
        Builtin::Double,
        Builtin::Decimal,
        Builtin::String,
        Builtin::Object,
    ];

    /// Declared name inside the `System` namespace.
    pub fn type_name(self) -> &'static str {
        match self {
            Builtin::Boolean => "Boolean",
            Builtin::Byte => "Byte",
            Builtin::SByte => "SByte",
            Builtin::Int16 => "Int16",
            Builtin::UInt16 => "UInt16",
            Builtin::Char => "Char",
            Builtin::Int32 => "Int32",
            Builtin::UInt32 => "UInt32",
            Builtin::Int64 => "Int64",
            Builtin::UInt64 => "UInt64",
            Builtin::Single => "Single",
            Builtin::Double => "Double",
            Builtin::Decimal => "Decimal",
            Builtin::String => "String",
            Builtin::Object => "Object",
        }
    }

    pub fn alias(self) -> &'static str {
        match self {
            Builtin::Boolean => "bool",
            Builtin::Byte => "byte",
            Builtin::SByte => "sbyte",
            Builtin::Int16 => "short",
            Builtin::UInt16 => "ushort",
            Builtin::Char => "char",
            Builtin::Int32 => "int",
            Builtin::UInt32 => "uint",
            Builtin::Int64 => "long",
            Builtin::UInt64 => "ulong",
            Builtin::Single => "float",
            Builtin::Double => "double",
            Builtin::Decimal => "decimal",
            Builtin::String => "string",
            Builtin::Object => "object",
        }
    }

    /// Decimal, string and object have aliases but are not primitives.
    pub fn is_primitive(self) -> bool {
        !matches!(self, Builtin::Decimal | Builtin::String | Builtin::Object)
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.alias())
    }
}

#[derive(PartialEq, Eq, Hash, Clone, Copy)]
pub enum Visibility {
    Public,
    Internal,
    Private,
    Protected,
    ProtectedInternal,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Internal => write!(f, "internal"),
            Visibility::Private => write!(f, "private"),
            Visibility::Protected => write!(f, "protected"),
            Visibility::ProtectedInternal => write!(f, "protected internal"),
        }
    }
}

impl Debug for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "internal" => Ok(Visibility::Internal),
            "private" => Ok(Visibility::Private),
            "protected" => Ok(Visibility::Protected),
            "protected internal" => Ok(Visibility::ProtectedInternal),
            other => Err(format!("unknown visibility `{}`", other)),
        }
    }
}

/// A declared type as the catalog stores it.
#[derive(Clone)]
pub struct TypeDef {
    /// Namespace of the outermost declaring type.
    pub namespace: Option<String>,
    /// Declared name, carrying a `` `N `` suffix when the definition declares
    /// `N` parameters of its own.
    pub name: String,
    pub declaring: Option<DefId>,
    /// Flattened parameter list: the parameters inherited from the declaring
    /// type come first, then the ones declared here.
    pub params: Vec<String>,
    /// How many leading entries of `params` are inherited.
    pub inherited: usize,
    pub visibility: Visibility,
    pub builtin: Option<Builtin>,
    /// Base type, expressed over this definition's own placeholders.
    pub base: Option<RawType>,
}

impl TypeDef {
    pub fn own_params(&self) -> &[String] {
        &self.params[self.inherited..]
    }

    pub fn is_generic(&self) -> bool {
        !self.params.is_empty()
    }
}

impl fmt::Display for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.namespace {
            Some(namespace) if self.declaring.is_none() => write!(f, "{}.{}", namespace, self.name),
            _ => write!(f, "{}", self.name),
        }
    }
}

impl Debug for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)?;
        if self.is_generic() {
            write!(f, "<{}>", self.params.join(", "))?;
        }
        Ok(())
    }
}

/// A type descriptor. Cheap to clone; equality is structural.
#[derive(PartialEq, Eq, Hash, Clone)]
pub enum RawType {
    /// A declared type. When the definition has parameters this is its
    /// generic definition.
    Named(DefId),
    /// The `position`-th parameter placeholder of `owner`.
    Param { owner: DefId, position: usize },
    Constructed {
        definition: DefId,
        args: Arc<[RawType]>,
    },
}

impl RawType {
    /// Builds `definition` applied to `args`. Applying a definition to its own
    /// placeholders in order yields the definition itself.
    pub fn generic(definition: DefId, args: Vec<RawType>) -> RawType {
        let is_identity = !args.is_empty()
            && args.iter().enumerate().all(|(i, arg)| {
                matches!(
                    arg,
                    RawType::Param { owner, position } if *owner == definition && *position == i
                )
            });
        if is_identity {
            RawType::Named(definition)
        } else {
            RawType::Constructed {
                definition,
                args: args.into(),
            }
        }
    }

    /// The definition this descriptor names, `None` for placeholders.
    pub fn definition(&self) -> Option<DefId> {
        match self {
            RawType::Named(id) | RawType::Constructed { definition: id, .. } => Some(*id),
            RawType::Param { .. } => None,
        }
    }
}

impl Debug for RawType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RawType::Named(id) => write!(f, "{:?}", id),
            RawType::Param { owner, position } => write!(f, "{:?}!{}", owner, position),
            RawType::Constructed { definition, args } => {
                write!(f, "{:?}[", definition)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}", arg)?;
                }
                write!(f, "]")
            }
        }
    }
}
