//! Textual names of type descriptors.
//!
//! Two families of names are produced. The catalog-facing ones (`simple_name`,
//! `qualified_name`) carry arity suffixes and `+` nesting separators and can
//! be fed back to [`TypeCatalog::resolve`]. The source-facing ones
//! (`source_name`, `source_qualified_name`) are valid type identifiers in
//! C-family source, with keyword aliases for builtins, `?` for nullable
//! values, angle-bracket argument lists and a `global::` prefix.

use crate::catalog::TypeCatalog;
use crate::schema::{DefId, RawType};

const GLOBAL_PREFIX: &str = "global::";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Mode {
    Simple,
    Qualified,
}

/// Declared name without its `` `N `` arity suffix.
pub fn strip_arity(name: &str) -> &str {
    match name.find('`') {
        Some(i) => &name[..i],
        None => name,
    }
}

/// Declared name, arity suffix included. Placeholders report their own name.
pub fn simple_name<C: TypeCatalog + ?Sized>(catalog: &C, ty: &RawType) -> String {
    match ty {
        RawType::Param { owner, position } => catalog.param_name(*owner, *position).to_string(),
        RawType::Named(id) | RawType::Constructed { definition: id, .. } => {
            catalog.definition(*id).name.clone()
        }
    }
}

/// `Namespace.Outer+Inner` for a definition.
pub fn definition_path<C: TypeCatalog + ?Sized>(catalog: &C, id: DefId) -> String {
    let chain = declaring_chain(catalog, id);
    let names: Vec<&str> = chain
        .iter()
        .map(|level| catalog.definition(*level).name.as_str())
        .collect();
    match &catalog.definition(chain[0]).namespace {
        Some(namespace) => format!("{}.{}", namespace, names.join("+")),
        None => names.join("+"),
    }
}

/// Resolvable name of a descriptor. `None` for placeholders and for
/// descriptors that still contain free parameters without being a generic
/// definition, since those cannot be located by name.
pub fn qualified_name<C: TypeCatalog + ?Sized>(catalog: &C, ty: &RawType) -> Option<String> {
    match ty {
        RawType::Param { .. } => None,
        RawType::Named(id) => Some(definition_path(catalog, *id)),
        RawType::Constructed { definition, args } => {
            if catalog.contains_free_parameters(ty) {
                return None;
            }
            let args = args
                .iter()
                .map(|arg| qualified_name(catalog, arg).map(|name| format!("[{}]", name)))
                .collect::<Option<Vec<_>>>()?;
            Some(format!("{}[{}]", definition_path(catalog, *definition), args.join(",")))
        }
    }
}

/// Source identifier without namespace or enclosing types, e.g. `Nested<T, bool>`.
pub fn source_name<C: TypeCatalog + ?Sized>(catalog: &C, ty: &RawType) -> String {
    render(catalog, ty, Mode::Simple)
}

/// Fully qualified source identifier, e.g. `global::N.Parent<int>.Nested`.
pub fn source_qualified_name<C: TypeCatalog + ?Sized>(catalog: &C, ty: &RawType) -> String {
    render(catalog, ty, Mode::Qualified)
}

fn render<C: TypeCatalog + ?Sized>(catalog: &C, ty: &RawType, mode: Mode) -> String {
    if let Some(builtin) = catalog.builtin_of(ty) {
        return builtin.alias().to_string();
    }
    let args = catalog.generic_arguments(ty);
    if catalog.is_nullable(ty) && args.len() == 1 {
        return format!("{}?", render(catalog, &args[0], mode));
    }
    let id = match ty {
        RawType::Param { owner, position } => {
            return catalog.param_name(*owner, *position).to_string()
        }
        RawType::Named(id) | RawType::Constructed { definition: id, .. } => *id,
    };
    match mode {
        Mode::Simple => render_level(catalog, id, &args, mode),
        Mode::Qualified => {
            let chain = declaring_chain(catalog, id);
            let levels: Vec<String> = chain
                .iter()
                .map(|level| render_level(catalog, *level, &args, mode))
                .collect();
            match &catalog.definition(chain[0]).namespace {
                Some(namespace) => format!("{}{}.{}", GLOBAL_PREFIX, namespace, levels.join(".")),
                None => format!("{}{}", GLOBAL_PREFIX, levels.join(".")),
            }
        }
    }
}

// One level of a nesting chain. Enclosing levels own a slice of the innermost
// descriptor's flattened argument list.
fn render_level<C: TypeCatalog + ?Sized>(
    catalog: &C,
    level: DefId,
    args: &[RawType],
    mode: Mode,
) -> String {
    let def = catalog.definition(level);
    let name = strip_arity(&def.name);
    let own = args.get(def.inherited..def.params.len()).unwrap_or(&[]);
    if own.is_empty() {
        return name.to_string();
    }
    let rendered: Vec<String> = own.iter().map(|arg| render(catalog, arg, mode)).collect();
    format!("{}<{}>", name, rendered.join(", "))
}

/// Outermost declaring definition first, `id` last.
fn declaring_chain<C: TypeCatalog + ?Sized>(catalog: &C, id: DefId) -> Vec<DefId> {
    let mut chain = vec![id];
    let mut current = id;
    while let Some(outer) = catalog.definition(current).declaring {
        chain.push(outer);
        current = outer;
    }
    chain.reverse();
    chain
}
