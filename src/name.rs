use core::fmt;
use std::{
    fmt::Debug,
    hash::{Hash, Hasher},
};

use crate::catalog::TypeCatalog;
use crate::render;
use crate::schema::RawType;

/// The name of a type.
///
/// Two names are equal when their source-qualified names are, so descriptors
/// built along different paths that denote the same type compare equal.
#[derive(Clone)]
pub struct Name<'c> {
    catalog: &'c dyn TypeCatalog,
    raw: RawType,
}

impl<'c> Name<'c> {
    pub fn of(catalog: &'c dyn TypeCatalog, raw: RawType) -> Self {
        Name { catalog, raw }
    }

    /// Declared name, e.g. `Seq`1`.
    pub fn value(&self) -> String {
        render::simple_name(self.catalog, &self.raw)
    }

    /// Resolvable qualified name, e.g. `N.Seq`1[[System.Int32]]`. Absent for
    /// partially applied types.
    pub fn full_name(&self) -> Option<String> {
        render::qualified_name(self.catalog, &self.raw)
    }

    pub fn namespace(&self) -> Option<&'c str> {
        self.catalog.namespace(&self.raw)
    }

    /// Source identifier, e.g. `Seq<int>`.
    pub fn source_name(&self) -> String {
        render::source_name(self.catalog, &self.raw)
    }

    /// Qualified source identifier, e.g. `global::N.Seq<int>`.
    pub fn source_full_name(&self) -> String {
        render::source_qualified_name(self.catalog, &self.raw)
    }
}

impl PartialEq for Name<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.source_full_name() == other.source_full_name()
    }
}

impl Eq for Name<'_> {}

impl Hash for Name<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source_full_name().hash(state);
    }
}

impl fmt::Display for Name<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Name({})", self.source_full_name())
    }
}

impl Debug for Name<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_catalog;
    use std::collections::HashSet;

    fn name(qualified: &str) -> Name<'static> {
        let catalog = sample_catalog();
        Name::of(catalog, catalog.resolve(qualified).unwrap())
    }

    #[test]
    fn int_name() {
        let sut = name("System.Int32");
        assert_eq!(sut.value(), "Int32");
        assert_eq!(sut.full_name().as_deref(), Some("System.Int32"));
        assert_eq!(sut.namespace(), Some("System"));
        assert_eq!(sut.source_name(), "int");
        assert_eq!(sut.source_full_name(), "int");
    }

    #[test]
    fn nullable_date_time_name() {
        let sut = name("System.Nullable`1[System.DateTime]");
        assert_eq!(sut.value(), "Nullable`1");
        assert_eq!(sut.full_name().as_deref(), Some("System.Nullable`1[[System.DateTime]]"));
        assert_eq!(sut.namespace(), Some("System"));
        assert_eq!(sut.source_name(), "DateTime?");
        assert_eq!(sut.source_full_name(), "global::System.DateTime?");
    }

    #[test]
    fn generic_definition_name() {
        let sut = name("N.Seq`1");
        assert_eq!(sut.value(), "Seq`1");
        assert_eq!(sut.full_name().as_deref(), Some("N.Seq`1"));
        assert_eq!(sut.source_name(), "Seq<T>");
        assert_eq!(sut.source_full_name(), "global::N.Seq<T>");
    }

    #[test]
    fn nested_generic_name() {
        let sut = name("N.Parent`1+Nested`1[System.Int32,System.String]");
        assert_eq!(sut.value(), "Nested`1");
        assert_eq!(sut.namespace(), Some("N"));
        assert_eq!(sut.source_name(), "Nested<string>");
        assert_eq!(sut.source_full_name(), "global::N.Parent<int>.Nested<string>");
    }

    #[test]
    fn names_compare_by_source_full_name() {
        let catalog = sample_catalog();
        let a = name("N.Seq`1[System.Int32]");
        let b = name("N.Seq`1[[System.Int32, mscorlib]]");
        assert_eq!(a, b);
        assert_ne!(a, name("N.Seq`1[System.String]"));
        assert_ne!(name("System.Int32"), name("System.String"));

        let set: HashSet<Name> = [a.clone(), b].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert_eq!(a.to_string(), "Name(global::N.Seq<int>)");

        let int = catalog.builtin(crate::schema::Builtin::Int32);
        assert_eq!(Name::of(catalog, RawType::Named(int)), name("System.Int32"));
    }
}
