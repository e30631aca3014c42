use crate::catalog::TypeCatalog;
use crate::error::ResolveError;
use crate::schema::{Builtin, RawType};
use crate::sketches::TypeSketch;

/// A Rust type with a counterpart in the catalog.
pub trait Reflected {
    fn descriptor(catalog: &dyn TypeCatalog) -> RawType;
}

/// Marker for Rust types whose catalog counterpart is a value type, the only
/// kind `System.Nullable`1` accepts. Nullables are not value types here, so
/// nullables do not nest:
///
/// ```compile_fail
/// use typesketch::{InMemoryCatalog, Reflect};
///
/// let catalog = InMemoryCatalog::new();
/// Reflect::new(&catalog).of::<Option<Option<i32>>>();
/// ```
///
/// ```compile_fail
/// use typesketch::{InMemoryCatalog, Reflect};
///
/// let catalog = InMemoryCatalog::new();
/// Reflect::new(&catalog).of::<Option<String>>();
/// ```
pub trait ValueType: Reflected {}

macro_rules! reflected_builtin {
    ($($ty:ty => $builtin:ident),* $(,)?) => {
        $(
            impl Reflected for $ty {
                fn descriptor(catalog: &dyn TypeCatalog) -> RawType {
                    RawType::Named(catalog.builtin(Builtin::$builtin))
                }
            }
        )*
    };
}

macro_rules! value_types {
    ($($ty:ty),* $(,)?) => {
        $(impl ValueType for $ty {})*
    };
}

reflected_builtin! {
    bool => Boolean,
    u8 => Byte,
    i8 => SByte,
    i16 => Int16,
    u16 => UInt16,
    char => Char,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Single,
    f64 => Double,
    str => String,
    String => String,
}

value_types!(bool, u8, i8, i16, u16, char, i32, u32, i64, u64, f32, f64);

/// `Option<T>` maps to the nullable wrapper of `T`.
impl<T: ValueType> Reflected for Option<T> {
    fn descriptor(catalog: &dyn TypeCatalog) -> RawType {
        RawType::generic(catalog.nullable(), vec![T::descriptor(catalog)])
    }
}

/// Entry point: every [`TypeSketch`] starts here.
#[derive(Clone, Copy)]
pub struct Reflect<'c> {
    catalog: &'c dyn TypeCatalog,
}

impl<'c> Reflect<'c> {
    pub fn new(catalog: &'c dyn TypeCatalog) -> Self {
        Reflect { catalog }
    }

    pub fn catalog(&self) -> &'c dyn TypeCatalog {
        self.catalog
    }

    pub fn raw(&self, raw: RawType) -> TypeSketch<'c> {
        TypeSketch::new(self.catalog, raw)
    }

    pub fn of<T: Reflected + ?Sized>(&self) -> TypeSketch<'c> {
        self.raw(T::descriptor(self.catalog))
    }

    /// Resolves a qualified name, `None` when it cannot be resolved.
    pub fn named(&self, qualified_name: &str) -> Option<TypeSketch<'c>> {
        match self.named_strict(qualified_name) {
            Ok(sketch) => Some(sketch),
            Err(e) => {
                log::debug!("cannot resolve `{}`: {}", qualified_name, e);
                None
            }
        }
    }

    /// Resolves a qualified name, returning the catalog's error as is.
    pub fn named_strict(&self, qualified_name: &str) -> Result<TypeSketch<'c>, ResolveError> {
        let raw = self.catalog.resolve(qualified_name)?;
        Ok(self.raw(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_catalog;
    use crate::sketches::TypeLike;

    fn reflect() -> Reflect<'static> {
        Reflect::new(sample_catalog())
    }

    #[test]
    fn sketch_from_raw_keeps_the_descriptor() {
        let int = RawType::Named(sample_catalog().builtin(Builtin::Int32));
        assert_eq!(reflect().raw(int.clone()).raw(), &int);
    }

    #[test]
    fn sketch_from_rust_type() {
        let int = RawType::Named(sample_catalog().builtin(Builtin::Int32));
        assert_eq!(reflect().of::<i32>(), reflect().raw(int));
        assert_eq!(reflect().of::<str>(), reflect().of::<String>());
        assert_eq!(reflect().of::<Option<f64>>().name().source_full_name(), "double?");
        assert_eq!(reflect().of::<u8>().name().source_name(), "byte");
    }

    #[test]
    fn sketch_from_string_equals_sketch_from_rust_type() {
        assert_eq!(reflect().named("System.Int32"), Some(reflect().of::<i32>()));
        assert_eq!(reflect().named("System.Int32, mscorlib"), Some(reflect().of::<i32>()));
        assert_eq!(reflect().named_strict("System.Int32").unwrap(), reflect().of::<i32>());
        assert_eq!(
            reflect().named("System.Nullable`1[[System.Int32, mscorlib]]"),
            Some(reflect().of::<Option<i32>>())
        );
    }

    #[test]
    fn unresolvable_names() {
        assert_eq!(reflect().named("N.Missing"), None);
        assert_eq!(reflect().named("N.Seq`1[System.Int32"), None);
        assert_eq!(
            reflect().named_strict("N.Missing").unwrap_err(),
            ResolveError::UnknownType("N.Missing".to_string())
        );
        assert!(matches!(
            reflect().named_strict("N.Seq`1[System.Int32,System.Int32]"),
            Err(ResolveError::Arity { expected: 1, supplied: 2, .. })
        ));
    }

    #[test]
    fn generic_definitions_by_name() {
        let seq = reflect().named_strict("N.Seq`1").unwrap();
        assert!(sample_catalog().is_generic_definition(seq.raw()));
        let applied = reflect().named_strict("N.Seq`1[System.Int32]").unwrap();
        let int = reflect().of::<i32>().apply(&[]).unwrap();
        assert_eq!(applied.raw(), seq.apply(&[int]).unwrap().raw());
    }
}
