//! Flattened-slot substitution over nested generic shapes.
//!
//! The free slots of a descriptor are enumerated depth first, left to right,
//! over its immediate arguments: a placeholder is one slot, an argument that
//! still contains placeholders contributes its own slots, a resolved argument
//! contributes none. `count_free_slots` counts them and `substitute` fills
//! them from an [`ArgCursor`] in the same order.

use crate::catalog::TypeCatalog;
use crate::error::SketchError;
use crate::render::source_qualified_name;
use crate::schema::RawType;

/// Ordered read position into an argument list.
#[derive(Debug, Clone)]
pub struct ArgCursor<'a> {
    args: &'a [RawType],
    position: usize,
}

impl<'a> ArgCursor<'a> {
    pub fn new(args: &'a [RawType]) -> Self {
        ArgCursor { args, position: 0 }
    }

    pub fn next(&mut self) -> Option<&'a RawType> {
        let arg = self.args.get(self.position)?;
        self.position += 1;
        Some(arg)
    }

    pub fn consumed(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.args.len() - self.position
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

/// Number of flattened free slots of `ty`. A bare placeholder is one slot.
pub fn count_free_slots<C: TypeCatalog + ?Sized>(catalog: &C, ty: &RawType) -> usize {
    if catalog.is_generic_parameter(ty) {
        return 1;
    }
    catalog
        .generic_arguments(ty)
        .iter()
        .filter(|arg| catalog.contains_free_parameters(arg))
        .map(|arg| count_free_slots(catalog, arg))
        .sum()
}

/// Fills the free slots of `ty` from `cursor`, rebuilding every parameterized
/// level from its generic definition. Resolved arguments pass through.
pub fn substitute<C: TypeCatalog + ?Sized>(
    catalog: &C,
    ty: &RawType,
    cursor: &mut ArgCursor,
) -> Result<RawType, SketchError> {
    if catalog.is_generic_parameter(ty) {
        return match cursor.next() {
            Some(arg) => Ok(arg.clone()),
            None => Err(SketchError::ArityMismatch {
                name: source_qualified_name(catalog, ty),
                expected: cursor.consumed() + 1,
                supplied: cursor.len(),
            }),
        };
    }
    let Some(definition) = catalog.generic_definition(ty) else {
        return Ok(ty.clone());
    };
    let mut args = Vec::new();
    for arg in catalog.generic_arguments(ty) {
        if catalog.contains_free_parameters(&arg) {
            args.push(substitute(catalog, &arg, cursor)?);
        } else {
            args.push(arg);
        }
    }
    Ok(catalog.make_generic(&definition, args)?)
}

/// Applies `args` to every free slot of `ty`. The argument count must match
/// the slot count exactly; nothing is applied otherwise.
pub fn apply_arguments<C: TypeCatalog + ?Sized>(
    catalog: &C,
    ty: &RawType,
    args: &[RawType],
) -> Result<RawType, SketchError> {
    let expected = count_free_slots(catalog, ty);
    if expected == 0 && args.is_empty() {
        return Ok(ty.clone());
    }
    if expected != args.len() {
        log::debug!("arity mismatch: {} slots, {} arguments", expected, args.len());
        return Err(SketchError::ArityMismatch {
            name: source_qualified_name(catalog, ty),
            expected,
            supplied: args.len(),
        });
    }
    let mut cursor = ArgCursor::new(args);
    let applied = substitute(catalog, ty, &mut cursor)?;
    debug_assert_eq!(cursor.remaining(), 0);
    log::debug!(
        "applied {} arguments: {} => {}",
        args.len(),
        source_qualified_name(catalog, ty),
        source_qualified_name(catalog, &applied)
    );
    Ok(applied)
}
