use crate::catalog::{InMemoryCatalog, TypeCatalog};
use crate::error::{CatalogError, ResolveError};
use crate::render::definition_path;
use crate::schema::{DefId, Visibility};
use nom::{
    branch::alt,
    bytes::complete::{take_till1, take_while1},
    character::complete::{char, multispace0},
    combinator::{all_consuming, map, opt},
    multi::separated_list1,
    sequence::{delimited, pair, preceded, terminated},
    IResult,
};
use std::{fs::File, io::BufReader};

use serde_json::Value;

/// A parsed qualified type name: a definition path and its argument names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    pub path: String,
    pub args: Vec<TypeName>,
}

pub fn catalog_from_json(json_path: &str) -> Result<InMemoryCatalog, CatalogError> {
    let file = File::open(json_path)?;
    let reader = BufReader::new(file);
    let val: Value = serde_json::from_reader(reader)?;
    catalog_from_value(&val)
}

pub fn catalog_from_json_str(json: &str) -> Result<InMemoryCatalog, CatalogError> {
    let val: Value = serde_json::from_str(json)?;
    catalog_from_value(&val)
}

// catalog json:
// { "types": [ TypeEntry* ] }
// TypeEntry = { "namespace"?: str, "name": str, "params"?: [str],
//               "visibility"?: str, "base"?: TypeName, "nested"?: [TypeEntry] }
// "namespace" is only read on top-level entries; nested ones take their parent's.
pub fn catalog_from_value(val: &Value) -> Result<InMemoryCatalog, CatalogError> {
    let mut catalog = InMemoryCatalog::new();
    let types = val["types"]
        .as_array()
        .ok_or_else(|| CatalogError::Schema("`types` must be an array".to_string()))?;

    // bases may refer to types declared later in the file
    let mut bases: Vec<(DefId, String)> = Vec::new();
    for entry in types {
        register_entry(&mut catalog, entry, None, &mut bases)?;
    }
    for (id, base) in bases {
        let name = parse_type_name(&base)?;
        let raw = catalog.resolve_in_scope(&name, Some(id))?;
        log::debug!("{} derives from {}", definition_path(&catalog, id), base);
        catalog.set_base(id, raw)?;
    }
    Ok(catalog)
}

fn register_entry(
    catalog: &mut InMemoryCatalog,
    entry: &Value,
    parent: Option<DefId>,
    bases: &mut Vec<(DefId, String)>,
) -> Result<(), CatalogError> {
    let name = entry["name"]
        .as_str()
        .ok_or_else(|| CatalogError::Schema(format!("type entry without a name: {}", entry)))?;
    let params = match entry.get("params") {
        None => Vec::new(),
        Some(params) => params
            .as_array()
            .ok_or_else(|| CatalogError::Schema(format!("`params` of {} must be an array", name)))?
            .iter()
            .map(|p| {
                p.as_str()
                    .ok_or_else(|| {
                        CatalogError::Schema(format!("parameter of {} must be a string", name))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?,
    };
    let visibility = match entry.get("visibility") {
        None => Visibility::Public,
        Some(v) => v
            .as_str()
            .ok_or_else(|| {
                CatalogError::Schema(format!("`visibility` of {} must be a string", name))
            })?
            .parse()
            .map_err(CatalogError::Schema)?,
    };

    let id = match parent {
        None => catalog.define(entry["namespace"].as_str(), name, &params, visibility)?,
        Some(parent) => catalog.define_nested(parent, name, &params, visibility)?,
    };

    if let Some(base) = entry.get("base") {
        let base = base
            .as_str()
            .ok_or_else(|| {
                CatalogError::Schema(format!("`base` of {} must be a type name", name))
            })?;
        bases.push((id, base.to_string()));
    }
    if let Some(nested) = entry.get("nested") {
        let nested = nested
            .as_array()
            .ok_or_else(|| CatalogError::Schema(format!("`nested` of {} must be an array", name)))?;
        for child in nested {
            register_entry(catalog, child, Some(id), bases)?;
        }
    }
    Ok(())
}

// this is a rust parser for qualified type names:
// TypeName = Path Args?
// Path     = [^\s\[\],]+          e.g. N.Parent`1+Nested`2
// Args     = '[' Arg (',' Arg)* ']'
// Arg      = '[' TypeName (',' Assembly)? ']' | TypeName
// TypeName may also be followed by ', Assembly' at the top level.
// the assembly part is accepted and ignored wherever it appears.

fn is_path_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '[' | ']' | ',')
}

fn parse_path(input: &str) -> IResult<&str, String> {
    map(take_while1(is_path_char), |s: &str| s.to_string())(input)
}

fn parse_assembly(input: &str) -> IResult<&str, &str> {
    preceded(pair(char(','), multispace0), take_till1(|c| c == ']'))(input)
}

fn parse_bracketed_arg(input: &str) -> IResult<&str, TypeName> {
    delimited(
        char('['),
        terminated(parse_type_name_inner, opt(parse_assembly)),
        char(']'),
    )(input)
}

fn parse_arg(input: &str) -> IResult<&str, TypeName> {
    alt((parse_bracketed_arg, parse_type_name_inner))(input)
}

fn parse_args(input: &str) -> IResult<&str, Vec<TypeName>> {
    delimited(
        char('['),
        separated_list1(pair(char(','), multispace0), parse_arg),
        char(']'),
    )(input)
}

fn parse_type_name_inner(input: &str) -> IResult<&str, TypeName> {
    map(pair(parse_path, opt(parse_args)), |(path, args)| TypeName {
        path,
        args: args.unwrap_or_default(),
    })(input)
}

pub fn parse_type_name(input: &str) -> Result<TypeName, ResolveError> {
    let qualified = terminated(parse_type_name_inner, opt(parse_assembly));
    match all_consuming(delimited(multispace0, qualified, multispace0))(input) {
        Ok((_, name)) => Ok(name),
        Err(e) => Err(ResolveError::Malformed {
            input: input.to_string(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(path: &str, args: Vec<TypeName>) -> TypeName {
        TypeName {
            path: path.to_string(),
            args,
        }
    }

    #[test]
    fn test_plain_names() {
        assert_eq!(parse_type_name("System.Int32").unwrap(), name("System.Int32", vec![]));
        assert_eq!(
            parse_type_name("  N.Parent`1+Nested ").unwrap(),
            name("N.Parent`1+Nested", vec![])
        );
    }

    #[test]
    fn test_argument_lists() {
        let expected = name(
            "N.Base3`2",
            vec![name("System.Int32", vec![]), name("System.String", vec![])],
        );
        assert_eq!(parse_type_name("N.Base3`2[System.Int32,System.String]").unwrap(), expected);
        assert_eq!(parse_type_name("N.Base3`2[System.Int32, System.String]").unwrap(), expected);
        assert_eq!(parse_type_name("N.Base3`2[[System.Int32],[System.String]]").unwrap(), expected);
        assert_eq!(
            parse_type_name("N.Base3`2[[System.Int32, mscorlib],[System.String, mscorlib]]")
                .unwrap(),
            expected
        );
    }

    #[test]
    fn test_assembly_qualified_names() {
        assert_eq!(
            parse_type_name("System.Int32, mscorlib").unwrap(),
            name("System.Int32", vec![])
        );
        assert_eq!(
            parse_type_name("N.Seq`1[[System.Int32, mscorlib]], typesketch, Version=1.0.0.0")
                .unwrap(),
            name("N.Seq`1", vec![name("System.Int32", vec![])])
        );
        assert!(parse_type_name("System.Int32,").is_err());
    }

    #[test]
    fn test_nested_arguments() {
        let parsed = parse_type_name("N.Seq`1[[N.Seq`1[[System.Int32]]]]").unwrap();
        assert_eq!(
            parsed,
            name("N.Seq`1", vec![name("N.Seq`1", vec![name("System.Int32", vec![])])])
        );
    }

    #[test]
    fn test_malformed_names() {
        let inputs = [
            "",
            "N.Seq`1[",
            "N.Seq`1[]",
            "N.Seq`1[System.Int32]]",
            "a b",
            "[System.Int32]",
        ];
        for input in inputs {
            assert!(
                matches!(parse_type_name(input), Err(ResolveError::Malformed { .. })),
                "{:?} should not parse",
                input
            );
        }
    }

    #[test]
    fn test_catalog_schema_errors() {
        assert!(matches!(catalog_from_json_str("{}"), Err(CatalogError::Schema(_))));
        assert!(matches!(catalog_from_json_str("{"), Err(CatalogError::Json(_))));
        assert!(matches!(
            catalog_from_json_str(r#"{"types": [{"name": "A", "visibility": "friend"}]}"#),
            Err(CatalogError::Schema(_))
        ));
        assert!(matches!(
            catalog_from_json_str(r#"{"types": [{"name": "A", "base": "Missing"}]}"#),
            Err(CatalogError::Resolve(ResolveError::UnknownType(_)))
        ));
    }

    #[test]
    fn test_bases_may_refer_forward() {
        let catalog = catalog_from_json_str(
            r#"{"types": [
                {"namespace": "N", "name": "Sub", "params": ["T"], "base": "N.Base`1[T]"},
                {"namespace": "N", "name": "Base", "params": ["U"]}
            ]}"#,
        )
        .unwrap();
        let sub = catalog.lookup("N.Sub`1").unwrap();
        let base = catalog.definition(sub).base.clone().unwrap();
        assert!(catalog.contains_free_parameters(&base));
        assert_eq!(base.definition(), catalog.lookup("N.Base`1"));
    }

    #[test]
    fn test_bases_with_foreign_parameters_are_rejected() {
        for base in ["N.Seq`1", "N.Seq`1[N.Seq`1]"] {
            let json = format!(
                r#"{{"types": [
                    {{"namespace": "N", "name": "Seq", "params": ["T"]}},
                    {{"namespace": "N", "name": "Sub", "base": "{}"}}
                ]}}"#,
                base
            );
            assert!(
                matches!(catalog_from_json_str(&json), Err(CatalogError::Schema(_))),
                "{} should be rejected as a base",
                base
            );
        }
    }

    #[test]
    fn test_sample_file_loads() {
        let catalog = catalog_from_json("tests/catalog-sample.json").unwrap();
        assert!(catalog.lookup("N.Parent`1+Nested`2+Nested2+Nested3+Nested4`1+Nested5").is_some());
    }
}
