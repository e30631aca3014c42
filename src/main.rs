use std::error::Error;

use clap::{arg, command, ArgMatches};
use typesketch::{
    parser::catalog_from_json, AnyType, ClosedType, Reflect, TypeLike, TypeSketch,
};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let matches = command!()
        .arg(
            arg!(--catalog <FILE> "Path to the catalog json file")
                .default_value("tests/catalog-sample.json"),
        )
        .arg(arg!(<type_name> "Qualified type name, e.g. N.Base3`2[System.Int32,System.String]"))
        .arg(arg!(--base "Take the base type first"))
        .arg(arg!(--unapply "Unapply the type arguments"))
        .arg(arg!(--apply <TYPE> ... "Apply closed type arguments").num_args(0..))
        .arg(arg!(--partial <TYPE> ... "Apply type arguments that may be open").num_args(1..))
        .arg(arg!(--nested "List the nested types"))
        .get_matches();

    let catalog_path = matches.get_one::<String>("catalog").map_or("", String::as_str);
    let catalog = catalog_from_json(catalog_path)?;
    catalog.dump_graph()?;
    let reflect = Reflect::new(&catalog);

    let type_name = matches.get_one::<String>("type_name").map_or("", String::as_str);
    let mut current = AnyType::Sketch(reflect.named_strict(type_name)?);
    if matches.get_flag("base") {
        current = current
            .base_type()
            .ok_or_else(|| format!("{} has no base type", current))?;
    }
    if matches.get_flag("unapply") {
        current = AnyType::Open(
            current
                .unapply()
                .ok_or_else(|| format!("{} has no type arguments to unapply", current))?,
        );
    }
    if let Some(args) = sketch_args(&reflect, &matches, "partial")? {
        current = AnyType::Sketch(match &current {
            AnyType::Sketch(sketch) => sketch.apply_partial(&args)?,
            AnyType::Open(open) => open.apply_partial(&args)?,
            AnyType::Closed(_) => return Err(format!("{} is already closed", current).into()),
        });
    }
    if let Some(args) = sketch_args(&reflect, &matches, "apply")? {
        let args = args
            .iter()
            .map(|arg| arg.apply(&[]))
            .collect::<Result<Vec<ClosedType>, _>>()?;
        current = AnyType::Closed(current.apply(&args)?);
    }

    print_type(&current);
    if matches.get_flag("nested") {
        for nested in current.all_nested_types() {
            println!("nested:           {}", nested.name().source_full_name());
        }
    }
    Ok(())
}

fn sketch_args<'c>(
    reflect: &Reflect<'c>,
    matches: &ArgMatches,
    id: &str,
) -> Result<Option<Vec<TypeSketch<'c>>>, Box<dyn Error>> {
    if !matches.contains_id(id) {
        return Ok(None);
    }
    let args = matches
        .get_many::<String>(id)
        .into_iter()
        .flatten()
        .map(|name| reflect.named_strict(name))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(args))
}

fn print_type(ty: &AnyType) {
    let name = ty.name();
    println!("kind:             {}", ty.kind());
    println!("name:             {}", name.value());
    println!("full name:        {}", name.full_name().unwrap_or_else(|| "-".to_string()));
    println!("namespace:        {}", name.namespace().unwrap_or("-"));
    println!("source name:      {}", name.source_name());
    println!("source full name: {}", name.source_full_name());
}
