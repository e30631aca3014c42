use std::sync::OnceLock;

use crate::catalog::InMemoryCatalog;
use crate::parser::catalog_from_json_str;

static SAMPLE: OnceLock<InMemoryCatalog> = OnceLock::new();

/// The catalog described by `tests/catalog-sample.json`, loaded once.
pub fn sample_catalog() -> &'static InMemoryCatalog {
    SAMPLE.get_or_init(|| {
        catalog_from_json_str(include_str!("../tests/catalog-sample.json"))
            .expect("sample catalog loads")
    })
}
