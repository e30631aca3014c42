use std::{collections::HashMap, env, fs::File, io::Write};

use petgraph::{
    dot::{Config, Dot},
    graph::DiGraph,
    Direction,
};

use crate::{
    error::{CatalogError, ResolveError},
    parser::{parse_type_name, TypeName},
    render::{definition_path, source_qualified_name},
    schema::{Builtin, DefId, RawType, TypeDef, Visibility},
};

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum NestedFilter {
    All,
    Public,
}

/// The reflection facility the algebra and the renderer consume.
///
/// Implementors supply definition storage and lookup; every query and the
/// constructions built on top of them are provided. A `DefId` is only
/// meaningful for the catalog that minted it, and `definition` may panic when
/// handed a foreign one.
pub trait TypeCatalog: Send + Sync {
    fn definition(&self, id: DefId) -> &TypeDef;

    /// Looks up a definition by its definition path, e.g. `N.Parent`1+Nested`.
    fn lookup(&self, definition_path: &str) -> Option<DefId>;

    /// Definitions declared directly inside `id`, in declaration order.
    fn nested_definitions(&self, id: DefId) -> Vec<DefId>;

    fn builtin(&self, builtin: Builtin) -> DefId;

    /// The single-parameter optional value wrapper, `System.Nullable`1`.
    fn nullable(&self) -> DefId;

    fn param_name(&self, owner: DefId, position: usize) -> &str {
        &self.definition(owner).params[position]
    }

    fn is_generic_parameter(&self, ty: &RawType) -> bool {
        matches!(ty, RawType::Param { .. })
    }

    fn is_generic_type(&self, ty: &RawType) -> bool {
        match ty {
            RawType::Named(id) => self.definition(*id).is_generic(),
            RawType::Constructed { .. } => true,
            RawType::Param { .. } => false,
        }
    }

    fn is_generic_definition(&self, ty: &RawType) -> bool {
        match ty {
            RawType::Named(id) => self.definition(*id).is_generic(),
            _ => false,
        }
    }

    fn contains_free_parameters(&self, ty: &RawType) -> bool {
        match ty {
            RawType::Param { .. } => true,
            RawType::Named(id) => self.definition(*id).is_generic(),
            RawType::Constructed { args, .. } => {
                args.iter().any(|arg| self.contains_free_parameters(arg))
            }
        }
    }

    fn builtin_of(&self, ty: &RawType) -> Option<Builtin> {
        match ty {
            RawType::Named(id) => self.definition(*id).builtin,
            _ => None,
        }
    }

    fn is_primitive(&self, ty: &RawType) -> bool {
        self.builtin_of(ty).map_or(false, Builtin::is_primitive)
    }

    fn is_nullable(&self, ty: &RawType) -> bool {
        ty.definition() == Some(self.nullable())
    }

    /// Immediate arguments, left to right. A generic definition reports its
    /// own placeholders; nested types report the flattened list.
    fn generic_arguments(&self, ty: &RawType) -> Vec<RawType> {
        match ty {
            RawType::Named(id) => (0..self.definition(*id).params.len())
                .map(|position| RawType::Param { owner: *id, position })
                .collect(),
            RawType::Constructed { args, .. } => args.to_vec(),
            RawType::Param { .. } => Vec::new(),
        }
    }

    /// The fully open form of a parameterized descriptor.
    fn generic_definition(&self, ty: &RawType) -> Option<RawType> {
        if !self.is_generic_type(ty) {
            return None;
        }
        ty.definition().map(RawType::Named)
    }

    fn namespace(&self, ty: &RawType) -> Option<&str> {
        let id = match ty {
            RawType::Param { owner, .. } => *owner,
            RawType::Named(id) | RawType::Constructed { definition: id, .. } => *id,
        };
        self.definition(id).namespace.as_deref()
    }

    /// Substitutes the immediate arguments of a generic definition.
    fn make_generic(
        &self,
        definition: &RawType,
        args: Vec<RawType>,
    ) -> Result<RawType, ResolveError> {
        let id = match definition {
            RawType::Named(id) if self.definition(*id).is_generic() => *id,
            other => {
                let name = match other.definition() {
                    Some(id) => self.definition(id).name.clone(),
                    None => format!("{:?}", other),
                };
                return Err(ResolveError::NotGeneric(name));
            }
        };
        let expected = self.definition(id).params.len();
        if args.len() != expected {
            return Err(ResolveError::Arity {
                name: self.definition(id).name.clone(),
                expected,
                supplied: args.len(),
            });
        }
        Ok(RawType::generic(id, args))
    }

    /// Replaces `owner`'s placeholders in `ty` with `args`.
    fn instantiate(&self, ty: &RawType, owner: DefId, args: &[RawType]) -> RawType {
        match ty {
            RawType::Param { owner: o, position } if *o == owner => match args.get(*position) {
                Some(arg) => arg.clone(),
                None => ty.clone(),
            },
            RawType::Param { .. } | RawType::Named(_) => ty.clone(),
            RawType::Constructed { definition, args: inner } => RawType::generic(
                *definition,
                inner.iter().map(|arg| self.instantiate(arg, owner, args)).collect(),
            ),
        }
    }

    fn base_type(&self, ty: &RawType) -> Option<RawType> {
        match ty {
            RawType::Param { .. } => None,
            RawType::Named(id) => self.definition(*id).base.clone(),
            RawType::Constructed { definition, args } => {
                let base = self.definition(*definition).base.as_ref()?;
                Some(self.instantiate(base, *definition, args))
            }
        }
    }

    /// Nested declared types of `ty`'s definition, as definitions.
    fn nested_types(&self, ty: &RawType, filter: NestedFilter) -> Vec<RawType> {
        let Some(id) = ty.definition() else {
            return Vec::new();
        };
        self.nested_definitions(id)
            .into_iter()
            .filter(|nested| {
                filter == NestedFilter::All
                    || self.definition(*nested).visibility == Visibility::Public
            })
            .map(RawType::Named)
            .collect()
    }

    fn resolve(&self, qualified_name: &str) -> Result<RawType, ResolveError> {
        let name = parse_type_name(qualified_name)?;
        self.resolve_in_scope(&name, None)
    }

    /// Resolves a parsed name. Bare names matching a parameter of `scope`
    /// resolve to that placeholder.
    fn resolve_in_scope(
        &self,
        name: &TypeName,
        scope: Option<DefId>,
    ) -> Result<RawType, ResolveError> {
        if name.args.is_empty() {
            if let Some(owner) = scope {
                let params = &self.definition(owner).params;
                if let Some(position) = params.iter().position(|p| *p == name.path) {
                    return Ok(RawType::Param { owner, position });
                }
            }
        }
        let id = self
            .lookup(&name.path)
            .ok_or_else(|| ResolveError::UnknownType(name.path.clone()))?;
        if name.args.is_empty() {
            return Ok(RawType::Named(id));
        }
        let args = name
            .args
            .iter()
            .map(|arg| self.resolve_in_scope(arg, scope))
            .collect::<Result<Vec<_>, _>>()?;
        log::trace!("resolved `{}` with {} arguments", name.path, args.len());
        self.make_generic(&RawType::Named(id), args)
    }
}

/// A catalog held in memory: definitions are graph nodes, declaration
/// nesting is the edge set.
pub struct InMemoryCatalog {
    graph: DiGraph<TypeDef, ()>,
    by_path: HashMap<String, DefId>,
    builtins: HashMap<Builtin, DefId>,
    nullable: DefId,
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCatalog {
    /// A catalog holding the `System` builtins, `System.DateTime` and
    /// `System.Nullable`1`.
    pub fn new() -> Self {
        let mut graph = DiGraph::new();
        let mut by_path = HashMap::new();
        let mut builtins = HashMap::new();

        let mut add = |graph: &mut DiGraph<TypeDef, ()>, def: TypeDef| {
            let path = format!("System.{}", def.name);
            let id = DefId(graph.add_node(def));
            by_path.insert(path, id);
            id
        };
        let system = |name: &str, params: Vec<String>, builtin: Option<Builtin>| TypeDef {
            namespace: Some("System".to_string()),
            name: name.to_string(),
            declaring: None,
            params,
            inherited: 0,
            visibility: Visibility::Public,
            builtin,
            base: None,
        };
        for builtin in Builtin::ALL {
            let id = add(&mut graph, system(builtin.type_name(), Vec::new(), Some(builtin)));
            builtins.insert(builtin, id);
        }
        add(&mut graph, system("DateTime", Vec::new(), None));
        let nullable = add(&mut graph, system("Nullable`1", vec!["T".to_string()], None));

        InMemoryCatalog {
            graph,
            by_path,
            builtins,
            nullable,
        }
    }

    /// Defines a top-level type. `params` are the declared parameter names;
    /// the arity suffix is added to `name` here.
    pub fn define(
        &mut self,
        namespace: Option<&str>,
        name: &str,
        params: &[&str],
        visibility: Visibility,
    ) -> Result<DefId, CatalogError> {
        let def = TypeDef {
            namespace: namespace.map(str::to_string),
            name: declared_name(name, params.len()),
            declaring: None,
            params: params.iter().map(|p| p.to_string()).collect(),
            inherited: 0,
            visibility,
            builtin: None,
            base: None,
        };
        let path = match namespace {
            Some(namespace) => format!("{}.{}", namespace, def.name),
            None => def.name.clone(),
        };
        self.insert(path, def, None)
    }

    /// Defines a type nested in `parent`. The new definition inherits the
    /// parent's parameters ahead of its own.
    pub fn define_nested(
        &mut self,
        parent: DefId,
        name: &str,
        params: &[&str],
        visibility: Visibility,
    ) -> Result<DefId, CatalogError> {
        let outer = self.definition(parent);
        let mut all_params = outer.params.clone();
        let inherited = all_params.len();
        all_params.extend(params.iter().map(|p| p.to_string()));
        let def = TypeDef {
            namespace: outer.namespace.clone(),
            name: declared_name(name, params.len()),
            declaring: Some(parent),
            params: all_params,
            inherited,
            visibility,
            builtin: None,
            base: None,
        };
        let path = format!("{}+{}", definition_path(&*self, parent), def.name);
        self.insert(path, def, Some(parent))
    }

    /// Declares the base of `id`. Every free parameter of `base` must be a
    /// placeholder of `id` itself, so that closing `id` closes its base.
    pub fn set_base(&mut self, id: DefId, base: RawType) -> Result<(), CatalogError> {
        if !self.binds_only_own_parameters(&base, id) {
            return Err(CatalogError::Schema(format!(
                "base {} of {} has free parameters it does not declare",
                source_qualified_name(&*self, &base),
                definition_path(&*self, id),
            )));
        }
        self.graph[id.0].base = Some(base);
        Ok(())
    }

    fn binds_only_own_parameters(&self, ty: &RawType, id: DefId) -> bool {
        match ty {
            RawType::Param { owner, .. } => *owner == id,
            RawType::Named(named) => !self.definition(*named).is_generic(),
            RawType::Constructed { args, .. } => {
                args.iter().all(|arg| self.binds_only_own_parameters(arg, id))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Writes the nesting graph as dot when `DEBUG_CATALOG_GRAPH` names a file.
    pub fn dump_graph(&self) -> std::io::Result<()> {
        if let Ok(path) = env::var("DEBUG_CATALOG_GRAPH") {
            let mut file = File::create(path)?;
            write!(file, "{:?}", Dot::with_config(&self.graph, &[Config::EdgeNoLabel]))?;
        }
        Ok(())
    }

    fn insert(
        &mut self,
        path: String,
        def: TypeDef,
        parent: Option<DefId>,
    ) -> Result<DefId, CatalogError> {
        if self.by_path.contains_key(&path) {
            return Err(CatalogError::Duplicate(path));
        }
        log::debug!("defining {} ({} parameters)", path, def.params.len());
        let id = DefId(self.graph.add_node(def));
        if let Some(parent) = parent {
            self.graph.add_edge(parent.0, id.0, ());
        }
        self.by_path.insert(path, id);
        Ok(id)
    }
}

fn declared_name(name: &str, own_params: usize) -> String {
    if own_params == 0 {
        name.to_string()
    } else {
        format!("{}`{}", name, own_params)
    }
}

impl TypeCatalog for InMemoryCatalog {
    fn definition(&self, id: DefId) -> &TypeDef {
        &self.graph[id.0]
    }

    fn lookup(&self, definition_path: &str) -> Option<DefId> {
        self.by_path.get(definition_path).copied()
    }

    fn nested_definitions(&self, id: DefId) -> Vec<DefId> {
        // petgraph walks neighbors newest first
        let mut nested: Vec<DefId> = self
            .graph
            .neighbors_directed(id.0, Direction::Outgoing)
            .map(DefId)
            .collect();
        nested.sort();
        nested
    }

    fn builtin(&self, builtin: Builtin) -> DefId {
        self.builtins[&builtin]
    }

    fn nullable(&self) -> DefId {
        self.nullable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_catalog;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn builtins_are_registered() {
        let catalog = InMemoryCatalog::new();
        let int = catalog.lookup("System.Int32").unwrap();
        assert_eq!(catalog.builtin(Builtin::Int32), int);
        assert!(catalog.is_primitive(&RawType::Named(int)));
        assert!(!catalog.is_primitive(&RawType::Named(catalog.builtin(Builtin::String))));
        assert_eq!(definition_path(&catalog, catalog.nullable()), "System.Nullable`1");
    }

    #[test]
    fn nested_definitions_inherit_parameters() {
        init();
        let mut catalog = InMemoryCatalog::new();
        let parent = catalog.define(Some("N"), "Parent", &["T"], Visibility::Public).unwrap();
        let nested = catalog
            .define_nested(parent, "Nested", &["U", "V"], Visibility::Public)
            .unwrap();
        let def = catalog.definition(nested);
        assert_eq!(def.name, "Nested`2");
        assert_eq!(def.params, vec!["T", "U", "V"]);
        assert_eq!(def.own_params(), &["U".to_string(), "V".to_string()]);
        assert_eq!(def.namespace.as_deref(), Some("N"));
        assert_eq!(definition_path(&catalog, nested), "N.Parent`1+Nested`2");
        assert_eq!(catalog.lookup("N.Parent`1+Nested`2"), Some(nested));
    }

    #[test]
    fn duplicate_definitions_are_rejected() {
        let mut catalog = InMemoryCatalog::new();
        catalog.define(Some("N"), "Seq", &["T"], Visibility::Public).unwrap();
        let err = catalog.define(Some("N"), "Seq", &["U"], Visibility::Public).unwrap_err();
        assert!(matches!(err, CatalogError::Duplicate(path) if path == "N.Seq`1"));
        // a different arity is a different definition
        assert!(catalog.define(Some("N"), "Seq", &[], Visibility::Public).is_ok());
    }

    #[test]
    fn make_generic_checks_arity() {
        let catalog = sample_catalog();
        let base3 = catalog.resolve("N.Base3`2").unwrap();
        let int = catalog.resolve("System.Int32").unwrap();
        let err = catalog.make_generic(&base3, vec![int.clone()]).unwrap_err();
        assert_eq!(
            err,
            ResolveError::Arity {
                name: "Base3`2".to_string(),
                expected: 2,
                supplied: 1
            }
        );
        assert!(matches!(catalog.make_generic(&int, vec![]), Err(ResolveError::NotGeneric(_))));
        let closed = catalog.make_generic(&base3, vec![int.clone(), int]).unwrap();
        assert!(!catalog.contains_free_parameters(&closed));
    }

    #[test]
    fn shape_predicates() {
        let catalog = sample_catalog();
        let open = catalog.resolve("N.Seq`1").unwrap();
        let closed = catalog.resolve("N.Seq`1[System.Int32]").unwrap();
        assert!(catalog.is_generic_definition(&open));
        assert!(catalog.contains_free_parameters(&open));
        assert!(catalog.is_generic_type(&closed));
        assert!(!catalog.is_generic_definition(&closed));
        assert!(!catalog.contains_free_parameters(&closed));
        assert_eq!(catalog.generic_definition(&closed), Some(open.clone()));

        let param = &catalog.generic_arguments(&open)[0];
        assert!(catalog.is_generic_parameter(param));
        assert!(!catalog.is_generic_type(param));
        assert_eq!(catalog.namespace(param), Some("N"));
        assert_eq!(catalog.generic_definition(param), None);
    }

    #[test]
    fn base_type_is_instantiated_with_the_arguments() {
        let catalog = sample_catalog();
        let sub = catalog.resolve("N.Sub4`1[System.String]").unwrap();
        let base = catalog.base_type(&sub).unwrap();
        let expected = catalog.resolve("N.Base3`2[System.String,System.Int32]").unwrap();
        assert_eq!(base, expected);

        let open_base = catalog.base_type(&catalog.resolve("N.Sub4`1").unwrap()).unwrap();
        assert!(catalog.contains_free_parameters(&open_base));
        assert!(!catalog.is_generic_definition(&open_base));
    }

    #[test]
    fn bases_may_only_use_their_own_parameters() {
        init();
        let mut catalog = InMemoryCatalog::new();
        let seq = catalog.define(Some("N"), "Seq", &["T"], Visibility::Public).unwrap();
        let sub = catalog.define(Some("N"), "Sub", &["U"], Visibility::Public).unwrap();
        let own = RawType::Param { owner: sub, position: 0 };
        let foreign = RawType::Param { owner: seq, position: 0 };

        let open_definition = RawType::Named(seq);
        assert!(matches!(
            catalog.set_base(sub, open_definition.clone()),
            Err(CatalogError::Schema(_))
        ));
        let nested_open = RawType::generic(seq, vec![open_definition]);
        assert!(matches!(catalog.set_base(sub, nested_open), Err(CatalogError::Schema(_))));
        let foreign_base = RawType::generic(seq, vec![foreign]);
        assert!(matches!(catalog.set_base(sub, foreign_base), Err(CatalogError::Schema(_))));
        assert!(catalog.definition(sub).base.is_none());

        let base = RawType::generic(seq, vec![own]);
        catalog.set_base(sub, base.clone()).unwrap();
        assert_eq!(catalog.definition(sub).base, Some(base));
    }

    #[test]
    fn nested_types_can_be_filtered() {
        let catalog = sample_catalog();
        let container = catalog.resolve("N.Container").unwrap();
        assert_eq!(catalog.nested_types(&container, NestedFilter::All).len(), 5);
        let public = catalog.nested_types(&container, NestedFilter::Public);
        assert_eq!(public, vec![catalog.resolve("N.Container+Nested1").unwrap()]);
    }

    #[test]
    fn unknown_names_fail_to_resolve() {
        let catalog = sample_catalog();
        assert_eq!(
            catalog.resolve("N.Missing"),
            Err(ResolveError::UnknownType("N.Missing".to_string()))
        );
        assert!(matches!(catalog.resolve("N.Seq`1[[]"), Err(ResolveError::Malformed { .. })));
    }
}
