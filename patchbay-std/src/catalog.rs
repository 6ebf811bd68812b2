//! In-memory routine catalog.
//!
//! [`TypeCatalog`] is a [`RoutineResolver`] over a fixed set of type
//! declarations. Hosts that already know their patchable surface (or tests)
//! describe it once with [`TypeCatalogBuilder`] and hand the catalog to a
//! processor.

use indexmap::IndexMap;
use patchbay_core::{RoutineId, RoutineResolver};

#[derive(Debug, Clone, Default)]
struct TypeEntry {
    constructors: Vec<RoutineId>,
    methods: Vec<RoutineId>,
}

/// Resolver backed by declared types, in declaration order.
///
/// # Example
///
/// ```rust
/// use patchbay_core::RoutineResolver;
/// use patchbay_std::catalog::TypeCatalog;
///
/// let catalog = TypeCatalog::builder()
///     .ty("Game.Player", |t| {
///         t.constructor(Vec::<&str>::new())
///             .method("Update", ["float"])
///             .method("Update", ["double"])
///     })
///     .build();
///
/// let update = catalog.method("Game.Player", "Update", None).unwrap();
/// assert!(update.has_parameters(&["float"]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: IndexMap<String, TypeEntry>,
}

impl TypeCatalog {
    /// Start describing a catalog.
    pub fn builder() -> TypeCatalogBuilder {
        TypeCatalogBuilder::default()
    }

    /// Number of known types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no type is known.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

fn signature_matches(routine: &RoutineId, parameters: Option<&[String]>) -> bool {
    match parameters {
        Some(expected) => routine.has_parameters(expected),
        None => true,
    }
}

impl RoutineResolver for TypeCatalog {
    fn contains_type(&self, ty: &str) -> bool {
        self.types.contains_key(ty)
    }

    fn constructor(&self, ty: &str, parameters: Option<&[String]>) -> Option<RoutineId> {
        let entry = self.types.get(ty)?;
        let expected = parameters.unwrap_or(&[]);
        entry
            .constructors
            .iter()
            .find(|c| c.has_parameters(expected))
            .cloned()
    }

    fn method(&self, ty: &str, name: &str, parameters: Option<&[String]>) -> Option<RoutineId> {
        let entry = self.types.get(ty)?;
        entry
            .methods
            .iter()
            .find(|m| m.name() == name && signature_matches(m, parameters))
            .cloned()
    }

    fn declared_constructors(&self, ty: &str) -> Vec<RoutineId> {
        self.types
            .get(ty)
            .map(|e| e.constructors.clone())
            .unwrap_or_default()
    }

    fn declared_methods(&self, ty: &str) -> Vec<RoutineId> {
        self.types
            .get(ty)
            .map(|e| e.methods.clone())
            .unwrap_or_default()
    }
}

/// Builder for [`TypeCatalog`].
#[derive(Debug, Default)]
pub struct TypeCatalogBuilder {
    types: IndexMap<String, TypeEntry>,
}

impl TypeCatalogBuilder {
    /// Declare a type and its routines. Declaring the same type again adds
    /// to it.
    pub fn ty(mut self, name: &str, describe: impl FnOnce(TypeBuilder) -> TypeBuilder) -> Self {
        let entry = self.types.shift_remove(name).unwrap_or_default();
        let built = describe(TypeBuilder {
            name: name.to_string(),
            entry,
        });
        self.types.insert(built.name, built.entry);
        self
    }

    /// Build the catalog.
    pub fn build(self) -> TypeCatalog {
        TypeCatalog { types: self.types }
    }
}

/// Describes the routines of one type.
#[derive(Debug)]
pub struct TypeBuilder {
    name: String,
    entry: TypeEntry,
}

impl TypeBuilder {
    /// Declare a constructor. Duplicate signatures are ignored.
    pub fn constructor<P, S>(mut self, parameters: P) -> Self
    where
        P: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let id = RoutineId::constructor(&self.name, parameters);
        if !self.entry.constructors.contains(&id) {
            self.entry.constructors.push(id);
        }
        self
    }

    /// Declare a method. Duplicate signatures are ignored.
    pub fn method<P, S>(mut self, name: &str, parameters: P) -> Self
    where
        P: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let id = RoutineId::method(&self.name, name, parameters);
        if !self.entry.methods.contains(&id) {
            self.entry.methods.push(id);
        }
        self
    }
}
