//! Column catalog and the builder that assembles it.
//!
//! The catalog is the full, ordered set of column specs known to a run,
//! including reserved columns that are not yet part of the live table.
//! [`CatalogBuilder`] is handed around explicitly by the composition root;
//! there is no process-wide registry.

use crate::column::ColumnSpec;
use crate::error::ConfigError;
use std::collections::HashSet;

/// Ordered, validated set of column specs.
#[derive(Debug, Clone)]
pub struct Catalog {
    columns: Vec<ColumnSpec>,
}

impl Catalog {
    /// Build a catalog from specs, preserving their order.
    ///
    /// Fails on an empty list or duplicate names.
    pub fn new(columns: Vec<ColumnSpec>) -> Result<Self, ConfigError> {
        if columns.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(ConfigError::DuplicateColumn(column.name().to_string()));
            }
        }

        Ok(Self { columns })
    }

    /// Get a column spec by name.
    pub fn get(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Column at a catalog position.
    pub fn at(&self, position: usize) -> Option<&ColumnSpec> {
        self.columns.get(position)
    }

    /// Position of a column in catalog order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    /// Whether a column with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over specs in catalog order.
    pub fn iter(&self) -> std::slice::Iter<'_, ColumnSpec> {
        self.columns.iter()
    }

    /// All column names in catalog order.
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a ColumnSpec;
    type IntoIter = std::slice::Iter<'a, ColumnSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

/// Collects column specs and produces a [`Catalog`].
///
/// # Example
///
/// ```rust
/// use drift_core::{CatalogBuilder, ColumnSpec, DomainType, Value};
///
/// let mut builder = CatalogBuilder::new();
/// builder
///     .register(
///         ColumnSpec::new("id", DomainType::Int64, || Ok(Value::Int64(1)))
///             .unwrap()
///             .protected(true),
///     )
///     .register(
///         ColumnSpec::new("coupon", DomainType::Text, || Ok(Value::Text("NONE".into())))
///             .unwrap()
///             .reserved(true),
///     );
///
/// let catalog = builder.build().unwrap();
/// assert_eq!(catalog.names(), vec!["id", "coupon"]);
/// ```
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    columns: Vec<ColumnSpec>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a column. Registration order is catalog order.
    pub fn register(&mut self, column: ColumnSpec) -> &mut Self {
        self.columns.push(column);
        self
    }

    /// Names registered so far.
    pub fn registered(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    /// Validate and produce the catalog.
    pub fn build(self) -> Result<Catalog, ConfigError> {
        Catalog::new(self.columns)
    }
}
