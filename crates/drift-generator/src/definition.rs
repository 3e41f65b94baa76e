//! Column definitions as written in simulation YAML files.

use crate::config::GeneratorConfig;
use crate::producer::{build_producer, column_seed};
use drift_core::{Catalog, CatalogBuilder, ColumnSpec, ConfigError, DomainType};
use serde::{Deserialize, Serialize};

/// Declarative description of one catalog column.
///
/// ```yaml
/// - name: discount
///   type: { type: decimal, precision: 5, scale: 2 }
///   generator: { type: decimal_range, min: 0, max: 50 }
///   reserved: true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,

    /// Declared domain type
    #[serde(rename = "type")]
    pub column_type: DomainType,

    /// How values are produced
    pub generator: GeneratorConfig,

    /// DDL constraint suffix (`PRIMARY KEY`, `NOT NULL`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<String>,

    /// Held back from the initial table until promoted
    #[serde(default)]
    pub reserved: bool,

    /// Never dropped and never picked for random updates
    #[serde(default)]
    pub protected: bool,
}

impl ColumnDefinition {
    /// Build the column spec, seeding its producer with `seed`.
    pub fn to_column_spec(&self, seed: u64) -> Result<ColumnSpec, ConfigError> {
        let producer = build_producer(&self.name, &self.generator, &self.column_type, seed)?;
        let spec = ColumnSpec::with_producer(self.name.clone(), self.column_type.clone(), producer)?
            .reserved(self.reserved)
            .protected(self.protected);

        Ok(match &self.constraints {
            Some(constraints) => spec.with_constraints(constraints.clone()),
            None => spec,
        })
    }
}

/// Build a catalog from column definitions in declaration order.
///
/// Column `i` gets the producer seed `column_seed(seed, i)`.
pub fn build_catalog(definitions: &[ColumnDefinition], seed: u64) -> Result<Catalog, ConfigError> {
    let mut builder = CatalogBuilder::new();
    for (position, definition) in definitions.iter().enumerate() {
        builder.register(definition.to_column_spec(column_seed(seed, position))?);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_core::Value;

    const COLUMNS: &str = r#"
- name: id
  type: uuid
  generator: { type: uuid_v4 }
  constraints: PRIMARY KEY
  protected: true
- name: price
  type: { type: decimal, precision: 10, scale: 2 }
  generator: { type: decimal_range, min: 1, max: 500 }
- name: coupon
  type: { type: var_char, length: 16 }
  generator: { type: pattern, pattern: "SAVE-{rand:4}" }
  reserved: true
"#;

    fn definitions() -> Vec<ColumnDefinition> {
        serde_yaml::from_str(COLUMNS).unwrap()
    }

    #[test]
    fn test_parse_definitions() {
        let defs = definitions();
        assert_eq!(defs.len(), 3);
        assert_eq!(defs[0].column_type, DomainType::Uuid);
        assert_eq!(defs[0].constraints.as_deref(), Some("PRIMARY KEY"));
        assert!(defs[0].protected);
        assert!(!defs[1].reserved);
        assert!(defs[2].reserved);
        assert_eq!(defs[2].column_type, DomainType::VarChar { length: 16 });
    }

    #[test]
    fn test_build_catalog_keeps_order_and_flags() {
        let catalog = build_catalog(&definitions(), 42).unwrap();
        assert_eq!(catalog.names(), vec!["id", "price", "coupon"]);

        let id = catalog.get("id").unwrap();
        assert!(id.is_protected());
        assert_eq!(id.constraints(), Some("PRIMARY KEY"));
        assert!(matches!(id.produce().unwrap(), Value::Uuid(_)));

        let coupon = catalog.get("coupon").unwrap();
        assert!(coupon.is_reserved());
        assert!(coupon.produce().unwrap().as_str().unwrap().starts_with("SAVE-"));
    }

    #[test]
    fn test_build_catalog_is_seeded() {
        let a = build_catalog(&definitions(), 1).unwrap();
        let b = build_catalog(&definitions(), 1).unwrap();
        for name in ["id", "price", "coupon"] {
            assert_eq!(
                a.get(name).unwrap().produce().unwrap(),
                b.get(name).unwrap().produce().unwrap()
            );
        }
    }

    #[test]
    fn test_build_catalog_rejects_duplicates() {
        let mut defs = definitions();
        defs.push(defs[1].clone());
        assert_eq!(
            build_catalog(&defs, 0).unwrap_err(),
            ConfigError::DuplicateColumn("price".to_string())
        );
    }

    #[test]
    fn test_bad_generator_names_column() {
        let mut defs = definitions();
        defs[1].generator = GeneratorConfig::UuidV4;
        assert!(matches!(
            build_catalog(&defs, 0),
            Err(ConfigError::InvalidGenerator { column, .. }) if column == "price"
        ));
    }
}
