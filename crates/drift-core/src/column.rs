//! Column specifications.
//!
//! A [`ColumnSpec`] is the immutable description of one catalog column: its
//! name, domain type, optional DDL constraints, value producer and the
//! `reserved`/`protected` flags that drive schema evolution.

use crate::error::{ConfigError, ProducerError};
use crate::types::DomainType;
use crate::values::Value;
use std::fmt;
use std::sync::Arc;

/// PostgreSQL truncates identifiers longer than this (NAMEDATALEN - 1).
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Zero-argument value producer for a column.
pub type Producer = Arc<dyn Fn() -> Result<Value, ProducerError> + Send + Sync>;

/// Immutable description of one column.
///
/// Specs are validated on construction and cheap to clone (the producer is
/// shared).
#[derive(Clone)]
pub struct ColumnSpec {
    name: String,
    domain_type: DomainType,
    constraints: Option<String>,
    producer: Producer,
    reserved: bool,
    protected: bool,
}

impl ColumnSpec {
    /// Create a new column spec.
    ///
    /// The column starts neither reserved nor protected; use
    /// [`ColumnSpec::reserved`] and [`ColumnSpec::protected`] to set the flags
    /// before it is handed to a catalog.
    pub fn new<F>(
        name: impl Into<String>,
        domain_type: DomainType,
        producer: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn() -> Result<Value, ProducerError> + Send + Sync + 'static,
    {
        Self::with_producer(name, domain_type, Arc::new(producer))
    }

    /// Create a new column spec from an already shared producer.
    pub fn with_producer(
        name: impl Into<String>,
        domain_type: DomainType,
        producer: Producer,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        validate_identifier(&name)?;
        Ok(Self {
            name,
            domain_type,
            constraints: None,
            producer,
            reserved: false,
            protected: false,
        })
    }

    /// Set the reserved flag.
    pub fn reserved(mut self, reserved: bool) -> Self {
        self.reserved = reserved;
        self
    }

    /// Set the protected flag.
    pub fn protected(mut self, protected: bool) -> Self {
        self.protected = protected;
        self
    }

    /// Attach a DDL constraint suffix such as `PRIMARY KEY` or `NOT NULL`.
    pub fn with_constraints(mut self, constraints: impl Into<String>) -> Self {
        let constraints = constraints.into();
        let trimmed = constraints.trim();
        self.constraints = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain_type(&self) -> &DomainType {
        &self.domain_type
    }

    pub fn constraints(&self) -> Option<&str> {
        self.constraints.as_deref()
    }

    pub fn is_reserved(&self) -> bool {
        self.reserved
    }

    pub fn is_protected(&self) -> bool {
        self.protected
    }

    /// Produce a fresh value for this column.
    pub fn produce(&self) -> Result<Value, ProducerError> {
        (self.producer)()
    }
}

impl fmt::Debug for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnSpec")
            .field("name", &self.name)
            .field("domain_type", &self.domain_type)
            .field("constraints", &self.constraints)
            .field("reserved", &self.reserved)
            .field("protected", &self.protected)
            .finish_non_exhaustive()
    }
}

/// Check that `name` is a plain SQL identifier.
pub fn validate_identifier(name: &str) -> Result<(), ConfigError> {
    let invalid = |reason| ConfigError::InvalidColumnName {
        name: name.to_string(),
        reason,
    };

    let mut chars = name.chars();
    match chars.next() {
        None => return Err(invalid("name is empty")),
        Some(c) if !(c.is_ascii_alphabetic() || c == '_') => {
            return Err(invalid("must start with a letter or underscore"))
        }
        Some(_) => {}
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid("only ASCII letters, digits and underscores are allowed"));
    }
    if name.len() > MAX_IDENTIFIER_LEN {
        return Err(invalid("longer than 63 bytes"));
    }
    Ok(())
}
