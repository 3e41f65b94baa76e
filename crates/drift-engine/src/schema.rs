//! Schema state machine.
//!
//! Tracks which catalog columns are materialized in the table. Every column
//! has a membership status:
//!
//! ```text
//!  reserved ──► InReserve ──promote──► Active ──demote──► Dropped
//!                                        ▲                  │
//!  not reserved ─────────────────────────┤                  │
//!                                        └─────promote──────┘
//!                                          (reserved only)
//! ```
//!
//! The active set is always re-derived from the catalog and the status table,
//! in catalog order. Each successful structural change bumps the version by
//! one and records a snapshot of the active column names.

use drift_core::{choose, Catalog, ColumnSpec, RandomSource};

/// Membership of one catalog column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnStatus {
    /// Reserved and not yet part of the table
    InReserve,
    /// Materialized in the table
    Active,
    /// Removed from the table; only reserved columns may come back
    Dropped,
}

/// Owned schema state. Only promote/demote change it.
#[derive(Debug, Clone)]
pub struct SchemaState {
    catalog: Catalog,
    status: Vec<ColumnStatus>,
    active: Vec<usize>,
    version: u64,
    history: Vec<Vec<String>>,
}

impl SchemaState {
    /// Initialize from a catalog: every non-reserved column is active.
    ///
    /// The catalog is non-empty by construction.
    pub fn initialize(catalog: Catalog) -> Self {
        let status = catalog
            .iter()
            .map(|column| {
                if column.is_reserved() {
                    ColumnStatus::InReserve
                } else {
                    ColumnStatus::Active
                }
            })
            .collect();

        let mut state = Self {
            catalog,
            status,
            active: Vec::new(),
            version: 1,
            history: Vec::new(),
        };
        state.rederive_active();
        let snapshot = state.snapshot();
        state.history.push(snapshot);
        state
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Active-name snapshots, one per version; index 0 is the initial state.
    pub fn history(&self) -> &[Vec<String>] {
        &self.history
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Active column specs in catalog order.
    pub fn active(&self) -> impl Iterator<Item = &ColumnSpec> + '_ {
        self.active.iter().filter_map(|&i| self.catalog.at(i))
    }

    /// Active column names in catalog order.
    pub fn active_names(&self) -> Vec<&str> {
        self.active().map(|column| column.name()).collect()
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Active column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        let i = self.catalog.position(name)?;
        if self.status[i] == ColumnStatus::Active {
            self.catalog.at(i)
        } else {
            None
        }
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.status_of(name) == Some(ColumnStatus::Active)
    }

    /// Membership of a catalog column, or `None` if the name is unknown.
    pub fn status_of(&self, name: &str) -> Option<ColumnStatus> {
        self.catalog.position(name).map(|i| self.status[i])
    }

    /// Reserved catalog columns not currently active, in catalog order.
    pub fn promotion_candidates(&self) -> Vec<&str> {
        self.catalog
            .iter()
            .zip(&self.status)
            .filter(|(column, status)| column.is_reserved() && **status != ColumnStatus::Active)
            .map(|(column, _)| column.name())
            .collect()
    }

    /// Active columns that are not protected, in catalog order.
    pub fn demotion_candidates(&self) -> Vec<&str> {
        self.active()
            .filter(|column| !column.is_protected())
            .map(|column| column.name())
            .collect()
    }

    /// Pick a promotion candidate without changing state.
    pub fn promotion_candidate(&self, rng: &mut dyn RandomSource) -> Option<String> {
        choose(rng, &self.promotion_candidates()).map(|name| name.to_string())
    }

    /// Pick a demotion candidate without changing state.
    pub fn demotion_candidate(&self, rng: &mut dyn RandomSource) -> Option<String> {
        choose(rng, &self.demotion_candidates()).map(|name| name.to_string())
    }

    /// Activate `name`. Returns the new version, or `None` if `name` is not a
    /// promotion candidate.
    pub fn commit_promotion(&mut self, name: &str) -> Option<u64> {
        let i = self.catalog.position(name)?;
        let column = self.catalog.at(i)?;
        if !column.is_reserved() || self.status[i] == ColumnStatus::Active {
            return None;
        }
        self.status[i] = ColumnStatus::Active;
        Some(self.bump())
    }

    /// Drop `name`. Returns the new version, or `None` if `name` is not a
    /// demotion candidate.
    pub fn commit_demotion(&mut self, name: &str) -> Option<u64> {
        let i = self.catalog.position(name)?;
        let column = self.catalog.at(i)?;
        if column.is_protected() || self.status[i] != ColumnStatus::Active {
            return None;
        }
        self.status[i] = ColumnStatus::Dropped;
        Some(self.bump())
    }

    /// Promote a uniformly chosen candidate, or `None` if there is none.
    pub fn promote(&mut self, rng: &mut dyn RandomSource) -> Option<String> {
        let name = self.promotion_candidate(rng)?;
        self.commit_promotion(&name)?;
        Some(name)
    }

    /// Demote a uniformly chosen candidate, or `None` if there is none.
    pub fn demote(&mut self, rng: &mut dyn RandomSource) -> Option<String> {
        let name = self.demotion_candidate(rng)?;
        self.commit_demotion(&name)?;
        Some(name)
    }

    fn bump(&mut self) -> u64 {
        self.rederive_active();
        self.version += 1;
        let snapshot = self.snapshot();
        self.history.push(snapshot);
        self.version
    }

    fn rederive_active(&mut self) {
        self.active = self
            .status
            .iter()
            .enumerate()
            .filter(|(_, status)| **status == ColumnStatus::Active)
            .map(|(i, _)| i)
            .collect();
    }

    fn snapshot(&self) -> Vec<String> {
        self.active_names().into_iter().map(String::from).collect()
    }
}
