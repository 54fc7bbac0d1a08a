//! Field projection

use crate::validation::FieldPath;

/// Fields returned for each matching document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Projection {
    /// Whole documents
    #[default]
    All,
    /// Only these fields
    Include(Vec<FieldPath>),
    /// Everything except these fields
    Exclude(Vec<FieldPath>),
}

impl Projection {
    pub fn is_all(&self) -> bool {
        matches!(self, Projection::All)
    }
}
