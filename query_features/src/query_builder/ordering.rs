//! Sort keys

use crate::validation::{FieldPath, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Missing fields sort lowest, like an absent value in a document store
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC NULLS FIRST",
            SortOrder::Desc => "DESC NULLS LAST",
        }
    }
}

/// One key of a multi-key sort
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: FieldPath,
    pub order: SortOrder,
}

impl SortKey {
    pub fn new(field: FieldPath, order: SortOrder) -> Self {
        Self { field, order }
    }

    /// Parse `price` or `-price`
    pub fn parse(token: &str) -> Result<Self, ValidationError> {
        let token = token.trim();
        match token.strip_prefix('-') {
            Some(name) => Ok(Self::new(FieldPath::new(name)?, SortOrder::Desc)),
            None => Ok(Self::new(FieldPath::new(token)?, SortOrder::Asc)),
        }
    }
}
