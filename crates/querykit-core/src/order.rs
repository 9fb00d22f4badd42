//! Module: order
//! Responsibility: immutable ordering vocabulary shared by descriptors and executors.
//! Does not own: pending-order bookkeeping or terminal validation.
//! Boundary: value types only; no execution logic.

use derive_more::{Deref, IntoIterator};
use serde::{Deserialize, Serialize};

///
/// Direction
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    /// Conventional lowercase keyword for this direction.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

///
/// NullHandling
///
/// How rows with an absent value for the sort property are placed.
/// `Native` defers to whatever the storage backend does by default.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
pub enum NullHandling {
    #[default]
    Native,
    NullsFirst,
    NullsLast,
}

///
/// OrderClause
///
/// One (property, direction, null-handling) sort key.
/// Immutable once appended to a descriptor's order list.
///

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct OrderClause {
    property: String,
    direction: Direction,
    null_handling: NullHandling,
}

impl OrderClause {
    #[must_use]
    pub fn new(
        property: impl Into<String>,
        direction: Direction,
        null_handling: NullHandling,
    ) -> Self {
        Self {
            property: property.into(),
            direction,
            null_handling,
        }
    }

    /// Property identifier this clause sorts on.
    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub const fn null_handling(&self) -> NullHandling {
        self.null_handling
    }
}

///
/// OrderClauses
///
/// Insertion-ordered sort keys; the first appended clause is the primary key.
/// Storage executors must honor this order as tie-break precedence.
///

#[derive(Clone, Debug, Default, Deref, Eq, IntoIterator, PartialEq, Deserialize, Serialize)]
pub struct OrderClauses(Vec<OrderClause>);

impl OrderClauses {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub(crate) fn push(&mut self, clause: OrderClause) {
        self.0.push(clause);
    }
}

impl<'a> IntoIterator for &'a OrderClauses {
    type Item = &'a OrderClause;
    type IntoIter = std::slice::Iter<'a, OrderClause>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
