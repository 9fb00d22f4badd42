//! Module: descriptor
//! Responsibility: mutable builder state for one not-yet-executed query.
//! Does not own: execution routing or result-shape interpretation.
//! Boundary: single-owner; concurrent mutation is unsupported.

use crate::{
    error::UsageError,
    order::{Direction, NullHandling, OrderClause, OrderClauses},
};
use serde::{Deserialize, Serialize};

///
/// PageWindow
///
/// Pagination window: 0-based offset plus result cap.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
pub struct PageWindow {
    pub first_result: u64,
    pub max_results: u64,
}

impl PageWindow {
    #[must_use]
    pub const fn new(first_result: u64, max_results: u64) -> Self {
        Self {
            first_result,
            max_results,
        }
    }
}

///
/// ResultShape
///
/// The terminal operation requested for one execution. Shape-specific fields
/// live on the variant, so an unset or half-set window is unrepresentable.
/// Dispatch over this enum is an exhaustive match; adding a shape is a
/// compile-time-checked change.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResultShape {
    Count,
    Single,
    List,
    Page(PageWindow),
}

impl ResultShape {
    /// The pagination window, when this shape carries one.
    #[must_use]
    pub const fn window(self) -> Option<PageWindow> {
        match self {
            Self::Page(window) => Some(window),
            Self::Count | Self::Single | Self::List => None,
        }
    }
}

///
/// PendingOrder
/// The property named by the most recent `order_by` call, not yet paired
/// with a direction.
///

#[derive(Clone, Debug, Eq, PartialEq)]
struct PendingOrder {
    property: String,
    null_handling: NullHandling,
}

///
/// QueryDescriptor
///
/// Ordering state shared by every structured query kind. Constructed fresh
/// per logical query and mutated through the fluent chain by one caller;
/// terminals read it without consuming it.
///

#[derive(Clone, Debug, Default)]
pub struct QueryDescriptor {
    pending_order: Option<PendingOrder>,
    orders: OrderClauses,
}

impl QueryDescriptor {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending_order: None,
            orders: OrderClauses::new(),
        }
    }

    // ------------------------------------------------------------------
    // Fluent mutation
    // ------------------------------------------------------------------

    /// Record a pending sort property with native null placement.
    ///
    /// A previous unresolved `order_by` is replaced, not rejected here; the
    /// unresolved slot is caught by `check_ready` at the next terminal call.
    pub fn order_by(&mut self, property: impl Into<String>) {
        self.order_by_with(property, NullHandling::Native);
    }

    /// Record a pending sort property with explicit null placement.
    pub fn order_by_with(&mut self, property: impl Into<String>, null_handling: NullHandling) {
        self.pending_order = Some(PendingOrder {
            property: property.into(),
            null_handling,
        });
    }

    /// Resolve the pending property into an appended order clause.
    ///
    /// This is the only mutator that appends to the order list.
    pub fn direction(&mut self, direction: Direction) -> Result<(), UsageError> {
        let Some(pending) = self.pending_order.take() else {
            return Err(UsageError::DirectionWithoutOrderBy);
        };

        self.orders.push(OrderClause::new(
            pending.property,
            direction,
            pending.null_handling,
        ));

        Ok(())
    }

    /// Resolve the pending property, overriding its null placement.
    pub fn direction_with(
        &mut self,
        direction: Direction,
        null_handling: NullHandling,
    ) -> Result<(), UsageError> {
        let Some(pending) = self.pending_order.as_mut() else {
            return Err(UsageError::DirectionWithoutOrderBy);
        };
        pending.null_handling = null_handling;

        self.direction(direction)
    }

    pub fn asc(&mut self) -> Result<(), UsageError> {
        self.direction(Direction::Ascending)
    }

    pub fn desc(&mut self) -> Result<(), UsageError> {
        self.direction(Direction::Descending)
    }

    // ------------------------------------------------------------------
    // Inspection / validation
    // ------------------------------------------------------------------

    /// Appended order clauses in call order (first = primary sort key).
    #[must_use]
    pub const fn orders(&self) -> &OrderClauses {
        &self.orders
    }

    /// Property awaiting a direction, if any.
    #[must_use]
    pub fn pending_property(&self) -> Option<&str> {
        self.pending_order
            .as_ref()
            .map(|pending| pending.property.as_str())
    }

    #[must_use]
    pub const fn has_pending_order(&self) -> bool {
        self.pending_order.is_some()
    }

    /// Terminal-call guard: a pending order left unresolved makes the query
    /// malformed, and it must fail before reaching storage.
    pub fn check_ready(&self) -> Result<(), UsageError> {
        match &self.pending_order {
            Some(pending) => Err(UsageError::PendingOrder {
                property: pending.property.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn balanced_pairs_append_in_call_order() {
        let mut descriptor = QueryDescriptor::new();
        descriptor.order_by("name");
        descriptor.asc().unwrap();
        descriptor.order_by("age");
        descriptor.desc().unwrap();

        assert!(!descriptor.has_pending_order());
        let properties: Vec<&str> = descriptor
            .orders()
            .iter()
            .map(OrderClause::property)
            .collect();
        assert_eq!(properties, vec!["name", "age"]);
        assert_eq!(descriptor.orders()[1].direction(), Direction::Descending);
    }

    #[test]
    fn direction_without_order_by_is_a_usage_error() {
        let mut descriptor = QueryDescriptor::new();
        assert_eq!(
            descriptor.asc().unwrap_err(),
            UsageError::DirectionWithoutOrderBy
        );
        assert_eq!(
            descriptor.direction(Direction::Descending).unwrap_err(),
            UsageError::DirectionWithoutOrderBy
        );
    }

    #[test]
    fn pending_order_fails_check_ready() {
        let mut descriptor = QueryDescriptor::new();
        descriptor.order_by("created_at");

        assert_eq!(
            descriptor.check_ready().unwrap_err(),
            UsageError::PendingOrder {
                property: "created_at".to_string()
            }
        );
    }

    #[test]
    fn repeated_order_by_replaces_the_pending_slot() {
        let mut descriptor = QueryDescriptor::new();
        descriptor.order_by("a");
        descriptor.order_by("b");
        descriptor.desc().unwrap();

        assert_eq!(descriptor.orders().len(), 1);
        assert_eq!(descriptor.orders()[0].property(), "b");
    }

    #[test]
    fn direction_with_overrides_null_placement() {
        let mut descriptor = QueryDescriptor::new();
        descriptor.order_by_with("score", NullHandling::NullsFirst);
        descriptor
            .direction_with(Direction::Ascending, NullHandling::NullsLast)
            .unwrap();

        assert_eq!(
            descriptor.orders()[0].null_handling(),
            NullHandling::NullsLast
        );
    }

    #[test]
    fn order_by_with_keeps_null_placement_through_direction() {
        let mut descriptor = QueryDescriptor::new();
        descriptor.order_by_with("score", NullHandling::NullsFirst);
        descriptor.asc().unwrap();

        assert_eq!(
            descriptor.orders()[0].null_handling(),
            NullHandling::NullsFirst
        );
    }

    #[test]
    fn page_shape_carries_its_window() {
        let shape = ResultShape::Page(PageWindow::new(20, 10));
        assert_eq!(shape.window(), Some(PageWindow::new(20, 10)));
        assert_eq!(ResultShape::List.window(), None);
    }

    proptest! {
        #[test]
        fn n_balanced_pairs_yield_n_clauses(
            pairs in prop::collection::vec(("[a-z]{1,8}", prop::bool::ANY), 0..32)
        ) {
            let mut descriptor = QueryDescriptor::new();
            for (property, descending) in &pairs {
                descriptor.order_by(property.clone());
                if *descending {
                    descriptor.desc().unwrap();
                } else {
                    descriptor.asc().unwrap();
                }
            }

            prop_assert!(descriptor.check_ready().is_ok());
            prop_assert_eq!(descriptor.orders().len(), pairs.len());
            for (clause, (property, descending)) in descriptor.orders().iter().zip(&pairs) {
                prop_assert_eq!(clause.property(), property.as_str());
                let expected = if *descending {
                    Direction::Descending
                } else {
                    Direction::Ascending
                };
                prop_assert_eq!(clause.direction(), expected);
            }
        }
    }
}
