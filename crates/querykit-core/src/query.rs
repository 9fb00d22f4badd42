//! Module: query
//! Responsibility: fluent driver for structured queries and execution routing.
//! Does not own: storage semantics; `QueryExecutor` implementations supply
//! count/list for their entity, honoring descriptor order and page window.
//! Boundary: session-facing API; terminals are the only execution entry.

use crate::{
    descriptor::{PageWindow, QueryDescriptor, ResultShape},
    dispatch::{self, Command, Dispatcher, QueryResult},
    error::QueryError,
    order::{Direction, NullHandling},
};
use std::{any::Any, fmt, sync::Arc};

///
/// QueryExecutor
///
/// The concrete half of a query kind: storage-specific count and list over
/// one result-element type. Paged executions receive the descriptor's window
/// and must apply it themselves; results come back already ordered by the
/// descriptor's clauses (first appended = primary sort key).
///

pub trait QueryExecutor {
    type Context: Any;
    type Item;

    fn execute_count(
        &self,
        context: &Self::Context,
        descriptor: &QueryDescriptor,
    ) -> Result<u64, QueryError>;

    fn execute_list(
        &self,
        context: &Self::Context,
        descriptor: &QueryDescriptor,
        window: Option<PageWindow>,
    ) -> Result<Vec<Self::Item>, QueryError>;
}

///
/// Query
///
/// One structured query: an executor (the concrete filter state), the shared
/// descriptor, and an optional bound dispatcher. Single-owner and never
/// shared across threads; terminals borrow the query, so a built query may be
/// submitted more than once and each submission negotiates its own shape.
///

pub struct Query<X: QueryExecutor> {
    executor: X,
    descriptor: QueryDescriptor,
    dispatcher: Option<Arc<dyn Dispatcher<X::Context>>>,
}

impl<X: QueryExecutor> Query<X> {
    #[must_use]
    pub const fn new(executor: X) -> Self {
        Self {
            executor,
            descriptor: QueryDescriptor::new(),
            dispatcher: None,
        }
    }

    /// Bind a dispatcher; terminals will route through it instead of the
    /// ambient context.
    #[must_use]
    pub fn dispatcher(mut self, dispatcher: Arc<dyn Dispatcher<X::Context>>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    #[must_use]
    pub const fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub const fn executor(&self) -> &X {
        &self.executor
    }

    // ------------------------------------------------------------------
    // Fluent refinement
    // ------------------------------------------------------------------

    /// Refine the concrete executor state in place.
    ///
    /// Concrete query kinds hang their own filter vocabulary off this seam.
    #[must_use]
    pub fn refine(mut self, refine: impl FnOnce(&mut X)) -> Self {
        refine(&mut self.executor);
        self
    }

    /// Record a pending sort property with native null placement.
    #[must_use]
    pub fn order_by(mut self, property: impl Into<String>) -> Self {
        self.descriptor.order_by(property);
        self
    }

    /// Record a pending sort property with explicit null placement.
    #[must_use]
    pub fn order_by_with(
        mut self,
        property: impl Into<String>,
        null_handling: NullHandling,
    ) -> Self {
        self.descriptor.order_by_with(property, null_handling);
        self
    }

    /// Resolve the pending property into an appended ascending clause.
    pub fn asc(self) -> Result<Self, QueryError> {
        self.direction(Direction::Ascending)
    }

    /// Resolve the pending property into an appended descending clause.
    pub fn desc(self) -> Result<Self, QueryError> {
        self.direction(Direction::Descending)
    }

    /// Resolve the pending property with an explicit direction.
    pub fn direction(mut self, direction: Direction) -> Result<Self, QueryError> {
        self.descriptor.direction(direction)?;
        Ok(self)
    }

    /// Resolve the pending property, overriding its null placement.
    pub fn direction_with(
        mut self,
        direction: Direction,
        null_handling: NullHandling,
    ) -> Result<Self, QueryError> {
        self.descriptor.direction_with(direction, null_handling)?;
        Ok(self)
    }

    // ------------------------------------------------------------------
    // Terminals
    // ------------------------------------------------------------------

    /// Execute and return the number of matching rows.
    pub fn count(&self) -> Result<u64, QueryError> {
        self.submit(ResultShape::Count)?.into_count()
    }

    /// Execute and require at most one row; zero rows is `None`, two or more
    /// is a `TooManyResults` contract violation.
    pub fn single_result(&self) -> Result<Option<X::Item>, QueryError> {
        self.submit(ResultShape::Single)?.into_single()
    }

    /// Execute and return the full ordered result list.
    pub fn list(&self) -> Result<Vec<X::Item>, QueryError> {
        self.submit(ResultShape::List)?.into_list()
    }

    /// Execute and return one page of the ordered result list.
    pub fn list_page(&self, first_result: u64, max_results: u64) -> Result<Vec<X::Item>, QueryError> {
        self.submit(ResultShape::Page(PageWindow::new(first_result, max_results)))?
            .into_list()
    }

    // ------------------------------------------------------------------
    // Execution (single semantic boundary)
    // ------------------------------------------------------------------

    fn submit(&self, shape: ResultShape) -> Result<QueryResult<X::Item>, QueryError> {
        // Malformed queries fail here, before any execution reaches storage.
        self.descriptor.check_ready()?;

        let unit = ShapedQuery { query: self, shape };

        dispatch::submit_shaped(self.dispatcher.as_ref(), shape, &unit)
    }
}

// Executor state is opaque here; the descriptor and the dispatch binding are
// what callers need to see.
impl<X: QueryExecutor> fmt::Debug for Query<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("descriptor", &self.descriptor)
            .field("dispatcher", &self.dispatcher.is_some())
            .finish_non_exhaustive()
    }
}

///
/// ShapedQuery
/// A query plus its negotiated shape: the opaque executable unit handed to
/// the gateway. `run_with_context` is the one seam a dispatcher sees.
///

struct ShapedQuery<'a, X: QueryExecutor> {
    query: &'a Query<X>,
    shape: ResultShape,
}

impl<X: QueryExecutor> Command<X::Context> for ShapedQuery<'_, X> {
    type Output = QueryResult<X::Item>;

    fn run_with_context(&self, context: &X::Context) -> Result<Self::Output, QueryError> {
        let Query {
            executor,
            descriptor,
            ..
        } = self.query;

        dispatch::run_shape(
            self.shape,
            || executor.execute_count(context, descriptor),
            || executor.execute_list(context, descriptor, self.shape.window()),
        )
    }
}
