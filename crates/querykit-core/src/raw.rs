//! Module: raw
//! Responsibility: raw-statement query variant: literal statement plus named
//! parameters, with the same shape negotiation and dual-path dispatch as
//! structured queries.
//! Does not own: statement parsing or parameter binding; executors do both.
//! Boundary: executors only ever see an immutable `Statement` snapshot.

use crate::{
    descriptor::{PageWindow, ResultShape},
    dispatch::{self, Command, Dispatcher, QueryResult},
    error::{QueryError, UsageError},
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::{any::Any, collections::BTreeMap, fmt, sync::Arc};

///
/// Statement
///
/// Immutable snapshot of a raw query: literal text plus a name→value map.
/// Materialized once per execution, so mutation of the builder after
/// submission cannot affect an in-flight execution.
///

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Statement {
    text: String,
    parameters: BTreeMap<String, Value>,
}

impl Statement {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn parameters(&self) -> &BTreeMap<String, Value> {
        &self.parameters
    }

    /// Look up one named parameter.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }
}

///
/// StatementExecutor
///
/// Storage contract for raw queries. Every method receives the snapshot, and
/// paged executions must apply the window themselves.
///

pub trait StatementExecutor {
    type Context: Any;
    type Item;

    fn execute_count(
        &self,
        context: &Self::Context,
        statement: &Statement,
    ) -> Result<u64, QueryError>;

    fn execute_list(
        &self,
        context: &Self::Context,
        statement: &Statement,
        window: Option<PageWindow>,
    ) -> Result<Vec<Self::Item>, QueryError>;
}

///
/// RawQuery
///
/// Builder for one raw-statement query. Single-owner, like the structured
/// driver; each terminal submission takes its own statement snapshot.
///

pub struct RawQuery<X: StatementExecutor> {
    executor: X,
    statement: Option<String>,
    parameters: BTreeMap<String, Value>,
    dispatcher: Option<Arc<dyn Dispatcher<X::Context>>>,
}

impl<X: StatementExecutor> RawQuery<X> {
    #[must_use]
    pub const fn new(executor: X) -> Self {
        Self {
            executor,
            statement: None,
            parameters: BTreeMap::new(),
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

    #[must_use]
    pub const fn executor(&self) -> &X {
        &self.executor
    }

    // ------------------------------------------------------------------
    // Fluent refinement
    // ------------------------------------------------------------------

    /// Set the literal statement, overwriting any previous one.
    #[must_use]
    pub fn statement(mut self, text: impl Into<String>) -> Self {
        self.statement = Some(text.into());
        self
    }

    /// Upsert one named parameter; re-setting a name overwrites its value.
    #[must_use]
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Materialize the current statement and parameters into a snapshot.
    pub fn snapshot(&self) -> Result<Statement, QueryError> {
        let Some(text) = &self.statement else {
            return Err(UsageError::MissingStatement.into());
        };

        Ok(Statement {
            text: text.clone(),
            parameters: self.parameters.clone(),
        })
    }

    // ------------------------------------------------------------------
    // Terminals
    // ------------------------------------------------------------------

    /// Execute and return the number of matching rows.
    pub fn count(&self) -> Result<u64, QueryError> {
        self.submit(ResultShape::Count)?.into_count()
    }

    /// Execute and require at most one row.
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

    fn submit(&self, shape: ResultShape) -> Result<QueryResult<X::Item>, QueryError> {
        // Snapshot once, before dispatch; executors never see the live map.
        let statement = self.snapshot()?;
        let unit = ShapedStatement {
            executor: &self.executor,
            statement,
            shape,
        };

        dispatch::submit_shaped(self.dispatcher.as_ref(), shape, &unit)
    }
}

impl<X: StatementExecutor> fmt::Debug for RawQuery<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawQuery")
            .field("statement", &self.statement)
            .field("parameters", &self.parameters)
            .field("dispatcher", &self.dispatcher.is_some())
            .finish_non_exhaustive()
    }
}

///
/// ShapedStatement
/// Executable unit for the gateway: executor, snapshot, and negotiated shape.
///

struct ShapedStatement<'a, X: StatementExecutor> {
    executor: &'a X,
    statement: Statement,
    shape: ResultShape,
}

impl<X: StatementExecutor> Command<X::Context> for ShapedStatement<'_, X> {
    type Output = QueryResult<X::Item>;

    fn run_with_context(&self, context: &X::Context) -> Result<Self::Output, QueryError> {
        dispatch::run_shape(
            self.shape,
            || self.executor.execute_count(context, &self.statement),
            || {
                self.executor
                    .execute_list(context, &self.statement, self.shape.window())
            },
        )
    }
}
