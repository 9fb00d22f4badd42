//! Module: dispatch
//! Responsibility: command gateway, dispatcher seam, and result-shape routing.
//! Does not own: descriptor state or concrete count/list implementations.
//! Boundary: the one place that interprets `ResultShape`; both the dispatcher
//! path and the ambient path run through the same shape dispatch.

use crate::{
    ambient,
    descriptor::ResultShape,
    error::{DispatchError, QueryError, ResultError},
    obs::{self, DispatchEvent, DispatchPath},
};
use std::{any::Any, sync::Arc};

///
/// QueryResult
///
/// Sum of the negotiated result shapes. `Page` executions come back as
/// `List`: the window is applied by the concrete executor, not sliced here.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum QueryResult<T> {
    Count(u64),
    Single(Option<T>),
    List(Vec<T>),
}

impl<T> QueryResult<T> {
    pub fn into_count(self) -> Result<u64, QueryError> {
        match self {
            Self::Count(count) => Ok(count),
            Self::Single(_) | Self::List(_) => Err(DispatchError::ShapeMismatch.into()),
        }
    }

    pub fn into_single(self) -> Result<Option<T>, QueryError> {
        match self {
            Self::Single(item) => Ok(item),
            Self::Count(_) | Self::List(_) => Err(DispatchError::ShapeMismatch.into()),
        }
    }

    pub fn into_list(self) -> Result<Vec<T>, QueryError> {
        match self {
            Self::List(items) => Ok(items),
            Self::Count(_) | Self::Single(_) => Err(DispatchError::ShapeMismatch.into()),
        }
    }
}

///
/// Command
///
/// The single polymorphic entry point a dispatcher needs to know about.
/// Behavior behind `run_with_context` is entirely determined by the
/// descriptor's result shape.
///

pub trait Command<C> {
    type Output;

    fn run_with_context(&self, context: &C) -> Result<Self::Output, QueryError>;
}

///
/// Dispatcher
///
/// Collaborator that establishes whatever execution context it needs
/// (transaction, interceptor chain) and invokes the submitted scope exactly
/// once within it. Opaque to this core beyond that obligation.
///

pub trait Dispatcher<C> {
    fn submit(&self, scope: &mut dyn FnMut(&C));
}

/// Run `command` through `dispatcher` when one is bound, or inline against
/// the ambient context otherwise.
///
/// Both paths invoke the command's `run_with_context`, so they produce
/// identical results for identical descriptor state.
pub fn dispatch<C, Cmd>(
    dispatcher: Option<&Arc<dyn Dispatcher<C>>>,
    command: &Cmd,
) -> Result<Cmd::Output, QueryError>
where
    C: Any,
    Cmd: Command<C>,
{
    match dispatcher {
        Some(dispatcher) => {
            let mut outcome = None;
            dispatcher.submit(&mut |context| {
                outcome = Some(command.run_with_context(context));
            });

            match outcome {
                Some(result) => result,
                None => Err(DispatchError::DispatcherDidNotRun.into()),
            }
        }
        None => ambient::with_current(|context| command.run_with_context(context))?,
    }
}

/// Gateway entry used by the query drivers: `dispatch` plus instrumentation.
pub(crate) fn submit_shaped<C, Cmd>(
    dispatcher: Option<&Arc<dyn Dispatcher<C>>>,
    shape: ResultShape,
    command: &Cmd,
) -> Result<Cmd::Output, QueryError>
where
    C: Any,
    Cmd: Command<C>,
{
    let path = if dispatcher.is_some() {
        DispatchPath::Dispatcher
    } else {
        DispatchPath::Ambient
    };

    obs::record(DispatchEvent::Start {
        path,
        shape: shape.into(),
    });
    let result = dispatch(dispatcher, command);
    obs::record(DispatchEvent::Finish {
        path,
        shape: shape.into(),
        ok: result.is_ok(),
    });

    result
}

/// Route one execution to the matching abstract method.
///
/// `Single` runs the list path and then enforces cardinality: zero rows is an
/// absent result, two or more is a contract violation carrying the count.
pub(crate) fn run_shape<T>(
    shape: ResultShape,
    count: impl FnOnce() -> Result<u64, QueryError>,
    list: impl FnOnce() -> Result<Vec<T>, QueryError>,
) -> Result<QueryResult<T>, QueryError> {
    match shape {
        ResultShape::Count => Ok(QueryResult::Count(count()?)),
        ResultShape::List | ResultShape::Page(_) => Ok(QueryResult::List(list()?)),
        ResultShape::Single => {
            let mut rows = list()?;
            match rows.len() {
                0 => Ok(QueryResult::Single(None)),
                1 => Ok(QueryResult::Single(rows.pop())),
                count => Err(ResultError::TooManyResults { count }.into()),
            }
        }
    }
}
