//! Core protocol for querykit: order clauses, query descriptors, ambient
//! execution contexts, command dispatch, and result-shape negotiation.
//!
//! Concrete query kinds supply count/list storage implementations; this crate
//! owns everything they share: the fluent ordering contract, pagination
//! windows, the dual-path command gateway, and single-result cardinality
//! enforcement.
#![warn(unreachable_pub)]

pub mod ambient;
pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod obs;
pub mod order;
pub mod query;
pub mod raw;
pub mod value;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No sinks, gateways, or internal routing types are re-exported here.
///

pub mod prelude {
    pub use crate::{
        descriptor::{PageWindow, QueryDescriptor, ResultShape},
        dispatch::{Command, Dispatcher, QueryResult},
        error::QueryError,
        order::{Direction, NullHandling, OrderClause, OrderClauses},
        query::{Query, QueryExecutor},
        raw::{RawQuery, Statement, StatementExecutor},
        value::Value,
    };
}
