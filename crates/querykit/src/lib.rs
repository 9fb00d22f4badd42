//! ## Crate layout
//! - `core`: descriptors, ordering vocabulary, ambient contexts, dispatch,
//!   shape negotiation, and the raw-statement variant.
//! - `error`: the stable public error taxonomy layered over core errors.
//!
//! The `prelude` module mirrors the surface a concrete query kind uses when
//! plugging into the shared pipeline.

pub use querykit_core as core;

pub mod error;

pub use error::{Error, ErrorKind, ErrorOrigin};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::{
        core::{
            descriptor::{PageWindow, QueryDescriptor, ResultShape},
            dispatch::{Command as _, Dispatcher, QueryResult},
            order::{Direction, NullHandling, OrderClause, OrderClauses},
            query::{Query, QueryExecutor},
            raw::{RawQuery, Statement, StatementExecutor},
            value::Value,
        },
        Error, ErrorKind, ErrorOrigin,
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn version_matches_manifest() {
        assert_eq!(crate::VERSION, env!("CARGO_PKG_VERSION"));
    }
}
