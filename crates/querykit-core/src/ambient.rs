//! Module: ambient
//! Responsibility: thread-local registry of active execution contexts.
//! Does not own: context construction or teardown; the surrounding execution
//! machinery establishes contexts and this module only reads them.
//! Boundary: the single compatibility fallback used when no dispatcher is bound.

use crate::error::DispatchError;
use std::{any::Any, cell::RefCell};

thread_local! {
    static ACTIVE: RefCell<Vec<*const dyn Any>> = const { RefCell::new(Vec::new()) };
}

/// Run `scope` with `context` installed as the innermost ambient context for
/// the current thread.
///
/// Entries nest: an inner `enter` shadows the outer context until it returns.
/// The slot is restored on all exits, including unwind.
pub fn enter<C, T>(context: &C, scope: impl FnOnce() -> T) -> T
where
    C: Any,
{
    struct Guard;

    impl Drop for Guard {
        fn drop(&mut self) {
            ACTIVE.with(|cell| {
                cell.borrow_mut().pop();
            });
        }
    }

    let any: &dyn Any = context;
    let ptr: *const dyn Any = any;
    ACTIVE.with(|cell| cell.borrow_mut().push(ptr));
    let _guard = Guard;

    scope()
}

/// Run `read` against the innermost ambient context, expected to be a `C`.
///
/// Fails with `NoAmbientContext` when nothing is active on this thread, and
/// with `ContextTypeMismatch` when the innermost context is some other type.
pub fn with_current<C, T>(read: impl FnOnce(&C) -> T) -> Result<T, DispatchError>
where
    C: Any,
{
    // Copy the pointer out before invoking `read` so a nested `enter` inside
    // the closure cannot observe a held RefCell borrow.
    let ptr = ACTIVE.with(|cell| cell.borrow().last().copied());
    let Some(ptr) = ptr else {
        return Err(DispatchError::NoAmbientContext);
    };

    // SAFETY:
    // Preconditions:
    // - `ptr` was pushed by `enter` from a live `&C` borrow.
    // - `enter` pops the entry before that borrow ends, on normal return and
    //   on unwind via `Guard::drop`, so a pointer read off the stack is never
    //   dangling.
    // - This function dereferences synchronously and never stores `ptr`.
    //
    // Aliasing:
    // - Only a shared reference is materialized, matching the shared borrow
    //   installed by `enter`; no mutable alias is created here.
    //
    // What would break this:
    // - `enter` failing to pop on some exit path.
    // - Storing or returning `ptr` beyond this call.
    let any = unsafe { &*ptr };

    match any.downcast_ref::<C>() {
        Some(context) => Ok(read(context)),
        None => Err(DispatchError::ContextTypeMismatch),
    }
}

/// True when any context is active on the current thread.
#[must_use]
pub fn is_active() -> bool {
    ACTIVE.with(|cell| !cell.borrow().is_empty())
}
