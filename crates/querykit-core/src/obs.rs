//! Module: obs
//! Responsibility: dispatch instrumentation boundary.
//! Does not own: dispatch semantics; recording never changes results.
//! Boundary: gateway code emits `DispatchEvent` only; sinks interpret them.

use crate::descriptor::ResultShape;
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn EventSink>>> = const { RefCell::new(None) };
    static COUNTERS: RefCell<DispatchCounters> = const { RefCell::new(DispatchCounters::new()) };
}

///
/// ShapeKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ShapeKind {
    Count,
    Single,
    List,
    Page,
}

impl From<ResultShape> for ShapeKind {
    fn from(shape: ResultShape) -> Self {
        match shape {
            ResultShape::Count => Self::Count,
            ResultShape::Single => Self::Single,
            ResultShape::List => Self::List,
            ResultShape::Page(_) => Self::Page,
        }
    }
}

///
/// DispatchPath
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DispatchPath {
    Dispatcher,
    Ambient,
}

///
/// DispatchEvent
///

#[derive(Clone, Copy, Debug)]
pub enum DispatchEvent {
    Start {
        path: DispatchPath,
        shape: ShapeKind,
    },
    Finish {
        path: DispatchPath,
        shape: ShapeKind,
        ok: bool,
    },
}

///
/// EventSink
///

pub trait EventSink {
    fn record(&self, event: DispatchEvent);
}

///
/// DispatchCounters
///
/// Default per-thread accounting when no scoped sink is installed.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DispatchCounters {
    pub count_queries: u64,
    pub single_queries: u64,
    pub list_queries: u64,
    pub page_queries: u64,
    pub failures: u64,
}

impl DispatchCounters {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            count_queries: 0,
            single_queries: 0,
            list_queries: 0,
            page_queries: 0,
            failures: 0,
        }
    }

    const fn apply(&mut self, event: DispatchEvent) {
        match event {
            DispatchEvent::Start { shape, .. } => match shape {
                ShapeKind::Count => self.count_queries = self.count_queries.saturating_add(1),
                ShapeKind::Single => self.single_queries = self.single_queries.saturating_add(1),
                ShapeKind::List => self.list_queries = self.list_queries.saturating_add(1),
                ShapeKind::Page => self.page_queries = self.page_queries.saturating_add(1),
            },
            DispatchEvent::Finish { ok, .. } => {
                if !ok {
                    self.failures = self.failures.saturating_add(1);
                }
            }
        }
    }
}

pub(crate) fn record(event: DispatchEvent) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match sink {
        Some(sink) => sink.record(event),
        None => COUNTERS.with(|cell| cell.borrow_mut().apply(event)),
    }
}

/// Run a closure with a temporary event sink override on this thread.
///
/// The previous sink is restored on all exits, including unwind.
pub fn with_sink<T>(sink: Rc<dyn EventSink>, scope: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn EventSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let previous = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = previous;
            });
        }
    }

    let previous = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(previous);

    scope()
}

/// Snapshot this thread's dispatch counters.
#[must_use]
pub fn counters() -> DispatchCounters {
    COUNTERS.with(|cell| *cell.borrow())
}

/// Reset this thread's dispatch counters.
pub fn reset_counters() {
    COUNTERS.with(|cell| {
        *cell.borrow_mut() = DispatchCounters::new();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    struct Capture {
        events: RefCell<Vec<DispatchEvent>>,
    }

    impl EventSink for Capture {
        fn record(&self, event: DispatchEvent) {
            self.events.borrow_mut().push(event);
        }
    }

    #[test]
    fn default_sink_accumulates_counters() {
        reset_counters();

        record(DispatchEvent::Start {
            path: DispatchPath::Ambient,
            shape: ShapeKind::Count,
        });
        record(DispatchEvent::Finish {
            path: DispatchPath::Ambient,
            shape: ShapeKind::Count,
            ok: false,
        });

        let counters = counters();
        assert_eq!(counters.count_queries, 1);
        assert_eq!(counters.failures, 1);
    }

    #[test]
    fn scoped_sink_captures_and_restores() {
        reset_counters();
        let capture = Rc::new(Capture {
            events: RefCell::new(Vec::new()),
        });

        with_sink(capture.clone(), || {
            record(DispatchEvent::Start {
                path: DispatchPath::Dispatcher,
                shape: ShapeKind::List,
            });
        });

        assert_eq!(capture.events.borrow().len(), 1);
        // Counters were bypassed while the override was installed.
        assert_eq!(counters(), DispatchCounters::new());

        record(DispatchEvent::Start {
            path: DispatchPath::Ambient,
            shape: ShapeKind::List,
        });
        assert_eq!(counters().list_queries, 1);
    }

    #[test]
    fn override_is_restored_after_panic() {
        reset_counters();
        let capture = Rc::new(Capture {
            events: RefCell::new(Vec::new()),
        });

        let panicked = catch_unwind(AssertUnwindSafe(|| {
            with_sink(capture, || {
                panic!("intentional panic for guard test");
            });
        }))
        .is_err();
        assert!(panicked);

        record(DispatchEvent::Start {
            path: DispatchPath::Ambient,
            shape: ShapeKind::Single,
        });
        assert_eq!(counters().single_queries, 1);
    }
}
