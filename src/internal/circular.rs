//! Resolution-stack guard for circular dependency detection.
//!
//! The registration-time graph check in `registry::resolver` cannot see
//! cycles introduced through late or factory registrations, so every
//! resolve also runs against a thread-local stack of in-progress
//! resolutions. The stack is torn down as each call returns, whether it
//! succeeds or unwinds.

use std::cell::RefCell;
use std::panic;

const MAX_DEPTH: usize = 1024;

thread_local! {
    static RESOLUTION_TLS: RefCell<ResolutionTls> = RefCell::new(ResolutionTls::default());
}

#[derive(Default)]
struct ResolutionTls {
    stack: Vec<&'static str>,
    depth: usize,
}

/// Panic payload for circular dependency detection.
///
/// When a cycle is detected on the resolution stack, this payload carries
/// the complete stack-to-type path, e.g.
/// `["ServiceA", "ServiceB", "ServiceC", "ServiceA"]`.
#[derive(Debug)]
pub struct CircularPanic {
    /// The complete circular dependency path showing the cycle.
    pub path: Box<[&'static str]>,
}

impl CircularPanic {
    fn new(path: Vec<&'static str>) -> Self {
        CircularPanic { path: path.into_boxed_slice() }
    }
}

/// Pushes a type name on entry and pops it on drop.
///
/// The pop also runs during unwinding, so a caught cycle leaves the
/// thread-local stack exactly as the surviving frames expect it.
pub(crate) struct StackGuard {
    name: &'static str,
}

impl StackGuard {
    pub(crate) fn new(name: &'static str) -> Self {
        RESOLUTION_TLS.with(|tls| {
            let mut tls = tls.borrow_mut();

            // Cycle check BEFORE pushing the new name: re-entry means the
            // path from the stack through this type is circular.
            if tls.stack.iter().any(|&n| n == name) {
                let mut path = tls.stack.clone();
                path.push(name);
                drop(tls);
                panic::panic_any(CircularPanic::new(path));
            }

            if tls.depth >= MAX_DEPTH {
                let depth = tls.depth;
                drop(tls);
                panic::panic_any(crate::error::DiError::DepthExceeded(depth));
            }

            tls.stack.push(name);
            tls.depth += 1;
        });

        Self { name }
    }
}

/// Depth of the current thread's resolution stack. Zero means this is a
/// top-level resolve.
pub(crate) fn stack_depth() -> usize {
    RESOLUTION_TLS.with(|tls| tls.borrow().depth)
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        RESOLUTION_TLS.with(|tls| {
            let mut tls = tls.borrow_mut();
            if let Some(last) = tls.stack.pop() {
                debug_assert_eq!(last, self.name);
            }
            tls.depth = tls.depth.saturating_sub(1);
        });
    }
}

/// Execute a closure at the resolution boundary, converting a detected
/// cycle or depth overrun into its `DiError` form.
///
/// The guard frames themselves are pushed by `resolve_any`; this only
/// catches what they throw.
pub(crate) fn with_circular_catch<T, F>(f: F) -> crate::error::DiResult<T>
where
    F: FnOnce() -> crate::error::DiResult<T>,
{
    use std::panic::AssertUnwindSafe;

    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            if let Some(circular) = payload.downcast_ref::<CircularPanic>() {
                Err(crate::error::DiError::Circular(circular.path.iter().copied().collect()))
            } else if let Some(err) = payload.downcast_ref::<crate::error::DiError>() {
                Err(err.clone())
            } else {
                // Re-panic for unrelated panics (e.g. a bug in a user factory).
                std::panic::resume_unwind(payload);
            }
        }
    }
}
