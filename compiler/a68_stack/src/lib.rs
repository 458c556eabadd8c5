//! Stack growth for deep recursion.
//!
//! The reducer, the mode checker, the scope checker and the C generator all
//! recurse over the syntax tree; nesting in Algol 68 programs (closed
//! clauses inside formulae inside routine texts) is unbounded. Each of those
//! walks wraps its recursive step in [`ensure_sufficient_stack`].

/// Grow when less than this remains.
const RED_ZONE: usize = 100 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if it is nearly exhausted.
///
/// ```text
/// fn check_unit(&mut self, p: NodeId) -> PhaseResult {
///     ensure_sufficient_stack(|| { ... self.check_unit(child) ... })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nest(depth: usize) -> usize {
        if depth == 0 {
            0
        } else {
            ensure_sufficient_stack(|| 1 + nest(depth - 1))
        }
    }

    #[test]
    fn test_deep_recursion_completes() {
        assert_eq!(nest(100_000), 100_000);
    }

    #[test]
    fn test_returns_closure_value() {
        assert_eq!(ensure_sufficient_stack(|| "BEGIN SKIP END".len()), 14);
    }
}
