//! Thread-local circular dependency detection
//!
//! Resolution is a synchronous graph walk, so the per-resolution state lives in a
//! `thread_local!` stack keyed by container scope and alias. Every `make` call enters the
//! stack through [`begin_resolution`] and leaves it when the returned [`ResolutionGuard`]
//! drops. The same alias resolved in two containers is two distinct nodes.
//!
//! ## Features
//!
//! - **O(1) Circular Detection**: `HashSet` of `(scope, alias)` pairs currently being resolved
//! - **Depth Limiting**: `MAX_RESOLUTION_DEPTH` bounds pathological chains
//! - **RAII**: Automatic cleanup via `ResolutionGuard`, including on error unwinding

use std::cell::RefCell;
use std::collections::HashSet;
use std::marker::PhantomData;

/// Maximum resolution depth (prevents pathological cases)
pub const MAX_RESOLUTION_DEPTH: usize = 100;

/// Identity of the container performing a resolution.
pub type ScopeId = usize;

type Node = (ScopeId, String);

/// Internal state for cycle detection, stored per-thread
struct CycleDetectionState {
	/// Nodes currently being resolved
	resolution_set: HashSet<Node>,
	/// Resolution depth counter
	resolution_depth: usize,
	/// Resolution path (for displaying circular paths)
	resolution_path: Vec<Node>,
}

impl CycleDetectionState {
	fn new() -> Self {
		Self {
			resolution_set: HashSet::new(),
			resolution_depth: 0,
			resolution_path: Vec::new(),
		}
	}

	fn cycle_path(&self, node: &Node) -> String {
		match self.resolution_path.iter().position(|entry| entry == node) {
			Some(start) => {
				let chain: Vec<&str> = self.resolution_path[start..]
					.iter()
					.map(|(_, alias)| alias.as_str())
					.collect();
				format!("{} -> {}", chain.join(" -> "), node.1)
			}
			None => format!("Unknown cycle involving {}", node.1),
		}
	}
}

thread_local! {
	static CYCLE_STATE: RefCell<CycleDetectionState> = RefCell::new(CycleDetectionState::new());
}

/// Record the start of resolution for `alias` within `scope`.
///
/// Fails if `(scope, alias)` is already on this thread's resolution stack or if the stack is
/// deeper than [`MAX_RESOLUTION_DEPTH`]. The depth counts every scope. The returned guard
/// pops the entry on drop.
pub fn begin_resolution(scope: ScopeId, alias: &str) -> Result<ResolutionGuard, CycleError> {
	CYCLE_STATE.with(|state| {
		let mut state = state.borrow_mut();
		let node = (scope, alias.to_string());

		if state.resolution_set.contains(&node) {
			return Err(CycleError::CircularDependency {
				alias: alias.to_string(),
				path: state.cycle_path(&node),
			});
		}

		if state.resolution_depth >= MAX_RESOLUTION_DEPTH {
			return Err(CycleError::MaxDepthExceeded(state.resolution_depth + 1));
		}

		state.resolution_depth += 1;
		state.resolution_set.insert(node.clone());
		state.resolution_path.push(node.clone());

		Ok(ResolutionGuard {
			node,
			_not_send: PhantomData,
		})
	})
}

/// Current depth of this thread's resolution stack.
pub fn resolution_depth() -> usize {
	CYCLE_STATE.with(|state| state.borrow().resolution_depth)
}

/// RAII guard: Automatic cleanup on Drop
///
/// Bound to the thread that created it.
#[derive(Debug)]
#[must_use = "the alias leaves the resolution stack as soon as the guard is dropped"]
pub struct ResolutionGuard {
	node: Node,
	_not_send: PhantomData<*const ()>,
}

impl Drop for ResolutionGuard {
	fn drop(&mut self) {
		let _ = CYCLE_STATE.try_with(|state| {
			let mut s = state.borrow_mut();
			s.resolution_set.remove(&self.node);
			if let Some(pos) = s.resolution_path.iter().rposition(|entry| *entry == self.node) {
				s.resolution_path.remove(pos);
			}
			s.resolution_depth = s.resolution_depth.saturating_sub(1);
		});
	}
}

/// Circular dependency error
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
	/// Alias re-entered while still being resolved
	#[error("Circular dependency detected: {alias}\n  Path: {path}")]
	CircularDependency {
		/// Alias involved in the cycle
		alias: String,
		/// Circular path (format: A -> B -> C -> A)
		path: String,
	},

	/// Maximum resolution depth exceeded
	#[error(
		"Maximum resolution depth exceeded: {0}\nThis likely indicates an extremely deep or circular dependency chain."
	)]
	MaxDepthExceeded(usize),
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	const SCOPE: ScopeId = 1;

	#[rstest]
	fn test_simple_cycle_detection() {
		// Arrange
		let guard_a = begin_resolution(SCOPE, "a").unwrap();

		// Act
		let result = begin_resolution(SCOPE, "a");

		// Assert
		assert!(matches!(result, Err(CycleError::CircularDependency { .. })));

		// Act: Drop guard to cleanup
		drop(guard_a);

		// Assert: After cleanup, resolution should succeed again
		assert!(begin_resolution(SCOPE, "a").is_ok());
	}

	#[rstest]
	fn test_cycle_path_lists_chain() {
		// Arrange
		let _a = begin_resolution(SCOPE, "a").unwrap();
		let _b = begin_resolution(SCOPE, "b").unwrap();
		let _c = begin_resolution(SCOPE, "c").unwrap();

		// Act
		let error = begin_resolution(SCOPE, "b").unwrap_err();

		// Assert
		match error {
			CycleError::CircularDependency { alias, path } => {
				assert_eq!(alias, "b");
				assert_eq!(path, "b -> c -> b");
			}
			other => panic!("unexpected error: {other}"),
		}
	}

	#[rstest]
	fn test_depth_tracking() {
		// Arrange
		let guard1 = begin_resolution(SCOPE, "one").unwrap();
		let guard2 = begin_resolution(SCOPE, "two").unwrap();

		// Assert
		assert_eq!(resolution_depth(), 2);

		// Act
		drop(guard2);
		assert_eq!(resolution_depth(), 1, "Depth should be 1 after dropping guard2");
		drop(guard1);

		// Assert
		assert_eq!(resolution_depth(), 0, "Depth should be 0 after dropping all guards");
	}

	#[rstest]
	fn test_depth_limit() {
		// Arrange
		let mut guards = Vec::new();
		for index in 0..MAX_RESOLUTION_DEPTH {
			guards.push(begin_resolution(SCOPE, &format!("alias{index}")).unwrap());
		}

		// Act
		let result = begin_resolution(SCOPE, "one-too-many");

		// Assert
		assert!(matches!(
			result,
			Err(CycleError::MaxDepthExceeded(depth)) if depth == MAX_RESOLUTION_DEPTH + 1
		));
		drop(guards);
		assert_eq!(resolution_depth(), 0);
	}

	#[rstest]
	fn test_state_is_per_thread() {
		// Arrange
		let _guard = begin_resolution(SCOPE, "shared").unwrap();

		// Act
		let other_thread = std::thread::spawn(|| begin_resolution(SCOPE, "shared").is_ok())
			.join()
			.unwrap();

		// Assert
		assert!(other_thread);
	}

	#[rstest]
	fn test_same_alias_in_another_scope_is_not_a_cycle() {
		// Arrange
		let _outer = begin_resolution(SCOPE, "config").unwrap();

		// Act
		let inner = begin_resolution(SCOPE + 1, "config");
		let again = begin_resolution(SCOPE, "config");

		// Assert
		assert!(inner.is_ok());
		assert!(matches!(again, Err(CycleError::CircularDependency { .. })));
	}
}
