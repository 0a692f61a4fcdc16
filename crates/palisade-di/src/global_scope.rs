//! Process-wide ambient container.
//!
//! Components receive their container explicitly. The ambient handle exists for call sites
//! that cannot: it is swapped explicitly, restored by [`ScopeGuard`] and never populated
//! implicitly.

use std::any::Any;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::container::Container;
use crate::error::{DiError, DiResult};

/// Currently installed ambient container.
static GLOBAL_CONTAINER: Lazy<RwLock<Option<Arc<Container>>>> = Lazy::new(|| RwLock::new(None));

/// Accessors for the ambient container.
///
/// # Examples
///
/// ```
/// use palisade_di::{Container, GlobalScope};
///
/// let container = Container::new();
/// {
/// 	let _scope = GlobalScope::enter(container.clone());
/// 	assert!(GlobalScope::current().is_some());
/// }
/// assert!(GlobalScope::current().is_none());
/// ```
pub struct GlobalScope;

impl GlobalScope {
	pub fn current() -> Option<Arc<Container>> {
		GLOBAL_CONTAINER.read().clone()
	}

	/// Installs `container` and returns the previously installed one.
	pub fn replace(container: Option<Arc<Container>>) -> Option<Arc<Container>> {
		let previous = std::mem::replace(&mut *GLOBAL_CONTAINER.write(), container);
		tracing::debug!(
			installed = GLOBAL_CONTAINER.read().is_some(),
			had_previous = previous.is_some(),
			"ambient container replaced"
		);
		previous
	}

	/// Installs `container` until the returned guard drops, then restores the previous one.
	pub fn enter(container: Arc<Container>) -> ScopeGuard {
		ScopeGuard {
			previous: Self::replace(Some(container)),
		}
	}

	/// Returns `value` when present, otherwise resolves `alias` from the ambient container.
	pub fn saturate<T: Any + Send + Sync>(value: Option<Arc<T>>, alias: &str) -> DiResult<Arc<T>> {
		if let Some(value) = value {
			return Ok(value);
		}
		let container = Self::current().ok_or_else(|| {
			DiError::Scope(format!("Unable to saturate '{alias}': no container available"))
		})?;
		container.get_as::<T>(alias, None)
	}

	/// [`saturate`](Self::saturate) for cloneable payloads such as `Arc<dyn Trait>`.
	pub fn saturate_cloned<T: Any + Clone>(value: Option<T>, alias: &str) -> DiResult<T> {
		if let Some(value) = value {
			return Ok(value);
		}
		let container = Self::current().ok_or_else(|| {
			DiError::Scope(format!("Unable to saturate '{alias}': no container available"))
		})?;
		container.get_cloned::<T>(alias, None)
	}
}

/// Restores the previously installed ambient container on drop.
#[must_use = "the previous container is restored as soon as the guard is dropped"]
pub struct ScopeGuard {
	previous: Option<Arc<Container>>,
}

impl Drop for ScopeGuard {
	fn drop(&mut self) {
		GlobalScope::replace(self.previous.take());
	}
}
