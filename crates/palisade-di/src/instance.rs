//! Type-erased shared objects handed out by the container.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A resolved object.
///
/// Cloning an `Instance` clones the handle, never the object: two clones always point at
/// the same allocation, which is what singleton identity is measured with.
///
/// Trait objects are stored behind their own `Arc` (an `Instance` of `Arc<dyn Trait>`) and
/// fetched back with [`Instance::cloned`].
///
/// # Examples
///
/// ```
/// use palisade_di::Instance;
///
/// let instance = Instance::new(String::from("value"));
/// assert!(instance.is::<String>());
/// assert_eq!(instance.downcast_ref::<String>().map(String::as_str), Some("value"));
/// assert!(instance.ptr_eq(&instance.clone()));
/// ```
#[derive(Clone)]
pub struct Instance {
	value: Arc<dyn Any + Send + Sync>,
	type_id: TypeId,
	type_name: &'static str,
}

impl Instance {
	/// Wraps an owned value.
	pub fn new<T: Any + Send + Sync>(value: T) -> Self {
		Self::from_arc(Arc::new(value))
	}

	/// Wraps an already shared value without re-allocating.
	pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
		Self {
			value,
			type_id: TypeId::of::<T>(),
			type_name: std::any::type_name::<T>(),
		}
	}

	/// `TypeId` of the wrapped value.
	pub fn type_id(&self) -> TypeId {
		self.type_id
	}

	/// Rust type name of the wrapped value, used in diagnostics.
	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	/// Returns `true` if the wrapped value is a `T`.
	pub fn is<T: Any>(&self) -> bool {
		self.type_id == TypeId::of::<T>()
	}

	/// Shared handle to the value, if it is a `T`.
	pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
		Arc::clone(&self.value).downcast::<T>().ok()
	}

	/// Borrowed view of the value, if it is a `T`.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.value.downcast_ref::<T>()
	}

	/// Clone of the value, if it is a `T`. Used for `Arc<dyn Trait>` payloads.
	pub fn cloned<T: Any + Clone>(&self) -> Option<T> {
		self.downcast_ref::<T>().cloned()
	}

	/// Identity comparison.
	pub fn ptr_eq(&self, other: &Instance) -> bool {
		std::ptr::addr_eq(Arc::as_ptr(&self.value), Arc::as_ptr(&other.value))
	}
}

impl fmt::Debug for Instance {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Instance")
			.field("type_name", &self.type_name)
			.field("ptr", &Arc::as_ptr(&self.value))
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	trait Greeter: Send + Sync {
		fn greet(&self) -> String;
	}

	struct English;

	impl Greeter for English {
		fn greet(&self) -> String {
			"hello".into()
		}
	}

	#[rstest]
	fn test_downcast_matches_wrapped_type() {
		// Arrange
		let instance = Instance::new(42_u32);

		// Act
		let hit = instance.downcast::<u32>();
		let miss = instance.downcast::<u64>();

		// Assert
		assert_eq!(hit.as_deref(), Some(&42));
		assert!(miss.is_none());
		assert_eq!(instance.type_name(), "u32");
	}

	#[rstest]
	fn test_trait_object_payload() {
		// Arrange
		let greeter: Arc<dyn Greeter> = Arc::new(English);
		let instance = Instance::new(greeter);

		// Act
		let fetched = instance.cloned::<Arc<dyn Greeter>>();

		// Assert
		assert_eq!(fetched.map(|g| g.greet()), Some("hello".to_string()));
	}

	#[rstest]
	fn test_identity_survives_clone_but_not_rewrap() {
		// Arrange
		let shared = Arc::new(String::from("x"));
		let a = Instance::from_arc(Arc::clone(&shared));
		let b = a.clone();
		let c = Instance::new(String::from("x"));

		// Act & Assert
		assert!(a.ptr_eq(&b));
		assert!(!a.ptr_eq(&c));
		assert!(Arc::ptr_eq(&a.downcast::<String>().unwrap(), &shared));
	}
}
