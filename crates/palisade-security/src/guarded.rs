//! Permission checks for components that carry or locate a guard.

use std::sync::Arc;

use palisade_di::{Container, GlobalScope};

use crate::error::{SecurityError, SecurityResult};
use crate::guard::Guard;
use crate::rule::Context;

/// Alias under which the request guard is bound.
pub const GUARD_ALIAS: &str = "security.guard";

/// Adds `allows` and `denies` to a component.
///
/// The guard is the component's own when [`guard`](Self::guard) returns one, otherwise it is
/// resolved from [`container`](Self::container) under [`GUARD_ALIAS`]. A component with a
/// [`GUARD_NAMESPACE`](Self::GUARD_NAMESPACE) checks `"{namespace}.{permission}"`.
///
/// # Examples
///
/// ```
/// use palisade_security::{Guard, Guarded};
///
/// struct PostController {
/// 	guard: Guard,
/// }
///
/// impl Guarded for PostController {
/// 	const GUARD_NAMESPACE: Option<&'static str> = Some("posts");
///
/// 	fn guard(&self) -> Option<Guard> {
/// 		Some(self.guard.clone())
/// 	}
/// }
/// ```
pub trait Guarded {
	const GUARD_NAMESPACE: Option<&'static str> = None;

	/// Guard owned by the component.
	fn guard(&self) -> Option<Guard> {
		None
	}

	/// Container consulted when the component has no guard; the ambient one by default.
	fn container(&self) -> Option<Arc<Container>> {
		GlobalScope::current()
	}

	fn resolve_guard(&self) -> SecurityResult<Guard> {
		if let Some(guard) = self.guard() {
			return Ok(guard);
		}
		let container = self.container().ok_or_else(|| {
			SecurityError::Scope("Unable to create guard, no container is available".to_string())
		})?;
		Ok(container.get_cloned::<Guard>(GUARD_ALIAS, None)?)
	}

	fn resolve_permission(&self, permission: &str) -> String {
		match Self::GUARD_NAMESPACE {
			Some(namespace) => format!("{namespace}.{permission}"),
			None => permission.to_string(),
		}
	}

	fn allows(&self, permission: &str, context: &Context) -> SecurityResult<bool> {
		self.resolve_guard()?
			.allows(&self.resolve_permission(permission), context)
	}

	fn denies(&self, permission: &str, context: &Context) -> SecurityResult<bool> {
		self.allows(permission, context).map(|allowed| !allowed)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::actor::{ActorRef, StaticActor};
	use crate::permission_manager::Permissions;
	use crate::rule::RuleRef;
	use crate::rules::{AllowRule, CallableRule};
	use palisade_di::Instance;
	use rstest::rstest;
	use serial_test::serial;

	/// Single role `editor` whose rule allows permissions starting with `posts.`.
	struct Editors;

	impl Permissions for Editors {
		fn has_role(&self, role: &str) -> bool {
			role == "editor"
		}

		fn add_role(&self, _role: &str) -> SecurityResult<()> {
			Ok(())
		}

		fn remove_role(&self, _role: &str) -> SecurityResult<()> {
			Ok(())
		}

		fn roles(&self) -> Vec<String> {
			vec!["editor".to_string()]
		}

		fn rule(&self, _role: &str, _permission: &str) -> SecurityResult<RuleRef> {
			Ok(Arc::new(CallableRule::new(|_, permission, _| permission.starts_with("posts."))))
		}

		fn associate(&self, _role: &str, _permission: &str, _rule: &str) -> SecurityResult<()> {
			Ok(())
		}
	}

	fn editor_guard() -> Guard {
		let actor: ActorRef = Arc::new(StaticActor::new(["editor"]));
		Guard::new(Arc::new(Editors)).with_actor(actor)
	}

	struct Owned {
		guard: Guard,
	}

	impl Guarded for Owned {
		const GUARD_NAMESPACE: Option<&'static str> = Some("posts");

		fn guard(&self) -> Option<Guard> {
			Some(self.guard.clone())
		}
	}

	struct Plain {
		container: Option<Arc<Container>>,
	}

	impl Guarded for Plain {
		fn container(&self) -> Option<Arc<Container>> {
			self.container.clone()
		}
	}

	struct Ambient;

	impl Guarded for Ambient {}

	#[rstest]
	fn test_namespace_prefixes_permission() {
		// Arrange
		let owned = Owned { guard: editor_guard() };

		// Act & Assert
		assert_eq!(owned.resolve_permission("edit"), "posts.edit");
		assert!(owned.allows("edit", &Context::new()).unwrap());
		assert!(!owned.denies("edit", &Context::new()).unwrap());
	}

	#[rstest]
	fn test_guard_resolved_from_container() {
		// Arrange
		let container = Container::new();
		container.bind(GUARD_ALIAS, Instance::new(editor_guard()));
		let plain = Plain {
			container: Some(container),
		};

		// Act & Assert
		assert!(plain.allows("posts.edit", &Context::new()).unwrap());
		assert!(plain.denies("users.edit", &Context::new()).unwrap());
	}

	#[rstest]
	fn test_no_guard_and_no_container_is_scope_error() {
		// Arrange
		let plain = Plain { container: None };

		// Act
		let error = plain.allows("posts.edit", &Context::new()).unwrap_err();

		// Assert
		assert!(matches!(error, SecurityError::Scope(_)));
		assert_eq!(error.to_string(), "Unable to create guard, no container is available");
	}

	#[rstest]
	#[serial(global_scope)]
	fn test_ambient_container_is_default() {
		// Arrange
		let container = Container::new();
		container
			.define(AllowRule::definition())
			.bind(GUARD_ALIAS, Instance::new(editor_guard()));

		// Act
		let without = Ambient.allows("posts.edit", &Context::new());
		let with = {
			let _scope = GlobalScope::enter(container);
			Ambient.allows("posts.edit", &Context::new())
		};

		// Assert
		assert!(matches!(without, Err(SecurityError::Scope(_))));
		assert!(with.unwrap());
	}
}
