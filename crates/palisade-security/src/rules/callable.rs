use std::fmt;
use std::sync::{Arc, Weak};

use palisade_di::{Container, Instance, MethodRef, Parameters};

use crate::actor::ActorRef;
use crate::error::{SecurityError, SecurityResult};
use crate::rule::{Context, Rule};

type RuleFn = Arc<dyn Fn(&ActorRef, &str, &Context) -> SecurityResult<bool> + Send + Sync>;

/// Rule backed by a function value.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use palisade_security::{ActorRef, CallableRule, Context, Rule, StaticActor};
///
/// let rule = CallableRule::new(|actor, _permission, _context| actor.roles().len() > 1);
/// let actor: ActorRef = Arc::new(StaticActor::new(["user", "admin"]));
/// assert!(rule.allows(&actor, "posts.edit", &Context::new()).unwrap());
/// ```
#[derive(Clone)]
pub struct CallableRule {
	name: String,
	body: RuleFn,
}

impl CallableRule {
	pub fn new<F>(f: F) -> Self
	where
		F: Fn(&ActorRef, &str, &Context) -> bool + Send + Sync + 'static,
	{
		Self::fallible(move |actor, permission, context| Ok(f(actor, permission, context)))
	}

	pub fn fallible<F>(f: F) -> Self
	where
		F: Fn(&ActorRef, &str, &Context) -> SecurityResult<bool> + Send + Sync + 'static,
	{
		Self {
			name: "{closure}".to_string(),
			body: Arc::new(f),
		}
	}

	/// Calls `method` through `container` with `actor`, `permission`, `context` and the context
	/// keys offered by name. The method must return `bool`.
	pub fn method(container: &Arc<Container>, method: MethodRef) -> Self {
		let container: Weak<Container> = Arc::downgrade(container);
		let name = method.to_string();
		let rule_name = name.clone();
		Self {
			name,
			body: Arc::new(move |actor, permission, context| {
				let container = container.upgrade().ok_or_else(|| {
					SecurityError::Scope(format!(
						"Unable to call rule '{rule_name}', container is no longer available"
					))
				})?;
				let mut parameters = Parameters::new()
					.with("actor", Instance::new(Arc::clone(actor)))
					.with("permission", permission)
					.with("context", Instance::new(context.clone()));
				for (key, value) in context.iter() {
					parameters.insert_if_absent(key, value.clone());
				}
				let result = container
					.invoke(&method, &parameters)
					.map_err(|source| SecurityError::RuleFailed {
						rule: rule_name.clone(),
						source,
					})?;
				result.downcast_ref::<bool>().copied().ok_or_else(|| {
					SecurityError::Rule(format!(
						"Rule '{rule_name}' must return bool, '{}' given",
						result.type_name()
					))
				})
			}),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}
}

impl fmt::Debug for CallableRule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CallableRule")
			.field("name", &self.name)
			.finish_non_exhaustive()
	}
}

impl Rule for CallableRule {
	fn allows(&self, actor: &ActorRef, permission: &str, context: &Context) -> SecurityResult<bool> {
		(self.body)(actor, permission, context)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::actor::{Guest, StaticActor};
	use palisade_di::{Param, Signature, TypeDefinition};
	use rstest::rstest;

	struct Moderation {
		banned: Vec<String>,
	}

	fn container() -> Arc<Container> {
		let container = Container::new();
		container.define(
			TypeDefinition::builder::<Moderation>("Moderation")
				.constructor(Signature::anonymous(), |_| {
					Ok(Moderation {
						banned: vec!["spam".to_string()],
					})
				})
				.method(
					"can_post",
					Signature::anonymous()
						.param(Param::of::<ActorRef>("actor"))
						.param(Param::string("topic").with_default("general")),
					|moderation, args| {
						let actor = args.cloned::<ActorRef>(0)?;
						Ok(!actor.roles().is_empty() && !moderation.banned.contains(&args.str(1)?))
					},
				)
				.method("label", Signature::anonymous(), |_, _| Ok("moderation".to_string()))
				.build(),
		);
		container
	}

	#[rstest]
	fn test_closure_rule() {
		// Arrange
		let rule = CallableRule::new(|_, permission, _| permission.ends_with(".read"));
		let guest: ActorRef = Arc::new(Guest);

		// Act & Assert
		assert!(rule.allows(&guest, "posts.read", &Context::new()).unwrap());
		assert!(!rule.allows(&guest, "posts.delete", &Context::new()).unwrap());
		assert_eq!(rule.name(), "{closure}");
	}

	#[rstest]
	fn test_fallible_rule_propagates_error() {
		// Arrange
		let rule = CallableRule::fallible(|_, _, _| Err(SecurityError::Rule("nope".into())));
		let guest: ActorRef = Arc::new(Guest);

		// Act
		let result = rule.allows(&guest, "posts.read", &Context::new());

		// Assert
		assert!(matches!(result, Err(SecurityError::Rule(_))));
	}

	#[rstest]
	#[case(Context::new(), true)]
	#[case(Context::new().with("topic", "spam"), false)]
	fn test_method_rule(#[case] context: Context, #[case] expected: bool) {
		// Arrange
		let container = container();
		let rule = CallableRule::method(&container, MethodRef::new("Moderation", "can_post"));
		let actor: ActorRef = Arc::new(StaticActor::new(["user"]));

		// Act
		let allowed = rule.allows(&actor, "posts.create", &context);

		// Assert
		assert_eq!(rule.name(), "Moderation::can_post");
		assert_eq!(allowed.unwrap(), expected);
	}

	#[rstest]
	fn test_method_rule_must_return_bool() {
		// Arrange
		let container = container();
		let rule = CallableRule::method(&container, MethodRef::new("Moderation", "label"));
		let guest: ActorRef = Arc::new(Guest);

		// Act
		let error = rule.allows(&guest, "posts.read", &Context::new()).unwrap_err();

		// Assert
		assert!(matches!(error, SecurityError::Rule(ref message) if message.contains("must return bool")));
	}
}
