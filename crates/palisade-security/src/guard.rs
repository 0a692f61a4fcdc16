//! Permission checks for one actor.

use std::fmt;
use std::sync::Arc;

use palisade_di::{Argument, Param, Signature, TypeDefinition};
use serde_json::json;

use crate::actor::{ACTOR_ALIAS, ActorRef};
use crate::error::{SecurityError, SecurityResult};
use crate::permission_manager::{PERMISSIONS_ALIAS, Permissions};
use crate::rule::Context;

/// Immutable permission checker bound to an actor and optional session roles.
///
/// `with_actor` and `with_roles` return modified copies; a guard can be shared freely between
/// threads.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use palisade_di::Container;
/// use palisade_security::{
/// 	AllowRule, Context, Guard, Patternizer, PermissionManager, Permissions, RuleManager,
/// 	StaticActor,
/// };
///
/// let container = Container::new();
/// container.define(AllowRule::definition());
/// let permissions = Arc::new(PermissionManager::new(
/// 	Arc::new(RuleManager::new(&container)),
/// 	Arc::new(Patternizer::new()),
/// ));
/// permissions.add_role("admin").unwrap();
/// permissions.allow("admin", "*.*").unwrap();
///
/// let guard = Guard::new(permissions).with_actor(Arc::new(StaticActor::new(["admin"])));
/// assert!(guard.allows("posts.delete", &Context::new()).unwrap());
/// ```
#[derive(Clone)]
pub struct Guard {
	permissions: Arc<dyn Permissions>,
	actor: Option<ActorRef>,
	roles: Vec<String>,
}

impl Guard {
	pub const NAME: &'static str = "Guard";

	pub fn new(permissions: Arc<dyn Permissions>) -> Self {
		Self {
			permissions,
			actor: None,
			roles: Vec::new(),
		}
	}

	/// Definition registered under [`Self::NAME`]: permissions from [`PERMISSIONS_ALIAS`], the
	/// actor from [`ACTOR_ALIAS`] when bound, session roles from a `roles` parameter.
	pub fn definition() -> TypeDefinition {
		TypeDefinition::builder::<Guard>(Self::NAME)
			.constructor(
				Signature::anonymous()
					.param(Param::class("permissions", PERMISSIONS_ALIAS))
					.param(Param::class("actor", ACTOR_ALIAS).optional())
					.param(Param::array("roles").with_default(json!([]))),
				|args| {
					let actor = match args.get(1) {
						Some(Argument::Instance(_)) => Some(args.cloned::<ActorRef>(1)?),
						_ => None,
					};
					let roles = args
						.value(2)?
						.as_array()
						.map(|roles| {
							roles
								.iter()
								.filter_map(|role| role.as_str().map(str::to_string))
								.collect()
						})
						.unwrap_or_default();
					Ok(Guard {
						permissions: args.cloned::<Arc<dyn Permissions>>(0)?,
						actor,
						roles,
					})
				},
			)
			.build()
	}

	/// Decides `permission` with the rule of the first effective role the permission system
	/// knows. Later roles are never consulted; no known role denies.
	pub fn allows(&self, permission: &str, context: &Context) -> SecurityResult<bool> {
		for role in self.roles()? {
			if !self.permissions.has_role(&role) {
				continue;
			}

			let rule = self.permissions.rule(&role, permission)?;
			let allowed = rule.allows(self.actor()?, permission, context)?;
			tracing::trace!(role = %role, permission, allowed, "guard decision");
			return Ok(allowed);
		}

		tracing::trace!(permission, "no known role, denied");
		Ok(false)
	}

	/// Session roles followed by the actor's roles.
	pub fn roles(&self) -> SecurityResult<Vec<String>> {
		let mut roles = self.roles.clone();
		roles.extend(self.actor()?.roles());
		Ok(roles)
	}

	pub fn with_roles<I, S>(&self, roles: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			roles: roles.into_iter().map(Into::into).collect(),
			..self.clone()
		}
	}

	pub fn actor(&self) -> SecurityResult<&ActorRef> {
		self.actor
			.as_ref()
			.ok_or_else(|| SecurityError::Guard("Unable to get Guard Actor, no value set".to_string()))
	}

	pub fn with_actor(&self, actor: ActorRef) -> Self {
		Self {
			actor: Some(actor),
			..self.clone()
		}
	}
}

impl fmt::Debug for Guard {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Guard")
			.field("has_actor", &self.actor.is_some())
			.field("roles", &self.roles)
			.finish_non_exhaustive()
	}
}
