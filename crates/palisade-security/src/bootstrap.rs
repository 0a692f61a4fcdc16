//! Registers the permission system in a container.

use palisade_di::Container;

use crate::guard::Guard;
use crate::guarded::GUARD_ALIAS;
use crate::pattern::Patternizer;
use crate::permission_manager::{PERMISSIONS_ALIAS, PermissionManager};
use crate::rule_manager::{RULES_ALIAS, RuleManager};
use crate::rules::{AllowRule, ForbidRule};

/// Defines the built-in rules, the pattern matcher, the registries and the guard, and binds
/// [`RULES_ALIAS`], [`PERMISSIONS_ALIAS`] and [`GUARD_ALIAS`] to them.
///
/// The registries are declarative singletons: every lookup of the aliases returns the same
/// instances. The guard is built per lookup from the actor bound under
/// [`ACTOR_ALIAS`](crate::ACTOR_ALIAS).
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use palisade_di::Container;
/// use palisade_security::{PERMISSIONS_ALIAS, Permissions, register};
///
/// let container = Container::new();
/// register(&container);
///
/// let permissions = container
/// 	.get_cloned::<Arc<dyn Permissions>>(PERMISSIONS_ALIAS, None)
/// 	.unwrap();
/// permissions.add_role("admin").unwrap();
/// permissions.allow("admin", "*.*").unwrap();
/// ```
pub fn register(container: &Container) -> &Container {
	container
		.define(AllowRule::definition())
		.define(ForbidRule::definition())
		.define(Patternizer::definition())
		.define(RuleManager::definition())
		.define(PermissionManager::definition())
		.define(Guard::definition())
		.bind(RULES_ALIAS, RuleManager::NAME)
		.bind(PERMISSIONS_ALIAS, PermissionManager::NAME)
		.bind(GUARD_ALIAS, Guard::NAME);
	tracing::debug!("permission system registered");
	container
}
