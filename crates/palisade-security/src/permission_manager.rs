//! Role → permission-pattern → rule associations.

use std::sync::Arc;

use indexmap::IndexMap;
use palisade_di::{Param, Signature, TypeDefinition};
use parking_lot::RwLock;

use crate::error::{SecurityError, SecurityResult};
use crate::pattern::Patternizer;
use crate::rule::RuleRef;
use crate::rule_manager::{RULES_ALIAS, Rules};
use crate::rules::{AllowRule, ForbidRule};

/// Alias under which the permission manager (`Arc<dyn Permissions>`) is bound.
pub const PERMISSIONS_ALIAS: &str = "security.permissions";

/// Role registry with per-role permission associations.
pub trait Permissions: Send + Sync {
	fn has_role(&self, role: &str) -> bool;

	fn add_role(&self, role: &str) -> SecurityResult<()>;

	/// Removes `role` together with its associations.
	fn remove_role(&self, role: &str) -> SecurityResult<()>;

	/// Known roles in registration order.
	fn roles(&self) -> Vec<String>;

	/// Rule deciding `permission` for `role`.
	fn rule(&self, role: &str, permission: &str) -> SecurityResult<RuleRef>;

	/// Associates `permission` (a name or a pattern) with the rule named `rule`.
	fn associate(&self, role: &str, permission: &str, rule: &str) -> SecurityResult<()>;

	/// Associates `permission` with [`AllowRule`].
	fn allow(&self, role: &str, permission: &str) -> SecurityResult<()> {
		self.associate(role, permission, AllowRule::NAME)
	}

	/// Associates `permission` with [`ForbidRule`].
	fn deassociate(&self, role: &str, permission: &str) -> SecurityResult<()> {
		self.associate(role, permission, ForbidRule::NAME)
	}
}

/// Default [`Permissions`] implementation.
///
/// A lookup first tries the permission name verbatim, then every stored pattern of the role in
/// association order; the first match wins.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use palisade_di::Container;
/// use palisade_security::{AllowRule, Patternizer, PermissionManager, Permissions, RuleManager};
///
/// let container = Container::new();
/// container.define(AllowRule::definition());
///
/// let permissions = PermissionManager::new(
/// 	Arc::new(RuleManager::new(&container)),
/// 	Arc::new(Patternizer::new()),
/// );
/// permissions.add_role("admin").unwrap();
/// permissions.allow("admin", "posts.*").unwrap();
/// assert!(permissions.rule("admin", "posts.delete").is_ok());
/// assert!(permissions.rule("admin", "users.delete").is_err());
/// ```
pub struct PermissionManager {
	associations: RwLock<IndexMap<String, IndexMap<String, String>>>,
	rules: Arc<dyn Rules>,
	patternizer: Arc<Patternizer>,
}

impl PermissionManager {
	pub const NAME: &'static str = "PermissionManager";

	pub fn new(rules: Arc<dyn Rules>, patternizer: Arc<Patternizer>) -> Self {
		Self {
			associations: RwLock::new(IndexMap::new()),
			rules,
			patternizer,
		}
	}

	/// Declarative singleton definition registered under [`Self::NAME`], producing
	/// `Arc<dyn Permissions>`.
	pub fn definition() -> TypeDefinition {
		TypeDefinition::builder::<Arc<dyn Permissions>>(Self::NAME)
			.constructor(
				Signature::anonymous()
					.param(Param::class("rules", RULES_ALIAS))
					.param(Param::class("patternizer", Patternizer::NAME)),
				|args| {
					let permissions: Arc<dyn Permissions> = Arc::new(PermissionManager::new(
						args.cloned::<Arc<dyn Rules>>(0)?,
						args.instance::<Patternizer>(1)?,
					));
					Ok(permissions)
				},
			)
			.singleton()
			.build()
	}

	/// `(pattern, rule)` pairs of `role` in association order.
	pub fn associations(&self, role: &str) -> SecurityResult<Vec<(String, String)>> {
		self.associations
			.read()
			.get(role)
			.map(|patterns| {
				patterns
					.iter()
					.map(|(pattern, rule)| (pattern.clone(), rule.clone()))
					.collect()
			})
			.ok_or_else(|| undefined_role(role))
	}

	fn find_rule(&self, role: &str, permission: &str) -> SecurityResult<String> {
		let associations = self.associations.read();
		let patterns = associations.get(role).ok_or_else(|| undefined_role(role))?;

		if let Some(rule) = patterns.get(permission) {
			return Ok(rule.clone());
		}

		patterns
			.iter()
			.find(|(pattern, _)| self.patternizer.matches(permission, pattern))
			.map(|(_, rule)| rule.clone())
			.ok_or_else(|| {
				SecurityError::Permission(format!(
					"Unable to resolve role/permission association for '{role}'/'{permission}'"
				))
			})
	}
}

impl Permissions for PermissionManager {
	fn has_role(&self, role: &str) -> bool {
		self.associations.read().contains_key(role)
	}

	fn add_role(&self, role: &str) -> SecurityResult<()> {
		let mut associations = self.associations.write();
		if associations.contains_key(role) {
			return Err(SecurityError::Role(format!("Role '{role}' already exists")));
		}
		associations.insert(role.to_string(), IndexMap::new());
		tracing::debug!(role, "role added");
		Ok(())
	}

	fn remove_role(&self, role: &str) -> SecurityResult<()> {
		if self.associations.write().shift_remove(role).is_none() {
			return Err(undefined_role(role));
		}
		tracing::debug!(role, "role removed");
		Ok(())
	}

	fn roles(&self) -> Vec<String> {
		self.associations.read().keys().cloned().collect()
	}

	fn rule(&self, role: &str, permission: &str) -> SecurityResult<RuleRef> {
		let rule = self.find_rule(role, permission)?;
		tracing::trace!(role, permission, rule = %rule, "association resolved");
		self.rules.get(&rule)
	}

	fn associate(&self, role: &str, permission: &str, rule: &str) -> SecurityResult<()> {
		if !self.has_role(role) {
			return Err(undefined_role(role));
		}
		if !self.rules.has(rule) {
			return Err(SecurityError::Permission(format!("Undefined rule '{rule}'")));
		}

		let mut associations = self.associations.write();
		let patterns = associations.get_mut(role).ok_or_else(|| undefined_role(role))?;
		patterns.insert(permission.to_string(), rule.to_string());
		tracing::debug!(role, permission, rule, "permission associated");
		Ok(())
	}
}

fn undefined_role(role: &str) -> SecurityError {
	SecurityError::Role(format!("Undefined role '{role}'"))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::actor::{ActorRef, Guest};
	use crate::rule::Context;
	use crate::rule_manager::RuleManager;
	use palisade_di::Container;
	use rstest::{fixture, rstest};

	struct Fixture {
		_container: Arc<Container>,
		permissions: PermissionManager,
	}

	#[fixture]
	fn manager() -> Fixture {
		let container = Container::new();
		container
			.define(AllowRule::definition())
			.define(ForbidRule::definition());
		let permissions = PermissionManager::new(
			Arc::new(RuleManager::new(&container)),
			Arc::new(Patternizer::new()),
		);
		Fixture {
			_container: container,
			permissions,
		}
	}

	fn allows(rule: RuleRef, permission: &str) -> bool {
		let guest: ActorRef = Arc::new(Guest);
		rule.allows(&guest, permission, &Context::new()).unwrap()
	}

	// ========================================================================
	// Roles
	// ========================================================================

	#[rstest]
	fn test_role_lifecycle(manager: Fixture) {
		// Arrange
		let permissions = &manager.permissions;

		// Act
		permissions.add_role("admin").unwrap();
		permissions.add_role("user").unwrap();
		let duplicate = permissions.add_role("admin").unwrap_err();
		permissions.remove_role("admin").unwrap();
		let missing = permissions.remove_role("admin").unwrap_err();

		// Assert
		assert_eq!(duplicate.to_string(), "Role 'admin' already exists");
		assert_eq!(missing.to_string(), "Undefined role 'admin'");
		assert_eq!(permissions.roles(), vec!["user".to_string()]);
	}

	#[rstest]
	fn test_removed_role_forgets_associations(manager: Fixture) {
		// Arrange
		let permissions = &manager.permissions;
		permissions.add_role("editor").unwrap();
		permissions.allow("editor", "posts.*").unwrap();

		// Act
		permissions.remove_role("editor").unwrap();
		permissions.add_role("editor").unwrap();

		// Assert
		assert!(permissions.associations("editor").unwrap().is_empty());
	}

	// ========================================================================
	// Associations
	// ========================================================================

	#[rstest]
	fn test_associate_validates_role_and_rule(manager: Fixture) {
		// Arrange
		let permissions = &manager.permissions;
		permissions.add_role("user").unwrap();

		// Act
		let unknown_role = permissions.allow("ghost", "posts.read").unwrap_err();
		let unknown_rule = permissions.associate("user", "posts.read", "NoSuchRule").unwrap_err();

		// Assert
		assert!(matches!(unknown_role, SecurityError::Role(_)));
		assert!(matches!(unknown_rule, SecurityError::Permission(ref m) if m == "Undefined rule 'NoSuchRule'"));
	}

	#[rstest]
	fn test_exact_match_wins_over_earlier_pattern(manager: Fixture) {
		// Arrange
		let permissions = &manager.permissions;
		permissions.add_role("user").unwrap();
		permissions.allow("user", "posts.*").unwrap();
		permissions.deassociate("user", "posts.delete").unwrap();

		// Act
		let delete = permissions.rule("user", "posts.delete").unwrap();
		let edit = permissions.rule("user", "posts.edit").unwrap();

		// Assert
		assert!(!allows(delete, "posts.delete"));
		assert!(allows(edit, "posts.edit"));
	}

	#[rstest]
	fn test_first_matching_pattern_wins(manager: Fixture) {
		// Arrange
		let permissions = &manager.permissions;
		permissions.add_role("user").unwrap();
		permissions.deassociate("user", "posts.(edit|delete)").unwrap();
		permissions.allow("user", "posts.*").unwrap();

		// Act
		let edit = permissions.rule("user", "posts.edit").unwrap();
		let read = permissions.rule("user", "posts.read").unwrap();

		// Assert
		assert!(!allows(edit, "posts.edit"));
		assert!(allows(read, "posts.read"));
	}

	#[rstest]
	fn test_reassociation_keeps_position_and_replaces_rule(manager: Fixture) {
		// Arrange
		let permissions = &manager.permissions;
		permissions.add_role("user").unwrap();
		permissions.allow("user", "posts.*").unwrap();
		permissions.allow("user", "users.*").unwrap();

		// Act
		permissions.deassociate("user", "posts.*").unwrap();

		// Assert
		assert_eq!(
			permissions.associations("user").unwrap(),
			vec![
				("posts.*".to_string(), ForbidRule::NAME.to_string()),
				("users.*".to_string(), AllowRule::NAME.to_string()),
			]
		);
	}

	#[rstest]
	#[case::unknown_role("ghost", "posts.read", "Undefined role 'ghost'")]
	#[case::no_association(
		"guest",
		"posts.delete",
		"Unable to resolve role/permission association for 'guest'/'posts.delete'"
	)]
	fn test_rule_lookup_failures(
		manager: Fixture,
		#[case] role: &str,
		#[case] permission: &str,
		#[case] message: &str,
	) {
		// Arrange
		let permissions = &manager.permissions;
		permissions.add_role("guest").unwrap();
		permissions.allow("guest", "posts.read").unwrap();

		// Act
		let error = permissions.rule(role, permission).err().unwrap();

		// Assert
		assert_eq!(error.to_string(), message);
	}
}
