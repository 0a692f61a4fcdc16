//! Declarative role and permission setup loaded from TOML.
//!
//! ```toml
//! [rules]
//! "posts.owner" = "OwnerRule"
//!
//! [[roles]]
//! name = "admin"
//! permissions = [{ pattern = "*.*" }]
//!
//! [[roles]]
//! name = "guest"
//! permissions = [{ pattern = "posts.read", rule = "AllowRule" }]
//! deny = ["posts.delete"]
//! ```
//!
//! Associations are applied in file order, which is the order patterns are tried in.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{SecurityError, SecurityResult};
use crate::permission_manager::Permissions;
use crate::rule_manager::{RuleDefinition, Rules};
use crate::rules::{AllowRule, ForbidRule};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("Unable to read permissions file: {0}")]
	Io(#[from] std::io::Error),

	#[error("Invalid permissions file: {0}")]
	Toml(#[from] toml::de::Error),
}

/// Rule aliases and roles with their associations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PermissionsConfig {
	/// Rule name → rule type name.
	#[serde(default)]
	pub rules: BTreeMap<String, String>,

	#[serde(default)]
	pub roles: Vec<RoleConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleConfig {
	pub name: String,

	#[serde(default)]
	pub permissions: Vec<AssociationConfig>,

	/// Permissions associated with the forbid rule, after `permissions`.
	#[serde(default)]
	pub deny: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssociationConfig {
	pub pattern: String,

	#[serde(default = "default_rule")]
	pub rule: String,
}

fn default_rule() -> String {
	AllowRule::NAME.to_string()
}

impl PermissionsConfig {
	pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(source)?)
	}

	pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let source = std::fs::read_to_string(path.as_ref())?;
		Self::from_toml_str(&source)
	}

	/// Registers the rules, then adds missing roles and their associations.
	///
	/// Every rule name the roles reference is checked before anything is mutated. A rule
	/// that fails to register unregisters the names this call added and leaves the roles
	/// untouched; a definition it replaced is not restored.
	pub fn apply(&self, rules: &dyn Rules, permissions: &dyn Permissions) -> SecurityResult<()> {
		self.check_references(rules)?;

		let mut added = Vec::new();
		for (name, class) in &self.rules {
			let existed = rules.has(name);
			if let Err(error) = rules.set(name, Some(RuleDefinition::Class(class.clone()))) {
				for name in added {
					rules.remove(name)?;
				}
				return Err(error);
			}
			if !existed {
				added.push(name.as_str());
			}
		}

		for role in &self.roles {
			if !permissions.has_role(&role.name) {
				permissions.add_role(&role.name)?;
			}
			for association in &role.permissions {
				permissions.associate(&role.name, &association.pattern, &association.rule)?;
			}
			for permission in &role.deny {
				permissions.deassociate(&role.name, permission)?;
			}
		}

		tracing::debug!(
			rules = self.rules.len(),
			roles = self.roles.len(),
			"permissions configuration applied"
		);
		Ok(())
	}

	fn check_references(&self, rules: &dyn Rules) -> SecurityResult<()> {
		let known = |name: &str| self.rules.contains_key(name) || rules.has(name);
		let denies = self.roles.iter().any(|role| !role.deny.is_empty());
		let referenced = self
			.roles
			.iter()
			.flat_map(|role| role.permissions.iter().map(|association| association.rule.as_str()))
			.chain(denies.then_some(ForbidRule::NAME));
		for rule in referenced {
			if !known(rule) {
				return Err(SecurityError::Permission(format!("Undefined rule '{rule}'")));
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_defaults_and_order() {
		// Arrange
		let source = r#"
			[[roles]]
			name = "user"
			permissions = [{ pattern = "posts.*" }, { pattern = "users.read", rule = "ForbidRule" }]
			deny = ["posts.delete"]
		"#;

		// Act
		let config = PermissionsConfig::from_toml_str(source).unwrap();

		// Assert
		assert!(config.rules.is_empty());
		let role = &config.roles[0];
		assert_eq!(role.permissions[0].rule, "AllowRule");
		assert_eq!(role.permissions[1].pattern, "users.read");
		assert_eq!(role.deny, vec!["posts.delete".to_string()]);
	}

	#[rstest]
	#[case::unknown_field("[[roles]]\nname = \"a\"\ngrant = []")]
	#[case::missing_name("[[roles]]\npermissions = []")]
	#[case::not_toml("roles = [")]
	fn test_invalid_sources(#[case] source: &str) {
		// Act
		let result = PermissionsConfig::from_toml_str(source);

		// Assert
		assert!(matches!(result, Err(ConfigError::Toml(_))));
	}

	#[rstest]
	fn test_empty_source_is_empty_config() {
		// Act
		let config = PermissionsConfig::from_toml_str("").unwrap();

		// Assert
		assert_eq!(config, PermissionsConfig::default());
	}
}
