//! Named rule registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use palisade_di::{CONTAINER_ALIAS, Container, MethodRef, Param, Signature, TypeDefinition};
use parking_lot::RwLock;

use crate::error::{SecurityError, SecurityResult};
use crate::rule::{RULE_INTERFACE, RuleRef};
use crate::rules::CallableRule;

/// Alias under which the rule registry (`Arc<dyn Rules>`) is bound.
pub const RULES_ALIAS: &str = "security.rules";

/// Registry of rules by name.
pub trait Rules: Send + Sync {
	/// Registers `rule` under `name`; `None` registers the rule type named `name` itself.
	fn set(&self, name: &str, rule: Option<RuleDefinition>) -> SecurityResult<()>;

	fn remove(&self, name: &str) -> SecurityResult<()>;

	/// `true` for registered names and for names the container can resolve.
	fn has(&self, name: &str) -> bool;

	fn get(&self, name: &str) -> SecurityResult<RuleRef>;
}

/// What a rule name points to.
#[derive(Clone)]
pub enum RuleDefinition {
	/// A rule type (or alias) resolved through the container on every lookup.
	Class(String),
	Instance(RuleRef),
	Callable(CallableRule),
	/// `[resolver, method]` pair called through the container.
	Method(MethodRef),
}

impl fmt::Debug for RuleDefinition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Class(class) => f.debug_tuple("Class").field(class).finish(),
			Self::Instance(_) => f.write_str("Instance(..)"),
			Self::Callable(callable) => f.debug_tuple("Callable").field(callable).finish(),
			Self::Method(method) => f.debug_tuple("Method").field(method).finish(),
		}
	}
}

impl From<&str> for RuleDefinition {
	fn from(class: &str) -> Self {
		Self::Class(class.to_string())
	}
}

impl From<String> for RuleDefinition {
	fn from(class: String) -> Self {
		Self::Class(class)
	}
}

impl From<RuleRef> for RuleDefinition {
	fn from(rule: RuleRef) -> Self {
		Self::Instance(rule)
	}
}

impl From<CallableRule> for RuleDefinition {
	fn from(rule: CallableRule) -> Self {
		Self::Callable(rule)
	}
}

impl From<MethodRef> for RuleDefinition {
	fn from(method: MethodRef) -> Self {
		Self::Method(method)
	}
}

/// Container-backed [`Rules`] implementation.
///
/// A class definition is accepted only when its type definition carries [`RULE_INTERFACE`];
/// lookups of unregistered names fall back to the container.
///
/// # Examples
///
/// ```
/// use palisade_di::Container;
/// use palisade_security::{AllowRule, RuleManager, Rules};
///
/// let container = Container::new();
/// container.define(AllowRule::definition());
///
/// let rules = RuleManager::new(&container);
/// rules.set("posts.any", Some(AllowRule::NAME.into())).unwrap();
/// assert!(rules.has("posts.any"));
/// assert!(rules.has(AllowRule::NAME));
/// assert!(!rules.has("posts.none"));
/// ```
pub struct RuleManager {
	rules: RwLock<HashMap<String, RuleDefinition>>,
	container: Weak<Container>,
}

impl RuleManager {
	pub const NAME: &'static str = "RuleManager";

	pub fn new(container: &Arc<Container>) -> Self {
		Self {
			rules: RwLock::new(HashMap::new()),
			container: Arc::downgrade(container),
		}
	}

	/// Declarative singleton definition registered under [`Self::NAME`], producing
	/// `Arc<dyn Rules>`.
	pub fn definition() -> TypeDefinition {
		TypeDefinition::builder::<Arc<dyn Rules>>(Self::NAME)
			.constructor(
				Signature::anonymous().param(Param::class("container", CONTAINER_ALIAS)),
				|args| {
					let container = args.cloned::<Arc<Container>>(0)?;
					let rules: Arc<dyn Rules> = Arc::new(RuleManager::new(&container));
					Ok(rules)
				},
			)
			.singleton()
			.build()
	}

	/// Registered names, sorted.
	pub fn names(&self) -> Vec<String> {
		let mut names: Vec<String> = self.rules.read().keys().cloned().collect();
		names.sort();
		names
	}

	fn container(&self, name: &str) -> SecurityResult<Arc<Container>> {
		self.container.upgrade().ok_or_else(|| {
			SecurityError::Scope(format!(
				"Unable to resolve rule '{name}', container is no longer available"
			))
		})
	}

	fn validate(&self, rule: &RuleDefinition) -> bool {
		match rule {
			RuleDefinition::Instance(_) | RuleDefinition::Callable(_) | RuleDefinition::Method(_) => true,
			RuleDefinition::Class(class) => self
				.container
				.upgrade()
				.and_then(|container| container.definition(class))
				.is_some_and(|definition| definition.implements(RULE_INTERFACE)),
		}
	}
}

impl Rules for RuleManager {
	fn set(&self, name: &str, rule: Option<RuleDefinition>) -> SecurityResult<()> {
		let rule = rule.unwrap_or_else(|| RuleDefinition::Class(name.to_string()));
		if !self.validate(&rule) {
			return Err(SecurityError::Rule(format!(
				"Unable to set rule '{name}', invalid rule body"
			)));
		}
		tracing::debug!(rule = name, definition = ?rule, "rule registered");
		self.rules.write().insert(name.to_string(), rule);
		Ok(())
	}

	fn remove(&self, name: &str) -> SecurityResult<()> {
		if !self.has(name) {
			return Err(SecurityError::Rule(format!("Undefined rule '{name}'")));
		}
		self.rules.write().remove(name);
		tracing::debug!(rule = name, "rule removed");
		Ok(())
	}

	fn has(&self, name: &str) -> bool {
		if self.rules.read().contains_key(name) {
			return true;
		}
		self.container
			.upgrade()
			.is_some_and(|container| container.is_defined(name) || container.has(name))
	}

	fn get(&self, name: &str) -> SecurityResult<RuleRef> {
		if !self.has(name) {
			return Err(SecurityError::Rule(format!("Undefined rule '{name}'")));
		}

		let rule = self
			.rules
			.read()
			.get(name)
			.cloned()
			.unwrap_or_else(|| RuleDefinition::Class(name.to_string()));

		match rule {
			RuleDefinition::Instance(rule) => Ok(rule),
			RuleDefinition::Callable(rule) => Ok(Arc::new(rule)),
			RuleDefinition::Method(method) => {
				Ok(Arc::new(CallableRule::method(&self.container(name)?, method)))
			}
			RuleDefinition::Class(class) => {
				let instance = self.container(name)?.get(&class, None)?;
				instance.cloned::<RuleRef>().ok_or_else(|| {
					SecurityError::Rule(format!(
						"Rule '{name}' must point to RuleInterface, '{}' given",
						instance.type_name()
					))
				})
			}
		}
	}
}
