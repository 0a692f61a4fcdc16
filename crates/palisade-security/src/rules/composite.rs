use std::sync::Arc;

use palisade_di::{Param, Signature, TypeDefinition};

use crate::actor::ActorRef;
use crate::error::SecurityResult;
use crate::rule::{Context, Rule, rule_definition};
use crate::rule_manager::{RULES_ALIAS, Rules};

/// How a [`CompositeRule`] combines its rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Behaviour {
	/// Every rule must allow; stops at the first denial.
	#[default]
	All,
	/// One allowing rule is enough; stops at the first allow.
	AtLeastOne,
}

/// Boolean combination of rules looked up by name.
///
/// An `All` composite without rules allows.
pub struct CompositeRule {
	behaviour: Behaviour,
	rules: Vec<String>,
	repository: Arc<dyn Rules>,
}

impl CompositeRule {
	pub fn new<I, S>(behaviour: Behaviour, rules: I, repository: Arc<dyn Rules>) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			behaviour,
			rules: rules.into_iter().map(Into::into).collect(),
			repository,
		}
	}

	/// Definition of a composite registered under `name`, wired to the rule registry bound
	/// under [`RULES_ALIAS`].
	pub fn definition<I, S>(name: impl Into<String>, behaviour: Behaviour, rules: I) -> TypeDefinition
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let rules: Vec<String> = rules.into_iter().map(Into::into).collect();
		rule_definition(
			name,
			Signature::anonymous().param(Param::class("repository", RULES_ALIAS)),
			move |args| {
				let repository = args.cloned::<Arc<dyn Rules>>(0)?;
				Ok(CompositeRule::new(behaviour, rules.clone(), repository))
			},
		)
		.build()
	}

	pub fn behaviour(&self) -> Behaviour {
		self.behaviour
	}

	pub fn rules(&self) -> &[String] {
		&self.rules
	}
}

impl Rule for CompositeRule {
	fn allows(&self, actor: &ActorRef, permission: &str, context: &Context) -> SecurityResult<bool> {
		let mut allowed = 0;
		for name in &self.rules {
			let rule = self.repository.get(name)?;
			if rule.allows(actor, permission, context)? {
				if self.behaviour == Behaviour::AtLeastOne {
					return Ok(true);
				}
				allowed += 1;
			} else if self.behaviour == Behaviour::All {
				return Ok(false);
			}
		}
		Ok(allowed == self.rules.len())
	}
}
