use palisade_di::{Signature, TypeDefinition};

use crate::actor::ActorRef;
use crate::error::SecurityResult;
use crate::rule::{Context, Rule, rule_definition};

/// Always allows.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowRule;

impl AllowRule {
	pub const NAME: &'static str = "AllowRule";

	/// Declarative singleton definition registered under [`Self::NAME`].
	pub fn definition() -> TypeDefinition {
		rule_definition(Self::NAME, Signature::anonymous(), |_| Ok(AllowRule))
			.singleton()
			.build()
	}
}

impl Rule for AllowRule {
	fn allows(&self, _actor: &ActorRef, _permission: &str, _context: &Context) -> SecurityResult<bool> {
		Ok(true)
	}
}
