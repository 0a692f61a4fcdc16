use palisade_di::{Signature, TypeDefinition};

use crate::actor::ActorRef;
use crate::error::SecurityResult;
use crate::rule::{Context, Rule, rule_definition};

/// Always denies. Used for explicit denials (`deassociate`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ForbidRule;

impl ForbidRule {
	pub const NAME: &'static str = "ForbidRule";

	/// Declarative singleton definition registered under [`Self::NAME`].
	pub fn definition() -> TypeDefinition {
		rule_definition(Self::NAME, Signature::anonymous(), |_| Ok(ForbidRule))
			.singleton()
			.build()
	}
}

impl Rule for ForbidRule {
	fn allows(&self, _actor: &ActorRef, _permission: &str, _context: &Context) -> SecurityResult<bool> {
		Ok(false)
	}
}
