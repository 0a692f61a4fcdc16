//! Rule abstraction and the name-injected [`Check`] adapter.
//!
//! A [`Rule`] decides whether an actor may perform a permission in a context. Most rules are
//! written as a [`Check`]: a function with a declared [`Signature`] whose parameters are filled
//! by name from `actor`, `permission`, `context`, every key of the context and the check's
//! aliases (`user` stands for `actor` by default). [`CheckRule`] performs that injection through
//! an [`ArgumentResolver`], so a check declares only the parameters it needs, in any order.

use std::any::Any;
use std::sync::{Arc, Weak};

use palisade_di::{
	ArgumentResolver, Arguments, DefinitionBuilder, DiResult, Instance, Param, Parameters,
	RESOLVER_ALIAS, Signature,
};

use crate::actor::ActorRef;
use crate::error::{SecurityError, SecurityResult};

/// Interface tag carried by type definitions that produce a [`RuleRef`].
pub const RULE_INTERFACE: &str = "security.rule";

/// Named values accompanying a permission check.
pub type Context = Parameters;

/// Decision logic for a role/permission pair.
pub trait Rule: Send + Sync {
	fn allows(&self, actor: &ActorRef, permission: &str, context: &Context) -> SecurityResult<bool>;
}

/// Shared rule handle; the payload rule definitions register in the container.
pub type RuleRef = Arc<dyn Rule>;

/// Starts a type definition for a rule named `name`, tagged with [`RULE_INTERFACE`].
pub fn rule_definition<R, F>(name: impl Into<String>, signature: Signature, constructor: F) -> DefinitionBuilder<RuleRef>
where
	R: Rule + Any,
	F: Fn(Arguments) -> DiResult<R> + Send + Sync + 'static,
{
	DefinitionBuilder::<RuleRef>::new(name)
		.constructor(signature, move |arguments| {
			let rule: RuleRef = Arc::new(constructor(arguments)?);
			Ok(rule)
		})
		.implements(RULE_INTERFACE)
}

/// A check function with name-injected parameters.
///
/// `actor` arrives as an [`ActorRef`] instance, `context` as a [`Context`] instance and
/// `permission` as a string value; context entries keep their own shape.
///
/// # Examples
///
/// ```
/// use palisade_di::{Arguments, DiResult, Param, Parameters, Signature};
/// use palisade_security::{ActorRef, Check};
///
/// struct OwnsPost;
///
/// impl Check for OwnsPost {
/// 	fn signature(&self) -> Signature {
/// 		Signature::new("OwnsPost::check")
/// 			.param(Param::string("author"))
/// 			.param(Param::string("username"))
/// 	}
///
/// 	fn check(&self, arguments: Arguments) -> DiResult<bool> {
/// 		Ok(arguments.str(0)? == arguments.str(1)?)
/// 	}
/// }
/// ```
pub trait Check: Send + Sync + 'static {
	/// Identity used when wrapping failures.
	fn name(&self) -> String {
		std::any::type_name::<Self>().to_string()
	}

	fn signature(&self) -> Signature;

	fn check(&self, arguments: Arguments) -> DiResult<bool>;

	/// `(alias, source)` pairs: the value under `source` is also offered as `alias`.
	fn aliases(&self) -> Vec<(&'static str, &'static str)> {
		vec![("user", "actor")]
	}
}

/// Adapts a [`Check`] into a [`Rule`].
pub struct CheckRule<C> {
	check: C,
	resolver: Weak<dyn ArgumentResolver>,
}

impl<C: Check> CheckRule<C> {
	/// The resolver is held weakly; the container that owns a rule instance must not be kept
	/// alive by it.
	pub fn new(check: C, resolver: &Arc<dyn ArgumentResolver>) -> Self {
		Self {
			check,
			resolver: Arc::downgrade(resolver),
		}
	}

	pub fn inner(&self) -> &C {
		&self.check
	}

	/// Starts a definition whose constructor receives the container's resolver as an extra
	/// trailing parameter named `resolver`; `constructor` sees the arguments of `signature`
	/// first.
	pub fn definition<F>(name: impl Into<String>, signature: Signature, constructor: F) -> DefinitionBuilder<RuleRef>
	where
		F: Fn(&Arguments) -> DiResult<C> + Send + Sync + 'static,
	{
		let signature = signature.param(Param::class("resolver", RESOLVER_ALIAS));
		rule_definition(name, signature, move |arguments| {
			let resolver = arguments.cloned::<Arc<dyn ArgumentResolver>>(arguments.len().saturating_sub(1))?;
			let check = constructor(&arguments)?;
			Ok(CheckRule::new(check, &resolver))
		})
	}

	fn parameters(&self, actor: &ActorRef, permission: &str, context: &Context) -> Parameters {
		let mut parameters = Parameters::new()
			.with("actor", Instance::new(Arc::clone(actor)))
			.with("permission", permission)
			.with("context", Instance::new(context.clone()));
		for (name, value) in context.iter() {
			parameters.insert_if_absent(name, value.clone());
		}
		for (alias, source) in self.check.aliases() {
			if let Some(value) = parameters.get(source).cloned() {
				parameters.insert(alias, value);
			}
		}
		parameters
	}
}

impl<C: Check> Rule for CheckRule<C> {
	fn allows(&self, actor: &ActorRef, permission: &str, context: &Context) -> SecurityResult<bool> {
		let name = self.check.name();
		let resolver = self.resolver.upgrade().ok_or_else(|| {
			SecurityError::Scope(format!("Unable to check rule '{name}', resolver is no longer available"))
		})?;

		let parameters = self.parameters(actor, permission, context);
		let verdict = resolver
			.resolve_arguments(&self.check.signature(), &parameters, None)
			.and_then(|arguments| self.check.check(arguments))
			.map_err(|source| SecurityError::RuleFailed {
				rule: name.clone(),
				source,
			})?;

		tracing::trace!(rule = %name, permission, allowed = verdict, "check evaluated");
		Ok(verdict)
	}
}
