//! Late-bound construction requests.

use crate::container::Factory;
use crate::error::DiResult;
use crate::instance::Instance;
use crate::parameters::{Parameter, Parameters};

/// A deferred `make` call: target alias plus fixed parameters.
///
/// An `Autowire` can be stored in a binding or in a parameter bag and resolved later against
/// any [`Factory`]. Parameters supplied at resolution time take priority over the ones baked
/// into the reference.
///
/// # Examples
///
/// ```
/// use palisade_di::{Autowire, Container, Param, Parameters, Signature, TypeDefinition};
///
/// struct Pool {
/// 	size: i64,
/// }
///
/// let container = Container::new();
/// container.define(
/// 	TypeDefinition::builder::<Pool>("Pool")
/// 		.constructor(
/// 			Signature::anonymous().param(Param::int("size").with_default(4)),
/// 			|args| Ok(Pool { size: args.int(0)? }),
/// 		)
/// 		.build(),
/// );
///
/// let reference = Autowire::new("Pool").with("size", 8);
/// let pool = reference.resolve(&*container, &Parameters::new()).unwrap();
/// assert_eq!(pool.downcast_ref::<Pool>().map(|p| p.size), Some(8));
///
/// let overridden = reference
/// 	.resolve(&*container, &Parameters::new().with("size", 16))
/// 	.unwrap();
/// assert_eq!(overridden.downcast_ref::<Pool>().map(|p| p.size), Some(16));
/// ```
#[derive(Debug, Clone)]
pub struct Autowire {
	alias: String,
	parameters: Parameters,
}

impl Autowire {
	pub fn new(alias: impl Into<String>) -> Self {
		Self {
			alias: alias.into(),
			parameters: Parameters::new(),
		}
	}

	pub fn with_parameters(alias: impl Into<String>, parameters: Parameters) -> Self {
		Self {
			alias: alias.into(),
			parameters,
		}
	}

	/// Adds one baked-in parameter.
	pub fn with(mut self, name: impl Into<String>, parameter: impl Into<Parameter>) -> Self {
		self.parameters.insert(name, parameter);
		self
	}

	pub fn alias(&self) -> &str {
		&self.alias
	}

	pub fn parameters(&self) -> &Parameters {
		&self.parameters
	}

	/// Resolves the reference through `factory.make`.
	pub fn resolve(&self, factory: &dyn Factory, parameters: &Parameters) -> DiResult<Instance> {
		let merged = parameters.merged_over(&self.parameters);
		tracing::trace!(alias = %self.alias, parameters = merged.len(), "resolving late reference");
		factory.make(&self.alias, &merged, None)
	}
}
