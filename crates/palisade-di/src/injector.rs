//! Injector delegation.
//!
//! Types that must not be built through their constructor (for example because they need an
//! external configuration lookup keyed by the call context) are produced by an [`Injector`].
//! The container picks the injector either from an explicit `bind_injector` registration or
//! from the type's own definition ([`DefinitionBuilder::injected_by`]), fetches it through
//! itself and checks that the injector's output really is the requested type.

use std::any::{Any, TypeId};
use std::sync::Arc;

use crate::definition::DefinitionBuilder;
use crate::error::DiResult;
use crate::instance::Instance;
use crate::signature::{Arguments, Signature};

/// Describes the type an injector is asked to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
	name: String,
	type_id: TypeId,
	type_name: &'static str,
}

impl TypeDescriptor {
	pub(crate) fn new(name: impl Into<String>, type_id: TypeId, type_name: &'static str) -> Self {
		Self {
			name: name.into(),
			type_id,
			type_name,
		}
	}

	/// Registered name (alias) of the type.
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn type_id(&self) -> TypeId {
		self.type_id
	}

	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	/// Returns `true` if `instance` holds the described type.
	pub fn is_instance(&self, instance: &Instance) -> bool {
		instance.type_id() == self.type_id
	}
}

/// Factory for types that opt out of constructor autowiring.
///
/// # Examples
///
/// ```
/// use palisade_di::{DiResult, Injector, Instance, TypeDescriptor};
///
/// struct Database {
/// 	name: String,
/// }
///
/// struct DatabaseInjector;
///
/// impl Injector for DatabaseInjector {
/// 	fn create_injection(
/// 		&self,
/// 		_target: &TypeDescriptor,
/// 		context: Option<&str>,
/// 	) -> DiResult<Instance> {
/// 		Ok(Instance::new(Database {
/// 			name: context.unwrap_or("default").to_string(),
/// 		}))
/// 	}
/// }
/// ```
pub trait Injector: Send + Sync {
	/// Produces an instance of `target`; `context` is the name of the parameter being filled
	/// or the context passed to `get`.
	fn create_injection(&self, target: &TypeDescriptor, context: Option<&str>) -> DiResult<Instance>;
}

/// Shared injector handle, the payload the container expects behind an injector alias.
pub type InjectorRef = Arc<dyn Injector>;

/// Wraps an injector into the instance shape the container recognizes.
pub fn injector_instance(injector: impl Injector + 'static) -> Instance {
	let injector: InjectorRef = Arc::new(injector);
	Instance::new(injector)
}

/// Starts a type definition for an injector named `name`, so the injector itself can be
/// autowired with its own dependencies.
pub fn definition<I, F>(name: impl Into<String>, signature: Signature, constructor: F) -> DefinitionBuilder<InjectorRef>
where
	I: Injector + Any,
	F: Fn(Arguments) -> DiResult<I> + Send + Sync + 'static,
{
	DefinitionBuilder::<InjectorRef>::new(name).constructor(signature, move |arguments| {
		let injector: InjectorRef = Arc::new(constructor(arguments)?);
		Ok(injector)
	})
}
