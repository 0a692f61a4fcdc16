//! Type definitions: the registration-time replacement for constructor reflection.
//!
//! A [`TypeDefinition`] tells the container that a type named `name` exists, how to construct
//! it (or that it cannot be constructed), which methods a `[resolver, method]` binding may call
//! on it, and which capabilities it declares:
//!
//! - `singleton()`: the first autowired instance built without explicit parameters is
//!   registered under the type's own name and reused.
//! - `injected_by(alias)`: construction is always delegated to the injector behind `alias`.
//! - `implements(tag)`: free-form interface tags (the security crate tags rules with one).

use std::any::{Any, TypeId};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::injector::TypeDescriptor;
use crate::instance::Instance;
use crate::signature::{Arguments, Signature};

type ConstructorBody = Arc<dyn Fn(Arguments) -> DiResult<Instance> + Send + Sync>;
type MethodBody = Arc<dyn Fn(&Instance, Arguments) -> DiResult<Instance> + Send + Sync>;

/// Constructor of a defined type.
#[derive(Clone)]
pub struct ConstructorDefinition {
	signature: Signature,
	body: ConstructorBody,
}

impl ConstructorDefinition {
	pub fn signature(&self) -> &Signature {
		&self.signature
	}

	pub fn construct(&self, arguments: Arguments) -> DiResult<Instance> {
		(self.body)(arguments)
	}
}

/// Method of a defined type callable through a [`MethodRef`](crate::MethodRef) binding.
#[derive(Clone)]
pub struct MethodDefinition {
	signature: Signature,
	body: MethodBody,
}

impl MethodDefinition {
	pub fn signature(&self) -> &Signature {
		&self.signature
	}

	pub fn invoke(&self, receiver: &Instance, arguments: Arguments) -> DiResult<Instance> {
		(self.body)(receiver, arguments)
	}
}

/// Registered description of a type.
#[derive(Clone)]
pub struct TypeDefinition {
	name: String,
	type_id: TypeId,
	type_name: &'static str,
	constructor: Option<ConstructorDefinition>,
	methods: HashMap<String, MethodDefinition>,
	singleton: bool,
	injector: Option<String>,
	interfaces: BTreeSet<String>,
}

impl TypeDefinition {
	/// Starts a definition for `T` registered under `name`.
	pub fn builder<T: Any + Send + Sync>(name: impl Into<String>) -> DefinitionBuilder<T> {
		DefinitionBuilder::new(name)
	}

	/// Starts a definition for `T` registered under its Rust type name, the alias
	/// [`Param::of`](crate::Param::of) and [`Container::resolve`](crate::Container::resolve) use.
	pub fn builder_of<T: Any + Send + Sync>() -> DefinitionBuilder<T> {
		DefinitionBuilder::new(std::any::type_name::<T>())
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn type_id(&self) -> TypeId {
		self.type_id
	}

	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	pub fn descriptor(&self) -> TypeDescriptor {
		TypeDescriptor::new(&self.name, self.type_id, self.type_name)
	}

	pub fn constructor(&self) -> Option<&ConstructorDefinition> {
		self.constructor.as_ref()
	}

	/// `false` for abstract definitions, which can only be produced by an injector.
	pub fn is_instantiable(&self) -> bool {
		self.constructor.is_some()
	}

	pub fn method(&self, name: &str) -> Option<&MethodDefinition> {
		self.methods.get(name)
	}

	pub fn is_singleton(&self) -> bool {
		self.singleton
	}

	/// Alias of the self-declared injector.
	pub fn injector(&self) -> Option<&str> {
		self.injector.as_deref()
	}

	pub fn implements(&self, tag: &str) -> bool {
		self.interfaces.contains(tag)
	}
}

impl fmt::Debug for TypeDefinition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut methods: Vec<&String> = self.methods.keys().collect();
		methods.sort();
		f.debug_struct("TypeDefinition")
			.field("name", &self.name)
			.field("type_name", &self.type_name)
			.field("instantiable", &self.is_instantiable())
			.field("methods", &methods)
			.field("singleton", &self.singleton)
			.field("injector", &self.injector)
			.field("interfaces", &self.interfaces)
			.finish()
	}
}

/// Typed builder for [`TypeDefinition`].
///
/// # Examples
///
/// ```
/// use palisade_di::{Container, Param, Signature, TypeDefinition};
///
/// struct Clock;
/// struct Scheduler {
/// 	clock: std::sync::Arc<Clock>,
/// }
///
/// impl Scheduler {
/// 	fn interval(&self, seconds: i64) -> i64 {
/// 		seconds * 1000
/// 	}
/// }
///
/// let container = Container::new();
/// container
/// 	.define(
/// 		TypeDefinition::builder::<Clock>("Clock")
/// 			.constructor(Signature::anonymous(), |_| Ok(Clock))
/// 			.singleton()
/// 			.build(),
/// 	)
/// 	.define(
/// 		TypeDefinition::builder::<Scheduler>("Scheduler")
/// 			.constructor(
/// 				Signature::anonymous().param(Param::class("clock", "Clock")),
/// 				|args| Ok(Scheduler { clock: args.instance::<Clock>(0)? }),
/// 			)
/// 			.method(
/// 				"interval",
/// 				Signature::anonymous().param(Param::int("seconds")),
/// 				|scheduler, args| Ok(scheduler.interval(args.int(0)?)),
/// 			)
/// 			.build(),
/// 	);
///
/// let scheduler = container.get_as::<Scheduler>("Scheduler", None).unwrap();
/// let clock = container.get_as::<Clock>("Clock", None).unwrap();
/// assert!(std::sync::Arc::ptr_eq(&scheduler.clock, &clock));
/// ```
pub struct DefinitionBuilder<T> {
	definition: TypeDefinition,
	_marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> DefinitionBuilder<T> {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			definition: TypeDefinition {
				name: name.into(),
				type_id: TypeId::of::<T>(),
				type_name: std::any::type_name::<T>(),
				constructor: None,
				methods: HashMap::new(),
				singleton: false,
				injector: None,
				interfaces: BTreeSet::new(),
			},
			_marker: PhantomData,
		}
	}

	/// Sets the constructor. An anonymous signature is named `{name}::new`.
	pub fn constructor<F>(mut self, signature: Signature, constructor: F) -> Self
	where
		F: Fn(Arguments) -> DiResult<T> + Send + Sync + 'static,
	{
		let name = &self.definition.name;
		self.definition.constructor = Some(ConstructorDefinition {
			signature: signature.named_or(|| format!("{name}::new")),
			body: Arc::new(move |arguments| constructor(arguments).map(Instance::new)),
		});
		self
	}

	/// Registers a method a `[resolver, method]` binding may call.
	pub fn method<R, F>(mut self, method: impl Into<String>, signature: Signature, f: F) -> Self
	where
		R: Any + Send + Sync,
		F: Fn(&T, Arguments) -> DiResult<R> + Send + Sync + 'static,
	{
		let method = method.into();
		let callable = format!("{}::{}", self.definition.name, method);
		let signature = signature.named_or(|| callable.clone());
		let body: MethodBody = Arc::new(move |receiver: &Instance, arguments| {
			let target = receiver.downcast_ref::<T>().ok_or_else(|| {
				DiError::Container(format!(
					"Method '{callable}' cannot be called on '{}'",
					receiver.type_name()
				))
			})?;
			f(target, arguments).map(Instance::new)
		});
		self.definition
			.methods
			.insert(method, MethodDefinition { signature, body });
		self
	}

	/// Declares the type a singleton.
	pub fn singleton(mut self) -> Self {
		self.definition.singleton = true;
		self
	}

	/// Delegates construction to the injector bound under `alias`.
	pub fn injected_by(mut self, alias: impl Into<String>) -> Self {
		self.definition.injector = Some(alias.into());
		self
	}

	/// Tags the type with an interface name.
	pub fn implements(mut self, tag: impl Into<String>) -> Self {
		self.definition.interfaces.insert(tag.into());
		self
	}

	pub fn build(self) -> TypeDefinition {
		self.definition
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::signature::{Argument, Param};
	use rstest::rstest;

	struct Counter {
		start: i64,
	}

	fn counter_definition() -> TypeDefinition {
		TypeDefinition::builder::<Counter>("Counter")
			.constructor(
				Signature::anonymous().param(Param::int("start")),
				|args| Ok(Counter { start: args.int(0)? }),
			)
			.method("next", Signature::anonymous(), |counter, _| Ok(counter.start + 1))
			.implements("countable")
			.build()
	}

	#[rstest]
	fn test_anonymous_signatures_are_named_after_type() {
		// Arrange
		let definition = counter_definition();

		// Act
		let constructor = definition.constructor().unwrap();
		let method = definition.method("next").unwrap();

		// Assert
		assert_eq!(constructor.signature().callable(), "Counter::new");
		assert_eq!(method.signature().callable(), "Counter::next");
	}

	#[rstest]
	fn test_method_invocation_downcasts_receiver() {
		// Arrange
		let definition = counter_definition();
		let receiver = Instance::new(Counter { start: 41 });
		let stranger = Instance::new("not a counter".to_string());
		let method = definition.method("next").unwrap();

		// Act
		let result = method.invoke(&receiver, Arguments::new("Counter::next")).unwrap();
		let error = method.invoke(&stranger, Arguments::new("Counter::next")).unwrap_err();

		// Assert
		assert_eq!(result.downcast_ref::<i64>(), Some(&42));
		assert!(matches!(error, DiError::Container(_)));
	}

	#[rstest]
	fn test_capabilities() {
		// Arrange
		let plain = counter_definition();
		let tagged = TypeDefinition::builder::<Counter>("Counter")
			.singleton()
			.injected_by("counter.injector")
			.build();

		// Act & Assert
		assert!(plain.implements("countable"));
		assert!(!plain.is_singleton());
		assert!(plain.is_instantiable());
		assert!(tagged.is_singleton());
		assert_eq!(tagged.injector(), Some("counter.injector"));
		assert!(!tagged.is_instantiable());
	}

	#[rstest]
	fn test_descriptor_checks_instances() {
		// Arrange
		let definition = counter_definition();
		let mut arguments = Arguments::new("Counter::new");
		arguments.push("start", Argument::Value(serde_json::json!(3)));

		// Act
		let built = definition.constructor().unwrap().construct(arguments).unwrap();

		// Assert
		assert!(definition.descriptor().is_instance(&built));
		assert!(!definition.descriptor().is_instance(&Instance::new(3_i64)));
	}
}
