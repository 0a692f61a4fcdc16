//! The container: binding registry, autowiring factory and argument resolver.
//!
//! ## Resolution order
//!
//! `get(alias)` delegates to the outer locator when one is configured and knows the alias,
//! otherwise it calls `make(alias)`, which:
//!
//! 1. autowires the type registered under `alias` when no binding exists,
//! 2. returns a bound instance unchanged,
//! 3. follows an alias redirect,
//! 4. evaluates a factory, memoizing the result when the factory is a singleton.
//!
//! ## Concurrency
//!
//! Registries sit behind `parking_lot::RwLock`s and no lock is held while user code runs.
//! A singleton factory is evaluated at most once through its `OnceCell`; concurrent first
//! callers block on the cell and observe the same instance. Declarative singletons are built
//! under a per-definition mutex with a second binding lookup once the mutex is held.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use crate::binding::{Binding, BindingKind, FactoryBinding, Resolvable, Target};
use crate::callable::MethodRef;
use crate::cycle_detection::{ScopeId, begin_resolution};
use crate::definition::TypeDefinition;
use crate::error::{DiError, DiResult};
use crate::injector::InjectorRef;
use crate::instance::Instance;
use crate::parameters::{Parameter, Parameters};
use crate::signature::{Argument, Arguments, Param, ParamType, Signature, is_numeric};

/// Alias resolving to the container itself (`Arc<Container>`).
pub const CONTAINER_ALIAS: &str = "di.container";
/// Alias resolving to the container as `Arc<dyn Locator>`.
pub const LOCATOR_ALIAS: &str = "di.locator";
/// Alias resolving to the container as `Arc<dyn Factory>`.
pub const FACTORY_ALIAS: &str = "di.factory";
/// Alias resolving to the container as `Arc<dyn ArgumentResolver>`.
pub const RESOLVER_ALIAS: &str = "di.resolver";

/// Read access to resolvable aliases.
pub trait Locator: Send + Sync {
	fn has(&self, alias: &str) -> bool;

	/// Resolves `alias`; `context` is forwarded to injectors.
	fn get(&self, alias: &str, context: Option<&str>) -> DiResult<Instance>;
}

/// Construction with explicit parameters, bypassing outer delegation.
pub trait Factory: Send + Sync {
	fn make(&self, alias: &str, parameters: &Parameters, context: Option<&str>) -> DiResult<Instance>;
}

/// Turns a signature and a parameter bag into positional arguments.
pub trait ArgumentResolver: Send + Sync {
	fn resolve_arguments(
		&self,
		signature: &Signature,
		parameters: &Parameters,
		context: Option<&str>,
	) -> DiResult<Arguments>;
}

struct Registration {
	definition: TypeDefinition,
	construction: Mutex<()>,
}

/// Dependency-injection container.
///
/// A container is always shared through `Arc<Container>` and never duplicated: it does not
/// implement `Clone`, so cached singletons can't be split between two copies.
///
/// ```compile_fail
/// use palisade_di::Container;
///
/// let container = Container::new();
/// let copy: Container = (*container).clone();
/// ```
///
/// # Examples
///
/// ```
/// use palisade_di::{Callable, Container, Signature, TypeDefinition};
///
/// struct Logger;
/// struct Cache;
///
/// let container = Container::new();
/// container.define(
/// 	TypeDefinition::builder::<Logger>("Logger")
/// 		.constructor(Signature::anonymous(), |_| Ok(Logger))
/// 		.build(),
/// );
/// container
/// 	.bind("logger", "Logger")
/// 	.bind_singleton("cache", Callable::new(Signature::anonymous(), |_| Ok(Cache)));
///
/// let first = container.get("cache", None).unwrap();
/// let second = container.get("cache", None).unwrap();
/// assert!(first.ptr_eq(&second));
///
/// let a = container.get("logger", None).unwrap();
/// let b = container.get("logger", None).unwrap();
/// assert!(!a.ptr_eq(&b));
/// ```
pub struct Container {
	outer: Option<Arc<dyn Locator>>,
	bindings: RwLock<HashMap<String, Binding>>,
	injectors: RwLock<HashMap<String, String>>,
	definitions: RwLock<HashMap<String, Arc<Registration>>>,
	this: Weak<Container>,
}

impl Container {
	/// Creates an empty container.
	pub fn new() -> Arc<Self> {
		Self::build(None)
	}

	/// Creates a container that delegates `get` to `outer` for every alias `outer` has.
	pub fn with_outer(outer: Arc<dyn Locator>) -> Arc<Self> {
		Self::build(Some(outer))
	}

	// Containers only live behind `Arc`, so the address is stable for their lifetime.
	fn scope_id(&self) -> ScopeId {
		std::ptr::from_ref(self) as ScopeId
	}

	fn build(outer: Option<Arc<dyn Locator>>) -> Arc<Self> {
		Arc::new_cyclic(|this| Self {
			outer,
			bindings: RwLock::new(HashMap::new()),
			injectors: RwLock::new(HashMap::new()),
			definitions: RwLock::new(HashMap::new()),
			this: this.clone(),
		})
	}

	// ------------------------------------------------------------------
	// Registration
	// ------------------------------------------------------------------

	/// Binds `resolvable` to `alias`, replacing any previous binding.
	pub fn bind(&self, alias: impl Into<String>, resolvable: impl Into<Resolvable>) -> &Self {
		let alias = alias.into();
		let binding = Binding::plain(resolvable.into());
		tracing::debug!(alias = %alias, kind = ?binding.kind(), "bind");
		self.bindings.write().insert(alias, binding);
		self
	}

	/// Binds `resolvable` to `alias` and caches the first produced instance.
	pub fn bind_singleton(&self, alias: impl Into<String>, resolvable: impl Into<Resolvable>) -> &Self {
		let alias = alias.into();
		let binding = Binding::singleton(resolvable.into());
		tracing::debug!(alias = %alias, kind = ?binding.kind(), "bind singleton");
		self.bindings.write().insert(alias, binding);
		self
	}

	/// Routes construction of `class` through the injector bound under an alias.
	///
	/// Only an alias is accepted; any other resolvable is rejected with
	/// [`DiError::Container`].
	pub fn bind_injector(&self, class: impl Into<String>, injector: impl Into<Resolvable>) -> DiResult<&Self> {
		let class = class.into();
		let Resolvable::Alias(injector) = injector.into() else {
			return Err(DiError::Container(
				"Injector can only be set as string binding".to_string(),
			));
		};
		tracing::debug!(class = %class, injector = %injector, "bind injector");
		self.injectors.write().insert(class, injector);
		Ok(self)
	}

	/// Registers a type definition under its name.
	pub fn define(&self, definition: TypeDefinition) -> &Self {
		let name = definition.name().to_string();
		tracing::debug!(
			class = %name,
			singleton = definition.is_singleton(),
			injector = ?definition.injector(),
			"define type"
		);
		self.definitions.write().insert(
			name,
			Arc::new(Registration {
				definition,
				construction: Mutex::new(()),
			}),
		);
		self
	}

	/// Drops the binding for `alias`; returns `false` if there was none.
	pub fn remove_binding(&self, alias: &str) -> bool {
		self.bindings.write().remove(alias).is_some()
	}

	/// Drops the explicit injector registration for `class`.
	pub fn remove_injector(&self, class: &str) -> bool {
		self.injectors.write().remove(class).is_some()
	}

	// ------------------------------------------------------------------
	// Introspection
	// ------------------------------------------------------------------

	/// Returns `true` if `class` is constructed through an injector, either registered
	/// explicitly or declared by its definition.
	pub fn has_injector(&self, class: &str) -> bool {
		self.injector_for(class).is_some()
	}

	/// Returns `true` if `alias` (after following alias redirects) holds a built instance.
	pub fn has_instance(&self, alias: &str) -> bool {
		let bindings = self.bindings.read();
		let mut visited = HashSet::new();
		let mut current = alias;
		while visited.insert(current) {
			match bindings.get(current) {
				Some(Binding::Instance(_)) => return true,
				Some(Binding::Alias(next)) => current = next,
				_ => return false,
			}
		}
		false
	}

	/// Shape of the binding registered directly under `alias`.
	pub fn binding_kind(&self, alias: &str) -> Option<BindingKind> {
		self.bindings.read().get(alias).map(Binding::kind)
	}

	/// All bindings, sorted by alias.
	pub fn bindings(&self) -> Vec<(String, BindingKind)> {
		let mut bindings: Vec<(String, BindingKind)> = self
			.bindings
			.read()
			.iter()
			.map(|(alias, binding)| (alias.clone(), binding.kind()))
			.collect();
		bindings.sort_by(|a, b| a.0.cmp(&b.0));
		bindings
	}

	/// Explicit injector registrations, sorted by class.
	pub fn injectors(&self) -> Vec<(String, String)> {
		let mut injectors: Vec<(String, String)> = self
			.injectors
			.read()
			.iter()
			.map(|(class, injector)| (class.clone(), injector.clone()))
			.collect();
		injectors.sort();
		injectors
	}

	/// Returns `true` if a type definition is registered under `class`.
	pub fn is_defined(&self, class: &str) -> bool {
		self.definitions.read().contains_key(class)
	}

	/// Registered type definition for `class`.
	pub fn definition(&self, class: &str) -> Option<TypeDefinition> {
		self.definitions
			.read()
			.get(class)
			.map(|registration| registration.definition.clone())
	}

	// ------------------------------------------------------------------
	// Typed access
	// ------------------------------------------------------------------

	/// Resolves `alias` and downcasts the result to `T`.
	pub fn get_as<T: Any + Send + Sync>(&self, alias: &str, context: Option<&str>) -> DiResult<Arc<T>> {
		let instance = self.get(alias, context)?;
		instance
			.downcast::<T>()
			.ok_or_else(|| mismatch(alias, &instance, std::any::type_name::<T>()))
	}

	/// Resolves `alias` and clones a `T` out of it; used for `Arc<dyn Trait>` payloads.
	pub fn get_cloned<T: Any + Clone>(&self, alias: &str, context: Option<&str>) -> DiResult<T> {
		let instance = self.get(alias, context)?;
		instance
			.cloned::<T>()
			.ok_or_else(|| mismatch(alias, &instance, std::any::type_name::<T>()))
	}

	/// Resolves `T` under its Rust type name.
	pub fn resolve<T: Any + Send + Sync>(&self) -> DiResult<Arc<T>> {
		self.get_as::<T>(std::any::type_name::<T>(), None)
	}

	/// Calls a `[resolver, method]` pair with `parameters`.
	pub fn invoke(&self, method: &MethodRef, parameters: &Parameters) -> DiResult<Instance> {
		self.call_method(method, parameters, None)
	}

	// ------------------------------------------------------------------
	// Resolution
	// ------------------------------------------------------------------

	/// Returns `true` if the outer locator or a binding knows `alias`.
	pub fn has(&self, alias: &str) -> bool {
		if let Some(outer) = &self.outer
			&& outer.has(alias)
		{
			return true;
		}
		is_self_alias(alias) || self.bindings.read().contains_key(alias)
	}

	/// Resolves `alias`, delegating to the outer locator when it has the alias.
	///
	/// `context` reaches injectors; it is dropped when the outer locator answers.
	pub fn get(&self, alias: &str, context: Option<&str>) -> DiResult<Instance> {
		if let Some(outer) = &self.outer
			&& outer.has(alias)
		{
			tracing::trace!(alias, "delegating to outer locator");
			return outer.get(alias, None);
		}
		self.make(alias, &Parameters::new(), context)
	}

	/// Resolves `alias` locally with explicit constructor parameters.
	pub fn make(&self, alias: &str, parameters: &Parameters, context: Option<&str>) -> DiResult<Instance> {
		tracing::trace!(alias, parameters = parameters.len(), context = ?context, "make");
		let _guard = begin_resolution(self.scope_id(), alias)?;

		let binding = self.bindings.read().get(alias).cloned();
		match binding {
			None => match self.self_reference(alias) {
				Some(instance) => instance,
				None => self.autowire(alias, parameters, context),
			},
			Some(Binding::Instance(instance)) => Ok(instance),
			Some(Binding::Alias(target)) => self.make(&target, parameters, context),
			Some(Binding::Factory(factory)) if !factory.singleton => {
				self.evaluate(&factory.target, parameters, context)
			}
			Some(Binding::Factory(factory)) => {
				let instance = factory
					.cell
					.get_or_try_init(|| self.evaluate(&factory.target, parameters, context))?
					.clone();
				self.memoize(alias, &factory, &instance);
				Ok(instance)
			}
		}
	}

	/// Produces positional arguments for `signature`.
	///
	/// Per parameter, in order: an object supplied under the parameter name (late references
	/// are resolved), then for class-typed parameters a container lookup with the parameter
	/// name as context (null when optional and not autowirable), and for scalar parameters
	/// the supplied value after a type check, then the default value.
	pub fn resolve_arguments(
		&self,
		signature: &Signature,
		parameters: &Parameters,
		context: Option<&str>,
	) -> DiResult<Arguments> {
		tracing::trace!(callable = signature.callable(), context = ?context, "resolving arguments");
		let mut arguments = Arguments::new(signature.callable());

		for param in signature.params() {
			let name = param.name();

			match parameters.get(name) {
				Some(Parameter::Instance(instance)) => {
					arguments.push(name, Argument::Instance(instance.clone()));
					continue;
				}
				Some(Parameter::Autowire(reference)) => {
					let instance = reference.resolve(self, &Parameters::new())?;
					arguments.push(name, Argument::Instance(instance));
					continue;
				}
				_ => {}
			}

			let ParamType::Class(class) = param.ty() else {
				if let Some(value) = parameters.get(name).and_then(Parameter::as_value) {
					assert_type(param, signature, value)?;
					arguments.push(name, Argument::Value(value.clone()));
				} else if let Some(default) = param.default() {
					arguments.push(name, Argument::Value(default.clone()));
				} else {
					return Err(DiError::argument(name, signature.callable()));
				}
				continue;
			};

			match self.get(class, Some(name)) {
				Ok(instance) => arguments.push(name, Argument::Instance(instance)),
				Err(error) if error.is_autowire_failure() && param.is_optional() => {
					tracing::trace!(parameter = name, class = %class, %error, "optional dependency skipped");
					arguments.push(name, Argument::Value(Value::Null));
				}
				Err(error) => return Err(error),
			}
		}

		Ok(arguments)
	}

	fn self_reference(&self, alias: &str) -> Option<DiResult<Instance>> {
		if !is_self_alias(alias) {
			return None;
		}
		let Some(this) = self.this.upgrade() else {
			return Some(Err(DiError::Container(
				"Container is no longer available".to_string(),
			)));
		};
		let instance = match alias {
			LOCATOR_ALIAS => {
				let locator: Arc<dyn Locator> = this;
				Instance::new(locator)
			}
			FACTORY_ALIAS => {
				let factory: Arc<dyn Factory> = this;
				Instance::new(factory)
			}
			RESOLVER_ALIAS => {
				let resolver: Arc<dyn ArgumentResolver> = this;
				Instance::new(resolver)
			}
			_ => Instance::new(this),
		};
		Some(Ok(instance))
	}

	fn memoize(&self, alias: &str, factory: &Arc<FactoryBinding>, instance: &Instance) {
		let mut bindings = self.bindings.write();
		let current = matches!(
			bindings.get(alias),
			Some(Binding::Factory(stored)) if Arc::ptr_eq(stored, factory)
		);
		if current {
			bindings.insert(alias.to_string(), Binding::Instance(instance.clone()));
			tracing::debug!(alias, "singleton binding memoized");
		}
	}

	fn evaluate(
		&self,
		target: &Target,
		parameters: &Parameters,
		context: Option<&str>,
	) -> DiResult<Instance> {
		match target {
			Target::Alias(alias) => self.make(alias, parameters, context),
			Target::Autowire(reference) => reference.resolve(self, parameters),
			Target::Closure(callable) => {
				let arguments = self.resolve_arguments(callable.signature(), parameters, context)?;
				callable.call(arguments)
			}
			Target::Method(method) => self.call_method(method, parameters, context),
		}
	}

	fn call_method(
		&self,
		method: &MethodRef,
		parameters: &Parameters,
		context: Option<&str>,
	) -> DiResult<Instance> {
		let receiver = self.get(method.resolver(), None)?;
		let registration = self.method_owner(method.resolver(), &receiver).ok_or_else(|| {
			DiError::Container(format!(
				"Invalid binding for '{method}': no definition for '{}'",
				receiver.type_name()
			))
		})?;
		let definition = registration.definition.method(method.method()).ok_or_else(|| {
			DiError::Container(format!(
				"Invalid binding for '{method}': undefined method '{}' in '{}'",
				method.method(),
				registration.definition.name()
			))
		})?;
		let arguments = self.resolve_arguments(definition.signature(), parameters, context)?;
		definition.invoke(&receiver, arguments)
	}

	/// Finds the definition describing `receiver`, first along the alias chain of `resolver`,
	/// then by type.
	fn method_owner(&self, resolver: &str, receiver: &Instance) -> Option<Arc<Registration>> {
		let mut chain = vec![resolver.to_string()];
		{
			let bindings = self.bindings.read();
			let mut current = resolver.to_string();
			loop {
				let next = match bindings.get(&current) {
					Some(Binding::Alias(next)) => next.clone(),
					Some(Binding::Factory(factory)) => match &factory.target {
						Target::Alias(next) => next.clone(),
						Target::Autowire(reference) => reference.alias().to_string(),
						_ => break,
					},
					_ => break,
				};
				if chain.contains(&next) {
					break;
				}
				chain.push(next.clone());
				current = next;
			}
		}

		let definitions = self.definitions.read();
		chain
			.iter()
			.filter_map(|name| definitions.get(name))
			.find(|registration| registration.definition.type_id() == receiver.type_id())
			.or_else(|| {
				definitions
					.values()
					.find(|registration| registration.definition.type_id() == receiver.type_id())
			})
			.cloned()
	}

	fn injector_for(&self, class: &str) -> Option<String> {
		if let Some(injector) = self.injectors.read().get(class) {
			return Some(injector.clone());
		}
		self.definitions
			.read()
			.get(class)
			.and_then(|registration| registration.definition.injector().map(str::to_string))
	}

	/// Constructs `class` from its definition.
	fn autowire(&self, class: &str, parameters: &Parameters, context: Option<&str>) -> DiResult<Instance> {
		let registration = self
			.definitions
			.read()
			.get(class)
			.cloned()
			.ok_or_else(|| DiError::NotFound(class.to_string()))?;

		if !(registration.definition.is_singleton() && parameters.is_empty()) {
			return self.create_instance(&registration.definition, parameters, context);
		}

		let _construction = registration.construction.lock();
		let existing = self.bindings.read().get(class).cloned();
		if let Some(Binding::Instance(instance)) = existing {
			return Ok(instance);
		}

		let instance = self.create_instance(&registration.definition, parameters, context)?;
		let mut bindings = self.bindings.write();
		if !bindings.contains_key(class) {
			bindings.insert(class.to_string(), Binding::Instance(instance.clone()));
			tracing::debug!(class, "declarative singleton registered");
		}
		Ok(instance)
	}

	fn create_instance(
		&self,
		definition: &TypeDefinition,
		parameters: &Parameters,
		context: Option<&str>,
	) -> DiResult<Instance> {
		let class = definition.name();

		if parameters.is_empty()
			&& let Some(injector) = self.injector_for(class)
		{
			return self.inject(definition, &injector, context);
		}

		let constructor = definition.constructor().ok_or_else(|| {
			DiError::Container(format!("Class '{class}' can not be constructed"))
		})?;
		tracing::debug!(class, "autowiring constructor");
		let arguments = self.resolve_arguments(constructor.signature(), parameters, None)?;
		constructor.construct(arguments)
	}

	fn inject(&self, definition: &TypeDefinition, injector: &str, context: Option<&str>) -> DiResult<Instance> {
		let class = definition.name();
		tracing::debug!(class, injector, context = ?context, "delegating construction to injector");

		let candidate = self.get(injector, None)?;
		let Some(injector) = candidate.cloned::<InjectorRef>() else {
			return Err(DiError::Injection(format!(
				"Class '{}' must be an instance of Injector for '{class}'",
				candidate.type_name()
			)));
		};

		let descriptor = definition.descriptor();
		let instance = injector.create_injection(&descriptor, context)?;
		if !descriptor.is_instance(&instance) {
			return Err(DiError::Injection(format!(
				"Invalid injection response for '{class}'"
			)));
		}
		Ok(instance)
	}
}

impl Locator for Container {
	fn has(&self, alias: &str) -> bool {
		Container::has(self, alias)
	}

	fn get(&self, alias: &str, context: Option<&str>) -> DiResult<Instance> {
		Container::get(self, alias, context)
	}
}

impl Factory for Container {
	fn make(&self, alias: &str, parameters: &Parameters, context: Option<&str>) -> DiResult<Instance> {
		Container::make(self, alias, parameters, context)
	}
}

impl ArgumentResolver for Container {
	fn resolve_arguments(
		&self,
		signature: &Signature,
		parameters: &Parameters,
		context: Option<&str>,
	) -> DiResult<Arguments> {
		Container::resolve_arguments(self, signature, parameters, context)
	}
}

fn is_self_alias(alias: &str) -> bool {
	matches!(alias, CONTAINER_ALIAS | LOCATOR_ALIAS | FACTORY_ALIAS | RESOLVER_ALIAS)
}

fn mismatch(alias: &str, instance: &Instance, expected: &str) -> DiError {
	DiError::Container(format!(
		"Binding '{alias}' resolved to '{}', expected '{expected}'",
		instance.type_name()
	))
}

/// Checks a supplied value against the declared scalar kind of `param`.
fn assert_type(param: &Param, signature: &Signature, value: &Value) -> DiResult<()> {
	let valid = match (param.ty(), value) {
		(_, Value::Null) => param.is_optional(),
		(ParamType::Array, value) => value.is_array() || value.is_object(),
		(ParamType::Int | ParamType::Float, value) => is_numeric(value),
		(ParamType::Bool, value) => value.is_boolean() || is_numeric(value),
		_ => true,
	};
	if valid {
		Ok(())
	} else {
		Err(DiError::argument(param.name(), signature.callable()))
	}
}
