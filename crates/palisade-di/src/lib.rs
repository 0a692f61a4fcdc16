//! # Palisade Dependency Injection
//!
//! Autowiring container with contextual injection and declarative singletons.
//!
//! ## Features
//!
//! - **Bindings**: instances, alias redirects, closures, `[resolver, method]` pairs and
//!   late references, each optionally cached as a singleton
//! - **Autowiring**: types registered with a [`TypeDefinition`] are constructed from their
//!   constructor [`Signature`] without an explicit binding
//! - **Contextual injection**: class-typed parameters are resolved with the parameter name as
//!   context, which injectors receive
//! - **Injector delegation**: types can opt out of constructor autowiring and be produced by an
//!   [`Injector`] instead
//! - **Declarative singletons**: a type definition may declare itself a singleton, so the
//!   first parameterless autowire is registered and reused
//! - **Cycle detection**: alias cycles and runaway recursion fail with
//!   [`DiError::CircularDependency`] instead of overflowing the stack
//!
//! ## Example
//!
//! ```
//! use palisade_di::{Container, Param, Parameters, Signature, TypeDefinition};
//!
//! struct Sample;
//! struct Greeter {
//! 	name: String,
//! }
//!
//! let container = Container::new();
//! container
//! 	.define(
//! 		TypeDefinition::builder::<Sample>("Sample")
//! 			.constructor(Signature::anonymous(), |_| Ok(Sample))
//! 			.build(),
//! 	)
//! 	.define(
//! 		TypeDefinition::builder::<Greeter>("Greeter")
//! 			.constructor(
//! 				Signature::anonymous()
//! 					.param(Param::class("sample", "Sample"))
//! 					.param(Param::string("name").with_default("x")),
//! 				|args| {
//! 					let _sample = args.instance::<Sample>(0)?;
//! 					Ok(Greeter { name: args.str(1)? })
//! 				},
//! 			)
//! 			.build(),
//! 	);
//!
//! let greeter = container
//! 	.make("Greeter", &Parameters::new().with("name", "custom"), None)
//! 	.unwrap();
//! assert_eq!(greeter.downcast_ref::<Greeter>().unwrap().name, "custom");
//! ```

pub mod autowire;
pub mod binding;
pub mod callable;
pub mod container;
pub mod cycle_detection;
pub mod definition;
pub mod error;
pub mod global_scope;
pub mod injector;
pub mod instance;
pub mod parameters;
pub mod signature;

pub use autowire::Autowire;
pub use binding::{BindingKind, Resolvable};
pub use callable::{Callable, MethodRef};
pub use container::{
	ArgumentResolver, CONTAINER_ALIAS, Container, FACTORY_ALIAS, Factory, LOCATOR_ALIAS, Locator,
	RESOLVER_ALIAS,
};
pub use cycle_detection::{CycleError, MAX_RESOLUTION_DEPTH};
pub use definition::{ConstructorDefinition, DefinitionBuilder, MethodDefinition, TypeDefinition};
pub use error::{DiError, DiResult};
pub use global_scope::{GlobalScope, ScopeGuard};
pub use injector::{Injector, InjectorRef, TypeDescriptor, injector_instance};
pub use instance::Instance;
pub use parameters::{Parameter, Parameters};
pub use signature::{Argument, Arguments, Param, ParamType, Signature};
