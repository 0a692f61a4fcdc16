//! # Palisade
//!
//! An autowiring dependency-injection container and a role-based permission guard.
//!
//! ## Feature Flags
//!
//! - `di` - Container, bindings, autowiring, injectors and the ambient scope
//! - `security` - Roles, pattern associations, rules and guards (enables `di`)
//! - `full` (default) - Everything
//!
//! ## Quick Example
//!
//! ```rust
//! # #[cfg(feature = "full")]
//! # {
//! use std::sync::Arc;
//!
//! use palisade::prelude::*;
//!
//! let container = Container::new();
//! palisade::security::register(&container);
//!
//! let permissions = container
//! 	.get_cloned::<Arc<dyn Permissions>>(PERMISSIONS_ALIAS, None)
//! 	.unwrap();
//! permissions.add_role("editor").unwrap();
//! permissions.allow("editor", "posts.*").unwrap();
//!
//! let actor: ActorRef = Arc::new(StaticActor::new(["editor"]));
//! let guard = Guard::new(permissions).with_actor(actor);
//! assert!(guard.allows("posts.edit", &Context::new()).unwrap());
//! # }
//! ```

#[cfg(feature = "di")]
pub mod di;
#[cfg(feature = "security")]
pub mod security;

#[cfg(feature = "di")]
pub use palisade_di::{Container, DiError, DiResult, GlobalScope, Instance, Parameters};

#[cfg(feature = "security")]
pub use palisade_security::{Guard, SecurityError, SecurityResult};

/// Commonly used types.
pub mod prelude {
	#[cfg(feature = "di")]
	pub use palisade_di::{
		ArgumentResolver, Autowire, Callable, Container, DiError, DiResult, Factory, GlobalScope,
		Instance, Locator, MethodRef, Param, Parameters, Signature, TypeDefinition,
	};

	#[cfg(feature = "security")]
	pub use palisade_security::{
		Actor, ActorRef, AllowRule, Check, Context, ForbidRule, Guard, Guarded, PERMISSIONS_ALIAS,
		Permissions, RULES_ALIAS, Rule, Rules, SecurityError, SecurityResult, StaticActor,
	};
}
