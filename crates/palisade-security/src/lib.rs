//! # Palisade Security
//!
//! Role-based access control on top of `palisade-di`.
//!
//! ## Concepts
//!
//! - **Actor**: anything with roles ([`Actor`])
//! - **Rule**: decision logic for a role/permission pair ([`Rule`], [`Check`])
//! - **Rule registry**: rules by name, backed by the container ([`RuleManager`])
//! - **Permission manager**: roles and their pattern → rule associations
//!   ([`PermissionManager`], [`Patternizer`])
//! - **Guard**: evaluates a permission for one actor ([`Guard`], [`Guarded`])
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use palisade_di::{Container, Instance};
//! use palisade_security::{
//! 	ACTOR_ALIAS, ActorRef, Context, GUARD_ALIAS, Guard, PERMISSIONS_ALIAS, Permissions,
//! 	StaticActor, register,
//! };
//!
//! let container = Container::new();
//! register(&container);
//!
//! let permissions = container
//! 	.get_cloned::<Arc<dyn Permissions>>(PERMISSIONS_ALIAS, None)
//! 	.unwrap();
//! permissions.add_role("admin").unwrap();
//! permissions.allow("admin", "*.*").unwrap();
//! permissions.add_role("guest").unwrap();
//! permissions.allow("guest", "posts.read").unwrap();
//!
//! let actor: ActorRef = Arc::new(StaticActor::new(["guest"]));
//! container.bind(ACTOR_ALIAS, Instance::new(actor));
//!
//! let guard = container.get_cloned::<Guard>(GUARD_ALIAS, None).unwrap();
//! assert!(guard.allows("posts.read", &Context::new()).unwrap());
//! assert!(guard.allows("posts.delete", &Context::new()).is_err());
//! ```

pub mod actor;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod guard;
pub mod guarded;
pub mod pattern;
pub mod permission_manager;
pub mod rule;
pub mod rule_manager;
pub mod rules;

pub use actor::{ACTOR_ALIAS, Actor, ActorRef, Guest, NullActor, StaticActor};
pub use bootstrap::register;
pub use config::{AssociationConfig, ConfigError, PermissionsConfig, RoleConfig};
pub use error::{SecurityError, SecurityResult};
pub use guard::Guard;
pub use guarded::{GUARD_ALIAS, Guarded};
pub use pattern::Patternizer;
pub use permission_manager::{PERMISSIONS_ALIAS, PermissionManager, Permissions};
pub use rule::{Check, CheckRule, Context, RULE_INTERFACE, Rule, RuleRef, rule_definition};
pub use rule_manager::{RULES_ALIAS, RuleDefinition, RuleManager, Rules};
pub use rules::{AllowRule, Behaviour, CallableRule, CompositeRule, ForbidRule};
