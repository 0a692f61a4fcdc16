//! Binding registry entries.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::autowire::Autowire;
use crate::callable::{Callable, MethodRef};
use crate::instance::Instance;

/// Anything that can be bound to an alias.
///
/// How a value is stored depends on the registration call:
///
/// | value | `bind` | `bind_singleton` |
/// | --- | --- | --- |
/// | `Instance` | instance | instance |
/// | `Alias` | alias redirect | singleton factory over the secondary alias |
/// | `Autowire`, `Closure`, `Method` | factory | singleton factory |
#[derive(Debug, Clone)]
pub enum Resolvable {
	Instance(Instance),
	Alias(String),
	Autowire(Autowire),
	Closure(Callable),
	Method(MethodRef),
}

impl From<Instance> for Resolvable {
	fn from(instance: Instance) -> Self {
		Self::Instance(instance)
	}
}

impl From<&str> for Resolvable {
	fn from(alias: &str) -> Self {
		Self::Alias(alias.to_string())
	}
}

impl From<String> for Resolvable {
	fn from(alias: String) -> Self {
		Self::Alias(alias)
	}
}

impl From<Autowire> for Resolvable {
	fn from(reference: Autowire) -> Self {
		Self::Autowire(reference)
	}
}

impl From<Callable> for Resolvable {
	fn from(callable: Callable) -> Self {
		Self::Closure(callable)
	}
}

impl From<MethodRef> for Resolvable {
	fn from(method: MethodRef) -> Self {
		Self::Method(method)
	}
}

/// Introspection view of a stored binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingKind {
	Instance,
	Alias(String),
	Factory { singleton: bool },
}

#[derive(Debug, Clone)]
pub(crate) enum Target {
	Alias(String),
	Autowire(Autowire),
	Closure(Callable),
	Method(MethodRef),
}

/// Factory binding. A singleton factory memoizes its first result in `cell`.
#[derive(Debug)]
pub(crate) struct FactoryBinding {
	pub(crate) target: Target,
	pub(crate) singleton: bool,
	pub(crate) cell: OnceCell<Instance>,
}

#[derive(Debug, Clone)]
pub(crate) enum Binding {
	Instance(Instance),
	Alias(String),
	Factory(Arc<FactoryBinding>),
}

impl Binding {
	fn factory(target: Target, singleton: bool) -> Self {
		Self::Factory(Arc::new(FactoryBinding {
			target,
			singleton,
			cell: OnceCell::new(),
		}))
	}

	pub(crate) fn plain(resolvable: Resolvable) -> Self {
		match resolvable {
			Resolvable::Instance(instance) => Self::Instance(instance),
			Resolvable::Alias(alias) => Self::Alias(alias),
			Resolvable::Autowire(reference) => Self::factory(Target::Autowire(reference), false),
			Resolvable::Closure(callable) => Self::factory(Target::Closure(callable), false),
			Resolvable::Method(method) => Self::factory(Target::Method(method), false),
		}
	}

	pub(crate) fn singleton(resolvable: Resolvable) -> Self {
		match resolvable {
			Resolvable::Instance(instance) => Self::Instance(instance),
			Resolvable::Alias(alias) => Self::factory(Target::Alias(alias), true),
			Resolvable::Autowire(reference) => Self::factory(Target::Autowire(reference), true),
			Resolvable::Closure(callable) => Self::factory(Target::Closure(callable), true),
			Resolvable::Method(method) => Self::factory(Target::Method(method), true),
		}
	}

	pub(crate) fn kind(&self) -> BindingKind {
		match self {
			Self::Instance(_) => BindingKind::Instance,
			Self::Alias(alias) => BindingKind::Alias(alias.clone()),
			Self::Factory(factory) => BindingKind::Factory {
				singleton: factory.singleton,
			},
		}
	}
}
