//! Closures and method references the container can invoke.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::DiResult;
use crate::instance::Instance;
use crate::signature::{Arguments, Signature};

type Body = Arc<dyn Fn(Arguments) -> DiResult<Instance> + Send + Sync>;

/// A function value with an explicit signature.
///
/// The container resolves the signature into [`Arguments`] and calls the body with them.
#[derive(Clone)]
pub struct Callable {
	signature: Signature,
	body: Body,
}

impl Callable {
	/// Wraps a closure producing a `R`.
	pub fn new<R, F>(signature: Signature, body: F) -> Self
	where
		R: Any + Send + Sync,
		F: Fn(Arguments) -> DiResult<R> + Send + Sync + 'static,
	{
		Self::from_instance_fn(signature, move |arguments| body(arguments).map(Instance::new))
	}

	/// Wraps a closure that already returns an [`Instance`] (for example a shared singleton).
	pub fn from_instance_fn<F>(signature: Signature, body: F) -> Self
	where
		F: Fn(Arguments) -> DiResult<Instance> + Send + Sync + 'static,
	{
		Self {
			signature: signature.named_or(|| "{closure}".to_string()),
			body: Arc::new(body),
		}
	}

	pub fn signature(&self) -> &Signature {
		&self.signature
	}

	pub fn call(&self, arguments: Arguments) -> DiResult<Instance> {
		(self.body)(arguments)
	}
}

impl fmt::Debug for Callable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Callable")
			.field("signature", &self.signature)
			.finish_non_exhaustive()
	}
}

/// `[resolver alias, method name]` pair.
///
/// The resolver is fetched from the container and the method is looked up in the resolver's
/// type definition, which may register methods that are not part of its public API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRef {
	resolver: String,
	method: String,
}

impl MethodRef {
	pub fn new(resolver: impl Into<String>, method: impl Into<String>) -> Self {
		Self {
			resolver: resolver.into(),
			method: method.into(),
		}
	}

	pub fn resolver(&self) -> &str {
		&self.resolver
	}

	pub fn method(&self) -> &str {
		&self.method
	}
}

impl fmt::Display for MethodRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}::{}", self.resolver, self.method)
	}
}
