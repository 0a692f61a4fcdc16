//! Named parameter bags passed to `make`, late references and rules.

use indexmap::IndexMap;
use serde_json::Value;

use crate::autowire::Autowire;
use crate::instance::Instance;

/// One entry of a [`Parameters`] bag.
#[derive(Debug, Clone)]
pub enum Parameter {
	/// Object passed through verbatim, no type check against the declared parameter.
	Instance(Instance),
	/// Late reference, resolved when the argument is needed.
	Autowire(Autowire),
	/// Scalar, array or null value, checked against the declared scalar kind.
	Value(Value),
}

impl Parameter {
	/// Scalar payload, if any.
	pub fn as_value(&self) -> Option<&Value> {
		match self {
			Self::Value(value) => Some(value),
			_ => None,
		}
	}

	/// Object payload, if any.
	pub fn as_instance(&self) -> Option<&Instance> {
		match self {
			Self::Instance(instance) => Some(instance),
			_ => None,
		}
	}
}

impl From<Instance> for Parameter {
	fn from(instance: Instance) -> Self {
		Self::Instance(instance)
	}
}

impl From<Autowire> for Parameter {
	fn from(reference: Autowire) -> Self {
		Self::Autowire(reference)
	}
}

impl From<Value> for Parameter {
	fn from(value: Value) -> Self {
		Self::Value(value)
	}
}

macro_rules! scalar_parameter {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for Parameter {
				fn from(value: $ty) -> Self {
					Self::Value(Value::from(value))
				}
			}
		)*
	};
}

scalar_parameter!(&str, String, bool, i32, i64, u32, u64, f64);

/// Insertion-ordered map of parameter name to [`Parameter`].
///
/// # Examples
///
/// ```
/// use palisade_di::Parameters;
///
/// let base = Parameters::new().with("name", "base").with("ttl", 10);
/// let extra = Parameters::new().with("name", "extra");
///
/// let merged = extra.merged_over(&base);
/// assert_eq!(merged.value("name").and_then(|v| v.as_str()), Some("extra"));
/// assert_eq!(merged.value("ttl").and_then(|v| v.as_i64()), Some(10));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Parameters {
	entries: IndexMap<String, Parameter>,
}

impl Parameters {
	/// Creates an empty bag.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder-style insert.
	pub fn with(mut self, name: impl Into<String>, parameter: impl Into<Parameter>) -> Self {
		self.insert(name, parameter);
		self
	}

	/// Inserts or overwrites `name`, keeping its original position on overwrite.
	pub fn insert(&mut self, name: impl Into<String>, parameter: impl Into<Parameter>) {
		self.entries.insert(name.into(), parameter.into());
	}

	/// Inserts `name` only if it is not present yet.
	pub fn insert_if_absent(&mut self, name: impl Into<String>, parameter: impl Into<Parameter>) {
		self.entries
			.entry(name.into())
			.or_insert_with(|| parameter.into());
	}

	pub fn get(&self, name: &str) -> Option<&Parameter> {
		self.entries.get(name)
	}

	/// Scalar value stored under `name`.
	pub fn value(&self, name: &str) -> Option<&Value> {
		self.get(name).and_then(Parameter::as_value)
	}

	/// Object stored under `name`.
	pub fn instance(&self, name: &str) -> Option<&Instance> {
		self.get(name).and_then(Parameter::as_instance)
	}

	pub fn contains_key(&self, name: &str) -> bool {
		self.entries.contains_key(name)
	}

	pub fn remove(&mut self, name: &str) -> Option<Parameter> {
		self.entries.shift_remove(name)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Parameter)> {
		self.entries.iter().map(|(name, value)| (name.as_str(), value))
	}

	/// Returns `base` overlaid with `self`; entries of `self` win on conflict.
	pub fn merged_over(&self, base: &Parameters) -> Parameters {
		let mut merged = base.clone();
		for (name, parameter) in &self.entries {
			merged.entries.insert(name.clone(), parameter.clone());
		}
		merged
	}
}

impl<K: Into<String>, P: Into<Parameter>> FromIterator<(K, P)> for Parameters {
	fn from_iter<I: IntoIterator<Item = (K, P)>>(iter: I) -> Self {
		Self {
			entries: iter
				.into_iter()
				.map(|(name, parameter)| (name.into(), parameter.into()))
				.collect(),
		}
	}
}
