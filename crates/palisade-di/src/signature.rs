//! Signature descriptions of constructors, closures and methods.
//!
//! Rust has no runtime reflection over function parameters, so every callable the container
//! invokes carries an explicit [`Signature`]: an ordered list of [`Param`] descriptors with
//! name, declared type, default value and flags. The argument resolver walks this list and
//! produces [`Arguments`], which the callable body reads back positionally.

use std::any::Any;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{DiError, DiResult};
use crate::instance::Instance;

/// Declared type of a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
	/// Resolved through the container under this alias.
	Class(String),
	Int,
	Float,
	Bool,
	String,
	Array,
	/// Untyped; any supplied value is accepted.
	Mixed,
}

impl ParamType {
	/// Alias of a class-typed parameter.
	pub fn class(&self) -> Option<&str> {
		match self {
			Self::Class(alias) => Some(alias),
			_ => None,
		}
	}
}

/// Formal parameter descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
	name: String,
	ty: ParamType,
	default: Option<Value>,
	optional: bool,
	variadic: bool,
	by_ref: bool,
}

impl Param {
	fn typed(name: impl Into<String>, ty: ParamType) -> Self {
		Self {
			name: name.into(),
			ty,
			default: None,
			optional: false,
			variadic: false,
			by_ref: false,
		}
	}

	/// Parameter resolved from the container under `alias`.
	pub fn class(name: impl Into<String>, alias: impl Into<String>) -> Self {
		Self::typed(name, ParamType::Class(alias.into()))
	}

	/// Parameter resolved from the container under the Rust type name of `T`.
	pub fn of<T: Any>(name: impl Into<String>) -> Self {
		Self::class(name, std::any::type_name::<T>())
	}

	pub fn int(name: impl Into<String>) -> Self {
		Self::typed(name, ParamType::Int)
	}

	pub fn float(name: impl Into<String>) -> Self {
		Self::typed(name, ParamType::Float)
	}

	pub fn bool(name: impl Into<String>) -> Self {
		Self::typed(name, ParamType::Bool)
	}

	pub fn string(name: impl Into<String>) -> Self {
		Self::typed(name, ParamType::String)
	}

	pub fn array(name: impl Into<String>) -> Self {
		Self::typed(name, ParamType::Array)
	}

	pub fn mixed(name: impl Into<String>) -> Self {
		Self::typed(name, ParamType::Mixed)
	}

	/// Sets a default value; a parameter with a default is optional.
	pub fn with_default(mut self, default: impl Into<Value>) -> Self {
		self.default = Some(default.into());
		self.optional = true;
		self
	}

	/// Marks the parameter optional without a default (null when unresolvable).
	pub fn optional(mut self) -> Self {
		self.optional = true;
		self
	}

	pub fn variadic(mut self) -> Self {
		self.variadic = true;
		self.optional = true;
		self
	}

	pub fn by_ref(mut self) -> Self {
		self.by_ref = true;
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn ty(&self) -> &ParamType {
		&self.ty
	}

	pub fn default(&self) -> Option<&Value> {
		self.default.as_ref()
	}

	pub fn is_optional(&self) -> bool {
		self.optional || self.default.is_some()
	}

	pub fn is_variadic(&self) -> bool {
		self.variadic
	}

	pub fn is_by_ref(&self) -> bool {
		self.by_ref
	}
}

/// Identity and formal parameters of a callable.
///
/// # Examples
///
/// ```
/// use palisade_di::{Param, Signature};
///
/// let signature = Signature::new("Mailer::new")
/// 	.param(Param::class("transport", "mail.transport"))
/// 	.param(Param::string("sender").with_default("noreply@example.com"));
///
/// assert_eq!(signature.callable(), "Mailer::new");
/// assert_eq!(signature.params().len(), 2);
/// assert!(signature.params()[1].is_optional());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
	callable: String,
	params: Vec<Param>,
}

impl Signature {
	pub fn new(callable: impl Into<String>) -> Self {
		Self {
			callable: callable.into(),
			params: Vec::new(),
		}
	}

	/// Signature without a callable name. Registration fills one in.
	pub fn anonymous() -> Self {
		Self::default()
	}

	pub fn param(mut self, param: Param) -> Self {
		self.params.push(param);
		self
	}

	pub fn callable(&self) -> &str {
		&self.callable
	}

	pub fn params(&self) -> &[Param] {
		&self.params
	}

	pub(crate) fn named_or(mut self, fallback: impl FnOnce() -> String) -> Self {
		if self.callable.is_empty() {
			self.callable = fallback();
		}
		self
	}
}

/// One resolved argument.
#[derive(Debug, Clone)]
pub enum Argument {
	Instance(Instance),
	/// Scalar, array or null (absent optional dependency).
	Value(Value),
}

impl Argument {
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Value(Value::Null))
	}
}

/// Positional argument list produced by the argument resolver.
///
/// Accessors are typed and fail with [`DiError::Argument`] naming the parameter and the
/// callable when the value at a position does not have the requested shape.
#[derive(Debug, Clone)]
pub struct Arguments {
	callable: String,
	entries: Vec<(String, Argument)>,
}

impl Arguments {
	pub fn new(callable: impl Into<String>) -> Self {
		Self {
			callable: callable.into(),
			entries: Vec::new(),
		}
	}

	pub fn push(&mut self, name: impl Into<String>, argument: Argument) {
		self.entries.push((name.into(), argument));
	}

	pub fn callable(&self) -> &str {
		&self.callable
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn get(&self, index: usize) -> Option<&Argument> {
		self.entries.get(index).map(|(_, argument)| argument)
	}

	/// Parameter names in positional order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|(name, _)| name.as_str())
	}

	pub fn iter(&self) -> impl Iterator<Item = &Argument> {
		self.entries.iter().map(|(_, argument)| argument)
	}

	fn mismatch(&self, index: usize) -> DiError {
		let parameter = self
			.entries
			.get(index)
			.map(|(name, _)| name.clone())
			.unwrap_or_else(|| format!("#{index}"));
		DiError::argument(parameter, &self.callable)
	}

	fn at(&self, index: usize) -> DiResult<&Argument> {
		self.get(index).ok_or_else(|| self.mismatch(index))
	}

	/// Object at `index`.
	pub fn instance<T: Any + Send + Sync>(&self, index: usize) -> DiResult<Arc<T>> {
		match self.at(index)? {
			Argument::Instance(instance) => instance.downcast::<T>().ok_or_else(|| self.mismatch(index)),
			Argument::Value(_) => Err(self.mismatch(index)),
		}
	}

	/// Object at `index`, `None` when an optional dependency resolved to null.
	pub fn optional_instance<T: Any + Send + Sync>(&self, index: usize) -> DiResult<Option<Arc<T>>> {
		match self.at(index)? {
			Argument::Value(Value::Null) => Ok(None),
			_ => self.instance::<T>(index).map(Some),
		}
	}

	/// Clone of the object at `index`; used for `Arc<dyn Trait>` payloads.
	pub fn cloned<T: Any + Clone>(&self, index: usize) -> DiResult<T> {
		match self.at(index)? {
			Argument::Instance(instance) => instance.cloned::<T>().ok_or_else(|| self.mismatch(index)),
			Argument::Value(_) => Err(self.mismatch(index)),
		}
	}

	/// Raw value at `index`.
	pub fn value(&self, index: usize) -> DiResult<&Value> {
		match self.at(index)? {
			Argument::Value(value) => Ok(value),
			Argument::Instance(_) => Err(self.mismatch(index)),
		}
	}

	/// String at `index`; numbers are rendered.
	pub fn str(&self, index: usize) -> DiResult<String> {
		match self.value(index)? {
			Value::String(text) => Ok(text.clone()),
			Value::Number(number) => Ok(number.to_string()),
			_ => Err(self.mismatch(index)),
		}
	}

	/// Integer at `index`; integral floats and numeric strings are accepted.
	pub fn int(&self, index: usize) -> DiResult<i64> {
		let value = self.value(index)?;
		let parsed = match value {
			Value::Number(number) => number
				.as_i64()
				.or_else(|| number.as_f64().and_then(integral)),
			Value::String(text) => text
				.trim()
				.parse::<i64>()
				.ok()
				.or_else(|| numeric_string(text).and_then(integral)),
			_ => None,
		};
		parsed.ok_or_else(|| self.mismatch(index))
	}

	/// Float at `index`; numeric strings are accepted.
	pub fn float(&self, index: usize) -> DiResult<f64> {
		let parsed = match self.value(index)? {
			Value::Number(number) => number.as_f64(),
			Value::String(text) => numeric_string(text),
			_ => None,
		};
		parsed.ok_or_else(|| self.mismatch(index))
	}

	/// Boolean at `index`; numbers count as `true` when non-zero.
	pub fn bool(&self, index: usize) -> DiResult<bool> {
		let parsed = match self.value(index)? {
			Value::Bool(flag) => Some(*flag),
			Value::Number(number) => number.as_f64().map(|f| f != 0.0),
			Value::String(text) => numeric_string(text).map(|f| f != 0.0),
			_ => None,
		};
		parsed.ok_or_else(|| self.mismatch(index))
	}
}

/// Parses a decimal or exponent notation number, rejecting `inf`/`nan` spellings.
/// `value` as an `i64` when it is whole and inside the `i64` range.
fn integral(value: f64) -> Option<i64> {
	// i64::MAX as f64 rounds up to 2^63, which is already out of range.
	let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
	(value.fract() == 0.0 && in_range).then_some(value as i64)
}

pub(crate) fn numeric_string(text: &str) -> Option<f64> {
	let trimmed = text.trim();
	if trimmed.is_empty()
		|| !trimmed
			.chars()
			.all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
	{
		return None;
	}
	trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Returns `true` if `value` is numeric: a JSON number or a numeric string.
pub(crate) fn is_numeric(value: &Value) -> bool {
	match value {
		Value::Number(_) => true,
		Value::String(text) => numeric_string(text).is_some(),
		_ => false,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	fn arguments(values: Vec<(&str, Argument)>) -> Arguments {
		let mut arguments = Arguments::new("Widget::new");
		for (name, argument) in values {
			arguments.push(name, argument);
		}
		arguments
	}

	// ========================================================================
	// Numeric strings
	// ========================================================================

	#[rstest]
	#[case("123", true)]
	#[case(" 12.5 ", true)]
	#[case("-1e3", true)]
	#[case("abc", false)]
	#[case("", false)]
	#[case("inf", false)]
	#[case("NaN", false)]
	#[case("12abc", false)]
	fn test_numeric_string(#[case] input: &str, #[case] expected: bool) {
		// Act
		let result = is_numeric(&json!(input));

		// Assert
		assert_eq!(result, expected);
	}

	// ========================================================================
	// Typed accessors
	// ========================================================================

	#[rstest]
	fn test_int_accepts_numeric_string() {
		// Arrange
		let args = arguments(vec![("count", Argument::Value(json!("123")))]);

		// Act
		let count = args.int(0);

		// Assert
		assert_eq!(count.unwrap(), 123);
	}

	#[rstest]
	#[case::exponent_string(json!("1e30"))]
	#[case::huge_float(json!(1e30))]
	#[case::negative_overflow(json!("-1e19"))]
	#[case::fractional(json!(1.5))]
	fn test_int_rejects_values_outside_i64(#[case] value: Value) {
		// Arrange
		let args = arguments(vec![("limit", Argument::Value(value))]);

		// Act
		let result = args.int(0);

		// Assert
		assert!(matches!(result, Err(DiError::Argument { ref parameter, .. }) if parameter == "limit"));
	}

	#[rstest]
	fn test_int_accepts_whole_float_in_range() {
		// Arrange
		let args = arguments(vec![("limit", Argument::Value(json!("-2e3")))]);

		// Act
		let limit = args.int(0);

		// Assert
		assert_eq!(limit.unwrap(), -2000);
	}

	#[rstest]
	fn test_mismatch_names_parameter() {
		// Arrange
		let args = arguments(vec![("count", Argument::Value(json!("many")))]);

		// Act
		let error = args.int(0).unwrap_err();

		// Assert
		assert!(matches!(
			error,
			DiError::Argument { ref parameter, ref callable } if parameter == "count" && callable == "Widget::new"
		));
	}

	#[rstest]
	fn test_out_of_range_is_argument_error() {
		// Arrange
		let args = arguments(vec![]);

		// Act
		let error = args.str(3).unwrap_err();

		// Assert
		assert_eq!(error.to_string(), "Unable to resolve '#3' argument in 'Widget::new'");
	}

	#[rstest]
	fn test_optional_instance_null_is_none() {
		// Arrange
		let args = arguments(vec![
			("logger", Argument::Value(Value::Null)),
			("clock", Argument::Instance(Instance::new(7_i64))),
		]);

		// Act
		let logger = args.optional_instance::<String>(0).unwrap();
		let clock = args.optional_instance::<i64>(1).unwrap();

		// Assert
		assert!(logger.is_none());
		assert_eq!(clock.as_deref(), Some(&7));
	}

	#[rstest]
	#[case(json!(true), true)]
	#[case(json!(0), false)]
	#[case(json!("1"), true)]
	fn test_bool_accepts_numbers(#[case] value: Value, #[case] expected: bool) {
		// Arrange
		let args = arguments(vec![("flag", Argument::Value(value))]);

		// Act
		let flag = args.bool(0).unwrap();

		// Assert
		assert_eq!(flag, expected);
	}

	#[rstest]
	fn test_anonymous_signature_takes_fallback_name() {
		// Arrange
		let signature = Signature::anonymous().param(Param::int("n"));

		// Act
		let named = signature.named_or(|| "Counter::new".to_string());

		// Assert
		assert_eq!(named.callable(), "Counter::new");
		assert_eq!(named.params()[0].ty(), &ParamType::Int);
	}
}
