//! Wildcard matching of permission names.
//!
//! A pattern contains `*` or `|`. `*` stands for one or more of `[a-z0-9_-]`
//! (case-insensitive), `.` and `-` are literal, and `(a|b)` groups are regex alternations.
//! Matching is anchored on the whole permission name.

use std::collections::HashMap;

use palisade_di::{Signature, TypeDefinition};
use parking_lot::RwLock;
use regex::Regex;

/// Compiles permission patterns to anchored regexes and caches them.
///
/// # Examples
///
/// ```
/// use palisade_security::Patternizer;
///
/// let patternizer = Patternizer::new();
/// assert!(patternizer.matches("posts.save", "posts.*"));
/// assert!(!patternizer.matches("posts", "posts.*"));
/// assert!(patternizer.matches("posts.edit", "posts.(edit|save)"));
/// ```
#[derive(Debug, Default)]
pub struct Patternizer {
	cache: RwLock<HashMap<String, Option<Regex>>>,
}

impl Patternizer {
	pub const NAME: &'static str = "Patternizer";

	pub fn new() -> Self {
		Self::default()
	}

	/// Declarative singleton definition registered under [`Self::NAME`], so every consumer
	/// shares one regex cache.
	pub fn definition() -> TypeDefinition {
		TypeDefinition::builder::<Patternizer>(Self::NAME)
			.constructor(Signature::anonymous(), |_| Ok(Patternizer::new()))
			.singleton()
			.build()
	}

	/// Returns `true` if `string` contains wildcard or alternation syntax.
	pub fn is_pattern(&self, string: &str) -> bool {
		string.contains('*') || string.contains('|')
	}

	/// Returns `true` if `string` equals `pattern` or `pattern` matches it.
	pub fn matches(&self, string: &str, pattern: &str) -> bool {
		if string == pattern {
			return true;
		}
		if !self.is_pattern(pattern) {
			return false;
		}
		self.compiled(pattern)
			.is_some_and(|regex| regex.is_match(string))
	}

	fn compiled(&self, pattern: &str) -> Option<Regex> {
		if let Some(cached) = self.cache.read().get(pattern) {
			return cached.clone();
		}

		let compiled = match Regex::new(&translate(pattern)) {
			Ok(regex) => Some(regex),
			Err(error) => {
				tracing::warn!(pattern, %error, "permission pattern does not compile, treated as no match");
				None
			}
		};
		self.cache
			.write()
			.insert(pattern.to_string(), compiled.clone());
		compiled
	}
}

/// Regex source for `pattern`.
fn translate(pattern: &str) -> String {
	let mut expression = String::with_capacity(pattern.len() + 16);
	expression.push_str("(?i)^");
	for c in pattern.chars() {
		match c {
			'*' => expression.push_str(r"[a-z0-9_\-]+"),
			'.' => expression.push_str(r"\."),
			'-' => expression.push_str(r"\-"),
			other => expression.push(other),
		}
	}
	expression.push('$');
	expression
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	#[fixture]
	fn patternizer() -> Patternizer {
		Patternizer::new()
	}

	// ========================================================================
	// Pattern detection
	// ========================================================================

	#[rstest]
	#[case("abc", false)]
	#[case("ab*", true)]
	#[case("ab(d|e)", true)]
	#[case("posts.read", false)]
	fn test_is_pattern(patternizer: Patternizer, #[case] string: &str, #[case] expected: bool) {
		// Act
		let result = patternizer.is_pattern(string);

		// Assert
		assert_eq!(result, expected);
	}

	// ========================================================================
	// Matching
	// ========================================================================

	#[rstest]
	#[case("string", "string", true)]
	#[case("string", "st*", true)]
	#[case("abc", "dce", false)]
	#[case("abc", "a(bc|de)", true)]
	#[case("ade", "a(bc|de)", true)]
	#[case("string", "*ring", true)]
	#[case("ring", "*ring", false)]
	#[case("strings", "*ri(ng|ngs)", true)]
	#[case("posts.save", "posts.*", true)]
	#[case("posts", "posts.*", false)]
	#[case("Posts.SAVE", "posts.*", true)]
	#[case("posts.x.y", "posts.*", false)]
	#[case("postsXsave", "posts.save*", false)]
	#[case("user-profile.edit", "user-*.edit", true)]
	fn test_matches(
		patternizer: Patternizer,
		#[case] string: &str,
		#[case] pattern: &str,
		#[case] expected: bool,
	) {
		// Act
		let result = patternizer.matches(string, pattern);

		// Assert
		assert_eq!(result, expected, "matches({string:?}, {pattern:?})");
	}

	#[rstest]
	fn test_invalid_pattern_never_matches(patternizer: Patternizer) {
		// Act
		let first = patternizer.matches("a", "a(|*");
		let second = patternizer.matches("a", "a(|*");

		// Assert
		assert!(!first);
		assert!(!second);
		assert_eq!(patternizer.cache.read().len(), 1);
	}

	#[rstest]
	fn test_translate_escapes_literals() {
		// Act
		let expression = translate("a.b-*");

		// Assert
		assert_eq!(expression, r"(?i)^a\.b\-[a-z0-9_\-]+$");
	}
}
