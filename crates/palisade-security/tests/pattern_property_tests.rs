//! Property-based tests for permission pattern matching
//!
//! Uses proptest to verify:
//! 1. Strings without wildcard syntax only match themselves
//! 2. `*` consumes exactly one non-empty segment
//! 3. Matching ignores case

use palisade_security::Patternizer;
use proptest::prelude::*;

const SEGMENT: &str = "[a-z0-9_]{1,8}";

// ============================================================================
// Plain strings
// ============================================================================

proptest! {
	#![proptest_config(ProptestConfig::with_cases(100))]

	/// Property: a non-pattern matches exactly the equal string
	#[test]
	fn test_plain_pattern_is_equality(string in "[a-z.]{1,12}", pattern in "[a-z.]{1,12}") {
		let patternizer = Patternizer::new();

		prop_assert!(!patternizer.is_pattern(&pattern));
		prop_assert_eq!(patternizer.matches(&string, &pattern), string == pattern);
		prop_assert!(patternizer.matches(&pattern, &pattern));
	}
}

// ============================================================================
// Wildcards
// ============================================================================

proptest! {
	#![proptest_config(ProptestConfig::with_cases(100))]

	/// Property: `prefix.*` matches any single segment below `prefix`
	#[test]
	fn test_star_matches_one_segment(prefix in SEGMENT, segment in SEGMENT) {
		let patternizer = Patternizer::new();
		let pattern = format!("{prefix}.*");

		let permission = format!("{prefix}.{segment}");
		prop_assert!(patternizer.matches(&permission, &pattern));
	}

	/// Property: `*` never consumes a dot nor matches an empty segment
	#[test]
	fn test_star_does_not_cross_segments(prefix in SEGMENT, first in SEGMENT, second in SEGMENT) {
		let patternizer = Patternizer::new();
		let pattern = format!("{prefix}.*");

		let deeper = format!("{prefix}.{first}.{second}");
		let empty_segment = format!("{prefix}.");
		prop_assert!(!patternizer.matches(&deeper, &pattern));
		prop_assert!(!patternizer.matches(&empty_segment, &pattern));
		prop_assert!(!patternizer.matches(&prefix, &pattern));
	}

	/// Property: wildcard matching is case-insensitive
	#[test]
	fn test_matching_ignores_case(prefix in SEGMENT, segment in SEGMENT) {
		let patternizer = Patternizer::new();
		let permission = format!("{prefix}.{segment}").to_uppercase();

		let pattern = format!("{prefix}.*");
		prop_assert!(patternizer.matches(&permission, &pattern));
	}

	/// Property: an alternation matches each of its branches
	#[test]
	fn test_alternation_matches_each_branch(prefix in SEGMENT, left in SEGMENT, right in SEGMENT) {
		let patternizer = Patternizer::new();
		let pattern = format!("{prefix}.({left}|{right})");

		let left_permission = format!("{prefix}.{left}");
		let right_permission = format!("{prefix}.{right}");
		prop_assert!(patternizer.matches(&left_permission, &pattern));
		prop_assert!(patternizer.matches(&right_permission, &pattern));
	}
}
