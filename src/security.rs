//! Role-based access control module.
//!
//! # Examples
//!
//! ```rust
//! # #[cfg(feature = "security")]
//! # {
//! use palisade::security::Patternizer;
//!
//! assert!(Patternizer::new().matches("posts.edit", "posts.*"));
//! # }
//! ```

#[cfg(feature = "security")]
pub use palisade_security::*;
