//! Dependency injection module.
//!
//! # Examples
//!
//! ```rust
//! # #[cfg(feature = "di")]
//! # {
//! use palisade::di::{Container, Instance};
//!
//! let container = Container::new();
//! container.bind("greeting", Instance::new(String::from("hello")));
//! assert_eq!(*container.get_as::<String>("greeting", None).unwrap(), "hello");
//! # }
//! ```

#[cfg(feature = "di")]
pub use palisade_di::*;
