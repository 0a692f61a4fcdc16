//! Built-in rules.

mod allow;
mod callable;
mod composite;
mod forbid;

pub use allow::AllowRule;
pub use callable::CallableRule;
pub use composite::{Behaviour, CompositeRule};
pub use forbid::ForbidRule;
