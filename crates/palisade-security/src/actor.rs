//! Permission-bearing entities.

use std::sync::Arc;

/// Something that holds roles.
pub trait Actor: Send + Sync {
	/// Roles in priority order.
	fn roles(&self) -> Vec<String>;
}

/// Shared actor handle.
pub type ActorRef = Arc<dyn Actor>;

/// Alias the guard definition reads its actor (`ActorRef`) from.
pub const ACTOR_ALIAS: &str = "security.actor";

/// Actor with a fixed role list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticActor {
	roles: Vec<String>,
}

impl StaticActor {
	pub fn new<I, S>(roles: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			roles: roles.into_iter().map(Into::into).collect(),
		}
	}
}

impl Actor for StaticActor {
	fn roles(&self) -> Vec<String> {
		self.roles.clone()
	}
}

/// Anonymous visitor holding the `guest` role.
#[derive(Debug, Clone, Copy, Default)]
pub struct Guest;

impl Guest {
	pub const ROLE: &'static str = "guest";
}

impl Actor for Guest {
	fn roles(&self) -> Vec<String> {
		vec![Self::ROLE.to_string()]
	}
}

/// Actor without roles; every guard check on it falls through to deny.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullActor;

impl Actor for NullActor {
	fn roles(&self) -> Vec<String> {
		Vec::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(Arc::new(StaticActor::new(["user", "admin"])) as ActorRef, vec!["user", "admin"])]
	#[case(Arc::new(Guest) as ActorRef, vec!["guest"])]
	#[case(Arc::new(NullActor) as ActorRef, vec![])]
	fn test_actor_roles(#[case] actor: ActorRef, #[case] expected: Vec<&str>) {
		// Act
		let roles = actor.roles();

		// Assert
		assert_eq!(roles, expected);
	}
}
