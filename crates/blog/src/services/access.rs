//! Access decisions for post management and commenting.
//!
//! Decisions are pure functions of the request [`Identity`]; callers check
//! them before touching the store or validating input.

use inkpost_core::UserId;

use crate::models::Identity;

/// The id of the blog owner: the first account ever registered.
pub const OWNER_ID: UserId = UserId::new(1);

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

impl Access {
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Whether the identity may create, edit or delete posts.
///
/// Only the owner passes. Anonymous requests and every other user are denied.
#[must_use]
pub fn require_owner(identity: &Identity) -> Access {
    match identity.user() {
        Some(user) if user.id == OWNER_ID => Access::Allow,
        _ => Access::Deny,
    }
}

/// Whether the identity may comment.
#[must_use]
pub const fn require_authenticated(identity: &Identity) -> Access {
    if identity.is_authenticated() {
        Access::Allow
    } else {
        Access::Deny
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::CurrentUser;
    use inkpost_core::Email;

    fn signed_in(id: i64) -> Identity {
        Identity::Authenticated(CurrentUser {
            id: UserId::new(id),
            email: Email::parse(&format!("user{id}@example.com")).unwrap(),
            display_name: format!("User {id}"),
        })
    }

    #[test]
    fn test_owner_gate() {
        assert_eq!(require_owner(&signed_in(1)), Access::Allow);
        assert_eq!(require_owner(&signed_in(2)), Access::Deny);
        assert_eq!(require_owner(&Identity::Anonymous), Access::Deny);
    }

    #[test]
    fn test_authenticated_gate() {
        assert!(require_authenticated(&signed_in(1)).is_allowed());
        assert!(require_authenticated(&signed_in(42)).is_allowed());
        assert!(!require_authenticated(&Identity::Anonymous).is_allowed());
    }
}
