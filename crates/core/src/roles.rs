//! Well-known role name constants.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_REVIEWER: &str = "reviewer";
pub const ROLE_EDITOR: &str = "editor";

/// All valid role values.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_REVIEWER, ROLE_EDITOR];

/// Whether the role may record review decisions.
pub fn can_review(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_REVIEWER
}
