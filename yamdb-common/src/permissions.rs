//! Role and permission decision engine
//!
//! A single pure decision function replaces per-endpoint permission
//! checks: handlers describe the action and the scope it targets, and
//! `authorize` answers. Anything the table does not explicitly allow is
//! denied - an anonymous caller gets Unauthorized, an authenticated one
//! gets Forbidden. A denied mutation on an existing object is reported as
//! Forbidden, never NotFound: existence is not hidden from non-owners.

use crate::db::models::{Role, User};
use crate::error::{Error, Result};

/// What a request wants to do. Read covers the safe methods
/// (GET/HEAD/OPTIONS equivalents); everything else is a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn is_safe(&self) -> bool {
        matches!(self, Action::Read)
    }
}

/// The resource class an action targets
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    /// Categories, genres and titles: world-readable, admin-writable
    PublicCatalog,
    /// Reviews and comments: world-readable, written by any authenticated
    /// user, mutable by the author, a moderator or an admin. `author` is
    /// the owning user's guid; None for creation (no owner yet).
    UserContent { author: Option<&'a str> },
    /// The admin-managed user directory, including reads
    UserDirectory,
}

/// Capability set derived from (role, staff flag, superuser flag)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Create/update/delete catalog entries and manage the user directory
    pub can_write_content: bool,
    /// Edit or remove any user's reviews and comments
    pub can_moderate_content: bool,
    /// List, create, update and delete arbitrary user accounts
    pub can_manage_users: bool,
}

/// Map a principal's role and staff/superuser flags to capabilities.
/// Staff and superuser status augment the role: either flag grants the
/// full admin capability set regardless of the stored role.
pub fn capabilities(role: Role, is_staff: bool, is_superuser: bool) -> Capabilities {
    let admin = role == Role::Admin || is_staff || is_superuser;
    Capabilities {
        can_write_content: admin,
        can_moderate_content: admin || role == Role::Moderator,
        can_manage_users: admin,
    }
}

impl User {
    pub fn capabilities(&self) -> Capabilities {
        capabilities(self.role, self.is_staff, self.is_superuser)
    }
}

/// Decide whether `principal` may perform `action` against `scope`.
///
/// `None` is the anonymous principal: allowed only to read public
/// resource classes, denied everything else with Unauthorized.
pub fn authorize(principal: Option<&User>, action: Action, scope: Scope) -> Result<()> {
    match scope {
        Scope::PublicCatalog | Scope::UserContent { .. } if action.is_safe() => Ok(()),
        Scope::UserDirectory => {
            let user = require_authenticated(principal)?;
            if user.capabilities().can_manage_users {
                Ok(())
            } else {
                Err(Error::Forbidden(
                    "User administration requires an admin".to_string(),
                ))
            }
        }
        Scope::PublicCatalog => {
            let user = require_authenticated(principal)?;
            if user.capabilities().can_write_content {
                Ok(())
            } else {
                Err(Error::Forbidden(
                    "Only an admin may modify this resource".to_string(),
                ))
            }
        }
        Scope::UserContent { author } => {
            let user = require_authenticated(principal)?;
            match (action, author) {
                (Action::Create, _) => Ok(()),
                (_, Some(author_guid)) => {
                    if user.capabilities().can_moderate_content || user.guid == author_guid {
                        Ok(())
                    } else {
                        Err(Error::Forbidden(
                            "Only the author, a moderator or an admin may modify this resource"
                                .to_string(),
                        ))
                    }
                }
                // Update/delete on content with no resolved owner never
                // reaches here; deny rather than fall through.
                (_, None) => Err(Error::Forbidden("Permission denied".to_string())),
            }
        }
    }
}

fn require_authenticated<'a>(principal: Option<&'a User>) -> Result<&'a User> {
    principal.ok_or_else(|| Error::Unauthorized("Authentication required".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(guid: &str, role: Role) -> User {
        User {
            guid: guid.to_string(),
            username: guid.to_string(),
            email: format!("{}@example.com", guid),
            first_name: None,
            last_name: None,
            bio: None,
            role,
            is_staff: false,
            is_superuser: false,
        }
    }

    #[test]
    fn anonymous_can_only_read_public_scopes() {
        assert!(authorize(None, Action::Read, Scope::PublicCatalog).is_ok());
        assert!(authorize(None, Action::Read, Scope::UserContent { author: None }).is_ok());

        for action in [Action::Create, Action::Update, Action::Delete] {
            assert!(matches!(
                authorize(None, action, Scope::PublicCatalog),
                Err(Error::Unauthorized(_))
            ));
            assert!(matches!(
                authorize(None, action, Scope::UserContent { author: Some("a") }),
                Err(Error::Unauthorized(_))
            ));
        }
        assert!(matches!(
            authorize(None, Action::Read, Scope::UserDirectory),
            Err(Error::Unauthorized(_))
        ));
    }

    #[test]
    fn catalog_writes_require_admin() {
        let plain = user("u1", Role::User);
        let moderator = user("m1", Role::Moderator);
        let admin = user("a1", Role::Admin);

        for action in [Action::Create, Action::Update, Action::Delete] {
            assert!(matches!(
                authorize(Some(&plain), action, Scope::PublicCatalog),
                Err(Error::Forbidden(_))
            ));
            assert!(matches!(
                authorize(Some(&moderator), action, Scope::PublicCatalog),
                Err(Error::Forbidden(_))
            ));
            assert!(authorize(Some(&admin), action, Scope::PublicCatalog).is_ok());
        }
    }

    #[test]
    fn staff_and_superuser_flags_grant_admin_capabilities() {
        let mut staff = user("s1", Role::User);
        staff.is_staff = true;
        assert!(authorize(Some(&staff), Action::Delete, Scope::PublicCatalog).is_ok());
        assert!(authorize(Some(&staff), Action::Read, Scope::UserDirectory).is_ok());

        let mut root = user("r1", Role::User);
        root.is_superuser = true;
        assert!(authorize(Some(&root), Action::Create, Scope::UserDirectory).is_ok());
    }

    #[test]
    fn any_authenticated_user_may_create_content() {
        let plain = user("u1", Role::User);
        assert!(authorize(Some(&plain), Action::Create, Scope::UserContent { author: None }).is_ok());
    }

    #[test]
    fn content_mutation_limited_to_author_moderator_admin() {
        let owner = user("owner", Role::User);
        let other = user("other", Role::User);
        let moderator = user("mod", Role::Moderator);
        let admin = user("adm", Role::Admin);
        let scope = Scope::UserContent {
            author: Some("owner"),
        };

        for action in [Action::Update, Action::Delete] {
            assert!(authorize(Some(&owner), action, scope).is_ok());
            assert!(authorize(Some(&moderator), action, scope).is_ok());
            assert!(authorize(Some(&admin), action, scope).is_ok());
            assert!(matches!(
                authorize(Some(&other), action, scope),
                Err(Error::Forbidden(_))
            ));
        }

        // The denied user can still read the same object
        assert!(authorize(Some(&other), Action::Read, scope).is_ok());
    }

    #[test]
    fn user_directory_is_admin_only_even_for_reads() {
        let plain = user("u1", Role::User);
        let moderator = user("m1", Role::Moderator);
        assert!(matches!(
            authorize(Some(&plain), Action::Read, Scope::UserDirectory),
            Err(Error::Forbidden(_))
        ));
        assert!(matches!(
            authorize(Some(&moderator), Action::Create, Scope::UserDirectory),
            Err(Error::Forbidden(_))
        ));
    }

    #[test]
    fn capability_mapping() {
        let caps = capabilities(Role::Moderator, false, false);
        assert!(caps.can_moderate_content);
        assert!(!caps.can_write_content);
        assert!(!caps.can_manage_users);

        let caps = capabilities(Role::User, false, false);
        assert_eq!(
            caps,
            Capabilities {
                can_write_content: false,
                can_moderate_content: false,
                can_manage_users: false
            }
        );
    }
}
