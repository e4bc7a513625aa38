//! Route access policies.
//!
//! Every protected handler calls [`authorize`] before touching its body or
//! storage. Decisions depend only on the caller identity, the username in the
//! route path and whether the request carries a sensitive field.

use thiserror::Error;

use super::Identity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Public,
    AuthenticatedOnly,
    AdminOnly,
    /// Caller is the user named in the path, or an admin. A sensitive field
    /// (password) narrows this to the user alone.
    SelfOrAdmin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AccessRequest<'a> {
    pub identity: Option<&'a Identity>,
    pub target: Option<&'a str>,
    pub sensitive_field: bool,
}

impl<'a> AccessRequest<'a> {
    pub fn new(identity: Option<&'a Identity>) -> Self {
        Self { identity, target: None, sensitive_field: false }
    }

    pub fn target(mut self, username: &'a str) -> Self {
        self.target = Some(username);
        self
    }

    pub fn sensitive_field(mut self, present: bool) -> Self {
        self.sensitive_field = present;
        self
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Unauthorized")]
    Unauthorized { policy: Policy },
}

impl Policy {
    pub fn decide(self, request: &AccessRequest<'_>) -> Decision {
        let allowed = match (self, request.identity) {
            (Policy::Public, _) => true,
            (_, None) => false,
            (Policy::AuthenticatedOnly, Some(_)) => true,
            (Policy::AdminOnly, Some(identity)) => identity.is_admin,
            (Policy::SelfOrAdmin, Some(identity)) => {
                let is_self = request.target == Some(identity.username.as_str());
                if request.sensitive_field {
                    is_self
                } else {
                    is_self || identity.is_admin
                }
            }
        };

        if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

/// [`Policy::decide`], with a deny turned into [`AuthError::Unauthorized`].
pub fn authorize(policy: Policy, request: &AccessRequest<'_>) -> Result<(), AuthError> {
    match policy.decide(request) {
        Decision::Allow => Ok(()),
        Decision::Deny => {
            tracing::debug!(
                ?policy,
                caller = request.identity.map(|i| i.username.as_str()),
                path_user = request.target,
                sensitive = request.sensitive_field,
                "access denied"
            );
            Err(AuthError::Unauthorized { policy })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Decision::{Allow, Deny};

    fn bob() -> Identity {
        Identity::new("bob", false)
    }

    fn admin_bob() -> Identity {
        Identity::new("bob", true)
    }

    fn decide(policy: Policy, identity: Option<&Identity>, target: Option<&str>, sensitive: bool) -> Decision {
        let request = AccessRequest { identity, target, sensitive_field: sensitive };
        policy.decide(&request)
    }

    #[test]
    fn decision_table() {
        let bob = bob();
        let admin = admin_bob();
        let none: Option<&Identity> = None;

        #[rustfmt::skip]
        let table: Vec<(Policy, Option<&Identity>, Option<&str>, bool, Decision)> = vec![
            (Policy::Public,            none,         None,          false, Allow),
            (Policy::Public,            none,         Some("alice"), true,  Allow),
            (Policy::Public,            Some(&bob),   None,          false, Allow),

            (Policy::AuthenticatedOnly, none,         None,          false, Deny),
            (Policy::AuthenticatedOnly, Some(&bob),   None,          false, Allow),
            (Policy::AuthenticatedOnly, Some(&admin), Some("alice"), true,  Allow),

            (Policy::AdminOnly,         none,         None,          false, Deny),
            (Policy::AdminOnly,         Some(&bob),   None,          false, Deny),
            (Policy::AdminOnly,         Some(&bob),   Some("bob"),   false, Deny),
            (Policy::AdminOnly,         Some(&admin), None,          false, Allow),
            (Policy::AdminOnly,         Some(&admin), Some("alice"), false, Allow),
            (Policy::AdminOnly,         Some(&admin), Some("alice"), true,  Allow),

            (Policy::SelfOrAdmin,       none,         Some("bob"),   false, Deny),
            (Policy::SelfOrAdmin,       none,         Some("bob"),   true,  Deny),
            (Policy::SelfOrAdmin,       none,         None,          false, Deny),
            (Policy::SelfOrAdmin,       Some(&bob),   Some("bob"),   false, Allow),
            (Policy::SelfOrAdmin,       Some(&bob),   Some("bob"),   true,  Allow),
            (Policy::SelfOrAdmin,       Some(&bob),   Some("alice"), false, Deny),
            (Policy::SelfOrAdmin,       Some(&bob),   Some("alice"), true,  Deny),
            (Policy::SelfOrAdmin,       Some(&bob),   None,          false, Deny),
            (Policy::SelfOrAdmin,       Some(&admin), Some("alice"), false, Allow),
            (Policy::SelfOrAdmin,       Some(&admin), Some("alice"), true,  Deny),
            (Policy::SelfOrAdmin,       Some(&admin), Some("bob"),   true,  Allow),
            (Policy::SelfOrAdmin,       Some(&admin), None,          false, Allow),
            (Policy::SelfOrAdmin,       Some(&admin), None,          true,  Deny),
        ];

        for (policy, identity, target, sensitive, expected) in table {
            assert_eq!(
                decide(policy, identity, target, sensitive),
                expected,
                "{:?} identity={:?} target={:?} sensitive={}",
                policy,
                identity,
                target,
                sensitive
            );
        }
    }

    #[test]
    fn username_match_is_exact() {
        let bob = bob();
        assert_eq!(decide(Policy::SelfOrAdmin, Some(&bob), Some("Bob"), false), Deny);
        assert_eq!(decide(Policy::SelfOrAdmin, Some(&bob), Some("bob "), false), Deny);
    }

    #[test]
    fn authorize_reports_the_denying_policy() {
        let bob = bob();
        let request = AccessRequest::new(Some(&bob)).target("alice");
        assert_eq!(
            authorize(Policy::SelfOrAdmin, &request),
            Err(AuthError::Unauthorized { policy: Policy::SelfOrAdmin })
        );
        assert_eq!(authorize(Policy::AuthenticatedOnly, &request), Ok(()));
    }

    #[test]
    fn decide_leaves_identity_untouched() {
        let admin = admin_bob();
        let request = AccessRequest::new(Some(&admin)).target("alice").sensitive_field(true);
        let _ = Policy::SelfOrAdmin.decide(&request);
        assert_eq!(admin, admin_bob());
    }
}
