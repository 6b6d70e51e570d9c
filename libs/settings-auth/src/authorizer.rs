use crate::claims::Claims;
use crate::errors::AuthzError;
use crate::principal::{Principal, Role};

/// Single choke point for access decisions.
///
/// Handlers never look at raw claims; they receive the [`Principal`] produced here.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationGate {
    required: Option<Role>,
}

impl AuthorizationGate {
    /// Gate for a route group. `None` admits any authenticated principal.
    #[must_use]
    pub fn new(required: Option<Role>) -> Self {
        Self { required }
    }

    /// Authorize against this gate's route requirement.
    ///
    /// # Errors
    /// See [`AuthorizationGate::authorize`].
    pub fn check(&self, claims: Option<&Claims>) -> Result<Principal, AuthzError> {
        Self::authorize(claims, self.required)
    }

    /// Turn verified claims into a principal, enforcing `required` if given.
    ///
    /// # Errors
    /// `Forbidden` when there are no verified claims or the role does not meet `required`.
    pub fn authorize(
        claims: Option<&Claims>,
        required: Option<Role>,
    ) -> Result<Principal, AuthzError> {
        let Some(claims) = claims else {
            return Err(AuthzError::Forbidden("unauthenticated".to_owned()));
        };

        if let Some(required) = required
            && !claims.role.satisfies(required)
        {
            return Err(AuthzError::Forbidden(format!(
                "role {} does not meet {required}",
                claims.role
            )));
        }

        Ok(Principal::new(claims.subject, claims.role).with_claims(claims.extras.clone()))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn claims_with(role: Role) -> Claims {
        Claims {
            subject: Uuid::new_v4(),
            expires_at: OffsetDateTime::now_utc(),
            issuer: None,
            audiences: vec![],
            role,
            email: None,
            extras: serde_json::Map::new(),
        }
    }

    #[test]
    fn no_claims_is_forbidden() {
        assert!(matches!(
            AuthorizationGate::authorize(None, None),
            Err(AuthzError::Forbidden(_))
        ));
    }

    #[test]
    fn builds_principal_from_claims() {
        let claims = claims_with(Role::User);
        let principal = AuthorizationGate::authorize(Some(&claims), Some(Role::User)).unwrap();
        assert_eq!(principal.id, claims.subject);
        assert_eq!(principal.role, Role::User);
    }

    #[test]
    fn unmet_role_is_forbidden() {
        let claims = claims_with(Role::User);
        let gate = AuthorizationGate::new(Some(Role::Service));
        assert!(matches!(gate.check(Some(&claims)), Err(AuthzError::Forbidden(_))));
    }

    #[test]
    fn admin_does_not_imply_service() {
        let claims = claims_with(Role::Admin);
        assert!(AuthorizationGate::authorize(Some(&claims), Some(Role::Service)).is_err());
    }

    #[test]
    fn service_passes_service_gate() {
        let claims = claims_with(Role::Service);
        let gate = AuthorizationGate::new(Some(Role::Service));
        assert_eq!(gate.check(Some(&claims)).unwrap().role, Role::Service);
    }
}
