//! Per-operation authorization, evaluated ahead of handler dispatch.
//!
//! Every protected route group carries an `enforce` layer for its resource;
//! the capability table below is the single place that says which tier a
//! (resource, operation) pair requires. Handlers never branch on roles.

use axum::{extract::Request, http::Method, middleware::Next, response::Response};

use crate::error::{AppError, AppResult};
use crate::utils::jwt::Claims;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// The Type → Brand → Model classification tree.
    Taxonomy,
    Vehicles,
    Services,
    OilChanges,
    Profile,
    /// The full user listing.
    Directory,
    /// A single user record, scoped to the caller.
    Account,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
}

impl Operation {
    pub fn from_method(method: &Method) -> Self {
        match *method {
            Method::GET | Method::HEAD => Operation::Read,
            _ => Operation::Write,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Public,
    Authenticated,
    Admin,
}

/// The capability table.
pub fn required_tier(resource: Resource, op: Operation) -> Tier {
    match (resource, op) {
        (Resource::Taxonomy, Operation::Read) => Tier::Public,
        (Resource::Taxonomy, Operation::Write) => Tier::Admin,
        (Resource::Directory, _) => Tier::Admin,
        (Resource::Vehicles, _)
        | (Resource::Services, _)
        | (Resource::OilChanges, _)
        | (Resource::Profile, _)
        | (Resource::Account, _) => Tier::Authenticated,
    }
}

pub fn caller_tier(claims: Option<&Claims>) -> Tier {
    match claims {
        Some(c) if c.is_admin => Tier::Admin,
        Some(_) => Tier::Authenticated,
        None => Tier::Public,
    }
}

/// Gate middleware: compares the caller's tier against the table entry for
/// this resource and the operation implied by the request method.
pub async fn enforce(resource: Resource, request: Request, next: Next) -> AppResult<Response> {
    let op = Operation::from_method(request.method());
    let required = required_tier(resource, op);
    let caller = caller_tier(request.extensions().get::<Claims>());

    if caller < required {
        return Err(match caller {
            Tier::Public => AppError::Unauthorized("Authentication required".to_string()),
            _ => AppError::Forbidden("Admin access required".to_string()),
        });
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn claims(is_admin: bool) -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            phone_number: "+15551234567".to_string(),
            is_admin,
            exp: Utc::now().timestamp() + 3600,
            iat: Utc::now().timestamp(),
        }
    }

    #[test]
    fn taxonomy_reads_are_public_writes_are_admin() {
        assert_eq!(required_tier(Resource::Taxonomy, Operation::Read), Tier::Public);
        assert_eq!(required_tier(Resource::Taxonomy, Operation::Write), Tier::Admin);
    }

    #[test]
    fn directory_requires_admin_account_does_not() {
        assert_eq!(required_tier(Resource::Directory, Operation::Read), Tier::Admin);
        assert_eq!(
            required_tier(Resource::Account, Operation::Read),
            Tier::Authenticated
        );
    }

    #[test]
    fn owned_resources_require_authentication() {
        for resource in [
            Resource::Vehicles,
            Resource::Services,
            Resource::OilChanges,
            Resource::Profile,
        ] {
            for op in [Operation::Read, Operation::Write] {
                assert_eq!(required_tier(resource, op), Tier::Authenticated);
            }
        }
    }

    #[test]
    fn tiers_are_ordered() {
        assert!(Tier::Public < Tier::Authenticated);
        assert!(Tier::Authenticated < Tier::Admin);
    }

    #[test]
    fn caller_tier_follows_claims() {
        assert_eq!(caller_tier(None), Tier::Public);
        assert_eq!(caller_tier(Some(&claims(false))), Tier::Authenticated);
        assert_eq!(caller_tier(Some(&claims(true))), Tier::Admin);
    }

    #[test]
    fn operation_from_method() {
        assert_eq!(Operation::from_method(&Method::GET), Operation::Read);
        assert_eq!(Operation::from_method(&Method::HEAD), Operation::Read);
        assert_eq!(Operation::from_method(&Method::POST), Operation::Write);
        assert_eq!(Operation::from_method(&Method::PUT), Operation::Write);
        assert_eq!(Operation::from_method(&Method::DELETE), Operation::Write);
    }
}
