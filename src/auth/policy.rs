//! Capability-based access policy.
//!
//! Endpoints and client routes declare the [`Capability`] they need; the single
//! [`authorize`] function decides whether a role holds it under an [`AccessPolicy`].

use thiserror::Error;

use crate::auth::claims::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// List products and read analytics.
    ReadProducts,
    /// Create, update and delete products.
    ManageProducts,
}

/// Minimum role needed per capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    pub read_products: Role,
    pub manage_products: Role,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            read_products: Role::Admin,
            manage_products: Role::Admin,
        }
    }
}

impl AccessPolicy {
    /// Default policy, optionally opening product reads to every authenticated user.
    pub fn with_user_reads(allow: bool) -> Self {
        let mut policy = Self::default();
        if allow {
            policy.read_products = Role::User;
        }
        policy
    }

    pub fn required_role(&self, capability: Capability) -> Role {
        match capability {
            Capability::ReadProducts => self.read_products,
            Capability::ManageProducts => self.manage_products,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{required} role required, credential has {actual}")]
pub struct AccessDenied {
    pub required: Role,
    pub actual: Role,
}

pub fn authorize(
    role: Role,
    capability: Capability,
    policy: &AccessPolicy,
) -> Result<(), AccessDenied> {
    let required = policy.required_role(capability);
    if role >= required {
        Ok(())
    } else {
        Err(AccessDenied {
            required,
            actual: role,
        })
    }
}
