//! The authenticated caller, passed explicitly into every operation that authorizes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::user::Role;

use crate::errors::ServiceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: Uuid, role: Role) -> Self { Self { user_id, role } }

    pub fn is_admin(&self) -> bool { self.role == Role::Admin }

    pub fn require_admin(&self) -> Result<(), ServiceError> {
        self.require_role(Role::Admin)
    }

    pub fn require_role(&self, role: Role) -> Result<(), ServiceError> {
        if self.role != role {
            return Err(ServiceError::forbidden(format!("{role} role required")));
        }
        Ok(())
    }

    /// Owner of the resource, or an admin.
    pub fn require_owner_or_admin(&self, owner_id: Uuid) -> Result<(), ServiceError> {
        if self.user_id != owner_id && !self.is_admin() {
            return Err(ServiceError::forbidden("not the owner"));
        }
        Ok(())
    }
}
