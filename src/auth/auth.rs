use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};

use crate::error::HrError;
use crate::model::role::Role;

/// The caller, as established by [`crate::auth::middleware::auth_middleware`].
///
/// Users are employees: an attendance record's `employee_id` is the
/// authenticated user's id.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = req.extensions().get::<AuthUser>().cloned();
        ready(user.ok_or_else(|| HrError::Unauthorized("Missing authentication".into()).into()))
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), HrError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(HrError::Forbidden(
                "you must be an admin to access this resource".into(),
            ))
        }
    }

    pub fn require_employee(&self) -> Result<(), HrError> {
        if self.role == Role::Employee {
            Ok(())
        } else {
            Err(HrError::Forbidden(
                "you must be an employee to access this resource".into(),
            ))
        }
    }

    pub fn actor(&self) -> Option<i64> {
        Some(self.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> AuthUser {
        AuthUser {
            user_id: 1,
            email: "u@example.com".into(),
            role,
        }
    }

    #[test]
    fn role_guards() {
        assert!(user(Role::Admin).require_admin().is_ok());
        assert!(user(Role::Admin).require_employee().is_err());
        assert!(user(Role::Employee).require_employee().is_ok());
        assert!(matches!(
            user(Role::Employee).require_admin(),
            Err(HrError::Forbidden(_))
        ));
    }
}
