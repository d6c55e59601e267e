use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::role::Role;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub role: Role,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub salary: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// `None` for rows seeded without an acting user.
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
}

/// Input for [`crate::store::users::insert_user`]; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub role: Role,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub salary: i64,
    pub actor: Option<i64>,
}
