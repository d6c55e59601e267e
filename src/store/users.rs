//! User and refresh-token queries shared by the auth handlers and the seeder.

use std::future::Future;

use futures::StreamExt;
use sqlx::PgPool;

use crate::model::user::{NewUser, User};
use crate::models::UserCredentials;
use crate::store::postgres::classify;
use crate::store::{StoreError, StoreResult};

pub const USERS_EMAIL_KEY: &str = "users_email_key";

const USER_COLUMNS: &str = r#"
    id, role, name, email, password_hash, salary,
    created_at, updated_at, created_by, updated_by
"#;

/// Fails with a unique violation on [`USERS_EMAIL_KEY`] for a taken email.
pub async fn insert_user(pool: &PgPool, new: &NewUser) -> StoreResult<User> {
    let sql = format!(
        r#"
        INSERT INTO users (role, name, email, password_hash, salary, created_by, updated_by)
        VALUES ($1, $2, $3, $4, $5, $6, $6)
        RETURNING {USER_COLUMNS}
        "#
    );

    sqlx::query_as::<_, User>(&sql)
        .bind(new.role)
        .bind(&new.name)
        .bind(new.email.to_lowercase())
        .bind(&new.password_hash)
        .bind(new.salary)
        .bind(new.actor)
        .fetch_one(pool)
        .await
        .map_err(classify)
}

pub async fn find_credentials(pool: &PgPool, email: &str) -> StoreResult<Option<UserCredentials>> {
    sqlx::query_as::<_, UserCredentials>(
        r#"
        SELECT id, email, password_hash, role
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email.to_lowercase())
    .fetch_optional(pool)
    .await
    .map_err(classify)
}

pub async fn email_exists(pool: &PgPool, email: &str) -> StoreResult<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email.to_lowercase())
        .fetch_one(pool)
        .await
        .map_err(classify)
}

pub async fn touch_last_login(pool: &PgPool, user_id: i64) -> StoreResult<()> {
    sqlx::query("UPDATE users SET last_login_at = now() WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(classify)
}

/// Streams stored emails, awaiting `each` on every batch of `batch_size`
/// before reading further rows.
pub async fn for_each_email_batch<F, Fut>(
    pool: &PgPool,
    since_days: Option<i32>,
    batch_size: usize,
    mut each: F,
) -> StoreResult<usize>
where
    F: FnMut(Vec<String>) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut stream = match since_days {
        Some(days) => sqlx::query_scalar::<_, String>(
            r#"
            SELECT email
            FROM users
            WHERE last_login_at >= now() - make_interval(days => $1)
            ORDER BY last_login_at DESC
            "#,
        )
        .bind(days)
        .fetch(pool),
        None => sqlx::query_scalar::<_, String>("SELECT email FROM users").fetch(pool),
    };

    let batch_size = batch_size.max(1);
    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        batch.push(row.map_err(classify)?);
        total += 1;

        if batch.len() >= batch_size {
            let full = std::mem::replace(&mut batch, Vec::with_capacity(batch_size));
            each(full).await;
        }
    }

    if !batch.is_empty() {
        each(batch).await;
    }

    Ok(total)
}

pub async fn store_refresh_token(
    pool: &PgPool,
    user_id: i64,
    jti: &str,
    expires_at_unix: i64,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES ($1, $2, to_timestamp($3))
        "#,
    )
    .bind(user_id)
    .bind(jti)
    .bind(expires_at_unix as f64)
    .execute(pool)
    .await
    .map(|_| ())
    .map_err(classify)
}

/// Marks the token revoked; true only if it was live before this call.
pub async fn revoke_refresh_token(pool: &PgPool, jti: &str) -> StoreResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE refresh_tokens
        SET revoked = TRUE
        WHERE jti = $1 AND revoked = FALSE AND expires_at > now()
        "#,
    )
    .bind(jti)
    .execute(pool)
    .await
    .map_err(classify)?;

    Ok(result.rows_affected() == 1)
}

impl StoreError {
    pub fn is_duplicate_email(&self) -> bool {
        self.violates(USERS_EMAIL_KEY)
    }
}
