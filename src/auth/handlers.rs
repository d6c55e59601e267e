use crate::{
    auth::{
        auth::AuthUser,
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    error::HrError,
    model::{role::Role, user::NewUser},
    models::{Claims, LoginReqDto, RegisterUserReq, TokenPair, TokenType},
    store::{StoreResult, bounded, users},
    utils::{email_cache, email_filter},
    validator::Validator,
};
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;
use sqlx::PgPool;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// true  => email AVAILABLE
/// false => email TAKEN
pub async fn is_email_available(email: &str, pool: &PgPool, limit: Duration) -> Result<bool, HrError> {
    check_email_available(email, limit, users::email_exists(pool, email)).await
}

/// `lookup` is only awaited when neither the filter nor the cache can answer.
async fn check_email_available<F>(email: &str, limit: Duration, lookup: F) -> Result<bool, HrError>
where
    F: Future<Output = StoreResult<bool>>,
{
    // Cuckoo filter: a miss is definitive.
    if !email_filter::might_exist(email) {
        return Ok(true);
    }

    // Moka cache: a hit is definitive.
    if email_cache::is_taken(email).await {
        return Ok(false);
    }

    let exists = bounded(limit, lookup).await.map_err(|e| {
        error!(error = %e, "Email availability lookup failed");
        HrError::from(e)
    })?;
    if exists {
        email_cache::mark_taken(email).await;
    }
    Ok(!exists)
}

/// Registers a user on behalf of an admin.
#[utoipa::path(
    post,
    path = "/v1/users",
    request_body = RegisterUserReq,
    responses(
        (status = 201, description = "User created", body = Object, example = json!({
            "message": "user registered successfully",
            "user_id": 2
        })),
        (status = 409, description = "Email already in use"),
        (status = 422, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 504, description = "Store timeout")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(name = "auth_register", skip(auth, pool, config, payload), fields(email = %payload.email))]
pub async fn register(
    auth: AuthUser,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    payload: web::Json<RegisterUserReq>,
) -> Result<HttpResponse, HrError> {
    auth.require_admin()?;

    let mut v = Validator::new();
    v.check(!payload.name.trim().is_empty(), "name", "must be provided");
    v.email(&payload.email);
    v.password(&payload.password);
    v.check(payload.salary >= 0, "salary", "must not be negative");
    v.finish()?;

    if !is_email_available(&payload.email, pool.get_ref(), config.store_timeout).await? {
        return Err(HrError::Conflict("a user with this email address already exists".into()));
    }

    let password_hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "Failed to hash password");
        HrError::Internal
    })?;

    let new = NewUser {
        role: payload.role,
        name: payload.name.trim().to_string(),
        email: payload.email.trim().to_string(),
        password_hash,
        salary: payload.salary,
        actor: auth.actor(),
    };

    match bounded(config.store_timeout, users::insert_user(pool.get_ref(), &new)).await {
        Ok(user) => {
            email_filter::insert(&user.email);
            email_cache::mark_taken(&user.email).await;
            info!(user_id = user.id, role = %user.role, "User registered");

            Ok(HttpResponse::Created().json(json!({
                "message": "user registered successfully",
                "user_id": user.id
            })))
        }
        Err(e) if e.is_duplicate_email() => Err(HrError::Conflict(
            "a user with this email address already exists".into(),
        )),
        Err(e) => {
            error!(error = %e, "Failed to register user");
            Err(e.into())
        }
    }
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Tokens issued", body = TokenPair),
        (status = 401, description = "Invalid credentials"),
        (status = 422, description = "Validation failed"),
        (status = 504, description = "Store timeout")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip(pool, config, user), fields(email = %user.email))]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, HrError> {
    info!("Login request received");

    let mut v = Validator::new();
    v.email(&user.email);
    v.password(&user.password);
    v.finish()?;

    debug!("Fetching user from database");

    let lookup = users::find_credentials(pool.get_ref(), &user.email);
    let db_user = match bounded(config.store_timeout, lookup).await {
        Ok(Some(found)) => found,
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return Err(HrError::Unauthorized("invalid authentication credentials".into()));
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user");
            return Err(e.into());
        }
    };

    match verify_password(&user.password, &db_user.password_hash) {
        Ok(true) => debug!("Password verified"),
        Ok(false) => {
            info!("Invalid credentials: password mismatch");
            return Err(HrError::Unauthorized("invalid authentication credentials".into()));
        }
        Err(e) => {
            error!(error = %e, user_id = db_user.id, "Stored password hash is unreadable");
            return Err(HrError::Internal);
        }
    }

    let pair = issue_pair(
        pool.get_ref(),
        &config,
        db_user.id,
        &db_user.email,
        db_user.role,
    )
    .await?;

    // non-fatal
    let touch = users::touch_last_login(pool.get_ref(), db_user.id);
    if let Err(e) = bounded(config.store_timeout, touch).await {
        error!(error = %e, "Failed to update last_login_at");
    }

    info!(user_id = db_user.id, "Login successful");
    Ok(HttpResponse::Ok().json(pair))
}

/// Issues an access token plus a persisted refresh token.
async fn issue_pair(
    pool: &PgPool,
    config: &Config,
    user_id: i64,
    email: &str,
    role: Role,
) -> Result<TokenPair, HrError> {
    let access_token = generate_access_token(
        user_id,
        email,
        role,
        &config.jwt_secret,
        config.access_token_ttl,
    )
    .map_err(token_failure)?;

    let (refresh_token, refresh_claims) = generate_refresh_token(
        user_id,
        email,
        role,
        &config.jwt_secret,
        config.refresh_token_ttl,
    )
    .map_err(token_failure)?;

    debug!(user_id, jti = %refresh_claims.jti, "Storing refresh token");

    let persist =
        users::store_refresh_token(pool, user_id, &refresh_claims.jti, refresh_claims.exp as i64);
    bounded(config.store_timeout, persist)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to store refresh token");
            HrError::from(e)
        })?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

fn token_failure(e: jsonwebtoken::errors::Error) -> HrError {
    error!(error = %e, "Failed to sign token");
    HrError::Internal
}

fn bearer_claims(req: &HttpRequest, config: &Config) -> Option<Claims> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))?;

    verify_token(token, &config.jwt_secret).ok()
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "Rotated tokens", body = TokenPair),
        (status = 401, description = "Missing, invalid or revoked refresh token")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, HrError> {
    let claims = bearer_claims(&req, &config)
        .filter(|c| c.token_type == TokenType::Refresh)
        .ok_or_else(|| HrError::Unauthorized("invalid or missing refresh token".into()))?;

    // Revoking first makes rotation single-use: a replayed token finds
    // nothing left to revoke.
    let revoked = bounded(
        config.store_timeout,
        users::revoke_refresh_token(pool.get_ref(), &claims.jti),
    )
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to revoke refresh token");
        HrError::from(e)
    })?;
    if !revoked {
        info!(user_id = claims.user_id, "Refresh with unknown or revoked token");
        return Err(HrError::Unauthorized("invalid or missing refresh token".into()));
    }

    let pair = issue_pair(pool.get_ref(), &config, claims.user_id, &claims.sub, claims.role).await?;
    Ok(HttpResponse::Ok().json(pair))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Refresh token revoked (idempotent)"),
        (status = 504, description = "Store timeout")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, HrError> {
    let Some(claims) = bearer_claims(&req, &config) else {
        return Ok(HttpResponse::NoContent().finish());
    };

    // only refresh tokens can logout
    if claims.token_type != TokenType::Refresh {
        return Ok(HttpResponse::NoContent().finish());
    }

    let revoke = users::revoke_refresh_token(pool.get_ref(), &claims.jti);
    bounded(config.store_timeout, revoke).await.map_err(|e| {
        error!(error = %e, "Failed to revoke refresh token on logout");
        HrError::from(e)
    })?;

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;
    use actix_web::http::StatusCode;

    const SHORT: Duration = Duration::from_millis(20);

    #[actix_web::test]
    async fn stalled_availability_lookup_is_a_store_timeout() {
        let email = "stalled.lookup@example.com";
        email_filter::insert(email);

        let err = check_email_available(email, SHORT, std::future::pending())
            .await
            .unwrap_err();

        assert_eq!(err, HrError::StoreTimeout);
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[actix_web::test]
    async fn filter_miss_answers_without_lookup() {
        let available =
            check_email_available("never.registered@example.com", SHORT, std::future::pending())
                .await
                .unwrap();
        assert!(available);
    }

    #[actix_web::test]
    async fn cached_email_answers_without_lookup() {
        let email = "cached.taken@example.com";
        email_filter::insert(email);
        email_cache::mark_taken(email).await;

        let available = check_email_available(email, SHORT, std::future::pending())
            .await
            .unwrap();
        assert!(!available);
    }

    #[actix_web::test]
    async fn taken_email_from_lookup_is_cached() {
        let email = "looked.up@example.com";
        email_filter::insert(email);

        let available = check_email_available(email, SHORT, async { Ok(true) })
            .await
            .unwrap();
        assert!(!available);
        assert!(email_cache::is_taken(email).await);
    }
}
