use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use time::OffsetDateTime;

use crate::{app_state::AppState, db::models::AccessLevel, error::AppError};

/// Request-scoped authentication context, resolved once at the framework
/// boundary and passed explicitly into handlers. Core logic never reads
/// ambient session state.
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    pub user_id: i64,
    pub access_level: AccessLevel,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.access_level == AccessLevel::Admin
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("admin access required".to_string()))
        }
    }
}

/// Resolves a bearer session token against the sessions table and, when
/// valid, attaches an `AuthContext` to the request. Requests without a
/// valid token pass through; protected handlers reject via the extractor.
pub async fn auth_context_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(ctx) = resolve_context(&state, request.headers()).await {
        request.extensions_mut().insert(ctx);
    }
    next.run(request).await
}

async fn resolve_context(state: &AppState, headers: &HeaderMap) -> Option<AuthContext> {
    let token = headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?;

    let row = sqlx::query_as::<_, (i64, AccessLevel)>(
        r#"
        SELECT u.id, u.access_level
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token = ?1 AND s.expires_at > ?2
        "#,
    )
    .bind(token)
    .bind(OffsetDateTime::now_utc())
    .fetch_optional(&state.db)
    .await
    .ok()??;

    Some(AuthContext {
        user_id: row.0,
        access_level: row.1,
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .ok_or_else(|| AppError::Authentication("missing or invalid session".to_string()))
    }
}
