//! Authentication extractor - the gate in front of every post route.

use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload, web};
use futures::future::LocalBoxFuture;
use uuid::Uuid;

use inkwell_core::ports::{AuthError, TokenClaims};
use inkwell_shared::ErrorResponse;

use crate::state::AppState;

/// Authenticated actor.
///
/// Declare it as the first handler argument so that guests are rejected
/// before the path or body is looked at:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
        }
    }
}

/// Error type for authentication failures.
#[derive(Debug)]
pub struct AuthenticationError(pub AuthError);

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ResponseError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            AuthError::Encoding(_) | AuthError::Lookup(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match &self.0 {
            AuthError::TokenExpired => ErrorResponse::new(401, "Token Expired")
                .with_detail("Your authentication token has expired. Please login again."),
            AuthError::InvalidToken(msg) => {
                ErrorResponse::new(401, "Invalid Token").with_detail(msg.clone())
            }
            AuthError::MissingAuth => ErrorResponse::new(401, "Authentication Required")
                .with_detail("Please provide a valid Bearer token in the Authorization header."),
            AuthError::UnknownUser => ErrorResponse::unauthorized()
                .with_detail("The token does not belong to a known user."),
            AuthError::Encoding(msg) | AuthError::Lookup(msg) => {
                tracing::error!("Authentication failure: {}", msg);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
fn bearer_token(req: &HttpRequest) -> Result<&str, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
            tracing::error!("AppState not found in app data");
            return Box::pin(async {
                Err(AuthenticationError(AuthError::Lookup(
                    "Server configuration error".to_string(),
                )))
            });
        };

        let claims = bearer_token(req).and_then(|token| state.tokens.validate_token(token));

        Box::pin(async move {
            let claims = claims.map_err(AuthenticationError)?;

            let user = state
                .users
                .find_by_id(claims.user_id)
                .await
                .map_err(|e| AuthenticationError(AuthError::Lookup(e.to_string())))?;

            if user.is_none() {
                tracing::debug!(user_id = %claims.user_id, "Token subject is not a known user");
                return Err(AuthenticationError(AuthError::UnknownUser));
            }

            Ok(Identity::from(claims))
        })
    }
}
