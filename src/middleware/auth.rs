use axum::{
    extract::{FromRequestParts, MatchedPath, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use tasklane_auth::{AuthIdentity, TokenCodec, TokenKind};
use tasklane_config::InterceptorConfig;
use tasklane_core::{AppError, AuthError};
use tracing::{debug, warn};

use crate::metrics::track_interceptor;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Decides whether a call to `method` may proceed.
///
/// Returns `Ok(None)` for methods the config marks public and
/// `Ok(Some(identity))` when the call carries a valid access token. Nothing
/// is cached: every call is verified on its own.
pub fn authenticate(
    method: &str,
    headers: Option<&HeaderMap>,
    codec: &TokenCodec,
    config: &InterceptorConfig,
) -> Result<Option<AuthIdentity>, AuthError> {
    if config.is_public(method) {
        return Ok(None);
    }

    let headers = headers
        .filter(|h| !h.is_empty())
        .ok_or(AuthError::MissingMetadata)?;

    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::MalformedAuthHeader)?;
    if value.trim().is_empty() {
        return Err(AuthError::MissingAuthHeader);
    }

    let token = value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MalformedAuthHeader)?;

    let identity = codec.verify(token, TokenKind::Access).map_err(|e| {
        debug!(error = %e, "Access token rejected");
        AuthError::TokenInvalid
    })?;

    Ok(Some(identity))
}

/// Interceptor layered over every RPC route.
///
/// Must be installed with `route_layer` so unmatched paths fall through to
/// 404 and the matched route template names the method.
pub async fn auth_interceptor(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let method = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    let headers = Some(req.headers());
    match authenticate(
        &method,
        headers,
        &state.token_codec,
        &state.interceptor_config,
    ) {
        Ok(Some(identity)) => {
            track_interceptor("allowed");
            req.extensions_mut().insert(identity);
        }
        Ok(None) => track_interceptor("public"),
        Err(e) => {
            track_interceptor("rejected");
            warn!(
                security.event = "unauthenticated_call",
                method = %method,
                code = e.code(),
                "Request rejected by interceptor"
            );
            return Err(e.into());
        }
    }

    Ok(next.run(req).await)
}

/// Extractor for the identity the interceptor verified.
///
/// Handlers take `AuthUser` instead of reading user, session or device ids
/// from the request body, so a caller can only ever act as itself.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthIdentity);

impl AuthUser {
    pub fn identity(&self) -> &AuthIdentity {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthIdentity>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::unauthorized("Request is not authenticated"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use tasklane_config::JwtConfig;
    use tasklane_core::{DeviceId, SessionId, UserId, methods};

    fn codec() -> TokenCodec {
        TokenCodec::new(&JwtConfig {
            access_secret: "access-secret-key-at-least-32-characters".to_string(),
            refresh_secret: "refresh-secret-key-at-least-32-characters".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 2_592_000,
        })
    }

    fn identity() -> AuthIdentity {
        AuthIdentity::new(UserId::new(1), SessionId::new(), DeviceId::new("device-A"))
    }

    fn headers_with(authorization: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(authorization).unwrap(),
        );
        headers
    }

    fn check(headers: Option<&HeaderMap>) -> Result<Option<AuthIdentity>, AuthError> {
        authenticate(
            methods::GET_ME,
            headers,
            &codec(),
            &InterceptorConfig::default(),
        )
    }

    #[test]
    fn test_public_methods_skip_checks() {
        let codec = codec();
        let config = InterceptorConfig::default();
        assert!(matches!(
            authenticate(methods::LOGIN, None, &codec, &config),
            Ok(None)
        ));
        assert!(matches!(
            authenticate(methods::REGISTER, None, &codec, &config),
            Ok(None)
        ));
    }

    #[test]
    fn test_valid_bearer_token() {
        let codec = codec();
        let identity = identity();
        let token = codec.issue_access(&identity).unwrap();
        let headers = headers_with(&format!("Bearer {}", token));

        let result = authenticate(
            methods::LOG_OUT,
            Some(&headers),
            &codec,
            &InterceptorConfig::default(),
        );
        assert_eq!(result.unwrap(), Some(identity));
    }

    #[test]
    fn test_missing_metadata() {
        assert!(matches!(check(None), Err(AuthError::MissingMetadata)));
        assert!(matches!(
            check(Some(&HeaderMap::new())),
            Err(AuthError::MissingMetadata)
        ));
    }

    #[test]
    fn test_missing_auth_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        assert!(matches!(check(Some(&headers)), Err(AuthError::MissingAuthHeader)));

        let empty = headers_with("");
        assert!(matches!(check(Some(&empty)), Err(AuthError::MissingAuthHeader)));
    }

    #[test]
    fn test_bare_token_is_malformed() {
        let token = codec().issue_access(&identity()).unwrap();
        let headers = headers_with(&token);
        assert!(matches!(check(Some(&headers)), Err(AuthError::MalformedAuthHeader)));
    }

    #[test]
    fn test_other_scheme_is_malformed() {
        let headers = headers_with("Basic YWxpY2U6cHcxMjM=");
        assert!(matches!(check(Some(&headers)), Err(AuthError::MalformedAuthHeader)));

        let headers = headers_with("Bearer ");
        assert!(matches!(check(Some(&headers)), Err(AuthError::MalformedAuthHeader)));
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let token = codec().issue_refresh(&identity()).unwrap();
        let headers = headers_with(&format!("Bearer {}", token));
        assert!(matches!(check(Some(&headers)), Err(AuthError::TokenInvalid)));
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let headers = headers_with("Bearer not-a-token");
        assert!(matches!(check(Some(&headers)), Err(AuthError::TokenInvalid)));
    }

    #[test]
    fn test_expired_access_token_is_invalid() {
        let codec = codec();
        let issued = chrono::Utc::now().timestamp() - 3_600;
        let token = codec
            .issue_at(
                TokenKind::Access,
                &identity(),
                std::time::Duration::from_secs(900),
                issued,
            )
            .unwrap();
        let headers = headers_with(&format!("Bearer {}", token));

        let result = authenticate(
            methods::GET_ME,
            Some(&headers),
            &codec,
            &InterceptorConfig::default(),
        );
        assert!(matches!(result, Err(AuthError::TokenInvalid)));
    }

    #[test]
    fn test_configured_public_method() {
        let codec = codec();
        let config = InterceptorConfig::with_public_methods([methods::REFRESH_TOKEN]);
        assert!(matches!(
            authenticate(methods::REFRESH_TOKEN, None, &codec, &config),
            Ok(None)
        ));
        assert!(matches!(
            authenticate(methods::LOGIN, None, &codec, &config),
            Err(AuthError::MissingMetadata)
        ));
    }

    #[tokio::test]
    async fn test_auth_user_reads_injected_identity() {
        let identity = identity();
        let mut request = Request::new(axum::body::Body::empty());
        request.extensions_mut().insert(identity.clone());
        let (mut parts, _) = request.into_parts();

        let AuthUser(extracted) = AuthUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(extracted, identity);
    }

    #[tokio::test]
    async fn test_auth_user_without_identity_is_rejected() {
        let request = Request::new(axum::body::Body::empty());
        let (mut parts, _) = request.into_parts();

        let err = AuthUser::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::UNAUTHORIZED);
    }
}
