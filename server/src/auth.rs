use application::service::PrincipalService;
use application::transfer::{GetPrincipalDto, PrincipalDto};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;

use crate::handler::AppModule;

/// The verified acting user of a request. Credential verification happens
/// at the authenticating gateway; the asserted subject is resolved against
/// the user directory and unknown subjects are rejected.
pub struct Principal(pub PrincipalDto);

#[async_trait::async_trait]
impl FromRequestParts<AppModule> for Principal {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppModule,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| StatusCode::UNAUTHORIZED)?;
        let principal = state
            .database()
            .resolve_principal(GetPrincipalDto {
                username: bearer.token().to_string(),
            })
            .await
            .map_err(|_| StatusCode::UNAUTHORIZED)?;
        tracing::info!("user {} authenticated", principal.username);
        Ok(Self(principal))
    }
}
