// src/middleware/auth.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

// A identidade é resolvida pelo provedor externo. Aqui só capturamos o token
// (para repassar ao backend) e o id do usuário (para o registro de ações).
const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Clone, Default)]
pub struct Caller {
    pub token: Option<String>,
    pub user_id: Option<String>,
}

impl Caller {
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .ok()
            .map(|TypedHeader(auth)| auth.token().to_string());

        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        Ok(Caller { token, user_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Request};

    #[tokio::test]
    async fn extracts_bearer_token_and_user_id() {
        let (mut parts, _) = Request::builder()
            .header(header::AUTHORIZATION, "Bearer abc.def")
            .header(USER_ID_HEADER, " user_42 ")
            .body(())
            .unwrap()
            .into_parts();

        let caller = Caller::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(caller.token(), Some("abc.def"));
        assert_eq!(caller.user_id.as_deref(), Some("user_42"));
    }

    #[tokio::test]
    async fn anonymous_caller_has_nothing() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        let caller = Caller::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(caller.token.is_none());
        assert!(caller.user_id.is_none());
    }
}
