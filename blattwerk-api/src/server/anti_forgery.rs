use crate::server::ServerError;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use thiserror::Error;

pub const ANTI_FORGERY_COOKIE: &str = "anti_forgery";
pub const ANTI_FORGERY_HEADER: &str = "x-anti-forgery";

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Error)]
pub enum AntiForgeryError {
    #[error("The anti-forgery cookie is missing")]
    MissingCookie,
    #[error("The anti-forgery header is missing")]
    MissingHeader,
    #[error("The anti-forgery token does not match the cookie")]
    TokenMismatch,
}

/// Issues a fresh token, double-submit style: the token travels back in the
/// `x-anti-forgery` header and must match the cookie set here.
#[must_use]
pub fn issue(jar: CookieJar) -> (CookieJar, String) {
    let token = format!("{:032x}", rand::random::<u128>());

    let cookie = Cookie::build((ANTI_FORGERY_COOKIE, token.clone()))
        .path("/")
        .build();

    (jar.add(cookie), token)
}

/// Guard run by every mutating POST route before the body is touched.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct AntiForgeryGuard;

impl<S: Send + Sync> FromRequestParts<S> for AntiForgeryGuard {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = match CookieJar::from_request_parts(parts, state).await {
            Ok(jar) => jar,
            Err(infallible) => match infallible {},
        };

        let cookie = jar
            .get(ANTI_FORGERY_COOKIE)
            .ok_or(AntiForgeryError::MissingCookie)?;
        let header = parts
            .headers
            .get(ANTI_FORGERY_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(AntiForgeryError::MissingHeader)?;

        if header == cookie.value() {
            Ok(Self)
        } else {
            Err(AntiForgeryError::TokenMismatch.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ANTI_FORGERY_COOKIE, issue};
    use axum_extra::extract::cookie::CookieJar;

    #[test]
    fn issued_cookie_and_token_match() {
        let (jar, token) = issue(CookieJar::new());

        let cookie = jar.get(ANTI_FORGERY_COOKIE).unwrap();
        assert_eq!(cookie.value(), token);
        assert_eq!(token.len(), 32);
    }

    #[test]
    fn tokens_are_not_reused() {
        let (_, first) = issue(CookieJar::new());
        let (_, second) = issue(CookieJar::new());
        assert_ne!(first, second);
    }
}
