//! Current user extraction

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;

/// Header naming the user a request acts for
pub const USER_HEADER: &str = "x-user";

/// User a request acts for
///
/// Taken from the `x-user` header, or the configured default user when the
/// header is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = match header_user(&parts.headers)? {
            Some(user) => user,
            None => {
                debug!(user = %state.default_user, "No user header, using default user");
                state.default_user.clone()
            }
        };

        Ok(CurrentUser(user))
    }
}

/// Reads the user header, treating a blank value as absent
pub fn header_user(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(value) = headers.get(USER_HEADER) else {
        return Ok(None);
    };

    let user = value
        .to_str()
        .map_err(|_| ApiError::bad_request("Invalid x-user header encoding").with_param(USER_HEADER))?
        .trim();

    Ok((!user.is_empty()).then(|| user.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_user() {
        let mut headers = HeaderMap::new();
        assert_eq!(header_user(&headers).unwrap(), None);

        headers.insert(USER_HEADER, "  alice ".parse().unwrap());
        assert_eq!(header_user(&headers).unwrap(), Some("alice".to_string()));

        headers.insert(USER_HEADER, "   ".parse().unwrap());
        assert_eq!(header_user(&headers).unwrap(), None);
    }

    #[test]
    fn test_invalid_header_encoding() {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_HEADER,
            axum::http::HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap(),
        );

        let err = header_user(&headers).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }
}
