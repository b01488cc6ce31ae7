use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use uuid::Uuid;

use crate::{error::ApiError, state::ApiState};

/// Who is making the request
///
/// With a JWT secret configured every request must carry a valid
/// `Authorization: Bearer` token, otherwise extraction fails with `401`.
/// Without one the caller is [`Caller::Unverified`].
///
/// # Example
/// ```
/// use axum::extract::Path;
/// use rdl_api::{auth::Caller, error::ApiError};
/// use uuid::Uuid;
///
/// async fn own_profile(caller: Caller, Path(user_id): Path<Uuid>) -> Result<(), ApiError> {
///     caller.authorize(user_id)?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    /// Token checks are disabled
    Unverified,
    /// The user a valid token was issued to
    User(Uuid),
}

impl Caller {
    /// Allow the request to act on `user_id`.
    pub fn authorize(&self, user_id: Uuid) -> Result<(), ApiError> {
        match self {
            Self::Unverified => Ok(()),
            Self::User(id) if *id == user_id => Ok(()),
            Self::User(_) => Err(ApiError::Forbidden(
                "Token does not belong to this user".to_string(),
            )),
        }
    }
}

impl FromRequestParts<ApiState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState,
    ) -> Result<Self, Self::Rejection> {
        let Some(verifier) = &state.auth else {
            return Ok(Self::Unverified);
        };

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|rejection| {
                    if rejection.is_missing() {
                        ApiError::Auth("Not authenticated".to_string())
                    } else {
                        ApiError::Auth("Malformed authorization header".to_string())
                    }
                })?;

        let user_id = verifier.verify_user(bearer.token())?;

        Ok(Self::User(user_id))
    }
}
