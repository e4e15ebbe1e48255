//! Login, logout and page access.

use catalog_client::{ApiError, Session};
use catalog_core::CatalogError;
use tracing::{info, warn};

use crate::api::CatalogApi;
use crate::model::{User, ADMIN_ROLE_ID};

/// Role ids allowed on the algorithms page.
pub const ALGORITHMS_ALLOWED_ROLES: &[u64] = &[ADMIN_ROLE_ID];

/// Roles allowed to edit or delete products.
pub const EDIT_ALLOWED_ROLES: &[u64] = &[ADMIN_ROLE_ID];

/// Exchange credentials for a token and initialise `session` with it.
pub async fn login(
    api: &dyn CatalogApi,
    session: &Session,
    email: &str,
    password: &str,
) -> Result<User, CatalogError> {
    match api.login(email, password).await {
        Ok(resp) => {
            session.init(resp.token);
            info!(user = resp.user.id, "logged in");
            Ok(resp.user)
        }
        Err(e) if is_rejection(&e) => {
            warn!("login rejected: {}", e);
            Err(CatalogError::Validation("invalid email or password".into()))
        }
        Err(e) => Err(e.into_load_error()),
    }
}

fn is_rejection(e: &ApiError) -> bool {
    matches!(e, ApiError::Auth(_) | ApiError::Server { status: 400..=499, .. })
}

/// Tear the session down. Returns whether a credential was present.
pub fn logout(session: &Session) -> bool {
    session.teardown()
}

/// Resolve the current identity and require one of `allowed` role ids.
///
/// - no credential, or credential rejected → `AuthExpired` (session torn down)
/// - identity lacks every allowed role → `Forbidden`
pub async fn authorize(
    api: &dyn CatalogApi,
    session: &Session,
    allowed: &[u64],
) -> Result<User, CatalogError> {
    if !session.is_active() {
        return Err(CatalogError::AuthExpired("not logged in".into()));
    }
    let user = match api.me(session).await {
        Ok(user) => user,
        Err(e) => {
            let err = e.into_load_error();
            if err.is_auth_expired() {
                session.teardown();
            }
            return Err(err);
        }
    };
    if !user.has_any_role(allowed) {
        return Err(CatalogError::Forbidden(format!(
            "user {} lacks a required role",
            user.id
        )));
    }
    Ok(user)
}
