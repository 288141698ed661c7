//! Access checks used by HTTP handlers.
//!
//! Keep the HTTP modules focused on request/response mapping by concentrating
//! identity resolution and role checks here. The signed-in user is reloaded
//! on every request so a deleted account or changed role applies immediately.

use crate::domain::{Error, ErrorCode, Requester, Role, User};

use super::ApiResult;
use super::session::SessionContext;
use super::state::HttpState;

/// Load the signed-in user, or `401` when there is none.
///
/// A session pointing at a user that no longer exists is cleared.
pub async fn current_user(state: &HttpState, session: &SessionContext) -> ApiResult<User> {
    let id = session.require_user_id()?;
    match state.accounts.get(id).await {
        Ok(user) => Ok(user),
        Err(error) if error.code() == ErrorCode::NotFound => {
            session.clear();
            Err(Error::unauthorized("login required"))
        }
        Err(error) => Err(error),
    }
}

pub async fn require_requester(
    state: &HttpState,
    session: &SessionContext,
) -> ApiResult<Requester> {
    let user = current_user(state, session).await?;
    Ok(Requester::new(user.id(), user.role()))
}

pub async fn require_role(
    state: &HttpState,
    session: &SessionContext,
    role: Role,
) -> ApiResult<Requester> {
    let requester = require_requester(state, session).await?;
    if requester.role() == role {
        Ok(requester)
    } else {
        Err(Error::forbidden(format!(
            "{} role required for this operation",
            role.as_str()
        )))
    }
}

pub async fn require_admin(state: &HttpState, session: &SessionContext) -> ApiResult<Requester> {
    require_role(state, session, Role::Admin).await
}

pub async fn require_student(
    state: &HttpState,
    session: &SessionContext,
) -> ApiResult<Requester> {
    require_role(state, session, Role::Student).await
}
