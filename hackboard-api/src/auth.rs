use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, SET_COOKIE},
        request::Parts,
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use hackboard_domain::{admin::AdminId, app::AppState, session::FlashCategory, user::UserId};

pub const SESSION_COOKIE: &str = "hb_session";

/// Token of the live session, placed into request extensions by
/// [`session_middleware`].
#[derive(Clone)]
pub struct SessionHandle(pub String);

fn session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|part| {
        let (name, value) = part.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// Attaches a server-side session to every request, creating one (and
/// setting the cookie on the response) when the client has none.
pub async fn session_middleware(
    State(app): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let existing = session_token_from_headers(req.headers())
        .filter(|token| app.session_service.get(token).is_some());
    let (token, fresh) = match existing {
        Some(token) => (token, false),
        None => (app.session_service.create(), true),
    };
    req.extensions_mut().insert(SessionHandle(token.clone()));

    let mut res = next.run(req).await;
    if fresh
        && let Ok(value) = HeaderValue::from_str(&format!(
            "{}={}; Path=/; HttpOnly",
            SESSION_COOKIE, token
        ))
    {
        res.headers_mut().append(SET_COOKIE, value);
    }
    res
}

/// Rejection for gated routes: bounce to the matching login page instead of
/// answering with a bare error status.
pub struct LoginRedirect(&'static str);

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        Redirect::to(self.0).into_response()
    }
}

fn reject(app: &AppState, parts: &Parts, message: &str, to: &'static str) -> LoginRedirect {
    if let Some(handle) = parts.extensions.get::<SessionHandle>() {
        app.session_service
            .push_flash(&handle.0, FlashCategory::Warning, message);
    }
    LoginRedirect(to)
}

/// The session's bound user, required on user-gated routes.
pub struct AuthUser(pub UserId);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = LoginRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        app: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(handle) = parts.extensions.get::<SessionHandle>()
            && let Some(session) = app.session_service.get(&handle.0)
            && let Some(user_id) = session.user_id
        {
            return Ok(AuthUser(user_id));
        }
        Err(reject(app, parts, "Please log in to continue.", "/login"))
    }
}

/// The session's bound admin, required on admin-gated routes.
pub struct AuthAdmin(pub AdminId);

impl FromRequestParts<AppState> for AuthAdmin {
    type Rejection = LoginRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        app: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(handle) = parts.extensions.get::<SessionHandle>()
            && let Some(session) = app.session_service.get(&handle.0)
            && let Some(admin_id) = session.admin_id
        {
            return Ok(AuthAdmin(admin_id));
        }
        Err(reject(app, parts, "Admin login required.", "/admin/login"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; hb_session=abc-123; lang=en"),
        );
        assert_eq!(
            session_token_from_headers(&headers),
            Some("abc-123".to_string())
        );

        headers.insert(COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(session_token_from_headers(&headers), None);
    }
}
