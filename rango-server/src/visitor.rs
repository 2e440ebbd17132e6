/// Request-scoped visitor state
///
/// [`CurrentVisitor`] reads the `sessionid` cookie, records the visit in the
/// session store and hands the handler a typed [`VisitorState`]. New visitors
/// (or ones presenting a malformed id) are issued a fresh session cookie,
/// which the handler returns through [`CurrentVisitor::jar`].

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use rango_core::VisitorState;
use std::convert::Infallible;
use tracing::debug;
use uuid::Uuid;

use crate::metrics::ACTIVE_SESSIONS;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "sessionid";

pub struct CurrentVisitor {
    pub state: VisitorState,
    /// Cookies to send back; carries the session cookie for new visitors
    pub jar: CookieJar,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentVisitor {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let existing = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
            .map(|id| id.to_string());

        let (session_id, jar) = match existing {
            Some(id) => (id, jar),
            None => {
                let id = Uuid::new_v4().to_string();
                debug!("Issuing new session {}", id);
                let cookie = Cookie::build((SESSION_COOKIE, id.clone()))
                    .path("/")
                    .http_only(true)
                    .same_site(SameSite::Lax);
                (id, jar.add(cookie))
            }
        };

        let visitor_state = state.sessions.visit(&session_id, Utc::now());
        ACTIVE_SESSIONS.set(state.sessions.count() as i64);

        Ok(CurrentVisitor {
            state: visitor_state,
            jar,
        })
    }
}
