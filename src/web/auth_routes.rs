// Signup, login and logout.

use super::error::WebError;
use super::pages::{redirect, FormContext, Page};
use super::session::{expired_session_cookie, session_cookie, Viewer};
use super::state::AppState;
use super::urls;
use crate::core::accounts::{AccountError, LoginForm, SignupForm};
use axum::extract::{Query, State};
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;

const LOGIN_FORM: &str = "login";
const SIGNUP_FORM: &str = "signup";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(urls::SIGNUP, get(signup_page).post(signup))
        .route(urls::LOGIN, get(login_page).post(login))
        .route(urls::LOGOUT, get(logout).post(logout))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NextQuery {
    pub next: Option<String>,
}

pub async fn signup_page(viewer: Viewer) -> Page {
    Page::new("registration/signup.html")
        .with_user(viewer.user.as_ref())
        .with("form", FormContext::blank(SIGNUP_FORM, SignupForm::default()))
}

pub async fn signup(
    State(state): State<AppState>,
    viewer: Viewer,
    Form(form): Form<SignupForm>,
) -> Result<Response, WebError> {
    match state.accounts.signup(&form).await {
        Ok(_) => Ok(redirect(urls::LOGIN)),
        Err(AccountError::Invalid(errors)) => Ok(Page::new("registration/signup.html")
            .with_user(viewer.user.as_ref())
            .with("form", FormContext::invalid(SIGNUP_FORM, form, errors))
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

pub async fn login_page(viewer: Viewer, Query(query): Query<NextQuery>) -> Page {
    let form = LoginForm {
        next: query.next.clone(),
        ..LoginForm::default()
    };
    Page::new("registration/login.html")
        .with_user(viewer.user.as_ref())
        .with("next", query.next)
        .with("form", FormContext::blank(LOGIN_FORM, form))
}

/// On success the session cookie is set and the user is sent to `next`
/// (when it is a local path) or the configured landing page.
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> Result<Response, WebError> {
    let (_, token) = match state.accounts.login(&form).await {
        Ok(signed_in) => signed_in,
        Err(AccountError::Invalid(errors)) => {
            let next = form.next.clone().or(query.next);
            return Ok(Page::new("registration/login.html")
                .with_user(None)
                .with("next", next)
                .with("form", FormContext::invalid(LOGIN_FORM, form, errors))
                .into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let target = form
        .next
        .or(query.next)
        .filter(|next| urls::is_safe_next(next))
        .unwrap_or_else(|| state.login_redirect_url.to_string());

    let mut response = redirect(&target);
    let cookie = HeaderValue::from_str(&session_cookie(&token))
        .map_err(|e| WebError::Internal(e.to_string()))?;
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(response)
}

pub async fn logout(State(state): State<AppState>, viewer: Viewer) -> Result<Response, WebError> {
    if let Some(token) = &viewer.session {
        state.accounts.logout(token).await?;
    }

    let mut response = Page::new("registration/logged_out.html")
        .with_user(None)
        .into_response();
    let cookie = HeaderValue::from_str(&expired_session_cookie())
        .map_err(|e| WebError::Internal(e.to_string()))?;
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::accounts::accounts_service::{INVALID_LOGIN, USERNAME_TAKEN};
    use crate::core::forms::NON_FIELD_ERRORS;
    use crate::web::test_support::*;
    use axum::http::StatusCode;

    const PASSWORD: &str = "s3cret-pass";

    fn login_form(username: &str, password: &str, next: Option<&str>) -> Form<LoginForm> {
        Form(LoginForm {
            username: username.to_string(),
            password: password.to_string(),
            next: next.map(str::to_string),
        })
    }

    fn no_query() -> Query<NextQuery> {
        Query(NextQuery::default())
    }

    #[tokio::test]
    async fn test_auth_pages_are_public() {
        let state = state();

        let responses = [
            respond(signup_page(anonymous(urls::SIGNUP)).await),
            respond(login_page(anonymous(urls::LOGIN), no_query()).await),
            respond(logout(State(state), anonymous(urls::LOGOUT)).await),
        ];

        for response in responses {
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_login_page_carries_next() {
        let query = Query(NextQuery {
            next: Some("/notes/add/".to_string()),
        });

        let body = body_json(respond(login_page(anonymous(urls::LOGIN), query).await)).await;

        assert_eq!(body["context"]["next"], "/notes/add/");
        assert_eq!(body["context"]["form"]["data"]["next"], "/notes/add/");
    }

    #[tokio::test]
    async fn test_signup_then_login_sets_session() {
        let state = state();
        let form = SignupForm {
            username: "Автор".to_string(),
            password1: PASSWORD.to_string(),
            password2: PASSWORD.to_string(),
        };

        let response = respond(signup(State(state.clone()), anonymous(urls::SIGNUP), Form(form)).await);
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), urls::LOGIN);

        let response = respond(
            login(
                State(state.clone()),
                no_query(),
                login_form("Автор", PASSWORD, Some("/notes/list/")),
            )
            .await,
        );

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/notes/list/");
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        let token = cookie
            .strip_prefix("sessionid=")
            .and_then(|rest| rest.split(';').next())
            .unwrap();
        let user = state.accounts.current_user(token).await.unwrap().unwrap();
        assert_eq!(user.username, "Автор");
    }

    #[tokio::test]
    async fn test_login_ignores_foreign_next() {
        let state = state();
        register(&state, "Автор").await;

        let response = respond(
            login(
                State(state.clone()),
                Query(NextQuery {
                    next: Some("//evil.example/".to_string()),
                }),
                login_form("Автор", PASSWORD, None),
            )
            .await,
        );

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), urls::NEWS_HOME);
    }

    #[tokio::test]
    async fn test_wrong_password_rerenders_form() {
        let state = state();
        register(&state, "Автор").await;

        let response = respond(
            login(State(state), no_query(), login_form("Автор", "wrong", None)).await,
        );

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        let body = body_json(response).await;
        assert_eq!(
            body["context"]["form"]["errors"][NON_FIELD_ERRORS][0],
            INVALID_LOGIN
        );
        assert!(body["context"]["form"]["data"].get("password").is_none());
    }

    #[tokio::test]
    async fn test_duplicate_signup_rerenders_form() {
        let state = state();
        register(&state, "Автор").await;
        let form = SignupForm {
            username: "Автор".to_string(),
            password1: PASSWORD.to_string(),
            password2: PASSWORD.to_string(),
        };

        let response = respond(signup(State(state), anonymous(urls::SIGNUP), Form(form)).await);

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["context"]["form"]["errors"]["username"][0], USERNAME_TAKEN);
    }

    #[tokio::test]
    async fn test_logout_closes_session() {
        let state = state();
        let user = register(&state, "Автор").await;
        let token = state.accounts.open_session(user.id).await.unwrap();
        let viewer = Viewer {
            user: Some(user),
            path: urls::LOGOUT.to_string(),
            session: Some(token.clone()),
        };

        let response = respond(logout(State(state.clone()), viewer).await);

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::SET_COOKIE]
            .to_str()
            .unwrap()
            .contains("Max-Age=0"));
        assert!(state.accounts.current_user(&token).await.unwrap().is_none());
    }
}
