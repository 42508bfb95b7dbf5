// News pages: home, detail with comments, comment edit and delete.

use super::error::WebError;
use super::pages::{redirect, FormContext, Page};
use super::session::Viewer;
use super::state::AppState;
use super::urls;
use crate::core::news::{CommentForm, CommentId, NewsDetail, NewsError, NewsId};
use axum::extract::rejection::{FormRejection, PathRejection};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Router};

const COMMENT_FORM: &str = "comment";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(urls::NEWS_HOME, get(home))
        .route(urls::NEWS_DETAIL, get(detail).post(add_comment))
        .route(urls::COMMENT_EDIT, get(edit_comment_page).post(edit_comment))
        .route(
            urls::COMMENT_DELETE,
            get(delete_comment_page)
                .post(delete_comment)
                .delete(delete_comment),
        )
}

pub async fn home(State(state): State<AppState>, viewer: Viewer) -> Result<Page, WebError> {
    let news = state.news.home_page().await?;
    Ok(Page::new("news/home.html")
        .with_user(viewer.user.as_ref())
        .with("object_list", news))
}

/// Only signed-in visitors get a comment form.
pub async fn detail(
    State(state): State<AppState>,
    viewer: Viewer,
    news_id: Result<Path<NewsId>, PathRejection>,
) -> Result<Page, WebError> {
    let Path(news_id) = news_id?;
    let detail = state.news.detail(news_id).await?;
    let form = viewer
        .user
        .is_some()
        .then(|| FormContext::blank(COMMENT_FORM, CommentForm::default()));
    Ok(detail_page(&viewer, &detail, form))
}

fn detail_page(
    viewer: &Viewer,
    detail: &NewsDetail,
    form: Option<FormContext<CommentForm>>,
) -> Page {
    let page = Page::new("news/detail.html")
        .with_user(viewer.user.as_ref())
        .with("news", detail);
    match form {
        Some(form) => page.with("form", form),
        None => page,
    }
}

pub async fn add_comment(
    State(state): State<AppState>,
    viewer: Viewer,
    news_id: Result<Path<NewsId>, PathRejection>,
    form: Result<Form<CommentForm>, FormRejection>,
) -> Result<Response, WebError> {
    let Path(news_id) = news_id?;
    let user = viewer.require_user()?;
    let Form(form) = form?;
    match state.news.add_comment(news_id, user, &form).await {
        Ok(_) => Ok(redirect(&urls::news_comments(news_id))),
        Err(NewsError::Invalid(errors)) => {
            let detail = state.news.detail(news_id).await?;
            let form = FormContext::invalid(COMMENT_FORM, form, errors);
            Ok(detail_page(&viewer, &detail, Some(form)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn edit_comment_page(
    State(state): State<AppState>,
    viewer: Viewer,
    comment_id: Result<Path<CommentId>, PathRejection>,
) -> Result<Page, WebError> {
    let Path(comment_id) = comment_id?;
    let user = viewer.require_user()?;
    let comment = state.news.owned_comment(comment_id, user).await?;
    let form = CommentForm {
        text: comment.text.clone(),
    };
    Ok(Page::new("news/edit.html")
        .with_user(Some(user))
        .with("delete_url", urls::comment_delete(comment.id))
        .with("comment", &comment)
        .with("form", FormContext::blank(COMMENT_FORM, form)))
}

pub async fn edit_comment(
    State(state): State<AppState>,
    viewer: Viewer,
    comment_id: Result<Path<CommentId>, PathRejection>,
    form: Result<Form<CommentForm>, FormRejection>,
) -> Result<Response, WebError> {
    let Path(comment_id) = comment_id?;
    let user = viewer.require_user()?;
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => {
            state.news.owned_comment(comment_id, user).await?;
            return Err(rejection.into());
        }
    };
    match state.news.edit_comment(comment_id, user, &form).await {
        Ok(comment) => Ok(redirect(&urls::news_comments(comment.news_id))),
        Err(NewsError::Invalid(errors)) => {
            let comment = state.news.owned_comment(comment_id, user).await?;
            Ok(Page::new("news/edit.html")
                .with_user(Some(user))
                .with("comment", &comment)
                .with("form", FormContext::invalid(COMMENT_FORM, form, errors))
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn delete_comment_page(
    State(state): State<AppState>,
    viewer: Viewer,
    comment_id: Result<Path<CommentId>, PathRejection>,
) -> Result<Page, WebError> {
    let Path(comment_id) = comment_id?;
    let user = viewer.require_user()?;
    let comment = state.news.owned_comment(comment_id, user).await?;
    Ok(Page::new("news/delete.html")
        .with_user(Some(user))
        .with("edit_url", urls::comment_edit(comment.id))
        .with("cancel_url", urls::news_comments(comment.news_id))
        .with("comment", comment))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    viewer: Viewer,
    comment_id: Result<Path<CommentId>, PathRejection>,
) -> Result<Response, WebError> {
    let Path(comment_id) = comment_id?;
    let user = viewer.require_user()?;
    let deleted = state.news.delete_comment(comment_id, user).await?;
    Ok(redirect(&urls::news_comments(deleted.news_id)))
}
