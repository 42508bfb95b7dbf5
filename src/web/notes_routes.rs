// Notes pages. Everything except the landing page needs a signed-in user,
// and per-note pages only ever show the requester's own notes.

use super::error::WebError;
use super::pages::{redirect, FormContext, Page};
use super::session::Viewer;
use super::state::AppState;
use super::urls;
use crate::core::notes::{NoteError, NoteForm};
use axum::extract::rejection::FormRejection;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Router};

const NOTE_FORM: &str = "note";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(urls::NOTES_HOME, get(home))
        .route(urls::NOTES_LIST, get(list))
        .route(urls::NOTES_ADD, get(add_page).post(add))
        .route(urls::NOTES_SUCCESS, get(success))
        .route(urls::NOTE_DETAIL, get(detail))
        .route(urls::NOTE_EDIT, get(edit_page).post(edit))
        .route(urls::NOTE_DELETE, get(delete_page).post(delete).delete(delete))
}

pub async fn home(viewer: Viewer) -> Page {
    Page::new("notes/home.html").with_user(viewer.user.as_ref())
}

pub async fn list(State(state): State<AppState>, viewer: Viewer) -> Result<Page, WebError> {
    let user = viewer.require_user()?;
    let notes = state.notes.list_for(user).await?;
    Ok(Page::new("notes/list.html")
        .with_user(Some(user))
        .with("object_list", notes))
}

pub async fn add_page(viewer: Viewer) -> Result<Page, WebError> {
    let user = viewer.require_user()?;
    Ok(Page::new("notes/form.html")
        .with_user(Some(user))
        .with("form", FormContext::blank(NOTE_FORM, NoteForm::default())))
}

pub async fn add(
    State(state): State<AppState>,
    viewer: Viewer,
    form: Result<Form<NoteForm>, FormRejection>,
) -> Result<Response, WebError> {
    let user = viewer.require_user()?;
    let Form(form) = form?;
    match state.notes.create(user, &form).await {
        Ok(_) => Ok(redirect(urls::NOTES_SUCCESS)),
        Err(NoteError::Invalid(errors)) => Ok(Page::new("notes/form.html")
            .with_user(Some(user))
            .with("form", FormContext::invalid(NOTE_FORM, form, errors))
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

pub async fn success(viewer: Viewer) -> Result<Page, WebError> {
    let user = viewer.require_user()?;
    Ok(Page::new("notes/success.html").with_user(Some(user)))
}

pub async fn detail(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(slug): Path<String>,
) -> Result<Page, WebError> {
    let user = viewer.require_user()?;
    let note = state.notes.owned_note(&slug, user).await?;
    Ok(Page::new("notes/detail.html")
        .with_user(Some(user))
        .with("edit_url", urls::note_edit(&note.slug))
        .with("delete_url", urls::note_delete(&note.slug))
        .with("note", note))
}

pub async fn edit_page(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(slug): Path<String>,
) -> Result<Page, WebError> {
    let user = viewer.require_user()?;
    let note = state.notes.owned_note(&slug, user).await?;
    let form = NoteForm::from(&note);
    Ok(Page::new("notes/form.html")
        .with_user(Some(user))
        .with("note", &note)
        .with("form", FormContext::blank(NOTE_FORM, form)))
}

pub async fn edit(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(slug): Path<String>,
    form: Result<Form<NoteForm>, FormRejection>,
) -> Result<Response, WebError> {
    let user = viewer.require_user()?;
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => {
            state.notes.owned_note(&slug, user).await?;
            return Err(rejection.into());
        }
    };
    match state.notes.edit(&slug, user, &form).await {
        Ok(_) => Ok(redirect(urls::NOTES_SUCCESS)),
        Err(NoteError::Invalid(errors)) => {
            let note = state.notes.owned_note(&slug, user).await?;
            Ok(Page::new("notes/form.html")
                .with_user(Some(user))
                .with("note", &note)
                .with("form", FormContext::invalid(NOTE_FORM, form, errors))
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn delete_page(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(slug): Path<String>,
) -> Result<Page, WebError> {
    let user = viewer.require_user()?;
    let note = state.notes.owned_note(&slug, user).await?;
    Ok(Page::new("notes/delete.html")
        .with_user(Some(user))
        .with("cancel_url", urls::note_detail(&note.slug))
        .with("note", note))
}

pub async fn delete(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(slug): Path<String>,
) -> Result<Response, WebError> {
    let user = viewer.require_user()?;
    state.notes.delete(&slug, user).await?;
    Ok(redirect(urls::NOTES_SUCCESS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::accounts::User;
    use crate::core::notes::slugs::{slug_from_title, WARNING};
    use crate::core::notes::Note;
    use crate::web::test_support::*;
    use axum::http::StatusCode;

    const TITLE: &str = "Заголовок";
    const TEXT: &str = "Текст заметки";
    const SLUG: &str = "unique_slug";

    struct Fixture {
        state: AppState,
        author: User,
        reader: User,
        note: Note,
    }

    async fn fixture() -> Fixture {
        let state = state();
        let author = register(&state, "Автор").await;
        let reader = register(&state, "Читатель").await;
        let note = state
            .notes
            .create(&author, &form(TITLE, Some(SLUG)).0)
            .await
            .unwrap();
        Fixture {
            state,
            author,
            reader,
            note,
        }
    }

    fn body(title: &str, slug: Option<&str>) -> Result<Form<NoteForm>, FormRejection> {
        Ok(form(title, slug))
    }

    fn form(title: &str, slug: Option<&str>) -> Form<NoteForm> {
        Form(NoteForm {
            title: title.to_string(),
            text: TEXT.to_string(),
            slug: slug.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn test_home_is_public() {
        let response = respond(home(anonymous("/notes/")).await);
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_anonymous_redirects_to_login_with_next() {
        let f = fixture().await;
        let slug = || Path(SLUG.to_string());

        let cases = [
            (
                urls::NOTES_LIST.to_string(),
                respond(list(State(f.state.clone()), anonymous(urls::NOTES_LIST)).await),
            ),
            (
                urls::NOTES_ADD.to_string(),
                respond(add_page(anonymous(urls::NOTES_ADD)).await),
            ),
            (
                urls::NOTES_SUCCESS.to_string(),
                respond(success(anonymous(urls::NOTES_SUCCESS)).await),
            ),
            (
                urls::note_detail(SLUG),
                respond(
                    detail(State(f.state.clone()), anonymous(&urls::note_detail(SLUG)), slug())
                        .await,
                ),
            ),
            (
                urls::note_edit(SLUG),
                respond(
                    edit_page(State(f.state.clone()), anonymous(&urls::note_edit(SLUG)), slug())
                        .await,
                ),
            ),
            (
                urls::note_delete(SLUG),
                respond(
                    delete_page(State(f.state.clone()), anonymous(&urls::note_delete(SLUG)), slug())
                        .await,
                ),
            ),
        ];

        for (path, response) in cases {
            assert_eq!(response.status(), StatusCode::FOUND, "{path}");
            assert_eq!(location(&response), urls::login_with_next(&path));
        }
    }

    #[tokio::test]
    async fn test_signed_in_pages_are_available() {
        let f = fixture().await;

        let responses = [
            respond(list(State(f.state.clone()), signed_in(&f.reader, urls::NOTES_LIST)).await),
            respond(add_page(signed_in(&f.reader, urls::NOTES_ADD)).await),
            respond(success(signed_in(&f.reader, urls::NOTES_SUCCESS)).await),
        ];

        for response in responses {
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_only_author_sees_note_pages() {
        let f = fixture().await;
        let slug = || Path(SLUG.to_string());

        for (user, expected) in [(&f.author, StatusCode::OK), (&f.reader, StatusCode::NOT_FOUND)] {
            let responses = [
                respond(detail(State(f.state.clone()), signed_in(user, "/"), slug()).await),
                respond(edit_page(State(f.state.clone()), signed_in(user, "/"), slug()).await),
                respond(delete_page(State(f.state.clone()), signed_in(user, "/"), slug()).await),
            ];
            for response in responses {
                assert_eq!(response.status(), expected);
            }
        }
    }

    #[tokio::test]
    async fn test_list_shows_only_own_notes() {
        let f = fixture().await;
        f.state
            .notes
            .create(&f.reader, &form("Чужая", Some("other")).0)
            .await
            .unwrap();

        let body = body_json(respond(
            list(State(f.state.clone()), signed_in(&f.author, urls::NOTES_LIST)).await,
        ))
        .await;

        let notes = body["context"]["object_list"].as_array().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0]["slug"], SLUG);
    }

    #[tokio::test]
    async fn test_user_can_create_note() {
        let state = state();
        let author = register(&state, "Автор").await;

        let response = respond(
            add(
                State(state.clone()),
                signed_in(&author, urls::NOTES_ADD),
                body("Новый заголовок", Some("new-slug")),
            )
            .await,
        );

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), urls::NOTES_SUCCESS);
        let note = state.notes.owned_note("new-slug", &author).await.unwrap();
        assert_eq!(note.title, "Новый заголовок");
        assert_eq!(note.text, TEXT);
        assert_eq!(note.author_id, author.id);
    }

    #[tokio::test]
    async fn test_empty_slug_is_derived_from_title() {
        let state = state();
        let author = register(&state, "Автор").await;

        let response = respond(
            add(State(state.clone()), signed_in(&author, urls::NOTES_ADD), body(TITLE, None)).await,
        );

        assert_eq!(response.status(), StatusCode::FOUND);
        let expected = slug_from_title(TITLE);
        let note = state.notes.owned_note(&expected, &author).await.unwrap();
        assert_eq!(note.slug, "zagolovok");
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_rejected() {
        let f = fixture().await;

        let response = respond(
            add(
                State(f.state.clone()),
                signed_in(&f.reader, urls::NOTES_ADD),
                body("Другой заголовок", Some(SLUG)),
            )
            .await,
        );

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(
            body["context"]["form"]["errors"]["slug"][0],
            format!("{SLUG}{WARNING}")
        );
        assert_eq!(f.state.notes.note_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_anonymous_cannot_create_note() {
        let state = state();

        let response = respond(
            add(State(state.clone()), anonymous(urls::NOTES_ADD), body(TITLE, Some(SLUG))).await,
        );

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), urls::login_with_next(urls::NOTES_ADD));
        assert_eq!(state.notes.note_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_author_can_edit_note() {
        let f = fixture().await;
        let path = urls::note_edit(SLUG);

        let response = respond(
            edit(
                State(f.state.clone()),
                signed_in(&f.author, &path),
                Path(SLUG.to_string()),
                body("Новый заголовок", Some("new-slug")),
            )
            .await,
        );

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), urls::NOTES_SUCCESS);
        let note = f.state.notes.owned_note("new-slug", &f.author).await.unwrap();
        assert_eq!(note.id, f.note.id);
        assert_eq!(note.title, "Новый заголовок");
    }

    #[tokio::test]
    async fn test_edit_keeping_own_slug_is_valid() {
        let f = fixture().await;

        let response = respond(
            edit(
                State(f.state.clone()),
                signed_in(&f.author, "/"),
                Path(SLUG.to_string()),
                body("Другой заголовок", Some(SLUG)),
            )
            .await,
        );

        assert_eq!(response.status(), StatusCode::FOUND);
    }

    #[tokio::test]
    async fn test_invalid_edit_renders_errors() {
        let f = fixture().await;

        let response = respond(
            edit(
                State(f.state.clone()),
                signed_in(&f.author, "/"),
                Path(SLUG.to_string()),
                body("", Some(SLUG)),
            )
            .await,
        );

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["template"], "notes/form.html");
        assert!(!body["context"]["form"]["errors"]["title"]
            .as_array()
            .unwrap()
            .is_empty());
        assert_eq!(body["context"]["note"]["title"], TITLE);
    }

    #[tokio::test]
    async fn test_reader_cannot_edit_or_delete_note() {
        let f = fixture().await;

        let edited = respond(
            edit(
                State(f.state.clone()),
                signed_in(&f.reader, "/"),
                Path(SLUG.to_string()),
                body("Взлом", Some("hacked")),
            )
            .await,
        );
        let deleted = respond(
            delete(State(f.state.clone()), signed_in(&f.reader, "/"), Path(SLUG.to_string())).await,
        );

        assert_eq!(edited.status(), StatusCode::NOT_FOUND);
        assert_eq!(deleted.status(), StatusCode::NOT_FOUND);
        let note = f.state.notes.owned_note(SLUG, &f.author).await.unwrap();
        assert_eq!(note, f.note);
    }

    #[tokio::test]
    async fn test_author_can_delete_note() {
        let f = fixture().await;

        let response = respond(
            delete(State(f.state.clone()), signed_in(&f.author, "/"), Path(SLUG.to_string())).await,
        );

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), urls::NOTES_SUCCESS);
        assert_eq!(f.state.notes.note_count().await.unwrap(), 0);
    }
}
