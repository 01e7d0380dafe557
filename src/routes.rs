use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, State},
    http::request::Parts,
    routing::{delete, get, post, put},
    Form, Router,
};
use maud::Markup;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::TodoId,
    session::{Sessions, SESSION_HEADER},
    state::Console,
    views,
};

// === App State ===
#[derive(Clone)]
pub struct AppState {
    sessions: Arc<Sessions>,
    api_base_url: Arc<str>,
}
impl AppState {
    pub fn new(sessions: Sessions, api_base_url: &str) -> Self {
        Self {
            sessions: Arc::new(sessions),
            api_base_url: api_base_url.into(),
        }
    }
}

/// The console of the page that sent the request.
pub struct PageConsole(Arc<Console>);

#[async_trait]
impl FromRequestParts<AppState> for PageConsole {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok())
            .and_then(|id| state.sessions.get(&id))
            .map(PageConsole)
            .ok_or(AppError::SessionExpired)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/todos", get(todos).post(create_todo))
        .route("/input", post(submit_input))
        .route("/todos/:id", put(save_todo))
        .route("/todos/:id/complete", post(complete_todo))
        .route("/todos/:id/edit", get(start_edit))
        .route("/edit", delete(cancel_edit))
        .with_state(state)
}

// === Routes ===
// full page; every load is a new session and fetches the list once
async fn root(State(state): State<AppState>) -> Markup {
    let (session, console) = state.sessions.open();
    let ui = console.refresh().await;
    views::page(&ui, session, &state.api_base_url)
}

async fn todos(PageConsole(console): PageConsole) -> Markup {
    views::app(&console.refresh().await)
}

#[derive(Deserialize)]
struct FreeText {
    #[serde(default)]
    text: String,
}
async fn submit_input(
    PageConsole(console): PageConsole,
    Form(FreeText { text }): Form<FreeText>,
) -> Markup {
    views::app(&console.submit_text(text).await)
}

#[derive(Deserialize)]
struct TodoForm {
    #[serde(default)]
    title: String,
    #[serde(default)]
    due_date: String,
}
async fn create_todo(
    PageConsole(console): PageConsole,
    Form(TodoForm { title, due_date }): Form<TodoForm>,
) -> Markup {
    views::app(&console.add_direct(title, due_date).await)
}

async fn complete_todo(PageConsole(console): PageConsole, Path(id): Path<String>) -> Markup {
    views::app(&console.mark_complete(TodoId::new(id)).await)
}

async fn start_edit(
    PageConsole(console): PageConsole,
    Path(id): Path<String>,
) -> Result<Markup, AppError> {
    let ui = console.start_edit(TodoId::new(id)).await?;
    Ok(views::app(&ui))
}

async fn cancel_edit(PageConsole(console): PageConsole) -> Markup {
    views::app(&console.cancel_edit().await)
}

async fn save_todo(
    PageConsole(console): PageConsole,
    Path(id): Path<String>,
    Form(TodoForm { title, due_date }): Form<TodoForm>,
) -> Markup {
    views::app(&console.save_edit(TodoId::new(id), title, due_date).await)
}
