use std::{fmt, sync::Arc};

use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    error::{ConsoleError, RepositoryError, RepositoryResult},
    models::{Todo, TodoDraft, TodoId},
    repository::TodoRepository,
};

/// Which operation a failure message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Fetch,
    Submit,
    Add,
    Save,
    Action,
}
impl Failure {
    pub fn message(self) -> &'static str {
        match self {
            Failure::Fetch => "Failed to fetch todos",
            Failure::Submit => "Failed to submit",
            Failure::Add => "Failed to add todo",
            Failure::Save => "Failed to save todo",
            Failure::Action => "Action failed",
        }
    }
}

/// The single status line under the free-text box.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    /// Backend answer to the last successful call, stringified as-is.
    Echo(String),
    Failed(Failure),
    TitleRequired,
}
impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => Ok(()),
            Status::Echo(answer) => f.write_str(answer),
            Status::Failed(failure) => f.write_str(failure.message()),
            Status::TitleRequired => f.write_str("Please enter a title"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditState {
    #[default]
    NotEditing,
    Editing {
        id: TodoId,
        title: String,
        due: String,
    },
}
impl EditState {
    /// Title and due date being edited, if `id` is the todo in edit mode.
    pub fn editing(&self, id: &TodoId) -> Option<(&str, &str)> {
        match self {
            EditState::Editing {
                id: editing,
                title,
                due,
            } if editing == id => Some((title, due)),
            _ => None,
        }
    }
}

/// Everything the page shows. Only the `Console` transitions it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    pub todos: Vec<Todo>,
    pub status: Status,
    /// Free-text box.
    pub text: String,
    /// Direct-add title input.
    pub title: String,
    /// Direct-add due date input.
    pub due: String,
    pub edit: EditState,
}
impl UiState {
    fn echo(&mut self, answer: &Value) {
        self.status = Status::Echo(answer.to_string());
    }

    fn fail(&mut self, failure: Failure, err: &RepositoryError) {
        tracing::warn!(error = %err, ?failure, "backend call failed");
        self.status = Status::Failed(failure);
    }
}

/// Owns one page's UI state and runs every user action against the backend.
///
/// Each mutating action follows the same contract: call the backend, echo
/// its answer, then reload the whole list exactly once. Nothing is merged
/// locally, so ids and completion flags always come from the backend.
///
/// Backend round trips are ordered by `actions`, held for a whole
/// call-then-reload sequence, so overlapping actions run in arrival order and
/// a slow earlier reload never overwrites a later one. `state` is only locked
/// to read inputs and apply results, never across a backend call.
pub struct Console {
    repository: Arc<dyn TodoRepository>,
    state: Mutex<UiState>,
    actions: Mutex<()>,
}

impl Console {
    pub fn new(repository: Arc<dyn TodoRepository>) -> Self {
        Self {
            repository,
            state: Mutex::new(UiState::default()),
            actions: Mutex::new(()),
        }
    }

    pub async fn refresh(&self) -> UiState {
        let _action = self.actions.lock().await;
        self.resync().await
    }

    pub async fn submit_text(&self, text: String) -> UiState {
        let _action = self.actions.lock().await;
        {
            let mut state = self.state.lock().await;
            state.text = text.clone();
            if text.trim().is_empty() {
                return state.clone();
            }
        }

        tracing::info!(%text, "submitting free text");
        let result = self.repository.submit_text(&text).await;
        self.finish(result, Failure::Submit, |state| state.text.clear())
            .await
    }

    pub async fn add_direct(&self, title: String, due: String) -> UiState {
        let _action = self.actions.lock().await;
        {
            let mut state = self.state.lock().await;
            state.title = title.clone();
            state.due = due.clone();
            if title.trim().is_empty() {
                return state.clone();
            }
        }

        let draft = TodoDraft::new(title, due.trim());
        tracing::info!(title = %draft.title, due_date = ?draft.due_date, "adding todo");
        let result = self.repository.create(&draft).await;
        self.finish(result, Failure::Add, |state| {
            state.title.clear();
            state.due.clear();
        })
        .await
    }

    /// Completes through the dedicated endpoint, never through free text.
    pub async fn mark_complete(&self, id: TodoId) -> UiState {
        let _action = self.actions.lock().await;
        tracing::info!(%id, "completing todo");
        let result = self.repository.complete(&id).await;
        self.finish(result, Failure::Action, |_| {}).await
    }

    /// Opens the editor for `id`, seeded from the todo as currently shown.
    pub async fn start_edit(&self, id: TodoId) -> Result<UiState, ConsoleError> {
        let mut state = self.state.lock().await;
        let edit = match state.todos.iter().find(|todo| todo.id == id) {
            Some(todo) => EditState::Editing {
                id: id.clone(),
                title: todo.title.clone(),
                due: todo.due_date.clone().unwrap_or_default(),
            },
            None => return Err(ConsoleError::UnknownTodo(id)),
        };
        state.edit = edit;
        Ok(state.clone())
    }

    pub async fn cancel_edit(&self) -> UiState {
        let mut state = self.state.lock().await;
        state.edit = EditState::NotEditing;
        state.clone()
    }

    pub async fn save_edit(&self, id: TodoId, title: String, due: String) -> UiState {
        let _action = self.actions.lock().await;
        {
            let mut state = self.state.lock().await;
            state.edit = EditState::Editing {
                id: id.clone(),
                title: title.clone(),
                due: due.clone(),
            };
            if title.trim().is_empty() {
                state.status = Status::TitleRequired;
                return state.clone();
            }
        }

        let draft = TodoDraft::new(title, due.trim());
        tracing::info!(%id, title = %draft.title, due_date = ?draft.due_date, "saving todo");
        let result = self.repository.update(&id, &draft).await;
        self.finish(result, Failure::Save, |state| {
            state.edit = EditState::NotEditing;
        })
        .await
    }

    // Applies a mutation's answer; on success also reloads the list.
    async fn finish(
        &self,
        result: RepositoryResult<Value>,
        failure: Failure,
        on_success: impl FnOnce(&mut UiState),
    ) -> UiState {
        {
            let mut state = self.state.lock().await;
            match result {
                Ok(answer) => {
                    state.echo(&answer);
                    on_success(&mut *state);
                }
                Err(err) => {
                    state.fail(failure, &err);
                    return state.clone();
                }
            }
        }
        self.resync().await
    }

    async fn resync(&self) -> UiState {
        let result = self.repository.list().await;
        let mut state = self.state.lock().await;
        match result {
            Ok(todos) => {
                tracing::debug!(count = todos.len(), "todo list reloaded");
                state.todos = todos;
            }
            Err(err) => state.fail(Failure::Fetch, &err),
        }
        state.clone()
    }
}
