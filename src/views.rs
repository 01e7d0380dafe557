use maud::{html, Markup, DOCTYPE};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    models::Todo,
    session::SESSION_HEADER,
    state::{Status, UiState},
};

const TITLE: &str = "Structured Todo Console";

// the whole document, served once per session; every action after that swaps `#app`
pub fn page(state: &UiState, session: Uuid, api_base_url: &str) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (TITLE) }
                script src="https://unpkg.com/htmx.org@1.9.10" {}
                script src="https://cdn.tailwindcss.com" {}
            }
            body class="bg-gray-100 font-sans leading-normal tracking-normal" hx-headers=(session_headers(session)) {
                div class="container mx-auto p-8" {
                    h1 class="text-4xl text-center text-gray-700 mb-6" { (TITLE) }
                    (app(state))
                    footer class="mt-8 text-center text-sm text-gray-500" {
                        "API: " code { (api_base_url) }
                    }
                }
            }
        }
    }
}

fn session_headers(session: Uuid) -> String {
    let mut headers = Map::new();
    headers.insert(SESSION_HEADER.to_string(), Value::String(session.to_string()));
    Value::Object(headers).to_string()
}

/// The swappable part of the page. Requests from inside it are queued one
/// after another and their buttons disabled until the answer arrives.
pub fn app(state: &UiState) -> Markup {
    html! {
        div id="app" hx-target="#app" hx-swap="outerHTML" hx-sync="#app:queue all" {
            (direct_add_html(state))
            (free_text_html(state))
            (todo_list_html(state))
        }
    }
}

// in-flight labels, one per action, targeted through `hx-indicator`
const PENDING: [(&str, &str); 5] = [
    ("pending-fetch", "Loading..."),
    ("pending-submit", "Sending..."),
    ("pending-add", "Adding..."),
    ("pending-complete", "Completing..."),
    ("pending-save", "Saving..."),
];

// === Components ===
fn direct_add_html(state: &UiState) -> Markup {
    html! {
        section class="bg-white rounded-lg shadow-lg p-4 mb-6" {
            h2 class="text-xl text-gray-700 mb-2" { "Add directly" }
            form class="flex justify-between items-center gap-2" hx-post="/todos" hx-disabled-elt="find button" hx-indicator="#pending-add" {
                input class="flex-grow rounded border p-2" type="text" name="title" value=(state.title) placeholder="Task title" required;
                input class="rounded border p-2" type="text" name="due_date" value=(state.due) placeholder="Due (YYYY-MM-DD, optional)";
                button class="bg-blue-500 hover:bg-blue-700 text-white font-bold py-2 px-4 rounded" type="submit" { "Add" }
            }
        }
    }
}

fn free_text_html(state: &UiState) -> Markup {
    html! {
        section class="bg-white rounded-lg shadow-lg p-4 mb-6" {
            h2 class="text-xl text-gray-700 mb-2" { "Add in plain language" }
            form hx-post="/input" hx-disabled-elt="find button" hx-indicator="#pending-submit" {
                textarea class="w-full rounded border p-2" name="text" rows="3" placeholder="e.g. Add a task to finish the report by tomorrow" {
                    (state.text)
                }
                div class="flex justify-end mt-2" {
                    button class="bg-blue-500 hover:bg-blue-700 text-white font-bold py-2 px-4 rounded" type="submit" { "Send" }
                }
            }
            (status_html(&state.status))
        }
    }
}

fn status_html(status: &Status) -> Markup {
    let color = match status {
        Status::Failed(_) | Status::TitleRequired => "text-red-600",
        Status::Idle | Status::Echo(_) => "text-gray-600",
    };
    html! {
        div id="status" class={ "mt-2 text-sm break-all " (color) } { (status) }
        // htmx shows the one belonging to the request in flight
        div class="mt-1 text-sm text-blue-600" {
            @for (id, label) in PENDING {
                span id=(id) class="htmx-indicator" { (label) }
            }
        }
    }
}

fn todo_list_html(state: &UiState) -> Markup {
    html! {
        section class="bg-white rounded-lg shadow-lg p-4" {
            div class="flex justify-between items-center mb-2" {
                h2 class="text-xl text-gray-700" { "Todos" }
                button class="text-blue-500 hover:text-blue-700" hx-get="/todos" hx-disabled-elt="this" hx-indicator="#pending-fetch" aria-label="Refresh the list" { "Refresh" }
            }
            ul id="todos" class="list-none p-0" {
                @if state.todos.is_empty() {
                    li class="p-4 text-gray-500" { "No tasks" }
                }
                @for todo in &state.todos {
                    @match state.edit.editing(&todo.id) {
                        Some((title, due)) => { (todo_editor_html(todo, title, due)) }
                        None => { (todo_html(todo)) }
                    }
                }
            }
        }
    }
}

// a single line item in the todo list
fn todo_html(todo: &Todo) -> Markup {
    html! {
        li class={ "flex items-center bg-gray-50 rounded-lg my-2 py-2 px-4" @if todo.completed { " opacity-75" } } {
            div class="flex-grow" {
                span class={@if todo.completed { "line-through" } @else { "" }} { (todo.title) }
                @if let Some(due) = &todo.due_date {
                    " " span class="text-sm text-gray-500" { "(" (due) ")" }
                }
            }
            span class="text-xs text-gray-400 mr-2" { "#" (todo.id) }
            @if todo.completed {
                span class="text-xs rounded bg-green-100 text-green-700 px-2 mr-2" { "Done" }
            } @else {
                span class="text-xs rounded bg-yellow-100 text-yellow-700 px-2 mr-2" { "Pending" }
                button class="bg-green-500 hover:bg-green-700 text-white font-bold py-1 px-2 rounded mr-2"
                    hx-post={ "/todos/" (todo.id) "/complete" } hx-disabled-elt="this" hx-indicator="#pending-complete"
                    aria-label={ "Complete: " (todo.title) } title="Complete" { "✔" }
            }
            button class="bg-gray-200 hover:bg-gray-300 py-1 px-2 rounded" hx-get={ "/todos/" (todo.id) "/edit" } { "Edit" }
        }
    }
}

fn todo_editor_html(todo: &Todo, title: &str, due: &str) -> Markup {
    html! {
        li class="bg-gray-50 rounded-lg my-2 py-2 px-4" {
            form class="flex items-center gap-2" hx-put={ "/todos/" (todo.id) } hx-disabled-elt="find button" hx-indicator="#pending-save" {
                input class="flex-grow rounded border p-2" type="text" name="title" value=(title);
                input class="rounded border p-2" type="text" name="due_date" value=(due) placeholder="Due (YYYY-MM-DD, optional)";
                button class="bg-blue-500 hover:bg-blue-700 text-white font-bold py-1 px-2 rounded" type="submit" { "Save" }
                button class="bg-gray-200 hover:bg-gray-300 py-1 px-2 rounded" type="button" hx-delete="/edit" { "Cancel" }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::TodoId,
        state::{EditState, Failure},
    };

    fn todo(id: &str, title: &str, completed: bool) -> Todo {
        Todo {
            id: TodoId::new(id),
            title: title.to_string(),
            due_date: None,
            completed,
        }
    }

    #[test]
    fn test_empty_list_placeholder() {
        let html = app(&UiState::default()).into_string();
        assert!(html.contains("No tasks"));
    }

    #[test]
    fn test_rows_follow_list_order() {
        let state = UiState {
            todos: vec![todo("2", "second", false), todo("1", "first", false)],
            ..Default::default()
        };
        let html = app(&state).into_string();
        let second = html.find("second").unwrap();
        let first = html.find("first").unwrap();
        assert!(second < first);
        assert!(!html.contains("No tasks"));
    }

    #[test]
    fn test_completed_todo_has_no_complete_button() {
        let state = UiState {
            todos: vec![todo("1", "done", true), todo("2", "open", false)],
            ..Default::default()
        };
        let html = app(&state).into_string();
        assert!(!html.contains(r#"hx-post="/todos/1/complete""#));
        assert!(html.contains(r#"hx-post="/todos/2/complete""#));
        assert!(html.contains("line-through"));
    }

    #[test]
    fn test_due_date_shown() {
        let mut report = todo("3", "report", false);
        report.due_date = Some("2025-06-30".to_string());
        let state = UiState {
            todos: vec![report],
            ..Default::default()
        };
        assert!(app(&state).into_string().contains("(2025-06-30)"));
    }

    #[test]
    fn test_editor_replaces_row() {
        let state = UiState {
            todos: vec![todo("1", "a", false), todo("2", "b", false)],
            edit: EditState::Editing {
                id: TodoId::new("2"),
                title: "b (draft)".to_string(),
                due: String::new(),
            },
            ..Default::default()
        };
        let html = app(&state).into_string();
        assert!(html.contains(r#"hx-put="/todos/2""#));
        assert!(html.contains(r#"value="b (draft)""#));
        assert!(!html.contains(r#"hx-put="/todos/1""#));
        assert!(html.contains(r#"hx-get="/todos/1/edit""#));
    }

    #[test]
    fn test_status_and_inputs_rendered() {
        let state = UiState {
            status: Status::Failed(Failure::Add),
            title: "Buy milk".to_string(),
            text: "call <mom>".to_string(),
            ..Default::default()
        };
        let html = app(&state).into_string();
        assert!(html.contains("Failed to add todo"));
        assert!(html.contains("text-red-600"));
        assert!(html.contains(r#"value="Buy milk""#));
        assert!(html.contains("call &lt;mom&gt;"));
    }

    #[test]
    fn test_page_shows_backend_url() {
        let session = Uuid::new_v4();
        let html = page(&UiState::default(), session, "http://localhost:8000").into_string();
        assert!(html.contains("<code>http://localhost:8000</code>"));
        assert!(html.contains(&session.to_string()));
        assert!(html.contains(r#"id="app""#));
    }

    #[test]
    fn test_each_action_has_a_pending_label() {
        let state = UiState {
            todos: vec![todo("1", "open", false), todo("2", "editing", false)],
            edit: EditState::Editing {
                id: TodoId::new("2"),
                title: "editing".to_string(),
                due: String::new(),
            },
            ..Default::default()
        };
        let html = app(&state).into_string();
        for (id, label) in PENDING {
            assert!(html.contains(&format!(r##"hx-indicator="#{id}""##)));
            assert!(html.contains(&format!(
                r#"<span id="{id}" class="htmx-indicator">{label}</span>"#
            )));
        }
    }
}
