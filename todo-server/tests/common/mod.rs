//! In-memory stores for router tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use axum::body::{to_bytes, Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{SubsecRound, Utc};
use tower::ServiceExt;
use uuid::Uuid;

use todo_server::{DbError, NewTodo, Todo, TodoStore};

/// Store that keeps todos in a vec and counts calls
#[derive(Default)]
pub struct MemoryStore {
    todos: Mutex<Vec<Todo>>,
    calls: AtomicUsize,
}

impl MemoryStore {
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        Self {
            todos: Mutex::new(todos),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Todo>, DbError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut todos = self.todos.lock().unwrap().clone();
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(todos)
    }

    async fn get(&self, id: Uuid) -> Result<Todo, DbError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.todos
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| DbError::NotFound {
                resource: "todo",
                id: id.to_string(),
            })
    }

    async fn insert(&self, new: NewTodo) -> Result<Todo, DbError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let todo = Todo {
            id: Uuid::new_v4(),
            created_at: Utc::now().trunc_subsecs(6),
            is_done: new.is_done,
            message: new.message.into_string(),
        };
        self.todos.lock().unwrap().push(todo.clone());
        Ok(todo)
    }
}

/// Store whose every call fails with an execution error
#[derive(Default)]
pub struct FailingStore {
    calls: AtomicUsize,
}

impl FailingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> Result<T, DbError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(DbError::execution("could not execute query", sqlx::Error::PoolTimedOut))
    }
}

#[async_trait]
impl TodoStore for FailingStore {
    async fn list(&self) -> Result<Vec<Todo>, DbError> {
        self.fail()
    }

    async fn get(&self, _id: Uuid) -> Result<Todo, DbError> {
        self.fail()
    }

    async fn insert(&self, _new: NewTodo) -> Result<Todo, DbError> {
        self.fail()
    }
}

/// Forward store calls through an `Arc` so tests can inspect call counts.
pub struct Shared<S>(pub std::sync::Arc<S>);

#[async_trait]
impl<S: TodoStore> TodoStore for Shared<S> {
    async fn list(&self) -> Result<Vec<Todo>, DbError> {
        self.0.list().await
    }

    async fn get(&self, id: Uuid) -> Result<Todo, DbError> {
        self.0.get(id).await
    }

    async fn insert(&self, new: NewTodo) -> Result<Todo, DbError> {
        self.0.insert(new).await
    }
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Bytes) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(body.into())
        .unwrap()
}
