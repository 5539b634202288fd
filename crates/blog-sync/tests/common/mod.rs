#![allow(dead_code)]

use auth_engine::testing::ScriptedTransport;
use auth_engine::SessionManager;
use client_storage::{MemoryStorage, Session, SessionStore};
use serde_json::{json, Value};
use std::sync::Arc;

pub struct Harness {
    pub store: Arc<SessionStore>,
    pub transport: Arc<ScriptedTransport>,
    pub session: SessionManager,
}

/// Session restored with `access` and refresh credential `refresh-1`.
pub fn signed_in(access: &str) -> Harness {
    let store = Arc::new(SessionStore::new(Box::new(MemoryStorage::new())));
    store
        .set(&Session::new(access, "refresh-1"))
        .expect("seed session");
    let transport = Arc::new(ScriptedTransport::new());
    let session = SessionManager::new(store.clone(), transport.clone()).expect("session manager");
    Harness {
        store,
        transport,
        session,
    }
}

pub fn post(id: i64, title: &str, content: &str) -> Value {
    json!({"id": id, "title": title, "content": content, "user_id": 1})
}

pub fn comment(id: i64, post_id: i64, content: &str) -> Value {
    json!({
        "id": id,
        "post_id": post_id,
        "content": content,
        "author_name": "ana",
        "created_at": "2024-03-01T09:30:00"
    })
}
