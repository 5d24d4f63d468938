use {
    super::entities,
    std::collections::HashMap,
    tokio::sync::Mutex,
};

mod add_session;
mod get_listed_sessions;
mod get_ongoing_session_for_subject;
mod get_or_create_in_memory_session_lock;
mod get_or_create_in_memory_subject_lock;
mod get_session;
mod in_memory_database;
mod models;
mod remove_in_memory_session_lock;
mod remove_in_memory_subject_lock;
mod update_session;

pub use {
    in_memory_database::InMemoryDatabase,
    models::*,
};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    pub session_lock: Mutex<HashMap<entities::SessionId, entities::SessionLock>>,
    pub subject_lock: Mutex<HashMap<entities::SubjectRef, entities::SubjectLock>>,
}

#[derive(Debug)]
pub struct Repository {
    pub in_memory_store: InMemoryStore,
    pub db:              Box<dyn Database>,
}

impl Repository {
    pub fn new(db: impl Database) -> Self {
        Self {
            in_memory_store: InMemoryStore::default(),
            db:              Box::new(db),
        }
    }
}
