use {
    super::Repository,
    crate::auction::entities,
    std::sync::Arc,
};

impl Repository {
    pub async fn remove_in_memory_session_lock(&self, session_id: &entities::SessionId) {
        let mut mutex_guard = self.in_memory_store.session_lock.lock().await;
        if let Some(session_lock) = mutex_guard.get(session_id) {
            // Only the map itself holds the lock, so no task is waiting on it.
            if Arc::strong_count(session_lock) == 1 {
                mutex_guard.remove(session_id);
            }
        }
    }
}
