use {
    super::Repository,
    crate::auction::entities,
};

impl Repository {
    pub async fn get_or_create_in_memory_session_lock(
        &self,
        session_id: entities::SessionId,
    ) -> entities::SessionLock {
        self.in_memory_store
            .session_lock
            .lock()
            .await
            .entry(session_id)
            .or_default()
            .clone()
    }
}
