use {
    super::Repository,
    crate::auction::entities,
    std::sync::Arc,
};

impl Repository {
    pub async fn remove_in_memory_subject_lock(&self, subject_ref: &entities::SubjectRef) {
        let mut mutex_guard = self.in_memory_store.subject_lock.lock().await;
        if let Some(subject_lock) = mutex_guard.get(subject_ref) {
            if Arc::strong_count(subject_lock) == 1 {
                mutex_guard.remove(subject_ref);
            }
        }
    }
}
