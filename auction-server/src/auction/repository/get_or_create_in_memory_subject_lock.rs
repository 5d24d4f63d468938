use {
    super::Repository,
    crate::auction::entities,
};

impl Repository {
    pub async fn get_or_create_in_memory_subject_lock(
        &self,
        subject_ref: &entities::SubjectRef,
    ) -> entities::SubjectLock {
        self.in_memory_store
            .subject_lock
            .lock()
            .await
            .entry(subject_ref.clone())
            .or_default()
            .clone()
    }
}
