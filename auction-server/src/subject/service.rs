use {
    super::{
        entities,
        repository::SubjectStore,
    },
    std::sync::Arc,
};

pub struct ServiceInner {
    store: Box<dyn SubjectStore>,
}

#[derive(Clone)]
pub struct Service(Arc<ServiceInner>);
impl std::ops::Deref for Service {
    type Target = ServiceInner;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Service {
    pub fn new(store: impl SubjectStore) -> Self {
        Self(Arc::new(ServiceInner {
            store: Box::new(store),
        }))
    }

    /// Resolves the lot behind a session. Lookup failures degrade to an unresolved summary.
    #[tracing::instrument(skip_all, fields(subject_ref = %subject_ref))]
    pub async fn get_subject_summary(
        &self,
        subject_ref: &entities::SubjectRef,
    ) -> entities::SubjectSummary {
        match self.store.get_subject(subject_ref).await {
            Ok(Some(subject)) => subject.into(),
            Ok(None) => {
                tracing::warn!("Subject was not found");
                entities::SubjectSummary::unresolved(subject_ref.clone())
            }
            Err(e) => {
                tracing::warn!(error = e.to_string(), "Failed to look up subject");
                entities::SubjectSummary::unresolved(subject_ref.clone())
            }
        }
    }
}
