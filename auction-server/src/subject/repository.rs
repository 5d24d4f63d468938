#[cfg(test)]
use mockall::automock;
use {
    super::entities,
    crate::kernel::db::DB,
    axum::async_trait,
    sqlx::FromRow,
    std::{
        collections::HashMap,
        fmt::Debug,
    },
    tracing::instrument,
};

#[derive(Clone, FromRow, Debug)]
pub struct CropLot {
    pub id:         String,
    pub crop_type:  String,
    pub district:   String,
    pub village:    Option<String>,
    pub area_acres: Option<f64>,
    pub owner_id:   String,
}

impl From<CropLot> for entities::Subject {
    fn from(lot: CropLot) -> Self {
        Self {
            subject_ref: lot.id,
            crop_type:   lot.crop_type,
            district:    lot.district,
            village:     lot.village,
            area_acres:  lot.area_acres,
            owner_id:    lot.owner_id,
        }
    }
}

/// Read-only lookup of crop lots owned by the listing side of the system.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SubjectStore: Debug + Send + Sync + 'static {
    async fn get_subject(
        &self,
        subject_ref: &entities::SubjectRef,
    ) -> anyhow::Result<Option<entities::Subject>>;
}

#[async_trait]
impl SubjectStore for DB {
    #[instrument(
        target = "metrics",
        name = "db_get_subject",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_subject",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_subject(
        &self,
        subject_ref: &entities::SubjectRef,
    ) -> anyhow::Result<Option<entities::Subject>> {
        let lot: Option<CropLot> = sqlx::query_as(
            "SELECT id, crop_type, district, village, area_acres, owner_id FROM crop_lot WHERE id = $1",
        )
        .bind(subject_ref)
        .fetch_optional(self)
        .await
        .inspect_err(|_| {
            tracing::Span::current().record("result", "error");
        })?;
        Ok(lot.map(Into::into))
    }
}

/// Subject store seeded from configuration, used when no database is configured.
#[derive(Debug, Default, Clone)]
pub struct InMemorySubjectStore {
    subjects: HashMap<entities::SubjectRef, entities::Subject>,
}

impl InMemorySubjectStore {
    pub fn new(subjects: impl IntoIterator<Item = entities::Subject>) -> Self {
        Self {
            subjects: subjects
                .into_iter()
                .map(|subject| (subject.subject_ref.clone(), subject))
                .collect(),
        }
    }
}

#[async_trait]
impl SubjectStore for InMemorySubjectStore {
    async fn get_subject(
        &self,
        subject_ref: &entities::SubjectRef,
    ) -> anyhow::Result<Option<entities::Subject>> {
        Ok(self.subjects.get(subject_ref).cloned())
    }
}
