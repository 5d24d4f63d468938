use {
    super::repository::{
        Database,
        Repository,
    },
    crate::subject,
    std::sync::Arc,
    time::UtcOffset,
};

pub mod create_session;
pub mod get_active_session_for_subject;
pub mod get_session;
pub mod list_active_sessions;
pub mod revise_bid;
pub mod stop_session;
pub mod submit_bid;
pub mod update_session;
pub mod verification;

pub struct Config {
    /// Offset in which a harvesting month ends.
    pub utc_offset:          UtcOffset,
    /// Conditional write attempts before a mutation gives up.
    pub max_update_attempts: usize,
}

pub struct ServiceInner {
    config:          Config,
    repo:            Arc<Repository>,
    subject_service: subject::service::Service,
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
    pub fn new(
        db: impl Database,
        config: Config,
        subject_service: subject::service::Service,
    ) -> Self {
        Self(Arc::new(ServiceInner {
            config,
            repo: Arc::new(Repository::new(db)),
            subject_service,
        }))
    }
}

#[cfg(test)]
pub mod tests {
    use {
        super::{
            create_session::CreateSessionInput,
            Config,
            Service,
        },
        crate::{
            auction::{
                entities,
                repository::Database,
            },
            subject::{
                self,
                repository::InMemorySubjectStore,
            },
        },
        time::{
            OffsetDateTime,
            UtcOffset,
        },
    };

    pub const FARMER_ID: &str = "farmer-1";
    pub const LOT: &str = "lot-1";

    pub fn lot(subject_ref: &str) -> subject::entities::Subject {
        subject::entities::Subject {
            subject_ref: subject_ref.to_string(),
            crop_type:   "Wheat".to_string(),
            district:    "Nashik".to_string(),
            village:     Some("Pimpalgaon".to_string()),
            area_acres:  Some(4.5),
            owner_id:    FARMER_ID.to_string(),
        }
    }

    /// A harvesting month that is still ahead of the current time.
    pub fn future_period() -> String {
        format!("{}-06", OffsetDateTime::now_utc().year() + 1)
    }

    pub fn bidder(name: &str) -> entities::Bidder {
        entities::Bidder::new(name, &format!("{}@example.com", name.to_lowercase()))
    }

    impl Service {
        pub fn new_with_mocks(db: impl Database) -> Self {
            Self::new_with_mocks_and_attempts(db, 5)
        }

        pub fn new_with_mocks_and_attempts(db: impl Database, max_update_attempts: usize) -> Self {
            Service::new(
                db,
                Config {
                    utc_offset: UtcOffset::from_hms(5, 30, 0).unwrap(),
                    max_update_attempts,
                },
                subject::service::Service::new(InMemorySubjectStore::new([
                    lot(LOT),
                    lot("lot-2"),
                    lot("lot-3"),
                ])),
            )
        }

        pub async fn create_test_session(&self, subject_ref: &str, minimum_bid: u64) -> entities::SessionId {
            self.create_session(CreateSessionInput {
                subject_ref:    subject_ref.to_string(),
                minimum_bid,
                harvest_period: future_period(),
            })
            .await
            .unwrap()
            .id
        }
    }
}
