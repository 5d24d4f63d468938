use {
    crate::{
        api,
        auction::{
            self,
            repository::InMemoryDatabase,
        },
        config::{
            Config,
            RunOptions,
        },
        per_metrics::{
            setup_metrics_recorder,
            start_metrics,
        },
        state::{
            ServerState,
            Store,
        },
        subject::{
            self,
            repository::InMemorySubjectStore,
        },
    },
    anyhow::anyhow,
    futures::future::join_all,
    sqlx::postgres::PgPoolOptions,
    std::{
        future::Future,
        sync::{
            atomic::{
                AtomicBool,
                Ordering,
            },
            Arc,
        },
        time::Duration,
    },
};

async fn build_store(
    run_options: &RunOptions,
    config: &Config,
    service_config: auction::service::Config,
) -> anyhow::Result<Store> {
    match &run_options.server.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(run_options.server.database_max_connections)
                .connect(database_url)
                .await
                .map_err(|err| anyhow!("Failed to connect to database: {:?}", err))?;
            sqlx::migrate!()
                .run(&pool)
                .await
                .map_err(|err| anyhow!("Failed to run migrations: {:?}", err))?;

            let subject_service = subject::service::Service::new(pool.clone());
            Ok(Store {
                auction_service: auction::service::Service::new(
                    pool,
                    service_config,
                    subject_service.clone(),
                ),
                subject_service,
            })
        }
        None => {
            tracing::warn!(
                subjects = config.subjects.len(),
                "No database configured, sessions are kept in memory and lost on restart"
            );
            let subject_service = subject::service::Service::new(InMemorySubjectStore::new(
                config.subjects.iter().cloned().map(Into::into),
            ));
            Ok(Store {
                auction_service: auction::service::Service::new(
                    InMemoryDatabase::new(),
                    service_config,
                    subject_service.clone(),
                ),
                subject_service,
            })
        }
    }
}

/// Stops the other tasks as soon as one of them fails.
async fn exit_on_error(
    name: &'static str,
    task: impl Future<Output = anyhow::Result<()>>,
) -> anyhow::Result<()> {
    let result = task.await;
    if let Err(err) = &result {
        tracing::error!(task = name, error = ?err, "Task failed, shutting down");
        SHOULD_EXIT.store(true, Ordering::Release);
    }
    result
}

pub async fn start_server(run_options: RunOptions) -> anyhow::Result<()> {
    tokio::spawn(async move {
        tracing::info!("Registered shutdown signal handler...");
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = ?err, "Failed to listen for shutdown signal");
        }
        tracing::info!("Shut down signal received, waiting for tasks...");
        SHOULD_EXIT.store(true, Ordering::Release);
    });

    let config = Config::load(&run_options.config.config).map_err(|err| {
        anyhow!(
            "Failed to load config from file({path}): {:?}",
            err,
            path = run_options.config.config
        )
    })?;
    let service_config = auction::service::Config {
        utc_offset:          config.bidding.utc_offset()?,
        max_update_attempts: config.bidding.max_update_attempts,
    };
    tracing::info!(
        utc_offset = %service_config.utc_offset,
        max_update_attempts = service_config.max_update_attempts,
        "Loaded bidding config"
    );

    let metrics_recorder = setup_metrics_recorder()?;
    let store = Arc::new(build_store(&run_options, &config, service_config).await?);
    let server_state = Arc::new(ServerState { metrics_recorder });

    let results = join_all(vec![
        tokio::spawn(exit_on_error(
            "api",
            api::start_api(run_options.clone(), store),
        )),
        tokio::spawn(exit_on_error(
            "metrics",
            start_metrics(run_options, server_state),
        )),
    ])
    .await;
    for result in results {
        result??;
    }
    Ok(())
}

// A static exit flag to indicate to running threads that we're shutting down. This is used to
// gracefully shutdown the application.
pub(crate) static SHOULD_EXIT: AtomicBool = AtomicBool::new(false);
pub const EXIT_CHECK_INTERVAL: Duration = Duration::from_secs(1);
