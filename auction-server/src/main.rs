use {
    crate::{
        per_metrics::{
            is_metrics,
            MetricsLayer,
        },
        server::start_server,
    },
    anyhow::Result,
    clap::Parser,
    std::io::IsTerminal,
    tracing_subscriber::{
        filter::{
            self,
            LevelFilter,
        },
        layer::SubscriberExt,
        EnvFilter,
        Layer,
        Registry,
    },
};

mod api;
mod auction;
mod config;
mod kernel;
mod models;
mod per_metrics;
mod server;
mod state;
mod subject;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize a Tracing Subscriber
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_file(false)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_ansi(std::io::stderr().is_terminal());
    let env_filter = || {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .from_env_lossy()
    };
    let registry = Registry::default().with(
        MetricsLayer.with_filter(filter::filter_fn(|metadata| is_metrics(metadata, true))),
    );

    // Use the compact formatter if we're in a terminal, otherwise use the JSON formatter.
    if std::io::stderr().is_terminal() {
        tracing::subscriber::set_global_default(
            registry.with(fmt_layer.compact().with_filter(env_filter())),
        )?;
    } else {
        tracing::subscriber::set_global_default(
            registry.with(fmt_layer.json().with_filter(env_filter())),
        )?;
    }

    // Parse the command line arguments with clap, will exit automatically on `--help` or
    // with invalid arguments.
    match config::Options::parse() {
        config::Options::Run(opts) => start_server(opts).await,
    }
}
