use std::{process, sync::Arc, time::Duration};

use site_counts::{
    application::{
        error::AppError,
        repos::ContentRepo,
        site_counts::{BlockAttributes, ContentSaved, SiteCountsBlock, SiteCountsQueries},
    },
    cache::{CacheBackend, CacheConfig, CountsCache, MemoryTransientStore, TransientStore},
    config,
    infra::{
        db::{PgTransientStore, PostgresRepositories},
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
    presentation::views::{SiteCountsTemplate, render_fragment},
};
use tokio::sync::Notify;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Rebuild(_) => run_rebuild(settings).await,
        config::Command::Render(args) => run_render(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let block = build_block(repositories.clone(), &settings).await;

    let state = HttpState {
        block,
        db: repositories,
    };
    serve_http(&settings, state).await
}

async fn run_rebuild(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let block = build_block(repositories, &settings).await;

    block.on_content_saved(&ContentSaved::default()).await?;
    info!(
        backend = settings.cache.backend.as_str(),
        "Site counts transients rebuilt"
    );
    Ok(())
}

async fn run_render(
    settings: config::Settings,
    args: config::RenderArgs,
) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let block = build_block(repositories, &settings).await;

    let attributes = BlockAttributes {
        class_name: args.class_name,
    };
    let view = block.view(args.post_id, &attributes).await?;
    let html = render_fragment(SiteCountsTemplate { view })
        .map_err(|err| AppError::unexpected(err.to_string()))?;

    println!("{html}");
    Ok(())
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let url = settings.database.url.as_deref().ok_or_else(|| {
        AppError::from(InfraError::configuration(
            "database.url must be set (SITE_COUNTS__DATABASE__URL or --database-url)",
        ))
    })?;

    let pool = PostgresRepositories::connect(url, settings.database.max_connections.get())
        .await
        .map_err(InfraError::from)?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(InfraError::from)?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

async fn build_block(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> Arc<SiteCountsBlock> {
    let cache_config = CacheConfig::from(&settings.cache);
    let content: Arc<dyn ContentRepo> = repositories.clone();
    let queries = SiteCountsQueries::new(content);

    let store: Arc<dyn TransientStore> = match cache_config.backend {
        CacheBackend::Memory => Arc::new(MemoryTransientStore::new()),
        CacheBackend::Database => {
            let store = PgTransientStore::new(repositories.as_ref().clone());
            if let Err(err) = store.purge_expired().await {
                warn!(error = %err, "Failed to purge expired transients");
            }
            Arc::new(store)
        }
    };

    info!(
        enabled = cache_config.enabled,
        backend = cache_config.backend.as_str(),
        ttl_seconds = cache_config.ttl_seconds,
        "Site counts cache configured"
    );

    let cache = CountsCache::new(store, queries, &cache_config);
    Arc::new(SiteCountsBlock::new(Arc::new(cache)))
}

async fn serve_http(settings: &config::Settings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(addr = %settings.server.addr, "Listening");

    let shutdown = Arc::new(Notify::new());
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()));
    let grace = settings.server.graceful_shutdown;

    tokio::select! {
        result = server => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
        }
        _ = drain_deadline(shutdown, grace) => {
            warn!(
                grace_seconds = grace.as_secs(),
                "Graceful shutdown timed out; dropping open connections"
            );
        }
    }

    Ok(())
}

async fn shutdown_signal(shutdown: Arc<Notify>) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received; draining connections");
    shutdown.notify_one();
}

async fn drain_deadline(shutdown: Arc<Notify>, grace: Duration) {
    shutdown.notified().await;
    tokio::time::sleep(grace).await;
}
