use std::{process, sync::Arc};

use postweave::{
    application::error::AppError,
    application::{
        extract::ExtractionService, pipeline::GenerationService, regenerate::RegenerationService,
    },
    cache::{Clock, DraftCacheConfig, DraftStore, SystemClock},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        generation::HttpGenerationBackend,
        http::{self, HttpState},
        output::OutputWriter,
        telemetry,
        uploads::UploadStorage,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
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
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect(&settings).await?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;
    info!("migrations applied");
    Ok(())
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect(&settings).await?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;
    let repos = PostgresRepositories::new(pool);

    let state = build_state(repos, &settings)?;
    serve_http(&settings, state).await
}

async fn connect(settings: &config::Settings) -> Result<sqlx::PgPool, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))
}

fn build_state(
    repos: PostgresRepositories,
    settings: &config::Settings,
) -> Result<HttpState, AppError> {
    let drafts = Arc::new(DraftStore::new(
        &DraftCacheConfig {
            ttl_seconds: settings.drafts.ttl_seconds.get(),
        },
        Arc::new(SystemClock) as Arc<dyn Clock>,
    ));

    let uploads = Arc::new(
        UploadStorage::new(settings.uploads.directory.clone())
            .map_err(|err| AppError::from(InfraError::Io(err)))?,
    );
    let output = OutputWriter::new(settings.outputs.directory.clone())
        .map_err(|err| AppError::from(InfraError::Io(err)))?;

    let backend = Arc::new(
        HttpGenerationBackend::new(
            settings.generation.endpoint.clone(),
            settings.generation.timeout,
        )
        .map_err(|err| AppError::unexpected(err.to_string()))?,
    );

    let generation = Arc::new(GenerationService::new(
        backend.clone(),
        Arc::new(repos.clone()),
        output,
    ));
    let extraction = Arc::new(ExtractionService::new(backend.clone(), drafts.clone()));
    let regeneration = Arc::new(RegenerationService::new(backend, drafts.clone()));

    Ok(HttpState {
        drafts,
        uploads,
        generation,
        extraction,
        regeneration,
        repos,
    })
}

async fn serve_http(settings: &config::Settings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state, settings.uploads.max_request_bytes.get());

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(addr = %settings.server.addr, "listening");

    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}
