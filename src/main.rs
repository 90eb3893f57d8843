use std::process;
use std::sync::Arc;

use apalis::layers::WorkerBuilderExt;
use apalis::prelude::{Monitor, WorkerBuilder, WorkerFactoryFn};
use apalis_sql::{Config as ApalisSqlConfig, postgres::PostgresStorage};
use mensa::{
    application::{
        dishes::DishService,
        error::AppError,
        export::{ExportService, write_export_file},
        jobs::{JobWorkerContext, process_export_job},
        menus::MenuService,
        repos::{
            DishesRepo, DishesWriteRepo, HierarchyRepo, JobsRepo, MenusRepo, MenusWriteRepo,
            SubmenusRepo, SubmenusWriteRepo,
        },
        seed::SeedService,
        submenus::SubmenuService,
    },
    cache::{CacheConfig, ResponseCache},
    config,
    domain::types::JobType,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState},
        telemetry,
    },
};
use tracing::{Dispatch, Level, debug, dispatcher, error, info};
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
        config::Command::ExportHierarchy(args) => run_export(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let (api_state, cache) = build_application_context(repositories.clone(), &settings);

    let sweep_handle = spawn_cache_sweeper(cache);
    let monitor_handle = spawn_job_monitor(repositories, &settings);

    let result = serve_http(&settings, api_state).await;

    monitor_handle.abort();
    let _ = monitor_handle.await;
    sweep_handle.abort();
    let _ = sweep_handle.await;

    result
}

async fn run_export(
    settings: config::Settings,
    args: config::ExportArgs,
) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let path = args.file;

    info!(
        target = "mensa::export",
        path = %path.display(),
        "Starting export"
    );

    write_export_file(repositories.as_ref() as &dyn HierarchyRepo, &path)
        .await
        .map_err(|err| AppError::unexpected(err.to_string()))?;

    info!(target = "mensa::export", "Export completed");
    Ok(())
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool =
        PostgresRepositories::connect(database_url, settings.database.max_connections.get())
            .await
            .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresStorage::setup(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_application_context(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> (ApiState, Arc<ResponseCache>) {
    let menus_repo: Arc<dyn MenusRepo> = repositories.clone();
    let menus_write_repo: Arc<dyn MenusWriteRepo> = repositories.clone();
    let submenus_repo: Arc<dyn SubmenusRepo> = repositories.clone();
    let submenus_write_repo: Arc<dyn SubmenusWriteRepo> = repositories.clone();
    let dishes_repo: Arc<dyn DishesRepo> = repositories.clone();
    let dishes_write_repo: Arc<dyn DishesWriteRepo> = repositories.clone();
    let jobs_repo: Arc<dyn JobsRepo> = repositories.clone();

    let cache = Arc::new(ResponseCache::new(CacheConfig::from(&settings.cache)));

    let menu_service = Arc::new(MenuService::new(
        menus_repo.clone(),
        menus_write_repo.clone(),
        cache.clone(),
    ));
    let submenu_service = Arc::new(SubmenuService::new(
        submenus_repo.clone(),
        submenus_write_repo.clone(),
        menus_repo.clone(),
        cache.clone(),
    ));
    let dish_service = Arc::new(DishService::new(
        dishes_repo.clone(),
        dishes_write_repo.clone(),
        submenus_repo.clone(),
        cache.clone(),
    ));
    let seed_service = Arc::new(SeedService::new(
        menus_write_repo,
        submenus_write_repo,
        dishes_write_repo,
        cache.clone(),
    ));
    let export_service = Arc::new(ExportService::new(
        jobs_repo,
        settings.media.directory.clone(),
    ));

    let api_state = ApiState {
        menus: menu_service,
        submenus: submenu_service,
        dishes: dish_service,
        seed: seed_service,
        export: export_service,
        db: repositories,
    };

    (api_state, cache)
}

fn spawn_cache_sweeper(cache: Arc<ResponseCache>) -> tokio::task::JoinHandle<()> {
    let interval = cache.config().sweep_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(interval);
        interval.tick().await; // Skip the first immediate tick
        loop {
            interval.tick().await;
            let removed = cache.purge_expired();
            if removed > 0 {
                debug!(target = "mensa::cache", removed, "swept expired cache entries");
            }
        }
    })
}

fn spawn_job_monitor(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> tokio::task::JoinHandle<()> {
    let export_storage = PostgresStorage::new_with_config(
        repositories.pool().clone(),
        ApalisSqlConfig::new(JobType::ExportHierarchy.as_str()),
    );

    let context = JobWorkerContext {
        repositories,
        media_dir: settings.media.directory.clone(),
    };

    let export_worker = WorkerBuilder::new("export-hierarchy-worker")
        .concurrency(settings.jobs.export_concurrency.get() as usize)
        .data(context)
        .backend(export_storage)
        .build_fn(process_export_job);

    let monitor = Monitor::new().register(export_worker);

    tokio::spawn(async move {
        if let Err(err) = monitor.run().await {
            error!(error = %err, "job monitor stopped");
        }
    })
}

async fn serve_http(settings: &config::Settings, api_state: ApiState) -> Result<(), AppError> {
    let router = http::build_router(api_state);

    let listener =
        tokio::net::TcpListener::bind((settings.server.host.as_str(), settings.server.port))
            .await
            .map_err(|err| AppError::from(InfraError::from(err)))?;

    let addr = listener
        .local_addr()
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(target = "mensa::http", %addr, "listening");

    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}
