use std::{
    error::Error,
    fs::OpenOptions,
    net::SocketAddr,
    path::PathBuf,
    process::ExitCode,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use pocket_ledger::{
    AppState, build_router,
    config::ConfigStore,
    get_local_offset, graceful_shutdown, local_now, logging_middleware,
    summary::{current_month_expenses, is_over_budget},
    transaction::get_all_transactions,
};

/// The web UI server for pocket_ledger.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, default_value = "ledger.db")]
    db_path: PathBuf,

    /// File path to the JSON settings file. Created with the default settings if missing.
    #[arg(long, default_value = "config.json")]
    config_path: PathBuf,

    /// The port to serve the web UI from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical name of the local timezone, e.g. "Pacific/Auckland".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(error) = setup_logging() {
        eprintln!("Could not set up logging: {error}");
        return ExitCode::FAILURE;
    }

    match serve(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("Server stopped with an error: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn serve(args: Args) -> Result<(), Box<dyn Error>> {
    if get_local_offset(&args.timezone).is_none() {
        return Err(format!("\"{}\" is not a valid canonical timezone", args.timezone).into());
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let connection = Connection::open(&args.db_path)?;
    let state = AppState::new(
        connection,
        ConfigStore::new(args.config_path),
        &args.timezone,
    )?;

    warn_if_over_budget(&state)?;

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state).layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    tracing::info!("HTTP server listening on http://{}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;

    Ok(())
}

/// Log a warning when this month's expenses are already over the salary.
fn warn_if_over_budget(state: &AppState) -> Result<(), pocket_ledger::Error> {
    let salary = state
        .config
        .lock()
        .map_err(|_| pocket_ledger::Error::ConfigLockError)?
        .salary;
    let transactions = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| pocket_ledger::Error::DatabaseLockError)?;
        get_all_transactions(&connection)?
    };

    let today = local_now(&state.local_timezone)?.date();
    let month_expenses = current_month_expenses(&transactions, today);

    if is_over_budget(month_expenses, salary) {
        tracing::warn!(
            "This month's expenses ({month_expenses:.2}) are over the monthly salary ({salary:.2})"
        );
    }

    Ok(())
}

fn setup_logging() -> Result<(), std::io::Error> {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")?;

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_ansi(false)
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();

    Ok(())
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
