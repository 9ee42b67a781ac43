use std::{env, fs::OpenOptions, net::SocketAddr, path::PathBuf, process::exit, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::{Handle, tls_rustls::RustlsConfig};
use clap::Parser;
use rusqlite::Connection;
use time::Duration;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use tradebook::{AppState, build_router, graceful_shutdown, logging_middleware};

/// The REST API server for tradebook.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// Directory containing an SSL certificate `cert.pem` and key `key.pem`.
    /// The server uses plain HTTP if this is not set.
    #[arg(long)]
    cert_path: Option<String>,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The IP address to listen on.
    #[arg(short, long, default_value = "127.0.0.1")]
    address: String,

    /// How many minutes access tokens are valid for.
    #[arg(long, default_value_t = 5)]
    access_token_minutes: i64,

    /// How many days refresh tokens are valid for.
    #[arg(long, default_value_t = 1)]
    refresh_token_days: i64,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr: SocketAddr = match format!("{}:{}", args.address, args.port).parse() {
        Ok(addr) => addr,
        Err(error) => {
            tracing::error!("Invalid address {}:{}: {error}", args.address, args.port);
            exit(1);
        }
    };

    let Ok(secret) = env::var("SECRET") else {
        tracing::error!("The environment variable 'SECRET' must be set");
        exit(1);
    };

    let conn = match Connection::open(&args.db_path) {
        Ok(conn) => conn,
        Err(error) => {
            tracing::error!("Could not open the database at {}: {error}", args.db_path);
            exit(1);
        }
    };

    let state = match AppState::new(conn, &secret) {
        Ok(state) => state.with_token_durations(
            Duration::minutes(args.access_token_minutes),
            Duration::days(args.refresh_token_days),
        ),
        Err(error) => {
            tracing::error!("Could not initialize the database: {error}");
            exit(1);
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router =
        add_tracing_layer(build_router(state).layer(middleware::from_fn(logging_middleware)));

    let result = match args.cert_path {
        Some(cert_path) => {
            let tls_config = match RustlsConfig::from_pem_file(
                PathBuf::from(&cert_path).join("cert.pem"),
                PathBuf::from(&cert_path).join("key.pem"),
            )
            .await
            {
                Ok(tls_config) => tls_config,
                Err(error) => {
                    tracing::error!("Could not open TLS certificates in {cert_path}: {error}");
                    exit(1);
                }
            };

            tracing::info!("HTTPS server listening on {}", addr);
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(router.into_make_service())
                .await
        }
        None => {
            tracing::info!("HTTP server listening on {}", addr);
            axum_server::bind(addr)
                .handle(handle)
                .serve(router.into_make_service())
                .await
        }
    };

    if let Err(error) = result {
        tracing::error!("Server error: {error}");
        exit(1);
    }
}

fn setup_logging() {
    let stdout_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(stdout_filter);

    let debug_log = match OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
    {
        Ok(log_file) => Some(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_ansi(false)
                .with_writer(Arc::new(log_file))
                .with_filter(filter::LevelFilter::DEBUG),
        ),
        Err(error) => {
            eprintln!("Could not create log file, logging to stdout only: {error}");
            None
        }
    };

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
        .init();
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
