//! Prometheus exporter binary for Luxtronik 2 heat pump controllers.

// ============================================================================
// Imports
// ============================================================================

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use chrono::{FixedOffset, Local};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use luxws_exporter::collector::{Collector, CollectorOpts};
use luxws_exporter::{lang, metrics};

// ============================================================================
// Command Line
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "luxws-exporter",
    version,
    about = "Prometheus exporter for Luxtronik 2 heat pump controllers"
)]
struct Args {
    /// Address to listen on for telemetry
    #[arg(long = "web.listen-address", default_value = ":8081")]
    listen_address: String,

    /// Path under which to expose metrics
    #[arg(long = "web.telemetry-path", default_value = "/metrics")]
    telemetry_path: String,

    /// Maximum number of concurrent scrape requests
    #[arg(long = "web.max-requests", default_value_t = 3)]
    max_requests: usize,

    /// Maximum duration for a scrape
    #[arg(
        long = "scrape-timeout",
        default_value = "1m",
        value_parser = humantime::parse_duration
    )]
    scrape_timeout: Duration,

    /// host:port for the controller websocket service (e.g. "192.0.2.1:8214")
    #[arg(long = "controller.address", value_name = "HOST:PORT")]
    address: String,

    /// Password for the controller websocket service
    #[arg(long = "controller.password", default_value = "")]
    password: String,

    /// host:port for the controller HTTP service; used to retrieve time
    #[arg(long = "controller.address.http", value_name = "HOST:PORT")]
    http_address: Option<String>,

    /// Timezone for parsing timestamps: "local", "utc" or a fixed offset
    /// such as "+02:00"
    #[arg(
        long = "controller.timezone",
        default_value = "local",
        value_parser = parse_timezone
    )]
    timezone: FixedOffset,

    /// Controller interface language (one of "en", "de", "nl", "cz", "fi")
    #[arg(long = "controller.language", value_name = "ID")]
    language: String,

    /// Log sent and received messages
    #[arg(long)]
    verbose: bool,
}

fn parse_timezone(text: &str) -> Result<FixedOffset, String> {
    if text.eq_ignore_ascii_case("local") {
        return Ok(*Local::now().offset());
    }
    let err = || format!("invalid timezone {text:?}: expected \"local\", \"utc\" or \"+HH:MM\"");

    if text.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(err);
    }

    let (sign, rest) = match text.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(err()),
    };

    let (hours, minutes) = rest.split_once(':').ok_or_else(err)?;
    let hours: i32 = hours.parse().map_err(|_| err())?;
    let minutes: i32 = minutes.parse().map_err(|_| err())?;

    if hours > 14 || minutes >= 60 {
        return Err(err());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(err)
}

/// Accepts `:8081` as shorthand for listening on all interfaces.
fn parse_listen_address(text: &str) -> Result<SocketAddr, String> {
    let full = if text.starts_with(':') {
        format!("0.0.0.0{text}")
    } else {
        text.to_string()
    };

    full.parse()
        .map_err(|e| format!("invalid listen address {text:?}: {e}"))
}

// ============================================================================
// HTTP Handlers
// ============================================================================

struct App {
    collector: Collector,
    telemetry_path: String,
}

async fn index(State(app): State<Arc<App>>) -> Html<String> {
    Html(format!(
        "<html>\n\
         <head><title>LuxWS Exporter</title></head>\n\
         <body>\n\
         <h1>LuxWS Exporter</h1>\n\
         <p><a href=\"{}\">Metrics</a></p>\n\
         </body>\n\
         </html>",
        app.telemetry_path
    ))
}

async fn telemetry(State(app): State<Arc<App>>) -> Response {
    let scrape = app.collector.scrape().await;

    if let Some(error) = &scrape.error {
        warn!(error = %error, "scrape failed");
    }

    match metrics::render(&scrape) {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "rendering metrics failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

// ============================================================================
// Main
// ============================================================================

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.verbose);

    let terms = match lang::lookup(&args.language) {
        Ok(terms) => terms,
        Err(e) => {
            error!(error = %e, "unknown controller language");
            return ExitCode::FAILURE;
        }
    };

    let listen_address = match parse_listen_address(&args.listen_address) {
        Ok(addr) => addr,
        Err(e) => {
            error!(error = %e, "invalid listen address");
            return ExitCode::FAILURE;
        }
    };

    if !args.telemetry_path.starts_with('/') {
        error!(path = %args.telemetry_path, "telemetry path must start with '/'");
        return ExitCode::FAILURE;
    }

    let collector = Collector::new(CollectorOpts {
        address: args.address,
        password: args.password,
        http_address: args.http_address,
        terms,
        timezone: args.timezone,
        timeout: args.scrape_timeout,
        max_concurrent: args.max_requests,
    });

    let app = Arc::new(App {
        collector,
        telemetry_path: args.telemetry_path.clone(),
    });

    let router = Router::new()
        .route("/", get(index))
        .route(&args.telemetry_path, get(telemetry))
        .with_state(app);

    let listener = match tokio::net::TcpListener::bind(listen_address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, address = %listen_address, "binding listener failed");
            return ExitCode::FAILURE;
        }
    };

    info!(address = %listen_address, path = %args.telemetry_path, "listening");

    if let Err(e) = axum::serve(listener, router).await {
        error!(error = %e, "serving failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

// ============================================================================
// Tests
// ============================================================================
