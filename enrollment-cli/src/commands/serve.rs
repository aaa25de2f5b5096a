//! Implementation of the `enrollment serve` command.

use std::time::Duration;

use colored::Colorize;
use enrollment::api;
use enrollment::config::{ServerConfig, Settings};
use enrollment::middleware::{
    BodyLimitMiddleware, RequestLogMiddleware, TimeoutMiddleware, TraceIdMiddleware,
};
use enrollment::prelude::{App, TracingConfig};

use super::colors;

/// Flags that override the environment.
#[derive(Debug, Default)]
pub struct ServeConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub max_students: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    pub json_logs: bool,
}

/// Starts the HTTP server and blocks until Ctrl-C.
pub async fn execute(config: ServeConfig) -> Result<(), String> {
    let mut server = ServerConfig::from_env().map_err(|e| e.to_string())?;
    if let Some(host) = config.host {
        server.host = host;
    }
    if let Some(port) = config.port {
        server.port = port;
    }
    if let Some(secs) = config.request_timeout_secs {
        server.request_timeout = Duration::from_secs(secs);
    }

    let settings = match config.max_students {
        Some(max) => Settings::new(max),
        None => Settings::from_env().map_err(|e| e.to_string())?,
    };

    let logging = if config.json_logs {
        TracingConfig::new().json()
    } else {
        TracingConfig::new()
    };

    let addr = server.addr();
    if !config.json_logs {
        print_banner(&addr, settings.max_students_per_course());
    }

    let app = App::new()
        .with_tracing(logging)
        .map_err(|e| e.to_string())?;
    tracing::info!(
        max_students_per_course = settings.max_students_per_course(),
        "enrollment cap configured"
    );

    app.settings(settings)
        .middleware(TraceIdMiddleware::new())
        .middleware(RequestLogMiddleware::new())
        .middleware(TimeoutMiddleware::from_config(&server))
        .middleware(BodyLimitMiddleware::default())
        .router(api::routes())
        .listen(&addr)
        .await
        .map_err(|e| format!("server error: {}", e))
}

fn print_banner(addr: &str, max_students: usize) {
    let url = format!("http://{}/api/v1/", addr);
    let b = "│".custom_color(colors::mauve());

    println!();
    println!(
        " {}",
        "╭───────────────────────────────────────────────────────────╮"
            .custom_color(colors::mauve())
    );
    println!(
        " {}{}{}",
        b,
        format!("{:^59}", "Enrollment Service")
            .custom_color(colors::lavender())
            .bold(),
        b
    );
    println!(
        " {}",
        "├───────────────────────────────────────────────────────────┤"
            .custom_color(colors::mauve())
    );
    println!(
        " {}  {:<12}{}{}",
        b,
        "API".custom_color(colors::subtext()),
        format!("{:<45}", url).custom_color(colors::sky()),
        b
    );
    println!(
        " {}  {:<12}{}{}",
        b,
        "Max roster".custom_color(colors::subtext()),
        format!("{:<45}", max_students).custom_color(colors::peach()),
        b
    );
    println!(
        " {}",
        "╰───────────────────────────────────────────────────────────╯"
            .custom_color(colors::mauve())
    );
    println!();
}
