//! cgi-echo: A CGI program that echoes the request body
//!
//! The invoking web server passes `CONTENT_LENGTH` in the environment and
//! the request body on stdin. The body is written back to stdout as a
//! `200 OK` `text/plain` response.
//!
//! Features:
//! - Reads at most `CONTENT_LENGTH` bytes; short bodies are echoed as-is
//! - Optional body size cap and read timeout
//! - Configuration via TOML file (named by `CGI_ECHO_CONFIG` or `--config`)
//!   or CLI arguments when run outside a web server
//! - Logs go to stderr so stdout stays the response channel

mod cgi;
mod config;

use cgi::{CgiEnv, Handler};
use config::Config;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env = CgiEnv::from_process();

    // Load configuration
    let (config, config_errors) = Config::load(&env);

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    for error in &config_errors {
        warn!(error = %error, "Ignoring configuration source, using defaults");
    }

    debug!(
        max_content_length = ?config.max_content_length,
        read_timeout = ?config.read_timeout,
        "Starting cgi-echo"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(run(config, env));

    // A stdin read abandoned by the timeout still occupies a blocking
    // thread; don't wait for it.
    runtime.shutdown_background();

    result
}

/// Answer the single request this process was started for.
async fn run(config: Config, env: CgiEnv) -> Result<(), Box<dyn std::error::Error>> {
    let handler = Handler::new(config.handler_options());

    let mut stdout = tokio::io::stdout();
    cgi::respond(&handler, &env, tokio::io::stdin(), &mut stdout).await?;

    info!(
        method = env.request_method().unwrap_or("-"),
        content_length = env.content_length(),
        "Echoed request body"
    );
    Ok(())
}
