//! Roster Web Server

use std::process;

use salvo::{affix_state::inject, prelude::*, trailing_slash::remove_slash};
use tracing::{error, info, warn};

use roster_app::context::AppContext;

use crate::{
    config::ServerConfig,
    observability::{Observability, metrics_handler, request_logging},
    router::app_router,
    state::State,
};

mod config;
mod extensions;
mod healthcheck;
mod observability;
mod router;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;
mod users;

/// Roster web server entry point
#[tokio::main]
pub async fn main() {
    let config = ServerConfig::load().unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {e}");
        }

        #[expect(clippy::exit, reason = "startup cannot continue without configuration")]
        process::exit(1);
    });

    let observability = match Observability::init(&config) {
        Ok(observability) => observability,
        Err(init_error) => {
            #[expect(
                clippy::print_stderr,
                reason = "logging failed to initialize, must use eprintln"
            )]
            {
                eprintln!("Observability error: {init_error}");
            }

            #[expect(clippy::exit, reason = "startup cannot continue without logging")]
            process::exit(1);
        }
    };

    let app = match &config.database.database_url {
        Some(database_url) => {
            match AppContext::from_database_url(database_url, config.database.run_migrations).await
            {
                Ok(app) => app,
                Err(init_error) => {
                    error!("failed to initialize app context: {init_error}");
                    observability.shutdown();

                    #[expect(clippy::exit, reason = "startup cannot continue without storage")]
                    process::exit(1);
                }
            }
        }
        None => {
            warn!("DATABASE_URL is not set, users are kept in memory and lost on restart");

            AppContext::in_memory()
        }
    };

    let addr = config.socket_addr();

    info!(storage = app.storage.as_str(), "starting server on {addr}");

    let listener = TcpListener::new(addr).bind().await;

    let router = Router::new()
        .hoop(CatchPanic::new())
        .hoop(remove_slash())
        .hoop(request_logging)
        .hoop(inject(State::from_app_context(app)))
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(metrics_handler))
        .push(app_router());

    let server = Server::new(listener);
    let handle = server.handle();

    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    server.serve(router).await;

    observability.shutdown();
}
