#![cfg(not(tarpaulin_include))]

use std::process::ExitCode;
use std::sync::Arc;

use specs::app::{self, AppState, SharedStore};
use specs::google::GoogleClient;
use specs::logger::setup_logger;
use specs::session::OAuthClient;
use specs::{Catalog, Config, Result, SpecsError};

/// Main entry point for the web application
///
/// Loads the configuration and the exported catalog, then serves the listing,
/// short links and the detail endpoint until the process is stopped.
///
/// # Environment
/// * `SPECS_FILE` - Catalog written by `specs-cli export-specs`
/// * `GOOGLE_ACCESS_TOKEN` - Needed by the detail endpoint
/// * `GOOGLE_OAUTH_CLIENT_ID`, `GOOGLE_OAUTH_CLIENT_SECRET` - Needed for sign-in
///
/// # Returns
/// * `ExitCode` - Failure when startup or the server fails
fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    setup_logger(&config);

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: Config) -> Result<()> {
    let catalog = Catalog::load(&config.specs_file)?;

    // Clients are built before the runtime starts; they block internally.
    let store: Option<SharedStore> = match GoogleClient::from_config(&config) {
        Ok(client) => Some(Arc::new(client)),
        Err(SpecsError::MissingCredentials) => {
            log::warn!("no google access token configured, spec details are unavailable");
            None
        }
        Err(e) => return Err(e),
    };
    let oauth = OAuthClient::from_config(&config)?;
    if oauth.is_none() {
        log::warn!("google oauth client is not configured, sign-in is disabled");
    }

    let state = Arc::new(AppState::new(config, catalog, store, oauth)?);
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(app::serve(state))
}
