use std::fs::File;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use futures::future::join_all;
use quickstate::core::config::{self, ResolvedConfig};
use quickstate::{Action, ReqwestClient, RequestDescriptor, StateSlice, ThunkOutcome};
use serde_json::{Value, json};
use simplelog::{ConfigBuilder, WriteLogger};
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "quickstate", about = "Fetch JSON through a thunk and print the reduced state")]
struct Args {
    /// URLs to fetch, absolute or relative to the base URL
    #[arg(required = true)]
    urls: Vec<String>,

    /// Request method (GET sends no body)
    #[arg(short = 'X', long)]
    method: Option<String>,

    /// JSON body for non-GET requests
    #[arg(short, long, value_parser = parse_json)]
    body: Option<Value>,

    /// JSON dispatched instead of the response body
    #[arg(long, value_parser = parse_json)]
    action_args: Option<Value>,

    /// Base URL for relative URLs (overrides config and env)
    #[arg(long)]
    base_url: Option<String>,
}

fn parse_json(raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {e}"))
}

fn init_logging(config: &ResolvedConfig) {
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create(&config.log_file) {
        let _ = WriteLogger::init(config.log_level, log_config, log_file);
    }
}

/// The demo slice: every received payload is appended to `responses`.
fn fetch_slice() -> (StateSlice<Value>, quickstate::ActionCreator) {
    let mut slice = StateSlice::new("fetch", json!({ "responses": [] }));
    let received = slice.register_handler("fetch/received", |state: &Value, action: &Action| {
        let mut responses = state["responses"].as_array().cloned().unwrap_or_default();
        responses.push(action.payload.clone());
        json!({ "responses": responses })
    });
    (slice, received)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Loading happens before the logger exists, so what it found is logged afterwards.
    let config_file = config::config_path();
    let had_config_file = config_file.as_ref().is_some_and(|path| path.exists());

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("quickstate: {e}");
            return ExitCode::FAILURE;
        }
    };
    let resolved = config::resolve(&file_config, args.base_url.as_deref());
    init_logging(&resolved);

    match &config_file {
        Some(path) if had_config_file => log::info!("Loaded config from {}", path.display()),
        Some(path) => log::info!("No config file found, generated default at {}", path.display()),
        None => log::warn!("Could not determine home directory, using default config"),
    }
    for warning in &resolved.warnings {
        log::warn!("{warning}");
        eprintln!("quickstate: {warning}");
    }

    log::info!("quickstate starting, {} url(s)", args.urls.len());

    let client = match ReqwestClient::with_user_agent(resolved.base_url.clone(), &resolved.user_agent) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            eprintln!("quickstate: {e}");
            return ExitCode::FAILURE;
        }
    };

    let (slice, received) = fetch_slice();
    let Args {
        urls,
        method,
        body,
        action_args,
        ..
    } = args;

    let thunk = slice.make_thunk(client, move |url: String| {
        let mut descriptor = RequestDescriptor::new(url, received.clone());
        descriptor.method = method.clone();
        descriptor.payload = body.clone();
        descriptor.action_args = action_args.clone();
        descriptor
    });

    let mut thunks = Vec::with_capacity(urls.len());
    for url in urls {
        match thunk.call(url) {
            Ok(t) => thunks.push(t),
            Err(e) => {
                eprintln!("quickstate: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
    let dispatch = move |action: Action| {
        if tx.send(action).is_err() {
            log::warn!("Dispatch after receiver closed");
        }
    };

    let results = join_all(thunks.into_iter().map(|t| t.run(&dispatch))).await;
    drop(dispatch);

    let mut state = None;
    while let Some(action) = rx.recv().await {
        state = Some(slice.reduce(state, &action));
    }
    let state = state.unwrap_or_else(|| slice.initial_state().clone());

    let mut failed = false;
    for result in results {
        match result {
            Ok(ThunkOutcome::Dispatched(_)) => {}
            Ok(ThunkOutcome::Rejected(response)) => {
                failed = true;
                eprintln!("quickstate: HTTP {}: {}", response.status, response.body);
            }
            Err(e) => {
                failed = true;
                eprintln!("quickstate: {e}");
            }
        }
    }

    match serde_json::to_string_pretty(&state) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => {
            eprintln!("quickstate: {e}");
            return ExitCode::FAILURE;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
