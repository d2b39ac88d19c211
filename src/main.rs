use std::path::PathBuf;

use clap::{Parser, Subcommand};

use courtplan_client::app::AppState;
use courtplan_client::error::AppResult;
use courtplan_client::models::contract::PlanRequest;
use courtplan_client::services::api_client::ApiConfig;
use courtplan_client::services::planning;
use courtplan_client::services::schedule_view;
use courtplan_client::services::session::WorkflowStep;
use courtplan_client::utils::logger;

#[derive(Parser)]
#[command(
    name = "courtplan",
    version,
    about = "Terminal client for the Courtplan scheduling service"
)]
struct Cli {
    /// Planner service base URL
    #[arg(long, env = "COURTPLAN_API_BASE_URL")]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "COURTPLAN_HTTP_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the planner service is reachable
    Health,
    /// Upload a roster file (xlsx or csv)
    Upload { path: PathBuf },
    /// Submit a plan request and display the resulting schedule
    Plan {
        /// JSON file with a plan request; the built-in template when omitted
        #[arg(long)]
        request: Option<PathBuf>,
    },
    /// Fetch a previously computed schedule by identifier
    Fetch { id: String },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(error) = try_main().await {
        eprintln!("courtplan failed: {error}");
        std::process::exit(1);
    }
}

async fn try_main() -> AppResult<()> {
    let cli = Cli::parse();

    logger::init_logging(None)?;

    let mut config = ApiConfig::from_env();
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(secs) = cli.timeout_secs {
        config.http_timeout = std::time::Duration::from_secs(secs);
    }

    let state = AppState::new(&config)?;

    match cli.command {
        Command::Health => {
            let health = state.api().check_health().await?;
            println!("planner is {}", health.status);
        }
        Command::Upload { path } => {
            state.session().goto(WorkflowStep::Upload)?;
            let result = state.upload().upload_path(&path).await;
            println!("{}", state.upload().status_line());
            let descriptor = result?;
            println!("upload id: {}", descriptor.upload_id);
        }
        Command::Plan { request } => {
            state.session().goto(WorkflowStep::Constraints)?;
            let request = load_request(request)?;

            if let Err(error) = state.planning().submit(&request).await {
                println!("Error: {}", error.user_message());
                std::process::exit(1);
            }

            state.retrieval().refresh().await.ok();
            let model = schedule_view::view_model(&state.session().snapshot(), Some(&request));
            println!("{}", schedule_view::render_table(&model));
        }
        Command::Fetch { id } => {
            state.session().set_active_plan(id);
            state.session().goto(WorkflowStep::Schedule)?;
            state.retrieval().refresh().await.ok();

            let model = schedule_view::view_model(&state.session().snapshot(), None);
            println!("{}", schedule_view::render_table(&model));
        }
    }

    Ok(())
}

fn load_request(path: Option<PathBuf>) -> AppResult<PlanRequest> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&raw)?)
        }
        None => planning::load_default_request(),
    }
}
