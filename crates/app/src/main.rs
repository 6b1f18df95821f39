//! Taskdeck command line client.
//!
//! Wires the concrete adapters into the dispatcher and exposes the task
//! operations as subcommands. Authentication state (the session cookie)
//! is owned by the shared HTTP client; when the session is gone for good
//! the expiry observer prints the login URL and the command fails.

use std::sync::Arc;

use taskdeck_application::{Dispatcher, TaskClient};
use taskdeck_domain::TaskCreate;
use taskdeck_infrastructure::{
    AuthServiceSessionStore, LoginRedirect, ReqwestTransport, TokioSleeper,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

const USAGE: &str = "usage: taskdeck <list | add <title> | toggle <id> | rename <id> <title> | delete <id> | sign-out>";

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Get configuration from environment
    let api_url = env_or("TASKDECK_API_URL", "http://localhost:8000");
    let auth_url = env_or("TASKDECK_AUTH_URL", "http://localhost:3000/api/auth");
    let login_url = env_or("TASKDECK_LOGIN_URL", "http://localhost:3000/login");

    // One cookie-carrying client shared by API and auth traffic.
    let http = Arc::new(
        reqwest::Client::builder()
            .user_agent(concat!("Taskdeck/", env!("CARGO_PKG_VERSION")))
            .cookie_store(true)
            .build()?,
    );

    let sessions = Arc::new(AuthServiceSessionStore::new(auth_url, Arc::clone(&http)));
    let transport = ReqwestTransport::with_client((*http).clone());
    let expiry = Arc::new(LoginRedirect::new(
        login_url,
        Arc::new(|url| eprintln!("Session expired. Sign in at: {url}")),
    ));

    let dispatcher = Dispatcher::new(api_url, transport, Arc::clone(&sessions), TokioSleeper)
        .with_expiry_observer(expiry);
    let client = TaskClient::new(dispatcher);

    let args: Vec<String> = std::env::args().skip(1).collect();
    run(&client, sessions.as_ref(), &args).await
}

async fn run(
    client: &TaskClient<ReqwestTransport, AuthServiceSessionStore, TokioSleeper>,
    sessions: &AuthServiceSessionStore,
    args: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    use taskdeck_application::ports::SessionStore;

    match args {
        [cmd] if cmd == "list" => {
            let listing = client.list_tasks().await?;
            for task in &listing.tasks {
                let mark = if task.is_completed { "x" } else { " " };
                println!("[{mark}] {}  {}", task.id, task.title);
            }
            println!("{} task(s)", listing.count);
        }
        [cmd, title] if cmd == "add" => {
            let task = client.create_task(&TaskCreate::new(title.clone())?).await?;
            println!("created {}", task.id);
        }
        [cmd, id] if cmd == "toggle" => {
            let task = client.toggle_task(parse_id(id)?).await?;
            let state = if task.is_completed { "done" } else { "open" };
            println!("{} is now {state}", task.id);
        }
        [cmd, id, title] if cmd == "rename" => {
            let update = taskdeck_domain::TaskUpdate::title(title.clone())?;
            let task = client.update_task(parse_id(id)?, &update).await?;
            println!("renamed {}", task.id);
        }
        [cmd, id] if cmd == "delete" => {
            client.delete_task(parse_id(id)?).await?;
            println!("deleted");
        }
        [cmd] if cmd == "sign-out" => {
            sessions.sign_out().await?;
            println!("signed out");
        }
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }

    Ok(())
}

fn parse_id(raw: &str) -> Result<Uuid, Box<dyn std::error::Error>> {
    Uuid::parse_str(raw).map_err(|e| format!("invalid task id {raw:?}: {e}").into())
}
