use std::io::Write as _;
use std::ops::ControlFlow;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use blogfeed::api::HttpPostApi;
use blogfeed::auth::AuthController;
use blogfeed::config::Config;
use blogfeed::console::{self, Command, HELP};
use blogfeed::feed::{FeedController, FeedError};
use blogfeed::session::FileSessionStore;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(
        api_base_url = %config.api_base_url,
        session_file = %config.session_file.display(),
        "Configuration loaded"
    );

    let api = Arc::new(HttpPostApi::new(&config).context("Failed to build HTTP client")?);
    let session = Arc::new(FileSessionStore::new(&config.session_file));
    let feed = FeedController::new(api.clone(), session.clone());
    let auth = AuthController::new(api, session);

    if let Some(user) = auth.current_session().await {
        info!(username = ?user.username(), "Restored session");
    }

    log_result(feed.activate().await);
    render(&feed, &auth);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read input")?,
            () = shutdown_signal() => None,
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            render(&feed, &auth);
            continue;
        }

        match line.parse::<Command>() {
            Ok(command) => {
                if dispatch(command, &feed, &auth).await.is_break() {
                    break;
                }
                render(&feed, &auth);
            }
            Err(e) => println!("{e}"),
        }
    }

    info!("Shutting down");
    Ok(())
}

/// Run one command against the controllers.
///
/// Failures are already surfaced as notifications, so they are only logged here.
async fn dispatch(
    command: Command,
    feed: &FeedController,
    auth: &AuthController,
) -> ControlFlow<()> {
    match command {
        Command::Page(page) => {
            if let Err(FeedError::InvalidPage(_)) = feed.load_page(page).await {
                println!("pages start at 1");
            }
        }
        Command::Next => match feed.state().next_page() {
            Some(page) => log_result(feed.load_page(page).await),
            None => println!("already on the last page"),
        },
        Command::Prev => match feed.state().prev_page() {
            Some(page) => log_result(feed.load_page(page).await),
            None => println!("already on the first page"),
        },
        Command::Filter(filter) => feed.set_category_filter(filter),
        Command::New => feed.open_dialog(),
        Command::Set(field, value) => {
            if let Err(e) = feed.update_draft(field, value) {
                println!("{e}");
            }
        }
        Command::Submit => match feed.submit_dialog().await {
            Err(e @ FeedError::DialogClosed) => println!("{e}"),
            result => log_result(result),
        },
        Command::Cancel => feed.close_dialog(),
        Command::Dismiss => {
            feed.dismiss_notification();
            auth.dismiss_notification();
        }
        Command::Login { email, password } => log_result(auth.sign_in(&email, &password).await),
        Command::Register {
            username,
            email,
            password,
        } => log_result(auth.sign_up(&username, &email, &password).await),
        Command::Logout => match auth.sign_out().await {
            Ok(()) => println!("signed out"),
            Err(e) => println!("failed to sign out: {e}"),
        },
        Command::Help => println!("{HELP}"),
        Command::Quit => return ControlFlow::Break(()),
    }
    ControlFlow::Continue(())
}

fn log_result<T, E: std::fmt::Display>(result: Result<T, E>) {
    if let Err(e) = result {
        debug!("Command failed: {e}");
    }
}

fn render(feed: &FeedController, auth: &AuthController) {
    println!();
    print!("{}", console::render_feed(&feed.view()));
    if let Some(notification) = auth.notification() {
        println!("{}", console::render_notification(&notification));
    }
}

fn init_tracing() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,blogfeed=debug"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    // Logs go to stderr so they don't interleave with the rendered feed
    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}
