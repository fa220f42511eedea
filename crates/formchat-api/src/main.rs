//! FormChat CLI and REST API entry point.
//!
//! Binary name: `fchat`
//!
//! Parses CLI arguments, initializes database and services, then dispatches
//! to the appropriate command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use formchat_observe::tracing_setup::{init_tracing, shutdown_tracing, verbosity_filter};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    init_tracing(&verbosity_filter(cli.verbose, cli.quiet), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "fchat", &mut std::io::stdout());
        return Ok(());
    }

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Initialize application state (config, DB, services)
    let state = AppState::init().await?;

    match cli.command {
        Commands::Create {
            name,
            form_url,
            embed_type,
            customization,
        } => {
            cli::chatbot::create_chatbot(&state, name, form_url, embed_type, customization, cli.json)
                .await?;
        }

        Commands::List {
            page,
            per_page,
            active,
        } => {
            cli::chatbot::list_chatbots(&state, page, per_page, active, cli.json).await?;
        }

        Commands::Show { id } => {
            cli::chatbot::show_chatbot(&state, &id, cli.json).await?;
        }

        Commands::Embed { id, kind } => {
            cli::chatbot::print_embed(&state, &id, kind, cli.json).await?;
        }

        Commands::Update {
            id,
            name,
            form_url,
            embed_type,
            active,
            customization,
        } => {
            cli::chatbot::update_chatbot(
                &state,
                &id,
                name,
                form_url,
                embed_type,
                active,
                customization,
                cli.json,
            )
            .await?;
        }

        Commands::Delete { id, force } => {
            cli::chatbot::delete_chatbot(&state, &id, force, cli.json).await?;
        }

        Commands::Stats { id: Some(id) } => {
            cli::status::chatbot_stats(&state, &id, cli.json).await?;
        }

        Commands::Stats { id: None } => {
            cli::status::global_stats(&state, cli.json).await?;
        }

        Commands::Serve { port, host } => {
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !cli.quiet {
                println!(
                    "  {} FormChat API listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!(
                    "  {} {}",
                    console::style("Embed code points at").dim(),
                    console::style(&state.config.api_base_url).dim()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
///
/// If a handler cannot be installed, that branch never resolves and the
/// other one still shuts the server down.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
