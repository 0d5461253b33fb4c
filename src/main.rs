use anyhow::Result;
use clap::Parser;

use studio_flow::cli::commands::init_config::InitConfigCommand;
use studio_flow::cli::commands::show_how_to_get_started;
use studio_flow::cli::commands::statuses::StatusesCommand;
use studio_flow::cli::commands::transition::TransitionCommand;
use studio_flow::cli::commands::transitions::{CheckCommand, TransitionsCommand};
use studio_flow::cli::{Cli, Commands};
use studio_flow::{init_config, init_telemetry};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // init-config must work even when the existing file is broken
    if let Some(Commands::InitConfig { path, force }) = &cli.command {
        let command = InitConfigCommand::new(path.clone(), *force);
        return tokio::runtime::Runtime::new()?.block_on(async { command.execute().await });
    }

    let config = studio_flow::config()?;
    init_telemetry(&config.observability)?;
    init_config()?;

    match cli.command {
        // Default behavior: no subcommand - explain what the tool does
        None => tokio::runtime::Runtime::new()?.block_on(async { show_how_to_get_started().await }),
        Some(Commands::Statuses { kind }) => {
            tokio::runtime::Runtime::new()?.block_on(async { StatusesCommand::new(kind).execute().await })
        }
        Some(Commands::Transitions { kind, status }) => tokio::runtime::Runtime::new()?
            .block_on(async { TransitionsCommand::new(kind, status).execute().await }),
        Some(Commands::Check { kind, from, to }) => {
            let legal = tokio::runtime::Runtime::new()?
                .block_on(async { CheckCommand::new(kind, from, to).execute().await })?;
            if !legal {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Commands::Transition {
            data,
            kind,
            id,
            to,
            note,
            dry_run,
        }) => {
            let result = tokio::runtime::Runtime::new()?.block_on(async {
                TransitionCommand::new(data, kind, id, to, config.workflow.clone())
                    .with_note(note)
                    .with_dry_run(dry_run)
                    .execute()
                    .await
            })?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.success {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Commands::InitConfig { .. }) => Ok(()),
    }
}
