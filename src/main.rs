use clap::Parser;
use docsync_cli::cli::commands::{config, openapi};
use docsync_cli::cli::errors::print_error_with_json;
use docsync_cli::cli::tracing_init::init_tracing;
use docsync_cli::cli::{Cli, Commands};
use docsync_cli::config::manager::ConfigManager;
use docsync_cli::config::models::GlobalConfig;
use docsync_cli::error::Error;
use docsync_cli::fs::OsFileSystem;
use docsync_cli::output::Output;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbosity);

    let manager = match ConfigManager::new() {
        Ok(manager) => manager,
        Err(e) => {
            print_error_with_json(&e, cli.json_errors);
            std::process::exit(1);
        }
    };

    // Load errors are reported only by commands that read the config.
    let global_config = manager.load_global_config();
    let json_errors = cli.json_errors
        || global_config
            .as_ref()
            .is_ok_and(|config| config.agent_defaults.json_errors);

    if let Err(e) = run_command(cli, &manager, global_config).await {
        print_error_with_json(&e, json_errors);
        std::process::exit(1);
    }
}

async fn run_command(
    cli: Cli,
    manager: &ConfigManager<OsFileSystem>,
    global_config: Result<GlobalConfig, Error>,
) -> Result<(), Error> {
    let output = Output::new(cli.quiet, cli.json_errors);
    match cli.command {
        Commands::Openapi { command } => {
            openapi::execute_openapi_command(command, &global_config?).await
        }
        Commands::Config { command } => config::execute_config_command(manager, command, &output),
    }
}
