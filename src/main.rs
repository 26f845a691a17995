// file: src/main.rs
// version: 1.0.0
// guid: 6c1e9f37-4b82-4d50-a6e3-d97b20c8f415

//! hardn - Main entry point

use clap::Parser;
use hardn::{
    cli::{
        args::{
            BackupAction, Cli, Commands, DnsAction, EnvAction, FirewallAction, SourcesAction,
            SshAction, UserAction,
        },
        commands::*,
    },
    logging::logger,
    Result,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    logger::init_logger(cli.verbose, cli.quiet)?;

    let ctx = CommandContext::initialize(cli.config.as_deref(), cli.dry_run)?;

    match cli.command {
        Commands::Harden => harden_command(&ctx).await,
        Commands::Status { json } => status_command(&ctx, json).await,
        Commands::User { action } => match action {
            UserAction::Add {
                username,
                with_password,
                keys,
            } => user_add_command(&ctx, username, with_password, keys).await,
            UserAction::Key {
                username,
                public_key,
            } => user_key_command(&ctx, &username, &public_key).await,
            UserAction::List => user_list_command(&ctx).await,
        },
        Commands::Ssh { action } => match action {
            SshAction::Apply => ssh_apply_command(&ctx).await,
            SshAction::DisableRoot => ssh_disable_root_command(&ctx).await,
            SshAction::Show => ssh_show_command(&ctx).await,
        },
        Commands::Firewall { action } => match action {
            FirewallAction::Apply => firewall_apply_command(&ctx).await,
            FirewallAction::Status => firewall_status_command(&ctx).await,
        },
        Commands::Dns { action } => match action {
            DnsAction::Apply => dns_apply_command(&ctx).await,
            DnsAction::Show => dns_show_command(&ctx).await,
        },
        Commands::Install { profile } => install_command(&ctx, profile.into()).await,
        Commands::Sources { action } => match action {
            SourcesAction::Update => sources_update_command(&ctx).await,
        },
        Commands::Backup { action } => match action {
            BackupAction::List { path } => backup_list_command(&ctx, &path).await,
            BackupAction::Restore { backup, target } => {
                backup_restore_command(&ctx, &backup, &target).await
            }
            BackupAction::Cleanup { older_than_days } => {
                backup_cleanup_command(&ctx, older_than_days).await
            }
            BackupAction::Verify => backup_verify_command(&ctx).await,
        },
        Commands::Env { action } => match action {
            EnvAction::Check => env_check_command(&ctx).await,
            EnvAction::Setup => env_setup_command(&ctx).await,
            EnvAction::Locale => env_locale_command(&ctx).await,
        },
        Commands::Info => info_command(&ctx).await,
        Commands::Logs { lines } => logs_command(&ctx, lines).await,
    }
}
