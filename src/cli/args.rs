// file: src/cli/args.rs
// version: 1.0.0
// guid: 7a3e9d52-1c84-4b6f-a0d7-e95238c1b764

//! Command line argument definitions

use crate::model::PackageType;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hardn")]
#[command(about = "Baseline hardening for Debian, Ubuntu, Alpine and Proxmox VE hosts")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the YAML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log every mutation instead of performing it
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply the configured hardening baseline to this host
    Harden,

    /// Probe the host and report its security posture
    Status {
        #[arg(long)]
        json: bool,
    },

    /// Manage administrator accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage the SSH daemon policy
    Ssh {
        #[command(subcommand)]
        action: SshAction,
    },

    /// Manage the ufw firewall
    Firewall {
        #[command(subcommand)]
        action: FirewallAction,
    },

    /// Manage the system resolver
    Dns {
        #[command(subcommand)]
        action: DnsAction,
    },

    /// Install a package profile
    Install {
        /// Profile to install; core upgrades itself to dmz on a DMZ subnet
        #[arg(value_enum, default_value = "core")]
        profile: ProfileArg,
    },

    /// Manage package repository sources
    Sources {
        #[command(subcommand)]
        action: SourcesAction,
    },

    /// Inspect and restore configuration backups
    Backup {
        #[command(subcommand)]
        action: BackupAction,
    },

    /// Sudo environment preservation and locale settings
    Env {
        #[command(subcommand)]
        action: EnvAction,
    },

    /// Show host and network information
    Info,

    /// Show recent entries from the operation journal
    Logs {
        #[arg(short, long, default_value = "20")]
        lines: usize,
    },
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Create an administrator account with sudo and SSH keys
    Add {
        /// Login name; falls back to the configured username
        username: Option<String>,

        /// Require a password for sudo instead of NOPASSWD
        #[arg(long)]
        with_password: bool,

        /// Public key to authorize; repeatable, defaults to configured keys
        #[arg(short, long = "key")]
        keys: Vec<String>,
    },

    /// Authorize one public key for an existing account
    Key {
        username: String,

        /// The OpenSSH public key line
        public_key: String,
    },

    /// List regular (non-system) accounts
    List,
}

#[derive(Subcommand)]
pub enum SshAction {
    /// Write the configured SSH daemon policy and restart the daemon
    Apply,

    /// Turn off root login over SSH, leaving the rest of the policy alone
    DisableRoot,

    /// Show the daemon policy currently on disk
    Show,
}

#[derive(Subcommand)]
pub enum FirewallAction {
    /// Apply the configured firewall policy and rules
    Apply,

    /// Show the current firewall state
    Status,
}

#[derive(Subcommand)]
pub enum DnsAction {
    /// Point the system resolver at the configured nameservers
    Apply,

    /// Show the current resolver configuration
    Show,
}

#[derive(Subcommand)]
pub enum SourcesAction {
    /// Rewrite the package repository sources for this distribution
    Update,
}

#[derive(Subcommand)]
pub enum BackupAction {
    /// List the backups recorded for a file
    List {
        /// Original path the backups were taken from
        path: PathBuf,
    },

    /// Restore a backup over a target path
    Restore {
        /// Backup file to restore from
        backup: PathBuf,

        /// Path to restore to
        target: PathBuf,
    },

    /// Delete backups older than the cutoff
    Cleanup {
        #[arg(long, default_value = "30")]
        older_than_days: u32,
    },

    /// Check that the backup directory exists and is writable
    Verify,
}

#[derive(Subcommand)]
pub enum EnvAction {
    /// Warn when sudo would drop the hardening environment
    Check,

    /// Configure sudoers to preserve the hardening environment
    Setup,

    /// Write the configured locale and timezone system-wide
    Locale,
}

/// Package profile argument for the CLI
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum ProfileArg {
    Core,
    Dmz,
    Lab,
    Python,
}

impl From<ProfileArg> for PackageType {
    fn from(profile: ProfileArg) -> Self {
        match profile {
            ProfileArg::Core => PackageType::Core,
            ProfileArg::Dmz => PackageType::Dmz,
            ProfileArg::Lab => PackageType::Lab,
            ProfileArg::Python => PackageType::Python,
        }
    }
}
