use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use slat_shared_util::PackageName;

use crate::{
    app::{self, DaemonCommand},
    daemon_response::{self, DaemonResponseReceiver},
};

/// Struct that gets generated from `RawOpt`.
#[derive(Debug, Clone, PartialEq)]
pub struct Opt {
    pub log_debug: bool,
    pub show_logs: bool,
    pub restart: bool,
    pub no_daemonize: bool,
    pub config_path: Option<std::path::PathBuf>,
    pub action: Action,
}

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "slat", version, about = "A status-bar indicator daemon for mobile compositors")]
pub struct RawOpt {
    /// Write out debug logs. (To read the logs, run `slat logs`).
    #[arg(long = "debug", global = true)]
    log_debug: bool,

    /// Override the path to the configuration directory (directory that contains slat.json)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Watch the log output after executing the command
    #[arg(long = "logs", global = true)]
    show_logs: bool,

    /// Restart the daemon completely before running the command
    #[arg(long = "restart", global = true)]
    restart: bool,

    /// Don't detach the daemon from the terminal
    #[arg(long = "no-daemonize", global = true)]
    no_daemonize: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Action {
    /// Generate a shell completion script
    #[command(name = "shell-completions")]
    ShellCompletions {
        #[arg(short, long)]
        shell: clap_complete::shells::Shell,
    },

    /// Start the slat daemon.
    #[command(name = "daemon", alias = "d")]
    Daemon,

    #[command(flatten)]
    ClientOnly(ActionClientOnly),

    #[command(flatten)]
    WithServer(ActionWithServer),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionClientOnly {
    /// Print and watch the slat logs
    #[command(name = "logs")]
    Logs,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionWithServer {
    /// Ping the slat daemon, checking if it is reachable.
    #[command(name = "ping")]
    Ping,

    /// Reload the settings file, in a running slat instance
    #[command(name = "reload", alias = "r")]
    Reload,

    /// Enable or disable the battery-percentage readout. This shifts the
    /// display budgets of the competitive icon areas.
    #[command(name = "set-percentage")]
    SetPercentageDisplay {
        #[arg(value_parser = crate::util::parse_on_off)]
        enabled: bool,
    },

    /// Raise or clear an ongoing-notification icon for a package.
    #[command(name = "notify", alias = "n")]
    Notify {
        package: PackageName,
        #[arg(value_parser = crate::util::parse_on_off)]
        active: bool,
    },

    /// Tell the daemon the screen came back on.
    #[command(name = "wake")]
    Wake,

    /// Print the current contents of the per-orientation icon areas.
    #[command(name = "state")]
    ShowState {
        /// Also show icons that are waiting for a slot
        #[arg(short, long)]
        all: bool,
    },

    /// Print out the full placement state, for debugging.
    #[command(name = "debug")]
    ShowDebug,

    /// Kill the slat daemon.
    #[command(name = "kill", alias = "k")]
    KillServer,
}

impl Opt {
    pub fn from_env() -> Self {
        let raw: RawOpt = RawOpt::parse();
        raw.into()
    }
}

impl From<RawOpt> for Opt {
    fn from(other: RawOpt) -> Self {
        let RawOpt { log_debug, config, show_logs, restart, no_daemonize, action } = other;
        Opt { log_debug, show_logs, restart, no_daemonize, config_path: config, action }
    }
}

impl ActionWithServer {
    /// Whether it makes sense to spin up a daemon for this action if none is
    /// running yet.
    pub fn can_start_daemon(&self) -> bool {
        matches!(
            self,
            ActionWithServer::Reload
                | ActionWithServer::SetPercentageDisplay { .. }
                | ActionWithServer::Notify { .. }
                | ActionWithServer::Wake
        )
    }

    pub fn into_daemon_command(self) -> (app::DaemonCommand, Option<DaemonResponseReceiver>) {
        let command = match self {
            ActionWithServer::Ping => {
                let (send, recv) = daemon_response::create_pair();
                let _ = send.send_success("pong".to_owned());
                return (app::DaemonCommand::NoOp, Some(recv));
            }
            ActionWithServer::Reload => return with_response_channel(DaemonCommand::ReloadSettings),
            ActionWithServer::SetPercentageDisplay { enabled } => {
                return with_response_channel(|sender| DaemonCommand::SetPercentageDisplay { enabled, sender });
            }
            ActionWithServer::Notify { package, active } => {
                return with_response_channel(|sender| DaemonCommand::Notify { package, active, sender });
            }
            ActionWithServer::Wake => app::DaemonCommand::Wake,
            ActionWithServer::ShowState { all } => {
                return with_response_channel(|sender| DaemonCommand::PrintState { all, sender });
            }
            ActionWithServer::ShowDebug => return with_response_channel(DaemonCommand::PrintDebug),
            ActionWithServer::KillServer => app::DaemonCommand::KillServer,
        };
        (command, None)
    }
}

fn with_response_channel<O, F>(f: F) -> (O, Option<DaemonResponseReceiver>)
where
    F: FnOnce(daemon_response::DaemonResponseSender) -> O,
{
    let (sender, recv) = daemon_response::create_pair();
    (f(sender), Some(recv))
}
