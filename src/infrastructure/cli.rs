use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

use crate::errors::HaproxyCtlError;
use crate::infrastructure::renderer::OutputFormat;
use crate::model::action::{Action, Command};

#[derive(Parser, Debug)]
#[command(
    name = "haproxyctl",
    version,
    about = "Interact with HAProxy servers via their web admin interface"
)]
pub struct Cli {
    /// Configuration file for your HAProxy nodes
    #[arg(long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output format of the report
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// action [server1,server2 backend]
    #[arg(allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// A validated request from the command line
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Invocation {
    Status,
    Action {
        action: Action,
        servers: Vec<String>,
        backend: String,
    },
}

impl Cli {
    pub fn invocation(&self) -> Result<Invocation, HaproxyCtlError> {
        parse_invocation(self.args.as_slice())
    }
}

/// Validates the positional arguments. Runs before any configuration is read or any request is
/// made.
pub fn parse_invocation(args: &[String]) -> Result<Invocation, HaproxyCtlError> {
    if args.len() != 1 && args.len() != 3 {
        return Err(HaproxyCtlError::UsageError(String::from(
            "Invalid number of arguments, must specify one or three arguments",
        )));
    }

    let command_arg = args[0].to_lowercase();
    if command_arg.is_empty() {
        return Err(HaproxyCtlError::UsageError(String::from(
            "Cannot specify a blank command",
        )));
    }

    let action = match Command::from_str(command_arg.as_str())? {
        Command::Get => return Ok(Invocation::Status),
        Command::Send(action) => action,
    };

    if args.len() != 3 {
        return Err(HaproxyCtlError::UsageError(format!(
            "You must specify at least one server name and a backend when using the '{}' command",
            action
        )));
    }

    let servers: Vec<String> = args[1]
        .to_lowercase()
        .split(',')
        .map(|server| server.trim())
        .filter(|server| !server.is_empty())
        .map(String::from)
        .collect();
    if servers.is_empty() {
        return Err(HaproxyCtlError::UsageError(format!(
            "You must specify at least one server name when using the '{}' command",
            action
        )));
    }

    let backend = args[2].to_lowercase();
    if backend.is_empty() {
        return Err(HaproxyCtlError::UsageError(format!(
            "You must specify a backend when using the '{}' command",
            action
        )));
    }

    Ok(Invocation::Action {
        action,
        servers,
        backend,
    })
}

pub fn usage() -> String {
    let mut text = String::new();
    text.push_str("Usage: haproxyctl [--config config.toml] [--format table|json] action server1,server2 backend\n");
    text.push_str("    --config config.toml - Optional path to the configuration file for your haproxy nodes\n");
    text.push_str("    action - the action to perform (see below for valid actions)\n");
    text.push_str("    server1,server2 - A comma-separated list of back-end servers to perform the action on\n");
    text.push_str("    backend - The name of the backend to apply the action to\n\n");
    text.push_str("Example: haproxyctl get\n");
    text.push_str("Example: haproxyctl ready ny-web01,ny-web02 prod-web\n\n");
    text.push_str("Valid actions are:\n");
    text.push_str(
        format!(
            "    {:<8} - Gets the status of the backends. No additional arguments are required\n",
            Command::GET_CODE
        )
        .as_str(),
    );
    for action in Action::ALL.iter() {
        text.push_str(format!("    {:<8} - {}\n", action.code(), action.description()).as_str());
    }
    text
}
