use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::errors::HaproxyCtlError;

/// Admin verbs understood by the HAProxy stats page admin form
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Action {
    SetStateToReady,
    SetStateToDrain,
    SetStateToMaint,
    HealthDisableChecks,
    HealthEnableChecks,
    HealthForceUp,
    HealthForceNoLb,
    HealthForceDown,
    AgentDisableChecks,
    AgentEnableChecks,
    AgentForceUp,
    AgentForceDown,
    KillSessions,
}

impl Action {
    pub const ALL: [Action; 13] = [
        Action::SetStateToReady,
        Action::SetStateToDrain,
        Action::SetStateToMaint,
        Action::HealthDisableChecks,
        Action::HealthEnableChecks,
        Action::HealthForceUp,
        Action::HealthForceNoLb,
        Action::HealthForceDown,
        Action::AgentDisableChecks,
        Action::AgentEnableChecks,
        Action::AgentForceUp,
        Action::AgentForceDown,
        Action::KillSessions,
    ];

    /// The code sent as the `action` form field
    pub fn code(&self) -> &'static str {
        match self {
            Action::SetStateToReady => "ready",
            Action::SetStateToDrain => "drain",
            Action::SetStateToMaint => "maint",
            Action::HealthDisableChecks => "dhlth",
            Action::HealthEnableChecks => "ehlth",
            Action::HealthForceUp => "hrunn",
            Action::HealthForceNoLb => "hnolb",
            Action::HealthForceDown => "hdown",
            Action::AgentDisableChecks => "dagent",
            Action::AgentEnableChecks => "eagent",
            Action::AgentForceUp => "arunn",
            Action::AgentForceDown => "adown",
            Action::KillSessions => "shutdown",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Action::SetStateToReady => "Sets the server state to 'ready'",
            Action::SetStateToDrain => "Sets the server state to 'drain'",
            Action::SetStateToMaint => "Sets the server state to 'maintenance'",
            Action::HealthDisableChecks => "Disables health checks",
            Action::HealthEnableChecks => "Enables health checks",
            Action::HealthForceUp => "Forces the server to be UP",
            Action::HealthForceNoLb => "Forces the server to disable load balancing",
            Action::HealthForceDown => "Forces the server to be DOWN",
            Action::AgentDisableChecks => "Disables agent checks",
            Action::AgentEnableChecks => "Enables agent checks",
            Action::AgentForceUp => "Forces agent to be UP",
            Action::AgentForceDown => "Forces agent to be DOWN",
            Action::KillSessions => "Kills all sessions",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Action {
    type Err = HaproxyCtlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.to_lowercase();
        Action::ALL
            .iter()
            .find(|action| action.code() == code)
            .copied()
            .ok_or_else(|| HaproxyCtlError::UsageError(format!("Invalid command specified ({})", s)))
    }
}

/// What the user asked for: a status report, or an admin action
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Get,
    Send(Action),
}

impl Command {
    pub const GET_CODE: &'static str = "get";
}

impl FromStr for Command {
    type Err = HaproxyCtlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case(Command::GET_CODE) {
            Ok(Command::Get)
        } else {
            Action::from_str(s).map(Command::Send)
        }
    }
}

/// HAProxy's verdict on an admin form submission, read from the redirect it answers with
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ActionOutcome {
    /// Applied to every server
    Done,
    /// Applied to some servers only
    Partial,
    /// Nothing changed
    NoChange,
    /// The status token is not one we know
    Unknown(String),
    /// The `Location` value did not carry a single `key=token` pair
    Unrecognised(String),
}

/// Classifies the `Location` header of the 303 answering an admin POST, e.g.
/// `/haproxy;st=DONE`.
pub fn classify_location(location: &str) -> ActionOutcome {
    let parts: Vec<&str> = location.split('=').collect();
    match parts.as_slice() {
        [_, "DONE"] => ActionOutcome::Done,
        [_, "PART"] => ActionOutcome::Partial,
        [_, "NONE"] => ActionOutcome::NoChange,
        [_, token] => ActionOutcome::Unknown(token.to_string()),
        _ => ActionOutcome::Unrecognised(location.to_string()),
    }
}

/// Result of one admin action against one load balancer
#[derive(Debug)]
pub struct ActionResult {
    pub done: bool,
    pub all_ok: bool,
    pub error: Option<HaproxyCtlError>,
}

impl ActionResult {
    pub fn failed(error: HaproxyCtlError) -> Self {
        ActionResult {
            done: false,
            all_ok: false,
            error: Some(error),
        }
    }
}

impl From<ActionOutcome> for ActionResult {
    fn from(outcome: ActionOutcome) -> Self {
        let (done, all_ok, message) = match outcome {
            ActionOutcome::Done => (true, true, None),
            ActionOutcome::Partial => (true, false, Some(String::from("partially applied"))),
            ActionOutcome::NoChange => (true, false, Some(String::from("no changes were applied"))),
            ActionOutcome::Unknown(token) => (false, false, Some(format!("haproxy response: {}", token))),
            ActionOutcome::Unrecognised(location) => {
                (false, false, Some(format!("unrecognised response: {}", location)))
            }
        };

        ActionResult {
            done,
            all_ok,
            error: message.map(HaproxyCtlError::ActionOutcomeError),
        }
    }
}
