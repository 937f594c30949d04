//! Side-effecting tools the completion API may invoke.
//!
//! Tool calls arrive as an untyped name + argument map. Validation converts
//! them into one of a closed set of [`ToolInvocation`] variants, each
//! carrying a strongly-typed argument struct; dispatch is a match over the
//! variant. A call that fails validation is never executed, not even
//! partially.

pub mod calendar;
pub mod email;
pub mod registry;
pub mod schema;

use serde::Deserialize;

/// Arguments for the `send_email` tool.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SendEmailArgs {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Arguments for the `schedule_event` tool.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScheduleEventArgs {
    pub title: String,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A validated tool call, ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInvocation {
    SendEmail(SendEmailArgs),
    ScheduleEvent(ScheduleEventArgs),
}

impl ToolInvocation {
    /// Name of the tool this invocation targets.
    pub fn tool_name(&self) -> &'static str {
        match self {
            ToolInvocation::SendEmail(_) => "send_email",
            ToolInvocation::ScheduleEvent(_) => "schedule_event",
        }
    }
}
