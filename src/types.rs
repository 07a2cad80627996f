use std::str::FromStr;

use serde::Deserialize;

/// How a failing leaf task affects the process.
///
/// - `OneShot`: report, then terminate with a non-zero status.
/// - `Watch`: report and keep going so the watch loop survives the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    OneShot,
    Watch,
}

/// Behaviour when file changes arrive while a rebuild is already in progress.
///
/// - `Queue`: remember the change and run exactly one more rebuild when the
///   current one finishes, however many changes arrived (default).
/// - `Drop`: ignore changes that arrive while a rebuild is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerWhileRunningBehaviour {
    Queue,
    Drop,
}

impl Default for TriggerWhileRunningBehaviour {
    fn default() -> Self {
        TriggerWhileRunningBehaviour::Queue
    }
}

impl FromStr for TriggerWhileRunningBehaviour {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "queue" => Ok(TriggerWhileRunningBehaviour::Queue),
            "drop" => Ok(TriggerWhileRunningBehaviour::Drop),
            other => Err(format!(
                "invalid triggered_while_running_behaviour: {other} (expected \"queue\" or \"drop\")"
            )),
        }
    }
}
