use crate::cli::actions::{server, Action};
use anyhow::Result;

/// Execute the provided action.
// Single dispatch point for CLI actions; new `Action::*` variants get their
// `execute` call here.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Server(args) => server::execute(args).await,
    }
}
