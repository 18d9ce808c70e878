use super::App;
use anyhow::Result;
use colored::Colorize;
use entrack_core::Error;

pub fn undo(app: &mut App) -> Result<()> {
    let Some(message) = app.history.revert_message().map(str::to_string) else {
        println!("{}", "Nothing to undo".yellow());
        return Ok(());
    };
    match app.history.revert() {
        Ok(()) => println!("{} {}", "Undid".cyan(), message),
        Err(err @ Error::ReplayFailed(_)) => discard(app, err),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

pub fn redo(app: &mut App) -> Result<()> {
    let Some(message) = app.history.remake_message().map(str::to_string) else {
        println!("{}", "Nothing to redo".yellow());
        return Ok(());
    };
    match app.history.remake() {
        Ok(()) => println!("{} {}", "Redid".cyan(), message),
        Err(err @ Error::ReplayFailed(_)) => discard(app, err),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

/// Replay failed part way, so the remaining history cannot be trusted.
fn discard(app: &mut App, err: Error) {
    app.history.forget();
    println!("{} {err}; history discarded", "warning:".yellow());
}
