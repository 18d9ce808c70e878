use super::App;
use anyhow::Result;
use colored::Colorize;

pub fn run(app: &mut App) -> Result<()> {
    app.history.forget();
    println!("{}", "History discarded, entity state kept".yellow());
    Ok(())
}
