use super::App;
use anyhow::Result;
use colored::Colorize;

pub fn run(app: &App, json: bool) -> Result<()> {
    let undo = app.history.undo_history();
    let redo = app.history.redo_history();

    if json {
        let value = serde_json::json!({ "undo": undo, "redo": redo });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if undo.is_empty() && redo.is_empty() {
        println!("{}", "No history".yellow());
        return Ok(());
    }

    if !undo.is_empty() {
        println!("{}", "Undo stack (newest first)".bold().cyan());
        for info in &undo {
            println!(
                "  {} {}  {}  {} change(s)",
                "#".yellow(),
                info.number.to_string().yellow(),
                info.message,
                info.change_count.to_string().cyan()
            );
            println!(
                "      {}",
                info.created.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
            );
        }
    }

    if !redo.is_empty() {
        println!("{}", "Redo stack (next first)".bold().cyan());
        for info in &redo {
            println!(
                "  {} {}  {}  {} change(s)",
                "#".yellow(),
                info.number.to_string().yellow(),
                info.message,
                info.change_count.to_string().cyan()
            );
        }
    }
    Ok(())
}
