use super::App;
use anyhow::Result;
use colored::Colorize;
use entrack_model::Organisation;

pub fn run(app: &mut App, kind: &str, name: &str) -> Result<()> {
    match kind {
        "project" => {
            let Some(project) = super::find_project(app, name) else {
                anyhow::bail!("no project named '{name}'");
            };
            Organisation::remove_project(&app.org, &mut app.history, &project)?;
        }
        "person" => {
            let Some(person) = super::find_person(app, name) else {
                anyhow::bail!("no person named '{name}'");
            };
            Organisation::remove_person(&app.org, &mut app.history, &person)?;
        }
        "team" => {
            let Some(team) = super::find_team(app, name) else {
                anyhow::bail!("no team named '{name}'");
            };
            Organisation::remove_team(&app.org, &mut app.history, &team)?;
        }
        other => anyhow::bail!("unknown kind '{other}', expected project, person or team"),
    }
    println!("{} {} {}", "Removed".red(), kind, name.bold());
    Ok(())
}
