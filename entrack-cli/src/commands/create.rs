use super::App;
use anyhow::Result;
use colored::Colorize;
use entrack_model::{Organisation, Person, Project, Team};

pub fn run(app: &mut App, kind: &str, name: &str) -> Result<()> {
    match kind {
        "project" => {
            Organisation::create_project(&app.org, &mut app.history, Project::new(name))?;
        }
        "person" => {
            Organisation::create_person(&app.org, &mut app.history, Person::new(name, name))?;
        }
        "team" => {
            Organisation::create_team(&app.org, &mut app.history, Team::new(name))?;
        }
        other => {
            anyhow::bail!("unknown kind '{other}', expected project, person or team");
        }
    }
    println!("{} {} {}", "Created".green(), kind, name.bold());
    Ok(())
}
