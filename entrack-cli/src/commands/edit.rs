use super::App;
use anyhow::Result;
use colored::Colorize;
use entrack_model::{Person, Project, Team};

pub fn run(app: &mut App, kind: &str, name: &str, field: &str, value: &str) -> Result<()> {
    match kind {
        "project" => {
            let Some(project) = super::find_project(app, name) else {
                anyhow::bail!("no project named '{name}'");
            };
            match field {
                "short_name" => Project::set_short_name(&project, &mut app.history, value),
                "long_name" => Project::set_long_name(&project, &mut app.history, value),
                "description" => Project::set_description(&project, &mut app.history, value),
                other => anyhow::bail!("project has no editable field '{other}'"),
            }
        }
        "person" => {
            let Some(person) = super::find_person(app, name) else {
                anyhow::bail!("no person named '{name}'");
            };
            match field {
                "short_name" => Person::set_short_name(&person, &mut app.history, value),
                "user_id" => Person::set_user_id(&person, &mut app.history, value),
                other => anyhow::bail!("person has no editable field '{other}'"),
            }
        }
        "team" => {
            let Some(team) = super::find_team(app, name) else {
                anyhow::bail!("no team named '{name}'");
            };
            match field {
                "short_name" => Team::set_short_name(&team, &mut app.history, value),
                "description" => Team::set_description(&team, &mut app.history, value),
                other => anyhow::bail!("team has no editable field '{other}'"),
            }
        }
        other => anyhow::bail!("unknown kind '{other}', expected project, person or team"),
    }
    println!("{} {} {}", "Edited".green(), kind, name.bold());
    Ok(())
}
