use super::App;
use anyhow::Result;
use colored::Colorize;
use entrack_model::Team;

pub fn run(app: &mut App, action: &str, team_name: &str, person_name: &str) -> Result<()> {
    let Some(team) = super::find_team(app, team_name) else {
        anyhow::bail!("no team named '{team_name}'");
    };
    let Some(person) = super::find_person(app, person_name) else {
        anyhow::bail!("no person named '{person_name}'");
    };

    match action {
        "add" => {
            Team::add_member(&team, &mut app.history, &person);
            println!(
                "{} {} to {}",
                "Added".green(),
                person_name.bold(),
                team_name.bold()
            );
        }
        "drop" => {
            Team::remove_member(&team, &mut app.history, &person);
            println!(
                "{} {} from {}",
                "Dropped".red(),
                person_name.bold(),
                team_name.bold()
            );
        }
        other => anyhow::bail!("unknown member action '{other}', expected add or drop"),
    }
    Ok(())
}
