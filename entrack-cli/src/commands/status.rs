use super::App;
use anyhow::Result;
use colored::Colorize;

pub fn run(app: &App) -> Result<()> {
    let org = app.org.borrow();
    println!("{} {}", "Organisation".bold().cyan(), org.short_name.bold());

    let projects = org.projects();
    println!("{}", format!("Projects ({})", projects.len()).bold());
    for project in &projects {
        let project = project.borrow();
        if project.description.is_empty() {
            println!("  • {}", project.short_name);
        } else {
            println!(
                "  • {}  {}",
                project.short_name,
                project.description.dimmed()
            );
        }
    }

    let people = org.people();
    println!("{}", format!("People ({})", people.len()).bold());
    for person in &people {
        let person = person.borrow();
        println!("  • {} ({})", person.short_name, person.user_id.dimmed());
    }

    let teams = org.teams();
    println!("{}", format!("Teams ({})", teams.len()).bold());
    for team in &teams {
        let team = team.borrow();
        let members: Vec<String> = team
            .members
            .iter()
            .filter_map(|m| m.downcast::<entrack_model::Person>())
            .map(|p| p.borrow().short_name.clone())
            .collect();
        println!("  • {} [{}]", team.short_name, members.join(", ").dimmed());
    }

    println!();
    match app.history.revert_message() {
        Some(message) => println!("{}: {}", "Next undo".bold(), message),
        None => println!("{}: {}", "Next undo".bold(), "nothing".dimmed()),
    }
    match app.history.remake_message() {
        Some(message) => println!("{}: {}", "Next redo".bold(), message),
        None => println!("{}: {}", "Next redo".bold(), "nothing".dimmed()),
    }
    println!(
        "{}: {}",
        "Tracked entities".bold(),
        app.history.entities().len().to_string().cyan()
    );
    Ok(())
}
