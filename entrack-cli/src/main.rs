use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use dialoguer::Input;
use entrack_core::{ChangeListener, ChangeState, HistoryManager};
use entrack_model::{as_handle, Organisation};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::App;

#[derive(Parser)]
#[command(name = "entrack")]
#[command(version, about = "Interactive undo/redo demo on a tracked entity graph", long_about = None)]
struct Cli {
    /// Organisation name for the session
    #[arg(short, long, default_value = "demo")]
    org: String,

    /// Maximum undo depth (unlimited when omitted)
    #[arg(short, long)]
    depth: Option<usize>,
}

/// Prints a one-line notice whenever history changes shape.
struct StateNotifier;

impl ChangeListener for StateNotifier {
    fn on_change(&self, state: ChangeState) {
        let label = match state {
            ChangeState::Commit => "committed",
            ChangeState::Revert => "reverted",
            ChangeState::Remake => "remade",
            ChangeState::Forget => "history forgotten",
        };
        println!("{}", format!("[{label}]").dimmed());
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let org = Rc::new(RefCell::new(Organisation::new(&cli.org)));
    let mut history = HistoryManager::new();
    history.set_maximum_depth(cli.depth);
    history.import_baseline(&[as_handle(&org)])?;

    let notifier: Rc<dyn ChangeListener> = Rc::new(StateNotifier);
    history.add_listener(&notifier);

    let mut app = App { history, org };
    info!(org = %cli.org, depth = ?cli.depth, "session started");

    println!(
        "{} organisation {}. Type {} for commands.",
        "Tracking".green().bold(),
        cli.org.bold(),
        "help".cyan()
    );

    loop {
        let line: String = Input::new()
            .with_prompt("entrack".green().to_string())
            .allow_empty(true)
            .interact_text()?;
        let tokens: Vec<&str> = line.split_whitespace().collect();

        let result = match tokens.as_slice() {
            [] => Ok(()),
            ["quit"] | ["exit"] => break,
            ["help"] => {
                print_help();
                Ok(())
            }
            ["create", kind, name] => commands::create::run(&mut app, kind, name),
            ["edit", kind, name, field, value @ ..] if !value.is_empty() => {
                commands::edit::run(&mut app, kind, name, field, &value.join(" "))
            }
            ["remove", kind, name] => commands::remove::run(&mut app, kind, name),
            ["member", action, team, person] => {
                commands::member::run(&mut app, action, team, person)
            }
            ["undo"] => commands::undo::undo(&mut app),
            ["redo"] => commands::undo::redo(&mut app),
            ["history"] => commands::history::run(&app, false),
            ["history", "--json"] => commands::history::run(&app, true),
            ["status"] => commands::status::run(&app),
            ["forget"] => commands::forget::run(&mut app),
            _ => {
                println!(
                    "{} unrecognised command, type {} for usage",
                    "error:".red(),
                    "help".cyan()
                );
                Ok(())
            }
        };

        if let Err(err) = result {
            println!("{} {err:#}", "error:".red());
        }
    }

    Ok(())
}

fn print_help() {
    println!("{}", "Commands".bold().cyan());
    println!("  create <project|person|team> <name>");
    println!("  edit <project|person|team> <name> <field> <value>");
    println!("  remove <project|person|team> <name>");
    println!("  member <add|drop> <team> <person>");
    println!("  undo | redo");
    println!("  history [--json]");
    println!("  status");
    println!("  forget");
    println!("  quit");
}
