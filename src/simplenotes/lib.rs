pub mod args;
pub mod clock;
pub mod config;
pub mod controller;
pub mod crypt;
pub mod errors;
pub mod lineformat;
pub mod logging;
pub mod note;
pub mod storage;
pub mod store;
pub mod tui;
pub mod utils;
pub mod view;

use std::time::Instant;

use clap::Parser;
use log::info;

use args::{Cli, Commands};
use config::Config;
use controller::{Controller, Field};
use errors::Result;
use note::Note;
use store::NoteStore;
use utils::{drop_to_editor, get_yn_input, localize_millis, pretty_line, print_notes,
            stdin_is_tty, stdout_is_tty, ListFlags, OutputFormat};

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_cli(&cli)?;
    if let Err(e) = logging::init_logging(&config.log_level, &config.log_dir) {
        eprintln!("warning: logging disabled: {}", e);
    }
    let store = config.open_store()?;
    info!("event=command name={}", command_name(&cli.command));

    match &cli.command {
        Some(Commands::Add { title, body, editor }) => {
            let body = if *editor && stdin_is_tty() && stdout_is_tty() {
                drop_to_editor(body)?
            } else {
                body.clone()
            };
            let mut controller = Controller::new(store);
            let note = controller.add_note();
            controller.edit_field(Field::Title, &title.replace('\n', ""));
            controller.edit_field(Field::Body, &body);
            commit_draft(&mut controller)?;
            println!("note {} added", note.id);
        }
        Some(Commands::Edit { id, title, body, editor }) => {
            let mut controller = Controller::new(store);
            controller.select_note(id);
            let current_body = match controller.draft() {
                Some(d) => d.body.clone(),
                None => return specific_fail!(format!("note {} doesn't exist", id)),
            };
            if let Some(t) = title {
                controller.edit_field(Field::Title, &t.replace('\n', ""));
            }
            if let Some(b) = body {
                controller.edit_field(Field::Body, b);
            } else if *editor && stdin_is_tty() && stdout_is_tty() {
                let new_body = drop_to_editor(&current_body)?;
                if new_body != current_body {
                    controller.edit_field(Field::Body, &new_body);
                }
            }
            commit_draft(&mut controller)?;
            println!("edited note {}", id);
        }
        Some(Commands::Del { id }) => {
            let mut controller = Controller::new(store);
            let yes = config.yes;
            for nid in id.iter() {
                let title = match controller.store().get(nid) {
                    Some(n) => n.display_title().to_string(),
                    None => {
                        println!("note {} doesn't exist", nid);
                        continue;
                    }
                };
                let mut confirm = |prompt: &str| {
                    yes || get_yn_input(&format!("{} ({})\n", prompt, title)).unwrap_or(false)
                };
                if controller.delete_note(nid, &mut confirm) {
                    println!("deleted note {}", nid);
                } else {
                    println!("kept note {}", nid);
                }
            }
            controller.with_store(|s| s.sync())?;
        }
        Some(Commands::List { limit, condensed, format }) => {
            let flags = ListFlags {
                format: format.format(),
                condensed: *condensed,
                show_body: false,
            };
            list_or_empty(store.notes(), limit.unwrap_or(0), flags, "no notes yet")?;
        }
        Some(Commands::Search { term, regex, show_body, limit, format }) => {
            let notes = if *regex {
                store.search_regex(term)?
            } else {
                store.search(term)
            };
            let flags = ListFlags {
                format: format.format(),
                condensed: false,
                show_body: *show_body,
            };
            list_or_empty(&notes, limit.unwrap_or(0), flags, "nothing found")?;
        }
        Some(Commands::Show { id, format }) => {
            match store.get(id) {
                Some(note) => show_note(note, format.format())?,
                None => return specific_fail!(format!("note {} doesn't exist", id)),
            }
        }
        Some(Commands::Info) => info_slot(&store, &config)?,
        Some(Commands::Clear) => {
            let mut store = store;
            if !config.yes {
                let message = "are you sure you want to delete all the notes?\n";
                if !get_yn_input(message)? {
                    return specific_fail_str!("ok bye ♥");
                }
            }
            store.clear();
            store.sync()?;
        }
        Some(Commands::Tui) => run_tui(store)?,
        None => {
            if stdout_is_tty() && stdin_is_tty() {
                run_tui(store)?;
            } else {
                list_or_empty(store.notes(), 0, ListFlags::default(), "no notes yet")?;
            }
        }
    }

    Ok(())
}

fn command_name(command: &Option<Commands>) -> &'static str {
    match command {
        Some(Commands::Tui) | None => "tui",
        Some(Commands::Add { .. }) => "add",
        Some(Commands::Edit { .. }) => "edit",
        Some(Commands::Del { .. }) => "del",
        Some(Commands::List { .. }) => "list",
        Some(Commands::Search { .. }) => "search",
        Some(Commands::Show { .. }) => "show",
        Some(Commands::Info) => "info",
        Some(Commands::Clear) => "clear",
    }
}

/// Save the draft the way the editor does, without waiting out the delay.
fn commit_draft(controller: &mut Controller) -> Result<()> {
    controller.save(Instant::now());
    controller.flush();
    controller.with_store(|s| s.sync())
}

fn run_tui(store: NoteStore) -> Result<()> {
    let mut controller = tui::run(Controller::new(store))?;
    controller.with_store(|s| s.sync())
}

fn list_or_empty(notes: &[Note], limit: usize, flags: ListFlags, empty_msg: &str) -> Result<()> {
    if notes.is_empty() && flags.format == OutputFormat::Table {
        println!("{}", empty_msg);
        Ok(())
    } else {
        print_notes(notes, limit, flags)
    }
}

fn show_note(note: &Note, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(note)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(note)?),
        OutputFormat::Table => {
            let tty = stdout_is_tty();
            pretty_line("id\n--\n", &format!("{}\n\n", note.id), tty)?;
            pretty_line("title\n-----\n", &format!("{}\n\n", note.display_title()), tty)?;
            pretty_line("created\n-------\n", &format!("{}\n\n", localize_millis(note.created)), tty)?;
            pretty_line("last updated\n------------\n",
                        &format!("{}\n\n", localize_millis(note.updated)),
                        tty)?;
            if !note.body.is_empty() {
                pretty_line("body\n----\n", &format!("{}\n\n", note.body), tty)?;
            }
        }
    }
    Ok(())
}

fn info_slot(store: &NoteStore, config: &Config) -> Result<()> {
    let tty = stdout_is_tty();
    let stats = store.stats();
    pretty_line("slot: ", &format!("{}\n", config.slot), tty)?;
    pretty_line("location: ", &format!("{}\n", store.describe()), tty)?;
    pretty_line("encrypted: ", &format!("{}\n", config.encrypted), tty)?;
    pretty_line("notes: ", &format!("{}\n", stats.count), tty)?;
    if let (Some(oldest), Some(newest)) = (stats.oldest_created, stats.newest_updated) {
        pretty_line("note ages: ",
                    &format!("oldest: {}, last change: {}\n",
                             localize_millis(oldest),
                             localize_millis(newest)),
                    tty)?;
    }
    if let Some(issue) = store.load_issue() {
        pretty_line("load warning: ", &format!("{}\n", issue), tty)?;
    }
    Ok(())
}
