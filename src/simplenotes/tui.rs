use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use log::{info, warn};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::controller::{Controller, Field};
use crate::errors::Result;
use crate::note::Note;
use crate::view::{self, Focus, Screen, Theme};

/// How long to wait for input before checking on deferred saves.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct App {
    controller: Controller,
    focus: Focus,
    theme: Theme,
    cursor: usize,
    confirm_delete: Option<String>,
    status: Option<String>,
    quit: bool,
}

impl App {
    pub fn new(controller: Controller) -> App {
        let mut app = App {
            controller: controller,
            focus: Focus::List,
            theme: Theme::default(),
            cursor: 0,
            confirm_delete: None,
            status: None,
            quit: false,
        };
        app.follow_selection();
        app
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn into_controller(self) -> Controller {
        self.controller
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn confirming_delete(&self) -> Option<&str> {
        self.confirm_delete.as_deref()
    }

    /// title shown in the delete modal, taken from the note it will remove
    pub fn delete_target_title(&self) -> Option<String> {
        let id = self.confirm_delete.as_deref()?;
        self.controller.store().get(id).map(|n| n.display_title().to_string())
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Move the list cursor onto the selected note, if it is visible.
    fn follow_selection(&mut self) {
        let visible = self.controller.visible_notes();
        if let Some(id) = self.controller.selected_id() {
            if let Some(pos) = visible.iter().position(|n| n.id == id) {
                self.cursor = pos;
                return;
            }
        }
        self.cursor = self.cursor.min(visible.len().saturating_sub(1));
    }

    fn note_under_cursor(&self) -> Option<Note> {
        self.controller.visible_notes().into_iter().nth(self.cursor)
    }

    /// Let deferred saves complete.
    pub fn tick(&mut self, now: Instant) {
        if self.controller.tick(now) > 0 {
            if let Some(e) = self.controller.store().persist_error() {
                self.status = Some(format!("could not write notes: {}", e));
            }
            self.follow_selection();
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        self.status = None;

        if let Some(id) = self.confirm_delete.take() {
            let answer = match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => true,
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => false,
                _ => {
                    self.confirm_delete = Some(id);
                    return;
                }
            };
            if self.controller.delete_note(&id, &mut |_: &str| answer) {
                self.follow_selection();
            }
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('q') | KeyCode::Char('c') => self.quit = true,
                KeyCode::Char('n') => {
                    self.controller.add_note();
                    self.follow_selection();
                    self.focus = Focus::Title;
                }
                KeyCode::Char('s') => {
                    if self.controller.can_save() {
                        self.controller.save(now);
                    }
                }
                KeyCode::Char('d') => self.ask_delete(),
                KeyCode::Char('f') => self.focus = Focus::Search,
                KeyCode::Char('t') => self.theme = self.theme.toggled(),
                _ => {}
            }
            return;
        }

        if key.code == KeyCode::Tab {
            self.focus = match self.focus {
                Focus::List | Focus::Search => Focus::Title,
                Focus::Title => Focus::Body,
                Focus::Body => Focus::List,
            };
            if self.controller.draft().is_none() {
                self.focus = Focus::List;
            }
            return;
        }

        match self.focus {
            Focus::List => self.list_key(key),
            Focus::Search => self.search_key(key),
            Focus::Title => self.field_key(Field::Title, key),
            Focus::Body => self.field_key(Field::Body, key),
        }
    }

    fn ask_delete(&mut self) {
        if let Some(note) = self.note_under_cursor() {
            self.confirm_delete = Some(note.id);
        }
    }

    fn list_key(&mut self, key: KeyEvent) {
        let count = self.controller.visible_notes().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + 1 < count {
                    self.cursor += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(note) = self.note_under_cursor() {
                    self.controller.select_note(&note.id);
                    self.focus = Focus::Title;
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => self.ask_delete(),
            KeyCode::Char('/') => self.focus = Focus::Search,
            KeyCode::Esc | KeyCode::Char('q') => self.quit = true,
            _ => {}
        }
    }

    fn search_key(&mut self, key: KeyEvent) {
        let mut term = self.controller.search().to_string();
        match key.code {
            KeyCode::Char(c) => term.push(c),
            KeyCode::Backspace => {
                term.pop();
            }
            KeyCode::Esc | KeyCode::Enter => {
                self.focus = Focus::List;
                return;
            }
            _ => return,
        }
        self.controller.set_search(&term);
        self.cursor = 0;
        self.follow_selection();
    }

    fn field_key(&mut self, field: Field, key: KeyEvent) {
        let current = match self.controller.draft() {
            Some(d) => match field {
                Field::Title => d.title.clone(),
                Field::Body => d.body.clone(),
            },
            None => {
                self.focus = Focus::List;
                return;
            }
        };
        let mut value = current;
        match key.code {
            KeyCode::Char(c) => value.push(c),
            KeyCode::Backspace => {
                value.pop();
            }
            KeyCode::Enter if field == Field::Title => {
                self.focus = Focus::Body;
                return;
            }
            KeyCode::Enter => value.push('\n'),
            KeyCode::Esc => {
                self.focus = Focus::List;
                return;
            }
            _ => return,
        }
        self.controller.edit_field(field, &value);
    }

    pub fn draw(&self, f: &mut ratatui::Frame<'_>) {
        let notes = self.controller.visible_notes();
        let target = self.delete_target_title();
        let screen = Screen {
            notes: &notes,
            cursor: self.cursor,
            selected_id: self.controller.selected_id(),
            search: self.controller.search(),
            draft: self.controller.draft(),
            dirty: self.controller.selection().is_dirty(),
            saving: self.controller.saving(),
            can_save: self.controller.can_save(),
            focus: self.focus,
            theme: self.theme,
            confirm_delete: target.as_deref(),
            status: self.status.as_deref(),
        };
        view::draw(f, &screen);
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        while !self.quit {
            terminal.draw(|f| self.draw(f))?;
            if event::poll(POLL_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key, Instant::now());
                }
            }
            self.tick(Instant::now());
        }
        Ok(())
    }
}

/// Run the terminal UI until the user quits. Saves still in flight are
/// committed before returning.
pub fn run(controller: Controller) -> Result<Controller> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(controller);
    info!("event=tui_start notes={}", app.controller.store().len());
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result?;

    let mut controller = app.into_controller();
    let flushed = controller.flush();
    if flushed > 0 {
        warn!("event=tui_exit committed_on_exit={}", flushed);
    }
    info!("event=tui_exit notes={}", controller.store().len());
    Ok(controller)
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
