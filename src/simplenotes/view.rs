use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::controller::DELETE_PROMPT;
use crate::note::Note;

const SIDEBAR_WIDTH: u16 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// label of the toggle, naming the theme it switches to
    pub fn toggle_label(self) -> &'static str {
        match self {
            Theme::Light => "Dark",
            Theme::Dark => "Light",
        }
    }

    fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                bg: Color::White,
                fg: Color::Rgb(40, 44, 52),
                muted: Color::Rgb(93, 109, 126),
                accent: Color::Rgb(25, 118, 210),
                highlight: Color::Rgb(227, 242, 253),
            },
            Theme::Dark => Palette {
                bg: Color::Rgb(24, 26, 31),
                fg: Color::Rgb(230, 230, 230),
                muted: Color::Rgb(150, 150, 150),
                accent: Color::Rgb(100, 181, 246),
                highlight: Color::Rgb(45, 55, 72),
            },
        }
    }
}

struct Palette {
    bg: Color,
    fg: Color,
    muted: Color,
    accent: Color,
    highlight: Color,
}

/// Which widget receives typed keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    List,
    Search,
    Title,
    Body,
}

/// Everything the screen shows, borrowed from the running app.
pub struct Screen<'a> {
    pub notes: &'a [Note],
    pub cursor: usize,
    pub selected_id: Option<&'a str>,
    pub search: &'a str,
    pub draft: Option<&'a Note>,
    pub dirty: bool,
    pub saving: bool,
    pub can_save: bool,
    pub focus: Focus,
    pub theme: Theme,
    /// title of the note a pending delete would remove
    pub confirm_delete: Option<&'a str>,
    pub status: Option<&'a str>,
}

pub fn save_label(saving: bool) -> &'static str {
    if saving {
        "Saving..."
    } else {
        "Save"
    }
}

/// one sidebar row per note, the selected one marked
pub fn sidebar_rows(notes: &[Note], selected_id: Option<&str>) -> Vec<String> {
    notes.iter()
         .map(|n| {
             let marker = if Some(n.id.as_str()) == selected_id { "▸ " } else { "  " };
             format!("{}{}", marker, n.display_title())
         })
         .collect()
}

pub fn draw(f: &mut Frame<'_>, screen: &Screen<'_>) {
    let palette = screen.theme.palette();
    let base = Style::default().bg(palette.bg).fg(palette.fg);
    f.render_widget(Block::default().style(base), f.size());

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(1)])
        .split(f.size());
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(rows[0]);

    draw_sidebar(f, columns[0], screen, &palette);
    draw_editor(f, columns[1], screen, &palette);
    draw_footer(f, rows[1], screen, &palette);

    if let Some(title) = screen.confirm_delete {
        draw_confirm(f, title, &palette);
    }
}

fn focused_border(focused: bool, palette: &Palette) -> Style {
    if focused {
        Style::default().fg(palette.accent)
    } else {
        Style::default().fg(palette.muted)
    }
}

fn draw_sidebar(f: &mut Frame<'_>, area: Rect, screen: &Screen<'_>, palette: &Palette) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let search_text = if screen.search.is_empty() && screen.focus != Focus::Search {
        Span::styled("Search notes...", Style::default().fg(palette.muted))
    } else {
        Span::raw(screen.search)
    };
    let search = Paragraph::new(Line::from(search_text)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focused_border(screen.focus == Focus::Search, palette))
            .title(Span::styled("Notes  [^N +]",
                                Style::default().fg(palette.accent).add_modifier(Modifier::BOLD))),
    );
    f.render_widget(search, parts[0]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focused_border(screen.focus == Focus::List, palette));

    if screen.notes.is_empty() {
        let empty = Paragraph::new(Span::styled("No notes found.", Style::default().fg(palette.muted)))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(empty, parts[1]);
        return;
    }

    let items = sidebar_rows(screen.notes, screen.selected_id)
        .into_iter()
        .zip(screen.notes.iter())
        .map(|(row, note)| {
            let style = if note.title.is_empty() {
                Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC)
            } else {
                Style::default()
            };
            ListItem::new(Span::styled(row, style))
        })
        .collect::<Vec<_>>();
    let mut state = ListState::default();
    state.select(Some(screen.cursor.min(screen.notes.len() - 1)));
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(palette.highlight).add_modifier(Modifier::BOLD));
    f.render_stateful_widget(list, parts[1], &mut state);
}

fn draw_editor(f: &mut Frame<'_>, area: Rect, screen: &Screen<'_>, palette: &Palette) {
    let draft = match screen.draft {
        Some(d) => d,
        None => {
            let welcome = Paragraph::new(vec![
                Line::from(Span::styled("Welcome to Simple Notes!",
                                        Style::default().add_modifier(Modifier::BOLD))),
                Line::from(""),
                Line::from(Span::styled("Select or create a note to get started.",
                                        Style::default().fg(palette.muted))),
            ])
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(palette.muted)));
            f.render_widget(welcome, area);
            return;
        }
    };

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let title_text = if draft.title.is_empty() && screen.focus != Focus::Title {
        Span::styled("Title", Style::default().fg(palette.muted))
    } else {
        Span::styled(draft.title.as_str(), Style::default().add_modifier(Modifier::BOLD))
    };
    let title = Paragraph::new(Line::from(title_text)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focused_border(screen.focus == Focus::Title, palette)),
    );
    f.render_widget(title, parts[0]);

    let body = if draft.body.is_empty() && screen.focus != Focus::Body {
        Paragraph::new(Span::styled("Write your note here...", Style::default().fg(palette.muted)))
    } else {
        Paragraph::new(draft.body.as_str()).wrap(Wrap { trim: false })
    };
    let body = body.block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focused_border(screen.focus == Focus::Body, palette)),
    );
    f.render_widget(body, parts[1]);

    let save_style = if screen.can_save {
        Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.muted)
    };
    let mut status = vec![Span::styled(format!("[^S {}]", save_label(screen.saving)), save_style)];
    if screen.dirty {
        status.push(Span::styled("  modified", Style::default().fg(palette.muted)));
    }
    f.render_widget(Paragraph::new(Line::from(status)).alignment(Alignment::Right), parts[2]);
}

fn draw_footer(f: &mut Frame<'_>, area: Rect, screen: &Screen<'_>, palette: &Palette) {
    let text = match screen.status {
        Some(s) => s.to_string(),
        None => format!("^N new  ^S save  ^D delete  ^F search  Tab focus  ^T {}  ^Q quit",
                        screen.theme.toggle_label()),
    };
    f.render_widget(Paragraph::new(Span::styled(text, Style::default().fg(palette.muted))), area);
}

fn draw_confirm(f: &mut Frame<'_>, title: &str, palette: &Palette) {
    let area = centered_rect(40, 20, f.size());
    let prompt = Paragraph::new(vec![
        Line::from(Span::styled(DELETE_PROMPT, Style::default().add_modifier(Modifier::BOLD))),
        Line::from(title),
        Line::from(""),
        Line::from("[y] yes   [n] no"),
    ])
    .alignment(Alignment::Center)
    .style(Style::default().bg(palette.bg).fg(palette.fg))
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(palette.accent)));
    f.render_widget(Clear, area);
    f.render_widget(prompt, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
