use crate::error::Result as GardenResult;
use crate::storage::KeyValueStore;
use crate::summary::{completed_summary, pending_summary, progress_percent};
use crate::task::Task;
use crate::task_board::TaskBoard;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Pending,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Interactive state wrapped around a [`TaskBoard`].
pub struct App<S: KeyValueStore> {
    pub board: TaskBoard<S>,
    pub focus: Panel,
    pub selected_pending: usize,
    pub selected_completed: usize,
    pub input_mode: InputMode,
    pub input: String,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(board: TaskBoard<S>) -> Self {
        Self {
            board,
            focus: Panel::Pending,
            selected_pending: 0,
            selected_completed: 0,
            input_mode: InputMode::Normal,
            input: String::new(),
            status: None,
            should_quit: false,
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) {
        match self.input_mode {
            InputMode::Editing => self.handle_editing_key(key),
            InputMode::Normal => self.handle_normal_key(key),
        }
    }

    fn handle_editing_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter => {
                let text = std::mem::take(&mut self.input);
                self.input_mode = InputMode::Normal;
                let result = self.board.add_task(&text);
                if let Some(added) = self.report(result) {
                    if added.is_some() {
                        self.focus = Panel::Pending;
                        self.selected_pending = 0;
                    }
                }
            }
            KeyCode::Esc => {
                self.input.clear();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
    }

    fn handle_normal_key(&mut self, key: KeyCode) {
        self.status = None;
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('a') | KeyCode::Char('i') => self.input_mode = InputMode::Editing,
            KeyCode::Tab
            | KeyCode::Left
            | KeyCode::Right
            | KeyCode::Char('h')
            | KeyCode::Char('l') => {
                self.focus = match self.focus {
                    Panel::Pending => Panel::Completed,
                    Panel::Completed => Panel::Pending,
                };
            }
            KeyCode::Up | KeyCode::Char('k') => {
                let selected = self.selected_mut();
                *selected = selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let len = self.focused_len();
                let selected = self.selected_mut();
                if *selected + 1 < len {
                    *selected += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('x') => self.toggle_selected(),
            KeyCode::Char('r') if self.focus == Panel::Completed => self.toggle_selected(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            _ => {}
        }
    }

    pub fn selected_task(&self) -> Option<&Task> {
        match self.focus {
            Panel::Pending => self.board.pending().get(self.selected_pending),
            Panel::Completed => self.board.completed().get(self.selected_completed),
        }
    }

    fn toggle_selected(&mut self) {
        let Some(id) = self.selected_task().map(|t| t.id.clone()) else {
            return;
        };
        let result = match self.focus {
            Panel::Pending => self.board.complete_task(&id),
            Panel::Completed => self.board.restore_task(&id),
        };
        self.report(result);
        self.clamp_selection();
    }

    fn delete_selected(&mut self) {
        let Some(id) = self.selected_task().map(|t| t.id.clone()) else {
            return;
        };
        let result = match self.focus {
            Panel::Pending => self.board.delete_pending_task(&id),
            Panel::Completed => self.board.delete_completed_task(&id),
        };
        self.report(result);
        self.clamp_selection();
    }

    /// Shows a failed write in the footer. The board keeps the change either way.
    fn report<T>(&mut self, result: GardenResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.status = Some(format!("Could not save tasks: {err}"));
                None
            }
        }
    }

    fn focused_len(&self) -> usize {
        match self.focus {
            Panel::Pending => self.board.pending().len(),
            Panel::Completed => self.board.completed().len(),
        }
    }

    fn selected_mut(&mut self) -> &mut usize {
        match self.focus {
            Panel::Pending => &mut self.selected_pending,
            Panel::Completed => &mut self.selected_completed,
        }
    }

    fn clamp_selection(&mut self) {
        let pending = self.board.pending().len();
        let completed = self.board.completed().len();
        self.selected_pending = self.selected_pending.min(pending.saturating_sub(1));
        self.selected_completed = self.selected_completed.min(completed.saturating_sub(1));
    }
}

pub fn run_app<B: Backend, S: KeyValueStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                app.handle_key(key.code);
            }
        }
        if app.should_quit {
            return Ok(());
        }
    }
}

pub fn draw<S: KeyValueStore>(f: &mut Frame, app: &App<S>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    let pending = app.board.pending().len();
    let completed = app.board.completed().len();

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(pending_summary(pending, completed))
                .borders(Borders::ALL),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .percent(progress_percent(pending, completed));
    f.render_widget(gauge, rows[0]);

    draw_input(f, rows[1], app);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);

    draw_list(
        f,
        columns[0],
        "Pending",
        app.board.pending(),
        "Nothing planted yet. Press 'a' to add a task.",
        app.focus == Panel::Pending,
        app.selected_pending,
    );
    draw_list(
        f,
        columns[1],
        &format!("Completed · {}", completed_summary(completed)),
        app.board.completed(),
        "Finish a task to see it bloom here.",
        app.focus == Panel::Completed,
        app.selected_completed,
    );

    let footer = match &app.status {
        Some(message) => Line::from(Span::styled(message.as_str(), Style::default().fg(Color::Red))),
        None => Line::from(match (app.input_mode, app.focus) {
            (InputMode::Editing, _) => "Enter: plant · Esc: cancel",
            (InputMode::Normal, Panel::Pending) => {
                "a: add · enter: done · d: delete · tab: switch · q: quit"
            }
            (InputMode::Normal, Panel::Completed) => {
                "r: replant · d: delete · tab: switch · q: quit"
            }
        }),
    };
    f.render_widget(Paragraph::new(footer), rows[3]);
}

fn draw_input<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let editing = app.input_mode == InputMode::Editing;
    let style = if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let input = Paragraph::new(app.input.as_str()).style(style).block(
        Block::default()
            .title("New task")
            .borders(Borders::ALL)
            .border_style(style),
    );
    f.render_widget(input, area);
    if editing {
        let typed = u16::try_from(app.input.chars().count()).unwrap_or(u16::MAX);
        let x = area.x.saturating_add(1).saturating_add(typed);
        f.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

fn draw_list(
    f: &mut Frame,
    area: Rect,
    title: &str,
    tasks: &[Task],
    empty: &str,
    focused: bool,
    selected: usize,
) {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        });

    if tasks.is_empty() {
        let placeholder = Paragraph::new(Span::styled(
            empty.to_string(),
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        f.render_widget(placeholder, area);
        return;
    }

    let items: Vec<ListItem> = tasks
        .iter()
        .map(|t| {
            let date = match t.completed_date() {
                Some(done) => format!(" (done {done})"),
                None => format!(" ({})", t.created_date()),
            };
            ListItem::new(Line::from(vec![
                Span::raw(if t.completed { "✓ " } else { "○ " }),
                Span::styled(t.text.clone(), Style::default().fg(Color::White)),
                Span::styled(date, Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(focused.then_some(selected));
    f.render_stateful_widget(list, area, &mut state);
}
