use std::sync::Arc;

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use tasklist_core::TaskItem;
use tasklist_service::{
    spawn_fetch, FetchHandle, RemoteTaskSource, SyncCoordinator, SyncStep, TaskStore,
};
use tracing::{error, info};

use crate::components::task_list::TaskList;

/// What the app is currently doing
#[derive(Debug, Clone)]
pub enum Mode {
    /// Normal list navigation
    Normal,
    /// Typing a new task name
    NewTask { input: String },
    /// Edit/delete picker for one item
    ItemActions { item: TaskItem },
    /// Editing an item's name
    EditName { item_id: String, input: String },
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

pub struct App {
    store: Box<dyn TaskStore>,
    source: Arc<dyn RemoteTaskSource>,
    sync: SyncCoordinator,
    list: TaskList,
    mode: Mode,
    status_message: Option<StatusMessage>,
    pending_fetch: Option<FetchHandle>,
}

impl App {
    /// Build the app and kick off the first-run import if `sync` asks for it.
    pub fn new(
        store: Box<dyn TaskStore>,
        source: Arc<dyn RemoteTaskSource>,
        sync: SyncCoordinator,
    ) -> Self {
        let mut app = Self {
            store,
            source,
            sync,
            list: TaskList::new(Vec::new()),
            mode: Mode::Normal,
            status_message: None,
            pending_fetch: None,
        };
        app.start_sync();
        app
    }

    fn start_sync(&mut self) {
        match self.sync.start(self.store.as_ref()) {
            Ok(SyncStep::Ready(items)) => self.list.replace(items),
            Ok(SyncStep::Fetch) => {
                // Items added on an earlier failed launch stay visible meanwhile.
                self.refresh();
                info!("starting first-run import");
                self.pending_fetch = Some(spawn_fetch(self.source.clone()));
            }
            Err(e) => {
                error!("failed to load tasks: {e}");
                self.set_error(format!("Load error: {e}"));
            }
        }
    }

    fn refresh(&mut self) {
        match self.store.list_items() {
            Ok(items) => self.list.replace(items),
            Err(e) => {
                error!("failed to reload tasks: {e}");
                self.set_error(format!("Reload error: {e}"));
            }
        }
    }

    fn set_info(&mut self, text: impl Into<String>) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            is_error: false,
        });
    }

    fn set_error(&mut self, text: impl Into<String>) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            is_error: true,
        });
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn items(&self) -> &[TaskItem] {
        self.list.items()
    }

    pub fn selected_item(&self) -> Option<&TaskItem> {
        self.list.selected_item()
    }

    pub fn status_message(&self) -> Option<&StatusMessage> {
        self.status_message.as_ref()
    }

    pub fn is_input_mode(&self) -> bool {
        matches!(self.mode, Mode::NewTask { .. } | Mode::EditName { .. })
    }

    /// Returns true while the import fetch is in flight and the event loop
    /// should poll instead of blocking on input.
    pub fn needs_polling(&self) -> bool {
        self.pending_fetch.is_some()
    }

    /// Apply the fetch result if the worker has reported. Returns true once
    /// the result has been consumed.
    pub fn poll_fetch(&mut self) -> bool {
        let Some(result) = self.pending_fetch.as_ref().and_then(|h| h.try_take()) else {
            return false;
        };
        self.pending_fetch = None;

        match self.sync.complete(self.store.as_ref(), result) {
            Ok(report) => {
                self.refresh();
                let mut text = format!("Imported {} tasks", report.imported);
                if report.skipped > 0 {
                    text.push_str(&format!(" ({} skipped)", report.skipped));
                }
                self.set_info(text);
            }
            Err(e) => {
                error!("first-run import failed: {e}");
                self.refresh();
                self.set_error(format!("Sync failed: {e}"));
            }
        }
        true
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.status_message = None;

        match &self.mode.clone() {
            Mode::Normal => self.handle_normal(key),
            Mode::NewTask { input } => self.handle_new_task(key, input.clone()),
            Mode::ItemActions { item } => self.handle_item_actions(key, item.clone()),
            Mode::EditName { item_id, input } => {
                self.handle_edit_name(key, item_id.clone(), input.clone())
            }
        }
    }

    fn handle_normal(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('n') | KeyCode::Char('a') => {
                self.mode = Mode::NewTask {
                    input: String::new(),
                };
            }
            KeyCode::Enter => {
                if let Some(item) = self.list.selected_item() {
                    self.mode = Mode::ItemActions { item: item.clone() };
                }
            }
            KeyCode::Char(' ') | KeyCode::Char('x') => {
                if let Some(id) = self.list.selected_item().map(|i| i.id.clone()) {
                    self.toggle_item(&id);
                }
            }
            KeyCode::Char('r') => self.refresh(),
            _ => self.list.handle_key(key),
        }
    }

    fn handle_new_task(&mut self, key: KeyEvent, mut input: String) {
        match key.code {
            KeyCode::Enter => {
                let name = input.trim().to_string();
                if !name.is_empty() {
                    match self.store.create_item(&name) {
                        Ok(item) => {
                            self.list.insert_front(item);
                            self.set_info("Task added");
                        }
                        Err(e) => {
                            error!("failed to add task: {e}");
                            self.set_error(format!("Add failed: {e}"));
                        }
                    }
                }
                self.mode = Mode::Normal;
            }
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Backspace => {
                input.pop();
                self.mode = Mode::NewTask { input };
            }
            KeyCode::Char(c) => {
                input.push(c);
                self.mode = Mode::NewTask { input };
            }
            _ => {}
        }
    }

    fn handle_item_actions(&mut self, key: KeyEvent, item: TaskItem) {
        match key.code {
            KeyCode::Char('e') => {
                self.mode = Mode::EditName {
                    input: item.display_name().to_string(),
                    item_id: item.id,
                };
            }
            KeyCode::Char('d') => {
                self.delete_item(&item.id);
                self.mode = Mode::Normal;
            }
            KeyCode::Esc => self.mode = Mode::Normal,
            _ => {}
        }
    }

    fn handle_edit_name(&mut self, key: KeyEvent, item_id: String, mut input: String) {
        match key.code {
            KeyCode::Enter => {
                let name = input.trim().to_string();
                if !name.is_empty() {
                    match self.store.rename_item(&item_id, &name) {
                        Ok(updated) => {
                            self.list.patch(updated);
                            self.set_info("Task updated");
                        }
                        Err(e) => {
                            error!(item_id = %item_id, "failed to rename task: {e}");
                            self.set_error(format!("Edit failed: {e}"));
                        }
                    }
                }
                self.mode = Mode::Normal;
            }
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Backspace => {
                input.pop();
                self.mode = Mode::EditName { item_id, input };
            }
            KeyCode::Char(c) => {
                input.push(c);
                self.mode = Mode::EditName { item_id, input };
            }
            _ => {}
        }
    }

    fn toggle_item(&mut self, id: &str) {
        match self.store.toggle_completed(id) {
            Ok(updated) => {
                self.list.patch(updated);
            }
            Err(e) => {
                error!(item_id = %id, "failed to toggle task: {e}");
                self.set_error(format!("Toggle failed: {e}"));
            }
        }
    }

    fn delete_item(&mut self, id: &str) {
        match self.store.delete_item(id) {
            Ok(()) => {
                self.list.remove(id);
                self.set_info("Task deleted");
            }
            Err(e) => {
                error!(item_id = %id, "failed to delete task: {e}");
                self.set_error(format!("Delete failed: {e}"));
            }
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_title_bar(frame, layout[0]);
        self.list.render(frame, layout[1]);
        self.render_status_bar(frame, layout[2]);

        // Overlays
        match &self.mode {
            Mode::Normal => {}
            Mode::NewTask { input } => self.render_input_bar(frame, " New task ", input, area),
            Mode::ItemActions { item } => self.render_item_actions(frame, item, area),
            Mode::EditName { input, .. } => {
                self.render_input_bar(frame, " Edit task ", input, area)
            }
        }
    }

    fn render_title_bar(&self, frame: &mut Frame, area: Rect) {
        let today = Local::now().format("%A, %B %-d").to_string();
        let summary = format!(
            " | {} done of {}",
            self.list.completed_count(),
            self.list.items().len()
        );
        let title = Line::from(vec![
            Span::styled(" tasklist ", Style::default().bold().fg(Color::Cyan)),
            Span::raw("| "),
            Span::styled(today, Style::default().fg(Color::Yellow)),
            Span::styled(summary, Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(title, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        if let Some(ref msg) = self.status_message {
            let color = if msg.is_error { Color::Red } else { Color::Green };
            let line = Line::from(Span::styled(
                format!(" {}", msg.text),
                Style::default().fg(color),
            ));
            frame.render_widget(line, area);
            return;
        }

        if self.pending_fetch.is_some() && matches!(self.mode, Mode::Normal) {
            let line = Line::from(Span::styled(
                " Fetching tasks...",
                Style::default().fg(Color::Yellow),
            ));
            frame.render_widget(line, area);
            return;
        }

        let hints = match &self.mode {
            Mode::Normal => vec![
                ("q", "quit"),
                ("j/k", "move"),
                ("n", "new"),
                ("Space", "done"),
                ("Enter", "edit/delete"),
                ("r", "reload"),
            ],
            Mode::NewTask { .. } => vec![("Enter", "add"), ("Esc", "cancel")],
            Mode::ItemActions { .. } => vec![("e", "edit"), ("d", "delete"), ("Esc", "cancel")],
            Mode::EditName { .. } => vec![("Enter", "save"), ("Esc", "cancel")],
        };

        let spans: Vec<Span> = hints
            .into_iter()
            .flat_map(|(key, desc)| {
                vec![
                    Span::styled(format!(" {key}"), Style::default().fg(Color::Yellow).bold()),
                    Span::raw(format!(" {desc} ")),
                ]
            })
            .collect();

        frame.render_widget(Line::from(spans), area);
    }

    fn render_input_bar(&self, frame: &mut Frame, label: &str, input: &str, area: Rect) {
        let input_area = Rect {
            x: area.x,
            y: area.y + area.height.saturating_sub(3),
            width: area.width,
            height: 3u16.min(area.height),
        };
        frame.render_widget(Clear, input_area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(label);
        let paragraph = Paragraph::new(input).block(block);
        frame.render_widget(paragraph, input_area);
    }

    fn render_item_actions(&self, frame: &mut Frame, item: &TaskItem, area: Rect) {
        let popup = centered_rect(50, 30, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(" Task ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta));

        let lines = vec![
            Line::from(Span::styled(item.display_name(), Style::default().bold())),
            Line::from(Span::styled(
                item.created_label(),
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("[e] ", Style::default().fg(Color::Yellow).bold()),
                Span::raw("Edit"),
            ]),
            Line::from(vec![
                Span::styled("[d] ", Style::default().fg(Color::Red).bold()),
                Span::raw("Delete"),
            ]),
            Line::from(vec![
                Span::styled("[Esc] ", Style::default().fg(Color::DarkGray)),
                Span::raw("Cancel"),
            ]),
        ];

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, popup);
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
