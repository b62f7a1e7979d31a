use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};
use tasklist_core::TaskItem;

/// In-memory mirror of the store, newest first, with a cursor.
///
/// Only fed with rows the store has already confirmed.
pub struct TaskList {
    items: Vec<TaskItem>,
    list_state: ListState,
}

impl TaskList {
    pub fn new(items: Vec<TaskItem>) -> Self {
        let mut list_state = ListState::default();
        if !items.is_empty() {
            list_state.select(Some(0));
        }
        Self { items, list_state }
    }

    pub fn items(&self) -> &[TaskItem] {
        &self.items
    }

    pub fn selected_item(&self) -> Option<&TaskItem> {
        let idx = self.list_state.selected()?;
        self.items.get(idx)
    }

    /// Replace the whole snapshot, keeping the cursor on the same item when
    /// it still exists.
    pub fn replace(&mut self, items: Vec<TaskItem>) {
        let selected_id = self.selected_item().map(|i| i.id.clone());
        self.items = items;
        let found = selected_id.is_some_and(|id| self.select_by_id(&id));
        if !found {
            self.clamp_selection();
        }
    }

    /// Put a freshly created item on top and select it.
    pub fn insert_front(&mut self, item: TaskItem) {
        self.items.insert(0, item);
        self.list_state.select(Some(0));
    }

    /// Swap in the stored version of an item. Returns the row index.
    pub fn patch(&mut self, item: TaskItem) -> Option<usize> {
        let idx = self.items.iter().position(|i| i.id == item.id)?;
        self.items[idx] = item;
        Some(idx)
    }

    pub fn remove(&mut self, id: &str) -> Option<TaskItem> {
        let idx = self.items.iter().position(|i| i.id == id)?;
        let removed = self.items.remove(idx);
        self.clamp_selection();
        Some(removed)
    }

    pub fn select_by_id(&mut self, id: &str) -> bool {
        match self.items.iter().position(|i| i.id == id) {
            Some(idx) => {
                self.list_state.select(Some(idx));
                true
            }
            None => false,
        }
    }

    fn clamp_selection(&mut self) {
        if self.items.is_empty() {
            self.list_state.select(None);
        } else {
            let idx = self.list_state.selected().unwrap_or(0);
            self.list_state.select(Some(idx.min(self.items.len() - 1)));
        }
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_completed).count()
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.items.is_empty() {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if current + 1 < self.items.len() {
                    self.list_state.select(Some(current + 1));
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if current > 0 {
                    self.list_state.select(Some(current - 1));
                }
            }
            KeyCode::Char('g') | KeyCode::Home => self.list_state.select(Some(0)),
            KeyCode::Char('G') | KeyCode::End => {
                self.list_state.select(Some(self.items.len() - 1));
            }
            _ => {}
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!(" Tasks ({}) ", self.items.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let items: Vec<ListItem> = self.items.iter().map(row).collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan).bold())
            .highlight_symbol("> ");

        let mut state = self.list_state.clone();
        frame.render_stateful_widget(list, area, &mut state);
    }
}

fn row(item: &TaskItem) -> ListItem<'_> {
    let (marker_style, name_style) = if item.is_completed {
        (
            Style::default().fg(Color::Green).bold(),
            Style::default().fg(Color::DarkGray).crossed_out(),
        )
    } else {
        (Style::default().fg(Color::DarkGray), Style::default())
    };
    ListItem::new(vec![
        Line::from(vec![
            Span::styled(format!("{} ", item.completion_marker()), marker_style),
            Span::styled(item.display_name(), name_style),
        ]),
        Line::from(Span::styled(
            format!("    {}", item.created_label()),
            Style::default().fg(Color::DarkGray),
        )),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use crossterm::event::KeyModifiers;

    fn make_item(id: &str, minutes_ago: i64) -> TaskItem {
        TaskItem {
            id: id.to_string(),
            name: Some(format!("Task {id}")),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
            is_completed: false,
        }
    }

    fn make_list() -> TaskList {
        TaskList::new(vec![make_item("a", 1), make_item("b", 2), make_item("c", 3)])
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn new_selects_first_row() {
        let list = make_list();
        assert_eq!(list.selected_item().unwrap().id, "a");
        assert!(TaskList::new(vec![]).selected_item().is_none());
    }

    #[test]
    fn navigation_stops_at_edges() {
        let mut list = make_list();
        list.handle_key(key(KeyCode::Char('k')));
        assert_eq!(list.selected_item().unwrap().id, "a");
        list.handle_key(key(KeyCode::Char('G')));
        assert_eq!(list.selected_item().unwrap().id, "c");
        list.handle_key(key(KeyCode::Down));
        assert_eq!(list.selected_item().unwrap().id, "c");
        list.handle_key(key(KeyCode::Char('g')));
        assert_eq!(list.selected_item().unwrap().id, "a");
    }

    #[test]
    fn patch_replaces_only_matching_row() {
        let mut list = make_list();
        let mut b = list.items()[1].clone();
        b.is_completed = true;
        assert_eq!(list.patch(b), Some(1));
        assert!(list.items()[1].is_completed);
        assert_eq!(list.completed_count(), 1);
        assert_eq!(list.patch(make_item("zzz", 0)), None);
    }

    #[test]
    fn remove_last_row_moves_cursor_up() {
        let mut list = make_list();
        list.select_by_id("c");
        list.remove("c").unwrap();
        assert_eq!(list.selected_item().unwrap().id, "b");
        list.remove("a");
        list.remove("b");
        assert!(list.selected_item().is_none());
    }

    #[test]
    fn replace_keeps_cursor_on_same_item() {
        let mut list = make_list();
        list.select_by_id("b");
        list.replace(vec![make_item("new", 0), make_item("a", 1), make_item("b", 2)]);
        assert_eq!(list.selected_item().unwrap().id, "b");
    }

    #[test]
    fn insert_front_selects_new_item() {
        let mut list = make_list();
        list.select_by_id("c");
        list.insert_front(make_item("fresh", 0));
        assert_eq!(list.items()[0].id, "fresh");
        assert_eq!(list.selected_item().unwrap().id, "fresh");
    }
}
