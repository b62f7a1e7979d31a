//! State machine tests for the TUI App.
//!
//! Each test builds an App over an in-memory SQLite store and a scripted
//! remote source, then simulates key events to drive mode transitions.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use tasklist_core::{RemoteTask, TaskItem};
use tasklist_db::Db;
use tasklist_service::{LocalStore, RemoteTaskSource, ServiceError, SyncCoordinator, TaskStore};
use tasklist_tui::app::{App, Mode};

struct ScriptedSource {
    result: Result<Vec<RemoteTask>, ServiceError>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(result: Result<Vec<RemoteTask>, ServiceError>) -> Arc<Self> {
        Arc::new(Self {
            result,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl RemoteTaskSource for ScriptedSource {
    async fn fetch(&self) -> Result<Vec<RemoteTask>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Store whose writes can be switched to fail mid-test.
struct FlakyStore {
    inner: LocalStore,
    fail_writes: Arc<AtomicBool>,
}

impl FlakyStore {
    fn check(&self) -> Result<(), ServiceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(ServiceError::Persistence("disk I/O error".into()))
        } else {
            Ok(())
        }
    }
}

impl TaskStore for FlakyStore {
    fn list_items(&self) -> Result<Vec<TaskItem>, ServiceError> {
        self.inner.list_items()
    }
    fn get_item(&self, id: &str) -> Result<TaskItem, ServiceError> {
        self.inner.get_item(id)
    }
    fn create_item(&self, name: &str) -> Result<TaskItem, ServiceError> {
        self.check()?;
        self.inner.create_item(name)
    }
    fn rename_item(&self, id: &str, name: &str) -> Result<TaskItem, ServiceError> {
        self.check()?;
        self.inner.rename_item(id, name)
    }
    fn toggle_completed(&self, id: &str) -> Result<TaskItem, ServiceError> {
        self.check()?;
        self.inner.toggle_completed(id)
    }
    fn delete_item(&self, id: &str) -> Result<(), ServiceError> {
        self.check()?;
        self.inner.delete_item(id)
    }
    fn has_fetched_tasks(&self) -> Result<bool, ServiceError> {
        self.inner.has_fetched_tasks()
    }
    fn mark_tasks_fetched(&self) -> Result<(), ServiceError> {
        self.check()?;
        self.inner.mark_tasks_fetched()
    }
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn char_key(c: char) -> KeyEvent {
    key(KeyCode::Char(c))
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        app.handle_key(char_key(c));
    }
}

fn remote(id: i64, description: &str) -> RemoteTask {
    RemoteTask {
        id,
        title: None,
        description: Some(description.to_string()),
        completed: false,
    }
}

/// App that has already synced, seeded with `names` (last one newest).
fn make_app(names: &[&str]) -> App {
    let store = LocalStore::new(Db::open_in_memory().unwrap());
    for name in names {
        store.create_item(name).unwrap();
    }
    store.mark_tasks_fetched().unwrap();
    let source = ScriptedSource::new(Ok(vec![]));
    App::new(Box::new(store), source, SyncCoordinator::new(true))
}

fn make_flaky_app(names: &[&str]) -> (App, Arc<AtomicBool>) {
    let inner = LocalStore::new(Db::open_in_memory().unwrap());
    for name in names {
        inner.create_item(name).unwrap();
    }
    let fail_writes = Arc::new(AtomicBool::new(false));
    let store = FlakyStore {
        inner,
        fail_writes: fail_writes.clone(),
    };
    let app = App::new(
        Box::new(store),
        ScriptedSource::new(Ok(vec![])),
        SyncCoordinator::new(true),
    );
    (app, fail_writes)
}

fn wait_for_fetch(app: &mut App) {
    for _ in 0..400 {
        if app.poll_fetch() {
            return;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    panic!("fetch worker never reported");
}

fn names(app: &App) -> Vec<&str> {
    app.items().iter().map(|i| i.display_name()).collect()
}

fn render_to_string(app: &App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
    terminal.draw(|frame| app.render(frame)).unwrap();
    let buffer = terminal.backend().buffer();
    let width = buffer.area.width as usize;
    buffer
        .content()
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

// ---- Startup / sync ----

#[test]
fn synced_app_loads_store_without_fetching() {
    let store = LocalStore::new(Db::open_in_memory().unwrap());
    store.create_item("kept").unwrap();
    let source = ScriptedSource::new(Ok(vec![remote(1, "remote")]));

    let app = App::new(Box::new(store), source.clone(), SyncCoordinator::new(true));

    assert!(!app.needs_polling());
    assert_eq!(names(&app), vec!["kept"]);
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn first_launch_imports_and_renders_rows() {
    let store = LocalStore::new(Db::open_in_memory().unwrap());
    let mut task = remote(1, "Buy milk");
    task.title = Some("A".into());
    let source = ScriptedSource::new(Ok(vec![task]));

    let mut app = App::new(Box::new(store), source, SyncCoordinator::new(false));
    assert!(app.needs_polling());
    wait_for_fetch(&mut app);

    assert!(!app.needs_polling());
    assert_eq!(names(&app), vec!["Buy milk"]);
    assert!(!app.items()[0].is_completed);
    assert_eq!(app.status_message().unwrap().text, "Imported 1 tasks");

    let screen = render_to_string(&app);
    assert!(screen.contains("[ ] Buy milk"), "screen was:\n{screen}");
}

#[test]
fn first_launch_failure_surfaces_error_and_keeps_flag_unset() {
    let db = Db::open_in_memory().unwrap();
    let store = LocalStore::new(db.clone());
    let source = ScriptedSource::new(Err(ServiceError::Network("offline".into())));

    let mut app = App::new(Box::new(store), source, SyncCoordinator::new(false));
    wait_for_fetch(&mut app);

    let status = app.status_message().unwrap();
    assert!(status.is_error);
    assert!(status.text.starts_with("Sync failed"));
    assert!(app.items().is_empty());
    assert!(!db.has_fetched_tasks().unwrap());
}

#[test]
fn fetching_status_shown_while_in_flight() {
    struct Slow;

    #[async_trait]
    impl RemoteTaskSource for Slow {
        async fn fetch(&self) -> Result<Vec<RemoteTask>, ServiceError> {
            std::thread::sleep(Duration::from_millis(200));
            Ok(vec![])
        }
    }

    let store = LocalStore::new(Db::open_in_memory().unwrap());
    let mut app = App::new(Box::new(store), Arc::new(Slow), SyncCoordinator::new(false));

    assert!(app.needs_polling());
    assert!(render_to_string(&app).contains("Fetching tasks..."));

    wait_for_fetch(&mut app);
    assert!(!app.needs_polling());
}

// ---- Add ----

#[test]
fn n_enters_new_task() {
    let mut app = make_app(&[]);
    app.handle_key(char_key('n'));
    assert!(matches!(app.mode(), Mode::NewTask { .. }));
    assert!(app.is_input_mode());
}

#[test]
fn new_task_esc_cancels() {
    let mut app = make_app(&[]);
    app.handle_key(char_key('n'));
    type_text(&mut app, "abc");
    app.handle_key(key(KeyCode::Esc));
    assert!(matches!(app.mode(), Mode::Normal));
    assert!(app.items().is_empty());
}

#[test]
fn new_task_typing_and_submit() {
    let mut app = make_app(&["older"]);
    app.handle_key(char_key('n'));
    type_text(&mut app, "buy milk");
    app.handle_key(key(KeyCode::Enter));

    assert!(matches!(app.mode(), Mode::Normal));
    assert_eq!(names(&app), vec!["buy milk", "older"]);
    assert_eq!(app.selected_item().unwrap().display_name(), "buy milk");
    assert!(!app.items()[0].is_completed);
}

#[test]
fn new_task_backspace() {
    let mut app = make_app(&[]);
    app.handle_key(char_key('n'));
    type_text(&mut app, "ab");
    app.handle_key(key(KeyCode::Backspace));
    match app.mode() {
        Mode::NewTask { input } => assert_eq!(input, "a"),
        other => panic!("unexpected mode {other:?}"),
    }
}

#[test]
fn blank_new_task_is_ignored() {
    let mut app = make_app(&[]);
    app.handle_key(char_key('n'));
    type_text(&mut app, "   ");
    app.handle_key(key(KeyCode::Enter));
    assert!(matches!(app.mode(), Mode::Normal));
    assert!(app.items().is_empty());
}

// ---- Toggle ----

#[test]
fn space_toggles_selected_item() {
    let mut app = make_app(&["walk dog"]);
    app.handle_key(char_key(' '));
    assert!(app.items()[0].is_completed);
    assert!(render_to_string(&app).contains("[x] walk dog"));

    app.handle_key(char_key(' '));
    assert!(!app.items()[0].is_completed);
}

#[test]
fn toggle_on_empty_list_is_noop() {
    let mut app = make_app(&[]);
    app.handle_key(char_key(' '));
    assert!(app.items().is_empty());
    assert!(app.status_message().is_none());
}

// ---- Edit / delete ----

#[test]
fn enter_opens_item_actions() {
    let mut app = make_app(&["task"]);
    app.handle_key(key(KeyCode::Enter));
    assert!(matches!(app.mode(), Mode::ItemActions { .. }));
    app.handle_key(key(KeyCode::Esc));
    assert!(matches!(app.mode(), Mode::Normal));
}

#[test]
fn enter_on_empty_list_stays_normal() {
    let mut app = make_app(&[]);
    app.handle_key(key(KeyCode::Enter));
    assert!(matches!(app.mode(), Mode::Normal));
}

#[test]
fn edit_prefills_and_renames_in_place() {
    let mut app = make_app(&["first", "second"]);
    app.handle_key(char_key('j'));
    app.handle_key(key(KeyCode::Enter));
    app.handle_key(char_key('e'));
    match app.mode() {
        Mode::EditName { input, .. } => assert_eq!(input, "first"),
        other => panic!("unexpected mode {other:?}"),
    }

    type_text(&mut app, " draft");
    app.handle_key(key(KeyCode::Enter));

    assert!(matches!(app.mode(), Mode::Normal));
    assert_eq!(names(&app), vec!["second", "first draft"]);
}

#[test]
fn delete_removes_item() {
    let mut app = make_app(&["keep", "drop"]);
    let dropped = app.selected_item().unwrap().id.clone();
    app.handle_key(key(KeyCode::Enter));
    app.handle_key(char_key('d'));

    assert!(matches!(app.mode(), Mode::Normal));
    assert_eq!(names(&app), vec!["keep"]);
    assert!(app.items().iter().all(|i| i.id != dropped));
}

#[test]
fn reload_reflects_store() {
    let mut app = make_app(&["a", "b"]);
    app.handle_key(char_key('r'));
    assert_eq!(names(&app), vec!["b", "a"]);
}

// ---- Failed writes keep the cache unchanged ----

#[test]
fn failed_rename_leaves_cache_untouched() {
    let (mut app, fail_writes) = make_flaky_app(&["original"]);
    app.handle_key(key(KeyCode::Enter));
    app.handle_key(char_key('e'));
    type_text(&mut app, " changed");

    fail_writes.store(true, Ordering::SeqCst);
    app.handle_key(key(KeyCode::Enter));

    assert_eq!(names(&app), vec!["original"]);
    let status = app.status_message().unwrap();
    assert!(status.is_error);
    assert!(status.text.starts_with("Edit failed"));
}

#[test]
fn failed_toggle_leaves_cache_untouched() {
    let (mut app, fail_writes) = make_flaky_app(&["task"]);
    fail_writes.store(true, Ordering::SeqCst);
    app.handle_key(char_key('x'));
    assert!(!app.items()[0].is_completed);
    assert!(app.status_message().unwrap().is_error);
}

#[test]
fn failed_add_and_delete_leave_cache_untouched() {
    let (mut app, fail_writes) = make_flaky_app(&["task"]);
    fail_writes.store(true, Ordering::SeqCst);

    app.handle_key(char_key('n'));
    type_text(&mut app, "new one");
    app.handle_key(key(KeyCode::Enter));
    assert_eq!(names(&app), vec!["task"]);

    app.handle_key(key(KeyCode::Enter));
    app.handle_key(char_key('d'));
    assert_eq!(names(&app), vec!["task"]);
    assert!(app.status_message().unwrap().text.starts_with("Delete failed"));
}

#[test]
fn next_key_clears_status() {
    let (mut app, fail_writes) = make_flaky_app(&["task"]);
    fail_writes.store(true, Ordering::SeqCst);
    app.handle_key(char_key('x'));
    assert!(app.status_message().is_some());
    app.handle_key(char_key('j'));
    assert!(app.status_message().is_none());
}
