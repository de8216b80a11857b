use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::sync::Once;

use pretty_assertions::assert_eq;
use usergrid_core::views::{CounterView, StatusBar, UsersPage, USERS_CONTAINER};
use usergrid_core::{
    FailureKind, FetchFailure, GridError, GridEvent, GridEventSink, GridHandle, GridOptions,
    GridOptionsPatch, GridWidget, LoadPhase, SessionContext, StateNotifier, UserRecord,
    UserSource,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(usergrid_logging::initialize_for_tests);
}

fn user(id: u32, name: &str) -> UserRecord {
    UserRecord {
        id,
        name: name.to_string(),
        username: name.to_lowercase(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone: String::new(),
        website: String::new(),
        address: Default::default(),
        company: Default::default(),
    }
}

/// Replays canned responses and records the shared flag at fetch time.
struct ScriptedSource {
    responses: RefCell<VecDeque<Result<Vec<UserRecord>, FetchFailure>>>,
    notifier: Weak<StateNotifier>,
    loading_seen: RefCell<Vec<bool>>,
}

impl ScriptedSource {
    fn new(
        context: &SessionContext,
        responses: Vec<Result<Vec<UserRecord>, FetchFailure>>,
    ) -> Rc<Self> {
        Rc::new(Self {
            responses: RefCell::new(responses.into()),
            notifier: Rc::downgrade(context.notifier()),
            loading_seen: RefCell::new(Vec::new()),
        })
    }
}

#[async_trait::async_trait(?Send)]
impl UserSource for ScriptedSource {
    async fn fetch_users(&self) -> Result<Vec<UserRecord>, FetchFailure> {
        if let Some(notifier) = self.notifier.upgrade() {
            self.loading_seen.borrow_mut().push(notifier.is_loading());
        }
        tokio::task::yield_now().await;
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(FetchFailure::new(FailureKind::Unexpected, "script empty")))
    }
}

struct PendingSource;

#[async_trait::async_trait(?Send)]
impl UserSource for PendingSource {
    async fn fetch_users(&self) -> Result<Vec<UserRecord>, FetchFailure> {
        std::future::pending().await
    }
}

#[derive(Default)]
struct RecordingGrid {
    rows: RefCell<Vec<UserRecord>>,
    options: RefCell<Option<GridOptions>>,
    sink: RefCell<Option<Rc<dyn GridEventSink>>>,
    destroyed: Cell<u32>,
}

impl RecordingGrid {
    fn emit(&self, event: GridEvent) {
        if let Some(sink) = self.sink.borrow().as_ref() {
            sink.emit(event);
        }
    }
}

impl GridWidget for RecordingGrid {
    fn create(
        &self,
        container: &str,
        options: &GridOptions,
        events: Rc<dyn GridEventSink>,
    ) -> Result<GridHandle, GridError> {
        if container != USERS_CONTAINER {
            return Err(GridError::ContainerNotFound(container.to_string()));
        }
        *self.options.borrow_mut() = Some(options.clone());
        *self.sink.borrow_mut() = Some(events);
        Ok(GridHandle(1))
    }

    fn update_rows(&self, _handle: GridHandle, rows: &[UserRecord]) -> Result<(), GridError> {
        *self.rows.borrow_mut() = rows.to_vec();
        Ok(())
    }

    fn selected_rows(&self, _handle: GridHandle) -> Result<Vec<UserRecord>, GridError> {
        Ok(self.rows.borrow().iter().take(1).cloned().collect())
    }

    fn destroy(&self, _handle: GridHandle) {
        self.destroyed.set(self.destroyed.get() + 1);
    }
}

#[tokio::test]
async fn successful_load_fills_grid_and_clears_both_flags() {
    init_logging();
    let context = SessionContext::new();
    let status = StatusBar::new(&context);
    let counter = CounterView::new(&context);
    let rows = vec![user(1, "Leanne"), user(2, "Ervin")];
    let source = ScriptedSource::new(&context, vec![Ok(rows.clone())]);
    let grid = Rc::new(RecordingGrid::default());
    let page = UsersPage::new(&context, source.clone(), grid.clone());
    page.attach_grid(&GridOptionsPatch::default()).unwrap();

    page.load().await;

    let view = page.view();
    assert_eq!(view.phase, LoadPhase::Loaded);
    assert_eq!(view.row_count, 2);
    assert!(!view.local_loading);
    assert!(!context.notifier().is_loading());
    assert_eq!(*grid.rows.borrow(), rows);
    assert_eq!(*source.loading_seen.borrow(), vec![true]);

    // One notification for raising the flag, one for lowering it.
    assert_eq!(status.view().renders, 2);
    assert_eq!(counter.view().renders, 2);
    assert_eq!(page.renders(), 2);
    assert!(!status.view().busy);
}

#[tokio::test]
async fn failure_then_retry_recovers() {
    let context = SessionContext::new();
    let source = ScriptedSource::new(
        &context,
        vec![
            Err(FetchFailure::new(FailureKind::Unauthorized, "401")),
            Ok(vec![user(1, "Leanne")]),
        ],
    );
    let grid = Rc::new(RecordingGrid::default());
    let page = UsersPage::new(&context, source, grid.clone());
    page.attach_grid(&GridOptionsPatch::default()).unwrap();

    page.load().await;
    let view = page.view();
    assert_eq!(view.phase, LoadPhase::Failed);
    let banner = view.error.expect("error banner");
    assert_eq!(banner.kind, FailureKind::Unauthorized);
    assert_eq!(banner.retry_label, Some("Retry"));
    assert!(!context.notifier().is_loading());
    assert!(!page.is_locally_loading());
    assert!(grid.rows.borrow().is_empty());

    page.retry().await;
    let view = page.view();
    assert_eq!(view.phase, LoadPhase::Loaded);
    assert!(view.error.is_none());
    assert_eq!(view.attempts, 2);
    assert_eq!(grid.rows.borrow().len(), 1);
}

#[tokio::test]
async fn counter_sees_busy_while_another_view_loads() {
    let context = SessionContext::new();
    let counter = Rc::new(CounterView::new(&context));
    let busy_seen = Rc::new(RefCell::new(Vec::new()));
    let observer = {
        let counter = Rc::downgrade(&counter);
        let busy_seen = busy_seen.clone();
        usergrid_core::ViewBinding::mount("probe", &context, move || {
            if let Some(counter) = counter.upgrade() {
                busy_seen.borrow_mut().push(counter.view().busy);
            }
        })
    };
    let source = ScriptedSource::new(&context, vec![Ok(vec![user(1, "Leanne")])]);
    let page = UsersPage::new(&context, source, Rc::new(RecordingGrid::default()));

    counter.increment();
    page.load().await;
    counter.increment();

    assert_eq!(*busy_seen.borrow(), vec![true, false]);
    assert_eq!(counter.view().count, 2);
    drop(observer);
}

#[tokio::test]
async fn rows_reach_the_page_even_without_a_grid() {
    let context = SessionContext::new();
    let source = ScriptedSource::new(&context, vec![Ok(vec![user(1, "Leanne")])]);
    let page = UsersPage::new(&context, source, Rc::new(RecordingGrid::default()));

    page.load().await;
    assert_eq!(page.view().row_count, 1);
    assert_eq!(page.selected_rows(), Err(GridError::NotCreated));
}

#[tokio::test]
async fn grid_events_are_queued_until_pumped() {
    let context = SessionContext::new();
    let source = ScriptedSource::new(
        &context,
        vec![Ok(vec![user(1, "Leanne"), user(2, "Ervin")])],
    );
    let grid = Rc::new(RecordingGrid::default());
    let page = UsersPage::new(&context, source, grid.clone());
    page.attach_grid(&GridOptionsPatch::default()).unwrap();
    page.load().await;
    assert!(page.take_dirty_view().is_some_and(|view| view.dirty));

    grid.emit(GridEvent::RowClicked { user_id: 2 });
    grid.emit(GridEvent::SelectionChanged {
        user_ids: vec![1, 2],
    });
    assert_eq!(page.view().last_clicked, None);

    assert_eq!(page.pump_grid_events(), 2);
    let view = page.take_dirty_view().expect("dirty after events");
    assert!(view.dirty);
    assert_eq!(view.last_clicked, Some("Ervin".to_string()));
    assert_eq!(view.selected_names, vec!["Leanne", "Ervin"]);
    assert!(view.rows.iter().all(|row| row.selected));
    assert!(page.take_dirty_view().is_none());
    assert!(!page.view().dirty);
    assert_eq!(page.selected_rows().unwrap(), vec![user(1, "Leanne")]);
}

#[tokio::test]
async fn grid_options_are_merged_over_defaults() {
    let context = SessionContext::new();
    let grid = Rc::new(RecordingGrid::default());
    let page = UsersPage::new(&context, Rc::new(PendingSource), grid.clone());
    let patch = GridOptionsPatch {
        page_size: Some(25),
        ..GridOptionsPatch::default()
    };

    let first = page.attach_grid(&patch).unwrap();
    let second = page.attach_grid(&GridOptionsPatch::default()).unwrap();
    assert_eq!(first, second);

    let options = grid.options.borrow().clone().unwrap();
    assert_eq!(
        options,
        GridOptions {
            page_size: 25,
            ..GridOptions::default()
        }
    );
}

#[tokio::test]
async fn teardown_mid_load_clears_flags_and_unsubscribes() {
    init_logging();
    let context = SessionContext::new();
    let status = StatusBar::new(&context);
    let grid = Rc::new(RecordingGrid::default());
    let local = tokio::task::LocalSet::new();

    local
        .run_until(async {
            let page = Rc::new(UsersPage::new(&context, Rc::new(PendingSource), grid.clone()));
            page.attach_grid(&GridOptionsPatch::default()).unwrap();
            assert_eq!(context.notifier().subscriber_count(), 2);

            let task = tokio::task::spawn_local({
                let page = page.clone();
                async move { page.load().await }
            });
            for _ in 0..10 {
                if context.notifier().is_loading() {
                    break;
                }
                tokio::task::yield_now().await;
            }
            assert!(context.notifier().is_loading());
            assert!(page.is_locally_loading());
            assert!(status.view().busy);

            task.abort();
            assert!(task.await.unwrap_err().is_cancelled());

            assert!(!context.notifier().is_loading());
            assert!(!page.is_locally_loading());
            assert_eq!(page.view().phase, LoadPhase::Idle);

            drop(page);
        })
        .await;

    assert_eq!(context.notifier().subscriber_count(), 1);
    assert_eq!(grid.destroyed.get(), 1);
    assert_eq!(status.view().renders, 2);
}

#[test]
fn teardown_unsubscribes_each_view_once() {
    let context = SessionContext::new();
    let status = StatusBar::new(&context);
    let counter = CounterView::new(&context);
    let page = UsersPage::new(
        &context,
        Rc::new(PendingSource),
        Rc::new(RecordingGrid::default()),
    );
    assert_eq!(context.notifier().subscriber_count(), 3);

    counter.teardown();
    page.teardown();
    assert_eq!(context.notifier().subscriber_count(), 1);

    context.notifier().set_loading(true);
    assert_eq!(status.view().renders, 1);
    status.teardown();
    assert_eq!(context.notifier().subscriber_count(), 0);
}
