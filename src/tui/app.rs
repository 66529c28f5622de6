use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use ratatui::widgets::TableState;

use crate::models::{Priority, Status, StatusFilter, Task};
use crate::store::{StoreError, TaskEdit, TaskStore};
use crate::tui::widgets::editor::Editor;
use crate::utils::{default_due_date, today};
use crate::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    View,
    Form,
    Menu,
    Help,
}

/// Actions offered by the task menu, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    MarkDone,
    Delete,
    Edit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 3] = [MenuAction::MarkDone, MenuAction::Delete, MenuAction::Edit];

    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::MarkDone => "Mark as done",
            MenuAction::Delete => "Delete",
            MenuAction::Edit => "Edit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Description,
    DueDate,
    Priority,
    Status,
}

#[derive(Debug, Clone)]
pub struct TaskForm {
    pub current_field: TaskField,
    pub description: Editor,
    pub due_date: Editor,
    pub priority: Priority,
    pub status: Status,
    /// None for a new task, Some(id) when editing
    pub editing_item_id: Option<u64>,
}

impl TaskForm {
    pub fn new_task(default_due_days: i64, priority: Priority) -> Self {
        Self {
            current_field: TaskField::Description,
            description: Editor::new(),
            due_date: Editor::from_string(default_due_date(default_due_days)),
            priority,
            status: Status::Active,
            editing_item_id: None,
        }
    }

    pub fn edit_task(task: &Task) -> Self {
        Self {
            current_field: TaskField::Description,
            description: Editor::from_string(task.description.clone()),
            due_date: Editor::from_string(task.due_date.to_string()),
            priority: task.priority,
            status: task.status,
            editing_item_id: Some(task.id),
        }
    }

    pub fn is_edit(&self) -> bool {
        self.editing_item_id.is_some()
    }

    /// Fields shown by this form; the status field only exists when editing
    pub fn fields(&self) -> &'static [TaskField] {
        if self.is_edit() {
            &[TaskField::Description, TaskField::DueDate, TaskField::Priority, TaskField::Status]
        } else {
            &[TaskField::Description, TaskField::DueDate, TaskField::Priority]
        }
    }

    pub fn navigate_field(&mut self, forward: bool) {
        let fields = self.fields();
        let index = fields.iter().position(|f| *f == self.current_field).unwrap_or(0);
        let next = if forward {
            (index + 1) % fields.len()
        } else {
            (index + fields.len() - 1) % fields.len()
        };
        self.current_field = fields[next];
    }

    /// Text editor for the current field, if it is a text field
    pub fn current_editor(&mut self) -> Option<&mut Editor> {
        match self.current_field {
            TaskField::Description => Some(&mut self.description),
            TaskField::DueDate => Some(&mut self.due_date),
            TaskField::Priority | TaskField::Status => None,
        }
    }

    /// Cycle the value of a choice field
    pub fn cycle_choice(&mut self) {
        match self.current_field {
            TaskField::Priority => self.priority = self.priority.cycle(),
            // Overdue is derived, so a manual edit only offers Active and Completed
            TaskField::Status => {
                self.status = match self.status {
                    Status::Active => Status::Completed,
                    Status::Completed | Status::Overdue => Status::Active,
                }
            }
            TaskField::Description | TaskField::DueDate => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    /// Blocking message, dismissed with Enter or Esc
    Message { title: String, body: String },
    /// Delete confirmation for the listed ids; selection 0 = Delete, 1 = Cancel
    ConfirmDelete { ids: Vec<u64>, selection: usize },
}

pub struct UiState {
    pub mode: Mode,
    pub filter: StatusFilter,
    pub selected_index: usize,
    pub table_state: TableState,
    pub menu_index: usize,
    /// Tasks marked for a bulk action
    pub marked: HashSet<u64>,
}

pub struct StatusState {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
}

/// Startup notices waiting for their display time
pub struct NoticeState {
    pub show_at: Instant,
    pub pending: VecDeque<Modal>,
}

pub struct App {
    pub config: Config,
    pub store: TaskStore,
    pub today: NaiveDate,
    pub ui: UiState,
    pub form: Option<TaskForm>,
    pub modal: Option<Modal>,
    pub status: StatusState,
    pub notices: NoticeState,
}

const STATUS_MESSAGE_TIMEOUT: Duration = Duration::from_secs(3);

impl App {
    pub fn new(config: Config, store: TaskStore) -> Self {
        let today = today();
        let mut pending = VecDeque::new();

        if let Some(warning) = store.load_warning() {
            pending.push_back(Modal::Message {
                title: "Task file unreadable".to_string(),
                body: warning.to_string(),
            });
        }

        // Counted before the first refresh promotes these tasks to Overdue
        let overdue = store.count_overdue(today);
        if overdue > 0 {
            pending.push_back(Modal::Message {
                title: "Overdue tasks".to_string(),
                body: format!("You have {} overdue task(s)!", overdue),
            });
        }

        let delay = Duration::from_millis(config.overdue_notice_delay_ms);
        let mut app = Self {
            config,
            store,
            today,
            ui: UiState {
                mode: Mode::View,
                filter: StatusFilter::All,
                selected_index: 0,
                table_state: TableState::default(),
                menu_index: 0,
                marked: HashSet::new(),
            },
            form: None,
            modal: None,
            status: StatusState {
                message: None,
                message_time: None,
            },
            notices: NoticeState {
                show_at: Instant::now() + delay,
                pending,
            },
        };

        app.refresh();
        app
    }

    /// Re-read today's date, promote overdue tasks and fix up the selection
    pub fn refresh(&mut self) {
        self.today = today();
        self.store.refresh_statuses(self.today);

        let existing: HashSet<u64> = self.store.tasks().iter().map(|t| t.id).collect();
        self.ui.marked.retain(|id| existing.contains(id));
        self.adjust_selected_index();
    }

    /// Tasks passing the current filter, with effective statuses for `today`
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.store.filtered(self.ui.filter, self.today)
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.visible_tasks().get(self.ui.selected_index).copied()
    }

    /// Ids an action applies to: the marked tasks, or the task under the cursor
    pub fn target_ids(&self) -> Vec<u64> {
        if self.ui.marked.is_empty() {
            self.current_task().map(|t| vec![t.id]).unwrap_or_default()
        } else {
            let mut ids: Vec<u64> = self.ui.marked.iter().copied().collect();
            ids.sort_unstable();
            ids
        }
    }

    pub fn adjust_selected_index(&mut self) {
        let len = self.visible_tasks().len();
        if len == 0 {
            self.ui.selected_index = 0;
        } else if self.ui.selected_index >= len {
            self.ui.selected_index = len - 1;
        }
        self.sync_table_state();
    }

    pub fn sync_table_state(&mut self) {
        let selected = if self.visible_tasks().is_empty() {
            None
        } else {
            Some(self.ui.selected_index)
        };
        self.ui.table_state.select(selected);
    }

    pub fn move_selection_up(&mut self) {
        self.ui.selected_index = self.ui.selected_index.saturating_sub(1);
        self.sync_table_state();
    }

    pub fn move_selection_down(&mut self) {
        let len = self.visible_tasks().len();
        if self.ui.selected_index + 1 < len {
            self.ui.selected_index += 1;
        }
        self.sync_table_state();
    }

    pub fn toggle_mark(&mut self) {
        if let Some(id) = self.current_task().map(|t| t.id) {
            if !self.ui.marked.remove(&id) {
                self.ui.marked.insert(id);
            }
            self.move_selection_down();
        }
    }

    pub fn cycle_filter(&mut self) {
        self.ui.filter = self.ui.filter.cycle();
        self.ui.selected_index = 0;
        self.adjust_selected_index();
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status.message = Some(message);
        self.status.message_time = Some(Instant::now());
    }

    pub fn check_status_message_timeout(&mut self) {
        if let Some(time) = self.status.message_time {
            if time.elapsed() >= STATUS_MESSAGE_TIMEOUT {
                self.status.message = None;
                self.status.message_time = None;
            }
        }
    }

    /// Show the next startup notice once its time has come and nothing else is open
    pub fn check_pending_notices(&mut self, now: Instant) {
        if self.modal.is_some() || now < self.notices.show_at {
            return;
        }
        if let Some(notice) = self.notices.pending.pop_front() {
            self.modal = Some(notice);
        }
    }

    pub fn show_message(&mut self, title: &str, body: String) {
        self.modal = Some(Modal::Message {
            title: title.to_string(),
            body,
        });
    }

    fn report_store_error(&mut self, err: StoreError) {
        match err {
            StoreError::Validation(e) => self.show_message("Warning", e.to_string()),
            other => {
                tracing::error!(error = %other, "task operation failed");
                self.show_message("Error", other.to_string());
            }
        }
    }

    pub fn enter_help_mode(&mut self) {
        self.ui.mode = Mode::Help;
    }

    pub fn exit_help_mode(&mut self) {
        self.ui.mode = Mode::View;
    }

    pub fn open_menu(&mut self) {
        if self.target_ids().is_empty() {
            return;
        }
        self.ui.menu_index = 0;
        self.ui.mode = Mode::Menu;
    }

    pub fn close_menu(&mut self) {
        self.ui.mode = Mode::View;
    }

    pub fn move_menu_selection(&mut self, down: bool) {
        let len = MenuAction::ALL.len();
        self.ui.menu_index = if down {
            (self.ui.menu_index + 1) % len
        } else {
            (self.ui.menu_index + len - 1) % len
        };
    }

    pub fn run_menu_action(&mut self) {
        let action = MenuAction::ALL[self.ui.menu_index.min(MenuAction::ALL.len() - 1)];
        self.ui.mode = Mode::View;
        match action {
            MenuAction::MarkDone => self.mark_done(),
            MenuAction::Delete => self.request_delete(),
            MenuAction::Edit => self.enter_edit_mode(),
        }
    }

    pub fn enter_create_mode(&mut self) {
        self.form = Some(TaskForm::new_task(self.config.default_due_days, self.config.default_priority));
        self.ui.mode = Mode::Form;
    }

    /// Open the edit form; editing needs exactly one target task
    pub fn enter_edit_mode(&mut self) {
        let ids = self.target_ids();
        let [id] = ids.as_slice() else {
            self.show_message("Warning", "Select one task to edit!".to_string());
            return;
        };
        if let Some(task) = self.store.get(*id) {
            self.form = Some(TaskForm::edit_task(task));
            self.ui.mode = Mode::Form;
        }
    }

    pub fn exit_form_mode(&mut self) {
        self.form = None;
        self.ui.mode = Mode::View;
    }

    /// Validate and store the open form. The form stays open on failure.
    pub fn save_form(&mut self) {
        let Some(form) = self.form.as_ref() else {
            return;
        };
        let description = form.description.to_string();
        let due_date = form.due_date.to_string();

        let result = match form.editing_item_id {
            Some(id) => {
                let edit = TaskEdit {
                    description,
                    due_date,
                    priority: form.priority,
                    status: form.status,
                };
                self.store.edit_task(id, edit).map(|()| (id, "Changes saved"))
            }
            None => self
                .store
                .add_task(&description, &due_date, form.priority)
                .map(|task| (task.id, "Task added")),
        };

        match result {
            Ok((id, message)) => {
                self.exit_form_mode();
                self.refresh();
                self.select_task(id);
                self.set_status_message(message.to_string());
            }
            Err(e) => self.report_store_error(e),
        }
    }

    /// Move the cursor onto task `id` if it is visible
    pub fn select_task(&mut self, id: u64) {
        if let Some(index) = self.visible_tasks().iter().position(|t| t.id == id) {
            self.ui.selected_index = index;
            self.sync_table_state();
        }
    }

    pub fn mark_done(&mut self) {
        let ids: HashSet<u64> = self.target_ids().into_iter().collect();
        if ids.is_empty() {
            return;
        }
        match self.store.mark_done(&ids) {
            Ok(changed) => {
                self.ui.marked.clear();
                self.refresh();
                self.set_status_message(format!("{} task(s) marked as done", changed));
            }
            Err(e) => self.report_store_error(e),
        }
    }

    /// Ask for confirmation before deleting the target tasks
    pub fn request_delete(&mut self) {
        let ids = self.target_ids();
        if ids.is_empty() {
            return;
        }
        self.modal = Some(Modal::ConfirmDelete { ids, selection: 1 });
    }

    pub fn confirm_delete(&mut self, ids: &[u64]) {
        let ids: HashSet<u64> = ids.iter().copied().collect();
        match self.store.delete_tasks(&ids) {
            Ok(removed) => {
                self.ui.marked.clear();
                self.refresh();
                self.set_status_message(format!("{} task(s) deleted", removed));
            }
            Err(e) => self.report_store_error(e),
        }
    }

    pub fn filter_summary(&self) -> String {
        let shown = self.visible_tasks().len();
        let total = self.store.tasks().len();
        let mut summary = format!("Filter: {}  |  {} of {} task(s)", self.ui.filter, shown, total);
        if !self.ui.marked.is_empty() {
            summary.push_str(&format!("  |  {} marked", self.ui.marked.len()));
        }
        summary
    }
}
