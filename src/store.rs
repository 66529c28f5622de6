use std::collections::HashSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{Priority, Status, StatusFilter, Task};
use crate::utils::parse_date;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Description must not be empty")]
    EmptyDescription,
    #[error("Invalid date '{0}', use YYYY-MM-DD")]
    InvalidDate(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Task {0} not found")]
    TaskNotFound(u64),
    #[error("Failed to read {path}: {reason}")]
    Read { path: String, reason: String },
    #[error("Failed to write {path}: {reason}")]
    Write { path: String, reason: String },
    #[error("Failed to serialize tasks: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result of reading the durable record
#[derive(Debug)]
pub enum LoadOutcome {
    /// No record yet
    Missing,
    Loaded(Vec<Task>),
    /// The record exists but could not be parsed; holds the parser message
    Corrupt(String),
}

impl LoadOutcome {
    /// Collection to start from. Missing and corrupt records both start empty.
    pub fn into_tasks(self) -> Vec<Task> {
        match self {
            LoadOutcome::Loaded(tasks) => tasks,
            LoadOutcome::Missing | LoadOutcome::Corrupt(_) => Vec::new(),
        }
    }
}

/// JSON file holding the whole task collection
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record without modifying it
    pub fn load(&self) -> Result<LoadOutcome, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(LoadOutcome::Missing),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Ok(LoadOutcome::Corrupt(format!("record is not valid UTF-8: {}", e)));
            }
            Err(e) => {
                return Err(StoreError::Read {
                    path: self.path.display().to_string(),
                    reason: e.to_string(),
                });
            }
        };

        match serde_json::from_str::<Vec<Task>>(&content) {
            Ok(tasks) => Ok(LoadOutcome::Loaded(tasks)),
            Err(e) => Ok(LoadOutcome::Corrupt(e.to_string())),
        }
    }

    /// Replace the record with `tasks`.
    ///
    /// The collection is written to a temporary file next to the record and
    /// renamed over it, so the previous record stays intact if the write fails.
    pub fn save(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| self.write_error(e))?;

        let content = serde_json::to_string_pretty(tasks)?;

        let mut temp = NamedTempFile::new_in(&dir).map_err(|e| self.write_error(e))?;
        temp.write_all(content.as_bytes())
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| self.write_error(e))?;
        temp.persist(&self.path)
            .map_err(|e| self.write_error(e.error))?;

        debug!(path = %self.path.display(), count = tasks.len(), "saved task record");
        Ok(())
    }

    /// Copy the current record aside so it survives the next save.
    ///
    /// The backup is `<name>.corrupt`, or `<name>.corrupt.N` with the first
    /// free N when earlier backups exist; an older backup is never replaced.
    fn preserve_corrupt(&self) -> Result<PathBuf, StoreError> {
        let mut base = self.path.clone().into_os_string();
        base.push(".corrupt");

        let mut backup = PathBuf::from(&base);
        let mut n = 0u32;
        while backup.exists() {
            n += 1;
            let mut name = base.clone();
            name.push(format!(".{}", n));
            backup = PathBuf::from(name);
        }

        fs::copy(&self.path, &backup).map_err(|e| self.write_error(e))?;
        Ok(backup)
    }

    fn write_error(&self, e: std::io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        }
    }
}

/// New values for every editable field of a task
#[derive(Debug, Clone)]
pub struct TaskEdit {
    pub description: String,
    pub due_date: String,
    pub priority: Priority,
    pub status: Status,
}

/// Current local time, truncated to the precision the record keeps
pub fn local_now() -> NaiveDateTime {
    let now = chrono::Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// The authoritative task collection and the rules that govern it.
///
/// Every mutating operation persists the full collection before returning.
/// The in-memory collection only changes once that save has succeeded.
pub struct TaskStore {
    file: JsonFile,
    tasks: Vec<Task>,
    load_warning: Option<String>,
    clock: fn() -> NaiveDateTime,
}

impl TaskStore {
    /// Load the collection from `file`.
    ///
    /// An unparseable record yields an empty collection. The bad file is
    /// copied aside first and the reason is kept in `load_warning`.
    pub fn open(file: JsonFile) -> Result<Self, StoreError> {
        let (tasks, load_warning) = match file.load()? {
            LoadOutcome::Missing => {
                info!(path = %file.path().display(), "no task record yet, starting empty");
                (Vec::new(), None)
            }
            LoadOutcome::Loaded(tasks) => {
                info!(path = %file.path().display(), count = tasks.len(), "loaded tasks");
                (tasks, None)
            }
            LoadOutcome::Corrupt(reason) => {
                let backup = file.preserve_corrupt()?;
                warn!(
                    path = %file.path().display(),
                    backup = %backup.display(),
                    %reason,
                    "task record is unreadable, starting with an empty list"
                );
                let message = format!(
                    "Task file {} could not be read ({}). Starting with an empty list; the old file was kept as {}.",
                    file.path().display(),
                    reason,
                    backup.display()
                );
                (Vec::new(), Some(message))
            }
        };

        Ok(Self {
            file,
            tasks,
            load_warning,
            clock: local_now,
        })
    }

    /// Replace the time source used for `created_at` and `completed_at`
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn file(&self) -> &JsonFile {
        &self.file
    }

    /// Set when the record was unreadable at startup
    pub fn load_warning(&self) -> Option<&str> {
        self.load_warning.as_deref()
    }

    fn next_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id).max().map_or(1, |max| max + 1)
    }

    pub fn add_task(&mut self, description: &str, due_date: &str, priority: Priority) -> Result<Task, StoreError> {
        let description = validate_description(description)?;
        let due_date = validate_date(due_date)?;

        let task = Task::new(self.next_id(), description, due_date, priority, (self.clock)());
        let mut tasks = self.tasks.clone();
        tasks.push(task.clone());
        self.commit(tasks)?;

        info!(id = task.id, due = %task.due_date, priority = %task.priority, "task added");
        Ok(task)
    }

    /// Promote every Active task due before `today` to a stored Overdue.
    ///
    /// The promotion is one-way: moving the due date back into the future
    /// does not restore Active, only an explicit edit does. Returns the
    /// number of tasks promoted; calling it again with the same `today`
    /// promotes nothing.
    pub fn refresh_statuses(&mut self, today: NaiveDate) -> usize {
        let mut promoted = 0;
        for task in self.tasks.iter_mut().filter(|t| t.is_past_due(today)) {
            task.status = Status::Overdue;
            promoted += 1;
        }
        if promoted > 0 {
            debug!(promoted, %today, "promoted overdue tasks");
        }
        promoted
    }

    /// Complete every task in `ids`. Unknown ids are ignored.
    pub fn mark_done(&mut self, ids: &HashSet<u64>) -> Result<usize, StoreError> {
        let now = (self.clock)();
        let mut tasks = self.tasks.clone();
        let changed = tasks
            .iter_mut()
            .filter(|t| ids.contains(&t.id))
            .fold(0, |count, task| count + usize::from(task.complete(now)));
        self.commit(tasks)?;

        info!(requested = ids.len(), changed, "marked tasks done");
        Ok(changed)
    }

    /// Remove every task in `ids`. Unknown ids are ignored.
    pub fn delete_tasks(&mut self, ids: &HashSet<u64>) -> Result<usize, StoreError> {
        let tasks: Vec<Task> = self.tasks.iter().filter(|t| !ids.contains(&t.id)).cloned().collect();
        let removed = self.tasks.len() - tasks.len();
        self.commit(tasks)?;

        info!(requested = ids.len(), removed, "deleted tasks");
        Ok(removed)
    }

    /// Overwrite the editable fields of task `id`.
    ///
    /// The status is taken as given, so a Completed task can be reopened and
    /// an Overdue one set back to Active. On any validation failure the task
    /// is left untouched.
    pub fn edit_task(&mut self, id: u64, edit: TaskEdit) -> Result<(), StoreError> {
        let due_date = validate_date(&edit.due_date)?;
        let description = validate_description(&edit.description)?;
        let now = (self.clock)();

        let mut tasks = self.tasks.clone();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::TaskNotFound(id))?;

        task.description = description;
        task.due_date = due_date;
        task.priority = edit.priority;
        task.status = edit.status;
        if edit.status == Status::Completed && task.completed_at.is_none() {
            task.completed_at = Some(now);
        }
        self.commit(tasks)?;

        info!(id, status = %edit.status, "task edited");
        Ok(())
    }

    /// Tasks stored as Active whose due date is before `today`
    pub fn count_overdue(&self, today: NaiveDate) -> usize {
        self.tasks.iter().filter(|t| t.is_past_due(today)).count()
    }

    /// Tasks whose effective status on `today` passes `filter`, in stored order
    pub fn filtered(&self, filter: StatusFilter, today: NaiveDate) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| filter.matches(t.display_status(today)))
            .collect()
    }

    /// Persist the collection. Called on shutdown.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.save()
    }

    fn save(&self) -> Result<(), StoreError> {
        self.file.save(&self.tasks)
    }

    /// Persist `tasks`, then adopt them; on a failed save nothing changes
    fn commit(&mut self, tasks: Vec<Task>) -> Result<(), StoreError> {
        self.file.save(&tasks)?;
        self.tasks = tasks;
        Ok(())
    }
}

fn validate_description(description: &str) -> Result<String, ValidationError> {
    let description = description.trim();
    if description.is_empty() {
        return Err(ValidationError::EmptyDescription);
    }
    Ok(description.to_string())
}

fn validate_date(date: &str) -> Result<NaiveDate, ValidationError> {
    let date = date.trim();
    parse_date(date).map_err(|_| ValidationError::InvalidDate(date.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TIMESTAMP_FORMAT;
    use tempfile::TempDir;

    fn fixed_now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-01-01 12:00:00", TIMESTAMP_FORMAT).unwrap()
    }

    fn later_now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-02-01 08:00:00", TIMESTAMP_FORMAT).unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn setup() -> (TempDir, TaskStore) {
        let temp_dir = TempDir::new().unwrap();
        let file = JsonFile::new(temp_dir.path().join("tasks.json"));
        let store = TaskStore::open(file).unwrap().with_clock(fixed_now);
        (temp_dir, store)
    }

    fn ids(values: &[u64]) -> HashSet<u64> {
        values.iter().copied().collect()
    }

    #[test]
    fn add_to_empty_store_assigns_id_one() {
        let (_temp, mut store) = setup();
        let task = store.add_task("Buy milk", "2099-01-01", Priority::Low).unwrap();

        assert_eq!(task.id, 1);
        assert_eq!(task.status, Status::Active);
        assert_eq!(task.created_at, fixed_now());
        assert_eq!(store.tasks(), &[task]);
    }

    #[test]
    fn add_uses_max_id_plus_one() {
        let (_temp, mut store) = setup();
        store.add_task("a", "2099-01-01", Priority::Low).unwrap();
        store.add_task("b", "2099-01-01", Priority::Low).unwrap();
        store.add_task("c", "2099-01-01", Priority::Low).unwrap();
        store.delete_tasks(&ids(&[1, 2])).unwrap();

        let task = store.add_task("d", "2099-01-01", Priority::High).unwrap();
        assert_eq!(task.id, 4);
    }

    #[test]
    fn add_trims_description() {
        let (_temp, mut store) = setup();
        let task = store.add_task("  Call mom  ", " 2099-01-01 ", Priority::Medium).unwrap();
        assert_eq!(task.description, "Call mom");
        assert_eq!(task.due_date, day("2099-01-01"));
    }

    #[test]
    fn add_rejects_blank_description() {
        let (_temp, mut store) = setup();
        let err = store.add_task("   ", "2099-01-01", Priority::Low).unwrap_err();
        assert!(matches!(err, StoreError::Validation(ValidationError::EmptyDescription)));
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn add_rejects_bad_date() {
        let (_temp, mut store) = setup();
        for bad in ["2024-02-30", "01/02/2024", "tomorrow", ""] {
            let err = store.add_task("x", bad, Priority::Low).unwrap_err();
            assert!(matches!(err, StoreError::Validation(ValidationError::InvalidDate(_))), "{bad}");
        }
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn add_persists_immediately() {
        let (temp, mut store) = setup();
        store.add_task("Пригласить гостей", "2099-01-01", Priority::High).unwrap();

        let reloaded = JsonFile::new(temp.path().join("tasks.json")).load().unwrap();
        let tasks = reloaded.into_tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].description, "Пригласить гостей");
    }

    #[test]
    fn refresh_promotes_and_is_idempotent() {
        let (_temp, mut store) = setup();
        store.add_task("old", "2000-01-01", Priority::Low).unwrap();
        store.add_task("new", "2099-01-01", Priority::Low).unwrap();

        let today = day("2024-01-01");
        assert_eq!(store.refresh_statuses(today), 1);
        let once = store.tasks().to_vec();
        assert_eq!(store.refresh_statuses(today), 0);
        assert_eq!(store.tasks(), once.as_slice());
        assert_eq!(store.get(1).unwrap().status, Status::Overdue);
        assert_eq!(store.get(2).unwrap().status, Status::Active);
    }

    #[test]
    fn promotion_survives_moving_due_date_forward() {
        let (_temp, mut store) = setup();
        store.add_task("old", "2000-01-01", Priority::Low).unwrap();
        store.refresh_statuses(day("2024-01-01"));

        store
            .edit_task(1, TaskEdit {
                description: "old".to_string(),
                due_date: "2099-01-01".to_string(),
                priority: Priority::Low,
                status: Status::Overdue,
            })
            .unwrap();
        assert_eq!(store.get(1).unwrap().display_status(day("2024-01-01")), Status::Overdue);
    }

    #[test]
    fn mark_done_stamps_completion_once() {
        let (_temp, mut store) = setup();
        store.add_task("a", "2099-01-01", Priority::Low).unwrap();

        assert_eq!(store.mark_done(&ids(&[1])).unwrap(), 1);
        let task = store.get(1).unwrap().clone();
        assert_eq!(task.status, Status::Completed);
        assert_eq!(task.completed_at, Some(fixed_now()));

        let mut store = store.with_clock(later_now);
        assert_eq!(store.mark_done(&ids(&[1])).unwrap(), 0);
        assert_eq!(store.get(1).unwrap().completed_at, Some(fixed_now()));
    }

    #[test]
    fn mark_done_ignores_unknown_ids() {
        let (_temp, mut store) = setup();
        store.add_task("a", "2099-01-01", Priority::Low).unwrap();
        store.add_task("b", "2099-01-01", Priority::Low).unwrap();

        assert_eq!(store.mark_done(&ids(&[2, 42])).unwrap(), 1);
        assert_eq!(store.get(1).unwrap().status, Status::Active);
        assert_eq!(store.get(2).unwrap().status, Status::Completed);
    }

    #[test]
    fn mark_done_completes_overdue_tasks() {
        let (_temp, mut store) = setup();
        store.add_task("late", "2000-01-01", Priority::Low).unwrap();
        store.refresh_statuses(day("2024-01-01"));

        assert_eq!(store.mark_done(&ids(&[1])).unwrap(), 1);
        assert_eq!(store.get(1).unwrap().status, Status::Completed);
    }

    #[test]
    fn delete_removes_selected_and_ignores_unknown() {
        let (_temp, mut store) = setup();
        store.add_task("a", "2099-01-01", Priority::Low).unwrap();
        store.add_task("b", "2099-01-01", Priority::Low).unwrap();

        assert_eq!(store.delete_tasks(&ids(&[1])).unwrap(), 1);
        assert_eq!(store.tasks().iter().map(|t| t.id).collect::<Vec<_>>(), vec![2]);

        let before = store.tasks().to_vec();
        assert_eq!(store.delete_tasks(&ids(&[99])).unwrap(), 0);
        assert_eq!(store.tasks(), before.as_slice());
    }

    #[test]
    fn edit_with_bad_date_leaves_task_unchanged() {
        let (_temp, mut store) = setup();
        store.add_task("a", "2099-01-01", Priority::Low).unwrap();
        let before = store.get(1).unwrap().clone();

        let err = store
            .edit_task(1, TaskEdit {
                description: "changed".to_string(),
                due_date: "2099-02-31".to_string(),
                priority: Priority::High,
                status: Status::Completed,
            })
            .unwrap_err();

        assert!(matches!(err, StoreError::Validation(ValidationError::InvalidDate(_))));
        assert_eq!(store.get(1).unwrap(), &before);
    }

    #[test]
    fn edit_overwrites_fields_and_allows_reopening() {
        let (_temp, mut store) = setup();
        store.add_task("a", "2099-01-01", Priority::Low).unwrap();
        store.mark_done(&ids(&[1])).unwrap();

        store
            .edit_task(1, TaskEdit {
                description: " reopened ".to_string(),
                due_date: "2099-06-01".to_string(),
                priority: Priority::High,
                status: Status::Active,
            })
            .unwrap();

        let task = store.get(1).unwrap();
        assert_eq!(task.description, "reopened");
        assert_eq!(task.due_date, day("2099-06-01"));
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.status, Status::Active);
        // completion history is kept
        assert_eq!(task.completed_at, Some(fixed_now()));
    }

    #[test]
    fn edit_to_completed_stamps_only_when_unset() {
        let (_temp, mut store) = setup();
        store.add_task("a", "2099-01-01", Priority::Low).unwrap();
        let edit = TaskEdit {
            description: "a".to_string(),
            due_date: "2099-01-01".to_string(),
            priority: Priority::Low,
            status: Status::Completed,
        };

        store.edit_task(1, edit.clone()).unwrap();
        assert_eq!(store.get(1).unwrap().completed_at, Some(fixed_now()));

        let mut store = store.with_clock(later_now);
        store.edit_task(1, edit).unwrap();
        assert_eq!(store.get(1).unwrap().completed_at, Some(fixed_now()));
    }

    #[test]
    fn edit_unknown_id_is_reported() {
        let (_temp, mut store) = setup();
        let err = store
            .edit_task(7, TaskEdit {
                description: "a".to_string(),
                due_date: "2099-01-01".to_string(),
                priority: Priority::Low,
                status: Status::Active,
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::TaskNotFound(7)));
    }

    #[test]
    fn count_overdue_only_counts_stored_active() {
        let (_temp, mut store) = setup();
        store.add_task("late", "2000-01-01", Priority::Low).unwrap();
        store.add_task("late and done", "2000-01-01", Priority::Low).unwrap();
        store.add_task("future", "2099-01-01", Priority::Low).unwrap();
        store.mark_done(&ids(&[2])).unwrap();

        let today = day("2024-01-01");
        assert_eq!(store.count_overdue(today), 1);
        // counting does not promote
        assert_eq!(store.get(1).unwrap().status, Status::Active);
    }

    #[test]
    fn filtered_uses_effective_status() {
        let (_temp, mut store) = setup();
        store.add_task("late", "2000-01-01", Priority::Low).unwrap();
        store.add_task("future", "2099-01-01", Priority::Low).unwrap();
        store.add_task("done", "2099-01-01", Priority::Low).unwrap();
        store.mark_done(&ids(&[3])).unwrap();

        let today = day("2024-01-01");
        let pick = |filter| store.filtered(filter, today).iter().map(|t| t.id).collect::<Vec<_>>();
        assert_eq!(pick(StatusFilter::All), vec![1, 2, 3]);
        assert_eq!(pick(StatusFilter::Overdue), vec![1]);
        assert_eq!(pick(StatusFilter::Active), vec![2]);
        assert_eq!(pick(StatusFilter::Completed), vec![3]);
    }

    #[test]
    fn corrupt_record_starts_empty_and_is_preserved() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.json");
        fs::write(&path, "[{\"id\": 1, \"description\": ").unwrap();

        let mut store = TaskStore::open(JsonFile::new(&path)).unwrap();
        assert!(store.tasks().is_empty());
        assert!(store.load_warning().is_some());

        let backup = temp.path().join("tasks.json.corrupt");
        assert_eq!(fs::read_to_string(&backup).unwrap(), "[{\"id\": 1, \"description\": ");

        store.add_task("fresh", "2099-01-01", Priority::Low).unwrap();
        assert_eq!(fs::read_to_string(&backup).unwrap(), "[{\"id\": 1, \"description\": ");
    }

    #[test]
    fn second_corruption_keeps_first_backup() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.json");

        fs::write(&path, "first broken").unwrap();
        TaskStore::open(JsonFile::new(&path)).unwrap();
        fs::write(&path, "second broken").unwrap();
        let store = TaskStore::open(JsonFile::new(&path)).unwrap();

        assert_eq!(fs::read_to_string(temp.path().join("tasks.json.corrupt")).unwrap(), "first broken");
        assert_eq!(fs::read_to_string(temp.path().join("tasks.json.corrupt.1")).unwrap(), "second broken");
        assert!(store.load_warning().unwrap().contains("tasks.json.corrupt.1"));
    }

    #[test]
    fn failed_save_leaves_collection_unchanged() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("data");
        let mut store = TaskStore::open(JsonFile::new(dir.join("tasks.json")))
            .unwrap()
            .with_clock(fixed_now);
        store.add_task("kept", "2099-01-01", Priority::Low).unwrap();
        let before = store.tasks().to_vec();

        // A plain file where the data directory should be makes every save fail
        fs::remove_dir_all(&dir).unwrap();
        fs::write(&dir, "not a directory").unwrap();

        assert!(matches!(store.add_task("new", "2099-01-01", Priority::Low), Err(StoreError::Write { .. })));
        assert!(store.mark_done(&ids(&[1])).is_err());
        assert!(store.delete_tasks(&ids(&[1])).is_err());
        let edit = TaskEdit {
            description: "changed".to_string(),
            due_date: "2099-02-01".to_string(),
            priority: Priority::High,
            status: Status::Completed,
        };
        assert!(store.edit_task(1, edit).is_err());

        assert_eq!(store.tasks(), before.as_slice());
    }

    #[test]
    fn missing_record_is_not_a_warning() {
        let (_temp, store) = setup();
        assert!(store.tasks().is_empty());
        assert!(store.load_warning().is_none());
    }

    #[test]
    fn load_distinguishes_missing_from_corrupt() {
        let temp = TempDir::new().unwrap();
        let file = JsonFile::new(temp.path().join("tasks.json"));
        assert!(matches!(file.load().unwrap(), LoadOutcome::Missing));

        fs::write(file.path(), "not json").unwrap();
        assert!(matches!(file.load().unwrap(), LoadOutcome::Corrupt(_)));

        fs::write(file.path(), "[]").unwrap();
        assert!(matches!(file.load().unwrap(), LoadOutcome::Loaded(ref t) if t.is_empty()));
    }

    #[test]
    fn save_replaces_record_without_leftovers() {
        let temp = TempDir::new().unwrap();
        let file = JsonFile::new(temp.path().join("nested").join("tasks.json"));
        let task = Task::new(1, "a".to_string(), day("2099-01-01"), Priority::Low, fixed_now());

        file.save(&[task.clone()]).unwrap();
        file.save(&[task.clone(), Task { id: 2, ..task.clone() }]).unwrap();

        let entries: Vec<_> = fs::read_dir(temp.path().join("nested")).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(file.load().unwrap().into_tasks().len(), 2);
    }

    #[test]
    fn flush_writes_promoted_statuses() {
        let (temp, mut store) = setup();
        store.add_task("late", "2000-01-01", Priority::Low).unwrap();
        store.refresh_statuses(day("2024-01-01"));
        store.flush().unwrap();

        let tasks = JsonFile::new(temp.path().join("tasks.json")).load().unwrap().into_tasks();
        assert_eq!(tasks[0].status, Status::Overdue);
    }
}
