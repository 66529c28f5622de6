use std::collections::HashSet;
use std::fs;

use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;
use traker::{JsonFile, LoadOutcome, Priority, Status, StatusFilter, StoreError, TaskEdit, TaskStore, ValidationError};

fn fixed_clock() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2024-03-10 08:30:00", "%Y-%m-%d %H:%M:%S").unwrap()
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn open(temp_dir: &TempDir) -> TaskStore {
    TaskStore::open(JsonFile::new(temp_dir.path().join("tasks.json")))
        .unwrap()
        .with_clock(fixed_clock)
}

fn ids(list: &[u64]) -> HashSet<u64> {
    list.iter().copied().collect()
}

#[test]
fn tasks_survive_a_restart_in_order() {
    let temp_dir = TempDir::new().unwrap();
    {
        let mut store = open(&temp_dir);
        store.add_task("Купить хлеб", "2024-03-12", Priority::High).unwrap();
        store.add_task("Write report", "2024-03-20", Priority::Low).unwrap();
        store.add_task("Call mom ☎", "2024-03-11", Priority::Medium).unwrap();
    }

    let store = open(&temp_dir);
    let descriptions: Vec<&str> = store.tasks().iter().map(|t| t.description.as_str()).collect();
    assert_eq!(descriptions, ["Купить хлеб", "Write report", "Call mom ☎"]);
    assert_eq!(store.get(1).unwrap().created_at, fixed_clock());
    assert!(store.load_warning().is_none());
}

#[test]
fn overdue_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = open(&temp_dir);
    store.add_task("Pay rent", "2024-03-01", Priority::High).unwrap();
    store.add_task("Plan trip", "2024-04-01", Priority::Low).unwrap();

    let today = day("2024-03-10");
    assert_eq!(store.count_overdue(today), 1);
    assert_eq!(store.refresh_statuses(today), 1);
    assert_eq!(store.refresh_statuses(today), 0);
    assert_eq!(store.count_overdue(today), 0);

    let overdue: Vec<u64> = store.filtered(StatusFilter::Overdue, today).iter().map(|t| t.id).collect();
    assert_eq!(overdue, [1]);

    // Completing an overdue task takes it out of the overdue view for good
    assert_eq!(store.mark_done(&ids(&[1])).unwrap(), 1);
    assert!(store.filtered(StatusFilter::Overdue, day("2030-01-01")).iter().all(|t| t.id != 1));
    assert_eq!(store.get(1).unwrap().completed_at, Some(fixed_clock()));

    store.flush().unwrap();
    let reopened = open(&temp_dir);
    assert_eq!(reopened.get(1).unwrap().status, Status::Completed);
}

#[test]
fn invalid_input_leaves_the_record_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = open(&temp_dir);
    store.add_task("Keep me", "2024-03-12", Priority::Low).unwrap();
    let before = fs::read_to_string(store.file().path()).unwrap();

    assert!(matches!(
        store.add_task("   ", "2024-03-12", Priority::Low),
        Err(StoreError::Validation(ValidationError::EmptyDescription))
    ));
    assert!(matches!(
        store.add_task("Bad date", "2024-02-30", Priority::Low),
        Err(StoreError::Validation(ValidationError::InvalidDate(_)))
    ));
    let edit = TaskEdit {
        description: "Changed".to_string(),
        due_date: "12/03/2024".to_string(),
        priority: Priority::High,
        status: Status::Active,
    };
    assert!(store.edit_task(1, edit).is_err());

    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.get(1).unwrap().description, "Keep me");
    assert_eq!(fs::read_to_string(store.file().path()).unwrap(), before);
}

#[test]
fn bulk_operations_ignore_unknown_ids() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = open(&temp_dir);
    for name in ["a", "b", "c"] {
        store.add_task(name, "2024-03-12", Priority::Medium).unwrap();
    }

    assert_eq!(store.delete_tasks(&ids(&[2, 42])).unwrap(), 1);
    assert_eq!(store.mark_done(&ids(&[3, 42])).unwrap(), 1);
    // Already completed tasks are not counted again
    assert_eq!(store.mark_done(&ids(&[3])).unwrap(), 0);

    let reopened = open(&temp_dir);
    let remaining: Vec<u64> = reopened.tasks().iter().map(|t| t.id).collect();
    assert_eq!(remaining, [1, 3]);
}

#[test]
fn legacy_record_with_localized_labels_loads() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tasks.json");
    fs::write(
        &path,
        r#"[
  {
    "id": 7,
    "description": "Сдать отчёт",
    "due_date": "2024-03-01",
    "priority": "Высокий",
    "status": "Выполненная",
    "created_at": "2024-02-20 10:00:00",
    "completed_at": "2024-02-28 18:15:00"
  }
]"#,
    )
    .unwrap();

    let mut store = TaskStore::open(JsonFile::new(&path)).unwrap().with_clock(fixed_clock);
    let task = store.get(7).unwrap();
    assert_eq!(task.priority, Priority::High);
    assert_eq!(task.status, Status::Completed);

    // New ids continue after the highest stored one
    let added = store.add_task("Next", "2024-03-15", Priority::Low).unwrap();
    assert_eq!(added.id, 8);
}

#[test]
fn corrupt_record_is_preserved_and_reported() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tasks.json");
    fs::write(&path, "{ not json").unwrap();

    assert!(matches!(JsonFile::new(&path).load().unwrap(), LoadOutcome::Corrupt(_)));

    let mut store = TaskStore::open(JsonFile::new(&path)).unwrap();
    assert!(store.tasks().is_empty());
    assert!(store.load_warning().is_some());
    assert_eq!(fs::read_to_string(temp_dir.path().join("tasks.json.corrupt")).unwrap(), "{ not json");

    store.add_task("Fresh start", "2024-03-12", Priority::Low).unwrap();
    let reopened = TaskStore::open(JsonFile::new(&path)).unwrap();
    assert_eq!(reopened.tasks().len(), 1);
    assert!(reopened.load_warning().is_none());
}

#[test]
fn reopened_collection_equals_saved_one() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = open(&temp_dir);
    store.add_task("Сдать отчёт", "2024-03-01", Priority::High).unwrap();
    store.add_task("Water plants 🌱", "2024-04-01", Priority::Low).unwrap();
    store.add_task("Pay rent", "2024-02-01", Priority::Medium).unwrap();
    store.add_task("Plan trip", "2024-05-01", Priority::Medium).unwrap();

    // Mixed stored statuses: Completed with a stamp, Overdue, reopened Active with a stamp
    store.mark_done(&ids(&[2, 4])).unwrap();
    store.refresh_statuses(day("2024-03-10"));
    let reopen = TaskEdit {
        description: "Plan trip".to_string(),
        due_date: "2024-05-01".to_string(),
        priority: Priority::Medium,
        status: Status::Active,
    };
    store.edit_task(4, reopen).unwrap();
    store.flush().unwrap();

    let saved = store.tasks().to_vec();
    assert_eq!(saved[0].status, Status::Overdue);
    assert_eq!(saved[1].completed_at, Some(fixed_clock()));
    assert_eq!(saved[3].status, Status::Active);
    assert!(saved[3].completed_at.is_some());

    let reopened = open(&temp_dir);
    assert_eq!(reopened.tasks(), saved.as_slice());
}
