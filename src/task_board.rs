use crate::error::Result;
use crate::storage::{load_task_data, persist_task_data, KeyValueStore, TaskData};
use crate::task::{now_millis, Task};

/// Which list a task lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskList {
    Pending,
    Completed,
}

/// The in-memory task lists together with the store they are persisted to.
///
/// Every method that changes the lists writes the whole state back before
/// returning. If that write fails the in-memory change is kept and the error
/// is returned.
#[derive(Debug)]
pub struct TaskBoard<S: KeyValueStore> {
    data: TaskData,
    store: S,
}

impl<S: KeyValueStore> TaskBoard<S> {
    pub fn open(store: S) -> Self {
        let data = load_task_data(&store);
        tracing::info!(
            pending = data.pending.len(),
            completed = data.completed.len(),
            "loaded task board"
        );
        Self { data, store }
    }

    pub fn data(&self) -> &TaskData {
        &self.data
    }

    pub fn pending(&self) -> &[Task] {
        &self.data.pending
    }

    pub fn completed(&self) -> &[Task] {
        &self.data.completed
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn find(&self, id: &str) -> Option<(TaskList, &Task)> {
        self.data
            .pending
            .iter()
            .find(|t| t.id == id)
            .map(|t| (TaskList::Pending, t))
            .or_else(|| {
                self.data
                    .completed
                    .iter()
                    .find(|t| t.id == id)
                    .map(|t| (TaskList::Completed, t))
            })
    }

    /// Resolves an exact id or an unambiguous id prefix.
    pub fn resolve_id(&self, prefix: &str) -> Option<String> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return None;
        }
        if self.find(prefix).is_some() {
            return Some(prefix.to_string());
        }

        let mut matches = self
            .data
            .pending
            .iter()
            .chain(self.data.completed.iter())
            .filter(|t| t.id.starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(task), None) => Some(task.id.clone()),
            _ => None,
        }
    }

    /// Adds a task at the front of the pending list. Text is trimmed; blank
    /// text adds nothing and returns `None`.
    pub fn add_task(&mut self, text: &str) -> Result<Option<String>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let task = Task::new(text);
        let id = task.id.clone();
        self.data.pending.insert(0, task);
        tracing::info!(%id, "added task");
        self.persist()?;
        Ok(Some(id))
    }

    /// Moves a pending task to the front of the completed list.
    pub fn complete_task(&mut self, id: &str) -> Result<bool> {
        let Some(index) = self.data.pending.iter().position(|t| t.id == id) else {
            return Ok(false);
        };
        let task = self.data.pending.remove(index).complete(now_millis());
        self.data.completed.insert(0, task);
        tracing::info!(%id, "completed task");
        self.persist()?;
        Ok(true)
    }

    /// Moves a completed task back to the front of the pending list.
    pub fn restore_task(&mut self, id: &str) -> Result<bool> {
        let Some(index) = self.data.completed.iter().position(|t| t.id == id) else {
            return Ok(false);
        };
        let task = self.data.completed.remove(index).restore();
        self.data.pending.insert(0, task);
        tracing::info!(%id, "restored task");
        self.persist()?;
        Ok(true)
    }

    pub fn delete_pending_task(&mut self, id: &str) -> Result<bool> {
        self.delete_from(TaskList::Pending, id)
    }

    pub fn delete_completed_task(&mut self, id: &str) -> Result<bool> {
        self.delete_from(TaskList::Completed, id)
    }

    /// Deletes a task from whichever list holds it.
    pub fn delete_task(&mut self, id: &str) -> Result<bool> {
        match self.find(id) {
            Some((list, _)) => self.delete_from(list, id),
            None => Ok(false),
        }
    }

    fn delete_from(&mut self, list: TaskList, id: &str) -> Result<bool> {
        let tasks = match list {
            TaskList::Pending => &mut self.data.pending,
            TaskList::Completed => &mut self.data.completed,
        };
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Ok(false);
        }
        tracing::info!(%id, ?list, "deleted task");
        self.persist()?;
        Ok(true)
    }

    fn persist(&mut self) -> Result<()> {
        persist_task_data(&mut self.store, &self.data).inspect_err(|err| {
            tracing::warn!("failed to persist tasks: {}", err);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GardenError;
    use crate::storage::{FileStore, MemoryStore, STORAGE_KEY};

    fn board() -> TaskBoard<MemoryStore> {
        TaskBoard::open(MemoryStore::new())
    }

    fn reloaded(board: &TaskBoard<MemoryStore>) -> TaskData {
        load_task_data(board.store())
    }

    #[test]
    fn add_places_trimmed_task_first() {
        let mut board = board();
        board.add_task("first").unwrap();
        let id = board.add_task("  second  ").unwrap().unwrap();

        assert_eq!(board.pending().len(), 2);
        assert_eq!(board.pending()[0].id, id);
        assert_eq!(board.pending()[0].text, "second");
        assert_eq!(reloaded(&board).pending.len(), 2);
    }

    #[test]
    fn add_blank_is_ignored() {
        let mut board = board();
        assert_eq!(board.add_task("   \t ").unwrap(), None);
        assert_eq!(board.add_task("").unwrap(), None);
        assert!(board.pending().is_empty());
        assert_eq!(board.store().get(STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn complete_moves_task_to_front_of_completed() {
        let mut board = board();
        let a = board.add_task("a").unwrap().unwrap();
        let b = board.add_task("b").unwrap().unwrap();
        board.complete_task(&b).unwrap();
        assert!(board.complete_task(&a).unwrap());

        assert!(board.pending().is_empty());
        assert_eq!(board.completed()[0].id, a);
        assert_eq!(board.completed()[0].text, "a");
        assert!(board.completed()[0].completed);
        assert!(board.completed()[0].completed_at.is_some());
        assert_eq!(board.completed()[1].id, b);
        assert_eq!(reloaded(&board), *board.data());
    }

    #[test]
    fn complete_unknown_or_completed_is_noop() {
        let mut board = board();
        let id = board.add_task("a").unwrap().unwrap();
        board.complete_task(&id).unwrap();
        let snapshot = board.data().clone();

        assert!(!board.complete_task(&id).unwrap());
        assert!(!board.complete_task("missing").unwrap());
        assert_eq!(*board.data(), snapshot);
    }

    #[test]
    fn restore_moves_back_and_clears_completion() {
        let mut board = board();
        let a = board.add_task("a").unwrap().unwrap();
        board.add_task("b").unwrap();
        board.complete_task(&a).unwrap();

        assert!(board.restore_task(&a).unwrap());
        assert!(board.completed().is_empty());
        assert_eq!(board.pending()[0].id, a);
        assert!(!board.pending()[0].completed);
        assert_eq!(board.pending()[0].completed_at, None);
        assert!(!board.restore_task(&a).unwrap());
    }

    #[test]
    fn delete_removes_from_either_list() {
        let mut board = board();
        let a = board.add_task("a").unwrap().unwrap();
        let b = board.add_task("b").unwrap().unwrap();
        board.complete_task(&b).unwrap();

        assert!(board.delete_task(&b).unwrap());
        assert!(board.completed().is_empty());
        assert!(board.delete_task(&a).unwrap());
        assert!(board.pending().is_empty());
        assert_eq!(reloaded(&board), TaskData::default());
    }

    #[test]
    fn delete_nonexistent_is_noop() {
        let mut board = board();
        let a = board.add_task("a").unwrap().unwrap();
        let snapshot = board.data().clone();

        assert!(!board.delete_task("nope").unwrap());
        assert!(!board.delete_completed_task(&a).unwrap());
        assert_eq!(*board.data(), snapshot);
    }

    #[test]
    fn list_specific_delete() {
        let mut board = board();
        let a = board.add_task("a").unwrap().unwrap();
        assert!(board.delete_pending_task(&a).unwrap());

        let b = board.add_task("b").unwrap().unwrap();
        board.complete_task(&b).unwrap();
        assert!(!board.delete_pending_task(&b).unwrap());
        assert!(board.delete_completed_task(&b).unwrap());
    }

    #[test]
    fn id_lives_in_one_list_only() {
        let mut board = board();
        let a = board.add_task("a").unwrap().unwrap();
        board.complete_task(&a).unwrap();
        board.restore_task(&a).unwrap();
        board.complete_task(&a).unwrap();

        let in_pending = board.pending().iter().filter(|t| t.id == a).count();
        let in_completed = board.completed().iter().filter(|t| t.id == a).count();
        assert_eq!(in_pending + in_completed, 1);
        assert!(matches!(board.find(&a), Some((TaskList::Completed, _))));
    }

    #[test]
    fn resolve_id_accepts_unique_prefix() {
        let store = MemoryStore::with_entry(
            STORAGE_KEY,
            r#"{"pending":[{"id":"abc123","text":"x"},{"id":"abd456","text":"y"}],
                "completed":[{"id":"zzz","text":"z","completed":true}]}"#,
        );
        let board = TaskBoard::open(store);
        assert_eq!(board.resolve_id("abc").as_deref(), Some("abc123"));
        assert_eq!(board.resolve_id("z").as_deref(), Some("zzz"));
        assert_eq!(board.resolve_id("ab"), None);
        assert_eq!(board.resolve_id("q"), None);
        assert_eq!(board.resolve_id(""), None);
    }

    #[test]
    fn state_survives_reopen_from_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let mut board = TaskBoard::open(FileStore::new(tmp.path()));
        let a = board.add_task("a").unwrap().unwrap();
        board.add_task("b").unwrap();
        board.complete_task(&a).unwrap();
        let expected = board.data().clone();
        drop(board);

        let board = TaskBoard::open(FileStore::new(tmp.path()));
        assert_eq!(*board.data(), expected);
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(std::io::Error::other("unreadable").into())
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(std::io::Error::other("read-only").into())
        }
    }

    #[test]
    fn write_failure_is_reported_but_state_kept() {
        let mut board = TaskBoard::open(FailingStore);
        assert!(board.pending().is_empty());

        let err = board.add_task("a").unwrap_err();
        assert!(matches!(err, GardenError::Io(_)));
        assert_eq!(board.pending().len(), 1);
    }
}
