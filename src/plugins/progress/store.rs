use std::collections::HashSet;

use uuid::Uuid;

use super::helpers::{allocate_task_id, find_task, find_task_mut, MAX_TASK_ID};
use super::types::{
    AnimalType, ConsolidatedRecord, DeletedTasks, PersistLayout, ProgressData, StoreChange,
    Task, TeamMember,
};
use crate::storage::{Storage, StorageKey};

pub type ListenerId = u64;

type Listener = Box<dyn Fn(StoreChange) + Send + Sync>;

/// Single source of truth for tasks, notes, team members and the animal preference.
///
/// Every mutation is written through to the injected [`Storage`]. Write failures are
/// logged by the storage service; the in-memory change always applies.
pub struct ProgressStore {
    storage: Storage,
    layout: PersistLayout,
    data: ProgressData,
    last_deleted_task: Option<DeletedTasks>,
    last_deleted_note: Option<String>,
    last_task_id: i64,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener_id: ListenerId,
}

impl ProgressStore {
    /// Builds the store and hydrates it from `storage`.
    pub fn new(storage: Storage, layout: PersistLayout) -> Self {
        let mut store = Self {
            storage,
            layout,
            data: ProgressData::default(),
            last_deleted_task: None,
            last_deleted_note: None,
            last_task_id: 0,
            listeners: Vec::new(),
            next_listener_id: 0,
        };
        store.data = store.load();
        store.normalize_task_ids();

        tracing::info!(
            target: "store",
            layout = ?store.layout,
            durable = store.storage.is_durable(),
            "Progress store initialized: {} tasks, {} team members",
            store.data.tasks.len(),
            store.data.team_members.len()
        );
        store
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn tasks(&self) -> &[Task] {
        &self.data.tasks
    }

    pub fn notes(&self) -> &str {
        &self.data.notes
    }

    pub fn team_members(&self) -> &[TeamMember] {
        &self.data.team_members
    }

    pub fn animal_type(&self) -> AnimalType {
        self.data.animal_type
    }

    pub fn data(&self) -> &ProgressData {
        &self.data
    }

    pub fn layout(&self) -> PersistLayout {
        self.layout
    }

    pub fn last_deleted_task(&self) -> Option<&DeletedTasks> {
        self.last_deleted_task.as_ref()
    }

    pub fn last_deleted_note(&self) -> Option<&str> {
        self.last_deleted_note.as_deref()
    }

    pub fn is_durable(&self) -> bool {
        self.storage.is_durable()
    }

    // ------------------------------------------------------------------
    // Tasks
    // ------------------------------------------------------------------

    /// Appends a new pending task. Blank text is ignored.
    pub fn add_task(&mut self, text: &str) -> Option<Task> {
        if text.trim().is_empty() {
            return None;
        }

        let task = Task {
            id: allocate_task_id(&mut self.last_task_id),
            text: text.to_string(),
            done: false,
        };
        self.data.tasks.push(task.clone());
        tracing::debug!(target: "store", id = task.id, "Task added");
        self.commit(StoreChange::Tasks);
        Some(task)
    }

    /// Replaces the whole task list. Duplicate ids are re-assigned.
    pub fn set_tasks(&mut self, tasks: Vec<Task>) {
        self.data.tasks = tasks;
        self.normalize_task_ids();
        self.commit(StoreChange::Tasks);
    }

    /// Removes a task and remembers it for undo. An unknown id empties the undo slot.
    pub fn remove_task(&mut self, id: i64) -> Option<Task> {
        let removed = self
            .data
            .tasks
            .iter()
            .position(|task| task.id == id)
            .map(|index| self.data.tasks.remove(index));

        self.last_deleted_task = removed.clone().map(DeletedTasks::Single);

        if removed.is_some() {
            tracing::debug!(target: "store", id, "Task removed");
            self.commit(StoreChange::Tasks);
        }
        removed
    }

    /// Flips `done` and returns the new value.
    pub fn toggle_task(&mut self, id: i64) -> Option<bool> {
        let task = find_task_mut(&mut self.data.tasks, id)?;
        task.done = !task.done;
        let done = task.done;
        self.commit(StoreChange::Tasks);
        Some(done)
    }

    /// Empties the task list, keeping the previous list for undo. Returns how many
    /// tasks were cleared.
    pub fn clear_tasks(&mut self) -> usize {
        let previous = std::mem::take(&mut self.data.tasks);
        let cleared = previous.len();

        if previous.is_empty() {
            self.last_deleted_task = None;
        } else {
            self.last_deleted_task = Some(DeletedTasks::Bulk(previous));
        }

        tracing::debug!(target: "store", cleared, "Tasks cleared");
        self.commit(StoreChange::Tasks);
        cleared
    }

    /// Reverts the last `remove_task` or `clear_tasks`. Returns whether anything changed.
    pub fn undo_task_delete(&mut self) -> bool {
        let Some(deleted) = self.last_deleted_task.take() else {
            return false;
        };

        match deleted {
            DeletedTasks::Single(mut task) => {
                if find_task(&self.data.tasks, task.id).is_some() {
                    task.id = allocate_task_id(&mut self.last_task_id);
                }
                tracing::debug!(target: "store", id = task.id, "Task deletion undone");
                self.data.tasks.push(task);
            }
            DeletedTasks::Bulk(tasks) => {
                tracing::debug!(target: "store", restored = tasks.len(), "Task clear undone");
                self.data.tasks = tasks;
                self.normalize_task_ids();
            }
        }

        self.commit(StoreChange::Tasks);
        true
    }

    // ------------------------------------------------------------------
    // Notes
    // ------------------------------------------------------------------

    pub fn set_notes(&mut self, notes: &str) {
        if self.data.notes == notes {
            return;
        }
        self.data.notes = notes.to_string();
        self.commit(StoreChange::Notes);
    }

    /// Empties the notes, keeping the previous text for undo.
    pub fn clear_notes(&mut self) {
        let previous = std::mem::take(&mut self.data.notes);
        self.last_deleted_note = if previous.is_empty() {
            None
        } else {
            Some(previous)
        };
        self.commit(StoreChange::Notes);
    }

    pub fn undo_note_clear(&mut self) -> bool {
        let Some(previous) = self.last_deleted_note.take() else {
            return false;
        };
        self.data.notes = previous;
        self.commit(StoreChange::Notes);
        true
    }

    // ------------------------------------------------------------------
    // Team members & preferences
    // ------------------------------------------------------------------

    pub fn set_team_members(&mut self, members: Vec<TeamMember>) {
        self.data.team_members = members;
        self.commit(StoreChange::TeamMembers);
    }

    /// Adds a member unless the username is blank or already present.
    pub fn add_team_member(&mut self, username: &str) -> Option<TeamMember> {
        let username = username.trim();
        if username.is_empty() {
            return None;
        }
        if self
            .data
            .team_members
            .iter()
            .any(|member| member.username == username)
        {
            return None;
        }

        let member = TeamMember {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
        };
        self.data.team_members.push(member.clone());
        self.commit(StoreChange::TeamMembers);
        Some(member)
    }

    pub fn remove_team_member(&mut self, id: &str) -> bool {
        let before = self.data.team_members.len();
        self.data.team_members.retain(|member| member.id != id);
        let removed = self.data.team_members.len() != before;
        if removed {
            self.commit(StoreChange::TeamMembers);
        }
        removed
    }

    pub fn set_animal_type(&mut self, animal_type: AnimalType) {
        self.data.animal_type = animal_type;
        self.commit(StoreChange::AnimalType);
    }

    /// Wipes tasks and notes for good. Nothing is kept for undo.
    pub fn clear_all_data(&mut self) {
        self.data.tasks.clear();
        self.data.notes.clear();
        self.last_deleted_task = None;
        self.last_deleted_note = None;

        match self.layout {
            PersistLayout::PerKey => {
                self.storage.remove_item(StorageKey::Tasks.as_str());
                self.storage.remove_item(StorageKey::Notes.as_str());
            }
            PersistLayout::Consolidated => self.persist(StoreChange::All),
        }

        tracing::info!(target: "store", "All tasks and notes cleared");
        self.notify(StoreChange::All);
    }

    // ------------------------------------------------------------------
    // Sync
    // ------------------------------------------------------------------

    /// Re-reads persisted state, e.g. after another instance wrote to the same storage.
    /// Undo buffers are left untouched.
    pub fn reload_from_storage(&mut self) {
        self.data = self.load();
        self.normalize_task_ids();
        tracing::debug!(target: "store", "Store reloaded from storage");
        self.notify(StoreChange::All);
    }

    /// Registers a callback invoked after every mutation.
    pub fn subscribe(&mut self, listener: impl Fn(StoreChange) + Send + Sync + 'static) -> ListenerId {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn commit(&mut self, change: StoreChange) {
        self.persist(change);
        self.notify(change);
    }

    fn notify(&self, change: StoreChange) {
        for (_, listener) in &self.listeners {
            listener(change);
        }
    }

    fn persist(&self, change: StoreChange) {
        match self.layout {
            PersistLayout::Consolidated => {
                let record = ConsolidatedRecord {
                    state: self.data.clone(),
                    version: 0,
                };
                self.storage
                    .set_item(StorageKey::Consolidated.as_str(), &record);
            }
            PersistLayout::PerKey => {
                let all = change == StoreChange::All;
                if all || change == StoreChange::Tasks {
                    self.storage
                        .set_item(StorageKey::Tasks.as_str(), &self.data.tasks);
                }
                if all || change == StoreChange::Notes {
                    self.storage
                        .set_item(StorageKey::Notes.as_str(), &self.data.notes);
                }
                if all || change == StoreChange::TeamMembers {
                    self.storage
                        .set_item(StorageKey::TeamMembers.as_str(), &self.data.team_members);
                }
                if all || change == StoreChange::AnimalType {
                    self.storage
                        .set_item(StorageKey::AnimalType.as_str(), &self.data.animal_type);
                }
            }
        }
    }

    fn load(&self) -> ProgressData {
        match self.layout {
            PersistLayout::Consolidated => self
                .storage
                .get_item::<ConsolidatedRecord>(StorageKey::Consolidated.as_str())
                .map(|record| record.state)
                .unwrap_or_default(),
            PersistLayout::PerKey => ProgressData {
                tasks: self
                    .storage
                    .get_item(StorageKey::Tasks.as_str())
                    .unwrap_or_default(),
                notes: self
                    .storage
                    .get_item(StorageKey::Notes.as_str())
                    .unwrap_or_default(),
                team_members: self
                    .storage
                    .get_item(StorageKey::TeamMembers.as_str())
                    .unwrap_or_default(),
                animal_type: self
                    .storage
                    .get_item(StorageKey::AnimalType.as_str())
                    .unwrap_or_default(),
            },
        }
    }

    /// Keeps ids unique and within `MAX_TASK_ID`, and keeps the id allocator ahead of
    /// every id in the list.
    fn normalize_task_ids(&mut self) {
        let max_id = self
            .data
            .tasks
            .iter()
            .map(|task| task.id)
            .filter(|id| *id <= MAX_TASK_ID)
            .max()
            .unwrap_or(0);
        self.last_task_id = self.last_task_id.max(max_id);

        let mut seen = HashSet::with_capacity(self.data.tasks.len());
        for task in &mut self.data.tasks {
            if task.id > MAX_TASK_ID || !seen.insert(task.id) {
                let fresh = allocate_task_id(&mut self.last_task_id);
                tracing::warn!(target: "store", old = task.id, new = fresh, "Task id re-assigned");
                task.id = fresh;
                seen.insert(fresh);
            }
        }
    }
}
