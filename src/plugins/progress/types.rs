use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Creation timestamp in milliseconds, unique within the store.
    pub id: i64,
    pub text: String,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    pub username: String,
}

/// Which animal the celebratory GIF search uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimalType {
    #[default]
    Cat,
    Dog,
    Rabbit,
    Hamster,
    Panda,
    Penguin,
}

impl AnimalType {
    pub const ALL: [AnimalType; 6] = [
        AnimalType::Cat,
        AnimalType::Dog,
        AnimalType::Rabbit,
        AnimalType::Hamster,
        AnimalType::Panda,
        AnimalType::Penguin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnimalType::Cat => "cat",
            AnimalType::Dog => "dog",
            AnimalType::Rabbit => "rabbit",
            AnimalType::Hamster => "hamster",
            AnimalType::Panda => "panda",
            AnimalType::Penguin => "penguin",
        }
    }
}

impl std::str::FromStr for AnimalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnimalType::ALL
            .into_iter()
            .find(|animal| animal.as_str() == s)
            .ok_or_else(|| format!("Unknown animal type: {}", s))
    }
}

/// Contents of the task undo slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletedTasks {
    /// A single task removed with `remove_task`.
    Single(Task),
    /// The whole list as it was before `clear_tasks`.
    Bulk(Vec<Task>),
}

/// Persisted fields of the store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressData {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub team_members: Vec<TeamMember>,
    #[serde(default)]
    pub animal_type: AnimalType,
}

/// Record written under the consolidated key: `{"state": {...}, "version": 0}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConsolidatedRecord {
    #[serde(default)]
    pub state: ProgressData,
    #[serde(default)]
    pub version: u32,
}

/// How the store lays its fields out in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PersistLayout {
    /// One key per field (`progress:tasks`, `progress:notes`, ...).
    #[default]
    PerKey,
    /// Every field under the single `progress-store` record.
    Consolidated,
}

/// Slice of state touched by a mutation, passed to store listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    Tasks,
    Notes,
    TeamMembers,
    AnimalType,
    /// Everything may have changed (reload, clear all).
    All,
}
