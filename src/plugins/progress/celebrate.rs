use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::types::AnimalType;

/// How long a confetti trigger stays active.
pub const CONFETTI_DURATION: Duration = Duration::from_secs(2);

/// How long the GIF overlay stays up once its image is ready.
pub const OVERLAY_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Celebration {
    TaskAdded,
    TaskCompleted,
    TaskDeleted,
    AllTasksCleared,
    NotesSaved,
    NotesDeleted,
    UpdateGenerated,
    UpdateCopied,
}

impl Celebration {
    pub const ALL: [Celebration; 8] = [
        Celebration::TaskAdded,
        Celebration::TaskCompleted,
        Celebration::TaskDeleted,
        Celebration::AllTasksCleared,
        Celebration::NotesSaved,
        Celebration::NotesDeleted,
        Celebration::UpdateGenerated,
        Celebration::UpdateCopied,
    ];
}

/// Tracks which confetti effects are currently playing.
#[derive(Debug, Default)]
pub struct CelebrationBoard {
    triggered_at: HashMap<Celebration, Instant>,
}

impl CelebrationBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)starts the effect; a repeat trigger extends it.
    pub fn trigger(&mut self, kind: Celebration, now: Instant) {
        self.triggered_at.insert(kind, now);
    }

    pub fn is_active(&self, kind: Celebration, now: Instant) -> bool {
        self.triggered_at
            .get(&kind)
            .is_some_and(|at| now.saturating_duration_since(*at) < CONFETTI_DURATION)
    }

    /// Active effects in declaration order. Expired entries are dropped.
    pub fn active(&mut self, now: Instant) -> Vec<Celebration> {
        self.triggered_at
            .retain(|_, at| now.saturating_duration_since(*at) < CONFETTI_DURATION);
        Celebration::ALL
            .into_iter()
            .filter(|kind| self.triggered_at.contains_key(kind))
            .collect()
    }
}

/// Tone of the GIF overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GifMood {
    /// An update was generated.
    Happy,
    /// "Generate" was pressed with nothing to report.
    Angry,
}

impl GifMood {
    pub fn search_term(&self, animal: AnimalType) -> String {
        match self {
            GifMood::Happy => format!("silly {} dance png", animal.as_str()),
            GifMood::Angry => format!("super angry {}", animal.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_expires_after_two_seconds() {
        let mut board = CelebrationBoard::new();
        let start = Instant::now();
        board.trigger(Celebration::TaskAdded, start);

        assert!(board.is_active(Celebration::TaskAdded, start));
        assert!(board.is_active(Celebration::TaskAdded, start + Duration::from_millis(1999)));
        assert!(!board.is_active(Celebration::TaskAdded, start + CONFETTI_DURATION));
        assert!(!board.is_active(Celebration::TaskDeleted, start));
    }

    #[test]
    fn test_active_lists_in_order_and_prunes() {
        let mut board = CelebrationBoard::new();
        let start = Instant::now();
        board.trigger(Celebration::UpdateGenerated, start);
        board.trigger(Celebration::TaskAdded, start + Duration::from_secs(1));

        assert_eq!(
            board.active(start + Duration::from_millis(1500)),
            vec![Celebration::TaskAdded, Celebration::UpdateGenerated]
        );
        assert_eq!(
            board.active(start + Duration::from_millis(2500)),
            vec![Celebration::TaskAdded]
        );
        assert!(board.active(start + Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn test_search_terms_follow_animal() {
        assert_eq!(GifMood::Happy.search_term(AnimalType::Cat), "silly cat dance png");
        assert_eq!(GifMood::Angry.search_term(AnimalType::Penguin), "super angry penguin");
    }
}
