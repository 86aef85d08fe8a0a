//! UI-facing control flow.
//!
//! A `Session` turns user actions into store mutations and celebration events, and
//! drives "generate update" through the GIF proxy.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use super::celebrate::{Celebration, GifMood, OVERLAY_DURATION};
use super::helpers::preview;
use super::store::ProgressStore;
use super::types::Task;
use super::update::{generate_update, UpdateOutcome};
use super::voice::{SpeechRecognizer, VoiceInput};
use crate::core::debounce::Debouncer;
use crate::plugins::gifs::GifClient;

/// Quiet period before note edits count as saved.
pub const NOTES_SAVED_DELAY: Duration = Duration::from_secs(1);

const NOTICE_PREVIEW_CHARS: usize = 100;

/// Toast offering an undo after a destructive action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoNotice {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifOverlay {
    pub url: String,
    pub mood: GifMood,
    pub dismiss_after: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub outcome: UpdateOutcome,
    pub overlay: GifOverlay,
}

pub struct Session {
    store: ProgressStore,
    gifs: GifClient,
    notes_saved: Debouncer,
    events: UnboundedSender<Celebration>,
    last_update: Option<String>,
}

impl Session {
    /// Returns the session and the stream of celebrations the UI should play.
    ///
    /// The notes-saved timer uses the runtime current at construction, if any. Hosts that
    /// call in from a non-async UI thread should use [`Session::with_handle`].
    pub fn new(store: ProgressStore, gifs: GifClient) -> (Self, UnboundedReceiver<Celebration>) {
        Self::build(store, gifs, Handle::try_current().ok())
    }

    /// Like [`Session::new`], with timers spawned on `runtime`.
    pub fn with_handle(
        store: ProgressStore,
        gifs: GifClient,
        runtime: Handle,
    ) -> (Self, UnboundedReceiver<Celebration>) {
        Self::build(store, gifs, Some(runtime))
    }

    fn build(
        store: ProgressStore,
        gifs: GifClient,
        runtime: Option<Handle>,
    ) -> (Self, UnboundedReceiver<Celebration>) {
        let (events, rx) = unbounded_channel();

        let saved_tx = events.clone();
        let on_saved = move || {
            let _ = saved_tx.send(Celebration::NotesSaved);
        };
        let notes_saved = match runtime {
            Some(handle) => Debouncer::with_handle(NOTES_SAVED_DELAY, handle, on_saved),
            None => Debouncer::new(NOTES_SAVED_DELAY, on_saved),
        };

        let session = Self {
            store,
            gifs,
            notes_saved,
            events,
            last_update: None,
        };
        (session, rx)
    }

    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ProgressStore {
        &mut self.store
    }

    /// Text of the last generated update, if any.
    pub fn last_update(&self) -> Option<&str> {
        self.last_update.as_deref()
    }

    fn celebrate(&self, kind: Celebration) {
        // The receiver may be gone when the UI is torn down.
        let _ = self.events.send(kind);
    }

    pub fn add_task(&mut self, text: &str) -> Option<Task> {
        let task = self.store.add_task(text)?;
        self.celebrate(Celebration::TaskAdded);
        Some(task)
    }

    pub fn toggle_task(&mut self, id: i64) -> Option<bool> {
        let done = self.store.toggle_task(id)?;
        if done {
            self.celebrate(Celebration::TaskCompleted);
        }
        Some(done)
    }

    pub fn remove_task(&mut self, id: i64) -> Option<UndoNotice> {
        let task = self.store.remove_task(id)?;
        self.celebrate(Celebration::TaskDeleted);
        Some(UndoNotice {
            title: "Task deleted".to_string(),
            description: preview(&task.text, NOTICE_PREVIEW_CHARS),
        })
    }

    pub fn clear_tasks(&mut self) -> Option<UndoNotice> {
        if self.store.clear_tasks() == 0 {
            return None;
        }
        self.celebrate(Celebration::AllTasksCleared);
        Some(UndoNotice {
            title: "All tasks cleared".to_string(),
            description: "All tasks have been removed".to_string(),
        })
    }

    pub fn undo_task_delete(&mut self) -> bool {
        self.store.undo_task_delete()
    }

    /// Stores the notes and restarts the "saved" countdown.
    pub fn set_notes(&mut self, notes: &str) {
        self.store.set_notes(notes);
        self.notes_saved.schedule();
    }

    pub fn clear_notes(&mut self) -> Option<UndoNotice> {
        if self.store.notes().is_empty() {
            self.store.clear_notes();
            return None;
        }
        self.notes_saved.cancel();
        self.store.clear_notes();
        self.celebrate(Celebration::NotesDeleted);
        Some(UndoNotice {
            title: "Notes cleared".to_string(),
            description: "Your notes have been removed".to_string(),
        })
    }

    pub fn undo_note_clear(&mut self) -> bool {
        self.store.undo_note_clear()
    }

    pub fn clear_all_data(&mut self) {
        let had_notes = !self.store.notes().trim().is_empty();
        self.notes_saved.cancel();
        self.store.clear_all_data();
        self.last_update = None;

        self.celebrate(Celebration::AllTasksCleared);
        if had_notes {
            self.celebrate(Celebration::NotesDeleted);
        }
    }

    /// Adds the dictated text as a task.
    pub fn add_voice_transcript<R: SpeechRecognizer>(
        &mut self,
        voice: &mut VoiceInput<R>,
    ) -> Option<Task> {
        let text = voice.take_transcript()?;
        self.add_task(&text)
    }

    /// Builds the summary and fetches the GIF to show with it. Never fails: a GIF error
    /// falls back to the static URL.
    pub async fn generate_update(&mut self) -> Generated {
        let outcome = generate_update(self.store.tasks(), self.store.notes());

        let mood = match &outcome {
            UpdateOutcome::Empty => {
                self.last_update = None;
                GifMood::Angry
            }
            UpdateOutcome::Ready(text) => {
                self.last_update = Some(text.clone());
                GifMood::Happy
            }
        };

        let term = mood.search_term(self.store.animal_type());
        let url = self.gifs.fetch_or_fallback(&term).await;

        if mood == GifMood::Happy {
            self.celebrate(Celebration::UpdateGenerated);
        }

        Generated {
            outcome,
            overlay: GifOverlay {
                url,
                mood,
                dismiss_after: OVERLAY_DURATION,
            },
        }
    }

    /// Text to put on the clipboard, if an update was generated.
    pub fn copy_update(&self) -> Option<&str> {
        let text = self.last_update.as_deref()?;
        self.celebrate(Celebration::UpdateCopied);
        Some(text)
    }
}
