//! Voice dictation adapter.
//!
//! Speech-to-text itself is provided by the host through [`SpeechRecognizer`]. This module
//! owns the listening state, permission tracking and transcript bookkeeping.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoiceError {
    #[error("Voice input is not supported in this environment")]
    Unsupported,
    #[error("Microphone access denied")]
    PermissionDenied,
    #[error("Failed to start voice recognition: {0}")]
    StartFailed(String),
    #[error("Failed to stop voice recognition: {0}")]
    StopFailed(String),
}

impl VoiceError {
    /// Message for the dismissible notice shown to the user.
    pub fn notice(&self) -> String {
        match self {
            VoiceError::PermissionDenied => "Microphone access is required for voice input. \
                 Please allow microphone access and try again."
                .to_string(),
            other => other.to_string(),
        }
    }
}

/// Host speech-to-text engine.
pub trait SpeechRecognizer {
    fn is_supported(&self) -> bool;
    /// Asks for microphone access; an error means access was refused.
    fn request_permission(&mut self) -> Result<(), VoiceError>;
    /// Starts continuous recognition. Transcripts arrive through
    /// [`VoiceInput::on_transcript`].
    fn start(&mut self) -> Result<(), VoiceError>;
    fn stop(&mut self) -> Result<(), VoiceError>;
}

pub struct VoiceInput<R: SpeechRecognizer> {
    recognizer: R,
    listening: bool,
    permission: Option<bool>,
    transcript: String,
}

impl<R: SpeechRecognizer> VoiceInput<R> {
    pub fn new(recognizer: R) -> Self {
        Self {
            recognizer,
            listening: false,
            permission: None,
            transcript: String::new(),
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn is_supported(&self) -> bool {
        self.recognizer.is_supported()
    }

    /// `None` until permission was requested at least once.
    pub fn has_permission(&self) -> Option<bool> {
        self.permission
    }

    pub fn current_text(&self) -> &str {
        &self.transcript
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    /// Starts listening. A second call while already listening does nothing.
    pub fn start_listening(&mut self) -> Result<(), VoiceError> {
        if self.listening {
            return Ok(());
        }
        if !self.recognizer.is_supported() {
            return Err(VoiceError::Unsupported);
        }

        if let Err(e) = self.recognizer.request_permission() {
            self.permission = Some(false);
            tracing::warn!(target: "voice", error = %e, "Microphone permission refused");
            return Err(VoiceError::PermissionDenied);
        }
        self.permission = Some(true);

        self.transcript.clear();
        self.recognizer.start()?;
        self.listening = true;
        tracing::debug!(target: "voice", "Voice input started");
        Ok(())
    }

    /// Stops listening. Safe to call when already stopped.
    pub fn stop_listening(&mut self) -> Result<(), VoiceError> {
        if !self.listening {
            return Ok(());
        }
        self.listening = false;
        self.recognizer.stop()?;
        tracing::debug!(target: "voice", "Voice input stopped");
        Ok(())
    }

    /// Feeds an interim transcript. Returns the text when it differs from the last one
    /// so the input field can be refreshed.
    pub fn on_transcript(&mut self, text: &str) -> Option<&str> {
        if text.is_empty() || text == self.transcript {
            return None;
        }
        self.transcript = text.to_string();
        if self.listening {
            Some(self.transcript.as_str())
        } else {
            None
        }
    }

    /// Takes the dictated text for a new task. While listening, the transcript is reset
    /// so the next task starts fresh.
    pub fn take_transcript(&mut self) -> Option<String> {
        let text = self.transcript.trim();
        if text.is_empty() {
            return None;
        }
        let text = text.to_string();
        if self.listening {
            self.transcript.clear();
        }
        Some(text)
    }
}
