//! Fire-and-forget presentation layer (help text, notifications, audio cues).
//!
//! The core never waits on presentation.  Text is already localized by the
//! caller; cue selection and playback belong to the host.

/// An audio/visual cue the host maps to concrete assets.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cue {
    Confirm,
    Deny,
    Alert,
    /// A radio line, identified by a host-side key.
    Radio(String),
}

/// Presentation hooks invoked by controllers.
pub trait Presentation {
    /// Replace the contextual help prompt.
    fn help_text(&mut self, text: &str);

    /// Show a transient notification.
    fn notify(&mut self, text: &str);

    fn cue(&mut self, cue: Cue);
}

/// A [`Presentation`] that discards everything.
pub struct NoopPresentation;

impl Presentation for NoopPresentation {
    fn help_text(&mut self, _text: &str) {}
    fn notify(&mut self, _text: &str) {}
    fn cue(&mut self, _cue: Cue) {}
}

/// One recorded presentation call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Presented {
    Help(String),
    Notify(String),
    Cue(Cue),
}

/// A [`Presentation`] that records every call, for tests and the demo log.
#[derive(Default)]
pub struct RecordingPresentation {
    pub log: Vec<Presented>,
}

impl RecordingPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if any notification contains `needle`.
    pub fn notified(&self, needle: &str) -> bool {
        self.log
            .iter()
            .any(|p| matches!(p, Presented::Notify(text) if text.contains(needle)))
    }

    /// Take the recorded calls, leaving the log empty.
    pub fn drain(&mut self) -> Vec<Presented> {
        std::mem::take(&mut self.log)
    }
}

impl Presentation for RecordingPresentation {
    fn help_text(&mut self, text: &str) {
        self.log.push(Presented::Help(text.to_owned()));
    }

    fn notify(&mut self, text: &str) {
        self.log.push(Presented::Notify(text.to_owned()));
    }

    fn cue(&mut self, cue: Cue) {
        self.log.push(Presented::Cue(cue));
    }
}
