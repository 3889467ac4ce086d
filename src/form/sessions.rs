use std::collections::HashMap;

use teloxide::types::ChatId;
use tokio::sync::Mutex;

use super::{client::PredictionError, HealthForm, PredictionRequest, PredictionResult, SubmissionState, SubmitRejected};

/// Identifies one opened form of a chat, so that an answer arriving after
/// `/reset` is not applied to the form that replaced it.
pub type Generation = u64;

#[derive(Default)]
struct Entry {
    generation: Generation,
    form: HealthForm,
}

/// Open forms, one per chat. Lives only in memory.
#[derive(Default)]
pub struct Sessions {
    forms: Mutex<HashMap<ChatId, Entry>>,
}

impl Sessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces whatever the chat had with an empty form.
    pub async fn open(&self, chat: ChatId) -> Generation {
        let mut forms = self.forms.lock().await;
        let entry = forms.entry(chat).or_default();
        entry.generation += 1;
        entry.form = HealthForm::new();
        entry.generation
    }

    /// Runs `f` against the chat's form, creating an empty one if needed.
    /// The lock is released before this returns, so never await inside `f`.
    pub async fn with<R>(&self, chat: ChatId, f: impl FnOnce(&mut HealthForm) -> R) -> R {
        let mut forms = self.forms.lock().await;
        f(&mut forms.entry(chat).or_default().form)
    }

    pub async fn start_submission(&self, chat: ChatId) -> Result<(Generation, PredictionRequest), SubmitRejected> {
        let mut forms = self.forms.lock().await;
        let entry = forms.entry(chat).or_default();
        let request = entry.form.start_submission()?;
        Ok((entry.generation, request))
    }

    /// Applies the outcome if the form that sent the request is still open.
    /// Returns the resulting state, or `None` when the outcome was dropped.
    pub async fn finish_submission(
        &self,
        chat: ChatId,
        generation: Generation,
        outcome: Result<PredictionResult, PredictionError>,
    ) -> Option<SubmissionState> {
        let mut forms = self.forms.lock().await;
        let entry = forms.get_mut(&chat).filter(|entry| entry.generation == generation)?;
        entry
            .form
            .finish_submission(outcome)
            .then(|| entry.form.submission.clone())
    }
}
