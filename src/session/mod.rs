use crate::errors::GenError;
use crate::extract;
use crate::transcript::Transcript;
use crate::prompt;
use crate::provider::DynProvider;
use crate::wire::{ChatRequest, Conversation, Message};

/// Where a session currently is, derived from its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Empty,
    Hidden,
    Visible,
}

/// State of one interactive session. Lives as long as the process, never saved.
#[derive(Debug, Clone)]
pub struct Session {
    pub messages: Conversation,
    pub code: Option<String>,
    pub output: Option<String>,
    pub show_code: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            messages: prompt::starting_conversation(),
            code: None,
            output: None,
            show_code: false,
        }
    }

    /// Anything beyond the system message means a generation already committed.
    pub fn has_generated(&self) -> bool {
        self.messages.len() > 1
    }

    /// Reset mode when nothing was generated yet, or when the user asks for it.
    pub fn should_reset(&self, reset_requested: bool) -> bool {
        !self.has_generated() || reset_requested
    }

    pub fn toggle_code(&mut self) {
        self.show_code = !self.show_code;
    }

    pub fn phase(&self) -> Phase {
        match (&self.code, self.show_code) {
            (None, _) => Phase::Empty,
            (Some(_), false) => Phase::Hidden,
            (Some(_), true) => Phase::Visible,
        }
    }

    fn commit(&mut self, mut submitted: Conversation, reply: String, code: String) {
        submitted.push(Message::assistant(reply.clone()));
        self.messages = submitted;
        self.code = Some(code);
        self.output = Some(reply);
    }
}

/// Result of a committed cycle, for the presentation layer.
#[derive(Debug, Clone)]
pub struct Generated {
    pub reset: bool,
    pub language: String,
    pub bytes: usize,
}

/// Runs generation cycles against a provider and commits them to a [`Session`].
pub struct Generator {
    provider: DynProvider,
    model: String,
    temperature: f32,
    transcript: Option<Transcript>,
}

impl Generator {
    pub fn new(provider: DynProvider, model: impl Into<String>, temperature: f32) -> Self {
        Self { provider, model: model.into(), temperature, transcript: None }
    }

    pub fn with_transcript(mut self, transcript: Option<Transcript>) -> Self {
        self.transcript = transcript;
        self
    }

    /// One full cycle: build prompt, call the provider, extract, then commit.
    /// `session` is only written after every fallible step succeeded.
    pub async fn generate(
        &mut self,
        session: &mut Session,
        user_input: &str,
        reset_requested: bool,
    ) -> Result<Generated, GenError> {
        let reset = session.should_reset(reset_requested);
        let submitted = prompt::build_conversation(reset, user_input, &session.messages);
        let req = ChatRequest {
            model: self.model.clone(),
            messages: submitted,
            temperature: self.temperature,
        };

        log::info!(
            "generating ({} mode, {} messages)",
            if reset { "reset" } else { "modify" },
            req.messages.len()
        );

        let reply = self.provider.complete(&req).await.map_err(GenError::from)?;

        if let Some(t) = self.transcript.as_mut() {
            // diagnostics only; a failed write must not fail the cycle
            if let Err(e) = t.save_turn(&req, &reply) {
                log::warn!("could not save transcript: {:#}", e);
            }
        }

        let extracted = match extract::extract_single_block(&reply) {
            Ok(x) => x,
            Err(e) => {
                log::warn!("rejected reply: {}", e);
                return Err(e);
            }
        };

        let generated = Generated {
            reset,
            language: extracted.language,
            bytes: extracted.code.len(),
        };
        session.commit(req.messages, reply, extracted.code);
        log::info!("session updated, {} messages", session.messages.len());
        Ok(generated)
    }
}
