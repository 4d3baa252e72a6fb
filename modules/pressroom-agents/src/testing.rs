//! Test doubles for the generative backends.
//!
//! `ScriptedModel` plays back queued replies in order; `FixedImageSynth` and
//! `FailOnTrigger` cover the happy and per-item-failure image paths. Builder
//! style registration, `Err` for anything unscripted.

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use ai_client::{ImageSynth, TextModel};

/// Plays back queued text responses in FIFO order. An exhausted queue is a
/// test bug and returns `Err`.
pub struct ScriptedModel {
    responses: Mutex<VecDeque<Result<String, String>>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
        }
    }

    pub fn reply(self, text: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(text.to_string()));
        self
    }

    /// Queue a backend failure (network/quota class, propagates to callers).
    pub fn fail(self, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }
}

impl Default for ScriptedModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextModel for ScriptedModel {
    async fn generate(&self, _prompt: &str, _temperature: f32) -> Result<String> {
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => bail!("scripted model failure: {message}"),
            None => bail!("ScriptedModel: no scripted response left"),
        }
    }
}

/// Always returns the same URL, suffixed with a call counter so outputs are
/// distinguishable.
pub struct FixedImageSynth {
    url: String,
    calls: Mutex<u32>,
}

impl FixedImageSynth {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl ImageSynth for FixedImageSynth {
    async fn synthesize(&self, _prompt: &str) -> Result<String> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        Ok(format!("{}?n={}", self.url, *calls))
    }
}

/// Fails for any prompt containing `trigger`, succeeds otherwise.
pub struct FailOnTrigger {
    trigger: String,
    url: String,
}

impl FailOnTrigger {
    pub fn new(trigger: &str, url: &str) -> Self {
        Self {
            trigger: trigger.to_string(),
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl ImageSynth for FailOnTrigger {
    async fn synthesize(&self, prompt: &str) -> Result<String> {
        if prompt.contains(&self.trigger) {
            bail!("simulated image backend failure");
        }
        Ok(self.url.clone())
    }
}
