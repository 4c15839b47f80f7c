//! Client configuration.
//!
//! Plain data with a one-time defaulting pass. The client defaults a clone
//! of the caller's value at construction; the original is never mutated.

use std::time::Duration;

use regex::bytes::Regex;

use crate::login::{
    DEFAULT_FAILURE_PROMPT, DEFAULT_PASSWORD_PROMPT, DEFAULT_SUCCESS_PROMPT,
    DEFAULT_USERNAME_PROMPT,
};

/// Floor for the connect timeout; zero or lower values are raised to this.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

// ---------------------------------------------------------------------------
// Terminal metadata
// ---------------------------------------------------------------------------

/// Terminal metadata announced during negotiation. Zero or empty fields are
/// filled by `ClientConfig::set_defaults`.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerminalOptions {
    pub width: u16,
    pub height: u16,
    pub term_type: String,
}

impl TerminalOptions {
    fn fill_defaults(&mut self) {
        if self.width == 0 {
            self.width = 80;
        }
        if self.height == 0 {
            self.height = 24;
        }
        if self.term_type.is_empty() {
            self.term_type = "xterm".into();
        }
    }
}

// ---------------------------------------------------------------------------
// Client configuration
// ---------------------------------------------------------------------------

/// Connection and login configuration.
///
/// Every field is optional: `set_defaults` floors the connect timeout,
/// fills terminal metadata, and substitutes the builtin prompt patterns
/// for any left unset. Auto-login engages when both `username` and
/// `password` are non-empty.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClientConfig {
    pub username: String,
    pub password: String,
    /// Timeout for the initial connect only; later reads are unbounded.
    pub timeout: Duration,
    pub terminal: TerminalOptions,

    /// Override for the builtin username-prompt pattern.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub username_prompt: Option<Regex>,
    /// Override for the builtin password-prompt pattern.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub password_prompt: Option<Regex>,
    /// Override for the builtin success-banner pattern.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub success_prompt: Option<Regex>,
    /// Override for the builtin failure-message pattern.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub failure_prompt: Option<Regex>,
}

impl ClientConfig {
    /// One-time defaulting pass. Idempotent; set fields are left alone.
    pub fn set_defaults(&mut self) {
        if self.timeout < DEFAULT_TIMEOUT {
            self.timeout = DEFAULT_TIMEOUT;
        }
        self.terminal.fill_defaults();
        if self.username_prompt.is_none() {
            self.username_prompt = Some(DEFAULT_USERNAME_PROMPT.clone());
        }
        if self.password_prompt.is_none() {
            self.password_prompt = Some(DEFAULT_PASSWORD_PROMPT.clone());
        }
        if self.success_prompt.is_none() {
            self.success_prompt = Some(DEFAULT_SUCCESS_PROMPT.clone());
        }
        if self.failure_prompt.is_none() {
            self.failure_prompt = Some(DEFAULT_FAILURE_PROMPT.clone());
        }
    }
}
