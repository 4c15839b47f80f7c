//! Login automation.
//!
//! Buffers literal server output across reads and matches it against the
//! configured prompt patterns to drive unattended credential submission.
//! Matching runs over the raw accumulated bytes rather than per line:
//! prompts rarely end in a newline, and a pattern may complete mid-stream.

use once_cell::sync::Lazy;
use regex::bytes::Regex;
use tracing::debug;

use crate::config::ClientConfig;

// ---------------------------------------------------------------------------
// Builtin prompt patterns
// ---------------------------------------------------------------------------

// Cover the common English and Chinese prompt spellings.
const USERNAME_REGS: &str =
    r"(?i)login:?\s*$|username:?\s*$|name:?\s*$|用户名:?\s*$|账\s*号:?\s*$|user:?\s*$";
const PASSWORD_REGS: &str = r"(?i)password:?\s*$|ssword:?\s*$|passwd:?\s*$|密\s*码:?\s*$";
const FAILURE_REGS: &str = r"(?i)incorrect|failed|失败|错误";
const SUCCESS_REGS: &str = r"(?i)last\s*login|login\s*time|success|成功|#|>|\$";

pub static DEFAULT_USERNAME_PROMPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(USERNAME_REGS).expect("builtin username pattern"));
pub static DEFAULT_PASSWORD_PROMPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(PASSWORD_REGS).expect("builtin password pattern"));
pub static DEFAULT_FAILURE_PROMPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(FAILURE_REGS).expect("builtin failure pattern"));
pub static DEFAULT_SUCCESS_PROMPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(SUCCESS_REGS).expect("builtin success pattern"));

// ---------------------------------------------------------------------------
// LoginAutomaton
// ---------------------------------------------------------------------------

/// Outcome of feeding one chunk of server output to the automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginStep {
    /// Write these bytes to the peer and keep reading.
    Send(Vec<u8>),
    /// Nothing recognized yet; keep reading.
    Pending,
    /// The success pattern matched; the session is authenticated.
    Success,
    /// The failure pattern matched; credential state was reset so a later
    /// prompt can retry without reconnecting.
    Failed,
}

/// Classifies buffered server output and decides credential submission.
///
/// Tracks which half of the credential exchange has already been sent; the
/// caller performs the actual socket writes.
#[derive(Debug)]
pub struct LoginAutomaton {
    username: String,
    password: String,
    username_prompt: Regex,
    password_prompt: Regex,
    success_prompt: Regex,
    failure_prompt: Regex,
    username_done: bool,
    password_done: bool,
    buffer: Vec<u8>,
}

impl LoginAutomaton {
    /// Build from a defaulted config; unset patterns fall back to the
    /// builtins either way.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            username: config.username.clone(),
            password: config.password.clone(),
            username_prompt: config
                .username_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_USERNAME_PROMPT.clone()),
            password_prompt: config
                .password_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_PASSWORD_PROMPT.clone()),
            success_prompt: config
                .success_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SUCCESS_PROMPT.clone()),
            failure_prompt: config
                .failure_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_FAILURE_PROMPT.clone()),
            username_done: false,
            password_done: false,
            buffer: Vec::with_capacity(1024),
        }
    }

    /// Feed newly received literal bytes and decide the next action.
    ///
    /// Evaluation order: username prompt, password prompt, success banner,
    /// failure message; anything else keeps buffering. The buffer is
    /// cleared after a credential send and after a failure, and kept
    /// otherwise so a prompt split across reads can still complete.
    pub fn advance(&mut self, chunk: &[u8]) -> LoginStep {
        self.buffer.extend_from_slice(chunk);

        if !self.username_done && self.username_prompt.is_match(&self.buffer) {
            debug!("username prompt matched");
            self.username_done = true;
            self.buffer.clear();
            return LoginStep::Send(credential_line(&self.username));
        }

        if !self.password_done && self.password_prompt.is_match(&self.buffer) {
            debug!("password prompt matched");
            self.password_done = true;
            self.buffer.clear();
            return LoginStep::Send(credential_line(&self.password));
        }

        if self.success_prompt.is_match(&self.buffer) {
            debug!("success pattern matched");
            return LoginStep::Success;
        }

        if self.failure_prompt.is_match(&self.buffer) {
            debug!("failure pattern matched");
            self.username_done = false;
            self.password_done = false;
            self.buffer.clear();
            return LoginStep::Failed;
        }

        LoginStep::Pending
    }
}

/// Credential followed by CR NUL, the TELNET end-of-line outside binary mode.
fn credential_line(value: &str) -> Vec<u8> {
    let mut line = Vec::with_capacity(value.len() + 2);
    line.extend_from_slice(value.as_bytes());
    line.extend_from_slice(&[b'\r', 0x00]);
    line
}
