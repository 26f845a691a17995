// file: src/adapters/lastlog.rs
// version: 1.0.0
// guid: 6a0d3f82-7c45-4e19-b5a8-f12c94d0e763

//! Most-recent-login lookup via lastlog, falling back to last

use crate::platform::Commander;
use crate::ports::LastLoginPort;
use crate::Result;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

fn is_terminal(token: &str) -> bool {
    token.contains('/') || token.starts_with("tty")
}

fn is_source(token: &str) -> bool {
    // An IP parses outright; anything that is not a weekday is taken
    // as a hostname.
    token.parse::<IpAddr>().is_ok() || !WEEKDAYS.contains(&token)
}

/// Parse one `lastlog -u <user>` report line.
fn parse_lastlog(output: &str, username: &str) -> Option<(String, Option<String>)> {
    for line in output.lines() {
        if line.contains("**Never logged in**") {
            return None;
        }
        let mut tokens = line.split_whitespace().peekable();
        if tokens.next() != Some(username) {
            continue;
        }
        if tokens.peek().map(|t| is_terminal(t)).unwrap_or(false) {
            tokens.next();
        }
        let source = if tokens.peek().map(|t| is_source(t)).unwrap_or(false) {
            tokens.next().map(str::to_string)
        } else {
            None
        };
        let timestamp = tokens.collect::<Vec<_>>().join(" ");
        if timestamp.is_empty() {
            return None;
        }
        return Some((timestamp, source));
    }
    None
}

/// Parse the first entry of `last -n 1 <user>` output.
fn parse_last(output: &str, username: &str) -> Option<(String, Option<String>)> {
    for line in output.lines() {
        let mut tokens = line.split_whitespace().peekable();
        if tokens.next() != Some(username) {
            continue;
        }
        if tokens.peek().map(|t| is_terminal(t)).unwrap_or(false) {
            tokens.next();
        }
        let source = if tokens.peek().map(|t| is_source(t)).unwrap_or(false) {
            tokens.next().map(str::to_string)
        } else {
            None
        };
        // Timestamp runs until the logout separator
        let timestamp = tokens
            .take_while(|t| *t != "-")
            .collect::<Vec<_>>()
            .join(" ");
        if timestamp.is_empty() {
            return None;
        }
        return Some((timestamp, source));
    }
    None
}

pub struct LastLoginAdapter {
    commander: Arc<dyn Commander>,
}

impl LastLoginAdapter {
    pub fn new(commander: Arc<dyn Commander>) -> Self {
        Self { commander }
    }
}

#[async_trait::async_trait]
impl LastLoginPort for LastLoginAdapter {
    async fn last_login(&self, username: &str) -> Result<Option<(String, Option<String>)>> {
        if self.commander.succeeds("which", &["lastlog"]).await {
            let output = self.commander.execute("lastlog", &["-u", username]).await?;
            return Ok(parse_lastlog(&output, username));
        }
        debug!("lastlog not available, falling back to last");
        let output = self
            .commander
            .execute("last", &["-n", "1", username])
            .await?;
        Ok(parse_last(&output, username))
    }
}
