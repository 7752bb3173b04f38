//! Command dispatcher
//!
//! Static keyword table plus the state handlers run against.

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::{Config, MatchMode, ResetPolicy};
use crate::registry::Registry;

use super::handlers::{self, Invocation};
use super::{CommandError, ReportLog};

/// Handler signature: parse `args`, act, return the response body
pub(crate) type Handler = fn(&Dispatcher, &Invocation<'_>) -> Result<String, CommandError>;

/// One row of the command table
pub struct CommandSpec {
    pub keyword: &'static str,
    handler: Handler,
}

impl std::fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSpec").field("keyword", &self.keyword).finish()
    }
}

/// Command table. In prefix mode the first keyword that prefixes the line
/// wins, so row order is the tie-break.
pub static COMMANDS: &[CommandSpec] = &[
    CommandSpec { keyword: "SCHEDULE", handler: handlers::schedule },
    CommandSpec { keyword: "DEPARTURES", handler: handlers::departures },
    CommandSpec { keyword: "ARRIVALS", handler: handlers::arrivals },
    CommandSpec { keyword: "UPDATE", handler: handlers::update },
    CommandSpec { keyword: "RELOAD", handler: handlers::reload },
    CommandSpec { keyword: "STATS", handler: handlers::stats },
    CommandSpec { keyword: "RESET", handler: handlers::reset },
    CommandSpec { keyword: "CANCEL", handler: handlers::cancel },
    CommandSpec { keyword: "DETAILS", handler: handlers::details },
    CommandSpec { keyword: "REPORT", handler: handlers::report },
    CommandSpec { keyword: "ESTIMATE", handler: handlers::estimate },
];

/// Routes command lines to handlers
///
/// Stateless beyond its collaborators; shared by every worker behind an `Arc`.
pub struct Dispatcher {
    pub(crate) registry: Arc<Registry>,
    pub(crate) reports: ReportLog,
    pub(crate) clock: Arc<dyn Clock>,
    match_mode: MatchMode,
    pub(crate) reset_policy: ResetPolicy,
}

impl Dispatcher {
    /// Dispatcher using the wall clock, prefix matching and reviving RESET
    pub fn new(registry: Arc<Registry>, reports: ReportLog) -> Self {
        Self {
            registry,
            reports,
            clock: Arc::new(SystemClock),
            match_mode: MatchMode::Prefix,
            reset_policy: ResetPolicy::Revive,
        }
    }

    /// Dispatcher configured from `config`
    pub fn from_config(config: &Config, registry: Arc<Registry>) -> Self {
        Self::new(registry, ReportLog::new(&config.report_log))
            .with_match_mode(config.match_mode)
            .with_reset_policy(config.reset_policy)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    pub fn with_reset_policy(mut self, policy: ResetPolicy) -> Self {
        self.reset_policy = policy;
        self
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Find the table row for `line` and the argument text after its keyword
    pub fn resolve<'a>(&self, line: &'a str) -> Option<(&'static CommandSpec, &'a str)> {
        let line = line.trim_start();
        match self.match_mode {
            MatchMode::Prefix => COMMANDS
                .iter()
                .find(|spec| line.starts_with(spec.keyword))
                .map(|spec| (spec, &line[spec.keyword.len()..])),
            MatchMode::Exact => {
                let token_end = line.find(char::is_whitespace).unwrap_or(line.len());
                let (token, rest) = line.split_at(token_end);
                COMMANDS
                    .iter()
                    .find(|spec| spec.keyword == token)
                    .map(|spec| (spec, rest))
            }
        }
    }

    /// Run one command line and produce its response body
    ///
    /// Never fails: every error becomes response text.
    pub fn dispatch(&self, line: &str, peer: &str) -> String {
        let Some((spec, args)) = self.resolve(line) else {
            tracing::debug!("Unknown command from {}: {:?}", peer, line);
            return CommandError::UnknownCommand.to_string();
        };

        tracing::debug!("Dispatching {} for {}", spec.keyword, peer);
        let invocation = Invocation { args, peer };
        match (spec.handler)(self, &invocation) {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!("{} from {} rejected: {}", spec.keyword, peer, e);
                e.to_string()
            }
        }
    }
}
