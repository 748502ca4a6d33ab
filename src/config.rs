//! Activation directives read from the environment.
//!
//! A test harness can arm points in a child process without touching its
//! code by setting `FAULT_POINTS` before launch:
//!
//! ```text
//! FAULT_POINTS="wal::fsync=oneshot(5);net::connect=-111;wal::open=off"
//! ```
//!
//! Namespaces and names may not themselves contain `::`. Error codes are
//! decimal and may carry a sign.
//!
//! The variable is read once per process. Its directives apply to a module's
//! points the moment the module is linked into the process-wide registry, so
//! components loaded late are configured too.

use std::num::ParseIntError;
use std::str::FromStr;
use std::sync::OnceLock;

use thiserror::Error;

use crate::module::ModuleTable;
use crate::point::{FaultPoint, Mode};
use crate::registry;

/// Environment variable holding activation directives.
pub const ENV_FAULT_POINTS: &str = "FAULT_POINTS";

/// Directives parsed from [`ENV_FAULT_POINTS`], read once per process.
static ENV_DIRECTIVES: OnceLock<Vec<Directive>> = OnceLock::new();

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("directive `{0}` is not of the form namespace::name")]
    MissingSeparator(String),

    #[error("directive `{0}` has an empty namespace or name")]
    EmptyName(String),

    #[error("unknown mode `{mode}` in directive `{directive}`")]
    UnknownMode { directive: String, mode: String },

    #[error("invalid error code `{code}` in directive `{directive}`")]
    InvalidErrorCode {
        directive: String,
        code: String,
        #[source]
        source: ParseIntError,
    },

    #[error("unterminated error code in directive `{0}`")]
    Unterminated(String),
}

/// What a directive does to its point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Activate, optionally replacing the error code.
    Activate { mode: Mode, error_code: Option<i32> },
    Deactivate,
}

/// One `namespace::name[=action]` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub namespace: String,
    pub name: String,
    pub action: Action,
}

impl Directive {
    pub fn targets(&self, point: &FaultPoint) -> bool {
        point.matches(&self.namespace, &self.name)
    }

    /// Apply the action to `point`. The error code is written before the
    /// point is activated.
    pub fn apply(&self, point: &FaultPoint) {
        match self.action {
            Action::Activate { mode, error_code } => {
                if let Some(code) = error_code {
                    point.set_error_code(code);
                }
                point.activate(mode);
            }
            Action::Deactivate => point.deactivate(),
        }
        tracing::debug!(
            namespace = point.namespace(),
            name = point.name(),
            action = ?self.action,
            "applied fault point directive"
        );
    }
}

impl FromStr for Directive {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        let (target, action) = match raw.split_once('=') {
            Some((target, action)) => (target.trim(), Some(action.trim())),
            None => (raw, None),
        };

        let (namespace, name) = target
            .split_once("::")
            .ok_or_else(|| ConfigError::MissingSeparator(raw.to_string()))?;
        let (namespace, name) = (namespace.trim(), name.trim());
        if name.contains("::") {
            return Err(ConfigError::MissingSeparator(raw.to_string()));
        }
        if namespace.is_empty() || name.is_empty() {
            return Err(ConfigError::EmptyName(raw.to_string()));
        }

        let action = match action {
            None => Action::Activate {
                mode: Mode::Multiple,
                error_code: None,
            },
            Some(action) => parse_action(raw, action)?,
        };

        Ok(Directive {
            namespace: namespace.to_string(),
            name: name.to_string(),
            action,
        })
    }
}

fn parse_action(directive: &str, action: &str) -> Result<Action, ConfigError> {
    let parse_code = |code: &str| {
        code.trim()
            .parse::<i32>()
            .map_err(|source| ConfigError::InvalidErrorCode {
                directive: directive.to_string(),
                code: code.trim().to_string(),
                source,
            })
    };

    // A bare integer arms the point with that error code.
    if action.starts_with(|c: char| c == '-' || c == '+' || c.is_ascii_digit()) {
        return Ok(Action::Activate {
            mode: Mode::Multiple,
            error_code: Some(parse_code(action)?),
        });
    }

    let (mode, error_code) = match action.split_once('(') {
        Some((mode, rest)) => {
            let code = rest
                .strip_suffix(')')
                .ok_or_else(|| ConfigError::Unterminated(directive.to_string()))?;
            (mode.trim(), Some(parse_code(code)?))
        }
        None => (action, None),
    };

    let mode = match mode.to_ascii_lowercase().as_str() {
        "on" | "multiple" => Mode::Multiple,
        "oneshot" | "one-shot" => Mode::OneShot,
        "off" if error_code.is_none() => return Ok(Action::Deactivate),
        _ => {
            return Err(ConfigError::UnknownMode {
                directive: directive.to_string(),
                mode: mode.to_string(),
            });
        }
    };
    Ok(Action::Activate { mode, error_code })
}

/// Parse a `;`-separated list of directives. Empty entries are ignored.
pub fn parse(directives: &str) -> Result<Vec<Directive>, ConfigError> {
    directives
        .split(';')
        .filter(|entry| !entry.trim().is_empty())
        .map(str::parse)
        .collect()
}

/// Apply directives to the points already registered in the process.
///
/// Returns how many directives matched a point. Directives naming unknown
/// points are skipped.
pub fn apply(directives: &str) -> Result<usize, ConfigError> {
    let directives = parse(directives)?;
    let registry = registry::registry();
    let mut applied = 0;
    for directive in &directives {
        if let Some(point) = registry.find(&directive.namespace, &directive.name) {
            directive.apply(point);
            applied += 1;
        }
    }
    Ok(applied)
}

/// Directives from the environment; malformed input is logged and dropped.
pub fn env_directives() -> &'static [Directive] {
    ENV_DIRECTIVES.get_or_init(|| {
        let Ok(raw) = std::env::var(ENV_FAULT_POINTS) else {
            return Vec::new();
        };
        match parse(&raw) {
            Ok(directives) => directives,
            Err(err) => {
                tracing::warn!(
                    variable = ENV_FAULT_POINTS,
                    error = %err,
                    "ignoring malformed fault point directives"
                );
                Vec::new()
            }
        }
    })
}

/// Apply the environment directives to a freshly linked module.
pub(crate) fn apply_env_to(table: &ModuleTable) {
    let directives = env_directives();
    if directives.is_empty() {
        return;
    }
    for point in table.points() {
        for directive in directives.iter().filter(|d| d.targets(point)) {
            directive.apply(point);
        }
    }
}
