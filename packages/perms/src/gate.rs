//! Pure authorization decision logic.

use std::fmt;

use serde::{Deserialize, Serialize};

use hearth_core::VPath;

/// What an entity wants to do with a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    Write,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Write => "write",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Authorization lookup key: `action|path`.
pub fn permission_key(action: Action, path: &VPath) -> String {
    format!("{}|{}", action, path)
}

/// Decide whether `action` on `path` is authorized.
///
/// `lookup` answers "is this exact permission key granted". The walk is:
///
/// 1. exact key for the requested action on the path;
/// 2. for `read`, retry as `write` on the same path (write implies read);
/// 3. repeat both lookups at each ancestor, nearest parent first, up to
///    `/` - a grant on a directory authorizes everything beneath it.
///
/// Pure over the lookup closure, so it is testable without a table and
/// reusable against any grant source.
pub fn is_authorized<F>(lookup: F, action: Action, path: &VPath) -> bool
where
    F: Fn(&str) -> bool,
{
    let granted_at = |candidate: &VPath| {
        if lookup(&permission_key(action, candidate)) {
            return true;
        }
        action == Action::Read && lookup(&permission_key(Action::Write, candidate))
    };

    if granted_at(path) {
        return true;
    }
    path.ancestors().any(|ancestor| granted_at(&ancestor))
}
