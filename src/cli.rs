//! Command routing over the raw argument string.
//!
//! Grove deliberately does not model its verbs as clap subcommands: matching
//! is prefix-based, case-sensitive, and order-sensitive, so `pull-all` must
//! be tried before `pull`. The outer clap surface only collects the raw
//! arguments and provides `--help`/`--version`; everything after that goes
//! through [`parse_request`].

use std::fmt;

/// The six commands grove understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Create,
    Status,
    Pull,
    PullAll,
    Push,
    Remove,
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Verb::Create => "create",
            Verb::Status => "status",
            Verb::Pull => "pull",
            Verb::PullAll => "pull-all",
            Verb::Push => "push",
            Verb::Remove => "remove",
        };
        write!(f, "{}", name)
    }
}

/// A parsed invocation: one verb plus an optional branch/worktree operand.
///
/// Built once per invocation and discarded after dispatch. The parser does
/// not validate the operand; handlers decide whether one is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub verb: Verb,
    pub operand: Option<String>,
}

/// Rule table in match order. `pull-all` precedes `pull` so the longer
/// prefix wins; first match ends the scan.
const RULES: &[(&str, Verb)] = &[
    ("create", Verb::Create),
    ("status", Verb::Status),
    ("pull-all", Verb::PullAll),
    ("pull", Verb::Pull),
    ("push", Verb::Push),
    ("remove", Verb::Remove),
];

/// Parses a raw argument string into a [`CommandRequest`].
///
/// Returns `None` when the string is empty or matches no rule, which the
/// caller treats as "show help". Matching is case-sensitive prefix matching
/// against the rule table; the operand is whatever remains after the verb,
/// trimmed of surrounding whitespace.
#[must_use]
pub fn parse_request(raw: &str) -> Option<CommandRequest> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for (prefix, verb) in RULES {
        if let Some(rest) = raw.strip_prefix(prefix) {
            let operand = rest.trim();
            let operand = if operand.is_empty() {
                None
            } else {
                Some(operand.to_string())
            };
            return Some(CommandRequest {
                verb: *verb,
                operand,
            });
        }
    }

    None
}

/// Usage text shown for an empty or unrecognized command string.
#[must_use]
pub fn usage() -> String {
    [
        "Manage git worktrees as sibling directories of this repository.",
        "",
        "Usage:",
        "  grove create <branch>   Create a sibling worktree on a new branch",
        "  grove status            Show every worktree and its uncommitted-change count",
        "  grove pull <branch>     Merge <branch> into the current branch",
        "  grove pull              Interactively pick branches to merge",
        "  grove pull-all          Merge every other branch into the current branch",
        "  grove push              Merge the current branch into the default branch",
        "  grove remove <name>     Remove a worktree, optionally deleting its branch",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_help() {
        assert_eq!(parse_request(""), None);
        assert_eq!(parse_request("   "), None);
    }

    #[test]
    fn test_unrecognized_input_is_help() {
        assert_eq!(parse_request("frobnicate"), None);
        assert_eq!(parse_request("--verbose create x"), None);
    }

    #[test]
    fn test_create_with_operand() {
        let req = parse_request("create feature-x");
        assert_eq!(
            req,
            Some(CommandRequest {
                verb: Verb::Create,
                operand: Some("feature-x".to_string()),
            })
        );
    }

    #[test]
    fn test_create_without_operand() {
        let req = parse_request("create");
        assert_eq!(
            req,
            Some(CommandRequest {
                verb: Verb::Create,
                operand: None,
            })
        );
    }

    #[test]
    fn test_pull_all_wins_over_pull() {
        let req = parse_request("pull-all");
        assert_eq!(req.map(|r| r.verb), Some(Verb::PullAll));
    }

    #[test]
    fn test_pull_with_operand_is_single_pull() {
        let req = parse_request("pull feature-x");
        assert_eq!(
            req,
            Some(CommandRequest {
                verb: Verb::Pull,
                operand: Some("feature-x".to_string()),
            })
        );
    }

    #[test]
    fn test_bare_pull_has_no_operand() {
        let req = parse_request("pull");
        assert_eq!(
            req,
            Some(CommandRequest {
                verb: Verb::Pull,
                operand: None,
            })
        );
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        assert_eq!(parse_request("Create feature-x"), None);
        assert_eq!(parse_request("PUSH"), None);
    }

    #[test]
    fn test_prefix_match_consumes_only_the_verb() {
        // Prefix matching: the remainder becomes the operand even with no
        // separating space, matching the original router's glob semantics.
        let req = parse_request("pushy");
        assert_eq!(
            req,
            Some(CommandRequest {
                verb: Verb::Push,
                operand: Some("y".to_string()),
            })
        );
    }

    #[test]
    fn test_operand_is_trimmed() {
        let req = parse_request("remove   feature-x   ");
        assert_eq!(
            req,
            Some(CommandRequest {
                verb: Verb::Remove,
                operand: Some("feature-x".to_string()),
            })
        );
    }

    #[test]
    fn test_all_verbs_round_trip_display() {
        for (text, verb) in [
            ("create", Verb::Create),
            ("status", Verb::Status),
            ("pull", Verb::Pull),
            ("pull-all", Verb::PullAll),
            ("push", Verb::Push),
            ("remove", Verb::Remove),
        ] {
            assert_eq!(verb.to_string(), text);
            assert_eq!(parse_request(text).map(|r| r.verb), Some(verb));
        }
    }
}
