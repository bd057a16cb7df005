//! Interpretation of raw model output.
//!
//! Review output is handed back untouched. Commit output is parsed into a
//! [`CommitPayload`], repaired field by field, and rendered; malformed model
//! text degrades to a fallback payload instead of an error.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::llm::prompt_builder::normalize_ticket;

/// Commit types the model may choose from.
pub const ALLOWED_TYPES: &[&str] = &["feature", "bugfix", "hotfix", "chore"];

pub const DEFAULT_TYPE: &str = "chore";
pub const DEFAULT_DESCRIPTION: &str = "update code";
pub const PARSE_FAILURE_NOTE: &str = "Failed to parse commit message response.";

static JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)```json[ \t]*\r?\n?(.*?)```").expect("valid regex"));

static BULLET_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-•*](?:\s+|$))+").expect("valid regex"));

/// Structured commit message after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitPayload {
    pub commit_type: String,
    pub ticket: Option<String>,
    pub description: String,
    pub extras: Vec<String>,
}

impl CommitPayload {
    /// `type(ticket): description`, then a blank line and `- extra` lines when present.
    pub fn render(&self) -> String {
        let mut out = match &self.ticket {
            Some(ticket) => format!("{}({}): {}", self.commit_type, ticket, self.description),
            None => format!("{}: {}", self.commit_type, self.description),
        };

        if !self.extras.is_empty() {
            out.push('\n');
            for extra in &self.extras {
                out.push_str("\n- ");
                out.push_str(extra);
            }
        }

        out
    }
}

/// Review output is shown to the user as-is.
pub fn review_passthrough(raw: String) -> String {
    raw
}

/// Turn raw model output for the commit task into a final commit message.
///
/// Never fails: unparseable output becomes `chore: update code` with the
/// failure note and the raw text as extras.
pub fn format_commit_response(raw: &str, user_ticket: Option<&str>) -> String {
    let fields = parse_payload(raw).unwrap_or_else(|| {
        log::warn!("Model response was not a JSON object; using fallback commit message");
        fallback_fields(raw)
    });
    validate(&fields, user_ticket).render()
}

/// Inner text of every ```json fenced block, in order of appearance.
pub fn extract_json_blocks(raw: &str) -> Vec<String> {
    JSON_FENCE
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

/// Strip leading bullet markers (`- `, `• `, `* `) and surrounding whitespace.
///
/// A marker only counts when whitespace or the end of the text follows it.
pub fn strip_bullet(text: &str) -> String {
    BULLET_PREFIX.replace(text, "").trim().to_string()
}

/// First candidate that decodes to a JSON object: fenced blocks first, then the whole text.
fn parse_payload(raw: &str) -> Option<Map<String, Value>> {
    let mut candidates = extract_json_blocks(raw);
    candidates.push(raw.trim().to_string());

    candidates.iter().find_map(|candidate| {
        match serde_json::from_str::<Value>(candidate) {
            Ok(Value::Object(map)) => Some(map),
            Ok(other) => {
                log::debug!("Skipping non-object JSON candidate: {other}");
                None
            }
            Err(e) => {
                log::debug!("Candidate is not valid JSON: {e}");
                None
            }
        }
    })
}

fn fallback_fields(raw: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("type".into(), Value::from(DEFAULT_TYPE));
    map.insert("ticket".into(), Value::Null);
    map.insert("description".into(), Value::from(DEFAULT_DESCRIPTION));
    map.insert(
        "extras".into(),
        Value::from(vec![PARSE_FAILURE_NOTE.to_string(), raw.trim().to_string()]),
    );
    map
}

/// Repair each field so the payload always renders into a valid first line.
fn validate(fields: &Map<String, Value>, user_ticket: Option<&str>) -> CommitPayload {
    let commit_type = scalar_text(fields.get("type")).trim().to_lowercase();
    let commit_type = if ALLOWED_TYPES.contains(&commit_type.as_str()) {
        commit_type
    } else {
        log::debug!("Replacing commit type {commit_type:?} with {DEFAULT_TYPE:?}");
        DEFAULT_TYPE.to_string()
    };

    // The caller's ticket always wins; a ticket the model made up on its own is dropped.
    if user_ticket.is_none() && fields.get("ticket").is_some_and(|t| !t.is_null()) {
        log::debug!("Ignoring model-supplied ticket {:?}", fields.get("ticket"));
    }
    let ticket = Some(normalize_ticket(user_ticket.unwrap_or_default())).filter(|t| !t.is_empty());

    let description = scalar_text(fields.get("description"))
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let description = if description.is_empty() {
        DEFAULT_DESCRIPTION.to_string()
    } else {
        description
    };

    let extras: Vec<String> = match fields.get("extras") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| strip_bullet(&scalar_text(Some(item))))
            .filter(|item| !item.is_empty())
            .collect(),
        Some(other) => Some(strip_bullet(&scalar_text(Some(other))))
            .filter(|item| !item.is_empty())
            .into_iter()
            .collect(),
        None => Vec::new(),
    };

    CommitPayload {
        commit_type,
        ticket,
        description,
        extras,
    }
}

/// Plain text of a JSON value; strings unquoted, null and missing as empty.
fn scalar_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_line(message: &str) -> &str {
        message.lines().next().unwrap_or_default()
    }

    #[test]
    fn fenced_json_with_extras() {
        let raw = "```json\n{\"type\":\"feature\",\"ticket\":null,\"description\":\"add retry logic\",\"extras\":[\"handles transient failures\"]}\n```";
        assert_eq!(
            format_commit_response(raw, None),
            "feature: add retry logic\n\n- handles transient failures"
        );
    }

    #[test]
    fn plain_prose_falls_back() {
        let out = format_commit_response("I cannot help with that.", None);
        assert_eq!(
            out,
            "chore: update code\n\n- Failed to parse commit message response.\n- I cannot help with that."
        );
    }

    #[test]
    fn empty_extras_render_single_line() {
        let raw = r#"{"type":"bugfix","ticket":null,"description":"fix off-by-one","extras":[]}"#;
        assert_eq!(format_commit_response(raw, None), "bugfix: fix off-by-one");
    }

    #[test]
    fn user_ticket_wins_over_model_ticket() {
        let raw = r##"{"type":"feature","ticket":"#999","description":"add export","extras":[]}"##;
        let out = format_commit_response(raw, Some("456"));
        assert_eq!(first_line(&out), "feature(#456): add export");
        assert!(!out.contains("#999"));
    }

    #[test]
    fn model_ticket_is_discarded_without_user_ticket() {
        // Tickets only ever come from the caller.
        let raw = r##"{"type":"feature","ticket":"#999","description":"add export","extras":[]}"##;
        assert_eq!(format_commit_response(raw, None), "feature: add export");
    }

    #[test]
    fn blank_user_ticket_is_absent() {
        let raw = r#"{"type":"chore","description":"tidy"}"#;
        assert_eq!(format_commit_response(raw, Some("   ")), "chore: tidy");
    }

    #[test]
    fn invalid_type_is_replaced() {
        let raw = r#"{"type":"refactor","description":"split module"}"#;
        assert_eq!(format_commit_response(raw, None), "chore: split module");
    }

    #[test]
    fn type_is_trimmed_and_lowercased() {
        let raw = r#"{"type":"  HotFix ","description":"patch crash"}"#;
        assert_eq!(format_commit_response(raw, None), "hotfix: patch crash");
    }

    #[test]
    fn missing_description_gets_default() {
        let raw = r#"{"type":"feature","description":"   ","extras":null}"#;
        assert_eq!(format_commit_response(raw, None), "feature: update code");
    }

    #[test]
    fn multiline_description_is_folded_onto_first_line() {
        let raw = r#"{"type":"feature","description":"add cache\nfor lookups"}"#;
        assert_eq!(format_commit_response(raw, None), "feature: add cache for lookups");
    }

    #[test]
    fn extras_lose_bullet_markers_and_empties() {
        let raw = r#"{"type":"chore","description":"clean up","extras":["- one","• two","* three","  -  ","", "- - nested"]}"#;
        assert_eq!(
            format_commit_response(raw, None),
            "chore: clean up\n\n- one\n- two\n- three\n- nested"
        );
    }

    #[test]
    fn scalar_extras_are_wrapped() {
        let raw = r#"{"type":"chore","description":"bump deps","extras":"* keeps builds green"}"#;
        assert_eq!(
            format_commit_response(raw, None),
            "chore: bump deps\n\n- keeps builds green"
        );
    }

    #[test]
    fn first_parseable_fence_wins() {
        let raw = "Here you go:\n```json\nnot json\n```\nand\n```JSON\n{\"type\":\"bugfix\",\"description\":\"second block\"}\n```\n```json\n{\"type\":\"feature\",\"description\":\"third block\"}\n```";
        assert_eq!(format_commit_response(raw, None), "bugfix: second block");
    }

    #[test]
    fn non_object_json_falls_back() {
        let out = format_commit_response("[1, 2, 3]", None);
        assert_eq!(first_line(&out), "chore: update code");
        assert!(out.ends_with("- [1, 2, 3]"));
    }

    #[test]
    fn empty_response_still_renders() {
        assert_eq!(
            format_commit_response("", None),
            "chore: update code\n\n- Failed to parse commit message response."
        );
    }

    #[test]
    fn rendering_is_total() {
        let inputs = [
            "",
            "   \n\n ",
            "plain prose",
            "{",
            "```json\n```",
            r#"{"type": 5, "description": 7, "extras": [1, null, {"a": 1}]}"#,
            r#"{"type":"FEATURE","description":"ok"}"#,
            "```json\n{\"type\":\"nope\"}\n```",
        ];

        for input in inputs {
            let out = format_commit_response(input, Some("12"));
            let line = first_line(&out);
            let (prefix, description) = line.split_once(": ").expect("has separator");
            assert!(!description.is_empty(), "input {input:?}");
            let kind = prefix.strip_suffix("(#12)").expect("ticket rendered");
            assert!(ALLOWED_TYPES.contains(&kind), "input {input:?} gave {line:?}");
        }
    }

    #[test]
    fn json_blocks_extracted_in_order() {
        let raw = "```json\n{\"a\":1}\n```\ntext\n```json {\"b\":2}```";
        assert_eq!(extract_json_blocks(raw), vec![r#"{"a":1}"#, r#"{"b":2}"#]);
        assert!(extract_json_blocks("```rust\nfn main() {}\n```").is_empty());
    }

    #[test]
    fn strip_bullet_examples() {
        assert_eq!(strip_bullet("  - item "), "item");
        assert_eq!(strip_bullet("• item"), "item");
        assert_eq!(strip_bullet("* - item"), "item");
        assert_eq!(strip_bullet(" -"), "");
        assert_eq!(strip_bullet("well-formed"), "well-formed");
    }

    #[test]
    fn strip_bullet_keeps_leading_punctuation_that_is_content() {
        assert_eq!(strip_bullet("-v flag"), "-v flag");
        assert_eq!(strip_bullet("--no-verify is honored"), "--no-verify is honored");
        assert_eq!(strip_bullet("-1 offset"), "-1 offset");
        assert_eq!(strip_bullet("*args now forwarded"), "*args now forwarded");
        assert_eq!(strip_bullet("- --dry-run added"), "--dry-run added");
    }

    #[test]
    fn commit_prompt_lists_every_allowed_type() {
        for kind in ALLOWED_TYPES {
            assert!(super::super::prompts::COMMIT_INSTRUCTIONS.contains(kind), "missing {kind}");
        }
    }

    #[test]
    fn review_output_is_untouched() {
        let raw = "### Issues/Bugs\nNo issues found.\n\n  trailing  ".to_string();
        assert_eq!(review_passthrough(raw.clone()), raw);
    }

    #[test]
    fn payload_render_with_ticket_and_extras() {
        let payload = CommitPayload {
            commit_type: "hotfix".into(),
            ticket: Some("#7".into()),
            description: "guard null config".into(),
            extras: vec!["crash on first run".into(), "adds test".into()],
        };
        assert_eq!(
            payload.render(),
            "hotfix(#7): guard null config\n\n- crash on first run\n- adds test"
        );
    }
}
