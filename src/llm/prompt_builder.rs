use crate::change::ChangeRecord;
use crate::llm::prompts;

const DIVIDER: &str = "--------------------------------------------------------------------------------";

pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Prompt asking the model to review every change in order.
///
/// Callers must not pass an empty change set.
pub fn review_prompt(changes: &[ChangeRecord]) -> PromptPair {
    let mut user = String::from("Please review the following code changes.\n\n");

    for change in changes {
        user.push_str(&format!(
            "File: {path}\nChange type: {kind}\nDiff:\n{diff}\n",
            path = change.path,
            kind = change.change_type,
            diff = change.content.trim_end()
        ));
        if !change.old_content.is_empty() {
            user.push_str("Previous content:\n");
            user.push_str(change.old_content.trim_end());
            user.push('\n');
        }
        user.push_str(DIVIDER);
        user.push('\n');
    }

    PromptPair {
        system: prompts::REVIEW_INSTRUCTIONS.to_owned(),
        user,
    }
}

/// Prompt asking the model for a JSON commit payload.
pub fn commit_message_prompt(
    changes: &[ChangeRecord],
    user_context: Option<&str>,
    user_ticket: Option<&str>,
) -> PromptPair {
    let mut sections = vec!["Generate a commit message for the following changes.".to_string()];

    if let Some(context) = user_context.filter(|c| !c.trim().is_empty()) {
        sections.push(format!("Context from the developer:\n{context}"));
    }

    let ticket = normalize_ticket(user_ticket.unwrap_or_default());
    if !ticket.is_empty() {
        sections.push(format!(
            "Ticket: {ticket}\nThis ticket must be used exactly as given."
        ));
    }

    for change in changes {
        sections.push(format!(
            "File: {path}\nChange type: {kind}\nChanged lines:\n{lines}",
            path = change.path,
            kind = change.change_type,
            lines = changed_lines(&change.content)
        ));
    }

    PromptPair {
        system: prompts::COMMIT_INSTRUCTIONS.to_owned(),
        user: sections.join(&format!("\n{DIVIDER}\n")),
    }
}

/// Keep only the lines of a diff that start with `+` or `-`, in order.
pub fn changed_lines(diff: &str) -> String {
    diff.lines()
        .filter(|line| line.starts_with('+') || line.starts_with('-'))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Trim a ticket reference and make sure it carries a leading `#`.
///
/// Returns an empty string when nothing is left after trimming.
pub fn normalize_ticket(ticket: &str) -> String {
    let ticket = ticket.trim();
    if ticket.is_empty() {
        String::new()
    } else if ticket.starts_with('#') {
        ticket.to_string()
    } else {
        format!("#{ticket}")
    }
}
