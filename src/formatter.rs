use colored::Colorize;

use crate::spinner;

/// Print the model's review, or a notice when it came back empty.
pub fn print_review(suggestions: &str) {
    if suggestions.trim().is_empty() {
        println!("{}", "No suggestions found!".yellow().bold());
    } else {
        println!("{}", "Review Suggestions".green().bold());
        println!();
        println!("{suggestions}");
    }
    println!();
    println!("{}", spinner::pick(spinner::QUOTES).bright_black());
}

pub fn print_commit_message(message: &str) {
    println!();
    println!("{}", "----- Commit Message Preview -----".bold());
    println!("{message}");
    println!("{}", "----------------------------------".bold());
}
