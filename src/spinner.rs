use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const LOADING_MESSAGES: &[&str] = &[
    "🐨 Thinking... like a koala deciding which tree to climb!",
    "🐨 Processing... just like a koala munching on eucalyptus!",
    "🐨 Reviewing your code... as carefully as a koala choosing a nap spot!",
    "🐨 Scanning for code smells... hopefully it's fresher than a eucalyptus grove!",
    "🐨 Analysing... even koalas need time to think!",
    "🐨 Hanging tight... good code takes patience, just like a koala's climb!",
    "🐨 Wrapping its fluffy head around your code...",
    "🐨 Searching for best practices... like a koala looking for the juiciest leaves!",
    "🐨 Cracking the code... slowly and methodically, like a koala moving through the trees!",
    "🐨 Let me chew on this for a moment...",
];

pub const QUOTES: &[&str] = &[
    "🐨 'Code well, nap better.'",
    "🐨 'A koala never rushes, and neither should your code.'",
    "🐨 'Small, thoughtful changes lead to big improvements, just like growing a eucalyptus tree!'",
    "🐨 'Good code is like a strong tree: it stands tall and supports everything around it.'",
    "🐨 'Debugging is like climbing, one branch at a time!'",
    "🐨 'Koalas don't hurry, and neither should your pull requests!'",
    "🐨 'Code smells? Let's sniff them out together!'",
    "🐨 'Refactor today, relax tomorrow!'",
    "🐨 'Every great software engineer needs a good nap... and good code.'",
    "🐨 'Write code as if a sleepy koala will maintain it!'",
];

/// Pick an entry using the clock as a cheap source of variety.
pub fn pick(items: &'static [&'static str]) -> &'static str {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as usize)
        .unwrap_or(0);
    items.get(nanos % items.len().max(1)).copied().unwrap_or_default()
}

/// Run `f` while a spinner with a koala message ticks on stderr.
pub fn with_spinner<T>(f: impl FnOnce() -> T) -> T {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(pick(LOADING_MESSAGES));
    pb.enable_steady_tick(Duration::from_millis(120));

    let out = f();

    pb.finish_and_clear();
    out
}
