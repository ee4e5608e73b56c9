// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use markup_mentions_engine::Markup;

#[allow(dead_code)]
pub fn markup() -> Markup {
    Markup::new("@[__id__:__display__]").unwrap()
}

/// A value of `mentions` mentions separated by ordinary prose.
#[allow(dead_code)]
pub fn generate_value(mentions: usize) -> String {
    let mut value = String::new();
    for i in 0..mentions {
        value.push_str("Some words before the mention, ");
        value.push_str(&format!("@[{i}:Person {i}]"));
        value.push_str(" and a little after.\n");
    }
    value
}

#[allow(dead_code)]
pub fn generate_plain(mentions: usize) -> String {
    let mut plain = String::new();
    for i in 0..mentions {
        plain.push_str("Some words before the mention, ");
        plain.push_str(&format!("Person {i}"));
        plain.push_str(" and a little after.\n");
    }
    plain
}
