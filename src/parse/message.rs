use std::sync::LazyLock;

use regex::Regex;

/// The whole message is a single `@token`
static TOKEN_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@[A-Za-z0-9][A-Za-z0-9_-]*$").expect("valid regex"));

/// Free text followed by a space and a trailing `@token`
static TRAILING_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*) (@[A-Za-z0-9][A-Za-z0-9_-]*)$").expect("valid regex")
});

/// What a free-form command-line message asks for.
///
/// - `text @tag`: add `text` under the tag
/// - `text @12`: add `text` as a child of item 12
/// - `@tag` / `@12`: no text, just a reference
/// - `text`: add under the default tag
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    pub text: Option<String>,
    pub tag: Option<String>,
    pub parent_id: Option<usize>,
}

impl Message {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.tag.is_none() && self.parent_id.is_none()
    }
}

/// Split a message into text and an optional trailing `@tag` or `@id`.
pub fn parse_message(message: &str) -> Message {
    let message = message.trim();
    if message.is_empty() {
        return Message::default();
    }

    if TOKEN_ONLY.is_match(message) {
        return resolve_token(None, message);
    }

    if let Some(caps) = TRAILING_TOKEN.captures(message) {
        let text = caps[1].trim().to_string();
        return resolve_token(Some(text), &caps[2]);
    }

    Message {
        text: Some(message.to_string()),
        ..Message::default()
    }
}

/// An all-digit token is a parent ordinal; anything else names a tag.
fn resolve_token(text: Option<String>, token: &str) -> Message {
    let bare = token.trim().trim_start_matches('@');
    if bare.chars().all(|c| c.is_ascii_digit()) {
        // Too large to be an ordinal: keep it numeric so lookup reports not-found.
        let id = bare.parse().unwrap_or(usize::MAX);
        Message {
            text,
            tag: None,
            parent_id: Some(id),
        }
    } else {
        Message {
            text,
            tag: Some(tag_name(token)),
            parent_id: None,
        }
    }
}

/// `@my-tag` / `@my_tag` → `My Tag`
pub fn tag_name(token: &str) -> String {
    token
        .trim()
        .trim_start_matches('@')
        .split(['-', '_'])
        .filter(|segment| !segment.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First character upper-cased, the rest lower-cased
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
