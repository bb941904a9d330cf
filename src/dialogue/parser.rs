//! Turns the raw model reply into a [`DialogueLine`].
//!
//! Expected reply shape:
//!
//! ```text
//! NPC dialogue text here...
//!
//! [OPTIONS]
//! [PARAGON] Short label | Full response text
//! [NEUTRAL] Short label | Full response text
//! [RENEGADE] Short label | Full response text
//! [GOODBYE] Short label
//! ```
//!
//! The parser never fails. Whatever the model produced, the returned line has
//! at least one option.

use super::types::{DialogueLine, DialogueOption, DialogueTone};

pub const OPTIONS_MARKER: &str = "[OPTIONS]";

const PARAGON_TAG: &str = "[PARAGON]";
const NEUTRAL_TAG: &str = "[NEUTRAL]";
const RENEGADE_TAG: &str = "[RENEGADE]";
const GOODBYE_TAG: &str = "[GOODBYE]";

const DEFAULT_GOODBYE: &str = "Goodbye";

enum Tag {
    Tone(DialogueTone),
    Goodbye,
}

/// Byte offset of the first ASCII case-insensitive occurrence of `needle`.
fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

fn split_tag(line: &str) -> (Option<Tag>, &str) {
    let tags = [
        (PARAGON_TAG, Tag::Tone(DialogueTone::Paragon)),
        (NEUTRAL_TAG, Tag::Tone(DialogueTone::Neutral)),
        (RENEGADE_TAG, Tag::Tone(DialogueTone::Renegade)),
        (GOODBYE_TAG, Tag::Goodbye),
    ];

    for (prefix, tag) in tags {
        if let Some(rest) = strip_prefix_ignore_case(line, prefix) {
            return (Some(tag), rest.trim());
        }
    }
    (None, line)
}

/// Splits the reply into the NPC text and the (possibly empty) options block.
fn split_options_block(response_text: &str) -> (&str, &str) {
    match find_ignore_case(response_text, OPTIONS_MARKER) {
        Some(pos) => (
            response_text[..pos].trim(),
            response_text[pos + OPTIONS_MARKER.len()..].trim(),
        ),
        None => (response_text.trim(), ""),
    }
}

fn fallback_options() -> Vec<DialogueOption> {
    vec![
        DialogueOption::new("Continue...", DialogueTone::Neutral, "Continue the conversation."),
        DialogueOption::new(DEFAULT_GOODBYE, DialogueTone::Neutral, DEFAULT_GOODBYE),
    ]
}

pub fn parse_response(response_text: &str) -> DialogueLine {
    let (npc_text, options_block) = split_options_block(response_text);

    let mut line = DialogueLine {
        npc_text: npc_text.to_string(),
        ..Default::default()
    };

    // \r\n, \r and \n all end a line; the empty pieces are skipped below
    for raw in options_block.split(['\r', '\n']) {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }

        let (tag, rest) = split_tag(trimmed);
        let tone = match tag {
            Some(Tag::Goodbye) => {
                // goodbye entries are never pipe-split
                let label = if rest.is_empty() { DEFAULT_GOODBYE } else { rest };
                line.is_goodbye = true;
                line.options
                    .push(DialogueOption::new(label, DialogueTone::Neutral, label));
                continue;
            }
            Some(Tag::Tone(tone)) => tone,
            None => DialogueTone::Neutral,
        };

        let (label, full_response) = match rest.split_once('|') {
            Some((label, full_response)) => (label.trim(), full_response.trim()),
            None => (rest, rest),
        };

        if label.is_empty() {
            log::debug!("dropping option with empty label: {trimmed:?}");
            continue;
        }

        line.options
            .push(DialogueOption::new(label, tone, full_response));
    }

    if line.options.is_empty() {
        line.options = fallback_options();
        line.is_goodbye = true;
    }

    line
}
