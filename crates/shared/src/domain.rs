use std::fmt;

use serde::{Deserialize, Serialize};

/// Upper bound on the prompt a user may type or receive from the service.
pub const MAX_PROMPT_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StyleId(pub u32);

impl fmt::Display for StyleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One selectable visual style. `key` is what the generation service understands,
/// `label` is what a person reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StyleDescriptor {
    pub id: StyleId,
    pub key: &'static str,
    pub label: &'static str,
}

pub const LOGO_STYLES: &[StyleDescriptor] = &[
    StyleDescriptor {
        id: StyleId(0),
        key: "no-style",
        label: "No Style",
    },
    StyleDescriptor {
        id: StyleId(1),
        key: "monogram",
        label: "Monogram",
    },
    StyleDescriptor {
        id: StyleId(2),
        key: "minimal",
        label: "Minimal",
    },
    StyleDescriptor {
        id: StyleId(3),
        key: "abstract",
        label: "Abstract",
    },
    StyleDescriptor {
        id: StyleId(4),
        key: "mascot",
        label: "Mascot",
    },
];

pub fn style_by_id(id: StyleId) -> Option<&'static StyleDescriptor> {
    LOGO_STYLES.iter().find(|style| style.id == id)
}

pub fn style_by_key(key: &str) -> Option<&'static StyleDescriptor> {
    let key = key.trim();
    LOGO_STYLES
        .iter()
        .find(|style| style.key.eq_ignore_ascii_case(key))
}

/// Truncates to [`MAX_PROMPT_CHARS`] characters, never splitting a code point.
pub fn clamp_prompt(text: &str) -> String {
    match text.char_indices().nth(MAX_PROMPT_CHARS) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
