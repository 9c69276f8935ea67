//! Stripping of active content from model-authored text.
//!
//! Model output is untrusted. Before anything is stored, every free-text
//! field goes through [`sanitize_text`], which parses the input as an HTML
//! fragment and serializes it back:
//!
//! - elements that can execute or embed content (`script`, `style`,
//!   `iframe`, ...) are removed together with everything inside them;
//! - a small set of inert formatting tags survives with every attribute
//!   dropped, other tags are removed and their text kept;
//! - comments are removed and text is escaped, so a stray `<` can never
//!   open a tag once the result is rendered.
//!
//! None of these steps can fail. Input that is nothing but markup degrades
//! to an empty string.

use std::sync::LazyLock;

use ammonia::Builder;

use super::schema::RoadmapDraft;
use pathwise_db::models::Step;

/// Elements removed along with their content.
const DANGEROUS_ELEMENTS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "noscript", "template", "svg", "math",
];

/// Elements kept (without attributes).
const INERT_ELEMENTS: &[&str] = &[
    "b",
    "strong",
    "i",
    "em",
    "u",
    "p",
    "br",
    "ul",
    "ol",
    "li",
    "code",
    "pre",
    "blockquote",
];

/// URL schemes that execute or inline content when followed.
const BLOCKED_SCHEMES: &[&str] = &["javascript:", "data:", "vbscript:"];

// `Builder::empty` allows no attributes, no URL schemes and strips comments.
static CLEANER: LazyLock<Builder<'static>> = LazyLock::new(|| {
    let mut builder = Builder::empty();
    builder
        .tags(INERT_ELEMENTS.iter().copied().collect())
        .clean_content_tags(DANGEROUS_ELEMENTS.iter().copied().collect());
    builder
});

/// Remove active markup from `input`, keeping plain text and inert tags.
///
/// The result is an HTML fragment: `&` and `<` in plain text come back as
/// `&amp;` and `&lt;`.
pub fn sanitize_text(input: &str) -> String {
    CLEANER.clean(input).to_string().trim().to_string()
}

/// Sanitize one resource entry.
///
/// Returns `None` when nothing useful is left or when the entry is a link
/// with an executable scheme.
pub fn sanitize_resource(input: &str) -> Option<String> {
    let cleaned = sanitize_text(input);
    if cleaned.is_empty() || has_blocked_scheme(&cleaned) {
        return None;
    }
    Some(cleaned)
}

/// Sanitize every free-text field of a validated draft.
pub fn sanitize_draft(draft: RoadmapDraft) -> RoadmapDraft {
    RoadmapDraft {
        title: sanitize_text(&draft.title),
        description: sanitize_text(&draft.description),
        steps: draft
            .steps
            .into_iter()
            .map(|step| Step {
                title: sanitize_text(&step.title),
                description: sanitize_text(&step.description),
                resources: step
                    .resources
                    .iter()
                    .filter_map(|r| sanitize_resource(r))
                    .collect(),
            })
            .collect(),
    }
}

fn has_blocked_scheme(value: &str) -> bool {
    // Browsers ignore whitespace and control characters inside a scheme.
    let normalized: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();
    BLOCKED_SCHEMES.iter().any(|scheme| normalized.starts_with(scheme))
}
