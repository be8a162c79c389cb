//! Conservative length and phrase checks that separate boilerplate from real text.
//!
//! These are not language understanding. Template text that slips through is
//! expected; the qualitative review items exist to catch it.

use crate::workflows::tracker::normalize_text;

const MIN_MEANINGFUL_CHARS: usize = 20;
const SHORT_STORY_SKELETON_CHARS: usize = 30;

/// Fragments of unfilled issue templates, already normalized.
const BOILERPLATE_PHRASES: &[&str] = &[
    "as a i would like so that",
    "steps to reproduce 1. login 2. navigate to page 3. click stuff",
    "please describe what the expected behavior is",
    "what actually happens",
];

/// Unfilled "As a / I want / So that" skeletons, already normalized.
const STORY_SKELETONS: &[&str] = &[
    "as a i want so that",
    "as a i would like so that",
    "as a [user type] i want [feature] so that [benefit]",
    "as a [user type] i would like [feature] so that [benefit]",
];

pub fn has_meaningful_content(text: &str) -> bool {
    if text.trim().chars().count() < MIN_MEANINGFUL_CHARS {
        return false;
    }

    let normalized = normalize_text(text);
    !BOILERPLATE_PHRASES
        .iter()
        .any(|phrase| normalized.contains(phrase))
}

pub fn is_story_syntax_template(text: &str) -> bool {
    if text.is_empty() {
        return true;
    }

    let normalized = normalize_text(text);
    if STORY_SKELETONS
        .iter()
        .any(|skeleton| normalized.contains(skeleton))
    {
        return true;
    }

    normalized.chars().count() < SHORT_STORY_SKELETON_CHARS
        && normalized.contains("as a")
        && (normalized.contains("i want") || normalized.contains("i would like"))
}
