// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Markdown cleanup for plain-text chat delivery.
//!
//! The chat transport renders no markdown, so model output that falls back to
//! raw text is flattened. Steps run in a fixed order; each is a single regex
//! pass.

use std::sync::LazyLock;

use regex::Regex;

/// Glyph used for every unordered list bullet.
pub const BULLET: &str = "•";

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)```.*?```").unwrap());
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`\n]+)`").unwrap());
static STRONG_EMPHASIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*{2,3}|_{2,3}").unwrap());
static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]+").unwrap());
static BULLET_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^([ \t]*)[-*+][ \t]+").unwrap());
static ORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^([ \t]*)\d+[.)][ \t]+").unwrap());
static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\(([^)\s]+)\)").unwrap());
static BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n[ \t]*(?:\n[ \t]*){2,}").unwrap());
static HORIZONTAL_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]{2,}").unwrap());

/// Flatten markdown into chat-friendly text.
pub fn clean_markdown(text: &str) -> String {
    let text = FENCED_BLOCK.replace_all(text, "");
    let text = INLINE_CODE.replace_all(&text, "$1");
    let text = STRONG_EMPHASIS.replace_all(&text, "*");
    let text = HEADING.replace_all(&text, "");
    let text = BULLET_ITEM.replace_all(&text, format!("${{1}}{BULLET} ").as_str());
    let text = ORDERED_ITEM.replace_all(&text, "$1");
    let text = LINK.replace_all(&text, "$2");
    let text = BLANK_RUN.replace_all(&text, "\n\n");
    let text = HORIZONTAL_SPACE.replace_all(&text, " ");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_fenced_blocks_and_unwraps_inline_code() {
        let input = "Veja:\n```rust\nfn main() {}\n```\nUse `cargo` agora.";
        assert_eq!(clean_markdown(input), "Veja:\n\nUse cargo agora.");
    }

    #[test]
    fn collapses_emphasis_to_single_marker() {
        assert_eq!(clean_markdown("***muito*** **bom**"), "*muito* *bom*");
    }

    #[test]
    fn strips_headings_and_normalizes_lists() {
        let input = "## Lista\n- um\n* dois\n1. três\n2) quatro";
        assert_eq!(clean_markdown(input), "Lista\n• um\n• dois\ntrês\nquatro");
    }

    #[test]
    fn links_become_bare_targets() {
        assert_eq!(
            clean_markdown("leia [aqui](https://exemplo.com/x) depois"),
            "leia https://exemplo.com/x depois"
        );
    }

    #[test]
    fn collapses_blank_runs_and_spaces() {
        assert_eq!(clean_markdown("a\n\n\n\n\nb    c\t\td"), "a\n\nb c d");
    }

    #[test]
    fn plain_text_is_only_trimmed() {
        assert_eq!(clean_markdown("  oi, tudo bem?  "), "oi, tudo bem?");
    }
}
