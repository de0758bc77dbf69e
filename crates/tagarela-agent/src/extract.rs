// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recovery of structured replies from free-form model output.
//!
//! Models are asked for a JSON object but frequently wrap it in code fences,
//! surround it with prose, or put raw newlines inside string values.
//! [`extract_payload`] tries progressively more forgiving strategies and
//! never fails: when nothing parses, the cleaned text itself becomes the
//! reply.

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::markdown::clean_markdown;

/// Recover a JSON object from model output. Infallible.
pub fn extract_payload(raw: &str) -> Value {
    let stripped = strip_fences(raw);

    if let Some(value) = parse_object(stripped) {
        return value;
    }

    for candidate in balanced_objects(stripped) {
        if let Some(value) = parse_object(candidate) {
            debug!("recovered payload from surrounding text");
            return value;
        }
        let repaired = escape_newlines_in_strings(candidate);
        if let Some(value) = parse_object(&repaired) {
            debug!("recovered payload after escaping raw newlines");
            return value;
        }
    }

    warn!(len = raw.len(), "model output has no usable JSON object, replying with text");
    fallback(raw)
}

/// The reply used when no payload can be recovered.
pub fn fallback(raw: &str) -> Value {
    json!({ "resp": [{ "resp": clean_markdown(raw) }] })
}

fn parse_object(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(Value::Object(map)),
        _ => None,
    }
}

/// Remove a leading ```` ``` ```` / ```` ```json ```` line and a trailing fence.
fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // Drop the info string, if any, up to the end of the opening line.
        text = match rest.find('\n') {
            Some(pos) => &rest[pos + 1..],
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Top-level `{...}` spans in order of appearance.
///
/// A depth counter tracks nesting; braces inside string literals and escaped
/// quotes are ignored. An opening brace that never closes is skipped and the
/// scan resumes right after it, so a stray `{` in prose cannot hide a later
/// object.
fn balanced_objects(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut from = 0usize;

    while let Some(offset) = text[from..].find('{') {
        let start = from + offset;
        match matching_close(&text[start..]) {
            Some(len) => {
                spans.push(&text[start..start + len]);
                from = start + len;
            }
            None => from = start + 1,
        }
    }
    spans
}

/// Byte length of the object opening at the start of `text`, if it closes.
fn matching_close(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Escape control characters that appear raw inside string literals.
fn escape_newlines_in_strings(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            match c {
                _ if escaped => {
                    escaped = false;
                    out.push(c);
                }
                '\\' => {
                    escaped = true;
                    out.push(c);
                }
                '"' => {
                    in_string = false;
                    out.push(c);
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                _ => out.push(c),
            }
        } else {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> Value {
        json!({
            "resp": [{"id": "M1", "resp": "Oi, Ana! {tudo} certo?", "react": "😄"}],
            "aprender": {"acao": "adicionar", "tipo": "gostos", "valor": "pizza"}
        })
    }

    #[test]
    fn plain_json_parses_directly() {
        let raw = serde_json::to_string(&payload()).unwrap();
        assert_eq!(extract_payload(&raw), payload());
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let raw = format!("```json\n{}\n```", serde_json::to_string_pretty(&payload()).unwrap());
        assert_eq!(extract_payload(&raw), payload());

        let bare = format!("```\n{}\n```", serde_json::to_string(&payload()).unwrap());
        assert_eq!(extract_payload(&bare), payload());
    }

    #[test]
    fn payload_inside_prose_is_found() {
        let raw = format!(
            "Claro! Aqui está a resposta:\n\n{}\n\nQualquer coisa {{me chame}}.",
            serde_json::to_string_pretty(&payload()).unwrap()
        );
        assert_eq!(extract_payload(&raw), payload());
    }

    #[test]
    fn prose_braces_before_the_payload_are_skipped() {
        let raw = format!(
            "uso {{chaves}} às vezes. {}",
            serde_json::to_string(&payload()).unwrap()
        );
        assert_eq!(extract_payload(&raw), payload());
    }

    #[test]
    fn raw_newlines_inside_strings_are_repaired() {
        let raw = "Resposta: {\"resp\": [{\"id\": \"M1\", \"resp\": \"linha um\nlinha dois\"}]}";
        assert_eq!(
            extract_payload(raw),
            json!({"resp": [{"id": "M1", "resp": "linha um\nlinha dois"}]})
        );
    }

    #[test]
    fn escaped_quotes_do_not_confuse_the_scanner() {
        let raw = r#"ok: {"resp": [{"resp": "ela disse \"}\" e saiu"}]} fim"#;
        assert_eq!(
            extract_payload(raw),
            json!({"resp": [{"resp": "ela disse \"}\" e saiu"}]})
        );
    }

    #[test]
    fn unmatched_brace_in_prose_does_not_hide_the_payload() {
        let raw = format!(
            "Use {{ com cuidado. {}",
            serde_json::to_string(&payload()).unwrap()
        );
        assert_eq!(extract_payload(&raw), payload());

        let raw = r#"Use { com cuidado. {"resp":[{"id":"M1","resp":"oi"}]}"#;
        assert_eq!(
            extract_payload(raw),
            json!({"resp": [{"id": "M1", "resp": "oi"}]})
        );
    }

    #[test]
    fn top_level_array_yields_its_first_object() {
        let raw = r#"[{"resp": "x"}, {"resp": "y"}]"#;
        assert_eq!(extract_payload(raw), json!({"resp": "x"}));
    }

    // Malformed samples seen in practice. None may panic, all must yield a
    // `resp` array with one text entry.
    #[test]
    fn malformed_corpus_falls_back_to_cleaned_text() {
        let corpus = [
            "",
            "   ",
            "{",
            "}}}{{{",
            "{\"resp\": [{\"resp\": \"cortado no meio",
            "```json\n{\"resp\": [ {\"resp\": \"sem fechar\"\n```",
            "**Oi!** tudo bem? `nada` de json aqui",
            "{'resp': 'aspas simples'}",
            "{\"resp\": [1, 2,]}",
            "\u{feff}{\"a\": }",
            "texto com \"aspas abertas { e chave",
        ];
        for raw in corpus {
            let value = extract_payload(raw);
            let entries = value["resp"].as_array().expect("fallback has resp array");
            assert_eq!(entries.len(), 1, "input: {raw:?}");
            assert_eq!(entries[0]["resp"], json!(clean_markdown(raw)), "input: {raw:?}");
        }
    }

    #[test]
    fn fallback_text_is_markdown_cleaned() {
        let value = extract_payload("## Olá\n**tudo** bem?");
        assert_eq!(value, json!({"resp": [{"resp": "Olá\n*tudo* bem?"}]}));
    }
}
