// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt text for one inbound message.

use tagarela_core::InboundMessage;

/// Render the user turn sent to the model.
///
/// The model needs the message id to address its reply, the speaker, and any
/// quoted context. Absent fields are left out.
pub fn render_user_prompt(message: &InboundMessage) -> String {
    let mut lines = Vec::with_capacity(8);
    if !message.current_date.is_empty() {
        lines.push(format!("data_atual: {}", message.current_date));
    }
    if !message.message_date.is_empty() {
        lines.push(format!("data_mensagem: {}", message.message_date));
    }
    if !message.message_id.is_empty() {
        lines.push(format!("id_mensagem: {}", message.message_id));
    }

    let speaker = message.speaker().unwrap_or_else(|| message.sender_id.clone());
    lines.push(format!("de: {speaker} ({})", message.sender_id));
    if !message.group_name.is_empty() {
        lines.push(format!("grupo: {}", message.group_name));
    }

    if message.quotes_message {
        let author = if message.quotes_bot {
            "você".to_string()
        } else if message.quoted_sender_id.is_empty() {
            "alguém".to_string()
        } else {
            message.quoted_sender_id.clone()
        };
        let media = if message.quoted_has_media { " [com mídia]" } else { "" };
        lines.push(format!("respondendo a {author}: \"{}\"{media}", message.quoted_text));
    }

    let media = if message.has_media { " [com mídia]" } else { "" };
    lines.push(format!("texto: {}{media}", message.text));
    lines.join("\n")
}

/// System content: the opaque preamble followed by what is remembered about
/// the user.
pub fn system_content(preamble: Option<&str>, memory_context: &str) -> Option<String> {
    let preamble = preamble.map(str::trim).filter(|p| !p.is_empty());
    let context = memory_context.trim();
    match (preamble, context.is_empty()) {
        (None, true) => None,
        (Some(p), true) => Some(p.to_string()),
        (None, false) => Some(format!("Memória do usuário:\n{context}")),
        (Some(p), false) => Some(format!("{p}\n\nMemória do usuário:\n{context}")),
    }
}
