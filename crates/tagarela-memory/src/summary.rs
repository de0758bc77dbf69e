// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic text rendering of a memory record.

use std::fmt::Write;

use tagarela_core::UserMemoryRecord;

/// Render `record` as a short block for the model. Empty sections are omitted;
/// an empty record renders as an empty string.
pub fn render(record: &UserMemoryRecord) -> String {
    let mut out = String::new();

    line(&mut out, "Nome", record.name.as_deref());
    line(&mut out, "Idade", record.personal_info.age.as_deref());
    line(&mut out, "Mora em", record.personal_info.location.as_deref());
    line(&mut out, "Profissão", record.personal_info.occupation.as_deref());
    line(
        &mut out,
        "Relacionamento",
        record.personal_info.relationship_status.as_deref(),
    );
    list(&mut out, "Família", &record.personal_info.family);
    list(&mut out, "Gosta de", &record.preferences.likes);
    list(&mut out, "Não gosta de", &record.preferences.dislikes);
    list(&mut out, "Hobbies", &record.preferences.hobbies);
    list(&mut out, "Assuntos favoritos", &record.preferences.favorite_topics);
    line(&mut out, "Humor recente", record.behavior_patterns.mood.as_deref());
    for (key, value) in &record.custom_fields {
        line(&mut out, key, Some(value));
    }
    list(&mut out, "Notas", &record.notes);
    list(&mut out, "Memórias especiais", &record.special_memories);

    if record.stats.interaction_count > 0 {
        let _ = writeln!(out, "Interações: {}", record.stats.interaction_count);
    }

    out.trim_end().to_string()
}

fn line(out: &mut String, label: &str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        let _ = writeln!(out, "{label}: {value}");
    }
}

fn list(out: &mut String, label: &str, values: &[String]) {
    if !values.is_empty() {
        let _ = writeln!(out, "{label}: {}", values.join(", "));
    }
}
