// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from free-form learning `type` labels to record fields.
//!
//! Resolution is data-driven: a fixed alias table is consulted first, then an
//! ordered list of substring heuristics. Labels that match neither become
//! tagged notes, so a value is never dropped.

use strum::{Display, EnumString};
use tagarela_core::UserMemoryRecord;

/// Unbounded list fields of a [`UserMemoryRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ListField {
    Likes,
    Dislikes,
    Hobbies,
    FavoriteTopics,
    Family,
    Notes,
    SpecialMemories,
}

/// Single-valued fields of a [`UserMemoryRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ScalarField {
    Name,
    Age,
    Location,
    Occupation,
    RelationshipStatus,
    Mood,
}

/// The four preference lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Preference {
    Likes,
    Dislikes,
    Hobbies,
    FavoriteTopics,
}

impl From<Preference> for ListField {
    fn from(preference: Preference) -> Self {
        match preference {
            Preference::Likes => ListField::Likes,
            Preference::Dislikes => ListField::Dislikes,
            Preference::Hobbies => ListField::Hobbies,
            Preference::FavoriteTopics => ListField::FavoriteTopics,
        }
    }
}

/// Where a learning instruction lands in the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryTarget {
    List(ListField),
    Scalar(ScalarField),
    /// `customFields[key]`.
    Custom(String),
    /// A note prefixed with the original label, e.g. `[signo] leão`.
    TaggedNote(String),
}

impl MemoryTarget {
    /// Human-readable label for logs.
    pub fn label(&self) -> String {
        match self {
            MemoryTarget::List(field) => field.to_string(),
            MemoryTarget::Scalar(field) => field.to_string(),
            MemoryTarget::Custom(key) => format!("custom:{key}"),
            MemoryTarget::TaggedNote(tag) => format!("note:{tag}"),
        }
    }
}

/// Recognized labels, already normalized (lowercase, no accents, `_` separators).
static ALIASES: &[(&str, MemoryTarget)] = &[
    ("gostos", MemoryTarget::List(ListField::Likes)),
    ("gosto", MemoryTarget::List(ListField::Likes)),
    ("gosta", MemoryTarget::List(ListField::Likes)),
    ("likes", MemoryTarget::List(ListField::Likes)),
    ("like", MemoryTarget::List(ListField::Likes)),
    ("preferencias", MemoryTarget::List(ListField::Likes)),
    ("preferencia", MemoryTarget::List(ListField::Likes)),
    ("preferences", MemoryTarget::List(ListField::Likes)),
    ("nao_gosta", MemoryTarget::List(ListField::Dislikes)),
    ("desgostos", MemoryTarget::List(ListField::Dislikes)),
    ("dislikes", MemoryTarget::List(ListField::Dislikes)),
    ("odeia", MemoryTarget::List(ListField::Dislikes)),
    ("aversoes", MemoryTarget::List(ListField::Dislikes)),
    ("hobbies", MemoryTarget::List(ListField::Hobbies)),
    ("hobby", MemoryTarget::List(ListField::Hobbies)),
    ("atividades", MemoryTarget::List(ListField::Hobbies)),
    ("passatempos", MemoryTarget::List(ListField::Hobbies)),
    ("assuntos_favoritos", MemoryTarget::List(ListField::FavoriteTopics)),
    ("assuntos", MemoryTarget::List(ListField::FavoriteTopics)),
    ("topicos", MemoryTarget::List(ListField::FavoriteTopics)),
    ("topics", MemoryTarget::List(ListField::FavoriteTopics)),
    ("favorite_topics", MemoryTarget::List(ListField::FavoriteTopics)),
    ("temas", MemoryTarget::List(ListField::FavoriteTopics)),
    ("interesses", MemoryTarget::List(ListField::FavoriteTopics)),
    ("familia", MemoryTarget::List(ListField::Family)),
    ("family", MemoryTarget::List(ListField::Family)),
    ("parentes", MemoryTarget::List(ListField::Family)),
    ("filhos", MemoryTarget::List(ListField::Family)),
    ("notas", MemoryTarget::List(ListField::Notes)),
    ("nota", MemoryTarget::List(ListField::Notes)),
    ("notes", MemoryTarget::List(ListField::Notes)),
    ("note", MemoryTarget::List(ListField::Notes)),
    ("observacoes", MemoryTarget::List(ListField::Notes)),
    ("anotacoes", MemoryTarget::List(ListField::Notes)),
    ("memorias_especiais", MemoryTarget::List(ListField::SpecialMemories)),
    ("memoria_especial", MemoryTarget::List(ListField::SpecialMemories)),
    ("special_memories", MemoryTarget::List(ListField::SpecialMemories)),
    ("lembrancas", MemoryTarget::List(ListField::SpecialMemories)),
    ("momentos_especiais", MemoryTarget::List(ListField::SpecialMemories)),
    ("nome", MemoryTarget::Scalar(ScalarField::Name)),
    ("name", MemoryTarget::Scalar(ScalarField::Name)),
    ("apelido", MemoryTarget::Scalar(ScalarField::Name)),
    ("idade", MemoryTarget::Scalar(ScalarField::Age)),
    ("age", MemoryTarget::Scalar(ScalarField::Age)),
    ("localizacao", MemoryTarget::Scalar(ScalarField::Location)),
    ("cidade", MemoryTarget::Scalar(ScalarField::Location)),
    ("location", MemoryTarget::Scalar(ScalarField::Location)),
    ("city", MemoryTarget::Scalar(ScalarField::Location)),
    ("mora_em", MemoryTarget::Scalar(ScalarField::Location)),
    ("profissao", MemoryTarget::Scalar(ScalarField::Occupation)),
    ("trabalho", MemoryTarget::Scalar(ScalarField::Occupation)),
    ("ocupacao", MemoryTarget::Scalar(ScalarField::Occupation)),
    ("occupation", MemoryTarget::Scalar(ScalarField::Occupation)),
    ("job", MemoryTarget::Scalar(ScalarField::Occupation)),
    ("emprego", MemoryTarget::Scalar(ScalarField::Occupation)),
    ("estado_civil", MemoryTarget::Scalar(ScalarField::RelationshipStatus)),
    ("relacionamento", MemoryTarget::Scalar(ScalarField::RelationshipStatus)),
    ("relationship", MemoryTarget::Scalar(ScalarField::RelationshipStatus)),
    ("relationship_status", MemoryTarget::Scalar(ScalarField::RelationshipStatus)),
    ("humor", MemoryTarget::Scalar(ScalarField::Mood)),
    ("mood", MemoryTarget::Scalar(ScalarField::Mood)),
    ("estado_emocional", MemoryTarget::Scalar(ScalarField::Mood)),
    ("sentimento", MemoryTarget::Scalar(ScalarField::Mood)),
];

/// Fallback routes for unrecognized labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    List(ListField),
    Custom,
}

/// Substring cues, checked in order. Dislike cues come before like cues
/// because `dislike` and `nao_gosta` contain the like cues.
const HEURISTICS: &[(&[&str], Route)] = &[
    (
        &["desgost", "odei", "dislike", "hate", "nao_gost", "detest"],
        Route::List(ListField::Dislikes),
    ),
    (
        &["gost", "like", "prefer", "favorit", "love", "ador"],
        Route::List(ListField::Likes),
    ),
    (
        &["hobb", "ativid", "activit", "esporte", "sport", "pratica", "passatempo"],
        Route::List(ListField::Hobbies),
    ),
    (
        &["assunto", "topic", "tema", "interesse", "interest"],
        Route::List(ListField::FavoriteTopics),
    ),
    (
        &["info", "pessoa", "personal", "dado", "perfil", "profile"],
        Route::Custom,
    ),
];

/// Lowercase, trim, fold Portuguese accents, and join words with `_`.
pub fn normalize_label(label: &str) -> String {
    let folded: String = label
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            ' ' | '-' | '.' => '_',
            other => other,
        })
        .collect();
    folded
        .split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Resolve a learning `type` label to its destination.
pub fn resolve(label: &str) -> MemoryTarget {
    let normalized = normalize_label(label);

    if let Some((_, target)) = ALIASES.iter().find(|(alias, _)| *alias == normalized) {
        return target.clone();
    }

    for (cues, route) in HEURISTICS {
        if cues.iter().any(|cue| normalized.contains(cue)) {
            return match route {
                Route::List(field) => MemoryTarget::List(*field),
                Route::Custom => MemoryTarget::Custom(normalized),
            };
        }
    }

    let tag = label.trim();
    MemoryTarget::TaggedNote(if tag.is_empty() {
        "sem_tipo".to_string()
    } else {
        tag.to_string()
    })
}

pub(crate) fn list_mut(record: &mut UserMemoryRecord, field: ListField) -> &mut Vec<String> {
    match field {
        ListField::Likes => &mut record.preferences.likes,
        ListField::Dislikes => &mut record.preferences.dislikes,
        ListField::Hobbies => &mut record.preferences.hobbies,
        ListField::FavoriteTopics => &mut record.preferences.favorite_topics,
        ListField::Family => &mut record.personal_info.family,
        ListField::Notes => &mut record.notes,
        ListField::SpecialMemories => &mut record.special_memories,
    }
}

pub(crate) fn scalar_mut(record: &mut UserMemoryRecord, field: ScalarField) -> &mut Option<String> {
    match field {
        ScalarField::Name => &mut record.name,
        ScalarField::Age => &mut record.personal_info.age,
        ScalarField::Location => &mut record.personal_info.location,
        ScalarField::Occupation => &mut record.personal_info.occupation,
        ScalarField::RelationshipStatus => &mut record.personal_info.relationship_status,
        ScalarField::Mood => &mut record.behavior_patterns.mood,
    }
}

/// Text stored in `notes` for a tagged note.
pub(crate) fn tagged(tag: &str, value: &str) -> String {
    format!("[{tag}] {value}")
}

/// Whether `note` is the tagged note for `tag` and `value`. Tags compare in
/// normalized form, so `[Signo]` and `[signo ]` name the same note.
pub(crate) fn is_tagged(note: &str, tag: &str, value: &str) -> bool {
    note.strip_prefix('[')
        .and_then(|rest| rest.split_once("] "))
        .is_some_and(|(note_tag, body)| {
            body == value && normalize_label(note_tag) == normalize_label(tag)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_table_is_unique_and_normalized() {
        let mut seen = std::collections::HashSet::new();
        for (alias, _) in ALIASES {
            assert!(seen.insert(*alias), "duplicate alias {alias}");
            assert_eq!(normalize_label(alias), *alias);
        }
        assert!(ALIASES.len() >= 50);
    }

    #[test]
    fn normalization_folds_case_accents_and_spaces() {
        assert_eq!(normalize_label("  Memórias Especiais "), "memorias_especiais");
        assert_eq!(normalize_label("Estado-Civil"), "estado_civil");
        assert_eq!(normalize_label("NÃO GOSTA"), "nao_gosta");
    }

    #[test]
    fn known_aliases_resolve_directly() {
        assert_eq!(resolve("gostos"), MemoryTarget::List(ListField::Likes));
        assert_eq!(resolve("Profissão"), MemoryTarget::Scalar(ScalarField::Occupation));
        assert_eq!(resolve("humor"), MemoryTarget::Scalar(ScalarField::Mood));
        assert_eq!(resolve("família"), MemoryTarget::List(ListField::Family));
    }

    #[test]
    fn dislike_cues_win_over_like_cues() {
        assert_eq!(
            resolve("coisas_que_nao_gosta"),
            MemoryTarget::List(ListField::Dislikes)
        );
        assert_eq!(resolve("dislikes_food"), MemoryTarget::List(ListField::Dislikes));
        assert_eq!(resolve("comida favorita"), MemoryTarget::List(ListField::Likes));
    }

    #[test]
    fn activity_and_topic_cues() {
        assert_eq!(resolve("esporte_preferido_x"), MemoryTarget::List(ListField::Likes));
        assert_eq!(resolve("esportes"), MemoryTarget::List(ListField::Hobbies));
        assert_eq!(resolve("tema de conversa"), MemoryTarget::List(ListField::FavoriteTopics));
    }

    #[test]
    fn personal_info_cues_become_custom_fields() {
        assert_eq!(
            resolve("info_pet"),
            MemoryTarget::Custom("info_pet".to_string())
        );
        assert_eq!(
            resolve("Dados Bancários"),
            MemoryTarget::Custom("dados_bancarios".to_string())
        );
    }

    #[test]
    fn unmatched_labels_become_tagged_notes() {
        assert_eq!(resolve("Signo"), MemoryTarget::TaggedNote("Signo".to_string()));
        assert_eq!(resolve("   "), MemoryTarget::TaggedNote("sem_tipo".to_string()));
    }

    #[test]
    fn tagged_notes_match_regardless_of_label_case() {
        let note = tagged("Signo", "leão");
        assert!(is_tagged(&note, "signo", "leão"));
        assert!(is_tagged(&note, " SIGNO ", "leão"));
        assert!(!is_tagged(&note, "signo", "touro"));
        assert!(!is_tagged("signo leão", "signo", "leão"));
    }
}
