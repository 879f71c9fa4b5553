use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: Uuid,
    pub product_id: Option<Uuid>,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub options: Json<Vec<QuestionOption>>,
    pub difficulty: Difficulty,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub explanation: Option<String>,
    pub tricky_hint: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "question_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    Tricky,
}

impl QuestionType {
    /// Single choice and tricky questions take exactly one selected option.
    pub fn is_single_answer(self) -> bool {
        !matches!(self, QuestionType::MultipleChoice)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "single" | "single_choice" | "unica" | "única" | "opcion_unica" | "opción_única" => {
                Some(QuestionType::SingleChoice)
            }
            "multiple" | "multiple_choice" | "opcion_multiple" | "opción_múltiple" | "múltiple" => {
                Some(QuestionType::MultipleChoice)
            }
            "tricky" | "capciosa" | "trampa" => Some(QuestionType::Tricky),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "difficulty", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "easy" | "facil" | "fácil" | "baja" => Some(Difficulty::Easy),
            "medium" | "media" | "medio" => Some(Difficulty::Medium),
            "hard" | "dificil" | "difícil" | "alta" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// A question ready to be written, from the editor or from a bulk import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuestion {
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub options: Vec<QuestionOption>,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub explanation: Option<String>,
    pub tricky_hint: Option<String>,
}

impl NewQuestion {
    /// Shape rules shared by the editor and the importer. Messages are shown
    /// to admins as-is.
    pub fn shape_errors(&self) -> Vec<String> {
        shape_errors(&self.text, self.question_type, &self.options)
    }
}

pub fn shape_errors(text: &str, question_type: QuestionType, options: &[QuestionOption]) -> Vec<String> {
    let mut errors = Vec::new();
    if text.trim().is_empty() {
        errors.push("La pregunta es obligatoria".to_string());
    }
    let filled = options.iter().filter(|o| !o.text.trim().is_empty()).count();
    if filled < MIN_OPTIONS {
        errors.push("Se requieren al menos 2 opciones".to_string());
    }
    if options.len() > MAX_OPTIONS {
        errors.push(format!("Se admiten como máximo {} opciones", MAX_OPTIONS));
    }
    let correct = options.iter().filter(|o| o.is_correct).count();
    if correct == 0 {
        errors.push("Debe indicar al menos una respuesta correcta".to_string());
    } else if correct > 1 && question_type.is_single_answer() {
        errors.push(
            "Las preguntas de opción única solo admiten una respuesta correcta".to_string(),
        );
    }
    errors
}

/// Splits free-form tag input on commas and semicolons.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opt(text: &str, is_correct: bool) -> QuestionOption {
        QuestionOption {
            text: text.to_string(),
            is_correct,
        }
    }

    #[test]
    fn single_option_is_rejected() {
        let errors = shape_errors("¿Qué es un crédito?", QuestionType::SingleChoice, &[opt("A", true)]);
        assert!(errors.contains(&"Se requieren al menos 2 opciones".to_string()));
    }

    #[test]
    fn single_choice_with_two_correct_is_rejected() {
        let errors = shape_errors(
            "Pregunta",
            QuestionType::Tricky,
            &[opt("A", true), opt("B", true)],
        );
        assert_eq!(
            errors,
            vec!["Las preguntas de opción única solo admiten una respuesta correcta".to_string()]
        );
    }

    #[test]
    fn multiple_choice_allows_several_correct() {
        let errors = shape_errors(
            "Pregunta",
            QuestionType::MultipleChoice,
            &[opt("A", true), opt("B", true), opt("C", false)],
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn parses_spanish_aliases() {
        assert_eq!(QuestionType::parse("Capciosa"), Some(QuestionType::Tricky));
        assert_eq!(QuestionType::parse("opción múltiple"), Some(QuestionType::MultipleChoice));
        assert_eq!(Difficulty::parse("Difícil"), Some(Difficulty::Hard));
        assert_eq!(QuestionType::parse("essay"), None);
    }

    #[test]
    fn split_tags_drops_blanks() {
        assert_eq!(split_tags("ventas; crédito,, ahorro "), vec!["ventas", "crédito", "ahorro"]);
    }
}
