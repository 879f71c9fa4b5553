use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OnboardingField {
    pub id: Uuid,
    pub label: String,
    pub field_key: String,
    pub field_type: FieldType,
    pub required: bool,
    pub options: Vec<String>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "onboarding_field_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Select,
    Checkbox,
}

impl OnboardingField {
    /// Checks one submitted value. `None` means the key was absent or blank.
    pub fn check(&self, value: Option<&JsonValue>) -> Option<String> {
        let value = value.filter(|v| !is_blank(v));
        let Some(value) = value else {
            return self
                .required
                .then(|| format!("{}: campo obligatorio", self.label));
        };

        let ok = match self.field_type {
            FieldType::Text => value.is_string(),
            FieldType::Number => match value {
                JsonValue::Number(_) => true,
                JsonValue::String(s) => s.trim().parse::<f64>().is_ok(),
                _ => false,
            },
            FieldType::Date => value
                .as_str()
                .map(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").is_ok())
                .unwrap_or(false),
            FieldType::Select => value
                .as_str()
                .map(|s| self.options.iter().any(|o| o == s))
                .unwrap_or(false),
            FieldType::Checkbox => value.is_boolean(),
        };
        (!ok).then(|| format!("{}: valor no válido", self.label))
    }
}

fn is_blank(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Validates a whole onboarding form against the field definitions and keeps
/// only known keys.
pub fn validate_answers(
    fields: &[OnboardingField],
    answers: &Map<String, JsonValue>,
) -> Result<Map<String, JsonValue>, Vec<String>> {
    let errors: Vec<String> = fields
        .iter()
        .filter_map(|f| f.check(answers.get(&f.field_key)))
        .collect();
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(fields
        .iter()
        .filter_map(|f| {
            answers
                .get(&f.field_key)
                .map(|v| (f.field_key.clone(), v.clone()))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(key: &str, field_type: FieldType, required: bool, options: &[&str]) -> OnboardingField {
        OnboardingField {
            id: Uuid::new_v4(),
            label: key.to_string(),
            field_key: key.to_string(),
            field_type,
            required,
            options: options.iter().map(|o| o.to_string()).collect(),
            position: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn rejects_missing_required_and_bad_values() {
        let fields = vec![
            field("sucursal", FieldType::Select, true, &["Norte", "Sur"]),
            field("ingreso", FieldType::Date, true, &[]),
            field("edad", FieldType::Number, false, &[]),
        ];
        let answers = json!({ "sucursal": "Este", "edad": "veinte" });
        let errors = validate_answers(&fields, answers.as_object().unwrap()).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn keeps_only_known_keys() {
        let fields = vec![
            field("sucursal", FieldType::Select, true, &["Norte", "Sur"]),
            field("ingreso", FieldType::Date, false, &[]),
            field("acepta", FieldType::Checkbox, false, &[]),
        ];
        let answers = json!({
            "sucursal": "Sur",
            "ingreso": "2026-01-15",
            "acepta": true,
            "extra": "ignored"
        });
        let cleaned = validate_answers(&fields, answers.as_object().unwrap()).unwrap();
        assert_eq!(cleaned.len(), 3);
        assert!(!cleaned.contains_key("extra"));
    }
}
