//! Bulk question import from delimited text or a spreadsheet.
//!
//! Every row is validated before anything is written; the caller decides
//! whether a report with errors may still be committed.

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Reader, Xlsx};

use crate::dto::import_dto::{ImportReport, RowError};
use crate::error::{Error, Result};
use crate::models::question::{
    shape_errors, split_tags, Difficulty, NewQuestion, QuestionOption, QuestionType, MAX_OPTIONS,
};

const XLSX_MAGIC: &[u8] = b"PK\x03\x04";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Question,
    Option(usize),
    Correct,
    Type,
    Difficulty,
    Category,
    Tags,
    Explanation,
    Tricky,
    Hint,
}

fn normalize_header(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            'á' => Some('a'),
            'é' => Some('e'),
            'í' => Some('i'),
            'ó' => Some('o'),
            'ú' => Some('u'),
            ' ' | '_' | '-' => None,
            other => Some(other),
        })
        .collect()
}

fn column_for(header: &str) -> Option<Column> {
    let h = normalize_header(header);
    for prefix in ["option", "opcion"] {
        if let Some(n) = h.strip_prefix(prefix).and_then(|n| n.parse::<usize>().ok()) {
            return (1..=MAX_OPTIONS).contains(&n).then_some(Column::Option(n - 1));
        }
    }
    let col = match h.as_str() {
        "question" | "pregunta" => Column::Question,
        "correct" | "correcta" | "correctas" | "respuestacorrecta" | "answer" => Column::Correct,
        "type" | "tipo" => Column::Type,
        "difficulty" | "dificultad" => Column::Difficulty,
        "category" | "categoria" => Column::Category,
        "tags" | "etiquetas" => Column::Tags,
        "explanation" | "explicacion" => Column::Explanation,
        "tricky" | "capciosa" => Column::Tricky,
        "hint" | "pista" | "trickyhint" => Column::Hint,
        _ => return None,
    };
    Some(col)
}

/// One data row keyed by column, before validation.
#[derive(Debug, Default, Clone)]
struct RawRow {
    question: String,
    options: [String; MAX_OPTIONS],
    correct: String,
    question_type: String,
    difficulty: String,
    category: String,
    tags: String,
    explanation: String,
    tricky: String,
    hint: String,
}

impl RawRow {
    fn from_cells(columns: &[Option<Column>], cells: &[String]) -> Self {
        let mut row = RawRow::default();
        for (col, cell) in columns.iter().zip(cells) {
            let value = cell.trim().to_string();
            match col {
                Some(Column::Question) => row.question = value,
                Some(Column::Option(i)) => row.options[*i] = value,
                Some(Column::Correct) => row.correct = value,
                Some(Column::Type) => row.question_type = value,
                Some(Column::Difficulty) => row.difficulty = value,
                Some(Column::Category) => row.category = value,
                Some(Column::Tags) => row.tags = value,
                Some(Column::Explanation) => row.explanation = value,
                Some(Column::Tricky) => row.tricky = value,
                Some(Column::Hint) => row.hint = value,
                None => {}
            }
        }
        row
    }

    fn is_blank(&self) -> bool {
        self.question.is_empty() && self.options.iter().all(|o| o.is_empty())
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "true" | "si" | "sí" | "yes" | "1" | "x"
    )
}

/// `"1,3"`, `"A;C"`, `"b | d"` -> zero-based option columns.
fn parse_correct(raw: &str) -> std::result::Result<Vec<usize>, String> {
    let mut out = Vec::new();
    for token in raw
        .split([',', ';', '|', ' '])
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        let idx = if let Ok(n) = token.parse::<usize>() {
            if n == 0 {
                return Err(format!("Respuesta correcta fuera de rango: {}", token));
            }
            n - 1
        } else {
            let mut chars = token.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphabetic() => {
                    (c.to_ascii_lowercase() as u8 - b'a') as usize
                }
                _ => return Err(format!("Respuesta correcta no válida: {}", token)),
            }
        };
        if !out.contains(&idx) {
            out.push(idx);
        }
    }
    Ok(out)
}

fn validate_row(row: &RawRow) -> std::result::Result<NewQuestion, Vec<String>> {
    let mut errors = Vec::new();

    let correct_columns = match parse_correct(&row.correct) {
        Ok(c) => c,
        Err(e) => {
            errors.push(e);
            Vec::new()
        }
    };

    // Options keep their column number so "correct" can point at them.
    let mut options = Vec::new();
    let mut column_to_option = [None; MAX_OPTIONS];
    for (col, text) in row.options.iter().enumerate() {
        if !text.is_empty() {
            column_to_option[col] = Some(options.len());
            options.push(QuestionOption {
                text: text.clone(),
                is_correct: false,
            });
        }
    }
    for col in &correct_columns {
        match column_to_option.get(*col).copied().flatten() {
            Some(i) => options[i].is_correct = true,
            None => errors.push(format!("Respuesta correcta fuera de rango: {}", col + 1)),
        }
    }

    let tricky = parse_flag(&row.tricky);
    let question_type = if row.question_type.is_empty() {
        None
    } else {
        match QuestionType::parse(&row.question_type) {
            Some(t) => Some(t),
            None => {
                errors.push(format!("Tipo de pregunta no válido: {}", row.question_type));
                None
            }
        }
    };
    let question_type = if tricky {
        QuestionType::Tricky
    } else {
        question_type.unwrap_or(if correct_columns.len() > 1 {
            QuestionType::MultipleChoice
        } else {
            QuestionType::SingleChoice
        })
    };

    let difficulty = if row.difficulty.is_empty() {
        Difficulty::default()
    } else {
        Difficulty::parse(&row.difficulty).unwrap_or_else(|| {
            errors.push(format!("Dificultad no válida: {}", row.difficulty));
            Difficulty::default()
        })
    };

    // Range errors above already explain a missing correct answer.
    for e in shape_errors(&row.question, question_type, &options) {
        let redundant = e.starts_with("Debe indicar")
            && errors.iter().any(|x| x.starts_with("Respuesta correcta"));
        if !redundant {
            errors.push(e);
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
    Ok(NewQuestion {
        text: row.question.clone(),
        question_type,
        options,
        difficulty,
        category: non_empty(&row.category),
        tags: split_tags(&row.tags),
        explanation: non_empty(&row.explanation),
        tricky_hint: non_empty(&row.hint),
    })
}

/// Splits delimited text into records. Handles quoted fields with embedded
/// delimiters, doubled quotes and line breaks.
fn parse_delimited(text: &str, delimiter: char) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                other => field.push(other),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => in_quotes = true,
            c if c == delimiter => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            other => field.push(other),
        }
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}

fn detect_delimiter(header_line: &str) -> char {
    let semicolons = header_line.matches(';').count();
    let commas = header_line.matches(',').count();
    let tabs = header_line.matches('\t').count();
    if tabs > commas && tabs > semicolons {
        '\t'
    } else if semicolons > commas {
        ';'
    } else {
        ','
    }
}

fn read_delimited(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| Error::BadRequest("El archivo debe estar codificado en UTF-8".to_string()))?;
    let text = text.trim_start_matches('\u{feff}');
    let header_line = text.lines().next().unwrap_or_default();
    Ok(parse_delimited(text, detect_delimiter(header_line)))
}

fn read_xlsx(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::BadRequest("El libro no contiene hojas".to_string()))??;
    Ok(range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect())
}

pub struct ImportService;

impl ImportService {
    /// Parses and validates a whole file. `file_name` only picks the reader
    /// when the content itself is ambiguous.
    pub fn analyze(bytes: &[u8], file_name: Option<&str>) -> Result<ImportReport> {
        let is_xlsx = bytes.starts_with(XLSX_MAGIC)
            || file_name
                .map(|n| n.to_lowercase().ends_with(".xlsx"))
                .unwrap_or(false);
        let records = if is_xlsx {
            read_xlsx(bytes)?
        } else {
            read_delimited(bytes)?
        };
        Self::analyze_records(records)
    }

    fn analyze_records(records: Vec<Vec<String>>) -> Result<ImportReport> {
        let mut rows = records.into_iter();
        let header = rows
            .next()
            .ok_or_else(|| Error::BadRequest("El archivo está vacío".to_string()))?;
        let columns: Vec<Option<Column>> = header.iter().map(|h| column_for(h)).collect();
        for (required, name) in [(Column::Question, "question"), (Column::Option(0), "option1")] {
            if !columns.contains(&Some(required)) {
                return Err(Error::BadRequest(format!("Falta la columna obligatoria: {}", name)));
            }
        }

        let mut report = ImportReport {
            total_rows: 0,
            valid_rows: 0,
            invalid_rows: 0,
            errors: Vec::new(),
            questions: Vec::new(),
        };
        for (offset, cells) in rows.enumerate() {
            let raw = RawRow::from_cells(&columns, &cells);
            if raw.is_blank() {
                continue;
            }
            report.total_rows += 1;
            match validate_row(&raw) {
                Ok(question) => {
                    report.valid_rows += 1;
                    report.questions.push(question);
                }
                Err(messages) => {
                    report.invalid_rows += 1;
                    report.errors.push(RowError {
                        row: offset + 2,
                        messages,
                    });
                }
            }
        }
        tracing::debug!(
            total = report.total_rows,
            valid = report.valid_rows,
            invalid = report.invalid_rows,
            "import analyzed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "question,option1,option2,option3,option4,option5,correct,type,difficulty,category,tags,explanation,tricky,hint";

    fn analyze(body: &str) -> ImportReport {
        ImportService::analyze(format!("{}\n{}", HEADER, body).as_bytes(), Some("q.csv")).unwrap()
    }

    #[test]
    fn single_option_row_is_rejected_and_excluded() {
        let report = analyze(
            "¿Qué es el CAT?,Costo anual total,,,,,1,single,easy,crédito,,,,\n\
             ¿Plazo máximo?,12 meses,24 meses,,,,2,,,,,,,",
        );
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.valid_rows, 1);
        assert_eq!(report.errors[0].row, 2);
        assert!(report.errors[0]
            .messages
            .contains(&"Se requieren al menos 2 opciones".to_string()));
        assert_eq!(report.questions.len(), 1);
        assert_eq!(report.questions[0].text, "¿Plazo máximo?");
    }

    #[test]
    fn quoted_fields_and_letters_are_understood() {
        let report = analyze(
            "\"¿Cuáles son requisitos, según la política?\",INE,\"Comprobante \"\"reciente\"\"\",Pasaporte,,,\"A;B\",,hard,,\"kyc; requisitos\",,,",
        );
        assert_eq!(report.valid_rows, 1, "{:?}", report.errors);
        let q = &report.questions[0];
        assert_eq!(q.text, "¿Cuáles son requisitos, según la política?");
        assert_eq!(q.options[1].text, "Comprobante \"reciente\"");
        assert_eq!(q.question_type, QuestionType::MultipleChoice);
        assert_eq!(q.difficulty, Difficulty::Hard);
        assert_eq!(q.tags, vec!["kyc", "requisitos"]);
    }

    #[test]
    fn tricky_flag_forces_tricky_type_and_keeps_hint() {
        let report = analyze("¿Seguro?,Sí,No,,,,2,,,,,,sí,Lee con calma");
        let q = &report.questions[0];
        assert_eq!(q.question_type, QuestionType::Tricky);
        assert_eq!(q.tricky_hint.as_deref(), Some("Lee con calma"));
    }

    #[test]
    fn out_of_range_and_unknown_values_are_reported() {
        let report = analyze("Pregunta,A,B,,,,4,essay,imposible,,,,,");
        let messages = &report.errors[0].messages;
        assert!(messages.contains(&"Respuesta correcta fuera de rango: 4".to_string()));
        assert!(messages.contains(&"Tipo de pregunta no válido: essay".to_string()));
        assert!(messages.contains(&"Dificultad no válida: imposible".to_string()));
        assert!(!messages.iter().any(|m| m.starts_with("Debe indicar")));
    }

    #[test]
    fn single_choice_with_two_answers_is_rejected() {
        let report = analyze("Pregunta,A,B,C,,,\"1,2\",single,,,,,,");
        assert_eq!(
            report.errors[0].messages,
            vec!["Las preguntas de opción única solo admiten una respuesta correcta".to_string()]
        );
    }

    #[test]
    fn semicolon_files_with_bom_and_spanish_headers() {
        let body = "\u{feff}Pregunta;Opción 1;Opción 2;Correcta\r\n¿Uno?;Sí;No;1\r\n\r\n";
        let report = ImportService::analyze(body.as_bytes(), None).unwrap();
        assert_eq!(report.total_rows, 1);
        assert_eq!(report.valid_rows, 1);
    }

    #[test]
    fn missing_required_column_is_a_bad_request() {
        let err = ImportService::analyze(b"texto,option1\nx,y", None).unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn correct_parsing_accepts_numbers_and_letters() {
        assert_eq!(parse_correct("1, 3").unwrap(), vec![0, 2]);
        assert_eq!(parse_correct("b|D").unwrap(), vec![1, 3]);
        assert!(parse_correct("uno").is_err());
        assert!(parse_correct("0").is_err());
        assert!(parse_correct("").unwrap().is_empty());
    }
}
