use std::borrow::Cow;

use serde::Serialize;
use serde::ser::{SerializeSeq, Serializer};
use serde_json::Value;

use crate::error::GatewayError;

/// In-memory tabular data: ordered column names plus rows of JSON cells.
/// Row identity is positional. Serializes to a JSON array of record objects.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Table { columns, rows }
    }

    /// Parses comma-separated upload bytes. Uploads come from a legacy
    /// system and may be ISO-8859-2 encoded; valid UTF-8 passes through.
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self, GatewayError> {
        let text: Cow<'_, str> = match std::str::from_utf8(bytes) {
            Ok(text) => Cow::Borrowed(text),
            Err(_) => encoding_rs::ISO_8859_2.decode(bytes).0,
        };
        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(
                record
                    .iter()
                    .map(|field| Value::String(field.to_string()))
                    .collect(),
            );
        }
        Ok(Table { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn value(&self, row: usize, column: usize) -> &Value {
        &self.rows[row][column]
    }

    /// Cell rendered as plain text for prompt substitution. Nulls render
    /// empty, strings unquoted, everything else in its JSON form.
    pub fn cell_text(&self, row: usize, column: usize) -> String {
        match &self.rows[row][column] {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Returns a copy of this table with one column assigned: appended if
    /// new, overwritten in place if the name already exists. The receiver is
    /// never mutated; callers keep their original data.
    pub fn with_column(&self, name: &str, values: Vec<Value>) -> Table {
        assert_eq!(values.len(), self.rows.len());
        let mut table = self.clone();
        match table.column_index(name) {
            Some(idx) => {
                for (row, value) in table.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                table.columns.push(name.to_string());
                for (row, value) in table.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        table
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            let record: serde_json::Map<String, Value> = self
                .columns
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect();
            seq.serialize_element(&record)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Table {
        Table::from_csv_bytes(b"question,chat_history\nIs VPN down?,none\nNew account please,none\n")
            .unwrap()
    }

    mod csv_parsing {
        use super::*;

        #[test]
        fn parses_headers_and_rows() {
            let table = sample();
            assert_eq!(table.columns(), ["question", "chat_history"]);
            assert_eq!(table.len(), 2);
            assert_eq!(table.cell_text(0, 0), "Is VPN down?");
            assert_eq!(table.cell_text(1, 1), "none");
        }

        #[test]
        fn decodes_iso_8859_2_uploads() {
            // 0xE7 is ç and 0xE3 is ă in ISO-8859-2; neither is valid UTF-8.
            let mut bytes = b"description\n".to_vec();
            bytes.extend_from_slice(b"Requisi\xE7\xE3o\n");
            let table = Table::from_csv_bytes(&bytes).unwrap();
            assert_eq!(table.cell_text(0, 0), "Requisiçăo");
        }

        #[test]
        fn utf8_passes_through_unchanged() {
            let table = Table::from_csv_bytes("description\nRequisição de Serviço\n".as_bytes())
                .unwrap();
            assert_eq!(table.cell_text(0, 0), "Requisição de Serviço");
        }

        #[test]
        fn ragged_record_is_a_csv_error() {
            let result = Table::from_csv_bytes(b"a,b\n1,2,3\n");
            assert!(matches!(result, Err(GatewayError::Csv(_))));
        }
    }

    mod columns {
        use super::*;

        #[test]
        fn column_index_finds_existing_columns() {
            let table = sample();
            assert_eq!(table.column_index("chat_history"), Some(1));
            assert_eq!(table.column_index("missing"), None);
        }

        #[test]
        fn with_column_appends_without_mutating_original() {
            let table = sample();
            let augmented = table.with_column("llm_response", vec![json!("a"), json!(2)]);
            assert_eq!(augmented.columns().len(), 3);
            assert_eq!(augmented.value(1, 2), &json!(2));
            // defensive copy: the original table is untouched
            assert_eq!(table.columns().len(), 2);
        }

        #[test]
        fn with_column_overwrites_an_existing_name() {
            let table = sample().with_column("chat_history", vec![json!("a"), json!("b")]);
            assert_eq!(table.columns().len(), 2);
            assert_eq!(table.value(0, 1), &json!("a"));
        }

        #[test]
        fn cell_text_renders_null_empty_and_numbers_bare() {
            let table = Table::new(
                vec!["v".into()],
                vec![vec![Value::Null], vec![json!(42)], vec![json!("x")]],
            );
            assert_eq!(table.cell_text(0, 0), "");
            assert_eq!(table.cell_text(1, 0), "42");
            assert_eq!(table.cell_text(2, 0), "x");
        }
    }

    mod serialization {
        use super::*;

        #[test]
        fn serializes_to_record_objects() {
            let table = sample().with_column("llm_response", vec![json!("Incident"), Value::Null]);
            let json = serde_json::to_value(&table).unwrap();
            assert_eq!(
                json,
                json!([
                    {"question": "Is VPN down?", "chat_history": "none", "llm_response": "Incident"},
                    {"question": "New account please", "chat_history": "none", "llm_response": null},
                ])
            );
        }
    }
}
