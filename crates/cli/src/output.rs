use crate::error::CliError;
use chrono::{DateTime, Utc};
use engine_config::spec::Specification;
use model::records::record::Record;
use serde::Serialize;
use serde_json::Value;
use std::io::Write;

/// One line of `sheetsync read` output.
#[derive(Debug, Serialize)]
pub struct RecordLine {
    pub key: String,
    pub position: Value,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

impl From<&Record> for RecordLine {
    fn from(record: &Record) -> Self {
        RecordLine {
            key: record.key.clone(),
            position: as_json(&record.position),
            payload: as_json(&record.payload),
            created_at: record.created_at,
        }
    }
}

/// Embeds JSON bytes as-is; anything else is kept as a string.
fn as_json(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

pub fn print_record(out: &mut impl Write, record: &Record) -> Result<(), CliError> {
    serde_json::to_writer(&mut *out, &RecordLine::from(record))?;
    writeln!(out)?;
    Ok(())
}

/// Prints a record to stdout and flushes so piped consumers see it at once.
pub fn emit(record: &Record) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    print_record(&mut stdout, record)?;
    stdout.flush()?;
    Ok(())
}

pub async fn write_spec(spec: &Specification, path: Option<String>) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(spec)?;
    match path {
        Some(path) => tokio::fs::write(path, json).await?,
        None => println!("{json}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::pagination::position::SheetPosition;

    #[test]
    fn record_line_embeds_json_fields() {
        let position = SheetPosition::new(3, "abc", 0);
        let record = Record::new(position.to_bytes(), "3", r#"["a",1]"#);

        let mut out = Vec::new();
        print_record(&mut out, &record).unwrap();

        let line: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(line["key"], "3");
        assert_eq!(line["position"]["row_offset"], 3);
        assert_eq!(line["payload"], serde_json::json!(["a", 1]));
        assert!(out.ends_with(b"\n"));
    }

    #[test]
    fn non_json_bytes_become_strings() {
        assert_eq!(as_json(b"plain"), Value::String("plain".into()));
        assert_eq!(as_json(b""), Value::Null);
    }
}
