use crate::error::ModelError;
use serde_json::Value;

/// A sheet row: cell values in column order.
pub type Row = Vec<Value>;

/// Serializes a row into the JSON array used as a record payload.
pub fn encode_row(row: &[Value]) -> Result<Vec<u8>, ModelError> {
    serde_json::to_vec(row).map_err(ModelError::InvalidPayload)
}

/// Decodes a record payload back into a row. The payload must be a JSON array;
/// objects or scalars are rejected.
pub fn decode_row(payload: &[u8]) -> Result<Row, ModelError> {
    serde_json::from_slice::<Row>(payload).map_err(ModelError::InvalidPayload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_mixed_cells() {
        let row = decode_row(br#"["a", 1, true, null, 2.5]"#).unwrap();
        assert_eq!(row, vec![json!("a"), json!(1), json!(true), Value::Null, json!(2.5)]);
    }

    #[test]
    fn rejects_non_array_payloads() {
        assert!(decode_row(br#"{"a": 1}"#).is_err());
        assert!(decode_row(b"42").is_err());
        assert!(decode_row(b"").is_err());
    }

    #[test]
    fn encode_keeps_cell_order() {
        let bytes = encode_row(&[json!("x"), json!("y"), json!("z")]).unwrap();
        assert_eq!(bytes, br#"["x","y","z"]"#);
    }
}
