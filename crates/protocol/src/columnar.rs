//! Columnar ("transposed") wire encoding.
//!
//! The server shrinks each message by sending a sequence of records as a
//! single record of columns, marked with a `_t` key:
//!
//! ```text
//! [{"x":1,"y":2},{"x":3,"y":4}]   <=>   {"x":[1,3],"y":[2,4],"_t":1}
//! ```
//!
//! Columns may themselves be transposed (a robot table carries a transposed
//! `position` column), so both directions recurse through the whole tree.

use serde_json::{Map, Value};

use crate::ProtocolError;

/// Key marking a record as column-encoded.
pub const COLUMN_TAG: &str = "_t";

/// Turn a column-encoded value tree back into row-oriented records.
///
/// Untagged nodes pass through with their keys and order intact, so decoding
/// an already row-oriented tree returns it unchanged.
pub fn decode(value: Value) -> Result<Value, ProtocolError> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(decode)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(mut fields) => {
            if is_column_tagged(&fields) {
                fields.shift_remove(COLUMN_TAG);
                transpose(fields)
            } else {
                fields
                    .into_iter()
                    .map(|(key, value)| decode(value).map(|value| (key, value)))
                    .collect::<Result<Map<_, _>, _>>()
                    .map(Value::Object)
            }
        }
        scalar => Ok(scalar),
    }
}

/// Column-encode a row-oriented value tree the way the server does.
///
/// Only non-empty sequences of records that all share the same keys are
/// transposed, which keeps `decode(encode(v)) == v` for every tree. Booleans
/// are left as booleans.
pub fn encode(value: &Value) -> Value {
    match value {
        Value::Array(items) => match record_keys(items) {
            Some(keys) => {
                let mut columns = Map::with_capacity(keys.len() + 1);
                for key in keys {
                    let column = items.iter().map(|item| item[key.as_str()].clone()).collect();
                    columns.insert(key.clone(), encode(&Value::Array(column)));
                }
                columns.insert(COLUMN_TAG.to_string(), Value::Bool(true));
                Value::Object(columns)
            }
            None => Value::Array(items.iter().map(encode).collect()),
        },
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, value)| (key.clone(), encode(value)))
                .collect(),
        ),
        scalar => scalar.clone(),
    }
}

/// The server writes booleans as integers, so the tag usually arrives as `1`.
fn is_column_tagged(fields: &Map<String, Value>) -> bool {
    match fields.get(COLUMN_TAG) {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}

fn transpose(columns: Map<String, Value>) -> Result<Value, ProtocolError> {
    let mut row_count: Option<usize> = None;
    let mut decoded = Vec::with_capacity(columns.len());

    for (field, column) in columns {
        let Value::Array(cells) = decode(column)? else {
            return Err(ProtocolError::ColumnNotSequence { field });
        };
        match row_count {
            None => row_count = Some(cells.len()),
            Some(expected) if expected != cells.len() => {
                return Err(ProtocolError::ColumnLengthMismatch {
                    field,
                    expected,
                    found: cells.len(),
                });
            }
            Some(_) => {}
        }
        decoded.push((field, cells.into_iter()));
    }

    let rows = (0..row_count.unwrap_or(0))
        .map(|_| {
            let row = decoded
                .iter_mut()
                .map(|(field, cells)| (field.clone(), cells.next().unwrap_or(Value::Null)))
                .collect::<Map<_, _>>();
            Value::Object(row)
        })
        .collect();

    Ok(Value::Array(rows))
}

/// Keys of a non-empty sequence of non-empty records that all share them.
fn record_keys(items: &[Value]) -> Option<Vec<&String>> {
    let Value::Object(first) = items.first()? else {
        return None;
    };
    if first.is_empty() {
        return None;
    }
    let homogeneous = items.iter().all(|item| match item {
        Value::Object(fields) => {
            fields.len() == first.len() && first.keys().all(|key| fields.contains_key(key))
        }
        _ => false,
    });
    homogeneous.then(|| first.keys().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use serde_json::json;

    #[test]
    fn test_transposes_tagged_record() {
        let wire = json!({"x": [1, 3], "y": [2, 4], "_t": true});
        let rows = decode(wire).unwrap();
        assert_eq!(rows, json!([{"x": 1, "y": 2}, {"x": 3, "y": 4}]));
    }

    #[test]
    fn test_integer_tag_from_server() {
        let wire: Value =
            serde_json::from_str(r#"{"name":["a","b"],"health":[100,50.5],"_t":1}"#).unwrap();
        let rows = decode(wire).unwrap();
        assert_eq!(
            rows,
            json!([{"name": "a", "health": 100}, {"name": "b", "health": 50.5}])
        );
    }

    #[test]
    fn test_nested_tagged_column() {
        let wire = json!({
            "name": ["a", "b"],
            "position": {"x": [10, 20], "y": [30, 40], "_t": 1},
            "_t": 1
        });
        let rows = decode(wire).unwrap();
        assert_eq!(
            rows,
            json!([
                {"name": "a", "position": {"x": 10, "y": 30}},
                {"name": "b", "position": {"x": 20, "y": 40}}
            ])
        );
    }

    #[test]
    fn test_row_oriented_input_unchanged() {
        let rows = json!({
            "robots": [{"name": "a", "position": {"x": 1, "y": 2}}],
            "missiles": [],
            "winner": null,
            "flags": [true, false, 0]
        });
        assert_eq!(decode(rows.clone()).unwrap(), rows);
    }

    #[test]
    fn test_falsy_tag_is_an_ordinary_key() {
        let value = json!({"_t": 0, "a": [1]});
        assert_eq!(decode(value.clone()).unwrap(), value);
    }

    #[test]
    fn test_round_trip_nested_arena() {
        let arena = json!({
            "robots": [
                {"name": "pongbot", "position": {"x": 120.5, "y": 100}, "health": 100, "fired": true},
                {"name": "radarbot", "position": {"x": 880, "y": 900}, "health": 0, "fired": false}
            ],
            "missiles": [
                {"position": {"x": 500, "y": 20}, "angle": 270, "exploding": false, "explode_progress": 0}
            ],
            "winner": "pongbot",
            "history": [[1, 2], [], [3]]
        });
        let wire = encode(&arena);
        assert_eq!(wire["robots"][COLUMN_TAG], json!(true));
        assert_eq!(wire["robots"]["position"][COLUMN_TAG], json!(true));
        assert_eq!(decode(wire).unwrap(), arena);
    }

    const KEYS: [&str; 6] = ["x", "y", "name", "health", "position", "t"];

    fn random_scalar(rng: &mut StdRng) -> Value {
        match rng.random_range(0..5) {
            0 => Value::Null,
            1 => Value::Bool(rng.random()),
            2 => json!(rng.random_range(-1000i64..1000)),
            3 => json!(rng.random_range(-1000.0..1000.0)),
            _ => json!(format!("bot{}", rng.random_range(0..100))),
        }
    }

    fn random_record(rng: &mut StdRng, keys: &[&str], depth: u32) -> Value {
        let fields = keys
            .iter()
            .map(|key| (key.to_string(), random_tree(rng, depth)))
            .collect::<Map<_, _>>();
        Value::Object(fields)
    }

    fn random_keys(rng: &mut StdRng) -> Vec<&'static str> {
        KEYS.iter().copied().filter(|_| rng.random_range(0..3) == 0).collect()
    }

    /// Scalars, plain sequences, records and tables of records sharing keys.
    fn random_tree(rng: &mut StdRng, depth: u32) -> Value {
        if depth == 0 {
            return random_scalar(rng);
        }
        match rng.random_range(0..4) {
            0 => random_scalar(rng),
            1 => {
                let len = rng.random_range(0..4);
                Value::Array((0..len).map(|_| random_tree(rng, depth - 1)).collect())
            }
            2 => {
                let keys = random_keys(rng);
                random_record(rng, &keys, depth - 1)
            }
            _ => {
                let keys = random_keys(rng);
                let len = rng.random_range(0..5);
                Value::Array((0..len).map(|_| random_record(rng, &keys, depth - 1)).collect())
            }
        }
    }

    #[test]
    fn test_round_trip_random_trees() {
        let mut rng = StdRng::seed_from_u64(0x7a11);
        let mut transposed = 0;
        for _ in 0..500 {
            let tree = random_tree(&mut rng, 4);
            let wire = encode(&tree);
            if wire.to_string().contains(COLUMN_TAG) {
                transposed += 1;
            }
            assert_eq!(decode(wire).unwrap(), tree);
        }
        // Make sure the generator actually exercises the column path
        assert!(transposed > 25, "only {transposed} trees were transposed");
    }

    #[test]
    fn test_heterogeneous_records_stay_rows() {
        let mixed = json!([{"a": 1}, {"b": 2}]);
        assert_eq!(encode(&mixed), mixed);
        assert_eq!(decode(encode(&mixed)).unwrap(), mixed);
    }

    #[test]
    fn test_key_order_preserved() {
        let wire = json!({"zeta": [1], "alpha": [2], "mid": [3], "_t": 1});
        let rows = decode(wire).unwrap();
        let keys: Vec<&str> = rows[0].as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_mismatched_column_lengths() {
        let wire = json!({"x": [1, 2], "y": [3], "_t": 1});
        match decode(wire) {
            Err(ProtocolError::ColumnLengthMismatch { field, expected, found }) => {
                assert_eq!(field, "y");
                assert_eq!((expected, found), (2, 1));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_scalar_column_rejected() {
        let wire = json!({"x": 5, "_t": 1});
        assert!(matches!(
            decode(wire),
            Err(ProtocolError::ColumnNotSequence { field }) if field == "x"
        ));
    }
}
