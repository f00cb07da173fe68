//! Route handlers

pub mod precipitation;
pub mod stations;
pub mod summary;
pub mod tobs;

use serde_json::Value;

/// Flatten `(date, value)` pairs into `[date, value, date, value, ...]`
pub(crate) fn flatten_pairs<I, V>(pairs: I) -> Vec<Value>
where
    I: IntoIterator<Item = (String, V)>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .flat_map(|(date, value)| [Value::String(date), value.into()])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_pairs() {
        let flat = flatten_pairs(vec![
            ("2017-08-23".to_string(), Some(0.45)),
            ("2017-08-22".to_string(), None),
        ]);
        assert_eq!(flat, vec![json!("2017-08-23"), json!(0.45), json!("2017-08-22"), Value::Null]);
    }

    #[test]
    fn test_flatten_empty() {
        assert!(flatten_pairs(Vec::<(String, f64)>::new()).is_empty());
    }
}
