//! Serializer Module
//!
//! 抽出済みテーブルを転送用レコードへ変換するモジュール。
//! 値の型は保存されます（数値は数値のまま、テキストはテキストのまま、
//! 日付は正規化済みの文字列、空セルはnull）。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::extract::ExtractedTable;
use crate::types::CellValue;

/// シリアライズ済みテーブル（転送・永続化の単位）
///
/// 呼び出し側へ返され、スナップショットとして永続化されるレコードです。
///
/// # JSON表現
///
/// ```json
/// {
///   "columns": ["name", "age"],
///   "rows": [
///     {"name": "Alice", "age": 30},
///     {"name": "Bob", "age": 25}
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedTable {
    /// 一意化済みの列名（元の列順を保持）
    pub columns: Vec<String>,

    /// データ行のリスト。各行は列名をキーとするマッピング
    pub rows: Vec<Map<String, Value>>,
}

/// 抽出済みテーブルをシリアライズ
///
/// データ行ごとに、最終列名をキーとするマッピングを生成します。
/// 副作用はありません。
pub(crate) fn serialize_table(table: &ExtractedTable) -> SerializedTable {
    let rows = table
        .rows
        .iter()
        .map(|row| {
            let mut obj = Map::new();
            for (column, value) in table.columns.iter().zip(row.iter()) {
                obj.insert(column.clone(), value_to_json(value));
            }
            obj
        })
        .collect();

    SerializedTable {
        columns: table.columns.clone(),
        rows,
    }
}

/// セル値をJSON値へ変換
///
/// 整数値に収まる数値は整数として出力します（`30.0` -> `30`）。
fn value_to_json(value: &CellValue) -> Value {
    match value {
        CellValue::Number(n) => {
            if n.fract() == 0.0 && *n >= i64::MIN as f64 && *n <= i64::MAX as f64 {
                Value::Number(Number::from(*n as i64))
            } else {
                Number::from_f64(*n).map(Value::Number).unwrap_or(Value::Null)
            }
        }
        CellValue::Text(s) => Value::String(s.clone()),
        CellValue::Bool(b) => Value::Bool(*b),
        // DateTime系は抽出時にTextへ正規化済みだが、念のため素通しする
        CellValue::DateTime(serial) => Number::from_f64(*serial)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        CellValue::DateTimeIso(s) => Value::String(s.clone()),
        CellValue::Error(e) => Value::String(e.clone()),
        CellValue::Empty => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trip_columns_and_rows() {
        // columns ["a","b"], rows [[1,2]] ->
        // {columns:["a","b"], rows:[{"a":1,"b":2}]}
        let table = ExtractedTable {
            columns: vec!["a".to_string(), "b".to_string()],
            rows: vec![vec![CellValue::Number(1.0), CellValue::Number(2.0)]],
        };

        let serialized = serialize_table(&table);
        let value = serde_json::to_value(&serialized).unwrap();

        assert_eq!(
            value,
            json!({
                "columns": ["a", "b"],
                "rows": [{"a": 1, "b": 2}]
            })
        );
    }

    #[test]
    fn test_value_types_preserved() {
        let table = ExtractedTable {
            columns: vec![
                "num".to_string(),
                "text".to_string(),
                "flag".to_string(),
                "when".to_string(),
                "blank".to_string(),
            ],
            rows: vec![vec![
                CellValue::Number(12.5),
                CellValue::Text("hello".to_string()),
                CellValue::Bool(true),
                CellValue::Text("2024-01-15".to_string()),
                CellValue::Empty,
            ]],
        };

        let serialized = serialize_table(&table);
        let row = &serialized.rows[0];

        assert_eq!(row["num"], json!(12.5));
        assert_eq!(row["text"], json!("hello"));
        assert_eq!(row["flag"], json!(true));
        assert_eq!(row["when"], json!("2024-01-15"));
        assert_eq!(row["blank"], Value::Null);
    }

    #[test]
    fn test_integral_numbers_serialize_as_integers() {
        assert_eq!(value_to_json(&CellValue::Number(30.0)), json!(30));
        assert_eq!(value_to_json(&CellValue::Number(-7.0)), json!(-7));
        assert_eq!(value_to_json(&CellValue::Number(0.5)), json!(0.5));
    }

    #[test]
    fn test_empty_table_serializes_to_empty_rows() {
        let table = ExtractedTable {
            columns: vec!["a".to_string()],
            rows: Vec::new(),
        };

        let serialized = serialize_table(&table);
        assert_eq!(serialized.columns, vec!["a"]);
        assert!(serialized.rows.is_empty());
    }

    #[test]
    fn test_serialized_table_json_round_trip() {
        let table = ExtractedTable {
            columns: vec!["name".to_string(), "age".to_string()],
            rows: vec![
                vec![
                    CellValue::Text("Alice".to_string()),
                    CellValue::Number(30.0),
                ],
                vec![CellValue::Text("Bob".to_string()), CellValue::Number(25.0)],
            ],
        };

        let serialized = serialize_table(&table);
        let json_text = serde_json::to_string(&serialized).unwrap();
        let restored: SerializedTable = serde_json::from_str(&json_text).unwrap();

        assert_eq!(restored, serialized);
    }
}
