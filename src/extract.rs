//! Extractor Module
//!
//! 検出されたテーブル領域からセル値を読み取り、整形済みの
//! テーブル構造へ変換するモジュール。整形は次の順で行います:
//! 日付値のテキスト正規化、全空行の除去、全空列の除去、
//! 先頭行の列ラベルへの昇格、列名の正規化と一意化。

use std::collections::HashMap;

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

use crate::api::DateFormat;
use crate::error::SheetScoutError;
use crate::grid::SheetGrid;
use crate::types::{CellValue, TableRegion};

/// 抽出済みテーブル
///
/// 領域ごとに1つ生成され、シリアライズ後は破棄される値オブジェクトです。
/// グリッドへの参照は保持しません。
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExtractedTable {
    /// 正規化済みの列名（一意）
    pub columns: Vec<String>,

    /// データ行（行優先、列ラベル行は含まない）
    pub rows: Vec<Vec<CellValue>>,
}

/// テーブル抽出器
///
/// 領域の読み取りと整形処理のファサードとして機能します。
#[derive(Debug)]
pub(crate) struct TableExtractor<'a> {
    /// 日付の出力形式
    date_format: &'a DateFormat,

    /// 空の列ラベルに与えるプレースホルダー名
    column_placeholder: &'a str,
}

impl<'a> TableExtractor<'a> {
    /// 新しい抽出器を生成
    pub fn new(date_format: &'a DateFormat, column_placeholder: &'a str) -> Self {
        Self {
            date_format,
            column_placeholder,
        }
    }

    /// 領域からテーブルを抽出
    ///
    /// # 引数
    ///
    /// * `grid` - 読み取り元のグリッド
    /// * `region` - 抽出対象の矩形領域
    ///
    /// # 戻り値
    ///
    /// 整形後にデータ行が1行も残らない領域でも、エラーにはせず
    /// 空の行リストを持つテーブルを返します。
    pub fn extract(
        &self,
        grid: &SheetGrid,
        region: &TableRegion,
    ) -> Result<ExtractedTable, SheetScoutError> {
        // 1. 矩形を行優先で読み取り、日付値をテキストへ正規化
        let mut rows: Vec<Vec<CellValue>> = Vec::new();
        for row in region.top_left.row..=region.bottom_right.row {
            let mut row_values = Vec::new();
            for col in region.top_left.col..=region.bottom_right.col {
                let value = &grid.cell(row, col).value;
                row_values.push(self.normalize_value(value, grid.is_1904())?);
            }
            rows.push(row_values);
        }

        // 2. すべてのセルが空の行を除去（列ラベル昇格より前に行う）
        rows.retain(|row| row.iter().any(|v| !v.is_empty()));

        // 3. すべてのセルが空の列を除去
        let col_count = rows.first().map(|r| r.len()).unwrap_or(0);
        let keep: Vec<bool> = (0..col_count)
            .map(|i| rows.iter().any(|r| !r[i].is_empty()))
            .collect();
        for row in &mut rows {
            let mut i = 0;
            row.retain(|_| {
                let kept = keep[i];
                i += 1;
                kept
            });
        }

        // 4. 先頭行を列ラベルへ昇格
        if rows.is_empty() {
            return Ok(ExtractedTable {
                columns: Vec::new(),
                rows: Vec::new(),
            });
        }
        let label_row = rows.remove(0);
        let raw_names: Vec<String> = label_row
            .iter()
            .map(|v| self.clean_column_name(v))
            .collect();
        let columns = make_columns_unique(raw_names);

        Ok(ExtractedTable { columns, rows })
    }

    /// セル値を正規化（日付値をテキストへ変換）
    fn normalize_value(
        &self,
        value: &CellValue,
        is_1904: bool,
    ) -> Result<CellValue, SheetScoutError> {
        match value {
            CellValue::DateTime(serial) => {
                Ok(CellValue::Text(self.format_serial(*serial, is_1904)?))
            }
            CellValue::DateTimeIso(s) => Ok(CellValue::Text(s.clone())),
            other => Ok(other.clone()),
        }
    }

    /// Excelシリアル値を日付文字列へ変換
    fn format_serial(&self, serial: f64, is_1904: bool) -> Result<String, SheetScoutError> {
        let datetime = serial_to_datetime(serial, is_1904).ok_or_else(|| {
            SheetScoutError::Config(format!(
                "Date calculation overflow: serial_value={}, is_1904={}",
                serial, is_1904
            ))
        })?;

        let formatted = match self.date_format {
            DateFormat::Iso8601 => {
                // 時刻成分を持たない値は日付のみ、持つ値はT区切りの完全形式
                if datetime.time().num_seconds_from_midnight() == 0 {
                    datetime.format("%Y-%m-%d").to_string()
                } else {
                    datetime.format("%Y-%m-%dT%H:%M:%S").to_string()
                }
            }
            DateFormat::Custom(format_str) => datetime.format(format_str).to_string(),
        };

        Ok(formatted)
    }

    /// 列ラベルを正規化
    ///
    /// トリム後、空白とスラッシュをアンダースコアへ置換して小文字化します。
    /// 空のラベルにはプレースホルダー名（小文字化しない）を与えます。
    fn clean_column_name(&self, value: &CellValue) -> String {
        let text = match value {
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Error(e) => e.clone(),
            // DateTime系はnormalize_value()で既にTextへ変換済み
            CellValue::DateTime(serial) => serial.to_string(),
            CellValue::DateTimeIso(s) => s.clone(),
            CellValue::Empty => String::new(),
        };

        if text.is_empty() {
            self.column_placeholder.to_string()
        } else {
            text.replace(' ', "_").replace('/', "_").to_lowercase()
        }
    }
}

/// 列名を一意化
///
/// 左から右へ走査し、重複するラベルには出現回数に応じた
/// `_1`, `_2`, ... のサフィックスを付与します。最初の出現は
/// そのままのラベルを保持します。
pub(crate) fn make_columns_unique(columns: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, u32> = HashMap::new();
    let mut result = Vec::with_capacity(columns.len());

    for col in columns {
        match seen.get_mut(&col) {
            Some(count) => {
                *count += 1;
                result.push(format!("{}_{}", col, count));
            }
            None => {
                seen.insert(col.clone(), 0);
                result.push(col);
            }
        }
    }

    result
}

/// Excelシリアル値を日時へ変換
///
/// 1900年システムではエポック1899-12-30にシリアル値の日数を加算します
/// （1900年うるう年バグを吸収する慣用的なマッピング）。1904年システムでは
/// エポック1904-01-01を使用します。小数部は秒数へ丸めます。
fn serial_to_datetime(serial: f64, is_1904: bool) -> Option<NaiveDateTime> {
    let epoch = if is_1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };

    let days = serial.floor();
    let seconds = ((serial - days) * 86_400.0).round() as i64;

    let date = epoch.checked_add_signed(Duration::days(days as i64))?;
    let datetime = date.and_hms_opt(0, 0, 0)? + Duration::seconds(seconds);

    Some(datetime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::test_support::*;
    use crate::grid::SheetGrid;
    use crate::types::{Cell, CellCoord};

    fn extractor(date_format: &DateFormat) -> TableExtractor<'_> {
        TableExtractor::new(date_format, "Column")
    }

    fn extract_rows(cells: Vec<Vec<Cell>>) -> ExtractedTable {
        let rows = cells.len() as u32;
        let cols = cells.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
        let grid = SheetGrid::from_cells(cells);
        let region = TableRegion::new(CellCoord::new(1, 1), CellCoord::new(rows, cols));
        let format = DateFormat::Iso8601;
        extractor(&format).extract(&grid, &region).unwrap()
    }

    #[test]
    fn test_extract_basic_table() {
        let table = extract_rows(vec![
            vec![text_cell("Name"), text_cell("Age")],
            vec![text_cell("Alice"), value_cell(CellValue::Number(30.0))],
            vec![text_cell("Bob"), value_cell(CellValue::Number(25.0))],
        ]);

        assert_eq!(table.columns, vec!["name", "age"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], CellValue::Text("Alice".to_string()));
        assert_eq!(table.rows[1][1], CellValue::Number(25.0));
    }

    #[test]
    fn test_empty_leading_row_dropped_before_promotion() {
        // 先頭の全空行は列ラベル昇格の前に除去される
        let table = extract_rows(vec![
            vec![value_cell(CellValue::Empty), value_cell(CellValue::Empty)],
            vec![text_cell("Name"), text_cell("Age")],
            vec![text_cell("Alice"), value_cell(CellValue::Number(30.0))],
            vec![text_cell("Bob"), value_cell(CellValue::Number(25.0))],
        ]);

        assert_eq!(table.columns, vec!["name", "age"]);
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn test_empty_interior_rows_dropped() {
        let table = extract_rows(vec![
            vec![text_cell("Name")],
            vec![text_cell("Alice")],
            vec![value_cell(CellValue::Empty)],
            vec![text_cell("Bob")],
        ]);

        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn test_empty_columns_dropped() {
        let table = extract_rows(vec![
            vec![
                text_cell("Name"),
                value_cell(CellValue::Empty),
                text_cell("Age"),
            ],
            vec![
                text_cell("Alice"),
                value_cell(CellValue::Empty),
                value_cell(CellValue::Number(30.0)),
            ],
        ]);

        assert_eq!(table.columns, vec!["name", "age"]);
        assert_eq!(table.rows[0].len(), 2);
    }

    #[test]
    fn test_region_with_no_data_rows_is_not_an_error() {
        // ラベル行だけの領域は空の行リストになる
        let table = extract_rows(vec![vec![text_cell("Name"), text_cell("Age")]]);
        assert_eq!(table.columns, vec!["name", "age"]);
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_region_with_all_empty_cells() {
        let table = extract_rows(vec![
            vec![value_cell(CellValue::Empty), value_cell(CellValue::Empty)],
            vec![value_cell(CellValue::Empty), value_cell(CellValue::Empty)],
        ]);
        assert!(table.columns.is_empty());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_column_name_normalization() {
        let table = extract_rows(vec![
            vec![
                text_cell("  First Name "),
                text_cell("Price/Unit"),
                text_cell("TOTAL"),
            ],
            vec![text_cell("a"), text_cell("b"), text_cell("c")],
        ]);

        assert_eq!(table.columns, vec!["first_name", "price_unit", "total"]);
    }

    #[test]
    fn test_duplicate_and_blank_column_names() {
        // ["Name", "Name", ""] -> ["name", "name_1", "Column"]
        let table = extract_rows(vec![
            vec![text_cell("Name"), text_cell("Name"), text_cell("")],
            vec![text_cell("a"), text_cell("b"), text_cell("c")],
        ]);

        assert_eq!(table.columns, vec!["name", "name_1", "Column"]);
    }

    #[test]
    fn test_make_columns_unique_multiple_repeats() {
        let result = make_columns_unique(vec![
            "name".to_string(),
            "name".to_string(),
            "name".to_string(),
            "Column".to_string(),
            "Column".to_string(),
        ]);
        assert_eq!(result, vec!["name", "name_1", "name_2", "Column", "Column_1"]);
    }

    #[test]
    fn test_datetime_normalized_to_iso_date() {
        // シリアル値45306 = 2024-01-15（時刻成分なし）
        let table = extract_rows(vec![
            vec![text_cell("Date")],
            vec![value_cell(CellValue::DateTime(45306.0))],
        ]);

        assert_eq!(table.rows[0][0], CellValue::Text("2024-01-15".to_string()));
    }

    #[test]
    fn test_datetime_with_time_component() {
        // シリアル値45306.5 = 2024-01-15T12:00:00
        let table = extract_rows(vec![
            vec![text_cell("When")],
            vec![value_cell(CellValue::DateTime(45306.5))],
        ]);

        assert_eq!(
            table.rows[0][0],
            CellValue::Text("2024-01-15T12:00:00".to_string())
        );
    }

    #[test]
    fn test_datetime_custom_format() {
        let format = DateFormat::Custom("%Y/%m/%d".to_string());
        let grid = SheetGrid::from_cells(vec![
            vec![text_cell("Date")],
            vec![value_cell(CellValue::DateTime(45306.0))],
        ]);
        let region = TableRegion::new(CellCoord::new(1, 1), CellCoord::new(2, 1));
        let table = extractor(&format).extract(&grid, &region).unwrap();

        assert_eq!(table.rows[0][0], CellValue::Text("2024/01/15".to_string()));
    }

    #[test]
    fn test_serial_to_datetime_1900_epoch() {
        // シリアル値1 = 1899-12-31 は慣用的なマッピングの端点
        let dt = serial_to_datetime(45306.0, false).unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2024-01-15");

        // 2008-01-01 = シリアル値39448
        let dt = serial_to_datetime(39448.0, false).unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2008-01-01");
    }

    #[test]
    fn test_serial_to_datetime_1904_epoch() {
        // 1904年システムではシリアル値0 = 1904-01-01
        let dt = serial_to_datetime(0.0, true).unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "1904-01-01");

        // 同じ日付のシリアル値は1900年システムより1462小さい
        let dt = serial_to_datetime(45306.0 - 1462.0, true).unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2024-01-15");
    }

    // プロパティベーステスト: 列名一意化の検証
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_make_columns_unique_always_unique(
                names in proptest::collection::vec("[a-c]{1,2}", 0..20)
            ) {
                let result = make_columns_unique(names.clone());

                // 1. 要素数が保存されること
                prop_assert_eq!(result.len(), names.len());

                // 2. すべての名前が一意であること
                let unique: std::collections::HashSet<_> = result.iter().collect();
                prop_assert_eq!(unique.len(), result.len());

                // 3. 各名前は元の名前をプレフィックスとして保持すること
                for (original, renamed) in names.iter().zip(result.iter()) {
                    prop_assert!(renamed.starts_with(original.as_str()));
                }
            }
        }
    }
}
