//! Workbook Parser Module
//!
//! calamineを使用したExcelファイル解析の基礎実装。
//! 先頭シートのセル値を絶対座標付きで抽出します。

use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets, Xlsx};
use std::io::Cursor;

use crate::error::SheetScoutError;
use crate::types::{CellCoord, CellValue, RawCell};

/// ワークブックパーサー
///
/// calamineのラッパーとして、ワークブックレベルの操作を提供します。
/// 検出対象は先頭シートのみです（複数シートの一括処理は非対応）。
pub(crate) struct WorkbookParser {
    /// calamineのワークブック（XLSX形式のみサポート）
    workbook: Xlsx<Cursor<Vec<u8>>>,
}

impl WorkbookParser {
    /// メモリ上のバイト列からワークブックを開く
    ///
    /// # 引数
    ///
    /// * `buffer` - Excelファイルのバイト列
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookParser)` - ワークブックの読み込みに成功した場合
    /// * `Err(SheetScoutError)` - 読み込みに失敗した場合、またはXLSX形式でない場合
    pub fn open(buffer: Vec<u8>) -> Result<Self, SheetScoutError> {
        let sheets =
            open_workbook_auto_from_rs(Cursor::new(buffer)).map_err(SheetScoutError::Parse)?;
        let workbook = match sheets {
            Sheets::Xlsx(workbook) => workbook,
            _ => {
                return Err(SheetScoutError::Config(
                    "Only XLSX format is supported".to_string(),
                ))
            }
        };

        Ok(WorkbookParser { workbook })
    }

    /// 先頭シートのシート名を取得
    ///
    /// # 戻り値
    ///
    /// * `Ok(String)` - 定義順で先頭のシート名
    /// * `Err(SheetScoutError::Config)` - ワークブックにシートが1枚もない場合
    pub fn first_sheet_name(&self) -> Result<String, SheetScoutError> {
        self.workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| SheetScoutError::Config("Workbook contains no sheets".to_string()))
    }

    /// 指定シートのセル値を抽出
    ///
    /// calamineの読み取り範囲はシート左上の空白領域を省略するため、
    /// 範囲の開始オフセットを加算してシート上の絶対座標（1始まり）に
    /// 変換します。空セルは収集しません。
    ///
    /// # 引数
    ///
    /// * `sheet_name` - 読み取るシート名
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<RawCell>)` - 絶対座標付きのセル値リスト
    /// * `Err(SheetScoutError)` - シートの読み取りに失敗した場合
    pub fn read_cells(&mut self, sheet_name: &str) -> Result<Vec<RawCell>, SheetScoutError> {
        let range = self
            .workbook
            .worksheet_range(sheet_name)
            .map_err(|e| SheetScoutError::Parse(e.into()))?;

        let mut cells = Vec::new();

        let Some((start_row, start_col)) = range.start() else {
            // 空シート
            return Ok(cells);
        };

        for (row_idx, row) in range.rows().enumerate() {
            for (col_idx, data) in row.iter().enumerate() {
                let value = convert_value(data);
                if value.is_empty() {
                    continue;
                }

                // calamineの範囲内オフセット（0始まり）から絶対座標（1始まり）へ
                let coord = CellCoord::new(
                    start_row + row_idx as u32 + 1,
                    start_col + col_idx as u32 + 1,
                );
                cells.push(RawCell { coord, value });
            }
        }

        Ok(cells)
    }
}

/// calamineのセル値をクレート内部の値表現に変換
fn convert_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => {
            if s.is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s.clone())
            }
        }
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::DateTimeIso(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(format!("{}", e)),
    }
}
