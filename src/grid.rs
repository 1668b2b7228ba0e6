//! Grid Module
//!
//! スパースなセル値とスタイル情報から、稠密な2次元セルグリッドへの
//! 変換を提供するモジュール。グリッドは1回の検出呼び出しの間だけ
//! 存在する不変スナップショットで、検出処理から変更されることは
//! ありません。

use crate::parser::XlsxStyleParser;
use crate::types::{Cell, RawCell};

/// グリッド外アクセスで返す共有の空セル
static EMPTY_CELL: Cell = Cell::EMPTY;

/// シートの稠密グリッド
///
/// 行・列とも1始まりでアクセスします。グリッド外の座標に対しては
/// 空セル（値なし・スタイルなし）を返すため、境界チェックなしで
/// 隣接セルを参照できます。
pub(crate) struct SheetGrid {
    /// グリッドデータ（行 × 列、内部は0始まり）
    cells: Vec<Vec<Cell>>,

    /// 最大行番号（1始まり、0なら空グリッド）
    max_row: u32,

    /// 最大列番号（1始まり、0なら空グリッド）
    max_col: u32,

    /// 1904年エポックを使用するかどうか（日付正規化で使用）
    is_1904: bool,
}

impl SheetGrid {
    /// セル値とスタイル情報から稠密グリッドを構築
    ///
    /// グリッドのサイズは、値を持つセルとスタイル参照を持つセルの
    /// 両方を覆う最小の矩形です。罫線だけが引かれた値なしセルも
    /// 境界検出の対象となるため、スタイル側の座標もサイズ決定に
    /// 含めます。
    ///
    /// # 引数
    ///
    /// * `raw_cells` - パーサーから抽出された値付きセル（絶対座標）
    /// * `styles` - スタイルパーサー（セルごとのスタイル解決に使用）
    pub fn build(raw_cells: Vec<RawCell>, styles: &XlsxStyleParser) -> Self {
        // 1. グリッドサイズの決定（値セルとスタイルセルの両方を考慮）
        let mut max_row = 0u32;
        let mut max_col = 0u32;

        for cell in &raw_cells {
            max_row = max_row.max(cell.coord.row);
            max_col = max_col.max(cell.coord.col);
        }
        for (row, col) in styles.styled_coords() {
            max_row = max_row.max(row);
            max_col = max_col.max(col);
        }

        // 2. 空のグリッドを初期化
        let mut cells = vec![vec![Cell::EMPTY; max_col as usize]; max_row as usize];

        // 3. スタイルを配置
        for (row, col) in styles.styled_coords() {
            if row >= 1 && col >= 1 {
                cells[(row - 1) as usize][(col - 1) as usize].style = styles.style_for(row, col);
            }
        }

        // 4. 値を配置
        for raw in raw_cells {
            let (row, col) = (raw.coord.row, raw.coord.col);
            if row >= 1 && row <= max_row && col >= 1 && col <= max_col {
                cells[(row - 1) as usize][(col - 1) as usize].value = raw.value;
            }
        }

        SheetGrid {
            cells,
            max_row,
            max_col,
            is_1904: styles.is_1904(),
        }
    }

    /// 指定座標のセルを取得（1始まり）
    ///
    /// グリッド外の座標では空セルへの参照を返します。
    pub fn cell(&self, row: u32, col: u32) -> &Cell {
        if row == 0 || col == 0 {
            return &EMPTY_CELL;
        }
        self.cells
            .get((row - 1) as usize)
            .and_then(|r| r.get((col - 1) as usize))
            .unwrap_or(&EMPTY_CELL)
    }

    /// 最大行番号を取得（1始まり、空グリッドでは0）
    pub fn max_row(&self) -> u32 {
        self.max_row
    }

    /// 最大列番号を取得（1始まり、空グリッドでは0）
    pub fn max_col(&self) -> u32 {
        self.max_col
    }

    /// 1904年エポックを使用するかどうかを取得
    pub fn is_1904(&self) -> bool {
        self.is_1904
    }

    /// テスト用: セル配列から直接グリッドを構築
    #[cfg(test)]
    pub fn from_cells(cells: Vec<Vec<Cell>>) -> Self {
        let max_row = cells.len() as u32;
        let max_col = cells.iter().map(|r| r.len()).max().unwrap_or(0) as u32;

        // 行の長さを揃える
        let mut cells = cells;
        for row in &mut cells {
            row.resize(max_col as usize, Cell::EMPTY);
        }

        SheetGrid {
            cells,
            max_row,
            max_col,
            is_1904: false,
        }
    }
}

/// テスト用のセル生成ヘルパー
#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::types::{Borders, CellStyle, CellValue, Color};

    /// 値のみのセルを生成
    pub fn value_cell(value: CellValue) -> Cell {
        Cell {
            value,
            style: CellStyle::default(),
        }
    }

    /// テキストセルを生成
    pub fn text_cell(s: &str) -> Cell {
        value_cell(CellValue::Text(s.to_string()))
    }

    /// ヘッダースタイルのセルを生成（インデックス4の塗りつぶし＋白フォント）
    pub fn header_cell(s: &str, borders: Borders) -> Cell {
        Cell {
            value: if s.is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s.to_string())
            },
            style: CellStyle {
                fill: Some(Color::Indexed(4)),
                font: Some(Color::rgb("FFFFFFFF")),
                borders,
            },
        }
    }

    /// 罫線付きセルを生成
    pub fn bordered_cell(value: CellValue, borders: Borders) -> Cell {
        Cell {
            value,
            style: CellStyle {
                fill: None,
                font: None,
                borders,
            },
        }
    }

    /// 全辺罫線
    pub fn all_borders() -> Borders {
        Borders {
            left: true,
            right: true,
            top: true,
            bottom: true,
        }
    }
}
