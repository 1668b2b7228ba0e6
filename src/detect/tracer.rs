//! Boundary Tracer Module
//!
//! ヘッダーセルからテーブルの右端・下端を罫線の有無で探索するモジュール。
//! 右端はヘッダー走行の連続性と右罫線、下端は両端列の下罫線で決定します。

use crate::detect::header::HeaderPredicate;
use crate::grid::SheetGrid;
use crate::types::{CellCoord, TableRegion};

/// ヘッダー先頭セルからテーブル領域を探索
///
/// # 引数
///
/// * `grid` - 走査対象のグリッド
/// * `pred` - ヘッダー判定述語
/// * `header_row` - ヘッダー行の行番号（1始まり）
/// * `start_col` - ヘッダー走行の先頭列番号（1始まり）
///
/// # 戻り値
///
/// * `Some(TableRegion)` - 右端・下端の両方が見つかった場合
/// * `None` - どちらかの境界が見つからなかった場合（候補は破棄され、
///   呼び出し側は次の候補の走査を続行する）
pub(crate) fn trace_region(
    grid: &SheetGrid,
    pred: &HeaderPredicate,
    header_row: u32,
    start_col: u32,
) -> Option<TableRegion> {
    let right_col = trace_right_edge(grid, pred, header_row, start_col)?;
    let bottom_row = trace_bottom_edge(grid, pred, header_row, start_col, right_col)?;

    Some(TableRegion::new(
        CellCoord::new(header_row, start_col),
        CellCoord::new(bottom_row, right_col),
    ))
}

/// 右端の探索
///
/// `start_col`から右へ、ヘッダースタイルが連続する限り走行を伸ばします。
/// 走行は最初の非ヘッダーセル、またはシート右端で終わります。走行末尾の
/// セルが右罫線を持つ場合のみ、その列を右端として返します。
/// 単一列の走行も許容されます。
fn trace_right_edge(
    grid: &SheetGrid,
    pred: &HeaderPredicate,
    header_row: u32,
    start_col: u32,
) -> Option<u32> {
    if !pred.is_header(grid.cell(header_row, start_col)) {
        return None;
    }

    let mut run_end = start_col;
    while run_end < grid.max_col() && pred.is_header(grid.cell(header_row, run_end + 1)) {
        run_end += 1;
    }

    if grid.cell(header_row, run_end).style.borders.right {
        Some(run_end)
    } else {
        None
    }
}

/// 下端の探索
///
/// `header_row + 1`から下へ走査し、左端列と右端列の両方が下罫線を持つ
/// 行を候補とします。より下の行が再び候補となった場合はそちらが優先され、
/// 次のヘッダーまたはシート末尾の手前で最後に見つかった候補が下端に
/// なります（テーブル内部の罫線行を飛び越えるための挙動）。
///
/// 左端列にヘッダースタイルのセルが現れた時点で走査を打ち切ります。
/// その時点で候補が1つもなければ、現テーブルは末尾罫線を持たないまま
/// 次のテーブルが始まったとみなし、`None`を返します。
fn trace_bottom_edge(
    grid: &SheetGrid,
    pred: &HeaderPredicate,
    header_row: u32,
    left_col: u32,
    right_col: u32,
) -> Option<u32> {
    let mut best: Option<u32> = None;

    for row in (header_row + 1)..=grid.max_row() {
        // 次のテーブルのヘッダーに達したら走査終了
        if pred.is_header(grid.cell(row, left_col)) {
            break;
        }

        if grid.cell(row, left_col).style.borders.bottom
            && grid.cell(row, right_col).style.borders.bottom
        {
            best = Some(row);
        }
    }

    best
}
