//! Detection Module
//!
//! グリッド全体を走査してテーブル領域を列挙するモジュール。
//! ヘッダー判定（header）と境界探索（tracer）を組み合わせ、
//! 発見順（上から下、左から右）で領域を報告します。

mod header;
mod tracer;

pub(crate) use header::HeaderPredicate;
pub(crate) use tracer::trace_region;

use crate::grid::SheetGrid;
use crate::types::TableRegion;

/// グリッド上のすべてのテーブル領域を検出
///
/// 行を上から下へ、行内を左から右へ走査します。新しい候補は、
/// ヘッダースタイルのセルのうち左隣がヘッダースタイルでないものだけ
/// から始まります（同一ヘッダー走行の内部セルからの再検出を防ぐため）。
///
/// 検出済み領域の内側のセルは候補になりません。これにより入れ子や
/// 重なり合う領域は発生しません。候補の探索に成功した場合、列カーソルは
/// 領域の右端の次へ進みます。失敗した場合は何も報告せず走査を続けます。
///
/// # 引数
///
/// * `grid` - 走査対象のグリッド
/// * `pred` - ヘッダー判定述語
///
/// # 戻り値
///
/// 発見順に並んだテーブル領域のリスト
pub(crate) fn detect_regions(grid: &SheetGrid, pred: &HeaderPredicate) -> Vec<TableRegion> {
    let mut regions: Vec<TableRegion> = Vec::new();

    for row in 1..=grid.max_row() {
        let mut col = 1;
        while col <= grid.max_col() {
            // 検出済み領域の内側はスキップ
            if regions.iter().any(|r| r.contains(row, col)) {
                col += 1;
                continue;
            }

            let starts_run = pred.is_header(grid.cell(row, col))
                && (col == 1 || !pred.is_header(grid.cell(row, col - 1)));

            if starts_run {
                if let Some(region) = trace_region(grid, pred, row, col) {
                    col = region.bottom_right.col + 1;
                    regions.push(region);
                    continue;
                }
            }

            col += 1;
        }
    }

    regions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::HeaderPolicy;
    use crate::grid::test_support::*;
    use crate::types::{Borders, CellCoord, CellValue, Color};

    fn predicate() -> HeaderPredicate {
        HeaderPredicate::new(
            HeaderPolicy::Strict,
            Color::Indexed(4),
            Color::rgb("FFFFFFFF"),
        )
    }

    fn bottom_border() -> Borders {
        Borders {
            bottom: true,
            ..Borders::default()
        }
    }

    fn right_border() -> Borders {
        Borders {
            right: true,
            ..Borders::default()
        }
    }

    fn data_row(values: &[&str], bordered: bool) -> Vec<crate::types::Cell> {
        values
            .iter()
            .map(|v| {
                let borders = if bordered {
                    bottom_border()
                } else {
                    Borders::default()
                };
                bordered_cell(CellValue::Text(v.to_string()), borders)
            })
            .collect()
    }

    #[test]
    fn test_detect_single_table() {
        let grid = SheetGrid::from_cells(vec![
            vec![
                header_cell("A", Borders::default()),
                header_cell("B", right_border()),
            ],
            data_row(&["a1", "b1"], false),
            data_row(&["a2", "b2"], true),
        ]);

        let regions = detect_regions(&grid, &predicate());
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].top_left, CellCoord::new(1, 1));
        assert_eq!(regions[0].bottom_right, CellCoord::new(3, 2));
    }

    #[test]
    fn test_detect_empty_grid() {
        let grid = SheetGrid::from_cells(vec![]);
        assert!(detect_regions(&grid, &predicate()).is_empty());
    }

    #[test]
    fn test_detect_no_headers() {
        let grid = SheetGrid::from_cells(vec![
            data_row(&["a1", "b1"], false),
            data_row(&["a2", "b2"], true),
        ]);
        assert!(detect_regions(&grid, &predicate()).is_empty());
    }

    #[test]
    fn test_interior_header_cells_do_not_restart_detection() {
        // 3列のヘッダー走行から候補は1つだけ生成される
        let grid = SheetGrid::from_cells(vec![
            vec![
                header_cell("A", Borders::default()),
                header_cell("B", Borders::default()),
                header_cell("C", right_border()),
            ],
            data_row(&["a", "b", "c"], true),
        ]);

        let regions = detect_regions(&grid, &predicate());
        assert_eq!(regions.len(), 1);
    }

    #[test]
    fn test_two_tables_stacked_with_borders() {
        let grid = SheetGrid::from_cells(vec![
            vec![header_cell("A", right_border()), header_cell("B", right_border())],
            data_row(&["a1", "b1"], true),
            vec![header_cell("X", right_border()), header_cell("Y", right_border())],
            data_row(&["x1", "y1"], true),
        ]);

        let regions = detect_regions(&grid, &predicate());
        assert_eq!(regions.len(), 2);

        // 発見順: 上のテーブルが先
        assert_eq!(regions[0].top_left, CellCoord::new(1, 1));
        assert_eq!(regions[0].bottom_right, CellCoord::new(2, 2));
        assert_eq!(regions[1].top_left, CellCoord::new(3, 1));
        assert_eq!(regions[1].bottom_right, CellCoord::new(4, 2));
    }

    #[test]
    fn test_two_tables_side_by_side() {
        let grid = SheetGrid::from_cells(vec![
            vec![
                header_cell("A", right_border()),
                crate::types::Cell::EMPTY,
                header_cell("X", right_border()),
            ],
            vec![
                bordered_cell(CellValue::Text("a1".to_string()), bottom_border()),
                crate::types::Cell::EMPTY,
                bordered_cell(CellValue::Text("x1".to_string()), bottom_border()),
            ],
        ]);

        let regions = detect_regions(&grid, &predicate());
        assert_eq!(regions.len(), 2);

        // 発見順: 同一行内では左のテーブルが先
        assert_eq!(regions[0].top_left, CellCoord::new(1, 1));
        assert_eq!(regions[1].top_left, CellCoord::new(1, 3));
    }

    #[test]
    fn test_failed_candidate_does_not_block_later_tables() {
        // 右罫線を持たないヘッダー走行は領域を生まないが、
        // その下の正しいテーブルは検出される
        let grid = SheetGrid::from_cells(vec![
            vec![
                header_cell("Bad", Borders::default()),
                header_cell("Run", Borders::default()),
            ],
            data_row(&["-", "-"], false),
            vec![
                header_cell("Good", Borders::default()),
                header_cell("Run", right_border()),
            ],
            data_row(&["g1", "r1"], true),
        ]);

        let regions = detect_regions(&grid, &predicate());
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].top_left, CellCoord::new(3, 1));
        assert_eq!(regions[0].bottom_right, CellCoord::new(4, 2));
    }

    #[test]
    fn test_consumed_rows_are_not_rescanned() {
        // 検出済み領域の内部にあるヘッダースタイルのセルは
        // 新しい候補にならない
        let grid = SheetGrid::from_cells(vec![
            vec![header_cell("A", right_border()), header_cell("B", right_border())],
            // 領域内部（左端列以外）にヘッダースタイルのセルが紛れていても
            // 新しい候補として扱われない
            vec![
                bordered_cell(CellValue::Text("a1".to_string()), Borders::default()),
                header_cell("stray", right_border()),
            ],
            data_row(&["a2", "b2"], true),
        ]);

        let regions = detect_regions(&grid, &predicate());
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].top_left, CellCoord::new(1, 1));
        assert_eq!(regions[0].bottom_right, CellCoord::new(3, 2));
    }

    #[test]
    fn test_detection_is_deterministic() {
        let build = || {
            SheetGrid::from_cells(vec![
                vec![header_cell("A", right_border()), header_cell("B", right_border())],
                data_row(&["a1", "b1"], true),
            ])
        };

        let first = detect_regions(&build(), &predicate());
        let second = detect_regions(&build(), &predicate());
        assert_eq!(first, second);
    }
}
