//! Parser Module
//!
//! calamineによるセル値の抽出と、XLSX内部XMLからのスタイル情報抽出を
//! 提供するモジュール。

mod styles;
mod workbook;

pub(crate) use styles::XlsxStyleParser;
pub(crate) use workbook::WorkbookParser;
