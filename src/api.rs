//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

/// ヘッダーセルの判定ポリシー
///
/// テーブルの先頭行（ヘッダー行）をセルの書式から判定する方法を指定します。
/// 判定は純粋な述語であり、スタイルのヒューリスティックな分類器として
/// 機能します。スキーマや区切り文字による判定は行いません。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum HeaderPolicy {
    /// 塗りつぶし色のみで判定
    ///
    /// セルの塗りつぶし色が設定されたヘッダー色と一致すれば、
    /// ヘッダーセルとして分類します。フォント色は参照しません。
    ///
    /// 既定のスタイルを多用したシートでは誤検出が増える可能性が
    /// あります。
    Loose,

    /// 塗りつぶし色とフォント色の両方で判定（デフォルト）
    ///
    /// セルの塗りつぶし色とフォント色の両方が設定されたヘッダー色と
    /// 一致し、かつどちらの色もテーマ由来でない場合のみ、ヘッダーセル
    /// として分類します。テーマ由来色のセルは決してヘッダーに
    /// なりません（既定・継承スタイルによる誤検出の抑止）。
    Strict,
}

/// 日付の出力形式
///
/// 抽出時に日付・時刻セルをテキストへ正規化する際の出力形式を指定します。
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DateFormat {
    /// ISO 8601形式（デフォルト）
    ///
    /// 時刻成分を持たない値は `2025-11-20`、持つ値は
    /// `2025-11-20T09:30:00` の形式になります。
    Iso8601,

    /// カスタム形式（chrono互換フォーマット文字列）
    ///
    /// # フォーマット指定子（主要なもの）
    ///
    /// - `%Y`: 4桁の年（例: 2025）
    /// - `%m`: 2桁の月（01-12）
    /// - `%d`: 2桁の日（01-31）
    /// - `%H`: 24時間形式の時（00-23）
    /// - `%M`: 分（00-59）
    /// - `%S`: 秒（00-59）
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use sheetscout::{DetectorBuilder, DateFormat};
    ///
    /// # fn main() -> Result<(), sheetscout::SheetScoutError> {
    /// let detector = DetectorBuilder::new()
    ///     .with_date_format(DateFormat::Custom("%Y年%m月%d日".to_string()))
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    Custom(String),
}
