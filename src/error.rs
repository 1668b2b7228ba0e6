//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// エラーの分類（呼び出し側へのステータス通知用）
///
/// HTTP層などの外部コラボレーターが、エラーを「入力不正」と
/// 「サーバー側の障害」のどちらとして報告すべきかを判定するために使用します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// 呼び出し側の入力に起因するエラー（HTTP 400相当）
    BadRequest,

    /// サーバー側の処理に起因するエラー（HTTP 500相当）
    Server,
}

/// sheetscoutクレート全体で使用するエラー型
///
/// このエラー型は、ワークブックの読み込み、テーブル検出、抽出、
/// スナップショット永続化、質問応答の各処理で発生するすべてのエラーを
/// 統一的に扱うために使用されます。
///
/// # エラーの種類
///
/// - `Io`: I/O操作中に発生したエラー（ファイル読み込み失敗など）
/// - `Parse`: ワークブックの解析中に発生したエラー（calamine由来）
/// - `Config`: 設定の検証に失敗したエラー（無効なヘッダー色指定など）
/// - `UnsupportedFormat`: 入力ファイルの拡張子がスプレッドシートでない
/// - `MissingSnapshot`: アップロード前に質問応答が呼び出された
/// - `Upstream`: チャット補完APIの呼び出しに失敗した
///
/// 境界検出の失敗（右端・下端が見つからないケース）はエラーではなく、
/// 候補ヘッダーを破棄して走査を続行します（トレーサーが`None`を返す）。
///
/// # 使用例
///
/// ```rust,no_run
/// use sheetscout::SheetScoutError;
/// use std::fs::File;
///
/// fn read_workbook(path: &str) -> Result<(), SheetScoutError> {
///     let file = File::open(path)?;  // Ioエラーが自動的に変換される
///     // ... 処理 ...
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum SheetScoutError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ワークブックの解析中に発生したエラー
    ///
    /// calamineクレートがExcelファイルを解析する際に発生したエラーです。
    /// ファイル形式が不正、破損したファイルなどが原因となります。
    #[error("Failed to parse Excel file: {0}")]
    Parse(#[from] calamine::Error),

    /// UTF-8文字列の変換エラー
    ///
    /// XML解析時にUTF-8文字列への変換に失敗した場合に発生します。
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// ZIPアーカイブの解析エラー
    ///
    /// XLSXファイル（ZIPアーカイブ）の解析中に発生したエラーです。
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// 数値の解析エラー
    ///
    /// XML属性の文字列から数値への変換に失敗した場合に発生します。
    #[error("Number parse error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),

    /// JSONの読み書きエラー
    ///
    /// スナップショットのシリアライズ・デシリアライズに失敗した場合に発生します。
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// `DetectorBuilder::build()`時に設定を検証し、無効な設定が検出された
    /// 場合に発生します。例えば、Strictポリシーにテーマ由来色を指定した
    /// 場合や、カスタム日付形式が不正な場合などです。
    #[error("Configuration error: {0}")]
    Config(String),

    /// サポートされていないファイル形式
    ///
    /// アップロードされたファイルの拡張子がスプレッドシート（.xlsx）で
    /// ない場合に、解析を開始する前に発生します。
    #[error("Unsupported file format: '{extension}' (expected .xlsx)")]
    UnsupportedFormat {
        /// 拒否された拡張子（拡張子がない場合はファイル名全体）
        extension: String,
    },

    /// スナップショットが存在しないエラー
    ///
    /// ワークブックのアップロード前に質問応答が呼び出された場合に発生します。
    /// 一般的な失敗とは区別されたユーザー向けエラーです。
    #[error("No snapshot found: upload a workbook before asking questions")]
    MissingSnapshot,

    /// チャット補完APIの呼び出しエラー
    ///
    /// 言語モデルへのリクエスト送信、またはレスポンスの解釈に失敗した
    /// 場合に発生します。下層のメッセージをそのまま保持します（リトライなし）。
    #[error("Chat completion request failed: {0}")]
    Upstream(String),

    /// セキュリティ制限に違反したエラー
    ///
    /// ZIP bomb攻撃、パストラバーサル攻撃、ファイルサイズ制限などの
    /// セキュリティ制限に違反した場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

impl SheetScoutError {
    /// エラーの分類を取得
    ///
    /// # 戻り値
    ///
    /// * `Fault::BadRequest` - 呼び出し側の入力に起因するエラー
    /// * `Fault::Server` - それ以外のすべてのエラー
    pub fn fault(&self) -> Fault {
        match self {
            SheetScoutError::UnsupportedFormat { .. }
            | SheetScoutError::MissingSnapshot
            | SheetScoutError::Config(_) => Fault::BadRequest,
            _ => Fault::Server,
        }
    }
}
