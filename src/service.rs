//! Service Module
//!
//! アップロードと質問応答の2つの操作を束ねるサービスファサードを提供する
//! モジュール。HTTP層などの外部コラボレーターは、このファサードの
//! 2メソッドをそのままエンドポイントに対応付けることを想定しています。
//! エラーは`SheetScoutError::fault()`でステータス分類できます。

use std::io::{Read, Seek};
use std::path::Path;

use serde::Serialize;

use crate::builder::Detector;
use crate::error::SheetScoutError;
use crate::qa::ChatClient;
use crate::snapshot::SnapshotStore;

/// アップロード処理の結果サマリー
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    /// 処理結果メッセージ
    pub message: String,

    /// 検出されたテーブル数
    pub tables_detected: usize,
}

/// 質問応答の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QaAnswer {
    /// 受け取った質問文
    pub question: String,

    /// モデルの応答テキスト（加工なし）
    pub answer: String,
}

/// ワークブック質問応答サービス
///
/// 検出器・スナップショットストア・チャットクライアントを束ねた
/// サービスオブジェクトです。依存はすべてコンストラクタで注入します。
///
/// # 使用例
///
/// ```rust,no_run
/// use std::fs::File;
/// use sheetscout::{ChatClient, DetectorBuilder, SnapshotStore, WorkbookQaService};
///
/// # fn main() -> Result<(), sheetscout::SheetScoutError> {
/// let api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY not set");
/// let service = WorkbookQaService::new(
///     DetectorBuilder::new().build()?,
///     SnapshotStore::new("data.json"),
///     ChatClient::new(api_key),
/// );
///
/// let summary = service.upload("report.xlsx", File::open("report.xlsx")?)?;
/// println!("{} tables detected", summary.tables_detected);
///
/// let answer = service.ask("What is the total revenue?")?;
/// println!("{}", answer.answer);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct WorkbookQaService {
    /// テーブル検出器
    detector: Detector,

    /// スナップショットストア
    store: SnapshotStore,

    /// チャット補完クライアント
    chat: ChatClient,
}

impl WorkbookQaService {
    /// 依存を注入してサービスを構築
    pub fn new(detector: Detector, store: SnapshotStore, chat: ChatClient) -> Self {
        Self {
            detector,
            store,
            chat,
        }
    }

    /// ワークブックをアップロードし、検出結果をスナップショットへ保存
    ///
    /// ファイル名の拡張子が`.xlsx`でない場合、解析を開始する前に
    /// `UnsupportedFormat`で拒否します。検出に成功すると、全テーブルを
    /// 1つのJSONドキュメントとして保存し（前回の内容は上書き）、
    /// サマリーを返します。
    ///
    /// # 引数
    ///
    /// * `file_name` - アップロードされたファイルの名前（拡張子検証用）
    /// * `input` - ワークブックを読み込むためのリーダー
    pub fn upload<R: Read + Seek>(
        &self,
        file_name: &str,
        input: R,
    ) -> Result<UploadSummary, SheetScoutError> {
        validate_extension(file_name)?;

        let tables = self.detector.detect_tables(input)?;
        self.store.save(&tables)?;

        Ok(UploadSummary {
            message: "File uploaded and processed successfully.".to_string(),
            tables_detected: tables.len(),
        })
    }

    /// スナップショットをコンテキストとして質問に回答
    ///
    /// スナップショットが存在しない場合は`MissingSnapshot`を返します
    /// （アップロード前の質問を一般的な失敗と区別するため）。
    ///
    /// # 引数
    ///
    /// * `question` - 自由形式の質問文
    pub fn ask(&self, question: &str) -> Result<QaAnswer, SheetScoutError> {
        let context = self.store.load_raw()?;
        let answer = self.chat.ask(question, &context)?;

        Ok(QaAnswer {
            question: question.to_string(),
            answer,
        })
    }
}

/// アップロードファイル名の拡張子を検証
///
/// `.xlsx`（大文字小文字は区別しない）以外は`UnsupportedFormat`で
/// 拒否します。
fn validate_extension(file_name: &str) -> Result<(), SheetScoutError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str());

    match extension {
        Some(ext) if ext.eq_ignore_ascii_case("xlsx") => Ok(()),
        Some(ext) => Err(SheetScoutError::UnsupportedFormat {
            extension: ext.to_string(),
        }),
        None => Err(SheetScoutError::UnsupportedFormat {
            extension: file_name.to_string(),
        }),
    }
}
