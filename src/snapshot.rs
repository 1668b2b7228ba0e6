//! Snapshot Module
//!
//! 検出結果の永続化を提供するモジュール。直近のアップロードで検出された
//! 全テーブルを、1つのフラットなJSONドキュメントとして保存します。
//! 保存は常に前回のスナップショットを上書きし、履歴は保持しません。

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SheetScoutError;
use crate::serialize::SerializedTable;

/// スナップショットストア
///
/// 1つのJSONファイルへの保存と読み戻しを担当します。
///
/// # 使用例
///
/// ```rust,no_run
/// use sheetscout::SnapshotStore;
///
/// # fn main() -> Result<(), sheetscout::SheetScoutError> {
/// let store = SnapshotStore::new("data.json");
/// let tables = store.load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    /// スナップショットファイルのパス
    path: PathBuf,
}

impl SnapshotStore {
    /// 新しいストアを生成
    ///
    /// # 引数
    ///
    /// * `path` - スナップショットファイルのパス
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// スナップショットファイルのパスを取得
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// スナップショットが存在するかを判定
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// テーブル列をスナップショットとして保存
    ///
    /// 既存のスナップショットは上書きされます。出力は整形済み
    /// （インデント付き）のJSONです。
    ///
    /// # 引数
    ///
    /// * `tables` - 保存するテーブル列（検出順）
    pub fn save(&self, tables: &[SerializedTable]) -> Result<(), SheetScoutError> {
        let json = serde_json::to_string_pretty(tables)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// スナップショットを構造化データとして読み戻す
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<SerializedTable>)` - 読み込みに成功した場合
    /// * `Err(SheetScoutError::MissingSnapshot)` - スナップショットが存在しない場合
    pub fn load(&self) -> Result<Vec<SerializedTable>, SheetScoutError> {
        let text = self.load_raw()?;
        Ok(serde_json::from_str(&text)?)
    }

    /// スナップショットのJSONテキストをそのまま読み戻す
    ///
    /// 質問応答パスは、保存されたドキュメントを加工せずにコンテキスト
    /// として使用するため、このメソッドを使います。
    ///
    /// # 戻り値
    ///
    /// * `Ok(String)` - JSONテキスト
    /// * `Err(SheetScoutError::MissingSnapshot)` - スナップショットが存在しない場合
    pub fn load_raw(&self) -> Result<String, SheetScoutError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SheetScoutError::MissingSnapshot)
            }
            Err(e) => Err(e.into()),
        }
    }
}
