//! Builder Module
//!
//! Fluent Builder APIを提供し、`Detector`インスタンスを段階的に構築する。

use std::io::{Cursor, Read, Seek};

use chrono::NaiveDate;

use crate::api::{DateFormat, HeaderPolicy};
use crate::detect::{detect_regions, HeaderPredicate};
use crate::error::SheetScoutError;
use crate::extract::TableExtractor;
use crate::grid::SheetGrid;
use crate::parser::{WorkbookParser, XlsxStyleParser};
use crate::security::SecurityConfig;
use crate::serialize::{serialize_table, SerializedTable};
use crate::types::{Color, TableRegion};

/// 検出処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct DetectorConfig {
    /// ヘッダー判定ポリシー
    pub header_policy: HeaderPolicy,

    /// ヘッダーの塗りつぶし色
    pub header_fill: Color,

    /// ヘッダーのフォント色（Strictポリシーでのみ参照）
    pub header_font: Color,

    /// 日付の出力形式
    pub date_format: DateFormat,

    /// 空の列ラベルに与えるプレースホルダー名
    pub column_placeholder: String,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            header_policy: HeaderPolicy::Strict,
            header_fill: Color::Indexed(4),
            header_font: Color::rgb("FFFFFFFF"),
            date_format: DateFormat::Iso8601,
            column_placeholder: "Column".to_string(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// `Detector`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみを
/// オーバーライドできます。
///
/// # デフォルト設定
///
/// - ヘッダーポリシー: Strict（塗りつぶし色＋フォント色）
/// - ヘッダー塗りつぶし色: インデックスパレットのスロット4
/// - ヘッダーフォント色: 白（`FFFFFFFF`）
/// - 日付形式: ISO 8601
/// - 列プレースホルダー名: `Column`
///
/// # 使用例
///
/// ```rust,no_run
/// use sheetscout::{Color, DetectorBuilder, HeaderPolicy};
///
/// # fn main() -> Result<(), sheetscout::SheetScoutError> {
/// let detector = DetectorBuilder::new()
///     .with_header_policy(HeaderPolicy::Loose)
///     .with_header_fill(Color::rgb("FF4472C4"))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DetectorBuilder {
    /// 内部設定（構築中）
    config: DetectorConfig,
}

impl Default for DetectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    pub fn new() -> Self {
        Self {
            config: DetectorConfig::default(),
        }
    }

    /// ヘッダー判定ポリシーを指定する
    ///
    /// # 引数
    ///
    /// * `policy: HeaderPolicy`: 判定ポリシー（Loose / Strict）
    pub fn with_header_policy(mut self, policy: HeaderPolicy) -> Self {
        self.config.header_policy = policy;
        self
    }

    /// ヘッダーの塗りつぶし色を指定する
    ///
    /// # 引数
    ///
    /// * `fill: Color`: 塗りつぶし色（インデックスまたはRGBリテラル）
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use sheetscout::{Color, DetectorBuilder};
    ///
    /// let builder = DetectorBuilder::new()
    ///     .with_header_fill(Color::rgb("FF4472C4"));
    /// ```
    pub fn with_header_fill(mut self, fill: Color) -> Self {
        self.config.header_fill = fill;
        self
    }

    /// ヘッダーのフォント色を指定する
    ///
    /// Strictポリシーでのみ参照されます。
    ///
    /// # 引数
    ///
    /// * `font: Color`: フォント色（インデックスまたはRGBリテラル）
    pub fn with_header_font(mut self, font: Color) -> Self {
        self.config.header_font = font;
        self
    }

    /// 日付の出力形式を指定する
    ///
    /// # 引数
    ///
    /// * `format: DateFormat`: 日付形式
    pub fn with_date_format(mut self, format: DateFormat) -> Self {
        self.config.date_format = format;
        self
    }

    /// 空の列ラベルに与えるプレースホルダー名を指定する
    ///
    /// # 引数
    ///
    /// * `name`: プレースホルダー名（デフォルト: `Column`）
    pub fn with_column_placeholder(mut self, name: impl Into<String>) -> Self {
        self.config.column_placeholder = name.into();
        self
    }

    /// 設定を検証し、`Detector`インスタンスを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Detector)`: 設定が有効な場合
    /// * `Err(SheetScoutError::Config)`: 設定が無効な場合
    ///
    /// # 発生し得るエラー
    ///
    /// * Strictポリシーにテーマ由来のヘッダー色を指定した場合
    ///   （テーマ由来色はヘッダーとして分類されないため、必ず空振りする設定）
    /// * カスタム日付形式が不正な書式文字列の場合
    /// * 列プレースホルダー名が空の場合
    pub fn build(self) -> Result<Detector, SheetScoutError> {
        // 1. ヘッダー色の検証
        if self.config.header_policy == HeaderPolicy::Strict {
            if self.config.header_fill.is_theme() {
                return Err(SheetScoutError::Config(
                    "Strict policy requires a literal header fill color (theme colors are never \
                     classified as headers)"
                        .to_string(),
                ));
            }
            if self.config.header_font.is_theme() {
                return Err(SheetScoutError::Config(
                    "Strict policy requires a literal header font color (theme colors are never \
                     classified as headers)"
                        .to_string(),
                ));
            }
        }

        // 2. カスタム日付形式の検証
        if let DateFormat::Custom(ref format_str) = self.config.date_format {
            // テスト用の日付でフォーマット試行
            let test_date = NaiveDate::from_ymd_opt(2025, 1, 1)
                .ok_or_else(|| SheetScoutError::Config("Failed to create test date".to_string()))?;
            let formatted = test_date.format(format_str).to_string();
            if formatted.is_empty() {
                return Err(SheetScoutError::Config(format!(
                    "Invalid date format string: '{}'",
                    format_str
                )));
            }
        }

        // 3. 列プレースホルダー名の検証
        if self.config.column_placeholder.trim().is_empty() {
            return Err(SheetScoutError::Config(
                "Column placeholder name must not be blank".to_string(),
            ));
        }

        // 4. Detectorインスタンス生成
        Ok(Detector::new(self.config))
    }
}

/// 検出されたテーブル（領域とシリアライズ済みレコードのペア）
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedTable {
    /// グリッド上の矩形領域
    pub region: TableRegion,

    /// シリアライズ済みテーブル
    pub table: SerializedTable,
}

/// テーブル検出処理のファサード
///
/// ワークブックを読み込み、先頭シート上のテーブルをセル書式の
/// ヒューリスティックで検出して、構造化レコードとして返すメイン
/// エントリーポイントです。処理は同期・単一スレッドで、1回の呼び出しが
/// グリッドのスナップショットを専有します。呼び出し間で共有される
/// 可変状態はありません。
///
/// # 使用例
///
/// ```rust,no_run
/// use sheetscout::DetectorBuilder;
/// use std::fs::File;
///
/// # fn main() -> Result<(), sheetscout::SheetScoutError> {
/// let detector = DetectorBuilder::new().build()?;
/// let input = File::open("report.xlsx")?;
/// let tables = detector.detect_tables(input)?;
/// println!("{} tables detected", tables.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Detector {
    /// 検出設定
    config: DetectorConfig,
}

impl Detector {
    pub(crate) fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// ワークブックからテーブルを検出し、領域情報付きで返す
    ///
    /// # 引数
    ///
    /// * `input` - ワークブックを読み込むためのリーダー（Read + Seekトレイトを実装）
    ///
    /// # 戻り値
    ///
    /// 発見順（上から下、左から右）に並んだ検出結果。ヘッダー候補の
    /// 境界が見つからなかった場合、その候補は黙って破棄されるため、
    /// テーブルが1つも見つからないシートでは空のリストを返します
    /// （エラーにはなりません）。
    ///
    /// # 処理フロー
    ///
    /// 1. 入力全体をメモリへ読み込む（サイズ制限を適用）
    /// 2. calamineで先頭シートのセル値を抽出
    /// 3. XLSX内部XMLからスタイル情報を抽出
    /// 4. 稠密グリッドを構築
    /// 5. グリッドを走査して領域を検出
    /// 6. 各領域を抽出・整形し、シリアライズする
    pub fn detect<R: Read + Seek>(
        &self,
        mut input: R,
    ) -> Result<Vec<DetectedTable>, SheetScoutError> {
        // 1. 入力データをメモリに読み込む（値とスタイルで2回解析するため）
        let security_config = SecurityConfig::default();
        let mut buffer = Vec::new();
        let bytes_read = input.read_to_end(&mut buffer)?;

        if bytes_read as u64 > security_config.max_input_file_size {
            return Err(SheetScoutError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                bytes_read, security_config.max_input_file_size
            )));
        }

        // 2. セル値の抽出（先頭シートのみ）
        let mut parser = WorkbookParser::open(buffer.clone())?;
        let sheet_name = parser.first_sheet_name()?;
        let raw_cells = parser.read_cells(&sheet_name)?;

        // 3. スタイル情報の抽出
        let styles = XlsxStyleParser::new(Cursor::new(buffer))?;

        // 4. グリッドの構築
        let grid = SheetGrid::build(raw_cells, &styles);

        // 5. 領域の検出
        let predicate = HeaderPredicate::new(
            self.config.header_policy,
            self.config.header_fill.clone(),
            self.config.header_font.clone(),
        );
        let regions = detect_regions(&grid, &predicate);

        // 6. 抽出とシリアライズ
        let extractor =
            TableExtractor::new(&self.config.date_format, &self.config.column_placeholder);
        let mut tables = Vec::with_capacity(regions.len());
        for region in regions {
            let extracted = extractor.extract(&grid, &region)?;
            tables.push(DetectedTable {
                region,
                table: serialize_table(&extracted),
            });
        }

        Ok(tables)
    }

    /// ワークブックからテーブルを検出し、シリアライズ済みレコードのみを返す
    ///
    /// # 引数
    ///
    /// * `input` - ワークブックを読み込むためのリーダー（Read + Seekトレイトを実装）
    pub fn detect_tables<R: Read + Seek>(
        &self,
        input: R,
    ) -> Result<Vec<SerializedTable>, SheetScoutError> {
        Ok(self
            .detect(input)?
            .into_iter()
            .map(|detected| detected.table)
            .collect())
    }
}
