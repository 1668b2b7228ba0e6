//! Style Metadata Parser Module
//!
//! XLSX内部のXMLファイルから、calamineで取得不可能なスタイル情報を
//! 抽出するモジュール。塗りつぶし色、フォント色、罫線有無、セルごとの
//! スタイル参照、1904年エポック判定を提供します。

use std::collections::HashMap;
use std::io::{Read, Seek};
use zip::ZipArchive;

use crate::error::SheetScoutError;
use crate::security::{validate_archive, validate_zip_path, SecurityConfig};
use crate::types::{Borders, CellStyle, Color};

/// セルスタイル参照（cellXfs要素）
#[derive(Debug, Clone)]
struct CellXf {
    font_id: usize,
    fill_id: usize,
    border_id: usize,
}

/// XLSXスタイルパーサー
///
/// XLSXファイル（ZIPアーカイブ）からXMLを直接解析し、セル単位の
/// スタイル情報（塗りつぶし色・フォント色・罫線有無）を構築します。
/// スタイル情報は先頭シートについてのみ収集します。
#[derive(Debug)]
pub(crate) struct XlsxStyleParser {
    /// styleId -> CellXf のマッピング
    cell_xfs: Vec<CellXf>,
    /// fillId -> 塗りつぶし色（未定義の場合はNone）
    fills: Vec<Option<Color>>,
    /// fontId -> フォント色（未定義の場合はNone）
    fonts: Vec<Option<Color>>,
    /// borderId -> 辺ごとの罫線有無
    borders: Vec<Borders>,
    /// 先頭シートのセル座標（1始まり） -> styleId のマッピング
    cell_style_ids: HashMap<(u32, u32), u32>,
    /// 1904年エポックを使用するかどうか
    is_1904: bool,
}

impl XlsxStyleParser {
    /// XLSXファイル（ZIPアーカイブ）からスタイル情報を解析
    ///
    /// # 引数
    ///
    /// * `reader` - XLSXファイルを読み込むためのリーダー（Read + Seekトレイトを実装）
    ///
    /// # 戻り値
    ///
    /// * `Ok(XlsxStyleParser)` - スタイル情報の解析に成功した場合
    /// * `Err(SheetScoutError)` - 解析エラーが発生した場合
    pub fn new<R: Read + Seek>(reader: R) -> Result<Self, SheetScoutError> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| SheetScoutError::Zip(format!("{}", e)))?;

        validate_archive(&mut archive, &SecurityConfig::default())?;

        // 1. xl/styles.xml を解析
        let (fills, fonts, borders, cell_xfs) = Self::parse_styles(&mut archive)?;

        // 2. xl/workbook.xml を解析（先頭シートのリレーションIDと1904年フラグ）
        let (is_1904, first_sheet_rid) = Self::parse_workbook(&mut archive)?;

        // 3. 先頭シートのワークシートXMLパスを解決
        let sheet_path = Self::resolve_first_sheet_path(&mut archive, first_sheet_rid.as_deref())?;

        // 4. ワークシートXMLからセルごとのスタイル参照を解析
        let cell_style_ids = match sheet_path {
            Some(path) => Self::parse_worksheet_styles(&mut archive, &path)?,
            None => HashMap::new(),
        };

        Ok(Self {
            cell_xfs,
            fills,
            fonts,
            borders,
            cell_style_ids,
            is_1904,
        })
    }

    /// 指定座標のセルスタイルを解決
    ///
    /// # 引数
    ///
    /// * `row` - 行番号（1始まり）
    /// * `col` - 列番号（1始まり）
    ///
    /// # 戻り値
    ///
    /// スタイル参照を持たないセル、または参照が範囲外のセルでは
    /// デフォルトスタイル（塗りつぶしなし・フォント色なし・罫線なし）を
    /// 返します。
    pub fn style_for(&self, row: u32, col: u32) -> CellStyle {
        let Some(style_id) = self.cell_style_ids.get(&(row, col)) else {
            return CellStyle::default();
        };

        let Some(xf) = self.cell_xfs.get(*style_id as usize) else {
            return CellStyle::default();
        };

        CellStyle {
            fill: self.fills.get(xf.fill_id).cloned().flatten(),
            font: self.fonts.get(xf.font_id).cloned().flatten(),
            borders: self.borders.get(xf.border_id).copied().unwrap_or_default(),
        }
    }

    /// スタイル参照を持つセル座標を列挙（グリッドサイズ決定用）
    ///
    /// 値を持たず罫線だけが引かれたセルもグリッドに含めるために使用します。
    pub fn styled_coords(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.cell_style_ids.keys().copied()
    }

    /// 1904年エポックを使用するかどうかを取得
    ///
    /// # 戻り値
    ///
    /// * `true` - 1904年エポックを使用する場合（Mac版Excel）
    /// * `false` - 1900年エポックを使用する場合（デフォルト）
    pub fn is_1904(&self) -> bool {
        self.is_1904
    }

    /// xl/styles.xml の解析（プライベート）
    ///
    /// `<fills>`、`<fonts>`、`<borders>`、`<cellXfs>` を解析し、
    /// スタイルテーブルを構築します。
    #[allow(clippy::type_complexity)]
    fn parse_styles<R: Read + Seek>(
        archive: &mut ZipArchive<R>,
    ) -> Result<(Vec<Option<Color>>, Vec<Option<Color>>, Vec<Borders>, Vec<CellXf>), SheetScoutError>
    {
        let mut fills: Vec<Option<Color>> = Vec::new();
        let mut fonts: Vec<Option<Color>> = Vec::new();
        let mut borders: Vec<Borders> = Vec::new();
        let mut cell_xfs: Vec<CellXf> = Vec::new();

        // xl/styles.xml を開く
        let mut styles_file = match archive.by_name("xl/styles.xml") {
            Ok(file) => file,
            Err(_) => {
                // styles.xmlが存在しない場合は空の結果を返す
                return Ok((fills, fonts, borders, cell_xfs));
            }
        };

        // ZIPファイルの内容を一度メモリに読み込む
        let mut xml_content = Vec::new();
        styles_file.read_to_end(&mut xml_content)?;

        use quick_xml::events::Event;
        use quick_xml::Reader;

        let mut reader = Reader::from_reader(xml_content.as_slice());
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut in_fills = false;
        let mut in_fill = false;
        let mut in_fonts = false;
        let mut in_font = false;
        let mut in_borders = false;
        let mut in_border = false;
        let mut in_cell_xfs = false;

        let mut current_fill_color: Option<Color> = None;
        let mut current_pattern_none = false;
        let mut current_font_color: Option<Color> = None;
        let mut current_border = Borders::default();

        loop {
            let event = reader.read_event_into(&mut buf);
            // <fill/>のような自己終了タグにはEndイベントが来ないため、
            // このイテレーション内で閉じる必要がある
            let self_closing = matches!(event, Ok(Event::Empty(_)));
            match event {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    match e.name().as_ref() {
                        b"fills" => {
                            in_fills = true;
                        }
                        b"fill" if in_fills => {
                            in_fill = true;
                            current_fill_color = None;
                            current_pattern_none = false;
                        }
                        b"patternFill" if in_fill => {
                            // <patternFill patternType="solid">
                            for attr in e.attributes() {
                                let attr = attr.map_err(|e| {
                                    SheetScoutError::Config(format!("XML attribute error: {}", e))
                                })?;
                                if attr.key.as_ref() == b"patternType" {
                                    let pattern = std::str::from_utf8(&attr.value)?;
                                    current_pattern_none = pattern == "none";
                                }
                            }
                        }
                        b"fgColor" if in_fill => {
                            // <fgColor rgb="FF4472C4"/> / <fgColor indexed="4"/> / <fgColor theme="4"/>
                            current_fill_color = Self::parse_color_attrs(e)?;
                        }
                        b"fonts" => {
                            in_fonts = true;
                        }
                        b"font" if in_fonts => {
                            in_font = true;
                            current_font_color = None;
                        }
                        b"color" if in_font => {
                            // <color rgb="FFFFFFFF"/> / <color theme="1"/>
                            current_font_color = Self::parse_color_attrs(e)?;
                        }
                        b"borders" => {
                            in_borders = true;
                        }
                        b"border" if in_borders => {
                            in_border = true;
                            current_border = Borders::default();
                        }
                        b"left" | b"right" | b"top" | b"bottom" if in_border => {
                            // 辺要素がstyle属性を持つ場合のみ罫線ありとみなす
                            // （<left/>のような空要素は罫線なし）
                            let mut has_style = false;
                            for attr in e.attributes() {
                                let attr = attr.map_err(|e| {
                                    SheetScoutError::Config(format!("XML attribute error: {}", e))
                                })?;
                                if attr.key.as_ref() == b"style" {
                                    has_style = true;
                                }
                            }
                            if has_style {
                                match e.name().as_ref() {
                                    b"left" => current_border.left = true,
                                    b"right" => current_border.right = true,
                                    b"top" => current_border.top = true,
                                    b"bottom" => current_border.bottom = true,
                                    _ => {}
                                }
                            }
                        }
                        b"cellXfs" => {
                            in_cell_xfs = true;
                        }
                        b"xf" if in_cell_xfs => {
                            // <xf numFmtId="0" fontId="1" fillId="2" borderId="1"/>
                            let mut font_id = 0usize;
                            let mut fill_id = 0usize;
                            let mut border_id = 0usize;

                            for attr in e.attributes() {
                                let attr = attr.map_err(|e| {
                                    SheetScoutError::Config(format!("XML attribute error: {}", e))
                                })?;
                                match attr.key.as_ref() {
                                    b"fontId" => {
                                        let id_str = std::str::from_utf8(&attr.value)?;
                                        font_id = id_str.parse()?;
                                    }
                                    b"fillId" => {
                                        let id_str = std::str::from_utf8(&attr.value)?;
                                        fill_id = id_str.parse()?;
                                    }
                                    b"borderId" => {
                                        let id_str = std::str::from_utf8(&attr.value)?;
                                        border_id = id_str.parse()?;
                                    }
                                    _ => {}
                                }
                            }

                            cell_xfs.push(CellXf {
                                font_id,
                                fill_id,
                                border_id,
                            });
                        }
                        _ => {}
                    }

                    if self_closing {
                        match e.name().as_ref() {
                            b"fill" if in_fill => {
                                fills.push(None);
                                in_fill = false;
                            }
                            b"font" if in_font => {
                                fonts.push(None);
                                in_font = false;
                            }
                            b"border" if in_border => {
                                borders.push(current_border);
                                in_border = false;
                            }
                            _ => {}
                        }
                    }
                }
                Ok(Event::End(ref e)) => match e.name().as_ref() {
                    b"fills" => {
                        in_fills = false;
                    }
                    b"fill" if in_fill => {
                        let color = if current_pattern_none {
                            None
                        } else {
                            current_fill_color.take()
                        };
                        fills.push(color);
                        in_fill = false;
                    }
                    b"fonts" => {
                        in_fonts = false;
                    }
                    b"font" if in_font => {
                        fonts.push(current_font_color.take());
                        in_font = false;
                    }
                    b"borders" => {
                        in_borders = false;
                    }
                    b"border" if in_border => {
                        borders.push(current_border);
                        in_border = false;
                    }
                    b"cellXfs" => {
                        in_cell_xfs = false;
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(SheetScoutError::Config(format!("XML parse error: {}", e)))
                }
                _ => {}
            }
        }

        Ok((fills, fonts, borders, cell_xfs))
    }

    /// 色属性を解析（プライベートヘルパー）
    ///
    /// `rgb` / `indexed` / `theme` 属性を優先順にチェックし、
    /// 対応する`Color`を返します。どの属性もない場合（`auto`のみなど）は
    /// `None`を返します。
    fn parse_color_attrs(
        e: &quick_xml::events::BytesStart<'_>,
    ) -> Result<Option<Color>, SheetScoutError> {
        let mut color = None;

        for attr in e.attributes() {
            let attr = attr
                .map_err(|e| SheetScoutError::Config(format!("XML attribute error: {}", e)))?;
            match attr.key.as_ref() {
                b"rgb" => {
                    let rgb_str = std::str::from_utf8(&attr.value)?;
                    color = Some(Color::rgb(rgb_str));
                }
                b"indexed" => {
                    let id_str = std::str::from_utf8(&attr.value)?;
                    color = Some(Color::Indexed(id_str.parse()?));
                }
                b"theme" => {
                    let id_str = std::str::from_utf8(&attr.value)?;
                    color = Some(Color::Theme(id_str.parse()?));
                }
                _ => {}
            }
        }

        Ok(color)
    }

    /// xl/workbook.xml の解析（プライベート）
    ///
    /// `<workbookPr date1904="true"/>` と、シート定義リストの先頭エントリの
    /// リレーションID（`r:id`属性）を取得します。
    fn parse_workbook<R: Read + Seek>(
        archive: &mut ZipArchive<R>,
    ) -> Result<(bool, Option<String>), SheetScoutError> {
        let mut workbook_file = match archive.by_name("xl/workbook.xml") {
            Ok(file) => file,
            Err(_) => {
                // workbook.xmlが存在しない場合はデフォルトを返す
                return Ok((false, None));
            }
        };

        let mut xml_content = Vec::new();
        workbook_file.read_to_end(&mut xml_content)?;

        use quick_xml::events::Event;
        use quick_xml::Reader;

        let mut reader = Reader::from_reader(xml_content.as_slice());
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut is_1904 = false;
        let mut first_sheet_rid: Option<String> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"workbookPr" => {
                        // <workbookPr date1904="true"/>
                        for attr in e.attributes() {
                            let attr = attr.map_err(|e| {
                                SheetScoutError::Config(format!("XML attribute error: {}", e))
                            })?;
                            if attr.key.as_ref() == b"date1904" {
                                let value_str = std::str::from_utf8(&attr.value)?;
                                is_1904 = value_str == "1" || value_str == "true";
                            }
                        }
                    }
                    b"sheet" if first_sheet_rid.is_none() => {
                        // <sheet name="Sheet1" sheetId="1" r:id="rId1"/>
                        // 定義順の先頭シートのみを対象とする
                        for attr in e.attributes() {
                            let attr = attr.map_err(|e| {
                                SheetScoutError::Config(format!("XML attribute error: {}", e))
                            })?;
                            if attr.key.as_ref() == b"r:id" {
                                first_sheet_rid =
                                    Some(std::str::from_utf8(&attr.value)?.to_string());
                            }
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(SheetScoutError::Config(format!("XML parse error: {}", e)))
                }
                _ => {}
            }
        }

        Ok((is_1904, first_sheet_rid))
    }

    /// 先頭シートのワークシートXMLパスを解決（プライベート）
    ///
    /// xl/_rels/workbook.xml.rels のリレーションシップから、先頭シートの
    /// リレーションIDに対応するパスを取得します。解決できない場合は
    /// `xl/worksheets/sheet1.xml` へのフォールバックを試みます。
    fn resolve_first_sheet_path<R: Read + Seek>(
        archive: &mut ZipArchive<R>,
        first_sheet_rid: Option<&str>,
    ) -> Result<Option<String>, SheetScoutError> {
        if let Some(rid) = first_sheet_rid {
            if let Ok(mut rels_file) = archive.by_name("xl/_rels/workbook.xml.rels") {
                let relationships = Self::parse_relationships(&mut rels_file)?;
                if let Some(target) = relationships.get(rid) {
                    // ターゲットは "worksheets/sheet1.xml" または "/xl/..." 形式
                    let path = if let Some(absolute) = target.strip_prefix('/') {
                        absolute.to_string()
                    } else {
                        format!("xl/{}", target)
                    };
                    validate_zip_path(&path).map_err(|e| {
                        SheetScoutError::SecurityViolation(format!("Invalid ZIP path: {}", e))
                    })?;
                    return Ok(Some(path));
                }
            }
        }

        // フォールバック: 規約上のパスを直接試す
        if archive.by_name("xl/worksheets/sheet1.xml").is_ok() {
            return Ok(Some("xl/worksheets/sheet1.xml".to_string()));
        }

        Ok(None)
    }

    /// リレーションシップファイルを解析（プライベート）
    fn parse_relationships(
        reader: &mut zip::read::ZipFile<'_>,
    ) -> Result<HashMap<String, String>, SheetScoutError> {
        use quick_xml::events::Event;
        use quick_xml::Reader;

        let mut xml_content = Vec::new();
        reader.read_to_end(&mut xml_content)?;

        let mut xml_reader = Reader::from_reader(xml_content.as_slice());
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut relationships = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                    // Event::Emptyは自己終了タグの場合に発生
                    if e.name().as_ref() == b"Relationship" {
                        let mut id = None;
                        let mut target = None;

                        for attr in e.attributes() {
                            let attr = attr.map_err(|e| {
                                SheetScoutError::Config(format!("XML attribute error: {}", e))
                            })?;
                            match attr.key.as_ref() {
                                b"Id" => {
                                    id = Some(std::str::from_utf8(&attr.value)?.to_string());
                                }
                                b"Target" => {
                                    target = Some(std::str::from_utf8(&attr.value)?.to_string());
                                }
                                _ => {}
                            }
                        }

                        if let (Some(id_val), Some(target_val)) = (id, target) {
                            relationships.insert(id_val, target_val);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(SheetScoutError::Config(format!("XML parse error: {}", e)))
                }
                _ => {}
            }
        }

        Ok(relationships)
    }

    /// ワークシートXMLからセルごとのスタイル参照を解析（プライベート）
    ///
    /// `<c r="B2" s="3"/>` のセル要素から、座標とstyleIdのマッピングを
    /// 構築します。`s`属性を持たないセルはデフォルトスタイルのため
    /// 収集しません。
    fn parse_worksheet_styles<R: Read + Seek>(
        archive: &mut ZipArchive<R>,
        sheet_path: &str,
    ) -> Result<HashMap<(u32, u32), u32>, SheetScoutError> {
        use quick_xml::events::Event;
        use quick_xml::Reader;

        let mut sheet_file = archive
            .by_name(sheet_path)
            .map_err(|e| SheetScoutError::Zip(format!("{}", e)))?;

        let mut xml_content = Vec::new();
        sheet_file.read_to_end(&mut xml_content)?;

        let mut xml_reader = Reader::from_reader(xml_content.as_slice());
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut cell_style_ids = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                    // 値を持たない書式のみのセルはEvent::Emptyで現れる
                    if e.name().as_ref() == b"c" {
                        // <c r="B2" s="3" t="s">
                        let mut coord: Option<(u32, u32)> = None;
                        let mut style_id: Option<u32> = None;

                        for attr in e.attributes() {
                            let attr = attr.map_err(|e| {
                                SheetScoutError::Config(format!("XML attribute error: {}", e))
                            })?;
                            match attr.key.as_ref() {
                                b"r" => {
                                    let ref_str = std::str::from_utf8(&attr.value)?;
                                    coord = Self::parse_cell_ref(ref_str);
                                }
                                b"s" => {
                                    let id_str = std::str::from_utf8(&attr.value)?;
                                    style_id = Some(id_str.parse()?);
                                }
                                _ => {}
                            }
                        }

                        if let (Some(coord), Some(style_id)) = (coord, style_id) {
                            cell_style_ids.insert(coord, style_id);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(SheetScoutError::Config(format!("XML parse error: {}", e)))
                }
                _ => {}
            }
        }

        Ok(cell_style_ids)
    }

    /// セル参照文字列を座標に変換（例: "A1" -> (1, 1)）
    fn parse_cell_ref(ref_str: &str) -> Option<(u32, u32)> {
        let mut col_str = String::new();
        let mut row_str = String::new();

        for ch in ref_str.chars() {
            if ch.is_ascii_alphabetic() {
                col_str.push(ch);
            } else if ch.is_ascii_digit() {
                row_str.push(ch);
            }
        }

        if col_str.is_empty() || row_str.is_empty() {
            return None;
        }

        // 列を数値に変換（A=1, B=2, ..., Z=26, AA=27, ...）
        let col = col_str
            .chars()
            .rev()
            .enumerate()
            .map(|(i, ch)| {
                let val = (ch.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
                val * 26_u32.pow(i as u32)
            })
            .sum::<u32>();

        // 行は1始まりのまま使用する
        let row = row_str.parse::<u32>().ok()?;

        Some((row, col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(XlsxStyleParser::parse_cell_ref("A1"), Some((1, 1)));
        assert_eq!(XlsxStyleParser::parse_cell_ref("B2"), Some((2, 2)));
        assert_eq!(XlsxStyleParser::parse_cell_ref("Z10"), Some((10, 26)));
        assert_eq!(XlsxStyleParser::parse_cell_ref("AA1"), Some((1, 27)));
        assert_eq!(XlsxStyleParser::parse_cell_ref("ZZ100"), Some((100, 702)));
    }

    #[test]
    fn test_parse_cell_ref_invalid() {
        assert_eq!(XlsxStyleParser::parse_cell_ref(""), None);
        assert_eq!(XlsxStyleParser::parse_cell_ref("A"), None);
        assert_eq!(XlsxStyleParser::parse_cell_ref("1"), None);
    }
}
