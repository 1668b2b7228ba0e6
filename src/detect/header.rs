//! Header Predicate Module
//!
//! セルの書式からテーブルヘッダーを判定する純粋述語を提供するモジュール。
//! 判定ポリシーは差し替え可能で、トレーサー側はポリシーの中身を知りません。

use crate::api::HeaderPolicy;
use crate::types::{Cell, Color};

/// ヘッダー判定述語
///
/// 設定されたヘッダー色とポリシーに基づいて、セルがテーブルヘッダーか
/// どうかを判定します。副作用はありません。
#[derive(Debug, Clone)]
pub(crate) struct HeaderPredicate {
    policy: HeaderPolicy,
    fill: Color,
    font: Color,
}

impl HeaderPredicate {
    /// 新しい述語を生成
    ///
    /// # 引数
    ///
    /// * `policy` - 判定ポリシー（Loose / Strict）
    /// * `fill` - ヘッダーの塗りつぶし色
    /// * `font` - ヘッダーのフォント色（Strictポリシーでのみ参照）
    pub fn new(policy: HeaderPolicy, fill: Color, font: Color) -> Self {
        Self { policy, fill, font }
    }

    /// セルがテーブルヘッダーかどうかを判定
    ///
    /// 塗りつぶし・フォントが未定義のセルは常に`false`を返します
    /// （エラーにはなりません）。
    pub fn is_header(&self, cell: &Cell) -> bool {
        let fill_matches = match &cell.style.fill {
            Some(fill) => !fill.is_theme() && *fill == self.fill,
            None => false,
        };

        match self.policy {
            HeaderPolicy::Loose => fill_matches,
            HeaderPolicy::Strict => {
                // テーマ由来のフォント色はヘッダーとして扱わない
                let font_matches = match &cell.style.font {
                    Some(font) => !font.is_theme() && *font == self.font,
                    None => false,
                };
                fill_matches && font_matches
            }
        }
    }
}
