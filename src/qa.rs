//! Question Answering Module
//!
//! チャット補完APIを呼び出す質問応答クライアントを提供するモジュール。
//! クライアントは起動時に資格情報を注入して構築するサービスオブジェクトで、
//! グローバル状態は持ちません。モデルの応答テキストは加工せずに返します。

use serde::Deserialize;
use serde_json::json;

use crate::error::SheetScoutError;

/// システムプロンプト
///
/// コンテキストから回答できない質問には "I don't know" と答えるよう
/// モデルを制約します。
const SYSTEM_PROMPT: &str = "Answer the question based on the context below, \
and if the question can't be answered based on the context, say \"I don't know\"\n\n";

/// デフォルトのチャット補完エンドポイント
const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// デフォルトのモデル名
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// チャット補完クライアント
///
/// # 使用例
///
/// ```rust,no_run
/// use sheetscout::ChatClient;
///
/// # fn main() -> Result<(), sheetscout::SheetScoutError> {
/// let api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY not set");
/// let client = ChatClient::new(api_key);
/// let answer = client.ask("What is the total?", r#"{"columns":[],"rows":[]}"#)?;
/// println!("{}", answer);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ChatClient {
    /// HTTPクライアント
    http: reqwest::blocking::Client,

    /// チャット補完エンドポイントのURL
    endpoint: String,

    /// APIキー（Bearerトークンとして送信）
    api_key: String,

    /// 使用するモデル名
    model: String,
}

/// チャット補完APIのレスポンス
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl ChatClient {
    /// 資格情報を注入してクライアントを構築
    ///
    /// # 引数
    ///
    /// * `api_key` - チャット補完APIのAPIキー
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// エンドポイントURLを差し替える（互換API・テスト用）
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// モデル名を差し替える
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// 質問とコンテキストを送信し、モデルの応答テキストを取得
    ///
    /// # 引数
    ///
    /// * `question` - 自由形式の質問文
    /// * `context` - コンテキストとして渡すスナップショットのJSONテキスト
    ///
    /// # 戻り値
    ///
    /// * `Ok(String)` - モデルの応答テキスト（加工なし）
    /// * `Err(SheetScoutError::Upstream)` - リクエスト送信またはレスポンス
    ///   解釈に失敗した場合。リトライは行いません。
    pub fn ask(&self, question: &str, context: &str) -> Result<String, SheetScoutError> {
        let body = build_request_body(&self.model, question, context);

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| SheetScoutError::Upstream(e.to_string()))?
            .error_for_status()
            .map_err(|e| SheetScoutError::Upstream(e.to_string()))?;

        let parsed: ChatCompletionResponse = response
            .json()
            .map_err(|e| SheetScoutError::Upstream(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                SheetScoutError::Upstream("response contained no choices".to_string())
            })
    }
}

/// チャット補完リクエストのボディを構築
fn build_request_body(model: &str, question: &str, context: &str) -> serde_json::Value {
    json!({
        "model": model,
        "messages": [
            {"role": "system", "content": SYSTEM_PROMPT},
            {
                "role": "user",
                "content": format!(
                    "Context: {}\n\n---\n\nQuestion: {}\nAnswer:",
                    context, question
                ),
            },
        ],
        "temperature": 0,
        "top_p": 1,
        "frequency_penalty": 0,
        "presence_penalty": 0,
    })
}
