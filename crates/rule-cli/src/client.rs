//! 规则服务 HTTP 客户端
//!
//! 只对接两个端点：编译与评估。失败响应从响应体的 `detail`
//! 字段提取错误消息，取不到时退回通用提示。

use serde_json::{Value, json};
use thiserror::Error;

/// 客户端错误
#[derive(Debug, Error)]
pub enum ClientError {
    /// 服务端返回的业务错误（来自 detail 字段或通用提示）
    #[error("{0}")]
    Api(String),

    /// 网络层错误
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// 评估前没有可用的编译产物
    #[error("Please create a rule first")]
    MissingRule,

    /// 本地 JSON 解析失败（规则缓存或数据输入）
    #[error("{0}")]
    LocalParse(String),
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::LocalParse(err.to_string())
    }
}

/// 规则服务客户端
pub struct RuleServiceClient {
    base_url: String,
    http: reqwest::Client,
}

impl RuleServiceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// 编译规则文本，返回服务端的编译产物
    pub async fn create_rule(&self, rule_string: &str) -> Result<Value, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/rules/create", self.base_url))
            .json(&json!({ "rule_string": rule_string }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::extract_error(response, "Failed to create rule").await);
        }

        Ok(response.json().await?)
    }

    /// 评估编译产物对数据记录的匹配结果
    pub async fn evaluate(&self, rule: &Value, data: &Value) -> Result<Value, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/rules/evaluate", self.base_url))
            .json(&json!({ "rule": rule, "data": data }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::extract_error(response, "Evaluation failed").await);
        }

        Ok(response.json().await?)
    }

    /// 从失败响应中提取 detail 消息，取不到时使用通用提示
    async fn extract_error(response: reqwest::Response, fallback: &str) -> ClientError {
        let detail = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body.get("detail")?.as_str().map(String::from))
            .unwrap_or_else(|| fallback.to_string());

        ClientError::Api(detail)
    }
}
