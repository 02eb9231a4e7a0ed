//! 请求体结构定义
//!
//! 字段命名与线上契约保持 snake_case。

use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

/// 编译规则请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRuleRequest {
    #[validate(length(min = 1, message = "规则文本不能为空"))]
    pub rule_string: String,
}

/// 评估规则请求
///
/// `rule` 保持为原始 JSON，由处理器反序列化并校验，
/// 这样格式错误能带着具体原因进入 `detail` 响应。
#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub rule: Value,
    pub data: Value,
}
