//! 结果与错误的展示格式
//!
//! 展示文案是对使用者的稳定契约，测试逐字锁定。

use serde_json::Value;

/// 编译产物的展示文本：原样 pretty-print
pub fn render_rule(rule: &Value) -> String {
    serde_json::to_string_pretty(rule).unwrap_or_else(|_| rule.to_string())
}

/// 评估结果的展示文本
pub fn render_result(matched: bool) -> String {
    format!("Result: {}", if matched { "TRUE" } else { "FALSE" })
}

/// 错误的展示文本
pub fn render_error(message: &str) -> String {
    format!("Error: {}", message)
}
