//! 编译产物的本地缓存
//!
//! create 成功后把展示过的规则 JSON 存到文件，evaluate 时读回。
//! 文件不存在即视为「还没创建规则」，这是 evaluate 的前置检查。

use crate::client::ClientError;
use serde_json::Value;
use std::path::Path;

/// 默认的规则缓存文件
pub const DEFAULT_RULE_FILE: &str = ".ruleforge-rule.json";

/// 保存规则展示文本
pub fn save_rule(path: &Path, rule_text: &str) -> std::io::Result<()> {
    std::fs::write(path, rule_text)
}

/// 读取并解析缓存的规则
///
/// 文件缺失映射为 MissingRule；内容解析失败是本地解析错误。
pub fn load_rule(path: &Path) -> Result<Value, ClientError> {
    let text = std::fs::read_to_string(path).map_err(|_| ClientError::MissingRule)?;

    if text.trim().is_empty() {
        return Err(ClientError::MissingRule);
    }

    Ok(serde_json::from_str(&text)?)
}
