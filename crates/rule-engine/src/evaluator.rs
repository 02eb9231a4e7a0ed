//! 条件评估器
//!
//! 实现各种操作符的评估逻辑，支持多种数据类型的比较。

use crate::error::{Result, RuleError};
use crate::operators::Operator;
use regex::Regex;
use serde_json::Value;

/// 条件评估器
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// 评估条件
    ///
    /// # Arguments
    /// * `field_value` - 从数据记录中取得的字段值
    /// * `operator` - 操作符
    /// * `expected_value` - 规则中定义的期望值
    pub fn evaluate(field_value: &Value, operator: Operator, expected_value: &Value) -> Result<bool> {
        match operator {
            Operator::Eq => Self::eq(field_value, expected_value),
            Operator::Neq => Self::eq(field_value, expected_value).map(|r| !r),
            Operator::Gt => Self::compare(field_value, expected_value, |a, b| a > b),
            Operator::Gte => Self::compare(field_value, expected_value, |a, b| a >= b),
            Operator::Lt => Self::compare(field_value, expected_value, |a, b| a < b),
            Operator::Lte => Self::compare(field_value, expected_value, |a, b| a <= b),
            Operator::Between => Self::between(field_value, expected_value),
            Operator::In => Self::in_list(field_value, expected_value),
            Operator::Contains => Self::contains(field_value, expected_value),
            Operator::StartsWith => Self::starts_with(field_value, expected_value),
            Operator::EndsWith => Self::ends_with(field_value, expected_value),
            Operator::Regex => Self::regex_match(field_value, expected_value),
        }
    }

    /// 相等比较
    fn eq(field: &Value, expected: &Value) -> Result<bool> {
        // 数值比较统一转为浮点数，避免整数和浮点数比较失败（如 100 == 100.0），
        // 同时兼容文本规则里带引号的数字（如 '30'）
        if let (Some(f1), Some(f2)) = (Self::as_f64(field), Self::as_f64(expected)) {
            return Ok((f1 - f2).abs() < f64::EPSILON);
        }

        Ok(field == expected)
    }

    /// 数值比较
    fn compare<F>(field: &Value, expected: &Value, cmp: F) -> Result<bool>
    where
        F: Fn(f64, f64) -> bool,
    {
        let field_num = Self::as_f64(field).ok_or_else(|| RuleError::TypeMismatch {
            expected: "number".to_string(),
            actual: Self::type_name(field).to_string(),
        })?;

        let expected_num = Self::as_f64(expected).ok_or_else(|| RuleError::TypeMismatch {
            expected: "number".to_string(),
            actual: Self::type_name(expected).to_string(),
        })?;

        Ok(cmp(field_num, expected_num))
    }

    /// 范围比较 (between)
    /// expected 应为 [min, max] 数组
    fn between(field: &Value, expected: &Value) -> Result<bool> {
        let arr = expected.as_array().ok_or_else(|| RuleError::TypeMismatch {
            expected: "array [min, max]".to_string(),
            actual: Self::type_name(expected).to_string(),
        })?;

        if arr.len() != 2 {
            return Err(RuleError::ParseError(
                "between 操作符需要 [min, max] 数组".to_string(),
            ));
        }

        let field_num = Self::as_f64(field).ok_or_else(|| RuleError::TypeMismatch {
            expected: "number".to_string(),
            actual: Self::type_name(field).to_string(),
        })?;

        let min = Self::as_f64(&arr[0]).ok_or_else(|| RuleError::TypeMismatch {
            expected: "number".to_string(),
            actual: Self::type_name(&arr[0]).to_string(),
        })?;

        let max = Self::as_f64(&arr[1]).ok_or_else(|| RuleError::TypeMismatch {
            expected: "number".to_string(),
            actual: Self::type_name(&arr[1]).to_string(),
        })?;

        Ok(field_num >= min && field_num <= max)
    }

    /// 列表包含检查 (in)
    fn in_list(field: &Value, expected: &Value) -> Result<bool> {
        let arr = expected.as_array().ok_or_else(|| RuleError::TypeMismatch {
            expected: "array".to_string(),
            actual: Self::type_name(expected).to_string(),
        })?;

        for item in arr {
            if Self::eq(field, item)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// 字符串/数组包含检查
    fn contains(field: &Value, expected: &Value) -> Result<bool> {
        match field {
            Value::String(s) => {
                let substr = expected.as_str().ok_or_else(|| RuleError::TypeMismatch {
                    expected: "string".to_string(),
                    actual: Self::type_name(expected).to_string(),
                })?;
                Ok(s.contains(substr))
            }
            Value::Array(arr) => {
                for item in arr {
                    if Self::eq(item, expected)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            _ => Err(RuleError::TypeMismatch {
                expected: "string or array".to_string(),
                actual: Self::type_name(field).to_string(),
            }),
        }
    }

    /// 字符串前缀检查
    fn starts_with(field: &Value, expected: &Value) -> Result<bool> {
        let s = field.as_str().ok_or_else(|| RuleError::TypeMismatch {
            expected: "string".to_string(),
            actual: Self::type_name(field).to_string(),
        })?;

        let prefix = expected.as_str().ok_or_else(|| RuleError::TypeMismatch {
            expected: "string".to_string(),
            actual: Self::type_name(expected).to_string(),
        })?;

        Ok(s.starts_with(prefix))
    }

    /// 字符串后缀检查
    fn ends_with(field: &Value, expected: &Value) -> Result<bool> {
        let s = field.as_str().ok_or_else(|| RuleError::TypeMismatch {
            expected: "string".to_string(),
            actual: Self::type_name(field).to_string(),
        })?;

        let suffix = expected.as_str().ok_or_else(|| RuleError::TypeMismatch {
            expected: "string".to_string(),
            actual: Self::type_name(expected).to_string(),
        })?;

        Ok(s.ends_with(suffix))
    }

    /// 正则表达式匹配
    fn regex_match(field: &Value, expected: &Value) -> Result<bool> {
        let s = field.as_str().ok_or_else(|| RuleError::TypeMismatch {
            expected: "string".to_string(),
            actual: Self::type_name(field).to_string(),
        })?;

        let pattern = expected.as_str().ok_or_else(|| RuleError::TypeMismatch {
            expected: "string (regex pattern)".to_string(),
            actual: Self::type_name(expected).to_string(),
        })?;

        let regex = Regex::new(pattern).map_err(|e| {
            RuleError::ParseError(format!("无效的正则表达式 '{}': {}", pattern, e))
        })?;

        Ok(regex.is_match(s))
    }

    /// 尝试将 Value 转换为 f64
    fn as_f64(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// 获取值的类型名称
    pub(crate) fn type_name(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}
