//! 规则编译器
//!
//! 将规则文本编译为自包含的 CompiledRule 结构，并对节点树做结构校验。
//! 校验同样用于 evaluate 接口收回的 JSON 规则，保证手写规则与编译产物
//! 走同一套约束。

use crate::error::{Result, RuleError};
use crate::models::{CompiledRule, Condition, RuleNode};
use crate::operators::Operator;
use crate::parser;
use serde_json::Value;
use std::collections::HashSet;

/// 规则编译器
pub struct RuleCompiler;

impl RuleCompiler {
    pub fn new() -> Self {
        Self
    }

    /// 从规则文本编译规则
    pub fn compile(&self, source: &str) -> Result<CompiledRule> {
        let root = parser::parse_rule_string(source)?;
        self.validate_node(&root, "root")?;
        Ok(CompiledRule::new(source.trim(), root))
    }

    /// 从 JSON 字符串反序列化并校验规则
    pub fn compile_from_json(&self, json: &str) -> Result<CompiledRule> {
        let rule: CompiledRule = serde_json::from_str(json)?;
        self.validate(&rule)?;
        Ok(rule)
    }

    /// 校验一条完整规则（evaluate 接口收回的规则走这里）
    pub fn validate(&self, rule: &CompiledRule) -> Result<()> {
        if rule.id.is_empty() {
            return Err(RuleError::ParseError("规则 ID 不能为空".to_string()));
        }

        self.validate_node(&rule.root, "root")
    }

    /// 校验规则节点
    fn validate_node(&self, node: &RuleNode, path: &str) -> Result<()> {
        match node {
            RuleNode::Condition(cond) => {
                self.validate_condition(cond, path)?;
            }
            RuleNode::Group(group) => {
                if group.children.is_empty() {
                    return Err(RuleError::ParseError(format!("逻辑组 '{}' 不能为空", path)));
                }

                for (i, child) in group.children.iter().enumerate() {
                    let child_path = format!("{}.children[{}]", path, i);
                    self.validate_node(child, &child_path)?;
                }
            }
        }

        Ok(())
    }

    /// 校验条件
    fn validate_condition(&self, cond: &Condition, path: &str) -> Result<()> {
        if cond.field.is_empty() {
            return Err(RuleError::ParseError(format!(
                "条件 '{}' 的字段不能为空",
                path
            )));
        }

        self.validate_operator_value(cond, path)
    }

    /// 校验操作符和值的兼容性
    fn validate_operator_value(&self, cond: &Condition, path: &str) -> Result<()> {
        match cond.operator {
            Operator::Between => {
                if let Value::Array(arr) = &cond.value {
                    if arr.len() != 2 {
                        return Err(RuleError::ParseError(format!(
                            "条件 '{}' 的 between 操作符需要 [min, max] 数组，当前有 {} 个元素",
                            path,
                            arr.len()
                        )));
                    }
                } else {
                    return Err(RuleError::ParseError(format!(
                        "条件 '{}' 的 between 操作符需要 [min, max] 数组",
                        path
                    )));
                }
            }
            Operator::In => {
                if !cond.value.is_array() {
                    return Err(RuleError::ParseError(format!(
                        "条件 '{}' 的 {} 操作符需要数组值",
                        path, cond.operator
                    )));
                }
            }
            Operator::Regex => {
                if let Some(pattern) = cond.value.as_str() {
                    // 预验证正则表达式，避免评估时才暴露语法错误
                    regex::Regex::new(pattern).map_err(|e| {
                        RuleError::ParseError(format!("条件 '{}' 的正则表达式无效: {}", path, e))
                    })?;
                } else {
                    return Err(RuleError::ParseError(format!(
                        "条件 '{}' 的 regex 操作符需要字符串值",
                        path
                    )));
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// 提取规则中使用的所有字段路径
    pub fn extract_fields(&self, node: &RuleNode) -> HashSet<String> {
        let mut fields = HashSet::new();
        self.collect_fields(node, &mut fields);
        fields
    }

    /// 递归收集字段
    fn collect_fields(&self, node: &RuleNode, fields: &mut HashSet<String>) {
        match node {
            RuleNode::Condition(cond) => {
                fields.insert(cond.field.clone());
            }
            RuleNode::Group(group) => {
                for child in &group.children {
                    self.collect_fields(child, fields);
                }
            }
        }
    }
}

impl Default for RuleCompiler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::LogicalOperator;

    #[test]
    fn test_compile_from_source() {
        let compiler = RuleCompiler::new();
        let rule = compiler
            .compile("age > 30 AND department = 'Sales'")
            .unwrap();

        assert!(!rule.id.is_empty());
        assert_eq!(rule.source, "age > 30 AND department = 'Sales'");
        match &rule.root {
            RuleNode::Group(g) => assert_eq!(g.operator, LogicalOperator::And),
            other => panic!("期望 Group 节点，实际: {:?}", other),
        }
    }

    #[test]
    fn test_compile_extracts_fields() {
        let compiler = RuleCompiler::new();
        let rule = compiler
            .compile("age > 30 AND (department = 'Sales' OR user.is_vip = true)")
            .unwrap();

        let fields = compiler.extract_fields(&rule.root);
        assert_eq!(fields.len(), 3);
        assert!(fields.contains("age"));
        assert!(fields.contains("department"));
        assert!(fields.contains("user.is_vip"));
    }

    #[test]
    fn test_compile_invalid_source() {
        let compiler = RuleCompiler::new();
        assert!(compiler.compile("age > > 30").is_err());
        assert!(compiler.compile("").is_err());
    }

    #[test]
    fn test_compile_from_json() {
        let compiler = RuleCompiler::new();
        let json = r#"
        {
            "id": "rule-001",
            "root": {
                "type": "condition",
                "field": "age",
                "operator": "gt",
                "value": 30
            }
        }
        "#;

        let rule = compiler.compile_from_json(json).unwrap();
        assert_eq!(rule.id, "rule-001");
    }

    #[test]
    fn test_validate_empty_id() {
        let compiler = RuleCompiler::new();
        let json = r#"
        {
            "id": "",
            "root": {
                "type": "condition",
                "field": "a",
                "operator": "eq",
                "value": 1
            }
        }
        "#;

        let result = compiler.compile_from_json(json);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("规则 ID 不能为空"));
    }

    #[test]
    fn test_validate_empty_group() {
        let compiler = RuleCompiler::new();
        let json = r#"
        {
            "id": "rule-001",
            "root": {
                "type": "group",
                "operator": "AND",
                "children": []
            }
        }
        "#;

        let result = compiler.compile_from_json(json);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("不能为空"));
    }

    #[test]
    fn test_validate_between_operator() {
        let compiler = RuleCompiler::new();
        let valid = r#"
        {
            "id": "rule-001",
            "root": {
                "type": "condition",
                "field": "amount",
                "operator": "between",
                "value": [100, 500]
            }
        }
        "#;
        assert!(compiler.compile_from_json(valid).is_ok());

        let invalid = r#"
        {
            "id": "rule-001",
            "root": {
                "type": "condition",
                "field": "amount",
                "operator": "between",
                "value": 100
            }
        }
        "#;
        assert!(compiler.compile_from_json(invalid).is_err());
    }

    #[test]
    fn test_validate_invalid_regex() {
        let compiler = RuleCompiler::new();
        let json = r#"
        {
            "id": "rule-001",
            "root": {
                "type": "condition",
                "field": "email",
                "operator": "regex",
                "value": "[invalid"
            }
        }
        "#;

        let result = compiler.compile_from_json(json);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("正则表达式无效"));
    }

    #[test]
    fn test_validate_in_requires_array() {
        let compiler = RuleCompiler::new();
        let json = r#"
        {
            "id": "rule-001",
            "root": {
                "type": "condition",
                "field": "department",
                "operator": "in",
                "value": "Sales"
            }
        }
        "#;

        assert!(compiler.compile_from_json(json).is_err());
    }
}
