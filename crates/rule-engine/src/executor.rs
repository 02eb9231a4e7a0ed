//! 规则执行器
//!
//! 实现规则的短路求值执行，返回匹配结果与命中的条件列表。

use crate::error::{Result, RuleError};
use crate::evaluator::ConditionEvaluator;
use crate::models::{CompiledRule, Condition, EvaluationContext, EvaluationResult, LogicalGroup, RuleNode};
use crate::operators::LogicalOperator;
use std::time::Instant;

/// 规则执行器
pub struct RuleExecutor;

impl RuleExecutor {
    pub fn new() -> Self {
        Self
    }

    /// 执行规则评估
    pub fn execute(
        &self,
        rule: &CompiledRule,
        context: &EvaluationContext,
    ) -> Result<EvaluationResult> {
        let start = Instant::now();

        let mut result = EvaluationResult::new();
        let matched = self.evaluate_node(&rule.root, context, &mut result, "root")?;

        result.result = matched;
        result.evaluation_time_ms = start.elapsed().as_millis() as i64;

        Ok(result)
    }

    /// 递归评估规则节点
    fn evaluate_node(
        &self,
        node: &RuleNode,
        context: &EvaluationContext,
        result: &mut EvaluationResult,
        path: &str,
    ) -> Result<bool> {
        match node {
            RuleNode::Condition(cond) => self.evaluate_condition(cond, context, result, path),
            RuleNode::Group(group) => self.evaluate_group(group, context, result, path),
        }
    }

    /// 评估条件节点
    ///
    /// 数据记录中不存在被引用的字段是评估错误，不是「不匹配」。
    fn evaluate_condition(
        &self,
        cond: &Condition,
        context: &EvaluationContext,
        result: &mut EvaluationResult,
        path: &str,
    ) -> Result<bool> {
        let field_value = context
            .get_field(&cond.field)
            .ok_or_else(|| RuleError::FieldNotFound(cond.field.clone()))?;

        let matched = ConditionEvaluator::evaluate(field_value, cond.operator, &cond.value)?;

        if matched {
            result.matched_conditions.push(format!(
                "{}.{} {} {}",
                path, cond.field, cond.operator, cond.value
            ));
        }

        Ok(matched)
    }

    /// 评估逻辑组节点（短路求值）
    fn evaluate_group(
        &self,
        group: &LogicalGroup,
        context: &EvaluationContext,
        result: &mut EvaluationResult,
        path: &str,
    ) -> Result<bool> {
        match group.operator {
            LogicalOperator::And => {
                // AND: 所有条件都必须满足，遇到 false 立即返回
                for (i, child) in group.children.iter().enumerate() {
                    let child_path = format!("{}.children[{}]", path, i);
                    if !self.evaluate_node(child, context, result, &child_path)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            LogicalOperator::Or => {
                // OR: 任一条件满足即可，遇到 true 立即返回
                for (i, child) in group.children.iter().enumerate() {
                    let child_path = format!("{}.children[{}]", path, i);
                    if self.evaluate_node(child, context, result, &child_path)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}

impl Default for RuleExecutor {
    fn default() -> Self {
        Self::new()
    }
}
