//! 规则编译与评估 API 处理器

use axum::Json;
use axum::extract::rejection::JsonRejection;
use rule_engine::{CompiledRule, EvaluationContext, EvaluationResult, RuleCompiler, RuleExecutor};
use ruleforge_shared::observability::metrics;
use std::time::Instant;
use tracing::info;
use validator::Validate;

use crate::dto::{CreateRuleRequest, EvaluateRequest};
use crate::error::ApiError;

/// 编译规则
///
/// POST /api/rules/create
///
/// 将规则文本编译为结构化规则并整体返回。响应体就是编译产物本身，
/// 客户端评估时原样传回。
pub async fn create_rule(
    payload: Result<Json<CreateRuleRequest>, JsonRejection>,
) -> Result<Json<CompiledRule>, ApiError> {
    let Json(req) = payload?;
    req.validate()?;

    let start = Instant::now();
    let outcome = RuleCompiler::new().compile(&req.rule_string);
    metrics::record_rule_compilation(outcome.is_ok(), start.elapsed().as_secs_f64());

    let rule = outcome?;

    info!(rule_id = %rule.id, source = %rule.source, "Rule compiled");

    Ok(Json(rule))
}

/// 评估规则
///
/// POST /api/rules/evaluate
///
/// 接收编译产物与数据记录，返回评估结果。规则在执行前重新校验，
/// 手工改坏的规则 JSON 会以 400 + detail 的形式报回。
pub async fn evaluate_rule(
    payload: Result<Json<EvaluateRequest>, JsonRejection>,
) -> Result<Json<EvaluationResult>, ApiError> {
    let Json(req) = payload?;

    let compiler = RuleCompiler::new();
    let rule: CompiledRule = serde_json::from_value(req.rule)
        .map_err(rule_engine::RuleError::from)?;
    compiler.validate(&rule)?;

    if !req.data.is_object() {
        return Err(ApiError::Validation("数据记录必须是 JSON 对象".to_string()));
    }

    let context = EvaluationContext::new(req.data);

    let start = Instant::now();
    let outcome = RuleExecutor::new().execute(&rule, &context);
    metrics::record_rule_evaluation(outcome.is_ok(), start.elapsed().as_secs_f64());

    let result = outcome?;

    info!(
        rule_id = %rule.id,
        result = result.result,
        evaluation_time_ms = result.evaluation_time_ms,
        "Rule evaluated"
    );

    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_rule_returns_compiled_rule() {
        let req = CreateRuleRequest {
            rule_string: "age > 30 AND department = 'Sales'".to_string(),
        };

        let Json(rule) = create_rule(Ok(Json(req))).await.unwrap();

        assert!(!rule.id.is_empty());
        assert_eq!(rule.source, "age > 30 AND department = 'Sales'");
    }

    #[tokio::test]
    async fn test_create_rule_rejects_empty_string() {
        let req = CreateRuleRequest {
            rule_string: String::new(),
        };

        let err = create_rule(Ok(Json(req))).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_rule_rejects_bad_syntax() {
        let req = CreateRuleRequest {
            rule_string: "age > > 30".to_string(),
        };

        let err = create_rule(Ok(Json(req))).await.unwrap_err();
        assert!(matches!(err, ApiError::Engine(_)));
    }

    #[tokio::test]
    async fn test_evaluate_round_trip() {
        // 先编译再评估，模拟客户端完整流程
        let req = CreateRuleRequest {
            rule_string: "age > 30 AND department = 'Sales'".to_string(),
        };
        let Json(rule) = create_rule(Ok(Json(req))).await.unwrap();

        let eval_req = EvaluateRequest {
            rule: serde_json::to_value(&rule).unwrap(),
            data: json!({"age": 35, "department": "Sales"}),
        };

        let Json(result) = evaluate_rule(Ok(Json(eval_req))).await.unwrap();
        assert!(result.result);
    }

    #[tokio::test]
    async fn test_evaluate_false_outcome() {
        let req = CreateRuleRequest {
            rule_string: "age > 30".to_string(),
        };
        let Json(rule) = create_rule(Ok(Json(req))).await.unwrap();

        let eval_req = EvaluateRequest {
            rule: serde_json::to_value(&rule).unwrap(),
            data: json!({"age": 25}),
        };

        let Json(result) = evaluate_rule(Ok(Json(eval_req))).await.unwrap();
        assert!(!result.result);
    }

    #[tokio::test]
    async fn test_evaluate_rejects_malformed_rule() {
        let eval_req = EvaluateRequest {
            rule: json!(42),
            data: json!({"age": 35}),
        };

        let err = evaluate_rule(Ok(Json(eval_req))).await.unwrap_err();
        assert!(matches!(err, ApiError::Engine(_)));
    }

    #[tokio::test]
    async fn test_evaluate_rejects_non_object_data() {
        let req = CreateRuleRequest {
            rule_string: "age > 30".to_string(),
        };
        let Json(rule) = create_rule(Ok(Json(req))).await.unwrap();

        let eval_req = EvaluateRequest {
            rule: serde_json::to_value(&rule).unwrap(),
            data: json!([1, 2, 3]),
        };

        let err = evaluate_rule(Ok(Json(eval_req))).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_evaluate_missing_field_is_engine_error() {
        let req = CreateRuleRequest {
            rule_string: "age > 30".to_string(),
        };
        let Json(rule) = create_rule(Ok(Json(req))).await.unwrap();

        let eval_req = EvaluateRequest {
            rule: serde_json::to_value(&rule).unwrap(),
            data: json!({"department": "Sales"}),
        };

        let err = evaluate_rule(Ok(Json(eval_req))).await.unwrap_err();
        assert!(err.to_string().contains("age"));
    }
}
