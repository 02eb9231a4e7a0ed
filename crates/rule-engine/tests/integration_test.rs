//! 规则引擎集成测试
//!
//! 测试完整的规则编译、序列化往返、执行工作流。
//! 序列化往返模拟客户端把 create 响应原样传回 evaluate 的过程。

use rule_engine::{
    CompiledRule, EvaluationContext, LogicalOperator, RuleCompiler, RuleExecutor, RuleNode,
};
use serde_json::json;

/// 创建测试数据：一个销售部员工的记录
fn create_employee_context() -> EvaluationContext {
    EvaluationContext::new(json!({
        "age": 35,
        "department": "Sales",
        "salary": 60000,
        "experience": 7,
        "status": "active",
        "profile": {
            "city": "Shanghai",
            "email": "zhang.wei@example.com"
        }
    }))
}

/// 完整工作流：文本 -> 编译 -> JSON 往返 -> 校验 -> 执行
#[test]
fn test_full_workflow_with_json_round_trip() {
    let compiler = RuleCompiler::new();

    // 1. 编译规则文本
    let compiled = compiler
        .compile("age > 30 AND department = 'Sales'")
        .unwrap();

    // 2. 序列化为 JSON（create 接口的响应体）
    let wire = serde_json::to_string_pretty(&compiled).unwrap();

    // 3. 客户端原样传回，evaluate 端重新反序列化并校验
    let echoed = compiler.compile_from_json(&wire).unwrap();
    assert_eq!(echoed.id, compiled.id);

    // 4. 执行评估
    let executor = RuleExecutor::new();
    let result = executor
        .execute(&echoed, &create_employee_context())
        .unwrap();

    assert!(result.result);
    assert_eq!(result.matched_conditions.len(), 2);
}

#[test]
fn test_rule_not_matching() {
    let compiler = RuleCompiler::new();
    let rule = compiler.compile("age > 30").unwrap();

    let context = EvaluationContext::new(json!({"age": 25}));
    let result = RuleExecutor::new().execute(&rule, &context).unwrap();

    assert!(!result.result);
}

#[test]
fn test_parenthesized_grouping() {
    let compiler = RuleCompiler::new();
    let rule = compiler
        .compile("(age > 60 OR age < 18) AND status = 'active'")
        .unwrap();

    let executor = RuleExecutor::new();

    let minor = EvaluationContext::new(json!({"age": 16, "status": "active"}));
    assert!(executor.execute(&rule, &minor).unwrap().result);

    let adult = EvaluationContext::new(json!({"age": 35, "status": "active"}));
    assert!(!executor.execute(&rule, &adult).unwrap().result);
}

#[test]
fn test_and_over_or_precedence_in_evaluation() {
    let compiler = RuleCompiler::new();
    // 解析为 OR(dept='HR', AND(age>30, dept='Sales'))
    let rule = compiler
        .compile("department = 'HR' OR age > 30 AND department = 'Sales'")
        .unwrap();

    let result = RuleExecutor::new()
        .execute(&rule, &create_employee_context())
        .unwrap();

    assert!(result.result);
}

#[test]
fn test_missing_field_error_names_field() {
    let compiler = RuleCompiler::new();
    let rule = compiler.compile("head_count > 10").unwrap();

    let err = RuleExecutor::new()
        .execute(&rule, &create_employee_context())
        .unwrap_err();

    assert!(err.to_string().contains("head_count"));
}

#[test]
fn test_hand_authored_json_rule_with_extended_operators() {
    // 直接以 JSON 编写的规则可以使用文本语法没有的操作符
    let json_rule = r#"
    {
        "id": "email-domain-rule",
        "root": {
            "type": "group",
            "operator": "AND",
            "children": [
                {
                    "type": "condition",
                    "field": "profile.email",
                    "operator": "ends_with",
                    "value": "@example.com"
                },
                {
                    "type": "condition",
                    "field": "department",
                    "operator": "in",
                    "value": ["Sales", "Marketing"]
                },
                {
                    "type": "condition",
                    "field": "salary",
                    "operator": "between",
                    "value": [50000, 100000]
                }
            ]
        }
    }
    "#;

    let compiler = RuleCompiler::new();
    let rule = compiler.compile_from_json(json_rule).unwrap();

    let result = RuleExecutor::new()
        .execute(&rule, &create_employee_context())
        .unwrap();

    assert!(result.result);
    assert_eq!(result.matched_conditions.len(), 3);
}

#[test]
fn test_large_and_chain_compiles_and_evaluates() {
    let source = vec!["age > 30"; 100].join(" AND ");

    let compiler = RuleCompiler::new();
    let rule = compiler.compile(&source).unwrap();

    match &rule.root {
        RuleNode::Group(group) => {
            assert_eq!(group.operator, LogicalOperator::And);
            assert_eq!(group.children.len(), 100);
        }
        other => panic!("期望 Group 节点，实际: {:?}", other),
    }

    let result = RuleExecutor::new()
        .execute(&rule, &create_employee_context())
        .unwrap();
    assert!(result.result);
    assert_eq!(result.matched_conditions.len(), 100);
}

#[test]
fn test_compiled_rule_is_self_contained() {
    // 编译产物不引用任何服务端状态，两次编译互不影响
    let compiler = RuleCompiler::new();
    let first = compiler.compile("age > 30").unwrap();
    let second = compiler.compile("age > 30").unwrap();

    assert_ne!(first.id, second.id);

    let wire: CompiledRule =
        serde_json::from_str(&serde_json::to_string(&first).unwrap()).unwrap();
    assert_eq!(wire.id, first.id);
    assert_eq!(wire.source, "age > 30");
}

#[test]
fn test_malformed_json_rule_is_error() {
    let compiler = RuleCompiler::new();
    assert!(compiler.compile_from_json("{not valid json").is_err());
    assert!(compiler.compile_from_json(r#"{"id": "x"}"#).is_err());
}
