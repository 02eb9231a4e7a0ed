//! 规则引擎
//!
//! 提供可复用的规则编译与评估能力，支持：
//! - 文本规则语法解析（如 `age > 30 AND department = 'Sales'`）
//! - JSON 规则定义的反序列化与校验
//! - 短路求值执行
//!
//! 编译后的规则是自包含的 JSON 结构，不依赖任何服务端状态，
//! 可以原样往返于客户端与评估端之间。

pub mod compiler;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod models;
pub mod operators;
pub mod parser;

pub use compiler::RuleCompiler;
pub use error::{Result, RuleError};
pub use evaluator::ConditionEvaluator;
pub use executor::RuleExecutor;
pub use models::{CompiledRule, Condition, EvaluationContext, EvaluationResult, LogicalGroup, RuleNode};
pub use operators::{LogicalOperator, Operator};
