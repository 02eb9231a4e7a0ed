//! 规则 API 服务
//!
//! 提供规则编译与评估的 REST API。服务本身无状态：
//! create 返回的编译产物由客户端保管，evaluate 时原样传回。
//!
//! ## 模块结构
//!
//! - `dto`: 请求体结构
//! - `error`: 错误类型定义
//! - `handlers`: HTTP 请求处理器
//! - `routes`: 路由配置
//!
//! ## 技术栈
//!
//! - Web 框架：Axum
//! - 数据验证：validator
//! - 序列化：serde

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;

pub use dto::{CreateRuleRequest, EvaluateRequest};
pub use error::{ApiError, Result};
pub use routes::app;

/// 服务名，用于配置加载与健康检查响应
pub const SERVICE_NAME: &str = "rule-api-service";
