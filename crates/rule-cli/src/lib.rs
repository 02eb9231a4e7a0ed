//! 规则服务命令行客户端
//!
//! 把规则文本交给服务端编译，再用编译产物对数据记录做评估，
//! 并以固定格式展示结果或错误。所有失败都在动作现场捕获展示，
//! 不向上传播，也不重试。

pub mod client;
pub mod output;
pub mod state;

pub use client::{ClientError, RuleServiceClient};
