//! 日志初始化模块
//!
//! 基于 tracing-subscriber 构建日志订阅器，支持 JSON 和人类可读两种格式。

use anyhow::Result;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use super::ObservabilityConfig;

/// 初始化 tracing 日志
///
/// 过滤规则优先取 RUST_LOG 环境变量，其次取配置中的 log_level。
/// 重复初始化（如集成测试中多次调用）不视为错误。
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = if config.json_logs {
        fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_thread_ids(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .boxed()
    };

    // try_init 在全局订阅器已存在时返回 Err，此时沿用已有订阅器即可
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let config = ObservabilityConfig::default();
        assert!(init(&config).is_ok());
        // 第二次初始化不应报错
        assert!(init(&config).is_ok());
    }

    #[test]
    fn test_init_with_json_format() {
        let config = ObservabilityConfig {
            json_logs: true,
            ..Default::default()
        };
        assert!(init(&config).is_ok());
    }
}
