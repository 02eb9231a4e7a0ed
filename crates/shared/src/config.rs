//! 配置管理模块
//!
//! 支持多层配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// 服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 单个请求体的大小上限（字节）
    pub max_body_bytes: usize,
    /// 请求处理超时（秒）
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_body_bytes: 64 * 1024,
            request_timeout_seconds: 10,
        }
    }
}

/// 可观测性配置
#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilitySettings {
    pub log_level: String,
    /// 日志输出格式：json（结构化）或 pretty（人类可读）
    pub log_format: String,
    pub metrics_enabled: bool,
    pub metrics_port: u16,
}

impl Default for ObservabilitySettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: true,
            metrics_port: 9090,
        }
    }
}

impl ObservabilitySettings {
    /// 注入服务名，转换为可观测性模块的初始化配置
    pub fn with_service_name(&self, service_name: &str) -> crate::observability::ObservabilityConfig {
        crate::observability::ObservabilityConfig {
            service_name: service_name.to_string(),
            log_level: self.log_level.clone(),
            json_logs: self.log_format == "json",
            metrics_enabled: self.metrics_enabled,
            metrics_port: self.metrics_port,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub server: ServerConfig,
    pub observability: ObservabilitySettings,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置）
    /// 3. config/{service_name}.toml（服务特定配置）
    /// 4. 环境变量（RULEFORGE_ 前缀，如 RULEFORGE_SERVER_PORT -> server.port）
    /// 5. 服务特定端口环境变量（如 RULE_API_SERVICE_PORT）
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("RULEFORGE_ENV").unwrap_or_else(|_| "development".to_string());

        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env.clone())?
            .add_source(File::from(Path::new(&config_dir).join("default.toml")).required(false))
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", env))).required(false),
            )
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", service_name)))
                    .required(false),
            )
            // 环境变量覆盖（RULEFORGE_SERVER_PORT -> server.port）
            .add_source(
                Environment::with_prefix("RULEFORGE")
                    .separator("_")
                    .try_parsing(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        // 服务特定端口环境变量覆盖
        if let Some(port) = Self::get_service_port_from_env(service_name) {
            config.server.port = port;
        }

        Ok(config)
    }

    /// 从环境变量获取服务特定端口
    ///
    /// 将 "rule-api-service" 转换为 "RULE_API_SERVICE_PORT"
    fn get_service_port_from_env(service_name: &str) -> Option<u16> {
        let env_var_name = format!("{}_PORT", service_name.to_uppercase().replace('-', "_"));
        std::env::var(&env_var_name)
            .ok()
            .and_then(|v| v.parse().ok())
    }

    /// 获取服务地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.max_body_bytes, 64 * 1024);
        assert_eq!(config.observability.metrics_port, 9090);
    }

    #[test]
    fn test_server_addr() {
        let config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(config.server_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_service_port_env_var_conversion() {
        // 验证服务名到环境变量名的映射规则
        // SAFETY: 测试环境中单线程执行，不会有并发问题
        unsafe {
            std::env::set_var("RULE_API_SERVICE_PORT", "12345");
        }

        let result = AppConfig::get_service_port_from_env("rule-api-service");
        assert_eq!(result, Some(12345));

        unsafe {
            std::env::remove_var("RULE_API_SERVICE_PORT");
        }
    }

    #[test]
    fn test_with_service_name() {
        let settings = ObservabilitySettings {
            log_format: "json".to_string(),
            ..Default::default()
        };
        let obs = settings.with_service_name("rule-api-service");
        assert_eq!(obs.service_name, "rule-api-service");
        assert!(obs.json_logs);
    }
}
