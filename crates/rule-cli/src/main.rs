//! 规则服务命令行入口
//!
//! `create` 把规则文本交给服务端编译并展示/缓存编译产物；
//! `evaluate` 用缓存的产物对数据记录做评估并展示布尔结果。
//! 两个动作相互独立，唯一的顺序约束是 evaluate 前必须有过一次
//! 成功的 create，由缓存文件存在性检查保证。

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rule_cli::client::{ClientError, RuleServiceClient};
use rule_cli::{output, state};
use ruleforge_shared::observability::{self, ObservabilityConfig};
use serde_json::Value;
use tracing::error;

/// 示例规则，与示例数据配对可得到 TRUE 的评估结果
const EXAMPLE_RULE: &str = "age > 30 AND department = 'Sales'";

/// 示例数据记录
const EXAMPLE_DATA: &str = r#"{"age": 35, "department": "Sales"}"#;

#[derive(Parser, Debug)]
#[command(name = "rule-cli", about = "规则编译与评估客户端")]
struct Cli {
    /// 规则服务地址
    #[arg(long, default_value = "http://127.0.0.1:8080", global = true)]
    server: String,

    /// 编译产物的缓存文件
    #[arg(long, default_value = state::DEFAULT_RULE_FILE, global = true)]
    rule_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 编译规则文本并缓存编译产物
    Create {
        /// 规则文本，如 "age > 30 AND department = 'Sales'"
        #[arg(default_value = EXAMPLE_RULE)]
        rule: String,
    },
    /// 用缓存的编译产物评估一条数据记录
    Evaluate {
        /// JSON 数据记录
        #[arg(long, default_value = EXAMPLE_DATA, conflicts_with = "data_file")]
        data: String,

        /// 从文件读取 JSON 数据记录
        #[arg(long)]
        data_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // 日志只用于诊断，展示走 stdout
    let obs_config = ObservabilityConfig {
        service_name: "rule-cli".to_string(),
        log_level: "warn".to_string(),
        ..Default::default()
    };
    let _ = observability::tracing::init(&obs_config);

    let client = RuleServiceClient::new(&cli.server);

    match cli.command {
        Commands::Create { rule } => run_create(&client, &cli.rule_file, &rule).await,
        Commands::Evaluate { data, data_file } => {
            run_evaluate(&client, &cli.rule_file, data, data_file).await
        }
    }
}

/// 编译规则并展示/缓存编译产物
async fn run_create(client: &RuleServiceClient, rule_file: &PathBuf, rule: &str) -> ExitCode {
    match client.create_rule(rule).await {
        Ok(compiled) => {
            let text = output::render_rule(&compiled);
            println!("{}", text);

            if let Err(e) = state::save_rule(rule_file, &text) {
                error!(error = %e, "Failed to cache compiled rule");
                println!("{}", output::render_error(&e.to_string()));
                return ExitCode::FAILURE;
            }

            ExitCode::SUCCESS
        }
        Err(e) => report_failure(e),
    }
}

/// 评估缓存的规则对数据记录的匹配结果
async fn run_evaluate(
    client: &RuleServiceClient,
    rule_file: &PathBuf,
    data: String,
    data_file: Option<PathBuf>,
) -> ExitCode {
    // 前置检查与本地解析都在发请求之前完成
    let rule = match state::load_rule(rule_file) {
        Ok(rule) => rule,
        Err(e) => return report_failure(e),
    };

    let data_text = match data_file {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                return report_failure(ClientError::LocalParse(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )));
            }
        },
        None => data,
    };

    let data_json: Value = match serde_json::from_str(&data_text) {
        Ok(value) => value,
        Err(e) => return report_failure(ClientError::from(e)),
    };

    match client.evaluate(&rule, &data_json).await {
        Ok(response) => {
            let matched = response
                .get("result")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            println!("{}", output::render_result(matched));
            ExitCode::SUCCESS
        }
        Err(e) => report_failure(e),
    }
}

/// 失败统一在现场展示，不向上传播
fn report_failure(err: ClientError) -> ExitCode {
    error!(error = %err, "Request failed");
    println!("{}", output::render_error(&err.to_string()));
    ExitCode::FAILURE
}
