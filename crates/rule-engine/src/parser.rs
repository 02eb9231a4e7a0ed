//! 文本规则语法解析器
//!
//! 将 `age > 30 AND department = 'Sales'` 形式的规则文本解析为规则节点树。
//!
//! 语法约定：
//! - 比较式：`字段 操作符 值`，操作符为 `>` `<` `>=` `<=` `=` `!=`
//! - 逻辑连接：`AND` / `OR`，AND 优先级高于 OR
//! - 括号可改变结合顺序
//! - 值支持数字、单/双引号字符串、true/false/null 与裸词
//! - 连续相同的连接符折叠为一个多叉逻辑组

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace0, none_of},
    combinator::{all_consuming, map, map_res, opt, recognize, value, verify},
    error::ParseError,
    multi::many0,
    sequence::{delimited, pair, preceded, tuple},
};
use serde_json::Value;

use crate::error::{Result, RuleError};
use crate::models::{Condition, LogicalGroup, RuleNode};
use crate::operators::{LogicalOperator, Operator};

/// 空白包装器
fn ws<'a, F, O, E: ParseError<&'a str>>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O, E>
where
    F: FnMut(&'a str) -> IResult<&'a str, O, E>,
{
    delimited(multispace0, inner, multispace0)
}

/// 标识符（字段名与裸词），允许点号分隔的路径段
fn parse_identifier(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(
            alt((alpha1, tag("_"))),
            many0(alt((alphanumeric1, tag("_"), tag(".")))),
        )),
        String::from,
    )(input)
}

/// 整数与浮点数
fn parse_number(input: &str) -> IResult<&str, Value> {
    map_res(
        recognize(tuple((
            opt(char('-')),
            digit1,
            opt(tuple((char('.'), digit1))),
        ))),
        |s: &str| -> std::result::Result<Value, &'static str> {
            if s.contains('.') {
                s.parse::<f64>().map(Value::from).map_err(|_| "无效浮点数")
            } else {
                s.parse::<i64>().map(Value::from).map_err(|_| "无效整数")
            }
        },
    )(input)
}

/// 字符串字面量：双引号支持转义，单引号取原文
fn parse_string_literal(input: &str) -> IResult<&str, Value> {
    alt((
        map(
            delimited(
                char('"'),
                many0(alt((
                    value('"', tag("\\\"")),
                    value('\\', tag("\\\\")),
                    value('\n', tag("\\n")),
                    value('\t', tag("\\t")),
                    value('\r', tag("\\r")),
                    none_of("\"\\"),
                ))),
                char('"'),
            ),
            |chars: Vec<char>| Value::String(chars.into_iter().collect()),
        ),
        map(
            delimited(char('\''), take_while(|c| c != '\''), char('\'')),
            |s: &str| Value::String(s.to_string()),
        ),
    ))(input)
}

/// 裸词值：未加引号的单词按字符串处理，true/false/null 特殊化
fn parse_bare_word(input: &str) -> IResult<&str, Value> {
    map(
        verify(parse_identifier, |s: &String| {
            s.as_str() != "AND" && s.as_str() != "OR"
        }),
        |s| match s.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "null" => Value::Null,
            _ => Value::String(s),
        },
    )(input)
}

/// 比较式右侧的值
fn parse_value(input: &str) -> IResult<&str, Value> {
    alt((parse_number, parse_string_literal, parse_bare_word))(input)
}

/// 比较操作符（双字符符号必须先于单字符尝试）
fn parse_comparison_op(input: &str) -> IResult<&str, Operator> {
    map_res(
        alt((tag(">="), tag("<="), tag("!="), tag(">"), tag("<"), tag("="))),
        |s: &str| Operator::from_symbol(s).ok_or("未知操作符"),
    )(input)
}

/// 单个比较式：`字段 操作符 值`
fn parse_comparison(input: &str) -> IResult<&str, RuleNode> {
    map(
        tuple((ws(parse_identifier), parse_comparison_op, ws(parse_value))),
        |(field, operator, value)| {
            RuleNode::Condition(Condition {
                field,
                operator,
                value,
            })
        },
    )(input)
}

/// 操作数：括号表达式或比较式
fn parse_operand(input: &str) -> IResult<&str, RuleNode> {
    alt((
        delimited(ws(char('(')), parse_expression, ws(char(')'))),
        parse_comparison,
    ))(input)
}

/// 将首节点与后续节点折叠为多叉逻辑组；单节点保持原样
fn fold_group(operator: LogicalOperator, first: RuleNode, mut rest: Vec<RuleNode>) -> RuleNode {
    if rest.is_empty() {
        first
    } else {
        let mut children = Vec::with_capacity(rest.len() + 1);
        children.push(first);
        children.append(&mut rest);
        RuleNode::Group(LogicalGroup::new(operator, children))
    }
}

/// AND 层
fn parse_and(input: &str) -> IResult<&str, RuleNode> {
    let (input, first) = parse_operand(input)?;
    let (input, rest) = many0(preceded(ws(tag("AND")), parse_operand))(input)?;
    Ok((input, fold_group(LogicalOperator::And, first, rest)))
}

/// OR 层（最低优先级）
fn parse_or(input: &str) -> IResult<&str, RuleNode> {
    let (input, first) = parse_and(input)?;
    let (input, rest) = many0(preceded(ws(tag("OR")), parse_and))(input)?;
    Ok((input, fold_group(LogicalOperator::Or, first, rest)))
}

/// 完整表达式
fn parse_expression(input: &str) -> IResult<&str, RuleNode> {
    parse_or(input)
}

/// 截取错误位置附近的片段用于报错
fn snippet(input: &str) -> &str {
    let end = input
        .char_indices()
        .nth(40)
        .map(|(i, _)| i)
        .unwrap_or(input.len());
    &input[..end]
}

/// 解析规则文本为节点树
///
/// 要求整个输入都能被语法消费，残留的尾部文本视为语法错误。
pub fn parse_rule_string(input: &str) -> Result<RuleNode> {
    if input.trim().is_empty() {
        return Err(RuleError::ParseError("规则文本不能为空".to_string()));
    }

    match all_consuming(ws(parse_expression))(input) {
        Ok((_, node)) => Ok(node),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(RuleError::ParseError(format!(
            "无效的规则语法，无法解析: '{}'",
            snippet(e.input)
        ))),
        Err(nom::Err::Incomplete(_)) => {
            Err(RuleError::ParseError("规则文本不完整".to_string()))
        }
    }
}
