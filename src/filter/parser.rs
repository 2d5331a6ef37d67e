//! SQL expression parser.
//!
//! Converts a sample query string into a [`FilterExpr`] using sqlparser.
//! Queries are plain SQL boolean expressions:
//!
//! ```text
//! status != 'cancelled' AND total > 0
//! region IN ('emea', 'apac') AND `order id` BETWEEN 100 AND 200
//! ```

use sqlparser::ast::{
    self as sql, BinaryOperator as SqlBinaryOp, Expr as SqlExpr, UnaryOperator as SqlUnaryOp,
    Value as SqlValue,
};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

use super::expr::{BinaryOp, FilterExpr, LikePattern, UnaryOp};
use crate::frame::Value;

/// Parse a sample query into a predicate.
///
/// Errors carry a human-readable message; the caller attaches the query.
pub fn parse_filter(query: &str) -> Result<FilterExpr, String> {
    let dialect = GenericDialect {};

    // Wrap in SELECT to make it a valid SQL statement
    let wrapped = format!("SELECT {}", query);

    let statements = Parser::parse_sql(&dialect, &wrapped).map_err(|e| e.to_string())?;

    let [statement] = statements.as_slice() else {
        return Err("expected a single expression".to_string());
    };

    let sql::Statement::Query(q) = statement else {
        return Err("expected an expression".to_string());
    };
    let sql::SetExpr::Select(select) = q.body.as_ref() else {
        return Err("expected an expression".to_string());
    };
    if !select.from.is_empty() || select.selection.is_some() {
        return Err("expected an expression, not a query".to_string());
    }
    match select.projection.as_slice() {
        [sql::SelectItem::UnnamedExpr(expr)] => convert_expr(expr),
        _ => Err("expected a single expression".to_string()),
    }
}

fn convert_expr(expr: &SqlExpr) -> Result<FilterExpr, String> {
    match expr {
        SqlExpr::Identifier(ident) => Ok(convert_ident(ident)),

        // `a.b` names a column that itself contains a dot
        SqlExpr::CompoundIdentifier(idents) => Ok(FilterExpr::Column(
            idents
                .iter()
                .map(|i| i.value.as_str())
                .collect::<Vec<_>>()
                .join("."),
        )),

        SqlExpr::Value(value) => convert_value(value).map(FilterExpr::Literal),

        SqlExpr::BinaryOp { left, op, right } => Ok(FilterExpr::Binary {
            left: Box::new(convert_expr(left)?),
            op: convert_binary_op(op)?,
            right: Box::new(convert_expr(right)?),
        }),

        SqlExpr::UnaryOp { op, expr } => match op {
            SqlUnaryOp::Plus => convert_expr(expr),
            SqlUnaryOp::Not => Ok(FilterExpr::Unary {
                op: UnaryOp::Not,
                expr: Box::new(convert_expr(expr)?),
            }),
            SqlUnaryOp::Minus => Ok(FilterExpr::Unary {
                op: UnaryOp::Neg,
                expr: Box::new(convert_expr(expr)?),
            }),
            other => Err(format!("unsupported unary operator: {}", other)),
        },

        SqlExpr::Nested(inner) => convert_expr(inner),

        SqlExpr::IsNull(inner) => Ok(FilterExpr::IsNull {
            expr: Box::new(convert_expr(inner)?),
            negated: false,
        }),

        SqlExpr::IsNotNull(inner) => Ok(FilterExpr::IsNull {
            expr: Box::new(convert_expr(inner)?),
            negated: true,
        }),

        SqlExpr::Between {
            expr,
            negated,
            low,
            high,
        } => Ok(FilterExpr::Between {
            expr: Box::new(convert_expr(expr)?),
            low: Box::new(convert_expr(low)?),
            high: Box::new(convert_expr(high)?),
            negated: *negated,
        }),

        SqlExpr::InList {
            expr,
            list,
            negated,
        } => Ok(FilterExpr::InList {
            expr: Box::new(convert_expr(expr)?),
            list: list.iter().map(convert_expr).collect::<Result<_, _>>()?,
            negated: *negated,
        }),

        SqlExpr::Like {
            expr,
            pattern,
            negated,
            ..
        } => convert_like(expr, pattern, *negated, false),

        SqlExpr::ILike {
            expr,
            pattern,
            negated,
            ..
        } => convert_like(expr, pattern, *negated, true),

        other => Err(format!("unsupported expression: {}", other)),
    }
}

fn convert_ident(ident: &sql::Ident) -> FilterExpr {
    match ident.quote_style {
        Some('"') => FilterExpr::Name(ident.value.clone()),
        _ => FilterExpr::Column(ident.value.clone()),
    }
}

fn convert_like(
    expr: &SqlExpr,
    pattern: &SqlExpr,
    negated: bool,
    case_insensitive: bool,
) -> Result<FilterExpr, String> {
    let raw = match pattern {
        SqlExpr::Value(SqlValue::SingleQuotedString(s))
        | SqlExpr::Value(SqlValue::DoubleQuotedString(s)) => s.clone(),
        SqlExpr::Identifier(ident) if ident.quote_style == Some('"') => ident.value.clone(),
        other => return Err(format!("LIKE pattern must be a string literal, got {}", other)),
    };
    let pattern = LikePattern::compile(&raw, case_insensitive)
        .map_err(|e| format!("invalid LIKE pattern '{}': {}", raw, e))?;
    Ok(FilterExpr::Like {
        expr: Box::new(convert_expr(expr)?),
        pattern,
        negated,
    })
}

fn convert_value(value: &SqlValue) -> Result<Value, String> {
    match value {
        SqlValue::Number(n, _) => {
            // Try to parse as integer first, then float
            if let Ok(i) = n.parse::<i64>() {
                Ok(Value::Int(i))
            } else if let Ok(f) = n.parse::<f64>() {
                Ok(Value::Float(f))
            } else {
                Err(format!("invalid number: {}", n))
            }
        }
        SqlValue::SingleQuotedString(s) | SqlValue::DoubleQuotedString(s) => {
            Ok(Value::String(s.clone()))
        }
        SqlValue::Boolean(b) => Ok(Value::Bool(*b)),
        SqlValue::Null => Ok(Value::Null),
        other => Err(format!("unsupported literal: {}", other)),
    }
}

fn convert_binary_op(op: &SqlBinaryOp) -> Result<BinaryOp, String> {
    match op {
        SqlBinaryOp::Plus => Ok(BinaryOp::Add),
        SqlBinaryOp::Minus => Ok(BinaryOp::Sub),
        SqlBinaryOp::Multiply => Ok(BinaryOp::Mul),
        SqlBinaryOp::Divide => Ok(BinaryOp::Div),
        SqlBinaryOp::Modulo => Ok(BinaryOp::Mod),
        SqlBinaryOp::Eq => Ok(BinaryOp::Eq),
        SqlBinaryOp::NotEq => Ok(BinaryOp::Ne),
        SqlBinaryOp::Lt => Ok(BinaryOp::Lt),
        SqlBinaryOp::LtEq => Ok(BinaryOp::Lte),
        SqlBinaryOp::Gt => Ok(BinaryOp::Gt),
        SqlBinaryOp::GtEq => Ok(BinaryOp::Gte),
        SqlBinaryOp::And => Ok(BinaryOp::And),
        SqlBinaryOp::Or => Ok(BinaryOp::Or),
        other => Err(format!("unsupported binary operator: {}", other)),
    }
}
