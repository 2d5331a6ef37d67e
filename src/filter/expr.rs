//! Row predicate AST and its evaluation against a frame.

use std::cmp::Ordering;

use regex::Regex;

use crate::frame::{Frame, Value};

/// Errors raised while evaluating a predicate; the caller attaches the query text.
pub type EvalResult<T> = Result<T, String>;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    And,
    Or,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

/// A compiled `LIKE` pattern.
#[derive(Debug, Clone)]
pub struct LikePattern {
    pub raw: String,
    regex: Regex,
}

impl LikePattern {
    /// Compile a SQL `LIKE` pattern (`%` any run, `_` any single char).
    pub fn compile(raw: &str, case_insensitive: bool) -> Result<Self, regex::Error> {
        let mut pattern = String::with_capacity(raw.len() + 8);
        if case_insensitive {
            pattern.push_str("(?i)");
        }
        pattern.push('^');
        let mut literal = [0u8; 4];
        for ch in raw.chars() {
            match ch {
                '%' => pattern.push_str(".*"),
                '_' => pattern.push('.'),
                other => pattern.push_str(&regex::escape(other.encode_utf8(&mut literal))),
            }
        }
        pattern.push('$');
        Ok(Self {
            raw: raw.to_string(),
            regex: Regex::new(&pattern)?,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// A row predicate over frame columns.
#[derive(Debug, Clone)]
pub enum FilterExpr {
    /// Column reference (bare or backtick-quoted).
    Column(String),
    /// Double-quoted name: a column when the frame has it, otherwise a string.
    Name(String),
    Literal(Value),
    Binary {
        left: Box<FilterExpr>,
        op: BinaryOp,
        right: Box<FilterExpr>,
    },
    Unary {
        op: UnaryOp,
        expr: Box<FilterExpr>,
    },
    InList {
        expr: Box<FilterExpr>,
        list: Vec<FilterExpr>,
        negated: bool,
    },
    Between {
        expr: Box<FilterExpr>,
        low: Box<FilterExpr>,
        high: Box<FilterExpr>,
        negated: bool,
    },
    IsNull {
        expr: Box<FilterExpr>,
        negated: bool,
    },
    Like {
        expr: Box<FilterExpr>,
        pattern: LikePattern,
        negated: bool,
    },
}

impl FilterExpr {
    /// Evaluate against every row, keeping rows where the predicate is TRUE.
    pub fn mask(&self, frame: &Frame) -> EvalResult<Vec<bool>> {
        (0..frame.num_rows())
            .map(|row| match self.eval(frame, row)? {
                Value::Bool(b) => Ok(b),
                Value::Null => Ok(false),
                other => Err(format!(
                    "predicate must evaluate to a boolean, got {}",
                    other.type_name()
                )),
            })
            .collect()
    }

    /// Evaluate for a single row.
    pub fn eval(&self, frame: &Frame, row: usize) -> EvalResult<Value> {
        match self {
            FilterExpr::Column(name) => frame
                .column(name)
                .map(|c| c.values[row].clone())
                .ok_or_else(|| format!("unknown column '{}'", name)),
            FilterExpr::Name(name) => Ok(frame
                .column(name)
                .map(|c| c.values[row].clone())
                .unwrap_or_else(|| Value::String(name.clone()))),
            FilterExpr::Literal(value) => Ok(value.clone()),
            FilterExpr::Binary { left, op, right } => match op {
                BinaryOp::And | BinaryOp::Or => {
                    let l = truth(&left.eval(frame, row)?)?;
                    let r = truth(&right.eval(frame, row)?)?;
                    Ok(logical(*op, l, r))
                }
                _ => binary(*op, &left.eval(frame, row)?, &right.eval(frame, row)?),
            },
            FilterExpr::Unary { op, expr } => unary(*op, expr.eval(frame, row)?),
            FilterExpr::InList {
                expr,
                list,
                negated,
            } => {
                let value = expr.eval(frame, row)?;
                if value.is_missing() {
                    return Ok(Value::Null);
                }
                let mut found = false;
                for item in list {
                    if equals(&value, &item.eval(frame, row)?) {
                        found = true;
                        break;
                    }
                }
                Ok(Value::Bool(found != *negated))
            }
            FilterExpr::Between {
                expr,
                low,
                high,
                negated,
            } => {
                let value = expr.eval(frame, row)?;
                let low = low.eval(frame, row)?;
                let high = high.eval(frame, row)?;
                match (value.compare(&low), value.compare(&high)) {
                    (Some(lo), Some(hi)) => {
                        let inside = lo != Ordering::Less && hi != Ordering::Greater;
                        Ok(Value::Bool(inside != *negated))
                    }
                    _ => Ok(Value::Null),
                }
            }
            FilterExpr::IsNull { expr, negated } => {
                let missing = expr.eval(frame, row)?.is_missing();
                Ok(Value::Bool(missing != *negated))
            }
            FilterExpr::Like {
                expr,
                pattern,
                negated,
            } => match expr.eval(frame, row)? {
                Value::String(s) => Ok(Value::Bool(pattern.is_match(&s) != *negated)),
                v if v.is_missing() => Ok(Value::Null),
                other => Err(format!(
                    "LIKE '{}' needs a string, got {}",
                    pattern.raw,
                    other.type_name()
                )),
            },
        }
    }
}

/// Three-valued truth: `None` is SQL NULL.
fn truth(value: &Value) -> EvalResult<Option<bool>> {
    match value {
        Value::Bool(b) => Ok(Some(*b)),
        v if v.is_missing() => Ok(None),
        other => Err(format!("expected a boolean, got {}", other.type_name())),
    }
}

fn logical(op: BinaryOp, l: Option<bool>, r: Option<bool>) -> Value {
    let result = match op {
        BinaryOp::And => match (l, r) {
            (Some(false), _) | (_, Some(false)) => Some(false),
            (Some(true), Some(true)) => Some(true),
            _ => None,
        },
        _ => match (l, r) {
            (Some(true), _) | (_, Some(true)) => Some(true),
            (Some(false), Some(false)) => Some(false),
            _ => None,
        },
    };
    result.map(Value::Bool).unwrap_or(Value::Null)
}

fn equals(a: &Value, b: &Value) -> bool {
    match a.compare(b) {
        Some(ord) => ord == Ordering::Equal,
        None => a.loose_eq(b),
    }
}

fn binary(op: BinaryOp, l: &Value, r: &Value) -> EvalResult<Value> {
    if l.is_missing() || r.is_missing() {
        return Ok(Value::Null);
    }
    match op {
        BinaryOp::Eq => Ok(Value::Bool(equals(l, r))),
        BinaryOp::Ne => Ok(Value::Bool(!equals(l, r))),
        BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte => {
            let ord = l.compare(r).ok_or_else(|| {
                format!("cannot compare {} with {}", l.type_name(), r.type_name())
            })?;
            let result = match op {
                BinaryOp::Lt => ord == Ordering::Less,
                BinaryOp::Lte => ord != Ordering::Greater,
                BinaryOp::Gt => ord == Ordering::Greater,
                _ => ord != Ordering::Less,
            };
            Ok(Value::Bool(result))
        }
        _ => arithmetic(op, l, r),
    }
}

fn arithmetic(op: BinaryOp, l: &Value, r: &Value) -> EvalResult<Value> {
    if let (Value::Int(a), Value::Int(b)) = (l, r) {
        let result = match op {
            BinaryOp::Add => a.checked_add(*b),
            BinaryOp::Sub => a.checked_sub(*b),
            BinaryOp::Mul => a.checked_mul(*b),
            BinaryOp::Mod => a.checked_rem(*b),
            // Division always yields a float.
            _ => return Ok(divide(*a as f64, *b as f64)),
        };
        return Ok(result.map(Value::Int).unwrap_or(Value::Null));
    }

    let (Some(a), Some(b)) = (l.as_f64(), r.as_f64()) else {
        return Err(format!(
            "cannot apply {:?} to {} and {}",
            op,
            l.type_name(),
            r.type_name()
        ));
    };
    Ok(match op {
        BinaryOp::Add => Value::Float(a + b),
        BinaryOp::Sub => Value::Float(a - b),
        BinaryOp::Mul => Value::Float(a * b),
        BinaryOp::Mod if b == 0.0 => Value::Null,
        BinaryOp::Mod => Value::Float(a % b),
        _ => divide(a, b),
    })
}

fn divide(a: f64, b: f64) -> Value {
    if b == 0.0 {
        Value::Null
    } else {
        Value::Float(a / b)
    }
}

fn unary(op: UnaryOp, value: Value) -> EvalResult<Value> {
    if value.is_missing() {
        return Ok(Value::Null);
    }
    match (op, value) {
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Neg, Value::Int(i)) => Ok(i.checked_neg().map(Value::Int).unwrap_or(Value::Null)),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (op, other) => Err(format!("cannot apply {:?} to {}", op, other.type_name())),
    }
}
