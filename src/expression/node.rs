//! Expression AST: a single tagged tree with evaluation over a variable
//! environment.

use crate::error::{DbError, DbResult};
use crate::value::Value;
use std::fmt;

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithmeticOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Sub => "-",
            ArithmeticOp::Mul => "*",
            ArithmeticOp::Div => "/",
        }
    }
}

/// Binary comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl ComparisonOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Ne => "<>",
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
        }
    }
}

/// Binary logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOp::And => "and",
            LogicalOp::Or => "or",
        }
    }
}

/// The result of evaluating a node: a value for arithmetic roots, a boolean
/// for comparison and logical roots.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluated {
    Value(Value),
    Bool(bool),
}

impl Evaluated {
    /// The numeric value of this result; booleans have none.
    fn as_number(&self) -> DbResult<Value> {
        match self {
            Evaluated::Value(v) => v.as_number(),
            Evaluated::Bool(_) => Err(DbError::unsupported(
                "boolean operand in numeric context",
            )),
        }
    }

    fn as_value(&self) -> DbResult<&Value> {
        match self {
            Evaluated::Value(v) => Ok(v),
            Evaluated::Bool(_) => Err(DbError::unsupported(
                "boolean operand in value context",
            )),
        }
    }

    fn as_bool(&self) -> DbResult<bool> {
        match self {
            Evaluated::Bool(b) => Ok(*b),
            Evaluated::Value(_) => Err(DbError::unsupported(
                "non-boolean operand of a logical operator",
            )),
        }
    }
}

/// A node in an expression tree. Variables carry the slot index assigned by
/// the parser; evaluation reads the slot from the environment instead of
/// mutating the tree, so one tree can serve any number of independent
/// evaluations.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Constant(Value),
    Variable { name: String, slot: usize },
    Negate(Box<Node>),
    Arithmetic {
        op: ArithmeticOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Comparison {
        op: ComparisonOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    /// Evaluates this node against an environment holding one value per
    /// variable slot.
    pub fn evaluate(&self, env: &[Value]) -> DbResult<Evaluated> {
        match self {
            Node::Constant(v) => Ok(Evaluated::Value(v.clone())),

            Node::Variable { name, slot } => match env.get(*slot) {
                Some(v) => Ok(Evaluated::Value(v.clone())),
                None => Err(DbError::UnboundVariable { name: name.clone() }),
            },

            Node::Negate(child) => {
                let c = child.evaluate(env)?.as_number()?;
                Ok(Evaluated::Value(match c {
                    Value::Int(i) => Value::Int(i.wrapping_neg()),
                    Value::Float(f) => Value::Float(-f),
                    Value::Str(_) => unreachable!("as_number never returns a string"),
                }))
            }

            Node::Arithmetic { op, left, right } => {
                let l = left.evaluate(env)?.as_number()?;
                let r = right.evaluate(env)?.as_number()?;
                Ok(Evaluated::Value(apply_arithmetic(*op, &l, &r)?))
            }

            Node::Comparison { op, left, right } => {
                let l = left.evaluate(env)?;
                let r = right.evaluate(env)?;
                Ok(Evaluated::Bool(apply_comparison(
                    *op,
                    l.as_value()?,
                    r.as_value()?,
                )?))
            }

            Node::Logical { op, left, right } => {
                // both children are evaluated, left then right
                let l = left.evaluate(env)?.as_bool()?;
                let r = right.evaluate(env)?.as_bool()?;
                Ok(Evaluated::Bool(match op {
                    LogicalOp::And => l && r,
                    LogicalOp::Or => l || r,
                }))
            }
        }
    }
}

/// Integer operands stay integer; a floating operand promotes both sides.
fn apply_arithmetic(op: ArithmeticOp, left: &Value, right: &Value) -> DbResult<Value> {
    if let (Value::Int(a), Value::Int(b)) = (left, right) {
        return Ok(Value::Int(match op {
            ArithmeticOp::Add => a.wrapping_add(*b),
            ArithmeticOp::Sub => a.wrapping_sub(*b),
            ArithmeticOp::Mul => a.wrapping_mul(*b),
            ArithmeticOp::Div => {
                if *b == 0 {
                    return Err(DbError::DivisionByZero);
                }
                a.wrapping_div(*b)
            }
        }));
    }
    let a = numeric_f64(left);
    let b = numeric_f64(right);
    Ok(Value::Float(match op {
        ArithmeticOp::Add => a + b,
        ArithmeticOp::Sub => a - b,
        ArithmeticOp::Mul => a * b,
        ArithmeticOp::Div => a / b,
    }))
}

/// Equality is string-aware; the ordering comparisons coerce both sides to
/// numbers.
fn apply_comparison(op: ComparisonOp, left: &Value, right: &Value) -> DbResult<bool> {
    match op {
        ComparisonOp::Eq => left.query_eq(right),
        ComparisonOp::Ne => Ok(!left.query_eq(right)?),
        _ => {
            let a = numeric_f64(&left.as_number()?);
            let b = numeric_f64(&right.as_number()?);
            Ok(match op {
                ComparisonOp::Lt => a < b,
                ComparisonOp::Le => a <= b,
                ComparisonOp::Gt => a > b,
                ComparisonOp::Ge => a >= b,
                ComparisonOp::Eq | ComparisonOp::Ne => unreachable!(),
            })
        }
    }
}

fn numeric_f64(value: &Value) -> f64 {
    match value {
        Value::Int(i) => *i as f64,
        Value::Float(f) => *f,
        Value::Str(_) => f64::NAN,
    }
}

impl fmt::Display for Node {
    /// Fully parenthesized infix rendering; parsing the rendering yields a
    /// structurally equal tree.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Constant(Value::Str(s)) => write!(f, "\"{}\"", s),
            Node::Constant(v) => write!(f, "{}", v),
            Node::Variable { name, .. } => write!(f, "{}", name),
            Node::Negate(child) => write!(f, "-{}", child),
            Node::Arithmetic { op, left, right } => {
                write!(f, "({} {} {})", left, op.as_str(), right)
            }
            Node::Comparison { op, left, right } => {
                write!(f, "({} {} {})", left, op.as_str(), right)
            }
            Node::Logical { op, left, right } => {
                write!(f, "({} {} {})", left, op.as_str(), right)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str, slot: usize) -> Node {
        Node::Variable {
            name: name.to_string(),
            slot,
        }
    }

    #[test]
    fn test_constant_and_variable() -> DbResult<()> {
        let c = Node::Constant(Value::Int(7));
        assert_eq!(c.evaluate(&[])?, Evaluated::Value(Value::Int(7)));

        let v = var("x", 0);
        assert_eq!(
            v.evaluate(&[Value::Int(3)])?,
            Evaluated::Value(Value::Int(3))
        );
        assert!(matches!(
            v.evaluate(&[]),
            Err(DbError::UnboundVariable { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_integer_arithmetic_stays_integer() -> DbResult<()> {
        let node = Node::Arithmetic {
            op: ArithmeticOp::Div,
            left: Box::new(Node::Constant(Value::Int(7))),
            right: Box::new(Node::Constant(Value::Int(2))),
        };
        assert_eq!(node.evaluate(&[])?, Evaluated::Value(Value::Int(3)));
        Ok(())
    }

    #[test]
    fn test_float_promotion() -> DbResult<()> {
        let node = Node::Arithmetic {
            op: ArithmeticOp::Add,
            left: Box::new(Node::Constant(Value::Int(1))),
            right: Box::new(Node::Constant(Value::Float(0.5))),
        };
        assert_eq!(node.evaluate(&[])?, Evaluated::Value(Value::Float(1.5)));
        Ok(())
    }

    #[test]
    fn test_string_operand_coerced_by_arithmetic() -> DbResult<()> {
        let node = Node::Arithmetic {
            op: ArithmeticOp::Add,
            left: Box::new(Node::Constant(Value::from("12"))),
            right: Box::new(Node::Constant(Value::Int(1))),
        };
        assert_eq!(node.evaluate(&[])?, Evaluated::Value(Value::Int(13)));

        let bad = Node::Negate(Box::new(Node::Constant(Value::from("E15"))));
        assert!(matches!(
            bad.evaluate(&[]),
            Err(DbError::NumberFormat { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_division_by_zero() {
        let node = Node::Arithmetic {
            op: ArithmeticOp::Div,
            left: Box::new(Node::Constant(Value::Int(1))),
            right: Box::new(Node::Constant(Value::Int(0))),
        };
        assert_eq!(node.evaluate(&[]), Err(DbError::DivisionByZero));
    }

    #[test]
    fn test_string_equality() -> DbResult<()> {
        let node = Node::Comparison {
            op: ComparisonOp::Eq,
            left: Box::new(var("employeeNumber", 0)),
            right: Box::new(Node::Constant(Value::from("E15"))),
        };
        assert_eq!(
            node.evaluate(&[Value::from("E15")])?,
            Evaluated::Bool(true)
        );
        assert_eq!(
            node.evaluate(&[Value::from("E16")])?,
            Evaluated::Bool(false)
        );
        Ok(())
    }

    #[test]
    fn test_numeric_comparison() -> DbResult<()> {
        let node = Node::Comparison {
            op: ComparisonOp::Gt,
            left: Box::new(var("budget", 0)),
            right: Box::new(Node::Constant(Value::Int(1_000_000))),
        };
        assert_eq!(
            node.evaluate(&[Value::Float(2_000_000.0)])?,
            Evaluated::Bool(true)
        );
        assert_eq!(
            node.evaluate(&[Value::Float(1_000_000.0)])?,
            Evaluated::Bool(false)
        );
        Ok(())
    }

    #[test]
    fn test_logical_requires_booleans() {
        let node = Node::Logical {
            op: LogicalOp::And,
            left: Box::new(Node::Constant(Value::Int(1))),
            right: Box::new(Node::Constant(Value::Int(2))),
        };
        assert!(matches!(
            node.evaluate(&[]),
            Err(DbError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn test_display() {
        let node = Node::Logical {
            op: LogicalOp::And,
            left: Box::new(Node::Comparison {
                op: ComparisonOp::Gt,
                left: Box::new(var("budget", 0)),
                right: Box::new(Node::Constant(Value::Int(10))),
            }),
            right: Box::new(Node::Comparison {
                op: ComparisonOp::Eq,
                left: Box::new(var("projectName", 1)),
                right: Box::new(Node::Constant(Value::from("P00"))),
            }),
        };
        assert_eq!(
            node.to_string(),
            "((budget > 10) and (projectName = \"P00\"))"
        );
    }
}
