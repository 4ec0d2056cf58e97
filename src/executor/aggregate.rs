//! Aggregation operator: grouped aggregates over the full input.
//!
//! Supports multiple grouping attributes and multiple aggregate functions
//! (count, sum, avg, min, max) in one pass. With no grouping attributes all
//! input falls into a single group, which is how top-level aggregates are
//! executed.

use crate::error::{DbError, DbResult};
use crate::executor::{Operator, RecordStream};
use crate::record::Record;
use crate::schema::Schema;
use crate::value::Value;
use std::sync::Arc;

/// Supported aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    pub const ALL: [AggregateFunction; 5] = [
        AggregateFunction::Count,
        AggregateFunction::Sum,
        AggregateFunction::Avg,
        AggregateFunction::Min,
        AggregateFunction::Max,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "count",
            AggregateFunction::Sum => "sum",
            AggregateFunction::Avg => "avg",
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
        }
    }

    pub fn from_name(name: &str) -> Option<AggregateFunction> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// A fresh accumulator for this function.
    fn accumulator(&self) -> Accumulator {
        match self {
            AggregateFunction::Count => Accumulator::Count(0),
            AggregateFunction::Sum => Accumulator::Sum(None),
            AggregateFunction::Avg => Accumulator::Avg {
                sum: None,
                count: 0,
            },
            AggregateFunction::Min => Accumulator::Min(None),
            AggregateFunction::Max => Accumulator::Max(None),
        }
    }
}

/// Running state of one aggregate over one group.
#[derive(Debug, Clone, PartialEq)]
enum Accumulator {
    Count(i64),
    Sum(Option<Value>),
    Avg { sum: Option<Value>, count: i64 },
    Min(Option<Value>),
    Max(Option<Value>),
}

impl Accumulator {
    /// Folds one value into the state.
    fn update(&mut self, value: &Value) -> DbResult<()> {
        match self {
            Accumulator::Count(count) => *count += 1,
            Accumulator::Sum(sum) => add_to(sum, value)?,
            Accumulator::Avg { sum, count } => {
                add_to(sum, value)?;
                *count += 1;
            }
            Accumulator::Min(min) => take_extreme(min, value, std::cmp::Ordering::Less),
            Accumulator::Max(max) => take_extreme(max, value, std::cmp::Ordering::Greater),
        }
        Ok(())
    }

    /// Combines two states as if each had processed part of the input.
    /// Commutative, so parallel partitions can be collected independently.
    fn merge(&mut self, other: Accumulator) -> DbResult<()> {
        match (self, other) {
            (Accumulator::Count(count), Accumulator::Count(n)) => *count += n,
            (Accumulator::Sum(sum), Accumulator::Sum(Some(v))) => add_to(sum, &v)?,
            (Accumulator::Sum(_), Accumulator::Sum(None)) => {}
            (
                Accumulator::Avg { sum, count },
                Accumulator::Avg {
                    sum: other_sum,
                    count: other_count,
                },
            ) => {
                if let Some(v) = other_sum {
                    add_to(sum, &v)?;
                }
                *count += other_count;
            }
            (Accumulator::Min(min), Accumulator::Min(Some(v))) => {
                take_extreme(min, &v, std::cmp::Ordering::Less)
            }
            (Accumulator::Max(max), Accumulator::Max(Some(v))) => {
                take_extreme(max, &v, std::cmp::Ordering::Greater)
            }
            (Accumulator::Min(_), Accumulator::Min(None))
            | (Accumulator::Max(_), Accumulator::Max(None)) => {}
            _ => {
                return Err(DbError::unsupported(
                    "merging accumulators of different aggregate functions",
                ))
            }
        }
        Ok(())
    }

    /// The aggregate result. Count is defined for a state that saw no
    /// values; the other functions need at least one.
    fn finish(self) -> DbResult<Value> {
        match self {
            Accumulator::Count(count) => Ok(Value::Int(count)),
            Accumulator::Sum(sum) | Accumulator::Min(sum) | Accumulator::Max(sum) => {
                sum.ok_or_else(|| DbError::unsupported("aggregate over no values"))
            }
            Accumulator::Avg { sum, count } => match sum {
                Some(Value::Int(total)) => Ok(Value::Int(total / count)),
                Some(Value::Float(total)) => Ok(Value::Float(total / count as f64)),
                _ => Err(DbError::unsupported("aggregate over no values")),
            },
        }
    }
}

/// Adds a value into a running sum, adopting the first value and promoting
/// to floating when either side is floating.
fn add_to(sum: &mut Option<Value>, value: &Value) -> DbResult<()> {
    let value = value.as_number()?;
    *sum = Some(match sum.take() {
        None => value,
        Some(Value::Int(a)) => match value {
            Value::Int(b) => Value::Int(a.wrapping_add(b)),
            Value::Float(b) => Value::Float(a as f64 + b),
            Value::Str(_) => unreachable!("as_number never returns a string"),
        },
        Some(Value::Float(a)) => match value {
            Value::Int(b) => Value::Float(a + b as f64),
            Value::Float(b) => Value::Float(a + b),
            Value::Str(_) => unreachable!("as_number never returns a string"),
        },
        Some(Value::Str(_)) => unreachable!("sums never hold strings"),
    });
    Ok(())
}

/// Keeps the smaller or larger of the tracked extreme and the new value.
fn take_extreme(extreme: &mut Option<Value>, value: &Value, keep: std::cmp::Ordering) {
    match extreme {
        None => *extreme = Some(value.clone()),
        Some(current) => {
            if value.total_order(current) == keep {
                *extreme = Some(value.clone());
            }
        }
    }
}

/// One aggregate to compute: the function and the input attribute it reads.
#[derive(Debug, Clone)]
struct AggregateSpec {
    function: AggregateFunction,
    input_index: usize,
}

/// Groups the input by the grouping attributes and applies every aggregate
/// to every group. The full input is drained on the stream's first pull;
/// groups are then emitted in first-seen order of their keys, which makes
/// the output deterministic for a given input order.
pub struct Aggregation<'a> {
    input: Box<dyn Operator<'a> + 'a>,
    grouping: Vec<String>,
    specs: Vec<AggregateSpec>,
    output_schema: Arc<Schema>,
}

impl<'a> Aggregation<'a> {
    /// `descriptions` pairs each aggregate description, in the literal form
    /// `func(attribute)`, with its output attribute name. Descriptions that
    /// do not have that form or name an unknown function are skipped;
    /// a known function over an attribute missing from the input schema is
    /// an unbound-variable error.
    pub fn new(
        input: Box<dyn Operator<'a> + 'a>,
        grouping: Vec<String>,
        descriptions: Vec<(String, String)>,
    ) -> DbResult<Self> {
        let input_schema = input.output_schema();
        let mut output_schema = Schema::new();
        for name in &grouping {
            if !input_schema.contains(name) {
                return Err(DbError::UnboundVariable { name: name.clone() });
            }
            output_schema.attribute(name)?;
        }

        let mut specs = Vec::new();
        for (description, output_name) in &descriptions {
            let (function, argument) = match parse_description(description) {
                Some(parsed) => parsed,
                None => continue,
            };
            let input_index = input_schema.index_of(argument).ok_or_else(|| {
                DbError::UnboundVariable {
                    name: argument.to_string(),
                }
            })?;
            output_schema.attribute(output_name)?;
            specs.push(AggregateSpec {
                function,
                input_index,
            });
        }

        Ok(Aggregation {
            input,
            grouping,
            specs,
            output_schema: Arc::new(output_schema),
        })
    }
}

/// Splits `func(attribute)` into its parts; `None` when the description
/// does not have that shape or the function is unknown.
fn parse_description(description: &str) -> Option<(AggregateFunction, &str)> {
    let open = description.find('(')?;
    let close = description.rfind(')')?;
    if close < open {
        return None;
    }
    let function = AggregateFunction::from_name(description[..open].trim())?;
    let argument = description[open + 1..close].trim();
    Some((function, argument))
}

impl<'a> Operator<'a> for Aggregation<'a> {
    fn output_schema(&self) -> &Schema {
        &self.output_schema
    }

    fn stream(&self) -> RecordStream<'a> {
        Box::new(AggregationStream {
            input: Some(self.input.stream()),
            grouping: self.grouping.clone(),
            specs: self.specs.clone(),
            schema: self.output_schema.clone(),
            results: Vec::new().into_iter(),
        })
    }
}

struct AggregationStream<'a> {
    input: Option<RecordStream<'a>>,
    grouping: Vec<String>,
    specs: Vec<AggregateSpec>,
    schema: Arc<Schema>,
    results: std::vec::IntoIter<DbResult<Record>>,
}

impl AggregationStream<'_> {
    fn run(&mut self, input: RecordStream<'_>) -> DbResult<Vec<Record>> {
        // groups in first-seen key order; keys are compared by value
        // equality, which float keys permit even though they cannot hash
        let mut groups: Vec<(Vec<Value>, Vec<Accumulator>)> = Vec::new();
        if self.grouping.is_empty() {
            // the implicit group exists even when the input is empty, so a
            // top-level aggregate always yields exactly one record
            let accumulators = self.specs.iter().map(|s| s.function.accumulator()).collect();
            groups.push((vec![], accumulators));
        }
        for item in input {
            let record = item?;
            let key = record.values_of(&self.grouping);
            let index = match groups.iter().position(|(k, _)| *k == key) {
                Some(index) => index,
                None => {
                    let accumulators =
                        self.specs.iter().map(|s| s.function.accumulator()).collect();
                    groups.push((key, accumulators));
                    groups.len() - 1
                }
            };
            let accumulators = &mut groups[index].1;
            for (accumulator, spec) in accumulators.iter_mut().zip(&self.specs) {
                accumulator.update(record.value(spec.input_index))?;
            }
        }

        groups
            .into_iter()
            .map(|(key, accumulators)| {
                let mut values = key;
                for accumulator in accumulators {
                    values.push(accumulator.finish()?);
                }
                Record::new(self.schema.clone(), values)
            })
            .collect()
    }
}

impl Iterator for AggregationStream<'_> {
    type Item = DbResult<Record>;

    fn next(&mut self) -> Option<DbResult<Record>> {
        if let Some(input) = self.input.take() {
            self.results = match self.run(input) {
                Ok(records) => records.into_iter().map(Ok).collect::<Vec<_>>().into_iter(),
                Err(e) => vec![Err(e)].into_iter(),
            };
        }
        self.results.next()
    }
}
