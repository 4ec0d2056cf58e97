//! The database surface: table registry, schema building, and the query
//! compiler that turns textual fragments into an operator pipeline.

use crate::error::{DbError, DbResult};
use crate::executor::{
    Aggregation, AggregateFunction, NaturalJoin, Operator, Projection, RecordStream, Scan,
    Selection,
};
use crate::expression::Expression;
use crate::schema::Schema;
use crate::table::Table;
use std::collections::BTreeMap;
use std::fmt;

/// The literal separator between table names in the table-list fragment.
const NATURAL_JOIN: &str = "natural join";

/// The literal separator between an expression and its output name. The
/// split is on this exact substring, never on `as` as a word, so identifiers
/// containing `as` stay intact.
const AS: &str = " as ";

/// A named collection of tables.
pub struct Database {
    name: String,
    tables: BTreeMap<String, Table>,
}

impl Database {
    pub fn new(name: &str) -> Self {
        Database {
            name: name.to_string(),
            tables: BTreeMap::new(),
        }
    }

    /// Registers an empty table and returns a builder for its schema.
    /// Creating a table under an existing name replaces the old table.
    pub fn create_table(&mut self, table_name: &str) -> SchemaBuilder<'_> {
        self.tables
            .insert(table_name.to_string(), Table::new(Schema::new()));
        SchemaBuilder {
            table: self.tables.get_mut(table_name).unwrap(),
            schema: Schema::new(),
        }
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    /// `select(projection, tables)`: every record of the joined tables,
    /// projected (or passed through for `*`).
    pub fn select<'a>(&'a self, projection: &str, tables: &str) -> DbResult<RecordStream<'a>> {
        self.query(projection, tables, None, None)
    }

    /// `select` with a predicate over the joined records.
    pub fn select_where<'a>(
        &'a self,
        projection: &str,
        tables: &str,
        predicate: &str,
    ) -> DbResult<RecordStream<'a>> {
        self.query(projection, tables, Some(predicate), None)
    }

    /// Grouped aggregation without a predicate.
    pub fn select_group_by<'a>(
        &'a self,
        projection: &str,
        tables: &str,
        grouping: &str,
    ) -> DbResult<RecordStream<'a>> {
        self.query(projection, tables, None, Some(grouping))
    }

    /// Grouped aggregation over the records satisfying the predicate.
    pub fn select_where_group_by<'a>(
        &'a self,
        projection: &str,
        tables: &str,
        predicate: &str,
        grouping: &str,
    ) -> DbResult<RecordStream<'a>> {
        self.query(projection, tables, Some(predicate), Some(grouping))
    }

    fn query<'a>(
        &'a self,
        projection: &str,
        tables: &str,
        predicate: Option<&str>,
        grouping: Option<&str>,
    ) -> DbResult<RecordStream<'a>> {
        let projections = split_trimmed(projection, ",");
        let table_names = split_trimmed(tables, NATURAL_JOIN);
        let grouping = grouping.map(|g| split_trimmed(g, ","));
        Ok(self
            .compile(&projections, &table_names, predicate, grouping)?
            .stream())
    }

    /// Assembles the operator tree: scans and joins, then the optional
    /// selection, then aggregation, passthrough, or projection depending on
    /// the projection list.
    fn compile<'a>(
        &'a self,
        projections: &[String],
        table_names: &[String],
        predicate: Option<&str>,
        grouping: Option<Vec<String>>,
    ) -> DbResult<Box<dyn Operator<'a> + 'a>> {
        let mut names = table_names.iter();
        let first = names.next().ok_or_else(|| DbError::parsing("empty table list"))?;
        let mut operator: Box<dyn Operator<'a> + 'a> = Box::new(Scan::new(self.named_table(first)?));
        for name in names {
            operator = Box::new(NaturalJoin::new(operator, self.named_table(name)?));
        }
        if let Some(predicate) = predicate {
            operator = Box::new(Selection::new(operator, predicate)?);
        }

        if let Some(grouping) = grouping {
            return Ok(Box::new(Aggregation::new(
                operator,
                grouping,
                aggregation_descriptions(projections),
            )?));
        }
        if has_aggregate_functions(projections) {
            return Ok(Box::new(Aggregation::new(
                operator,
                vec![],
                aggregation_descriptions(projections),
            )?));
        }
        if projections.len() == 1 && projections[0] == "*" {
            return Ok(operator);
        }
        Ok(Box::new(Projection::new(
            operator,
            attribute_definitions(projections)?,
        )?))
    }

    fn named_table(&self, name: &str) -> DbResult<&Table> {
        self.tables.get(name).ok_or_else(|| DbError::UnknownTable {
            name: name.to_string(),
        })
    }
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{", self.name)?;
        for (i, (name, table)) in self.tables.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, table)?;
        }
        write!(f, "}}")
    }
}

/// Fluent schema construction for a freshly created table.
pub struct SchemaBuilder<'a> {
    table: &'a mut Table,
    schema: Schema,
}

impl SchemaBuilder<'_> {
    /// Appends an attribute to the schema under construction.
    pub fn attribute(mut self, name: &str) -> DbResult<Self> {
        self.schema.attribute(name)?;
        self.table.set_schema(self.schema.clone());
        Ok(self)
    }

    /// Sets the primary key; every key attribute must exist.
    pub fn key(mut self, names: &[&str]) -> DbResult<Self> {
        self.schema.key(names)?;
        self.table.set_schema(self.schema.clone());
        Ok(self)
    }
}

fn split_trimmed(input: &str, separator: &str) -> Vec<String> {
    input
        .split(separator)
        .map(|fragment| fragment.trim().to_string())
        .collect()
}

/// True when any projection fragment mentions an aggregate function, found
/// by the substring `func(`.
fn has_aggregate_functions(projections: &[String]) -> bool {
    projections.iter().any(|fragment| {
        AggregateFunction::ALL
            .iter()
            .any(|f| fragment.contains(&format!("{}(", f.name())))
    })
}

/// Pairs each `description as name` projection fragment with its output
/// name, keeping the first two ` as `-separated tokens and dropping any
/// further ones. Fragments without the separator are skipped; grouping
/// attributes listed alongside aggregates fall out here, and malformed
/// descriptions are tolerated the same way.
fn aggregation_descriptions(projections: &[String]) -> Vec<(String, String)> {
    projections
        .iter()
        .filter_map(|fragment| {
            let mut tokens = fragment.split(AS);
            match (tokens.next(), tokens.next()) {
                (Some(description), Some(name)) => {
                    Some((description.trim().to_string(), name.trim().to_string()))
                }
                _ => None,
            }
        })
        .collect()
}

/// Parses each projection fragment into an output name and an arithmetic
/// expression: exactly `expression as name`, or a bare expression named by
/// the fragment itself. A fragment with repeated ` as ` separators falls
/// through to the bare case and fails to parse as an expression.
fn attribute_definitions(projections: &[String]) -> DbResult<Vec<(String, Expression)>> {
    projections
        .iter()
        .map(|fragment| {
            let tokens: Vec<&str> = fragment.split(AS).collect();
            if tokens.len() == 2 {
                Ok((
                    tokens[1].trim().to_string(),
                    Expression::arithmetic(tokens[0])?,
                ))
            } else {
                Ok((fragment.clone(), Expression::arithmetic(fragment)?))
            }
        })
        .collect()
}
