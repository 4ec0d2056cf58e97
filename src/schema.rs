//! Table schemas: ordered attribute names plus an optional primary key.

use crate::error::{DbError, DbResult};
use std::fmt;

/// An ordered mapping from attribute name to positional index, together with
/// the list of attribute names that form the primary key (possibly empty).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    attributes: Vec<String>,
    key: Vec<String>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the output schema of a natural join: every attribute of
    /// `left`, then every attribute of `right` not already present,
    /// preserving order on both sides.
    pub fn join(left: &Schema, right: &Schema) -> Schema {
        let mut schema = Schema::new();
        for name in &left.attributes {
            schema.attributes.push(name.clone());
        }
        for name in &right.attributes {
            if !schema.contains(name) {
                schema.attributes.push(name.clone());
            }
        }
        schema
    }

    /// Appends an attribute.
    pub fn attribute(&mut self, name: &str) -> DbResult<&mut Self> {
        if self.contains(name) {
            return Err(DbError::DuplicateAttribute {
                name: name.to_string(),
            });
        }
        self.attributes.push(name.to_string());
        Ok(self)
    }

    /// Sets the primary key. Every key attribute must already exist.
    pub fn key(&mut self, names: &[&str]) -> DbResult<&mut Self> {
        for name in names {
            if !self.contains(name) {
                return Err(DbError::UnboundVariable {
                    name: name.to_string(),
                });
            }
        }
        self.key = names.iter().map(|n| n.to_string()).collect();
        Ok(self)
    }

    pub fn size(&self) -> usize {
        self.attributes.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a == name)
    }

    /// The positional index of an attribute, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a == name)
    }

    /// Attribute names in positional order.
    pub fn attribute_names(&self) -> &[String] {
        &self.attributes
    }

    /// The primary-key attribute names, in key order.
    pub fn key_names(&self) -> &[String] {
        &self.key
    }

    /// The ordered intersection of this schema's attribute names with
    /// another's (this schema's order wins).
    pub fn common_attributes(&self, other: &Schema) -> Vec<String> {
        self.attributes
            .iter()
            .filter(|a| other.contains(a))
            .cloned()
            .collect()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{attributes=[")?;
        for (i, name) in self.attributes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", name)?;
        }
        write!(f, "], key={:?}}}", self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_indices_follow_insertion_order() -> DbResult<()> {
        let mut schema = Schema::new();
        schema.attribute("projectName")?.attribute("budget")?;
        assert_eq!(schema.size(), 2);
        assert_eq!(schema.index_of("projectName"), Some(0));
        assert_eq!(schema.index_of("budget"), Some(1));
        assert_eq!(schema.index_of("missing"), None);
        Ok(())
    }

    #[test]
    fn test_duplicate_attribute_rejected() -> DbResult<()> {
        let mut schema = Schema::new();
        schema.attribute("budget")?;
        assert_eq!(
            schema.attribute("budget"),
            Err(DbError::DuplicateAttribute {
                name: "budget".to_string()
            })
        );
        Ok(())
    }

    #[test]
    fn test_key_must_name_existing_attributes() -> DbResult<()> {
        let mut schema = Schema::new();
        schema.attribute("projectName")?.attribute("budget")?;
        schema.key(&["projectName"])?;
        assert_eq!(schema.key_names(), ["projectName"]);
        assert!(schema.key(&["nope"]).is_err());
        Ok(())
    }

    #[test]
    fn test_join_schema_order() -> DbResult<()> {
        let mut employees = Schema::new();
        employees
            .attribute("employeeNumber")?
            .attribute("zipCode")?
            .attribute("projectName")?;
        let mut projects = Schema::new();
        projects.attribute("projectName")?.attribute("budget")?;

        let joined = Schema::join(&employees, &projects);
        assert_eq!(
            joined.attribute_names(),
            ["employeeNumber", "zipCode", "projectName", "budget"]
        );
        assert_eq!(
            employees.common_attributes(&projects),
            ["projectName".to_string()]
        );
        Ok(())
    }
}
