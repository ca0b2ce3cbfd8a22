use crate::types::{Field, SqlValue};

/// A caller-supplied statement argument, bound either by name or by position.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// Bound to a `:name` placeholder.
    Named { name: String, value: SqlValue },
    /// Bound to the n-th positional placeholder, one-indexed.
    Ordinal { position: usize, value: SqlValue },
}

impl Argument {
    pub fn named(name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Argument::Named {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn ordinal(position: usize, value: impl Into<SqlValue>) -> Self {
        Argument::Ordinal {
            position,
            value: value.into(),
        }
    }

    /// Build ordinal arguments from a list of values, positions starting at 1.
    pub fn positional<I, V>(values: I) -> Vec<Argument>
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| Argument::ordinal(i + 1, v))
            .collect()
    }

    pub fn value(&self) -> &SqlValue {
        match self {
            Argument::Named { value, .. } | Argument::Ordinal { value, .. } => value,
        }
    }
}

/// A named statement parameter as sent to the remote service.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: SqlValue,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// The wire form of this parameter's value.
    pub fn field(&self) -> Field {
        Field::from(&self.value)
    }
}
