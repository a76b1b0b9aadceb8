//! Query structures
//!
//! A `find` is a predicate list plus an optional sort. An aggregation is a
//! [`Pipeline`] of match, group, sort and lookup stages evaluated in order.

use serde_json::Value;

/// Filter operation types
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    /// Equality: field = value
    Eq(Value),
    /// Greater than or equal: field >= value
    Gte(Value),
    /// Greater than: field > value
    Gt(Value),
    /// Less than or equal: field <= value
    Lte(Value),
    /// Less than: field < value
    Lt(Value),
}

impl FilterOp {
    /// Returns the operator name as spelled in a query document
    pub fn op_name(&self) -> &'static str {
        match self {
            FilterOp::Eq(_) => "$eq",
            FilterOp::Gte(_) => "$gte",
            FilterOp::Gt(_) => "$gt",
            FilterOp::Lte(_) => "$lte",
            FilterOp::Lt(_) => "$lt",
        }
    }
}

/// A single predicate (field path + operation)
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Field path, dotted for nested fields (e.g. "address.city")
    pub field: String,
    pub op: FilterOp,
}

impl Predicate {
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Eq(value),
        }
    }

    pub fn gte(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Gte(value),
        }
    }

    pub fn gt(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Gt(value),
        }
    }

    pub fn lte(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Lte(value),
        }
    }

    pub fn lt(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Lt(value),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Sort specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Per-group accumulator
#[derive(Debug, Clone, PartialEq)]
pub enum Accumulator {
    /// Number of documents in the group
    Count,
    /// Sum of a numeric field; non-numeric values are ignored
    Sum(String),
    /// Arithmetic mean of a numeric field; null when no value is numeric
    Avg(String),
}

/// Groups documents by the value of a field.
///
/// Output rows are `{"_id": <key>, <name>: <accumulated>, ...}`. Documents
/// missing the key field group under `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSpec {
    pub key: String,
    pub accumulators: Vec<(String, Accumulator)>,
}

impl GroupSpec {
    pub fn by(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            accumulators: Vec::new(),
        }
    }

    pub fn accumulate(mut self, name: impl Into<String>, acc: Accumulator) -> Self {
        self.accumulators.push((name.into(), acc));
        self
    }
}

/// Left outer join against another collection.
///
/// Every input document gains an array field `as_field` holding the documents
/// of `from` whose `foreign_field` equals the input's `local_field`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupSpec {
    pub from: String,
    pub local_field: String,
    pub foreign_field: String,
    pub as_field: String,
}

impl LookupSpec {
    pub fn new(
        from: impl Into<String>,
        local_field: impl Into<String>,
        foreign_field: impl Into<String>,
        as_field: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            local_field: local_field.into(),
            foreign_field: foreign_field.into(),
            as_field: as_field.into(),
        }
    }
}

/// One aggregation stage
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(Vec<Predicate>),
    Group(GroupSpec),
    Sort(SortSpec),
    Lookup(LookupSpec),
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Match(_) => "$match",
            Stage::Group(_) => "$group",
            Stage::Sort(_) => "$sort",
            Stage::Lookup(_) => "$lookup",
        }
    }
}

/// Ordered list of aggregation stages
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pipeline {
    pub stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    pub fn with_match(mut self, predicates: Vec<Predicate>) -> Self {
        self.stages.push(Stage::Match(predicates));
        self
    }

    pub fn with_group(mut self, group: GroupSpec) -> Self {
        self.stages.push(Stage::Group(group));
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.stages.push(Stage::Sort(sort));
        self
    }

    pub fn with_lookup(mut self, lookup: LookupSpec) -> Self {
        self.stages.push(Stage::Lookup(lookup));
        self
    }

    /// Collections other than the source that the pipeline reads
    pub fn foreign_collections(&self) -> Vec<&str> {
        self.stages
            .iter()
            .filter_map(|stage| match stage {
                Stage::Lookup(lookup) => Some(lookup.from.as_str()),
                _ => None,
            })
            .collect()
    }
}
