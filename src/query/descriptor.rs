//! Structured SELECT descriptors.
//!
//! A `QueryDescriptor` is assembled once through `DescriptorBuilder` and is
//! immutable afterwards. Rendering turns it into SQL text plus positional bind
//! parameters; caller-supplied values never reach the SQL text.

use crate::models::{ProfileColumn, QueryParam, SqlDialect, Statement, TableName};
use serde::Serialize;
use std::fmt::Write as _;

/// Left-hand side of a condition or an ordering term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Column(ProfileColumn),
    /// `fulltime_count + internship_count`; NULL when either counter is NULL.
    TotalExperience,
}

impl Expr {
    fn render(&self) -> String {
        match self {
            Self::Column(col) => col.as_str().to_string(),
            Self::TotalExperience => format!(
                "({} + {})",
                ProfileColumn::FulltimeCount,
                ProfileColumn::InternshipCount
            ),
        }
    }
}

impl From<ProfileColumn> for Expr {
    fn from(col: ProfileColumn) -> Self {
        Self::Column(col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Strict equality (case-sensitive for strings).
    Eq,
    Gte,
    /// Case-insensitive substring match.
    Contains,
}

/// One `(expression, operator, value)` fragment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub expr: Expr,
    pub op: Operator,
    pub value: QueryParam,
}

impl Condition {
    pub fn new(expr: impl Into<Expr>, op: Operator, value: impl Into<QueryParam>) -> Self {
        Self {
            expr: expr.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(expr: impl Into<Expr>, value: impl Into<QueryParam>) -> Self {
        Self::new(expr, Operator::Eq, value)
    }

    pub fn gte(expr: impl Into<Expr>, value: impl Into<QueryParam>) -> Self {
        Self::new(expr, Operator::Gte, value)
    }

    pub fn contains(expr: impl Into<Expr>, value: impl Into<QueryParam>) -> Self {
        Self::new(expr, Operator::Contains, value)
    }
}

/// A WHERE-clause entry. Entries are joined with AND.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Match(Condition),
    /// Satisfied when any condition holds.
    AnyOf(Vec<Condition>),
}

impl From<Condition> for Predicate {
    fn from(c: Condition) -> Self {
        Self::Match(c)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTerm {
    pub expr: Expr,
    pub direction: Direction,
}

impl OrderTerm {
    pub fn asc(expr: impl Into<Expr>) -> Self {
        Self {
            expr: expr.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(expr: impl Into<Expr>) -> Self {
        Self {
            expr: expr.into(),
            direction: Direction::Desc,
        }
    }
}

/// Intermediate representation of a bounded SELECT against the profile table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryDescriptor {
    /// Empty selects every column.
    columns: Vec<ProfileColumn>,
    predicates: Vec<Predicate>,
    order_by: Vec<OrderTerm>,
    limit: u32,
}

impl QueryDescriptor {
    /// Start a descriptor selecting `columns`; an empty slice selects all.
    pub fn select(columns: &[ProfileColumn]) -> DescriptorBuilder {
        DescriptorBuilder {
            columns: columns.to_vec(),
            predicates: Vec::new(),
            order_by: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[ProfileColumn] {
        &self.columns
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn order_by(&self) -> &[OrderTerm] {
        &self.order_by
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Render to a parameterized statement for `dialect`.
    pub fn render(&self, table: &TableName, dialect: SqlDialect) -> Statement {
        let mut sql = String::from("SELECT ");
        if self.columns.is_empty() {
            sql.push('*');
        } else {
            let cols: Vec<&str> = self.columns.iter().map(ProfileColumn::as_str).collect();
            sql.push_str(&cols.join(", "));
        }
        let _ = write!(sql, " FROM {}", table.qualified());

        let mut params = Vec::new();
        if !self.predicates.is_empty() {
            let clauses: Vec<String> = self
                .predicates
                .iter()
                .map(|p| match p {
                    Predicate::Match(c) => render_condition(c, dialect, &mut params),
                    Predicate::AnyOf(conds) => {
                        let parts: Vec<String> = conds
                            .iter()
                            .map(|c| render_condition(c, dialect, &mut params))
                            .collect();
                        format!("({})", parts.join(" OR "))
                    }
                })
                .collect();
            let _ = write!(sql, " WHERE {}", clauses.join(" AND "));
        }

        if !self.order_by.is_empty() {
            let terms: Vec<String> = self
                .order_by
                .iter()
                .map(|t| {
                    let dir = match t.direction {
                        Direction::Asc => "ASC",
                        Direction::Desc => "DESC",
                    };
                    format!("{} {} NULLS LAST", t.expr.render(), dir)
                })
                .collect();
            let _ = write!(sql, " ORDER BY {}", terms.join(", "));
        }

        let _ = write!(sql, " LIMIT {}", self.limit);
        Statement { sql, params }
    }
}

fn render_condition(c: &Condition, dialect: SqlDialect, params: &mut Vec<QueryParam>) -> String {
    let lhs = c.expr.render();
    match c.op {
        Operator::Eq => {
            params.push(c.value.clone());
            format!("{} = {}", lhs, dialect.placeholder(params.len()))
        }
        Operator::Gte => {
            params.push(c.value.clone());
            format!("{} >= {}", lhs, dialect.placeholder(params.len()))
        }
        Operator::Contains => {
            let pattern = match &c.value {
                QueryParam::Text(s) => QueryParam::Text(format!("%{}%", escape_like(s))),
                other => other.clone(),
            };
            params.push(pattern);
            format!(
                "{} {} {} ESCAPE '\\'",
                lhs,
                dialect.like_operator(),
                dialect.placeholder(params.len())
            )
        }
    }
}

/// Escape LIKE wildcards so the value matches literally.
pub fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Consuming builder for `QueryDescriptor`.
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    columns: Vec<ProfileColumn>,
    predicates: Vec<Predicate>,
    order_by: Vec<OrderTerm>,
}

impl DescriptorBuilder {
    pub fn filter(mut self, predicate: impl Into<Predicate>) -> Self {
        self.predicates.push(predicate.into());
        self
    }

    /// Append the predicate produced by `f` only when `value` is present.
    pub fn filter_if<T, P>(self, value: Option<T>, f: impl FnOnce(T) -> P) -> Self
    where
        P: Into<Predicate>,
    {
        match value {
            Some(v) => self.filter(f(v)),
            None => self,
        }
    }

    pub fn order(mut self, term: OrderTerm) -> Self {
        self.order_by.push(term);
        self
    }

    /// Finish with a row cap.
    pub fn limit(self, limit: u32) -> QueryDescriptor {
        QueryDescriptor {
            columns: self.columns,
            predicates: self.predicates,
            order_by: self.order_by,
            limit,
        }
    }
}
