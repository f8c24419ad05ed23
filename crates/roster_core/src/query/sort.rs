//! Sort descriptors over typed entity fields.

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A field that can appear in an `ORDER BY` clause.
pub trait SortField: Copy + Eq {
    /// Qualified column expression for this field.
    fn column(self) -> &'static str;
    /// Field used as the final tiebreak.
    fn id() -> Self;
}

/// Sortable member fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberField {
    Id,
    Username,
    Age,
    /// Name of the referenced team; members without a team sort first.
    TeamName,
}

impl SortField for MemberField {
    fn column(self) -> &'static str {
        match self {
            Self::Id => "m.id",
            Self::Username => "m.username",
            Self::Age => "m.age",
            Self::TeamName => "t.name",
        }
    }

    fn id() -> Self {
        Self::Id
    }
}

/// Sortable team fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamField {
    Id,
    Name,
}

impl SortField for TeamField {
    fn column(self) -> &'static str {
        match self {
            Self::Id => "t.id",
            Self::Name => "t.name",
        }
    }

    fn id() -> Self {
        Self::Id
    }
}

/// Sortable item fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemField {
    Id,
    CreatedAt,
}

impl SortField for ItemField {
    fn column(self) -> &'static str {
        match self {
            Self::Id => "i.id",
            Self::CreatedAt => "i.created_at",
        }
    }

    fn id() -> Self {
        Self::Id
    }
}

/// One `field direction` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Order<F> {
    field: F,
    direction: Direction,
}

/// Ordered list of sort criteria. Empty means "by id ascending".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort<F> {
    orders: Vec<Order<F>>,
}

impl<F: SortField> Sort<F> {
    pub fn unsorted() -> Self {
        Self { orders: Vec::new() }
    }

    pub fn by(direction: Direction, field: F) -> Self {
        Self::unsorted().and(direction, field)
    }

    /// Appends a secondary criterion.
    pub fn and(mut self, direction: Direction, field: F) -> Self {
        self.orders.push(Order { field, direction });
        self
    }

    /// Renders ` ORDER BY ...` including the id tiebreak.
    pub(crate) fn order_by_clause(&self) -> String {
        let mut parts: Vec<String> = self
            .orders
            .iter()
            .map(|order| format!("{} {}", order.field.column(), order.direction.as_sql()))
            .collect();
        if !self.orders.iter().any(|order| order.field == F::id()) {
            parts.push(format!("{} ASC", F::id().column()));
        }
        format!(" ORDER BY {}", parts.join(", "))
    }
}

impl<F: SortField> Default for Sort<F> {
    fn default() -> Self {
        Self::unsorted()
    }
}
