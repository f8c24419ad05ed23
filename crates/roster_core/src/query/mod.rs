//! Typed query building blocks.
//!
//! # Responsibility
//! - Express filters as structured predicate objects instead of query
//!   strings.
//! - Describe ordering and pagination independently of any table.
//!
//! # Invariants
//! - User input only ever reaches SQL as bound parameters.
//! - Every rendered ordering ends with an id tiebreak, so paging is stable.

pub mod example;
pub mod page;
pub mod sort;
pub mod spec;

pub use example::MemberExample;
pub use page::{Page, PageRequest, Slice, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use sort::{Direction, ItemField, MemberField, Sort, SortField, TeamField};
pub use spec::MemberSpec;
