/// Data layer: core types, loading, classification and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table (cached by path in `cache`)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ classify  │  Table → ColumnSpec per column (kind + domain)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  widget edits → FilterState (one predicate per column)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   view    │  AND of active predicates → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  describe() of the visible rows
///   └──────────┘
/// ```

pub mod cache;
pub mod classify;
pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
pub mod view;
