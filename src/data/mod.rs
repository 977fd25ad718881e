/// Data layer: the uploaded table and how it is parsed.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  ordered columns, rectangular rows of CellValue
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
