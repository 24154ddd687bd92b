/// Data layer: raw passenger tables and their loading.
///
/// Architecture:
/// ```text
///  train.csv / test.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse CSV → Vec<Passenger>
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ RawDataset │  train + test, row order = file order
///   └────────────┘
///        │
///        ▼
///   feature computations (crate::feature)
/// ```

pub mod loader;
pub mod model;
