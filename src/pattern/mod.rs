// Pattern Model - Rows, row kinds and pattern bundles
// Everything the timing engine reads per pattern

pub mod data;
pub mod kinds;
pub mod row;

pub use data::{Instrument, PatternData};
pub use kinds::{PatternRows, RowKind};
pub use row::{
    cell_count_for, resize_cells, BaseLength, PatternError, PatternResult, RowPattern, Subdivision,
};
