// Row Patterns - Boolean step cells with loop length and subdivision
// A row always spans exactly `base_length` beats, whatever its resolution

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PatternError {
    #[error("Invalid base length: {0} beats (expected 4, 8, 16, 32 or 64)")]
    InvalidBaseLength(f64),
    #[error("Invalid subdivision: {0} (expected 0.25, 0.5, 1, 2 or 4)")]
    InvalidSubdivision(f64),
}

pub type PatternResult<T> = Result<T, PatternError>;

/// Number of beats one full cycle of a row spans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum BaseLength {
    Four,
    Eight,
    Sixteen,
    ThirtyTwo,
    SixtyFour,
}

impl BaseLength {
    pub const ALL: [BaseLength; 5] = [
        BaseLength::Four,
        BaseLength::Eight,
        BaseLength::Sixteen,
        BaseLength::ThirtyTwo,
        BaseLength::SixtyFour,
    ];

    /// Get the cycle length in beats
    pub fn beats(&self) -> f64 {
        match self {
            BaseLength::Four => 4.0,
            BaseLength::Eight => 8.0,
            BaseLength::Sixteen => 16.0,
            BaseLength::ThirtyTwo => 32.0,
            BaseLength::SixtyFour => 64.0,
        }
    }
}

impl Default for BaseLength {
    fn default() -> Self {
        BaseLength::Sixteen
    }
}

impl TryFrom<f64> for BaseLength {
    type Error = PatternError;

    fn try_from(value: f64) -> PatternResult<Self> {
        BaseLength::ALL
            .iter()
            .copied()
            .find(|b| b.beats() == value)
            .ok_or(PatternError::InvalidBaseLength(value))
    }
}

impl From<BaseLength> for f64 {
    fn from(value: BaseLength) -> f64 {
        value.beats()
    }
}

/// Cell resolution multiplier applied to the base length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum Subdivision {
    Quarter,
    Half,
    Whole,
    Double,
    Quadruple,
}

impl Subdivision {
    pub const ALL: [Subdivision; 5] = [
        Subdivision::Quarter,
        Subdivision::Half,
        Subdivision::Whole,
        Subdivision::Double,
        Subdivision::Quadruple,
    ];

    /// Get the multiplier value
    pub fn factor(&self) -> f64 {
        match self {
            Subdivision::Quarter => 0.25,
            Subdivision::Half => 0.5,
            Subdivision::Whole => 1.0,
            Subdivision::Double => 2.0,
            Subdivision::Quadruple => 4.0,
        }
    }
}

impl Default for Subdivision {
    fn default() -> Self {
        Subdivision::Whole
    }
}

impl TryFrom<f64> for Subdivision {
    type Error = PatternError;

    fn try_from(value: f64) -> PatternResult<Self> {
        Subdivision::ALL
            .iter()
            .copied()
            .find(|s| s.factor() == value)
            .ok_or(PatternError::InvalidSubdivision(value))
    }
}

impl From<Subdivision> for f64 {
    fn from(value: Subdivision) -> f64 {
        value.factor()
    }
}

/// Number of cells a row holds for a given base length and subdivision.
/// Never zero: the smallest combination is 4 beats at 0.25.
pub fn cell_count_for(base_length: BaseLength, subdivision: Subdivision) -> usize {
    (base_length.beats() * subdivision.factor()).round() as usize
}

/// Resize a cell array, repeating or dropping cells so the cyclic shape is kept.
/// New cell `i` takes old cell `floor(i / new_count * old_count)`.
pub fn resize_cells(cells: &[bool], new_count: usize) -> Vec<bool> {
    if cells.is_empty() {
        return vec![false; new_count];
    }

    let old_count = cells.len();
    (0..new_count)
        .map(|i| cells[(i * old_count / new_count).min(old_count - 1)])
        .collect()
}

/// One programmable row: ordered boolean cells plus its timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowPattern {
    /// Step cells in playback order
    #[serde(default)]
    pub cells: Vec<bool>,

    /// Beats spanned by one full cycle of the row
    #[serde(default)]
    pub base_length: BaseLength,

    /// Resolution multiplier
    #[serde(default)]
    pub subdivision: Subdivision,
}

impl Default for RowPattern {
    fn default() -> Self {
        RowPattern::new(BaseLength::default(), Subdivision::default())
    }
}

impl RowPattern {
    /// Create an empty (all-off) row
    pub fn new(base_length: BaseLength, subdivision: Subdivision) -> Self {
        RowPattern {
            cells: vec![false; cell_count_for(base_length, subdivision)],
            base_length,
            subdivision,
        }
    }

    /// Create a row from existing cells, resizing them to fit the configuration
    pub fn from_cells(cells: Vec<bool>, base_length: BaseLength, subdivision: Subdivision) -> Self {
        let mut row = RowPattern {
            cells,
            base_length,
            subdivision,
        };
        row.normalize();
        row
    }

    /// Expected number of cells for the current configuration
    pub fn cell_count(&self) -> usize {
        cell_count_for(self.base_length, self.subdivision)
    }

    /// Cycle length in beats
    pub fn cycle_beats(&self) -> f64 {
        self.base_length.beats()
    }

    /// Duration of one cell in beats
    pub fn beats_per_cell(&self) -> f64 {
        self.cycle_beats() / self.cell_count() as f64
    }

    /// Number of hit cells in one cycle
    pub fn hits(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    pub fn is_hit(&self, index: usize) -> bool {
        self.cells.get(index).copied().unwrap_or(false)
    }

    /// Set a single cell. Out-of-range indices are ignored.
    pub fn set_cell(&mut self, index: usize, value: bool) {
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = value;
        }
    }

    /// Flip a single cell. Out-of-range indices are ignored.
    pub fn toggle_cell(&mut self, index: usize) {
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = !*cell;
        }
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = false);
    }

    /// Change the cycle length, resizing the cells
    pub fn set_base_length(&mut self, base_length: BaseLength) {
        self.base_length = base_length;
        self.normalize();
    }

    /// Change the subdivision, resizing the cells
    pub fn set_subdivision(&mut self, subdivision: Subdivision) {
        self.subdivision = subdivision;
        self.normalize();
    }

    /// Make the cell array match `cell_count()`.
    /// Returns true if the cells had to be resized.
    pub fn normalize(&mut self) -> bool {
        let expected = self.cell_count();
        if self.cells.len() == expected {
            return false;
        }
        self.cells = resize_cells(&self.cells, expected);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_count() {
        assert_eq!(cell_count_for(BaseLength::Sixteen, Subdivision::Whole), 16);
        assert_eq!(cell_count_for(BaseLength::Four, Subdivision::Quarter), 1);
        assert_eq!(cell_count_for(BaseLength::SixtyFour, Subdivision::Quadruple), 256);
        assert_eq!(cell_count_for(BaseLength::Eight, Subdivision::Half), 4);
    }

    #[test]
    fn test_base_length_conversion() {
        assert_eq!(BaseLength::try_from(32.0), Ok(BaseLength::ThirtyTwo));
        assert!(BaseLength::try_from(0.0).is_err());
        assert!(BaseLength::try_from(12.0).is_err());
    }

    #[test]
    fn test_subdivision_conversion() {
        assert_eq!(Subdivision::try_from(0.25), Ok(Subdivision::Quarter));
        assert!(Subdivision::try_from(3.0).is_err());
    }

    #[test]
    fn test_resize_round_trip() {
        let mut row = RowPattern::new(BaseLength::Sixteen, Subdivision::Whole);
        for i in [0, 3, 5, 6, 11, 15] {
            row.set_cell(i, true);
        }
        let original = row.cells.clone();

        row.set_subdivision(Subdivision::Double);
        assert_eq!(row.cells.len(), 32);
        row.set_subdivision(Subdivision::Whole);
        assert_eq!(row.cells, original);

        row.set_base_length(BaseLength::ThirtyTwo);
        row.set_base_length(BaseLength::Sixteen);
        assert_eq!(row.cells, original);
    }

    #[test]
    fn test_resize_repeats_cells() {
        let cells = vec![true, false, false, true];
        assert_eq!(
            resize_cells(&cells, 8),
            vec![true, true, false, false, false, false, true, true]
        );
        assert_eq!(resize_cells(&cells, 2), vec![true, false]);
    }

    #[test]
    fn test_resize_empty() {
        assert_eq!(resize_cells(&[], 4), vec![false; 4]);
    }

    #[test]
    fn test_from_cells_normalizes() {
        let row = RowPattern::from_cells(vec![true, false], BaseLength::Four, Subdivision::Whole);
        assert_eq!(row.cells, vec![true, true, false, false]);
    }

    #[test]
    fn test_toggle_cell_out_of_range() {
        let mut row = RowPattern::new(BaseLength::Four, Subdivision::Whole);
        row.toggle_cell(2);
        row.toggle_cell(99);
        assert_eq!(row.hits(), 1);
        assert!(row.is_hit(2));
        assert!(!row.is_hit(99));
    }

    #[test]
    fn test_deserialize_invalid_base_length() {
        let json = r#"{"cells":[true],"base_length":0,"subdivision":1}"#;
        assert!(serde_json::from_str::<RowPattern>(json).is_err());
    }

    #[test]
    fn test_deserialize_defaults() {
        let row: RowPattern = serde_json::from_str("{}").unwrap();
        assert_eq!(row.base_length, BaseLength::Sixteen);
        assert_eq!(row.subdivision, Subdivision::Whole);
        assert!(row.cells.is_empty());
    }
}
