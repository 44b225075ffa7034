use serde::{Deserialize, Serialize};

use crate::{config::TempoConfig, scheduler::BeatPosition, Result, TrainerError};

/// Rows above the staff row where the upcoming-beat marker is drawn.
pub const ABOVE_BEAT_ROW_OFFSET: u16 = 2;

/// A single terminal cell, zero-indexed from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellPos {
    pub row: u16,
    pub col: u16,
}

/// Immutable mapping from staff coordinates to terminal cells.
///
/// Every cell is computed once at construction. Replacing the geometry
/// (terminal resize, tempo change) means building a new value, so the
/// renderer never observes a partially updated layout.
///
/// One measure spans a separator column plus `spacing + 1` columns per
/// beat, with a trailing gap before the next separator:
///
/// ```text
/// |   *   *   *   *   |   *   *   *   *   |
/// ```
#[derive(Debug, Clone)]
pub struct StaffGeometry {
    beats_per_measure: u32,
    num_measures: u32,
    staff_row: u16,
    measure_width: u16,
    staff_width: u16,
    separators: Vec<CellPos>,
    beat_cells: Vec<CellPos>,
}

impl StaffGeometry {
    /// Builds the staff horizontally centred on `center`. Fails when the
    /// configuration is unusable or the staff does not fit around the
    /// midpoint.
    pub fn new(config: &TempoConfig, center: CellPos) -> Result<Self> {
        config.validate()?;

        let spacing = config.spacing as u64;
        let measure_width = (1 + spacing) * (config.beats_per_measure as u64 + 1);
        let staff_width = measure_width * config.num_measures as u64 + 1;

        let start_col = center.col as i64 - (staff_width / 2) as i64;
        if start_col < 0 {
            return Err(TrainerError::InvalidConfig(
                "staff is wider than the space left of its midpoint",
            ));
        }
        if start_col as u64 + staff_width > u16::MAX as u64 {
            return Err(TrainerError::InvalidConfig(
                "staff extends beyond addressable columns",
            ));
        }
        if center.row < ABOVE_BEAT_ROW_OFFSET {
            return Err(TrainerError::InvalidConfig(
                "staff row leaves no room for the above-beat markers",
            ));
        }

        let start_col = start_col as u64;
        let separators = (0..=config.num_measures as u64)
            .map(|separator| CellPos {
                row: center.row,
                col: (start_col + separator * measure_width) as u16,
            })
            .collect();

        let mut beat_cells = Vec::with_capacity(
            (config.num_measures * config.beats_per_measure) as usize,
        );
        for measure in 0..config.num_measures as u64 {
            let measure_start = start_col + measure * measure_width;
            for beat in 0..config.beats_per_measure as u64 {
                beat_cells.push(CellPos {
                    row: center.row,
                    col: (measure_start + (beat + 1) * (spacing + 1)) as u16,
                });
            }
        }

        Ok(Self {
            beats_per_measure: config.beats_per_measure,
            num_measures: config.num_measures,
            staff_row: center.row,
            measure_width: measure_width as u16,
            staff_width: staff_width as u16,
            separators,
            beat_cells,
        })
    }

    /// Measure separator cells, left to right: one more than there are
    /// measures, spaced by [`measure_width`].
    ///
    /// [`measure_width`]: StaffGeometry::measure_width
    pub fn measure_separators(&self) -> &[CellPos] {
        &self.separators
    }

    /// Cell of the given beat marker. Out-of-range indices are an error,
    /// never clamped.
    pub fn beat_cell(&self, position: BeatPosition) -> Result<CellPos> {
        if position.measure >= self.num_measures || position.beat >= self.beats_per_measure {
            return Err(TrainerError::OutOfRange {
                measure: position.measure,
                beat: position.beat,
            });
        }
        let index = (position.measure * self.beats_per_measure + position.beat) as usize;
        Ok(self.beat_cells[index])
    }

    /// Cell [`ABOVE_BEAT_ROW_OFFSET`] rows above the beat marker, used to
    /// preview a beat before it lands.
    pub fn above_beat_cell(&self, position: BeatPosition) -> Result<CellPos> {
        let cell = self.beat_cell(position)?;
        Ok(CellPos {
            row: cell.row - ABOVE_BEAT_ROW_OFFSET,
            col: cell.col,
        })
    }

    /// Every beat cell on the staff, in lexicographic position order.
    pub fn beat_cells(&self) -> &[CellPos] {
        &self.beat_cells
    }

    pub fn staff_row(&self) -> u16 {
        self.staff_row
    }

    pub fn measure_width(&self) -> u16 {
        self.measure_width
    }

    pub fn staff_width(&self) -> u16 {
        self.staff_width
    }
}
