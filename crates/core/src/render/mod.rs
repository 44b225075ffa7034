use crate::{scheduler::BeatPosition, staff::StaffGeometry, CellPos, Result};

const BEAT_GLYPH: char = '*';
const SEPARATOR_GLYPH: char = '|';

/// Visual emphasis for a drawn glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Plain,
    Bold,
}

/// Terminal surface contract consumed by the renderer.
///
/// Implementations address cells directly: `move_to` positions the cursor
/// and the draw/erase calls act at the cursor. Nothing here relies on
/// insert/delete character shifting, so any cell-addressed terminal
/// library can sit behind this trait, as can an in-memory fake for tests.
pub trait Surface {
    fn move_to(&mut self, cell: CellPos) -> Result<()>;
    fn draw_char(&mut self, glyph: char, style: Style) -> Result<()>;
    fn erase_char(&mut self) -> Result<()>;
    fn draw_text(&mut self, text: &str) -> Result<()>;
    /// Makes everything drawn so far visible.
    fn refresh(&mut self) -> Result<()>;
    /// Current size as (rows, cols).
    fn dimensions(&self) -> Result<(u16, u16)>;
}

/// Draws and erases staff glyphs at the cells provided by a
/// [`StaffGeometry`].
///
/// The renderer holds only the geometry; the surface is borrowed per call
/// so a single terminal can be shared with other drawing code.
#[derive(Debug, Clone)]
pub struct StaffRenderer {
    geometry: StaffGeometry,
}

impl StaffRenderer {
    pub fn new(geometry: StaffGeometry) -> Self {
        Self { geometry }
    }

    pub fn geometry(&self) -> &StaffGeometry {
        &self.geometry
    }

    pub fn draw_measure_separators(&self, surface: &mut impl Surface) -> Result<()> {
        for &cell in self.geometry.measure_separators() {
            surface.move_to(cell)?;
            surface.draw_char(SEPARATOR_GLYPH, Style::Bold)?;
        }
        surface.refresh()
    }

    pub fn erase_measure_separators(&self, surface: &mut impl Surface) -> Result<()> {
        for &cell in self.geometry.measure_separators() {
            surface.move_to(cell)?;
            surface.erase_char()?;
        }
        surface.refresh()
    }

    pub fn draw_beat(&self, surface: &mut impl Surface, position: BeatPosition) -> Result<()> {
        let cell = self.geometry.beat_cell(position)?;
        surface.move_to(cell)?;
        surface.draw_char(BEAT_GLYPH, Style::Bold)?;
        surface.refresh()
    }

    pub fn erase_beat(&self, surface: &mut impl Surface, position: BeatPosition) -> Result<()> {
        let cell = self.geometry.beat_cell(position)?;
        surface.move_to(cell)?;
        surface.erase_char()?;
        surface.refresh()
    }

    /// Previews `position` above the staff before its beat lands.
    pub fn draw_above_beat(
        &self,
        surface: &mut impl Surface,
        position: BeatPosition,
    ) -> Result<()> {
        let cell = self.geometry.above_beat_cell(position)?;
        surface.move_to(cell)?;
        surface.draw_char(BEAT_GLYPH, Style::Plain)?;
        surface.refresh()
    }

    pub fn erase_above_beat(
        &self,
        surface: &mut impl Surface,
        position: BeatPosition,
    ) -> Result<()> {
        let cell = self.geometry.above_beat_cell(position)?;
        surface.move_to(cell)?;
        surface.erase_char()?;
        surface.refresh()
    }

    pub fn erase_all_beats(&self, surface: &mut impl Surface) -> Result<()> {
        for &cell in self.geometry.beat_cells() {
            surface.move_to(cell)?;
            surface.erase_char()?;
        }
        surface.refresh()
    }
}
