//! Prize timeline generation
//!
//! Built once per session from the player's record. Each row is laid out so
//! that the ball, once aligned, lands on logical column 0:
//! - won rows hold the prize at column 0 (the ball collects it)
//! - near-miss rows hold the prize at the midpoint (the ball just misses it)
//! - plain rows hold gaps at column 0 and the midpoint
//! - the terminal row holds a spike at column 0 (the session ends there)

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_NEAR_MISS_UNITS;
use crate::error::{PlinkoError, Result};
use crate::prize::PrizeHistory;
use crate::wrap_index;

/// Logical column every row is aligned to put under the ball
pub const TARGET_COLUMN: usize = 0;
/// Rows kept after the last win (the terminal row and what follows it)
const MIN_TAIL_ROWS: usize = 3;

/// Contents of one prize-row slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    Spike,
    Gap,
    /// Index into the prize history
    Prize(usize),
}

/// One horizontal band of slots, in logical order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeRow {
    pub slots: Vec<Slot>,
}

impl PrizeRow {
    pub fn spikes(columns: usize) -> Self {
        Self {
            slots: vec![Slot::Spike; columns],
        }
    }

    fn with(columns: usize, first: Slot, middle: Slot) -> Self {
        let mut row = Self::spikes(columns);
        row.slots[0] = first;
        row.slots[Self::midpoint(columns)] = middle;
        row
    }

    /// Prize under the ball, a safe gap at the midpoint
    pub fn won(columns: usize, prize: usize) -> Self {
        Self::with(columns, Slot::Prize(prize), Slot::Gap)
    }

    /// Safe gap under the ball, prize at the midpoint
    pub fn near_miss(columns: usize, prize: usize) -> Self {
        Self::with(columns, Slot::Gap, Slot::Prize(prize))
    }

    pub fn plain(columns: usize) -> Self {
        Self::with(columns, Slot::Gap, Slot::Gap)
    }

    /// Spikes everywhere except one gap away from column 0
    pub fn terminal(columns: usize, gap_column: usize) -> Self {
        let mut row = Self::spikes(columns);
        row.slots[gap_column] = Slot::Gap;
        row
    }

    #[inline]
    pub fn midpoint(columns: usize) -> usize {
        columns / 2
    }

    pub fn columns(&self) -> usize {
        self.slots.len()
    }

    /// Slot at a (wrapping) logical column
    pub fn slot(&self, column: usize) -> Slot {
        self.slots[column % self.slots.len()]
    }

    /// Holds a prize at column 0
    pub fn is_won(&self) -> bool {
        matches!(self.slots.first(), Some(Slot::Prize(_)))
    }

    pub fn has_prize(&self) -> bool {
        self.slots.iter().any(|s| matches!(s, Slot::Prize(_)))
    }

    /// Physical layout for an alignment offset: column `j` shows logical slot `j + offset`
    pub fn rotated(&self, offset: usize) -> Self {
        let mut slots = self.slots.clone();
        slots.rotate_left(offset % self.slots.len());
        Self { slots }
    }
}

/// Rows needed so that surviving them (2 safe columns of `columns` each)
/// is about as likely as the rarest prize
pub fn min_timeline_len(columns: usize, lowest_odds: Option<f64>) -> usize {
    let base = columns as f64 / 2.0;
    match lowest_odds {
        Some(p) if p > 0.0 && p < 1.0 && base > 1.0 => {
            (1.0 + (1.0 / p).ln() / base.ln()).ceil() as usize
        }
        _ => 1,
    }
}

/// Ordered prize rows for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizeTimeline {
    columns: usize,
    rows: Vec<PrizeRow>,
    terminal_row_index: usize,
    /// Value of one unit of each prize, by prize index
    prize_sizes: Vec<f64>,
}

impl PrizeTimeline {
    /// Build the timeline from the player's record
    pub fn generate<R: Rng>(history: &PrizeHistory, columns: usize, rng: &mut R) -> Result<Self> {
        if columns < 2 {
            return Err(PlinkoError::InvalidColumnCount { columns });
        }

        let mut rows = Vec::new();
        for (index, prize) in history.prizes.iter().enumerate() {
            for _ in 0..prize.historical_win_count {
                rows.push(PrizeRow::won(columns, index));
            }
            if let Some(odds) = prize.sampling_odds() {
                for _ in 0..prize.unwon_units().min(MAX_NEAR_MISS_UNITS) {
                    if rng.random::<f64>() < odds {
                        rows.push(PrizeRow::near_miss(columns, index));
                    }
                }
            }
        }

        let min_len = min_timeline_len(columns, history.lowest_win_odds());
        while rows.len() < min_len {
            rows.push(PrizeRow::plain(columns));
        }

        rows.shuffle(rng);

        // Anchor the ending on the last win, falling back to the last near-miss
        let anchor = rows
            .iter()
            .rposition(PrizeRow::is_won)
            .or_else(|| rows.iter().rposition(PrizeRow::has_prize));
        let terminal_row_index = anchor.map_or(0, |i| i + 1);

        while rows.len() < terminal_row_index + MIN_TAIL_ROWS {
            rows.push(PrizeRow::plain(columns));
        }

        let gap_column = rng.random_range(1..columns);
        rows[terminal_row_index] = PrizeRow::terminal(columns, gap_column);
        for row in rows.iter_mut().skip(terminal_row_index + 1) {
            *row = PrizeRow::plain(columns);
        }

        let timeline = Self {
            columns,
            rows,
            terminal_row_index,
            prize_sizes: history.prizes.iter().map(|p| p.size).collect(),
        };
        log::debug!(
            "Generated timeline: {} rows ({} won, {} near-miss), terminal row {}",
            timeline.len(),
            timeline.rows.iter().filter(|r| r.is_won()).count(),
            timeline.rows.iter().filter(|r| r.has_prize() && !r.is_won()).count(),
            terminal_row_index
        );
        Ok(timeline)
    }

    /// Assemble a timeline from prebuilt rows
    pub fn from_rows(rows: Vec<PrizeRow>, terminal_row_index: usize, prize_sizes: Vec<f64>) -> Result<Self> {
        let columns = rows.first().map_or(0, PrizeRow::columns);
        if columns < 2 {
            return Err(PlinkoError::InvalidColumnCount { columns });
        }
        if terminal_row_index >= rows.len() || rows.iter().any(|r| r.columns() != columns) {
            return Err(PlinkoError::InvalidConfig("malformed prize timeline"));
        }
        Ok(Self {
            columns,
            rows,
            terminal_row_index,
            prize_sizes,
        })
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Value of one unit of a prize (zero for an unknown index)
    pub fn prize_size(&self, prize: usize) -> f64 {
        self.prize_sizes.get(prize).copied().unwrap_or(0.0)
    }

    pub fn rows(&self) -> &[PrizeRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&PrizeRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn terminal_row_index(&self) -> usize {
        self.terminal_row_index
    }

    /// Slot the ball lands in for a raw arrival column and alignment offset
    pub fn landed_slot(&self, index: usize, raw_column: usize, offset: usize) -> Option<Slot> {
        let column = wrap_index((raw_column + offset) as i64, self.columns);
        self.row(index).map(|row| row.slot(column))
    }
}
