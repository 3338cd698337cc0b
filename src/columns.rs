use ratatui::layout::{Constraint, Rect};
use smallvec::SmallVec;

/// Width layout for the data grid's columns.
pub trait GridColumns {
    /// Returns one constraint per column for the given area.
    fn constraints_for_area(&self, area: Rect, count: usize) -> SmallVec<[Constraint; 8]>;
}

/// Splits the width evenly between all columns.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformColumns;

impl GridColumns for UniformColumns {
    fn constraints_for_area(&self, _area: Rect, count: usize) -> SmallVec<[Constraint; 8]> {
        (0..count).map(|_| Constraint::Fill(1)).collect()
    }
}

/// Caller-supplied constraints; columns beyond the list share the remaining space.
#[derive(Clone, Debug, Default)]
pub struct FixedColumns {
    constraints: SmallVec<[Constraint; 8]>,
}

impl FixedColumns {
    pub fn new(constraints: impl IntoIterator<Item = Constraint>) -> Self {
        Self {
            constraints: constraints.into_iter().collect(),
        }
    }
}

impl GridColumns for FixedColumns {
    fn constraints_for_area(&self, _area: Rect, count: usize) -> SmallVec<[Constraint; 8]> {
        (0..count)
            .map(|idx| {
                self.constraints
                    .get(idx)
                    .copied()
                    .unwrap_or(Constraint::Fill(1))
            })
            .collect()
    }
}

/// Width constraints for a column in adaptive layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnWidth {
    pub min: u16,
    /// Width reached before any column grows toward `max`.
    pub ideal: u16,
    pub max: u16,
}

impl ColumnWidth {
    pub const fn new(min: u16, ideal: u16, max: u16) -> Self {
        Self { min, ideal, max }
    }

    /// Creates a fixed width (min = ideal = max).
    pub const fn fixed(width: u16) -> Self {
        Self::new(width, width, width)
    }
}

/// Distributes `total` width across columns respecting `min`/`ideal`/`max`.
///
/// Every column first gets `min`; leftover space grows columns toward `ideal`
/// left to right, then toward `max`. If `total` is outside `sum(min)..=sum(max)`
/// the result is clamped, so it may not add up to `total`.
pub fn distribute_widths(total: u16, columns: &[ColumnWidth]) -> SmallVec<[u16; 8]> {
    let mut widths: SmallVec<[u16; 8]> = columns.iter().map(|col| col.min).collect();
    let min_sum = widths.iter().fold(0u16, |acc, w| acc.saturating_add(*w));
    let mut remaining = total.saturating_sub(min_sum);

    let targets: [fn(&ColumnWidth) -> u16; 2] = [|col| col.ideal.max(col.min), |col| col.max];
    for target in targets {
        for (width, col) in widths.iter_mut().zip(columns) {
            if remaining == 0 {
                return widths;
            }
            let add = target(col).saturating_sub(*width).min(remaining);
            *width += add;
            remaining -= add;
        }
    }
    widths
}

/// Fits columns into the available width with [`distribute_widths`].
#[derive(Clone, Debug, Default)]
pub struct AdaptiveColumns {
    widths: SmallVec<[ColumnWidth; 8]>,
}

impl AdaptiveColumns {
    pub fn new(widths: impl IntoIterator<Item = ColumnWidth>) -> Self {
        Self {
            widths: widths.into_iter().collect(),
        }
    }
}

impl GridColumns for AdaptiveColumns {
    fn constraints_for_area(&self, area: Rect, count: usize) -> SmallVec<[Constraint; 8]> {
        let mut widths: SmallVec<[ColumnWidth; 8]> =
            self.widths.iter().copied().take(count).collect();
        // Unconfigured columns only get space once configured ones are at max.
        widths.resize(count, ColumnWidth::new(0, 0, u16::MAX));
        distribute_widths(area.width, &widths)
            .into_iter()
            .map(Constraint::Length)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distribute_widths_respects_min_ideal_max() {
        let columns = [ColumnWidth::new(4, 6, 8), ColumnWidth::new(4, 4, 6)];

        let widths = distribute_widths(12, &columns);

        assert_eq!(widths.as_slice(), &[8, 4]);
    }

    #[test]
    fn distribute_widths_clamps_when_too_narrow() {
        let columns = [ColumnWidth::fixed(5), ColumnWidth::new(3, 4, 6)];

        assert_eq!(distribute_widths(4, &columns).as_slice(), &[5, 3]);
    }

    #[test]
    fn adaptive_columns_sum_to_area_width() {
        let layout = AdaptiveColumns::new([
            ColumnWidth::new(6, 8, 10),
            ColumnWidth::new(4, 6, 8),
            ColumnWidth::new(4, 6, 8),
        ]);

        let constraints = layout.constraints_for_area(Rect::new(0, 0, 20, 1), 3);

        let total: u16 = constraints
            .iter()
            .map(|c| match c {
                Constraint::Length(len) => *len,
                _ => 0,
            })
            .sum();
        assert_eq!(total, 20);
    }

    #[test]
    fn fixed_columns_pad_missing_entries() {
        let layout = FixedColumns::new([Constraint::Length(10)]);

        let constraints = layout.constraints_for_area(Rect::new(0, 0, 40, 1), 3);

        assert_eq!(
            constraints.as_slice(),
            &[
                Constraint::Length(10),
                Constraint::Fill(1),
                Constraint::Fill(1)
            ]
        );
    }
}
