//! Grid layout.
//!
//! Fields and groups are laid out on a grid of at most twelve columns. A
//! form, group or array declares how many columns its children flow into;
//! every field declares how many of those columns it spans.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// The widest grid a container can declare.
pub const MAX_COLUMNS: u8 = 12;

/// A column count or column span in `1..=12`.
///
/// Anything else (zero, thirteen, fractions, text that is not a number,
/// nothing at all) resolves to a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Columns(u8);

impl Columns {
    /// A single column.
    pub const ONE: Self = Self(1);

    /// Resolves an integer column count.
    pub fn new(count: i64) -> Self {
        match u8::try_from(count) {
            Ok(n) if (1..=MAX_COLUMNS).contains(&n) => Self(n),
            _ => Self::ONE,
        }
    }

    /// Resolves a loosely typed column count, as found in form descriptions.
    ///
    /// Integral numbers and numeric strings are accepted.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Self::new(i),
                (None, Some(f)) if f.fract() == 0.0 && f.abs() <= f64::from(MAX_COLUMNS) => {
                    Self::new(f as i64)
                }
                _ => Self::ONE,
            },
            Some(Value::String(s)) => s.trim().parse::<i64>().map_or(Self::ONE, Self::new),
            _ => Self::ONE,
        }
    }

    /// Returns the column count.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Returns the responsive grid class for a container with this many columns.
    pub fn grid_class(self) -> &'static str {
        match self.0 {
            2 => "md:grid-cols-2",
            3 => "md:grid-cols-3",
            4 => "md:grid-cols-4",
            5 => "md:grid-cols-5",
            6 => "md:grid-cols-6",
            7 => "md:grid-cols-7",
            8 => "md:grid-cols-8",
            9 => "md:grid-cols-9",
            10 => "md:grid-cols-10",
            11 => "md:grid-cols-11",
            12 => "md:grid-cols-12",
            _ => "md:grid-cols-1",
        }
    }

    /// Returns the `grid-column` style value for a cell spanning this many columns.
    pub fn span_style(self) -> String {
        format!("span {}", self.0)
    }
}

impl Default for Columns {
    fn default() -> Self {
        Self::ONE
    }
}

impl From<u8> for Columns {
    fn from(count: u8) -> Self {
        Self::new(i64::from(count))
    }
}

impl Serialize for Columns {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for Columns {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(Some(&value)))
    }
}

/// Where a cell lands on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Zero-based row.
    pub row: usize,
    /// Zero-based starting column.
    pub column: usize,
    /// Number of columns covered.
    pub span: u8,
}

/// Places cells row by row on a grid of `cols` columns.
///
/// A span wider than the grid is narrowed to the grid. A cell that does not
/// fit in what is left of the current row starts a new row.
pub fn place(spans: impl IntoIterator<Item = Columns>, cols: Columns) -> Vec<Placement> {
    let width = usize::from(cols.get());
    let mut placements = Vec::new();
    let mut row = 0;
    let mut column = 0;

    for span in spans {
        let span = span.get().min(cols.get());
        let span_width = usize::from(span);
        if column + span_width > width {
            row += 1;
            column = 0;
        }
        placements.push(Placement { row, column, span });
        column += span_width;
        if column == width {
            row += 1;
            column = 0;
        }
    }

    placements
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_out_of_range_resolves_to_one() {
        assert_eq!(Columns::new(0), Columns::ONE);
        assert_eq!(Columns::new(13), Columns::ONE);
        assert_eq!(Columns::new(-4), Columns::ONE);
        assert_eq!(Columns::new(12).get(), 12);
    }

    #[test]
    fn test_from_value() {
        assert_eq!(Columns::from_value(Some(&json!(3))).get(), 3);
        assert_eq!(Columns::from_value(Some(&json!("4"))).get(), 4);
        assert_eq!(Columns::from_value(Some(&json!(3.0))).get(), 3);
        assert_eq!(Columns::from_value(Some(&json!(2.5))), Columns::ONE);
        assert_eq!(Columns::from_value(Some(&json!("wide"))), Columns::ONE);
        assert_eq!(Columns::from_value(Some(&json!(null))), Columns::ONE);
        assert_eq!(Columns::from_value(None), Columns::ONE);
    }

    #[test]
    fn test_grid_class() {
        assert_eq!(Columns::new(1).grid_class(), "md:grid-cols-1");
        assert_eq!(Columns::new(3).grid_class(), "md:grid-cols-3");
        assert_eq!(Columns::new(12).grid_class(), "md:grid-cols-12");
        assert_eq!(Columns::new(13).grid_class(), "md:grid-cols-1");
        assert_eq!(Columns::new(2).span_style(), "span 2");
    }

    #[test]
    fn test_deserialize_loose_values() {
        let cols: Columns = serde_json::from_value(json!("0")).unwrap();
        assert_eq!(cols, Columns::ONE);
        let cols: Columns = serde_json::from_value(json!(6)).unwrap();
        assert_eq!(cols.get(), 6);
    }

    #[test]
    fn test_place_wraps_rows() {
        let spans = [3, 3, 1, 1, 1].map(|n| Columns::new(n));
        let placements = place(spans, Columns::new(3));
        assert_eq!(
            placements,
            vec![
                Placement { row: 0, column: 0, span: 3 },
                Placement { row: 1, column: 0, span: 3 },
                Placement { row: 2, column: 0, span: 1 },
                Placement { row: 2, column: 1, span: 1 },
                Placement { row: 2, column: 2, span: 1 },
            ]
        );
    }

    #[test]
    fn test_place_clamps_wide_span() {
        let placements = place([Columns::new(1), Columns::new(5)], Columns::new(2));
        assert_eq!(placements[0], Placement { row: 0, column: 0, span: 1 });
        assert_eq!(placements[1], Placement { row: 1, column: 0, span: 2 });
    }
}
