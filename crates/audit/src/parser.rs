//! Bag/Lot extraction from composite identifier codes.
//!
//! Codes look like `Bag=ABC123,Lot=L-77,Qty=1`, but older sheets hold only the
//! bare bag id. The parser is total: anything it cannot read degrades to `None`.

use crate::model::CellValue;

pub const BAG_MARKER: &str = "Bag=";
pub const LOT_MARKER: &str = "Lot=";

/// Extract `(lot_id, bag_id)` from an identifier cell.
///
/// Non-text cells (blank, numeric, date) yield `(None, None)`.
pub fn parse_cell(cell: &CellValue) -> (Option<String>, Option<String>) {
    parse(cell.as_text())
}

/// Extract `(lot_id, bag_id)` from a raw identifier string.
///
/// Without a `Bag=` marker the whole string is the bag id. Without a `Lot=`
/// marker the lot id is `None`. When a marker repeats, the last one wins.
pub fn parse(raw: Option<&str>) -> (Option<String>, Option<String>) {
    let Some(raw) = raw else {
        return (None, None);
    };

    let bag_id = marker_value(raw, BAG_MARKER).unwrap_or(raw).to_string();
    let lot_id = marker_value(raw, LOT_MARKER).map(str::to_string);

    (lot_id, Some(bag_id))
}

/// Text after the last `marker`, up to the next comma.
fn marker_value<'a>(raw: &'a str, marker: &str) -> Option<&'a str> {
    let start = raw.rfind(marker)? + marker.len();
    let tail = &raw[start..];
    Some(tail.split(',').next().unwrap_or(tail))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(pair: (Option<&str>, Option<&str>)) -> (Option<String>, Option<String>) {
        (pair.0.map(String::from), pair.1.map(String::from))
    }

    #[test]
    fn null_input() {
        assert_eq!(parse(None), (None, None));
    }

    #[test]
    fn bag_and_lot() {
        assert_eq!(parse(Some("Bag=123,Lot=45")), owned((Some("45"), Some("123"))));
    }

    #[test]
    fn bag_only() {
        assert_eq!(parse(Some("Bag=123")), owned((None, Some("123"))));
    }

    #[test]
    fn plain_value_is_bag_id() {
        assert_eq!(parse(Some("plainvalue")), owned((None, Some("plainvalue"))));
    }

    #[test]
    fn lot_before_bag() {
        assert_eq!(parse(Some("Lot=9,Bag=7")), owned((Some("9"), Some("7"))));
    }

    #[test]
    fn lot_only_keeps_whole_string_as_bag() {
        assert_eq!(
            parse(Some("Lot=9,Qty=3")),
            owned((Some("9"), Some("Lot=9,Qty=3")))
        );
    }

    #[test]
    fn extra_fields_are_cut_at_comma() {
        assert_eq!(
            parse(Some("Qty=2,Bag=AB-1,Lot=L7,Wt=40")),
            owned((Some("L7"), Some("AB-1")))
        );
    }

    #[test]
    fn repeated_marker_uses_last() {
        assert_eq!(parse(Some("Bag=OLD,Bag=NEW")), owned((None, Some("NEW"))));
    }

    #[test]
    fn empty_marker_value() {
        assert_eq!(parse(Some("Bag=,Lot=")), owned((Some(""), Some(""))));
    }

    #[test]
    fn non_text_cells_yield_nothing() {
        assert_eq!(parse_cell(&CellValue::Number(12345.0)), (None, None));
        assert_eq!(parse_cell(&CellValue::Empty), (None, None));
        assert_eq!(parse_cell(&CellValue::Bool(true)), (None, None));
    }

    #[test]
    fn unicode_is_sliced_on_char_boundaries() {
        assert_eq!(parse(Some("Bag=Ünïcode,Lot=ß")), owned((Some("ß"), Some("Ünïcode"))));
    }
}
