use crate::data::model::CellValue;

pub const BANKRUPT: &str = "Bankrupt";
pub const NOT_BANKRUPT: &str = "Not Bankrupt";

/// Display label for a numeric prediction. Anything outside {0, 1} stays
/// unlabeled.
pub fn prediction_label(prediction: i64) -> Option<&'static str> {
    match prediction {
        1 => Some(BANKRUPT),
        0 => Some(NOT_BANKRUPT),
        _ => None,
    }
}

/// The label column cell for a prediction (`Null` when unlabeled).
pub fn label_cell(prediction: i64) -> CellValue {
    prediction_label(prediction)
        .map(|l| CellValue::String(l.to_string()))
        .unwrap_or(CellValue::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_domain_is_labeled() {
        assert_eq!(prediction_label(1), Some("Bankrupt"));
        assert_eq!(prediction_label(0), Some("Not Bankrupt"));
    }

    #[test]
    fn other_values_are_unlabeled() {
        for v in [-1, 2, 7, i64::MAX] {
            assert_eq!(prediction_label(v), None);
            assert_eq!(label_cell(v), CellValue::Null);
        }
    }
}
