//! Franc to euro conversion of a built parameter tree.

use crate::tree::{RootNode, ValueNode};
use crate::value::{DecodedValue, Number, Unit};
use chrono::NaiveDate;

/// Francs per euro
pub const FRANCS_PER_EURO: f64 = 6.55957;

/// Old francs per new franc, for amounts dated before the 1960 reform
const OLD_FRANCS_PER_FRANC: f64 = 100.0;

fn new_franc_date() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1960, 1, 1)
}

/// Euro value of an amount in francs, rounded to the cent.
///
/// Amounts that took effect before 1960 are in old francs.
///
/// ```
/// use baremes_core::francs_to_euros;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(1998, 1, 1).unwrap();
/// assert_eq!(francs_to_euros(100.0, date), 15.24);
/// ```
pub fn francs_to_euros(amount: f64, start_date: NaiveDate) -> f64 {
    let mut rate = FRANCS_PER_EURO;
    if new_franc_date().is_some_and(|reform| start_date < reform) {
        rate *= OLD_FRANCS_PER_FRANC;
    }
    (amount / rate * 100.0).round() / 100.0
}

/// Copy of the tree with every franc amount converted to euros.
pub fn convert_francs(root: &RootNode) -> RootNode {
    let mut converted = root.clone();
    let leaves = converted
        .sheets
        .iter_mut()
        .flat_map(|sheet| &mut sheet.variables)
        .flat_map(|variable| &mut variable.values);
    for leaf in leaves {
        convert_leaf(leaf);
    }
    converted
}

fn convert_leaf(leaf: &mut ValueNode) {
    if leaf.unit != Some(Unit::Frf) {
        return;
    }
    if let DecodedValue::Number(amount) = leaf.value {
        let euros = francs_to_euros(amount.as_f64(), leaf.start_date);
        leaf.value = DecodedValue::Number(Number::Float(euros));
        leaf.unit = Some(Unit::Eur);
    }
}
