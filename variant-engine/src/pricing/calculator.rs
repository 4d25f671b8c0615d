use rust_decimal::prelude::*;
use shared::OptionMasterTable;

/// Money and weight are kept to 2 decimal places
const DECIMAL_PLACES: u32 = 2;

// ==================== Conversion Helpers ====================

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Round to 2 decimal places, half away from zero
#[inline]
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round2(value).to_f64().unwrap_or_default()
}

// ==================== Option Sums ====================

/// Summed contribution of a variant's selected options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionTotals {
    pub cost: Decimal,
    pub weight: Decimal,
}

/// Sum `Add'l Cost` / `Add'l Weight` over the selected (Name, Value) pairs.
/// Pairs missing from the table and non-numeric amounts contribute 0.
pub fn option_totals<'a, I>(master: &OptionMasterTable, selections: I) -> OptionTotals
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    selections
        .into_iter()
        .filter_map(|(name, value)| master.find(name, value))
        .fold(OptionTotals::default(), |acc, row| OptionTotals {
            cost: acc.cost + row.cost.decimal_or_zero(),
            weight: acc.weight + row.weight.decimal_or_zero(),
        })
}

/// Final variant price and weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariantTotals {
    pub price: f64,
    pub weight: f64,
}

pub fn variant_totals(base_price: Decimal, base_weight: Decimal, options: OptionTotals) -> VariantTotals {
    VariantTotals {
        price: to_f64(base_price + options.cost),
        weight: to_f64(base_weight + options.weight),
    }
}

// ==================== Breakdown ====================

/// One line of a price breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownLine {
    /// Option name, or `BASE` / `TOTAL`
    pub label: String,
    pub value: String,
    pub cost: Decimal,
    pub weight: Decimal,
}

/// Base line, one line per matched selected option, then the rounded total
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBreakdown {
    pub lines: Vec<BreakdownLine>,
}

impl PriceBreakdown {
    pub fn total(&self) -> Option<&BreakdownLine> {
        self.lines.last()
    }
}

pub fn breakdown<'a, I>(
    master: &OptionMasterTable,
    base_price: Decimal,
    base_weight: Decimal,
    selections: I,
) -> PriceBreakdown
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut lines = vec![BreakdownLine {
        label: "BASE".to_string(),
        value: String::new(),
        cost: base_price,
        weight: base_weight,
    }];
    let mut total = OptionTotals {
        cost: base_price,
        weight: base_weight,
    };

    for (name, value) in selections {
        if value.is_empty() {
            continue;
        }
        let Some(row) = master.find(name, value) else {
            continue;
        };
        let cost = row.cost.decimal_or_zero();
        let weight = row.weight.decimal_or_zero();
        total.cost += cost;
        total.weight += weight;
        lines.push(BreakdownLine {
            label: name.to_string(),
            value: value.to_string(),
            cost,
            weight,
        });
    }

    lines.push(BreakdownLine {
        label: "TOTAL".to_string(),
        value: String::new(),
        cost: round2(total.cost),
        weight: round2(total.weight),
    });
    PriceBreakdown { lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Amount, OptionRow};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn master() -> OptionMasterTable {
        let mut color = OptionRow::new("Color", "Red");
        color.cost = Amount::new("5");
        color.weight = Amount::new("0.25");
        let mut size = OptionRow::new("Size", "L");
        size.cost = Amount::new("2.5");
        size.weight = Amount::new("n/a");
        OptionMasterTable::new(vec![color, size])
    }

    #[test]
    fn test_round2_half_away_from_zero() {
        assert_eq!(round2(dec("1.005")), dec("1.01"));
        assert_eq!(round2(dec("-1.005")), dec("-1.01"));
        assert_eq!(to_f64(dec("19.999")), 20.0);
    }

    #[test]
    fn test_unmatched_options_contribute_zero() {
        let totals = option_totals(&master(), [("Color", "Red"), ("Color", "Blue"), ("Finish", "Matte")]);
        assert_eq!(totals.cost, dec("5"));
        assert_eq!(totals.weight, dec("0.25"));
    }

    #[test]
    fn test_variant_totals() {
        let totals = option_totals(&master(), [("Color", "Red"), ("Size", "L")]);
        let v = variant_totals(dec("10"), dec("1"), totals);
        assert_eq!(v.price, 17.5);
        assert_eq!(v.weight, 1.25);
    }

    #[test]
    fn test_breakdown_lines() {
        let b = breakdown(&master(), dec("10"), dec("1"), [("Color", "Red"), ("Size", ""), ("Finish", "X")]);
        let labels: Vec<&str> = b.lines.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, ["BASE", "Color", "TOTAL"]);
        let total = b.total().unwrap();
        assert_eq!(total.cost, dec("15"));
        assert_eq!(total.weight, dec("1.25"));
    }
}
