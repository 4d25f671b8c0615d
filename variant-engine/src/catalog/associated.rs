//! Associated-SKU field codec
//!
//! The field is a comma-separated list of `sku:cost:partnumber`,
//! `sku:cost` or bare `sku` segments. Parsing never fails: malformed
//! segments degrade to a default cost.

use rust_decimal::Decimal;
use shared::AssociatedSku;
use shared::models::amount::parse_decimal;

/// Cost given to a segment without one
pub const DEFAULT_COST: &str = "0";

pub fn parse(text: &str) -> Vec<AssociatedSku> {
    parse_with_default(text, DEFAULT_COST)
}

pub fn parse_with_default(text: &str, default_cost: &str) -> Vec<AssociatedSku> {
    text.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let fields: Vec<&str> = segment.split(':').map(str::trim).collect();
            match fields.as_slice() {
                [sku, cost, part] => AssociatedSku::new(*sku, *cost, *part),
                [sku, cost] => AssociatedSku::new(*sku, *cost, ""),
                _ => AssociatedSku::new(fields[0], default_cost.trim(), ""),
            }
        })
        .collect()
}

pub fn format(items: &[AssociatedSku]) -> String {
    items
        .iter()
        .map(|item| {
            if item.part_number.is_empty() {
                format!("{}:{}", item.sku, item.cost)
            } else {
                format!("{}:{}:{}", item.sku, item.cost, item.part_number)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Sum of segment costs; blank or non-numeric costs count as 0
pub fn total_cost(items: &[AssociatedSku]) -> Decimal {
    items
        .iter()
        .filter_map(|item| parse_decimal(&item.cost))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_segment_shapes() {
        let items = parse(" A:1.5:P-1 ,B:2,, C ,D:1:2:3");
        assert_eq!(
            items,
            vec![
                AssociatedSku::new("A", "1.5", "P-1"),
                AssociatedSku::new("B", "2", ""),
                AssociatedSku::new("C", "0", ""),
                AssociatedSku::new("D", "0", ""),
            ]
        );
    }

    #[test]
    fn test_parse_custom_default() {
        assert_eq!(parse_with_default("X", "3")[0].cost, "3");
    }

    #[test]
    fn test_format_then_parse_is_identity() {
        let items = vec![
            AssociatedSku::new("A", "1.5", "P-1"),
            AssociatedSku::new("B", "2", ""),
        ];
        let text = format(&items);
        assert_eq!(text, "A:1.5:P-1, B:2");
        assert_eq!(parse(&text), items);
    }

    #[test]
    fn test_empty_field() {
        assert!(parse("").is_empty());
        assert!(parse(" , ,").is_empty());
        assert_eq!(format(&[]), "");
    }

    #[test]
    fn test_total_cost_ignores_non_numeric() {
        let items = parse("A:1.25, B:call, C:, D:2");
        assert_eq!(total_cost(&items), Decimal::from_str("3.25").unwrap());
    }
}
