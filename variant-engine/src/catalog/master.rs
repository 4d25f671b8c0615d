//! Option master table operations
//!
//! Building the table from imported rows, syncing associated-SKU costs from
//! the cost database, and hand edits of a single option.

use shared::models::amount::parse_decimal;
use shared::{Amount, AssociatedSku, CostDatabase, InputRow, OptionMasterTable, OptionRow};

use super::{CatalogError, associated, option_blob};

/// One row per distinct (Name, Value), in first-seen order, with zero
/// cost/weight and no associated SKUs
pub fn from_input(rows: &[InputRow]) -> OptionMasterTable {
    let mut table = OptionMasterTable::default();
    for row in rows {
        for (name, value) in option_blob::parse_options(&row.options) {
            table.push_unique(OptionRow::new(name, value));
        }
    }
    table
}

// ========== Cost sync ==========

/// Refresh one row's associated costs from the cost database
///
/// A triple with a part number is priced by that part number; one without
/// is priced by its SKU; anything not in the database keeps its cost. When
/// a cost changes the field is rewritten and `Add'l Cost` becomes the sum.
/// Returns whether the row changed.
pub fn sync_row(row: &mut OptionRow, db: &CostDatabase) -> bool {
    let mut items = associated::parse(&row.associated);
    let mut changed = false;
    for item in &mut items {
        if let Some(cost) = db.cost_text(item.lookup_key())
            && cost != item.cost
        {
            item.cost = cost;
            changed = true;
        }
    }

    if changed {
        row.associated = associated::format(&items);
        row.cost = Amount::from_decimal(associated::total_cost(&items));
    }
    changed
}

/// Apply the cost database to every row; returns the changed row indices
pub fn apply_cost_database(table: &mut OptionMasterTable, db: &CostDatabase) -> Vec<usize> {
    table
        .rows_mut()
        .iter_mut()
        .enumerate()
        .filter_map(|(idx, row)| sync_row(row, db).then_some(idx))
        .collect()
}

// ========== Hand edits ==========

/// Fields to change on one option; `None` leaves a field as is
#[derive(Debug, Clone, Default)]
pub struct OptionEdit {
    pub cost: Option<String>,
    pub weight: Option<String>,
    /// New associated-SKU field; the cost is then recomputed from it
    pub associated: Option<String>,
}

fn amount_input(field: &'static str, raw: &str) -> Result<Amount, CatalogError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Amount::zero());
    }
    match parse_decimal(raw) {
        Some(_) => Ok(Amount::new(raw)),
        None => Err(CatalogError::InvalidOptionValue {
            field,
            value: raw.to_string(),
        }),
    }
}

/// Apply an edit to the (Name, Value) row
///
/// Blank cost or weight means `0`. An associated-SKU edit recomputes the
/// cost and takes precedence over a cost given in the same edit.
pub fn edit_option(
    table: &mut OptionMasterTable,
    name: &str,
    value: &str,
    edit: &OptionEdit,
) -> Result<(), CatalogError> {
    let cost = edit.cost.as_deref().map(|c| amount_input("Add'l Cost", c)).transpose()?;
    let weight = edit.weight.as_deref().map(|w| amount_input("Add'l Weight", w)).transpose()?;

    let row = table
        .find_mut(name.trim(), value.trim())
        .ok_or_else(|| CatalogError::OptionNotFound {
            name: name.to_string(),
            value: value.to_string(),
        })?;

    if let Some(cost) = cost {
        row.cost = cost;
    }
    if let Some(weight) = weight {
        row.weight = weight;
    }
    if let Some(text) = &edit.associated {
        let items = associated::parse(text);
        row.associated = text.trim().to_string();
        row.cost = Amount::from_decimal(associated::total_cost(&items));
    }
    tracing::debug!(name, value, cost = %row.cost, weight = %row.weight, "Option edited");
    Ok(())
}

/// Result of assigning associated SKUs from a plain list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentReport {
    /// SKUs priced from the cost database (prices will follow future syncs)
    pub mapped: Vec<String>,
    /// SKUs not in the cost database (cost `0`)
    pub missing: Vec<String>,
}

/// Replace the row's associated SKUs with `skus`, priced from the cost
/// database. An empty list clears the field and zeroes the cost.
pub fn assign_associated(
    table: &mut OptionMasterTable,
    name: &str,
    value: &str,
    skus: &[String],
    db: &CostDatabase,
) -> Result<AssignmentReport, CatalogError> {
    let row = table
        .find_mut(name.trim(), value.trim())
        .ok_or_else(|| CatalogError::OptionNotFound {
            name: name.to_string(),
            value: value.to_string(),
        })?;

    let mut report = AssignmentReport::default();
    let mut items = Vec::new();
    for sku in skus.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let cost = match db.cost_text(sku) {
            Some(cost) => {
                report.mapped.push(sku.to_string());
                cost
            }
            None => {
                report.missing.push(sku.to_string());
                associated::DEFAULT_COST.to_string()
            }
        };
        items.push(AssociatedSku::new(sku, cost, ""));
    }

    row.associated = associated::format(&items);
    row.cost = Amount::from_decimal(associated::total_cost(&items));
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::PriceValue;

    fn db(entries: &[(&str, &str)]) -> CostDatabase {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), PriceValue::parse(v)))
            .collect()
    }

    fn table_with(associated: &str) -> OptionMasterTable {
        let mut row = OptionRow::new("Kit", "Full");
        row.associated = associated.to_string();
        row.cost = Amount::new("3");
        OptionMasterTable::new(vec![row])
    }

    #[test]
    fn test_from_input_unique_first_seen() {
        let rows = vec![
            InputRow::new("A-1", "Name=Color|Value=Red|Name=Size|Value=L"),
            InputRow::new("A-2", "Name=Color|Value= Red |Name=Size|Value=S"),
            InputRow::new("A-3", "Name=Color|Value=Blue"),
        ];
        let table = from_input(&rows);
        let keys: Vec<(&str, &str)> = table.rows().iter().map(|r| (r.name.as_str(), r.value.as_str())).collect();
        assert_eq!(keys, [("Color", "Red"), ("Size", "L"), ("Size", "S"), ("Color", "Blue")]);
        assert_eq!(table.rows()[0].cost.as_str(), "0");
        assert_eq!(table.rows()[0].associated, "");
    }

    #[test]
    fn test_sync_prices_by_part_number_then_sku() {
        let mut table = table_with("S1:1:P1, S2:1, S3:4");
        let changed = apply_cost_database(&mut table, &db(&[("P1", "2.5"), ("S2", "3"), ("S1", "99")]));
        assert_eq!(changed, vec![0]);
        let row = &table.rows()[0];
        assert_eq!(row.associated, "S1:2.5:P1, S2:3.0, S3:4");
        assert_eq!(row.cost.as_str(), "9.5");
    }

    #[test]
    fn test_sync_is_idempotent() {
        let prices = db(&[("P1", "2.5")]);
        let mut table = table_with("S1:1:P1");
        assert_eq!(apply_cost_database(&mut table, &prices), vec![0]);
        let once = table.clone();
        assert!(apply_cost_database(&mut table, &prices).is_empty());
        assert_eq!(table, once);
    }

    #[test]
    fn test_sync_leaves_unmatched_rows_untouched() {
        let mut table = table_with("X:1");
        assert!(apply_cost_database(&mut table, &db(&[("Y", "5")])).is_empty());
        assert_eq!(table.rows()[0].cost.as_str(), "3");
    }

    #[test]
    fn test_edit_option() {
        let mut table = table_with("");
        edit_option(
            &mut table,
            "Kit",
            "Full",
            &OptionEdit {
                cost: Some("".into()),
                weight: Some("1.5".into()),
                associated: None,
            },
        )
        .unwrap();
        assert_eq!(table.rows()[0].cost.as_str(), "0");
        assert_eq!(table.rows()[0].weight.as_str(), "1.5");

        edit_option(
            &mut table,
            "Kit",
            "Full",
            &OptionEdit {
                cost: Some("100".into()),
                associated: Some("A:1, B:2.25:PB".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(table.rows()[0].cost.as_str(), "3.25");
    }

    #[test]
    fn test_edit_option_rejects_bad_input() {
        let mut table = table_with("");
        let err = edit_option(
            &mut table,
            "Kit",
            "Full",
            &OptionEdit {
                cost: Some("abc".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidOptionValue { .. }));

        let err = edit_option(&mut table, "Kit", "Half", &OptionEdit::default()).unwrap_err();
        assert!(matches!(err, CatalogError::OptionNotFound { .. }));
    }

    #[test]
    fn test_assign_associated() {
        let mut table = table_with("");
        let report = assign_associated(
            &mut table,
            "Kit",
            "Full",
            &["P1".to_string(), " ".to_string(), "P9".to_string(), "P2".to_string()],
            &db(&[("P1", "10"), ("P2", "call")]),
        )
        .unwrap();
        assert_eq!(report.mapped, vec!["P1", "P2"]);
        assert_eq!(report.missing, vec!["P9"]);
        assert_eq!(table.rows()[0].associated, "P1:10.0, P9:0, P2:call");
        assert_eq!(table.rows()[0].cost.as_str(), "10");
    }
}
