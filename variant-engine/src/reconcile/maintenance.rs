//! Cross-product maintenance of associated-SKU references
//!
//! Scans and rewrites that touch the option tables of every product:
//! references missing from the cost database, and part renames.

use std::collections::HashSet;

use shared::{Amount, CostDatabase, PriceValue, ProductRecord};

use crate::catalog::associated;
use crate::store::{CostDbError, ProductStore, StoreError};

/// An associated-SKU reference the cost database cannot price
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingLink {
    pub base_sku: String,
    pub option_name: String,
    pub option_value: String,
    /// Part number, or the SKU when the reference has none
    pub part: String,
    /// Cost currently stored on the reference
    pub old_cost: String,
}

/// Decoded products in store order; undecodable ones are logged and skipped
fn records(store: &ProductStore) -> impl Iterator<Item = (String, ProductRecord)> + '_ {
    store.keys().into_iter().filter_map(|key| match store.get(&key) {
        Ok(Some(record)) => Some((key, record)),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(base_sku = %key, error = %e, "Skipping undecodable product");
            None
        }
    })
}

/// Every reference whose part (or SKU) is not in the cost database
pub fn missing_links(store: &ProductStore, db: &CostDatabase) -> Vec<MissingLink> {
    let mut links = Vec::new();
    for (key, record) in records(store) {
        for row in record.master_df.rows() {
            for item in associated::parse(&row.associated) {
                let part = item.lookup_key();
                if !part.is_empty() && !db.contains(part) {
                    links.push(MissingLink {
                        base_sku: key.clone(),
                        option_name: row.name.clone(),
                        option_value: row.value.clone(),
                        part: part.to_string(),
                        old_cost: item.cost.clone(),
                    });
                }
            }
        }
    }
    links
}

/// Add missing parts back to the cost database at their stored cost;
/// returns how many were added
pub fn reimport_missing(db: &mut CostDatabase, links: &[MissingLink]) -> usize {
    let mut added = 0;
    for link in links {
        if !link.part.is_empty() && !db.contains(&link.part) {
            db.insert(link.part.clone(), PriceValue::parse(&link.old_cost));
            added += 1;
        }
    }
    added
}

/// Drop references to `parts` from every option of every product
///
/// A row that loses references gets its cost recomputed from what is left
/// (`0` when nothing is). Returns the products that changed; the store is
/// not saved.
pub fn remove_missing(store: &mut ProductStore, parts: &HashSet<String>) -> Result<Vec<String>, StoreError> {
    let mut affected = Vec::new();
    let updates: Vec<(String, ProductRecord)> = records(store).collect();
    for (key, mut record) in updates {
        let mut changed = false;
        for row in record.master_df.rows_mut() {
            let items = associated::parse(&row.associated);
            let kept: Vec<_> = items
                .iter()
                .filter(|item| !parts.contains(item.lookup_key()))
                .cloned()
                .collect();
            if kept.len() == items.len() {
                continue;
            }
            changed = true;
            if kept.is_empty() {
                row.associated = String::new();
                row.cost = Amount::zero();
            } else {
                row.associated = associated::format(&kept);
                row.cost = Amount::from_decimal(associated::total_cost(&kept));
            }
        }
        if changed {
            store.put(&key, &record)?;
            affected.push(key);
        }
    }
    tracing::info!(parts = parts.len(), products = affected.len(), "Removed missing references");
    Ok(affected)
}

/// Rename `old` to `new` in the cost database and in every reference
/// (both the SKU and the part-number field). Returns the products that
/// changed; nothing is saved.
pub fn rename_part(
    store: &mut ProductStore,
    db: &mut CostDatabase,
    old: &str,
    new: &str,
) -> Result<Vec<String>, CostDbError> {
    let new = new.trim();
    if new.is_empty() {
        return Err(CostDbError::EmptyPartNumber);
    }
    if !db.contains(old) {
        return Err(CostDbError::PartNotFound(old.to_string()));
    }
    if old == new {
        return Ok(Vec::new());
    }
    if db.contains(new) {
        return Err(CostDbError::PartExists(new.to_string()));
    }
    db.rename(old, new);

    let mut affected = Vec::new();
    let updates: Vec<(String, ProductRecord)> = records(store).collect();
    for (key, mut record) in updates {
        let mut changed = false;
        for row in record.master_df.rows_mut() {
            let mut items = associated::parse(&row.associated);
            let mut row_changed = false;
            for item in &mut items {
                if item.sku == old {
                    item.sku = new.to_string();
                    row_changed = true;
                }
                if item.part_number == old {
                    item.part_number = new.to_string();
                    row_changed = true;
                }
            }
            if row_changed {
                row.associated = associated::format(&items);
                changed = true;
            }
        }
        if changed {
            store.put(&key, &record)?;
            affected.push(key);
        }
    }
    tracing::info!(old, new, products = affected.len(), "Renamed part number");
    Ok(affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreOptions;
    use parking_lot::Mutex;
    use shared::{OptionMasterTable, OptionRow};
    use std::sync::Arc;

    fn store_with(products: &[(&str, &str)]) -> ProductStore {
        let mut store = ProductStore::empty("unused.json", StoreOptions::default(), Arc::new(Mutex::new(())));
        for (key, associated) in products {
            let mut row = OptionRow::new("Kit", "Full");
            row.associated = associated.to_string();
            row.cost = Amount::from_decimal(associated::total_cost(&associated::parse(associated)));
            let record = ProductRecord {
                master_df: OptionMasterTable::new(vec![row]),
                ..ProductRecord::default()
            };
            store.put(key, &record).unwrap();
        }
        store
    }

    fn db(parts: &[&str]) -> CostDatabase {
        parts
            .iter()
            .map(|p| (p.to_string(), PriceValue::parse("1")))
            .collect()
    }

    #[test]
    fn test_missing_links() {
        let store = store_with(&[("A", "S1:2:P1, S2:3"), ("B", "S3:4")]);
        let links = missing_links(&store, &db(&["P1", "S3"]));
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].base_sku, "A");
        assert_eq!(links[0].part, "S2");
        assert_eq!(links[0].old_cost, "3");
        assert_eq!(links[0].option_name, "Kit");
    }

    #[test]
    fn test_reimport_missing() {
        let store = store_with(&[("A", "S1:2:P1, S2:3, S2:3")]);
        let mut prices = db(&[]);
        let links = missing_links(&store, &prices);
        assert_eq!(reimport_missing(&mut prices, &links), 2);
        assert_eq!(prices.cost_text("S2").as_deref(), Some("3.0"));
        assert_eq!(prices.cost_text("P1").as_deref(), Some("2.0"));
    }

    #[test]
    fn test_remove_missing() {
        let mut store = store_with(&[("A", "S1:2:P1, S2:3"), ("B", "S2:3"), ("C", "S9:1")]);
        let parts: HashSet<String> = ["S2".to_string()].into_iter().collect();
        let affected = remove_missing(&mut store, &parts).unwrap();
        assert_eq!(affected, vec!["A", "B"]);

        let a = store.require("A").unwrap();
        assert_eq!(a.master_df.rows()[0].associated, "S1:2:P1");
        assert_eq!(a.master_df.rows()[0].cost.as_str(), "2");
        let b = store.require("B").unwrap();
        assert_eq!(b.master_df.rows()[0].associated, "");
        assert_eq!(b.master_df.rows()[0].cost.as_str(), "0");
    }

    #[test]
    fn test_rename_part() {
        let mut store = store_with(&[("A", "P1:2, S1:2:P1"), ("B", "S2:1")]);
        let mut prices = db(&["P1", "S2"]);

        let affected = rename_part(&mut store, &mut prices, "P1", "P1-NEW").unwrap();
        assert_eq!(affected, vec!["A"]);
        assert!(prices.contains("P1-NEW") && !prices.contains("P1"));
        let a = store.require("A").unwrap();
        assert_eq!(a.master_df.rows()[0].associated, "P1-NEW:2, S1:2:P1-NEW");

        assert!(matches!(
            rename_part(&mut store, &mut prices, "S2", "P1-NEW"),
            Err(CostDbError::PartExists(_))
        ));
        assert!(matches!(
            rename_part(&mut store, &mut prices, "GONE", "X"),
            Err(CostDbError::PartNotFound(_))
        ));
        assert!(matches!(
            rename_part(&mut store, &mut prices, "S2", " "),
            Err(CostDbError::EmptyPartNumber)
        ));
    }
}
