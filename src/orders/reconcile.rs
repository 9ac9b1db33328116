//! Line-Item Reconciliation Planner
//!
//! Pure three-way diff between an order's current item set and a
//! caller-supplied target set. The planner only computes what has to
//! happen; applying the plan (ledger adjustments, persistence) is the
//! engine's job.

use std::collections::HashMap;

use crate::db::models::ItemRequest;

/// A line present on the order but absent from the request.
///
/// Carried lines are *retained* with their original quantity — omitting a
/// product from an update request does not remove it from the order. This
/// is long-standing behavior that callers depend on; deletion-by-omission
/// is deliberately not implemented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarriedLine {
    pub product: String,
    pub quantity: i64,
}

/// A line present in the request, either changing an existing line or
/// adding a new one (`previous == 0`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedLine {
    pub product: String,
    pub previous: i64,
    pub requested: i64,
}

impl ChangedLine {
    /// Net ledger effect for this line: `available -= delta`
    pub fn delta(&self) -> i64 {
        self.requested - self.previous
    }
}

/// Result of diffing current items against a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub carried: Vec<CarriedLine>,
    pub changed: Vec<ChangedLine>,
}

impl ReconcilePlan {
    /// Final item set after applying the plan (carried first, then changed)
    pub fn final_lines(&self) -> Vec<ItemRequest> {
        let mut lines: Vec<ItemRequest> = self
            .carried
            .iter()
            .map(|c| ItemRequest {
                product: c.product.clone(),
                quantity: c.quantity,
            })
            .collect();
        lines.extend(self.changed.iter().map(|c| ItemRequest {
            product: c.product.clone(),
            quantity: c.requested,
        }));
        lines
    }
}

/// Index a line list by product name, last entry winning for duplicates,
/// preserving first-occurrence order.
fn index_by_product(lines: &[ItemRequest]) -> (Vec<&str>, HashMap<&str, i64>) {
    let mut order: Vec<&str> = Vec::new();
    let mut by_name: HashMap<&str, i64> = HashMap::new();
    for line in lines {
        if !by_name.contains_key(line.product.as_str()) {
            order.push(line.product.as_str());
        }
        by_name.insert(line.product.as_str(), line.quantity);
    }
    (order, by_name)
}

/// Diff `current` against `requested`.
///
/// - Products in `current` missing from `requested` become carried lines.
/// - Every requested product becomes a changed line with its previous
///   quantity (0 for a new line).
///
/// Duplicate product names within either input collapse to one entry, the
/// last quantity winning.
pub fn plan(current: &[ItemRequest], requested: &[ItemRequest]) -> ReconcilePlan {
    let (current_order, current_by_name) = index_by_product(current);
    let (requested_order, requested_by_name) = index_by_product(requested);

    let carried = current_order
        .iter()
        .filter(|name| !requested_by_name.contains_key(*name))
        .map(|name| CarriedLine {
            product: name.to_string(),
            quantity: current_by_name[name],
        })
        .collect();

    let changed = requested_order
        .iter()
        .map(|name| ChangedLine {
            product: name.to_string(),
            previous: current_by_name.get(name).copied().unwrap_or(0),
            requested: requested_by_name[name],
        })
        .collect();

    ReconcilePlan { carried, changed }
}
