//! Enumeration of the unit-level assignment universe.

use super::types::{Assignment, CarrierKey, FulfillmentInput, Item};
use std::collections::BTreeMap;

/// Every candidate (item, DC, carrier, unit) assignment of an instance plus
/// the lookups the model builder needs.
///
/// Indexes store positions into [`assignments`](Self::assignments).
#[derive(Debug, Clone)]
pub struct AssignmentUniverse<'a> {
    input: &'a FulfillmentInput,
    items: BTreeMap<&'a str, &'a Item>,
    assignments: Vec<Assignment>,
    carriers: Vec<CarrierKey>,
    by_item: BTreeMap<String, Vec<usize>>,
    by_dc_carrier: BTreeMap<String, BTreeMap<String, Vec<usize>>>,
}

impl<'a> AssignmentUniverse<'a> {
    /// Enumerates all assignments: for each item, each DC, each carrier the
    /// DC offers and each unit `1..=item.units()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_fulfill::fulfillment::{AssignmentUniverse, FulfillmentInput};
    ///
    /// let input: FulfillmentInput = serde_json::from_str(r#"{
    ///     "items": [{"item_id": "a", "quantity": 3, "volume": 2}],
    ///     "dcs": [{"dc_id": "dc1", "inventory": {"a": 5}, "handling_cost": 1}],
    ///     "carrier_capacities": {"dc1": {"ups": 100, "dhl": 50}},
    ///     "carrier_deliverycost": {"dc1": {"ups": 0.5, "dhl": 0.7}},
    ///     "carton_volume": 10
    /// }"#).unwrap();
    ///
    /// let universe = AssignmentUniverse::generate(&input);
    /// assert_eq!(universe.len(), 6);
    /// assert_eq!(universe.carriers().len(), 2);
    /// ```
    pub fn generate(input: &'a FulfillmentInput) -> Self {
        let items: BTreeMap<&str, &Item> = input
            .items
            .iter()
            .map(|item| (item.item_id.as_str(), item))
            .collect();

        let carriers: Vec<CarrierKey> = input
            .dcs
            .iter()
            .flat_map(|dc| {
                input
                    .carriers_at(&dc.dc_id)
                    .map(move |carrier| CarrierKey::new(&dc.dc_id, carrier))
            })
            .collect();

        let mut assignments = Vec::new();
        for item in &input.items {
            for dc in &input.dcs {
                for carrier in input.carriers_at(&dc.dc_id) {
                    assignments.extend((1..=item.units()).map(|quantity| Assignment {
                        item_id: item.item_id.clone(),
                        dc_id: dc.dc_id.clone(),
                        carrier: carrier.to_string(),
                        quantity,
                    }));
                }
            }
        }

        let mut by_item: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut by_dc_carrier: BTreeMap<String, BTreeMap<String, Vec<usize>>> = BTreeMap::new();
        for (idx, a) in assignments.iter().enumerate() {
            by_item.entry(a.item_id.clone()).or_default().push(idx);
            by_dc_carrier
                .entry(a.dc_id.clone())
                .or_default()
                .entry(a.carrier.clone())
                .or_default()
                .push(idx);
        }

        tracing::debug!(
            assignments = assignments.len(),
            carriers = carriers.len(),
            "generated assignment universe"
        );

        Self {
            input,
            items,
            assignments,
            carriers,
            by_item,
            by_dc_carrier,
        }
    }

    /// The instance the universe was generated from.
    pub fn input(&self) -> &'a FulfillmentInput {
        self.input
    }

    /// All assignments.
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Number of assignments.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Whether no assignment was generated.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Distinct (DC, carrier) pairs offered, in DC input order.
    pub fn carriers(&self) -> &[CarrierKey] {
        &self.carriers
    }

    /// The item an assignment refers to.
    pub fn item(&self, item_id: &str) -> Option<&'a Item> {
        self.items.get(item_id).copied()
    }

    /// Volume shipped if `assignment` is selected.
    pub fn volume(&self, assignment: &Assignment) -> f64 {
        self.item(&assignment.item_id)
            .map_or(0.0, |item| item.volume * f64::from(assignment.quantity))
    }

    /// Positions of the assignments of one item.
    pub fn for_item(&self, item_id: &str) -> &[usize] {
        self.by_item
            .get(item_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Positions of the assignments of one (DC, carrier) pair.
    pub fn for_carrier(&self, key: &CarrierKey) -> &[usize] {
        self.by_dc_carrier
            .get(&key.dc_id)
            .and_then(|carriers| carriers.get(&key.carrier))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Nested DC → carrier → assignment positions index.
    pub fn by_dc_carrier(&self) -> &BTreeMap<String, BTreeMap<String, Vec<usize>>> {
        &self.by_dc_carrier
    }
}
