//! Translation of an assignment universe into a MIP.
//!
//! Decision variables:
//!
//! - `x[item-dc-carrier-q]` (binary): ship `q` units of `item` from `dc`
//!   with `carrier`.
//! - `cartons[dc-carrier]` (continuous, `>= 0`): cartons used on a channel.
//!
//! Constraint families:
//!
//! | Family      | Row                                                  |
//! |-------------|------------------------------------------------------|
//! | fulfillment | per item: `Σ q·x = quantity`                         |
//! | capacity    | per (dc, carrier): `Σ volume·q·x <= capacity`        |
//! | inventory   | per (item, dc): `Σ q·x <= inventory`                 |
//! | cartons     | per (dc, carrier): `-c + Σ (volume·q / cv)·x = 0`    |
//!
//! The objective minimizes `(delivery_cost + handling_cost)·c` summed over
//! all channels.

use super::config::DEFAULT_CARTON_UPPER_BOUND;
use super::generator::AssignmentUniverse;
use super::types::{Assignment, CarrierKey};
use super::validation::ValidationError;
use crate::mip::{ConstraintSense, LinearConstraint, MipModel, VarId};
use std::collections::BTreeMap;

/// A built model together with the keys of its decision variables.
#[derive(Debug, Clone)]
pub struct FulfillmentModel {
    /// The MIP handed to the solver.
    pub model: MipModel,
    /// Binary variable per assignment.
    pub assignment_vars: BTreeMap<Assignment, VarId>,
    /// Carton variable per (DC, carrier).
    pub carton_vars: BTreeMap<CarrierKey, VarId>,
}

impl FulfillmentModel {
    pub fn assignment_var(&self, assignment: &Assignment) -> Option<VarId> {
        self.assignment_vars.get(assignment).copied()
    }

    pub fn carton_var(&self, key: &CarrierKey) -> Option<VarId> {
        self.carton_vars.get(key).copied()
    }
}

/// Builds [`FulfillmentModel`]s.
#[derive(Debug, Clone, Copy)]
pub struct ModelBuilder {
    carton_upper_bound: f64,
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self {
            carton_upper_bound: DEFAULT_CARTON_UPPER_BOUND,
        }
    }
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_carton_upper_bound(mut self, bound: f64) -> Self {
        self.carton_upper_bound = bound;
        self
    }

    /// Builds the model for a generated universe.
    ///
    /// Fails if an offered (DC, carrier) pair has no capacity or no delivery
    /// cost. The input is expected to have passed
    /// [`validate`](super::validation::validate).
    pub fn build(
        &self,
        universe: &AssignmentUniverse<'_>,
    ) -> Result<FulfillmentModel, ValidationError> {
        let input = universe.input();
        let mut model = MipModel::new("order-fulfillment");
        model.minimize();

        let mut assignment_vars = BTreeMap::new();
        let mut vars = Vec::with_capacity(universe.len());
        for assignment in universe.assignments() {
            let var = model.add_binary(format!("x[{assignment}]"));
            assignment_vars.insert(assignment.clone(), var);
            vars.push(var);
        }

        let mut carton_vars = BTreeMap::new();
        for key in universe.carriers() {
            let capacity = input
                .capacity(key)
                .ok_or_else(|| ValidationError::missing_capacity(key))?;
            let upper = self.carton_upper_bound.max(capacity / input.carton_volume);
            let var = model.add_continuous(format!("cartons[{key}]"), 0.0, upper);
            carton_vars.insert(key.clone(), var);
        }

        // Fulfillment: every item ships exactly its ordered quantity.
        for item in &input.items {
            let mut row = LinearConstraint::new(
                format!("fulfill[{}]", item.item_id),
                ConstraintSense::Equal,
                item.quantity,
            );
            for &idx in universe.for_item(&item.item_id) {
                row.add_term(f64::from(universe.assignments()[idx].quantity), vars[idx]);
            }
            model.add_constraint(row);
        }
        let fulfillment_rows = input.items.len();

        // Capacity and carton linking share the per-channel assignment sets.
        for key in universe.carriers() {
            let capacity = input
                .capacity(key)
                .ok_or_else(|| ValidationError::missing_capacity(key))?;
            let mut capacity_row = LinearConstraint::new(
                format!("capacity[{key}]"),
                ConstraintSense::LessThanOrEqual,
                capacity,
            );
            let mut carton_row =
                LinearConstraint::new(format!("cartons[{key}]"), ConstraintSense::Equal, 0.0)
                    .with_term(-1.0, carton_vars[key]);
            for &idx in universe.for_carrier(key) {
                let volume = universe.volume(&universe.assignments()[idx]);
                capacity_row.add_term(volume, vars[idx]);
                carton_row.add_term(volume / input.carton_volume, vars[idx]);
            }
            model.add_constraint(capacity_row);
            model.add_constraint(carton_row);
        }

        let mut inventory_rows = 0;
        for item in &input.items {
            let mut per_dc: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
            for &idx in universe.for_item(&item.item_id) {
                per_dc
                    .entry(universe.assignments()[idx].dc_id.as_str())
                    .or_default()
                    .push(idx);
            }
            for dc in &input.dcs {
                let Some(indices) = per_dc.get(dc.dc_id.as_str()) else {
                    continue;
                };
                let mut row = LinearConstraint::new(
                    format!("inventory[{}-{}]", item.item_id, dc.dc_id),
                    ConstraintSense::LessThanOrEqual,
                    dc.stock(&item.item_id) as f64,
                );
                for &idx in indices {
                    row.add_term(f64::from(universe.assignments()[idx].quantity), vars[idx]);
                }
                model.add_constraint(row);
                inventory_rows += 1;
            }
        }

        for key in universe.carriers() {
            let delivery = input
                .delivery_cost(key)
                .ok_or_else(|| ValidationError::missing_delivery_cost(key))?;
            let handling = input.dc(&key.dc_id).map_or(0.0, |dc| dc.handling_cost);
            let carton = carton_vars[key];
            model.add_objective_term(delivery, carton);
            model.add_objective_term(handling, carton);
        }

        tracing::debug!(
            fulfillment = fulfillment_rows,
            capacity = universe.carriers().len(),
            inventory = inventory_rows,
            cartons = universe.carriers().len(),
            "built constraint families"
        );
        tracing::debug!(
            variables = model.variable_count(),
            constraints = model.constraint_count(),
            "built fulfillment model"
        );

        Ok(FulfillmentModel {
            model,
            assignment_vars,
            carton_vars,
        })
    }
}
