//! End-to-end solve pipeline: validate → generate → build → solve → extract.

use super::builder::ModelBuilder;
use super::config::FulfillmentConfig;
use super::extractor::extract;
use super::generator::AssignmentUniverse;
use super::types::{FulfillmentInput, FulfillmentOutput};
use super::validation::validate;
use crate::error::Result;
use crate::mip::{MipModel, MipSolution, MipSolver, SolveOptions};
use std::fmt;

/// Runs a configured backend on fulfillment models.
///
/// Each call to [`solve`](Self::solve) is a single attempt; there are no
/// retries or fallbacks to another provider.
pub struct SolveOrchestrator {
    solver: Box<dyn MipSolver>,
    options: SolveOptions,
}

impl fmt::Debug for SolveOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolveOrchestrator")
            .field("solver", &self.solver.name())
            .field("options", &self.options)
            .finish()
    }
}

impl SolveOrchestrator {
    /// Creates the backend and options described by `config`.
    pub fn from_config(config: &FulfillmentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            solver: config.provider.solver(),
            options: config.solve_options(),
        })
    }

    /// Uses a caller-supplied backend.
    pub fn with_solver(solver: Box<dyn MipSolver>, options: SolveOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { solver, options })
    }

    /// Name of the backend.
    pub fn provider(&self) -> &str {
        self.solver.name()
    }

    pub fn options(&self) -> &SolveOptions {
        &self.options
    }

    /// Solves a model once.
    pub fn solve(&self, model: &MipModel) -> Result<MipSolution> {
        tracing::info!(
            provider = self.provider(),
            max_duration = ?self.options.max_duration,
            variables = model.variable_count(),
            constraints = model.constraint_count(),
            "solving"
        );
        let solution = self.solver.solve(model, &self.options)?;
        tracing::info!(
            status = ?solution.status,
            objective = solution.objective_value,
            runtime = ?solution.runtime,
            "solver finished"
        );
        Ok(solution)
    }
}

/// Solves an instance with the backend selected by `config`.
///
/// # Errors
///
/// - [`Error::Validation`](crate::Error::Validation) for malformed input,
/// - [`Error::Solver`](crate::Error::Solver) for an unknown provider, invalid
///   options or a backend failure,
/// - [`Error::NoSolution`](crate::Error::NoSolution) when no feasible plan was
///   found; the carried output has status `infeasible`.
///
/// # Examples
///
/// ```
/// use u_fulfill::fulfillment::{fulfill, FulfillmentConfig, FulfillmentInput, Status};
///
/// let input: FulfillmentInput = serde_json::from_str(r#"{
///     "items": [{"item_id": "a", "quantity": 3, "volume": 2}],
///     "dcs": [{"dc_id": "dc1", "inventory": {"a": 5}, "handling_cost": 1}],
///     "carrier_capacities": {"dc1": {"ups": 100}},
///     "carrier_deliverycost": {"dc1": {"ups": 0.5}},
///     "carton_volume": 10
/// }"#).unwrap();
///
/// let output = fulfill(&input, &FulfillmentConfig::default()).unwrap();
/// assert_eq!(output.status, Status::Optimal);
/// assert!((output.value.unwrap() - 0.9).abs() < 1e-6);
/// ```
pub fn fulfill(input: &FulfillmentInput, config: &FulfillmentConfig) -> Result<FulfillmentOutput> {
    let orchestrator = SolveOrchestrator::from_config(config)?;
    fulfill_with(input, config, &orchestrator)
}

/// Like [`fulfill`], with an already constructed orchestrator. Only the
/// model-building settings of `config` are used.
pub fn fulfill_with(
    input: &FulfillmentInput,
    config: &FulfillmentConfig,
    orchestrator: &SolveOrchestrator,
) -> Result<FulfillmentOutput> {
    validate(input)?;
    tracing::info!(
        items = input.items.len(),
        dcs = input.dcs.len(),
        "fulfillment problem loaded"
    );

    let universe = AssignmentUniverse::generate(input);
    let fm = ModelBuilder::new()
        .with_carton_upper_bound(config.carton_upper_bound)
        .build(&universe)?;
    tracing::info!(
        assignments = universe.len(),
        channels = universe.carriers().len(),
        variables = fm.model.variable_count(),
        constraints = fm.model.constraint_count(),
        "model built"
    );

    let solution = orchestrator.solve(&fm.model)?;
    let output = extract(&solution, &fm, orchestrator.provider())?;
    tracing::info!(
        status = %output.status,
        value = output.value,
        selected = output.assignments.len(),
        runtime = %output.runtime,
        "fulfillment solved"
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::fulfillment::check::{check, DEFAULT_TOLERANCE};
    use crate::fulfillment::types::Status;
    use crate::mip::{MipError, Provider, SolverStatus};
    use std::time::Duration;

    const SCENARIO_A: &str = r#"{
        "items": [{"item_id": "a", "quantity": 3, "volume": 2}],
        "weight_capacity": 0,
        "dcs": [{"dc_id": "dc1", "inventory": {"a": 5}, "handling_cost": 1}],
        "carrier_capacities": {"dc1": {"ups": 100}},
        "carrier_deliverycost": {"dc1": {"ups": 0.5}},
        "carton_volume": 10
    }"#;

    const SCENARIO_B: &str = r#"{
        "items": [{"item_id": "a", "quantity": 10, "volume": 1}],
        "dcs": [{"dc_id": "dc1", "inventory": {"a": 5}, "handling_cost": 1}],
        "carrier_capacities": {"dc1": {"ups": 100}},
        "carrier_deliverycost": {"dc1": {"ups": 0.5}},
        "carton_volume": 10
    }"#;

    const SCENARIO_C: &str = r#"{
        "items": [{"item_id": "a", "quantity": 2, "volume": 5}],
        "dcs": [
            {"dc_id": "dear", "inventory": {"a": 10}, "handling_cost": 3},
            {"dc_id": "cheap", "inventory": {"a": 10}, "handling_cost": 1}
        ],
        "carrier_capacities": {"dear": {"ups": 100}, "cheap": {"ups": 100}},
        "carrier_deliverycost": {"dear": {"ups": 1}, "cheap": {"ups": 1}},
        "carton_volume": 10
    }"#;

    // The cheap channel fits only a quarter of the unit, so the relaxation
    // splits it 0.25 / 0.75.
    const SCENARIO_SPLIT: &str = r#"{
        "items": [{"item_id": "a", "quantity": 1, "volume": 2}],
        "dcs": [
            {"dc_id": "cheap", "inventory": {"a": 1}, "handling_cost": 1},
            {"dc_id": "dear", "inventory": {"a": 1}, "handling_cost": 3}
        ],
        "carrier_capacities": {"cheap": {"ups": 0.5}, "dear": {"ups": 100}},
        "carrier_deliverycost": {"cheap": {"ups": 1}, "dear": {"ups": 1}},
        "carton_volume": 10
    }"#;

    fn parse(json: &str) -> FulfillmentInput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_scenario_a_optimal() {
        crate::logging::init_test();
        let input = parse(SCENARIO_A);
        let output = fulfill(&input, &FulfillmentConfig::default()).unwrap();

        assert_eq!(output.status, Status::Optimal);
        assert_eq!(output.fulfilled().get("a"), Some(&3));
        assert!(output
            .assignments
            .iter()
            .all(|a| a.dc_id == "dc1" && a.carrier == "ups"));
        assert!((output.cartons["dc1-ups"] - 0.6).abs() < 1e-6);
        assert!((output.value.unwrap() - 0.9).abs() < 1e-6);
        assert_eq!(output.statistics.provider, "microlp");
        assert_eq!(check(&input, &output, DEFAULT_TOLERANCE), Ok(()));
    }

    #[test]
    fn test_scenario_b_infeasible() {
        crate::logging::init_test();
        let input = parse(SCENARIO_B);
        match fulfill(&input, &FulfillmentConfig::default()) {
            Err(Error::NoSolution(output)) => {
                assert_eq!(output.status, Status::Infeasible);
                assert!(output.assignments.is_empty());
                assert_eq!(output.value, None);
            }
            other => panic!("expected NoSolution, got {other:?}"),
        }
    }

    #[test]
    fn test_scenario_c_cheaper_handling() {
        let input = parse(SCENARIO_C);
        let output = fulfill(&input, &FulfillmentConfig::default()).unwrap();

        assert_eq!(output.status, Status::Optimal);
        assert!(output.assignments.iter().all(|a| a.dc_id == "cheap"));
        // 10 volume = 1 carton at (1 + 1); the other DC would cost (1 + 3)
        assert!((output.value.unwrap() - 2.0).abs() < 1e-6);
        assert!(output.cartons["dear-ups"].abs() < 1e-6);
        assert_eq!(check(&input, &output, DEFAULT_TOLERANCE), Ok(()));
    }

    #[test]
    fn test_lp_round_provider() {
        let mut input = parse(SCENARIO_C);
        input.items[0].quantity = 1.0;
        let config = FulfillmentConfig::default().with_provider(Provider::LpRound);
        let output = fulfill(&input, &config).unwrap();
        // single unit: the relaxation is already integral
        assert_eq!(output.status, Status::Optimal);
        assert_eq!(output.assignments[0].dc_id, "cheap");
        assert_eq!(output.statistics.provider, "lp-round");
        assert_eq!(check(&input, &output, DEFAULT_TOLERANCE), Ok(()));
    }

    #[test]
    fn test_lp_round_repairs_fractional_split() {
        crate::logging::init_test();
        let input = parse(SCENARIO_SPLIT);
        let config = FulfillmentConfig::default().with_provider(Provider::LpRound);
        let output = fulfill(&input, &config).unwrap();

        assert_eq!(output.status, Status::Suboptimal);
        assert_eq!(output.assignments.len(), 1);
        assert_eq!(output.assignments[0].dc_id, "dear");
        assert!(output.cartons["cheap-ups"].abs() < 1e-6);
        assert!((output.cartons["dear-ups"] - 0.2).abs() < 1e-6);
        // 0.2 cartons at (1 + 3)
        assert!((output.value.unwrap() - 0.8).abs() < 1e-6);
        assert_eq!(check(&input, &output, DEFAULT_TOLERANCE), Ok(()));
    }

    #[test]
    fn test_unbounded_duration() {
        let input = parse(SCENARIO_C);
        let config = FulfillmentConfig::default()
            .with_max_duration_secs(0.0)
            .unwrap();
        let output = fulfill(&input, &config).unwrap();
        assert_eq!(output.status, Status::Optimal);
    }

    #[test]
    fn test_validation_error_before_solve() {
        let mut input = parse(SCENARIO_A);
        input.carton_volume = 0.0;
        let result = fulfill(&input, &FulfillmentConfig::default());
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_invalid_options() {
        let config = FulfillmentConfig::default().with_mip_gap_relative(2.0);
        let result = SolveOrchestrator::from_config(&config);
        assert!(matches!(result, Err(Error::Solver(MipError::InvalidOption(_)))));
    }

    /// Backend returning a fixed solution.
    struct Canned(MipSolution);

    impl MipSolver for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        fn solve(
            &self,
            _: &MipModel,
            _: &SolveOptions,
        ) -> std::result::Result<MipSolution, MipError> {
            Ok(self.0.clone())
        }
    }

    fn with_canned(solution: MipSolution) -> SolveOrchestrator {
        SolveOrchestrator::with_solver(Box::new(Canned(solution)), SolveOptions::default()).unwrap()
    }

    #[test]
    fn test_time_limit_with_incumbent_is_suboptimal() {
        let input = parse(SCENARIO_A);
        // x[a-dc1-ups-1..3], cartons[dc1-ups]
        let orchestrator = with_canned(MipSolution::with_values(
            SolverStatus::Feasible,
            0.9,
            vec![0.0, 0.0, 1.0, 0.6],
            Duration::from_secs(10),
        ));
        let output = fulfill_with(&input, &FulfillmentConfig::default(), &orchestrator).unwrap();
        assert_eq!(output.status, Status::Suboptimal);
        assert_eq!(output.statistics.provider, "canned");
        assert_eq!(check(&input, &output, DEFAULT_TOLERANCE), Ok(()));
    }

    #[test]
    fn test_time_limit_without_incumbent() {
        let input = parse(SCENARIO_A);
        let orchestrator = with_canned(MipSolution::empty(
            SolverStatus::TimeLimit,
            Duration::from_secs(10),
        ));
        let result = fulfill_with(&input, &FulfillmentConfig::default(), &orchestrator);
        match result {
            Err(Error::NoSolution(output)) => assert_eq!(output.runtime, "10s"),
            other => panic!("expected NoSolution, got {other:?}"),
        }
    }

    #[test]
    fn test_backend_error_propagates() {
        struct Broken;
        impl MipSolver for Broken {
            fn name(&self) -> &str {
                "broken"
            }
            fn solve(
                &self,
                _: &MipModel,
                _: &SolveOptions,
            ) -> std::result::Result<MipSolution, MipError> {
                Err(MipError::Backend("license expired".into()))
            }
        }
        let orchestrator =
            SolveOrchestrator::with_solver(Box::new(Broken), SolveOptions::default()).unwrap();
        let result = fulfill_with(&parse(SCENARIO_A), &FulfillmentConfig::default(), &orchestrator);
        assert!(matches!(result, Err(Error::Solver(MipError::Backend(_)))));
    }
}
