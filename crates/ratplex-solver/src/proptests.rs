//! Property-based tests for the pivot engine.

#[cfg(test)]
mod tests {
    use num_traits::Zero;
    use proptest::prelude::*;

    use crate::{PivotRule, ProblemSpec, Rational, Sense, SolveError, Solver, extract_solution, normalize, Tableau};

    // Dense problems with positive data are feasible and bounded
    fn positive_problem() -> impl Strategy<Value = (Vec<Vec<i64>>, Vec<i64>, Vec<i64>)> {
        (1usize..5, 1usize..5).prop_flat_map(|(m, n)| {
            (
                prop::collection::vec(prop::collection::vec(1i64..10, n), m),
                prop::collection::vec(1i64..30, m),
                prop::collection::vec(1i64..10, n),
            )
        })
    }

    // Mixed-sign data, possibly unbounded or degenerate
    fn any_problem() -> impl Strategy<Value = (Vec<Vec<i64>>, Vec<i64>, Vec<i64>)> {
        (1usize..5, 1usize..5).prop_flat_map(|(m, n)| {
            (
                prop::collection::vec(prop::collection::vec(-5i64..10, n), m),
                prop::collection::vec(0i64..20, m),
                prop::collection::vec(-3i64..10, n),
            )
        })
    }

    fn dot(a: &[Rational], x: &[Rational]) -> Rational {
        a.iter().zip(x).fold(Rational::zero(), |acc, (a, x)| acc + a * x)
    }

    proptest! {
        #[test]
        fn basis_invariant_holds_after_every_pivot((a, b, c) in any_problem()) {
            let spec = ProblemSpec::from_integers(&a, &b, &c, Sense::Max);
            match Solver::new().with_max_iterations(64).solve(&spec) {
                Ok(report) => {
                    for step in &report.steps {
                        prop_assert!(step.tableau.basis_holds(), "basis broken at step {}", step.index);
                    }
                }
                Err(SolveError::IterationLimitExceeded { .. }) => {}
                Err(e) => return Err(TestCaseError::fail(e.to_string())),
            }
        }

        #[test]
        fn extraction_is_idempotent((a, b, c) in any_problem()) {
            let spec = ProblemSpec::from_integers(&a, &b, &c, Sense::Max);
            let tableau = Tableau::build(&normalize(&spec).unwrap());
            if let Ok(run) = Solver::new().with_max_iterations(64).run(tableau) {
                prop_assert_eq!(
                    extract_solution(&run.tableau, Sense::Max),
                    extract_solution(&run.tableau, Sense::Max)
                );
            }
        }

        #[test]
        fn maximum_satisfies_constraints_exactly((a, b, c) in positive_problem()) {
            let spec = ProblemSpec::from_integers(&a, &b, &c, Sense::Max);
            let report = Solver::new().with_pivot_rule(PivotRule::Bland).solve(&spec).unwrap();
            let solution = report.solution().expect("positive problems are bounded");

            prop_assert!(solution.check_feasibility(&spec).is_empty());
            let x = solution.primal_values(spec.num_variables());
            prop_assert_eq!(&dot(&spec.c, &x), solution.objective());
            prop_assert!(report.steps.last().unwrap().tableau.objective_row().iter().all(|v| v >= &Rational::zero()));
        }

        #[test]
        fn minimum_matches_dual_maximum((a, b, c) in positive_problem()) {
            let spec = ProblemSpec::from_integers(&a, &b, &c, Sense::Min);
            let solver = Solver::new().with_pivot_rule(PivotRule::Bland);
            let min = solver.solve(&spec).unwrap();
            let max = solver.solve(&spec.dual().unwrap()).unwrap();
            let solution = min.solution().expect("positive problems are bounded");

            prop_assert_eq!(solution.objective(), max.solution().unwrap().objective());
            prop_assert!(solution.check_feasibility(&spec).is_empty());
            let x = solution.primal_values(spec.num_variables());
            prop_assert_eq!(&dot(&spec.c, &x), solution.objective());
        }
    }
}
