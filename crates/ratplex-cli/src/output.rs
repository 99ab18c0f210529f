use ratplex_solver::{Outcome, Sense, SolveReport, fraction_to_text};
use serde::Serialize;

/// JSON view of a [`SolveReport`]; rationals are rendered as `n` or `n/d`
#[derive(Debug, Serialize)]
pub struct SolveOutput {
    pub status: &'static str,
    pub sense: Sense,
    pub iterations: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<VariableValue>,
    /// Entering variable that failed the ratio test
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entering: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VariableValue {
    pub name: String,
    pub value: String,
}

impl SolveOutput {
    pub fn from_report(report: &SolveReport) -> Self {
        let mut output = Self {
            status: "optimal",
            sense: report.spec.sense,
            iterations: report.iterations,
            objective: None,
            variables: Vec::new(),
            entering: None,
        };

        match &report.outcome {
            Outcome::Optimal(solution) => {
                output.objective = Some(fraction_to_text(solution.objective()));
                output.variables = solution
                    .iter()
                    .map(|(name, value)| VariableValue {
                        name: name.to_string(),
                        value: fraction_to_text(value),
                    })
                    .collect();
            }
            Outcome::Infeasible { entering } => {
                output.status = "infeasible";
                output.entering = Some(entering.clone());
            }
        }
        output
    }
}

pub fn print_pretty(report: &SolveReport) {
    let spec = &report.spec;
    println!(
        "Problem: {}, {} constraints, {} variables",
        spec.sense,
        spec.num_constraints(),
        spec.num_variables()
    );
    println!("Pivots: {}", report.iterations);
    println!();

    match &report.outcome {
        Outcome::Optimal(solution) => {
            println!("Status: OPTIMAL");
            println!("Objective (z): {}", fraction_to_text(solution.objective()));
            println!();
            println!("Variables:");
            for (name, value) in solution.iter() {
                println!("  {:10} {:>12}", name, fraction_to_text(value));
            }

            let violations = solution.check_feasibility(spec);
            if !violations.is_empty() {
                println!();
                println!("Warning: the solution violates some constraints:");
                for violation in &violations {
                    println!("  - {}", violation.description);
                }
            }
        }
        Outcome::Infeasible { entering } => {
            println!("Status: INFEASIBLE");
            println!("No row passes the ratio test for entering variable {}.", entering);
        }
    }
}
