use num_traits::{One, Signed, Zero};
use ratplex_solver::{
    ConstraintOp, OBJECTIVE_KEY, Outcome, Rational, Sense, Solution, SolveReport, Tableau, extract_solution,
    fraction_to_text,
};

/// Render a plain-text, step by step account of a solve.
///
/// Needs a report solved with snapshots enabled to show the tableaux.
pub fn render(report: &SolveReport) -> String {
    let spec = &report.spec;
    let normalized = &report.normalized;
    let mut doc = vec![problem_statement(spec.sense, spec.num_variables())];

    let names = decision_names("x", spec.num_variables());
    doc.push(system(&spec.a, &spec.resolved_ops(), &spec.b, &names));
    doc.push(format!("  {} = {}", OBJECTIVE_KEY, linear_expression(&spec.c, &names)));

    if spec.sense == Sense::Min {
        doc.push(String::new());
        doc.push("This is a minimization problem, so maximize its dual instead:".to_string());
        let dual_names = decision_names("y", normalized.num_variables());
        doc.push(system(&normalized.a, &normalized.ops, &normalized.b, &dual_names));
        doc.push(format!(
            "  {} = {}",
            OBJECTIVE_KEY,
            linear_expression(&normalized.c, &dual_names)
        ));
    }

    let initial = Tableau::build(normalized);
    doc.push(String::new());
    doc.push("Add a slack variable to every inequality to turn it into an equation:".to_string());
    let width = initial.rhs_column();
    let slack_rows: Vec<Vec<Rational>> = initial
        .cells()
        .rows()
        .take(initial.constraint_count())
        .map(|row| row[..width].to_vec())
        .collect();
    let rhs: Vec<Rational> = (0..initial.constraint_count()).map(|i| initial.rhs(i).clone()).collect();
    let eq = vec![ConstraintOp::Eq; rhs.len()];
    doc.push(system(&slack_rows, &eq, &rhs, initial.variable_names()));

    let last = report.steps.len().saturating_sub(1);
    let optimal = matches!(report.outcome, Outcome::Optimal(_));
    for step in &report.steps {
        doc.push(String::new());
        match &step.pivot {
            None => doc.push("Initial tableau:".to_string()),
            Some(pivot) => {
                doc.push(format!(
                    "Step {}: {} enters the basis and {} leaves it.",
                    step.index, pivot.entering, pivot.departing
                ));
                doc.push(format!(
                    "Divide row {} by the pivot element and clear the rest of column {}:",
                    pivot.row + 1,
                    pivot.entering
                ));
            }
        }
        doc.push(table(&step.tableau));
        // The optimal tableau is reported as the final solution below
        if !(optimal && step.index == last) {
            let current = extract_solution(&step.tableau, normalized.sense);
            doc.push(format!("Current solution: {}", solution_line(&current)));
        }
    }

    doc.push(String::new());
    match &report.outcome {
        Outcome::Optimal(solution) => {
            doc.push("No entry of the objective row is negative, so the solution is optimal:".to_string());
            doc.push(solution_line(solution));
        }
        Outcome::Infeasible { entering } => {
            doc.push(format!(
                "No row of column {entering} passes the ratio test, so the problem has no solution."
            ));
        }
    }

    let mut text = doc.join("\n");
    text.push('\n');
    text
}

fn problem_statement(sense: Sense, variables: usize) -> String {
    let verb = match sense {
        Sense::Max => "Maximize",
        Sense::Min => "Minimize",
    };
    format!("{verb} {OBJECTIVE_KEY} over {variables} non-negative variables subject to:")
}

fn decision_names(prefix: &str, count: usize) -> Vec<String> {
    (1..=count).map(|k| format!("{prefix}_{k}")).collect()
}

/// `2x_1 - x_2 + (1/2)x_3`; zero terms are left out
fn linear_expression(coefficients: &[Rational], names: &[String]) -> String {
    let mut out = String::new();
    for (coef, name) in coefficients.iter().zip(names) {
        if coef.is_zero() {
            continue;
        }
        let magnitude = coef.abs();
        let term = if magnitude.is_one() {
            name.clone()
        } else if magnitude.is_integer() {
            format!("{}{}", fraction_to_text(&magnitude), name)
        } else {
            format!("({}){}", fraction_to_text(&magnitude), name)
        };

        if out.is_empty() {
            if coef.is_negative() {
                out.push('-');
            }
        } else if coef.is_negative() {
            out.push_str(" - ");
        } else {
            out.push_str(" + ");
        }
        out.push_str(&term);
    }

    if out.is_empty() { "0".to_string() } else { out }
}

fn system(rows: &[Vec<Rational>], ops: &[ConstraintOp], rhs: &[Rational], names: &[String]) -> String {
    rows.iter()
        .zip(ops)
        .zip(rhs)
        .map(|((row, op), rhs)| format!("  {} {} {}", linear_expression(row, names), op, fraction_to_text(rhs)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Column-aligned tableau with its basis listed under it
fn table(tableau: &Tableau) -> String {
    let mut grid: Vec<Vec<String>> = vec![tableau.entering().to_vec()];
    grid.extend(tableau.cells().rows().map(|row| row.iter().map(fraction_to_text).collect()));

    let widths: Vec<usize> = (0..tableau.column_count())
        .map(|col| grid.iter().map(|row| row[col].len()).max().unwrap_or(0))
        .collect();

    let mut lines: Vec<String> = grid
        .iter()
        .map(|row| {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:>width$}"))
                .collect();
            format!("  {}", cells.join(" | "))
        })
        .collect();

    lines.push(format!("  Basis: {}", tableau.departing().join(", ")));
    lines.join("\n")
}

/// `name = value` pairs in variable order, objective last
fn solution_line(solution: &Solution) -> String {
    let mut parts: Vec<String> = solution
        .iter()
        .map(|(name, value)| format!("{} = {}", name, fraction_to_text(value)))
        .collect();
    parts.push(format!("{} = {}", OBJECTIVE_KEY, fraction_to_text(solution.objective())));
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratplex_solver::{ProblemSpec, Solver, ratio, rational};

    #[test]
    fn test_linear_expression() {
        let names = decision_names("x", 4);
        let coefficients = vec![rational(2), rational(-1), rational(0), ratio(1, 2)];
        assert_eq!(linear_expression(&coefficients, &names), "2x_1 - x_2 + (1/2)x_4");
        assert_eq!(linear_expression(&[rational(-3)], &names), "-3x_1");
        assert_eq!(linear_expression(&[rational(0)], &names), "0");
    }

    #[test]
    fn test_max_transcript() {
        let spec = ProblemSpec::from_integers(&[[2, 1], [1, 2]], &[4, 3], &[1, 1], Sense::Max);
        let report = Solver::new().solve(&spec).unwrap();
        let text = render(&report);

        assert!(text.starts_with("Maximize z over 2 non-negative variables subject to:"));
        assert!(text.contains("  2x_1 + x_2 <= 4"));
        assert!(text.contains("  2x_1 + x_2 + s_1 = 4"));
        assert!(text.contains("Initial tableau:"));
        assert!(text.contains("Basis: s_1, s_2"));
        assert!(text.contains("Step 1: x_1 enters the basis and s_1 leaves it."));
        assert!(text.contains("Step 2: x_2 enters the basis and s_2 leaves it."));
        assert!(text.contains("x_1 = 5/3, x_2 = 2/3, s_1 = 0, s_2 = 0, z = 7/3"));
        assert!(!text.contains("maximize its dual"));
    }

    #[test]
    fn test_min_transcript_shows_dual() {
        let spec = ProblemSpec::from_integers(&[[1, 1], [1, 3]], &[4, 6], &[2, 3], Sense::Min);
        let report = Solver::new().solve(&spec).unwrap();
        let text = render(&report);

        assert!(text.starts_with("Minimize z over 2 non-negative variables subject to:"));
        assert!(text.contains("  x_1 + x_2 >= 4"));
        assert!(text.contains("maximize its dual"));
        assert!(text.contains("  y_1 + y_2 <= 2"));
        assert!(text.contains("  z = 4y_1 + 6y_2"));
        assert!(text.contains("Current solution: y_1 = 0, y_2 = 0, s_1 = 2, s_2 = 3, x_1 = 0, x_2 = 0, z = 0"));
        assert!(text.contains("z = 9"));
    }

    #[test]
    fn test_infeasible_transcript() {
        let spec = ProblemSpec::from_integers(&[[-1, 1]], &[1], &[1, 1], Sense::Max);
        let report = Solver::new().solve(&spec).unwrap();
        let text = render(&report);
        assert!(text.contains("Current solution: x_1 = 0, x_2 = 0, s_1 = 1, z = 0\n\nNo row"));
        assert!(text.ends_with("No row of column x_1 passes the ratio test, so the problem has no solution.\n"));
    }

    #[test]
    fn test_table_alignment() {
        let spec = ProblemSpec::from_integers(&[[10, 1]], &[4], &[1, 1], Sense::Max);
        let tableau = Tableau::build(&ratplex_solver::normalize(&spec).unwrap());
        let text = table(&tableau);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "  x_1 | x_2 | s_1 | b");
        assert_eq!(lines[1], "   10 |   1 |   1 | 4");
        assert_eq!(lines[2], "   -1 |  -1 |   0 | 0");
        assert_eq!(lines[3], "  Basis: s_1");
    }
}
