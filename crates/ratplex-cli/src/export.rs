use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use ratplex_solver::{RHS_NAME, Step, Tableau, fraction_to_text};

/// Records of one step table: a header, the constraint rows, then the objective row
pub fn step_table(tableau: &Tableau) -> Vec<Vec<String>> {
    let rhs = tableau.rhs_column();

    let mut header = vec![RHS_NAME.to_string(), String::new()];
    header.extend(tableau.variable_names().iter().cloned());

    let mut records = vec![header];
    for (i, row) in tableau.cells().rows().enumerate() {
        // The objective row has no basic variable
        let basic = tableau.departing().get(i).cloned().unwrap_or_default();
        let mut record = vec![fraction_to_text(&row[rhs]), basic];
        record.extend(row[..rhs].iter().map(fraction_to_text));
        records.push(record);
    }
    records
}

fn escape(field: &str, delimiter: char) -> Cow<'_, str> {
    if field.contains([delimiter, '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

pub fn write_records<W: Write>(writer: &mut W, records: &[Vec<String>], delimiter: char) -> io::Result<()> {
    let separator = delimiter.to_string();
    for record in records {
        let fields: Vec<Cow<'_, str>> = record.iter().map(|field| escape(field, delimiter)).collect();
        writeln!(writer, "{}", fields.join(separator.as_str()))?;
    }
    Ok(())
}

/// `out/run.csv` becomes `out/run-step<k>.csv`, counting from 1
pub fn step_path(base: &Path, k: usize) -> PathBuf {
    let mut name = base.with_extension("").into_os_string();
    name.push(format!("-step{k}.csv"));
    PathBuf::from(name)
}

/// Write one delimited file per step and return their paths
pub fn write_step_tables(steps: &[Step], base: &Path, delimiter: char) -> io::Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(steps.len());
    for (k, step) in steps.iter().enumerate() {
        let path = step_path(base, k + 1);
        let mut writer = BufWriter::new(File::create(&path)?);
        write_records(&mut writer, &step_table(&step.tableau), delimiter)?;
        writer.flush()?;
        written.push(path);
    }
    info!("wrote {} step tables next to {}", written.len(), base.display());
    Ok(written)
}
