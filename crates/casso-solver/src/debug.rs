//! Text dump of the solver state.

use std::fmt::{self, Write};

use crate::solver::Solver;

fn header(out: &mut String, title: &str) -> fmt::Result {
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "-".repeat(title.len()))
}

impl Solver {
    /// Render the objective, tableau, infeasible rows, variables, edit
    /// variables and constraints as text.
    ///
    /// Sections are separated by a blank line and entries follow symbol or
    /// registration order, so the output is stable across runs.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_dump(&mut out);
        out
    }

    fn write_dump(&self, out: &mut String) -> fmt::Result {
        header(out, "Objective")?;
        writeln!(out, "{}", self.objective)?;
        writeln!(out)?;

        header(out, "Tableau")?;
        for (symbol, row) in &self.rows {
            writeln!(out, "{symbol} | {row}")?;
        }
        writeln!(out)?;

        header(out, "Infeasible")?;
        for symbol in &self.infeasible_rows {
            writeln!(out, "{symbol}")?;
        }
        writeln!(out)?;

        header(out, "Variables")?;
        for (variable, symbol) in &self.vars {
            writeln!(out, "{variable} = {symbol}")?;
        }
        writeln!(out)?;

        header(out, "Edit Variables")?;
        for variable in self.edits.keys() {
            writeln!(out, "{variable}")?;
        }
        writeln!(out)?;

        header(out, "Constraints")?;
        for constraint in self.constraints.keys() {
            writeln!(out, "{constraint}")?;
        }
        Ok(())
    }
}
