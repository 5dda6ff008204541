use crate::solvers::{Enumeration, EnumerationTermination, Explanation, Model, SolveOutcome};
use anyhow::{Context, Result};
use std::io::Write;

/// A writer for the results of the solvers.
///
/// The output is line oriented, and follows the conventions of SAT solvers:
/// `s` lines give the status, `c` lines are comments, `v` lines give the bindings of the slots
/// (`v <assignment>.<slot> <component>...`), and `e` lines give the assertions of an explanation.
///
/// # Example
///
/// ```
/// # use schedsat::io::{ProblemReader, ScheduleWriter};
/// # use schedsat::solvers::ScheduleSolver;
/// let instance = "type Room\ncomponent R1 Room\nassignment M1\nslot M1 room Room 1\n";
/// let problem = ProblemReader::default().read(&mut instance.as_bytes()).unwrap();
/// let outcome = ScheduleSolver::new(&problem).solve().unwrap();
/// let mut out = Vec::new();
/// ScheduleWriter::default().write_outcome(&mut out, &outcome).unwrap();
/// assert_eq!("s SATISFIABLE\nc cost 0 (optimal)\nv M1.room R1\n", String::from_utf8(out).unwrap());
/// ```
#[derive(Default)]
pub struct ScheduleWriter {}

impl ScheduleWriter {
    /// Writes the outcome of a solving call.
    pub fn write_outcome(&self, writer: &mut dyn Write, outcome: &SolveOutcome) -> Result<()> {
        let context = "while writing a solving outcome";
        match outcome {
            SolveOutcome::Satisfiable(model) => {
                writeln!(writer, "s SATISFIABLE").context(context)?;
                self.write_model(writer, model)?;
            }
            SolveOutcome::Unsatisfiable(explanation) => {
                writeln!(writer, "s UNSATISFIABLE").context(context)?;
                if let Some(e) = explanation {
                    self.write_explanation(writer, e)?;
                }
            }
            SolveOutcome::Unknown => writeln!(writer, "s UNKNOWN").context(context)?,
        }
        writer.flush().context(context)
    }

    /// Writes the cost and the bindings of a model.
    pub fn write_model(&self, writer: &mut dyn Write, model: &Model) -> Result<()> {
        let context = "while writing a model";
        writeln!(
            writer,
            "c cost {} ({})",
            model.cost(),
            if model.is_optimal() {
                "optimal"
            } else {
                "not proved optimal"
            }
        )
        .context(context)?;
        for assignment in model.assignments() {
            if !assignment.is_fulfilled() {
                writeln!(writer, "c {} is not fulfilled", assignment.label()).context(context)?;
            }
            for (slot, components) in assignment.iter_slots() {
                write!(writer, "v {}.{}", assignment.label(), slot).context(context)?;
                for c in components {
                    write!(writer, " {}", c).context(context)?;
                }
                writeln!(writer).context(context)?;
            }
        }
        Ok(())
    }

    /// Writes an explanation, one conflicting assertion per line.
    pub fn write_explanation(&self, writer: &mut dyn Write, explanation: &Explanation) -> Result<()> {
        let context = "while writing an explanation";
        if !explanation.is_minimal() {
            writeln!(writer, "c the explanation may not be minimal").context(context)?;
        }
        for conflict in explanation.conflicts() {
            writeln!(writer, "e {}", conflict).context(context)?;
        }
        Ok(())
    }

    /// Writes the models of an enumeration, followed by its termination status.
    pub fn write_enumeration(&self, writer: &mut dyn Write, enumeration: &Enumeration) -> Result<()> {
        let context = "while writing an enumeration";
        for (i, model) in enumeration.models().iter().enumerate() {
            writeln!(writer, "c model {}", i + 1).context(context)?;
            self.write_model(writer, model)?;
        }
        writeln!(writer, "c {} model(s)", enumeration.models().len()).context(context)?;
        let status = match enumeration.termination() {
            EnumerationTermination::Exhausted if enumeration.models().is_empty() => {
                "s UNSATISFIABLE".to_string()
            }
            EnumerationTermination::Exhausted => "s SATISFIABLE".to_string(),
            EnumerationTermination::Unknown => "s UNKNOWN".to_string(),
            EnumerationTermination::Cancelled => "c enumeration cancelled".to_string(),
            EnumerationTermination::BackendFailure(msg) => format!("c backend failure: {}", msg),
        };
        writeln!(writer, "{}", status).context(context)?;
        writer.flush().context(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{io::ProblemReader, solvers::ScheduleSolver};

    fn write_to_string<F>(f: F) -> String
    where
        F: FnOnce(&mut dyn Write) -> Result<()>,
    {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_write_unsat_with_explanation() {
        let instance = r#"
        type Room
        component R1 Room
        assignment M1
        assignment M2
        slot M1 room Room 1
        slot M2 room Room 1
        rule d hard (distinct 0.room 1.room) for M1 M2
        "#;
        let problem = ProblemReader::default()
            .read(&mut instance.as_bytes())
            .unwrap();
        let outcome = ScheduleSolver::new(&problem).solve().unwrap();
        let out = write_to_string(|w| ScheduleWriter::default().write_outcome(w, &outcome));
        assert_eq!(
            "s UNSATISFIABLE\ne rule d (M1, M2): (distinct M1.room M2.room)\n",
            out
        );
    }

    #[test]
    fn test_write_enumeration() {
        let instance = r#"
        type Room
        component R1 Room
        component R2 Room
        assignment M1 optional 1
        slot M1 room Room 1
        rule r hard (not (component-is 0.room R2))
        "#;
        let problem = ProblemReader::default()
            .read(&mut instance.as_bytes())
            .unwrap();
        let enumeration = ScheduleSolver::new(&problem).enumerate_all(false).unwrap();
        let out = write_to_string(|w| ScheduleWriter::default().write_enumeration(w, &enumeration));
        assert!(out.contains("v M1.room R1\n"));
        assert!(out.contains("c M1 is not fulfilled\nv M1.room\n"));
        assert!(out.ends_with("c 2 model(s)\ns SATISFIABLE\n"));
    }
}
