//! Human-readable dump: every variable in one .dat file with a commented
//! header per block.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use nscat_core::NscatResult;

use crate::output::{OutputData, OutputInfo, PlotKind};

pub struct TextFormat;

impl super::OutputFormat for TextFormat {
    fn extension(&self) -> &'static str {
        "dat"
    }

    fn write(
        &self,
        root: &Path,
        outputs: &OutputData,
        info: &OutputInfo,
    ) -> NscatResult<PathBuf> {
        let path = root.with_extension(self.extension());
        let mut file = BufWriter::new(File::create(&path)?);

        writeln!(file, "# job: {} ({})", info.job, info.label)?;
        writeln!(file, "# written: {}", info.timestamp)?;
        if !info.parameters.is_null() {
            writeln!(file, "# parameters: {}", info.parameters)?;
        }
        for (name, variable) in outputs.variables() {
            writeln!(file)?;
            writeln!(
                file,
                "# variable: {name}{}",
                if variable.main_result { " (main result)" } else { "" }
            )?;
            writeln!(file, "# kind: {}", variable.kind.name())?;
            writeln!(file, "# axis: {}", variable.axis)?;
            writeln!(file, "# units: {}", variable.units)?;
            writeln!(file, "# shape: {:?}", variable.data.shape())?;
            match variable.kind {
                PlotKind::Line => {
                    for x in variable.data.iter() {
                        writeln!(file, "{x:.12e}")?;
                    }
                }
                // Rows of the first dimension on one line each.
                PlotKind::Surface | PlotKind::Volume => {
                    let shape = variable.data.shape().to_vec();
                    let row_len: usize = shape[1..].iter().product::<usize>().max(1);
                    let flat: Vec<f64> = variable.data.iter().copied().collect();
                    for row in flat.chunks(row_len) {
                        let line: Vec<String> =
                            row.iter().map(|x| format!("{x:.12e}")).collect();
                        writeln!(file, "{}", line.join(" "))?;
                    }
                }
            }
        }
        file.flush()?;
        Ok(path)
    }
}
