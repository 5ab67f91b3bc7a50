use crate::core::models::training_set::TrainingSet;
use crate::engine::kappa_data::KappaData;
use crate::engine::stats::Stats;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

const HEADER: [&str; 8] = ["molecule", "atoms", "R", "R2", "RMSD", "D_avg", "D_max", "cond"];

/// The `.chgs` text format: a `#` header line, then one whitespace-separated
/// row of per-molecule statistics per molecule, in training-set order.
///
/// Undefined statistics are written as `NaN`.
pub struct ChgStatsFile;

impl ChgStatsFile {
    pub fn write_to(
        training_set: &TrainingSet,
        kd: &KappaData,
        writer: &mut impl Write,
    ) -> io::Result<()> {
        writeln!(
            writer,
            "# {:<22} {:>6} {:>8} {:>8} {:>8} {:>8} {:>8} {:>10}",
            HEADER[0], HEADER[1], HEADER[2], HEADER[3], HEADER[4], HEADER[5], HEADER[6], HEADER[7]
        )?;
        for (molecule, stats) in training_set.molecules().iter().zip(&kd.per_molecule_stats) {
            let Stats {
                r,
                r2,
                rmsd,
                d_avg,
                d_max,
                cond,
                ..
            } = *stats;
            writeln!(
                writer,
                "{:<24} {:>6} {r:>8.4} {r2:>8.4} {rmsd:>8.4} {d_avg:>8.4} {d_max:>8.4} {cond:>10.3e}",
                molecule.name(),
                molecule.atoms_count(),
            )?;
        }
        Ok(())
    }

    pub fn write_to_path(training_set: &TrainingSet, kd: &KappaData, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(training_set, kd, &mut writer)?;
        writer.flush()
    }
}
