use crate::core::models::training_set::{TrainingSet, TrainingSetError};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChargeFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Charge file has no entry for molecule '{0}'")]
    MissingMolecule(String),
    #[error(transparent)]
    TrainingSet(#[from] TrainingSetError),
}

/// Charges of one molecule as stored in a `.chg` file.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeCharges {
    pub name: String,
    pub elements: Vec<String>,
    pub charges: Vec<f64>,
}

/// The `.chg` text format: for each molecule a name line, an atom-count line,
/// one `index element charge` line per atom and a blank separator line.
pub struct ChgFile;

impl ChgFile {
    pub fn read_from(reader: &mut impl BufRead) -> Result<Vec<MoleculeCharges>, ChargeFileError> {
        let mut lines = reader.lines().enumerate().map(|(idx, line)| (idx + 1, line));
        let mut molecules = Vec::new();

        loop {
            let (name_line, name) = match next_non_blank(&mut lines)? {
                Some(entry) => entry,
                None => break,
            };
            let (count_line, count_str) =
                next_non_blank(&mut lines)?.ok_or_else(|| ChargeFileError::Parse {
                    line: name_line,
                    message: format!("missing atom count for molecule '{name}'"),
                })?;
            let count: usize = count_str.trim().parse().map_err(|_| ChargeFileError::Parse {
                line: count_line,
                message: format!("invalid atom count '{}'", count_str.trim()),
            })?;

            let mut elements = Vec::with_capacity(count);
            let mut charges = Vec::with_capacity(count);
            for _ in 0..count {
                let (line_no, line) = match lines.next() {
                    Some((n, line)) => (n, line?),
                    None => {
                        return Err(ChargeFileError::Parse {
                            line: count_line,
                            message: format!("molecule '{name}' ends after {} of {count} atoms", charges.len()),
                        });
                    }
                };
                let fields: Vec<&str> = line.split_whitespace().collect();
                if fields.len() != 3 {
                    return Err(ChargeFileError::Parse {
                        line: line_no,
                        message: format!("expected 'index element charge', found '{}'", line.trim()),
                    });
                }
                let charge: f64 = fields[2].parse().map_err(|_| ChargeFileError::Parse {
                    line: line_no,
                    message: format!("invalid charge '{}'", fields[2]),
                })?;
                elements.push(fields[1].to_string());
                charges.push(charge);
            }

            molecules.push(MoleculeCharges {
                name: name.trim().to_string(),
                elements,
                charges,
            });
        }

        Ok(molecules)
    }

    pub fn read_from_path(path: &Path) -> Result<Vec<MoleculeCharges>, ChargeFileError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes a flat per-atom charge vector (laid out by the training set's
    /// molecule offsets).
    pub fn write_to(
        training_set: &TrainingSet,
        charges: &[f64],
        writer: &mut impl Write,
    ) -> io::Result<()> {
        for (idx, molecule) in training_set.molecules().iter().enumerate() {
            writeln!(writer, "{}", molecule.name())?;
            writeln!(writer, "{}", molecule.atoms_count())?;
            let range = training_set.atom_range(idx);
            for (i, (atom, charge)) in molecule.atoms().iter().zip(&charges[range]).enumerate() {
                writeln!(writer, "{:>6} {:>2} {:>10.6}", i + 1, atom.element, charge)?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    pub fn write_to_path(training_set: &TrainingSet, charges: &[f64], path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(training_set, charges, &mut writer)?;
        writer.flush()
    }
}

fn next_non_blank(
    lines: &mut impl Iterator<Item = (usize, io::Result<String>)>,
) -> Result<Option<(usize, String)>, ChargeFileError> {
    for (line_no, line) in lines {
        let line = line?;
        if !line.trim().is_empty() {
            return Ok(Some((line_no, line)));
        }
    }
    Ok(None)
}

/// Overrides the reference charges of every training-set molecule with the
/// matching (by name) entry of `records`.
pub fn apply_reference_charges(
    training_set: &mut TrainingSet,
    records: &[MoleculeCharges],
) -> Result<(), ChargeFileError> {
    let by_name: HashMap<&str, &MoleculeCharges> =
        records.iter().map(|r| (r.name.as_str(), r)).collect();

    for idx in 0..training_set.molecules_count() {
        let name = training_set.molecule(idx).name().to_string();
        let record = by_name
            .get(name.as_str())
            .ok_or(ChargeFileError::MissingMolecule(name))?;
        training_set.set_reference_charges(idx, &record.charges)?;
    }
    Ok(())
}
