use super::packed::PackedSymmetricMatrix;
use crate::core::models::molecule::{DistanceSource, Molecule};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Condition number above which a solved system is reported as ill-conditioned.
pub const WARN_MAX_COND: f64 = 1000.0;

/// Fidelity of the linear solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolverPrecision {
    /// Direct factor-and-solve.
    #[default]
    Fast,
    /// Factor, solve, one refinement step and a condition-number estimate.
    ExtraPrecise,
}

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum SolveError {
    #[error("EEM system contains non-finite entries")]
    NonFinite,
    #[error("EEM system is singular")]
    Singular,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EemSolution {
    /// One charge per atom, in molecule order.
    pub charges: Vec<f64>,
    /// Equalized molecular electronegativity.
    pub electronegativity: f64,
    /// 1-norm condition number; only computed in extra-precise mode.
    pub condition_number: Option<f64>,
}

/// The bordered (n+1)x(n+1) EEM system of one molecule.
///
/// ```text
/// | B_1        k/R_12  ...  1 | | q_1 |   | -A_1 |
/// | k/R_12     B_2     ...  1 | | q_2 | = | -A_2 |
/// | ...                       | | ... |   | ...  |
/// | 1          1       ...  0 | | -X  |   |  Q   |
/// ```
#[derive(Debug, Clone)]
pub struct EemSystem {
    matrix: PackedSymmetricMatrix,
    rhs: DVector<f64>,
}

impl EemSystem {
    /// Assembles the system for `molecule` with the per-atom-type `alpha`/`beta`
    /// parameters and the coupling strength `kappa`.
    pub fn assemble(
        molecule: &Molecule,
        kappa: f64,
        alpha: &[f64],
        beta: &[f64],
        source: DistanceSource,
    ) -> Self {
        let atoms = molecule.atoms();
        let n = atoms.len();
        let mut matrix = PackedSymmetricMatrix::zeros(n + 1);
        let mut rhs = DVector::zeros(n + 1);

        for (i, atom) in atoms.iter().enumerate() {
            matrix.set(i, i, beta[atom.atom_type]);
            for j in i + 1..n {
                matrix.set(i, j, kappa * molecule.reciprocal_distance(i, j, source));
            }
            matrix.set(i, n, 1.0);
            rhs[i] = -alpha[atom.atom_type];
        }
        matrix.set(n, n, 0.0);
        rhs[n] = molecule.total_charge();

        Self { matrix, rhs }
    }

    pub fn matrix(&self) -> &PackedSymmetricMatrix {
        &self.matrix
    }

    pub fn rhs(&self) -> &DVector<f64> {
        &self.rhs
    }

    pub fn is_finite(&self) -> bool {
        self.matrix.is_finite() && self.rhs.iter().all(|v| v.is_finite())
    }

    /// Solves the system with a pivoted LU factorization.
    pub fn solve(&self, precision: SolverPrecision) -> Result<EemSolution, SolveError> {
        if !self.is_finite() {
            return Err(SolveError::NonFinite);
        }

        let dense = self.matrix.to_dense();
        let lu = dense.clone().lu();
        let mut x = lu.solve(&self.rhs).ok_or(SolveError::Singular)?;

        let condition_number = match precision {
            SolverPrecision::Fast => None,
            SolverPrecision::ExtraPrecise => {
                let residual = &self.rhs - &dense * &x;
                if let Some(correction) = lu.solve(&residual) {
                    x += correction;
                }
                let inverse = lu.try_inverse().ok_or(SolveError::Singular)?;
                let inverse_norm = inverse
                    .column_iter()
                    .map(|c| c.iter().map(|v| v.abs()).sum::<f64>())
                    .fold(0.0, f64::max);
                Some(self.matrix.norm_one() * inverse_norm)
            }
        };

        if x.iter().any(|v| !v.is_finite()) {
            return Err(SolveError::Singular);
        }

        let n = x.len() - 1;
        Ok(EemSolution {
            charges: x.rows(0, n).iter().copied().collect(),
            electronegativity: -x[n],
            condition_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use nalgebra::Point3;

    fn diatomic(total_charge: f64) -> Molecule {
        let mut a = Atom::new("C", 6, 1, Point3::new(0.0, 0.0, 0.0));
        let mut b = Atom::new("O", 8, 1, Point3::new(1.0, 0.0, 0.0));
        a.atom_type = 0;
        b.atom_type = 1;
        Molecule::new("CO", vec![a, b], total_charge)
    }

    #[test]
    fn assembled_matrix_has_eem_structure() {
        let m = diatomic(0.0);
        let sys = EemSystem::assemble(&m, 0.5, &[5.0, 7.0], &[10.0, 12.0], DistanceSource::Geometry);
        let a = sys.matrix();
        assert_eq!(a.dim(), 3);
        assert_eq!(a.get(0, 0), 10.0);
        assert_eq!(a.get(1, 1), 12.0);
        assert_eq!(a.get(0, 1), 0.5);
        assert_eq!(a.get(0, 2), 1.0);
        assert_eq!(a.get(1, 2), 1.0);
        assert_eq!(a.get(2, 2), 0.0);
        assert_eq!(sys.rhs().as_slice(), &[-5.0, -7.0, 0.0]);
    }

    #[test]
    fn diatomic_solution_is_exact_and_neutral() {
        let m = diatomic(0.0);
        let sys = EemSystem::assemble(&m, 0.5, &[5.0, 7.0], &[10.0, 12.0], DistanceSource::Geometry);
        let solution = sys.solve(SolverPrecision::Fast).unwrap();
        assert!((solution.charges[0] - 2.0 / 21.0).abs() < 1e-10);
        assert!(solution.charges.iter().sum::<f64>().abs() < 1e-5);
        assert!(solution.condition_number.is_none());
    }

    #[test]
    fn charged_molecule_satisfies_total_charge() {
        let m = diatomic(-1.0);
        let sys = EemSystem::assemble(&m, 0.3, &[2.0, 3.0], &[8.0, 9.0], DistanceSource::Geometry);
        let solution = sys.solve(SolverPrecision::Fast).unwrap();
        assert!((solution.charges.iter().sum::<f64>() + 1.0).abs() < 1e-5);
    }

    #[test]
    fn extra_precise_agrees_with_fast_and_reports_condition() {
        let m = diatomic(0.0);
        let sys = EemSystem::assemble(&m, 0.5, &[5.0, 7.0], &[10.0, 12.0], DistanceSource::Geometry);
        let fast = sys.solve(SolverPrecision::Fast).unwrap();
        let precise = sys.solve(SolverPrecision::ExtraPrecise).unwrap();
        for (a, b) in fast.charges.iter().zip(&precise.charges) {
            assert!((a - b).abs() < 1e-10);
        }
        let cond = precise.condition_number.unwrap();
        assert!(cond >= 1.0 && cond < WARN_MAX_COND);
    }

    #[test]
    fn zero_hardness_without_coupling_is_singular() {
        let m = diatomic(0.0);
        let sys = EemSystem::assemble(&m, 0.0, &[0.0, 0.0], &[0.0, 0.0], DistanceSource::Geometry);
        assert_eq!(sys.solve(SolverPrecision::Fast), Err(SolveError::Singular));
    }

    #[test]
    fn non_finite_parameters_are_rejected_before_solving() {
        let m = diatomic(0.0);
        let sys = EemSystem::assemble(&m, 0.5, &[5.0, 7.0], &[f64::NAN, 12.0], DistanceSource::Geometry);
        assert!(!sys.is_finite());
        assert_eq!(sys.solve(SolverPrecision::ExtraPrecise), Err(SolveError::NonFinite));
    }

    #[test]
    fn coincident_atoms_produce_non_finite_system() {
        let mut m = diatomic(0.0);
        m = Molecule::new(
            "overlap",
            m.atoms()
                .iter()
                .cloned()
                .map(|mut a| {
                    a.position = Point3::origin();
                    a
                })
                .collect(),
            0.0,
        );
        let sys = EemSystem::assemble(&m, 0.5, &[5.0, 7.0], &[10.0, 12.0], DistanceSource::Geometry);
        assert_eq!(sys.solve(SolverPrecision::Fast), Err(SolveError::NonFinite));
    }
}
