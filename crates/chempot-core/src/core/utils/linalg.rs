use nalgebra::{DMatrix, DVector};

/// Determinants below this magnitude are treated as singular.
pub const DEFAULT_SINGULAR_TOLERANCE: f64 = 1e-10;

/// Solves the square system `a · x = b` by LU decomposition.
///
/// Returns `None` when the matrix is not square, is singular (absolute determinant
/// below `singular_tolerance`), or the solution is not finite.
pub fn solve_dense(
    a: DMatrix<f64>,
    b: &DVector<f64>,
    singular_tolerance: f64,
) -> Option<DVector<f64>> {
    if !a.is_square() || a.nrows() != b.len() {
        return None;
    }
    let lu = a.lu();
    let det = lu.determinant();
    if !det.is_finite() || det.abs() < singular_tolerance {
        return None;
    }
    lu.solve(b).filter(|x| x.iter().all(|v| v.is_finite()))
}
