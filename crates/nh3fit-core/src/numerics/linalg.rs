//! Partial-pivot LU factorization for real dense matrices.
//!
//! Backs the damped normal equations and the covariance inversion of the
//! Levenberg-Marquardt solver. The ill-conditioned pivot guard only applies
//! to inversion: a damped solve stays well-conditioned by construction, while
//! a covariance inverse of a degenerate fit must be refused rather than
//! returned full of noise.

use faer::Mat;

pub type DenseMatrix = Mat<f64>;

const SINGULAR_PIVOT_EPSILON: f64 = 1.0e-15;
const ILL_CONDITIONED_RELATIVE_PIVOT_EPSILON: f64 = 1.0e-12;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LuError {
    #[error("LU factorization requires a square matrix, got {rows}x{cols}")]
    NonSquareMatrix { rows: usize, cols: usize },
    #[error("LU factorization requires a non-empty matrix")]
    EmptyMatrix,
    #[error("matrix is singular at pivot index {pivot_index}")]
    SingularMatrix { pivot_index: usize },
    #[error("matrix is ill-conditioned at pivot index {pivot_index}")]
    IllConditionedMatrix { pivot_index: usize },
    #[error("right-hand side length mismatch: expected {expected}, got {actual}")]
    RhsLengthMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Clone)]
pub struct LuDecomposition {
    lu: DenseMatrix,
    pivots: Vec<usize>,
    input_norm_infty: f64,
}

impl LuDecomposition {
    pub fn dimension(&self) -> usize {
        self.lu.nrows()
    }

    pub fn pivots(&self) -> &[usize] {
        &self.pivots
    }

    pub fn invert(&self) -> Result<DenseMatrix, LuError> {
        let dimension = self.dimension();
        let mut inverse = DenseMatrix::zeros(dimension, dimension);
        let mut basis = vec![0.0f64; dimension];

        for pivot_index in 0..dimension {
            let diagonal = self.lu[(pivot_index, pivot_index)];
            if diagonal.abs() <= self.input_norm_infty * ILL_CONDITIONED_RELATIVE_PIVOT_EPSILON {
                return Err(LuError::IllConditionedMatrix { pivot_index });
            }
        }

        for col in 0..dimension {
            basis.fill(0.0);
            basis[col] = 1.0;

            let solution = self.solve(&basis)?;
            for row in 0..dimension {
                inverse[(row, col)] = solution[row];
            }
        }

        Ok(inverse)
    }

    pub fn solve(&self, rhs: &[f64]) -> Result<Vec<f64>, LuError> {
        let dimension = self.dimension();
        if rhs.len() != dimension {
            return Err(LuError::RhsLengthMismatch {
                expected: dimension,
                actual: rhs.len(),
            });
        }

        let mut forward = vec![0.0f64; dimension];
        for row in 0..dimension {
            let mut value = rhs[self.pivots[row]];
            for col in 0..row {
                value -= self.lu[(row, col)] * forward[col];
            }
            forward[row] = value;
        }

        let mut solution = vec![0.0f64; dimension];
        for row in (0..dimension).rev() {
            let mut value = forward[row];
            for col in (row + 1)..dimension {
                value -= self.lu[(row, col)] * solution[col];
            }

            let diagonal = self.lu[(row, row)];
            if diagonal.abs() <= SINGULAR_PIVOT_EPSILON {
                return Err(LuError::SingularMatrix { pivot_index: row });
            }

            solution[row] = value / diagonal;
        }

        Ok(solution)
    }
}

pub fn lu_factorize(matrix: &DenseMatrix) -> Result<LuDecomposition, LuError> {
    let dimension = validate_square_shape(matrix)?;
    let input_norm_infty = matrix_infinity_norm(matrix);
    let mut lu = matrix.clone();
    let mut pivots: Vec<usize> = (0..dimension).collect();

    for pivot_col in 0..dimension {
        let (pivot_row, pivot_magnitude) = select_pivot_row(&lu, pivot_col);
        if pivot_magnitude <= SINGULAR_PIVOT_EPSILON {
            return Err(LuError::SingularMatrix {
                pivot_index: pivot_col,
            });
        }

        if pivot_row != pivot_col {
            swap_rows(&mut lu, pivot_col, pivot_row);
            pivots.swap(pivot_col, pivot_row);
        }

        let pivot = lu[(pivot_col, pivot_col)];
        for row in (pivot_col + 1)..dimension {
            lu[(row, pivot_col)] /= pivot;
            let multiplier = lu[(row, pivot_col)];
            for col in (pivot_col + 1)..dimension {
                let updated = lu[(row, col)] - multiplier * lu[(pivot_col, col)];
                lu[(row, col)] = updated;
            }
        }
    }

    Ok(LuDecomposition {
        lu,
        pivots,
        input_norm_infty,
    })
}

pub fn lu_solve(matrix: &DenseMatrix, rhs: &[f64]) -> Result<Vec<f64>, LuError> {
    lu_factorize(matrix)?.solve(rhs)
}

pub fn lu_invert(matrix: &DenseMatrix) -> Result<DenseMatrix, LuError> {
    lu_factorize(matrix)?.invert()
}

fn validate_square_shape(matrix: &DenseMatrix) -> Result<usize, LuError> {
    let rows = matrix.nrows();
    let cols = matrix.ncols();
    if rows == 0 || cols == 0 {
        return Err(LuError::EmptyMatrix);
    }
    if rows != cols {
        return Err(LuError::NonSquareMatrix { rows, cols });
    }

    Ok(rows)
}

fn select_pivot_row(matrix: &DenseMatrix, pivot_col: usize) -> (usize, f64) {
    let dimension = matrix.nrows();
    let mut best_row = pivot_col;
    let mut best_magnitude = matrix[(pivot_col, pivot_col)].abs();

    for row in (pivot_col + 1)..dimension {
        let magnitude = matrix[(row, pivot_col)].abs();
        if magnitude > best_magnitude {
            best_magnitude = magnitude;
            best_row = row;
        }
    }

    (best_row, best_magnitude)
}

fn swap_rows(matrix: &mut DenseMatrix, lhs: usize, rhs: usize) {
    if lhs == rhs {
        return;
    }

    for col in 0..matrix.ncols() {
        let value = matrix[(lhs, col)];
        matrix[(lhs, col)] = matrix[(rhs, col)];
        matrix[(rhs, col)] = value;
    }
}

fn matrix_infinity_norm(matrix: &DenseMatrix) -> f64 {
    let mut best_row_sum: f64 = 0.0;
    for row in 0..matrix.nrows() {
        let mut row_sum = 0.0;
        for col in 0..matrix.ncols() {
            row_sum += matrix[(row, col)].abs();
        }
        best_row_sum = best_row_sum.max(row_sum);
    }
    best_row_sum
}

#[cfg(test)]
mod tests {
    use super::{DenseMatrix, LuError, lu_factorize, lu_invert, lu_solve};

    fn dense_matrix(rows: &[Vec<f64>]) -> DenseMatrix {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, |row| row.len());
        assert!(
            rows.iter().all(|row| row.len() == ncols),
            "all matrix rows must have the same width"
        );

        let mut matrix = DenseMatrix::zeros(nrows, ncols);
        for (row_index, row) in rows.iter().enumerate() {
            for (col_index, value) in row.iter().enumerate() {
                matrix[(row_index, col_index)] = *value;
            }
        }
        matrix
    }

    fn matvec(matrix: &DenseMatrix, vector: &[f64]) -> Vec<f64> {
        let nrows = matrix.nrows();
        let ncols = matrix.ncols();
        assert_eq!(vector.len(), ncols, "vector length must match matrix columns");

        let mut output = vec![0.0f64; nrows];
        for row in 0..nrows {
            let mut sum = 0.0;
            for col in 0..ncols {
                sum += matrix[(row, col)] * vector[col];
            }
            output[row] = sum;
        }
        output
    }

    #[test]
    fn lu_solve_recovers_known_solution() {
        let matrix = dense_matrix(&[
            vec![0.0, 2.0, 1.0],
            vec![1.0, -2.0, -3.0],
            vec![2.0, 3.0, 1.0],
        ]);
        let expected = vec![1.0, 2.0, -0.5];
        let rhs = matvec(&matrix, &expected);

        let actual = lu_solve(&matrix, &rhs).expect("solve");
        for (a, b) in expected.iter().zip(&actual) {
            assert!((a - b).abs() < 1.0e-12);
        }
    }

    #[test]
    fn lu_factorize_rejects_non_square_matrices() {
        let matrix = DenseMatrix::zeros(2, 3);
        let error = lu_factorize(&matrix).expect_err("non-square matrix should fail");
        assert_eq!(error, LuError::NonSquareMatrix { rows: 2, cols: 3 });
    }

    #[test]
    fn lu_factorize_rejects_singular_matrices() {
        let matrix = dense_matrix(&[vec![1.0, 2.0], vec![2.0, 4.0]]);
        let error = lu_factorize(&matrix).expect_err("singular matrix should fail");
        assert_eq!(error, LuError::SingularMatrix { pivot_index: 1 });
    }

    #[test]
    fn lu_solve_validates_rhs_dimension() {
        let matrix = dense_matrix(&[vec![3.0, 1.0], vec![1.0, 2.0]]);
        let decomposition = lu_factorize(&matrix).expect("decomposition");

        let error = decomposition
            .solve(&[1.0])
            .expect_err("rhs mismatch should fail");
        assert_eq!(
            error,
            LuError::RhsLengthMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn lu_invert_recovers_identity_when_recomposed() {
        let matrix = dense_matrix(&[
            vec![1.5, -2.0, 0.5],
            vec![0.75, 3.0, -1.0],
            vec![2.0, 1.25, 2.5],
        ]);

        let inverse = lu_invert(&matrix).expect("inverse");
        for row in 0..3 {
            for col in 0..3 {
                let mut sum = 0.0;
                for k in 0..3 {
                    sum += matrix[(row, k)] * inverse[(k, col)];
                }
                let expected = if row == col { 1.0 } else { 0.0 };
                assert!((sum - expected).abs() < 1.0e-10);
            }
        }
    }

    #[test]
    fn lu_invert_rejects_ill_conditioned_matrices() {
        let matrix = dense_matrix(&[vec![1.0, 1.0], vec![1.0, 1.0 + 1.0e-14]]);
        let error = lu_invert(&matrix).expect_err("ill-conditioned matrix should fail");
        assert_eq!(error, LuError::IllConditionedMatrix { pivot_index: 1 });
    }
}
