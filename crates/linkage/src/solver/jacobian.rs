//! Forward-difference Jacobian.

use nalgebra::{DMatrix, DVector};

/// `J[(i, j)] ≈ (f_i(x + δ e_j) - f_i(x)) / δ`, given `fx = f(x)`.
///
/// Components that do not depend on `x_j` come out as exact zeros, which the
/// selection heuristic relies on.
pub fn numerical_jacobian<F>(f: &F, x: &DVector<f64>, fx: &DVector<f64>, delta: f64) -> DMatrix<f64>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    let mut jac = DMatrix::zeros(fx.len(), x.len());
    let mut probe = x.clone();
    for j in 0..x.len() {
        let orig = probe[j];
        probe[j] = orig + delta;
        let column = (f(&probe) - fx) / delta;
        jac.set_column(j, &column);
        probe[j] = orig;
    }
    jac
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dvector;

    #[test]
    fn linear_map_recovers_matrix() {
        // f(x) = [2 x0 + x1, -x1]
        let f = |x: &DVector<f64>| dvector![2.0 * x[0] + x[1], -x[1]];
        let x = dvector![0.25, -0.5];
        let fx = f(&x);
        let jac = numerical_jacobian(&f, &x, &fx, 1e-7);
        assert!((jac[(0, 0)] - 2.0).abs() < 1e-6);
        assert!((jac[(0, 1)] - 1.0).abs() < 1e-6);
        assert_eq!(jac[(1, 0)], 0.0);
        assert!((jac[(1, 1)] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn nonsquare_shape() {
        let f = |x: &DVector<f64>| dvector![x[0] * x[2]];
        let x = dvector![1.0, 2.0, 3.0];
        let jac = numerical_jacobian(&f, &x, &f(&x), 1e-7);
        assert_eq!(jac.shape(), (1, 3));
        assert_eq!(jac[(0, 1)], 0.0);
        assert!((jac[(0, 0)] - 3.0).abs() < 1e-5);
    }
}
