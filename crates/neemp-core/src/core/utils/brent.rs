//! One-dimensional minimization by Brent's method (golden section with
//! parabolic interpolation).

const CGOLD: f64 = 0.3819660;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrentOptions {
    pub max_iterations: usize,
    /// Relative tolerance on the abscissa.
    pub tolerance: f64,
    /// Absolute floor added to the tolerance, guards a minimum at zero.
    pub zeps: f64,
}

impl Default for BrentOptions {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            tolerance: 0.001,
            zeps: 1e-10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrentMinimum {
    pub x: f64,
    pub fx: f64,
    pub iterations: usize,
    pub evaluations: usize,
    /// Abscissa of the last call to the objective.
    pub last_evaluated: f64,
    pub converged: bool,
}

#[inline]
fn sign(a: f64, b: f64) -> f64 {
    if b >= 0.0 { a.abs() } else { -a.abs() }
}

/// Minimizes `f` on `[a, b]`, starting from the midpoint.
pub fn minimize<F>(mut f: F, a: f64, b: f64, options: &BrentOptions) -> BrentMinimum
where
    F: FnMut(f64) -> f64,
{
    let (mut a, mut b) = if a <= b { (a, b) } else { (b, a) };

    let mut x = 0.5 * (a + b);
    let mut w = x;
    let mut v = x;
    let mut fx = f(x);
    let mut fw = fx;
    let mut fv = fx;
    let mut d: f64 = 0.0;
    let mut e: f64 = 0.0;

    let mut evaluations = 1;
    let mut last_evaluated = x;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < options.max_iterations {
        let xm = 0.5 * (a + b);
        let tol1 = options.tolerance * x.abs() + options.zeps;
        let tol2 = 2.0 * tol1;

        if (x - xm).abs() <= tol2 - 0.5 * (b - a) {
            converged = true;
            break;
        }
        iterations += 1;

        if e.abs() > tol1 {
            let r = (x - w) * (fx - fv);
            let mut q = (x - v) * (fx - fw);
            let mut p = (x - v) * q - (x - w) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            let etemp = e;
            e = d;

            if p.abs() >= (0.5 * q * etemp).abs() || p <= q * (a - x) || p >= q * (b - x) {
                e = if x >= xm { a - x } else { b - x };
                d = CGOLD * e;
            } else {
                d = p / q;
                let u = x + d;
                if u - a < tol2 || b - u < tol2 {
                    d = sign(tol1, xm - x);
                }
            }
        } else {
            e = if x >= xm { a - x } else { b - x };
            d = CGOLD * e;
        }

        let u = if d.abs() >= tol1 { x + d } else { x + sign(tol1, d) };
        let fu = f(u);
        evaluations += 1;
        last_evaluated = u;

        if fu <= fx {
            if u >= x {
                a = x;
            } else {
                b = x;
            }
            v = w;
            fv = fw;
            w = x;
            fw = fx;
            x = u;
            fx = fu;
        } else {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || (w - x).abs() < options.tolerance {
                v = w;
                fv = fw;
                w = u;
                fw = fu;
            } else if fu <= fv || (v - x).abs() < options.tolerance || (v - w).abs() < options.tolerance {
                v = u;
                fv = fu;
            }
        }
    }

    BrentMinimum {
        x,
        fx,
        iterations,
        evaluations,
        last_evaluated,
        converged,
    }
}
