//! Operator overloads so models read like algebra.
//!
//! Every combination of `Expr`, `&Expr`, `Variable`, `&Variable` and `f64`
//! produces an owned `Expr`. Terms merge through `Expr::accumulate`, so the
//! canonical form is kept by every operator.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::expr::core::Expr;
use crate::variable::Variable;

macro_rules! impl_add_sub {
    ($lhs:ty => $($rhs:ty),+) => {
        $(
            impl Add<$rhs> for $lhs {
                type Output = Expr;

                fn add(self, rhs: $rhs) -> Expr {
                    let mut out = Expr::from(self);
                    out.accumulate(&Expr::from(rhs), 1.0);
                    out
                }
            }

            impl Sub<$rhs> for $lhs {
                type Output = Expr;

                fn sub(self, rhs: $rhs) -> Expr {
                    let mut out = Expr::from(self);
                    out.accumulate(&Expr::from(rhs), -1.0);
                    out
                }
            }
        )+
    };
}

impl_add_sub!(Expr => Expr, &Expr, Variable, &Variable, f64);
impl_add_sub!(&Expr => Expr, &Expr, Variable, &Variable, f64);
impl_add_sub!(Variable => Expr, &Expr, Variable, &Variable, f64);
impl_add_sub!(&Variable => Expr, &Expr, Variable, &Variable, f64);
impl_add_sub!(f64 => Expr, &Expr, Variable, &Variable);

macro_rules! impl_scale {
    ($($operand:ty),+) => {
        $(
            impl Mul<f64> for $operand {
                type Output = Expr;

                fn mul(self, rhs: f64) -> Expr {
                    Expr::from(self).scale(rhs)
                }
            }

            impl Mul<$operand> for f64 {
                type Output = Expr;

                fn mul(self, rhs: $operand) -> Expr {
                    Expr::from(rhs).scale(self)
                }
            }

            /// Division by zero yields non-finite coefficients, which the model
            /// rejects on add. Use `Expr::checked_div` to fail early.
            impl Div<f64> for $operand {
                type Output = Expr;

                fn div(self, rhs: f64) -> Expr {
                    Expr::from(self).scale(1.0 / rhs)
                }
            }

            impl Neg for $operand {
                type Output = Expr;

                fn neg(self) -> Expr {
                    Expr::from(self).scale(-1.0)
                }
            }
        )+
    };
}

impl_scale!(Expr, &Expr, Variable, &Variable);

fn product_of(a: &Variable, b: &Variable) -> Expr {
    Expr::quadratic_term(a, b, 1.0)
}

macro_rules! impl_var_product {
    ($(($lhs:ty, $rhs:ty)),+) => {
        $(
            impl Mul<$rhs> for $lhs {
                type Output = Expr;

                fn mul(self, rhs: $rhs) -> Expr {
                    product_of(&self, &rhs)
                }
            }
        )+
    };
}

impl_var_product!(
    (Variable, Variable),
    (Variable, &Variable),
    (&Variable, Variable),
    (&Variable, &Variable)
);

macro_rules! impl_assign {
    ($($rhs:ty),+) => {
        $(
            impl AddAssign<$rhs> for Expr {
                fn add_assign(&mut self, rhs: $rhs) {
                    self.accumulate(&Expr::from(rhs), 1.0);
                }
            }

            impl SubAssign<$rhs> for Expr {
                fn sub_assign(&mut self, rhs: $rhs) {
                    self.accumulate(&Expr::from(rhs), -1.0);
                }
            }
        )+
    };
}

impl_assign!(Expr, &Expr, Variable, &Variable, f64);

impl MulAssign<f64> for Expr {
    fn mul_assign(&mut self, rhs: f64) {
        *self = self.scale(rhs);
    }
}

impl Sum for Expr {
    fn sum<I: Iterator<Item = Expr>>(iter: I) -> Self {
        iter.fold(Expr::zero(), |mut acc, expr| {
            acc.accumulate(&expr, 1.0);
            acc
        })
    }
}

impl<'a> Sum<&'a Expr> for Expr {
    fn sum<I: Iterator<Item = &'a Expr>>(iter: I) -> Self {
        iter.fold(Expr::zero(), |mut acc, expr| {
            acc.accumulate(expr, 1.0);
            acc
        })
    }
}

impl Sum<Variable> for Expr {
    fn sum<I: Iterator<Item = Variable>>(iter: I) -> Self {
        iter.fold(Expr::zero(), |mut acc, var| {
            acc.add_term(&var, 1.0);
            acc
        })
    }
}

impl<'a> Sum<&'a Variable> for Expr {
    fn sum<I: Iterator<Item = &'a Variable>>(iter: I) -> Self {
        iter.fold(Expr::zero(), |mut acc, var| {
            acc.add_term(var, 1.0);
            acc
        })
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use crate::expr::Expr;
    use crate::variable::Variable;

    #[test]
    fn mixed_operands_build_one_expression() {
        let x = Variable::new("x");
        let y = Variable::new("y");
        let e = 2.0 * &x + &y * 3.0 - 4.0 + x.clone();
        assert_eq!(e.coefficient(&x), 3.0);
        assert_eq!(e.coefficient(&y), 3.0);
        assert_eq!(e.constant(), -4.0);
    }

    #[test]
    fn constant_on_the_left() {
        let x = Variable::new("x");
        let e = 10.0 - &x;
        assert_eq!(e.constant(), 10.0);
        assert_eq!(e.coefficient(&x), -1.0);
    }

    #[test]
    fn division_and_negation_scale_everything() {
        let x = Variable::new("x");
        let e = -((&x * 4.0 + 2.0) / 2.0);
        assert_eq!(e.coefficient(&x), -2.0);
        assert_eq!(e.constant(), -1.0);
    }

    #[test]
    fn variable_product_is_quadratic() {
        let x = Variable::new("x");
        let y = Variable::new("y");
        let xy = &x * &y;
        let yx = &y * &x;
        assert_eq!(xy, yx);
        assert_eq!(xy.degree(), 2);
        assert!(!xy.is_linear());
    }

    #[test]
    fn assign_operators_accumulate_in_place() {
        let x = Variable::new("x");
        let mut e = Expr::zero();
        e += &x;
        e += 2.0;
        e -= Expr::term(&x, 0.5);
        e *= 4.0;
        assert_eq!(e.coefficient(&x), 2.0);
        assert_eq!(e.constant(), 8.0);
    }

    #[test]
    fn iterator_sum_over_variables_and_exprs() {
        let xs = Variable::builder().name("x").build_vec(3).unwrap();
        let total: Expr = xs.iter().sum();
        assert_eq!(total.num_linear_terms(), 3);

        let doubled: Expr = xs.iter().map(|x| x * 2.0).sum();
        assert!(xs.iter().all(|x| doubled.coefficient(x) == 2.0));
    }
}
