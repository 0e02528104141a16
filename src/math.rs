//! Math backend for the synthesis core.
//! With the `libm` feature the required functions are re-exported from
//! `libm`. With the `std` feature the inherent `f64` methods are wrapped
//! in the same free-function shape, so the rest of the crate is written
//! once in the `sqrt(x)` style.

#[cfg(feature = "libm")]
pub(crate) use libm::{cos, exp, pow, round, sin, sqrt};

#[cfg(feature = "std")]
pub(crate) fn sqrt(x: f64) -> f64 {
    x.sqrt()
}
#[cfg(feature = "std")]
pub(crate) fn pow(base: f64, exponent: f64) -> f64 {
    base.powf(exponent)
}
#[cfg(feature = "std")]
pub(crate) fn cos(x: f64) -> f64 {
    x.cos()
}
#[cfg(feature = "std")]
pub(crate) fn sin(x: f64) -> f64 {
    x.sin()
}
#[cfg(feature = "std")]
pub(crate) fn exp(x: f64) -> f64 {
    x.exp()
}
#[cfg(feature = "std")]
pub(crate) fn round(x: f64) -> f64 {
    x.round()
}
