//! Polynomial arithmetic backing the canonical forms.

pub mod multi;
pub mod rational;
pub mod univariate;

pub use multi::{Monomial, MultiPoly};
pub use rational::RationalFunction;
pub use univariate::Poly;
