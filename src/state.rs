//! Random-phase states for stochastic trace estimation.

use num_complex::Complex;
use rand::Rng;

use crate::Real;

const TWO_PI: Real = (2.0 * std::f64::consts::PI) as Real;

/// Complex vector over atoms, stored as parallel real and imaginary arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct StateVector {
    pub real: Vec<Real>,
    pub imag: Vec<Real>,
}

impl StateVector {
    pub fn zeros(number_of_atoms: usize) -> Self {
        Self {
            real: vec![0.0; number_of_atoms],
            imag: vec![0.0; number_of_atoms],
        }
    }

    pub fn len(&self) -> usize {
        self.real.len()
    }

    pub fn is_empty(&self) -> bool {
        self.real.is_empty()
    }

    #[inline]
    pub fn amplitude(&self, n: usize) -> Complex<Real> {
        Complex::new(self.real[n], self.imag[n])
    }

    /// Overwrite with a fresh random-phase state.
    pub fn randomize<R: Rng>(&mut self, spin: bool, rng: &mut R) {
        fill_random_state(&mut self.real, &mut self.imag, spin, rng);
    }
}

#[inline]
fn random_phase<R: Rng>(rng: &mut R) -> Complex<Real> {
    let theta: Real = rng.gen_range(0.0..TWO_PI);
    Complex::new(theta.cos(), theta.sin())
}

/// Fill `real`/`imag` with unit-modulus amplitudes of uniform random phase.
///
/// In spin mode atoms come in pairs `(2k, 2k + 1)`: two phases are drawn per
/// pair, the even atom takes the first and the odd atom is set to zero.
/// No normalization is applied.
pub fn fill_random_state<R: Rng>(real: &mut [Real], imag: &mut [Real], spin: bool, rng: &mut R) {
    assert_eq!(real.len(), imag.len(), "state buffers differ in length");
    let n = real.len();

    if spin {
        for even in (0..n).step_by(2) {
            let up = random_phase(rng);
            // The odd partner's draw is consumed so the sequence stays pairwise.
            let _down = random_phase(rng);
            real[even] = up.re;
            imag[even] = up.im;
            if even + 1 < n {
                real[even + 1] = 0.0;
                imag[even + 1] = 0.0;
            }
        }
    } else {
        for (re, im) in real.iter_mut().zip(imag.iter_mut()) {
            let z = random_phase(rng);
            *re = z.re;
            *im = z.im;
        }
    }
}
