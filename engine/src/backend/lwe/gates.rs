use crate::backend::lwe::{LweBit, LweCiphertext, LweEvaluationKey, MU};

/// Free: negates the phase.
pub(crate) fn not(x: &LweBit) -> LweBit {
    match x {
        LweBit::Trivial(b) => LweBit::Trivial(!b),
        LweBit::Encrypted(ct) => LweBit::Encrypted(LweCiphertext::new(
            ct.a().iter().map(|x| x.wrapping_neg()).collect(),
            ct.b().wrapping_neg(),
        )),
    }
}

impl LweEvaluationKey {
    pub(crate) fn and(&self, x: &LweBit, y: &LweBit) -> LweBit {
        match (x, y) {
            (LweBit::Trivial(false), _) | (_, LweBit::Trivial(false)) => LweBit::Trivial(false),
            (LweBit::Trivial(true), other) | (other, LweBit::Trivial(true)) => other.clone(),
            (LweBit::Encrypted(a), LweBit::Encrypted(b)) => self.gate(&[(a, 1), (b, 1)], MU.wrapping_neg()),
        }
    }

    pub(crate) fn or(&self, x: &LweBit, y: &LweBit) -> LweBit {
        match (x, y) {
            (LweBit::Trivial(true), _) | (_, LweBit::Trivial(true)) => LweBit::Trivial(true),
            (LweBit::Trivial(false), other) | (other, LweBit::Trivial(false)) => other.clone(),
            (LweBit::Encrypted(a), LweBit::Encrypted(b)) => self.gate(&[(a, 1), (b, 1)], MU),
        }
    }

    pub(crate) fn xor(&self, x: &LweBit, y: &LweBit) -> LweBit {
        match (x, y) {
            (LweBit::Trivial(k), other) | (other, LweBit::Trivial(k)) => {
                if *k {
                    not(other)
                } else {
                    other.clone()
                }
            }
            (LweBit::Encrypted(a), LweBit::Encrypted(b)) => self.gate(&[(a, 2), (b, 2)], MU << 1),
        }
    }

    /// Majority of three bits, the carry of a full adder.
    pub(crate) fn maj(&self, x: &LweBit, y: &LweBit, z: &LweBit) -> LweBit {
        match (x, y, z) {
            (LweBit::Trivial(k), p, q) | (p, LweBit::Trivial(k), q) | (p, q, LweBit::Trivial(k)) => {
                if *k {
                    self.or(p, q)
                } else {
                    self.and(p, q)
                }
            }
            (LweBit::Encrypted(a), LweBit::Encrypted(b), LweBit::Encrypted(c)) => {
                self.gate(&[(a, 1), (b, 1), (c, 1)], 0)
            }
        }
    }

    /// Bootstraps `constant + sum_i k_i * ct_i`.
    fn gate(&self, terms: &[(&LweCiphertext, u64)], constant: u64) -> LweBit {
        let n: usize = self.ksk.n_out();
        let mut a: Vec<u64> = vec![0u64; n];
        let mut b: u64 = constant;
        for (ct, k) in terms.iter() {
            debug_assert_eq!(ct.a().len(), n);
            a.iter_mut()
                .zip(ct.a().iter())
                .for_each(|(r, x)| *r = r.wrapping_add(x.wrapping_mul(*k)));
            b = b.wrapping_add(ct.b().wrapping_mul(*k));
        }
        LweBit::Encrypted(self.bootstrap(&LweCiphertext::new(a, b)))
    }
}
