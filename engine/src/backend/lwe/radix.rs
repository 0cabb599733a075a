//! Ripple-carry integer circuits over two's-complement [LweBit] vectors,
//! least significant bit first. Results are truncated to the operand width.

use crate::{
    backend::lwe::{LweBit, LweEvaluationKey, gates::not},
    trace::CmpOp,
};

pub(crate) fn add(ek: &LweEvaluationKey, x: &[LweBit], y: &[LweBit]) -> Vec<LweBit> {
    add_with_carry(ek, x, y, LweBit::Trivial(false))
}

/// `x - y = x + !y + 1`.
pub(crate) fn sub(ek: &LweEvaluationKey, x: &[LweBit], y: &[LweBit]) -> Vec<LweBit> {
    let not_y: Vec<LweBit> = y.iter().map(not).collect();
    add_with_carry(ek, x, &not_y, LweBit::Trivial(true))
}

pub(crate) fn neg(ek: &LweEvaluationKey, x: &[LweBit]) -> Vec<LweBit> {
    sub(ek, &zeros(x.len()), x)
}

fn add_with_carry(ek: &LweEvaluationKey, x: &[LweBit], y: &[LweBit], mut carry: LweBit) -> Vec<LweBit> {
    debug_assert_eq!(x.len(), y.len());
    let w: usize = x.len();
    let mut res: Vec<LweBit> = Vec::with_capacity(w);
    for i in 0..w {
        let t: LweBit = ek.xor(&x[i], &y[i]);
        res.push(ek.xor(&t, &carry));
        if i + 1 < w {
            carry = ek.maj(&x[i], &y[i], &carry);
        }
    }
    res
}

/// Signed `x < y`.
///
/// Runs the carry chain of `x + !y + 1` over all bits; the sign of the
/// untruncated difference is `x[w-1] ^ !y[w-1] ^ carry`.
pub(crate) fn less_than(ek: &LweEvaluationKey, x: &[LweBit], y: &[LweBit]) -> LweBit {
    debug_assert_eq!(x.len(), y.len());
    let w: usize = x.len();
    let not_y: Vec<LweBit> = y.iter().map(not).collect();
    let mut carry: LweBit = LweBit::Trivial(true);
    for i in 0..w {
        carry = ek.maj(&x[i], &not_y[i], &carry);
    }
    let top: LweBit = ek.xor(&x[w - 1], &not_y[w - 1]);
    ek.xor(&top, &carry)
}

/// `cmp(x, y)` as an integer in `{0, 1}`.
pub(crate) fn compare(ek: &LweEvaluationKey, cmp: CmpOp, x: &[LweBit], y: &[LweBit]) -> Vec<LweBit> {
    let bit: LweBit = match cmp {
        CmpOp::Lt => less_than(ek, x, y),
        CmpOp::Gt => less_than(ek, y, x),
        CmpOp::Ge => not(&less_than(ek, x, y)),
    };
    let mut res: Vec<LweBit> = zeros(x.len());
    res[0] = bit;
    res
}

/// Shift-and-add product. Partial products are taken along the operand with
/// the most public zero bits, which a comparison result has all but one of.
pub(crate) fn mul(ek: &LweEvaluationKey, x: &[LweBit], y: &[LweBit]) -> Vec<LweBit> {
    debug_assert_eq!(x.len(), y.len());
    let (x, y) = if public_zeros(x) > public_zeros(y) { (y, x) } else { (x, y) };
    let w: usize = x.len();
    let mut res: Vec<LweBit> = zeros(w);
    for (j, yj) in y.iter().enumerate() {
        let partial: Vec<LweBit> = match yj {
            LweBit::Trivial(false) => continue,
            LweBit::Trivial(true) => shift_left(x, j, w),
            LweBit::Encrypted(_) => {
                let masked: Vec<LweBit> = x[..w - j].iter().map(|xi| ek.and(xi, yj)).collect();
                shift_left(&masked, j, w)
            }
        };
        res = add(ek, &res, &partial);
    }
    res
}

/// `x * c` for a public `c`, already reduced to the operand width.
pub(crate) fn mul_const(ek: &LweEvaluationKey, x: &[LweBit], c: i64) -> Vec<LweBit> {
    if c < 0 {
        neg(ek, &mul_unsigned_const(ek, x, c.unsigned_abs()))
    } else {
        mul_unsigned_const(ek, x, c as u64)
    }
}

fn mul_unsigned_const(ek: &LweEvaluationKey, x: &[LweBit], c: u64) -> Vec<LweBit> {
    let w: usize = x.len();
    let mut res: Vec<LweBit> = zeros(w);
    for j in 0..w.min(u64::BITS as usize) {
        if (c >> j) & 1 == 1 {
            res = add(ek, &res, &shift_left(x, j, w));
        }
    }
    res
}

/// `x << j` on `w` bits.
fn shift_left(x: &[LweBit], j: usize, w: usize) -> Vec<LweBit> {
    let j: usize = j.min(w);
    let mut res: Vec<LweBit> = zeros(j);
    res.extend(x.iter().take(w - j).cloned());
    res.resize(w, LweBit::Trivial(false));
    res
}

fn zeros(w: usize) -> Vec<LweBit> {
    vec![LweBit::Trivial(false); w]
}

fn public_zeros(x: &[LweBit]) -> usize {
    x.iter().filter(|b| matches!(b, LweBit::Trivial(false))).count()
}
