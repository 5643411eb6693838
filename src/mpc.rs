//! The MPC AND gate (SPEC_FULL.md §4.5/§4.6): the one non-linear operation a
//! [`crate::share::ShareTriple`] can't lift on its own, since AND of two secrets needs
//! the simulated parties to exchange their masked products.

use crate::bitblock::BitBlock;
use crate::cpu::KernelPreference;
use crate::error::CoreError;
use crate::gf2;
use crate::share::ShareTriple;

/// Per-party transcript of AND-gate outputs, one fixed-width row per party. Each call
/// to `mpc_and_proof`/`mpc_and_verify` XORs a new gate's (shifted) output bits into the
/// row at `viewshift`, so a single `View` accumulates an entire circuit's worth of
/// AND-gate outputs across repeated calls.
pub struct View {
    pub s: [BitBlock; 3],
}

impl View {
    pub fn new(n_cols: usize) -> Result<Self, CoreError> {
        Ok(Self { s: [BitBlock::new(n_cols)?, BitBlock::new(n_cols)?, BitBlock::new(n_cols)?] })
    }
}

fn and_gate_core(
    x: [&BitBlock; 2],
    y: [&BitBlock; 2],
    r: [&BitBlock; 2],
    out: &mut BitBlock,
    pref: KernelPreference,
) -> Result<(), CoreError> {
    let n = out.n_cols();
    let mut t_xm_ym = BitBlock::new(n)?;
    gf2::and(&mut t_xm_ym, x[0], y[0], pref)?;
    let mut t_xj_ym = BitBlock::new(n)?;
    gf2::and(&mut t_xj_ym, x[1], y[0], pref)?;
    let mut t_xm_yj = BitBlock::new(n)?;
    gf2::and(&mut t_xm_yj, x[0], y[1], pref)?;

    let mut acc = BitBlock::new(n)?;
    gf2::xor(&mut acc, &t_xm_ym, &t_xj_ym, pref)?;
    let mut acc2 = BitBlock::new(n)?;
    gf2::xor(&mut acc2, &acc, &t_xm_yj, pref)?;
    let mut acc3 = BitBlock::new(n)?;
    gf2::xor(&mut acc3, &acc2, r[0], pref)?;
    gf2::xor(out, &acc3, r[1], pref)
}

/// Proof-mode AND gate: evaluates all three parties' shares of `x ∧ y` (SPEC_FULL.md
/// §4.5). `r` is a freshly drawn randomness triple; `buf` is scratch space, one
/// `BitBlock` per party, reused instead of allocated per call.
///
/// Ordering: every `z[m]` is computed into `buf` before any `view.s[m]` is touched,
/// since a caller may alias the same view buffer across AND gates within one round.
pub fn mpc_and_proof(
    res: &mut ShareTriple,
    x: &ShareTriple,
    y: &ShareTriple,
    r: &[BitBlock; 3],
    view: &mut View,
    viewshift: usize,
    buf: &mut [BitBlock; 3],
    pref: KernelPreference,
) -> Result<(), CoreError> {
    let n = x.n_cols();
    if y.n_cols() != n || res.n_cols() != n {
        return Err(CoreError::dimension_mismatch("mpc_and_proof shares", n, y.n_cols()));
    }
    if viewshift >= 64 {
        return Err(CoreError::ContractViolation("viewshift must be < 64"));
    }

    for m in 0..3 {
        let j = (m + 1) % 3;
        and_gate_core([&x.shares[m], &x.shares[j]], [&y.shares[m], &y.shares[j]], [&r[m], &r[j]], &mut buf[m], pref)?;
    }

    for m in 0..3 {
        let mut shifted = BitBlock::new(n)?;
        gf2::shr(&mut shifted, &buf[m], viewshift)?;
        let mut updated = BitBlock::new(n)?;
        gf2::xor(&mut updated, &view.s[m], &shifted, pref)?;
        view.s[m].copy_from(&updated)?;
        res.shares[m].copy_from(&buf[m])?;
    }
    Ok(())
}

/// Verify-mode AND gate: the verifier holds the opened shares of two parties (`x[0],
/// x[1]`, `y[0], y[1]`, `r[0], r[1]`) and the prover's committed transcript for the
/// hidden third party in `view.s[1]`. Recomputes `z[0]` (folding it into `view.s[0]`,
/// for the surrounding transcript check to compare against the prover's commitment)
/// and recovers `z[1]` directly from the committed view (SPEC_FULL.md §4.6).
pub fn mpc_and_verify(
    res: &mut [BitBlock; 2],
    x: &[BitBlock; 2],
    y: &[BitBlock; 2],
    r: &[BitBlock; 2],
    view: &mut View,
    mask: &BitBlock,
    viewshift: usize,
    buf: &mut BitBlock,
    pref: KernelPreference,
) -> Result<(), CoreError> {
    let n = x[0].n_cols();
    if y[0].n_cols() != n || r[0].n_cols() != n || mask.n_cols() != n {
        return Err(CoreError::dimension_mismatch("mpc_and_verify shares", n, y[0].n_cols()));
    }
    if viewshift >= 64 {
        return Err(CoreError::ContractViolation("viewshift must be < 64"));
    }

    and_gate_core([&x[0], &x[1]], [&y[0], &y[1]], [&r[0], &r[1]], buf, pref)?;

    let mut shifted = BitBlock::new(n)?;
    gf2::shr(&mut shifted, buf, viewshift)?;
    let mut updated = BitBlock::new(n)?;
    gf2::xor(&mut updated, &view.s[0], &shifted, pref)?;
    view.s[0].copy_from(&updated)?;
    res[0].copy_from(buf)?;

    let mut recovered = BitBlock::new(n)?;
    gf2::shl(&mut recovered, &view.s[1], viewshift)?;
    gf2::and(&mut res[1], &recovered, mask, pref)
}
