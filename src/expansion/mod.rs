//! Expansion of packed four-index tensors into full four-index tensors.
//!
//! A packed tensor $`T`$ of shape `(2, n_ij, n_kl)` stores, along its last two axes, collapsed
//! pair indices over the first two and the last two indices of a full tensor
//! $`F_{ijkl}`$. The diagonal pairs $`(0, 0), (1, 1), \ldots, (n - 1, n - 1)`$ come first,
//! followed (if present) by the strictly-lower pairs $`(1, 0), (2, 0), (2, 1), (3, 0), \ldots`$.
//! The first axis of $`T`$ holds two combinations from which the symmetric and antisymmetric
//! components
//!
//! ```math
//! V^{+}_{pq} = \tfrac{1}{2} (T_{0pq} + T_{1pq}), \qquad
//! V^{-}_{pq} = \tfrac{1}{2} (T_{0pq} - T_{1pq})
//! ```
//!
//! are formed. The full tensor is then
//!
//! ```math
//! F_{iikk} = V^{+}_{ik}, \qquad
//! F_{ijkl} = F_{jilk} = V^{+}_{MN}, \qquad
//! F_{ijlk} = F_{jikl} = V^{-}_{MN} \quad (i > j,\ k > l),
//! ```
//!
//! where $`M`$ and $`N`$ are the positions of the pairs $`(i, j)`$ and $`(k, l)`$ along the
//! packed pair axes. Every other element of $`F`$ is zero.

use std::fmt;

use itertools::iproduct;
use ndarray::{Array2, Array3, Array4, ArrayView3, Axis};

use crate::dump::checked_element_count;
use crate::error::TensorGrabError;


// ================
// Enum definitions
// ================

/// An enumerated type for the admissible layouts of a collapsed pair axis of a packed tensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PairLayout {
    /// Variant for a pair axis holding only the `n` diagonal pairs.
    DiagonalOnly,

    /// Variant for a pair axis holding the `n` diagonal pairs followed by the `n(n-1)/2`
    /// strictly-lower pairs.
    Complete,
}

impl fmt::Display for PairLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairLayout::DiagonalOnly => write!(f, "diagonal pairs only"),
            PairLayout::Complete => write!(f, "diagonal and strictly-lower pairs"),
        }
    }
}

/// An enumerated type for the component of the packed tensor assigned to a full-tensor element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Component {
    Plus,
    Minus,
}

// =========
// Functions
// =========

/// Returns the number of unordered pairs $`(i, j)`$ with $`j \le i < n`$, or `None` if this
/// number overflows.
pub fn n_pairs(n: usize) -> Option<usize> {
    if n % 2 == 0 {
        (n / 2).checked_mul(n.checked_add(1)?)
    } else {
        n.checked_mul(n.checked_add(1)? / 2)
    }
}

/// Classifies a collapsed pair axis of length `axis_len` over an index of dimension `n`.
///
/// # Returns
///
/// `None` if the axis length fits neither layout. If both layouts have the same length (`n`
/// at most one), [`PairLayout::Complete`] is returned.
pub fn pair_layout(n: usize, axis_len: usize) -> Option<PairLayout> {
    if n_pairs(n) == Some(axis_len) {
        Some(PairLayout::Complete)
    } else if axis_len == n {
        Some(PairLayout::DiagonalOnly)
    } else {
        None
    }
}

/// Computes the symmetric and antisymmetric components of a packed tensor.
///
/// # Arguments
///
/// * `packed` - The packed tensor of shape `(2, n_ij, n_kl)`.
///
/// # Returns
///
/// The pair $`(V^{+}, V^{-})`$, each of shape `(n_ij, n_kl)`.
pub fn plus_minus_components(
    packed: &Array3<f64>,
) -> Result<(Array2<f64>, Array2<f64>), TensorGrabError> {
    if packed.shape()[0] != 2 {
        return Err(TensorGrabError::ShapeMismatch(format!(
            "the first axis of a packed tensor must have length 2, but the packed tensor has \
            shape {:?}",
            packed.shape()
        )));
    }
    let t0 = packed.index_axis(Axis(0), 0);
    let t1 = packed.index_axis(Axis(0), 1);
    let v_plus = (&t0 + &t1) * 0.5;
    let v_minus = (&t0 - &t1) * 0.5;
    Ok((v_plus, v_minus))
}

/// Expands a packed tensor into a full four-index tensor.
///
/// # Arguments
///
/// * `packed` - The packed tensor of shape `(2, n_ij, n_kl)` indexed as `[z, y, x]`, as read in
/// by [`crate::dump::read_packed`].
/// * `shape` - The shape `(n, n, n', n')` of the full tensor. The two index pairs may range
/// over different dimensions; `n` need not equal `n'`.
///
/// # Returns
///
/// The full tensor.
///
/// # Errors
///
/// [`TensorGrabError::ShapeMismatch`] if `shape` is not of the form `(n, n, n', n')` or is too
/// large to allocate, if the first axis of `packed` does not have length 2, or if the pair axes
/// of `packed` fit neither [`PairLayout`] for `n` and `n'`, or fit different layouts.
pub fn expand(packed: &Array3<f64>, shape: [usize; 4]) -> Result<Array4<f64>, TensorGrabError> {
    let (v_plus, v_minus) = plus_minus_components(packed)?;
    let layouts = pair_layouts(packed.view(), shape)?;
    let mut full = Array4::<f64>::zeros(shape);
    for_each_assignment(shape, layouts, |target, m, nn, component| {
        full[target] = match component {
            Component::Plus => v_plus[[m, nn]],
            Component::Minus => v_minus[[m, nn]],
        };
    });
    Ok(full)
}

/// Marks the elements of the full tensor assigned by [`expand`].
///
/// Elements outside the mask are zero in the expanded tensor by construction, whatever the
/// physical quantity holds there.
///
/// # Arguments
///
/// * `packed` - The packed tensor.
/// * `shape` - The shape `(n, n, n', n')` of the full tensor.
///
/// # Returns
///
/// A boolean array of shape `shape`.
pub fn populated_mask(
    packed: &Array3<f64>,
    shape: [usize; 4],
) -> Result<Array4<bool>, TensorGrabError> {
    plus_minus_components(packed)?;
    let layouts = pair_layouts(packed.view(), shape)?;
    let mut mask = Array4::from_elem(shape, false);
    for_each_assignment(shape, layouts, |target, _, _, _| {
        mask[target] = true;
    });
    Ok(mask)
}

/// Validates a packed tensor against a full tensor shape and classifies its two pair axes.
fn pair_layouts(
    packed: ArrayView3<f64>,
    shape: [usize; 4],
) -> Result<(PairLayout, PairLayout), TensorGrabError> {
    let [n_ij, n_ij_2, n_kl, n_kl_2] = shape;
    if n_ij != n_ij_2 || n_kl != n_kl_2 {
        return Err(TensorGrabError::ShapeMismatch(format!(
            "the full tensor shape must be of the form (n, n, n', n'), but {shape:?} was requested"
        )));
    }
    if checked_element_count(&shape).is_none() {
        return Err(TensorGrabError::ShapeMismatch(format!(
            "the full tensor shape {shape:?} is too large"
        )));
    }
    let (_, n_ij_pairs, n_kl_pairs) = packed.dim();
    let ij_layout = pair_layout(n_ij, n_ij_pairs).ok_or_else(|| {
        TensorGrabError::ShapeMismatch(format!(
            "the ij pair axis of the packed tensor has length {n_ij_pairs}, but {n_ij} or \
            {n_ij}({n_ij} + 1)/2 is required for the full tensor shape {shape:?}"
        ))
    })?;
    let kl_layout = pair_layout(n_kl, n_kl_pairs).ok_or_else(|| {
        TensorGrabError::ShapeMismatch(format!(
            "the kl pair axis of the packed tensor has length {n_kl_pairs}, but {n_kl} or \
            {n_kl}({n_kl} + 1)/2 is required for the full tensor shape {shape:?}"
        ))
    })?;
    if ij_layout != kl_layout && n_ij > 1 && n_kl > 1 {
        return Err(TensorGrabError::ShapeMismatch(format!(
            "the ij pair axis of the packed tensor holds {ij_layout} whereas the kl pair axis \
            holds {kl_layout}"
        )));
    }
    log::debug!(
        "Expanding a packed tensor of shape {:?} ({ij_layout}) into a full tensor of shape \
        {shape:?}.",
        packed.shape()
    );
    Ok((ij_layout, kl_layout))
}

/// Walks through every assignment of the expansion in order.
///
/// `assign` receives the full-tensor index, the positions `M` and `NN` along the two packed
/// pair axes, and the component to be assigned.
fn for_each_assignment<F>(shape: [usize; 4], layouts: (PairLayout, PairLayout), mut assign: F)
where
    F: FnMut([usize; 4], usize, usize, Component),
{
    let [n_ij, _, n_kl, _] = shape;

    // Diagonal pairs: the pair position coincides with the index value.
    for (i, k) in iproduct!(0..n_ij, 0..n_kl) {
        assign([i, i, k, k], i, k, Component::Plus);
    }

    if layouts == (PairLayout::Complete, PairLayout::Complete) {
        // Strictly-lower pairs follow the diagonal pairs along both pair axes.
        let mut m = n_ij;
        for (i, j) in strictly_lower_pairs(n_ij) {
            let mut nn = n_kl;
            for (k, l) in strictly_lower_pairs(n_kl) {
                assign([i, j, k, l], m, nn, Component::Plus);
                assign([j, i, l, k], m, nn, Component::Plus);
                assign([i, j, l, k], m, nn, Component::Minus);
                assign([j, i, k, l], m, nn, Component::Minus);
                nn += 1;
            }
            m += 1;
        }
    }
}

/// Iterates over the pairs $`(i, j)`$ with $`j < i < n`$ in increasing $`i`$, then $`j`$.
fn strictly_lower_pairs(n: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n).flat_map(|i| (0..i).map(move |j| (i, j)))
}
