use std::ops::Range;

use ndarray::{prelude::*, Data};
use serde::{Deserialize, Serialize};

use crate::{MlErr, Result};

/// The matrix type threaded through the layers.
///
/// Operations on it are treated as value-returning: a matrix handed to a layer or an optimizer is
/// never written in place.
pub type Matrix = Array2<f32>;

/// Margins added around a matrix by `MatrixExt::padded`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Padding {
    pub up: usize,
    pub down: usize,
    pub left: usize,
    pub right: usize,
}

impl Padding {
    /// Returns a new `Padding`.
    pub fn new(up: usize, down: usize, left: usize, right: usize) -> Self {
        Self {
            up,
            down,
            left,
            right,
        }
    }

    /// The same margin on every side.
    pub fn uniform(margin: usize) -> Self {
        Self::new(margin, margin, margin, margin)
    }
}

/// Shape-checked matrix primitives.
///
/// `ndarray` panics on incompatible operands, these return `MlErr::ShapeMismatch` instead so a
/// misconfigured layer surfaces as an error at the call site.
pub trait MatrixExt {
    /// Matrix product `self · rhs`.
    fn matmul(&self, rhs: ArrayView2<f32>) -> Result<Matrix>;

    /// Elementwise `self + rhs`. A single column `rhs` with `self`'s row count is broadcast across
    /// every column of `self`.
    fn broadcast_add(&self, rhs: ArrayView2<f32>) -> Result<Matrix>;

    /// Elementwise `self - rhs`, both operands of the same shape.
    fn checked_sub(&self, rhs: ArrayView2<f32>) -> Result<Matrix>;

    /// `self * scalar`.
    fn scale(&self, scalar: f32) -> Matrix;

    /// Surrounds the matrix with `padding`, filling the new cells with `fill`.
    fn padded(&self, padding: Padding, fill: f32) -> Matrix;

    /// Copies the half-open sub-rectangle `rows` x `cols`.
    fn cut(&self, rows: Range<usize>, cols: Range<usize>) -> Result<Matrix>;
}

impl<S> MatrixExt for ArrayBase<S, Ix2>
where
    S: Data<Elem = f32>,
{
    fn matmul(&self, rhs: ArrayView2<f32>) -> Result<Matrix> {
        if self.ncols() != rhs.nrows() {
            return Err(MlErr::shape("matmul", rhs.dim(), (self.ncols(), rhs.ncols())));
        }

        Ok(self.view().dot(&rhs))
    }

    fn broadcast_add(&self, rhs: ArrayView2<f32>) -> Result<Matrix> {
        let Some(rhs) = rhs.broadcast(self.dim()) else {
            return Err(MlErr::shape("add", rhs.dim(), (self.nrows(), 1)));
        };

        Ok(&self.view() + &rhs)
    }

    fn checked_sub(&self, rhs: ArrayView2<f32>) -> Result<Matrix> {
        if self.dim() != rhs.dim() {
            return Err(MlErr::shape("sub", rhs.dim(), self.dim()));
        }

        Ok(&self.view() - &rhs)
    }

    fn scale(&self, scalar: f32) -> Matrix {
        self.mapv(|x| x * scalar)
    }

    fn padded(&self, padding: Padding, fill: f32) -> Matrix {
        let Padding {
            up,
            down,
            left,
            right,
        } = padding;
        let (rows, cols) = self.dim();

        let mut padded = Array2::from_elem((up + rows + down, left + cols + right), fill);
        padded
            .slice_mut(s![up..up + rows, left..left + cols])
            .assign(self);

        padded
    }

    fn cut(&self, rows: Range<usize>, cols: Range<usize>) -> Result<Matrix> {
        let (nrows, ncols) = self.dim();
        let in_bounds = |r: &Range<usize>, n| r.start <= r.end && r.end <= n;

        if !in_bounds(&rows, nrows) || !in_bounds(&cols, ncols) {
            return Err(MlErr::shape("cut", (rows.end, cols.end), (nrows, ncols)));
        }

        Ok(self.slice(s![rows, cols]).to_owned())
    }
}
