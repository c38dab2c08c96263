use std::{fmt, ops::Range, sync::Arc};

use log::trace;
use ndarray::{Array3, Axis};

use crate::{
    linalg::{MatrixExt, Padding},
    Matrix, MlErr, Result,
};

/// An ordered stack of equally shaped matrices, used for batches and channel stacks.
///
/// Elements are stored behind `Arc` so a stack built with `StackedMatrix::repeat` holds several
/// references to **the same** matrix. Transforms always produce freshly allocated, independent
/// elements; `detach` does the same without transforming.
#[derive(Debug, Clone)]
pub struct StackedMatrix {
    matrices: Vec<Arc<Matrix>>,
}

impl StackedMatrix {
    /// Creates a new `StackedMatrix`.
    ///
    /// # Arguments
    /// * `matrices` - The matrices the stack is composed of, in order.
    ///
    /// # Returns
    /// The stack, `MlErr::EmptyStack` if `matrices` is empty or `MlErr::ShapeMismatch` if any
    /// matrix differs in shape from the first one.
    pub fn new<I>(matrices: I) -> Result<Self>
    where
        I: IntoIterator<Item = Matrix>,
    {
        Self::from_shared(matrices.into_iter().map(Arc::new).collect())
    }

    /// Creates a stack of depth `max(times, 1)` where every element is the same shared `matrix`.
    ///
    /// The extra elements are references to the original matrix, not copies. Call `detach` before
    /// relying on the elements being independent allocations.
    pub fn repeat(matrix: Matrix, times: usize) -> Self {
        let times = times.max(1);
        trace!("repeating a {:?} matrix {times} times, elements are shared", matrix.dim());

        let shared = Arc::new(matrix);
        Self {
            matrices: vec![shared; times],
        }
    }

    /// Builds a stack out of the depth axis (axis 0) of `tensor`.
    pub fn from_array3(tensor: &Array3<f32>) -> Result<Self> {
        Self::new(tensor.axis_iter(Axis(0)).map(|m| m.to_owned()))
    }

    fn from_shared(matrices: Vec<Arc<Matrix>>) -> Result<Self> {
        let Some(first) = matrices.first() else {
            return Err(MlErr::EmptyStack);
        };

        let expected = first.dim();
        if let Some(m) = matrices.iter().find(|m| m.dim() != expected) {
            return Err(MlErr::shape("stack", m.dim(), expected));
        }

        Ok(Self { matrices })
    }

    /// Returns `(rows, cols, depth)`.
    pub fn size(&self) -> (usize, usize, usize) {
        let (rows, cols) = self.matrices[0].dim();
        (rows, cols, self.matrices.len())
    }

    /// The amount of matrices in the stack.
    pub fn depth(&self) -> usize {
        self.matrices.len()
    }

    /// The stacked matrices, in order.
    pub fn elements(&self) -> &[Arc<Matrix>] {
        &self.matrices
    }

    pub fn iter(&self) -> impl Iterator<Item = &Matrix> {
        self.matrices.iter().map(|m| m.as_ref())
    }

    /// Whether the elements at `i` and `j` are the same allocation.
    pub fn is_aliased(&self, i: usize, j: usize) -> bool {
        match (self.matrices.get(i), self.matrices.get(j)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Deep copies every element so no two of them share storage.
    pub fn detach(&self) -> Self {
        self.transform(|m| m.to_owned())
    }

    /// Applies `f` to every value of every matrix.
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(f32) -> f32,
    {
        self.transform(|m| m.mapv(&f))
    }

    /// Pads every matrix with the same margins and `fill` value.
    pub fn pad(&self, padding: Padding, fill: f32) -> Self {
        self.transform(|m| m.padded(padding, fill))
    }

    /// Cuts the same half-open sub-rectangle out of every matrix.
    pub fn cut(&self, rows: Range<usize>, cols: Range<usize>) -> Result<Self> {
        self.try_transform(|m| m.cut(rows.clone(), cols.clone()))
    }

    /// Copies the stack into a `(depth, rows, cols)` tensor.
    pub fn to_array3(&self) -> Array3<f32> {
        let (rows, cols, depth) = self.size();
        let mut tensor = Array3::zeros((depth, rows, cols));
        tensor
            .axis_iter_mut(Axis(0))
            .zip(self.iter())
            .for_each(|(mut slot, m)| slot.assign(m));

        tensor
    }

    /// Writes every matrix to stdout, separated by a blank line.
    pub fn print(&self) {
        println!("{self}");
    }

    fn transform<F>(&self, f: F) -> Self
    where
        F: Fn(&Matrix) -> Matrix,
    {
        // a shape preserving `f` keeps the stack homogeneous
        let matrices = self.matrices.iter().map(|m| Arc::new(f(m.as_ref()))).collect();
        Self { matrices }
    }

    fn try_transform<F>(&self, f: F) -> Result<Self>
    where
        F: Fn(&Matrix) -> Result<Matrix>,
    {
        let matrices = self
            .matrices
            .iter()
            .map(|m| f(m.as_ref()).map(Arc::new))
            .collect::<Result<_>>()?;

        Self::from_shared(matrices)
    }
}

impl From<Matrix> for StackedMatrix {
    fn from(matrix: Matrix) -> Self {
        Self::repeat(matrix, 1)
    }
}

impl fmt::Display for StackedMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in self.iter() {
            writeln!(f, "{m}")?;
            writeln!(f)?;
        }

        Ok(())
    }
}
