use std::fmt;

/// A tensor shape, wrapping a vector of dimension sizes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Create a new shape from a vector of dimensions.
    pub fn new(dims: Vec<usize>) -> Self {
        Shape { dims }
    }

    /// Create a shape from a slice of dimensions.
    pub fn from_slice(dims: &[usize]) -> Self {
        Shape {
            dims: dims.to_vec(),
        }
    }

    /// Number of dimensions (rank).
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Total number of elements (product of all dimension sizes).
    pub fn numel(&self) -> usize {
        self.dims.iter().product()
    }

    /// Returns the size of dimension `i`.
    ///
    /// # Panics
    /// Panics if `i >= ndim()`.
    pub fn dim(&self, i: usize) -> usize {
        self.dims[i]
    }

    /// Returns a reference to the underlying dimension sizes.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Computes row-major contiguous strides for this shape.
    ///
    /// For a shape [d0, d1, d2], the strides are [d1*d2, d2, 1].
    pub fn strides(&self) -> Vec<usize> {
        if self.dims.is_empty() {
            return vec![];
        }
        let mut strides = vec![0usize; self.dims.len()];
        strides[self.dims.len() - 1] = 1;
        for i in (0..self.dims.len() - 1).rev() {
            strides[i] = strides[i + 1] * self.dims[i + 1];
        }
        strides
    }

    /// Converts a flat row-major index into a multi-dimensional coordinate.
    ///
    /// For shape [2, 3], flat index 4 maps to [1, 1]. A scalar shape maps
    /// every index to the empty coordinate.
    ///
    /// # Panics
    /// Panics if `flat >= numel()` for a non-scalar shape.
    pub fn unravel(&self, flat: usize) -> Vec<usize> {
        if self.dims.is_empty() {
            return vec![];
        }
        assert!(
            flat < self.numel(),
            "flat index {} out of range for shape {} (numel={})",
            flat,
            self,
            self.numel()
        );
        let strides = self.strides();
        let mut remaining = flat;
        let mut coord = vec![0usize; self.dims.len()];
        for (i, stride) in strides.iter().enumerate() {
            coord[i] = remaining / stride;
            remaining %= stride;
        }
        coord
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, "]")
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape::new(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape::from_slice(dims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_shape() {
        let s = Shape::new(vec![2, 3, 4]);
        assert_eq!(s.ndim(), 3);
        assert_eq!(s.numel(), 24);
        assert_eq!(s.dim(0), 2);
        assert_eq!(s.dim(1), 3);
        assert_eq!(s.dim(2), 4);
    }

    #[test]
    fn test_strides() {
        let s = Shape::new(vec![2, 3, 4]);
        assert_eq!(s.strides(), vec![12, 4, 1]);
    }

    #[test]
    fn test_scalar_shape() {
        let s = Shape::new(vec![]);
        assert_eq!(s.ndim(), 0);
        assert_eq!(s.numel(), 1); // product of empty = 1
        assert_eq!(s.strides(), vec![]);
        assert_eq!(s.unravel(0), Vec::<usize>::new());
    }

    #[test]
    fn test_unravel() {
        let s = Shape::new(vec![2, 3]);
        assert_eq!(s.unravel(0), vec![0, 0]);
        assert_eq!(s.unravel(4), vec![1, 1]);
        assert_eq!(s.unravel(5), vec![1, 2]);

        let s = Shape::new(vec![2, 3, 4]);
        assert_eq!(s.unravel(23), vec![1, 2, 3]);
        assert_eq!(s.unravel(13), vec![1, 0, 1]);
    }

    #[test]
    #[should_panic]
    fn test_unravel_out_of_range_panics() {
        let s = Shape::new(vec![2, 3]);
        s.unravel(6);
    }

    #[test]
    fn test_display() {
        let s = Shape::new(vec![1, 3, 224, 224]);
        assert_eq!(s.to_string(), "[1, 3, 224, 224]");
    }
}
