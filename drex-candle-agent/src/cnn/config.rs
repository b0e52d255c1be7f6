use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Cnn`](super::Cnn).
pub struct CnnConfig {
    pub(super) n_stack: usize,
    pub(super) height: usize,
    pub(super) width: usize,
    pub(super) out_dim: usize,
}

impl CnnConfig {
    /// Creates configuration of CNN.
    ///
    /// * `n_stack` - Number of input channels, i.e., stacked frames.
    /// * `out_dim` - Number of output features.
    pub fn new(n_stack: usize, height: usize, width: usize, out_dim: usize) -> Self {
        Self {
            n_stack,
            height,
            width,
            out_dim,
        }
    }

    /// Number of output features.
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    /// Number of features after the convolutional layers.
    pub(super) fn flatten_dim(&self) -> usize {
        fn conv(x: usize, kernel: usize, stride: usize) -> usize {
            (x.saturating_sub(kernel)) / stride + 1
        }
        let h = conv(conv(conv(self.height, 8, 4), 4, 2), 3, 1);
        let w = conv(conv(conv(self.width, 8, 4), 4, 2), 3, 1);
        64 * h * w
    }
}
