use ndarray::ArrayView2;
use std::path::Path;

use crate::error::Result;
use crate::frame::to_array;
use crate::pssm::Pssm;

/// Renders a sequence logo for a probability matrix.
///
/// Implementations receive the width x 4 matrix in A, C, G, T column order
/// and write an image to `path`; the image format is up to the renderer.
pub trait LogoRenderer {
    fn render(&self, matrix: ArrayView2<'_, f64>, path: &Path) -> Result<()>;
}

/// Plots a PSSM as a sequence logo with the given renderer
pub fn plot(pssm: &Pssm, renderer: &dyn LogoRenderer, path: impl AsRef<Path>) -> Result<()> {
    let matrix = to_array(pssm);
    renderer.render(matrix.view(), path.as_ref())
}
