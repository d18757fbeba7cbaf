/*!
Simple and fast [**TIN**](https://en.wikipedia.org/wiki/Triangulated_irregular_network) generation library.
Uses [Delaunay triangulation](https://en.wikipedia.org/wiki/Delaunay_triangulation).

# Example

```rust
use delatin::{triangulate, Error};

let heights = vec![100.1, 123.4, 111.5, 121.4];
let width = 2;
let height = 2;
let max_error = Error(1.0);
// points `Vec<(usize, usize)>`: A vector containing all the vertices of the triangulated mesh. Each point corresponds to heights vector index.
// triangles `Vec<(usize, usize, usize)>`: A vector containing all the triangles of the mesh, each defined by indices into the `points`.
let (points, triangles) = triangulate(&heights, width, height, max_error)?;
# Ok::<(), delatin::TriangulationError>(())
```

For finer-grained control over the refinement process - inspecting intermediate
meshes, stopping early, or reading the running RMS deviation - build a
[`Triangulation`] directly and drive it with [`Triangulation::refine`] or
[`Triangulation::run`].
*/

use std::fmt;

pub use error::TriangulationError;
pub use triangulation::Triangulation;

mod error;
mod priority_queue;
mod triangulation;
mod utils;

/// A vertex position as `(x, y)` grid coordinates.
pub type Point = (usize, usize);
/// A triangle as three vertex ids into a [`Triangulation::coords`] slice.
pub type Triangle = (usize, usize, usize);
/// A sampled height value.
pub type Height = f64;

/// Error for the triangulation process.
#[derive(Debug, Clone, Copy, PartialOrd, PartialEq, Default)]
pub struct Error(pub f64);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Runs the triangulation process until the maximum error is below the specified threshold.
///
/// One-shot convenience wrapper around [`Triangulation::new`] and
/// [`Triangulation::run`] for callers who only need the final mesh.
///
/// # Arguments
///
/// * `height_data` - Height values of the grid, in row-major order.
/// * `width` - Width of the grid.
/// * `height` - Height of the grid.
/// * `max_error` - The maximum allowable error for the triangulation process.
///
/// # Returns
///
/// Tuple containing:
/// - points `Vec<(usize, usize)>`: A vector containing all the vertices of the triangulated mesh.
/// - triangles `Vec<(usize, usize, usize)>`: A vector containing all the triangles of the mesh, each defined by indices into the `points`.
///
/// # Errors
///
/// - `InvalidDataLength` - If the length of the height data does not match the width and height of the grid.
/// - `InvalidDimensions` - If the grid is smaller than 2x2 in either dimension.
/// - `InvalidMaxError` - If `max_error` is negative or not finite.
/// - `BrokenTriangulation` / `EmptyQueue` - If an internal invariant was violated.
pub fn triangulate(
    height_data: &[Height],
    width: usize,
    height: usize,
    max_error: Error,
) -> Result<(Vec<Point>, Vec<Triangle>), TriangulationError> {
    let mut delatin = Triangulation::new(height_data, width, height)?;
    delatin.run(max_error)?;

    Ok((delatin.coords().to_vec(), delatin.triangle_indices()))
}
