use crate::error::TriangulationError;
use crate::Error;

/// Max-heap over triangle ids, keyed by each triangle's maximum sampled
/// error, paired with the "pending" set of triangles that have been created
/// or structurally modified but not yet rasterized.
///
/// Every triangle id lives in exactly one of the heap or the pending set at
/// any point observable from outside a single `step`/`legalize` call; see
/// `remove` for the rule that keeps both in sync.
#[derive(Debug, Clone)]
pub(crate) struct PriorityQueue {
    /// Priority queue of triangles based on error
    triangle_queue: Vec<usize>,
    /// Vector of triangle indices to their positions in the priority queue for faster retrieval
    triangle_queue_indices: Vec<Option<usize>>,
    /// Errors associated with triangles
    triangle_errors: Vec<Error>,
    /// Pending triangles to be processed
    pending_triangle_indices: Vec<usize>,
    /// Per-triangle-id sum of squared pixel error, indexed by triangle id
    /// (not heap position) so `rms_sum` can be adjusted when a triangle
    /// leaves the heap regardless of where in the heap it lived.
    triangle_rms: Vec<f64>,
    /// Sum of `triangle_rms[t]` over triangles currently in the heap.
    rms_sum: f64,
}

impl PriorityQueue {
    pub fn new(queue_len: usize) -> Self {
        Self {
            triangle_queue_indices: vec![None; queue_len],
            pending_triangle_indices: Vec::default(),
            triangle_queue: Vec::default(),
            triangle_errors: Vec::default(),
            triangle_rms: vec![0.0; queue_len],
            rms_sum: 0.0,
        }
    }

    /// Registers `t` as pending and grows the index tables if `t` is a
    /// freshly created triangle id beyond the initial capacity estimate.
    /// The initial estimate (width * height / 4) is just a hint: meshes
    /// refined close to the per-pixel resolution can exceed it.
    pub fn add_pending_triangle(&mut self, t: usize) {
        self.ensure_capacity(t);
        self.pending_triangle_indices.push(t);
    }

    fn ensure_capacity(&mut self, t: usize) {
        if t >= self.triangle_queue_indices.len() {
            self.triangle_queue_indices.resize(t + 1, None);
            self.triangle_rms.resize(t + 1, 0.0);
        }
    }

    pub fn consume_pending_triangles(&mut self) -> Vec<usize> {
        self.pending_triangle_indices.drain(..).collect()
    }

    pub fn get_max_error(&self) -> Option<&Error> {
        self.triangle_errors.first()
    }

    /// Sum of squared pixel error over every triangle currently in the heap.
    pub fn rms_sum(&self) -> f64 {
        self.rms_sum
    }

    pub fn push(&mut self, triangle_index: usize, error: Error, rms: f64) {
        let queue_length = self.triangle_queue.len();

        self.ensure_capacity(triangle_index);
        self.triangle_queue_indices[triangle_index] = Some(queue_length);
        self.triangle_rms[triangle_index] = rms;
        self.rms_sum += rms;
        self.triangle_queue.push(triangle_index);
        self.triangle_errors.push(error);
        self.up(queue_length);
    }

    pub fn pop(&mut self) -> Option<usize> {
        if self.triangle_queue.is_empty() {
            return None;
        }

        let last_item_index = self.triangle_queue.len() - 1;
        self.swap(0, last_item_index);
        self.down(0, last_item_index);

        self.pop_back()
    }

    /// Removes triangle `requested_triangle_index` from wherever it
    /// currently resides: the heap (arbitrary-position removal, which
    /// requires both a down-sift and an up-sift attempt since only one can
    /// move an element) or the pending set (linear search, since pending
    /// stays small - bounded by the fan size of a single split, at most 4).
    ///
    /// Returns `Err(BrokenTriangulation)` if the triangle is in neither:
    /// every public mesh operation is supposed to leave every triangle in
    /// exactly one of the two, so this indicates an implementation bug
    /// upstream rather than a normal runtime condition.
    pub fn remove(
        &mut self,
        requested_triangle_index: usize,
    ) -> Result<(), TriangulationError> {
        let Some(index) = self
            .triangle_queue_indices
            .get(requested_triangle_index)
            .copied()
            .flatten()
        else {
            let pending_length = self.pending_triangle_indices.len();
            if let Some(pos) = self
                .pending_triangle_indices
                .iter()
                .position(|&triangle_index| triangle_index == requested_triangle_index)
            {
                self.pending_triangle_indices.swap(pos, pending_length - 1);
                self.pending_triangle_indices.pop();
                return Ok(());
            }

            return Err(TriangulationError::BrokenTriangulation {
                triangle: requested_triangle_index,
            });
        };

        let last_item_index = self.triangle_queue.len() - 1;
        if last_item_index != index {
            self.swap(index, last_item_index);
            if !self.down(index, last_item_index) {
                self.up(index);
            }
        }
        self.pop_back();

        Ok(())
    }

    fn up(&mut self, mut j: usize) {
        if j == 0 {
            return;
        }

        loop {
            let i: isize = (j as isize - 1) >> 1;
            if i < 0 {
                break;
            }

            let i = i as usize;
            if !self.less(j, i) {
                break;
            }

            self.swap(i, j);
            j = i;
        }
    }

    fn down(&mut self, i0: usize, n: usize) -> bool {
        let mut i = i0;
        loop {
            let j1 = 2 * i + 1;
            if j1 >= n {
                break;
            }
            let j2 = j1 + 1;
            let mut j = j1;
            if j2 < n && self.less(j2, j1) {
                j = j2;
            }
            if !self.less(j, i) {
                break;
            }
            self.swap(i, j);
            i = j;
        }

        i > i0
    }

    fn less(&self, i: usize, j: usize) -> bool {
        self.triangle_errors[i] > self.triangle_errors[j]
    }

    fn swap(&mut self, i: usize, j: usize) {
        let pi = self.triangle_queue[i];
        let pj = self.triangle_queue[j];
        self.triangle_queue_indices[pi] = Some(j);
        self.triangle_queue_indices[pj] = Some(i);
        self.triangle_queue.swap(i, j);
        self.triangle_errors.swap(i, j);
    }

    fn pop_back(&mut self) -> Option<usize> {
        let triangle = self.triangle_queue.pop();
        if let Some(triangle) = triangle {
            self.triangle_errors.pop();
            self.triangle_queue_indices[triangle] = None;
            self.rms_sum -= self.triangle_rms[triangle];
        }

        triangle
    }
}
