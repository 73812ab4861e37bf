use glam::IVec2;

/// 4-connected integer line walk between two grid cells, both inclusive.
///
/// Each step moves along exactly one axis, choosing whichever keeps the
/// accumulated error closest to the true line. A walk from `a` to `b`
/// yields `|dx| + |dy| + 1` cells, so no voxel the segment crosses is
/// skipped diagonally.
#[derive(Debug, Clone)]
pub struct GridWalk {
    current: IVec2,
    step: IVec2,
    delta: IVec2,
    error: i32,
    remaining: u32,
    finished: bool,
}

impl GridWalk {
    pub fn new(from: IVec2, to: IVec2) -> Self {
        let d = to - from;
        let delta = d.abs();
        Self {
            current: from,
            step: d.signum(),
            delta,
            error: 0,
            remaining: (delta.x + delta.y) as u32,
            finished: false,
        }
    }

    /// Same walk from `from` towards `to`, stopping after at most
    /// `max_steps` steps (`max_steps + 1` cells).
    pub fn bounded(from: IVec2, to: IVec2, max_steps: u32) -> Self {
        let mut walk = Self::new(from, to);
        walk.remaining = walk.remaining.min(max_steps);
        walk
    }
}

impl Iterator for GridWalk {
    type Item = IVec2;

    fn next(&mut self) -> Option<IVec2> {
        if self.finished {
            return None;
        }
        let cell = self.current;
        if self.remaining == 0 {
            self.finished = true;
        } else {
            let error_x = self.error + self.delta.y;
            let error_y = self.error - self.delta.x;
            if error_x.abs() < error_y.abs() {
                self.current.x += self.step.x;
                self.error = error_x;
            } else {
                self.current.y += self.step.y;
                self.error = error_y;
            }
            self.remaining -= 1;
        }
        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = if self.finished {
            0
        } else {
            self.remaining as usize + 1
        };
        (n, Some(n))
    }
}

impl ExactSizeIterator for GridWalk {}
