/// Coalesces redraw requests: at most one frame is ever pending, however
/// many mutations arrive before it runs.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    pending: bool,
    requested: u64,
    rendered: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a redraw. Returns true only when this call scheduled a new
    /// frame; later calls before the frame runs are absorbed.
    pub fn request(&mut self) -> bool {
        self.requested += 1;
        if self.pending {
            false
        } else {
            self.pending = true;
            true
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Consume the pending frame, if any. Returns whether a frame should run.
    pub fn begin_frame(&mut self) -> bool {
        if !self.pending {
            return false;
        }
        self.pending = false;
        self.rendered += 1;
        true
    }

    pub fn requests(&self) -> u64 {
        self.requested
    }

    pub fn frames_rendered(&self) -> u64 {
        self.rendered
    }
}
