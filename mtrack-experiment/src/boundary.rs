/// Which limit was crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// The interval `[left, right]`; both limits count as inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryMonitor {
    pub left: f64,
    pub right: f64,
}

impl BoundaryMonitor {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    pub fn is_out_of_bounds(&self, position: f64) -> bool {
        self.crossed(position).is_some()
    }

    pub fn crossed(&self, position: f64) -> Option<Side> {
        if position < self.left {
            Some(Side::Left)
        } else if position > self.right {
            Some(Side::Right)
        } else {
            None
        }
    }
}
