use mtrack_core::Direction;
use tracing::debug;

use crate::input::PendingInput;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionState {
    pub position: f64,
    pub velocity: f64,
    pub last_direction: Direction,
}

/// Position/velocity integrator with the press-to-steer velocity policy:
/// pressing the held direction again adds one base speed, pressing the
/// other direction reverses at base speed.
#[derive(Debug, Clone)]
pub struct MotionModel {
    base_speed: f64,
    state: MotionState,
}

impl MotionModel {
    pub fn new(base_speed: f64, initial_direction: Direction, start_position: f64) -> Self {
        Self {
            base_speed,
            state: MotionState {
                position: start_position,
                velocity: base_speed * initial_direction.sign(),
                last_direction: initial_direction,
            },
        }
    }

    pub fn state(&self) -> &MotionState {
        &self.state
    }

    pub fn position(&self) -> f64 {
        self.state.position
    }

    /// One simulation step: consume the pending direction (if any), then
    /// move by the resulting velocity. Returns the direction applied.
    pub fn advance(&mut self, pending: &mut PendingInput) -> Option<Direction> {
        let applied = pending.take();
        if let Some(d) = applied {
            self.apply(d);
        }
        self.state.position += self.state.velocity;
        applied
    }

    fn apply(&mut self, d: Direction) {
        let s = &mut self.state;
        if d == s.last_direction {
            s.velocity += self.base_speed * d.sign();
            debug!(velocity = s.velocity, "accelerate");
        } else {
            s.velocity = self.base_speed * d.sign();
            debug!(velocity = s.velocity, "reverse");
        }
        s.last_direction = d;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staged(d: Direction) -> PendingInput {
        let mut p = PendingInput::default();
        p.stage(d);
        p
    }

    #[test]
    fn initial_velocity_follows_initial_direction() {
        let m = MotionModel::new(2.0, Direction::Decrease, 10.0);
        assert_eq!(
            *m.state(),
            MotionState {
                position: 10.0,
                velocity: -2.0,
                last_direction: Direction::Decrease
            }
        );
    }

    #[test]
    fn advance_without_input_moves_by_velocity() {
        let mut m = MotionModel::new(1.0, Direction::Increase, 2.0);
        let mut p = PendingInput::default();
        assert_eq!(m.advance(&mut p), None);
        assert_eq!(m.position(), 3.0);
        m.advance(&mut p);
        assert_eq!(m.position(), 4.0);
    }

    #[test]
    fn same_direction_requests_grow_magnitude_by_base_speed() {
        let mut m = MotionModel::new(1.0, Direction::Increase, 0.0);
        for expected in [2.0, 3.0, 4.0] {
            m.advance(&mut staged(Direction::Increase));
            assert_eq!(m.state().velocity, expected);
        }
        assert_eq!(m.position(), 2.0 + 3.0 + 4.0);
    }

    #[test]
    fn reversal_resets_magnitude_to_base_speed() {
        let mut m = MotionModel::new(1.0, Direction::Increase, 0.0);
        m.advance(&mut staged(Direction::Increase));
        m.advance(&mut staged(Direction::Increase));
        assert_eq!(m.state().velocity, 3.0);

        let applied = m.advance(&mut staged(Direction::Decrease));
        assert_eq!(applied, Some(Direction::Decrease));
        assert_eq!(m.state().velocity, -1.0);
        assert_eq!(m.state().last_direction, Direction::Decrease);

        m.advance(&mut staged(Direction::Decrease));
        assert_eq!(m.state().velocity, -2.0);
    }

    #[test]
    fn pending_slot_is_cleared_by_the_consuming_step() {
        let mut m = MotionModel::new(1.0, Direction::Increase, 0.0);
        let mut p = staged(Direction::Increase);
        m.advance(&mut p);
        assert_eq!(p.peek(), None);
        m.advance(&mut p);
        assert_eq!(m.state().velocity, 2.0);
    }

    #[test]
    fn velocity_sign_always_matches_last_direction() {
        let mut m = MotionModel::new(0.5, Direction::Increase, 0.0);
        let presses = [
            Direction::Decrease,
            Direction::Decrease,
            Direction::Increase,
            Direction::Decrease,
            Direction::Increase,
            Direction::Increase,
        ];
        for d in presses {
            m.advance(&mut staged(d));
            let s = m.state();
            assert_eq!(s.velocity.signum(), s.last_direction.sign());
        }
    }
}
