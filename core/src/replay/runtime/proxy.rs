//! Ghost proxy
//!
//! The visual stand-in driven by playback. The scheduler only reads its pose
//! to smooth toward the next target, writes the result back, and asks for
//! teardown.

use std::cell::RefCell;
use std::rc::Rc;

use crate::replay::types::Pose;

/// Per-tick smoothing applied to the ghost (not time-normalized)
pub const SMOOTH_FACTOR: f32 = 0.1;

/// Host object that displays a played-back recording
pub trait VisualProxy {
    /// Current displayed pose
    fn pose(&self) -> Pose;

    /// Move the proxy
    fn set_pose(&mut self, pose: Pose);

    /// Destroy the proxy. It is never touched again afterwards.
    fn teardown(self: Box<Self>);
}

/// One smoothing step: lerp the position and slerp the orientation toward
/// `target` by `factor`.
pub fn smooth_toward(current: Pose, target: Pose, factor: f32) -> Pose {
    Pose {
        position: current.position.lerp(target.position, factor),
        orientation: current.orientation.slerp(target.orientation, factor),
    }
}

/// Observable state of a [`RecordedProxy`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProxyState {
    pub pose: Pose,
    /// Number of `set_pose` calls
    pub updates: u64,
    pub torn_down: bool,
}

/// In-memory proxy for headless hosts and tests.
///
/// Clones share state, so the host keeps a handle to observe the ghost after
/// handing a clone to the scheduler.
#[derive(Debug, Clone, Default)]
pub struct RecordedProxy {
    state: Rc<RefCell<ProxyState>>,
}

impl RecordedProxy {
    /// Create a proxy spawned at `initial`
    pub fn new(initial: Pose) -> Self {
        Self {
            state: Rc::new(RefCell::new(ProxyState {
                pose: initial,
                ..ProxyState::default()
            })),
        }
    }

    pub fn state(&self) -> ProxyState {
        *self.state.borrow()
    }

    pub fn is_torn_down(&self) -> bool {
        self.state.borrow().torn_down
    }
}

impl VisualProxy for RecordedProxy {
    fn pose(&self) -> Pose {
        self.state.borrow().pose
    }

    fn set_pose(&mut self, pose: Pose) {
        let mut state = self.state.borrow_mut();
        state.pose = pose;
        state.updates += 1;
    }

    fn teardown(self: Box<Self>) {
        self.state.borrow_mut().torn_down = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    #[test]
    fn test_smooth_toward_position() {
        let current = Pose::new(Vec3::ZERO, Quat::IDENTITY);
        let target = Pose::new(Vec3::new(10.0, 0.0, -20.0), Quat::IDENTITY);
        let next = smooth_toward(current, target, SMOOTH_FACTOR);
        assert!(next.position.abs_diff_eq(Vec3::new(1.0, 0.0, -2.0), 1e-6));
        assert_eq!(next.orientation, Quat::IDENTITY);
    }

    #[test]
    fn test_smooth_toward_orientation() {
        let current = Pose::IDENTITY;
        let target = Pose::new(Vec3::ZERO, Quat::from_rotation_y(1.0));
        let next = smooth_toward(current, target, SMOOTH_FACTOR);
        let expected = Quat::from_rotation_y(0.1);
        assert!(next.orientation.abs_diff_eq(expected, 1e-4));
    }

    #[test]
    fn test_smoothing_converges() {
        let target = Pose::new(Vec3::splat(5.0), Quat::from_rotation_x(0.5));
        let mut pose = Pose::IDENTITY;
        for _ in 0..200 {
            pose = smooth_toward(pose, target, SMOOTH_FACTOR);
        }
        assert!(pose.position.abs_diff_eq(target.position, 1e-3));
        assert!(pose.orientation.abs_diff_eq(target.orientation, 1e-3));
    }

    #[test]
    fn test_recorded_proxy_shares_state() {
        let handle = RecordedProxy::new(Pose::IDENTITY);
        let mut proxy: Box<dyn VisualProxy> = Box::new(handle.clone());

        let moved = Pose::new(Vec3::X, Quat::IDENTITY);
        proxy.set_pose(moved);
        assert_eq!(handle.state().pose, moved);
        assert_eq!(handle.state().updates, 1);

        proxy.teardown();
        assert!(handle.is_torn_down());
    }
}
