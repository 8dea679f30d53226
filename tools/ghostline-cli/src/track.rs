//! Built-in circuit used by `ghostline record`

use std::f32::consts::TAU;

use glam::{Quat, Vec3};
use ghostline_core::Pose;

/// Height of the hills along the circuit
const HILL_HEIGHT: f32 = 0.5;
/// Hills per lap
const HILLS: f32 = 3.0;

/// A closed loop of `radius` driven at constant speed in `lap_time` seconds.
///
/// The entity starts at `(radius, 0, 0)`, travels counter-clockwise seen from
/// above and faces along the track. Past `lap_time` it stays on the line.
pub fn circuit(radius: f32, lap_time: f32) -> impl Fn(f32) -> Pose + 'static {
    move |t| {
        let progress = if lap_time > 0.0 {
            (t / lap_time).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let angle = progress * TAU;
        let position = Vec3::new(
            radius * angle.cos(),
            HILL_HEIGHT * (angle * HILLS).sin(),
            radius * angle.sin(),
        );
        Pose::new(position, Quat::from_rotation_y(-angle))
    }
}
