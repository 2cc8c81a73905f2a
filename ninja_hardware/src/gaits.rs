//! Keyframe tables for each gait on the four-servo body.
//!
//! Servos 0/1 lift the right/left leg; 2/3 are the feet, which are
//! continuous-rotation servos in wheel ("tire") mode where 90 is stop.

use ninja_traits::Gait;

pub const SERVO_COUNT: usize = 4;
pub const MAX_ANGLE_DEG: u16 = 180;
/// Standing pose.
pub const STAND_ANGLES: [u16; SERVO_COUNT] = [105, 90, 90, 90];
/// Lowered resting pose.
pub const REST_ANGLES: [u16; SERVO_COUNT] = [15, 180, 90, 90];

/// A set of servo writes followed by a hold.
#[derive(Debug, Clone, Copy)]
pub struct Keyframe {
    pub moves: &'static [(u8, u16)],
    pub hold_ms: u64,
}

const fn kf(moves: &'static [(u8, u16)], hold_ms: u64) -> Keyframe {
    Keyframe { moves, hold_ms }
}

const STAND: &[(u8, u16)] = &[(0, 105), (1, 90), (2, 90), (3, 90)];

const WALK: &[Keyframe] = &[
    kf(&[(0, 70)], 200),
    kf(&[(2, 80), (3, 100)], 500),
    kf(&[(2, 90), (3, 90), (0, 105)], 200),
    kf(&[(1, 125)], 200),
    kf(&[(2, 80), (3, 100)], 500),
    kf(&[(2, 90), (3, 90), (1, 90)], 200),
];

const STEP_BACK: &[Keyframe] = &[
    kf(&[(0, 70)], 200),
    kf(&[(2, 100), (3, 80)], 500),
    kf(&[(2, 90), (3, 90), (0, 105)], 200),
    kf(&[(1, 125)], 200),
    kf(&[(2, 100), (3, 80)], 500),
    kf(&[(2, 90), (3, 90), (1, 90)], 200),
];

const RUN: &[Keyframe] = &[kf(&[(0, 15), (1, 180), (2, 45), (3, 135)], 100)];
const RUN_BACK: &[Keyframe] = &[kf(&[(0, 15), (1, 180), (2, 135), (3, 45)], 100)];
const ROTATE_LEFT: &[Keyframe] = &[kf(&[(0, 15), (1, 180), (2, 60), (3, 60)], 100)];
const ROTATE_RIGHT: &[Keyframe] = &[kf(&[(0, 15), (1, 180), (2, 120), (3, 120)], 100)];

const HELLO: &[Keyframe] = &[
    kf(STAND, 500),
    kf(&[(0, 175), (1, 135)], 1000),
    kf(&[(0, 105)], 1000),
    kf(&[(0, 75)], 300),
    kf(&[(0, 105)], 300),
    kf(&[(0, 75)], 300),
    kf(&[(0, 105)], 300),
    kf(STAND, 500),
];

const TURN_LEFT: &[Keyframe] = &[
    kf(&[(0, 70)], 300),
    kf(&[(2, 80), (3, 80)], 500),
    kf(&[(2, 90), (3, 90), (0, 105)], 300),
    kf(STAND, 500),
];

const TURN_RIGHT: &[Keyframe] = &[
    kf(&[(1, 125)], 300),
    kf(&[(2, 100), (3, 100)], 500),
    kf(&[(2, 90), (3, 90), (1, 90)], 300),
    kf(STAND, 500),
];

const RESET: &[Keyframe] = &[kf(STAND, 500)];
const REST: &[Keyframe] = &[kf(STAND, 500), kf(&[(0, 15), (1, 180), (2, 90), (3, 90)], 1000)];

/// One cycle of a continuous gait, or the whole sequence of a single-step one.
pub fn keyframes(gait: Gait) -> &'static [Keyframe] {
    match gait {
        Gait::Walk => WALK,
        Gait::Run => RUN,
        Gait::StepBack => STEP_BACK,
        Gait::RunBack => RUN_BACK,
        Gait::RotateLeft => ROTATE_LEFT,
        Gait::RotateRight => ROTATE_RIGHT,
        Gait::Hello => HELLO,
        Gait::TurnLeftStep => TURN_LEFT,
        Gait::TurnRightStep => TURN_RIGHT,
        Gait::ResetServos => RESET,
        Gait::Rest => REST,
        Gait::Stop => &[],
    }
}

/// Frames played when a continuous gait winds down.
pub fn stand_frame() -> Keyframe {
    kf(STAND, 500)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_frames_stay_in_range() {
        for g in Gait::ALL {
            for frame in keyframes(g) {
                for &(id, angle) in frame.moves {
                    assert!((id as usize) < SERVO_COUNT, "{g}: servo {id}");
                    assert!(angle <= MAX_ANGLE_DEG, "{g}: angle {angle}");
                }
            }
        }
    }

    #[test]
    fn rest_ends_in_rest_pose() {
        let last = keyframes(Gait::Rest).last().copied().unwrap();
        for &(id, angle) in last.moves {
            assert_eq!(REST_ANGLES[id as usize], angle);
        }
    }

    #[test]
    fn only_stop_has_no_frames() {
        for g in Gait::ALL {
            assert_eq!(keyframes(g).is_empty(), g == Gait::Stop, "{g}");
        }
    }
}
