//! Buzzer note tables, one per cue. `(frequency_hz, duration_ms)`; a zero
//! frequency is a rest.

use ninja_traits::SoundKey;

pub type Note = (u32, u64);

const HELLO: &[Note] = &[(523, 100), (659, 100), (784, 150)];
const THANKS: &[Note] = &[(784, 120), (659, 120), (784, 200)];
const NO: &[Note] = &[(330, 200), (0, 50), (262, 300)];
const YES: &[Note] = &[(659, 100), (880, 150)];
const DANGER: &[Note] = &[(880, 100), (0, 50), (880, 100), (0, 50), (880, 100)];
const EXCITING: &[Note] = &[
    (1047, 40),
    (1319, 40),
    (1047, 40),
    (1319, 40),
    (1047, 40),
    (1319, 40),
    (1568, 120),
];
const HAPPY: &[Note] = &[(523, 100), (659, 100), (784, 100), (1047, 200)];
const LEFT: &[Note] = &[(659, 100), (523, 150)];
const RIGHT: &[Note] = &[(523, 100), (659, 150)];
const SCARED: &[Note] = &[(1200, 60), (900, 60), (1200, 60), (700, 60), (500, 200)];
const STOP: &[Note] = &[(440, 150), (0, 30), (330, 250)];

pub fn notes(key: SoundKey) -> &'static [Note] {
    match key {
        SoundKey::Hello => HELLO,
        SoundKey::Thanks => THANKS,
        SoundKey::No => NO,
        SoundKey::Yes => YES,
        SoundKey::Danger => DANGER,
        SoundKey::Exciting => EXCITING,
        SoundKey::Happy => HAPPY,
        SoundKey::Left => LEFT,
        SoundKey::Right => RIGHT,
        SoundKey::Scared => SCARED,
        SoundKey::Stop => STOP,
    }
}

/// Total playback time of a cue in ms.
pub fn duration_ms(key: SoundKey) -> u64 {
    notes(key).iter().map(|(_, ms)| ms).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_cue_has_notes() {
        for key in SoundKey::ALL {
            assert!(!notes(key).is_empty(), "{key} has no notes");
            assert!(duration_ms(key) > 0);
        }
    }
}
