//! Motion, sound and range vocabulary shared across the stack.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// How a gait behaves once started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaitClass {
    /// Loops until the cancel token is set.
    Continuous,
    /// Runs one bounded sequence and returns on its own.
    SingleStep,
    /// Pseudo-gait: halt whatever is running.
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gait {
    Walk,
    Run,
    StepBack,
    RunBack,
    RotateLeft,
    RotateRight,
    Hello,
    TurnLeftStep,
    TurnRightStep,
    ResetServos,
    Rest,
    Stop,
}

impl Gait {
    pub const ALL: [Gait; 12] = [
        Gait::Walk,
        Gait::Run,
        Gait::StepBack,
        Gait::RunBack,
        Gait::RotateLeft,
        Gait::RotateRight,
        Gait::Hello,
        Gait::TurnLeftStep,
        Gait::TurnRightStep,
        Gait::ResetServos,
        Gait::Rest,
        Gait::Stop,
    ];

    pub fn class(self) -> GaitClass {
        match self {
            Gait::Walk
            | Gait::Run
            | Gait::StepBack
            | Gait::RunBack
            | Gait::RotateLeft
            | Gait::RotateRight => GaitClass::Continuous,
            Gait::Hello
            | Gait::TurnLeftStep
            | Gait::TurnRightStep
            | Gait::ResetServos
            | Gait::Rest => GaitClass::SingleStep,
            Gait::Stop => GaitClass::Stop,
        }
    }

    #[inline]
    pub fn is_continuous(self) -> bool {
        self.class() == GaitClass::Continuous
    }

    #[inline]
    pub fn is_single_step(self) -> bool {
        self.class() == GaitClass::SingleStep
    }

    /// Forward-moving continuous gaits; the only ones the front-facing range
    /// sensor can protect.
    #[inline]
    pub fn is_forward(self) -> bool {
        matches!(self, Gait::Walk | Gait::Run)
    }

    pub fn name(self) -> &'static str {
        match self {
            Gait::Walk => "walk",
            Gait::Run => "run",
            Gait::StepBack => "stepback",
            Gait::RunBack => "runback",
            Gait::RotateLeft => "rotateleft",
            Gait::RotateRight => "rotateright",
            Gait::Hello => "hello",
            Gait::TurnLeftStep => "turnleft_step",
            Gait::TurnRightStep => "turnright_step",
            Gait::ResetServos => "reset_servos",
            Gait::Rest => "rest",
            Gait::Stop => "stop",
        }
    }
}

impl fmt::Display for Gait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a name does not match any known vocabulary entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownName(pub String);

impl fmt::Display for UnknownName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown name '{}'", self.0)
    }
}

impl std::error::Error for UnknownName {}

impl FromStr for Gait {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Gait::ALL
            .iter()
            .copied()
            .find(|g| g.name() == key)
            .ok_or(UnknownName(key))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpeedClass {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl SpeedClass {
    /// Pause inserted between gait cycles.
    pub fn step_delay(self) -> Duration {
        match self {
            SpeedClass::Fast => Duration::from_millis(2),
            SpeedClass::Normal => Duration::from_millis(10),
            SpeedClass::Slow => Duration::from_millis(15),
        }
    }

    /// Lenient parse: anything unrecognised is `Normal`.
    pub fn from_keyword(s: Option<&str>) -> Self {
        match s.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("fast") => SpeedClass::Fast,
            Some("slow") => SpeedClass::Slow,
            _ => SpeedClass::Normal,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SpeedClass::Slow => "slow",
            SpeedClass::Normal => "normal",
            SpeedClass::Fast => "fast",
        }
    }
}

impl fmt::Display for SpeedClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed vocabulary of buzzer cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundKey {
    Hello,
    Thanks,
    No,
    Yes,
    Danger,
    Exciting,
    Happy,
    Left,
    Right,
    Scared,
    Stop,
}

impl SoundKey {
    /// Cue used for keywords outside the vocabulary.
    pub const FALLBACK: SoundKey = SoundKey::No;

    pub const ALL: [SoundKey; 11] = [
        SoundKey::Hello,
        SoundKey::Thanks,
        SoundKey::No,
        SoundKey::Yes,
        SoundKey::Danger,
        SoundKey::Exciting,
        SoundKey::Happy,
        SoundKey::Left,
        SoundKey::Right,
        SoundKey::Scared,
        SoundKey::Stop,
    ];

    /// Exact lookup (case-insensitive), `None` when outside the vocabulary.
    pub fn lookup(keyword: &str) -> Option<Self> {
        let key = keyword.trim().to_ascii_lowercase();
        if key == "thank you" {
            return Some(SoundKey::Thanks);
        }
        SoundKey::ALL.iter().copied().find(|k| k.name() == key)
    }

    /// Lookup with fallback to [`SoundKey::FALLBACK`].
    pub fn from_keyword(keyword: &str) -> Self {
        Self::lookup(keyword).unwrap_or(Self::FALLBACK)
    }

    pub fn name(self) -> &'static str {
        match self {
            SoundKey::Hello => "hello",
            SoundKey::Thanks => "thanks",
            SoundKey::No => "no",
            SoundKey::Yes => "yes",
            SoundKey::Danger => "danger",
            SoundKey::Exciting => "exciting",
            SoundKey::Happy => "happy",
            SoundKey::Left => "left",
            SoundKey::Right => "right",
            SoundKey::Scared => "scared",
            SoundKey::Stop => "stop",
        }
    }
}

impl fmt::Display for SoundKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One reading from the forward range sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeSample {
    /// Echo received; distance in centimetres.
    Distance(f32),
    /// Nothing within range before the echo timeout.
    NoEcho,
    /// Sensor hardware error.
    Fault,
}

impl RangeSample {
    /// Wrap a raw distance, mapping negative or non-finite values to `Fault`.
    pub fn from_cm(cm: f32) -> Self {
        if cm.is_finite() && cm >= 0.0 {
            RangeSample::Distance(cm)
        } else {
            RangeSample::Fault
        }
    }
}

impl fmt::Display for RangeSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeSample::Distance(cm) => write!(f, "{cm:.1} cm"),
            RangeSample::NoEcho => f.write_str("no echo"),
            RangeSample::Fault => f.write_str("sensor fault"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gait_names_round_trip_through_from_str() {
        for g in Gait::ALL {
            assert_eq!(g.name().parse::<Gait>().unwrap(), g);
        }
        assert!("moonwalk".parse::<Gait>().is_err());
    }

    #[test]
    fn classification_matches_vocabulary() {
        assert!(Gait::Walk.is_continuous() && Gait::Walk.is_forward());
        assert!(Gait::RotateLeft.is_continuous() && !Gait::RotateLeft.is_forward());
        assert!(Gait::Hello.is_single_step());
        assert_eq!(Gait::Stop.class(), GaitClass::Stop);
        assert!(!Gait::Stop.is_forward());
    }

    #[test]
    fn speed_defaults_to_normal() {
        assert_eq!(SpeedClass::from_keyword(None), SpeedClass::Normal);
        assert_eq!(SpeedClass::from_keyword(Some("ludicrous")), SpeedClass::Normal);
        assert_eq!(SpeedClass::from_keyword(Some(" FAST ")), SpeedClass::Fast);
        assert!(SpeedClass::Fast.step_delay() < SpeedClass::Slow.step_delay());
    }

    #[test]
    fn sound_keywords_fall_back() {
        assert_eq!(SoundKey::from_keyword("Thank You"), SoundKey::Thanks);
        assert_eq!(SoundKey::from_keyword("danger"), SoundKey::Danger);
        assert_eq!(SoundKey::from_keyword("kazoo"), SoundKey::FALLBACK);
        assert_eq!(SoundKey::lookup("kazoo"), None);
    }

    #[test]
    fn negative_distance_is_a_fault() {
        assert_eq!(RangeSample::from_cm(-1.0), RangeSample::Fault);
        assert_eq!(RangeSample::from_cm(f32::NAN), RangeSample::Fault);
        assert_eq!(RangeSample::from_cm(12.5), RangeSample::Distance(12.5));
    }
}
