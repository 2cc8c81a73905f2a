//! Maps `Box<dyn Error>` from collaborator boundaries to typed `NinjaError`.
//!
//! The traits in `ninja_traits` use `Box<dyn Error + Send + Sync>` so drivers
//! stay free of core types; this module converts those to our error enum,
//! with an optional feature-gated path for `ninja_hardware::HwError`.

use crate::error::NinjaError;

/// Map an actuator-side error to a typed `NinjaError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> NinjaError {
    #[cfg(feature = "hardware-errors")]
    {
        use ninja_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::InvalidServo(_) | HwError::InvalidAngle(_) => {
                    NinjaError::Rejected(format!("out of range: {hw}"))
                }
                HwError::EchoTimeout => NinjaError::SensorFault(hw.to_string()),
                other => NinjaError::ActuatorFault(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("out of range") {
        NinjaError::Rejected(s)
    } else {
        NinjaError::ActuatorFault(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_errors_become_actuator_faults() {
        let e = std::io::Error::other("servo bus jammed");
        assert_eq!(
            map_hw_error(&e),
            NinjaError::ActuatorFault("servo bus jammed".into())
        );
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn typed_hardware_errors_are_downcast() {
        use ninja_hardware::error::HwError;
        let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(HwError::InvalidServo(9));
        assert!(matches!(map_hw_error(boxed.as_ref()), NinjaError::Rejected(_)));
        let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(HwError::Bus("x".into()));
        assert!(matches!(
            map_hw_error(boxed.as_ref()),
            NinjaError::ActuatorFault(_)
        ));
    }
}
