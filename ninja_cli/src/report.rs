//! Rendering of session replies and auto-stops on stdout.

use ninja_core::{AutoStop, DispatchOutcome, NinjaError, SessionReply, StopCause};
use serde_json::{Value, json};

pub fn reply_json(input: &str, reply: &SessionReply, status: &str) -> Value {
    let mut obj = json!({ "input": input, "status": status });
    let fields = match reply {
        SessionReply::Ignored => json!({ "kind": "ignored" }),
        SessionReply::Answer(a) => json!({ "kind": "answer", "answer": a }),
        SessionReply::Dispatched { action, outcome } => json!({
            "kind": "dispatched",
            "action": action.to_string(),
            "outcome": outcome.label(),
            "detail": outcome.detail(),
        }),
        SessionReply::NotUnderstood(e) => json!({ "kind": "not_understood", "error": e }),
    };
    merge(&mut obj, fields);
    obj
}

pub fn auto_stop_json(stop: &AutoStop) -> Value {
    let mut obj = json!({ "event": "auto_stop", "gait": stop.gait.name() });
    let cause = match &stop.cause {
        StopCause::Obstacle { distance_cm } => {
            json!({ "cause": "obstacle", "distance_cm": distance_cm })
        }
        StopCause::SensorFault => json!({ "cause": "sensor_fault" }),
        StopCause::GaitFault(d) => json!({ "cause": "gait_fault", "detail": d }),
        StopCause::GaitEnded => json!({ "cause": "gait_ended" }),
    };
    merge(&mut obj, cause);
    obj
}

pub fn print_reply(input: &str, reply: &SessionReply, status: &str, json: bool) {
    if json {
        println!("{}", reply_json(input, reply, status));
    } else if !matches!(reply, SessionReply::Ignored) {
        println!("{reply}");
    }
}

pub fn print_auto_stop(stop: &AutoStop, json: bool) {
    if json {
        println!("{}", auto_stop_json(stop));
    } else {
        println!("{stop}");
    }
}

/// Turn a non-successful reply into the domain error that decides the exit code.
pub fn reply_result(reply: &SessionReply) -> Result<(), NinjaError> {
    match reply {
        SessionReply::Ignored | SessionReply::Answer(_) => Ok(()),
        SessionReply::Dispatched { outcome, .. } => outcome_result(outcome),
        SessionReply::NotUnderstood(e) => Err(NinjaError::Interpretation(e.clone())),
    }
}

pub fn outcome_result(outcome: &DispatchOutcome) -> Result<(), NinjaError> {
    match outcome {
        DispatchOutcome::Executed => Ok(()),
        DispatchOutcome::Rejected(r) => Err(NinjaError::Rejected(r.clone())),
        DispatchOutcome::Errored(d) => Err(NinjaError::ActuatorFault(d.clone())),
    }
}

fn merge(into: &mut Value, from: Value) {
    if let (Value::Object(a), Value::Object(b)) = (into, from) {
        a.extend(b);
    }
}
