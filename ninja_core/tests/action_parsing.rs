use ninja_core::{ActionDescriptor, NinjaError, parse_action_json};
use ninja_traits::{Gait, SoundKey, SpeedClass};
use rstest::rstest;

#[rstest]
#[case(
    r#"{"action_type":"move","move_function":"walk","speed":"fast"}"#,
    ActionDescriptor::Move { gait: Gait::Walk, speed: SpeedClass::Fast, style: None }
)]
#[case(
    r#"{"action_type":"move","move_function":"ROTATELEFT","speed":"warp"}"#,
    ActionDescriptor::Move { gait: Gait::RotateLeft, speed: SpeedClass::Normal, style: None }
)]
#[case(
    r#"{"action_type":"move","move_function":"stop"}"#,
    ActionDescriptor::stop()
)]
#[case(
    r#"{"action_type":"sound","sound_keyword":"thank you"}"#,
    ActionDescriptor::Sound { key: SoundKey::Thanks }
)]
#[case(
    r#"{"action_type":"sound","sound_keyword":"kazoo"}"#,
    ActionDescriptor::Sound { key: SoundKey::No }
)]
#[case(
    r#"{"action_type":"combo","move_function":"hello","sound_keyword":"hello","style":"bouncy"}"#,
    ActionDescriptor::Combo {
        gait: Gait::Hello,
        speed: SpeedClass::Normal,
        style: Some("bouncy".into()),
        sound: SoundKey::Hello,
    }
)]
#[case(
    r#"{"action_type":"servo","servo_id":5,"servo_angle":90}"#,
    ActionDescriptor::Servo { servo_id: 5, angle_degrees: 90 }
)]
fn parses_structured_replies(#[case] json: &str, #[case] expected: ActionDescriptor) {
    assert_eq!(parse_action_json(json).unwrap(), expected);
}

#[rstest]
#[case(r#"{"action_type":"move","move_function":"moonwalk"}"#, "moonwalk")]
#[case(r#"{"action_type":"move"}"#, "move_function")]
#[case(r#"{"action_type":"servo","servo_id":1.5,"servo_angle":90}"#, "integer")]
#[case(r#"{"action_type":"servo","servo_angle":90}"#, "integer")]
#[case(r#"{"action_type":"unknown","error":"cannot fly"}"#, "cannot fly")]
#[case(r#"{"action_type":"dance"}"#, "dance")]
#[case(r#"{}"#, "action_type")]
fn unusable_replies_become_unknown(#[case] json: &str, #[case] needle: &str) {
    match parse_action_json(json).unwrap() {
        ActionDescriptor::Unknown { reason } => {
            assert!(reason.contains(needle), "reason {reason:?} lacks {needle:?}");
        }
        other => panic!("expected Unknown, got {other:?}"),
    }
}

#[test]
fn fenced_reply_is_accepted() {
    let reply = "Here you go:\n```json\n{\"action_type\": \"move\", \"move_function\": \"run\"}\n```";
    assert_eq!(
        parse_action_json(reply).unwrap(),
        ActionDescriptor::move_to(Gait::Run)
    );
}

#[rstest]
#[case("walk forward please")]
#[case("```json\n{not json}\n```")]
#[case("")]
fn unreadable_replies_are_interpretation_errors(#[case] reply: &str) {
    assert!(matches!(
        parse_action_json(reply),
        Err(NinjaError::Interpretation(_))
    ));
}
