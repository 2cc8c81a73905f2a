#![no_main]
use libfuzzer_sys::fuzz_target;
use ninja_core::{ActionDescriptor, parse_action_json};

fuzz_target!(|data: &str| {
    // Interpreter replies are untrusted text: parsing must never panic, and a
    // servo request keeps whatever integers it carried for the range check.
    match parse_action_json(data) {
        Ok(ActionDescriptor::Unknown { reason }) => assert!(!reason.is_empty()),
        Ok(action) => {
            let _ = action.to_string();
        }
        Err(_) => {}
    }
});
