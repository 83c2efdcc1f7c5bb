#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = core::str::from_utf8(data) {
        if let Ok(envelope) = ephemeral::Envelope::unmarshal(text) {
            let _ = envelope.open::<ephemeral::Response>();
            let _ = envelope.open::<ephemeral::PublicRequest>();
        }
    }
});
