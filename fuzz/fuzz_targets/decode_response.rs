#![no_main]

use libfuzzer_sys::fuzz_target;
use once_cell::sync::Lazy;

static REQUEST: Lazy<ephemeral::PrivateRequest> =
    Lazy::new(|| ephemeral::PrivateRequest::new("fuzz").expect("request"));

static RESPONDER_KEY: Lazy<ephemeral::PublicKey> = Lazy::new(|| {
    ephemeral::PrivateKey::generate(REQUEST.curve())
        .expect("key")
        .public_key()
});

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks the mode: raw ciphertext or a whole serialized response.
    let body = &data[1..];
    if data[0] & 1 == 0 {
        let response = ephemeral::Response {
            id: REQUEST.id,
            key: RESPONDER_KEY.clone(),
            data: body.to_vec(),
        };
        let _ = REQUEST.decode(&response);
    } else {
        let mut envelope = ephemeral::Envelope::new("RESPONSE", "");
        envelope.data_mut().extend_from_slice(body);
        if let Ok(response) = envelope.open::<ephemeral::Response>() {
            let _ = REQUEST.decode(&response);
        }
    }
});
