// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test data generators.

use serde_json::{json, Value};
use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of IP addresses for testing.
pub fn generate_ips(count: usize) -> Vec<IpAddr> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c))
        })
        .collect()
}

/// The reference valid submission.
pub fn valid_submission() -> Value {
    json!({
        "name": "Huy",
        "email": "huy@test.com",
        "subject": "Hello there",
        "message": "This is a test message."
    })
}

/// A valid submission with one field replaced.
pub fn with_field(field: &str, value: Value) -> Value {
    let mut body = valid_submission();
    body[field] = value;
    body
}

/// A valid submission with one field removed.
pub fn without_field(field: &str) -> Value {
    let mut body = valid_submission();
    if let Some(map) = body.as_object_mut() {
        map.remove(field);
    }
    body
}

/// Markup payloads that must never reach the notification verbatim.
pub fn markup_payloads() -> Vec<&'static str> {
    vec![
        "<script>alert('x')</script>",
        "<img src=x onerror=alert(1)>",
        "<a href=\"javascript:alert(1)\">click</a>",
        "<svg/onload=alert(1)>",
        "<iframe src=\"https://evil.example\"></iframe>",
        "<<script>script>alert(1)<</script>/script>",
    ]
}
