#![allow(dead_code)]

use minicert::cert::params::CertificateRequest;
use minicert::expiry::{ExpirySpec, FixedClock};
use minicert::issuer::IssuerKeyPair;
use rand_core::OsRng;
use rsa::RsaPrivateKey;
use time::UtcOffset;
use time::macros::datetime;

pub fn fixed_clock() -> FixedClock {
    FixedClock {
        now: datetime!(2024-01-01 12:34:56 UTC),
        offset: UtcOffset::UTC,
    }
}

pub fn generate_ca_key() -> RsaPrivateKey {
    RsaPrivateKey::new(&mut OsRng, 1024).unwrap()
}

pub fn generate_issuer() -> IssuerKeyPair {
    IssuerKeyPair::new(generate_ca_key()).unwrap()
}

pub fn alice_request(expiry: ExpirySpec) -> CertificateRequest {
    CertificateRequest::builder()
        .display_name("Alice")
        .user_id("1001")
        .expiry(expiry)
        .clock(fixed_clock())
        .build()
        .unwrap()
}
