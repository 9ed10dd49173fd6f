mod util;

use std::fs;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use minicert::artifact::ArtifactPaths;
use minicert::cert::SUBJECT_MODULUS_OFFSET;
use minicert::error::MiniCertError;
use minicert::expiry::ExpirySpec;
use minicert::generate::generate;
use minicert::issuer::IssuerKeyPair;
use openssl::bn::{BigNum, BigNumContext};
use openssl::pkey::PKey;
use openssl::rsa::{Padding, Rsa};
use openssl::symm::Cipher;
use rand_core::OsRng;
use zeroize::Zeroizing;

/// Recovers the digest from the signature with the CA public key the way a
/// device does and compares it against OpenSSL's SHA-1 of the info block.
#[test]
fn test_openssl_recovers_digest() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ArtifactPaths::in_dir(dir.path());

    let ca = Rsa::generate(1024).unwrap();
    let key_file = dir.path().join("cakey.pem");
    fs::write(&key_file, ca.private_key_to_pem().unwrap()).unwrap();
    let issuer = IssuerKeyPair::load(&key_file, None).unwrap();

    let request = util::alice_request(ExpirySpec::Date("000000010138".into()));
    let issued = generate(&request, &issuer, &paths, &mut OsRng).unwrap();

    let blob = STANDARD
        .decode(fs::read_to_string(&paths.certificate).unwrap())
        .unwrap();
    let info_len = SUBJECT_MODULUS_OFFSET + issued.certificate.info.subject_modulus.len();
    let signature = &blob[info_len..info_len + 128];
    let ca_modulus = &blob[info_len + 128..];
    assert_eq!(ca_modulus, ca.n().to_vec().as_slice());

    let public = Rsa::from_public_components(
        BigNum::from_slice(ca_modulus).unwrap(),
        BigNum::from_u32(65_537).unwrap(),
    )
    .unwrap();
    let mut recovered = vec![0u8; public.size() as usize];
    let len = public
        .public_decrypt(signature, &mut recovered, Padding::PKCS1)
        .unwrap();

    assert_eq!(&recovered[..len], openssl::sha::sha1(&blob[..info_len]).as_slice());
}

#[test]
fn test_openssl_subject_key_pair() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ArtifactPaths::in_dir(dir.path());
    let issuer = util::generate_issuer();
    let request = util::alice_request(ExpirySpec::DaysFromNow {
        days: 31,
        midnight: false,
    });
    let issued = generate(&request, &issuer, &paths, &mut OsRng).unwrap();

    let n = BigNum::from_slice(&issued.certificate.info.subject_modulus).unwrap();
    assert_eq!(n.num_bits(), 512);
    let d_bytes = STANDARD
        .decode(fs::read_to_string(&paths.private_key).unwrap())
        .unwrap();
    let d = BigNum::from_slice(&d_bytes).unwrap();
    let e = BigNum::from_u32(65_537).unwrap();
    let m = BigNum::from_u32(0xC0FF_EE42).unwrap();

    let mut ctx = BigNumContext::new().unwrap();
    let mut c = BigNum::new().unwrap();
    c.mod_exp(&m, &e, &n, &mut ctx).unwrap();
    let mut back = BigNum::new().unwrap();
    back.mod_exp(&c, &d, &n, &mut ctx).unwrap();
    assert_eq!(back, m);
}

#[test]
fn test_openssl_encrypted_pkcs8_key() {
    let dir = tempfile::tempdir().unwrap();
    let key_file = dir.path().join("cakey.pem");
    let ca = PKey::from_rsa(Rsa::generate(1024).unwrap()).unwrap();
    let pem = ca
        .private_key_to_pem_pkcs8_passphrase(Cipher::aes_256_cbc(), b"secret")
        .unwrap();
    fs::write(&key_file, pem).unwrap();

    let issuer = IssuerKeyPair::load(&key_file, Some(b"secret")).unwrap();
    assert_eq!(issuer.public_modulus(), ca.rsa().unwrap().n().to_vec());

    assert!(matches!(
        IssuerKeyPair::load(&key_file, None),
        Err(MiniCertError::KeyLoadError(_))
    ));
    assert!(matches!(
        IssuerKeyPair::load(&key_file, Some(b"wrong")),
        Err(MiniCertError::KeyLoadError(_))
    ));
}

#[test]
fn test_openssl_traditional_encrypted_key() {
    let dir = tempfile::tempdir().unwrap();
    let key_file = dir.path().join("cakey.pem");
    let ca = Rsa::generate(1024).unwrap();

    for cipher in [Cipher::aes_256_cbc(), Cipher::aes_128_cbc(), Cipher::des_ede3_cbc()] {
        let pem = ca.private_key_to_pem_passphrase(cipher, b"secret").unwrap();
        assert!(String::from_utf8_lossy(&pem).contains("Proc-Type: 4,ENCRYPTED"));
        fs::write(&key_file, pem).unwrap();

        let issuer = IssuerKeyPair::load(&key_file, Some(b"secret")).unwrap();
        assert_eq!(issuer.public_modulus(), ca.n().to_vec());

        assert!(matches!(
            IssuerKeyPair::load(&key_file, None),
            Err(MiniCertError::KeyLoadError(_))
        ));
        assert!(matches!(
            IssuerKeyPair::load(&key_file, Some(b"wrong")),
            Err(MiniCertError::KeyLoadError(_))
        ));
    }
}

#[test]
fn test_openssl_password_asked_once_for_encrypted_key() {
    let dir = tempfile::tempdir().unwrap();
    let key_file = dir.path().join("cakey.pem");
    let ca = Rsa::generate(1024).unwrap();
    let pem = ca
        .private_key_to_pem_passphrase(Cipher::aes_128_cbc(), b"secret")
        .unwrap();
    fs::write(&key_file, pem).unwrap();

    let mut asked = 0;
    let issuer = IssuerKeyPair::load_with(&key_file, || {
        asked += 1;
        Ok(Zeroizing::new(b"secret".to_vec()))
    })
    .unwrap();
    assert_eq!(asked, 1);
    assert_eq!(issuer.public_modulus(), ca.n().to_vec());
}

#[test]
fn test_openssl_inconsistent_key_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let key_file = dir.path().join("cakey.pem");
    let ca = Rsa::generate(1024).unwrap();

    let mut d = BigNum::new().unwrap();
    d.checked_add(ca.d(), &BigNum::from_u32(2).unwrap()).unwrap();
    let broken = Rsa::from_private_components(
        ca.n().to_owned().unwrap(),
        ca.e().to_owned().unwrap(),
        d,
        ca.p().unwrap().to_owned().unwrap(),
        ca.q().unwrap().to_owned().unwrap(),
        ca.dmp1().unwrap().to_owned().unwrap(),
        ca.dmq1().unwrap().to_owned().unwrap(),
        ca.iqmp().unwrap().to_owned().unwrap(),
    )
    .unwrap();
    fs::write(&key_file, broken.private_key_to_pem().unwrap()).unwrap();

    assert!(matches!(
        IssuerKeyPair::load(&key_file, None),
        Err(MiniCertError::InvalidKey(_))
    ));

    let pkcs8 = PKey::from_rsa(broken)
        .unwrap()
        .private_key_to_pem_pkcs8()
        .unwrap();
    fs::write(&key_file, pkcs8).unwrap();
    assert!(matches!(
        IssuerKeyPair::load(&key_file, None),
        Err(MiniCertError::InvalidKey(_))
    ));
}

#[test]
fn test_openssl_rejects_2048_bit_ca() {
    let dir = tempfile::tempdir().unwrap();
    let key_file = dir.path().join("cakey.pem");
    let ca = Rsa::generate(2048).unwrap();
    fs::write(&key_file, ca.private_key_to_pem().unwrap()).unwrap();

    assert!(matches!(
        IssuerKeyPair::load(&key_file, None),
        Err(MiniCertError::InvalidKey(_))
    ));
}
