//! Authenticator and password obfuscation engine (RFC 2865 Section 3 / 5.2,
//! RFC 2866 Section 3)
//!
//! All digests are keyed by the shared secret. The response authenticator is
//! computed over the fully encoded datagram, so it must run strictly after
//! the length field has been patched.

use rand::Rng;
use thiserror::Error;

/// Authenticator field length and password block size
pub const AUTHENTICATOR_LENGTH: usize = 16;
/// Byte range of the authenticator within a datagram
const AUTHENTICATOR_RANGE: std::ops::Range<usize> = 4..20;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CryptoError {
    #[error("shared secret must not be empty")]
    EmptySecret,
    #[error("encrypted password length {0} is not a positive multiple of 16")]
    InvalidBlockLength(usize),
    #[error("datagram too short to sign: {0} bytes")]
    DatagramTooShort(usize),
}

/// Generate a random Request Authenticator per RFC 2865 Section 3
///
/// Used to initialize an outbound request's header and as key material for
/// User-Password obfuscation in that request.
pub fn generate_request_authenticator() -> [u8; 16] {
    let mut rng = rand::rng();
    let mut authenticator = [0u8; 16];
    rng.fill(&mut authenticator);
    authenticator
}

/// Compute the Response Authenticator in place per RFC 2865 Section 3
///
/// `datagram` must be the complete encoded response with the length field
/// final and the authenticator region (bytes 4..20) still holding the
/// request's authenticator, which is covered by the digest. The digest
/// MD5(datagram + secret) overwrites the authenticator region.
pub fn sign_response(datagram: &mut [u8], secret: &[u8]) -> Result<[u8; 16], CryptoError> {
    if secret.is_empty() {
        return Err(CryptoError::EmptySecret);
    }
    if datagram.len() < AUTHENTICATOR_RANGE.end {
        return Err(CryptoError::DatagramTooShort(datagram.len()));
    }

    let mut data = Vec::with_capacity(datagram.len() + secret.len());
    data.extend_from_slice(datagram);
    data.extend_from_slice(secret);
    let digest = md5::compute(&data);

    datagram[AUTHENTICATOR_RANGE].copy_from_slice(&digest.0);
    Ok(digest.0)
}

/// Compute the Request Authenticator for an Accounting-Request in place
/// per RFC 2866 Section 3
///
/// Same digest as [`sign_response`] but computed with the authenticator
/// region zeroed first. Used when originating or re-emitting (proxying) an
/// Accounting-Request.
pub fn sign_accounting_request(datagram: &mut [u8], secret: &[u8]) -> Result<[u8; 16], CryptoError> {
    if datagram.len() < AUTHENTICATOR_RANGE.end {
        return Err(CryptoError::DatagramTooShort(datagram.len()));
    }
    datagram[AUTHENTICATOR_RANGE].fill(0);
    sign_response(datagram, secret)
}

/// Verify a response datagram's authenticator against the originating
/// request's authenticator
pub fn verify_response(
    datagram: &[u8],
    secret: &[u8],
    request_authenticator: &[u8; 16],
) -> Result<bool, CryptoError> {
    if datagram.len() < AUTHENTICATOR_RANGE.end {
        return Err(CryptoError::DatagramTooShort(datagram.len()));
    }
    let mut scratch = datagram.to_vec();
    let claimed: [u8; 16] = datagram[AUTHENTICATOR_RANGE]
        .try_into()
        .map_err(|_| CryptoError::DatagramTooShort(datagram.len()))?;
    scratch[AUTHENTICATOR_RANGE].copy_from_slice(request_authenticator);
    let expected = sign_response(&mut scratch, secret)?;
    Ok(claimed == expected)
}

/// Obfuscate a User-Password value per RFC 2865 Section 5.2
///
/// The password is NUL-padded to a multiple of 16 bytes and transformed
/// block-wise: block i is XORed with MD5(secret + chain), where the chain is
/// the request authenticator for block 0 and the previous *output* block
/// afterwards.
pub fn encrypt_password(
    secret: &[u8],
    authenticator: &[u8; 16],
    password: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if secret.is_empty() {
        return Err(CryptoError::EmptySecret);
    }

    let mut padded = password.to_vec();
    let block_count = (padded.len() / 16) + usize::from(padded.len() % 16 != 0);
    padded.resize(block_count.max(1) * 16, 0);

    let mut result = Vec::with_capacity(padded.len());
    let mut chain: [u8; 16] = *authenticator;

    for block in padded.chunks_exact(16) {
        let hash = block_hash(secret, &chain);
        for (i, byte) in block.iter().enumerate() {
            chain[i] = byte ^ hash[i];
        }
        result.extend_from_slice(&chain);
    }

    Ok(result)
}

/// Recover a User-Password value per RFC 2865 Section 5.2
///
/// Inverse of [`encrypt_password`]: the chain for block i > 0 is the previous
/// *ciphertext* block, which is what makes the transform invertible. Trailing
/// NUL padding is trimmed at the first NUL in the recovered bytes, so a
/// password legitimately containing an embedded NUL is truncated; this
/// matches the wire behavior of existing implementations and is a known
/// limitation.
pub fn decrypt_password(
    secret: &[u8],
    authenticator: &[u8; 16],
    encrypted: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if secret.is_empty() {
        return Err(CryptoError::EmptySecret);
    }
    if encrypted.is_empty() || encrypted.len() % 16 != 0 {
        return Err(CryptoError::InvalidBlockLength(encrypted.len()));
    }

    let mut result = Vec::with_capacity(encrypted.len());
    let mut chain: &[u8] = authenticator;

    for block in encrypted.chunks_exact(16) {
        let hash = block_hash(secret, chain);
        for (i, byte) in block.iter().enumerate() {
            result.push(byte ^ hash[i]);
        }
        chain = block;
    }

    if let Some(nul) = result.iter().position(|&b| b == 0) {
        result.truncate(nul);
    }

    Ok(result)
}

fn block_hash(secret: &[u8], chain: &[u8]) -> [u8; 16] {
    let mut data = Vec::with_capacity(secret.len() + chain.len());
    data.extend_from_slice(secret);
    data.extend_from_slice(chain);
    md5::compute(&data).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_authenticator_is_random() {
        let a = generate_request_authenticator();
        let b = generate_request_authenticator();
        assert_ne!(a, b);
    }

    #[test]
    fn test_password_round_trip_single_block() {
        let secret = b"sharedsecret";
        let authenticator = [7u8; 16];

        let encrypted = encrypt_password(secret, &authenticator, b"hunter2").unwrap();
        assert_eq!(encrypted.len(), 16);

        let decrypted = decrypt_password(secret, &authenticator, &encrypted).unwrap();
        assert_eq!(decrypted, b"hunter2");
    }

    #[test]
    fn test_password_round_trip_multi_block() {
        let secret = b"sharedsecret";
        let authenticator = [0x42u8; 16];

        for len in [1usize, 15, 16, 17, 32, 33, 128] {
            let password: Vec<u8> = (0..len).map(|i| (i % 255) as u8 + 1).collect();
            let encrypted = encrypt_password(secret, &authenticator, &password).unwrap();
            assert_eq!(encrypted.len() % 16, 0);
            assert!(encrypted.len() >= password.len());

            let decrypted = decrypt_password(secret, &authenticator, &encrypted).unwrap();
            assert_eq!(decrypted, password, "length {}", len);
        }
    }

    #[test]
    fn test_wrong_secret_does_not_recover() {
        let authenticator = [9u8; 16];
        let encrypted = encrypt_password(b"right", &authenticator, b"password123").unwrap();
        let decrypted = decrypt_password(b"wrong", &authenticator, &encrypted).unwrap();
        assert_ne!(decrypted, b"password123");
    }

    #[test]
    fn test_empty_password_pads_to_one_block() {
        let encrypted = encrypt_password(b"s3cret", &[1u8; 16], b"").unwrap();
        assert_eq!(encrypted.len(), 16);
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert_eq!(
            encrypt_password(b"", &[0u8; 16], b"pw"),
            Err(CryptoError::EmptySecret)
        );
        assert_eq!(
            decrypt_password(b"", &[0u8; 16], &[0u8; 16]),
            Err(CryptoError::EmptySecret)
        );
        assert_eq!(
            sign_response(&mut [0u8; 20], b""),
            Err(CryptoError::EmptySecret)
        );
    }

    #[test]
    fn test_invalid_ciphertext_length() {
        assert_eq!(
            decrypt_password(b"s", &[0u8; 16], &[0u8; 15]),
            Err(CryptoError::InvalidBlockLength(15))
        );
        assert_eq!(
            decrypt_password(b"s", &[0u8; 16], &[]),
            Err(CryptoError::InvalidBlockLength(0))
        );
    }

    #[test]
    fn test_sign_response_matches_manual_digest() {
        let secret = b"testing123";
        let mut datagram = vec![0u8; 20];
        datagram[0] = 2; // Access-Accept
        datagram[1] = 7;
        datagram[3] = 20;
        let before = datagram.clone();

        let digest = sign_response(&mut datagram, secret).unwrap();

        let mut expected_input = before;
        expected_input.extend_from_slice(secret);
        let expected = md5::compute(&expected_input).0;
        assert_eq!(digest, expected);
        assert_eq!(&datagram[4..20], &expected);
    }

    #[test]
    fn test_sign_and_verify_response() {
        let secret = b"testing123";
        let request_auth = [3u8; 16];
        let mut datagram = vec![0u8; 24];
        datagram[0] = 2;
        datagram[3] = 24;
        datagram[4..20].copy_from_slice(&request_auth);

        sign_response(&mut datagram, secret).unwrap();
        assert!(verify_response(&datagram, secret, &request_auth).unwrap());
        assert!(!verify_response(&datagram, b"other", &request_auth).unwrap());
    }

    #[test]
    fn test_sign_accounting_request_zeroes_region_first() {
        let secret = b"acctsecret";
        let mut a = vec![0u8; 20];
        a[0] = 4;
        a[3] = 20;
        let mut b = a.clone();
        b[4..20].copy_from_slice(&[0xffu8; 16]);

        let da = sign_accounting_request(&mut a, secret).unwrap();
        let db = sign_accounting_request(&mut b, secret).unwrap();
        assert_eq!(da, db);
    }
}
