use crate::error::RegistryError;
use rand::Rng;

/// Length of every generated short code.
pub const CODE_LENGTH: usize = 6;

/// Upper bound on redraws before giving up.
pub const MAX_ATTEMPTS: usize = 100;

pub const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a random short code for which `is_taken` returns `false`, using
/// the thread-local RNG.
pub fn generate(is_taken: impl Fn(&str) -> bool) -> Result<String, RegistryError> {
    generate_with(&mut rand::thread_rng(), is_taken)
}

/// Same as [`generate`] but drawing from the supplied RNG.
///
/// The whole code is redrawn on every collision, up to [`MAX_ATTEMPTS`]
/// times.
pub fn generate_with<R: Rng + ?Sized>(
    rng: &mut R,
    is_taken: impl Fn(&str) -> bool,
) -> Result<String, RegistryError> {
    for _ in 0..MAX_ATTEMPTS {
        let code = random_code(rng, CODE_LENGTH);
        if !is_taken(&code) {
            return Ok(code);
        }
    }
    Err(RegistryError::GenerationExhausted(MAX_ATTEMPTS))
}

/// Generate a random alphanumeric string of the given length.
fn random_code<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}
