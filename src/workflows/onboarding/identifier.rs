use rand::Rng;

use super::domain::ApplicationId;

pub const ID_PREFIX: &str = "VC-BIZ-";

const ID_SUFFIX_LEN: usize = 6;
const ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a shareable application identifier: `VC-BIZ-` plus six characters
/// drawn uniformly from `[A-Z0-9]`. Uniqueness is not checked here; the
/// workflow retries on a store conflict.
pub fn generate_application_id() -> ApplicationId {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_CHARSET[rng.gen_range(0..ID_CHARSET.len())] as char)
        .collect();
    ApplicationId(format!("{ID_PREFIX}{suffix}"))
}

/// Whether a string is a well-formed application identifier.
pub fn is_well_formed(id: &str) -> bool {
    match id.strip_prefix(ID_PREFIX) {
        Some(suffix) => {
            suffix.len() == ID_SUFFIX_LEN
                && suffix
                    .bytes()
                    .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        }
        None => false,
    }
}
