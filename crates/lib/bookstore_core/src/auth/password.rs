//! Password hashing via bcrypt, plus the registration password policy.

use std::sync::LazyLock;

use super::AuthError;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// bcrypt only reads this many bytes of input.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hash compared against when a username is unknown, so both login failures
/// cost one bcrypt verification.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    bcrypt::hash("bookstore-dummy-password", BCRYPT_COST).unwrap_or_default()
});

/// Hash a password with bcrypt (cost 10). Passwords over 72 bytes are an error.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::non_truncating_hash(password, BCRYPT_COST)
        .map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash.
///
/// A password longer than bcrypt's input limit never matches.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Ok(false);
    }
    bcrypt::non_truncating_verify(password, hash)
        .map_err(|e| AuthError::Internal(format!("bcrypt verify: {e}")))
}

/// Burn one bcrypt verification and report no match.
pub fn verify_against_dummy(password: &str) -> bool {
    let _ = bcrypt::verify(password, &DUMMY_HASH);
    false
}

/// Check a candidate password against the policy.
///
/// Returns every violated rule so registration can report them together.
/// An empty vector means the password is acceptable.
pub fn validate_password(password: &str) -> Vec<String> {
    let mut problems = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        problems.push(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        ));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        problems.push(format!("Password must be at most {MAX_PASSWORD_BYTES} bytes"));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        problems.push("Password must contain at least one digit ('0'-'9')".to_string());
    }
    if !password.chars().any(char::is_lowercase) {
        problems.push("Password must contain at least one lowercase letter ('a'-'z')".to_string());
    }
    if !password.chars().any(char::is_uppercase) {
        problems.push("Password must contain at least one uppercase letter ('A'-'Z')".to_string());
    }
    if password.chars().all(char::is_alphanumeric) {
        problems.push("Password must contain at least one non-alphanumeric character".to_string());
    }
    problems
}
