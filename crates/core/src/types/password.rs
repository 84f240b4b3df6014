//! Account password policy.

use core::fmt;

/// Reasons a password is rejected.
///
/// The messages are shown to admins verbatim on the add-moderator form.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    /// Shorter than [`Password::MIN_LENGTH`].
    #[error("Password must be at least {min} characters long.")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// Missing a character class, or contains a character outside the
    /// allowed set.
    #[error(
        "Password must contain at least one uppercase letter, one lowercase letter, one number, and one special character."
    )]
    Complexity,
}

/// A password that satisfies the account policy.
///
/// ## Constraints
///
/// - At least 6 characters
/// - At least one lowercase letter, one uppercase letter, one ASCII digit,
///   and one special character from `@$!%*?&`
/// - Only ASCII letters, digits and `@$!%*?&`
///
/// `Debug` and `Display` never print the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Minimum password length.
    pub const MIN_LENGTH: usize = 6;

    /// Special characters accepted by the policy.
    pub const SPECIALS: &'static str = "@$!%*?&";

    /// Validate a password against the policy.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordError::TooShort`] before checking complexity, so a
    /// short password always reports its length first.
    pub fn parse(s: &str) -> Result<Self, PasswordError> {
        if s.chars().count() < Self::MIN_LENGTH {
            return Err(PasswordError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }

        let is_special = |c: char| Self::SPECIALS.contains(c);

        let allowed = s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || is_special(c));
        let has_lower = s.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = s.chars().any(|c| c.is_ascii_uppercase());
        let has_digit = s.chars().any(|c| c.is_ascii_digit());
        let has_special = s.chars().any(is_special);

        if !(allowed && has_lower && has_upper && has_digit && has_special) {
            return Err(PasswordError::Complexity);
        }

        Ok(Self(s.to_owned()))
    }

    /// Expose the password for sending to the identity provider.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}
