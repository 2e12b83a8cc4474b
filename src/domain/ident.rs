//! Identifier syntax and content limits.
//!
//! Page ids are short alphanumeric names (`^[A-Za-z0-9]{3,24}$`); share and
//! burn tokens are 16 hex characters (8 random bytes). Any syntactically
//! valid page id that was never written is still a valid, blank page, so
//! validation here is purely syntactic.

use super::error::DomainError;

/// Maximum page content length, counted in characters.
pub const MAX_CONTENT_CHARS: usize = 100_000;

/// Length of share and burn tokens in hex characters.
pub const TOKEN_LEN: usize = 16;

const PAGE_ID_MIN: usize = 3;
const PAGE_ID_MAX: usize = 24;

/// Paths that always resolve to the read-only main page.
const RESERVED_IDS: [&str; 5] = ["", "0", "1", "main", "index"];

pub fn is_reserved_id(path: &str) -> bool {
    RESERVED_IDS.contains(&path)
}

/// Validate a page identifier: 3 to 24 ASCII alphanumerics.
pub fn validate_page_id(id: &str) -> Result<(), DomainError> {
    let len = id.len();
    if (PAGE_ID_MIN..=PAGE_ID_MAX).contains(&len) && id.bytes().all(|b| b.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(DomainError::invalid_identifier("page id", id))
    }
}

/// Validate a page id for write operations. Reserved ids resolve to the
/// read-only main page and can never be written.
pub fn validate_writable_page_id(id: &str) -> Result<(), DomainError> {
    validate_page_id(id)?;
    if is_reserved_id(id) {
        return Err(DomainError::invalid_identifier("page id", id));
    }
    Ok(())
}

/// Validate a share or burn token: exactly 16 hex characters.
pub fn validate_token(token: &str) -> Result<(), DomainError> {
    if token.len() == TOKEN_LEN && token.bytes().all(|b| b.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(DomainError::invalid_identifier("token", token))
    }
}

/// Enforce the content ceiling. Counted in characters, not bytes, so
/// multi-byte text is not penalized.
pub fn validate_content(content: &str) -> Result<(), DomainError> {
    // Cheap pre-check: a string of N chars occupies at least N bytes.
    if content.len() <= MAX_CONTENT_CHARS {
        return Ok(());
    }
    let chars = content.chars().count();
    if chars > MAX_CONTENT_CHARS {
        return Err(DomainError::content_too_large(chars, MAX_CONTENT_CHARS));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_page_ids() {
        for id in ["abc", "abc123", "ABC123xyz", "a1B2c3D4e5F6g7H8i9J0k1L2"] {
            assert!(validate_page_id(id).is_ok(), "{id} should be valid");
        }
    }

    #[test]
    fn rejects_invalid_page_ids() {
        for id in ["", "ab", "a".repeat(25).as_str(), "has space", "has-dash", "héllo"] {
            assert!(validate_page_id(id).is_err(), "{id:?} should be invalid");
        }
    }

    #[test]
    fn reserved_ids_cover_main_aliases() {
        for id in ["", "0", "1", "main", "index"] {
            assert!(is_reserved_id(id));
        }
        assert!(!is_reserved_id("main2"));
    }

    #[test]
    fn reserved_ids_are_never_writable() {
        assert!(validate_writable_page_id("main").is_err());
        assert!(validate_writable_page_id("index").is_err());
        assert!(validate_writable_page_id("abc123").is_ok());
    }

    #[test]
    fn token_validation() {
        assert!(validate_token("0123456789abcdef").is_ok());
        assert!(validate_token("0123456789ABCDEF").is_ok());
        assert!(validate_token("0123456789abcde").is_err());
        assert!(validate_token("0123456789abcdefg").is_err());
        assert!(validate_token("0123456789abcdeg").is_err());
    }

    #[test]
    fn content_limit_is_exact() {
        let at_limit = "x".repeat(MAX_CONTENT_CHARS);
        assert!(validate_content(&at_limit).is_ok());

        let over = "x".repeat(MAX_CONTENT_CHARS + 1);
        assert!(matches!(
            validate_content(&over),
            Err(DomainError::ContentTooLarge { .. })
        ));
    }

    #[test]
    fn content_limit_counts_chars_not_bytes() {
        // 100,000 three-byte characters are within the limit.
        let wide = "语".repeat(MAX_CONTENT_CHARS);
        assert!(validate_content(&wide).is_ok());
    }
}
