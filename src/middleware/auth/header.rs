//! `Authorization` header parsing.
//!
//! The header is split on the first space into a scheme and a credential.
//! Parsing works on raw bytes: header values may carry obs-text, and only the
//! scheme decides between "not bearer" and "bearer with a bad credential".
//! The credential is opaque here; only the verifier knows its format.

/// `"<scheme> <credential>"` borrowed from the request headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthHeader<'a> {
    pub scheme: &'a [u8],
    pub credential: &'a [u8],
}

impl<'a> AuthHeader<'a> {
    /// `None` when the header is absent or empty.
    pub fn parse(raw: Option<&'a [u8]>) -> Option<Self> {
        let raw = raw.filter(|v| !v.is_empty())?;
        let (scheme, credential) = match raw.iter().position(|b| *b == b' ') {
            Some(at) => (&raw[..at], &raw[at + 1..]),
            None => (raw, &raw[raw.len()..]),
        };

        Some(Self { scheme, credential })
    }

    pub fn is_bearer(&self) -> bool {
        self.scheme.eq_ignore_ascii_case(b"bearer")
    }

    /// Credential as text; `None` when it is not valid UTF-8.
    pub fn credential_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.credential).ok()
    }
}
