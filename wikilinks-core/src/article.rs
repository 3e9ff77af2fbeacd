//! Article identity.
//!
//! Article identifiers are content-addressed: the id of an article is the
//! 16-byte BLAKE2b digest of its name. Any component can therefore compute the
//! id of a link target without consulting the store.

use std::fmt;

use blake2b_simd::Params;
use uuid::Uuid;

/// Length in bytes of an encoded [`ArticleId`].
pub const ARTICLE_ID_LEN: usize = 16;

/// Stable identifier of a Wikipedia article, derived from its name.
///
/// # Examples
///
/// ```
/// use wikilinks_core::ArticleId;
///
/// let rust = ArticleId::from_name("Rust (programming language)");
/// assert_eq!(rust, ArticleId::from_name("Rust (programming language)"));
/// assert_ne!(rust, ArticleId::from_name("Rust"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ArticleId(Uuid);

impl ArticleId {
    /// Hash an article name into its identifier.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let hash = Params::new()
            .hash_length(ARTICLE_ID_LEN)
            .hash(name.as_bytes());
        let mut bytes = [0_u8; ARTICLE_ID_LEN];
        for (slot, byte) in bytes.iter_mut().zip(hash.as_bytes()) {
            *slot = *byte;
        }
        Self::from_bytes(bytes)
    }

    /// Rebuild an identifier from its raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; ARTICLE_ID_LEN]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Rebuild an identifier from a byte slice, returning `None` unless the
    /// slice holds exactly [`ARTICLE_ID_LEN`] bytes.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; ARTICLE_ID_LEN]>::try_from(bytes)
            .ok()
            .map(Self::from_bytes)
    }

    /// Raw bytes of the identifier, as stored in SQLite.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ARTICLE_ID_LEN] {
        self.0.as_bytes()
    }

    /// The identifier as a UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for ArticleId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

/// An article name paired with its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Article {
    /// Content-addressed identifier.
    pub id: ArticleId,
    /// Article title as it appears in the dump.
    pub name: String,
}

impl Article {
    /// Build an article, deriving the id from `name`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wikilinks_core::{Article, ArticleId};
    ///
    /// let article = Article::new("Graph theory");
    /// assert_eq!(article.id, ArticleId::from_name("Graph theory"));
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        let title: String = name.into();
        Self {
            id: ArticleId::from_name(&title),
            name: title,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn ids_are_sixteen_byte_blake2b_digests() {
        let id = ArticleId::from_name("Wikipedia");
        let digest = Params::new().hash_length(16).hash(b"Wikipedia");
        assert_eq!(id.as_bytes().as_slice(), digest.as_bytes());
    }

    #[rstest]
    #[case("")]
    #[case("Ünïcödé")]
    #[case("A very long article title about (disambiguation)")]
    fn bytes_round_trip_through_slices(#[case] name: &str) {
        let id = ArticleId::from_name(name);
        assert_eq!(ArticleId::from_slice(id.as_bytes()), Some(id));
    }

    #[rstest]
    #[case(&[0_u8; 15][..])]
    #[case(&[0_u8; 17][..])]
    fn rejects_wrong_length_slices(#[case] bytes: &[u8]) {
        assert_eq!(ArticleId::from_slice(bytes), None);
    }

    #[rstest]
    fn displays_as_hyphenated_uuid() {
        let id = ArticleId::from_bytes([0xab; 16]);
        assert_eq!(id.to_string(), "abababab-abab-abab-abab-abababababab");
    }

    #[rstest]
    fn names_differing_in_case_get_distinct_ids() {
        assert_ne!(ArticleId::from_name("Mercury"), ArticleId::from_name("mercury"));
    }
}
