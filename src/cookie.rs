//! `Set-Cookie` rendering for issued session tokens.

use std::fmt;

use serde::{Deserialize, Deserializer};

/// Cross-site policy written into the `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    #[default]
    None,
    Lax,
    Strict,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            SameSite::None => "None",
            SameSite::Lax => "Lax",
            SameSite::Strict => "Strict",
        };
        f.write_str(value)
    }
}

/// `SameSite` value other than `none`, `lax` or `strict`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown SameSite policy: {0}")]
pub struct UnknownSameSite(pub String);

impl std::str::FromStr for SameSite {
    type Err = UnknownSameSite;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(SameSite::None),
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            _ => Err(UnknownSameSite(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for SameSite {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Whether `name` is a valid cookie name (an HTTP token).
///
/// Non-empty visible ASCII with none of the separator characters, so a name
/// can never smuggle in `;`-separated attributes.
pub fn is_valid_cookie_name(name: &str) -> bool {
    const SEPARATORS: &[u8] = b"()<>@,;:\\\"/[]?={} \t";

    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_graphic() && !SEPARATORS.contains(&b))
}

/// Render the session cookie header value.
///
/// Always `HttpOnly` and `Secure`; browsers only accept `SameSite=None`
/// together with `Secure`.
#[must_use]
pub fn session_cookie(name: &str, token: &str, same_site: SameSite) -> String {
    format!("{name}={token}; Path=/; HttpOnly; Secure; SameSite={same_site}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_all_attributes() {
        let cookie = session_cookie("x-token", "abc.def.ghi", SameSite::None);
        assert_eq!(
            cookie,
            "x-token=abc.def.ghi; Path=/; HttpOnly; Secure; SameSite=None"
        );
    }

    #[test]
    fn same_site_parses_case_insensitively() {
        assert_eq!("Strict".parse::<SameSite>().unwrap(), SameSite::Strict);
        assert_eq!("lax".parse::<SameSite>().unwrap(), SameSite::Lax);
        assert!("sometimes".parse::<SameSite>().is_err());
    }

    #[test]
    fn same_site_deserializes_from_any_case() {
        let policy: SameSite = serde_json::from_str(r#""STRICT""#).unwrap();
        assert_eq!(policy, SameSite::Strict);

        let err = serde_json::from_str::<SameSite>(r#""sometimes""#).unwrap_err();
        assert!(err.to_string().contains("unknown SameSite policy: sometimes"));
    }

    #[test]
    fn cookie_names_follow_token_grammar() {
        for name in ["x-token", "session", "__Host-id", "a.b_c!"] {
            assert!(is_valid_cookie_name(name), "{name}");
        }
        for name in ["", "a; Domain=x", "my token", "a=b", "tab\tname", "quo\"te", "ünï"] {
            assert!(!is_valid_cookie_name(name), "{name:?}");
        }
    }

    #[test]
    fn default_policy_is_none() {
        assert_eq!(SameSite::default(), SameSite::None);
    }
}
