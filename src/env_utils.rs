use std::{env, str::FromStr};

use tracing::error;

pub const DEFAULT_PORT: u16 = 3000;

/// Reads a variable from the process environment, treating blank values as unset.
pub fn lookup(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

pub fn parse_or_default<T: FromStr>(name: &str, raw: Option<String>, default: T) -> T {
    let raw = match raw {
        Some(raw) => raw,
        None => return default,
    };

    match raw.trim().parse::<T>() {
        Ok(value) => value,
        _ => {
            error!("Failed to parse {} env var, using default", name);
            default
        }
    }
}

pub fn parse_flag(name: &str, raw: Option<String>, default: bool) -> bool {
    let raw = match raw {
        Some(raw) => raw,
        None => return default,
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => {
            error!("Failed to parse {} env var, using default", name);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_or_default_falls_back_on_garbage() {
        assert_eq!(parse_or_default("PORT", Some("abc".into()), 3000u16), 3000);
        assert_eq!(parse_or_default("PORT", Some(" 8080 ".into()), 3000u16), 8080);
        assert_eq!(parse_or_default("PORT", None, 3000u16), 3000);
    }

    #[test]
    fn parse_flag_accepts_common_spellings() {
        assert!(parse_flag("FIRE_AND_FORGET", Some("TRUE".into()), false));
        assert!(parse_flag("FIRE_AND_FORGET", Some("1".into()), false));
        assert!(!parse_flag("FIRE_AND_FORGET", Some("off".into()), true));
        assert!(!parse_flag("FIRE_AND_FORGET", Some("maybe".into()), false));
        assert!(parse_flag("FIRE_AND_FORGET", None, true));
    }
}
