//! Translation-unit parse flags
//!
//! Each recognised option owns one bit of `CXTranslationUnit_Flags`.

use core::ffi::c_uint;
use serde::{Deserialize, Serialize};

/// `CXTranslationUnit_Incomplete`
pub const INCOMPLETE: c_uint = 0x02;

/// `CXTranslationUnit_PrecompiledPreamble`
pub const PRECOMPILED_PREAMBLE: c_uint = 0x04;

/// Options accepted by [`TranslationUnit::parse`](crate::TranslationUnit::parse)
///
/// Deserializes from `{ incomplete, precompiledPreamble }`; unknown keys are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParseFlags {
    pub incomplete: bool,
    #[serde(alias = "precompiled_preamble")]
    pub precompiled_preamble: bool,
}

impl ParseFlags {
    pub const fn new() -> Self {
        Self {
            incomplete: false,
            precompiled_preamble: false,
        }
    }

    pub const fn incomplete(mut self, enabled: bool) -> Self {
        self.incomplete = enabled;
        self
    }

    pub const fn precompiled_preamble(mut self, enabled: bool) -> Self {
        self.precompiled_preamble = enabled;
        self
    }

    /// Bitwise OR of the constants for every enabled option
    pub const fn encode(self) -> c_uint {
        let mut bits = 0;
        if self.incomplete {
            bits |= INCOMPLETE;
        }
        if self.precompiled_preamble {
            bits |= PRECOMPILED_PREAMBLE;
        }
        bits
    }
}

impl From<ParseFlags> for c_uint {
    fn from(flags: ParseFlags) -> Self {
        flags.encode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_table() {
        assert_eq!(ParseFlags::new().encode(), 0);
        assert_eq!(ParseFlags::new().incomplete(true).encode(), 2);
        assert_eq!(ParseFlags::new().precompiled_preamble(true).encode(), 4);
        assert_eq!(
            ParseFlags::new().incomplete(true).precompiled_preamble(true).encode(),
            6
        );
    }

    #[test]
    fn test_bits_are_disjoint() {
        assert_eq!(INCOMPLETE & PRECOMPILED_PREAMBLE, 0);
    }

    #[test]
    fn test_deserialize_ignores_unknown_keys() {
        let flags: ParseFlags = serde_json::from_str(
            r#"{"incomplete": true, "precompiledPreamble": true, "skipFunctionBodies": true}"#,
        )
        .unwrap();
        assert_eq!(flags.encode(), 6);

        let empty: ParseFlags = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.encode(), 0);
    }

    #[test]
    fn test_deserialize_snake_case_alias() {
        let flags: ParseFlags = toml::from_str("precompiled_preamble = true").unwrap();
        assert_eq!(flags, ParseFlags::new().precompiled_preamble(true));
    }

    #[test]
    fn test_false_options_contribute_nothing() {
        let flags: ParseFlags =
            serde_json::from_str(r#"{"incomplete": false, "precompiledPreamble": true}"#).unwrap();
        assert_eq!(c_uint::from(flags), 4);
    }
}
