//! Validator bonding status and the normalization shared by every data path.
//!
//! The LCD endpoint and the node binary both report raw staking enums such as
//! `BOND_STATUS_BONDED`. Everything past the source boundary works with the
//! short forms (`BONDED`) wrapped in [`BondStatus`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Prefix carried by the raw staking module enum values.
pub const RAW_PREFIX: &str = "BOND_STATUS_";

const RAW_TOKENS: [(&str, BondStatus); 3] = [
    ("BOND_STATUS_BONDED", BondStatus::Bonded),
    ("BOND_STATUS_UNBONDING", BondStatus::Unbonding),
    ("BOND_STATUS_UNBONDED", BondStatus::Unbonded),
];

/// Participation state of the validator in the active set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum BondStatus {
    Bonded,
    Unbonding,
    Unbonded,
    #[default]
    Unknown,
    /// A prefixed chain value this crate does not recognize (`BOND_STATUS_X` → `X`).
    /// Classified exactly like `Unknown`; kept so reports show what the chain said.
    Other(String),
}

impl BondStatus {
    /// Normalize a raw or already-normalized status string.
    ///
    /// Rules, first match wins:
    /// 1. a known raw token maps to its short form
    /// 2. a short form (or a bare token rule 3 could have produced) passes through
    /// 3. an unrecognized `BOND_STATUS_` value is stripped to its remainder
    /// 4. anything else, including empty input, is `Unknown`
    ///
    /// `normalize(normalize(x).as_str()) == normalize(x)` for every input.
    pub fn normalize(raw: Option<&str>) -> BondStatus {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return BondStatus::Unknown;
        };

        if let Some((_, status)) = RAW_TOKENS.iter().find(|(token, _)| *token == raw) {
            return status.clone();
        }

        if let Some(status) = Self::from_short_form(raw) {
            return status;
        }

        if raw.starts_with(RAW_PREFIX) {
            let remainder = raw.trim_start_matches(RAW_PREFIX);
            return Self::from_short_form(remainder).unwrap_or(BondStatus::Unknown);
        }

        BondStatus::Unknown
    }

    fn from_short_form(token: &str) -> Option<BondStatus> {
        match token {
            "BONDED" => Some(BondStatus::Bonded),
            "UNBONDING" => Some(BondStatus::Unbonding),
            "UNBONDED" => Some(BondStatus::Unbonded),
            "UNKNOWN" => Some(BondStatus::Unknown),
            _ if is_bare_token(token) => Some(BondStatus::Other(token.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BondStatus::Bonded => "BONDED",
            BondStatus::Unbonding => "UNBONDING",
            BondStatus::Unbonded => "UNBONDED",
            BondStatus::Unknown => "UNKNOWN",
            BondStatus::Other(label) => label.as_str(),
        }
    }

    /// True when the status carries no usable information.
    pub fn is_unknown(&self) -> bool {
        matches!(self, BondStatus::Unknown | BondStatus::Other(_))
    }
}

/// Upper-case staking token without the raw prefix, e.g. `UNSPECIFIED`.
fn is_bare_token(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        && !token.starts_with(RAW_PREFIX)
}

impl std::fmt::Display for BondStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for BondStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BondStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(BondStatus::normalize(raw.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_tokens_map_to_short_form() {
        assert_eq!(
            BondStatus::normalize(Some("BOND_STATUS_BONDED")),
            BondStatus::Bonded
        );
        assert_eq!(
            BondStatus::normalize(Some("BOND_STATUS_UNBONDING")),
            BondStatus::Unbonding
        );
        assert_eq!(
            BondStatus::normalize(Some("BOND_STATUS_UNBONDED")),
            BondStatus::Unbonded
        );
        assert_eq!(BondStatus::normalize(Some("BOND_STATUS_BONDED")).as_str(), "BONDED");
    }

    #[test]
    fn test_short_forms_pass_through() {
        assert_eq!(BondStatus::normalize(Some("BONDED")), BondStatus::Bonded);
        assert_eq!(BondStatus::normalize(Some("UNBONDING")), BondStatus::Unbonding);
        assert_eq!(BondStatus::normalize(Some("UNKNOWN")), BondStatus::Unknown);
    }

    #[test]
    fn test_unrecognized_prefixed_value_is_stripped() {
        let status = BondStatus::normalize(Some("BOND_STATUS_WEIRD"));
        assert_eq!(status, BondStatus::Other("WEIRD".to_string()));
        assert_eq!(status.as_str(), "WEIRD");
        assert!(status.is_unknown());

        assert_eq!(
            BondStatus::normalize(Some("BOND_STATUS_UNSPECIFIED")).as_str(),
            "UNSPECIFIED"
        );
    }

    #[test]
    fn test_empty_and_missing_are_unknown() {
        assert_eq!(BondStatus::normalize(None), BondStatus::Unknown);
        assert_eq!(BondStatus::normalize(Some("")), BondStatus::Unknown);
        assert_eq!(BondStatus::normalize(Some("   ")), BondStatus::Unknown);
        assert_eq!(BondStatus::normalize(Some("BOND_STATUS_")), BondStatus::Unknown);
        assert_eq!(BondStatus::normalize(Some("bonded?")), BondStatus::Unknown);
        assert_eq!(BondStatus::normalize(Some("{}")), BondStatus::Unknown);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            None,
            Some(""),
            Some("BOND_STATUS_BONDED"),
            Some("BOND_STATUS_UNBONDING"),
            Some("BOND_STATUS_UNBONDED"),
            Some("BOND_STATUS_UNSPECIFIED"),
            Some("BOND_STATUS_WEIRD"),
            Some("BOND_STATUS_weird"),
            Some("BOND_STATUS_BOND_STATUS_BONDED"),
            Some("BOND_STATUS_"),
            Some("BONDED"),
            Some("UNKNOWN"),
            Some("WEIRD"),
            Some("weird"),
            Some("3"),
            Some(" BOND_STATUS_BONDED "),
        ];

        for input in inputs {
            let once = BondStatus::normalize(input);
            let twice = BondStatus::normalize(Some(once.as_str()));
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_deserialize_normalizes() {
        let status: BondStatus = serde_json::from_str("\"BOND_STATUS_UNBONDING\"").unwrap();
        assert_eq!(status, BondStatus::Unbonding);
        let status: BondStatus = serde_json::from_str("null").unwrap();
        assert_eq!(status, BondStatus::Unknown);
    }
}
