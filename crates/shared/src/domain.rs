use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} option: {value:?}")]
pub struct UnknownOption {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! label_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every option in display order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = UnknownOption;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|option| option.label() == value)
                    .ok_or_else(|| UnknownOption {
                        kind: $kind,
                        value: value.to_string(),
                    })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.label())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

label_enum!(District, "district", {
    Chiyoda => "千代田区",
    Chuo => "中央区",
    Minato => "港区",
    Shinjuku => "新宿区",
    Bunkyo => "文京区",
    Taito => "台東区",
    Sumida => "墨田区",
    Koto => "江東区",
    Shinagawa => "品川区",
    Meguro => "目黒区",
    Ota => "大田区",
    Setagaya => "世田谷区",
    Shibuya => "渋谷区",
    Nakano => "中野区",
    Suginami => "杉並区",
    Toshima => "豊島区",
    Kita => "北区",
    Arakawa => "荒川区",
    Itabashi => "板橋区",
    Nerima => "練馬区",
    Adachi => "足立区",
    Katsushika => "葛飾区",
    Edogawa => "江戸川区",
});

label_enum!(RamenType, "ramen type", {
    Shoyu => "醤油",
    Shio => "塩",
    Miso => "味噌",
    Tsukemen => "つけ麺",
    Jiro => "二郎系",
    Iekei => "家系",
    Aburasoba => "油そば",
    ToriPaitan => "鶏白湯",
});

/// Values offered by the minimum price control, in yen.
pub const MIN_PRICE_OPTIONS: [u32; 8] = [500, 700, 900, 1100, 1300, 1500, 1700, 1900];

/// Values offered by the maximum price control, in yen.
pub const MAX_PRICE_OPTIONS: [u32; 7] = [800, 1000, 1200, 1400, 1600, 1800, 2000];

pub const DEFAULT_MIN_PRICE: u32 = 500;
pub const DEFAULT_MAX_PRICE: u32 = 2000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumerations_have_fixed_sizes() {
        assert_eq!(District::ALL.len(), 23);
        assert_eq!(RamenType::ALL.len(), 8);
    }

    #[test]
    fn labels_parse_back_to_variants() {
        assert_eq!("渋谷区".parse::<District>(), Ok(District::Shibuya));
        assert_eq!("鶏白湯".parse::<RamenType>(), Ok(RamenType::ToriPaitan));
    }

    #[test]
    fn free_text_is_rejected() {
        let err = "渋谷".parse::<District>().expect_err("not a ward label");
        assert_eq!(err.kind, "district");
        assert!("tonkotsu".parse::<RamenType>().is_err());
    }

    #[test]
    fn serializes_as_label() {
        let json = serde_json::to_string(&[RamenType::Miso, RamenType::Iekei]).expect("json");
        assert_eq!(json, r#"["味噌","家系"]"#);
        let back: Vec<District> = serde_json::from_str(r#"["港区"]"#).expect("decode");
        assert_eq!(back, vec![District::Minato]);
        assert!(serde_json::from_str::<District>(r#""Tokyo""#).is_err());
    }

    #[test]
    fn price_defaults_sit_in_their_domains() {
        assert!(MIN_PRICE_OPTIONS.contains(&DEFAULT_MIN_PRICE));
        assert!(MAX_PRICE_OPTIONS.contains(&DEFAULT_MAX_PRICE));
    }
}
