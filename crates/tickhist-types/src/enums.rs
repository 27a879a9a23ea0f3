//! Closed enumerations used by the market depth extraction condition.
//!
//! Every enumeration travels as its canonical name, never as an ordinal. The
//! name table for each type lives next to its variants, so encode ([`as_str`])
//! and decode ([`FromStr`]) are checked against the same list.
//!
//! [`as_str`]: TickHistorySort::as_str

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

use crate::ModelError;

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $wire:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $name {
            /// Name of the enumeration as the service knows it.
            pub const KIND: &'static str = stringify!($name);

            /// Returns the canonical wire name.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }

            /// Returns every member of the closed set, in declaration order.
            #[must_use]
            pub const fn all() -> &'static [Self] {
                &[$(Self::$variant,)+]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err(ModelError::UnknownEnumValue {
                        kind: Self::KIND,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let name = String::deserialize(deserializer)?;
                name.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

wire_enum! {
    /// Market depth representation returned by the extraction.
    MarketDepthView {
        /// Raw market-by-price messages.
        #[default]
        RawMarketByPrice => "RawMarketByPrice",
        /// Raw market-by-order messages.
        RawMarketByOrder => "RawMarketByOrder",
        /// Raw market maker messages.
        RawMarketMaker => "RawMarketMaker",
        /// Legacy level 2 view.
        LegacyLevel2 => "LegacyLevel2",
        /// Normalized level 2 view.
        NormalizedLl2 => "NormalizedLL2",
    }
}

wire_enum! {
    /// Row ordering of the extracted file.
    TickHistorySort {
        /// Grouped by instrument.
        #[default]
        SingleByRic => "SingleByRic",
        /// Merged by timestamp across instruments.
        SingleByTimestamp => "SingleByTimestamp",
    }
}

wire_enum! {
    /// Timezone in which message timestamps are expressed.
    TimestampZone {
        /// Local exchange time.
        #[default]
        LocalExchangeTime => "LocalExchangeTime",
        /// GMT / UTC.
        GmtUtc => "GmtUtc",
    }
}

wire_enum! {
    /// How the condition's date window is interpreted.
    ReportDateRangeType {
        /// No date filtering.
        #[default]
        NoRange => "NoRange",
        /// Initial load.
        Init => "Init",
        /// Explicit `QueryStartDate` / `QueryEndDate` window.
        Range => "Range",
        /// Changes since the last extraction.
        Delta => "Delta",
        /// Last available data.
        Last => "Last",
    }
}

wire_enum! {
    /// Preview behaviour of the extraction.
    PreviewMode {
        /// Full extraction.
        #[default]
        None => "None",
        /// Preview content only.
        Content => "Content",
        /// Preview instruments only.
        Instrument => "Instrument",
    }
}

wire_enum! {
    /// Whether instruments are resolved by RIC or by entity.
    ExtractByMode {
        /// By RIC symbol.
        #[default]
        Ric => "Ric",
        /// By entity.
        Entity => "Entity",
    }
}
