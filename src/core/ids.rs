//! Strongly-typed surrogate keys.
//!
//! Rows use `BIGINT` autoincrement keys. At the JSON boundary the keys travel as decimal strings
//! so clients with 53-bit number types do not lose precision.

use crate::errors::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

macro_rules! impl_id_newtype {
    ($t:ident, $name:literal) => {
        #[doc = concat!("Identifier of a ", $name, " row.")]
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $t(i64);

        impl $t {
            /// Wraps a raw database key.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw database key.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = Error;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s.trim().parse::<i64>() {
                    Ok(raw) if raw > 0 => Ok(Self(raw)),
                    _ => Err(Error::InvalidId {
                        value: format!("{}: {s:?}", $name),
                    }),
                }
            }
        }

        impl Serialize for $t {
            fn serialize<S: Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                serializer.collect_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $t {
            fn deserialize<D: Deserializer<'de>>(
                deserializer: D,
            ) -> std::result::Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

impl_id_newtype!(CustomerId, "customer");
impl_id_newtype!(EstimateId, "estimate");
impl_id_newtype!(InvoiceId, "invoice");
impl_id_newtype!(FlowerId, "flower");
impl_id_newtype!(FlowerBillingTargetId, "flower billing target");
impl_id_newtype!(ProductItemId, "product item");
impl_id_newtype!(ProductVariantId, "product variant");
impl_id_newtype!(UserId, "user");
impl_id_newtype!(CityId, "city");
impl_id_newtype!(TownId, "town");
