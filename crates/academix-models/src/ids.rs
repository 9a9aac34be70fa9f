//! Strongly-typed ID newtypes.
//!
//! Every table keys its rows by UUID; wrapping them per entity keeps a
//! `CoachId` from being passed where a `ProgramId` is expected.
//!
//! ```ignore
//! fn assign(program: ProgramId, coach: CoachId) { /* ... */ }
//!
//! let coach: CoachId = "6f1c2b6e-8d1a-4b8e-9f3e-1a2b3c4d5e6f".parse()?;
//! ```

use serde::{Deserialize, Serialize};
use sqlx::{
    Database, Decode, Encode, Type,
    postgres::{PgHasArrayType, PgTypeInfo},
};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(transparent)]
        #[schema(value_type = String, format = "uuid")]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl Type<sqlx::Postgres> for $name {
            fn type_info() -> PgTypeInfo {
                <Uuid as Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &PgTypeInfo) -> bool {
                <Uuid as Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'q> Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <Uuid as Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }

        impl<'r> Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: <sqlx::Postgres as Database>::ValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                <Uuid as Decode<'r, sqlx::Postgres>>::decode(value).map(Self)
            }
        }

        impl PgHasArrayType for $name {
            fn array_type_info() -> PgTypeInfo {
                <Uuid as PgHasArrayType>::array_type_info()
            }
        }
    };
}

define_id!(UserId);
define_id!(
    /// A tenant: one sports academy.
    AcademicId
);
define_id!(CountryId);
define_id!(CityId);
define_id!(SportId);
define_id!(AmenityId);
define_id!(LocationId);
define_id!(CoachId);
define_id!(AthleteId);
define_id!(ProgramId);
define_id!(
    /// A priced, dated offering of a program.
    PackageId
);
define_id!(ScheduleId);
define_id!(PromoCodeId);
define_id!(BookingId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_unique() {
        assert_ne!(CoachId::new(), CoachId::new());
    }

    #[test]
    fn test_round_trip_through_uuid() {
        let uuid = Uuid::new_v4();
        let id = ProgramId::from(uuid);
        assert_eq!(id.into_inner(), uuid);
        assert_eq!(Uuid::from(id), uuid);
    }

    #[test]
    fn test_debug_names_the_entity() {
        let id: AcademicId = "12345678-1234-1234-1234-123456789abc".parse().unwrap();
        assert_eq!(
            format!("{:?}", id),
            "AcademicId(12345678-1234-1234-1234-123456789abc)"
        );
        assert_eq!(id.to_string(), "12345678-1234-1234-1234-123456789abc");
    }

    #[test]
    fn test_serde_is_transparent() {
        let id: BookingId =
            serde_json::from_str(r#""12345678-1234-1234-1234-123456789abc""#).unwrap();
        assert_eq!(
            serde_json::to_string(&id).unwrap(),
            r#""12345678-1234-1234-1234-123456789abc""#
        );
    }

    #[test]
    fn test_invalid_id_fails_to_parse() {
        assert!("not-a-uuid".parse::<SportId>().is_err());
    }
}
