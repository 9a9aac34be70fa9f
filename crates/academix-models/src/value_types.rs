//! Closed sets of values stored as `TEXT` columns, and validators for
//! free-form contact fields.
//!
//! Each enum serializes to the same snake_case string it is stored as, so
//! `ProgramType::SemiPrivate` is `"semi_private"` on the wire and in Postgres.

use serde::{Deserialize, Serialize};
use sqlx::{Database, Decode, Encode, Type, postgres::PgTypeInfo};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use validator::ValidationError;

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!(
                        "invalid {} '{}'",
                        stringify!($name),
                        other
                    )),
                }
            }
        }

        impl Type<sqlx::Postgres> for $name {
            fn type_info() -> PgTypeInfo {
                <String as Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &PgTypeInfo) -> bool {
                <String as Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'q> Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <&str as Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }

        impl<'r> Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: <sqlx::Postgres as Database>::ValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let text = <&str as Decode<'r, sqlx::Postgres>>::decode(value)?;
                text.parse().map_err(Into::into)
            }
        }
    };
}

text_enum!(
    /// What a user may touch: every table, or one academy's data.
    Role {
        SystemAdmin => "system_admin",
        AcademicAdmin => "academic_admin",
    }
);

text_enum!(
    /// Review state of an academy registration.
    AcademicStatus {
        Pending => "pending",
        Accepted => "accepted",
        Rejected => "rejected",
    }
);

text_enum!(Gender {
    Male => "male",
    Female => "female",
});

text_enum!(
    /// Who a program is open to.
    ProgramGender {
        Male => "male",
        Female => "female",
        Mix => "mix",
    }
);

text_enum!(
    /// `Fellow` athletes are registered through a primary athlete (siblings, friends).
    AthleteType {
        Primary => "primary",
        Fellow => "fellow",
    }
);

text_enum!(ProgramType {
    Team => "team",
    Private => "private",
    SemiPrivate => "semi_private",
    Assessment => "assessment",
});

text_enum!(Weekday {
    Sun => "sun",
    Mon => "mon",
    Tue => "tue",
    Wed => "wed",
    Thu => "thu",
    Fri => "fri",
    Sat => "sat",
});

text_enum!(DiscountType {
    Fixed => "fixed",
    Percentage => "percentage",
});

text_enum!(BookingStatus {
    Pending => "pending",
    Success => "success",
    Rejected => "rejected",
    Cancelled => "cancelled",
});

impl Weekday {
    /// Position in the week, Sunday first.
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_chrono(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Sun => Weekday::Sun,
            chrono::Weekday::Mon => Weekday::Mon,
            chrono::Weekday::Tue => Weekday::Tue,
            chrono::Weekday::Wed => Weekday::Wed,
            chrono::Weekday::Thu => Weekday::Thu,
            chrono::Weekday::Fri => Weekday::Fri,
            chrono::Weekday::Sat => Weekday::Sat,
        }
    }
}

const PHONE_MIN_DIGITS: usize = 7;
const PHONE_MAX_DIGITS: usize = 15;

/// Accepts digits with optional `+` country prefix, spaces, dashes and
/// parentheses; 7 to 15 digits (E.164).
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let invalid = |message: &'static str| {
        Err(ValidationError::new("phone").with_message(Cow::Borrowed(message)))
    };

    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' '));
    if !allowed || phone.chars().skip(1).any(|c| c == '+') {
        return invalid("Phone number contains invalid characters");
    }

    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if !(PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits) {
        return invalid("Phone number must have between 7 and 15 digits");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_text_round_trip() {
        for status in BookingStatus::ALL {
            assert_eq!(status.as_str().parse::<BookingStatus>().unwrap(), *status);
        }
        assert_eq!(ProgramType::SemiPrivate.as_str(), "semi_private");
    }

    #[test]
    fn test_enum_serde_matches_column_text() {
        assert_eq!(
            serde_json::to_string(&Role::AcademicAdmin).unwrap(),
            r#""academic_admin""#
        );
        let day: Weekday = serde_json::from_str(r#""thu""#).unwrap();
        assert_eq!(day, Weekday::Thu);
    }

    #[test]
    fn test_unknown_variant_is_rejected() {
        let err = "coach".parse::<Role>().unwrap_err();
        assert!(err.contains("Role"));
        assert!(serde_json::from_str::<Gender>(r#""other""#).is_err());
    }

    #[test]
    fn test_weekday_from_chrono() {
        assert_eq!(Weekday::from_chrono(chrono::Weekday::Sun), Weekday::Sun);
        assert_eq!(Weekday::from_chrono(chrono::Weekday::Sat), Weekday::Sat);
    }

    #[test]
    fn test_valid_phones() {
        for phone in ["+966 55 123 4567", "(555) 123-4567", "0501234567"] {
            assert!(validate_phone(phone).is_ok(), "{phone}");
        }
    }

    #[test]
    fn test_invalid_phones() {
        for phone in ["", "12345", "+1 555 abc 4567", "555+1234567", "1234567890123456"] {
            assert!(validate_phone(phone).is_err(), "{phone}");
        }
    }
}
