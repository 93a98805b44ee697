//! Shapes shared by the unit tests of this crate.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::coerce::Coercion;
use crate::error::StoreResult;
use crate::field::FieldValue;
use crate::shape::TypeTag;
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OfficeSize {
    Small,
    Large,
}

impl FieldValue for OfficeSize {
    fn type_tag() -> TypeTag {
        TypeTag::Text
    }

    fn to_value(&self) -> Value {
        match self {
            OfficeSize::Small => Value::from("small"),
            OfficeSize::Large => Value::from("large"),
        }
    }

    fn from_value(value: Value, cx: &mut Coercion<'_>) -> StoreResult<Self> {
        let original = value.clone();
        match String::from_value(value, cx)?.as_str() {
            "small" => Ok(OfficeSize::Small),
            "large" => Ok(OfficeSize::Large),
            _ => Err(cx.mismatch(&original, &TypeTag::Text)),
        }
    }
}

crate::shape! {
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Office {
        pub id: i64,
        pub name: String,
        pub size: Option<OfficeSize>,
    }
}

crate::shape! {
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Person {
        pub id: i64,
        pub first_name: Option<String>,
        pub last_name: String,
        pub dob: NaiveDateTime,
        pub office: Office,
    }
}

crate::shape! {
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Department {
        pub id: i64,
        pub name: String,
        pub team_size: Option<i64>,
    }
}

impl Person {
    pub fn sample() -> Self {
        Person {
            id: 100,
            first_name: None,
            last_name: "Smith".to_string(),
            dob: NaiveDate::from_ymd_opt(1980, 5, 17)
                .unwrap()
                .and_time(NaiveTime::MIN),
            office: Office {
                id: 1,
                name: "London".to_string(),
                size: Some(OfficeSize::Large),
            },
        }
    }
}
