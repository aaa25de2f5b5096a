//! Records and request payloads.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::extract::FormFields;

/// Accepts an id as a JSON integer or as its decimal string, so form and
/// query values decode the same way as JSON bodies.
struct IdVisitor;

impl Visitor<'_> for IdVisitor {
    type Value = u64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer id")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
        u64::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
        v.parse()
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                deserializer.deserialize_any(IdVisitor).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

id_type!(
    /// Identifier of a [`Student`].
    StudentId
);
id_type!(
    /// Identifier of a [`Course`].
    CourseId
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub birth_date: NaiveDate,
}

/// A course and the ids of its enrolled students, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub students: Vec<StudentId>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewStudent {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub birth_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct StudentPatch {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

impl From<NewStudent> for StudentPatch {
    fn from(new: NewStudent) -> Self {
        Self {
            name: Some(new.name),
            birth_date: Some(new.birth_date),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewCourse {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub students: Vec<StudentId>,
}

/// Partial course update. `students`, when present, replaces the whole set.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CoursePatch {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub students: Option<Vec<StudentId>>,
}

impl From<NewCourse> for CoursePatch {
    fn from(new: NewCourse) -> Self {
        Self {
            name: Some(new.name),
            students: Some(new.students),
        }
    }
}

impl FormFields for NewStudent {}

impl FormFields for StudentPatch {}

impl FormFields for NewCourse {
    const LIST_FIELDS: &'static [&'static str] = &["students"];
}

impl FormFields for CoursePatch {
    const LIST_FIELDS: &'static [&'static str] = &["students"];
}

/// Exact-match list filters shared by both collections.
#[derive(Debug, Clone, Deserialize)]
pub struct Filter<Id> {
    pub id: Option<Id>,
    pub name: Option<String>,
}

impl<Id> Default for Filter<Id> {
    fn default() -> Self {
        Self {
            id: None,
            name: None,
        }
    }
}

impl<Id: PartialEq> Filter<Id> {
    pub fn matches(&self, id: &Id, name: &str) -> bool {
        self.id.as_ref().is_none_or(|want| want == id)
            && self.name.as_deref().is_none_or(|want| want == name)
    }
}

pub type CourseFilter = Filter<CourseId>;
pub type StudentFilter = Filter<StudentId>;
