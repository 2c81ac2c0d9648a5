//! Module for working with object ids.
//!
//! An object id is 12 bytes: a big-endian timestamp in seconds since the unix epoch (4 bytes),
//! a value that is random per process (5 bytes) and a big-endian counter (3 bytes).
//! Its textual form is 24 lower-case hex characters.
//!
//! See <https://www.mongodb.com/docs/manual/reference/method/ObjectId/>

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{Error, Unexpected},
};
use std::{
    fmt::{Debug, Display, Formatter},
    str::FromStr,
    sync::atomic::{AtomicU32, Ordering},
};
use thiserror::Error;
use time::OffsetDateTime;

pub const OBJECT_ID_LEN: usize = 12;
pub const OBJECT_ID_HEX_LEN: usize = OBJECT_ID_LEN * 2;

pub const TIMESTAMP_OFFSET: usize = 0;
pub const TIMESTAMP_LENGTH: usize = 4;

pub const PROCESS_UNIQUE_OFFSET: usize = 4;
pub const PROCESS_UNIQUE_LENGTH: usize = 5;

pub const COUNTER_OFFSET: usize = 9;
pub const COUNTER_LENGTH: usize = 3;
pub const COUNTER_MAX: u32 = (1 << (COUNTER_LENGTH * 8)) - 1;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Error)]
pub enum ObjectIdParseError {
    #[error("Expected 24 hex characters, got {0}.")]
    InvalidLength(usize),
    #[error("Object id contained a character that is not hex.")]
    InvalidCharacter,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Error)]
pub enum ObjectIdTimestampFromDateTimeError {
    #[error("Specified time was before the unix epoch.")]
    TimeBeforeEpoch,
    #[error("Resulting timestamp does not fit into 32 bits.")]
    TimestampTooLarge,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct ObjectIdTimestamp(u32);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct ProcessUnique([u8; PROCESS_UNIQUE_LENGTH]);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct ObjectIdCounter(u32);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Default, Hash)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectIdTimestamp {
    #[must_use]
    pub fn new(seconds: u32) -> Self {
        Self(seconds)
    }

    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn from_time_unchecked(value: OffsetDateTime) -> Self {
        Self::try_from(value).expect("Cannot create timestamp.")
    }
}

impl TryFrom<OffsetDateTime> for ObjectIdTimestamp {
    type Error = ObjectIdTimestampFromDateTimeError;

    fn try_from(value: OffsetDateTime) -> Result<Self, Self::Error> {
        let seconds = value.unix_timestamp();
        if seconds < 0 {
            return Err(Self::Error::TimeBeforeEpoch);
        }
        u32::try_from(seconds)
            .map(Self)
            .map_err(|_| Self::Error::TimestampTooLarge)
    }
}

impl From<ObjectIdTimestamp> for OffsetDateTime {
    fn from(value: ObjectIdTimestamp) -> Self {
        OffsetDateTime::from_unix_timestamp(value.0.into()).expect("Invalid timestamp value")
    }
}

impl ProcessUnique {
    #[must_use]
    pub fn new(bytes: [u8; PROCESS_UNIQUE_LENGTH]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn random() -> Self {
        Self(rand::random())
    }

    #[must_use]
    pub fn get(self) -> [u8; PROCESS_UNIQUE_LENGTH] {
        self.0
    }
}

impl ObjectIdCounter {
    #[must_use]
    pub fn new(counter: u32) -> Option<Self> {
        (counter <= COUNTER_MAX).then_some(Self(counter))
    }

    #[must_use]
    pub fn new_unchecked(counter: u32) -> Self {
        Self::new(counter).expect("ObjectIdCounter out of range.")
    }

    /// Keeps the lower 24 bits, so any `u32` wraps into range.
    #[must_use]
    pub fn wrapping(counter: u32) -> Self {
        Self(counter & COUNTER_MAX)
    }

    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self::wrapping(self.0 + 1)
    }

    pub fn increment(&mut self) {
        *self = self.next();
    }
}

impl ObjectId {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn bytes(self) -> [u8; OBJECT_ID_LEN] {
        self.0
    }

    #[must_use]
    pub fn from_parts(
        timestamp: ObjectIdTimestamp,
        process_unique: ProcessUnique,
        counter: ObjectIdCounter,
    ) -> Self {
        let mut bytes = [0; OBJECT_ID_LEN];
        bytes[TIMESTAMP_OFFSET..PROCESS_UNIQUE_OFFSET].copy_from_slice(&timestamp.0.to_be_bytes());
        bytes[PROCESS_UNIQUE_OFFSET..COUNTER_OFFSET].copy_from_slice(&process_unique.0);
        // Only the lower three bytes of the counter are stored.
        bytes[COUNTER_OFFSET..].copy_from_slice(&counter.0.to_be_bytes()[1..]);

        Self(bytes)
    }

    #[must_use]
    pub fn timestamp(self) -> ObjectIdTimestamp {
        let mut seconds = [0; TIMESTAMP_LENGTH];
        seconds.copy_from_slice(&self.0[TIMESTAMP_OFFSET..PROCESS_UNIQUE_OFFSET]);
        ObjectIdTimestamp(u32::from_be_bytes(seconds))
    }

    #[must_use]
    pub fn process_unique(self) -> ProcessUnique {
        let mut bytes = [0; PROCESS_UNIQUE_LENGTH];
        bytes.copy_from_slice(&self.0[PROCESS_UNIQUE_OFFSET..COUNTER_OFFSET]);
        ProcessUnique(bytes)
    }

    #[must_use]
    pub fn counter(self) -> ObjectIdCounter {
        let mut counter = [0; 4];
        counter[1..].copy_from_slice(&self.0[COUNTER_OFFSET..]);
        ObjectIdCounter(u32::from_be_bytes(counter))
    }

    #[must_use]
    pub fn into_parts(self) -> (ObjectIdTimestamp, ProcessUnique, ObjectIdCounter) {
        (self.timestamp(), self.process_unique(), self.counter())
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl Debug for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ObjectId").field(&hex::encode(self.0)).finish()
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != OBJECT_ID_HEX_LEN {
            return Err(Self::Err::InvalidLength(s.len()));
        }

        let mut bytes = [0; OBJECT_ID_LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| Self::Err::InvalidCharacter)?;

        Ok(Self(bytes))
    }
}

impl From<[u8; OBJECT_ID_LEN]> for ObjectId {
    fn from(value: [u8; OBJECT_ID_LEN]) -> Self {
        Self(value)
    }
}

impl From<ObjectId> for [u8; OBJECT_ID_LEN] {
    fn from(value: ObjectId) -> Self {
        value.0
    }
}

impl Serialize for ObjectId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        inner
            .parse()
            .map_err(|_| Error::invalid_value(Unexpected::Str(&inner), &"ObjectId"))
    }
}

/// Hands out object ids for one process.
///
/// The counter is atomic so a shared generator does not need a lock.
#[derive(Debug)]
pub struct ObjectIdGenerator {
    process_unique: ProcessUnique,
    next_counter: AtomicU32,
}

impl ObjectIdGenerator {
    #[must_use]
    pub fn new(process_unique: ProcessUnique, first_counter: ObjectIdCounter) -> Self {
        Self {
            process_unique,
            next_counter: AtomicU32::new(first_counter.get()),
        }
    }

    /// A generator with a random process value and a random starting counter.
    #[must_use]
    pub fn random() -> Self {
        Self::new(
            ProcessUnique::random(),
            ObjectIdCounter::wrapping(rand::random()),
        )
    }

    pub fn generate_at(&self, time: OffsetDateTime) -> ObjectId {
        // 2^32 is a multiple of 2^24, so wrapping the atomic keeps the sequence consistent.
        let counter = ObjectIdCounter::wrapping(self.next_counter.fetch_add(1, Ordering::Relaxed));

        ObjectId::from_parts(
            ObjectIdTimestamp::from_time_unchecked(time),
            self.process_unique,
            counter,
        )
    }
}

impl Default for ObjectIdGenerator {
    fn default() -> Self {
        Self::random()
    }
}
