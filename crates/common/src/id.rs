//! Opaque identifiers for sections and elements, and the generators that mint them.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

string_id!(
    /// Identifier of a section, unique within its template.
    SectionId
);

string_id!(
    /// Identifier of an element, unique within its template.
    ElementId
);

/// Source of fresh ids. Injected into the editor so tests can be deterministic.
pub trait IdGenerator {
    /// Produce a new id string starting with `prefix`.
    fn next_id(&mut self, prefix: &str) -> String;

    fn section_id(&mut self) -> SectionId {
        SectionId(self.next_id("sec"))
    }

    fn element_id(&mut self) -> ElementId {
        ElementId(self.next_id("el"))
    }
}

/// Random alphanumeric ids (`el_3kq0ZtW1pLx9`).
#[derive(Debug, Default)]
pub struct RandomIds;

const RANDOM_ID_LEN: usize = 12;

impl IdGenerator for RandomIds {
    fn next_id(&mut self, prefix: &str) -> String {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..RANDOM_ID_LEN)
            .map(|_| rng.sample(rand::distributions::Alphanumeric) as char)
            .collect();
        format!("{prefix}_{suffix}")
    }
}

/// Monotonic ids (`sec_1`, `el_2`, ...). Deterministic, so snapshots compare equal across runs.
#[derive(Debug, Default)]
pub struct SequentialIds {
    counter: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start numbering after `counter`.
    pub fn starting_at(counter: u64) -> Self {
        Self { counter }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self, prefix: &str) -> String {
        self.counter += 1;
        format!("{prefix}_{}", self.counter)
    }
}

/// Fresh ids tried before falling back to suffixing.
const MAX_ID_ATTEMPTS: usize = 16;

/// Draw ids from `next` until one is not `taken`. A generator that keeps
/// repeating itself gets numeric suffixes instead of looping forever.
pub fn unique_id(mut next: impl FnMut() -> String, taken: impl Fn(&str) -> bool) -> String {
    let mut candidate = next();
    for _ in 0..MAX_ID_ATTEMPTS {
        if !taken(&candidate) {
            return candidate;
        }
        candidate = next();
    }
    let mut n = 1u64;
    loop {
        let suffixed = format!("{candidate}-{n}");
        if !taken(&suffixed) {
            return suffixed;
        }
        n += 1;
    }
}
