use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Tri-state profile completion flag.
///
/// `Unknown` means "not fetched yet" and is distinct from `Incomplete`
/// ("known to still need onboarding"). On the wire and on disk it is
/// `null | false | true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Completion {
    #[default]
    Unknown,
    Incomplete,
    Complete,
}

impl Completion {
    pub fn is_known(self) -> bool {
        !matches!(self, Completion::Unknown)
    }

    pub fn as_option(self) -> Option<bool> {
        match self {
            Completion::Unknown => None,
            Completion::Incomplete => Some(false),
            Completion::Complete => Some(true),
        }
    }
}

impl From<Option<bool>> for Completion {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => Completion::Unknown,
            Some(false) => Completion::Incomplete,
            Some(true) => Completion::Complete,
        }
    }
}

impl Serialize for Completion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Completion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<bool>::deserialize(deserializer).map(Completion::from)
    }
}
