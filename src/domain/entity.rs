use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The six collections the dashboard keeps in sync with the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Tasks,
    Objectives,
    Reminders,
    Meetings,
    Notes,
    Settings,
}

struct KindKeys {
    path: &'static str,
    singular: &'static str,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Tasks,
        EntityKind::Objectives,
        EntityKind::Reminders,
        EntityKind::Meetings,
        EntityKind::Notes,
        EntityKind::Settings,
    ];

    fn keys(self) -> KindKeys {
        match self {
            Self::Tasks => KindKeys {
                path: "tasks",
                singular: "task",
            },
            Self::Objectives => KindKeys {
                path: "objectives",
                singular: "objective",
            },
            Self::Reminders => KindKeys {
                path: "reminders",
                singular: "reminder",
            },
            Self::Meetings => KindKeys {
                path: "meetings",
                singular: "meeting",
            },
            Self::Notes => KindKeys {
                path: "notes",
                singular: "note",
            },
            Self::Settings => KindKeys {
                path: "settings",
                singular: "settings",
            },
        }
    }

    /// Path segment under the API base, also the key of the list envelope.
    pub fn path(self) -> &'static str {
        self.keys().path
    }

    pub fn collection_key(self) -> &'static str {
        self.keys().path
    }

    /// Key holding the single entity in create/update envelopes.
    pub fn singular_key(self) -> &'static str {
        self.keys().singular
    }

    pub fn is_singleton(self) -> bool {
        matches!(self, Self::Settings)
    }

    pub fn as_str(self) -> &'static str {
        self.path()
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record owned by the remote store and mirrored locally.
///
/// `Patch` is the partial shape sent on create/update; `merged` applies it on
/// top of the current value the same way the server would, which is what the
/// optimistic update shows until the server answers.
pub trait Entity:
    Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: EntityKind;
    type Patch: Clone + fmt::Debug + Serialize + Send + Sync + 'static;

    fn id(&self) -> &str;
    fn merged(&self, patch: &Self::Patch) -> Self;

    /// Checks the fields a patch sets.
    fn validate_patch(_patch: &Self::Patch) -> Result<(), String> {
        Ok(())
    }

    /// Checks a patch used as the body of a create; required fields must be set.
    fn validate_new(patch: &Self::Patch) -> Result<(), String> {
        Self::validate_patch(patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singular_keys_come_from_the_lookup_table() {
        let singular = EntityKind::ALL
            .iter()
            .map(|kind| kind.singular_key())
            .collect::<Vec<_>>();
        assert_eq!(
            singular,
            vec!["task", "objective", "reminder", "meeting", "note", "settings"]
        );
    }

    #[test]
    fn only_settings_is_a_singleton() {
        let singletons = EntityKind::ALL
            .into_iter()
            .filter(|kind| kind.is_singleton())
            .collect::<Vec<_>>();
        assert_eq!(singletons, vec![EntityKind::Settings]);
    }

    #[test]
    fn kind_serializes_as_its_path() {
        for kind in EntityKind::ALL {
            let encoded = serde_json::to_value(kind).expect("serialize kind");
            assert_eq!(encoded, serde_json::Value::String(kind.path().to_string()));
        }
    }
}
