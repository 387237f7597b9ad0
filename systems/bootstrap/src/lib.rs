#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares the Evergreen ensemble.

use evergreen_core::{Command, Event, Formation, GenerationError, Role};
use serde::{Deserialize, Serialize};

/// Requested particle count for every role.
///
/// Counts are signed so malformed configuration reaches the generation
/// boundary and is rejected there.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoleCounts {
    /// Needle count.
    pub needle: i64,
    /// Bauble count.
    pub bauble: i64,
    /// Bell count.
    pub bell: i64,
    /// Gift count.
    pub gift: i64,
    /// Ribbon segment count.
    pub ribbon: i64,
}

impl RoleCounts {
    /// Count requested for `role`.
    #[must_use]
    pub const fn get(&self, role: Role) -> i64 {
        match role {
            Role::Needle => self.needle,
            Role::Bauble => self.bauble,
            Role::Bell => self.bell,
            Role::Gift => self.gift,
            Role::Ribbon => self.ribbon,
        }
    }

    /// Replaces the count requested for `role`.
    pub fn set(&mut self, role: Role, count: i64) {
        let slot = match role {
            Role::Needle => &mut self.needle,
            Role::Bauble => &mut self.bauble,
            Role::Bell => &mut self.bell,
            Role::Gift => &mut self.gift,
            Role::Ribbon => &mut self.ribbon,
        };
        *slot = count;
    }
}

impl Default for RoleCounts {
    fn default() -> Self {
        let count = |role: Role| role.default_count() as i64;
        Self {
            needle: count(Role::Needle),
            bauble: count(Role::Bauble),
            bell: count(Role::Bell),
            gift: count(Role::Gift),
            ribbon: count(Role::Ribbon),
        }
    }
}

/// Produces the commands that bring a fresh world into its starting pose.
#[derive(Debug, Default)]
pub struct Bootstrap {
    counts: RoleCounts,
    formation: Formation,
}

impl Bootstrap {
    /// Creates a bootstrap for the provided sizes and starting formation.
    #[must_use]
    pub fn new(counts: RoleCounts, formation: Formation) -> Self {
        Self { counts, formation }
    }

    /// Emits one population request per role in draw order, followed by the
    /// starting formation.
    pub fn commands(&self, out: &mut Vec<Command>) {
        for role in Role::ALL {
            out.push(Command::PopulateRole {
                role,
                count: self.counts.get(role),
            });
        }
        out.push(Command::SetFormation {
            formation: self.formation,
        });
    }

    /// Collects the population rejections reported while bootstrapping.
    #[must_use]
    pub fn rejections<'a>(&self, events: &'a [Event]) -> Vec<(Role, &'a GenerationError)> {
        events
            .iter()
            .filter_map(|event| match event {
                Event::PopulationRejected { role, reason } => Some((*role, reason)),
                _ => None,
            })
            .collect()
    }
}
