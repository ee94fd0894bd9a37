//! Wire group id → (test kind, group) route table.
//!
//! The original numbering scheme overloaded group ids: the same numeric id
//! meant "run the check" on one group and "confirm a prior command" when a
//! different group's id was borrowed for the readback. The route table
//! makes the act/confirm split explicit while keeping the numeric wire
//! addressing: command routes keep their group's own id, verify routes get
//! dedicated ids.

use jig_core::{Group, GroupId, TestKind};
use std::collections::HashMap;

/// Dedicated wire id for the header verification pass.
pub const VERIFY_HEADER_GID: u8 = 20;

/// Resolves wire group ids to dispatch keys.
#[derive(Debug, Clone)]
pub struct RouteTable {
    map: HashMap<u8, (TestKind, Group)>,
}

impl RouteTable {
    /// Empty table; every id is unroutable until added.
    #[must_use]
    pub fn empty() -> Self {
        RouteTable {
            map: HashMap::new(),
        }
    }

    /// Add or replace a route.
    pub fn add(&mut self, gid: u8, kind: TestKind, group: Group) {
        self.map.insert(gid, (kind, group));
    }

    /// Resolve a wire group id.
    #[must_use]
    pub fn resolve(&self, gid: GroupId) -> Option<(TestKind, Group)> {
        self.map.get(&gid.as_u8()).copied()
    }
}

impl Default for RouteTable {
    /// Identity command routes for all fourteen groups plus the header
    /// verify route.
    fn default() -> Self {
        let mut table = RouteTable::empty();
        for group in Group::ALL {
            table.add(group.as_u8(), TestKind::Command, group);
        }
        table.add(VERIFY_HEADER_GID, TestKind::Verify, Group::Header);
        table
    }
}
