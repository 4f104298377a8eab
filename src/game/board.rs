//! Areas and the board they form.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::game::{Hex, PlayerId};

/// Identifier of an area on the board (1-based).
pub type AreaId = u16;

/// Maximum number of dice an area can hold.
pub const MAX_DICE: u8 = 8;

/// A single ownable territory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Area {
    /// Area identifier.
    pub id: AreaId,
    /// Owning player (0 until ownership is assigned).
    pub owner: PlayerId,
    /// Dice stationed on the area, `1..=MAX_DICE` once the game started.
    pub dice: u8,
    /// Adjacent areas. Symmetric across the board.
    pub neighbors: BTreeSet<AreaId>,
    /// Grid cells forming this area.
    pub hexes: Vec<Hex>,
}

impl Area {
    /// Create an unowned area with no dice.
    #[must_use]
    pub fn new(id: AreaId, hexes: Vec<Hex>) -> Self {
        Self {
            id,
            owner: 0,
            dice: 0,
            neighbors: BTreeSet::new(),
            hexes,
        }
    }

    /// Whether this area holds enough dice to attack.
    #[must_use]
    pub const fn can_attack(&self) -> bool {
        self.dice >= 2
    }

    /// Whether this area can take another die.
    #[must_use]
    pub const fn can_reinforce(&self) -> bool {
        self.dice < MAX_DICE
    }

    /// Whether `other` is adjacent to this area.
    #[must_use]
    pub fn borders(&self, other: AreaId) -> bool {
        self.neighbors.contains(&other)
    }
}

/// The playing field: every area keyed by id.
///
/// Topology (the set of areas and their adjacency) is fixed once the board
/// leaves the generator; only owners and dice change afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    areas: BTreeMap<AreaId, Area>,
}

impl Board {
    /// Build a board from areas.
    #[must_use]
    pub fn from_areas(areas: impl IntoIterator<Item = Area>) -> Self {
        Self {
            areas: areas.into_iter().map(|a| (a.id, a)).collect(),
        }
    }

    /// Number of areas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    /// Whether the board has no areas.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Get an area by id.
    #[must_use]
    pub fn get(&self, id: AreaId) -> Option<&Area> {
        self.areas.get(&id)
    }

    /// Get a mutable area by id.
    #[must_use]
    pub fn get_mut(&mut self, id: AreaId) -> Option<&mut Area> {
        self.areas.get_mut(&id)
    }

    /// Iterate over areas in id order.
    pub fn areas(&self) -> impl Iterator<Item = &Area> {
        self.areas.values()
    }

    /// Iterate mutably over areas in id order.
    pub fn areas_mut(&mut self) -> impl Iterator<Item = &mut Area> {
        self.areas.values_mut()
    }

    /// All area ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<AreaId> {
        self.areas.keys().copied().collect()
    }

    /// Areas owned by a player, in id order.
    pub fn owned_by(&self, player: PlayerId) -> impl Iterator<Item = &Area> {
        self.areas.values().filter(move |a| a.owner == player)
    }

    /// Number of areas owned by a player.
    #[must_use]
    pub fn count_owned(&self, player: PlayerId) -> usize {
        self.owned_by(player).count()
    }

    /// Total dice on the board.
    #[must_use]
    pub fn total_dice(&self) -> u32 {
        self.areas.values().map(|a| u32::from(a.dice)).sum()
    }

    /// Add a symmetric adjacency between two areas.
    ///
    /// Only the generator and tests build adjacency.
    pub(crate) fn connect(&mut self, a: AreaId, b: AreaId) {
        if a == b {
            return;
        }
        if let Some(area) = self.areas.get_mut(&a) {
            area.neighbors.insert(b);
        }
        if let Some(area) = self.areas.get_mut(&b) {
            area.neighbors.insert(a);
        }
    }

    /// Whether the adjacency graph forms a single connected component.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        let Some(&start) = self.areas.keys().next() else {
            return true;
        };

        let mut seen = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(id) = queue.pop_front() {
            let Some(area) = self.areas.get(&id) else {
                continue;
            };
            for &next in &area.neighbors {
                if self.areas.contains_key(&next) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        seen.len() == self.areas.len()
    }

    /// Whether every adjacency is listed on both sides and points to an existing area.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        self.areas.values().all(|area| {
            area.neighbors.iter().all(|n| {
                *n != area.id && self.areas.get(n).is_some_and(|other| other.borders(area.id))
            })
        })
    }
}
