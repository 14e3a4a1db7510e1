use std::collections::HashMap;

use bc_core::{MovementPolicy, NodeColor};
use tracing::{debug, warn};

/// Definition of a potion kind: the movement rule it grants and whether
/// moving spends a unit of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PotionDef {
    /// Unique potion identifier.
    pub potion_id: String,
    /// Human-readable name.
    pub display_name: String,
    /// Hop limit this potion grants.
    pub max_hops: u32,
    /// Node colors this potion allows moving onto.
    pub allowed_colors: Vec<NodeColor>,
    /// Whether a successful proceed spends one unit.
    pub consume_on_move: bool,
}

impl PotionDef {
    /// Create a potion with the given id and hop limit. Consumed on move
    /// by default.
    pub fn new(potion_id: impl Into<String>, max_hops: u32) -> Self {
        Self {
            potion_id: potion_id.into(),
            display_name: String::new(),
            max_hops,
            allowed_colors: Vec::new(),
            consume_on_move: true,
        }
    }

    /// Set the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Add an allowed node color.
    pub fn with_color(mut self, color: NodeColor) -> Self {
        self.allowed_colors.push(color);
        self
    }

    /// Mark the potion as never consumed by movement.
    pub fn persistent(mut self) -> Self {
        self.consume_on_move = false;
        self
    }

    /// The movement policy this potion grants while selected.
    pub fn policy(&self) -> MovementPolicy {
        MovementPolicy {
            max_hops: self.max_hops,
            allowed_colors: self.allowed_colors.clone(),
        }
    }
}

/// Events emitted by the inventory, drained by the flow controller.
#[derive(Debug, Clone, PartialEq)]
pub enum InventoryEvent {
    /// The selected potion changed; carries the policy now in force.
    SelectionChanged {
        /// The newly selected potion id, or `None` when nothing is
        /// selected.
        potion: Option<String>,
        /// The movement policy the selection grants.
        policy: Option<MovementPolicy>,
    },
    /// A potion's stock count changed.
    CountChanged {
        /// The potion whose stock changed.
        potion: String,
        /// The new stock count.
        count: u32,
    },
}

/// Potion stock and selection. The selected potion supplies the movement
/// policy gating level-graph traversal; no selection means nothing is
/// reachable.
#[derive(Debug, Default)]
pub struct PotionInventory {
    potions: Vec<PotionDef>,
    counts: HashMap<String, u32>,
    selected: Option<String>,
    events: Vec<InventoryEvent>,
}

impl PotionInventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a potion kind with zero stock. Duplicate ids keep the
    /// first definition.
    pub fn register(&mut self, def: PotionDef) {
        if self.potion(&def.potion_id).is_some() {
            warn!(potion = %def.potion_id, "duplicate potion id, keeping first");
            return;
        }
        self.counts.insert(def.potion_id.clone(), 0);
        self.potions.push(def);
    }

    /// Look up a potion definition by id.
    pub fn potion(&self, potion_id: &str) -> Option<&PotionDef> {
        self.potions.iter().find(|p| p.potion_id == potion_id)
    }

    /// Current stock of a potion. Unknown ids report zero.
    pub fn count(&self, potion_id: &str) -> u32 {
        self.counts.get(potion_id).copied().unwrap_or(0)
    }

    /// The currently selected potion id, if any.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The movement policy granted by the current selection.
    pub fn selected_policy(&self) -> Option<MovementPolicy> {
        self.selected
            .as_deref()
            .and_then(|id| self.potion(id))
            .map(PotionDef::policy)
    }

    /// Add stock. If nothing is selected, the first pickup selects itself.
    pub fn add(&mut self, potion_id: &str, amount: u32) {
        let Some(count) = self.counts.get_mut(potion_id) else {
            warn!(potion = potion_id, "stock added for unregistered potion, ignored");
            return;
        };
        *count += amount;
        let count = *count;
        self.events.push(InventoryEvent::CountChanged {
            potion: potion_id.to_string(),
            count,
        });
        if self.selected.is_none() && count > 0 {
            self.set_selection(Some(potion_id.to_string()));
        }
    }

    /// Select a potion. Rejected for unknown ids and empty stock.
    pub fn select(&mut self, potion_id: &str) {
        if self.potion(potion_id).is_none() {
            warn!(potion = potion_id, "selection of unregistered potion, ignored");
            return;
        }
        if self.count(potion_id) == 0 {
            debug!(potion = potion_id, "selection with empty stock, ignored");
            return;
        }
        if self.selected.as_deref() == Some(potion_id) {
            return;
        }
        self.set_selection(Some(potion_id.to_string()));
    }

    /// Spend one unit of the selected potion. Returns `false` when nothing
    /// is selected or stock is empty; potions marked persistent succeed
    /// without spending. When the last unit is spent the selection moves
    /// to the first potion with remaining stock, or clears.
    pub fn try_consume(&mut self) -> bool {
        let Some(selected) = self.selected.clone() else {
            debug!("consume requested with no potion selected");
            return false;
        };
        let consumes = self
            .potion(&selected)
            .is_some_and(|def| def.consume_on_move);
        if !consumes {
            return true;
        }

        let Some(count) = self.counts.get_mut(&selected) else {
            return false;
        };
        if *count == 0 {
            debug!(potion = %selected, "consume requested with empty stock");
            return false;
        }
        *count -= 1;
        let count = *count;
        self.events.push(InventoryEvent::CountChanged {
            potion: selected.clone(),
            count,
        });

        if count == 0 {
            let replacement = self
                .potions
                .iter()
                .map(|p| p.potion_id.clone())
                .find(|id| self.count(id) > 0);
            self.set_selection(replacement);
        }
        true
    }

    /// Drain all events emitted since the last drain, in order.
    pub fn drain_events(&mut self) -> Vec<InventoryEvent> {
        std::mem::take(&mut self.events)
    }

    fn set_selection(&mut self, potion: Option<String>) {
        self.selected = potion.clone();
        let policy = self.selected_policy();
        self.events
            .push(InventoryEvent::SelectionChanged { potion, policy });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_potion() -> PotionDef {
        PotionDef::new("step", 1)
            .with_display_name("Step Draught")
            .with_color(NodeColor::Red)
    }

    fn leap_potion() -> PotionDef {
        PotionDef::new("leap", 3).with_color(NodeColor::Green)
    }

    #[test]
    fn first_pickup_selects_itself() {
        let mut inventory = PotionInventory::new();
        inventory.register(step_potion());
        inventory.add("step", 2);

        assert_eq!(inventory.selected(), Some("step"));
        let policy = inventory.selected_policy();
        assert_eq!(policy, Some(MovementPolicy::new(1).with_color(NodeColor::Red)));
        let events = inventory.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            InventoryEvent::SelectionChanged { potion: Some(p), .. } if p == "step"
        )));
    }

    #[test]
    fn consuming_decrements_and_reports() {
        let mut inventory = PotionInventory::new();
        inventory.register(step_potion());
        inventory.add("step", 2);
        inventory.drain_events();

        assert!(inventory.try_consume());
        assert_eq!(inventory.count("step"), 1);
        assert_eq!(
            inventory.drain_events(),
            vec![InventoryEvent::CountChanged {
                potion: "step".into(),
                count: 1,
            }]
        );
    }

    #[test]
    fn consume_with_empty_stock_fails() {
        let mut inventory = PotionInventory::new();
        inventory.register(step_potion());
        assert!(!inventory.try_consume());
    }

    #[test]
    fn persistent_potion_is_not_spent() {
        let mut inventory = PotionInventory::new();
        inventory.register(PotionDef::new("boots", 2).persistent());
        inventory.add("boots", 1);

        assert!(inventory.try_consume());
        assert!(inventory.try_consume());
        assert_eq!(inventory.count("boots"), 1);
    }

    #[test]
    fn depleting_selection_reselects_remaining_stock() {
        let mut inventory = PotionInventory::new();
        inventory.register(step_potion());
        inventory.register(leap_potion());
        inventory.add("step", 1);
        inventory.add("leap", 1);
        inventory.drain_events();

        assert!(inventory.try_consume());
        assert_eq!(inventory.selected(), Some("leap"));
        let events = inventory.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            InventoryEvent::SelectionChanged { potion: Some(p), .. } if p == "leap"
        )));
    }

    #[test]
    fn depleting_the_last_potion_clears_selection() {
        let mut inventory = PotionInventory::new();
        inventory.register(step_potion());
        inventory.add("step", 1);
        inventory.drain_events();

        assert!(inventory.try_consume());
        assert_eq!(inventory.selected(), None);
        assert_eq!(inventory.selected_policy(), None);
        let events = inventory.drain_events();
        assert!(events.contains(&InventoryEvent::SelectionChanged {
            potion: None,
            policy: None,
        }));
    }

    #[test]
    fn selecting_empty_stock_is_rejected() {
        let mut inventory = PotionInventory::new();
        inventory.register(step_potion());
        inventory.register(leap_potion());
        inventory.add("step", 1);
        inventory.drain_events();

        inventory.select("leap");
        assert_eq!(inventory.selected(), Some("step"));
        assert!(inventory.drain_events().is_empty());
    }

    #[test]
    fn duplicate_registration_keeps_first() {
        let mut inventory = PotionInventory::new();
        inventory.register(step_potion());
        inventory.register(PotionDef::new("step", 9));
        assert_eq!(inventory.potion("step").map(|p| p.max_hops), Some(1));
    }
}
