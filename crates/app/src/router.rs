//! Pin router: which device owns which pin, and who receives instructions.
//!
//! Every running pin-bound device holds exactly one claim. Sensor devices
//! claim their pin for edge delivery; actuator devices claim it for writes
//! and are additionally routed instructions by device id.

use std::collections::{BTreeMap, HashSet};

use pinhub_domain::error::ConflictError;
use pinhub_domain::id::DeviceId;
use pinhub_domain::pin::Pin;

/// How the owning device uses a claimed pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Input pin; the platform reports edges to the owner.
    Edges,
    /// Output pin; the owner drives it in response to instructions.
    Writes,
}

#[derive(Debug, Clone)]
struct Claim {
    owner: DeviceId,
    delivery: Delivery,
}

/// Routing table from pins (and device ids) to running devices.
#[derive(Debug, Default)]
pub struct PinRouter {
    pins: BTreeMap<Pin, Claim>,
    instructions: HashSet<DeviceId>,
}

impl PinRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that `pin` is free or already held by `device_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::PinClaimed`] when another device holds it.
    pub fn check_available(&self, pin: Pin, device_id: &DeviceId) -> Result<(), ConflictError> {
        match self.pins.get(&pin) {
            Some(claim) if &claim.owner != device_id => Err(ConflictError::PinClaimed {
                pin,
                owner: claim.owner.clone(),
            }),
            _ => Ok(()),
        }
    }

    /// Claim `pin` for `device_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::PinClaimed`] when another device holds it;
    /// the existing claim is left in place.
    pub fn claim(
        &mut self,
        pin: Pin,
        device_id: &DeviceId,
        delivery: Delivery,
    ) -> Result<(), ConflictError> {
        self.check_available(pin, device_id)?;
        self.pins.insert(
            pin,
            Claim {
                owner: device_id.clone(),
                delivery,
            },
        );
        Ok(())
    }

    /// Release `pin` if `device_id` holds it. Returns whether a claim was dropped.
    pub fn release(&mut self, pin: Pin, device_id: &DeviceId) -> bool {
        match self.pins.get(&pin) {
            Some(claim) if &claim.owner == device_id => {
                self.pins.remove(&pin);
                true
            }
            _ => false,
        }
    }

    /// Device currently holding `pin`, whatever it uses it for.
    #[must_use]
    pub fn owner(&self, pin: Pin) -> Option<&DeviceId> {
        self.pins.get(&pin).map(|claim| &claim.owner)
    }

    /// Device subscribed to edges of `pin`.
    #[must_use]
    pub fn edge_subscriber(&self, pin: Pin) -> Option<&DeviceId> {
        self.pins
            .get(&pin)
            .filter(|claim| claim.delivery == Delivery::Edges)
            .map(|claim| &claim.owner)
    }

    pub fn route_instructions(&mut self, device_id: &DeviceId) {
        self.instructions.insert(device_id.clone());
    }

    pub fn unroute_instructions(&mut self, device_id: &DeviceId) {
        self.instructions.remove(device_id);
    }

    #[must_use]
    pub fn accepts_instructions(&self, device_id: &DeviceId) -> bool {
        self.instructions.contains(device_id)
    }

    /// Every claimed pin, ascending.
    pub fn claimed_pins(&self) -> impl Iterator<Item = Pin> + '_ {
        self.pins.keys().copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pins.is_empty() && self.instructions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> DeviceId {
        DeviceId::from(s)
    }

    #[test]
    fn should_route_edges_to_claiming_sensor() {
        let mut router = PinRouter::new();
        router.claim(Pin::new(4), &id("a"), Delivery::Edges).unwrap();
        assert_eq!(router.edge_subscriber(Pin::new(4)), Some(&id("a")));
        assert_eq!(router.edge_subscriber(Pin::new(7)), None);
    }

    #[test]
    fn should_reject_claim_on_pin_held_by_other_device() {
        let mut router = PinRouter::new();
        router.claim(Pin::new(4), &id("a"), Delivery::Edges).unwrap();

        let err = router
            .claim(Pin::new(4), &id("b"), Delivery::Writes)
            .unwrap_err();
        assert_eq!(
            err,
            ConflictError::PinClaimed {
                pin: Pin::new(4),
                owner: id("a"),
            }
        );
        assert_eq!(router.owner(Pin::new(4)), Some(&id("a")));
    }

    #[test]
    fn should_allow_owner_to_reclaim_its_pin() {
        let mut router = PinRouter::new();
        router.claim(Pin::new(4), &id("a"), Delivery::Edges).unwrap();
        assert!(router.claim(Pin::new(4), &id("a"), Delivery::Edges).is_ok());
    }

    #[test]
    fn should_not_deliver_edges_for_output_pins() {
        let mut router = PinRouter::new();
        router.claim(Pin::new(17), &id("fan"), Delivery::Writes).unwrap();
        assert_eq!(router.edge_subscriber(Pin::new(17)), None);
        assert_eq!(router.owner(Pin::new(17)), Some(&id("fan")));
    }

    #[test]
    fn should_ignore_release_from_non_owner() {
        let mut router = PinRouter::new();
        router.claim(Pin::new(4), &id("a"), Delivery::Edges).unwrap();
        assert!(!router.release(Pin::new(4), &id("b")));
        assert!(router.release(Pin::new(4), &id("a")));
        assert!(router.owner(Pin::new(4)).is_none());
    }

    #[test]
    fn should_track_instruction_routes_by_device_id() {
        let mut router = PinRouter::new();
        router.route_instructions(&id("fan"));
        assert!(router.accepts_instructions(&id("fan")));
        router.unroute_instructions(&id("fan"));
        assert!(!router.accepts_instructions(&id("fan")));
        assert!(router.is_empty());
    }

    #[test]
    fn should_list_claimed_pins_in_order() {
        let mut router = PinRouter::new();
        router.claim(Pin::new(9), &id("a"), Delivery::Edges).unwrap();
        router.claim(Pin::new(2), &id("b"), Delivery::Writes).unwrap();
        let pins: Vec<Pin> = router.claimed_pins().collect();
        assert_eq!(pins, vec![Pin::new(2), Pin::new(9)]);
    }
}
