//! Container state: a bounded quantity of one compound inside one vessel.
//!
//! Solid and liquid contents are tracked as an absolute mass
//! ([`MassContainer`]); gas and plasma contents as a percentage of the vessel
//! capacity ([`PercentageContainer`]). The two are distinct types so the
//! wrong accessor cannot be called on a concrete container; the
//! [`ContainerState`] enum joins them and fails loudly when asked for the
//! quantity of the other mode.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use super::compound::Compound;

/// How a container expresses its quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainmentMode {
    Mass,
    Percentage,
}

impl fmt::Display for ContainmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContainmentMode::Mass => "mass",
            ContainmentMode::Percentage => "percentage",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalState {
    Solid,
    Liquid,
    Gas,
    Plasma,
}

impl PhysicalState {
    pub fn containment_mode(&self) -> ContainmentMode {
        match self {
            PhysicalState::Solid | PhysicalState::Liquid => ContainmentMode::Mass,
            PhysicalState::Gas | PhysicalState::Plasma => ContainmentMode::Percentage,
        }
    }
}

impl fmt::Display for PhysicalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PhysicalState::Solid => "solid",
            PhysicalState::Liquid => "liquid",
            PhysicalState::Gas => "gas",
            PhysicalState::Plasma => "plasma",
        })
    }
}

/// Vessel class. Each class holds a fixed set of phases and therefore a
/// single containment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerType {
    Flask,
    Beaker,
    Tank,
    Sack,
    Cylinder,
    Canister,
}

impl ContainerType {
    pub fn containment_mode(&self) -> ContainmentMode {
        match self {
            ContainerType::Flask
            | ContainerType::Beaker
            | ContainerType::Tank
            | ContainerType::Sack => ContainmentMode::Mass,
            ContainerType::Cylinder | ContainerType::Canister => ContainmentMode::Percentage,
        }
    }

    pub fn accepts(&self, state: PhysicalState) -> bool {
        use PhysicalState::*;
        match self {
            ContainerType::Flask | ContainerType::Beaker => matches!(state, Solid | Liquid),
            ContainerType::Tank => state == Liquid,
            ContainerType::Sack => state == Solid,
            ContainerType::Cylinder => state == Gas,
            ContainerType::Canister => matches!(state, Gas | Plasma),
        }
    }
}

impl fmt::Display for ContainerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContainerType::Flask => "flask",
            ContainerType::Beaker => "beaker",
            ContainerType::Tank => "tank",
            ContainerType::Sack => "sack",
            ContainerType::Cylinder => "cylinder",
            ContainerType::Canister => "canister",
        })
    }
}

/// Seal integrity of a vessel.
///
/// `Sealed` vessels neither take nor release contents, `Unsealed` vessels do
/// both, and `Breached` vessels can only lose contents. A breach is permanent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SealStatus {
    Sealed,
    Unsealed,
    Breached,
}

impl SealStatus {
    pub fn allows_addition(&self) -> bool {
        matches!(self, SealStatus::Unsealed)
    }

    pub fn allows_removal(&self) -> bool {
        matches!(self, SealStatus::Unsealed | SealStatus::Breached)
    }
}

impl fmt::Display for SealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SealStatus::Sealed => "sealed",
            SealStatus::Unsealed => "unsealed",
            SealStatus::Breached => "breached",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContainerError {
    #[error("container capacity must be a positive finite number, got {0}")]
    InvalidCapacity(f64),

    #[error("quantity change must be a non-negative finite number, got {0}")]
    InvalidAmount(f64),

    #[error("{mode} {attempted} is outside the allowed range [0, {max}]")]
    OutOfRange {
        mode: ContainmentMode,
        attempted: f64,
        max: f64,
    },

    #[error("cannot read {requested} from a {mode}-mode container")]
    UnsupportedOperation {
        requested: ContainmentMode,
        mode: ContainmentMode,
    },

    #[error("cannot {operation} contents of a {seal} container")]
    SealViolation {
        seal: SealStatus,
        operation: &'static str,
    },

    #[error("a {container_type} cannot hold {physical_state} contents")]
    IncompatibleVessel {
        container_type: ContainerType,
        physical_state: PhysicalState,
    },

    #[error("a breached container cannot change its seal")]
    Breached,
}

/// Attributes shared by both containment modes.
#[derive(Debug, Clone, PartialEq)]
struct Vessel {
    compound: Arc<Compound>,
    capacity: f64,
    seal: SealStatus,
    physical_state: PhysicalState,
    container_type: ContainerType,
}

impl Vessel {
    fn new(
        compound: Arc<Compound>,
        capacity: f64,
        seal: SealStatus,
        physical_state: PhysicalState,
        container_type: ContainerType,
        mode: ContainmentMode,
    ) -> Result<Self, ContainerError> {
        if !capacity.is_finite() || capacity <= 0.0 {
            return Err(ContainerError::InvalidCapacity(capacity));
        }
        if !container_type.accepts(physical_state)
            || container_type.containment_mode() != mode
            || physical_state.containment_mode() != mode
        {
            return Err(ContainerError::IncompatibleVessel {
                container_type,
                physical_state,
            });
        }
        Ok(Self {
            compound,
            capacity,
            seal,
            physical_state,
            container_type,
        })
    }

    fn check_addition(&self, amount: f64) -> Result<(), ContainerError> {
        check_amount(amount)?;
        if !self.seal.allows_addition() {
            return Err(ContainerError::SealViolation {
                seal: self.seal,
                operation: "add",
            });
        }
        Ok(())
    }

    fn check_removal(&self, amount: f64) -> Result<(), ContainerError> {
        check_amount(amount)?;
        if !self.seal.allows_removal() {
            return Err(ContainerError::SealViolation {
                seal: self.seal,
                operation: "remove",
            });
        }
        Ok(())
    }

    fn set_seal(&mut self, seal: SealStatus) -> Result<(), ContainerError> {
        if self.seal == SealStatus::Breached && seal != SealStatus::Breached {
            return Err(ContainerError::Breached);
        }
        self.seal = seal;
        Ok(())
    }
}

fn check_amount(amount: f64) -> Result<(), ContainerError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(ContainerError::InvalidAmount(amount));
    }
    Ok(())
}

fn check_bound(mode: ContainmentMode, value: f64, max: f64) -> Result<f64, ContainerError> {
    if !value.is_finite() || value < 0.0 || value > max {
        return Err(ContainerError::OutOfRange {
            mode,
            attempted: value,
            max,
        });
    }
    Ok(value)
}

macro_rules! vessel_accessors {
    ($ty:ty) => {
        impl $ty {
            pub fn compound(&self) -> &Arc<Compound> {
                &self.vessel.compound
            }

            #[inline]
            pub fn capacity(&self) -> f64 {
                self.vessel.capacity
            }

            #[inline]
            pub fn seal_status(&self) -> SealStatus {
                self.vessel.seal
            }

            #[inline]
            pub fn physical_state(&self) -> PhysicalState {
                self.vessel.physical_state
            }

            #[inline]
            pub fn container_type(&self) -> ContainerType {
                self.vessel.container_type
            }

            pub fn seal(&mut self) -> Result<(), ContainerError> {
                self.vessel.set_seal(SealStatus::Sealed)
            }

            pub fn unseal(&mut self) -> Result<(), ContainerError> {
                self.vessel.set_seal(SealStatus::Unsealed)
            }

            pub fn breach(&mut self) {
                self.vessel.seal = SealStatus::Breached;
            }
        }
    };
}

/// Solid or liquid contents held as an absolute mass, `0 ≤ mass ≤ capacity`.
#[derive(Debug, Clone, PartialEq)]
pub struct MassContainer {
    vessel: Vessel,
    mass: f64,
}

vessel_accessors!(MassContainer);

impl MassContainer {
    pub fn new(
        compound: Arc<Compound>,
        capacity: f64,
        mass: f64,
        seal: SealStatus,
        physical_state: PhysicalState,
        container_type: ContainerType,
    ) -> Result<Self, ContainerError> {
        let vessel = Vessel::new(
            compound,
            capacity,
            seal,
            physical_state,
            container_type,
            ContainmentMode::Mass,
        )?;
        let mass = check_bound(ContainmentMode::Mass, mass, vessel.capacity)?;
        Ok(Self { vessel, mass })
    }

    #[inline]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn add(&mut self, amount: f64) -> Result<f64, ContainerError> {
        self.vessel.check_addition(amount)?;
        self.mass = check_bound(
            ContainmentMode::Mass,
            self.mass + amount,
            self.vessel.capacity,
        )?;
        Ok(self.mass)
    }

    pub fn remove(&mut self, amount: f64) -> Result<f64, ContainerError> {
        self.vessel.check_removal(amount)?;
        self.mass = check_bound(
            ContainmentMode::Mass,
            self.mass - amount,
            self.vessel.capacity,
        )?;
        Ok(self.mass)
    }

    /// Decants the contents into a vessel of another capacity.
    pub fn with_capacity(&self, capacity: f64) -> Result<Self, ContainerError> {
        if !capacity.is_finite() || capacity <= 0.0 {
            return Err(ContainerError::InvalidCapacity(capacity));
        }
        let mass = check_bound(ContainmentMode::Mass, self.mass, capacity)?;
        let mut vessel = self.vessel.clone();
        vessel.capacity = capacity;
        Ok(Self { vessel, mass })
    }
}

/// Gas or plasma contents held as a percentage of capacity,
/// `0 ≤ percentage ≤ 100`.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentageContainer {
    vessel: Vessel,
    percentage: f64,
}

vessel_accessors!(PercentageContainer);

impl PercentageContainer {
    pub const MAX_PERCENTAGE: f64 = 100.0;

    pub fn new(
        compound: Arc<Compound>,
        capacity: f64,
        percentage: f64,
        seal: SealStatus,
        physical_state: PhysicalState,
        container_type: ContainerType,
    ) -> Result<Self, ContainerError> {
        let vessel = Vessel::new(
            compound,
            capacity,
            seal,
            physical_state,
            container_type,
            ContainmentMode::Percentage,
        )?;
        let percentage = check_bound(
            ContainmentMode::Percentage,
            percentage,
            Self::MAX_PERCENTAGE,
        )?;
        Ok(Self { vessel, percentage })
    }

    #[inline]
    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    /// Contents in capacity units.
    pub fn contained_volume(&self) -> f64 {
        self.percentage / Self::MAX_PERCENTAGE * self.vessel.capacity
    }

    /// Converts capacity units of this vessel to percentage points.
    pub fn points_for(&self, volume: f64) -> f64 {
        volume / self.vessel.capacity * Self::MAX_PERCENTAGE
    }

    pub fn add(&mut self, points: f64) -> Result<f64, ContainerError> {
        self.vessel.check_addition(points)?;
        self.percentage = check_bound(
            ContainmentMode::Percentage,
            self.percentage + points,
            Self::MAX_PERCENTAGE,
        )?;
        Ok(self.percentage)
    }

    pub fn remove(&mut self, points: f64) -> Result<f64, ContainerError> {
        self.vessel.check_removal(points)?;
        self.percentage = check_bound(
            ContainmentMode::Percentage,
            self.percentage - points,
            Self::MAX_PERCENTAGE,
        )?;
        Ok(self.percentage)
    }

    /// Decants the contents into a vessel of another capacity. The contained
    /// volume is kept and the percentage re-normalized against the new
    /// capacity.
    pub fn with_capacity(&self, capacity: f64) -> Result<Self, ContainerError> {
        if !capacity.is_finite() || capacity <= 0.0 {
            return Err(ContainerError::InvalidCapacity(capacity));
        }
        let renormalized = self.contained_volume() / capacity * Self::MAX_PERCENTAGE;
        let percentage = check_bound(
            ContainmentMode::Percentage,
            renormalized,
            Self::MAX_PERCENTAGE,
        )?;
        let mut vessel = self.vessel.clone();
        vessel.capacity = capacity;
        Ok(Self { vessel, percentage })
    }
}

/// A container in either containment mode.
#[derive(Debug, Clone, PartialEq)]
pub enum ContainerState {
    Mass(MassContainer),
    Percentage(PercentageContainer),
}

impl ContainerState {
    /// Builds a container whose mode follows the phase of its contents.
    pub fn new(
        compound: Arc<Compound>,
        capacity: f64,
        quantity: f64,
        seal: SealStatus,
        physical_state: PhysicalState,
        container_type: ContainerType,
    ) -> Result<Self, ContainerError> {
        match physical_state.containment_mode() {
            ContainmentMode::Mass => MassContainer::new(
                compound,
                capacity,
                quantity,
                seal,
                physical_state,
                container_type,
            )
            .map(Self::Mass),
            ContainmentMode::Percentage => PercentageContainer::new(
                compound,
                capacity,
                quantity,
                seal,
                physical_state,
                container_type,
            )
            .map(Self::Percentage),
        }
    }

    pub fn mode(&self) -> ContainmentMode {
        match self {
            Self::Mass(_) => ContainmentMode::Mass,
            Self::Percentage(_) => ContainmentMode::Percentage,
        }
    }

    pub fn mass(&self) -> Result<f64, ContainerError> {
        match self {
            Self::Mass(c) => Ok(c.mass()),
            Self::Percentage(_) => Err(ContainerError::UnsupportedOperation {
                requested: ContainmentMode::Mass,
                mode: ContainmentMode::Percentage,
            }),
        }
    }

    pub fn percentage(&self) -> Result<f64, ContainerError> {
        match self {
            Self::Percentage(c) => Ok(c.percentage()),
            Self::Mass(_) => Err(ContainerError::UnsupportedOperation {
                requested: ContainmentMode::Percentage,
                mode: ContainmentMode::Mass,
            }),
        }
    }

    /// Adds mass or percentage points depending on the mode.
    pub fn add(&mut self, amount: f64) -> Result<f64, ContainerError> {
        match self {
            Self::Mass(c) => c.add(amount),
            Self::Percentage(c) => c.add(amount),
        }
    }

    /// Removes mass or percentage points depending on the mode.
    pub fn remove(&mut self, amount: f64) -> Result<f64, ContainerError> {
        match self {
            Self::Mass(c) => c.remove(amount),
            Self::Percentage(c) => c.remove(amount),
        }
    }

    pub fn compound(&self) -> &Arc<Compound> {
        match self {
            Self::Mass(c) => c.compound(),
            Self::Percentage(c) => c.compound(),
        }
    }

    pub fn capacity(&self) -> f64 {
        match self {
            Self::Mass(c) => c.capacity(),
            Self::Percentage(c) => c.capacity(),
        }
    }

    pub fn seal_status(&self) -> SealStatus {
        match self {
            Self::Mass(c) => c.seal_status(),
            Self::Percentage(c) => c.seal_status(),
        }
    }

    pub fn physical_state(&self) -> PhysicalState {
        match self {
            Self::Mass(c) => c.physical_state(),
            Self::Percentage(c) => c.physical_state(),
        }
    }

    pub fn container_type(&self) -> ContainerType {
        match self {
            Self::Mass(c) => c.container_type(),
            Self::Percentage(c) => c.container_type(),
        }
    }
}

impl From<MassContainer> for ContainerState {
    fn from(c: MassContainer) -> Self {
        Self::Mass(c)
    }
}

impl From<PercentageContainer> for ContainerState {
    fn from(c: PercentageContainer) -> Self {
        Self::Percentage(c)
    }
}
