//! Classification of a dispatcher provisioning run.

use std::fmt;

/// Steps of the provisioning state machine, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningStep {
    ResolveTopology,
    RegisterFlushAgent,
    TagInstance,
    Complete,
}

impl fmt::Display for ProvisioningStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ResolveTopology => "resolve-topology",
            Self::RegisterFlushAgent => "register-flush-agent",
            Self::TagInstance => "tag-instance",
            Self::Complete => "complete",
        })
    }
}

/// Terminal result of one provisioning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningOutcome {
    /// Flush agent registered and instance tagged.
    Provisioned,
    /// The instance never reported a private address.
    UnresolvedAddress,
    /// Topology could not be resolved for another reason.
    TopologyFailed,
    /// The registrar rejected the flush agent. Nothing was tagged.
    RegistrationFailed,
    /// The flush agent exists but the instance could not be tagged.
    TaggingFailed,
}

impl ProvisioningOutcome {
    #[must_use]
    pub fn is_success(self) -> bool {
        self == Self::Provisioned
    }

    /// Whether remote state may have changed even though the run failed.
    ///
    /// Only a tagging failure leaves a flush agent behind with no tag on the
    /// instance; nothing compensates for it.
    #[must_use]
    pub fn may_have_side_effects(self) -> bool {
        matches!(self, Self::Provisioned | Self::TaggingFailed)
    }

    /// Step the run stopped at.
    #[must_use]
    pub fn step(self) -> ProvisioningStep {
        match self {
            Self::Provisioned => ProvisioningStep::Complete,
            Self::UnresolvedAddress | Self::TopologyFailed => ProvisioningStep::ResolveTopology,
            Self::RegistrationFailed => ProvisioningStep::RegisterFlushAgent,
            Self::TaggingFailed => ProvisioningStep::TagInstance,
        }
    }
}
