//! Maps page-lifecycle signals to the badge group rendered there.

use crate::models::{
    ActiveIntegrations, BadgeGroup, Placement, PlacementSignal, ResolvedSettings,
};

/// Group id rendered at a signal. Unknown signals fall back to the footer.
pub fn group_for_signal(signal: &PlacementSignal) -> Placement {
    match signal {
        PlacementSignal::ShowAfterAddToCart | PlacementSignal::EddPurchaseLinkEnd => {
            Placement::ProductPage
        }
        PlacementSignal::CheckoutBeforeOrderReview
        | PlacementSignal::EddCheckoutBeforePurchaseForm => Placement::Checkout,
        PlacementSignal::Other(_) => Placement::Footer,
    }
}

/// Explicit router invoked by the host at each lifecycle point.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlacementRouter {
    integrations: ActiveIntegrations,
}

impl PlacementRouter {
    pub fn new(integrations: ActiveIntegrations) -> Self {
        Self { integrations }
    }

    pub fn integrations(&self) -> ActiveIntegrations {
        self.integrations
    }

    /// Resolves a raw signal name to its group placement.
    pub fn resolve(&self, signal_name: &str) -> (PlacementSignal, Placement) {
        let signal = PlacementSignal::parse(signal_name);
        let placement = group_for_signal(&signal);
        (signal, placement)
    }

    /// Decides whether `group` should be emitted at `signal`.
    ///
    /// Inactive groups never render. Integration-specific signals need their
    /// integration active, groups with a required plugin need that plugin
    /// active, and the checkout and product page groups additionally need the
    /// settings flag named after the signal.
    pub fn should_render(
        &self,
        signal: &PlacementSignal,
        group: &BadgeGroup,
        settings: &ResolvedSettings,
    ) -> bool {
        if !group.is_active {
            return false;
        }

        if let Some(integration) = signal.integration() {
            if !self.integrations.is_active(integration) {
                return false;
            }
        }

        if let Some(plugin) = group.required_plugin {
            if !self.integrations.is_active(plugin) {
                return false;
            }
        }

        match group.placement() {
            Placement::Checkout | Placement::ProductPage => settings.placement_enabled(signal),
            Placement::Footer | Placement::Custom(_) => true,
        }
    }
}
