//! Subscription plans shown on the pricing page.
//!
//! Product identifiers live in the payments provider and are injected from
//! configuration; this module only carries the display data for each tier.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Billing cadence selected with the pricing page toggle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    #[default]
    Monthly,
    Yearly,
}

impl BillingCycle {
    /// Suffix rendered after the price.
    #[must_use]
    pub const fn price_suffix(self) -> &'static str {
        match self {
            Self::Monthly => "/mo",
            Self::Yearly => "/mo (billed yearly)",
        }
    }

    /// Value used in `data-billing` attributes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

/// Pricing tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Basic,
    Pro,
    Team,
}

impl PlanTier {
    /// All tiers in display order.
    pub const ALL: [Self; 3] = [Self::Basic, Self::Pro, Self::Team];

    /// Stable slug for the tier.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Pro => "pro",
            Self::Team => "team",
        }
    }

    /// Human-readable plan name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Pro => "Pro",
            Self::Team => "Team",
        }
    }

    #[must_use]
    pub const fn badge(self) -> &'static str {
        match self {
            Self::Basic => "Best for starters",
            Self::Pro => "Most popular",
            Self::Team => "Includes support",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Basic => "For individuals who need reliable, watermark-free outputs.",
            Self::Pro => "Unlimited, watermark-free, fast lane for creators.",
            Self::Team => "For studios and brands needing seats and API access.",
        }
    }

    /// Whether the tier is visually emphasised.
    #[must_use]
    pub const fn highlighted(self) -> bool {
        matches!(self, Self::Pro)
    }

    /// Display price per month for the given cycle.
    #[must_use]
    pub const fn price(self, cycle: BillingCycle) -> &'static str {
        match (self, cycle) {
            (Self::Basic, BillingCycle::Monthly) => "$9.9",
            (Self::Basic, BillingCycle::Yearly) => "$7.9",
            (Self::Pro, BillingCycle::Monthly) => "$49.9",
            (Self::Pro, BillingCycle::Yearly) => "$39.9",
            (Self::Team, BillingCycle::Monthly) => "$99.9",
            (Self::Team, BillingCycle::Yearly) => "$79.9",
        }
    }

    #[must_use]
    pub const fn features(self) -> &'static [&'static str] {
        match self {
            Self::Basic => &[
                "Up to 50 generations per day",
                "JPG / PNG / WebP uploads",
                "HD download (no watermark)",
                "Standard email support",
            ],
            Self::Pro => &[
                "Unlimited generations & downloads",
                "HD/original quality, no watermark",
                "Age, gender and style presets",
                "Priority queue, ~3s average",
                "Commercial license & priority support",
            ],
            Self::Team => &[
                "5 seats (expandable)",
                "Custom styles & branding",
                "Webhook & API access",
                "Dedicated technical support",
                "Invoicing & compliance help",
            ],
        }
    }

    /// Environment variable holding the payments product id for this tier.
    #[must_use]
    pub const fn product_env_var(self) -> &'static str {
        match self {
            Self::Basic => "CREEM_PRODUCT_BASIC",
            Self::Pro => "CREEM_PRODUCT_PRO",
            Self::Team => "CREEM_PRODUCT_TEAM",
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
