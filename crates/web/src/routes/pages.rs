//! Server-rendered pages.
//!
//! Pages are static apart from the header, which shows the signed-in
//! visitor, and the pricing cards, whose checkout buttons need the product
//! ids from configuration. Everything interactive runs in `/static/js`.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use righthair_core::{BillingCycle, PlanTier};
use serde::Deserialize;
use tracing::instrument;

use crate::config::PricingConfig;
use crate::filters;
use crate::middleware::OptionalUser;
use crate::services::identity::SessionUser;
use crate::state::AppState;

// =============================================================================
// Home page content
// =============================================================================

/// One before/after pair in the hero comparison slider.
pub struct ComparisonSlide {
    pub before: &'static str,
    pub after: &'static str,
    pub before_label: &'static str,
    pub after_label: &'static str,
}

pub const COMPARISON_SLIDES: &[ComparisonSlide] = &[
    ComparisonSlide {
        before: "/static/images/1.svg",
        after: "/static/images/1-old.svg",
        before_label: "Original (45 years)",
        after_label: "Aged (65 years)",
    },
    ComparisonSlide {
        before: "/static/images/2.svg",
        after: "/static/images/2-young.svg",
        before_label: "Original (25 years)",
        after_label: "Younger (12 years)",
    },
];

/// A selectable target age.
pub struct AgeOption {
    pub value: &'static str,
    pub label: &'static str,
}

pub const AGE_OPTIONS: &[AgeOption] = &[
    AgeOption { value: "8", label: "Child" },
    AgeOption { value: "20", label: "Adult" },
    AgeOption { value: "60", label: "Middle Age" },
    AgeOption { value: "80", label: "Elderly" },
];

/// Age selected when the page loads.
pub const DEFAULT_AGE: &str = "20";

/// Title and body pair used by the step, feature and FAQ sections.
pub struct Blurb {
    pub title: &'static str,
    pub body: &'static str,
}

pub const STEPS: &[Blurb] = &[
    Blurb {
        title: "Upload",
        body: "Drag and drop your image or click to take a photo from your device. We support most major image formats.",
    },
    Blurb {
        title: "Choose Gender & Age",
        body: "Pick a gender and age period, click generate, and see your new age progression instantly.",
    },
    Blurb {
        title: "Preview & Download",
        body: "Preview your new age progression. If you like the result, download your AI-generated look and share it anywhere.",
    },
];

pub const FEATURES: &[Blurb] = &[
    Blurb {
        title: "100% Privacy Protected",
        body: "Your photos are processed locally in your browser and never stored on our servers. Complete privacy guaranteed.",
    },
    Blurb {
        title: "Lightning Fast Results",
        body: "Get your age progression results in under 3 seconds with our optimized AI models and advanced processing.",
    },
    Blurb {
        title: "Scientific Accuracy",
        body: "95% accuracy rate using scientifically-verified aging patterns and advanced Stable Diffusion models.",
    },
    Blurb {
        title: "Completely Free",
        body: "No hidden fees, no subscriptions, no watermarks. Unlimited age progressions with full download rights.",
    },
    Blurb {
        title: "Multiple Age Options",
        body: "See yourself at any age from childhood to elderly with realistic aging effects and natural transitions.",
    },
    Blurb {
        title: "HD Quality Downloads",
        body: "Download your results in high-definition PNG or animated GIF format, perfect for sharing or keeping.",
    },
];

pub const FAQS: &[Blurb] = &[
    Blurb {
        title: "How does the AI Age Filter work?",
        body: "Our AI Age Filter uses advanced machine learning models trained on thousands of facial aging patterns. It analyzes your photo to identify key facial features and applies scientifically-verified aging algorithms to show you how you'll look at different ages.",
    },
    Blurb {
        title: "Is my photo safe and private?",
        body: "Yes! Your privacy is our top priority. All photos are processed locally in your browser and are never uploaded to our servers. We don't store, share, or use your photos for any purpose. Your data stays completely private and secure.",
    },
    Blurb {
        title: "How accurate are the age progression results?",
        body: "Our AI model has a 95% accuracy rate based on scientifically-verified aging patterns. The results are highly realistic and take into account factors like skin texture, wrinkles, facial structure changes, and other age-related features. However, actual aging can vary based on genetics, lifestyle, and other factors.",
    },
    Blurb {
        title: "Is the AI Age Filter really free?",
        body: "Yes, absolutely! Our AI Age Filter is completely free to use with no hidden fees or subscriptions. You can generate age progressions up to 2 times per day without any watermarks. All downloads are included at no cost.",
    },
    Blurb {
        title: "What image formats are supported?",
        body: "We support all major image formats including JPG, JPEG, PNG, and WebP. Images can be up to 20MB in size. For best results, use a clear, front-facing photo with good lighting.",
    },
    Blurb {
        title: "Can I download and share my results?",
        body: "Yes! You can download your age-progressed photos in high-definition PNG format or as animated GIFs. Feel free to share them on social media or keep them for personal use. There are no watermarks or restrictions.",
    },
];

/// A tile in the "popular tools" grid.
pub struct Tool {
    pub name: &'static str,
    pub icon: &'static str,
    /// CSS modifier selecting the tile gradient.
    pub tone: &'static str,
}

pub const TOOLS: &[Tool] = &[
    Tool { name: "AI Hair Color", icon: "💇", tone: "rose" },
    Tool { name: "AI Face Swap", icon: "🔄", tone: "cyan" },
    Tool { name: "AI Photo Enhancer", icon: "✨", tone: "indigo" },
    Tool { name: "AI Background Remove", icon: "🖼️", tone: "emerald" },
    Tool { name: "AI Portrait Generator", icon: "🎨", tone: "amber" },
    Tool { name: "AI Style Transfer", icon: "🎭", tone: "violet" },
    Tool { name: "AI Photo Restoration", icon: "🔧", tone: "teal" },
    Tool { name: "AI Anime Filter", icon: "🎌", tone: "red" },
];

/// An example in the "Amazing Transformations" gallery.
pub struct GalleryItem {
    pub image: &'static str,
    pub original_age: u32,
    pub target_age: u32,
}

/// Six examples aged from 30 to 80 in steps of ten.
fn gallery() -> Vec<GalleryItem> {
    (1..=6)
        .map(|i| GalleryItem {
            image: if i % 2 == 0 {
                "/static/images/2.svg"
            } else {
                "/static/images/1.svg"
            },
            original_age: 25,
            target_age: 20 + i * 10,
        })
        .collect()
}

// =============================================================================
// Templates
// =============================================================================

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub user: Option<SessionUser>,
    pub slides: &'static [ComparisonSlide],
    pub age_options: &'static [AgeOption],
    pub default_age: &'static str,
    pub steps: &'static [Blurb],
    pub features: &'static [Blurb],
    pub gallery: Vec<GalleryItem>,
    pub faqs: &'static [Blurb],
    pub tools: &'static [Tool],
}

/// A plan card on the pricing page.
pub struct PlanCard {
    pub slug: &'static str,
    pub name: &'static str,
    pub badge: &'static str,
    pub description: &'static str,
    pub highlighted: bool,
    pub monthly_price: &'static str,
    pub yearly_price: &'static str,
    pub features: &'static [&'static str],
    /// Payments product id; `None` disables the checkout button.
    pub product_id: Option<String>,
    /// Env var to set when `product_id` is missing.
    pub product_env_var: &'static str,
}

impl PlanCard {
    fn new(tier: PlanTier, pricing: &PricingConfig) -> Self {
        Self {
            slug: tier.slug(),
            name: tier.name(),
            badge: tier.badge(),
            description: tier.description(),
            highlighted: tier.highlighted(),
            monthly_price: tier.price(BillingCycle::Monthly),
            yearly_price: tier.price(BillingCycle::Yearly),
            features: tier.features(),
            product_id: pricing
                .product_for(tier)
                .filter(|id| !id.is_blank())
                .map(ToString::to_string),
            product_env_var: tier.product_env_var(),
        }
    }
}

/// Pricing page template.
#[derive(Template, WebTemplate)]
#[template(path = "pricing.html")]
pub struct PricingTemplate {
    pub user: Option<SessionUser>,
    pub plans: Vec<PlanCard>,
    pub monthly_suffix: &'static str,
    pub yearly_suffix: &'static str,
}

/// Query string the payments provider appends to the success URL.
#[derive(Debug, Default, Deserialize)]
pub struct SuccessQuery {
    pub checkout_id: Option<String>,
    pub order_id: Option<String>,
    pub customer_id: Option<String>,
    pub product_id: Option<String>,
}

/// Pricing success page template.
#[derive(Template, WebTemplate)]
#[template(path = "pricing_success.html")]
pub struct PricingSuccessTemplate {
    pub user: Option<SessionUser>,
    pub plan_name: String,
    pub checkout_id: Option<String>,
    pub order_id: Option<String>,
    pub customer_id: Option<String>,
    pub product_id: Option<String>,
    pub has_params: bool,
}

/// Query string for the login page.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub user: Option<SessionUser>,
    pub error: bool,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the home page.
#[instrument(skip_all)]
pub async fn home(OptionalUser(user): OptionalUser) -> HomeTemplate {
    HomeTemplate {
        user,
        slides: COMPARISON_SLIDES,
        age_options: AGE_OPTIONS,
        default_age: DEFAULT_AGE,
        steps: STEPS,
        features: FEATURES,
        gallery: gallery(),
        faqs: FAQS,
        tools: TOOLS,
    }
}

/// Display the pricing page.
#[instrument(skip_all)]
pub async fn pricing(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
) -> PricingTemplate {
    let pricing = &state.config().pricing;

    PricingTemplate {
        user,
        plans: PlanTier::ALL
            .into_iter()
            .map(|tier| PlanCard::new(tier, pricing))
            .collect(),
        monthly_suffix: BillingCycle::Monthly.price_suffix(),
        yearly_suffix: BillingCycle::Yearly.price_suffix(),
    }
}

/// Display the post-checkout confirmation.
#[instrument(skip_all)]
pub async fn pricing_success(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Query(query): Query<SuccessQuery>,
) -> PricingSuccessTemplate {
    let checkout_id = non_empty(query.checkout_id);
    let order_id = non_empty(query.order_id);
    let customer_id = non_empty(query.customer_id);
    let product_id = non_empty(query.product_id);

    PricingSuccessTemplate {
        user,
        plan_name: plan_name(&state.config().pricing, product_id.as_deref()),
        has_params: checkout_id.is_some() || order_id.is_some() || product_id.is_some(),
        checkout_id,
        order_id,
        customer_id,
        product_id,
    }
}

/// Display the login page.
#[instrument(skip_all)]
pub async fn login(
    OptionalUser(user): OptionalUser,
    Query(query): Query<LoginQuery>,
) -> LoginTemplate {
    LoginTemplate {
        user,
        error: query.error.is_some(),
    }
}

/// Name of the purchased plan for the success page.
fn plan_name(pricing: &PricingConfig, product_id: Option<&str>) -> String {
    match product_id {
        Some(id) => pricing
            .tier_for(id)
            .map_or_else(|| format!("Product {id}"), |tier| tier.name().to_string()),
        None => "Your plan".to_string(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
