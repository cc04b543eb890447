//! CSS selectors for the maps search and detail views.

/// Scrollable results panel of a search.
pub const RESULTS_PANEL: &str = "div[role='feed']";

/// One candidate listing inside the results panel.
pub const LISTING_LINK: &str = "a[href*='/maps/place/']";

/// Present once a listing's detail view has loaded. Also carries the name.
pub const DETAIL_MARKER: &str = "h1.DUwDvf";

pub const NAME: &str = DETAIL_MARKER;
pub const CATEGORY: &str = "button[jsaction*='category']";
pub const ADDRESS: &str = "button[data-item-id='address']";
pub const PHONE: &str = "button[data-item-id*='phone']";
pub const WEBSITE: &str = "a[data-item-id='authority']";
pub const RATING: &str = "span.ceNzKf";
pub const REVIEW_COUNT: &str = "span.RDApEe";

/// Attribute of [`PHONE`] holding the structured number.
pub const PHONE_ATTRIBUTE: &str = "data-item-id";
/// Prefix of [`PHONE_ATTRIBUTE`] values, stripped to leave the number.
pub const PHONE_ATTRIBUTE_PREFIX: &str = "phone:tel:";

/// Attribute of [`WEBSITE`] holding the URL.
pub const WEBSITE_ATTRIBUTE: &str = "href";
