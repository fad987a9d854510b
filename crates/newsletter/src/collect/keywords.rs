//! Search queries per category.
//!
//! Queries carry no year so they stay valid from one year to the next; the
//! date filters decide what is current.

use crate::category::Category;

pub const GRANT_KEYWORDS: &[&str] = &[
    "climate resilience grant",
    "sustainability funding opportunity",
    "environmental grant program",
    "climate adaptation funding",
    "green energy grant",
    "climate action funding call",
    "nature-based solutions grant",
    "clean energy innovation funding",
];

pub const EVENT_KEYWORDS: &[&str] = &[
    "climate conference",
    "sustainability summit",
    "environmental conference",
    "climate week event",
    "green energy summit",
    "climate action conference",
    "ESG forum registration",
    "net zero conference",
];

pub const REPORT_KEYWORDS: &[&str] = &[
    "sustainability report",
    "ESG disclosure",
    "corporate climate report",
    "environmental impact report",
    "carbon emissions report",
    "sustainability disclosure",
    "CSR report published",
    "net zero progress report",
];

pub const EXPERT_QUERIES: &[&str] = &[
    "climate NGO director linkedin",
    "sustainability director linkedin",
    "environmental program manager linkedin",
    "climate partnerships director linkedin",
];

/// Query list for a category.
#[must_use]
pub fn keywords_for(category: Category) -> &'static [&'static str] {
    match category {
        Category::Grants => GRANT_KEYWORDS,
        Category::Events => EVENT_KEYWORDS,
        Category::Reports => REPORT_KEYWORDS,
        Category::Experts => EXPERT_QUERIES,
    }
}
