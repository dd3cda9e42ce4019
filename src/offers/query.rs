//! Turns the raw `GET /offers` parameters into a filter, an ordering and a page window.
//!
//! The result is storage-agnostic; the Postgres repository renders it to SQL.

use serde::Deserialize;

use crate::error::ApiError;

pub const DEFAULT_LIMIT: i64 = 16;
pub const DEFAULT_PAGE: i64 = 1;

/// Query string as sent by clients. Everything stays textual so bad input
/// is reported through the normal error envelope.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub title: Option<String>,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferFilter {
    /// Case-insensitive substring of the product name.
    pub title: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSort {
    Asc,
    Desc,
}

impl PriceSort {
    /// Unknown values mean "no particular order".
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "price-asc" | "price_asc" => Some(PriceSort::Asc),
            "price-desc" | "price_desc" => Some(PriceSort::Desc),
            _ => None,
        }
    }
}

/// Pagination window. Not range-checked: the store rejects negative values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub skip: i64,
}

impl Default for Page {
    fn default() -> Self {
        Page::new(DEFAULT_LIMIT, DEFAULT_PAGE)
    }
}

impl Page {
    /// `page` is 1-indexed.
    pub fn new(limit: i64, page: i64) -> Self {
        Self {
            limit,
            skip: page.saturating_sub(1).saturating_mul(limit),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferQuery {
    pub filter: OfferFilter,
    pub sort: Option<PriceSort>,
    pub page: Page,
}

impl OfferQuery {
    pub fn from_params(params: &SearchParams) -> Result<Self, ApiError> {
        let filter = OfferFilter {
            title: present(&params.title).map(str::to_string),
            price_min: present(&params.price_min)
                .map(|v| parse_bound("priceMin", v))
                .transpose()?,
            price_max: present(&params.price_max)
                .map(|v| parse_bound("priceMax", v))
                .transpose()?,
        };
        let sort = present(&params.sort).and_then(PriceSort::parse);
        let limit = present(&params.limit)
            .map(|v| parse_int("limit", v))
            .transpose()?
            .unwrap_or(DEFAULT_LIMIT);
        let page = present(&params.page)
            .map(|v| parse_int("page", v))
            .transpose()?
            .unwrap_or(DEFAULT_PAGE);

        Ok(Self {
            filter,
            sort,
            page: Page::new(limit, page),
        })
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_bound(name: &str, raw: &str) -> Result<f64, ApiError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ApiError::validation(format!("{name} must be a number")))
}

fn parse_int(name: &str, raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::validation(format!("{name} must be an integer")))
}
