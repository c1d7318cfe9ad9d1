//! Mapping between store state and URL-style query parameters.
//!
//! Only `page`, `sortField`, `sortDirection` and `filter` (as JSON) are
//! carried. Restoring goes through ordinary events so the store applies
//! them with its usual rules.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use wincache_model::{Entity, Sort, SortDirection};

use crate::error::{CoreError, Result};
use crate::event::Event;
use crate::filter::{Filter, FilterRequest};
use crate::state::WindowState;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_direction: Option<SortDirection>,
    /// Filter value encoded as JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl QueryParams {
    /// Capture the current page, sort and filter.
    pub fn from_state<T: Entity, F: Serialize>(state: &WindowState<T, F>) -> Result<Self> {
        let sort = &state.sort.current;
        let (sort_field, sort_direction) = if sort.is_unsorted() {
            (None, None)
        } else {
            (Some(sort.field.clone()), Some(sort.direction))
        };
        let filter = state
            .filter
            .current
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        Ok(Self {
            page: state.pagination.as_ref().map(|p| p.current_page),
            sort_field,
            sort_direction,
            filter,
        })
    }

    /// Parse decoded `name=value` pairs. Unknown names are ignored.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self> {
        let mut params = Self::default();
        for (name, value) in pairs {
            match name {
                "page" => {
                    let page = value
                        .parse()
                        .map_err(|_| CoreError::InvalidQueryParam {
                            name: name.to_string(),
                            value: value.to_string(),
                        })?;
                    params.page = Some(page);
                }
                "sortField" => params.sort_field = Some(value.to_string()),
                "sortDirection" => params.sort_direction = Some(value.parse()?),
                "filter" => params.filter = Some(value.to_string()),
                _ => {}
            }
        }
        Ok(params)
    }

    /// Pairs in a fixed order, for building a query string.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(field) = &self.sort_field {
            pairs.push(("sortField", field.clone()));
        }
        if let Some(direction) = self.sort_direction {
            pairs.push(("sortDirection", direction.to_string()));
        }
        if let Some(filter) = &self.filter {
            pairs.push(("filter", filter.clone()));
        }
        pairs
    }

    /// Events that restore these parameters: a forced filter, the sort,
    /// then the page.
    pub fn to_events<T: Entity, F: Filter + DeserializeOwned>(&self) -> Result<Vec<Event<T, F>>> {
        let mut events = Vec::new();
        if let Some(filter) = &self.filter {
            let value: F = serde_json::from_str(filter)?;
            events.push(Event::SetFilter(
                FilterRequest::replace(value).with_force_load(true),
            ));
        }
        if let Some(field) = &self.sort_field {
            let direction = self.sort_direction.unwrap_or(SortDirection::Asc);
            events.push(Event::SetSort(Sort::new(field.clone(), direction)));
        }
        if let Some(page) = self.page {
            events.push(Event::load_page(page));
        }
        Ok(events)
    }
}
