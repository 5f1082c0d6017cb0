use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use url::Url;
use crate::helpers::uri::resource_uri;
use crate::models::reservation::Reservation;

pub const COLLECTION_REL: &str = "reservations";
const PHOTO_SEARCH_URL: &str = "https://www.google.pl/search";

#[skip_serializing_none]
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub templated: Option<bool>,
}

impl Link {
    pub fn new(href: impl ToString) -> Self {
        Self {
            href: href.to_string(),
            templated: None,
        }
    }

    pub fn templated(href: impl ToString) -> Self {
        Self {
            href: href.to_string(),
            templated: Some(true),
        }
    }
}

pub type Links = BTreeMap<String, Link>;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ReservationResource {
    pub name: String,
    #[serde(rename = "_links")]
    pub links: Links,
}

impl ReservationResource {
    pub fn from_reservation(reservation: &Reservation, base: &Url) -> Self {
        let id = reservation.id.map(|id| id.to_string()).unwrap_or_default();
        let self_uri = resource_uri(base, &[COLLECTION_REL, &id]);

        let mut links = Links::new();
        links.insert("self".to_string(), Link::new(&self_uri));
        links.insert("reservation".to_string(), Link::new(&self_uri));
        Self {
            name: reservation.name.clone(),
            links,
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
    pub number: usize,
}

#[derive(Serialize, Debug)]
pub struct EmbeddedReservations {
    pub reservations: Vec<ReservationResource>,
}

#[derive(Serialize, Debug)]
pub struct PagedReservations {
    #[serde(rename = "_embedded")]
    pub embedded: EmbeddedReservations,
    #[serde(rename = "_links")]
    pub links: Links,
    pub page: PageMetadata,
}

/// Decorates rendered reservations: adds a `photo` link for the stored name
/// and tags the displayed name with the instance id. Stored data is untouched.
#[derive(Clone, Debug)]
pub struct ResourceProcessor {
    instance_id: String,
}

impl ResourceProcessor {
    pub fn new(instance_id: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
        }
    }

    pub fn process(&self, mut resource: ReservationResource) -> ReservationResource {
        if let Ok(photo) = Url::parse_with_params(PHOTO_SEARCH_URL, &[("tbm", "isch"), ("q", resource.name.as_str())]) {
            resource.links.insert("photo".to_string(), Link::new(photo));
        }
        if !self.instance_id.is_empty() {
            resource.name = format!("{} {}", resource.name, self.instance_id);
        }
        resource
    }
}
