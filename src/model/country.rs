use crate::model::relation::{self, detached_many, detached_one};
use crate::model::{
    identity_eq, merge_field, Collection, Column, Entity, Location, Reference, Region, SqlType, TableDef,
};
use serde::{Deserialize, Serialize};

/// A Country.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub country_id: Option<i64>,
    pub country_name: Option<String>,
    #[serde(default, serialize_with = "detached_many")]
    pub locations: Vec<Location>,
    #[serde(default, serialize_with = "detached_one")]
    pub region: Option<Region>,
}

identity_eq!(Country, country_id);

static COUNTRY_TABLE: TableDef = TableDef {
    table: "country",
    key: Column::new("country_id", "countryId", SqlType::BigInt),
    columns: &[Column::new("country_name", "countryName", SqlType::Text)],
    references: &[Reference {
        field: "region",
        column: "region_id",
        target: <Region as Entity>::table,
    }],
    collections: &[Collection {
        field: "locations",
        target: <Location as Entity>::table,
        foreign_key: "country_id",
    }],
};

impl Country {
    /// Replaces the locations of this country. Returns the locations that
    /// were dropped, with their country cleared.
    pub fn set_locations(&mut self, locations: Vec<Location>) -> Vec<Location> {
        let owner = self.detached();
        relation::replace_children(&mut self.locations, locations, &owner, |l| &mut l.country)
    }

    pub fn add_location(&mut self, location: Location) -> &mut Self {
        let owner = self.detached();
        relation::add_child(&mut self.locations, location, &owner, |l| &mut l.country);
        self
    }

    pub fn remove_location(&mut self, location: &Location) -> Option<Location> {
        relation::remove_child(&mut self.locations, location, |l| &mut l.country)
    }
}

impl Entity for Country {
    type Id = i64;

    const ENTITY_NAME: &'static str = "employeeCountry";
    const PATH: &'static str = "countries";

    fn id(&self) -> Option<&i64> {
        self.country_id.as_ref()
    }

    fn set_id(&mut self, id: i64) {
        self.country_id = Some(id);
    }

    fn merge(&mut self, patch: Self) {
        merge_field(&mut self.country_name, patch.country_name);
        merge_field(&mut self.region, patch.region);
    }

    fn detached(&self) -> Self {
        Country {
            country_id: self.country_id,
            country_name: self.country_name.clone(),
            ..Default::default()
        }
    }

    fn link_children(&mut self) {
        let locations = std::mem::take(&mut self.locations);
        self.set_locations(locations);
    }

    fn table() -> &'static TableDef {
        &COUNTRY_TABLE
    }
}
