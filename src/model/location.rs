use crate::model::relation::{self, detached_many, detached_one};
use crate::model::{
    identity_eq, merge_field, Collection, Column, Country, Department, Entity, Reference, SqlType, TableDef,
};
use serde::{Deserialize, Serialize};

/// A Location.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub location_id: Option<i64>,
    pub street_address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub state_province: Option<String>,
    #[serde(default, serialize_with = "detached_many")]
    pub departments: Vec<Department>,
    #[serde(default, serialize_with = "detached_one")]
    pub country: Option<Country>,
}

identity_eq!(Location, location_id);

static LOCATION_TABLE: TableDef = TableDef {
    table: "location",
    key: Column::new("location_id", "locationId", SqlType::BigInt),
    columns: &[
        Column::new("street_address", "streetAddress", SqlType::Text),
        Column::new("postal_code", "postalCode", SqlType::Text),
        Column::new("city", "city", SqlType::Text),
        Column::new("state_province", "stateProvince", SqlType::Text),
    ],
    references: &[Reference {
        field: "country",
        column: "country_id",
        target: <Country as Entity>::table,
    }],
    collections: &[Collection {
        field: "departments",
        target: <Department as Entity>::table,
        foreign_key: "location_id",
    }],
};

impl Location {
    pub fn set_departments(&mut self, departments: Vec<Department>) -> Vec<Department> {
        let owner = self.detached();
        relation::replace_children(&mut self.departments, departments, &owner, |d| &mut d.location)
    }

    pub fn add_department(&mut self, department: Department) -> &mut Self {
        let owner = self.detached();
        relation::add_child(&mut self.departments, department, &owner, |d| &mut d.location);
        self
    }

    pub fn remove_department(&mut self, department: &Department) -> Option<Department> {
        relation::remove_child(&mut self.departments, department, |d| &mut d.location)
    }
}

impl Entity for Location {
    type Id = i64;

    const ENTITY_NAME: &'static str = "employeeLocation";
    const PATH: &'static str = "locations";

    fn id(&self) -> Option<&i64> {
        self.location_id.as_ref()
    }

    fn set_id(&mut self, id: i64) {
        self.location_id = Some(id);
    }

    fn merge(&mut self, patch: Self) {
        merge_field(&mut self.street_address, patch.street_address);
        merge_field(&mut self.postal_code, patch.postal_code);
        merge_field(&mut self.city, patch.city);
        merge_field(&mut self.state_province, patch.state_province);
        merge_field(&mut self.country, patch.country);
    }

    fn detached(&self) -> Self {
        Location {
            location_id: self.location_id,
            street_address: self.street_address.clone(),
            postal_code: self.postal_code.clone(),
            city: self.city.clone(),
            state_province: self.state_province.clone(),
            ..Default::default()
        }
    }

    fn link_children(&mut self) {
        let departments = std::mem::take(&mut self.departments);
        self.set_departments(departments);
    }

    fn table() -> &'static TableDef {
        &LOCATION_TABLE
    }
}
