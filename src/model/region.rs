use crate::model::relation::{self, detached_many};
use crate::model::{identity_eq, merge_field, Collection, Column, Country, Entity, SqlType, TableDef};
use serde::{Deserialize, Serialize};

/// A Region.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub region_id: Option<i64>,
    pub region_name: Option<String>,
    #[serde(default, serialize_with = "detached_many")]
    pub countries: Vec<Country>,
}

identity_eq!(Region, region_id);

static REGION_TABLE: TableDef = TableDef {
    table: "region",
    key: Column::new("region_id", "regionId", SqlType::BigInt),
    columns: &[Column::new("region_name", "regionName", SqlType::Text)],
    references: &[],
    collections: &[Collection {
        field: "countries",
        target: <Country as Entity>::table,
        foreign_key: "region_id",
    }],
};

impl Region {
    /// Replaces the countries of this region. Returns the countries that were
    /// dropped, with their region cleared.
    pub fn set_countries(&mut self, countries: Vec<Country>) -> Vec<Country> {
        let owner = self.detached();
        relation::replace_children(&mut self.countries, countries, &owner, |c| &mut c.region)
    }

    pub fn add_country(&mut self, country: Country) -> &mut Self {
        let owner = self.detached();
        relation::add_child(&mut self.countries, country, &owner, |c| &mut c.region);
        self
    }

    pub fn remove_country(&mut self, country: &Country) -> Option<Country> {
        relation::remove_child(&mut self.countries, country, |c| &mut c.region)
    }
}

impl Entity for Region {
    type Id = i64;

    const ENTITY_NAME: &'static str = "employeeRegion";
    const PATH: &'static str = "regions";

    fn id(&self) -> Option<&i64> {
        self.region_id.as_ref()
    }

    fn set_id(&mut self, id: i64) {
        self.region_id = Some(id);
    }

    fn merge(&mut self, patch: Self) {
        merge_field(&mut self.region_name, patch.region_name);
    }

    fn detached(&self) -> Self {
        Region {
            region_id: self.region_id,
            region_name: self.region_name.clone(),
            countries: Vec::new(),
        }
    }

    fn link_children(&mut self) {
        let countries = std::mem::take(&mut self.countries);
        self.set_countries(countries);
    }

    fn table() -> &'static TableDef {
        &REGION_TABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn country(id: i64) -> Country {
        Country { country_id: Some(id), country_name: Some(format!("C{}", id)), ..Default::default() }
    }

    #[test]
    fn replacing_countries_reparents_and_releases() {
        let mut region = Region { region_id: Some(1), region_name: Some("Americas".into()), ..Default::default() };
        region.set_countries(vec![country(10), country(11)]);
        assert!(region.countries.iter().all(|c| c.region.as_ref().and_then(|r| r.region_id) == Some(1)));

        let released = region.set_countries(vec![country(11), country(12)]);
        assert_eq!(released.len(), 1);
        assert_eq!(released[0].country_id, Some(10));
        assert!(released[0].region.is_none());
        let ids: Vec<_> = region.countries.iter().map(|c| c.country_id).collect();
        assert_eq!(ids, vec![Some(11), Some(12)]);
        assert!(region.countries.iter().all(|c| c.region.is_some()));
    }

    #[test]
    fn add_and_remove_country() {
        let mut region = Region { region_id: Some(2), ..Default::default() };
        region.add_country(country(20)).add_country(country(21));
        assert_eq!(region.countries.len(), 2);

        let removed = region.remove_country(&country(20)).unwrap();
        assert!(removed.region.is_none());
        assert_eq!(region.countries.len(), 1);
        assert!(region.remove_country(&country(99)).is_none());
    }

    #[test]
    fn nested_countries_do_not_render_their_region() {
        let mut region = Region { region_id: Some(3), region_name: Some("Asia".into()), ..Default::default() };
        region.set_countries(vec![country(30)]);
        let json = serde_json::to_value(&region).unwrap();
        assert_eq!(json["countries"][0]["countryId"], 30);
        let nested = json["countries"][0].as_object().unwrap();
        assert!(!nested.contains_key("region"));
        assert!(!nested.contains_key("locations"));
    }
}
