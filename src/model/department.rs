use crate::model::relation::{self, detached_many, detached_one};
use crate::model::{
    identity_eq, merge_field, Collection, Column, Employee, Entity, Location, Reference, SqlType, TableDef,
};
use serde::{Deserialize, Serialize};

/// A Department.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub department_id: Option<i64>,
    pub department_name: Option<String>,
    #[serde(default, serialize_with = "detached_many")]
    pub employees: Vec<Employee>,
    #[serde(default, serialize_with = "detached_one")]
    pub location: Option<Location>,
}

identity_eq!(Department, department_id);

static DEPARTMENT_TABLE: TableDef = TableDef {
    table: "department",
    key: Column::new("department_id", "departmentId", SqlType::BigInt),
    columns: &[Column::new("department_name", "departmentName", SqlType::Text)],
    references: &[Reference {
        field: "location",
        column: "location_id",
        target: <Location as Entity>::table,
    }],
    collections: &[Collection {
        field: "employees",
        target: <Employee as Entity>::table,
        foreign_key: "department_id",
    }],
};

impl Department {
    pub fn set_employees(&mut self, employees: Vec<Employee>) -> Vec<Employee> {
        let owner = self.detached();
        relation::replace_children(&mut self.employees, employees, &owner, |e| &mut e.department)
    }

    pub fn add_employee(&mut self, employee: Employee) -> &mut Self {
        let owner = self.detached();
        relation::add_child(&mut self.employees, employee, &owner, |e| &mut e.department);
        self
    }

    pub fn remove_employee(&mut self, employee: &Employee) -> Option<Employee> {
        relation::remove_child(&mut self.employees, employee, |e| &mut e.department)
    }
}

impl Entity for Department {
    type Id = i64;

    const ENTITY_NAME: &'static str = "employeeDepartment";
    const PATH: &'static str = "departments";

    fn id(&self) -> Option<&i64> {
        self.department_id.as_ref()
    }

    fn set_id(&mut self, id: i64) {
        self.department_id = Some(id);
    }

    fn merge(&mut self, patch: Self) {
        merge_field(&mut self.department_name, patch.department_name);
        merge_field(&mut self.location, patch.location);
    }

    fn detached(&self) -> Self {
        Department {
            department_id: self.department_id,
            department_name: self.department_name.clone(),
            ..Default::default()
        }
    }

    fn link_children(&mut self) {
        let employees = std::mem::take(&mut self.employees);
        self.set_employees(employees);
    }

    fn table() -> &'static TableDef {
        &DEPARTMENT_TABLE
    }
}
