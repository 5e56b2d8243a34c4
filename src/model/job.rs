use crate::model::relation::{self, detached_many};
use crate::model::{identity_eq, merge_field, Collection, Column, Employee, Entity, SqlType, TableDef};
use serde::{Deserialize, Serialize};

/// A Job. Keyed by text, minted from the shared sequence like the numeric keys.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: Option<String>,
    #[serde(alias = "title")]
    pub job_title: Option<String>,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
    #[serde(default, serialize_with = "detached_many")]
    pub employees: Vec<Employee>,
}

identity_eq!(Job, job_id);

static JOB_TABLE: TableDef = TableDef {
    table: "job",
    key: Column::new("job_id", "jobId", SqlType::Text),
    columns: &[
        Column::new("job_title", "jobTitle", SqlType::Text),
        Column::new("min_salary", "minSalary", SqlType::BigInt),
        Column::new("max_salary", "maxSalary", SqlType::BigInt),
    ],
    references: &[],
    collections: &[Collection {
        field: "employees",
        target: <Employee as Entity>::table,
        foreign_key: "job_id",
    }],
};

impl Job {
    pub fn set_employees(&mut self, employees: Vec<Employee>) -> Vec<Employee> {
        let owner = self.detached();
        relation::replace_children(&mut self.employees, employees, &owner, |e| &mut e.job)
    }

    pub fn add_employee(&mut self, employee: Employee) -> &mut Self {
        let owner = self.detached();
        relation::add_child(&mut self.employees, employee, &owner, |e| &mut e.job);
        self
    }

    pub fn remove_employee(&mut self, employee: &Employee) -> Option<Employee> {
        relation::remove_child(&mut self.employees, employee, |e| &mut e.job)
    }
}

impl Entity for Job {
    type Id = String;

    const ENTITY_NAME: &'static str = "employeeJob";
    const PATH: &'static str = "jobs";

    fn id(&self) -> Option<&String> {
        self.job_id.as_ref()
    }

    fn set_id(&mut self, id: String) {
        self.job_id = Some(id);
    }

    fn merge(&mut self, patch: Self) {
        merge_field(&mut self.job_title, patch.job_title);
        merge_field(&mut self.min_salary, patch.min_salary);
        merge_field(&mut self.max_salary, patch.max_salary);
    }

    fn detached(&self) -> Self {
        Job {
            job_id: self.job_id.clone(),
            job_title: self.job_title.clone(),
            min_salary: self.min_salary,
            max_salary: self.max_salary,
            employees: Vec::new(),
        }
    }

    fn link_children(&mut self) {
        let employees = std::mem::take(&mut self.employees);
        self.set_employees(employees);
    }

    fn table() -> &'static TableDef {
        &JOB_TABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_title_alias() {
        let job: Job = serde_json::from_value(json!({ "title": "Developer", "minSalary": 50000 })).unwrap();
        assert_eq!(job.job_title.as_deref(), Some("Developer"));
        assert_eq!(job.min_salary, Some(50000));
        assert_eq!(job.max_salary, None);
    }

    #[test]
    fn merge_overwrites_only_present_fields() {
        let mut job = Job {
            job_id: Some("1050".into()),
            job_title: Some("Developer".into()),
            min_salary: Some(50000),
            max_salary: Some(90000),
            ..Default::default()
        };
        job.merge(Job { job_id: Some("1050".into()), min_salary: Some(55000), ..Default::default() });
        assert_eq!(job.job_title.as_deref(), Some("Developer"));
        assert_eq!(job.min_salary, Some(55000));
        assert_eq!(job.max_salary, Some(90000));
    }

    #[test]
    fn renders_camel_case_with_nulls() {
        let job = Job { job_id: Some("7".into()), ..Default::default() };
        assert_eq!(
            serde_json::to_value(&job).unwrap(),
            json!({ "jobId": "7", "jobTitle": null, "minSalary": null, "maxSalary": null, "employees": [] })
        );
    }
}
