use crate::model::relation::detached_one;
use crate::model::{
    identity_eq, merge_field, Column, Department, Employee, Entity, Job, Reference, SqlType, TableDef,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A JobHistory entry: one job an employee held in a department over a period.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobHistory {
    pub id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default, serialize_with = "detached_one")]
    pub job: Option<Job>,
    #[serde(default, serialize_with = "detached_one")]
    pub department: Option<Department>,
    #[serde(default, serialize_with = "detached_one")]
    pub employee: Option<Employee>,
}

identity_eq!(JobHistory, id);

static JOB_HISTORY_TABLE: TableDef = TableDef {
    table: "job_history",
    key: Column::new("id", "id", SqlType::BigInt),
    columns: &[
        Column::new("start_date", "startDate", SqlType::Date),
        Column::new("end_date", "endDate", SqlType::Date),
    ],
    references: &[
        Reference { field: "job", column: "job_id", target: <Job as Entity>::table },
        Reference { field: "department", column: "department_id", target: <Department as Entity>::table },
        Reference { field: "employee", column: "employee_id", target: <Employee as Entity>::table },
    ],
    collections: &[],
};

impl Entity for JobHistory {
    type Id = i64;

    const ENTITY_NAME: &'static str = "employeeJobHistory";
    const PATH: &'static str = "job-histories";

    fn id(&self) -> Option<&i64> {
        self.id.as_ref()
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn merge(&mut self, patch: Self) {
        merge_field(&mut self.start_date, patch.start_date);
        merge_field(&mut self.end_date, patch.end_date);
        merge_field(&mut self.job, patch.job);
        merge_field(&mut self.department, patch.department);
        merge_field(&mut self.employee, patch.employee);
    }

    fn detached(&self) -> Self {
        JobHistory {
            id: self.id,
            start_date: self.start_date,
            end_date: self.end_date,
            ..Default::default()
        }
    }

    fn table() -> &'static TableDef {
        &JOB_HISTORY_TABLE
    }
}
