use crate::model::relation::{detached_boxed, detached_one};
use crate::model::{identity_eq, merge_field, Column, Department, Entity, Job, Reference, SqlType, TableDef};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An Employee. `manager` is another employee.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub employee_id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub salary: Option<i64>,
    pub commission_pct: Option<i64>,
    #[serde(default, serialize_with = "detached_one")]
    pub job: Option<Job>,
    #[serde(default, serialize_with = "detached_boxed")]
    pub manager: Option<Box<Employee>>,
    #[serde(default, serialize_with = "detached_one")]
    pub department: Option<Department>,
}

identity_eq!(Employee, employee_id);

static EMPLOYEE_TABLE: TableDef = TableDef {
    table: "employee",
    key: Column::new("employee_id", "employeeId", SqlType::BigInt),
    columns: &[
        Column::new("first_name", "firstName", SqlType::Text),
        Column::new("last_name", "lastName", SqlType::Text),
        Column::new("email", "email", SqlType::Text),
        Column::new("phone_number", "phoneNumber", SqlType::Text),
        Column::new("hire_date", "hireDate", SqlType::Date),
        Column::new("salary", "salary", SqlType::BigInt),
        Column::new("commission_pct", "commissionPct", SqlType::BigInt),
    ],
    references: &[
        Reference { field: "job", column: "job_id", target: <Job as Entity>::table },
        Reference { field: "manager", column: "manager_id", target: <Employee as Entity>::table },
        Reference { field: "department", column: "department_id", target: <Department as Entity>::table },
    ],
    collections: &[],
};

impl Entity for Employee {
    type Id = i64;

    const ENTITY_NAME: &'static str = "employeeEmployee";
    const PATH: &'static str = "employees";

    fn id(&self) -> Option<&i64> {
        self.employee_id.as_ref()
    }

    fn set_id(&mut self, id: i64) {
        self.employee_id = Some(id);
    }

    fn merge(&mut self, patch: Self) {
        merge_field(&mut self.first_name, patch.first_name);
        merge_field(&mut self.last_name, patch.last_name);
        merge_field(&mut self.email, patch.email);
        merge_field(&mut self.phone_number, patch.phone_number);
        merge_field(&mut self.hire_date, patch.hire_date);
        merge_field(&mut self.salary, patch.salary);
        merge_field(&mut self.commission_pct, patch.commission_pct);
        merge_field(&mut self.job, patch.job);
        merge_field(&mut self.manager, patch.manager);
        merge_field(&mut self.department, patch.department);
    }

    fn detached(&self) -> Self {
        Employee {
            employee_id: self.employee_id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
            hire_date: self.hire_date,
            salary: self.salary,
            commission_pct: self.commission_pct,
            ..Default::default()
        }
    }

    fn table() -> &'static TableDef {
        &EMPLOYEE_TABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hire_date_uses_iso_dates() {
        let employee: Employee = serde_json::from_value(json!({
            "firstName": "Grace",
            "hireDate": "2021-03-15",
            "manager": { "employeeId": 1 }
        }))
        .unwrap();
        assert_eq!(employee.hire_date, NaiveDate::from_ymd_opt(2021, 3, 15));
        assert_eq!(employee.manager.as_ref().and_then(|m| m.employee_id), Some(1));
        assert_eq!(serde_json::to_value(&employee).unwrap()["hireDate"], "2021-03-15");
    }

    #[test]
    fn manager_renders_one_level_deep() {
        let boss = Employee {
            employee_id: Some(1),
            manager: Some(Box::new(Employee { employee_id: Some(0), ..Default::default() })),
            ..Default::default()
        };
        let employee = Employee { employee_id: Some(2), manager: Some(Box::new(boss)), ..Default::default() };
        let json = serde_json::to_value(&employee).unwrap();
        assert_eq!(json["manager"]["employeeId"], 1);
        assert!(json["manager"]["manager"].is_null());
    }
}
