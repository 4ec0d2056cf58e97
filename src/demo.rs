//! The sample company dataset used by the demo binary and the integration
//! tests.

use crate::database::Database;
use crate::error::DbResult;
use crate::value::Value;

/// Builds the `Sample` database with `projects(projectName key, budget)` and
/// `employees(employeeNumber key, zipCode, projectName)`, then seeds it with
/// `number_of_projects` projects and their employees.
pub fn company_database(number_of_projects: usize) -> DbResult<Database> {
    let mut database = Database::new("Sample");
    database
        .create_table("projects")
        .attribute("projectName")?
        .attribute("budget")?
        .key(&["projectName"])?;
    database
        .create_table("employees")
        .attribute("employeeNumber")?
        .attribute("zipCode")?
        .attribute("projectName")?
        .key(&["employeeNumber"])?;
    add_data(&mut database, number_of_projects)?;
    Ok(database)
}

/// Seeds the company tables: budgets cycle through one, two, and three
/// million; zip codes cycle through 12222..12225; each project gets three
/// employees, and the last project one extra. Name widths grow with the
/// dataset so keys sort in generation order.
pub fn add_data(database: &mut Database, number_of_projects: usize) -> DbResult<()> {
    const BUDGETS: [f64; 3] = [1_000_000.0, 2_000_000.0, 3_000_000.0];
    const ZIP_CODES: [i64; 4] = [12222, 12223, 12224, 12225];
    const EMPLOYEES_PER_PROJECT: usize = 3;

    let digits = ((EMPLOYEES_PER_PROJECT * number_of_projects) as f64)
        .log10()
        .ceil() as usize;

    for i in 0..number_of_projects {
        let project_name = format!("P{:0width$}", i, width = digits);
        database
            .table_mut("projects")
            .unwrap()
            .insert_record(vec![
                Value::from(project_name.clone()),
                Value::Float(BUDGETS[i % BUDGETS.len()]),
            ])?;

        let mut employee_count = EMPLOYEES_PER_PROJECT;
        if i == number_of_projects - 1 {
            employee_count += 1;
        }
        for j in 0..employee_count {
            let employee_number =
                format!("E{:0width$}", EMPLOYEES_PER_PROJECT * i + j, width = digits);
            database
                .table_mut("employees")
                .unwrap()
                .insert_record(vec![
                    Value::from(employee_number),
                    Value::Int(ZIP_CODES[(2 * i + j) % ZIP_CODES.len()]),
                    Value::from(project_name.clone()),
                ])?;
        }
    }
    Ok(())
}
