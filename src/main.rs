//! Demo driver: builds the sample company database and walks through the
//! query surface.

use anyhow::{Context, Result};
use clap::Parser;
use minirel::database::Database;
use minirel::demo;
use minirel::error::DbResult;
use minirel::record::Record;

/// In-memory relational query engine demo
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of projects to seed
    #[arg(short, long, default_value = "6")]
    projects: usize,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let database =
        demo::company_database(args.projects).context("Failed to seed the sample database")?;
    log::info!("seeded {} projects", args.projects);
    println!("{}", database);
    println!();

    run_queries(&database).context("Query failed")?;
    Ok(())
}

fn run_queries(database: &Database) -> DbResult<()> {
    print_result(database.select("*", "projects")?, "projects");
    print_result(database.select("*", "employees")?, "employees");
    print_result(
        database.select_where("*", "projects", "budget > 1000000")?,
        "projects with budget > 1,000,000",
    );
    print_result(
        database.select("employeeNumber, budget", "employees natural join projects")?,
        "employee number, budget",
    );
    print_result(
        database.select_where(
            "budget",
            "employees natural join projects",
            "employeeNumber = \"E15\"",
        )?,
        "budget of the project employee E15 participates in",
    );
    print_result(
        database.select("count(employeeNumber) as count", "employees")?,
        "number of employees",
    );
    print_result(
        database.select("max(budget) as maxBudget", "projects")?,
        "maximum of project budgets",
    );
    print_result(
        database.select("sum(budget) as sumBudget", "projects")?,
        "sum of project budgets",
    );
    print_result(
        database.select_group_by(
            "zipCode, count(employeeNumber) as employeeCount",
            "employees",
            "zipCode",
        )?,
        "ZIP code, number of employees",
    );
    print_result(
        database.select_group_by(
            "budget, count(employeeNumber) as employeeCount",
            "employees natural join projects",
            "budget",
        )?,
        "budget, number of employees",
    );
    Ok(())
}

fn print_result(records: impl Iterator<Item = DbResult<Record>>, title: &str) {
    println!("{}:", title);
    for record in records {
        match record {
            Ok(record) => println!("{}", record),
            Err(e) => println!("error: {}", e),
        }
    }
    println!();
}
