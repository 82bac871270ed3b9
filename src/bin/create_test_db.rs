use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use washbay::{
    CustomerBuilder, EmployeeName, ExpenseBuilder, Extra, PasswordHash, Role, ServiceBuilder,
    TransactionBuilder, ValidatedPassword, create_customer, create_employee, create_expense,
    create_service, create_transaction, initialize_db,
};

/// A utility for creating a demo database for WashBay.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
///
/// Every employee's password is "test".
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating employees...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;

    let admin = create_employee(
        EmployeeName::new("Admin")?,
        Role::Admin,
        password_hash.clone(),
        &conn,
    )?;
    let manager = create_employee(
        EmployeeName::new("Mere")?,
        Role::Manager,
        password_hash.clone(),
        &conn,
    )?;
    let washers = [
        create_employee(
            EmployeeName::new("Aroha")?,
            Role::Washer,
            password_hash.clone(),
            &conn,
        )?,
        create_employee(EmployeeName::new("Tama")?, Role::Washer, password_hash, &conn)?,
    ];

    println!("Creating services...");

    let services = [
        ("Express Wash", 25.0, 8.0),
        ("Full Valet", 120.0, 40.0),
        ("Interior Detail", 80.0, 25.0),
    ]
    .into_iter()
    .map(|(name, price, commission)| {
        create_service(
            ServiceBuilder {
                name: name.to_owned(),
                price,
                commission,
                active: true,
            },
            &conn,
        )
    })
    .collect::<Result<Vec<_>, _>>()?;

    println!("Creating customers...");

    let customers = [
        ("Jane Doe", "021 555 0101", "jane@example.com"),
        ("Jane  Doe", "(021) 555-0101", ""),
        ("Rawiri Walker", "027 444 1234", "rawiri@example.com"),
        ("Sam Lee", "", "sam@example.com"),
    ]
    .into_iter()
    .map(|(name, phone, email)| {
        create_customer(
            CustomerBuilder {
                name: name.to_owned(),
                phone: phone.to_owned(),
                email: email.to_owned(),
                notes: String::new(),
            },
            &conn,
        )
    })
    .collect::<Result<Vec<_>, _>>()?;

    println!("Creating transactions...");

    let today = OffsetDateTime::now_utc().date();

    for day in 0..45_i64 {
        let date = today - Duration::days(day);

        for (index, service) in services.iter().enumerate() {
            let washer = &washers[(day as usize + index) % washers.len()];
            let mut assignments = vec![washer.id];
            if index == 1 {
                assignments.push(manager.id);
            }

            let extras = if day % 3 == 0 {
                vec![Extra {
                    description: "Tyre shine".to_owned(),
                    price: 10.0,
                    commission: 4.0,
                    assigned_to: Some(washer.id),
                }]
            } else {
                vec![]
            };

            create_transaction(
                TransactionBuilder {
                    date,
                    customer_id: Some(customers[(day as usize + index) % customers.len()].id),
                    service_id: service.id,
                    tip: if day % 2 == 0 { 5.0 } else { 0.0 },
                    assignments,
                    extras,
                },
                &conn,
            )?;
        }
    }

    println!("Creating expenses...");

    create_expense(
        ExpenseBuilder {
            date: today,
            amount: 45.5,
            description: "Microfibre cloths".to_owned(),
            employee_id: Some(washers[0].id),
        },
        &conn,
    )?;
    create_expense(
        ExpenseBuilder {
            date: today,
            amount: 320.0,
            description: "Water bill".to_owned(),
            employee_id: None,
        },
        &conn,
    )?;

    println!("Log in as \"{}\" with the password \"test\".", admin.name);
    println!("Success!");

    Ok(())
}
