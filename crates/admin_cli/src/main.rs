use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{AuthConfig, Engine, Role};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Parser, Debug)]
#[command(name = "clinica_admin")]
#[command(about = "Admin utilities for the clinic backend (seed users, inspect dentists)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./clinica.db?mode=rwc"
    )]
    database_url: String,

    /// Same secret the server signs tokens with.
    #[arg(long, env = "CLINICA__AUTH__JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    #[arg(long, env = "CLINICA__AUTH__BCRYPT_COST", default_value_t = 10)]
    bcrypt_cost: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Creates the first ADMIN and FUNCIONARIA accounts on an empty database.
    Seed(SeedArgs),
    User(User),
    Dentist(Dentist),
}

#[derive(Args, Debug)]
struct SeedArgs {
    /// Prompted when absent.
    #[arg(long, env = "CLINICA_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,
    /// Prompted when absent.
    #[arg(long, env = "CLINICA_STAFF_PASSWORD", hide_env_values = true)]
    staff_password: Option<String>,
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long, default_value = "FUNCIONARIA", value_parser = parse_role)]
    role: Role,
}

#[derive(Args, Debug)]
struct Dentist {
    #[command(subcommand)]
    command: DentistCommand,
}

#[derive(Subcommand, Debug)]
enum DentistCommand {
    List(DentistListArgs),
}

#[derive(Args, Debug)]
struct DentistListArgs {
    /// Only dentists taking new budgets.
    #[arg(long)]
    active: bool,
}

fn parse_role(raw: &str) -> Result<Role, String> {
    raw.to_uppercase().parse()
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn notice(message: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(message),
        Print("\r\n")
    )?;
    Ok(())
}

/// Asks for a password until both entries match and it is long enough.
fn prompt_password_twice(label: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    for _ in 0..3 {
        let first = prompt_password(&format!("{label} password: "))?;
        if first.chars().count() < MIN_PASSWORD_LEN {
            notice(&format!("Password must be at least {MIN_PASSWORD_LEN} characters."))?;
            continue;
        }

        let second = prompt_password(&format!("Confirm {label} password: "))?;
        if first == second {
            return Ok(first);
        }

        notice("Passwords do not match. Try again.")?;
    }

    Err("too many attempts".into())
}

fn password_or_prompt(
    given: Option<String>,
    label: &str,
) -> Result<String, Box<dyn Error + Send + Sync>> {
    match given {
        Some(password) if password.chars().count() >= MIN_PASSWORD_LEN => Ok(password),
        Some(_) => Err(format!(
            "{label} password must be at least {MIN_PASSWORD_LEN} characters"
        )
        .into()),
        None => prompt_password_twice(label),
    }
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder()
        .database(db.clone())
        .auth(AuthConfig {
            jwt_secret: cli.jwt_secret,
            bcrypt_cost: cli.bcrypt_cost,
            ..AuthConfig::default()
        })
        .build()
        .await?;

    match cli.command {
        Command::Seed(args) => {
            if engine.user_count().await? > 0 {
                eprintln!("users already exist, nothing to seed");
                std::process::exit(1);
            }

            let admin_password = password_or_prompt(args.admin_password, "ADMIN")?;
            let staff_password = password_or_prompt(args.staff_password, "FUNCIONARIA")?;

            let admin = engine
                .create_user("Administrador", "admin@clinica.com", &admin_password, Role::Admin)
                .await?;
            println!("created user: {} ({})", admin.email, admin.role.as_str());

            let staff = engine
                .create_user(
                    "Funcionária",
                    "funcionaria@clinica.com",
                    &staff_password,
                    Role::Funcionaria,
                )
                .await?;
            println!("created user: {} ({})", staff.email, staff.role.as_str());
        }
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice(args.role.as_str())?;

            match engine
                .create_user(&args.name, &args.email, &password, args.role)
                .await
            {
                Ok(user) => println!("created user: {} ({})", user.email, user.role.as_str()),
                Err(engine::EngineError::ExistingKey(_)) => {
                    eprintln!("user already exists: {}", args.email);
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::Dentist(Dentist {
            command: DentistCommand::List(args),
        }) => {
            let dentists = if args.active {
                engine.active_dentists().await?
            } else {
                engine.dentists().await?
            };

            for dentist in dentists {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    dentist.id,
                    dentist.cro,
                    dentist.name,
                    dentist.specialty.as_deref().unwrap_or("-"),
                    if dentist.active { "active" } else { "inactive" }
                );
            }
        }
    }

    db.close().await?;
    Ok(())
}
