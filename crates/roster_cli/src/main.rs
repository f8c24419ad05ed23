//! Command-line front end for the roster store.
//!
//! # Responsibility
//! - Open a store from `--config`, `ROSTER_*` variables and `--db`.
//! - Run the demonstrated queries and print plain-text results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use roster_core::{
    init_logging_from_config, open_from_config, CrudRepository, Direction, Member, MemberField,
    MemberRepository, MemberSpec, PageRequest, RosterConfig, Sort, SqliteMemberRepository,
    SqliteTeamRepository, Team, TeamRepository, UnitOfWork,
};
use rusqlite::Connection;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "roster", version, about = "Members, teams and items over SQLite")]
struct Cli {
    /// SQLite file; overrides config and environment.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Inserts two teams and ten members.
    Seed,
    /// Lists members, optionally filtered by age and paged.
    Members {
        #[arg(long)]
        age: Option<i64>,
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        size: u32,
        /// Sort by username descending instead of id.
        #[arg(long)]
        desc: bool,
    },
    /// Lists teams with their members.
    Teams,
    /// Increments the age of every member aged `min_age` or older.
    BulkAge {
        #[arg(long)]
        min_age: i64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging_from_config(&config).context("failed to initialize logging")?;

    let mut conn = open_from_config(&config).context("failed to open store")?;
    match cli.command {
        Command::Seed => seed(&mut conn),
        Command::Members {
            age,
            page,
            size,
            desc,
        } => list_members(&conn, age, page, size, desc),
        Command::Teams => list_teams(&conn),
        Command::BulkAge { min_age } => bulk_age(&mut conn, min_age),
    }
}

fn load_config(cli: &Cli) -> Result<RosterConfig> {
    let mut config = match cli.config.as_ref() {
        Some(path) => {
            RosterConfig::from_file(path)?.with_overrides(|key| std::env::var(key).ok())?
        }
        None => RosterConfig::from_env()?,
    };
    if let Some(db) = cli.db.clone() {
        config.db_path = Some(db);
    }
    Ok(config)
}

fn seed(conn: &mut Connection) -> Result<()> {
    let uow = UnitOfWork::begin(conn)?;
    {
        let teams = uow.teams()?;
        let members = uow.members()?;
        let team_a = teams.save(&Team::new("teamA"))?;
        let team_b = teams.save(&Team::new("teamB"))?;
        for index in 1..=10 {
            let team = if index % 2 == 0 { &team_b } else { &team_a };
            let age = if index <= 5 { 10 } else { 11 };
            members.save(&Member::with_team(format!("member{index}"), age, team)?)?;
        }
    }
    uow.commit()?;
    info!("event=cli_seed module=cli status=ok");
    println!("seeded 2 teams and 10 members");
    Ok(())
}

fn list_members(
    conn: &Connection,
    age: Option<i64>,
    page: u32,
    size: u32,
    desc: bool,
) -> Result<()> {
    let repo = SqliteMemberRepository::try_new(conn)?;
    let sort = if desc {
        Sort::by(Direction::Desc, MemberField::Username)
    } else {
        Sort::unsorted()
    };
    let spec = age.map_or(MemberSpec::All, MemberSpec::age);
    let result = repo.find_page_matching(&spec, &PageRequest::of(page, size).with_sort(sort))?;

    for member in result.content() {
        println!(
            "{}\t{}\t{}\t{}",
            member.id().unwrap_or_default(),
            member.username,
            member.age,
            member
                .team_id()
                .map_or_else(|| "-".to_string(), |id| id.to_string())
        );
    }
    println!(
        "page {}/{} ({} of {} members)",
        result.number() + 1,
        result.total_pages().max(1),
        result.number_of_elements(),
        result.total_elements()
    );
    Ok(())
}

fn list_teams(conn: &Connection) -> Result<()> {
    let teams = SqliteTeamRepository::try_new(conn)?;
    for team in teams.find_all()? {
        let members = teams.find_members(&team)?;
        let names: Vec<&str> = members.iter().map(|member| member.username.as_str()).collect();
        println!(
            "{}\t{}\t[{}]",
            team.id().unwrap_or_default(),
            team.name,
            names.join(", ")
        );
    }
    Ok(())
}

fn bulk_age(conn: &mut Connection, min_age: i64) -> Result<()> {
    let uow = UnitOfWork::begin(conn)?;
    let changed = uow.members()?.bulk_age_plus(min_age)?;
    uow.commit()?;
    println!("{changed} members updated");
    Ok(())
}
