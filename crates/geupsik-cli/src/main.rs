mod config;
mod display;
mod session;

use std::process::ExitCode;

use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use geupsik_client::{HttpTransport, NeisClient};
use geupsik_core::countdown::parse_clock;
use geupsik_core::meal::parse_date;
use geupsik_core::{RegionCode, SchoolLevel, SchoolQuery};
use geupsik_store::{LocalStore, VoteKind, VoteStore};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt};

use config::{Config, ConfigArgs, VoteBackend};
use display::print_outcome;
use session::{Action, App, InteractionState, Outcome};

#[derive(Parser, Debug)]
#[command(name = "geupsik", version, about = "School cafeteria menu lookup")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct SchoolArgs {
    /// School name, e.g. 강남초등학교
    name: String,
    /// Region code, slug, or Korean name
    #[arg(long)]
    region: Option<RegionCode>,
    /// elementary, middle, or high
    #[arg(long)]
    level: Option<SchoolLevel>,
    /// Pick the Nth candidate when several schools match
    #[arg(long)]
    pick: Option<usize>,
}

impl SchoolArgs {
    fn query(&self) -> SchoolQuery {
        SchoolQuery {
            name_filter: self.name.clone(),
            region: self.region,
            level: self.level,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List region and school-level codes
    Regions,
    /// Find schools by name
    Search {
        name: String,
        #[arg(long)]
        region: Option<RegionCode>,
        #[arg(long)]
        level: Option<SchoolLevel>,
    },
    /// Show a school's menu for a day
    Menu {
        #[command(flatten)]
        school: SchoolArgs,
        /// YYYY-MM-DD or YYYYMMDD (default: today)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Show dish text as the provider sent it
        #[arg(long)]
        raw: bool,
    },
    /// Vote on a school's menu by its codes
    Vote {
        /// Office code, e.g. B10
        office: String,
        /// School code, e.g. 7021319
        school: String,
        /// good or bad
        kind: VoteKind,
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Show vote counts for a school code
    Votes {
        /// School code, e.g. 7021319
        school: String,
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Manage favorite schools
    Fav {
        #[command(subcommand)]
        command: FavCommands,
    },
    /// Time until lunch
    Countdown {
        /// Pretend the current time is HH:MM
        #[arg(long, value_parser = parse_clock)]
        at: Option<NaiveTime>,
    },
    /// Interactive session
    Shell,
}

#[derive(Subcommand, Debug)]
enum FavCommands {
    Add {
        #[command(flatten)]
        school: SchoolArgs,
    },
    Remove {
        #[command(flatten)]
        school: SchoolArgs,
    },
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!("geupsik v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let config = Config::load(cli.config)?;

    let today = Local::now().date_naive();

    // Commands that never talk to the provider.
    match &cli.command {
        Commands::Regions => {
            display::print_regions();
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Vote {
            office,
            school,
            kind,
            date,
        } => {
            let votes = open_votes(&config)?;
            let date = date.unwrap_or(today);
            let outcome = session::vote_by_code(votes.as_ref(), office, school, date, *kind);
            return Ok(exit_code(print_outcome(&outcome)));
        }
        Commands::Votes { school, date } => {
            let votes = open_votes(&config)?;
            let outcome = session::votes_by_code(votes.as_ref(), school, date.unwrap_or(today));
            return Ok(exit_code(print_outcome(&outcome)));
        }
        _ => {}
    }

    let app = build_app(&config)?;

    let ok = match cli.command {
        Commands::Regions | Commands::Vote { .. } | Commands::Votes { .. } => true,
        Commands::Search {
            name,
            region,
            level,
        } => {
            let query = SchoolQuery {
                name_filter: name,
                region,
                level,
            };
            let (state, outcome) = app
                .handle(InteractionState::default(), Action::Search(query))
                .await;
            match outcome {
                // A single result is auto-selected; list it like the others.
                Outcome::Selected(_) => {
                    display::print_candidates(&state.candidates);
                    true
                }
                other => print_outcome(&other),
            }
        }
        Commands::Menu { school, date, raw } => {
            let date = date.unwrap_or(today);
            run_for_school(&app, &school, date, Action::ShowMenu { raw }).await
        }
        Commands::Fav { command } => match command {
            FavCommands::Add { school } => {
                run_for_school(&app, &school, today, Action::AddFavorite).await
            }
            FavCommands::Remove { school } => {
                run_for_school(&app, &school, today, Action::RemoveFavorite).await
            }
            FavCommands::List => {
                let (_, outcome) = app
                    .handle(InteractionState::default(), Action::ListFavorites)
                    .await;
                print_outcome(&outcome)
            }
        },
        Commands::Countdown { at } => {
            let now = match at {
                Some(t) => today.and_time(t),
                None => Local::now().naive_local(),
            };
            let (_, outcome) = app
                .handle(InteractionState::default(), Action::Countdown(now))
                .await;
            print_outcome(&outcome)
        }
        Commands::Shell => {
            shell(&app).await?;
            true
        }
    };

    Ok(exit_code(ok))
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn open_votes(config: &Config) -> anyhow::Result<Box<dyn VoteStore>> {
    let votes: Box<dyn VoteStore> = match config.vote_backend {
        VoteBackend::Json => Box::new(LocalStore::open(config.votes_path())?),
        #[cfg(feature = "duckdb")]
        VoteBackend::Duckdb => {
            std::fs::create_dir_all(&config.data_dir)?;
            Box::new(geupsik_store::DuckVoteStore::open_persistent(
                &config.votes_path(),
            )?)
        }
    };
    Ok(votes)
}

fn build_app(config: &Config) -> anyhow::Result<App> {
    let transport = HttpTransport::new(config.base_url.clone(), config.timeout)?;
    let client =
        NeisClient::new(transport, config.api_key.clone()).with_page_size(config.page_size);
    let favorites = LocalStore::open(config.favorites_path())?;

    Ok(App::new(
        client,
        open_votes(config)?,
        favorites,
        config.lunch,
        Local::now().date_naive(),
    ))
}

/// Resolve and select a school, set the date, then run `action`.
async fn run_for_school(app: &App, school: &SchoolArgs, date: NaiveDate, action: Action) -> bool {
    let (mut state, outcome) = app
        .handle(InteractionState::default(), Action::Search(school.query()))
        .await;

    match (&outcome, school.pick) {
        (Outcome::Selected(_), None) => {}
        (Outcome::Selected(_) | Outcome::Candidates(_), Some(n)) => {
            let (next, picked) = app.handle(state, Action::Pick(n)).await;
            if !matches!(picked, Outcome::Selected(_)) {
                print_outcome(&picked);
                return false;
            }
            state = next;
        }
        (Outcome::Candidates(_), None) => {
            print_outcome(&outcome);
            println!("--pick N 으로 학교를 지정해 주세요.");
            return false;
        }
        _ => {
            print_outcome(&outcome);
            return false;
        }
    }

    let (state, _) = app.handle(state, Action::SetDate(date)).await;
    let (_, outcome) = app.handle(state, action).await;
    print_outcome(&outcome)
}

enum ShellCommand {
    Run(Action),
    Help,
    Quit,
}

const SHELL_HELP: &str = "\
명령어:
  search <이름> [region=<지역>] [level=<학교급>]   학교 검색
  pick <번호>                                   검색 결과에서 학교 선택
  date <YYYY-MM-DD>                             날짜 지정
  menu | raw                                    급식 메뉴 보기
  good | bad                                    메뉴 투표
  votes                                         투표 현황
  fav | unfav | favs                            즐겨찾기 추가/삭제/목록
  countdown                                     점심까지 남은 시간
  help | quit";

fn parse_shell_command(line: &str, now: chrono::NaiveDateTime) -> Result<ShellCommand, String> {
    let mut words = line.split_whitespace();
    let Some(cmd) = words.next() else {
        return Err(String::new());
    };
    let rest: Vec<&str> = words.collect();

    let action = match cmd {
        "search" | "검색" => {
            let mut query = SchoolQuery::new("");
            let mut name = Vec::new();
            for word in rest {
                if let Some(r) = word.strip_prefix("region=") {
                    query.region = Some(r.parse().map_err(|e| format!("{e}"))?);
                } else if let Some(l) = word.strip_prefix("level=") {
                    query.level = Some(l.parse().map_err(|e| format!("{e}"))?);
                } else {
                    name.push(word);
                }
            }
            query.name_filter = name.join(" ");
            Action::Search(query)
        }
        "pick" => {
            let n = rest
                .first()
                .and_then(|s| s.parse().ok())
                .ok_or("usage: pick <번호>")?;
            Action::Pick(n)
        }
        "date" => {
            let date = rest.first().ok_or("usage: date <YYYY-MM-DD>")?;
            Action::SetDate(parse_date(date).map_err(|e| e.to_string())?)
        }
        "menu" => Action::ShowMenu { raw: false },
        "raw" => Action::ShowMenu { raw: true },
        "good" | "bad" => Action::Vote(cmd.parse()?),
        "votes" => Action::ShowVotes,
        "fav" => Action::AddFavorite,
        "unfav" => Action::RemoveFavorite,
        "favs" => Action::ListFavorites,
        "countdown" => Action::Countdown(now),
        "help" | "?" => return Ok(ShellCommand::Help),
        "quit" | "exit" | "q" => return Ok(ShellCommand::Quit),
        other => return Err(format!("알 수 없는 명령어: {other} (help 참고)")),
    };
    Ok(ShellCommand::Run(action))
}

async fn shell(app: &App) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut state = InteractionState::default();

    println!("{SHELL_HELP}");
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match parse_shell_command(&line, Local::now().naive_local()) {
            Ok(ShellCommand::Run(action)) => {
                let (next, outcome) = app.handle(state, action).await;
                state = next;
                print_outcome(&outcome);
            }
            Ok(ShellCommand::Help) => println!("{SHELL_HELP}"),
            Ok(ShellCommand::Quit) => break,
            Err(msg) if msg.is_empty() => {}
            Err(msg) => println!("{msg}"),
        }
    }
    Ok(())
}
