use std::fmt;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use quest_core::AppState;
use quest_core::leaderboard::rank_by_xp;
use quest_core::model::{LessonId, User};
use quest_core::progress::LessonStatus;
use services::{AppServices, QuizAdvance};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    BlankValue { flag: &'static str },
    UnknownArg(String),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::BlankValue { flag } => write!(f, "{flag} cannot be blank"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- demo    [--topic <topic>] [--name <name>] [--document <path>]");
    eprintln!("  cargo run -p app -- catalog");
    eprintln!();
    eprintln!("Defaults for demo:");
    eprintln!("  --topic Closures");
    eprintln!("  --name Ana");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  CODEQUEST_TOPIC, CODEQUEST_NAME");
    eprintln!("  CODEQUEST_AGENT_URL, CODEQUEST_AGENT_MIN_QUESTIONS, CODEQUEST_AGENT_TIMEOUT_SECS");
    eprintln!("  RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Demo,
    Catalog,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "demo" => Some(Self::Demo),
            "catalog" => Some(Self::Catalog),
            _ => None,
        }
    }
}

struct Args {
    topic: String,
    name: String,
    document: Option<PathBuf>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut topic = std::env::var("CODEQUEST_TOPIC")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "Closures".into());
        let mut name = std::env::var("CODEQUEST_NAME")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "Ana".into());
        let mut document = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--topic" => {
                    let value = require_value(args, "--topic")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::BlankValue { flag: "--topic" });
                    }
                    topic = value;
                }
                "--name" => {
                    let value = require_value(args, "--name")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::BlankValue { flag: "--name" });
                    }
                    name = value;
                }
                "--document" => {
                    let value = require_value(args, "--document")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::BlankValue { flag: "--document" });
                    }
                    document = Some(PathBuf::from(value));
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            topic,
            name,
            document,
        })
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: run the demo when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Demo,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Demo,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let args = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    match cmd {
        Command::Demo => run_demo(args).await,
        Command::Catalog => print_catalog(),
    }
}

async fn run_demo(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let services = AppServices::new()?;
    let mut state = AppState::new();

    let slug = args.name.to_lowercase().replace(' ', ".");
    let email = format!("{slug}@codequest.dev");

    println!("== Sign up ==");
    services
        .auth()
        .sign_up(&mut state, &email, "quest123", &args.name)
        .await?;
    if let Some(user) = state.user() {
        print_user(user);
    }

    println!();
    println!("== Skill tree ==");
    print_skill_tree(&services, &state);

    println!();
    println!("== Lesson: variables-basics ==");
    let completion = services
        .lessons()
        .complete_lesson(&mut state, &LessonId::new("variables-basics"))?;
    println!("  +{} XP for completing the lesson", completion.xp_awarded);
    if let Some(badge) = &completion.badge {
        println!("  Badge earned: {} {}", badge.icon(), badge.name());
    }

    services
        .lessons()
        .start_lesson_quiz(&mut state, &LessonId::new("variables-basics"))?;
    play_quiz(&services, &mut state, true).await?;

    println!();
    println!("== Generated quiz: {} ==", args.topic);
    services.generation().quick_quiz(&mut state, &args.topic).await?;
    play_quiz(&services, &mut state, false).await?;

    if let Some(path) = &args.document {
        println!();
        println!("== Document quiz: {} ==", path.display());
        let document = std::fs::read_to_string(path)?;
        match services
            .generation()
            .document_quiz(&mut state, &args.topic, &document)
            .await
        {
            Ok(_) => play_quiz(&services, &mut state, false).await?,
            Err(err) => println!("  Document quiz unavailable: {err}"),
        }
    }

    println!();
    println!("== Progress after playing ==");
    print_skill_tree(&services, &state);
    if let Some(user) = state.user() {
        print_user(user);
    }

    println!();
    println!("== Leaderboard ==");
    print_leaderboard(&state);

    println!();
    services.auth().sign_out(&mut state).await?;
    println!("Signed out; see you tomorrow to keep the streak going.");
    Ok(())
}

/// Answers every remaining question with its own canonical answer; with
/// `miss_first` the first one is answered wrong and retried, to show the
/// feedback and retry path.
async fn play_quiz(
    services: &AppServices,
    state: &mut AppState,
    miss_first: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut runner = services.quiz_runner();

    if miss_first {
        let wrong = state.quiz().and_then(|quiz| {
            quiz.current_question().and_then(|question| {
                question
                    .options()
                    .iter()
                    .find(|option| option.as_str() != question.correct_answer())
                    .cloned()
            })
        });
        if let Some(wrong) = wrong {
            let feedback = runner.submit_answer(state, &wrong).await?;
            println!("  ✗ {}", feedback.feedback);
            runner.retry()?;
        }
    }

    loop {
        let Some((prompt, answer)) = state.quiz().and_then(|quiz| {
            quiz.current_question().map(|question| {
                (
                    question.prompt().to_string(),
                    question.correct_answer().to_string(),
                )
            })
        }) else {
            break;
        };

        println!("  Q: {}", first_line(&prompt));
        let feedback = runner.submit_answer(state, &answer).await?;
        println!("  ✓ {} (+{} XP)", feedback.feedback, feedback.xp_earned);

        match runner.advance(state)? {
            QuizAdvance::Next { .. } => {}
            QuizAdvance::Completed(summary) => {
                println!(
                    "  Finished \"{}\": {} XP across {} questions",
                    summary.topic, summary.score, summary.questions
                );
                break;
            }
        }
    }
    Ok(())
}

fn print_user(user: &User) {
    println!(
        "  {} <{}> — level {} ({} / {} XP), streak {}",
        user.name(),
        user.email(),
        user.level(),
        user.xp(),
        user.next_level_xp(),
        user.streak(),
    );
    if !user.badges().is_empty() {
        let badges: Vec<String> = user
            .badges()
            .iter()
            .map(|badge| format!("{} {}", badge.icon(), badge.name()))
            .collect();
        println!("  Badges: {}", badges.join(", "));
    }
}

fn print_skill_tree(services: &AppServices, state: &AppState) {
    let tree = services.lessons().skill_tree(state);
    for (section, progress) in services.lessons().sections().iter().zip(&tree) {
        println!(
            "  {} {} — {}/{} lessons",
            section.icon(),
            section.title(),
            progress.completed,
            progress.total,
        );
        for (lesson, status) in section.lessons().iter().zip(&progress.lessons) {
            let marker = match status.status {
                LessonStatus::Completed => "✅",
                LessonStatus::Available => "🔓",
                LessonStatus::Locked => "🔒",
            };
            println!(
                "    {marker} {} ({} XP, {})",
                lesson.title(),
                lesson.xp_reward(),
                lesson.difficulty(),
            );
        }
    }
}

fn print_leaderboard(state: &AppState) {
    let mut players: Vec<(String, u32)> = vec![
        ("Ana García".into(), 2450),
        ("Carlos López".into(), 2100),
        ("María Rodríguez".into(), 980),
        ("Juan Pérez".into(), 750),
    ];
    let you = state.user().map(|user| user.name().to_string());
    if let (Some(name), Some(user)) = (&you, state.user()) {
        players.push((name.clone(), user.xp()));
    }

    for entry in rank_by_xp(players) {
        let marker = if you.as_deref() == Some(entry.name.as_str()) {
            " (you)"
        } else {
            ""
        };
        println!("  #{} {} — {} XP{marker}", entry.rank, entry.name, entry.xp);
    }
}

fn print_catalog() -> Result<(), Box<dyn std::error::Error>> {
    for section in quest_core::catalog::sections()? {
        println!("{} {} — {}", section.icon(), section.title(), section.description());
        for lesson in section.lessons() {
            let prerequisites: Vec<&str> = lesson
                .prerequisites()
                .iter()
                .map(|id| id.as_str())
                .collect();
            println!(
                "  {} [{}] {} XP, {} questions, requires: {}",
                lesson.id(),
                lesson.difficulty(),
                lesson.xp_reward(),
                lesson.questions().len(),
                if prerequisites.is_empty() {
                    "nothing".to_string()
                } else {
                    prerequisites.join(", ")
                },
            );
        }
    }
    Ok(())
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or(text)
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
