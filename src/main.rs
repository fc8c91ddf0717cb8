//! Prize Draw - console host
//!
//! Usage:
//!   prize-draw --prizes prizes.json --participants people.json
//!
//! Commands are read from stdin, one per line:
//!   spin | stop | confirm | respin | undo | remove <id> | select <tierId>
//!   reset | status | winners | queue | quit

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use crossbeam_channel::Receiver;

use pd_draw::{
    DrawEvent, DrawHandle, DrawOrchestrator, DrawSnapshot, ReelAnimator, WinnerReport,
};
use pd_state::{
    AutosaveManager, DrawConfig, PersistOnCommit, SnapshotStore, load_participants,
    load_prize_tiers,
};

/// Extra wait on top of the reveal delay before giving up on a report
const REPORT_GRACE: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "prize-draw", about = "Live prize draw console")]
struct Cli {
    /// Prize tier list (JSON)
    #[arg(long)]
    prizes: PathBuf,

    /// Participant list (JSON)
    #[arg(long)]
    participants: PathBuf,

    /// Config file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fixed RNG seed for rehearsals
    #[arg(long)]
    seed: Option<u64>,

    /// Ignore autosaves and start a new draw
    #[arg(long)]
    fresh: bool,

    /// Autosave directory
    #[arg(long)]
    autosave_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DrawConfig::load_from(path),
        None => DrawConfig::load(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(dir) = &cli.autosave_dir {
        config.autosave.autosave_dir = dir.clone();
    }

    log::info!("Starting prize draw: {}", config.event_name);

    let autosave = Arc::new(AutosaveManager::new(config.autosave.clone()));
    autosave.set_event_name(config.event_name.clone());

    let (reel, reports) = match config.seed {
        Some(seed) => ReelAnimator::seeded(seed),
        None => ReelAnimator::new(),
    };
    let reveal_delay = Duration::from_millis(config.reveal_delay_ms);
    let reel = Box::new(reel.with_reveal_delay(reveal_delay));

    let recovered = if cli.fresh {
        None
    } else {
        match autosave.load() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("Autosave unreadable, starting fresh: {}", e);
                None
            }
        }
    };

    let mut draw = match recovered {
        Some(snapshot) => {
            let draw = DrawOrchestrator::from_snapshot(snapshot, reel)
                .context("Failed to resume from autosave")?;
            println!(
                "Resumed: {}/{} prizes awarded",
                draw.ledger().len(),
                draw.queue().len()
            );
            draw
        }
        None => {
            let tiers = load_prize_tiers(&cli.prizes)
                .with_context(|| format!("Failed to load prizes from {:?}", cli.prizes))?;
            let people = load_participants(&cli.participants).with_context(|| {
                format!("Failed to load participants from {:?}", cli.participants)
            })?;
            DrawOrchestrator::new(tiers, people, reel).context("Failed to create draw")?
        }
    };

    draw.subscribe(Box::new(PersistOnCommit::new(Arc::clone(&autosave))));
    draw.subscribe(Box::new(|event: &DrawEvent, _: &DrawSnapshot| {
        if let DrawEvent::Confirmed { entry } = event {
            println!("*** {} wins {} ***", entry.participant.name, entry.prize.label());
        }
    }));

    let handle = DrawHandle::new(draw);
    let wait = reveal_delay + REPORT_GRACE;

    print_status(&handle);
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read stdin")?;
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };
        let arg = words.next();

        match run_command(&handle, &autosave, &reports, wait, command, arg) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => println!("error: {e}"),
        }
        io::stdout().flush().ok();
    }

    log::info!("Prize draw closed");
    Ok(())
}

/// Execute one console command. Returns `false` on quit.
fn run_command(
    handle: &DrawHandle,
    autosave: &AutosaveManager,
    reports: &Receiver<WinnerReport>,
    wait: Duration,
    command: &str,
    arg: Option<&str>,
) -> Result<bool> {
    match command {
        "spin" => {
            let session = handle.start_spin()?;
            println!("Spinning ({session})... type `stop`");
        }
        "stop" => {
            handle.request_stop()?;
            match handle.wait_for_winner(reports, wait)? {
                Some(winner) => println!("Winner: {winner}. `confirm` or `respin`?"),
                None => println!("No winner reported"),
            }
        }
        "confirm" => {
            handle.confirm()?;
            print_status(handle);
        }
        "respin" => {
            let discarded = handle.respin()?;
            println!("Discarded {discarded}. `spin` again");
        }
        "undo" => {
            let entry = handle.undo()?;
            println!("Undone: {} returned to the pool", entry.participant);
        }
        "remove" => {
            let Some(id) = arg else {
                bail!("usage: remove <participantId>");
            };
            let entry = handle.with(|draw| draw.remove_winner(id))?;
            println!("{} returned to the pool", entry.participant);
        }
        "select" => {
            let tier_id: u32 = arg
                .context("usage: select <tierId>")?
                .parse()
                .context("tier id must be a number")?;
            handle.with(|draw| draw.manual_select_tier(tier_id))?;
            print_status(handle);
        }
        "reset" => {
            handle.with(|draw| draw.reset_to_roster())?;
            print_status(handle);
        }
        "status" => {
            println!("{}", serde_json::to_string_pretty(&handle.status())?);
            let saves = autosave.status();
            println!(
                "autosave: {} | {} unsaved changes",
                if saves.enabled { "on" } else { "off" },
                saves.changes_since_save
            );
        }
        "winners" => handle.with(|draw| {
            if draw.ledger().is_empty() {
                println!("No winners yet");
            }
            for (i, entry) in draw.ledger().iter().enumerate() {
                println!(
                    "{:>3}. {} - {} ({})",
                    i + 1,
                    entry.prize.label(),
                    entry.participant,
                    entry.timestamp.format("%H:%M:%S")
                );
            }
        }),
        "queue" => handle.with(|draw| {
            for (i, slot) in draw.queue().entries().iter().enumerate() {
                let marker = if i == draw.cursor() { ">" } else { " " };
                let held = if draw.ledger().holds_instance(slot.tier_id, slot.instance_number) {
                    "awarded"
                } else {
                    ""
                };
                println!("{marker} {:>3}. {:<30} {held}", i, slot.label());
            }
        }),
        "quit" | "exit" => return Ok(false),
        other => bail!("unknown command `{other}`"),
    }
    Ok(true)
}

fn print_status(handle: &DrawHandle) {
    let status = handle.status();
    let prize = status
        .current_prize
        .as_ref()
        .map(|p| p.label())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "[{}] next: {} | awarded {}/{} | {} in pool",
        status.phase,
        prize,
        status.awarded_count,
        status.total_prizes,
        status.remaining_count
    );
}
